//! Load `.btx.toml` from the task directory (CLI only). Lib callers build [`Opts`] themselves.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::Opts;
use crate::utils::config::PackagePaths;

#[derive(Debug, Default, Deserialize)]
pub struct BtxToml {
    #[serde(default)]
    indexer: IndexerSection,
}

#[derive(Debug, Default, Deserialize)]
struct IndexerSection {
    geom: Option<String>,
    cell: Option<String>,
    int_rad: Option<String>,
    methods: Option<String>,
    tolerance: Option<String>,
    no_revalidate: Option<bool>,
    multi: Option<bool>,
    profile: Option<bool>,
    update_url: Option<String>,
}

/// Parse config text. Errors are logged against `origin` and yield None.
pub fn parse_btx_toml(s: &str, origin: &Path) -> Option<BtxToml> {
    toml::from_str(s)
        .map_err(|e| log::warn!("{}: {}", origin.display(), e))
        .ok()
}

/// Load `.btx.toml` from `dir` if present. Returns None if the file is missing or unreadable.
pub fn load_btx_toml(dir: &Path) -> Option<BtxToml> {
    let path = dir.join(PackagePaths::get().config_filename());
    let s = std::fs::read_to_string(&path).ok()?;
    parse_btx_toml(&s, &path)
}

/// Overwrite opts field from file when present.
macro_rules! apply_file_opt {
    ($sec:expr, $target:expr, $field:ident) => {
        if let Some(ref v) = $sec.$field {
            $target.$field = v.clone();
        }
    };
}

/// Apply file config to opts (only fields present in the file). Call before applying CLI flags.
pub fn apply_file_to_opts(file: &BtxToml, opts: &mut Opts) {
    let sec = &file.indexer;
    if let Some(ref p) = sec.geom {
        opts.params.geom = Some(PathBuf::from(p));
    }
    if let Some(ref p) = sec.cell {
        opts.params.cell = Some(PathBuf::from(p));
    }
    apply_file_opt!(sec, opts.params, int_rad);
    apply_file_opt!(sec, opts.params, methods);
    apply_file_opt!(sec, opts.params, tolerance);
    apply_file_opt!(sec, opts.params, no_revalidate);
    apply_file_opt!(sec, opts.params, multi);
    apply_file_opt!(sec, opts.params, profile);
    if let Some(ref url) = sec.update_url {
        opts.update_url = Some(url.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_overrides_only_present_fields() {
        let text = r#"
[indexer]
geom = "/det/geom/r0001.geom"
methods = "mosflm"
multi = false
"#;
        let file = parse_btx_toml(text, Path::new(".btx.toml")).unwrap();
        let mut opts = Opts::default();
        apply_file_to_opts(&file, &mut opts);
        assert_eq!(opts.params.geom, Some(PathBuf::from("/det/geom/r0001.geom")));
        assert_eq!(opts.params.methods, "mosflm");
        assert!(!opts.params.multi);
        assert!(opts.params.profile);
        assert_eq!(opts.params.int_rad, "4,5,6");
        assert!(opts.update_url.is_none());
    }

    #[test]
    fn malformed_file_is_ignored() {
        assert!(parse_btx_toml("[indexer\nmulti = ", Path::new(".btx.toml")).is_none());
    }

    #[test]
    fn empty_file_is_all_defaults() {
        let file = parse_btx_toml("", Path::new(".btx.toml")).unwrap();
        let mut opts = Opts::default();
        apply_file_to_opts(&file, &mut opts);
        assert!(opts.params.geom.is_none());
        assert_eq!(opts.params.tolerance, "5,5,5,1.5");
    }
}
