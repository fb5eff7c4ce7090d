//! Workflow DAG declarations handed to the facility scheduler.
//!
//! Only the graph is declared here: task ids, where each task runs, and the edges
//! between them. Scheduling, retries and execution belong to the scheduler.

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::fmt;

/// Compute facility a job is submitted to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunLocation {
    /// Shared resource computing facility, fast-feedback nodes.
    #[default]
    #[serde(rename = "SRCF_FFB")]
    SrcfFfb,
}

impl fmt::Display for RunLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunLocation::SrcfFfb => f.write_str("SRCF_FFB"),
        }
    }
}

/// A task submitted as a slurm job through the job interface daemon.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JidSlurmOperator {
    pub task_id: String,
    #[serde(default)]
    pub run_at: RunLocation,
}

impl JidSlurmOperator {
    pub fn new(task_id: impl Into<String>, run_at: RunLocation) -> Self {
        Self {
            task_id: task_id.into(),
            run_at,
        }
    }
}

/// Static task graph. Edges are `(upstream, downstream)` task ids.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dag {
    pub dag_id: String,
    pub description: String,
    pub start_date: NaiveDate,
    /// None: triggered externally, never on a timer.
    pub schedule_interval: Option<String>,
    tasks: Vec<JidSlurmOperator>,
    edges: Vec<(String, String)>,
}

impl Dag {
    pub fn new(
        dag_id: impl Into<String>,
        description: impl Into<String>,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            dag_id: dag_id.into(),
            description: description.into(),
            start_date,
            schedule_interval: None,
            tasks: Vec::new(),
            edges: Vec::new(),
        }
    }

    pub fn tasks(&self) -> &[JidSlurmOperator] {
        &self.tasks
    }

    pub fn edges(&self) -> &[(String, String)] {
        &self.edges
    }

    pub fn task(&self, task_id: &str) -> Option<&JidSlurmOperator> {
        self.tasks.iter().find(|t| t.task_id == task_id)
    }

    /// Add a task. Task ids are unique within a DAG.
    pub fn add_task(&mut self, task: JidSlurmOperator) -> Result<()> {
        if self.task(&task.task_id).is_some() {
            bail!("duplicate task '{}' in DAG '{}'", task.task_id, self.dag_id);
        }
        self.tasks.push(task);
        Ok(())
    }

    /// `upstream >> downstream`: downstream starts after upstream completes.
    pub fn chain(&mut self, upstream: &str, downstream: &str) -> Result<()> {
        for id in [upstream, downstream] {
            if self.task(id).is_none() {
                bail!("unknown task '{}' in DAG '{}'", id, self.dag_id);
            }
        }
        let edge = (upstream.to_string(), downstream.to_string());
        if !self.edges.contains(&edge) {
            self.edges.push(edge);
        }
        Ok(())
    }

    pub fn downstream_of(&self, task_id: &str) -> Vec<&str> {
        self.edges
            .iter()
            .filter(|(up, _)| up == task_id)
            .map(|(_, down)| down.as_str())
            .collect()
    }

    pub fn upstream_of(&self, task_id: &str) -> Vec<&str> {
        self.edges
            .iter()
            .filter(|(_, down)| down == task_id)
            .map(|(up, _)| up.as_str())
            .collect()
    }

    /// Task ids in dependency order (Kahn's algorithm, ties broken by declaration order).
    pub fn execution_order(&self) -> Result<Vec<&str>> {
        let mut in_degree: HashMap<&str, usize> =
            self.tasks.iter().map(|t| (t.task_id.as_str(), 0)).collect();
        for (_, down) in &self.edges {
            if let Some(d) = in_degree.get_mut(down.as_str()) {
                *d += 1;
            }
        }

        let mut queue: VecDeque<&str> = self
            .tasks
            .iter()
            .map(|t| t.task_id.as_str())
            .filter(|id| in_degree[id] == 0)
            .collect();
        let mut order = Vec::with_capacity(self.tasks.len());
        while let Some(id) = queue.pop_front() {
            order.push(id);
            for down in self.downstream_of(id) {
                if let Some(d) = in_degree.get_mut(down) {
                    *d -= 1;
                    if *d == 0 {
                        queue.push_back(down);
                    }
                }
            }
        }

        if order.len() != self.tasks.len() {
            let stuck = self
                .tasks
                .iter()
                .map(|t| t.task_id.as_str())
                .find(|id| !order.contains(id))
                .unwrap_or_default();
            bail!("cycle detected in DAG '{}' involving task '{}'", self.dag_id, stuck);
        }
        Ok(order)
    }
}

impl fmt::Display for Dag {
    /// Renders the DAG as `a >> b` lines, one per edge; isolated tasks on their own line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({})", self.dag_id, self.description)?;
        for (up, down) in &self.edges {
            writeln!(f, "{up} >> {down}")?;
        }
        for t in &self.tasks {
            if self.upstream_of(&t.task_id).is_empty() && self.downstream_of(&t.task_id).is_empty()
            {
                writeln!(f, "{}", t.task_id)?;
            }
        }
        Ok(())
    }
}

pub const OPTIMIZE_GEOMETRY: &str = "optimize_geometry";

/// Geometry optimization: run the analysis, then optimize the detector geometry.
pub fn optimize_geometry() -> Result<Dag> {
    let start = NaiveDate::from_ymd_opt(2022, 4, 1).context("optimize_geometry start date")?;
    let mut dag = Dag::new(OPTIMIZE_GEOMETRY, "BTX optimize geometry DAG", start);

    dag.add_task(JidSlurmOperator::new("run_analysis", RunLocation::SrcfFfb))?;
    dag.add_task(JidSlurmOperator::new("opt_geom", RunLocation::SrcfFfb))?;

    dag.chain("run_analysis", "opt_geom")?;
    Ok(dag)
}

/// Shipped DAG declarations by id.
pub fn builtin(dag_id: &str) -> Result<Dag> {
    match dag_id {
        OPTIMIZE_GEOMETRY => optimize_geometry(),
        other => bail!("unknown DAG '{other}' (available: {OPTIMIZE_GEOMETRY})"),
    }
}
