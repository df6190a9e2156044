//! Command-line job ordering for jobdeps.
//!
//! Reads a job list (see [`jobs`]), builds a
//! [`DependencyGraph`](jobdeps_graph::DependencyGraph) from it and reports
//! either an execution order or a circular dependency.

pub mod cli;
pub mod jobs;
pub mod report;
pub mod tracing;

use std::fs;
use std::io::{self, Read};

use ::tracing::{info, warn};

use crate::cli::{Cli, CliError};
use crate::jobs::JobList;
use crate::report::Outcome;

/// Label used for stdin in diagnostics.
const STDIN_LABEL: &str = "<stdin>";

/// Read the job list named by `cli` and compute its ordering.
///
/// # Errors
///
/// Returns a [`CliError`] if the input cannot be read, is malformed, or
/// declares an invalid graph. A circular dependency is reported through
/// [`Outcome::Cycle`], not as an error.
pub fn run(cli: &Cli) -> Result<Outcome, CliError> {
    let (label, src) = match cli.input_path() {
        Some(path) => {
            let label = path.display().to_string();
            let src = fs::read_to_string(path).map_err(|e| CliError::io(label.clone(), e))?;
            (label, src)
        }
        None => {
            let mut src = String::new();
            io::stdin()
                .read_to_string(&mut src)
                .map_err(|e| CliError::io(STDIN_LABEL, e))?;
            (STDIN_LABEL.to_string(), src)
        }
    };

    order_source(&label, &src, cli.levels)
}

/// Compute the ordering for job list text.
///
/// # Errors
///
/// Returns a [`CliError`] if `src` is malformed or declares an invalid graph.
pub fn order_source(label: &str, src: &str, levels: bool) -> Result<Outcome, CliError> {
    let list = JobList::parse(label, src)?;
    let graph = list.build_graph()?;
    info!(
        source = label,
        jobs = graph.vertex_count(),
        links = graph.edge_count(),
        "Built dependency graph"
    );

    let outcome = if levels {
        Outcome::from(graph.parallel_levels())
    } else {
        Outcome::from(graph.topological_order())
    };

    if outcome == Outcome::Cycle {
        warn!(source = label, "Job list contains a circular dependency");
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHAIN: &str = "a =>\nb => c\nc => f\nd => a\ne => b\nf =>\n";
    const LOOP: &str = "a =>\nb => c\nc => f\nd => a\ne =>\nf => b\n";

    fn order(names: &[&str]) -> Outcome {
        Outcome::Order(names.iter().map(|s| (*s).to_string()).collect())
    }

    #[test]
    fn orders_job_chain() {
        assert_eq!(
            order_source("jobs", CHAIN, false).unwrap(),
            order(&["d", "e", "a", "b", "c", "f"])
        );
    }

    #[test]
    fn reports_cycle() {
        assert_eq!(order_source("jobs", LOOP, false).unwrap(), Outcome::Cycle);
        assert_eq!(order_source("jobs", LOOP, true).unwrap(), Outcome::Cycle);
        assert_eq!(
            order_source("jobs", "a =>\nb =>\nc => c\n", false).unwrap(),
            Outcome::Cycle
        );
    }

    #[test]
    fn groups_levels() {
        let outcome = order_source("jobs", CHAIN, true).unwrap();
        assert_eq!(outcome.to_text(), "d e\na b\nc\nf");
    }

    #[test]
    fn empty_source_has_empty_order() {
        assert_eq!(order_source("jobs", "", false).unwrap(), order(&[]));
    }

    #[test]
    fn errors_are_classified() {
        let err = order_source("jobs", "a\n", false).unwrap_err();
        assert_eq!(err.code(), "parse");

        let err = order_source("jobs", "a => z\n", false).unwrap_err();
        assert_eq!(err.code(), "graph");
    }
}
