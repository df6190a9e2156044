//! Rendering of ordering results for stdout.

use crate::cli::{EXIT_CYCLE, EXIT_OK};
use jobdeps_graph::{CYCLE_MESSAGE, JobOrder, ParallelLevels};
use serde::Serialize;

/// What a run computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A single job order.
    Order(Vec<String>),
    /// Jobs grouped by dependency level.
    Levels(ParallelLevels<String>),
    /// The job list contains a circular dependency.
    Cycle,
}

impl From<JobOrder<String>> for Outcome {
    fn from(order: JobOrder<String>) -> Self {
        match order {
            JobOrder::Ordered(order) => Self::Order(order),
            JobOrder::Cycle => Self::Cycle,
        }
    }
}

impl From<Option<ParallelLevels<String>>> for Outcome {
    fn from(levels: Option<ParallelLevels<String>>) -> Self {
        levels.map_or(Self::Cycle, Self::Levels)
    }
}

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum Envelope<'a> {
    Ok {
        #[serde(skip_serializing_if = "Option::is_none")]
        order: Option<&'a [String]>,
        #[serde(skip_serializing_if = "Option::is_none")]
        levels: Option<&'a [Vec<String>]>,
    },
    Cycle {
        message: &'static str,
    },
}

impl Outcome {
    /// Process exit code for this outcome.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Order(_) | Self::Levels(_) => EXIT_OK,
            Self::Cycle => EXIT_CYCLE,
        }
    }

    /// Plain-text rendering: space-joined jobs, one line per level.
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Self::Order(order) => order.join(" "),
            Self::Levels(levels) => levels
                .iter()
                .map(|level| level.join(" "))
                .collect::<Vec<_>>()
                .join("\n"),
            Self::Cycle => CYCLE_MESSAGE.to_string(),
        }
    }

    /// JSON envelope rendering.
    ///
    /// # Errors
    ///
    /// Propagates serialization failures.
    pub fn to_json(&self) -> serde_json::Result<String> {
        let envelope = match self {
            Self::Order(order) => Envelope::Ok {
                order: Some(order.as_slice()),
                levels: None,
            },
            Self::Levels(levels) => Envelope::Ok {
                order: None,
                levels: Some(levels.as_slice()),
            },
            Self::Cycle => Envelope::Cycle {
                message: CYCLE_MESSAGE,
            },
        };
        serde_json::to_string(&envelope)
    }
}
