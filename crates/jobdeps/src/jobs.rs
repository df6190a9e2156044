//! Job list parsing.
//!
//! A job list declares one job per line:
//!
//! ```text
//! # comment
//! a =>
//! b => c
//! ```
//!
//! `name =>` declares a job with no dependency link, `name => other` links
//! `name` to `other`. Every declared job is registered before any link is
//! recorded, so links may point forward in the file.

use jobdeps_graph::DependencyGraph;
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;
use tracing::debug;

const ARROW: &str = "=>";

/// A single declaration from a job list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSpec {
    /// Job name, left of `=>`.
    pub name: String,
    /// Linked job, right of `=>`, if any.
    pub link: Option<String>,
    /// 1-based line number of the declaration.
    pub line: usize,
}

/// Parsed job list, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobList {
    /// Declarations in file order.
    pub jobs: Vec<JobSpec>,
}

/// What was wrong with a malformed line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    /// The line has no `=>`.
    #[error("expected `name =>` or `name => dependency`")]
    MissingArrow,
    /// Nothing precedes `=>`.
    #[error("missing job name before `=>`")]
    EmptyName,
    /// A job name or link made of more than one token.
    #[error("unexpected token `{token}`")]
    UnexpectedToken {
        /// The offending token.
        token: String,
    },
}

/// A malformed line in a job list.
#[derive(Debug, Error, Diagnostic)]
#[error("Invalid job list at line {line}: {kind}")]
#[diagnostic(
    code(jobdeps::jobs::parse),
    help("Each line must read `name =>` or `name => dependency`")
)]
pub struct ParseError {
    /// 1-based line number.
    pub line: usize,
    /// The problem found on that line.
    pub kind: ParseErrorKind,
    #[source_code]
    src: NamedSource<String>,
    #[label("malformed declaration")]
    span: SourceSpan,
}

/// A job list that parsed but does not form a valid graph.
#[derive(Debug, Error, Diagnostic)]
#[error("Invalid job list at line {line}: {source}")]
#[diagnostic(
    code(jobdeps::jobs::graph),
    help("Declare each job once, and only link to jobs declared on the left of `=>`")
)]
pub struct GraphError {
    /// 1-based line of the offending declaration.
    pub line: usize,
    /// The structural error reported by the graph.
    #[source]
    pub source: jobdeps_graph::Error<String>,
}

impl JobList {
    /// Parse a job list. `name` labels the source in diagnostics.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] pointing at the first malformed line.
    pub fn parse(name: &str, src: &str) -> Result<Self, ParseError> {
        let mut jobs = Vec::new();
        let mut offset = 0;

        for (idx, raw) in src.split_inclusive('\n').enumerate() {
            let line_start = offset;
            offset += raw.len();

            let text = raw.trim_end_matches(['\n', '\r']);
            let trimmed = text.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let fail = |kind: ParseErrorKind, part: &str| ParseError {
                line: idx + 1,
                kind,
                src: NamedSource::new(name, src.to_string()),
                span: span_within(line_start, text, part),
            };

            let Some((lhs, rhs)) = text.split_once(ARROW) else {
                return Err(fail(ParseErrorKind::MissingArrow, text));
            };

            let mut names = lhs.split_whitespace();
            let Some(job) = names.next() else {
                return Err(fail(ParseErrorKind::EmptyName, text));
            };
            if let Some(extra) = names.next() {
                return Err(fail(unexpected(extra), extra));
            }

            let mut links = rhs.split_whitespace();
            let link = links.next();
            if let Some(extra) = links.next() {
                return Err(fail(unexpected(extra), extra));
            }

            jobs.push(JobSpec {
                name: job.to_string(),
                link: link.map(str::to_string),
                line: idx + 1,
            });
        }

        debug!(source = name, jobs = jobs.len(), "Parsed job list");
        Ok(Self { jobs })
    }

    /// Register every job, then record every link.
    ///
    /// # Errors
    ///
    /// Returns a [`GraphError`] for a job declared twice or a link to an
    /// undeclared job.
    pub fn build_graph(&self) -> Result<DependencyGraph<String>, GraphError> {
        let mut graph = DependencyGraph::new();

        for job in &self.jobs {
            graph
                .add_vertex(job.name.clone())
                .map_err(|source| GraphError {
                    line: job.line,
                    source,
                })?;
        }

        for job in &self.jobs {
            graph
                .add_edge(job.name.clone(), job.link.clone())
                .map_err(|source| GraphError {
                    line: job.line,
                    source,
                })?;
        }

        Ok(graph)
    }
}

fn unexpected(token: &str) -> ParseErrorKind {
    ParseErrorKind::UnexpectedToken {
        token: token.to_string(),
    }
}

/// Span of `part`, a subslice of `line`, relative to the whole source.
fn span_within(line_start: usize, line: &str, part: &str) -> SourceSpan {
    let start = part.as_ptr() as usize - line.as_ptr() as usize;
    (line_start + start, part.len()).into()
}
