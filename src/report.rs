//! Rendering of run results for the terminal.
//!
//! The core only records what happened through [`LineKind`]; how a kind is
//! marked (and whether colors are used) is decided here.

use itertools::Itertools;

use crate::core::{
    domain::{LineKind, LogLine, RunResult},
    pipeline::pool::JobReport,
};

const GREEN: &str = "\x1b[0;32m";
const RED: &str = "\x1b[0;31m";
const NC: &str = "\x1b[0m";

pub trait Reporter: Send + Sync {
    fn render_line(&self, line: &LogLine) -> String;

    fn render(&self, result: &RunResult) -> String {
        result.lines.iter().map(|line| self.render_line(line)).join("\n")
    }

    fn render_job(&self, report: &JobReport) -> String {
        match &report.outcome {
            Ok(result) => self.render(result),
            Err(err) => self.render_line(
                &LogLine::new(
                    LineKind::Failed,
                    format!("error for {}", report.job.dir.display()),
                )
                .with_failure(err.clone()),
            ),
        }
    }
}

/// Plain-text reporter with optional ANSI colors.
#[derive(Clone, Copy, Debug)]
pub struct ConsoleReporter {
    color: bool,
}

impl ConsoleReporter {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn mark(&self, color: &str, label: &str) -> String {
        if self.color {
            format!("{color}{label}{NC}")
        } else {
            label.to_string()
        }
    }
}

impl Reporter for ConsoleReporter {
    fn render_line(&self, line: &LogLine) -> String {
        let mut rendered = match line.kind {
            LineKind::Info => line.text.clone(),
            LineKind::Output => line.text.trim_end_matches(['\n', '\r']).to_string(),
            LineKind::Passed => format!("{} {}", self.mark(GREEN, "PASSED"), line.text),
            LineKind::Failed => format!("{} {}", self.mark(RED, "FAILED"), line.text),
            LineKind::CompileFailed => {
                format!("{}: {}", self.mark(RED, "compile failed"), line.text)
            }
        };

        if let Some(failure) = &line.failure {
            rendered.push('\n');
            rendered.push_str(failure.to_string().trim_end());
        }
        rendered
    }
}
