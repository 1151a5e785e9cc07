use std::fmt;
use std::path::{Path, PathBuf};

use crate::core::{
    comparator::Mismatch,
    errors::{ExecutionError, HarnessError},
    traits::compiler::CompileError,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceUnit {
    pub path: PathBuf,
}

impl SourceUnit {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Directory holding the unit and its fixtures.
    pub fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fixture {
    /// Base name shared by the input and expected-output files.
    pub name: String,
    pub input: PathBuf,
    pub expected: Option<PathBuf>,
}

impl Fixture {
    pub fn input_name(&self) -> String {
        self.input
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.name.clone())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Job {
    pub dir: PathBuf,
}

impl Job {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

/// One positional command-line target after classification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    Unit(SourceUnit),
    UnitWithInput { unit: SourceUnit, input: PathBuf },
    Directory(Job),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineKind {
    Info,
    Passed,
    Failed,
    CompileFailed,
    /// Raw program output shown without scoring.
    Output,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Failure {
    Compile(CompileError),
    Execution(ExecutionError),
    Mismatch(Mismatch),
    Harness(HarnessError),
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::Compile(err) => write!(f, "{err}"),
            Failure::Execution(err) => write!(f, "{err}"),
            Failure::Mismatch(mismatch) => write!(f, "{mismatch}"),
            Failure::Harness(err) => write!(f, "{err}"),
        }
    }
}

impl From<CompileError> for Failure {
    fn from(err: CompileError) -> Self {
        Failure::Compile(err)
    }
}

impl From<ExecutionError> for Failure {
    fn from(err: ExecutionError) -> Self {
        Failure::Execution(err)
    }
}

impl From<Mismatch> for Failure {
    fn from(mismatch: Mismatch) -> Self {
        Failure::Mismatch(mismatch)
    }
}

impl From<HarnessError> for Failure {
    fn from(err: HarnessError) -> Self {
        match err {
            HarnessError::Compile(err) => Failure::Compile(err),
            HarnessError::Execution(err) => Failure::Execution(err),
            other => Failure::Harness(other),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogLine {
    pub kind: LineKind,
    pub text: String,
    pub failure: Option<Failure>,
}

impl LogLine {
    pub fn new(kind: LineKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            failure: None,
        }
    }

    pub fn with_failure(mut self, failure: impl Into<Failure>) -> Self {
        self.failure = Some(failure.into());
        self
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.kind, LineKind::Failed | LineKind::CompileFailed)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunResult {
    pub lines: Vec<LogLine>,
    pub compiled: bool,
    pub tests_passed: usize,
    pub tests_failed: usize,
}

impl RunResult {
    pub fn push(&mut self, kind: LineKind, text: impl Into<String>) {
        self.lines.push(LogLine::new(kind, text));
    }

    pub fn push_failure(&mut self, kind: LineKind, text: impl Into<String>, failure: impl Into<Failure>) {
        self.lines.push(LogLine::new(kind, text).with_failure(failure));
    }

    /// True when anything went wrong: a compile error, a failed fixture or
    /// an execution error logged along the way.
    pub fn is_failure(&self) -> bool {
        !self.compiled || self.tests_failed > 0 || self.lines.iter().any(LogLine::is_failure)
    }

    pub fn compile_failure(&self) -> Option<&LogLine> {
        self.lines
            .iter()
            .find(|line| line.kind == LineKind::CompileFailed && line.failure.is_some())
    }
}
