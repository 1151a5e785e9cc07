use std::path::{Path, PathBuf};

use crate::{
    constants::{INPUT_SUFFIX, SOURCE_SUFFIX},
    core::domain::{Job, SourceUnit, Target},
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TargetError {
    #[error("expected at least one source file or directory")]
    Empty,
}

fn has_suffix(path: &Path, suffix: &str) -> bool {
    path.to_string_lossy().ends_with(suffix)
}

/// Classifies command-line targets, keeping their order. A source file
/// directly followed by an input file becomes a single run against that
/// input; anything that is not a source file is a directory job.
pub fn plan(targets: &[PathBuf]) -> Result<Vec<Target>, TargetError> {
    if targets.is_empty() {
        return Err(TargetError::Empty);
    }

    let mut planned = Vec::with_capacity(targets.len());
    let mut rest = targets.iter().peekable();

    while let Some(target) = rest.next() {
        if !has_suffix(target, SOURCE_SUFFIX) {
            planned.push(Target::Directory(Job::new(target)));
            continue;
        }

        let unit = SourceUnit::new(target);
        match rest.next_if(|next| has_suffix(next, INPUT_SUFFIX)) {
            Some(input) => planned.push(Target::UnitWithInput {
                unit,
                input: input.clone(),
            }),
            None => planned.push(Target::Unit(unit)),
        }
    }

    Ok(planned)
}
