use std::path::{Path, PathBuf};

use itertools::Itertools;
use tokio::fs;

use crate::{
    constants::{EXPECTED_SUFFIX, INPUT_SUFFIX, SOURCE_SUFFIX},
    core::domain::{Fixture, SourceUnit},
};

/// Orders names with a numeric prefix by that number first, so `2.in`
/// comes before `10.in`; everything else follows by plain name.
fn natural_key(name: &str) -> (bool, Option<u64>, &str) {
    let digits = name.len() - name.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    let number = name[..digits].parse().ok();
    (number.is_none(), number, name)
}

/// Regular files directly inside `dir` whose name ends with `suffix`,
/// in natural name order.
async fn entries_with_suffix(dir: &Path, suffix: &str) -> std::io::Result<Vec<(String, PathBuf)>> {
    let mut entries = fs::read_dir(dir).await?;
    let mut found = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.ends_with(suffix) || name.len() == suffix.len() {
            continue;
        }
        if !entry.file_type().await?.is_file() {
            continue;
        }
        found.push((name, entry.path()));
    }

    Ok(found
        .into_iter()
        .sorted_by(|(a, _), (b, _)| natural_key(a).cmp(&natural_key(b)))
        .collect())
}

pub async fn discover_units(dir: &Path) -> std::io::Result<Vec<SourceUnit>> {
    let units = entries_with_suffix(dir, SOURCE_SUFFIX)
        .await?
        .into_iter()
        .map(|(_, path)| SourceUnit::new(path))
        .collect();
    Ok(units)
}

/// Pairs every `<case>.in` with `<case>.out` when the latter exists.
pub async fn discover_fixtures(dir: &Path) -> std::io::Result<Vec<Fixture>> {
    let mut fixtures = Vec::new();

    for (name, input) in entries_with_suffix(dir, INPUT_SUFFIX).await? {
        let base = name.strip_suffix(INPUT_SUFFIX).unwrap_or(&name).to_string();
        let expected = dir.join(format!("{base}{EXPECTED_SUFFIX}"));
        let expected = match fs::metadata(&expected).await {
            Ok(meta) if meta.is_file() => Some(expected),
            _ => None,
        };

        fixtures.push(Fixture {
            name: base,
            input,
            expected,
        });
    }

    Ok(fixtures)
}
