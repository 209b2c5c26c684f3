use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tracing::{error, info};

/// Read one identifier per line, trimmed, skipping blank lines. Order and duplicates are kept.
pub fn read_ids(path: &Path) -> std::io::Result<Vec<String>> {
    let content = fs::read_to_string(path).map_err(|e| {
        error!(error = ?e, path = %path.display(), "Failed to read identifier file");
        e
    })?;
    let ids: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();
    info!(path = %path.display(), count = ids.len(), "Read identifiers");
    Ok(ids)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListComparison {
    /// Distinct identifiers in the first list.
    pub first_total: usize,
    /// Distinct identifiers in the second list.
    pub second_total: usize,
    /// In the first list but not in the second, sorted.
    pub missing: Vec<String>,
}

pub fn compare_id_lists(first: &[String], second: &[String]) -> ListComparison {
    let first: BTreeSet<&str> = first.iter().map(String::as_str).collect();
    let second: BTreeSet<&str> = second.iter().map(String::as_str).collect();
    ListComparison {
        first_total: first.len(),
        second_total: second.len(),
        missing: first
            .difference(&second)
            .map(|id| id.to_string())
            .collect(),
    }
}

pub fn compare_id_files(first: &Path, second: &Path) -> std::io::Result<ListComparison> {
    let comparison = compare_id_lists(&read_ids(first)?, &read_ids(second)?);
    info!(
        first_total = comparison.first_total,
        second_total = comparison.second_total,
        missing = comparison.missing.len(),
        "Compared identifier lists"
    );
    Ok(comparison)
}
