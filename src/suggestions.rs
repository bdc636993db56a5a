//! # Error Suggestions
//!
//! Helper functions for generating error messages with hints. An error
//! should tell the user what went wrong AND how to fix it; these builders
//! attach the fix.

use std::path::Path;

/// Error for a missing configuration file.
pub fn config_not_found(path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "Configuration file not found: {path}\n\n\
         hint: Run 'legacy-link init' to create a .legacy-link.yaml in your project root\n\
         hint: Use -c/--config to specify a different path\n\
         hint: Set the LEGACY_LINK_CONFIG environment variable",
        path = path.display()
    )
}

/// Error for a `--task` name that matches no configured task.
///
/// Suggests the closest configured name when one is within edit
/// distance 2.
pub fn unknown_task(name: &str, configured: &[&str]) -> anyhow::Error {
    let did_you_mean = find_similar(name, configured)
        .map(|s| format!("\nhint: Did you mean '{s}'?"))
        .unwrap_or_default();

    anyhow::anyhow!(
        "Unknown task: {name}{did_you_mean}\n\n\
         Configured tasks are: {tasks}\n\
         hint: Run 'legacy-link ls' to inspect the configured tasks",
        tasks = configured.join(", ")
    )
}

/// Error for an adopt layer that looks like a typo of the environment.
pub fn unknown_layer(layer: &str, environment: &str) -> anyhow::Error {
    anyhow::anyhow!(
        "Layer '{layer}' matches neither 'common' nor the active environment '{environment}'\n\n\
         hint: Use --layer common or --layer {environment}"
    )
}

/// Find a similar string from a list of candidates using edit distance.
///
/// Returns `Some(candidate)` if a close match is found (edit distance <= 2).
fn find_similar<'a>(input: &str, candidates: &[&'a str]) -> Option<&'a str> {
    candidates
        .iter()
        .filter_map(|&candidate| {
            let distance = edit_distance(input, candidate);
            if distance <= 2 && distance < input.len() {
                Some((candidate, distance))
            } else {
                None
            }
        })
        .min_by_key(|(_, distance)| *distance)
        .map(|(candidate, _)| candidate)
}

/// Levenshtein edit distance between two strings.
fn edit_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let a_len = a_chars.len();
    let b_len = b_chars.len();

    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    let mut matrix = vec![vec![0usize; b_len + 1]; a_len + 1];

    for (i, row) in matrix.iter_mut().enumerate() {
        row[0] = i;
    }
    for (j, cell) in matrix[0].iter_mut().enumerate() {
        *cell = j;
    }

    for i in 1..=a_len {
        for j in 1..=b_len {
            let cost = if a_chars[i - 1] == b_chars[j - 1] {
                0
            } else {
                1
            };
            matrix[i][j] = (matrix[i - 1][j] + 1)
                .min(matrix[i][j - 1] + 1)
                .min(matrix[i - 1][j - 1] + cost);
        }
    }

    matrix[a_len][b_len]
}
