//! Structural JSON diff.
//!
//! Both values are rendered canonically (object keys sorted, two-space
//! indent, one token per line) and compared line by line with Myers'
//! algorithm. A trailing comma never makes two lines differ, so appending a
//! key does not mark its predecessor as changed.

use serde_json::Value;
use similar::{capture_diff_slices, Algorithm, DiffTag};

use sitekit_core::{DiffKind, DiffPart};

use crate::abbreviate;

/// Pretty-printed JSON with object keys in sorted order at every depth.
pub fn canonical_json(value: &Value) -> String {
    let sorted = sort_keys(value);
    serde_json::to_string_pretty(&sorted).unwrap_or_else(|_| sorted.to_string())
}

/// Diff `source` against `destination`.
///
/// Lines only in `source` are [`DiffKind::Removed`], lines only in
/// `destination` are [`DiffKind::Added`]. Every part carries its line count
/// and, when it is long, an abbreviated rendering.
pub fn diff_json(source: &Value, destination: &Value) -> Vec<DiffPart> {
    let old_text = canonical_json(source);
    let new_text = canonical_json(destination);
    let old_lines: Vec<&str> = old_text.lines().collect();
    let new_lines: Vec<&str> = new_text.lines().collect();
    let old_keys: Vec<&str> = old_lines.iter().map(|l| comparison_key(l)).collect();
    let new_keys: Vec<&str> = new_lines.iter().map(|l| comparison_key(l)).collect();

    let mut runs = Runs::default();
    for op in capture_diff_slices(Algorithm::Myers, &old_keys, &new_keys) {
        let (tag, old_range, new_range) = op.as_tag_tuple();
        match tag {
            DiffTag::Equal => runs.push(DiffKind::Unchanged, &old_lines[old_range]),
            DiffTag::Delete => runs.push(DiffKind::Removed, &old_lines[old_range]),
            DiffTag::Insert => runs.push(DiffKind::Added, &new_lines[new_range]),
            DiffTag::Replace => {
                runs.push(DiffKind::Removed, &old_lines[old_range]);
                runs.push(DiffKind::Added, &new_lines[new_range]);
            }
        }
    }
    runs.finish()
}

fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key.clone(), sort_keys(value)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}

fn comparison_key(line: &str) -> &str {
    line.strip_suffix(',').unwrap_or(line)
}

/// Accumulates lines into maximal same-kind runs.
#[derive(Default)]
struct Runs {
    parts: Vec<(DiffKind, Vec<String>)>,
}

impl Runs {
    fn push(&mut self, kind: DiffKind, lines: &[&str]) {
        if lines.is_empty() {
            return;
        }
        let owned = lines.iter().map(|l| (*l).to_string());
        match self.parts.last_mut() {
            Some((last, buf)) if *last == kind => buf.extend(owned),
            _ => self.parts.push((kind, owned.collect())),
        }
    }

    fn finish(self) -> Vec<DiffPart> {
        self.parts
            .into_iter()
            .map(|(kind, lines)| abbreviate::part(kind, lines.len(), &lines.join("\n")))
            .collect()
    }
}
