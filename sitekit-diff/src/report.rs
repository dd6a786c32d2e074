//! Classification of diff runs into a per-setting report.

use serde_json::Value;

use sitekit_core::{DiffCounts, DiffKind, DiffPart, SettingDiff, SettingKind};

use crate::json_diff::diff_json;

/// Count added/removed lines, pairing them up as changes.
///
/// `changed = min(added, removed)`; the remainder on either side are genuine
/// additions or removals.
pub fn classify(parts: &[DiffPart]) -> DiffCounts {
    let (mut added, mut removed) = (0, 0);
    for part in parts {
        match part.kind {
            DiffKind::Added => added += part.count,
            DiffKind::Removed => removed += part.count,
            DiffKind::Unchanged => {}
        }
    }
    let changed = added.min(removed);
    DiffCounts {
        added: added - changed,
        removed: removed - changed,
        changed,
    }
}

/// Diff one setting kind's source and destination payloads.
pub fn compare(setting: SettingKind, source: Value, destination: Value) -> SettingDiff {
    let diff = diff_json(&source, &destination);
    let counts = classify(&diff);
    SettingDiff {
        setting,
        diff,
        source_value: source,
        destination_value: destination,
        is_different: counts.is_different(),
        counts,
    }
}
