//! Display shortening for long diff runs.
//!
//! Every run's text ends with exactly one `\n` and has no leading or trailing
//! blank lines. Runs longer than their kind's threshold also get an
//! abbreviation: the head cut back to a line break, an ellipsis line, and the
//! tail cut forward to a line break. The full text is always kept.

use sitekit_core::{DiffKind, DiffPart};

/// Threshold, in characters, for added and removed runs.
pub const CHANGED_THRESHOLD: usize = 1000;

/// Threshold, in characters, for unchanged runs. Context gets less room.
pub const UNCHANGED_THRESHOLD: usize = 300;

const MARKER: &str = "\r\n...\r\n";
const TERMINATOR: &str = "\r\n";

pub fn threshold(kind: DiffKind) -> usize {
    match kind {
        DiffKind::Added | DiffKind::Removed => CHANGED_THRESHOLD,
        DiffKind::Unchanged => UNCHANGED_THRESHOLD,
    }
}

/// Build a [`DiffPart`] from raw run text.
pub fn part(kind: DiffKind, count: usize, raw: &str) -> DiffPart {
    let value = normalize(raw);
    let abbreviated_value = abbreviate(&value, threshold(kind));
    DiffPart {
        kind,
        count,
        value,
        abbreviated_value,
    }
}

/// Strip boundary CR/LF and terminate with a single `\n`.
pub fn normalize(text: &str) -> String {
    format!("{}\n", trim_breaks(text))
}

/// Shortened rendering of `value`, or `None` when it fits within `threshold`.
///
/// Each half gets the threshold's share minus the marker, so the result is
/// always shorter than `value`. Cuts land on line breaks; a half with no line
/// break contributes nothing.
pub fn abbreviate(value: &str, threshold: usize) -> Option<String> {
    let len = value.chars().count();
    if len <= threshold {
        return None;
    }

    let overhead = MARKER.len() + TERMINATOR.len();
    let half = threshold.saturating_sub(overhead) / 2;
    let head = &value[..byte_offset(value, half)];
    let tail = &value[byte_offset(value, len - half)..];

    let head = head.rfind('\n').map_or("", |i| &head[..i]);
    let tail = tail.find('\n').map_or("", |i| &tail[i..]);

    Some(format!(
        "{}{MARKER}{}{TERMINATOR}",
        trim_breaks(head),
        trim_breaks(tail)
    ))
}

fn trim_breaks(text: &str) -> &str {
    text.trim_matches(|c| c == '\r' || c == '\n')
}

/// Byte index of the `n`th char, or the end of the string.
fn byte_offset(s: &str, n: usize) -> usize {
    s.char_indices().nth(n).map_or(s.len(), |(i, _)| i)
}
