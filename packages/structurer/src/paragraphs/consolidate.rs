//! Merges positioned lines into paragraph fragments.

use super::markers::{detect_marker, is_wrap, Marker};
use crate::config::LayoutThresholds;
use crate::types::LayoutLine;

/// Consecutive lines that form one paragraph.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    /// Indentation of the first line.
    pub x: f32,
    pub marker: Option<Marker>,
    pub lines: Vec<LayoutLine>,
}

impl Fragment {
    fn start(line: &LayoutLine, marker: Option<Marker>) -> Self {
        Self {
            x: line.x,
            marker,
            lines: vec![line.clone()],
        }
    }

    /// Joined text of all lines, including any marker.
    #[must_use]
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|l| l.text.trim())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Joined text with the leading marker removed.
    #[must_use]
    pub fn content(&self) -> String {
        let text = self.text();
        match &self.marker {
            Some(marker) => text
                .trim_start()
                .get(marker.len..)
                .unwrap_or_default()
                .trim()
                .to_string(),
            None => text,
        }
    }
}

/// Group lines into fragments.
///
/// A marker always starts a fragment. Otherwise a line joins the current
/// fragment when it is indented past the fragment's start or wraps; after a
/// vertical gap at or above the threshold only a wrap joins. A page change
/// counts as a small gap.
#[must_use]
pub fn consolidate(lines: &[LayoutLine], thresholds: &LayoutThresholds) -> Vec<Fragment> {
    let mut fragments: Vec<Fragment> = Vec::new();
    let mut previous: Option<&LayoutLine> = None;

    for line in lines {
        let marker = detect_marker(&line.text, thresholds.numbered_item_max);
        let joins = match (fragments.last(), previous, &marker) {
            (Some(fragment), Some(prev), None) => {
                let gap = if line.page == prev.page {
                    line.y - prev.y
                } else {
                    0.0
                };
                let wraps = is_wrap(&line.text);
                if gap >= thresholds.vertical_gap_threshold {
                    wraps
                } else {
                    wraps || line.x > fragment.x + thresholds.indent_tolerance
                }
            }
            _ => false,
        };

        match fragments.last_mut() {
            Some(fragment) if joins => fragment.lines.push(line.clone()),
            _ => fragments.push(Fragment::start(line, marker)),
        }
        previous = Some(line);
    }
    fragments
}
