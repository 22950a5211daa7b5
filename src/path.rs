//! Pure helpers over hierarchical panel paths.
//!
//! Paths are compared segment by segment, so `"a/bc"` is not a child of
//! `"a/b"` even though it shares a string prefix.

use crate::types::PanelPath;

/// Split a path into its non-empty segments.
///
/// Double slashes and stray leading/trailing slashes collapse away.
#[inline]
pub fn split_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// True when `prefix`'s segments are a leading run of `full`'s segments.
///
/// Equal paths count as a prefix; the root is a prefix of everything.
pub fn is_segment_prefix(prefix: &str, full: &str) -> bool {
    let p = split_segments(prefix);
    let f = split_segments(full);
    p.len() <= f.len() && p.iter().zip(f.iter()).all(|(a, b)| a == b)
}

/// Every ancestor-or-self prefix of `path`, shallowest first.
///
/// `"a/b/c"` yields `["a", "a/b", "a/b/c"]`; the root yields `[""]`.
pub fn build_stack_from_path(path: &PanelPath) -> Vec<PanelPath> {
    let segs = path.segments();
    if segs.is_empty() {
        return vec![PanelPath::root()];
    }
    (1..=segs.len())
        .map(|n| PanelPath::from_canonical(segs[..n].join("/")))
        .collect()
}

/// Immediate parent; top-level panels have the root as parent.
pub fn parent(path: &PanelPath) -> Option<PanelPath> {
    let segs = path.segments();
    if segs.is_empty() {
        return None;
    }
    Some(PanelPath::from_canonical(segs[..segs.len() - 1].join("/")))
}
