//! Panel-to-panel transition classification.
//!
//! The renderer picks the slide direction from this. Feed it the panel of the
//! previous render and the panel just observed, never a cached or debounced
//! value.

use crate::path::is_segment_prefix;
use serde::Serialize;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionKind {
    /// Toward an ancestor: content slides right.
    Back,
    /// Toward a descendant: content slides left.
    Forward,
    /// Sibling or unrelated subtree.
    Fade,
    None,
}

impl fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransitionKind::Back => "back",
            TransitionKind::Forward => "forward",
            TransitionKind::Fade => "fade",
            TransitionKind::None => "none",
        };
        f.write_str(s)
    }
}

/// Classify the move from `prev` to `next`.
pub fn determine_transition(prev: Option<&str>, next: Option<&str>) -> TransitionKind {
    let (Some(prev), Some(next)) = (prev, next) else {
        return TransitionKind::None;
    };
    if prev == next {
        return TransitionKind::None;
    }
    if is_segment_prefix(next, prev) {
        TransitionKind::Back
    } else if is_segment_prefix(prev, next) {
        TransitionKind::Forward
    } else {
        TransitionKind::Fade
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(a: &str, b: &str) -> TransitionKind {
        determine_transition(Some(a), Some(b))
    }

    #[test]
    fn test_absent_side_is_none() {
        assert_eq!(determine_transition(None, Some("a")), TransitionKind::None);
        assert_eq!(determine_transition(Some("a"), None), TransitionKind::None);
        assert_eq!(determine_transition(None, None), TransitionKind::None);
    }

    #[test]
    fn test_same_path_is_none() {
        for p in ["", "a", "a/b"] {
            assert_eq!(t(p, p), TransitionKind::None);
        }
    }

    #[test]
    fn test_child_parent_directions() {
        assert_eq!(t("a", "a/b"), TransitionKind::Forward);
        assert_eq!(t("a/b", "a"), TransitionKind::Back);
        assert_eq!(t("", "a/b"), TransitionKind::Forward);
        assert_eq!(t("a/b", ""), TransitionKind::Back);
    }

    #[test]
    fn test_back_forward_antisymmetry() {
        let pairs = [("a/b", "a"), ("a/b/c", ""), ("x/y", "x")];
        for (a, b) in pairs {
            assert_eq!(t(a, b), TransitionKind::Back);
            assert_eq!(t(b, a), TransitionKind::Forward);
        }
    }

    #[test]
    fn test_siblings_fade() {
        assert_eq!(t("a/b", "d"), TransitionKind::Fade);
        assert_eq!(t("a/b", "a/c"), TransitionKind::Fade);
        assert_eq!(t("a/b", "a/bc"), TransitionKind::Fade);
    }
}
