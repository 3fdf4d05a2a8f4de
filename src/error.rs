//! Error types reported by the tree diagnostics.
//!
//! Lookups, removals and order-statistics queries never fail: a missing
//! key, an empty tree or an out-of-range rank is an absent result
//! (`None`). The only error path in this crate is the diagnostic
//! `verify` pass, which reports every broken structural invariant it
//! finds instead of stopping at the first one.
//!
//! Nodes are identified by their in-order position so that violations can
//! be reported without requiring `K: Debug`.

use thiserror::Error;

/// A single broken invariant found by `verify`.
///
/// # Examples
///
/// ```rust
/// use balanced_forest::error::Violation;
///
/// let violation = Violation::Unbalanced { position: 2, factor: 2 };
/// assert_eq!(
///     violation.to_string(),
///     "node at in-order position 2 has balance factor 2"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    /// Keys are not strictly ascending in in-order position.
    #[error("key at in-order position {position} is not greater than its predecessor")]
    Unordered {
        /// In-order position of the offending key.
        position: usize,
    },

    /// The tree's entry counter disagrees with the number of nodes.
    #[error("tree reports {reported} entries but holds {actual} nodes")]
    SizeMismatch {
        /// The value of the tree's length counter.
        reported: usize,
        /// The number of nodes reachable from the root.
        actual: usize,
    },

    /// AVL: the heights of a node's subtrees differ by more than one.
    #[error("node at in-order position {position} has balance factor {factor}")]
    Unbalanced {
        /// In-order position of the node.
        position: usize,
        /// `height(left) - height(right)`.
        factor: isize,
    },

    /// AVL: a node's cached height does not match its subtrees.
    #[error(
        "node at in-order position {position} caches height {stored} but its subtree has height {computed}"
    )]
    StaleHeight {
        /// In-order position of the node.
        position: usize,
        /// The cached height.
        stored: usize,
        /// The height recomputed from the children.
        computed: usize,
    },

    /// Red-black: a node's cached subtree count does not match its subtrees.
    #[error(
        "node at in-order position {position} caches count {stored} but its subtree holds {computed} nodes"
    )]
    StaleCount {
        /// In-order position of the node.
        position: usize,
        /// The cached count.
        stored: usize,
        /// The count recomputed from the children.
        computed: usize,
    },

    /// Red-black: `rank` and `select` disagree.
    #[error("rank and select disagree at rank {rank}")]
    RankMismatch {
        /// The rank at which the round trip failed.
        rank: usize,
    },

    /// Red-black: a red link leans right.
    #[error("node at in-order position {position} has a red right link")]
    RedRightLink {
        /// In-order position of the parent node.
        position: usize,
    },

    /// Red-black: two red links in a row.
    #[error("red node at in-order position {position} has a red left child")]
    ConsecutiveRedLinks {
        /// In-order position of the upper red node.
        position: usize,
    },

    /// Red-black: the two subtrees of a node cross a different number of black links.
    #[error(
        "subtrees of in-order position {position} have black heights {left} and {right}"
    )]
    BlackHeightMismatch {
        /// In-order position of the node.
        position: usize,
        /// Black links from the node down its left subtree.
        left: usize,
        /// Black links from the node down its right subtree.
        right: usize,
    },

    /// Red-black: the root is red.
    #[error("root is red")]
    RedRoot,
}

/// The result of a failed `verify` pass: every violation that was found.
///
/// # Examples
///
/// ```rust
/// use balanced_forest::error::{InvariantError, Violation};
///
/// let error = InvariantError::new(vec![Violation::RedRoot]);
/// assert_eq!(error.to_string(), "1 invariant violation(s), first: root is red");
/// assert_eq!(error.violations(), &[Violation::RedRoot]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} invariant violation(s), first: {}", .violations.len(), first_or_none(.violations))]
pub struct InvariantError {
    violations: Vec<Violation>,
}

impl InvariantError {
    /// Wraps the violations found by a diagnostic pass.
    #[must_use]
    pub const fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    /// Returns every violation, in the order the checks found them.
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Consumes the error and returns the violations.
    #[must_use]
    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }

    /// Converts the outcome of a diagnostic pass into a `Result`.
    pub(crate) fn check(violations: Vec<Violation>) -> Result<(), Self> {
        if violations.is_empty() {
            Ok(())
        } else {
            tracing::debug!(
                violations = violations.len(),
                first = %violations[0],
                "tree failed invariant verification"
            );
            Err(Self::new(violations))
        }
    }
}

fn first_or_none(violations: &[Violation]) -> String {
    violations
        .first()
        .map_or_else(|| "none".to_string(), ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_check_empty_is_ok() {
        assert_eq!(InvariantError::check(Vec::new()), Ok(()));
    }

    #[rstest]
    fn test_check_keeps_every_violation() {
        let violations = vec![
            Violation::RedRoot,
            Violation::SizeMismatch {
                reported: 3,
                actual: 2,
            },
        ];
        let error = InvariantError::check(violations.clone()).unwrap_err();
        assert_eq!(error.into_violations(), violations);
    }

    #[rstest]
    #[case(Violation::Unordered { position: 4 }, "key at in-order position 4 is not greater than its predecessor")]
    #[case(Violation::RedRightLink { position: 0 }, "node at in-order position 0 has a red right link")]
    #[case(
        Violation::BlackHeightMismatch { position: 5, left: 2, right: 1 },
        "subtrees of in-order position 5 have black heights 2 and 1"
    )]
    fn test_violation_display(#[case] violation: Violation, #[case] expected: &str) {
        assert_eq!(violation.to_string(), expected);
    }

    #[rstest]
    fn test_empty_error_display() {
        let error = InvariantError::new(Vec::new());
        assert_eq!(error.to_string(), "0 invariant violation(s), first: none");
    }
}
