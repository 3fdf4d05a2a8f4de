//! Indented tree drawing used by the maps' `Display` implementations.
//!
//! ```text
//! 7: g
//! ├─ 5: e
//! │  ├─ 4: d
//! │  │  ├─ 3: c
//! │  │  └─ ∅
//! │  └─ 6: f
//! └─ 8: h
//!    ├─ ∅
//!    └─ 9: i
//! ```

use std::fmt;

use super::traversal::BinaryNode;

const EMPTY: &str = "∅";

/// Draws the subtree rooted at `root`, one node per line.
///
/// `label` writes a single node's label. A node with exactly one child
/// draws the missing side as `∅` so left and right stay distinguishable.
pub(crate) fn render_tree<N, F>(
    formatter: &mut fmt::Formatter<'_>,
    root: Option<&N>,
    label: F,
) -> fmt::Result
where
    N: BinaryNode,
    F: Fn(&N, &mut fmt::Formatter<'_>) -> fmt::Result,
{
    match root {
        None => formatter.write_str(EMPTY),
        Some(node) => {
            label(node, formatter)?;
            render_children(formatter, node, "", &label)
        }
    }
}

fn render_children<N, F>(
    formatter: &mut fmt::Formatter<'_>,
    node: &N,
    prefix: &str,
    label: &F,
) -> fmt::Result
where
    N: BinaryNode,
    F: Fn(&N, &mut fmt::Formatter<'_>) -> fmt::Result,
{
    if node.left().is_none() && node.right().is_none() {
        return Ok(());
    }

    for (index, child) in [node.left(), node.right()].into_iter().enumerate() {
        let is_last = index == 1;
        let branch = if is_last { "└─ " } else { "├─ " };
        write!(formatter, "\n{prefix}{branch}")?;
        match child {
            None => formatter.write_str(EMPTY)?,
            Some(child) => {
                label(child, formatter)?;
                let guide = if is_last { "   " } else { "│  " };
                render_children(formatter, child, &format!("{prefix}{guide}"), label)?;
            }
        }
    }
    Ok(())
}
