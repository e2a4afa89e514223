//! Sibling joiner - merges adjacent elements sharing a tag name.

use tracing::trace;

use crate::tree::HostTree;

/// Merge adjacent children of `parent` whose tag satisfies `joins`, until no
/// merge is possible. A single whitespace-only text node between two
/// candidates is moved into the merged node. Returns the number of merges.
pub(crate) fn join_siblings<T: HostTree>(
    tree: &mut T,
    parent: T::Id,
    joins: impl Fn(&str) -> bool,
) -> usize {
    let mut merges = 0;
    while join_once(tree, parent, &joins) {
        merges += 1;
    }
    merges
}

/// One left-to-right scan. Stops at the first merge since it may create new
/// adjacencies earlier in the list.
fn join_once<T: HostTree>(tree: &mut T, parent: T::Id, joins: &impl Fn(&str) -> bool) -> bool {
    let children = tree.children(parent);

    for (i, &node) in children.iter().enumerate() {
        if !tree.is_element(node) {
            continue;
        }
        let tag = tree.match_name(node);
        if !joins(&tag) {
            continue;
        }

        let Some(&next) = children.get(i + 1) else {
            break;
        };
        if same_tag(tree, next, &tag) {
            trace!(%tag, "joining adjacent siblings");
            move_children(tree, next, node);
            tree.detach(next);
            return true;
        }

        if tree.is_whitespace_text(next) {
            if let Some(&after) = children.get(i + 2) {
                if same_tag(tree, after, &tag) {
                    trace!(%tag, "joining siblings across whitespace");
                    tree.append_child(node, next);
                    move_children(tree, after, node);
                    tree.detach(after);
                    return true;
                }
            }
        }
    }

    false
}

fn same_tag<T: HostTree>(tree: &T, node: T::Id, tag: &str) -> bool {
    tree.is_element(node) && tree.match_name(node) == tag
}

fn move_children<T: HostTree>(tree: &mut T, from: T::Id, to: T::Id) {
    for child in tree.children(from) {
        tree.append_child(to, child);
    }
}
