//! Attribute and class filtering for retained nodes.

use regex::Regex;
use tracing::trace;

use crate::rules::RuleSet;
use crate::tree::HostTree;

const CLASS_ATTRIBUTE: &str = "class";

/// Remove every attribute of `node` not allowed for `tag`. `class` is left to
/// [`retain_classes`].
pub(crate) fn retain_attributes<T: HostTree>(
    tree: &mut T,
    node: T::Id,
    tag: &str,
    allowed: &RuleSet<Regex>,
) {
    for name in tree.attribute_names(node) {
        if name.eq_ignore_ascii_case(CLASS_ATTRIBUTE) || allowed.matches(tag, &name) {
            continue;
        }
        trace!(%tag, attribute = %name, "removing attribute");
        tree.remove_attribute(node, &name);
    }
}

/// Remove every class token of `node` not allowed for `tag`, and the class
/// attribute itself once no token is left.
pub(crate) fn retain_classes<T: HostTree>(
    tree: &mut T,
    node: T::Id,
    tag: &str,
    allowed: &RuleSet<Regex>,
) {
    let has_class_attribute = tree
        .attribute_names(node)
        .iter()
        .any(|name| name.eq_ignore_ascii_case(CLASS_ATTRIBUTE));
    if !has_class_attribute {
        return;
    }

    for token in tree.class_tokens(node) {
        if !allowed.matches(tag, &token) {
            trace!(%tag, class = %token, "removing class");
            tree.remove_class(node, &token);
        }
    }

    if tree.class_tokens(node).is_empty() {
        tree.remove_attribute(node, CLASS_ATTRIBUTE);
    }
}
