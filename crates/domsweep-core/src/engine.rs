//! Decision engine - the per-node state machine and child-list processing.

use tracing::{debug, trace};

use crate::join::join_siblings;
use crate::options::ProcessingOptions;
use crate::pipeline::Filtered;
use crate::rules::CompiledRules;
use crate::side_table::SideTable;
use crate::tree::HostTree;
use crate::{attributes, Error, Result};

/// Tag of the transient container children are parked in while a node is flattened
const HOLDING_TAG: &str = "div";

/// Process `node` and, depending on the rules, its subtree.
///
/// The node's parent (if any) is the processing root: direct rules match
/// against it and deep rules see only it.
pub fn process_node<T: HostTree>(
    tree: &mut T,
    node: T::Id,
    options: &ProcessingOptions<T>,
    side_table: &mut SideTable<T::Id>,
) -> Result<()> {
    ensure_live(tree, node, "process_node")?;
    let rules = CompiledRules::compile(options)?;

    let mut engine = Engine::new(tree, rules, side_table);
    let parent = engine.tree.parent(node);
    let index = match parent {
        Some(parent) => {
            let tag = engine.tree.match_name(parent);
            engine.ancestors.push(parent, tag);
            engine
                .tree
                .children(parent)
                .iter()
                .position(|child| *child == node)
                .unwrap_or(0)
        }
        None => 0,
    };
    engine.tasks.push(Task::Visit {
        node,
        index,
        parent,
    });
    engine.run()
}

/// Process every child of `node`; `node` itself is the processing root and is
/// left in place.
pub fn process_children<T: HostTree>(
    tree: &mut T,
    node: T::Id,
    options: &ProcessingOptions<T>,
    side_table: &mut SideTable<T::Id>,
) -> Result<()> {
    ensure_live(tree, node, "process_children")?;
    if tree.is_text(node) {
        return Err(Error::InterfaceContract {
            operation: "process_children",
            reason: "text nodes have no children to traverse".to_string(),
        });
    }
    let rules = CompiledRules::compile(options)?;

    let mut engine = Engine::new(tree, rules, side_table);
    let tag = engine.tree.match_name(node);
    engine.ancestors.push(node, tag);
    engine.schedule_child_list(node);
    engine.run()
}

fn ensure_live<T: HostTree>(tree: &T, node: T::Id, operation: &'static str) -> Result<()> {
    if tree.contains(node) {
        Ok(())
    } else {
        Err(Error::InterfaceContract {
            operation,
            reason: format!("node {:?} does not belong to the tree", node),
        })
    }
}

/// Ancestor chain from the processing root down to the current parent.
/// Nodes and tag names always move together.
#[derive(Debug)]
pub(crate) struct Ancestors<Id> {
    nodes: Vec<Id>,
    tags: Vec<String>,
}

impl<Id> Ancestors<Id> {
    fn new() -> Self {
        Self {
            nodes: Vec::new(),
            tags: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, node: Id, tag: String) {
        self.nodes.push(node);
        self.tags.push(tag);
    }

    pub(crate) fn pop(&mut self) {
        self.nodes.pop();
        self.tags.pop();
    }

    pub(crate) fn nodes(&self) -> &[Id] {
        &self.nodes
    }

    pub(crate) fn tags(&self) -> &[String] {
        &self.tags
    }
}

/// Pending work of a run, popped from the back of [`Engine::tasks`].
///
/// A subtree's tasks are always pushed above whatever follows it, so nodes
/// are finished depth first and in document order without recursion.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Task<Id> {
    /// Decide the fate of `node`. Skipped when its parent is no longer
    /// `parent`, i.e. an earlier filter moved or removed it.
    Visit {
        node: Id,
        index: usize,
        parent: Option<Id>,
    },
    /// Every child of the node has been visited: prune empties, join siblings
    FinishChildList(Id),
    /// Leave the subtree of the innermost kept node
    PopAncestor,
    /// Move the processed children of `holder` to where `node` is, drop `node`
    FinishFlatten { node: Id, holder: Id, parent: Id },
}

/// State of one processing run.
pub(crate) struct Engine<'a, T: HostTree> {
    pub(crate) tree: &'a mut T,
    pub(crate) rules: CompiledRules<'a, T>,
    pub(crate) side_table: &'a mut SideTable<T::Id>,
    pub(crate) ancestors: Ancestors<T::Id>,
    pub(crate) tasks: Vec<Task<T::Id>>,
    /// Empty holding containers ready for reuse
    holders: Vec<T::Id>,
}

impl<'a, T: HostTree> Engine<'a, T> {
    fn new(
        tree: &'a mut T,
        rules: CompiledRules<'a, T>,
        side_table: &'a mut SideTable<T::Id>,
    ) -> Self {
        Self {
            tree,
            rules,
            side_table,
            ancestors: Ancestors::new(),
            tasks: Vec::new(),
            holders: Vec::new(),
        }
    }

    fn run(&mut self) -> Result<()> {
        while let Some(task) = self.tasks.pop() {
            match task {
                Task::Visit {
                    node,
                    index,
                    parent,
                } => {
                    if self.tree.parent(node) != parent {
                        trace!(?node, "node left its parent before being visited");
                        continue;
                    }
                    self.visit(node, index)?;
                }
                Task::FinishChildList(parent) => self.finish_child_list(parent),
                Task::PopAncestor => self.ancestors.pop(),
                Task::FinishFlatten {
                    node,
                    holder,
                    parent,
                } => self.finish_flatten(node, holder, parent),
            }
        }
        Ok(())
    }

    /// Decide the fate of one node. `index` is its position among its siblings.
    fn visit(&mut self, node: T::Id, index: usize) -> Result<()> {
        if self.side_table.take_skip(node) {
            trace!(?node, "skip flag set, leaving subtree untouched");
            return Ok(());
        }

        let tag = self.tree.match_name(node);
        if self.run_filters(node, &tag, index)? == Filtered::Replaced {
            return Ok(());
        }

        if self.tree.is_text(node) {
            return Ok(());
        }

        let tags = self.ancestors.tags();
        if self.rules.should_remove(tags, &tag) {
            debug!(%tag, "removing node");
            self.tree.detach(node);
        } else if self.rules.should_flatten(tags, &tag) {
            debug!(%tag, "flattening node");
            self.flatten(node);
        } else if self.rules.should_allow(tags, &tag) {
            trace!(%tag, "keeping node");
            self.retain(node, tag);
        } else {
            trace!(%tag, "no rule matched, flattening node");
            self.flatten(node);
        }

        Ok(())
    }

    /// Keep `node`: strip disallowed attributes and classes, then descend.
    fn retain(&mut self, node: T::Id, tag: String) {
        if !self.side_table.take_skip_attributes(node) {
            attributes::retain_attributes(&mut *self.tree, node, &tag, &self.rules.allow_attributes);
        }
        if !self.side_table.take_skip_classes(node) {
            attributes::retain_classes(&mut *self.tree, node, &tag, &self.rules.allow_classes);
        }

        self.ancestors.push(node, tag);
        self.tasks.push(Task::PopAncestor);
        self.schedule_child_list(node);
    }

    /// Replace `node` with its processed children.
    ///
    /// Children are parked in a detached holding container and processed there
    /// under the current ancestor context, so they never see `node` as a parent.
    fn flatten(&mut self, node: T::Id) {
        let Some(parent) = self.tree.parent(node) else {
            // Nowhere to move the children to: process them where they are.
            self.schedule_child_list(node);
            return;
        };

        let holder = self.acquire_holder();
        for child in self.tree.children(node) {
            self.tree.append_child(holder, child);
        }

        self.tasks.push(Task::FinishFlatten {
            node,
            holder,
            parent,
        });
        self.schedule_child_list(holder);
    }

    fn finish_flatten(&mut self, node: T::Id, holder: T::Id, parent: T::Id) {
        for child in self.tree.children(holder) {
            self.tree.insert_before(parent, child, node);
        }
        self.tree.detach(node);
        self.holders.push(holder);
    }

    /// Holders are created on demand and returned once their flatten is done,
    /// so a run allocates at most one per level of nested flattening.
    fn acquire_holder(&mut self) -> T::Id {
        match self.holders.pop() {
            Some(holder) => holder,
            None => self.tree.create_element(HOLDING_TAG),
        }
    }

    /// Queue a snapshot of `parent`'s children, followed by the pruning and
    /// joining of the list.
    fn schedule_child_list(&mut self, parent: T::Id) {
        self.tasks.push(Task::FinishChildList(parent));
        let children = self.tree.children(parent);
        for (index, child) in children.into_iter().enumerate().rev() {
            self.tasks.push(Task::Visit {
                node: child,
                index,
                parent: Some(parent),
            });
        }
    }

    fn finish_child_list(&mut self, parent: T::Id) {
        if self.rules.remove_empty {
            self.remove_empty_children(parent);
        }

        if !self.rules.join_siblings.is_empty() {
            let rules = &self.rules;
            join_siblings(&mut *self.tree, parent, |tag| rules.joins(tag));
        }
    }

    fn remove_empty_children(&mut self, parent: T::Id) {
        for child in self.tree.children(parent) {
            if !self.tree.is_element(child) || !self.tree.children(child).is_empty() {
                continue;
            }
            let tag = self.tree.match_name(child);
            if !self.rules.allows_empty(&tag) {
                debug!(%tag, "removing empty node");
                self.tree.detach(child);
            }
        }
    }
}
