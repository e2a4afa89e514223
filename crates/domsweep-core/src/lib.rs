//! domsweep-core - rule engine for live document trees
//!
//! This crate walks a mutable, externally owned tree and applies structural
//! rules in place: remove, flatten (replace a node with its children), keep
//! with attribute/class filtering, sibling joining, and user supplied per-tag
//! filters. It is generic over the tree through [`HostTree`]; the `domsweep`
//! crate provides an HTML document implementing it.
//!
//! # Decision order
//!
//! ```text
//!            ┌────────────┐  removed/replaced
//! node ────▶ │  filters   │ ────────────────▶ done (replacements re-enter)
//!            └─────┬──────┘
//!                  ▼
//!   remove? ──▶ flatten? ──▶ allow? ──▶ flatten (default)
//!                                │
//!                                └──▶ filter attributes/classes, descend
//! ```
//!
//! Every visit starts with the one-shot `skip` flag of the [`SideTable`].
//!
//! # Example
//!
//! ```rust
//! use domsweep_core::{process_children, HostTree, ProcessingOptions, SideTable};
//!
//! fn keep_paragraphs<T: HostTree>(tree: &mut T, root: T::Id) -> domsweep_core::Result<()> {
//!     let options = ProcessingOptions::new()
//!         .allow_deep(".*", ["p", "b", "i"])
//!         .remove_deep(".*", ["script", "style"])
//!         .remove_empty(true);
//!     process_children(tree, root, &options, &mut SideTable::new())
//! }
//! ```

mod attributes;
mod engine;
mod join;
mod options;
mod pipeline;
pub mod rules;
mod side_table;
pub mod tree;

#[cfg(test)]
mod test_tree;

pub use engine::{process_children, process_node};
pub use options::{OneOrMany, ProcessingOptions, TagSpec, VOID_ELEMENTS};
pub use rules::{CompiledRules, Filter, FilterContext, FilterOutcome, FilterSpec};
pub use side_table::{NodeFlags, SideTable};
pub use tree::{HostTree, NodeKind, TEXT_TAG};

/// Error type for processing runs
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The tree or node handed in cannot be processed
    #[error("Interface contract violated in {operation}: {reason}")]
    InterfaceContract {
        operation: &'static str,
        reason: String,
    },

    /// A filter replaced a node with one of the same tag without declaring
    /// `skip_filters` on the replacement
    #[error("Infinite loop guard: filter `{filter}` replaced a {tag} node with another {tag} node without declaring skip_filters")]
    InfiniteLoop { filter: String, tag: String },

    #[error("Invalid pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
