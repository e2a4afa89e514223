//! SweepService - the main entry point for processing documents.

use domsweep_core::{process_children, process_node, ProcessingOptions, Result, SideTable};

use crate::node::{Document, NodeId};

/// Parse `markup`, process it and serialize the result.
///
/// Fragments are parsed into a `body` root and serialized without it. Full
/// documents are processed below their `html` element and serialized with a
/// doctype. `side_table` is keyed by nodes of the freshly parsed document, so
/// it is only useful to filters that flag the nodes they create.
#[cfg(feature = "html")]
pub fn process_markup(
    markup: &str,
    options: &ProcessingOptions<Document>,
    full_document: bool,
    side_table: &mut SideTable<NodeId>,
) -> Result<String> {
    let mut document = if full_document {
        crate::html::parse_html_document(markup)
    } else {
        crate::html::parse_html(markup)
    };
    let root = document.root();

    process_children(&mut document, root, options, side_table)?;

    if full_document {
        Ok(format!("<!DOCTYPE html>{}", document.outer_html(root)))
    } else {
        Ok(document.inner_html(root))
    }
}

/// Holds a set of options and applies them to documents.
pub struct SweepService {
    options: ProcessingOptions<Document>,
}

impl SweepService {
    /// Create a SweepService with empty options (flattens everything)
    pub fn new() -> Self {
        Self {
            options: ProcessingOptions::default(),
        }
    }

    /// Create a SweepService with custom options
    pub fn with_options(options: ProcessingOptions<Document>) -> Self {
        Self { options }
    }

    /// Process the children of `node` in place
    pub fn sweep(
        &self,
        document: &mut Document,
        node: NodeId,
        side_table: &mut SideTable<NodeId>,
    ) -> Result<()> {
        process_children(document, node, &self.options, side_table)
    }

    /// Process `node` itself in place
    pub fn sweep_node(
        &self,
        document: &mut Document,
        node: NodeId,
        side_table: &mut SideTable<NodeId>,
    ) -> Result<()> {
        process_node(document, node, &self.options, side_table)
    }

    /// Process an HTML fragment
    #[cfg(feature = "html")]
    pub fn sweep_html(&self, html: &str) -> Result<String> {
        process_markup(html, &self.options, false, &mut SideTable::new())
    }

    /// Process a full HTML document
    #[cfg(feature = "html")]
    pub fn sweep_html_document(&self, html: &str) -> Result<String> {
        process_markup(html, &self.options, true, &mut SideTable::new())
    }

    /// Get the current options
    pub fn options(&self) -> &ProcessingOptions<Document> {
        &self.options
    }

    /// Get mutable access to options
    pub fn options_mut(&mut self) -> &mut ProcessingOptions<Document> {
        &mut self.options
    }
}

impl Default for SweepService {
    fn default() -> Self {
        Self::new()
    }
}
