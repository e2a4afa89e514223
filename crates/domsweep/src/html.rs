//! HTML parsing support.
//!
//! Markup is parsed with scraper (html5ever) and copied into a [`Document`].
//! Parsing never fetches external resources; comments and processing
//! instructions are dropped.

use scraper::{ElementRef, Html, Node as ScraperNode};
use tracing::debug;

use crate::node::{Document, NodeId};

/// Parse an HTML fragment. The fragment's nodes become children of the
/// document's `body` root.
///
/// # Example
///
/// ```rust
/// use domsweep::parse_html;
///
/// let doc = parse_html("<h1>Hello <em>World</em></h1>");
/// assert_eq!(doc.inner_html(doc.root()), "<h1>Hello <em>World</em></h1>");
/// ```
pub fn parse_html(html: &str) -> Document {
    let fragment = Html::parse_fragment(html);
    let mut document = Document::new();
    let root = document.root();
    copy_children(fragment.root_element(), &mut document, root);

    debug!("Parsed fragment into {} nodes", document.len());
    document
}

/// Parse a full HTML document. The document's root is the `html` element.
pub fn parse_html_document(html: &str) -> Document {
    let parsed = Html::parse_document(html);
    let html_element = parsed.root_element();

    let mut document = Document::with_root(html_element.value().name());
    let root = document.root();
    for (name, value) in html_element.value().attrs() {
        document.set_attribute(root, name, value);
    }
    copy_children(html_element, &mut document, root);

    debug!("Parsed document into {} nodes", document.len());
    document
}

/// Copy the subtree below a scraper element into `document` under `parent`.
fn copy_children(element: ElementRef, document: &mut Document, parent: NodeId) {
    let mut pending = vec![(element, parent)];
    while let Some((element, parent)) = pending.pop() {
        for child in element.children() {
            match child.value() {
                ScraperNode::Text(text) => {
                    let node = document.create_text(&text.text);
                    document.append(parent, node);
                }
                ScraperNode::Element(_) => {
                    if let Some(child_element) = ElementRef::wrap(child) {
                        let value = child_element.value();
                        let attrs: Vec<(&str, &str)> = value.attrs().collect();
                        let node = document.element_with_attrs(value.name(), attrs);
                        document.append(parent, node);
                        pending.push((child_element, node));
                    }
                }
                _ => {}
            }
        }
    }
}
