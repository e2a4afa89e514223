//! # domsweep
//!
//! Transform HTML document trees in place.
//!
//! `domsweep` walks a document and applies structural rules to every node:
//! remove it, flatten it (replace it with its children), keep it while
//! filtering its attributes and classes, join it with adjacent siblings, or
//! hand it to a user supplied filter. Nodes that survive keep their identity,
//! so handles held before processing stay valid.
//!
//! The rule engine lives in `domsweep-core` and works on any tree implementing
//! [`HostTree`]. This crate adds an arena [`Document`], HTML parsing via
//! scraper (feature `html`, on by default) and serialization.
//!
//! ## Example (HTML string)
//!
//! ```rust
//! use domsweep::{ProcessingOptions, SweepService};
//!
//! let options = ProcessingOptions::new()
//!     .allow_deep(".*", ["p", "b"])
//!     .remove_deep(".*", "script")
//!     .join_siblings(["b"]);
//! let service = SweepService::with_options(options);
//!
//! let html = service
//!     .sweep_html("<div><p><b>a</b><b>b</b><script>x()</script></p></div>")
//!     .unwrap();
//! assert_eq!(html, "<p><b>ab</b></p>");
//! ```
//!
//! ## Example (filters)
//!
//! ```rust
//! use domsweep::{process_markup, Document, Filter, FilterOutcome, ProcessingOptions, SideTable};
//!
//! // Turn every <i> into <em>; the new node is processed like any other.
//! let options = ProcessingOptions::<Document>::new()
//!     .allow_deep(".*", "em")
//!     .filter("i", Filter::new("i-to-em", |doc: &mut Document, node, _, _| {
//!         let em = doc.create_element("em");
//!         for child in doc.children(node).to_vec() {
//!             doc.append(em, child);
//!         }
//!         FilterOutcome::replace_with(em)
//!     }));
//!
//! let html = process_markup("<i>hi</i>", &options, false, &mut SideTable::new()).unwrap();
//! assert_eq!(html, "<em>hi</em>");
//! ```

#[cfg(feature = "html")]
pub mod html;
pub mod node;
mod service;

#[cfg(feature = "html")]
pub use html::{parse_html, parse_html_document};
pub use node::{Document, NodeData, NodeId};
#[cfg(feature = "html")]
pub use service::process_markup;
pub use service::SweepService;

pub use domsweep_core::{
    process_children, process_node, Error, Filter, FilterContext, FilterOutcome, HostTree,
    NodeFlags, NodeKind, OneOrMany, ProcessingOptions, Result, SideTable, TagSpec,
    VOID_ELEMENTS,
};
