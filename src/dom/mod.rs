//! Parsing, querying and rewriting HTML content fragments.
//!
//! Content items arrive as loose HTML. They are parsed with html5ever into an
//! arena [`Dom`], rewritten in place (anchor ids, image replacement), and
//! serialized back as XHTML.

mod arena;
mod serialize;
mod tree_sink;

pub use arena::{Attribute, ChildrenIter, Dom, Node, NodeData, NodeId};
pub use serialize::serialize_children;

use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;

use tree_sink::DomSink;

/// A parsed HTML fragment and the element that holds it.
pub struct Fragment {
    pub dom: Dom,
    /// The `<body>` element the fragment was parsed into.
    pub root: NodeId,
}

/// Parse an HTML fragment.
///
/// The fragment is parsed as the body of a minimal document, so stray
/// `<html>`/`<head>` markup is tolerated and missing end tags are repaired.
pub fn parse_fragment(html: &str) -> Fragment {
    let wrapped = format!("<!DOCTYPE html><html><head></head><body>{html}</body></html>");
    let dom = parse_document(DomSink::new(), ParseOpts::default())
        .from_utf8()
        .one(wrapped.as_bytes())
        .into_dom();
    let root = dom.find_by_tag("body").unwrap_or_else(|| dom.document());
    Fragment { dom, root }
}

impl Fragment {
    /// Elements with the given local name, in document order.
    pub fn elements_by_tag(&self, tag: &str) -> Vec<NodeId> {
        self.dom
            .select(self.root, |dom, id| dom.element_name(id).is_some_and(|n| n.as_ref() == tag))
    }

    /// Elements whose attribute `name` equals `value`, in document order.
    pub fn elements_by_attr(&self, name: &str, value: &str) -> Vec<NodeId> {
        self.dom
            .select(self.root, |dom, id| dom.get_attr(id, name) == Some(value))
    }

    pub fn contains_tag(&self, tag: &str) -> bool {
        !self.elements_by_tag(tag).is_empty()
    }

    /// The fragment's inner markup as XHTML.
    pub fn to_xhtml(&self) -> String {
        serialize_children(&self.dom, self.root)
    }
}
