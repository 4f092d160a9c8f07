//! XHTML serialization of a [`Dom`] subtree.
//!
//! Output is well-formed XML: void elements are self-closed, text and
//! attribute values are escaped, and every element whose namespace differs
//! from its parent's declares it, so inline SVG/MathML (and HTML nested back
//! inside them) keep their meaning inside an XHTML document.

use html5ever::{Namespace, ns};
use quick_xml::escape::{escape, partial_escape};

use super::arena::{Dom, NodeData, NodeId};

/// HTML elements that never have content.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Serialize the children of `parent` as XHTML.
pub fn serialize_children(dom: &Dom, parent: NodeId) -> String {
    let mut out = String::new();
    for child in dom.children(parent) {
        write_node(dom, child, &ns!(html), &mut out);
    }
    out
}

fn write_node(dom: &Dom, id: NodeId, parent_ns: &Namespace, out: &mut String) {
    let Some(node) = dom.get(id) else {
        return;
    };

    match &node.data {
        NodeData::Text(text) => out.push_str(&partial_escape(text.as_str())),
        NodeData::Comment(text) => {
            // "--" is not allowed inside XML comments
            out.push_str("<!--");
            out.push_str(&text.replace("--", "- -"));
            out.push_str("-->");
        }
        NodeData::Element { name, attrs } => {
            let tag = name.local.as_ref();
            out.push('<');
            out.push_str(tag);

            if name.ns != *parent_ns {
                out.push_str(&format!(" xmlns=\"{}\"", escape(name.ns.as_ref())));
                if name.ns == ns!(svg) {
                    out.push_str(" xmlns:xlink=\"http://www.w3.org/1999/xlink\"");
                }
            }

            for attr in attrs {
                if attr.name.ns == ns!(xmlns) || attr.name.local.as_ref() == "xmlns" {
                    continue;
                }
                out.push(' ');
                if let Some(prefix) = &attr.name.prefix {
                    out.push_str(prefix.as_ref());
                    out.push(':');
                }
                out.push_str(attr.name.local.as_ref());
                out.push_str("=\"");
                out.push_str(&escape(attr.value.as_str()));
                out.push('"');
            }

            let has_children = node.first_child.is_some();
            let is_html = name.ns == ns!(html);
            if !has_children && (!is_html || VOID_ELEMENTS.contains(&tag)) {
                out.push_str("/>");
                return;
            }

            out.push('>');
            for child in dom.children(id) {
                write_node(dom, child, &name.ns, out);
            }
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
        NodeData::Document => {
            for child in dom.children(id) {
                write_node(dom, child, parent_ns, out);
            }
        }
        NodeData::Doctype => {}
    }
}
