use super::dom::{Node, is_void};

/// Serializes a node tree back to markup.
///
/// Text and attribute values are entity-escaped on the way out, so raw
/// strings stored in payloads can never smuggle tags into the output.
/// Comments are not written; the canonical dialect has no use for them.
pub fn write_nodes(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        write_node(node, &mut out);
    }
    out
}

pub fn write_node_to_string(node: &Node) -> String {
    let mut out = String::new();
    write_node(node, &mut out);
    out
}

fn write_node(node: &Node, out: &mut String) {
    match node {
        Node::Text(text) => {
            out.push_str(&html_escape::encode_text(text));
        }
        Node::Comment(_) => {}
        Node::Element(el) => {
            out.push('<');
            out.push_str(&el.tag);
            for (name, value) in &el.attrs {
                out.push(' ');
                out.push_str(name);
                if !value.is_empty() {
                    out.push_str("=\"");
                    out.push_str(&html_escape::encode_double_quoted_attribute(value));
                    out.push('"');
                }
            }
            out.push('>');
            if is_void(&el.tag) {
                return;
            }
            for child in &el.children {
                write_node(child, out);
            }
            out.push_str("</");
            out.push_str(&el.tag);
            out.push('>');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::dom::Element;
    use crate::markup::parser::parse;

    #[test]
    fn text_is_escaped() {
        let out = write_nodes(&[Node::Text("1 < 2 & 3".to_string())]);
        assert_eq!(out, "1 &lt; 2 &amp; 3");
    }

    #[test]
    fn attributes_are_escaped() {
        let el = Element::new("a").with_attr("href", "?a=\"b\"").with_text("x");
        let out = write_node_to_string(&Node::Element(el));
        assert_eq!(out, "<a href=\"?a=&quot;b&quot;\">x</a>");
    }

    #[test]
    fn void_elements_have_no_close_tag() {
        let out = write_node_to_string(&Node::element("hr"));
        assert_eq!(out, "<hr>");
    }

    #[test]
    fn valueless_attributes_stay_bare() {
        let el = Element::new("input").with_attr("disabled", "");
        let out = write_node_to_string(&Node::Element(el));
        assert_eq!(out, "<input disabled>");
    }

    #[test]
    fn comments_are_not_written() {
        let out = write_nodes(&[Node::Comment("hidden".to_string())]);
        assert_eq!(out, "");
    }

    #[test]
    fn parse_write_round_trip_is_stable() {
        let canonical = r#"<p>one <strong>bold</strong></p><hr><pre data-language="rust"><code>let a = 1 &lt; 2;</code></pre>"#;
        let written = write_nodes(&parse(canonical));
        assert_eq!(written, canonical);
        // And a second pass stays fixed.
        assert_eq!(write_nodes(&parse(&written)), canonical);
    }
}
