/// Node tree for the canonical markup dialect.
///
/// Deliberately tiny: elements, text, comments. Attributes keep source
/// order so cleaning and re-serialization are stable.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
}

impl Node {
    pub fn element(tag: impl Into<String>) -> Node {
        Node::Element(Element::new(tag))
    }

    pub fn text(content: impl Into<String>) -> Node {
        Node::Text(content.into())
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Concatenated text content of this subtree, tags stripped.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text(t) => out.push_str(t),
            Node::Element(el) => {
                if el.tag == "br" {
                    out.push('\n');
                }
                for child in &el.children {
                    child.collect_text(out);
                }
            }
            Node::Comment(_) => {}
        }
    }

    /// True for whitespace-only text nodes (formatting noise between
    /// block-level elements).
    pub fn is_blank_text(&self) -> bool {
        matches!(self, Node::Text(t) if t.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name, value)),
        }
    }

    pub fn remove_attr(&mut self, name: &str) {
        self.attrs.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_child(Node::Text(text.into()))
    }

    /// First child element with the given tag, if any.
    pub fn find_child(&self, tag: &str) -> Option<&Element> {
        self.children.iter().find_map(|c| match c {
            Node::Element(el) if el.tag == tag => Some(el),
            _ => None,
        })
    }

    /// Depth-first search for a descendant element with the given tag.
    pub fn find_descendant(&self, tag: &str) -> Option<&Element> {
        for child in &self.children {
            if let Node::Element(el) = child {
                if el.tag == tag {
                    return Some(el);
                }
                if let Some(found) = el.find_descendant(tag) {
                    return Some(found);
                }
            }
        }
        None
    }

    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.collect_text(&mut out);
        }
        out
    }
}

/// Void elements never carry children and serialize without a close tag.
pub fn is_void(tag: &str) -> bool {
    matches!(
        tag,
        "area" | "base" | "br" | "col" | "embed" | "hr" | "img" | "input" | "link" | "meta"
            | "source" | "track" | "wbr"
    )
}

/// Tags the engine treats as block-level when splitting pasted content
/// into blocks.
pub fn is_block_tag(tag: &str) -> bool {
    matches!(
        tag,
        "p" | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "ul"
            | "ol"
            | "blockquote"
            | "pre"
            | "hr"
            | "table"
            | "figure"
            | "div"
            | "section"
            | "article"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_strips_tags() {
        let node = Node::Element(
            Element::new("p")
                .with_text("a ")
                .with_child(Node::Element(Element::new("strong").with_text("b"))),
        );
        assert_eq!(node.plain_text(), "a b");
    }

    #[test]
    fn br_becomes_newline_in_plain_text() {
        let node = Node::Element(
            Element::new("p")
                .with_text("a")
                .with_child(Node::element("br"))
                .with_text("b"),
        );
        assert_eq!(node.plain_text(), "a\nb");
    }

    #[test]
    fn attr_lookup_is_case_insensitive() {
        let el = Element::new("a").with_attr("HREF", "x");
        assert_eq!(el.attr("href"), Some("x"));
    }

    #[test]
    fn find_descendant_goes_deep() {
        let el = Element::new("figure").with_child(Node::Element(
            Element::new("div").with_child(Node::Element(Element::new("img"))),
        ));
        assert!(el.find_descendant("img").is_some());
        assert!(el.find_child("img").is_none());
    }
}
