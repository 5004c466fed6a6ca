use crate::markup::dom::{Element, Node};

/// Convert plain clipboard text into markup nodes: one paragraph per
/// blank-line-delimited group, single line breaks preserved as `<br>`,
/// tabs expanded to four spaces.
pub fn plain_to_nodes(text: &str) -> Vec<Node> {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n").replace('\t', "    ");

    let mut paragraphs: Vec<Vec<String>> = Vec::new();
    let mut current: Vec<String> = Vec::new();
    for line in normalized.split('\n') {
        if line.trim().is_empty() {
            if !current.is_empty() {
                paragraphs.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line.to_string());
        }
    }
    if !current.is_empty() {
        paragraphs.push(current);
    }

    paragraphs
        .into_iter()
        .map(|lines| {
            let mut p = Element::new("p");
            for (i, line) in lines.into_iter().enumerate() {
                if i > 0 {
                    p.children.push(Node::element("br"));
                }
                p.children.push(Node::Text(line));
            }
            Node::Element(p)
        })
        .collect()
}
