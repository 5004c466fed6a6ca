use super::cursor::Cursor;
use super::dom::{Element, Node, is_void};

/// Elements whose content is raw text up to the matching close tag.
const RAW_TEXT_TAGS: [&str; 4] = ["script", "style", "textarea", "title"];

/// Parses markup into a node tree.
///
/// This parser never fails: malformed input degrades to text, stray close
/// tags are ignored, and unclosed elements are closed implicitly at end of
/// input. Untrusted paste input and canonical documents both come through
/// here; safety decisions belong to the sanitizer, not the parser.
pub fn parse(input: &str) -> Vec<Node> {
    let mut cur = Cursor::new(input);
    let mut root: Vec<Node> = Vec::new();
    // Open elements; the last entry is the innermost.
    let mut stack: Vec<Element> = Vec::new();

    while !cur.eof() {
        if cur.peek() == Some(b'<') {
            if cur.starts_with(b"<!--") {
                cur.bump_n(4);
                let body = cur.take_until(b"-->").to_string();
                append(&mut stack, &mut root, Node::Comment(body));
                continue;
            }
            if cur.starts_with(b"<!") || cur.starts_with(b"<?") {
                // Doctype / processing instruction: dropped.
                cur.take_until(b">");
                continue;
            }
            if cur.starts_with(b"</") {
                let saved = cur.clone();
                if !try_parse_close(&mut cur, &mut stack, &mut root) {
                    cur = saved;
                    take_literal_angle(&mut cur, &mut stack, &mut root);
                }
                continue;
            }
            let saved = cur.clone();
            if let Some((element, closed)) = try_parse_open(&mut cur) {
                if closed || is_void(&element.tag) {
                    append(&mut stack, &mut root, Node::Element(element));
                } else if RAW_TEXT_TAGS.contains(&element.tag.as_str()) {
                    let raw = consume_raw_text(&mut cur, &element.tag);
                    let mut element = element;
                    if !raw.is_empty() {
                        element.children.push(Node::Text(raw));
                    }
                    append(&mut stack, &mut root, Node::Element(element));
                } else {
                    stack.push(element);
                }
                continue;
            }
            cur = saved;
            take_literal_angle(&mut cur, &mut stack, &mut root);
            continue;
        }

        let raw = cur.take_while(|b| b != b'<');
        let decoded = html_escape::decode_html_entities(raw).into_owned();
        append(&mut stack, &mut root, Node::Text(decoded));
    }

    // Implicitly close whatever is still open.
    while let Some(element) = stack.pop() {
        append(&mut stack, &mut root, Node::Element(element));
    }

    root
}

/// Append a finished node to the innermost open element, or to the root.
fn append(stack: &mut Vec<Element>, root: &mut Vec<Node>, node: Node) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => root.push(node),
    }
}

/// A lone `<` that opens nothing becomes literal text.
fn take_literal_angle(cur: &mut Cursor<'_>, stack: &mut Vec<Element>, root: &mut Vec<Node>) {
    cur.bump();
    append(stack, root, Node::Text("<".to_string()));
}

/// Attempts to parse `</name>`; unwinds the open stack to the matching
/// element. Returns false when no tag name follows (cursor must be
/// restored by the caller).
fn try_parse_close(cur: &mut Cursor<'_>, stack: &mut Vec<Element>, root: &mut Vec<Node>) -> bool {
    cur.bump_n(2);
    let name = cur.take_while(|b| b.is_ascii_alphanumeric()).to_ascii_lowercase();
    if name.is_empty() {
        return false;
    }
    cur.take_until(b">");

    // Stray close with no matching open element is ignored.
    let Some(open_at) = stack.iter().rposition(|el| el.tag == name) else {
        return true;
    };
    while stack.len() > open_at {
        let element = stack.pop().expect("stack length checked above");
        append(stack, root, Node::Element(element));
    }
    true
}

/// Attempts to parse an open tag `<name attr="value" ...>` at the cursor.
/// Returns the element and whether it was explicitly self-closed.
fn try_parse_open(cur: &mut Cursor<'_>) -> Option<(Element, bool)> {
    cur.bump(); // <
    let first = cur.peek()?;
    if !first.is_ascii_alphabetic() {
        return None;
    }
    let name = cur
        .take_while(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b':')
        .to_ascii_lowercase();
    let mut element = Element::new(name);
    let mut self_closed = false;

    loop {
        cur.skip_whitespace();
        match cur.peek() {
            None => break,
            Some(b'>') => {
                cur.bump();
                break;
            }
            Some(b'/') => {
                cur.bump();
                if cur.peek() == Some(b'>') {
                    cur.bump();
                    self_closed = true;
                    break;
                }
            }
            Some(_) => {
                if let Some((name, value)) = parse_attribute(cur) {
                    element.attrs.push((name, value));
                }
            }
        }
    }

    Some((element, self_closed))
}

/// Parses one attribute: bare name, `name=value`, `name="value"`, or
/// `name='value'`. Entity references in values are decoded.
fn parse_attribute(cur: &mut Cursor<'_>) -> Option<(String, String)> {
    let name = cur
        .take_while(|b| !b.is_ascii_whitespace() && b != b'=' && b != b'>' && b != b'/')
        .to_ascii_lowercase();
    if name.is_empty() {
        // Defensive bump so a pathological byte cannot stall the loop.
        cur.bump();
        return None;
    }
    cur.skip_whitespace();
    if cur.peek() != Some(b'=') {
        return Some((name, String::new()));
    }
    cur.bump();
    cur.skip_whitespace();

    let raw_value = match cur.peek() {
        Some(quote @ (b'"' | b'\'')) => {
            cur.bump();
            cur.take_until(&[quote])
        }
        _ => cur.take_while(|b| !b.is_ascii_whitespace() && b != b'>'),
    };
    let value = html_escape::decode_html_entities(raw_value).into_owned();
    Some((name, value))
}

/// Consumes raw text content up to (and including) `</tag>`.
fn consume_raw_text(cur: &mut Cursor<'_>, tag: &str) -> String {
    let close = format!("</{tag}");
    let start = cur.pos();
    while !cur.eof() && !cur.starts_with_ignore_case(close.as_bytes()) {
        cur.bump();
    }
    let raw = cur.s[start..cur.pos()].to_string();
    if !cur.eof() {
        cur.bump_n(close.len());
        cur.take_until(b">");
    }
    raw
}
