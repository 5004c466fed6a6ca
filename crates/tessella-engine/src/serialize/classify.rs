use crate::blocks::{BlockData, ListItem, ListKind};
use crate::markup::dom::{Element, Node};
use crate::markup::write_nodes;

/// Classify one top-level element into exactly one block type.
///
/// Heuristics: heading level from the tag digit, list kind from
/// marker/class inspection, media detection by child inspection;
/// everything unrecognized falls back to a paragraph. The
/// returned tag goes through the registry, so an unregistered result still
/// lands on the default type.
pub fn classify_element(el: &Element) -> (String, BlockData) {
    match el.tag.as_str() {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level = el.tag[1..].parse::<u8>().unwrap_or(2);
            (
                "heading".to_string(),
                BlockData::with_text(inline_markup(&el.children)).level(level),
            )
        }
        "ul" | "ol" => classify_list(el),
        "pre" => classify_code(el),
        "hr" => ("divider".to_string(), BlockData::default()),
        "blockquote" => classify_quote(el),
        "img" => (
            "image".to_string(),
            image_data_from_img(el, String::new()),
        ),
        "figure" => classify_figure(el),
        "table" => classify_table(el),
        _ => {
            if let Some(tag) = el.attr("data-custom") {
                return classify_custom(el, tag.to_string());
            }
            // Media detection by child inspection: a paragraph holding a
            // single image is an image block.
            let significant: Vec<&Node> =
                el.children.iter().filter(|n| !n.is_blank_text()).collect();
            if let [Node::Element(img)] = significant.as_slice() {
                if img.tag == "img" {
                    return ("image".to_string(), image_data_from_img(img, String::new()));
                }
            }
            (
                "paragraph".to_string(),
                BlockData::with_text(inline_markup(&el.children)),
            )
        }
    }
}

fn classify_list(el: &Element) -> (String, BlockData) {
    let kind = if el.tag == "ol" {
        ListKind::Ordered
    } else if is_checklist(el) {
        ListKind::Checklist
    } else {
        ListKind::Bullet
    };

    let items = el
        .children
        .iter()
        .filter_map(|n| n.as_element())
        .filter(|c| c.tag == "li")
        .map(|li| classify_list_item(li))
        .collect::<Vec<_>>();

    ("list".to_string(), BlockData::default().list_kind(kind).items(items))
}

/// List kind from marker/class inspection: an explicit `data-kind`, a
/// checklist class, or a checkbox input inside any item.
fn is_checklist(el: &Element) -> bool {
    if el.attr("data-kind") == Some("checklist") {
        return true;
    }
    if el
        .attr("class")
        .is_some_and(|c| c.split_whitespace().any(|c| c.contains("checklist")))
    {
        return true;
    }
    el.children
        .iter()
        .filter_map(|n| n.as_element())
        .filter(|c| c.tag == "li")
        .any(|li| checkbox_of(li).is_some())
}

fn checkbox_of(li: &Element) -> Option<&Element> {
    li.children
        .iter()
        .filter_map(|n| n.as_element())
        .find(|c| c.tag == "input" && c.attr("type") == Some("checkbox"))
}

fn classify_list_item(li: &Element) -> ListItem {
    let checked = li.attr("data-checked") == Some("true")
        || checkbox_of(li).is_some_and(|c| c.attr("checked").is_some());
    let content: Vec<Node> = li
        .children
        .iter()
        .filter(|n| !matches!(n, Node::Element(c) if c.tag == "input"))
        .cloned()
        .collect();
    ListItem {
        text: inline_markup(&content).trim().to_string(),
        checked,
    }
}

fn classify_code(el: &Element) -> (String, BlockData) {
    let language = el.attr("data-language").map(str::to_string);
    // Source comes from the inner <code> where present, the <pre> itself
    // otherwise; always the decoded text, never markup.
    let source = el
        .find_child("code")
        .map(|code| code.plain_text())
        .unwrap_or_else(|| el.plain_text());
    let mut data = BlockData::with_text(source);
    data.language = language;
    ("code".to_string(), data)
}

fn classify_quote(el: &Element) -> (String, BlockData) {
    let caption = el
        .find_child("cite")
        .map(|cite| cite.plain_text())
        .unwrap_or_default();
    let body: Vec<Node> = el
        .children
        .iter()
        .filter(|n| !matches!(n, Node::Element(c) if c.tag == "cite"))
        .cloned()
        .collect();
    // A canonical quote wraps its text in one paragraph; unwrap it back.
    let text = match body.iter().filter(|n| !n.is_blank_text()).collect::<Vec<_>>().as_slice() {
        [Node::Element(p)] if p.tag == "p" => inline_markup(&p.children),
        _ => inline_markup(&body).trim().to_string(),
    };
    (
        "quote".to_string(),
        BlockData::with_text(text).caption(caption),
    )
}

fn classify_figure(el: &Element) -> (String, BlockData) {
    if let Some(url) = el.attr("data-embed") {
        let mut data = BlockData::default().url(url.to_string());
        data.title = el
            .find_child("figcaption")
            .map(|c| c.plain_text())
            .filter(|t| !t.is_empty());
        data.description = el
            .find_child("p")
            .map(|p| p.plain_text())
            .filter(|d| !d.is_empty());
        data.image = el
            .find_descendant("img")
            .and_then(|img| img.attr("src"))
            .map(str::to_string);
        return ("embed".to_string(), data);
    }
    if let Some(img) = el.find_descendant("img") {
        let caption = el
            .find_child("figcaption")
            .map(|c| c.plain_text())
            .unwrap_or_default();
        return ("image".to_string(), image_data_from_img(img, caption));
    }
    (
        "paragraph".to_string(),
        BlockData::with_text(inline_markup(&el.children)),
    )
}

fn image_data_from_img(img: &Element, caption: String) -> BlockData {
    let mut data = BlockData::default()
        .url(img.attr("src").unwrap_or_default().to_string())
        .caption(caption);
    data.width = img.attr("width").and_then(|w| w.parse().ok());
    data.height = img.attr("height").and_then(|h| h.parse().ok());
    data
}

fn classify_table(el: &Element) -> (String, BlockData) {
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut header = false;
    collect_rows(el, &mut rows, &mut header);
    let mut data = BlockData::default().rows(rows);
    data.header = Some(header);
    ("table".to_string(), data)
}

fn collect_rows(el: &Element, rows: &mut Vec<Vec<String>>, header: &mut bool) {
    for child in el.children.iter().filter_map(|n| n.as_element()) {
        match child.tag.as_str() {
            "thead" => {
                *header = true;
                collect_rows(child, rows, header);
            }
            "tbody" => collect_rows(child, rows, header),
            "tr" => {
                let cells: Vec<String> = child
                    .children
                    .iter()
                    .filter_map(|n| n.as_element())
                    .filter(|c| c.tag == "td" || c.tag == "th")
                    .map(|c| inline_markup(&c.children))
                    .collect();
                if child
                    .children
                    .iter()
                    .filter_map(|n| n.as_element())
                    .any(|c| c.tag == "th")
                    && rows.is_empty()
                {
                    *header = true;
                }
                rows.push(cells);
            }
            _ => {}
        }
    }
}

fn classify_custom(el: &Element, tag: String) -> (String, BlockData) {
    let mut data = BlockData::default();
    for (name, value) in &el.attrs {
        if let Some(key) = name.strip_prefix("data-f-") {
            data.fields.insert(key.to_string(), value.clone());
        }
    }
    (tag, data)
}

/// Inline markup of child nodes: the canonical string stored in text
/// payloads.
pub fn inline_markup(children: &[Node]) -> String {
    write_nodes(children)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::parse;

    fn first_element(markup: &str) -> Element {
        parse(markup)
            .into_iter()
            .find_map(|n| match n {
                Node::Element(el) => Some(el),
                _ => None,
            })
            .expect("markup has an element")
    }

    #[test]
    fn heading_level_comes_from_the_tag_digit() {
        let (tag, data) = classify_element(&first_element("<h3>Title</h3>"));
        assert_eq!(tag, "heading");
        assert_eq!(data.level, Some(3));
        assert_eq!(data.text.as_deref(), Some("Title"));
    }

    #[test]
    fn ordered_list_from_tag() {
        let (tag, data) = classify_element(&first_element("<ol><li>a</li><li>b</li></ol>"));
        assert_eq!(tag, "list");
        assert_eq!(data.list_kind, Some(ListKind::Ordered));
        assert_eq!(data.items.unwrap().len(), 2);
    }

    #[test]
    fn checklist_detected_from_checkbox_children() {
        let (_, data) = classify_element(&first_element(
            r#"<ul><li><input type="checkbox" checked>done</li><li><input type="checkbox">todo</li></ul>"#,
        ));
        assert_eq!(data.list_kind, Some(ListKind::Checklist));
        let items = data.items.unwrap();
        assert!(items[0].checked);
        assert!(!items[1].checked);
        assert_eq!(items[0].text, "done");
    }

    #[test]
    fn code_block_reads_language_and_raw_source() {
        let (tag, data) = classify_element(&first_element(
            "<pre data-language=\"rust\"><code>a &lt; b</code></pre>",
        ));
        assert_eq!(tag, "code");
        assert_eq!(data.language.as_deref(), Some("rust"));
        assert_eq!(data.text.as_deref(), Some("a < b"));
    }

    #[test]
    fn paragraph_with_single_image_child_is_an_image_block() {
        let (tag, data) = classify_element(&first_element(r#"<p><img src="x.png"></p>"#));
        assert_eq!(tag, "image");
        assert_eq!(data.url.as_deref(), Some("x.png"));
    }

    #[test]
    fn figure_with_embed_attr_is_an_embed() {
        let (tag, data) = classify_element(&first_element(
            r#"<figure data-embed="https://e.com"><figcaption>Site</figcaption></figure>"#,
        ));
        assert_eq!(tag, "embed");
        assert_eq!(data.url.as_deref(), Some("https://e.com"));
        assert_eq!(data.title.as_deref(), Some("Site"));
    }

    #[test]
    fn table_header_detected_from_thead() {
        let (tag, data) = classify_element(&first_element(
            "<table><thead><tr><th>h</th></tr></thead><tbody><tr><td>c</td></tr></tbody></table>",
        ));
        assert_eq!(tag, "table");
        assert_eq!(data.header, Some(true));
        assert_eq!(data.rows.unwrap().len(), 2);
    }

    #[test]
    fn quote_splits_body_and_citation() {
        let (tag, data) = classify_element(&first_element(
            "<blockquote><p>wise words</p><cite>someone</cite></blockquote>",
        ));
        assert_eq!(tag, "quote");
        assert_eq!(data.text.as_deref(), Some("wise words"));
        assert_eq!(data.caption.as_deref(), Some("someone"));
    }

    #[test]
    fn unknown_element_falls_back_to_paragraph() {
        let (tag, data) = classify_element(&first_element("<aside>note</aside>"));
        assert_eq!(tag, "paragraph");
        assert_eq!(data.text.as_deref(), Some("note"));
    }
}
