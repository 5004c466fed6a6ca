use std::sync::OnceLock;

use regex::Regex;

use crate::markup::dom::{Element, Node, is_block_tag, is_void};
use crate::markup::parse;
use crate::sanitize::policy::SanitizePolicy;

/// Sanitize untrusted markup down to the policy's vocabulary.
///
/// The result is safe to classify into blocks or to splice into a block's
/// inline text. Running the pipeline over already-sanitized output is a
/// no-op (idempotence is covered by tests).
pub fn sanitize(input: &str, policy: &SanitizePolicy) -> Vec<Node> {
    let nodes = parse(input);
    let nodes = strip_artifacts(nodes);
    clean_nodes(nodes, policy, 0)
}

pub fn sanitize_to_string(input: &str, policy: &SanitizePolicy) -> String {
    crate::markup::write_nodes(&sanitize(input, policy))
}

/// Pre-pass: remove office/export-tool residue before the structural walk.
///
/// Namespaced tags are unwrapped (their text is real content), namespaced
/// and `xmlns` attributes are dropped, and known export marker ids/classes
/// (`docs-internal-guid-…`, `Mso…`) are stripped.
fn strip_artifacts(nodes: Vec<Node>) -> Vec<Node> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            Node::Element(mut el) => {
                if el.tag.contains(':') {
                    // e.g. <o:p>, <w:sdt>: keep the content, lose the shell.
                    out.extend(strip_artifacts(std::mem::take(&mut el.children)));
                    continue;
                }
                el.attrs.retain(|(name, value)| {
                    if name.contains(':') || name.starts_with("xmlns") {
                        return false;
                    }
                    if name == "id" && export_marker_re().is_match(value) {
                        return false;
                    }
                    if name == "class" && mso_class_re().is_match(value) {
                        return false;
                    }
                    true
                });
                el.children = strip_artifacts(std::mem::take(&mut el.children));
                out.push(Node::Element(el));
            }
            other => out.push(other),
        }
    }
    out
}

fn export_marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^docs-internal-guid-").expect("invalid marker regex"))
}

fn mso_class_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^Mso").expect("invalid mso class regex"))
}

/// The recursive structural walk.
fn clean_nodes(nodes: Vec<Node>, policy: &SanitizePolicy, depth: usize) -> Vec<Node> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            Node::Text(t) => {
                if !t.is_empty() {
                    out.push(Node::Text(t));
                }
            }
            Node::Comment(_) => {}
            Node::Element(el) => {
                if policy.is_dropped_tag(&el.tag) {
                    continue;
                }
                if depth >= policy.max_depth {
                    // Too deep: collapse the whole subtree to its text.
                    log::debug!("sanitize depth bound hit at <{}>, flattening", el.tag);
                    let mut text = String::new();
                    flatten_text(&Node::Element(el), policy, &mut text);
                    if !text.trim().is_empty() {
                        out.push(Node::Text(text));
                    }
                    continue;
                }

                let tag = policy.canonical_tag(&el.tag).to_string();
                let renamed = tag != el.tag;
                let children = clean_nodes(el.children, policy, depth + 1);

                if !policy.is_allowed_tag(&tag) {
                    // Unknown element: promote its children, drop the shell.
                    out.extend(children);
                    continue;
                }

                // A generic container renamed to a paragraph but holding
                // block-level content unwraps; wrapping blocks inside a
                // paragraph would produce invalid structure.
                if renamed
                    && tag == "p"
                    && children
                        .iter()
                        .any(|n| matches!(n, Node::Element(c) if is_block_tag(&c.tag)))
                {
                    out.extend(children);
                    continue;
                }

                let attrs = clean_attrs(&tag, el.attrs, policy);
                if children.is_empty() && !is_void(&tag) && !keep_when_empty(&tag) {
                    continue;
                }
                out.push(Node::Element(Element {
                    tag,
                    attrs,
                    children,
                }));
            }
        }
    }
    out
}

/// Empty-but-meaningful elements the empty-drop rule must not eat.
fn keep_when_empty(tag: &str) -> bool {
    matches!(tag, "td" | "th" | "figure" | "a" | "li" | "p")
}

/// Text content of a flattened subtree. Unlike a plain text walk this
/// still honors the drop set, so a script body buried past the depth
/// bound cannot surface as visible text.
fn flatten_text(node: &Node, policy: &SanitizePolicy, out: &mut String) {
    match node {
        Node::Text(t) => out.push_str(t),
        Node::Comment(_) => {}
        Node::Element(el) => {
            if policy.is_dropped_tag(&el.tag) {
                return;
            }
            for child in &el.children {
                flatten_text(child, policy, out);
            }
        }
    }
}

/// Attribute filter: event handlers always die, `style` goes through the
/// property filter, the rest must pass the per-tag/global allow-list, and
/// URL-bearing attributes must carry a safe scheme.
fn clean_attrs(
    tag: &str,
    attrs: Vec<(String, String)>,
    policy: &SanitizePolicy,
) -> Vec<(String, String)> {
    let mut out = Vec::with_capacity(attrs.len());
    for (name, value) in attrs {
        if name.starts_with("on") {
            continue;
        }
        if name == "style" {
            let filtered = clean_style(&value, policy);
            if !filtered.is_empty() {
                out.push((name, filtered));
            }
            continue;
        }
        if !policy.is_allowed_attr(tag, &name) {
            continue;
        }
        if (name == "href" || name == "src") && !is_safe_url(&value) {
            continue;
        }
        out.push((name, value));
    }
    out
}

/// Scheme check for `href`/`src` values. The value arrives entity-decoded;
/// embedded whitespace and control characters are removed before matching
/// so `java\tscript:` cannot sneak through.
fn is_safe_url(value: &str) -> bool {
    let normalized: String = value
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();
    for scheme in ["javascript:", "vbscript:", "livescript:"] {
        if normalized.starts_with(scheme) {
            return false;
        }
    }
    if let Some(rest) = normalized.strip_prefix("data:") {
        // Only raster image payloads; anything else (svg included) can
        // carry script.
        return ["image/png", "image/gif", "image/jpeg", "image/jpg", "image/webp"]
            .iter()
            .any(|t| rest.starts_with(t));
    }
    true
}

/// Inline style filter: keep declarations whose property is in the safe
/// set and whose value shows no embedded executable scheme.
fn clean_style(style: &str, policy: &SanitizePolicy) -> String {
    let mut kept = Vec::new();
    for declaration in style.split(';') {
        let Some((prop, value)) = declaration.split_once(':') else {
            continue;
        };
        let prop = prop.trim().to_ascii_lowercase();
        let value = value.trim();
        if !policy.is_safe_style_prop(&prop) {
            continue;
        }
        if style_scheme_re().is_match(&value.to_ascii_lowercase()) {
            continue;
        }
        kept.push(format!("{prop}: {value}"));
    }
    kept.join("; ")
}

fn style_scheme_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"expression\s*\(|javascript:|vbscript:|url\s*\(\s*['"]?\s*(javascript|vbscript|data):"#)
            .expect("invalid style scheme regex")
    })
}
