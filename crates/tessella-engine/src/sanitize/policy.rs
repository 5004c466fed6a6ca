use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Vocabulary the sanitizer reduces untrusted markup to.
///
/// Deserializable so hosts can ship a policy file; every field has a
/// compiled-in default, so a partial file only overrides what it names.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SanitizePolicy {
    /// Tag canonicalization applied before the whitelist check, e.g. the
    /// generic `div` container becomes `p` and deprecated emphasis tags
    /// collapse onto their canonical forms.
    pub rename: BTreeMap<String, String>,
    /// Tags allowed to survive. Anything else is unwrapped (children kept)
    /// or dropped (when empty).
    pub allowed_tags: BTreeSet<String>,
    /// Tags removed together with their entire content. Unwrapping these
    /// would promote non-content (script bodies, style sheets) into
    /// visible text.
    pub drop_tags: BTreeSet<String>,
    /// Per-tag attribute allow-list.
    pub tag_attrs: BTreeMap<String, Vec<String>>,
    /// Attributes allowed on every tag.
    pub global_attrs: Vec<String>,
    /// Inline style properties allowed through the style filter.
    pub safe_style_props: Vec<String>,
    /// Recursion bound; subtrees deeper than this collapse to plain text.
    pub max_depth: usize,
}

impl Default for SanitizePolicy {
    fn default() -> Self {
        let rename = [
            ("div", "p"),
            ("section", "p"),
            ("article", "p"),
            ("b", "strong"),
            ("i", "em"),
            ("strike", "del"),
            ("s", "del"),
        ]
        .into_iter()
        .map(|(from, to)| (from.to_string(), to.to_string()))
        .collect();

        let allowed_tags = [
            "p", "h1", "h2", "h3", "h4", "h5", "h6", "strong", "em", "del", "u", "a", "ul", "ol",
            "li", "blockquote", "cite", "pre", "code", "br", "hr", "img", "figure", "figcaption",
            "table", "thead", "tbody", "tr", "th", "td", "span", "mark", "sub", "sup", "input",
        ]
        .into_iter()
        .map(str::to_string)
        .collect();

        let tag_attrs = [
            ("a", vec!["href", "target", "rel"]),
            ("img", vec!["src", "alt", "width", "height"]),
            ("pre", vec!["data-language"]),
            ("ol", vec!["start"]),
            ("td", vec!["colspan", "rowspan"]),
            ("th", vec!["colspan", "rowspan"]),
            ("figure", vec!["data-embed"]),
            ("input", vec!["type", "checked"]),
            ("ul", vec!["data-kind"]),
            ("li", vec!["data-checked"]),
        ]
        .into_iter()
        .map(|(tag, attrs)| {
            (
                tag.to_string(),
                attrs.into_iter().map(str::to_string).collect(),
            )
        })
        .collect();

        let drop_tags = [
            "script", "style", "head", "title", "iframe", "object", "embed", "applet", "noscript",
            "meta", "link", "base", "form", "button", "select", "option", "textarea",
        ]
        .into_iter()
        .map(str::to_string)
        .collect();

        Self {
            rename,
            allowed_tags,
            drop_tags,
            tag_attrs,
            global_attrs: vec!["class".to_string(), "id".to_string()],
            safe_style_props: [
                "color",
                "background-color",
                "font-weight",
                "font-style",
                "text-align",
                "text-decoration",
            ]
            .into_iter()
            .map(str::to_string)
            .collect(),
            max_depth: 10,
        }
    }
}

impl SanitizePolicy {
    /// Canonical tag after renaming, or the tag itself.
    pub fn canonical_tag<'a>(&'a self, tag: &'a str) -> &'a str {
        self.rename.get(tag).map(String::as_str).unwrap_or(tag)
    }

    pub fn is_allowed_tag(&self, tag: &str) -> bool {
        self.allowed_tags.contains(tag)
    }

    pub fn is_dropped_tag(&self, tag: &str) -> bool {
        self.drop_tags.contains(tag)
    }

    /// Whether `attr` may survive on `tag` (scheme checks come separately).
    pub fn is_allowed_attr(&self, tag: &str, attr: &str) -> bool {
        if self.global_attrs.iter().any(|a| a == attr) {
            return true;
        }
        self.tag_attrs
            .get(tag)
            .is_some_and(|attrs| attrs.iter().any(|a| a == attr))
    }

    pub fn is_safe_style_prop(&self, prop: &str) -> bool {
        self.safe_style_props.iter().any(|p| p == prop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rename_targets_are_whitelisted() {
        // Idempotence depends on every rename landing inside the whitelist.
        let policy = SanitizePolicy::default();
        for target in policy.rename.values() {
            assert!(
                policy.is_allowed_tag(target),
                "rename target {target} must be allowed"
            );
        }
    }

    #[test]
    fn global_attrs_apply_to_any_tag() {
        let policy = SanitizePolicy::default();
        assert!(policy.is_allowed_attr("p", "class"));
        assert!(policy.is_allowed_attr("h3", "id"));
    }

    #[test]
    fn per_tag_attrs_do_not_leak_across_tags() {
        let policy = SanitizePolicy::default();
        assert!(policy.is_allowed_attr("a", "href"));
        assert!(!policy.is_allowed_attr("p", "href"));
    }

    #[test]
    fn partial_policy_file_keeps_defaults() {
        let policy: SanitizePolicy = toml::from_str("max_depth = 3").unwrap();
        assert_eq!(policy.max_depth, 3);
        assert!(policy.is_allowed_tag("p"));
    }
}
