//! Lightweight HTML scanning used for pingback discovery and verification.
//!
//! Remote pages are untrusted and frequently malformed, so these helpers
//! work on tag-shaped fragments with regular expressions instead of building
//! a DOM. Comments are removed before scanning.

use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

static COMMENT_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());

static TITLE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title\b[^>]*>(.*?)</title\s*>").unwrap());

// Quoted attribute values may contain `>`.
static ANCHOR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?is)<a\b((?:[^>"']|"[^"]*"|'[^']*')*)>"#).unwrap());

static LINK_TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?is)<link\b((?:[^>"']|"[^"]*"|'[^']*')*)>"#).unwrap());

static BASE_TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?is)<base\b((?:[^>"']|"[^"]*"|'[^']*')*)>"#).unwrap());

static ATTRIBUTE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)([a-z_:][-a-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+))"#)
        .unwrap()
});

static HTML_ROOT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^\s*(?:<\?xml[^>]*>\s*)?(?:<!--.*?-->\s*)*(?:<!doctype\s+html|<html\b)")
        .unwrap()
});

static MARKUP_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"</?\w+(?:(?:\s+\w+(?:\s*=\s*(?:"[^"]*"|'[^']*'|[^'">\s]+))?)+\s*|\s*)/?>"#)
        .unwrap()
});

static WHITESPACE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

fn strip_comments(html: &str) -> Cow<'_, str> {
    COMMENT_REGEX.replace_all(html, "")
}

/// Returns true if the document starts like an HTML page (doctype or `<html>`).
pub fn looks_like_html(body: &str) -> bool {
    HTML_ROOT_REGEX.is_match(body)
}

/// Returns true if the text contains something shaped like an HTML tag.
pub fn contains_markup(text: &str) -> bool {
    MARKUP_REGEX.is_match(text)
}

/// Extracts the first non-empty `<title>` with entities decoded and
/// whitespace collapsed.
pub fn extract_title(html: &str) -> Option<String> {
    let html = strip_comments(html);
    TITLE_REGEX
        .captures_iter(&html)
        .filter_map(|caps| caps.get(1))
        .map(|m| {
            let decoded = decode_entities(m.as_str());
            WHITESPACE_REGEX.replace_all(decoded.trim(), " ").into_owned()
        })
        .find(|title| !title.is_empty())
}

/// Returns the `href` of every anchor, in document order, entities decoded.
pub fn anchor_hrefs(html: &str) -> Vec<String> {
    let html = strip_comments(html);
    ANCHOR_REGEX
        .captures_iter(&html)
        .filter_map(|caps| caps.get(1))
        .filter_map(|attrs| attribute(attrs.as_str(), "href"))
        .collect()
}

/// Returns the `href` of the first `<base>` element that has one.
pub fn base_href(html: &str) -> Option<String> {
    let html = strip_comments(html);
    BASE_TAG_REGEX
        .captures_iter(&html)
        .filter_map(|caps| caps.get(1))
        .find_map(|attrs| attribute(attrs.as_str(), "href"))
        .filter(|href| !href.is_empty())
}

/// Returns the `href` of the first `<link>` whose `rel` includes `pingback`.
pub fn pingback_link_href(html: &str) -> Option<String> {
    let html = strip_comments(html);
    LINK_TAG_REGEX
        .captures_iter(&html)
        .filter_map(|caps| caps.get(1))
        .find_map(|attrs| {
            let rel = attribute(attrs.as_str(), "rel")?;
            let is_pingback = rel
                .split_ascii_whitespace()
                .any(|token| token.eq_ignore_ascii_case("pingback"));
            if is_pingback {
                attribute(attrs.as_str(), "href")
            } else {
                None
            }
        })
}

/// Looks up an attribute value (case-insensitive name) in a tag's attribute text.
fn attribute(attrs: &str, name: &str) -> Option<String> {
    ATTRIBUTE_REGEX.captures_iter(attrs).find_map(|caps| {
        if !caps[1].eq_ignore_ascii_case(name) {
            return None;
        }
        let value = caps.get(2).or_else(|| caps.get(3)).or_else(|| caps.get(4))?;
        Some(decode_entities(value.as_str()).trim().to_string())
    })
}

/// Decodes the common named entities and numeric character references.
///
/// Unknown entities are left untouched.
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        let decoded = after
            .find(';')
            .filter(|&semi| semi <= 10)
            .and_then(|semi| entity_char(&after[..semi]).map(|ch| (ch, semi)));
        match decoded {
            Some((ch, semi)) => {
                out.push(ch);
                rest = &after[semi + 1..];
            }
            None => {
                out.push('&');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn entity_char(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let number = entity.strip_prefix('#')?;
            let code = match number.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => number.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}
