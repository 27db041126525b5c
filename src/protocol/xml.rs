//! Minimal XML reader and escaper for XML-RPC documents.
//!
//! Supports exactly what XML-RPC payloads use: a prolog, comments, elements
//! (attributes are read and discarded), text, CDATA sections and the
//! predefined/numeric entities. Document type declarations are rejected so
//! no external entity can ever be resolved.

use thiserror::Error;

/// Maximum element nesting accepted before the document is rejected.
const MAX_DEPTH: usize = 64;

/// Errors produced while reading an XML document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum XmlError {
    #[error("document is not valid UTF-8")]
    InvalidUtf8,

    #[error("document has no root element")]
    NoRoot,

    #[error("unexpected end of document")]
    UnexpectedEof,

    #[error("unexpected character at byte {0}")]
    Unexpected(usize),

    #[error("mismatched closing tag: expected </{expected}>, found </{found}>")]
    Mismatched { expected: String, found: String },

    #[error("unknown entity &{0};")]
    UnknownEntity(String),

    #[error("document type declarations are not supported")]
    Doctype,

    #[error("content found after the root element")]
    TrailingContent,

    #[error("elements nested deeper than {MAX_DEPTH} levels")]
    TooDeep,
}

/// A node in the parsed tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An element with its children. Attributes are not retained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub children: Vec<Node>,
}

impl Element {
    /// Iterates over child elements, skipping text.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// Iterates over child elements with the given name.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.elements().filter(move |element| element.name == name)
    }

    /// Returns the first child element with the given name.
    pub fn child<'a>(&'a self, name: &str) -> Option<&'a Element> {
        self.elements().find(|element| element.name == name)
    }

    /// Concatenated text of the direct text children.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(text) => Some(text.as_str()),
                Node::Element(_) => None,
            })
            .collect()
    }
}

/// Parses a complete document and returns its root element.
///
/// # Errors
///
/// Returns an [`XmlError`] describing the first well-formedness problem found.
pub fn parse(input: &[u8]) -> Result<Element, XmlError> {
    let text = std::str::from_utf8(input).map_err(|_| XmlError::InvalidUtf8)?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut reader = Reader { src: text, pos: 0 };
    reader.skip_misc()?;
    if reader.eof() {
        return Err(XmlError::NoRoot);
    }
    if !reader.starts_with("<") {
        return Err(XmlError::Unexpected(reader.pos));
    }

    let root = reader.read_element(0)?;

    reader.skip_misc()?;
    if !reader.eof() {
        return Err(XmlError::TrailingContent);
    }

    Ok(root)
}

/// Appends `text` to `out` with markup characters escaped.
///
/// Control characters other than tab and newline are written as numeric
/// character references so that every string survives a round trip.
pub fn escape(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\t' | '\n' => out.push(ch),
            c if (c as u32) < 0x20 || c == '\u{7f}' => {
                out.push_str(&format!("&#x{:X};", c as u32));
            }
            c => out.push(c),
        }
    }
}

struct Reader<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Reader<'a> {
    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn eof(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn starts_with(&self, pattern: &str) -> bool {
        self.rest().starts_with(pattern)
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        let trimmed = rest.trim_start_matches(|c: char| c.is_ascii_whitespace());
        self.pos += rest.len() - trimmed.len();
    }

    fn skip_past(&mut self, pattern: &str) -> Result<(), XmlError> {
        match self.rest().find(pattern) {
            Some(index) => {
                self.pos += index + pattern.len();
                Ok(())
            }
            None => Err(XmlError::UnexpectedEof),
        }
    }

    fn expect(&mut self, pattern: &str) -> Result<(), XmlError> {
        if self.starts_with(pattern) {
            self.pos += pattern.len();
            Ok(())
        } else if self.eof() {
            Err(XmlError::UnexpectedEof)
        } else {
            Err(XmlError::Unexpected(self.pos))
        }
    }

    /// Skips the prolog, processing instructions, comments and whitespace
    /// around the root element.
    fn skip_misc(&mut self) -> Result<(), XmlError> {
        loop {
            self.skip_whitespace();
            if self.starts_with("<?") {
                self.skip_past("?>")?;
            } else if self.starts_with("<!--") {
                self.pos += 4;
                self.skip_past("-->")?;
            } else if self.starts_with("<!") {
                return Err(XmlError::Doctype);
            } else {
                return Ok(());
            }
        }
    }

    fn read_name(&mut self) -> Result<&'a str, XmlError> {
        let rest = self.rest();
        let end = rest
            .find(|c: char| c.is_ascii_whitespace() || matches!(c, '>' | '/' | '=' | '<'))
            .unwrap_or(rest.len());
        if end == 0 {
            return if self.eof() {
                Err(XmlError::UnexpectedEof)
            } else {
                Err(XmlError::Unexpected(self.pos))
            };
        }
        self.pos += end;
        Ok(&rest[..end])
    }

    fn read_attribute(&mut self) -> Result<(), XmlError> {
        self.read_name()?;
        self.skip_whitespace();
        self.expect("=")?;
        self.skip_whitespace();

        let quote = match self.rest().chars().next() {
            Some(q @ ('"' | '\'')) => q,
            Some(_) => return Err(XmlError::Unexpected(self.pos)),
            None => return Err(XmlError::UnexpectedEof),
        };
        self.pos += 1;

        let rest = self.rest();
        let end = rest.find(quote).ok_or(XmlError::UnexpectedEof)?;
        if rest[..end].contains('<') {
            return Err(XmlError::Unexpected(self.pos));
        }
        self.pos += end + 1;
        Ok(())
    }

    fn read_element(&mut self, depth: usize) -> Result<Element, XmlError> {
        if depth >= MAX_DEPTH {
            return Err(XmlError::TooDeep);
        }

        self.expect("<")?;
        let name = self.read_name()?.to_string();

        loop {
            self.skip_whitespace();
            if self.starts_with("/>") {
                self.pos += 2;
                return Ok(Element {
                    name,
                    children: Vec::new(),
                });
            }
            if self.starts_with(">") {
                self.pos += 1;
                break;
            }
            if self.eof() {
                return Err(XmlError::UnexpectedEof);
            }
            self.read_attribute()?;
        }

        let children = self.read_content(&name, depth)?;
        Ok(Element { name, children })
    }

    fn read_content(&mut self, name: &str, depth: usize) -> Result<Vec<Node>, XmlError> {
        let mut children = Vec::new();
        let mut text = String::new();

        loop {
            if self.eof() {
                return Err(XmlError::UnexpectedEof);
            }

            if self.starts_with("</") {
                self.pos += 2;
                let closing = self.read_name()?;
                self.skip_whitespace();
                self.expect(">")?;
                if closing != name {
                    return Err(XmlError::Mismatched {
                        expected: name.to_string(),
                        found: closing.to_string(),
                    });
                }
                flush_text(&mut text, &mut children);
                return Ok(children);
            } else if self.starts_with("<!--") {
                self.pos += 4;
                self.skip_past("-->")?;
            } else if self.starts_with("<![CDATA[") {
                self.pos += 9;
                let rest = self.rest();
                let end = rest.find("]]>").ok_or(XmlError::UnexpectedEof)?;
                text.push_str(&rest[..end]);
                self.pos += end + 3;
            } else if self.starts_with("<?") {
                self.skip_past("?>")?;
            } else if self.starts_with("<!") {
                return Err(XmlError::Doctype);
            } else if self.starts_with("<") {
                flush_text(&mut text, &mut children);
                children.push(Node::Element(self.read_element(depth + 1)?));
            } else {
                let rest = self.rest();
                let end = rest.find('<').unwrap_or(rest.len());
                decode_entities(&rest[..end], &mut text)?;
                self.pos += end;
            }
        }
    }
}

fn flush_text(text: &mut String, children: &mut Vec<Node>) {
    if !text.is_empty() {
        children.push(Node::Text(std::mem::take(text)));
    }
}

fn decode_entities(raw: &str, out: &mut String) -> Result<(), XmlError> {
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        let semi = after
            .find(';')
            .ok_or_else(|| XmlError::UnknownEntity(after.chars().take(8).collect()))?;
        out.push(resolve_entity(&after[..semi])?);
        rest = &after[semi + 1..];
    }
    out.push_str(rest);
    Ok(())
}

fn resolve_entity(entity: &str) -> Result<char, XmlError> {
    let resolved = match entity {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            if let Some(hex) = entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(decimal) = entity.strip_prefix('#') {
                decimal.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                None
            }
        }
    };

    resolved.ok_or_else(|| XmlError::UnknownEntity(entity.to_string()))
}
