//! Plain-text → HTML e-mail renderer.
//!
//! # Passes
//!
//! 1. **Tokenize**: every block placeholder key is swapped for a private
//!    marker so paragraph splitting can tell "the whole paragraph is a block"
//!    from "a block mentioned inside prose".
//! 2. **Segment**: split on blank lines, drop whitespace-only paragraphs.
//! 3. **Wrap**: a paragraph that is exactly one marker becomes its raw HTML
//!    fragment; anything else becomes `<p>…</p>` with `<br />` line breaks
//!    and inline markers expanded in place.
//! 4. **Join** with `\n`.
//! 5. **Substitute** text placeholders over the joined HTML.
//!
//! All key matching is literal; keys may contain any characters.

use std::sync::OnceLock;

use regex::Regex;

// ---------------------------------------------------------------------------
// Placeholders
// ---------------------------------------------------------------------------

/// Ordered `key → value` substitution map.
///
/// Iteration follows insertion order, which decides the winner when one key
/// is a substring of another. Re-inserting a key replaces its value without
/// moving it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Placeholders {
    entries: Vec<(String, String)>,
}

impl Placeholders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
        self
    }

    /// Builder form of [`Placeholders::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Placeholders {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut placeholders = Placeholders::new();
        for (k, v) in iter {
            placeholders.insert(k, v);
        }
        placeholders
    }
}

// ---------------------------------------------------------------------------
// Render
// ---------------------------------------------------------------------------

const MARKER_OPEN: char = '\u{E000}';
const MARKER_CLOSE: char = '\u{E001}';

struct BlockMarker<'a> {
    marker: String,
    fragment: &'a str,
}

fn paragraph_break() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n\s*\n").expect("Invalid regex pattern"))
}

/// Render `plain_text` to HTML.
///
/// `html_placeholders` expand to block fragments (never wrapped in `<p>` when
/// they stand alone); `text_placeholders` are substituted literally after
/// wrapping. Keys absent from the text are ignored and tokens with no value
/// stay verbatim.
pub fn render(
    plain_text: &str,
    html_placeholders: &Placeholders,
    text_placeholders: &Placeholders,
) -> String {
    let normalized = plain_text.replace("\r\n", "\n");
    let (tokenized, blocks) = tokenize_blocks(&normalized, html_placeholders);

    let html = paragraph_break()
        .split(&tokenized)
        .filter(|paragraph| !paragraph.trim().is_empty())
        .map(|paragraph| render_paragraph(paragraph, &blocks))
        .collect::<Vec<_>>()
        .join("\n");

    substitute_text(html, text_placeholders)
}

/// Pass 1 output: user text interleaved with block slots.
enum Segment {
    Text(String),
    Block(usize),
}

fn push_text(segments: &mut Vec<Segment>, text: &str) {
    if !text.is_empty() {
        segments.push(Segment::Text(text.to_owned()));
    }
}

/// Pass 1: swap each block key for its marker.
///
/// Keys are applied in insertion order, each one only to text that no earlier
/// key has claimed, so a key can never match inside another block's marker.
fn tokenize_blocks<'p>(
    text: &str,
    html_placeholders: &'p Placeholders,
) -> (String, Vec<BlockMarker<'p>>) {
    let mut segments = vec![Segment::Text(text.to_owned())];
    let mut blocks = Vec::with_capacity(html_placeholders.len());
    for (key, fragment) in html_placeholders.iter() {
        if key.is_empty() {
            tracing::debug!("skipping empty block placeholder key");
            continue;
        }
        let slot = blocks.len();
        let mut next = Vec::with_capacity(segments.len());
        for segment in segments {
            match segment {
                Segment::Text(chunk) if chunk.contains(key) => {
                    let mut parts = chunk.split(key);
                    if let Some(first) = parts.next() {
                        push_text(&mut next, first);
                    }
                    for part in parts {
                        next.push(Segment::Block(slot));
                        push_text(&mut next, part);
                    }
                }
                other => next.push(other),
            }
        }
        segments = next;
        blocks.push(BlockMarker {
            marker: unique_marker(text, html_placeholders, slot),
            fragment,
        });
    }

    let mut tokenized = String::with_capacity(text.len());
    for segment in &segments {
        match segment {
            Segment::Text(chunk) => tokenized.push_str(chunk),
            Segment::Block(slot) => tokenized.push_str(&blocks[*slot].marker),
        }
    }
    (tokenized, blocks)
}

/// A marker that occurs neither in `text` nor in any fragment.
fn unique_marker(text: &str, html_placeholders: &Placeholders, slot: usize) -> String {
    let mut salt = 0usize;
    loop {
        let candidate = format!("{MARKER_OPEN}{slot}.{salt}{MARKER_CLOSE}");
        let taken = text.contains(&candidate)
            || html_placeholders
                .iter()
                .any(|(_, fragment)| fragment.contains(&candidate));
        if !taken {
            return candidate;
        }
        salt += 1;
    }
}

/// Pass 3 for a single paragraph.
fn render_paragraph(paragraph: &str, blocks: &[BlockMarker<'_>]) -> String {
    let trimmed = paragraph.trim();
    if let Some(block) = blocks.iter().find(|b| b.marker == trimmed) {
        return block.fragment.to_string();
    }

    // Line breaks before fragment expansion, never after: multi-line
    // fragments keep their own newlines.
    let mut prose = paragraph.replace('\n', "<br />");
    for block in blocks {
        if prose.contains(&block.marker) {
            prose = prose.replace(&block.marker, block.fragment);
        }
    }
    format!("<p>{prose}</p>")
}

/// Pass 5. Also used on subject lines, which are never paragraph-wrapped.
pub(crate) fn substitute_text(mut html: String, text_placeholders: &Placeholders) -> String {
    for (key, value) in text_placeholders.iter() {
        if key.is_empty() {
            continue;
        }
        html = html.replace(key, value);
    }
    html
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
