//! Boilerplate removal: splits a page into text blocks and classifies each
//! one as article content or page furniture (navigation, footers, ads).
//!
//! Classification follows the jusText approach: every block is first scored
//! on its own (length, link density, stopword density), then short and
//! borderline blocks take the class of their neighbours.

pub mod stoplists;

use std::sync::LazyLock;

use dom_query::{Document, NodeRef};
use regex::Regex;

pub use stoplists::Stoplist;

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

const LENGTH_LOW: usize = 70;
const LENGTH_HIGH: usize = 200;
const STOPWORDS_LOW: f64 = 0.30;
const STOPWORDS_HIGH: f64 = 0.32;
const MAX_LINK_DENSITY: f64 = 0.2;
const MAX_HEADING_DISTANCE: usize = 200;

/// Tags that open and close a block.
const BLOCK_TAGS: &[&str] = &[
    "body", "blockquote", "caption", "center", "col", "colgroup", "dd", "div", "dl", "dt",
    "fieldset", "form", "legend", "optgroup", "option", "p", "pre", "table", "td", "textarea",
    "tfoot", "th", "thead", "tr", "ul", "ol", "li", "h1", "h2", "h3", "h4", "h5", "h6",
    "article", "section", "header", "footer", "nav", "aside", "figure", "figcaption", "main",
];

/// Dropped with their whole subtree.
const SKIPPED_TAGS: &[&str] = &[
    "head", "script", "style", "noscript", "template", "iframe", "embed", "object", "svg",
    "select", "input", "button", "textarea",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassType {
    Good,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBlock {
    pub text: String,
    pub is_boilerplate: bool,
    pub is_heading: bool,
    pub class_type: ClassType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Class {
    Good,
    NearGood,
    Short,
    Bad,
}

#[derive(Debug)]
struct Paragraph {
    dom_path: Vec<String>,
    text: String,
    chars_in_links: usize,
    context_free: Class,
    class: Class,
}

impl Paragraph {
    fn is_heading(&self) -> bool {
        self.dom_path.iter().any(|tag| is_heading_tag(tag))
    }

    fn len(&self) -> usize {
        self.text.chars().count()
    }
}

fn is_heading_tag(tag: &str) -> bool {
    let bytes = tag.as_bytes();
    bytes.len() == 2 && bytes[0] == b'h' && bytes[1].is_ascii_digit()
}

/// Split `html` into blocks and classify them against `stoplist`.
pub fn classify(html: &str, stoplist: &Stoplist) -> Vec<TextBlock> {
    let doc = Document::from(html);
    let mut paragraphs = segment(&doc);

    for p in &mut paragraphs {
        p.context_free = classify_context_free(p, stoplist);
        p.class = p.context_free;
    }
    revise(&mut paragraphs);

    paragraphs
        .into_iter()
        .map(|p| {
            let is_heading = p.is_heading();
            let class_type = if p.class == Class::Good {
                ClassType::Good
            } else {
                ClassType::Other
            };
            TextBlock {
                text: p.text,
                is_boilerplate: class_type != ClassType::Good,
                is_heading,
                class_type,
            }
        })
        .collect()
}

// ── Segmentation ──

#[derive(Default)]
struct Segmenter {
    path: Vec<String>,
    paragraphs: Vec<Paragraph>,
    current: Vec<String>,
    current_path: Vec<String>,
    chars_in_links: usize,
    in_link: usize,
    after_br: bool,
}

fn segment(doc: &Document) -> Vec<Paragraph> {
    let mut seg = Segmenter::default();
    if let Some(body) = doc.select("body").nodes().first() {
        seg.walk(body);
    }
    seg.flush();
    seg.paragraphs
}

impl Segmenter {
    fn walk(&mut self, node: &NodeRef) {
        if node.is_text() {
            self.characters(&node.text());
            return;
        }
        if !node.is_element() {
            return;
        }
        let Some(name) = node.node_name() else {
            return;
        };
        let tag = name.to_ascii_lowercase();
        if SKIPPED_TAGS.contains(&tag.as_str()) {
            return;
        }

        self.path.push(tag.clone());
        let is_block = BLOCK_TAGS.contains(&tag.as_str());
        if is_block || (tag == "br" && self.after_br) {
            self.flush();
            self.after_br = false;
        } else if tag == "br" {
            self.after_br = true;
            self.current.push(" ".to_string());
        } else if tag == "a" {
            self.in_link += 1;
        }

        for child in node.children() {
            self.walk(&child);
        }

        self.path.pop();
        if is_block {
            self.flush();
        }
        if tag == "a" {
            self.in_link = self.in_link.saturating_sub(1);
        }
    }

    fn characters(&mut self, raw: &str) {
        if raw.trim().is_empty() {
            if !raw.is_empty() {
                self.current.push(" ".to_string());
            }
            return;
        }
        let text = normalize_whitespace(raw);
        if self.in_link > 0 {
            self.chars_in_links += text.trim().chars().count();
        }
        self.current.push(text);
        self.after_br = false;
    }

    /// Close the current paragraph and open a new one at the current path.
    fn flush(&mut self) {
        let text = normalize_whitespace(&self.current.concat()).trim().to_string();
        if !text.is_empty() {
            self.paragraphs.push(Paragraph {
                dom_path: std::mem::take(&mut self.current_path),
                text,
                chars_in_links: self.chars_in_links,
                context_free: Class::Bad,
                class: Class::Bad,
            });
        }
        self.current.clear();
        self.chars_in_links = 0;
        self.current_path = self.path.clone();
    }
}

fn normalize_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text, " ").into_owned()
}

// ── Classification ──

fn classify_context_free(p: &Paragraph, stoplist: &Stoplist) -> Class {
    let length = p.len();
    let link_density = p.chars_in_links as f64 / length.max(1) as f64;

    let words: Vec<&str> = p.text.split_whitespace().collect();
    let stopwords = words
        .iter()
        .filter(|w| {
            let word = w
                .trim_matches(|c: char| !c.is_alphanumeric() && c != '\'')
                .to_lowercase();
            stoplist.contains(word.as_str())
        })
        .count();
    let stopword_density = if words.is_empty() {
        0.0
    } else {
        stopwords as f64 / words.len() as f64
    };

    if link_density > MAX_LINK_DENSITY {
        return Class::Bad;
    }
    if p.text.contains('\u{a9}') || p.text.contains("&copy") {
        return Class::Bad;
    }
    if p.dom_path.iter().any(|tag| tag == "select") {
        return Class::Bad;
    }
    if length < LENGTH_LOW {
        return if p.chars_in_links > 0 {
            Class::Bad
        } else {
            Class::Short
        };
    }
    if stopword_density >= STOPWORDS_HIGH {
        if length > LENGTH_HIGH {
            Class::Good
        } else {
            Class::NearGood
        }
    } else if stopword_density >= STOPWORDS_LOW {
        Class::NearGood
    } else {
        Class::Bad
    }
}

/// Nearest neighbour that is Good or Bad (or NearGood when not ignored);
/// the document edges count as Bad.
fn neighbour(paragraphs: &[Paragraph], i: usize, forward: bool, ignore_neargood: bool) -> Class {
    let found = if forward {
        paragraphs[i + 1..]
            .iter()
            .map(|p| p.class)
            .find(|c| matches!(c, Class::Good | Class::Bad) || (*c == Class::NearGood && !ignore_neargood))
    } else {
        paragraphs[..i]
            .iter()
            .rev()
            .map(|p| p.class)
            .find(|c| matches!(c, Class::Good | Class::Bad) || (*c == Class::NearGood && !ignore_neargood))
    };
    found.unwrap_or(Class::Bad)
}

/// A Good paragraph within `MAX_HEADING_DISTANCE` characters after `i`.
fn good_follows(paragraphs: &[Paragraph], i: usize) -> bool {
    let mut distance = 0;
    for p in &paragraphs[i + 1..] {
        if distance > MAX_HEADING_DISTANCE {
            break;
        }
        if p.class == Class::Good {
            return true;
        }
        distance += p.len();
    }
    false
}

fn revise(paragraphs: &mut [Paragraph]) {
    // short headings right before good text
    for i in 0..paragraphs.len() {
        if paragraphs[i].is_heading() && paragraphs[i].class == Class::Short && good_follows(paragraphs, i) {
            paragraphs[i].class = Class::NearGood;
        }
    }

    // short blocks take their neighbours' class
    let view: &[Paragraph] = paragraphs;
    let revised: Vec<(usize, Class)> = (0..view.len())
        .filter(|&i| view[i].class == Class::Short)
        .map(|i| {
            let prev = neighbour(view, i, false, true);
            let next = neighbour(view, i, true, true);
            let class = match (prev, next) {
                (Class::Good, Class::Good) => Class::Good,
                (Class::Bad, Class::Bad) => Class::Bad,
                _ if (prev == Class::Bad && neighbour(view, i, false, false) == Class::NearGood)
                    || (next == Class::Bad && neighbour(view, i, true, false) == Class::NearGood) =>
                {
                    Class::Good
                }
                _ => Class::Bad,
            };
            (i, class)
        })
        .collect();
    for (i, class) in revised {
        paragraphs[i].class = class;
    }

    // near-good blocks survive unless surrounded by bad ones
    for i in 0..paragraphs.len() {
        if paragraphs[i].class != Class::NearGood {
            continue;
        }
        let prev = neighbour(paragraphs, i, false, true);
        let next = neighbour(paragraphs, i, true, true);
        paragraphs[i].class = if prev == Class::Bad && next == Class::Bad {
            Class::Bad
        } else {
            Class::Good
        };
    }

    // headings demoted by context but not by content
    for i in 0..paragraphs.len() {
        let p = &paragraphs[i];
        if p.is_heading() && p.class == Class::Bad && p.context_free != Class::Bad && good_follows(paragraphs, i) {
            paragraphs[i].class = Class::Good;
        }
    }
}
