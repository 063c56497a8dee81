//! Text cleanup for scraped strings.
//!
//! Scraped descriptions arrive with a mix of markup, HTML entities (sometimes
//! double-encoded), UTF-8 decoded as Windows-1252 ("mojibake") and ragged
//! whitespace. [`normalize_text`] runs the full pipeline:
//! repair mojibake → drop markup and decode entities → drop leftover entity
//! debris → collapse whitespace.

use std::sync::LazyLock;

use regex::Regex;
use scraper::Html;

static SCRIPT_STYLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>")
        .expect("valid regex")
});
static BLOCK_BREAK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<br\s*/?>|</(?:p|div|li|ul|ol|tr|td|th|h[1-6])\s*>").expect("valid regex")
});
static ENTITY_DEBRIS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(?:[a-zA-Z][a-zA-Z0-9]{1,7}|#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6});")
        .expect("valid regex")
});
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// UTF-8 sequences that were decoded as Windows-1252. Longer sequences come
/// first so `"â€"` prefixes do not shadow them.
const MOJIBAKE: &[(&str, &str)] = &[
    ("\u{e2}\u{20ac}\u{2122}", "\u{2019}"),
    ("\u{e2}\u{20ac}\u{2dc}", "\u{2018}"),
    ("\u{e2}\u{20ac}\u{153}", "\u{201c}"),
    ("\u{e2}\u{20ac}\u{9d}", "\u{201d}"),
    ("\u{e2}\u{20ac}\u{201c}", "\u{2013}"),
    ("\u{e2}\u{20ac}\u{201d}", "\u{2014}"),
    ("\u{e2}\u{20ac}\u{a2}", "\u{2022}"),
    ("\u{e2}\u{20ac}\u{a6}", "\u{2026}"),
    ("\u{e2}\u{201a}\u{b9}", "\u{20b9}"),
    ("\u{e2}\u{20ac}", "\""),
    ("\u{c3}\u{a9}", "\u{e9}"),
    ("\u{c3}\u{a8}", "\u{e8}"),
    ("\u{c3}\u{b1}", "\u{f1}"),
    ("\u{ef}\u{bb}\u{bf}", ""),
    ("\u{c2}\u{a0}", " "),
    ("\u{c2}\u{b0}", "\u{b0}"),
    ("\u{c2}", ""),
];

/// Invisible or replacement characters that survive decoding.
const STRAY_CHARS: &[char] = &['\u{fffd}', '\u{200b}', '\u{200c}', '\u{200d}', '\u{feff}'];

/// Maximum number of decode passes; covers `&amp;amp;` style double encoding.
const MAX_DECODE_PASSES: usize = 3;

/// Runs the full cleanup pipeline over `raw`.
#[must_use]
pub fn normalize_text(raw: &str) -> String {
    let repaired = repair_mojibake(raw);
    let decoded = decode_html(&repaired);
    let without_debris = ENTITY_DEBRIS_RE.replace_all(&decoded, " ");
    let visible: String = without_debris
        .chars()
        .filter(|c| !STRAY_CHARS.contains(c) && (!c.is_control() || c.is_whitespace()))
        .collect();
    collapse_whitespace(&visible)
}

/// Replaces known Windows-1252 misreadings of UTF-8 punctuation.
#[must_use]
pub fn repair_mojibake(raw: &str) -> String {
    if !raw.contains(['\u{e2}', '\u{c2}', '\u{c3}', '\u{ef}']) {
        return raw.to_owned();
    }
    MOJIBAKE
        .iter()
        .fold(raw.to_owned(), |acc, (broken, fixed)| acc.replace(broken, fixed))
}

/// Strips markup and decodes entities. Entity-encoded markup (`&lt;b&gt;`)
/// is decoded on one pass and stripped on the next.
#[must_use]
pub fn decode_html(raw: &str) -> String {
    let mut current = raw.to_owned();
    for _ in 0..MAX_DECODE_PASSES {
        if !current.contains(['<', '&']) {
            break;
        }
        let without_scripts = SCRIPT_STYLE_RE.replace_all(&current, " ");
        let with_breaks = BLOCK_BREAK_RE.replace_all(&without_scripts, " ");
        let fragment = Html::parse_fragment(&with_breaks);
        let next: String = fragment.root_element().text().collect();
        if next == current {
            break;
        }
        current = next;
    }
    current
}

/// Collapses runs of whitespace (including non-breaking spaces) to a single
/// space and trims the ends.
#[must_use]
pub fn collapse_whitespace(raw: &str) -> String {
    WHITESPACE_RE.replace_all(raw, " ").trim().to_owned()
}
