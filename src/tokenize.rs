//! Social-media-aware tokenizer.
//!
//! A single composite regex is matched leftmost-first over the input; the
//! alternatives are ordered by priority, so e.g. `:)` becomes an emoticon
//! before it could fall through to two single-character tokens. The pattern
//! follows the "happier fun" tokenizer used by the WWBP lexica, so tokens line
//! up with the keys those lexica were built from.

use once_cell::sync::Lazy;
use regex::Regex;

const PHONE: &str = r"(?:(?:\+?[01][\-\s.]*)?(?:\(?[0-9]{3}[\-\s.)]*)?[0-9]{3}[\-\s.]*[0-9]{4})";
const EMOTICON: &str = concat!(
    r"(?:[<>]?[:;=8>][\-o*']?[)\](\[dpx/:}{@|\\]",
    r"|[)\](\[dpx/:}{@|\\][\-o*']?[:;=8<][<>]?",
    r"|<3",
    r"|\(?\(?\#?\(?\(?\#?[>\-\^*+o\~][_.|o,][<\-\^*+o\~][\#;]?\)?\)?)",
);
const DOMAIN: &str = concat!(
    r"(?:(?:https?://)?(?:[0-9a-z_\-]+\.)+",
    r"(?:com|net|gov|edu|info|org|ly|be|gl|co|gs|pr|me|cc|us|gd|nl|ws|am|im|fm|kr|to|jp|sg))",
);
const SCHEME: &str = r"(?:https?://)";
const BRACKET_TAG: &str = r"(?:\[[a-z_]+\])";
const QUERY: &str = r"(?:/[0-9a-z_]+\?(?:;?[0-9a-z_]+=[0-9a-z_]+)+)";
const HTML_TAG: &str = r"<[^>]+>";
const MENTION: &str = r"(?:@[0-9a-z_]+)";
const HASHTAG: &str = r"(?:\#+[0-9a-z_]+[0-9a-z_'\-]*[0-9a-z_]+)";
const INNER_WORD: &str = r"(?:[a-z][a-z'\-_]+[a-z])";
const NUMBER: &str = r"(?:[+\-]?[0-9]+[,/.:\-][0-9]+[+\-]?)";
const WORD: &str = r"(?:[0-9a-z_]+)";
const ELLIPSIS: &str = r"(?:\.(?:\s*\.)+)";
const ANY: &str = r"(?:\S)";

/// Alternatives in priority order. The ones that only ever match ASCII are
/// case-insensitive under `(?i-u)`, which keeps `k` and `s` from also
/// matching U+212A and U+017F.
static TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    let alternatives = [
        (PHONE, true),
        (EMOTICON, true),
        (DOMAIN, true),
        (SCHEME, true),
        (BRACKET_TAG, true),
        (QUERY, true),
        (HTML_TAG, false),
        (MENTION, true),
        (HASHTAG, true),
        (INNER_WORD, true),
        (NUMBER, true),
        (WORD, true),
        (ELLIPSIS, true),
        (ANY, false),
    ];
    let pattern = alternatives
        .iter()
        .map(|&(alt, ascii)| {
            if ascii {
                format!("(?i-u:{alt})")
            } else {
                alt.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&pattern).expect("tokenizer regex")
});

static MULTI_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s\s+").expect("whitespace regex"));

/// Split `text` into tokens, optionally cleaning it first.
///
/// Input is expected to be trimmed and lower-cased already; see
/// [`crate::analyze::AnalysisSession`].
pub fn tokenize(text: &str, clean: bool) -> Vec<String> {
    let cleaned;
    let text = if clean {
        cleaned = clean_text(text);
        cleaned.as_str()
    } else {
        text
    };
    TOKEN_RE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Decode HTML entities, fold typographic punctuation to ASCII, drop anything
/// still non-ASCII and collapse whitespace runs.
pub fn clean_text(s: &str) -> String {
    // 1) HTML entity decode
    let decoded = html_escape::decode_html_entities(s);

    // 2) Smart quotes, dashes and ellipses to ASCII (before the ASCII filter,
    //    otherwise they would simply vanish)
    let folded = decoded
        .replace(['\u{2018}', '\u{2019}'], "'")
        .replace(['\u{201C}', '\u{201D}'], "\"")
        .replace(['\u{2013}', '\u{2014}'], "-")
        .replace('\u{2026}', "...")
        .replace('\u{00A0}', " ");

    // 3) Strip non-ASCII
    let ascii: String = folded.chars().filter(char::is_ascii).collect();

    // 4) Collapse whitespace
    MULTI_WS.replace_all(&ascii, " ").into_owned()
}

/// Whitespace-separated word count of the (trimmed) input, reported next to
/// the token count.
pub fn true_word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
