// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Best-effort conversion of captured documents into plain text.

use lazy_regex::{Captures, Lazy, Regex, lazy_regex};
use std::borrow::Cow;

/// Turns a document body into readable text. Never fails: malformed input
/// yields whatever text could be recovered, possibly none.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, body: &[u8], content_type: &str) -> String;
}

/// Extracts the visible text of HTML documents. Bodies of other content types
/// are returned as (lossily decoded) text.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlTextExtractor;

impl TextExtractor for HtmlTextExtractor {
    fn extract(&self, body: &[u8], content_type: &str) -> String {
        let text = String::from_utf8_lossy(body);
        if content_type.contains("html") {
            html_to_text(&text)
        } else {
            text.into_owned()
        }
    }
}

static SCRIPT: Lazy<Regex> = lazy_regex!(r"(?is)<script\b[^>]*>.*?</script\s*>");
static STYLE: Lazy<Regex> = lazy_regex!(r"(?is)<style\b[^>]*>.*?</style\s*>");
static NOSCRIPT: Lazy<Regex> = lazy_regex!(r"(?is)<noscript\b[^>]*>.*?</noscript\s*>");
static OBJECT: Lazy<Regex> = lazy_regex!(r"(?is)<object\b[^>]*>.*?</object\s*>");
static EMBED: Lazy<Regex> = lazy_regex!(r"(?is)<embed\b[^>]*>.*?</embed\s*>");
static HEAD: Lazy<Regex> = lazy_regex!(r"(?is)<head\b[^>]*>.*?</head\s*>");

/// Elements whose content is never rendered as text.
static HIDDEN_ELEMENTS: [&Lazy<Regex>; 6] = [&SCRIPT, &STYLE, &NOSCRIPT, &OBJECT, &EMBED, &HEAD];

static COMMENT: Lazy<Regex> = lazy_regex!(r"(?s)<!--.*?-->");
static TAG: Lazy<Regex> = lazy_regex!(r"(?s)<[^>]*>");
static ENTITY: Lazy<Regex> = lazy_regex!(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z]{2,8});");
static BLANK_RUN: Lazy<Regex> = lazy_regex!(r"\n[\r\n \t]*");

/// Strips markup from `html`, keeping one line per text node.
pub fn html_to_text(html: &str) -> String {
    let mut text = COMMENT.replace_all(html, "").into_owned();
    for element in HIDDEN_ELEMENTS {
        text = element.replace_all(&text, "").into_owned();
    }
    let text = TAG.replace_all(&text, "\n");
    let text = decode_entities(&text);
    BLANK_RUN.replace_all(&text, "\n").trim().to_owned()
}

/// Decodes numeric character references and the common named entities.
/// Unknown entities are kept verbatim.
pub fn decode_entities(text: &str) -> Cow<'_, str> {
    ENTITY.replace_all(text, |caps: &Captures| {
        let name = &caps[1];
        let decoded = match name.strip_prefix('#') {
            Some(number) => {
                let code = match number.strip_prefix(['x', 'X']) {
                    Some(hex) => u32::from_str_radix(hex, 16).ok(),
                    None => number.parse().ok(),
                };
                code.and_then(char::from_u32)
            }
            None => named_entity(name),
        };
        match decoded {
            Some(c) => c.to_string(),
            None => caps[0].to_owned(),
        }
    })
}

fn named_entity(name: &str) -> Option<char> {
    Some(match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "copy" => '©',
        "reg" => '®',
        "trade" => '™',
        "hellip" => '…',
        "mdash" => '—',
        "ndash" => '–',
        "laquo" => '«',
        "raquo" => '»',
        "lsquo" => '‘',
        "rsquo" => '’',
        "ldquo" => '“',
        "rdquo" => '”',
        "euro" => '€',
        "pound" => '£',
        "yen" => '¥',
        "cent" => '¢',
        "deg" => '°',
        "middot" => '·',
        "bull" => '•',
        _ => return None,
    })
}
