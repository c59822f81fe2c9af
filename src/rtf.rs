//! Plain text out of the RTF book documents of the published archive.
//!
//! Only what the book documents use is handled: groups, ignorable
//! destinations, paragraph breaks, `\'hh` and `\uN` characters and the
//! non-breaking space that separates verse numbers from verse text.

use once_cell::sync::Lazy;
use regex::Regex;

static RTF_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\\([a-z]{1,32})(-?[0-9]{1,10})?[ ]?|\\'([0-9a-f]{2})|\\([^a-z])|([{}])|[\r\n]+|(.)",
    )
    .expect("valid rtf token pattern")
});

/// Destinations whose text never reaches the reader.
const IGNORED_DESTINATIONS: &[&str] = &[
    "annotation",
    "author",
    "buptim",
    "colortbl",
    "comment",
    "creatim",
    "doccomm",
    "fonttbl",
    "footer",
    "footerf",
    "footerl",
    "footerr",
    "footnote",
    "header",
    "headerf",
    "headerl",
    "headerr",
    "info",
    "keywords",
    "listtable",
    "listoverridetable",
    "operator",
    "pict",
    "printim",
    "revtim",
    "rsidtbl",
    "stylesheet",
    "subject",
    "title",
];

fn control_word_text(word: &str) -> Option<&'static str> {
    let text = match word {
        "par" | "line" | "row" => "\n",
        "sect" | "page" => "\n\n",
        "tab" | "cell" => "\t",
        "emdash" => "\u{2014}",
        "endash" => "\u{2013}",
        "emspace" | "enspace" | "qmspace" => " ",
        "lquote" => "\u{2018}",
        "rquote" => "\u{2019}",
        "ldblquote" => "\u{201C}",
        "rdblquote" => "\u{201D}",
        "bullet" => "\u{2022}",
        _ => return None,
    };
    Some(text)
}

pub fn is_rtf(text: &str) -> bool {
    text.trim_start().starts_with("{\\rtf")
}

/// Strips RTF markup, keeping the document text.
pub fn to_text(rtf: &str) -> String {
    let mut out = String::with_capacity(rtf.len() / 2);
    let mut stack: Vec<(usize, bool)> = Vec::new();
    let mut ignorable = false;
    // Characters to drop after a `\uN` (its ANSI fallback).
    let mut unicode_skip = 1usize;
    let mut skip = 0usize;

    for caps in RTF_TOKEN.captures_iter(rtf) {
        if let Some(brace) = caps.get(5) {
            skip = 0;
            if brace.as_str() == "{" {
                stack.push((unicode_skip, ignorable));
            } else if let Some((outer_skip, outer_ignorable)) = stack.pop() {
                unicode_skip = outer_skip;
                ignorable = outer_ignorable;
            }
        } else if let Some(symbol) = caps.get(4) {
            skip = 0;
            match symbol.as_str() {
                "~" if !ignorable => out.push('\u{a0}'),
                "_" if !ignorable => out.push('\u{2011}'),
                "{" | "}" | "\\" if !ignorable => out.push_str(symbol.as_str()),
                "*" => ignorable = true,
                _ => {}
            }
        } else if let Some(word) = caps.get(1) {
            skip = 0;
            let word = word.as_str().to_ascii_lowercase();
            let arg = caps.get(2).and_then(|arg| arg.as_str().parse::<i64>().ok());
            if IGNORED_DESTINATIONS.contains(&word.as_str()) {
                ignorable = true;
            } else if ignorable {
                continue;
            } else if let Some(text) = control_word_text(&word) {
                out.push_str(text);
            } else if word == "uc" {
                unicode_skip = arg.and_then(|n| usize::try_from(n).ok()).unwrap_or(1);
            } else if word == "u" {
                if let Some(code) = arg {
                    let code = if code < 0 { code + 0x10000 } else { code };
                    if let Some(ch) = u32::try_from(code).ok().and_then(char::from_u32) {
                        out.push(ch);
                    }
                    skip = unicode_skip;
                }
            }
        } else if let Some(hex) = caps.get(3) {
            if skip > 0 {
                skip -= 1;
            } else if !ignorable {
                if let Ok(byte) = u8::from_str_radix(hex.as_str(), 16) {
                    out.push(char::from(byte));
                }
            }
        } else if let Some(text) = caps.get(6) {
            if skip > 0 {
                skip -= 1;
            } else if !ignorable {
                out.push_str(text.as_str());
            }
        }
    }

    out
}
