//! Parsing of free-text model replies.
//!
//! Models are asked for `[["a", "b"], ...]` but routinely wrap the list in
//! prose or code fences, use full-width punctuation, single quotes, bare
//! numbers or trailing commas. The parser accepts all of those.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

fn trailing_comma() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r",\s*([\]}])").expect("static regex"))
}

fn loose_pair() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"\[\s*["']?([^"'\[\],]+?)["']?\s*,\s*["']?([^"'\[\]]*?)["']?\s*\]"#)
            .expect("static regex")
    })
}

fn digits() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+").expect("static regex"))
}

/// Extract the first list of pairs from a model reply.
///
/// Returns an empty vector when the reply holds no list.
pub fn parse_pairs(text: &str) -> Vec<(String, String)> {
    let normalized = normalize_punctuation(text);
    let Some(list) = first_bracketed(&normalized) else {
        return Vec::new();
    };

    if let Some(pairs) = parse_json_pairs(list) {
        return pairs;
    }
    if let Some(pairs) = parse_json_pairs(&list.replace('\'', "\"")) {
        return pairs;
    }

    log::debug!("reply is not valid JSON, scanning for pairs");
    loose_pair()
        .captures_iter(list)
        .map(|caps| (caps[1].trim().to_string(), caps[2].trim().to_string()))
        .collect()
}

/// First run of ASCII digits in `text`, as a number.
pub fn first_integer(text: &str) -> Option<u32> {
    digits().find(text)?.as_str().parse().ok()
}

fn normalize_punctuation(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '，' => ',',
            '［' | '【' => '[',
            '］' | '】' => ']',
            '“' | '”' => '"',
            '‘' | '’' => '\'',
            other => other,
        })
        .collect()
}

/// The first balanced `[...]` span, ignoring brackets inside double quotes.
/// An unterminated list runs to the end of the text.
fn first_bracketed(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }

    Some(&text[start..])
}

fn parse_json_pairs(list: &str) -> Option<Vec<(String, String)>> {
    let cleaned = trailing_comma().replace_all(list, "$1");
    let values: Vec<Value> = serde_json::from_str(&cleaned).ok()?;

    let pairs: Vec<(String, String)> = values
        .iter()
        .filter_map(|value| match value {
            Value::Array(items) if items.len() >= 2 => {
                Some((scalar_text(&items[0]), scalar_text(&items[1])))
            }
            _ => None,
        })
        .collect();

    if pairs.is_empty() && !values.is_empty() {
        return None;
    }
    Some(pairs)
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
