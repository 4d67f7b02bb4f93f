use super::prompt::{truncate_chars, NO_PRODUCT};
use super::MAX_DESCRIPTION_CHARS;
use regex::Regex;

lazy_static::lazy_static! {
    static ref THINK: Regex = Regex::new(r"(?s)<think>.*?</think>").expect("valid think regex");
    static ref NAME: Regex =
        Regex::new(r"(?im)new product name[*_ \t]*:[*_ \t]*(.*)$").expect("valid name regex");
    static ref DESCRIPTION: Regex =
        Regex::new(r"(?im)product description[*_ \t]*:[*_ \t]*(.*)$").expect("valid description regex");
    static ref LABEL: Regex =
        Regex::new(r"(?i)(new product name|product description)[*_ \t]*:").expect("valid label regex");
}

// answers that fill the name slot without naming anything
const PLACEHOLDERS: &[&str] = &[
    "n/a",
    "na",
    "none",
    "not applicable",
    "not mentioned",
    "not specified",
    "unknown",
    "name of the new product",
];

/// Product fields read out of a model answer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProductInfo {
    pub name: String,
    /// At most [`MAX_DESCRIPTION_CHARS`] characters; may be empty.
    pub description: String,
}

/// Parse a model answer.
///
/// Returns `None` when the model reports no new product, or when no usable product name can be
/// found in the answer.
pub fn parse_response(raw: &str) -> Option<ProductInfo> {
    let answer = THINK.replace_all(raw, "");
    let answer = answer.trim();

    if reports_no_product(answer) {
        return None;
    }

    let name = capture(&NAME, answer)?;
    if is_placeholder(&name) {
        return None;
    }

    let description = capture(&DESCRIPTION, answer)
        .map(|d| truncate_chars(&d, MAX_DESCRIPTION_CHARS).trim_end().to_string())
        .unwrap_or_default();

    Some(ProductInfo { name, description })
}

// the phrase counts only at the start of a line, not inside a description
fn reports_no_product(answer: &str) -> bool {
    let no_product = NO_PRODUCT.to_lowercase();
    answer
        .lines()
        .any(|line| clean(line).to_lowercase().starts_with(&no_product))
}

/// Value after `re`'s label, or on the next non-empty line when the label ends its line.
fn capture(re: &Regex, answer: &str) -> Option<String> {
    let caps = re.captures(answer)?;
    let value = clean(caps.get(1)?.as_str());
    if !value.is_empty() {
        return Some(value.to_string());
    }

    let rest = &answer[caps.get(0)?.end()..];
    let next = rest.lines().map(clean).find(|line| !line.is_empty())?;
    if LABEL.is_match(next) {
        None
    } else {
        Some(next.to_string())
    }
}

fn clean(value: &str) -> &str {
    value
        .trim()
        .trim_matches(|c: char| c == '*' || c == '_' || c == '"' || c == '`')
        .trim()
}

fn is_placeholder(name: &str) -> bool {
    let name = name
        .trim_matches(|c: char| c == '[' || c == ']' || c == '.' || c.is_whitespace())
        .to_lowercase();
    PLACEHOLDERS.contains(&name.as_str()) || name.starts_with(&NO_PRODUCT.to_lowercase())
}
