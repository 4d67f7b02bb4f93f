/// Answer the model gives when a filing announces nothing new.
pub const NO_PRODUCT: &str = "No new product found";

pub const NAME_LABEL: &str = "New Product Name:";
pub const DESCRIPTION_LABEL: &str = "Product Description:";

/// Build the extraction prompt for one filing.
///
/// `max_chars` caps the filing text (counted in characters); `None` sends the full document.
pub fn build_prompt(company: &str, ticker: &str, text: &str, max_chars: Option<usize>) -> String {
    let text = match max_chars {
        Some(max) => truncate_chars(text, max),
        None => text,
    };

    format!(
        "Analyze this SEC 8-K filing and extract information about any new product releases or announcements.\n\
         \n\
         Company: {company}\n\
         Ticker: {ticker}\n\
         \n\
         Task: Extract the following information in a structured format:\n\
         1. {NAME_LABEL} [Name of the new product]\n\
         2. {DESCRIPTION_LABEL} [Brief description of the product, less than {max} characters]\n\
         \n\
         If no new product is mentioned in the filing, respond with \"{NO_PRODUCT}\".\n\
         \n\
         Filing content:\n\
         {text}\n",
        max = super::MAX_DESCRIPTION_CHARS,
    )
}

/// The longest prefix of `s` holding at most `max` characters.
pub(crate) fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_names_the_company_and_answer_format() {
        let prompt = build_prompt("Acme Corp", "ACME", "Acme launched RoadRunner.", None);

        assert!(prompt.contains("Company: Acme Corp"));
        assert!(prompt.contains("Ticker: ACME"));
        assert!(prompt.contains("1. New Product Name:"));
        assert!(prompt.contains("2. Product Description:"));
        assert!(prompt.contains("less than 180 characters"));
        assert!(prompt.contains("\"No new product found\""));
        assert!(prompt.ends_with("Acme launched RoadRunner.\n"));
    }

    #[test]
    fn document_text_is_capped() {
        let prompt = build_prompt("Acme Corp", "ACME", "abcdefghij", Some(4));
        assert!(prompt.ends_with("Filing content:\nabcd\n"));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("hi", 10), "hi");
        assert_eq!(truncate_chars("", 3), "");
    }
}
