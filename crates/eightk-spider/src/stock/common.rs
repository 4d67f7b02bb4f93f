use serde::{Deserialize, Deserializer};

/// Deserialize a CIK into the 10-digit, zero-padded form used by EDGAR URLs.
///
/// `company_tickers.json` stores the CIK as a number (`320193`), while the submissions API
/// names its files `CIK0000320193.json`; both forms are accepted.
pub(crate) fn de_cik<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Cik {
        Num(u64),
        Str(String),
    }

    match Cik::deserialize(deserializer)? {
        Cik::Num(num) => Ok(format!("{num:010}")),
        Cik::Str(s) => {
            let s = s.trim();
            if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) {
                return Err(serde::de::Error::custom(format!("invalid CIK \"{s}\"")));
            }
            Ok(format!("{s:0>10}"))
        }
    }
}

/// Parse an EDGAR `YYYY-MM-DD` date.
pub(crate) fn convert_date_type(date: &str) -> Option<chrono::NaiveDate> {
    chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Wrapper {
        #[serde(deserialize_with = "de_cik")]
        cik: String,
    }

    #[test]
    fn numeric_and_string_ciks_are_padded() {
        let num: Wrapper = serde_json::from_str(r#"{"cik": 320193}"#).unwrap();
        assert_eq!(num.cik, "0000320193");

        let s: Wrapper = serde_json::from_str(r#"{"cik": "789019"}"#).unwrap();
        assert_eq!(s.cik, "0000789019");
    }

    #[test]
    fn non_numeric_cik_is_rejected() {
        assert!(serde_json::from_str::<Wrapper>(r#"{"cik": "abc"}"#).is_err());
    }

    #[test]
    fn edgar_dates() {
        assert_eq!(
            convert_date_type("2024-02-01"),
            chrono::NaiveDate::from_ymd_opt(2024, 2, 1)
        );
        assert_eq!(convert_date_type("02/01/2024"), None);
    }
}
