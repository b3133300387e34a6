use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// Three-letter federation codes used by the ranking and statistics sites
const COUNTRY_CODES: &[(&str, &str)] = &[
    ("SLO", "Slovenia"), ("DEN", "Denmark"), ("BEL", "Belgium"), ("NED", "Netherlands"),
    ("FRA", "France"), ("ESP", "Spain"), ("ITA", "Italy"), ("GBR", "United Kingdom"),
    ("USA", "United States"), ("AUS", "Australia"), ("COL", "Colombia"), ("ECU", "Ecuador"),
    ("POR", "Portugal"), ("GER", "Germany"), ("SUI", "Switzerland"), ("AUT", "Austria"),
    ("NOR", "Norway"), ("POL", "Poland"), ("CZE", "Czech Republic"), ("IRL", "Ireland"),
    ("ERI", "Eritrea"), ("RSA", "South Africa"), ("NZL", "New Zealand"), ("CAN", "Canada"),
    ("KAZ", "Kazakhstan"), ("RUS", "Russia"), ("UKR", "Ukraine"), ("LUX", "Luxembourg"),
    ("SVK", "Slovakia"), ("HUN", "Hungary"), ("LAT", "Latvia"), ("EST", "Estonia"),
    ("LTU", "Lithuania"), ("MEX", "Mexico"), ("ARG", "Argentina"), ("VEN", "Venezuela"),
    ("JPN", "Japan"), ("CHN", "China"), ("KOR", "South Korea"), ("GRE", "Greece"),
    ("CRO", "Croatia"), ("SRB", "Serbia"), ("ROU", "Romania"), ("BUL", "Bulgaria"),
];

static BIRTHDATE_IN_TEXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{1,2}-\w{3}-\d{4}").expect("valid birthdate regex"));

const BIRTHDATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d-%b-%Y"];

/// Code → nationality lookup. Unknown values pass through untouched.
#[derive(Debug, Clone)]
pub struct CountryTable {
    by_code: HashMap<String, String>,
}

impl CountryTable {
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let by_code = entries
            .into_iter()
            .map(|(code, name)| (code.as_ref().to_ascii_uppercase(), name.into()))
            .collect();
        Self { by_code }
    }

    pub fn builtin() -> Self {
        Self::new(COUNTRY_CODES.iter().copied())
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }

    pub fn name_for(&self, code: &str) -> Option<&str> {
        self.by_code
            .get(&code.trim().to_ascii_uppercase())
            .map(String::as_str)
    }

    /// Resolve a scraped nationality. Codes map to names; anything else is
    /// returned trimmed.
    pub fn resolve(&self, value: &str) -> String {
        let trimmed = value.trim();
        self.name_for(trimmed)
            .map(str::to_string)
            .unwrap_or_else(|| trimmed.to_string())
    }
}

impl Default for CountryTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Whole years between a birth date and `as_of`.
///
/// Accepts `1998-09-21` and `21-Sep-1998`, and will pick the latter out of
/// surrounding text such as `"21-Sep-1998 (27)"`. Returns `None` for anything
/// unparseable or for birth dates after `as_of`.
pub fn age_from_birthdate(text: &str, as_of: NaiveDate) -> Option<u32> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let born = parse_birthdate(text).or_else(|| {
        BIRTHDATE_IN_TEXT
            .find(text)
            .and_then(|m| parse_birthdate(m.as_str()))
    })?;
    age_on(born, as_of)
}

fn parse_birthdate(text: &str) -> Option<NaiveDate> {
    BIRTHDATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
}

fn age_on(born: NaiveDate, as_of: NaiveDate) -> Option<u32> {
    if born > as_of {
        return None;
    }
    let mut years = as_of.year() - born.year();
    if (as_of.month(), as_of.day()) < (born.month(), born.day()) {
        years -= 1;
    }
    u32::try_from(years).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_codes_resolve_case_insensitively() {
        let table = CountryTable::builtin();
        assert_eq!(table.resolve("SLO"), "Slovenia");
        assert_eq!(table.resolve(" den "), "Denmark");
        assert_eq!(table.resolve("Bul"), "Bulgaria");
    }

    #[test]
    fn test_unknown_values_pass_through() {
        let table = CountryTable::builtin();
        assert_eq!(table.resolve("Portugal"), "Portugal");
        assert_eq!(table.resolve("XYZ"), "XYZ");
        assert_eq!(table.resolve(""), "");
    }

    #[test]
    fn test_custom_table_replaces_builtin() {
        let table = CountryTable::new([("por", "Portugal")]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.resolve("POR"), "Portugal");
        assert_eq!(table.resolve("SLO"), "SLO");
    }

    #[test]
    fn test_age_before_and_after_birthday() {
        let as_of = date(2026, 10, 15);
        assert_eq!(age_from_birthdate("1998-09-21", as_of), Some(28));
        assert_eq!(age_from_birthdate("1998-10-16", as_of), Some(27));
        assert_eq!(age_from_birthdate("1998-10-15", as_of), Some(28));
    }

    #[test]
    fn test_age_from_day_month_name_format() {
        let as_of = date(2026, 10, 15);
        assert_eq!(age_from_birthdate("21-Sep-1998", as_of), Some(28));
        assert_eq!(age_from_birthdate("born 5-Dec-2000 in Herentals", as_of), Some(25));
    }

    #[test]
    fn test_age_rejects_garbage_and_future_dates() {
        let as_of = date(2026, 10, 15);
        assert_eq!(age_from_birthdate("", as_of), None);
        assert_eq!(age_from_birthdate("unknown", as_of), None);
        assert_eq!(age_from_birthdate("2030-01-01", as_of), None);
    }
}
