// src/extractors/records.rs
use chrono::NaiveDate;

/// Date format used by the schedule's date column.
pub const DATE_FORMAT: &str = "%m/%d/%Y";

/// One contribution row from Schedule A1.
///
/// Unresolved fields are `None`; the placeholder text is chosen by the writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContributionRecord {
    /// The `MM/DD/YYYY` token as it appeared on the page.
    pub date: String,
    pub contributor_name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub occupation: Option<String>,
    pub employer: Option<String>,
    /// Always `$` followed by comma-grouped dollars and two cents digits.
    pub amount: String,
}

/// Composite key used to detect the same filing entry seen twice.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordKey {
    pub date: String,
    pub contributor_name: String,
    pub amount: String,
}

impl ContributionRecord {
    pub fn key(&self) -> RecordKey {
        RecordKey {
            date: self.date.clone(),
            contributor_name: self.contributor_name.clone(),
            amount: self.amount.clone(),
        }
    }

    /// Calendar date, or `None` when the token is date-shaped but not a real date.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, DATE_FORMAT).ok()
    }
}

/// A record tagged with the 1-based page it was found on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRecord {
    pub source_page: usize,
    pub record: ContributionRecord,
}

/// City, state and ZIP split out of an address line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressParts {
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
}

impl AddressParts {
    /// Split on the first comma, then split the remainder on whitespace.
    ///
    /// `"Austin, TX 78701"` gives city `Austin`, state `TX`, zip `78701`.
    pub fn parse(address: &str) -> Self {
        let Some((city, rest)) = address.split_once(',') else {
            return Self::default();
        };
        let mut tokens = rest.split_whitespace();
        Self {
            city: non_empty(city),
            state: tokens.next().and_then(non_empty),
            zip: tokens.next().and_then(non_empty),
        }
    }
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Render an amount token as `$1,234.56`.
///
/// Accepts tokens with or without a leading `$` and with or without comma
/// grouping. Returns `None` if the token is not `digits.dd`.
pub fn canonical_amount(token: &str) -> Option<String> {
    let bare: String = token
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    let (dollars, cents) = bare.split_once('.')?;
    if dollars.is_empty()
        || cents.len() != 2
        || !dollars.chars().all(|c| c.is_ascii_digit())
        || !cents.chars().all(|c| c.is_ascii_digit())
    {
        return None;
    }

    let dollars = dollars.trim_start_matches('0');
    let dollars = if dollars.is_empty() { "0" } else { dollars };

    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (i, c) in dollars.chars().enumerate() {
        if i > 0 && (dollars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    Some(format!("${}.{}", grouped, cents))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date: &str) -> ContributionRecord {
        ContributionRecord {
            date: date.to_string(),
            contributor_name: "Jane Doe".to_string(),
            address: None,
            city: None,
            state: None,
            zip: None,
            occupation: None,
            employer: None,
            amount: "$1.00".to_string(),
        }
    }

    #[test]
    fn test_address_parts_city_state_zip() {
        let parts = AddressParts::parse("Austin, TX 78701");
        assert_eq!(parts.city.as_deref(), Some("Austin"));
        assert_eq!(parts.state.as_deref(), Some("TX"));
        assert_eq!(parts.zip.as_deref(), Some("78701"));
    }

    #[test]
    fn test_address_parts_missing_pieces() {
        assert_eq!(AddressParts::parse("No comma here TX 7"), AddressParts::default());

        let parts = AddressParts::parse("Round Rock, TX");
        assert_eq!(parts.city.as_deref(), Some("Round Rock"));
        assert_eq!(parts.state.as_deref(), Some("TX"));
        assert_eq!(parts.zip, None);

        let parts = AddressParts::parse(", TX 78701");
        assert_eq!(parts.city, None);
        assert_eq!(parts.zip.as_deref(), Some("78701"));
    }

    #[test]
    fn test_address_parts_street_line_splits_on_first_comma() {
        let parts = AddressParts::parse("100 Congress Ave, Austin, TX 78701");
        assert_eq!(parts.city.as_deref(), Some("100 Congress Ave"));
        assert_eq!(parts.state.as_deref(), Some("Austin,"));
        assert_eq!(parts.zip.as_deref(), Some("TX"));
    }

    #[test]
    fn test_canonical_amount() {
        assert_eq!(canonical_amount("$500.00").as_deref(), Some("$500.00"));
        assert_eq!(canonical_amount("500.00").as_deref(), Some("$500.00"));
        assert_eq!(canonical_amount("1500.25").as_deref(), Some("$1,500.25"));
        assert_eq!(canonical_amount("$1,234,567.89").as_deref(), Some("$1,234,567.89"));
        assert_eq!(canonical_amount("0.50").as_deref(), Some("$0.50"));
        assert_eq!(canonical_amount("007.00").as_deref(), Some("$7.00"));
        assert_eq!(canonical_amount("12.5"), None);
        assert_eq!(canonical_amount("abc"), None);
    }

    #[test]
    fn test_parsed_date() {
        assert_eq!(
            record("01/15/2023").parsed_date(),
            NaiveDate::from_ymd_opt(2023, 1, 15)
        );
        assert_eq!(record("13/45/2023").parsed_date(), None);
    }

    #[test]
    fn test_key_ignores_secondary_fields() {
        let a = record("01/15/2023");
        let mut b = a.clone();
        b.occupation = Some("Engineer".to_string());
        b.address = Some("Austin, TX 78701".to_string());
        assert_eq!(a.key(), b.key());
    }
}
