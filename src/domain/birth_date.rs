//! Birth date entry
//!
//! Localized day/month/year text entry converted to a canonical date.
//! The canonical value exists only when all three components are present
//! and pass their range checks; anything else clears it.

use chrono::{Datelike, NaiveDate};

/// Raw day/month/year components as typed by the applicant.
///
/// # Invariants
/// - `canonical()` is `Some` only for a complete, in-range, real calendar date
/// - Editing any component recomputes the canonical value from scratch
///
/// # Example
/// ```
/// use member_enrollment::domain::BirthDateEntry;
///
/// let entry = BirthDateEntry::new("09", "08", "2010");
/// assert_eq!(entry.canonical_string().as_deref(), Some("2010-08-09"));
///
/// let partial = BirthDateEntry::new("09", "", "2010");
/// assert!(partial.canonical().is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BirthDateEntry {
    day: String,
    month: String,
    year: String,
    canonical: Option<NaiveDate>,
}

impl BirthDateEntry {
    /// Build an entry from its three text components
    pub fn new(day: impl Into<String>, month: impl Into<String>, year: impl Into<String>) -> Self {
        let mut entry = Self {
            day: day.into(),
            month: month.into(),
            year: year.into(),
            canonical: None,
        };
        entry.recompute();
        entry
    }

    /// Seed the entry from an already canonical date (e.g. when resuming)
    pub fn from_date(date: NaiveDate) -> Self {
        Self::new(
            format!("{:02}", date.day()),
            format!("{:02}", date.month()),
            format!("{:04}", date.year()),
        )
    }

    pub fn set_day(&mut self, day: impl Into<String>) {
        self.day = day.into();
        self.recompute();
    }

    pub fn set_month(&mut self, month: impl Into<String>) {
        self.month = month.into();
        self.recompute();
    }

    pub fn set_year(&mut self, year: impl Into<String>) {
        self.year = year.into();
        self.recompute();
    }

    pub fn day(&self) -> &str {
        &self.day
    }

    pub fn month(&self) -> &str {
        &self.month
    }

    pub fn year(&self) -> &str {
        &self.year
    }

    /// The canonical date, if the entry is complete and valid
    pub fn canonical(&self) -> Option<NaiveDate> {
        self.canonical
    }

    /// The canonical `YYYY-MM-DD` string, if the entry is complete and valid
    pub fn canonical_string(&self) -> Option<String> {
        self.canonical.map(|d| d.format("%Y-%m-%d").to_string())
    }

    /// Approximate age for instant on-screen feedback.
    ///
    /// Display only. Minor status is decided by the age verification
    /// service and nothing in the wizard reads this value.
    pub fn age_hint(&self, today: NaiveDate) -> Option<u32> {
        let born = self.canonical?;
        today.years_since(born)
    }

    fn recompute(&mut self) {
        self.canonical = parse_components(&self.day, &self.month, &self.year);
    }
}

fn parse_components(day: &str, month: &str, year: &str) -> Option<NaiveDate> {
    let (day, month, year) = (day.trim(), month.trim(), year.trim());
    if day.is_empty() || month.is_empty() || year.is_empty() {
        return None;
    }

    let day: u32 = day.parse().ok().filter(|d| (1..=31).contains(d))?;
    let month: u32 = month.parse().ok().filter(|m| (1..=12).contains(m))?;

    if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year: i32 = year.parse().ok()?;

    // Rejects 31/04, 30/02 and the like
    NaiveDate::from_ymd_opt(year, month, day)
}
