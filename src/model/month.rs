use chrono::{Datelike, NaiveDate};
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

const ALL: &str = "All";

/// One of the twelve calendar months. The declaration order is the canonical display order and
/// the three-letter name is used both as the contribution key in the document and on screen.
///
/// Months are not year-scoped: March of any year is `Mar`.
#[derive(
    Debug,
    Clone,
    Copy,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Serialize,
    Deserialize,
    JsonSchema,
)]
pub enum Month {
    Jan,
    Feb,
    Mar,
    Apr,
    May,
    Jun,
    Jul,
    Aug,
    Sep,
    Oct,
    Nov,
    Dec,
}

serde_plain::derive_display_from_serialize!(Month);
serde_plain::derive_fromstr_from_deserialize!(Month);

/// All months in canonical order.
pub const MONTHS: [Month; 12] = [
    Month::Jan,
    Month::Feb,
    Month::Mar,
    Month::Apr,
    Month::May,
    Month::Jun,
    Month::Jul,
    Month::Aug,
    Month::Sep,
    Month::Oct,
    Month::Nov,
    Month::Dec,
];

impl Month {
    /// The calendar month that `date` falls in.
    pub fn of(date: NaiveDate) -> Self {
        // month0 is always in 0..12
        MONTHS[date.month0() as usize]
    }

    /// The zero-based position of this month in `MONTHS`.
    pub fn index(self) -> usize {
        self as usize
    }

    /// The month we are in right now, in local time.
    pub fn current() -> Self {
        Month::of(chrono::Local::now().date_naive())
    }
}

/// Selects which expenditures to show: everything, or only those dated in one month of any year.
/// Spelled `All` or a month name.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash)]
pub enum MonthFilter {
    #[default]
    All,
    Month(Month),
}

impl MonthFilter {
    pub fn matches(self, month: Month) -> bool {
        match self {
            MonthFilter::All => true,
            MonthFilter::Month(m) => m == month,
        }
    }
}

impl From<Month> for MonthFilter {
    fn from(value: Month) -> Self {
        MonthFilter::Month(value)
    }
}

impl Display for MonthFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            MonthFilter::All => f.write_str(ALL),
            MonthFilter::Month(m) => Display::fmt(m, f),
        }
    }
}

impl FromStr for MonthFilter {
    type Err = serde_plain::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == ALL {
            Ok(MonthFilter::All)
        } else {
            Month::from_str(s).map(MonthFilter::Month)
        }
    }
}

impl Serialize for MonthFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthFilter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        MonthFilter::from_str(&s).map_err(serde::de::Error::custom)
    }
}
