use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum DateOrDateTime {
    Date(NaiveDate),
    Local(NaiveDateTime),
    Zoned(DateTime<FixedOffset>),
}

impl DateOrDateTime {
    /// The calendar day as written; a zoned value keeps its own offset's day.
    fn date(self) -> NaiveDate {
        match self {
            DateOrDateTime::Date(d) => d,
            DateOrDateTime::Local(dt) => dt.date(),
            DateOrDateTime::Zoned(dt) => dt.date_naive(),
        }
    }
}

/// Accepts `2026-03-10`, `2026-03-10T09:00:00` or an RFC 3339 timestamp and
/// keeps only the date. Use with `#[serde(default, deserialize_with = ...)]`.
pub fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<DateOrDateTime>::deserialize(deserializer)?;
    Ok(value.map(DateOrDateTime::date))
}
