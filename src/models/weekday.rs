use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// ISO day of week: 1 is Monday, 7 is Sunday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct IsoWeekday(u8);

impl IsoWeekday {
    pub fn new(day: u8) -> Option<Self> {
        (1..=7).contains(&day).then_some(Self(day))
    }

    pub fn of(date: NaiveDate) -> Self {
        Self(date.weekday().number_from_monday() as u8)
    }

    pub fn number(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for IsoWeekday {
    type Error = String;

    fn try_from(day: u8) -> Result<Self, Self::Error> {
        Self::new(day).ok_or_else(|| format!("weekday must be within 1..=7, got {day}"))
    }
}

impl From<IsoWeekday> for u8 {
    fn from(day: IsoWeekday) -> Self {
        day.0
    }
}

impl fmt::Display for IsoWeekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::IsoWeekday;

    #[test]
    fn monday_is_one_and_sunday_is_seven() {
        let monday = NaiveDate::from_ymd_opt(2026, 10, 12).unwrap();
        let sunday = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        assert_eq!(IsoWeekday::of(monday).number(), 1);
        assert_eq!(IsoWeekday::of(sunday).number(), 7);
    }

    #[test]
    fn rejects_zero_and_eight() {
        assert!(IsoWeekday::new(0).is_none());
        assert!(IsoWeekday::new(8).is_none());
        assert!(serde_json::from_str::<IsoWeekday>("9").is_err());
        assert_eq!(serde_json::from_str::<IsoWeekday>("3").unwrap().number(), 3);
    }
}
