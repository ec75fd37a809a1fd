use chrono::{DateTime, Days, FixedOffset, NaiveDate, NaiveTime, Offset, TimeZone, Utc};

use crate::models::weekday::IsoWeekday;

pub const DEFAULT_RADIUS_KM: f64 = 4.0;

pub const MAX_LEAD_DAYS: u32 = 31;

/// Tunable dispatch constants. Pickups are booked `lead_days` ahead at `pickup_time` local.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchPolicy {
    pub radius_km: f64,
    pub lead_days: u32,
    pub pickup_time: NaiveTime,
    pub utc_offset: FixedOffset,
}

impl Default for DispatchPolicy {
    fn default() -> Self {
        Self {
            radius_km: DEFAULT_RADIUS_KM,
            lead_days: 1,
            pickup_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap_or_default(),
            utc_offset: FixedOffset::east_opt(7 * 3600).unwrap_or(Utc.fix()),
        }
    }
}

impl DispatchPolicy {
    pub fn validate(&self) -> Result<(), String> {
        if !self.radius_km.is_finite() || self.radius_km < 0.0 {
            return Err(format!(
                "dispatch radius must be a non-negative number, got {}",
                self.radius_km
            ));
        }
        if self.lead_days > MAX_LEAD_DAYS {
            return Err(format!(
                "dispatch lead time must be at most {MAX_LEAD_DAYS} days, got {}",
                self.lead_days
            ));
        }
        Ok(())
    }

    /// Local pickup date, or `None` when it falls past the last representable date.
    pub fn target_date(&self, now: DateTime<Utc>) -> Option<NaiveDate> {
        now.with_timezone(&self.utc_offset)
            .date_naive()
            .checked_add_days(Days::new(u64::from(self.lead_days)))
    }

    pub fn target_weekday(&self, now: DateTime<Utc>) -> Option<IsoWeekday> {
        self.target_date(now).map(IsoWeekday::of)
    }

    /// `pickup_time` local on `date`, as UTC.
    pub fn pickup_at(&self, date: NaiveDate) -> DateTime<Utc> {
        let local = date.and_time(self.pickup_time);
        // Fixed offsets have no gaps or folds, so the mapping is always single.
        self.utc_offset
            .from_local_datetime(&local)
            .single()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| local.and_utc())
    }

    pub fn scheduled_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.target_date(now).map(|date| self.pickup_at(date))
    }
}
