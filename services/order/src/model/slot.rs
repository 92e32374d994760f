use std::fmt;
use std::result::Result as DefaultResult;
use std::str::FromStr;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Timelike};

use crate::constant::admission::DEFAULT_SLOT_LADDER;
use crate::error::{AppError, AppErrorCode};

/// start time of a fulfillment window, in minute precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeSlotModel(NaiveTime);

impl TimeSlotModel {
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    /// absolute start time of this slot on the given calendar day
    pub fn start_on(&self, day: NaiveDate, offset: &FixedOffset) -> Option<DateTime<FixedOffset>> {
        day.and_time(self.0).and_local_timezone(*offset).single()
    }
}

impl FromStr for TimeSlotModel {
    type Err = AppError;
    fn from_str(s: &str) -> DefaultResult<Self, Self::Err> {
        // accept `H:MM`, `HH:MM` and database form `HH:MM:SS`, seconds are dropped
        let raw = s.trim();
        let parsed = NaiveTime::parse_from_str(raw, "%H:%M")
            .or_else(|_e| NaiveTime::parse_from_str(raw, "%H:%M:%S"));
        match parsed {
            Ok(t) => NaiveTime::from_hms_opt(t.hour(), t.minute(), 0)
                .map(Self)
                .ok_or(AppError {
                    code: AppErrorCode::InvalidInput,
                    detail: Some(format!("time-slot: {raw}")),
                }),
            Err(e) => Err(AppError {
                code: AppErrorCode::InvalidInput,
                detail: Some(format!("time-slot: {raw}, reason: {e}")),
            }),
        }
    }
}

impl fmt::Display for TimeSlotModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

pub struct SlotCatalogModel {
    slots: Vec<TimeSlotModel>,
}

impl SlotCatalogModel {
    pub fn default_ladder() -> Self {
        let slots = DEFAULT_SLOT_LADDER
            .iter()
            .filter_map(|s| TimeSlotModel::from_str(s).ok())
            .collect();
        Self { slots }
    }

    /// enabled slots from storage, the default ladder takes over if nothing
    /// is configured
    pub fn from_enabled(mut slots: Vec<TimeSlotModel>) -> Self {
        if slots.is_empty() {
            Self::default_ladder()
        } else {
            slots.sort();
            slots.dedup();
            Self { slots }
        }
    }

    pub fn slots(&self) -> &[TimeSlotModel] {
        &self.slots
    }
}

pub struct SlotAvailabilityModel {
    pub day: NaiveDate,
    pub available: Vec<TimeSlotModel>,
    pub booked: Vec<TimeSlotModel>,
}

impl SlotAvailabilityModel {
    /// catalog minus booked slots of the current day, then remove the slots
    /// starting earlier than `now + lead`. The day is the calendar day of
    /// `now` in its own offset, slots are never carried over to the next day.
    pub fn evaluate(
        catalog: &SlotCatalogModel,
        mut booked: Vec<TimeSlotModel>,
        now: DateTime<FixedOffset>,
        lead: Duration,
    ) -> Self {
        let day = now.date_naive();
        let earliest = now + lead;
        let offset = now.offset();
        let available = catalog
            .slots()
            .iter()
            .filter(|s| !booked.contains(s))
            .filter(|s| match s.start_on(day, offset) {
                Some(t) => t >= earliest,
                None => false,
            })
            .copied()
            .collect();
        booked.sort();
        Self {
            day,
            available,
            booked,
        }
    }
}
