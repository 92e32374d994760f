use chrono::{DateTime, FixedOffset, Local, Utc};

/// source of current time, all business rules relying on "now" (the calendar
/// day of an order, the lead time of a slot) read it from this trait
pub trait AbstractClock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;
}

pub struct AppSystemClock {
    offset: Option<FixedOffset>,
}

impl AppSystemClock {
    pub fn new(utc_offset_minutes: Option<i32>) -> Self {
        let offset = utc_offset_minutes.and_then(|m| FixedOffset::east_opt(m * 60));
        Self { offset }
    }
}

impl AbstractClock for AppSystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        match self.offset.as_ref() {
            Some(o) => Utc::now().with_timezone(o),
            None => Local::now().fixed_offset(),
        }
    }
}
