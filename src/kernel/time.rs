use chrono::{DateTime, Datelike, Local, NaiveDate, TimeZone};

/// Wall-clock reading taken once per command.
/// Every pure stage (matcher, compiler) works off this snapshot, never the live clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instant {
    pub at: DateTime<Local>,
}

impl Instant {
    pub fn today(&self) -> NaiveDate {
        self.at.date_naive()
    }

    pub fn year(&self) -> i32 {
        self.at.year()
    }

    /// ISO date used for `date` columns (YYYY-MM-DD).
    pub fn iso_date(&self) -> String {
        self.today().format("%Y-%m-%d").to_string()
    }

    /// First day (Sunday) of the week containing today.
    pub fn week_start(&self) -> NaiveDate {
        let today = self.today();
        let offset = today.weekday().num_days_from_sunday() as u64;
        today - chrono::Days::new(offset)
    }
}

pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant { at: Local::now() }
    }
}

/// Frozen clock. Used by tests and replay.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    instant: Instant,
}

impl FixedClock {
    pub fn new(at: DateTime<Local>) -> Self {
        Self { instant: Instant { at } }
    }

    /// Noon local time on the given day. Returns None for impossible dates.
    pub fn on(year: i32, month: u32, day: u32) -> Option<Self> {
        let at = Local.with_ymd_and_hms(year, month, day, 12, 0, 0).single()?;
        Some(Self::new(at))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Instant {
        self.instant
    }
}
