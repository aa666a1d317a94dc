//! Days-until-Christmas arithmetic and the message shown for it

use crate::layout::FontCandidate;
use chrono::{Datelike, Local, NaiveDate};

pub const CHRISTMAS_MONTH: u32 = 12;
pub const CHRISTMAS_DAY: u32 = 25;

/// Displays narrower than this use "XMAS" when the font can't be measured
const NARROW_DISPLAY_WIDTH: i32 = 64;

/// Source of the current date
pub trait Clock: Send {
    fn today(&self) -> NaiveDate;
}

/// Reads the local system date
pub struct LocalClock;

impl Clock for LocalClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

// Only the last year chrono can represent has no following Christmas
fn christmas_in(year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, CHRISTMAS_MONTH, CHRISTMAS_DAY).unwrap_or(NaiveDate::MAX)
}

/// Days until the next Christmas and whether `today` is Christmas Day.
///
/// Once this year's Christmas has passed the count runs towards next year's,
/// so the result is never negative.
pub fn days_until_christmas(today: NaiveDate) -> (i64, bool) {
    let mut christmas = christmas_in(today.year());
    if today > christmas {
        christmas = christmas_in(today.year() + 1);
    }

    let days = (christmas - today).num_days();
    let is_christmas = today.month() == CHRISTMAS_MONTH && today.day() == CHRISTMAS_DAY;

    (days, is_christmas)
}

/// Countdown values, recalculated on every update
#[derive(Debug, Clone, Default)]
pub struct CountdownState {
    pub days_until_christmas: i64,
    pub is_christmas: bool,
    last_calculated_date: Option<NaiveDate>,
}

impl CountdownState {
    /// Recalculate for `today`. Returns true when the calendar day changed
    /// since the previous call.
    pub fn refresh(&mut self, today: NaiveDate) -> bool {
        let (days, is_christmas) = days_until_christmas(today);
        self.days_until_christmas = days;
        self.is_christmas = is_christmas;

        let day_changed = self.last_calculated_date != Some(today);
        self.last_calculated_date = Some(today);
        day_changed
    }

    pub fn is_calculated(&self) -> bool {
        self.last_calculated_date.is_some()
    }

    pub fn is_celebrating(&self) -> bool {
        self.is_christmas || self.days_until_christmas == 0
    }
}

/// Text shown on the display, both as one string and split into lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountdownMessage {
    pub text: String,
    pub lines: Vec<String>,
}

impl CountdownMessage {
    pub fn select(state: &CountdownState, use_xmas: bool) -> Self {
        if state.is_celebrating() {
            return Self {
                text: "MERRY CHRISTMAS".to_string(),
                lines: vec!["MERRY".to_string(), "CHRISTMAS".to_string()],
            };
        }

        let name = if use_xmas { "XMAS" } else { "CHRISTMAS" };
        let days = state.days_until_christmas.to_string();

        Self {
            text: format!("{} DAYS UNTIL {}", days, name),
            lines: vec![days, "DAYS".to_string(), "UNTIL".to_string(), name.to_string()],
        }
    }
}

/// Whether "CHRISTMAS" is too wide for the text column even in `compact`,
/// the smallest font available.
pub fn use_short_name<F: FontCandidate>(compact: &F, available_width: i32, display_width: i32) -> bool {
    match compact.measure_width("CHRISTMAS") {
        Ok(width) => i64::from(width) > i64::from(available_width),
        Err(_) => display_width < NARROW_DISPLAY_WIDTH,
    }
}

#[cfg(test)]
pub struct FixedClock(pub NaiveDate);

#[cfg(test)]
impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
