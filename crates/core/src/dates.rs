use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::errors::DomainError;

/// Dates travel as text in the `DD-MMM-YYYY` form (e.g. `05-Sep-2026`).
pub const SERVICE_DATE_FORMAT: &str = "%d-%b-%Y";

/// Same-day requests are rejected outright, identically for every category.
pub const SAME_DAY_REJECTION: &str =
    "Politely inform the customer that same-day requests are not accepted.";

pub const BAD_DATE_FORMAT_ADVISORY: &str =
    "Ask the customer to confirm their preferred date in DD-MMM-YYYY format \
     (for example, 05-Sep-2026), then check the date again.";

/// Weekdays on which a category does not book service.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WeekClosure {
    SundayOnly,
    FullWeekend,
}

impl WeekClosure {
    fn is_closed(&self, weekday: Weekday) -> bool {
        match self {
            Self::SundayOnly => weekday == Weekday::Sun,
            Self::FullWeekend => matches!(weekday, Weekday::Sat | Weekday::Sun),
        }
    }

    fn closed_day_label(&self) -> &'static str {
        match self {
            Self::SundayOnly => "a Sunday",
            Self::FullWeekend => "a weekend",
        }
    }
}

/// Per-category booking-window rule. `notice` is the human wording of the
/// lead time, quoted verbatim in the short-notice advisory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateRule {
    pub min_lead_days: i64,
    pub closure: WeekClosure,
    pub notice: &'static str,
}

pub const GENERAL_BOOKING: DateRule = DateRule {
    min_lead_days: 2,
    closure: WeekClosure::SundayOnly,
    notice: "at least 2 days notice",
};

pub const HOME_CLEANING_BOOKING: DateRule = DateRule {
    min_lead_days: 3,
    closure: WeekClosure::FullWeekend,
    notice: "at least 3 working days' notice",
};

pub const OTHER_SERVICES_BOOKING: DateRule = DateRule {
    min_lead_days: 3,
    closure: WeekClosure::SundayOnly,
    notice: "at least 3 days' notice",
};

pub const RENOVATION_BOOKING: DateRule = DateRule {
    min_lead_days: 7,
    closure: WeekClosure::SundayOnly,
    notice: "at least 1 week notice",
};

impl DateRule {
    /// Validate a requested date against this rule, from the given `today`.
    ///
    /// The output is always an instruction string for the calling agent,
    /// never a machine-readable flag: validation failures are advisory.
    pub fn advise(&self, today: NaiveDate, raw_date: &str, valid_reply: &str) -> String {
        let Ok(requested) = parse_service_date(raw_date) else {
            return BAD_DATE_FORMAT_ADVISORY.to_owned();
        };

        if requested == today {
            return SAME_DAY_REJECTION.to_owned();
        }

        if requested < today + Duration::days(self.min_lead_days) {
            return format!(
                "Inform the customer that since their requested service on {raw_date} is outside \
                 our usual booking window, which requires {}, you will try to find vendors who \
                 can accommodate the urgent request, but be sure to avoid making promises.",
                self.notice
            );
        }

        if self.closure.is_closed(requested.weekday()) {
            return format!(
                "Inform the customer that since their requested service on {raw_date} falls on \
                 {}, you will try to find vendors who can accommodate the request, but be sure \
                 to avoid making promises.",
                self.closure.closed_day_label()
            );
        }

        valid_reply.to_owned()
    }
}

pub fn parse_service_date(raw: &str) -> Result<NaiveDate, DomainError> {
    NaiveDate::parse_from_str(raw.trim(), SERVICE_DATE_FORMAT)
        .map_err(|_| DomainError::InvalidDateFormat { value: raw.to_owned() })
}

/// Earliest bookable date advertised in assistant instructions.
///
/// Weekend-closed categories count working days; Sunday-closed categories
/// count calendar days minus Sundays. Counting starts one slot later when
/// the sequence opens on `today` itself, matching the booking window the
/// date validators enforce.
pub fn earliest_available_date(today: NaiveDate, closure: WeekClosure) -> NaiveDate {
    match closure {
        WeekClosure::FullWeekend => {
            let days = open_days(today, closure, 4);
            if days[0] == today {
                days[3]
            } else {
                days[2]
            }
        }
        WeekClosure::SundayOnly => {
            let days: Vec<NaiveDate> = (0..4)
                .map(|offset| today + Duration::days(offset))
                .filter(|day| !closure.is_closed(day.weekday()))
                .collect();
            if days[0] == today {
                days[2]
            } else {
                days[1]
            }
        }
    }
}

fn open_days(from: NaiveDate, closure: WeekClosure, count: usize) -> Vec<NaiveDate> {
    let mut days = Vec::with_capacity(count);
    let mut day = from;
    while days.len() < count {
        if !closure.is_closed(day.weekday()) {
            days.push(day);
        }
        day += Duration::days(1);
    }
    days
}
