//! Free-form date resolution
//!
//! Turns user-entered date tokens ("сегодня", "tomorrow", `DD.MM`,
//! `MM-DD`, `YYYY-MM-DD`) into canonical calendar dates. "Today" is an
//! explicit parameter so resolution stays deterministic under test.
//!
//! Day/month-only dates that already passed this year roll forward to
//! the next year and come back as [`Resolved::NextYear`], which the
//! caller must confirm with the user. Fully-qualified past dates are
//! rejected outright. The asymmetry is intentional product behavior.

use chrono::{Datelike, Duration, NaiveDate};

/// Why a date token could not be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidDate {
    /// Unsupported format, or an impossible day/month combination.
    Format,
    /// A fully-qualified date strictly before today.
    Passed,
}

/// Outcome of resolving one date token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolved {
    /// A usable calendar date.
    Ok(NaiveDate),
    /// A day/month with no year that already passed this year, rolled
    /// forward. The caller must confirm the rolled date with the user
    /// before treating it as resolved.
    NextYear(NaiveDate),
    Invalid(InvalidDate),
}

/// Resolve one date token against `today`.
pub fn resolve(input: &str, today: NaiveDate) -> Resolved {
    let token = input.trim().to_lowercase();

    match token.as_str() {
        "today" | "сегодня" => return Resolved::Ok(today),
        "tomorrow" | "завтра" => return Resolved::Ok(today + Duration::days(1)),
        _ => {}
    }

    if let Some((day, month)) = token.split_once('.') {
        return resolve_day_month(day, month, today);
    }

    let parts: Vec<&str> = token.split('-').collect();
    match *parts.as_slice() {
        [month, day] => resolve_day_month(day, month, today),
        [_, _, _] => match NaiveDate::parse_from_str(&token, "%Y-%m-%d") {
            Ok(date) if date < today => Resolved::Invalid(InvalidDate::Passed),
            Ok(date) => Resolved::Ok(date),
            Err(_) => Resolved::Invalid(InvalidDate::Format),
        },
        _ => Resolved::Invalid(InvalidDate::Format),
    }
}

fn resolve_day_month(day: &str, month: &str, today: NaiveDate) -> Resolved {
    let (Ok(day), Ok(month)) = (day.trim().parse::<u32>(), month.trim().parse::<u32>()) else {
        return Resolved::Invalid(InvalidDate::Format);
    };
    let Some(date) = NaiveDate::from_ymd_opt(today.year(), month, day) else {
        return Resolved::Invalid(InvalidDate::Format);
    };
    if date < today {
        match NaiveDate::from_ymd_opt(today.year() + 1, month, day) {
            Some(next) => Resolved::NextYear(next),
            // Feb 29 can exist this year and not the next
            None => Resolved::Invalid(InvalidDate::Format),
        }
    } else {
        Resolved::Ok(date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        day(2024, 6, 15)
    }

    #[test]
    fn test_literals() {
        assert_eq!(resolve("today", today()), Resolved::Ok(today()));
        assert_eq!(resolve("сегодня", today()), Resolved::Ok(today()));
        assert_eq!(resolve("tomorrow", today()), Resolved::Ok(day(2024, 6, 16)));
        assert_eq!(resolve("Завтра", today()), Resolved::Ok(day(2024, 6, 16)));
        assert_eq!(resolve("  TODAY  ", today()), Resolved::Ok(today()));
    }

    #[test]
    fn test_day_month_in_future() {
        assert_eq!(resolve("20.06", today()), Resolved::Ok(day(2024, 6, 20)));
        assert_eq!(resolve("12-31", today()), Resolved::Ok(day(2024, 12, 31)));
        // Today itself is not "in the past"
        assert_eq!(resolve("15.06", today()), Resolved::Ok(today()));
    }

    #[test]
    fn test_day_month_rolls_forward() {
        assert_eq!(
            resolve("01.01", today()),
            Resolved::NextYear(day(2025, 1, 1))
        );
        assert_eq!(
            resolve("06-14", today()),
            Resolved::NextYear(day(2025, 6, 14))
        );
    }

    #[test]
    fn test_day_month_out_of_range() {
        assert_eq!(
            resolve("13.45", today()),
            Resolved::Invalid(InvalidDate::Format)
        );
        assert_eq!(
            resolve("31.06", today()),
            Resolved::Invalid(InvalidDate::Format)
        );
        // Feb 29 exists in 2024 but rolls into 2025, which has no Feb 29
        assert_eq!(
            resolve("29.02", today()),
            Resolved::Invalid(InvalidDate::Format)
        );
    }

    #[test]
    fn test_full_date() {
        assert_eq!(
            resolve("2099-01-01", today()),
            Resolved::Ok(day(2099, 1, 1))
        );
        assert_eq!(
            resolve("2024-06-15", today()),
            Resolved::Ok(today())
        );
        // Fully-qualified past dates are rejected, not rolled forward
        assert_eq!(
            resolve("2020-01-01", today()),
            Resolved::Invalid(InvalidDate::Passed)
        );
        assert_eq!(
            resolve("2024-13-01", today()),
            Resolved::Invalid(InvalidDate::Format)
        );
    }

    #[test]
    fn test_garbage() {
        assert_eq!(
            resolve("next thursday", today()),
            Resolved::Invalid(InvalidDate::Format)
        );
        assert_eq!(resolve("", today()), Resolved::Invalid(InvalidDate::Format));
        assert_eq!(
            resolve("1-2-3-4", today()),
            Resolved::Invalid(InvalidDate::Format)
        );
    }
}
