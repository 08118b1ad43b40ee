use chrono::{Days, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;
use tracing::warn;

/// Phrases without this marker are not countdowns and pass through verbatim.
pub const EXPIRATION_MARKER: &str = "Expires";

const DATE_FORMAT: &str = "%m/%d/%y";

static INTEGER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

/// Turns a relative expiration phrase ("Expires in 5 days") into `MM/DD/YY`.
pub fn normalize_expiration(raw: &str, today: NaiveDate) -> String {
    if !raw.contains(EXPIRATION_MARKER) {
        return raw.to_string();
    }

    let offset = day_offset(raw).unwrap_or_else(|| {
        warn!("Unparseable expiration format {:?}, assuming it expires today", raw);
        0
    });

    today
        .checked_add_days(Days::new(offset))
        .unwrap_or_else(|| {
            warn!("Expiration offset {} overflows the calendar: {:?}", offset, raw);
            today
        })
        .format(DATE_FORMAT)
        .to_string()
}

/// Day offset encoded in the phrase; `None` unless exactly one integer is present.
fn day_offset(raw: &str) -> Option<u64> {
    if raw.to_lowercase().contains("tomorrow") {
        return Some(1);
    }

    let mut numbers = INTEGER.find_iter(raw);
    match (numbers.next(), numbers.next()) {
        (Some(only), None) => only.as_str().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jan_first() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[test]
    fn tomorrow_is_one_day() {
        assert_eq!(normalize_expiration("Expires tomorrow", jan_first()), "01/02/24");
    }

    #[test]
    fn day_count_is_added() {
        assert_eq!(normalize_expiration("Expires in 5 days", jan_first()), "01/06/24");
    }

    #[test]
    fn offset_crosses_month_and_year() {
        let today = NaiveDate::from_ymd_opt(2023, 12, 30).unwrap();
        assert_eq!(normalize_expiration("Expires in 3 days", today), "01/02/24");
    }

    #[test]
    fn phrase_without_marker_passes_through() {
        assert_eq!(
            normalize_expiration("Good through next year", jan_first()),
            "Good through next year"
        );
        assert_eq!(normalize_expiration("", jan_first()), "");
    }

    #[test]
    fn unparseable_falls_back_to_today() {
        assert_eq!(normalize_expiration("Expires soon", jan_first()), "01/01/24");
        assert_eq!(
            normalize_expiration("Expires in 2 to 3 days", jan_first()),
            "01/01/24"
        );
    }

    #[test]
    fn offset_extraction() {
        assert_eq!(day_offset("Expires in 12 days"), Some(12));
        assert_eq!(day_offset("Expires Tomorrow"), Some(1));
        assert_eq!(day_offset("Expires in 1 or 2 days"), None);
        assert_eq!(day_offset("Expires"), None);
    }
}
