//! Course-length inference from duration tokens.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Days assumed when duration tokens exist but none carries a number.
pub const UNPARSED_DURATION_DAYS: u32 = 5;

/// Days assumed for "till finished" style instructions.
pub const UNTIL_FINISHED_DAYS: u32 = 5;

/// Days assumed when a medicine has no duration tokens at all.
pub const MISSING_DURATION_DAYS: u32 = 1;

/// Upper bound on a single course so reminder expansion stays bounded.
pub const MAX_DURATION_DAYS: u32 = 3650;

static SPAN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(\d+)\s*(days?|d|weeks?|wks?|w|months?|years?)\b").expect("span regex")
});

static UNTIL_FINISHED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:till|until)\s+finish").expect("finish regex"));

/// Days per unit word.
pub fn unit_days(unit: &str) -> Option<u32> {
    match unit.to_ascii_lowercase().as_str() {
        "d" | "day" | "days" => Some(1),
        "w" | "wk" | "wks" | "week" | "weeks" => Some(7),
        "month" | "months" => Some(30),
        "year" | "years" => Some(365),
        _ => None,
    }
}

/// Days expressed by the first number+unit span in a token.
pub fn parse_duration_token(token: &str) -> Option<u32> {
    SPAN.captures_iter(token).find_map(|caps| {
        let count = caps.get(1)?.as_str().parse::<u32>().ok()?;
        let per_unit = unit_days(caps.get(2)?.as_str())?;
        Some(count.saturating_mul(per_unit))
    })
}

/// Course length in days for a medicine's duration tokens.
///
/// Tokens are scanned in order and the first with a number and unit wins.
/// The result is always within `1..=MAX_DURATION_DAYS`.
pub fn estimate_duration_days(duration: &[String]) -> u32 {
    if duration.is_empty() {
        return MISSING_DURATION_DAYS;
    }

    if let Some(days) = duration.iter().find_map(|t| parse_duration_token(t)) {
        return days.clamp(1, MAX_DURATION_DAYS);
    }

    if duration.iter().any(|t| UNTIL_FINISHED.is_match(t)) {
        debug!("open-ended course, assuming {} days", UNTIL_FINISHED_DAYS);
        return UNTIL_FINISHED_DAYS;
    }

    debug!(tokens = ?duration, "no numeric duration, assuming {} days", UNPARSED_DURATION_DAYS);
    UNPARSED_DURATION_DAYS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_units() {
        assert_eq!(estimate_duration_days(&tokens(&["5 days"])), 5);
        assert_eq!(estimate_duration_days(&tokens(&["1 day"])), 1);
        assert_eq!(estimate_duration_days(&tokens(&["2 weeks"])), 14);
        assert_eq!(estimate_duration_days(&tokens(&["1 month"])), 30);
        assert_eq!(estimate_duration_days(&tokens(&["1 year"])), 365);
        assert_eq!(estimate_duration_days(&tokens(&["10d"])), 10);
    }

    #[test]
    fn test_first_parseable_token_wins() {
        assert_eq!(estimate_duration_days(&tokens(&["for 1 week", "1 week"])), 7);
        assert_eq!(
            estimate_duration_days(&tokens(&["till finished", "3 days", "2 weeks"])),
            3
        );
    }

    #[test]
    fn test_defaults() {
        assert_eq!(estimate_duration_days(&[]), MISSING_DURATION_DAYS);
        assert_eq!(
            estimate_duration_days(&tokens(&["till finished"])),
            UNTIL_FINISHED_DAYS
        );
        assert_eq!(
            estimate_duration_days(&tokens(&["as directed"])),
            UNPARSED_DURATION_DAYS
        );
    }

    #[test]
    fn test_bounds() {
        assert_eq!(estimate_duration_days(&tokens(&["0 days"])), 1);
        assert_eq!(
            estimate_duration_days(&tokens(&["99999 years"])),
            MAX_DURATION_DAYS
        );
    }

    #[test]
    fn test_unit_must_be_a_whole_word() {
        assert_eq!(parse_duration_token("5 doses"), None);
        assert_eq!(parse_duration_token("500mg"), None);
    }
}
