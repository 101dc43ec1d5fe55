use chrono::TimeDelta;
use regex::Regex;
use std::sync::OnceLock;

fn component_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(\d+)\s*(months?|mo|minutes?|mins?|m|hours?|hrs?|h|days?|d|weeks?|w|years?|yrs?|y|seconds?|secs?|s)")
            .unwrap_or_else(|e| panic!("invalid duration regex: {e}"))
    })
}

/// Parse a time window such as "7d", "1w2d", "12 hours" or "3mo".
///
/// Returns None unless the whole input is made of `<number><unit>` pairs.
/// Months count as 30 days and years as 365.
pub fn parse_duration(input: &str) -> Option<TimeDelta> {
    let input = input.trim().to_lowercase();
    if input.is_empty() {
        return None;
    }

    let mut total = TimeDelta::zero();
    let mut consumed = 0;

    for caps in component_regex().captures_iter(&input) {
        let whole = caps.get(0)?;
        // Components must be contiguous (whitespace aside)
        if !input[consumed..whole.start()].trim().is_empty() {
            return None;
        }
        consumed = whole.end();

        let amount: i64 = caps.get(1)?.as_str().parse().ok()?;
        let seconds_per_unit: i64 = match caps.get(2)?.as_str() {
            "s" | "sec" | "secs" | "second" | "seconds" => 1,
            "m" | "min" | "mins" | "minute" | "minutes" => 60,
            "h" | "hr" | "hrs" | "hour" | "hours" => 3_600,
            "d" | "day" | "days" => 86_400,
            "w" | "week" | "weeks" => 7 * 86_400,
            "mo" | "month" | "months" => 30 * 86_400,
            "y" | "yr" | "yrs" | "year" | "years" => 365 * 86_400,
            _ => return None,
        };

        let seconds = amount.checked_mul(seconds_per_unit)?;
        total = total.checked_add(&TimeDelta::try_seconds(seconds)?)?;
    }

    if consumed == 0 || !input[consumed..].trim().is_empty() {
        return None;
    }
    Some(total)
}
