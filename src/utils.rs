use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;

static DURATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\d+(?:ms|h|m|s)?)+$").expect("valid duration pattern"));
static DURATION_PART: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)(ms|h|m|s)?").expect("valid duration pattern"));

/// Parse a duration such as `90s`, `30m`, `1h30m` or `250ms`.
/// A bare number is taken as seconds.
pub fn parse_duration(input: &str) -> Result<Duration, String> {
    let input = input.trim();
    if input.is_empty() || !DURATION.is_match(input) {
        return Err(format!("invalid duration '{}'", input));
    }
    let mut total = Duration::ZERO;
    for caps in DURATION_PART.captures_iter(input) {
        let value: u64 = caps[1]
            .parse()
            .map_err(|e| format!("invalid duration '{}': {}", input, e))?;
        let part = match caps.get(2).map(|unit| unit.as_str()) {
            Some("ms") => Duration::from_millis(value),
            Some("h") => Duration::from_secs(value.saturating_mul(3600)),
            Some("m") => Duration::from_secs(value.saturating_mul(60)),
            _ => Duration::from_secs(value),
        };
        total = total.saturating_add(part);
    }
    Ok(total)
}

/// `std` durations beyond chrono's range saturate.
pub fn to_time_delta(duration: Duration) -> chrono::TimeDelta {
    chrono::TimeDelta::from_std(duration).unwrap_or(chrono::TimeDelta::MAX)
}
