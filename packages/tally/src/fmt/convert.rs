use std::fmt::Write as _;

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;

const BYTE_UNITS: [&str; 7] = ["KB", "MB", "GB", "TB", "PB", "EB", "ZB"];

/// Format a number of seconds as a short duration, like ` 5s`, ` 1m 5s`, ` 2h 3m`
///
/// Fractions are dropped. Negative and non-finite inputs format as ` 0s`.
pub fn to_time(seconds: f64) -> String {
    let seconds = if seconds.is_finite() && seconds > 0f64 {
        seconds as u64
    } else {
        0
    };
    let days = seconds / DAY;
    let hours = seconds % DAY / HOUR;
    let minutes = seconds % HOUR / MINUTE;
    let secs = seconds % MINUTE;

    let mut out = String::new();
    // _: fmt for string does not fail
    let _ = if days > 0 {
        write!(out, "{days}d{hours:2}h{minutes:2}m")
    } else if hours > 0 {
        write!(out, "{hours:2}h{minutes:2}m")
    } else if minutes > 0 {
        write!(out, "{minutes:2}m{secs:2}s")
    } else {
        write!(out, "{secs:2}s")
    };
    out
}

/// Format a byte count with binary (1024) units, like `512B` or `1.50MB`
pub fn to_bytes(value: f64) -> String {
    if !value.is_finite() || value < 0f64 {
        return "0B".to_string();
    }
    if value < 1024f64 {
        return format!("{}B", value as u64);
    }
    let mut value = value / 1024f64;
    let mut unit = 0;
    while value >= 1024f64 && unit < BYTE_UNITS.len() - 1 {
        value /= 1024f64;
        unit += 1;
    }
    format!("{value:.2}{}", BYTE_UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_picks_largest_units() {
        assert_eq!(to_time(0.0), " 0s");
        assert_eq!(to_time(5.9), " 5s");
        assert_eq!(to_time(65.0), " 1m 5s");
        assert_eq!(to_time(2.0 * 3600.0 + 3.0 * 60.0 + 4.0), " 2h 3m");
        assert_eq!(to_time(90000.0), "1d 1h 0m");
    }

    #[test]
    fn time_rejects_garbage() {
        assert_eq!(to_time(-3.0), " 0s");
        assert_eq!(to_time(f64::NAN), " 0s");
        assert_eq!(to_time(f64::INFINITY), " 0s");
    }

    #[test]
    fn bytes_scale() {
        assert_eq!(to_bytes(0.0), "0B");
        assert_eq!(to_bytes(1023.0), "1023B");
        assert_eq!(to_bytes(1024.0), "1.00KB");
        assert_eq!(to_bytes(1536.0 * 1024.0), "1.50MB");
        assert_eq!(to_bytes(-1.0), "0B");
    }
}
