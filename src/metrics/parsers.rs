// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Utility functions for metrics processing

/// Parse a RouterOS duration string to seconds
///
/// Accepts the compact form (`3w4d11h21m6s`, `1h5m`, `30s`) and the clock
/// form (`05:23:10`, `23:10`). Unknown units count as zero, a trailing bare
/// number counts as seconds.
pub fn parse_uptime_to_seconds(s: &str) -> u64 {
    let s = s.trim();
    if s.contains(':') {
        let parts: Vec<u64> = s.split(':').map(|p| p.parse().unwrap_or(0)).collect();
        return match parts.as_slice() {
            [h, m, sec] => h
                .saturating_mul(3600)
                .saturating_add(m.saturating_mul(60))
                .saturating_add(*sec),
            [m, sec] => m.saturating_mul(60).saturating_add(*sec),
            _ => 0,
        };
    }

    let mut total = 0u64;
    let mut value: Option<u64> = None;
    for ch in s.chars() {
        if let Some(digit) = ch.to_digit(10) {
            value = Some(
                value
                    .unwrap_or(0)
                    .saturating_mul(10)
                    .saturating_add(u64::from(digit)),
            );
            continue;
        }
        let Some(v) = value.take() else {
            continue;
        };
        let unit_seconds = match ch {
            'w' => 7 * 24 * 3600,
            'd' => 24 * 3600,
            'h' => 3600,
            'm' => 60,
            's' => 1,
            _ => 0,
        };
        total = total.saturating_add(v.saturating_mul(unit_seconds));
    }
    total.saturating_add(value.unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_uptime() {
        assert_eq!(parse_uptime_to_seconds("1d2h3m4s"), 93784);
        assert_eq!(parse_uptime_to_seconds("1h5m"), 3900);
        assert_eq!(parse_uptime_to_seconds("30s"), 30);
        assert_eq!(parse_uptime_to_seconds("05:23:10"), 19390);
        assert_eq!(parse_uptime_to_seconds("23:10"), 1390);
    }

    #[test]
    fn test_parse_uptime_trailing_number_and_garbage() {
        assert_eq!(parse_uptime_to_seconds("1m30"), 90);
        assert_eq!(parse_uptime_to_seconds("unknown"), 0);
        assert_eq!(parse_uptime_to_seconds("1:2:3:4"), 0);
    }

    #[test]
    fn test_parse_uptime_saturates_on_huge_values() {
        assert_eq!(parse_uptime_to_seconds("18446744073709551615:00:00"), u64::MAX);
        assert_eq!(parse_uptime_to_seconds("18446744073709551615:59"), u64::MAX);
        assert_eq!(parse_uptime_to_seconds("99999999999999999999999w"), u64::MAX);
    }
}
