//! ISO-8601-style duration to decimal hours
//!
//! The tracker reports estimates as `PT3H30M`-style strings. Only the
//! hour and minute components matter here; a seconds component written as
//! `...MS` must not be mistaken for minutes.

/// Convert a `PT<h>H<m>M` duration string into decimal hours.
///
/// Input that is empty or does not start with `PT` yields `0.0` (defined
/// fallback, not an error). The result is rounded half-up to 2 decimal
/// places; reconciliation compares exactly against this rounded value.
pub fn to_hours(duration: &str) -> f64 {
    let Some(rest) = duration.strip_prefix("PT") else {
        return 0.0;
    };

    let hours = component(rest, 'H').unwrap_or(0);
    let minutes = minute_component(rest).unwrap_or(0);

    round2(hours as f64 + minutes as f64 / 60.0)
}

/// Round half-up to 2 decimal places.
///
/// Stable across the crate: both sides of the hours equality check go
/// through this before comparison.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// First run of digits immediately followed by `marker`.
fn component(input: &str, marker: char) -> Option<u64> {
    digit_run_before(input, |chars, idx| chars.get(idx) == Some(&marker))
}

/// First run of digits followed by `M` where the `M` is not part of `MS`.
fn minute_component(input: &str) -> Option<u64> {
    digit_run_before(input, |chars, idx| {
        chars.get(idx) == Some(&'M') && chars.get(idx + 1) != Some(&'S')
    })
}

fn digit_run_before<F>(input: &str, terminator: F) -> Option<u64>
where
    F: Fn(&[char], usize) -> bool,
{
    let chars: Vec<char> = input.chars().collect();
    let mut idx = 0;
    while idx < chars.len() {
        if chars[idx].is_ascii_digit() {
            let start = idx;
            while idx < chars.len() && chars[idx].is_ascii_digit() {
                idx += 1;
            }
            if terminator(&chars, idx) {
                let digits: String = chars[start..idx].iter().collect();
                return digits.parse().ok();
            }
        } else {
            idx += 1;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hours_and_minutes() {
        assert_eq!(to_hours("PT3H30M"), 3.5);
    }

    #[test]
    fn hours_only() {
        assert_eq!(to_hours("PT1H"), 1.0);
    }

    #[test]
    fn minutes_only() {
        assert_eq!(to_hours("PT30M"), 0.5);
    }

    #[test]
    fn zero_minutes() {
        assert_eq!(to_hours("PT0M"), 0.0);
    }

    #[test]
    fn empty_input_is_zero() {
        assert_eq!(to_hours(""), 0.0);
    }

    #[test]
    fn garbage_input_is_zero() {
        assert_eq!(to_hours("garbage"), 0.0);
    }

    #[test]
    fn seconds_component_is_not_minutes() {
        // 90MS is a seconds-flavored token; only the real minute token counts.
        assert_eq!(to_hours("PT2H90MS"), 2.0);
        assert_eq!(to_hours("PT2H15M30MS"), 2.25);
    }

    #[test]
    fn rounding_is_stable_at_two_places() {
        // 20 minutes = 0.3333... -> 0.33
        assert_eq!(to_hours("PT20M"), 0.33);
        // 40 minutes = 0.6666... -> 0.67
        assert_eq!(to_hours("PT40M"), 0.67);
    }

    #[test]
    fn round2_half_up() {
        // 0.125 is exact in binary, so the half-way case is deterministic.
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round2(2.5), 2.5);
    }
}
