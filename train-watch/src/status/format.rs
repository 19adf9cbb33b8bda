//! Human-readable durations.

/// Format a delay for a notification.
///
/// Under a minute is given in whole seconds; anything longer is rounded to
/// the nearest minute. An exact half minute goes to the even neighbour, so
/// 90 seconds is "2 minutes" and so is 150. Rounding half up would make
/// 150 seconds "3 minutes" (and 270 seconds "5 minutes" rather than 4),
/// which contradicts the expected message for a 150 second delay.
///
/// ```
/// use train_watch::status::format_seconds;
///
/// assert_eq!(format_seconds(1), "1 second");
/// assert_eq!(format_seconds(45), "45 seconds");
/// assert_eq!(format_seconds(90), "2 minutes");
/// ```
pub fn format_seconds(seconds: u32) -> String {
    if seconds < 60 {
        return format!("{seconds} {}", plural(seconds, "second"));
    }

    let mut minutes = seconds / 60;
    let remainder = seconds % 60;
    if remainder > 30 || (remainder == 30 && minutes % 2 == 1) {
        minutes += 1;
    }
    format!("{minutes} {}", plural(minutes, "minute"))
}

fn plural(n: u32, unit: &str) -> String {
    if n == 1 {
        unit.to_string()
    } else {
        format!("{unit}s")
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn long_delays_round_to_nearest_minute(seconds in 60u32..100_000) {
            let formatted = format_seconds(seconds);
            let (n, unit) = formatted.split_once(' ').unwrap();
            let n: f64 = n.parse().unwrap();

            prop_assert!(unit.starts_with("minute"));
            prop_assert!((n - seconds as f64 / 60.0).abs() <= 0.5);
        }

        #[test]
        fn short_delays_stay_in_seconds(seconds in 0u32..60) {
            let formatted = format_seconds(seconds);
            prop_assert!(formatted.starts_with(&seconds.to_string()));
            prop_assert!(formatted.contains("second"));
        }
    }
}
