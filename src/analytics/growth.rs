//! Growth rates between comparable periods, as signed percentages.

use chrono::Duration;

use super::forecast::Timeframe;
use super::Observation;

/// Percentage change from `previous` to `current`, 0 when `previous` is not positive.
pub fn percent_change(previous: f64, current: f64) -> f64 {
    if previous > 0.0 {
        (current - previous) / previous * 100.0
    } else {
        0.0
    }
}

/// Compare the later half of the records against the earlier half.
///
/// Records are ordered by date first (stable, so same-day rows keep input
/// order); the earlier half is the first `n / 2` of them. When the earlier
/// half sums to zero the rate is 0 if the later half is also zero, and a
/// flat 100 otherwise.
pub fn midpoint_growth_rate<T: Observation>(records: &[T]) -> f64 {
    let mut sorted: Vec<&T> = records.iter().collect();
    sorted.sort_by_key(|r| r.observed_on());

    let mid = sorted.len() / 2;
    let previous: f64 = sorted[..mid].iter().map(|r| r.value()).sum();
    let recent: f64 = sorted[mid..].iter().map(|r| r.value()).sum();

    if previous == 0.0 {
        if recent == 0.0 {
            0.0
        } else {
            100.0
        }
    } else {
        (recent - previous) / previous * 100.0
    }
}

/// Compare the last half-`timeframe` window ending at the latest record
/// against the equally long window just before it.
///
/// Half windows round up (a week looks back 4 days). Fewer than two
/// records, or an empty previous window, give 0.
pub fn period_growth_rate<T: Observation>(records: &[T], timeframe: Timeframe) -> f64 {
    if records.len() < 2 {
        return 0.0;
    }
    let Some(latest) = records.iter().map(|r| r.observed_on()).max() else {
        return 0.0;
    };

    let half = Duration::days(((timeframe.days() + 1) / 2) as i64);
    let current_start = latest - half;
    let previous_end = current_start - Duration::days(1);
    let previous_start = previous_end - half;

    let mut current = 0.0;
    let mut previous = 0.0;
    for record in records {
        let date = record.observed_on();
        if date >= current_start && date <= latest {
            current += record.value();
        } else if date >= previous_start && date <= previous_end {
            previous += record.value();
        }
    }

    percent_change(previous, current)
}

/// Growth of a filtered subset against everything the filter excluded.
///
/// `all_total` is the total over the unfiltered set, so the excluded total
/// is the difference. 0 when nothing positive was excluded.
pub fn growth_against_remainder(all_total: f64, filtered_total: f64) -> f64 {
    percent_change(all_total - filtered_total, filtered_total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::test_support::sale;
    use crate::models::SalesRecord;

    #[test]
    fn test_zero_previous_conventions() {
        // previous = 0, recent = 0 -> 0
        let flat = vec![sale(1, 1, None, "2024-01-01", 0.0), sale(2, 1, None, "2024-01-02", 0.0)];
        assert_eq!(midpoint_growth_rate(&flat), 0.0);

        // previous = 0, recent = 50 -> 100
        let jump = vec![sale(1, 1, None, "2024-01-01", 0.0), sale(2, 1, None, "2024-01-02", 50.0)];
        assert_eq!(midpoint_growth_rate(&jump), 100.0);

        // single record: nothing before the midpoint
        assert_eq!(midpoint_growth_rate(&[sale(1, 1, None, "2024-01-01", 30.0)]), 100.0);
        assert_eq!(midpoint_growth_rate::<SalesRecord>(&[]), 0.0);
    }

    #[test]
    fn test_midpoint_split_sorts_by_date() {
        let sales = vec![
            sale(1, 1, None, "2024-01-04", 150.0),
            sale(2, 1, None, "2024-01-01", 50.0),
            sale(3, 1, None, "2024-01-03", 75.0),
            sale(4, 1, None, "2024-01-02", 50.0),
        ];
        // previous = 50 + 50, recent = 75 + 150
        assert!((midpoint_growth_rate(&sales) - 125.0).abs() < 1e-9);
    }

    #[test]
    fn test_odd_count_puts_extra_record_in_recent_half() {
        let sales = vec![
            sale(1, 1, None, "2024-01-01", 100.0),
            sale(2, 1, None, "2024-01-02", 40.0),
            sale(3, 1, None, "2024-01-03", 40.0),
        ];
        assert!((midpoint_growth_rate(&sales) - (-20.0)).abs() < 1e-9);
    }

    #[test]
    fn test_period_growth_week_windows() {
        // Latest 2024-01-20; current window 01-16..=01-20, previous 01-11..=01-15
        let sales = vec![
            sale(1, 1, None, "2024-01-12", 100.0),
            sale(2, 1, None, "2024-01-15", 100.0),
            sale(3, 1, None, "2024-01-17", 150.0),
            sale(4, 1, None, "2024-01-20", 150.0),
            sale(5, 1, None, "2023-12-01", 999.0),
        ];
        assert!((period_growth_rate(&sales, Timeframe::Week) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_period_growth_without_previous_window() {
        let sales = vec![sale(1, 1, None, "2024-01-19", 10.0), sale(2, 1, None, "2024-01-20", 10.0)];
        assert_eq!(period_growth_rate(&sales, Timeframe::Month), 0.0);
        assert_eq!(period_growth_rate(&sales[..1], Timeframe::Month), 0.0);
    }

    #[test]
    fn test_growth_against_remainder() {
        assert!((growth_against_remainder(300.0, 200.0) - 100.0).abs() < 1e-9);
        assert_eq!(growth_against_remainder(200.0, 200.0), 0.0);
        assert!((growth_against_remainder(500.0, 100.0) - (-75.0)).abs() < 1e-9);
    }
}
