use chrono::{DateTime, Duration, NaiveDate, Utc};

/// Midnight (UTC) at the start of the day containing `now`
pub fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|midnight| midnight.and_utc())
        .unwrap_or(now)
}

pub fn add_days(date: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    date + Duration::days(i64::from(days))
}

/// True when `date` falls on the same calendar day as `now` or earlier
pub fn is_due(date: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    date.date_naive() <= now.date_naive()
}

/// Whole days from the start of today until `date`, rounded down.
/// Negative for anything before today.
pub fn days_from_today(date: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let diff = date - start_of_day(now);
    diff.num_seconds().div_euclid(86_400)
}

/// Human-friendly distance from today, as shown next to review dates
pub fn relative_day_label(date: NaiveDate, today: NaiveDate) -> String {
    let days = (date - today).num_days();
    match days {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        -1 => "Yesterday".to_string(),
        d if d > 0 => format!("in {} days", d),
        d => format!("{} days ago", -d),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_due_same_day_later_hour() {
        // Scheduled for this evening still counts as due this morning
        assert!(is_due(at(2025, 3, 10, 22), at(2025, 3, 10, 8)));
        assert!(is_due(at(2025, 3, 9, 22), at(2025, 3, 10, 8)));
        assert!(!is_due(at(2025, 3, 11, 0), at(2025, 3, 10, 23)));
    }

    #[test]
    fn test_days_from_today_floors() {
        let now = at(2025, 3, 10, 15);
        assert_eq!(days_from_today(at(2025, 3, 10, 1), now), 0);
        assert_eq!(days_from_today(at(2025, 3, 12, 23), now), 2);
        assert_eq!(days_from_today(at(2025, 3, 9, 23), now), -1);
    }

    #[test]
    fn test_relative_labels() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        assert_eq!(relative_day_label(today, today), "Today");
        assert_eq!(
            relative_day_label(today + Duration::days(4), today),
            "in 4 days"
        );
        assert_eq!(
            relative_day_label(today - Duration::days(3), today),
            "3 days ago"
        );
    }
}
