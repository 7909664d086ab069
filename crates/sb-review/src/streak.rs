use chrono::{Days, NaiveDate};

/// Streak after studying on `today`.
///
/// Returns `None` when the user already studied today and nothing changes.
/// Studying the day after the last study day extends the streak, any longer
/// gap (or no previous study day) starts over at 1.
pub fn advance_streak(
    last_study_date: Option<NaiveDate>,
    current_streak: i32,
    today: NaiveDate,
) -> Option<i32> {
    match last_study_date {
        Some(last) if last == today => None,
        Some(last) if last.checked_add_days(Days::new(1)) == Some(today) => {
            Some(current_streak.max(0) + 1)
        }
        _ => Some(1),
    }
}
