//! Calendar and trend summaries over completed sessions.
//!
//! Mirrors the history views: per-day session counts and rounded average
//! intensity over a date window, the unique dates used as calendar markers,
//! and a coarse trend direction comparing the first and second half of the
//! days that have data.

use chrono::NaiveDate;
use serde::Serialize;

use super::store::CompletedSession;

/// One day in the trend window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    /// Sessions completed that day.
    pub count: usize,
    /// Rounded average intensity, `None` when the day has no sessions with
    /// an intensity.
    pub avg_intensity: Option<u8>,
}

/// Trend direction of the average intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

/// Summarize sessions per day over `[start, end]` inclusive, in ascending
/// date order. Days without sessions are included with a zero count.
pub fn daily_summaries(
    sessions: &[CompletedSession],
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<DailySummary> {
    let mut summaries = Vec::new();
    let mut day = start;
    while day <= end {
        let intensities: Vec<u32> = sessions
            .iter()
            .filter(|s| s.completed_at.date_naive() == day)
            .filter_map(|s| s.emotion_intensity.map(u32::from))
            .collect();
        let count = sessions
            .iter()
            .filter(|s| s.completed_at.date_naive() == day)
            .count();

        let avg_intensity = if intensities.is_empty() {
            None
        } else {
            let sum: u32 = intensities.iter().sum();
            Some(((sum as f64 / intensities.len() as f64).round()) as u8)
        };

        summaries.push(DailySummary { date: day, count, avg_intensity });
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }
    summaries
}

/// Unique dates that have at least one session, in order of first
/// appearance (input order).
pub fn session_dates(sessions: &[CompletedSession]) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    for session in sessions {
        let date = session.completed_at.date_naive();
        if !dates.contains(&date) {
            dates.push(date);
        }
    }
    dates
}

/// Compare average intensity between the first and second half of the days
/// that have data. A difference of more than one point either way counts as
/// a trend; fewer than two data points is always stable.
pub fn trend_of(days: &[DailySummary]) -> Trend {
    let valid: Vec<f64> = days
        .iter()
        .filter_map(|d| d.avg_intensity.map(f64::from))
        .collect();
    if valid.len() < 2 {
        return Trend::Stable;
    }

    let mid = valid.len() / 2;
    let first_avg = valid[..mid].iter().sum::<f64>() / mid as f64;
    let second_avg = valid[mid..].iter().sum::<f64>() / (valid.len() - mid) as f64;

    let diff = second_avg - first_avg;
    if diff > 1.0 {
        Trend::Up
    } else if diff < -1.0 {
        Trend::Down
    } else {
        Trend::Stable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Emotion;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn session_on(date: (i32, u32, u32), intensity: Option<u8>) -> CompletedSession {
        CompletedSession {
            id: Uuid::new_v4(),
            user_id: "u1".into(),
            completed_at: Utc
                .with_ymd_and_hms(date.0, date.1, date.2, 12, 0, 0)
                .unwrap(),
            custom_emotion: None,
            selected_emotion: Some(Emotion::Stress),
            emotion_intensity: intensity,
            body_sensation: None,
            automatic_thought: None,
            detected_distortions: None,
            ai_questions: None,
            balanced_thought: None,
            selected_action: None,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_daily_summaries_cover_window() {
        let sessions = vec![
            session_on((2026, 8, 10), Some(6)),
            session_on((2026, 8, 10), Some(8)),
            session_on((2026, 8, 12), Some(3)),
        ];
        let days = daily_summaries(&sessions, date(2026, 8, 9), date(2026, 8, 12));
        assert_eq!(days.len(), 4);
        assert_eq!(days[0].count, 0);
        assert_eq!(days[0].avg_intensity, None);
        assert_eq!(days[1].count, 2);
        assert_eq!(days[1].avg_intensity, Some(7));
        assert_eq!(days[2].count, 0);
        assert_eq!(days[3].avg_intensity, Some(3));
    }

    #[test]
    fn test_sessions_without_intensity_count_but_do_not_average() {
        let sessions = vec![session_on((2026, 8, 10), None)];
        let days = daily_summaries(&sessions, date(2026, 8, 10), date(2026, 8, 10));
        assert_eq!(days[0].count, 1);
        assert_eq!(days[0].avg_intensity, None);
    }

    #[test]
    fn test_session_dates_unique() {
        let sessions = vec![
            session_on((2026, 8, 12), Some(5)),
            session_on((2026, 8, 12), Some(6)),
            session_on((2026, 8, 10), Some(4)),
        ];
        assert_eq!(
            session_dates(&sessions),
            vec![date(2026, 8, 12), date(2026, 8, 10)]
        );
    }

    fn summary(day: u32, avg: Option<u8>) -> DailySummary {
        DailySummary { date: date(2026, 8, day), count: usize::from(avg.is_some()), avg_intensity: avg }
    }

    #[test]
    fn test_trend_up_and_down() {
        let rising = vec![summary(1, Some(3)), summary(2, Some(3)), summary(3, Some(6)), summary(4, Some(6))];
        assert_eq!(trend_of(&rising), Trend::Up);

        let falling = vec![summary(1, Some(8)), summary(2, Some(8)), summary(3, Some(4)), summary(4, Some(4))];
        assert_eq!(trend_of(&falling), Trend::Down);
    }

    #[test]
    fn test_trend_boundary_is_stable() {
        // A difference of exactly one point is stable.
        let edge = vec![summary(1, Some(5)), summary(2, Some(6))];
        assert_eq!(trend_of(&edge), Trend::Stable);
    }

    #[test]
    fn test_trend_needs_two_data_points() {
        assert_eq!(trend_of(&[]), Trend::Stable);
        assert_eq!(trend_of(&[summary(1, Some(9))]), Trend::Stable);
        // Days without data are ignored entirely.
        let sparse = vec![summary(1, None), summary(2, Some(9)), summary(3, None)];
        assert_eq!(trend_of(&sparse), Trend::Stable);
    }
}
