//! Behavioral pattern analysis
//!
//! Derives week-over-week aggregates and trends from raw recovery events.
//! All computations partition each series into a "recent" window (the last
//! 7 days before the reference time) and a "previous" window (7-14 days
//! ago) and compare the two.

use chrono::{DateTime, Duration, Utc};

use crate::types::{
    BehavioralSnapshot, CheckIn, Craving, EventHistory, HaltAverages, TrendDirection,
};

/// Width of the recent/previous comparison windows in days
pub const WINDOW_DAYS: i64 = 7;

/// A recent count below this fraction of the previous window's flags decline
const DECLINE_RATIO: f64 = 0.7;

/// Mood delta beyond which the trend is no longer stable (1-5 scale)
const MOOD_TREND_THRESHOLD: f64 = 0.5;

/// Craving intensity delta beyond which the trend is no longer stable
const INTENSITY_TREND_THRESHOLD: f64 = 1.0;

/// Pattern analyzer for recovery event histories
pub struct PatternAnalyzer;

impl PatternAnalyzer {
    /// Derive a behavioral snapshot from raw events.
    ///
    /// Never fails: empty or sparse series degrade to neutral defaults.
    pub fn analyze(events: &EventHistory, now: DateTime<Utc>) -> BehavioralSnapshot {
        let recent_start = now - Duration::days(WINDOW_DAYS);
        let previous_start = now - Duration::days(WINDOW_DAYS * 2);

        let in_recent = |ts: DateTime<Utc>| ts > recent_start && ts <= now;
        let in_previous = |ts: DateTime<Utc>| ts > previous_start && ts <= recent_start;

        // Check-in frequency and decline
        let check_ins_recent: Vec<&CheckIn> = events
            .check_ins
            .iter()
            .filter(|c| in_recent(c.timestamp))
            .collect();
        let check_ins_previous: Vec<&CheckIn> = events
            .check_ins
            .iter()
            .filter(|c| in_previous(c.timestamp))
            .collect();

        // Mood aggregates
        let moods_recent: Vec<f64> = check_ins_recent
            .iter()
            .filter_map(|c| c.mood.map(f64::from))
            .collect();
        let moods_previous: Vec<f64> = check_ins_previous
            .iter()
            .filter_map(|c| c.mood.map(f64::from))
            .collect();

        let mood_average = mean(&moods_recent);
        let mood_trend = classify_trend(
            mood_average,
            mean(&moods_previous),
            MOOD_TREND_THRESHOLD,
            // Higher mood is better
            true,
        );
        let mood_volatility = population_std_dev(&moods_recent);

        // Craving aggregates
        let cravings_recent: Vec<&Craving> = events
            .cravings
            .iter()
            .filter(|c| in_recent(c.timestamp))
            .collect();
        let intensities_recent: Vec<f64> = cravings_recent
            .iter()
            .map(|c| f64::from(c.intensity))
            .collect();
        let intensities_previous: Vec<f64> = events
            .cravings
            .iter()
            .filter(|c| in_previous(c.timestamp))
            .map(|c| f64::from(c.intensity))
            .collect();

        let craving_intensity_average = mean(&intensities_recent);
        let craving_intensity_trend = classify_trend(
            craving_intensity_average,
            mean(&intensities_previous),
            INTENSITY_TREND_THRESHOLD,
            // Higher intensity is worse
            false,
        );
        let craving_success_rate = if cravings_recent.is_empty() {
            1.0
        } else {
            let overcame = cravings_recent.iter().filter(|c| c.overcame).count();
            overcame as f64 / cravings_recent.len() as f64
        };

        // HALT averages over recent check-ins that carry HALT data
        let halt = halt_averages(&check_ins_recent);

        // Meeting and meditation counts
        let meetings_recent = events
            .meetings
            .iter()
            .filter(|m| in_recent(m.timestamp))
            .count() as u32;
        let meetings_previous = events
            .meetings
            .iter()
            .filter(|m| in_previous(m.timestamp))
            .count() as u32;
        let meditations_recent = events
            .meditations
            .iter()
            .filter(|m| in_recent(m.timestamp))
            .count() as u32;
        let meditations_previous = events
            .meditations
            .iter()
            .filter(|m| in_previous(m.timestamp))
            .count() as u32;

        let isolation_score = compute_isolation_score(meetings_recent, halt.lonely);
        let stress_score = compute_stress_score(halt.angry, halt.tired, mood_volatility);

        BehavioralSnapshot {
            check_in_frequency: check_ins_recent.len() as u32,
            check_in_decline: is_decline(
                check_ins_recent.len() as u32,
                check_ins_previous.len() as u32,
            ),
            mood_average,
            mood_trend,
            mood_volatility,
            craving_frequency: cravings_recent.len() as u32,
            craving_intensity_average,
            craving_intensity_trend,
            craving_success_rate,
            halt,
            meeting_frequency: meetings_recent,
            meeting_decline: is_decline(meetings_recent, meetings_previous),
            meditation_frequency: meditations_recent,
            meditation_decline: is_decline(meditations_recent, meditations_previous),
            isolation_score,
            stress_score,
        }
    }
}

/// Arithmetic mean, `None` for an empty slice
fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation, 0.0 for fewer than 2 values
fn population_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let avg = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

/// Decline flag: recent count below 70% of the previous window's count.
/// An empty previous window never counts as decline.
fn is_decline(recent: u32, previous: u32) -> bool {
    previous > 0 && (recent as f64) < DECLINE_RATIO * previous as f64
}

/// Classify a week-over-week trend from recent and previous averages.
///
/// `higher_is_better` maps the sign of the delta to improvement: a rising
/// mood improves, a rising craving intensity declines. Missing either
/// average yields `Stable`.
fn classify_trend(
    recent_avg: Option<f64>,
    previous_avg: Option<f64>,
    threshold: f64,
    higher_is_better: bool,
) -> TrendDirection {
    let (recent, previous) = match (recent_avg, previous_avg) {
        (Some(r), Some(p)) => (r, p),
        _ => return TrendDirection::Stable,
    };

    let delta = recent - previous;
    if delta > threshold {
        if higher_is_better {
            TrendDirection::Improving
        } else {
            TrendDirection::Declining
        }
    } else if delta < -threshold {
        if higher_is_better {
            TrendDirection::Declining
        } else {
            TrendDirection::Improving
        }
    } else {
        TrendDirection::Stable
    }
}

/// Average HALT components over check-ins that carry HALT data.
///
/// Check-ins without HALT data are skipped; when none carry it, the neutral
/// midpoint default applies.
fn halt_averages(check_ins: &[&CheckIn]) -> HaltAverages {
    let assessments: Vec<_> = check_ins.iter().filter_map(|c| c.halt).collect();
    if assessments.is_empty() {
        return HaltAverages::default();
    }

    let n = assessments.len() as f64;
    HaltAverages {
        hungry: assessments.iter().map(|h| f64::from(h.hungry)).sum::<f64>() / n,
        angry: assessments.iter().map(|h| f64::from(h.angry)).sum::<f64>() / n,
        lonely: assessments.iter().map(|h| f64::from(h.lonely)).sum::<f64>() / n,
        tired: assessments.iter().map(|h| f64::from(h.tired)).sum::<f64>() / n,
    }
}

/// Isolation score: few meetings plus loneliness.
///
/// Formula: `clamp(0, 100, (10 - meetings_recent) * 10 + lonely * 5)`
fn compute_isolation_score(meetings_recent: u32, lonely_avg: f64) -> f64 {
    let meeting_gap = (10.0 - f64::from(meetings_recent)) * 10.0;
    (meeting_gap + lonely_avg * 5.0).clamp(0.0, 100.0)
}

/// Stress score: anger and tiredness plus mood instability.
///
/// Formula: `clamp(0, 100, (angry + tired) * 5 + volatility * 10)`
fn compute_stress_score(angry_avg: f64, tired_avg: f64, mood_volatility: f64) -> f64 {
    ((angry_avg + tired_avg) * 5.0 + mood_volatility * 10.0).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{HaltAssessment, Meeting, MeditationSession};
    use chrono::TimeZone;

    fn reference_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }

    fn check_in(days_ago: i64, mood: u8) -> CheckIn {
        CheckIn {
            timestamp: reference_time() - Duration::days(days_ago),
            mood: Some(mood),
            halt: None,
        }
    }

    fn check_in_with_halt(days_ago: i64, mood: u8, halt: HaltAssessment) -> CheckIn {
        CheckIn {
            timestamp: reference_time() - Duration::days(days_ago),
            mood: Some(mood),
            halt: Some(halt),
        }
    }

    fn craving(days_ago: i64, intensity: u8, overcame: bool) -> Craving {
        Craving {
            timestamp: reference_time() - Duration::days(days_ago),
            intensity,
            trigger: "stress".to_string(),
            overcame,
        }
    }

    fn meeting(days_ago: i64) -> Meeting {
        Meeting {
            timestamp: reference_time() - Duration::days(days_ago),
            meeting_type: "group".to_string(),
            location: None,
        }
    }

    fn meditation(days_ago: i64) -> MeditationSession {
        MeditationSession {
            timestamp: reference_time() - Duration::days(days_ago),
            duration_minutes: 10.0,
            session_type: "breathing".to_string(),
        }
    }

    #[test]
    fn test_empty_history_degrades_to_neutral_defaults() {
        let snapshot = PatternAnalyzer::analyze(&EventHistory::default(), reference_time());

        assert_eq!(snapshot.check_in_frequency, 0);
        assert!(!snapshot.check_in_decline);
        assert_eq!(snapshot.mood_average, None);
        assert_eq!(snapshot.mood_trend, TrendDirection::Stable);
        assert_eq!(snapshot.mood_volatility, 0.0);
        assert_eq!(snapshot.craving_success_rate, 1.0);
        assert_eq!(snapshot.halt, HaltAverages::default());
        assert!(!snapshot.meeting_decline);
        assert!(!snapshot.meditation_decline);
        assert!(snapshot.isolation_score.is_finite());
        assert!(snapshot.stress_score.is_finite());
    }

    #[test]
    fn test_windowing_splits_recent_and_previous() {
        let events = EventHistory {
            check_ins: vec![
                check_in(1, 4),
                check_in(3, 4),
                check_in(10, 3), // previous window
                check_in(20, 3), // outside both windows
            ],
            ..Default::default()
        };

        let snapshot = PatternAnalyzer::analyze(&events, reference_time());
        assert_eq!(snapshot.check_in_frequency, 2);
    }

    #[test]
    fn test_checkin_decline_flag() {
        // 2 recent vs 4 previous: 2 < 0.7 * 4
        let events = EventHistory {
            check_ins: vec![
                check_in(1, 3),
                check_in(2, 3),
                check_in(8, 3),
                check_in(9, 3),
                check_in(10, 3),
                check_in(11, 3),
            ],
            ..Default::default()
        };

        let snapshot = PatternAnalyzer::analyze(&events, reference_time());
        assert!(snapshot.check_in_decline);
    }

    #[test]
    fn test_no_decline_when_previous_window_empty() {
        let events = EventHistory {
            check_ins: vec![check_in(1, 3)],
            ..Default::default()
        };

        let snapshot = PatternAnalyzer::analyze(&events, reference_time());
        assert!(!snapshot.check_in_decline);
    }

    #[test]
    fn test_mood_trend_improving() {
        let events = EventHistory {
            check_ins: vec![
                check_in(1, 4),
                check_in(2, 5),
                check_in(8, 3),
                check_in(9, 3),
            ],
            ..Default::default()
        };

        let snapshot = PatternAnalyzer::analyze(&events, reference_time());
        // recent avg 4.5 vs previous 3.0, delta > 0.5
        assert_eq!(snapshot.mood_trend, TrendDirection::Improving);
    }

    #[test]
    fn test_mood_trend_declining() {
        let events = EventHistory {
            check_ins: vec![
                check_in(1, 2),
                check_in(2, 2),
                check_in(8, 4),
                check_in(9, 4),
            ],
            ..Default::default()
        };

        let snapshot = PatternAnalyzer::analyze(&events, reference_time());
        assert_eq!(snapshot.mood_trend, TrendDirection::Declining);
    }

    #[test]
    fn test_mood_trend_stable_within_threshold() {
        let events = EventHistory {
            check_ins: vec![
                check_in(1, 3),
                check_in(2, 4),
                check_in(8, 3),
                check_in(9, 4),
            ],
            ..Default::default()
        };

        let snapshot = PatternAnalyzer::analyze(&events, reference_time());
        assert_eq!(snapshot.mood_trend, TrendDirection::Stable);
    }

    #[test]
    fn test_mood_volatility_is_population_std_dev() {
        let events = EventHistory {
            check_ins: vec![check_in(1, 1), check_in(2, 5)],
            ..Default::default()
        };

        let snapshot = PatternAnalyzer::analyze(&events, reference_time());
        // values 1 and 5: mean 3, population std dev 2
        assert!((snapshot.mood_volatility - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_craving_intensity_rising_is_declining_trend() {
        let events = EventHistory {
            cravings: vec![
                craving(1, 9, false),
                craving(2, 8, false),
                craving(8, 4, true),
                craving(9, 5, true),
            ],
            ..Default::default()
        };

        let snapshot = PatternAnalyzer::analyze(&events, reference_time());
        assert_eq!(snapshot.craving_intensity_trend, TrendDirection::Declining);
    }

    #[test]
    fn test_craving_success_rate() {
        let events = EventHistory {
            cravings: vec![
                craving(1, 5, true),
                craving(2, 5, true),
                craving(3, 5, false),
                craving(4, 5, false),
            ],
            ..Default::default()
        };

        let snapshot = PatternAnalyzer::analyze(&events, reference_time());
        assert!((snapshot.craving_success_rate - 0.5).abs() < 1e-9);
        assert_eq!(snapshot.craving_frequency, 4);
    }

    #[test]
    fn test_halt_averages_only_over_checkins_with_data() {
        let events = EventHistory {
            check_ins: vec![
                check_in_with_halt(
                    1,
                    3,
                    HaltAssessment {
                        hungry: 2,
                        angry: 4,
                        lonely: 8,
                        tired: 6,
                    },
                ),
                check_in(2, 3), // no HALT, must not dilute averages
            ],
            ..Default::default()
        };

        let snapshot = PatternAnalyzer::analyze(&events, reference_time());
        assert_eq!(snapshot.halt.hungry, 2.0);
        assert_eq!(snapshot.halt.lonely, 8.0);
    }

    #[test]
    fn test_isolation_score_with_no_meetings_and_high_loneliness() {
        let events = EventHistory {
            check_ins: vec![check_in_with_halt(
                1,
                2,
                HaltAssessment {
                    hungry: 5,
                    angry: 5,
                    lonely: 9,
                    tired: 5,
                },
            )],
            ..Default::default()
        };

        let snapshot = PatternAnalyzer::analyze(&events, reference_time());
        // (10 - 0) * 10 + 9 * 5 = 145, clamped to 100
        assert_eq!(snapshot.isolation_score, 100.0);
    }

    #[test]
    fn test_isolation_score_reduced_by_meetings() {
        let events = EventHistory {
            meetings: (0..7).map(meeting).collect(),
            ..Default::default()
        };

        let snapshot = PatternAnalyzer::analyze(&events, reference_time());
        // meetings in recent window, default lonely 5.0:
        // (10 - n) * 10 + 25, well under 100
        assert!(snapshot.isolation_score < 100.0);
        assert!(snapshot.isolation_score >= 0.0);
    }

    #[test]
    fn test_meditation_decline_flag() {
        let events = EventHistory {
            meditations: vec![
                meditation(1),
                meditation(8),
                meditation(9),
                meditation(10),
            ],
            ..Default::default()
        };

        let snapshot = PatternAnalyzer::analyze(&events, reference_time());
        assert!(snapshot.meditation_decline);
    }

    #[test]
    fn test_scores_always_clamped() {
        let events = EventHistory {
            check_ins: vec![check_in_with_halt(
                1,
                1,
                HaltAssessment {
                    hungry: 10,
                    angry: 10,
                    lonely: 10,
                    tired: 10,
                },
            )],
            ..Default::default()
        };

        let snapshot = PatternAnalyzer::analyze(&events, reference_time());
        assert!(snapshot.isolation_score <= 100.0);
        assert!(snapshot.stress_score <= 100.0);
    }
}
