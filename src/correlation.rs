//! Pairwise correlation analysis
//!
//! Computes Pearson product-moment correlations between a fixed set of
//! behavioral metric pairs. Degenerate series (fewer than 2 aligned points,
//! zero variance) short-circuit to a neutral result rather than producing
//! NaN or dividing by zero.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::collections::BTreeMap;

use crate::types::{
    Correlation, CorrelationDirection, CorrelationReport, CorrelationStrength, EventHistory,
};

/// Weeks of history considered for weekly-aggregated pairs
const LOOKBACK_WEEKS: i64 = 8;

/// |r| above which a correlation counts as "strong" for the report subset
const STRONG_SUBSET_THRESHOLD: f64 = 0.5;

/// Correlation engine over recovery event histories
pub struct CorrelationEngine;

impl CorrelationEngine {
    /// Compute the fixed set of named metric-pair correlations and derive
    /// the strong subset and insight strings.
    pub fn analyze(events: &EventHistory, now: DateTime<Utc>) -> CorrelationReport {
        let correlations = vec![
            mood_vs_craving_intensity(events),
            meetings_vs_mood(events, now),
            meditation_vs_craving_success(events, now),
        ];

        let strong_correlations: Vec<Correlation> = correlations
            .iter()
            .filter(|c| c.coefficient.abs() > STRONG_SUBSET_THRESHOLD)
            .cloned()
            .collect();

        let insights = correlations
            .iter()
            .filter(|c| c.direction != CorrelationDirection::None)
            .map(|c| c.interpretation.clone())
            .collect();

        CorrelationReport {
            correlations,
            strong_correlations,
            insights,
        }
    }

    /// Correlate two aligned numeric series into a named correlation.
    pub fn correlate(variable_a: &str, variable_b: &str, pairs: &[(f64, f64)]) -> Correlation {
        let coefficient = pearson(pairs);
        let strength = classify_strength(coefficient);
        let direction = classify_direction(coefficient);

        Correlation {
            variable_a: variable_a.to_string(),
            variable_b: variable_b.to_string(),
            coefficient,
            strength,
            direction,
            // Simplified significance proxy, not a rigorous p-value
            significance: 1.0 - coefficient.abs(),
            sample_size: pairs.len(),
            interpretation: interpret(variable_a, variable_b, strength, direction),
        }
    }
}

/// Pearson product-moment coefficient over aligned pairs.
///
/// Returns 0.0 when fewer than 2 pairs are available or when either series
/// has zero variance.
pub fn pearson(pairs: &[(f64, f64)]) -> f64 {
    if pairs.len() < 2 {
        return 0.0;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut covariance = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        covariance += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denominator = (var_x * var_y).sqrt();
    if denominator == 0.0 {
        return 0.0;
    }

    (covariance / denominator).clamp(-1.0, 1.0)
}

fn classify_strength(r: f64) -> CorrelationStrength {
    let abs = r.abs();
    if abs > 0.7 {
        CorrelationStrength::Strong
    } else if abs > 0.4 {
        CorrelationStrength::Moderate
    } else {
        CorrelationStrength::Weak
    }
}

fn classify_direction(r: f64) -> CorrelationDirection {
    if r > 0.1 {
        CorrelationDirection::Positive
    } else if r < -0.1 {
        CorrelationDirection::Negative
    } else {
        CorrelationDirection::None
    }
}

fn interpret(
    variable_a: &str,
    variable_b: &str,
    strength: CorrelationStrength,
    direction: CorrelationDirection,
) -> String {
    let strength_word = match strength {
        CorrelationStrength::Strong => "strongly",
        CorrelationStrength::Moderate => "moderately",
        CorrelationStrength::Weak => "weakly",
    };
    match direction {
        CorrelationDirection::Positive => format!(
            "Higher {} tends to come with higher {} ({} related)",
            variable_a, variable_b, strength_word
        ),
        CorrelationDirection::Negative => format!(
            "Higher {} tends to come with lower {} ({} related)",
            variable_a, variable_b, strength_word
        ),
        CorrelationDirection::None => format!(
            "No clear relationship between {} and {}",
            variable_a, variable_b
        ),
    }
}

/// Daily alignment: pair each date carrying both a mood check-in and at
/// least one craving, averaging within the day.
fn mood_vs_craving_intensity(events: &EventHistory) -> Correlation {
    let mut moods: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
    for check_in in &events.check_ins {
        if let Some(mood) = check_in.mood {
            moods
                .entry(check_in.timestamp.date_naive())
                .or_default()
                .push(f64::from(mood));
        }
    }

    let mut intensities: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
    for craving in &events.cravings {
        intensities
            .entry(craving.timestamp.date_naive())
            .or_default()
            .push(f64::from(craving.intensity));
    }

    let pairs: Vec<(f64, f64)> = moods
        .iter()
        .filter_map(|(date, day_moods)| {
            intensities.get(date).map(|day_intensities| {
                (
                    day_moods.iter().sum::<f64>() / day_moods.len() as f64,
                    day_intensities.iter().sum::<f64>() / day_intensities.len() as f64,
                )
            })
        })
        .collect();

    CorrelationEngine::correlate("mood", "craving_intensity", &pairs)
}

/// Index of the week bucket a timestamp falls in, counting back from `now`.
/// Week 0 is the most recent. Returns `None` outside the lookback range.
fn week_index(ts: DateTime<Utc>, now: DateTime<Utc>) -> Option<i64> {
    if ts > now {
        return None;
    }
    let days_ago = (now - ts).num_days();
    let week = days_ago / 7;
    if week < LOOKBACK_WEEKS {
        Some(week)
    } else {
        None
    }
}

/// Weekly alignment: meeting count per week against average mood per week,
/// over weeks that carry at least one mood check-in.
fn meetings_vs_mood(events: &EventHistory, now: DateTime<Utc>) -> Correlation {
    let mut meeting_counts: BTreeMap<i64, f64> = BTreeMap::new();
    for meeting in &events.meetings {
        if let Some(week) = week_index(meeting.timestamp, now) {
            *meeting_counts.entry(week).or_insert(0.0) += 1.0;
        }
    }

    let mut weekly_moods: BTreeMap<i64, Vec<f64>> = BTreeMap::new();
    for check_in in &events.check_ins {
        if let (Some(week), Some(mood)) = (week_index(check_in.timestamp, now), check_in.mood) {
            weekly_moods.entry(week).or_default().push(f64::from(mood));
        }
    }

    let pairs: Vec<(f64, f64)> = weekly_moods
        .iter()
        .map(|(week, moods)| {
            (
                meeting_counts.get(week).copied().unwrap_or(0.0),
                moods.iter().sum::<f64>() / moods.len() as f64,
            )
        })
        .collect();

    CorrelationEngine::correlate("meeting_attendance", "mood", &pairs)
}

/// Weekly alignment: meditation minutes per week against craving success
/// rate per week, over weeks that carry at least one craving.
fn meditation_vs_craving_success(events: &EventHistory, now: DateTime<Utc>) -> Correlation {
    let mut meditation_minutes: BTreeMap<i64, f64> = BTreeMap::new();
    for session in &events.meditations {
        if let Some(week) = week_index(session.timestamp, now) {
            *meditation_minutes.entry(week).or_insert(0.0) += session.duration_minutes;
        }
    }

    let mut weekly_cravings: BTreeMap<i64, (u32, u32)> = BTreeMap::new();
    for craving in &events.cravings {
        if let Some(week) = week_index(craving.timestamp, now) {
            let entry = weekly_cravings.entry(week).or_insert((0, 0));
            entry.0 += 1;
            if craving.overcame {
                entry.1 += 1;
            }
        }
    }

    let pairs: Vec<(f64, f64)> = weekly_cravings
        .iter()
        .map(|(week, (total, overcame))| {
            (
                meditation_minutes.get(week).copied().unwrap_or(0.0),
                f64::from(*overcame) / f64::from(*total),
            )
        })
        .collect();

    CorrelationEngine::correlate("meditation_minutes", "craving_success_rate", &pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CheckIn, Craving, MeditationSession};
    use chrono::TimeZone;

    fn reference_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_pearson_identical_series_is_one() {
        let pairs: Vec<(f64, f64)> = (1..=5).map(|i| (f64::from(i), f64::from(i))).collect();
        let r = pearson(&pairs);
        assert!((r - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_pearson_inverse_series_is_minus_one() {
        let pairs: Vec<(f64, f64)> = (1..=5).map(|i| (f64::from(i), -f64::from(i))).collect();
        let r = pearson(&pairs);
        assert!((r + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_pearson_short_series_is_zero() {
        assert_eq!(pearson(&[]), 0.0);
        assert_eq!(pearson(&[(1.0, 2.0)]), 0.0);
    }

    #[test]
    fn test_pearson_zero_variance_is_zero() {
        let pairs = vec![(3.0, 1.0), (3.0, 2.0), (3.0, 3.0)];
        assert_eq!(pearson(&pairs), 0.0);
    }

    #[test]
    fn test_correlate_identical_series_classification() {
        let pairs: Vec<(f64, f64)> = (1..=6).map(|i| (f64::from(i), f64::from(i))).collect();
        let correlation = CorrelationEngine::correlate("a", "b", &pairs);

        assert!((correlation.coefficient - 1.0).abs() < 1e-9);
        assert_eq!(correlation.strength, CorrelationStrength::Strong);
        assert_eq!(correlation.direction, CorrelationDirection::Positive);
        assert!(correlation.significance.abs() < 1e-9);
        assert_eq!(correlation.sample_size, 6);
    }

    #[test]
    fn test_degenerate_series_neutral_result() {
        let correlation = CorrelationEngine::correlate("a", "b", &[(1.0, 1.0)]);
        assert_eq!(correlation.coefficient, 0.0);
        assert_eq!(correlation.strength, CorrelationStrength::Weak);
        assert_eq!(correlation.direction, CorrelationDirection::None);
        assert!(correlation.coefficient.is_finite());
    }

    #[test]
    fn test_strength_thresholds() {
        assert_eq!(classify_strength(0.8), CorrelationStrength::Strong);
        assert_eq!(classify_strength(-0.71), CorrelationStrength::Strong);
        assert_eq!(classify_strength(0.5), CorrelationStrength::Moderate);
        assert_eq!(classify_strength(0.3), CorrelationStrength::Weak);
    }

    #[test]
    fn test_direction_thresholds() {
        assert_eq!(classify_direction(0.2), CorrelationDirection::Positive);
        assert_eq!(classify_direction(-0.2), CorrelationDirection::Negative);
        assert_eq!(classify_direction(0.05), CorrelationDirection::None);
        assert_eq!(classify_direction(-0.1), CorrelationDirection::None);
    }

    #[test]
    fn test_analyze_emits_fixed_named_pairs() {
        let report = CorrelationEngine::analyze(&EventHistory::default(), reference_time());

        assert_eq!(report.correlations.len(), 3);
        assert_eq!(report.correlations[0].variable_a, "mood");
        assert_eq!(report.correlations[0].variable_b, "craving_intensity");
        assert_eq!(report.correlations[1].variable_a, "meeting_attendance");
        assert_eq!(report.correlations[2].variable_a, "meditation_minutes");

        // Empty history: everything neutral, nothing strong, no insights
        assert!(report.strong_correlations.is_empty());
        assert!(report.insights.is_empty());
        for c in &report.correlations {
            assert_eq!(c.coefficient, 0.0);
            assert_eq!(c.direction, CorrelationDirection::None);
        }
    }

    #[test]
    fn test_mood_craving_daily_alignment_detects_negative_link() {
        // Low mood days carry intense cravings, high mood days mild ones
        let mut check_ins = Vec::new();
        let mut cravings = Vec::new();
        for day in 0..10 {
            let mood = if day % 2 == 0 { 1 } else { 5 };
            let intensity = if day % 2 == 0 { 9 } else { 2 };
            let ts = reference_time() - Duration::days(day);
            check_ins.push(CheckIn {
                timestamp: ts,
                mood: Some(mood),
                halt: None,
            });
            cravings.push(Craving {
                timestamp: ts,
                intensity,
                trigger: "stress".to_string(),
                overcame: mood > 3,
            });
        }

        let events = EventHistory {
            check_ins,
            cravings,
            ..Default::default()
        };

        let report = CorrelationEngine::analyze(&events, reference_time());
        let mood_craving = &report.correlations[0];
        assert_eq!(mood_craving.direction, CorrelationDirection::Negative);
        assert_eq!(mood_craving.strength, CorrelationStrength::Strong);
        assert!(report
            .strong_correlations
            .iter()
            .any(|c| c.variable_a == "mood"));
        assert!(!report.insights.is_empty());
    }

    #[test]
    fn test_meditation_success_weekly_alignment() {
        // Weeks with more meditation minutes have better craving outcomes
        let mut cravings = Vec::new();
        let mut meditations = Vec::new();
        for week in 0..6i64 {
            let ts = reference_time() - Duration::days(week * 7 + 2);
            let minutes = 10.0 * (6 - week) as f64;
            meditations.push(MeditationSession {
                timestamp: ts,
                duration_minutes: minutes,
                session_type: "breathing".to_string(),
            });
            // Success tracks meditation volume
            for i in 0..4 {
                cravings.push(Craving {
                    timestamp: ts - Duration::hours(i),
                    intensity: 5,
                    trigger: "boredom".to_string(),
                    overcame: i < (6 - week).min(4),
                });
            }
        }

        let events = EventHistory {
            cravings,
            meditations,
            ..Default::default()
        };

        let report = CorrelationEngine::analyze(&events, reference_time());
        let meditation = &report.correlations[2];
        assert_eq!(meditation.direction, CorrelationDirection::Positive);
        assert!(meditation.coefficient > 0.4);
    }

    #[test]
    fn test_coefficient_always_in_range() {
        let pairs: Vec<(f64, f64)> = (0..50)
            .map(|i| (f64::from(i) * 1e6, f64::from(i) * 1e6 + 1.0))
            .collect();
        let r = pearson(&pairs);
        assert!((-1.0..=1.0).contains(&r));
    }
}
