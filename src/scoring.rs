//! Risk scoring
//!
//! Converts a behavioral snapshot into weighted risk factors and an overall
//! 0-100 relapse-risk score. The scorer is an explainable, rule-based
//! additive model: each factor is a fixed design constant, activates on a
//! documented trigger condition, and contributes a fixed number of points.
//! Contributions are additive (not normalized) and the sum is clamped to
//! 100, so every point of risk traces to a named cause.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::{BehavioralSnapshot, RiskFactor, RiskLevel, TrendDirection};

/// Fixed point weights per factor (additive, clamped at 100)
const POINTS_CHECKIN_DECLINE: f64 = 15.0;
const POINTS_MOOD_DECLINING: f64 = 20.0;
const POINTS_LOW_MOOD: f64 = 15.0;
const POINTS_MOOD_VOLATILITY: f64 = 10.0;
const POINTS_CRAVING_INTENSITY_RISING: f64 = 25.0;
const POINTS_FREQUENT_CRAVINGS: f64 = 15.0;
const POINTS_LOW_CRAVING_SUCCESS: f64 = 20.0;
const POINTS_ISOLATION: f64 = 20.0;
const POINTS_MEETING_DECLINE: f64 = 15.0;
const POINTS_MEDITATION_DECLINE: f64 = 10.0;
const POINTS_HIGH_STRESS: f64 = 15.0;
const POINTS_HALT_LONELINESS: f64 = 10.0;

/// Trigger thresholds
const LOW_MOOD_THRESHOLD: f64 = 2.0;
const VOLATILITY_THRESHOLD: f64 = 1.2;
const CRAVING_FREQUENCY_THRESHOLD: u32 = 3;
const SUCCESS_RATE_THRESHOLD: f64 = 0.5;
const ISOLATION_THRESHOLD: f64 = 60.0;
const STRESS_THRESHOLD: f64 = 60.0;
const LONELY_THRESHOLD: f64 = 7.0;

/// Result of scoring a behavioral snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskScore {
    /// Overall risk score (0-100, clamped)
    pub score: f64,
    /// Risk level derived from the score
    pub level: RiskLevel,
    /// Active risk factors, in catalog order
    pub factors: Vec<RiskFactor>,
    /// Per-factor point contributions, keyed by factor id.
    /// Ordered map so output is deterministic.
    pub contributions: BTreeMap<String, f64>,
}

/// Rule-based additive risk scorer
pub struct RiskScorer;

impl RiskScorer {
    /// Score a behavioral snapshot.
    ///
    /// Evaluates the fixed factor catalog against the snapshot, sums the
    /// active factors' points, and clamps the total to 100.
    pub fn score(snapshot: &BehavioralSnapshot) -> RiskScore {
        let factors = evaluate_factors(snapshot);

        let mut contributions = BTreeMap::new();
        let mut total = 0.0;
        for factor in &factors {
            let points = factor.weight * 100.0;
            total += points;
            contributions.insert(factor.id.clone(), points);
        }

        let score = total.clamp(0.0, 100.0);
        RiskScore {
            score,
            level: risk_level_for_score(score),
            factors,
            contributions,
        }
    }
}

/// Map a 0-100 score to a risk level
pub fn risk_level_for_score(score: f64) -> RiskLevel {
    if score >= 75.0 {
        RiskLevel::Critical
    } else if score >= 50.0 {
        RiskLevel::High
    } else if score >= 25.0 {
        RiskLevel::Moderate
    } else {
        RiskLevel::Low
    }
}

/// Evaluate the factor catalog against a snapshot.
///
/// Each entry activates on its trigger condition; inactive factors are
/// omitted entirely.
fn evaluate_factors(snapshot: &BehavioralSnapshot) -> Vec<RiskFactor> {
    let mut factors = Vec::new();

    if snapshot.check_in_decline {
        factors.push(factor(
            "checkin_decline",
            "Check-in frequency dropping",
            POINTS_CHECKIN_DECLINE,
            60.0,
            vec![
                "Set a daily check-in reminder".to_string(),
                "Check in even on good days".to_string(),
            ],
        ));
    }

    if snapshot.mood_trend == TrendDirection::Declining {
        factors.push(factor(
            "mood_declining",
            "Mood trending downward",
            POINTS_MOOD_DECLINING,
            70.0,
            vec![
                "Talk to someone you trust about how you feel".to_string(),
                "Schedule one enjoyable activity today".to_string(),
            ],
        ));
    }

    if let Some(mood) = snapshot.mood_average {
        if mood < LOW_MOOD_THRESHOLD {
            // Intensity scales with how far below the threshold mood sits
            let intensity = (((LOW_MOOD_THRESHOLD - mood) / LOW_MOOD_THRESHOLD) * 100.0 + 50.0)
                .clamp(0.0, 100.0);
            factors.push(factor(
                "low_mood",
                "Persistently low mood",
                POINTS_LOW_MOOD,
                intensity,
                vec![
                    "Reach out to your support network".to_string(),
                    "Consider contacting a counselor".to_string(),
                ],
            ));
        }
    }

    if snapshot.mood_volatility > VOLATILITY_THRESHOLD {
        factors.push(factor(
            "mood_volatility",
            "Mood swings increasing",
            POINTS_MOOD_VOLATILITY,
            (snapshot.mood_volatility * 40.0).clamp(0.0, 100.0),
            vec!["Keep a regular sleep and meal routine".to_string()],
        ));
    }

    if snapshot.craving_intensity_trend == TrendDirection::Declining {
        factors.push(factor(
            "craving_intensity_rising",
            "Craving intensity rising",
            POINTS_CRAVING_INTENSITY_RISING,
            snapshot
                .craving_intensity_average
                .map(|i| i * 10.0)
                .unwrap_or(50.0)
                .clamp(0.0, 100.0),
            vec![
                "Review your craving action plan".to_string(),
                "Avoid known trigger situations this week".to_string(),
            ],
        ));
    }

    if snapshot.craving_frequency > CRAVING_FREQUENCY_THRESHOLD {
        factors.push(factor(
            "frequent_cravings",
            "Cravings occurring frequently",
            POINTS_FREQUENT_CRAVINGS,
            (f64::from(snapshot.craving_frequency) * 10.0).clamp(0.0, 100.0),
            vec![
                "Practice urge surfing when a craving hits".to_string(),
                "Log each craving to spot its triggers".to_string(),
            ],
        ));
    }

    if snapshot.craving_frequency > 0 && snapshot.craving_success_rate < SUCCESS_RATE_THRESHOLD {
        factors.push(factor(
            "low_craving_success",
            "Cravings overcoming resistance",
            POINTS_LOW_CRAVING_SUCCESS,
            ((1.0 - snapshot.craving_success_rate) * 100.0).clamp(0.0, 100.0),
            vec![
                "Call your sponsor before cravings peak".to_string(),
                "Remove easy access to triggers at home".to_string(),
            ],
        ));
    }

    if snapshot.isolation_score > ISOLATION_THRESHOLD {
        factors.push(factor(
            "isolation",
            "Increasing isolation",
            POINTS_ISOLATION,
            snapshot.isolation_score,
            vec![
                "Attend a meeting this week".to_string(),
                "Message one person from your support group".to_string(),
            ],
        ));
    }

    if snapshot.meeting_decline {
        factors.push(factor(
            "meeting_decline",
            "Meeting attendance dropping",
            POINTS_MEETING_DECLINE,
            60.0,
            vec!["Book your next meeting now".to_string()],
        ));
    }

    if snapshot.meditation_decline {
        factors.push(factor(
            "meditation_decline",
            "Meditation practice dropping",
            POINTS_MEDITATION_DECLINE,
            50.0,
            vec!["Try a short 5-minute session today".to_string()],
        ));
    }

    if snapshot.stress_score > STRESS_THRESHOLD {
        factors.push(factor(
            "high_stress",
            "Elevated stress",
            POINTS_HIGH_STRESS,
            snapshot.stress_score,
            vec![
                "Take a 10-minute walk or breathing break".to_string(),
                "Cut one non-essential commitment this week".to_string(),
            ],
        ));
    }

    if snapshot.halt.lonely > LONELY_THRESHOLD {
        factors.push(factor(
            "halt_loneliness",
            "High loneliness (HALT)",
            POINTS_HALT_LONELINESS,
            (snapshot.halt.lonely * 10.0).clamp(0.0, 100.0),
            vec!["Plan time with someone supportive today".to_string()],
        ));
    }

    factors
}

fn factor(id: &str, name: &str, points: f64, score: f64, mitigations: Vec<String>) -> RiskFactor {
    RiskFactor {
        id: id.to_string(),
        name: name.to_string(),
        weight: points / 100.0,
        score,
        level: risk_level_for_score(score),
        mitigations,
    }
}
