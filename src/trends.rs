//! Short-horizon trend projection
//!
//! Extrapolates near-term values for a small set of metrics by nudging the
//! current windowed value in the direction of the already-computed trend.
//! This is intentionally a bounded heuristic, not a fitted regression, and
//! the per-metric confidence values are fixed constants reflecting its
//! limited statistical power.

use chrono::{DateTime, Duration, Utc};

use crate::patterns::WINDOW_DAYS;
use crate::types::{BehavioralSnapshot, EventHistory, Prediction, TrendDirection};

/// Description of the projection method, surfaced in prediction reports
pub const METHODOLOGY: &str =
    "trend-following heuristic: current windowed value nudged by a fixed \
     per-metric delta, with fixed confidence bounds";

/// Fixed per-metric confidence constants
const CONFIDENCE_MOOD: f64 = 0.65;
const CONFIDENCE_CRAVING_FREQUENCY: f64 = 0.60;
const CONFIDENCE_SUCCESS_RATE: f64 = 0.70;

/// Fixed projection deltas and interval margins
const MOOD_DELTA: f64 = 0.3;
const MOOD_MARGIN: f64 = 0.5;
const FREQUENCY_WORSENING_FACTOR: f64 = 1.2;
const FREQUENCY_IMPROVING_FACTOR: f64 = 0.8;
const FREQUENCY_MARGIN: f64 = 2.0;
const SUCCESS_DELTA: f64 = 0.1;
const SUCCESS_MARGIN: f64 = 0.15;

/// Neutral mood assumed when no recent check-in carries one
const NEUTRAL_MOOD: f64 = 3.0;

/// Trend projector over recovery event histories
pub struct TrendProjector;

impl TrendProjector {
    /// Project average mood, craving frequency, and craving success rate.
    pub fn project(
        events: &EventHistory,
        snapshot: &BehavioralSnapshot,
        now: DateTime<Utc>,
    ) -> Vec<Prediction> {
        vec![
            project_mood(snapshot),
            project_craving_frequency(events, snapshot, now),
            project_success_rate(events, snapshot, now),
        ]
    }
}

fn project_mood(snapshot: &BehavioralSnapshot) -> Prediction {
    let current = snapshot.mood_average.unwrap_or(NEUTRAL_MOOD);
    let predicted = match snapshot.mood_trend {
        TrendDirection::Improving => current + MOOD_DELTA,
        TrendDirection::Declining => current - MOOD_DELTA,
        TrendDirection::Stable => current,
    }
    .clamp(1.0, 5.0);

    prediction(
        "average_mood",
        current,
        predicted,
        CONFIDENCE_MOOD,
        MOOD_MARGIN,
        (1.0, 5.0),
        snapshot.mood_trend,
    )
}

fn project_craving_frequency(
    events: &EventHistory,
    snapshot: &BehavioralSnapshot,
    now: DateTime<Utc>,
) -> Prediction {
    let current = f64::from(snapshot.craving_frequency);
    let trend = craving_frequency_trend(events, now);

    let predicted = match trend {
        // Worsening means more cravings ahead
        TrendDirection::Declining => current * FREQUENCY_WORSENING_FACTOR,
        TrendDirection::Improving => current * FREQUENCY_IMPROVING_FACTOR,
        TrendDirection::Stable => current,
    }
    .max(0.0);

    prediction(
        "craving_frequency",
        current,
        predicted,
        CONFIDENCE_CRAVING_FREQUENCY,
        FREQUENCY_MARGIN,
        (0.0, f64::MAX),
        trend,
    )
}

fn project_success_rate(
    events: &EventHistory,
    snapshot: &BehavioralSnapshot,
    now: DateTime<Utc>,
) -> Prediction {
    let current = snapshot.craving_success_rate;
    let trend = success_rate_trend(events, now);

    let predicted = match trend {
        TrendDirection::Improving => current + SUCCESS_DELTA,
        TrendDirection::Declining => current - SUCCESS_DELTA,
        TrendDirection::Stable => current,
    }
    .clamp(0.0, 1.0);

    prediction(
        "craving_success_rate",
        current,
        predicted,
        CONFIDENCE_SUCCESS_RATE,
        SUCCESS_MARGIN,
        (0.0, 1.0),
        trend,
    )
}

/// Week-over-week craving count trend. A rise of at least one craving is
/// worsening (`Declining`); a drop of at least one is improving.
fn craving_frequency_trend(events: &EventHistory, now: DateTime<Utc>) -> TrendDirection {
    let (recent, previous) = window_counts(events, now);
    let delta = recent as i64 - previous as i64;
    if previous == 0 {
        return TrendDirection::Stable;
    }
    if delta >= 1 {
        TrendDirection::Declining
    } else if delta <= -1 {
        TrendDirection::Improving
    } else {
        TrendDirection::Stable
    }
}

/// Week-over-week craving success-rate trend with a 0.1 threshold.
fn success_rate_trend(events: &EventHistory, now: DateTime<Utc>) -> TrendDirection {
    let recent_start = now - Duration::days(WINDOW_DAYS);
    let previous_start = now - Duration::days(WINDOW_DAYS * 2);

    let rate = |from: DateTime<Utc>, to: DateTime<Utc>| -> Option<f64> {
        let window: Vec<_> = events
            .cravings
            .iter()
            .filter(|c| c.timestamp > from && c.timestamp <= to)
            .collect();
        if window.is_empty() {
            return None;
        }
        let overcame = window.iter().filter(|c| c.overcame).count();
        Some(overcame as f64 / window.len() as f64)
    };

    match (rate(recent_start, now), rate(previous_start, recent_start)) {
        (Some(recent), Some(previous)) => {
            let delta = recent - previous;
            if delta > 0.1 {
                TrendDirection::Improving
            } else if delta < -0.1 {
                TrendDirection::Declining
            } else {
                TrendDirection::Stable
            }
        }
        _ => TrendDirection::Stable,
    }
}

fn window_counts(events: &EventHistory, now: DateTime<Utc>) -> (u32, u32) {
    let recent_start = now - Duration::days(WINDOW_DAYS);
    let previous_start = now - Duration::days(WINDOW_DAYS * 2);

    let recent = events
        .cravings
        .iter()
        .filter(|c| c.timestamp > recent_start && c.timestamp <= now)
        .count() as u32;
    let previous = events
        .cravings
        .iter()
        .filter(|c| c.timestamp > previous_start && c.timestamp <= recent_start)
        .count() as u32;
    (recent, previous)
}

/// Build a prediction with the interval clamped to the metric's valid range
/// and low always <= high.
fn prediction(
    metric: &str,
    current: f64,
    predicted: f64,
    confidence: f64,
    margin: f64,
    range: (f64, f64),
    trend: TrendDirection,
) -> Prediction {
    let low = (predicted - margin).clamp(range.0, range.1);
    let high = (predicted + margin).clamp(range.0, range.1);

    Prediction {
        metric: metric.to_string(),
        current_value: current,
        predicted_value: predicted,
        confidence,
        interval_low: low.min(high),
        interval_high: high.max(low),
        trend,
    }
}
