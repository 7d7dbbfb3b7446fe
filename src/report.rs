//! Report aggregation
//!
//! Composes the sub-analyses into the final risk prediction and computes
//! the data-quality confidence for the overall report. This confidence is
//! based purely on data volume and is independent of the per-warning and
//! per-correlation confidence values.

use chrono::{DateTime, Duration, Utc};

use crate::scoring::RiskScore;
use crate::types::{EventHistory, Intervention, RiskPrediction, Warning};

/// Days of history counted toward data-quality confidence
pub const QUALITY_WINDOW_DAYS: i64 = 30;

/// Data-quality confidence floor for empty histories
pub const CONFIDENCE_FLOOR: f64 = 0.50;

/// Report aggregator
pub struct ReportAggregator;

impl ReportAggregator {
    /// Merge scoring and guidance outputs into the final prediction.
    pub fn aggregate(
        risk: RiskScore,
        warnings: Vec<Warning>,
        interventions: Vec<Intervention>,
        confidence: f64,
        timeframe: String,
    ) -> RiskPrediction {
        RiskPrediction {
            risk_level: risk.level,
            risk_score: risk.score,
            confidence,
            timeframe,
            risk_factors: risk.factors,
            warnings,
            interventions,
            // Similar-pattern matching is not wired up; callers tolerate an
            // empty list.
            similar_patterns: Vec::new(),
        }
    }
}

/// Map recent data volume to a fixed confidence band.
///
/// Counts events across all four series in the trailing 30 days. More data
/// never lowers the result; an empty history sits at the 0.50 floor.
pub fn data_quality_confidence(events: &EventHistory, now: DateTime<Utc>) -> f64 {
    let count = recent_data_points(events, now);
    if count >= 30 {
        0.90
    } else if count >= 20 {
        0.80
    } else if count >= 10 {
        0.70
    } else if count >= 5 {
        0.60
    } else {
        CONFIDENCE_FLOOR
    }
}

/// Count data points across all four series in the quality window
fn recent_data_points(events: &EventHistory, now: DateTime<Utc>) -> usize {
    let start = now - Duration::days(QUALITY_WINDOW_DAYS);
    let in_window = |ts: DateTime<Utc>| ts > start && ts <= now;

    events
        .check_ins
        .iter()
        .filter(|c| in_window(c.timestamp))
        .count()
        + events
            .cravings
            .iter()
            .filter(|c| in_window(c.timestamp))
            .count()
        + events
            .meetings
            .iter()
            .filter(|m| in_window(m.timestamp))
            .count()
        + events
            .meditations
            .iter()
            .filter(|m| in_window(m.timestamp))
            .count()
}
