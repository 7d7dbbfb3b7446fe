//! Engine orchestration
//!
//! This module provides the public API for Recovery Pulse. It wires the
//! pattern analyzer, risk scorer, guidance generators, correlation engine,
//! and trend projector into the report entry points.
//!
//! The engine is pure: every entry point takes an immutable event history
//! and an explicit reference timestamp, holds no state between calls, and
//! performs no I/O. Calling any entry point twice with the same input
//! produces identical output.

use chrono::{DateTime, Utc};

use crate::correlation::CorrelationEngine;
use crate::guidance::{InterventionRecommender, WarningGenerator};
use crate::patterns::{PatternAnalyzer, WINDOW_DAYS};
use crate::report::{data_quality_confidence, ReportAggregator};
use crate::scoring::RiskScorer;
use crate::trends::{TrendProjector, METHODOLOGY};
use crate::types::{
    BehavioralSnapshot, CorrelationReport, DailyRiskAssessment, EventHistory, PatternFinding,
    PatternReport, PredictionReport, RiskPrediction, TrendDirection,
};

/// Number of entries in the condensed daily view
const DAILY_TOP_N: usize = 3;

/// Engine configuration.
///
/// Constructed explicitly and injected into [`RiskEngine`]; there is no
/// global engine instance.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Timeframe label attached to risk predictions
    pub prediction_timeframe: String,
    /// Timeframe label attached to pattern reports
    pub analysis_timeframe: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            prediction_timeframe: "next 7 days".to_string(),
            analysis_timeframe: format!("last {} days", WINDOW_DAYS * 2),
        }
    }
}

/// The behavioral risk-scoring engine.
///
/// Stateless apart from its configuration; safe to share across callers.
#[derive(Debug, Clone, Default)]
pub struct RiskEngine {
    config: EngineConfig,
}

impl RiskEngine {
    /// Create an engine with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with an explicit configuration
    pub fn with_config(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Full risk assessment: snapshot, scoring, warnings, interventions.
    pub fn predict_risk(&self, events: &EventHistory, now: DateTime<Utc>) -> RiskPrediction {
        let snapshot = PatternAnalyzer::analyze(events, now);
        let risk = RiskScorer::score(&snapshot);
        let warnings = WarningGenerator::generate(&risk.factors);
        let interventions = InterventionRecommender::recommend(&snapshot);
        let confidence = data_quality_confidence(events, now);

        ReportAggregator::aggregate(
            risk,
            warnings,
            interventions,
            confidence,
            self.config.prediction_timeframe.clone(),
        )
    }

    /// Condensed daily view.
    ///
    /// Derived from [`Self::predict_risk`]; reports the same risk level and
    /// score as the full prediction for the same input.
    pub fn daily_risk_assessment(
        &self,
        events: &EventHistory,
        now: DateTime<Utc>,
    ) -> DailyRiskAssessment {
        let prediction = self.predict_risk(events, now);

        let top_warnings = prediction
            .warnings
            .iter()
            .take(DAILY_TOP_N)
            .map(|w| w.message.clone())
            .collect();

        let immediate_actions = prediction
            .interventions
            .iter()
            .flat_map(|i| i.actions.iter().cloned())
            .take(DAILY_TOP_N)
            .collect();

        DailyRiskAssessment {
            today_risk: prediction.risk_level,
            risk_score: prediction.risk_score,
            top_warnings,
            immediate_actions,
        }
    }

    /// Detect week-over-week behavioral patterns.
    pub fn detect_patterns(&self, events: &EventHistory, now: DateTime<Utc>) -> PatternReport {
        let snapshot = PatternAnalyzer::analyze(events, now);

        PatternReport {
            patterns: pattern_findings(&snapshot),
            confidence: data_quality_confidence(events, now),
            timeframe: self.config.analysis_timeframe.clone(),
        }
    }

    /// Compute the fixed set of metric-pair correlations.
    pub fn analyze_correlations(
        &self,
        events: &EventHistory,
        now: DateTime<Utc>,
    ) -> CorrelationReport {
        CorrelationEngine::analyze(events, now)
    }

    /// Project near-term values for the tracked metrics.
    pub fn generate_predictions(
        &self,
        events: &EventHistory,
        now: DateTime<Utc>,
    ) -> PredictionReport {
        let snapshot = PatternAnalyzer::analyze(events, now);
        let predictions = TrendProjector::project(events, &snapshot, now);

        let accuracy = if predictions.is_empty() {
            0.0
        } else {
            predictions.iter().map(|p| p.confidence).sum::<f64>() / predictions.len() as f64
        };

        PredictionReport {
            predictions,
            accuracy,
            confidence: data_quality_confidence(events, now),
            methodology: METHODOLOGY.to_string(),
        }
    }
}

/// Readable pattern findings from a snapshot. Sparse data that triggers
/// nothing yields an empty list.
fn pattern_findings(snapshot: &BehavioralSnapshot) -> Vec<PatternFinding> {
    let mut findings = Vec::new();

    if snapshot.mood_trend != TrendDirection::Stable {
        findings.push(PatternFinding {
            metric: "mood".to_string(),
            direction: snapshot.mood_trend,
            description: format!("Your mood has been {}", snapshot.mood_trend.as_str()),
        });
    }

    if snapshot.craving_intensity_trend != TrendDirection::Stable {
        let description = match snapshot.craving_intensity_trend {
            TrendDirection::Declining => "Craving intensity is rising week over week",
            _ => "Craving intensity is easing week over week",
        };
        findings.push(PatternFinding {
            metric: "craving_intensity".to_string(),
            direction: snapshot.craving_intensity_trend,
            description: description.to_string(),
        });
    }

    if snapshot.check_in_decline {
        findings.push(PatternFinding {
            metric: "check_in_frequency".to_string(),
            direction: TrendDirection::Declining,
            description: "You're checking in less often than last week".to_string(),
        });
    }

    if snapshot.meeting_decline {
        findings.push(PatternFinding {
            metric: "meeting_attendance".to_string(),
            direction: TrendDirection::Declining,
            description: "Meeting attendance dropped from last week".to_string(),
        });
    }

    if snapshot.meditation_decline {
        findings.push(PatternFinding {
            metric: "meditation_practice".to_string(),
            direction: TrendDirection::Declining,
            description: "Meditation practice dropped from last week".to_string(),
        });
    }

    if snapshot.isolation_score > 60.0 {
        findings.push(PatternFinding {
            metric: "isolation".to_string(),
            direction: TrendDirection::Declining,
            description: "Support contact has been low recently".to_string(),
        });
    }

    findings
}

/// Full risk assessment with the default configuration.
pub fn predict_risk(events: &EventHistory, now: DateTime<Utc>) -> RiskPrediction {
    RiskEngine::new().predict_risk(events, now)
}

/// Condensed daily assessment with the default configuration.
pub fn daily_risk_assessment(events: &EventHistory, now: DateTime<Utc>) -> DailyRiskAssessment {
    RiskEngine::new().daily_risk_assessment(events, now)
}

/// Pattern detection with the default configuration.
pub fn detect_patterns(events: &EventHistory, now: DateTime<Utc>) -> PatternReport {
    RiskEngine::new().detect_patterns(events, now)
}

/// Correlation analysis with the default configuration.
pub fn analyze_correlations(events: &EventHistory, now: DateTime<Utc>) -> CorrelationReport {
    RiskEngine::new().analyze_correlations(events, now)
}

/// Trend projection with the default configuration.
pub fn generate_predictions(events: &EventHistory, now: DateTime<Utc>) -> PredictionReport {
    RiskEngine::new().generate_predictions(events, now)
}
