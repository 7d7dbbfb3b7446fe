//! Core types for the Recovery Pulse engine
//!
//! This module defines the data structures that flow through the engine:
//! raw recovery events, the derived behavioral snapshot, risk factors, and
//! the report structures returned to callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Event log schema version embedded in serialized payloads
pub const SCHEMA_VERSION: &str = "recovery.events.v1";

/// HALT self-assessment (Hungry, Angry, Lonely, Tired), each rated 1-10
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HaltAssessment {
    /// Hunger level (1-10)
    pub hungry: u8,
    /// Anger level (1-10)
    pub angry: u8,
    /// Loneliness level (1-10)
    pub lonely: u8,
    /// Tiredness level (1-10)
    pub tired: u8,
}

/// A daily mood/wellness check-in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckIn {
    /// When the check-in was recorded
    pub timestamp: DateTime<Utc>,
    /// Self-reported mood (1-5, 5 = best)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mood: Option<u8>,
    /// Optional HALT self-assessment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub halt: Option<HaltAssessment>,
}

/// A logged craving episode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Craving {
    /// When the craving occurred
    pub timestamp: DateTime<Utc>,
    /// Craving intensity (1-10)
    pub intensity: u8,
    /// Trigger category (e.g. "stress", "social", "boredom")
    pub trigger: String,
    /// Whether the user overcame the craving
    pub overcame: bool,
}

/// A support-meeting attendance record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meeting {
    /// When the meeting took place
    pub timestamp: DateTime<Utc>,
    /// Meeting type (e.g. "group", "sponsor", "online")
    pub meeting_type: String,
    /// Optional location label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// A meditation/mindfulness session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeditationSession {
    /// When the session took place
    pub timestamp: DateTime<Utc>,
    /// Session duration in minutes
    pub duration_minutes: f64,
    /// Session type (e.g. "breathing", "body-scan", "guided")
    pub session_type: String,
}

/// The full event history supplied by the caller.
///
/// This is the payload that crosses the engine boundary; the engine reads it
/// and never mutates it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventHistory {
    /// Mood/wellness check-ins
    #[serde(default)]
    pub check_ins: Vec<CheckIn>,
    /// Craving episodes
    #[serde(default)]
    pub cravings: Vec<Craving>,
    /// Support-meeting attendance
    #[serde(default)]
    pub meetings: Vec<Meeting>,
    /// Meditation sessions
    #[serde(default)]
    pub meditations: Vec<MeditationSession>,
}

impl EventHistory {
    /// Parse an event history from JSON
    pub fn from_json(json: &str) -> Result<Self, crate::error::EngineError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the event history to JSON
    pub fn to_json(&self) -> Result<String, crate::error::EngineError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Direction of a behavioral trend over the comparison windows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Improving,
    Stable,
    Declining,
}

impl TrendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Improving => "improving",
            TrendDirection::Stable => "stable",
            TrendDirection::Declining => "declining",
        }
    }
}

/// Average HALT component values over recent check-ins (each 1-10).
///
/// When no recent check-in carries HALT data, all components default to the
/// neutral midpoint (5.0) rather than zero, so missing data neither inflates
/// nor depresses risk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HaltAverages {
    pub hungry: f64,
    pub angry: f64,
    pub lonely: f64,
    pub tired: f64,
}

impl Default for HaltAverages {
    fn default() -> Self {
        Self {
            hungry: 5.0,
            angry: 5.0,
            lonely: 5.0,
            tired: 5.0,
        }
    }
}

/// Week-over-week behavioral aggregates derived from raw events.
///
/// Recomputed on every engine call; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehavioralSnapshot {
    /// Check-ins in the recent window (count/week)
    pub check_in_frequency: u32,
    /// Recent check-in count fell below 70% of the previous week's
    pub check_in_decline: bool,
    /// Average mood over recent check-ins (1-5), if any carried a mood
    pub mood_average: Option<f64>,
    /// Week-over-week mood trend
    pub mood_trend: TrendDirection,
    /// Population standard deviation of recent mood values
    pub mood_volatility: f64,
    /// Cravings in the recent window (count/week)
    pub craving_frequency: u32,
    /// Average craving intensity over the recent window (1-10), if any
    pub craving_intensity_average: Option<f64>,
    /// Week-over-week craving intensity trend. `Declining` means intensity
    /// is rising (the situation is worsening).
    pub craving_intensity_trend: TrendDirection,
    /// Fraction of recent cravings that were overcome (0-1, 1.0 when none)
    pub craving_success_rate: f64,
    /// Average HALT components over recent check-ins
    pub halt: HaltAverages,
    /// Meetings attended in the recent window
    pub meeting_frequency: u32,
    /// Recent meeting count fell below 70% of the previous week's
    pub meeting_decline: bool,
    /// Meditation sessions in the recent window
    pub meditation_frequency: u32,
    /// Recent meditation count fell below 70% of the previous week's
    pub meditation_decline: bool,
    /// Isolation score (0-100, higher = more isolated)
    pub isolation_score: f64,
    /// Stress score (0-100, higher = more stressed)
    pub stress_score: f64,
}

/// Relapse-risk severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Moderate => "moderate",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }
}

/// A named, weighted contributor to the overall risk score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskFactor {
    /// Stable factor identifier (e.g. "craving_intensity_rising")
    pub id: String,
    /// Human-readable factor name
    pub name: String,
    /// Weight as a fraction of the 100-point scale (0-1)
    pub weight: f64,
    /// Factor intensity (0-100)
    pub score: f64,
    /// Severity level of this factor in isolation
    pub level: RiskLevel,
    /// Suggested mitigation actions
    pub mitigations: Vec<String>,
}

/// Warning severity, ordered critical > high > medium > low
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Fixed ordinal rank used for descending sorts
    pub fn rank(&self) -> u8 {
        match self {
            Severity::Critical => 3,
            Severity::High => 2,
            Severity::Medium => 1,
            Severity::Low => 0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

/// A human-readable early warning derived from an active risk factor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Warning {
    /// Stable warning identifier
    pub id: String,
    /// Warning text shown to the user
    pub message: String,
    /// Warning severity
    pub severity: Severity,
    /// Confidence in this warning (0-1, fixed per factor)
    pub confidence: f64,
    /// Risk factor ids that triggered this warning
    pub trigger_factors: Vec<String>,
}

/// Intervention priority, ordered immediate > high > medium > low
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Immediate,
}

impl Priority {
    /// Fixed ordinal rank used for descending sorts
    pub fn rank(&self) -> u8 {
        match self {
            Priority::Immediate => 3,
            Priority::High => 2,
            Priority::Medium => 1,
            Priority::Low => 0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Immediate => "immediate",
        }
    }
}

/// A recommended, actionable intervention
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Intervention {
    /// Stable intervention identifier
    pub id: String,
    /// Short title shown to the user
    pub title: String,
    /// Intervention priority
    pub priority: Priority,
    /// Expected effectiveness (0-1, fixed per intervention)
    pub effectiveness: f64,
    /// Concrete action steps
    pub actions: Vec<String>,
    /// Rough time estimate label (e.g. "5-10 minutes")
    pub time_estimate: String,
}

/// Correlation strength classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationStrength {
    Weak,
    Moderate,
    Strong,
}

/// Correlation direction classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationDirection {
    Positive,
    Negative,
    None,
}

/// A pairwise statistical relationship between two behavioral metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Correlation {
    /// First variable in the pair
    pub variable_a: String,
    /// Second variable in the pair
    pub variable_b: String,
    /// Pearson correlation coefficient (-1..1)
    pub coefficient: f64,
    /// Strength classification (|r| > 0.7 strong, > 0.4 moderate, else weak)
    pub strength: CorrelationStrength,
    /// Direction classification (r > 0.1 positive, r < -0.1 negative)
    pub direction: CorrelationDirection,
    /// Significance proxy computed as `1 - |r|`. This is a simplified
    /// approximation, not a rigorous p-value.
    pub significance: f64,
    /// Number of aligned data points the coefficient was computed over
    pub sample_size: usize,
    /// Human-readable interpretation of the relationship
    pub interpretation: String,
}

/// A short-horizon projection for one behavioral metric
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    /// Metric name (e.g. "average_mood")
    pub metric: String,
    /// Current windowed value
    pub current_value: f64,
    /// Projected value over the prediction timeframe
    pub predicted_value: f64,
    /// Confidence in the projection (0-1, fixed per metric)
    pub confidence: f64,
    /// Lower bound of the confidence interval (always <= high)
    pub interval_low: f64,
    /// Upper bound of the confidence interval
    pub interval_high: f64,
    /// Trend direction the projection follows
    pub trend: TrendDirection,
}

/// Complete relapse-risk prediction returned by the engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskPrediction {
    /// Overall risk level
    pub risk_level: RiskLevel,
    /// Overall risk score (0-100, clamped)
    pub risk_score: f64,
    /// Data-quality confidence in this prediction (0-1). Distinct from the
    /// per-warning and per-correlation confidence values.
    pub confidence: f64,
    /// Timeframe the prediction covers (e.g. "next 7 days")
    pub timeframe: String,
    /// Active risk factors, in deterministic catalog order
    pub risk_factors: Vec<RiskFactor>,
    /// Warnings, sorted non-increasing by severity, capped at 5
    pub warnings: Vec<Warning>,
    /// Interventions, sorted non-increasing by priority, capped at 10
    pub interventions: Vec<Intervention>,
    /// Similar historical patterns (may be empty)
    pub similar_patterns: Vec<String>,
}

/// Condensed daily view derived from the full risk prediction.
///
/// Carries the same risk level and score as [`RiskPrediction`] for the same
/// input; this equivalence is a contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyRiskAssessment {
    /// Today's risk level (equals the full prediction's level)
    pub today_risk: RiskLevel,
    /// Today's risk score (equals the full prediction's score)
    pub risk_score: f64,
    /// Top warning messages (at most 3)
    pub top_warnings: Vec<String>,
    /// Action strings from the highest-priority interventions (at most 3)
    pub immediate_actions: Vec<String>,
}

/// A single detected behavioral pattern
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternFinding {
    /// Metric the pattern concerns (e.g. "mood", "craving_intensity")
    pub metric: String,
    /// Direction of the pattern
    pub direction: TrendDirection,
    /// Human-readable description
    pub description: String,
}

/// Output of pattern detection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternReport {
    /// Detected patterns (may be empty for sparse data)
    pub patterns: Vec<PatternFinding>,
    /// Data-quality confidence (0-1)
    pub confidence: f64,
    /// Timeframe the analysis covers
    pub timeframe: String,
}

/// Output of correlation analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationReport {
    /// All named metric-pair correlations
    pub correlations: Vec<Correlation>,
    /// Subset with |coefficient| > 0.5
    pub strong_correlations: Vec<Correlation>,
    /// Human-readable insight strings for non-trivial relationships
    pub insights: Vec<String>,
}

/// Output of trend projection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionReport {
    /// Per-metric projections
    pub predictions: Vec<Prediction>,
    /// Mean of the per-prediction confidences (0-1)
    pub accuracy: f64,
    /// Data-quality confidence (0-1)
    pub confidence: f64,
    /// Description of the projection method
    pub methodology: String,
}
