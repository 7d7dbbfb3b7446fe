//! Recovery Pulse - On-device behavioral relapse-risk engine
//!
//! Recovery Pulse turns a user's self-tracked recovery events (mood
//! check-ins, craving episodes, support-meeting attendance, meditation
//! sessions) into an explainable relapse-risk report through a
//! deterministic pipeline: pattern analysis → risk scoring → guidance
//! generation, with correlation analysis and trend projection alongside.
//!
//! The engine is pure: no I/O, no persistent state, no clock reads. Every
//! entry point takes the event history and an explicit reference timestamp,
//! so identical inputs always produce identical reports.

pub mod correlation;
pub mod engine;
pub mod error;
pub mod guidance;
pub mod patterns;
pub mod report;
pub mod scoring;
pub mod service;
pub mod trends;
pub mod types;

pub use engine::{
    analyze_correlations, daily_risk_assessment, detect_patterns, generate_predictions,
    predict_risk, EngineConfig, RiskEngine,
};
pub use error::EngineError;
pub use service::{AnalysisKind, AnalysisRequest, AnalysisResponse, RiskService};
pub use types::{
    DailyRiskAssessment, EventHistory, RiskLevel, RiskPrediction, SCHEMA_VERSION,
};

/// Engine version embedded in CLI output
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for report payloads
pub const PRODUCER_NAME: &str = "recovery-pulse";
