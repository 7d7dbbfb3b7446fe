//! Request/response service envelope
//!
//! The engine is pure and synchronous; callers typically run it off their
//! primary interaction thread and talk to it through messages. This module
//! defines the serializable envelope for that boundary.
//!
//! Every request carries a unique correlation ID that is echoed in the
//! response, and [`ResponseRouter`] maps IDs to pending callbacks. Keying
//! pending work by response type instead would silently drop the first of
//! two in-flight requests of the same kind.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::engine::RiskEngine;
use crate::types::{
    CorrelationReport, DailyRiskAssessment, EventHistory, PatternReport, PredictionReport,
    RiskPrediction,
};

/// The analysis a request asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    PredictRisk,
    DailyRiskAssessment,
    DetectPatterns,
    AnalyzeCorrelations,
    GeneratePredictions,
}

/// A single analysis request crossing the engine boundary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Unique correlation ID, echoed in the response
    pub request_id: Uuid,
    /// Requested analysis
    pub kind: AnalysisKind,
    /// Event history to analyze
    pub events: EventHistory,
    /// Reference timestamp for all window calculations
    pub reference_time: DateTime<Utc>,
}

impl AnalysisRequest {
    /// Build a request with a freshly assigned correlation ID
    pub fn new(kind: AnalysisKind, events: EventHistory, reference_time: DateTime<Utc>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            kind,
            events,
            reference_time,
        }
    }
}

/// Result payload of an analysis request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "report", rename_all = "snake_case")]
pub enum AnalysisOutcome {
    Risk(RiskPrediction),
    Daily(DailyRiskAssessment),
    Patterns(PatternReport),
    Correlations(CorrelationReport),
    Predictions(PredictionReport),
}

/// A single analysis response, correlated to its request by ID
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResponse {
    /// Correlation ID of the originating request
    pub request_id: Uuid,
    /// Analysis result
    pub outcome: AnalysisOutcome,
}

/// Synchronous service wrapper around the engine.
///
/// One request in, one response out; no retry, cancellation, or timeout
/// logic lives here. Those belong to the caller's dispatcher.
#[derive(Debug, Clone, Default)]
pub struct RiskService {
    engine: RiskEngine,
}

impl RiskService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_engine(engine: RiskEngine) -> Self {
        Self { engine }
    }

    /// Process one request into its correlated response
    pub fn handle(&self, request: &AnalysisRequest) -> AnalysisResponse {
        let outcome = match request.kind {
            AnalysisKind::PredictRisk => AnalysisOutcome::Risk(
                self.engine
                    .predict_risk(&request.events, request.reference_time),
            ),
            AnalysisKind::DailyRiskAssessment => AnalysisOutcome::Daily(
                self.engine
                    .daily_risk_assessment(&request.events, request.reference_time),
            ),
            AnalysisKind::DetectPatterns => AnalysisOutcome::Patterns(
                self.engine
                    .detect_patterns(&request.events, request.reference_time),
            ),
            AnalysisKind::AnalyzeCorrelations => AnalysisOutcome::Correlations(
                self.engine
                    .analyze_correlations(&request.events, request.reference_time),
            ),
            AnalysisKind::GeneratePredictions => AnalysisOutcome::Predictions(
                self.engine
                    .generate_predictions(&request.events, request.reference_time),
            ),
        };

        AnalysisResponse {
            request_id: request.request_id,
            outcome,
        }
    }
}

/// Routes responses to pending per-request callbacks by correlation ID.
///
/// Multiple in-flight requests of the same kind resolve independently; an
/// unknown or already-resolved ID is reported to the caller rather than
/// silently dropped.
#[derive(Default)]
pub struct ResponseRouter {
    pending: HashMap<Uuid, Box<dyn FnOnce(AnalysisResponse) + Send>>,
}

impl ResponseRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback for a request ID
    pub fn register<F>(&mut self, request_id: Uuid, callback: F)
    where
        F: FnOnce(AnalysisResponse) + Send + 'static,
    {
        self.pending.insert(request_id, Box::new(callback));
    }

    /// Deliver a response to its pending callback.
    ///
    /// Returns false when no callback is registered for the response's ID.
    pub fn resolve(&mut self, response: AnalysisResponse) -> bool {
        match self.pending.remove(&response.request_id) {
            Some(callback) => {
                callback(response);
                true
            }
            None => false,
        }
    }

    /// Number of requests still awaiting a response
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::mpsc;

    fn reference_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_response_echoes_request_id() {
        let service = RiskService::new();
        let request = AnalysisRequest::new(
            AnalysisKind::PredictRisk,
            EventHistory::default(),
            reference_time(),
        );

        let response = service.handle(&request);
        assert_eq!(response.request_id, request.request_id);
        assert!(matches!(response.outcome, AnalysisOutcome::Risk(_)));
    }

    #[test]
    fn test_each_kind_returns_matching_outcome() {
        let service = RiskService::new();
        let cases = [
            (AnalysisKind::PredictRisk, "risk"),
            (AnalysisKind::DailyRiskAssessment, "daily"),
            (AnalysisKind::DetectPatterns, "patterns"),
            (AnalysisKind::AnalyzeCorrelations, "correlations"),
            (AnalysisKind::GeneratePredictions, "predictions"),
        ];

        for (kind, expected) in cases {
            let request =
                AnalysisRequest::new(kind, EventHistory::default(), reference_time());
            let response = service.handle(&request);
            let got = match response.outcome {
                AnalysisOutcome::Risk(_) => "risk",
                AnalysisOutcome::Daily(_) => "daily",
                AnalysisOutcome::Patterns(_) => "patterns",
                AnalysisOutcome::Correlations(_) => "correlations",
                AnalysisOutcome::Predictions(_) => "predictions",
            };
            assert_eq!(got, expected);
        }
    }

    #[test]
    fn test_concurrent_same_kind_requests_resolve_independently() {
        let service = RiskService::new();
        let mut router = ResponseRouter::new();

        let first = AnalysisRequest::new(
            AnalysisKind::PredictRisk,
            EventHistory::default(),
            reference_time(),
        );
        let second = AnalysisRequest::new(
            AnalysisKind::PredictRisk,
            EventHistory::default(),
            reference_time(),
        );
        assert_ne!(first.request_id, second.request_id);

        let (tx_a, rx_a) = mpsc::channel();
        let (tx_b, rx_b) = mpsc::channel();
        router.register(first.request_id, move |r| tx_a.send(r.request_id).unwrap());
        router.register(second.request_id, move |r| {
            tx_b.send(r.request_id).unwrap()
        });
        assert_eq!(router.pending_count(), 2);

        // Deliver out of order; both callers still resolve
        assert!(router.resolve(service.handle(&second)));
        assert!(router.resolve(service.handle(&first)));
        assert_eq!(router.pending_count(), 0);

        assert_eq!(rx_a.recv().unwrap(), first.request_id);
        assert_eq!(rx_b.recv().unwrap(), second.request_id);
    }

    #[test]
    fn test_unknown_response_id_is_reported() {
        let mut router = ResponseRouter::new();
        let service = RiskService::new();
        let request = AnalysisRequest::new(
            AnalysisKind::DetectPatterns,
            EventHistory::default(),
            reference_time(),
        );

        assert!(!router.resolve(service.handle(&request)));
    }

    #[test]
    fn test_envelope_round_trips_through_json() {
        let request = AnalysisRequest::new(
            AnalysisKind::AnalyzeCorrelations,
            EventHistory::default(),
            reference_time(),
        );

        let json = serde_json::to_string(&request).unwrap();
        let parsed: AnalysisRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.request_id, request.request_id);
        assert_eq!(parsed.kind, AnalysisKind::AnalyzeCorrelations);

        let response = RiskService::new().handle(&parsed);
        let response_json = serde_json::to_string(&response).unwrap();
        let parsed_response: AnalysisResponse = serde_json::from_str(&response_json).unwrap();
        assert_eq!(parsed_response.request_id, request.request_id);
    }
}
