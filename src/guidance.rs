//! Warning generation and intervention recommendation
//!
//! Turns active risk factors into ranked, human-readable guidance. Each
//! active factor maps to at most one warning with a fixed confidence
//! constant; interventions are generated independently from the snapshot.
//! Both lists are sorted by their fixed ordinal rank and capped.

use crate::types::{
    BehavioralSnapshot, Intervention, Priority, RiskFactor, Severity, Warning,
};

/// Maximum warnings returned
pub const WARNING_CAP: usize = 5;

/// Maximum interventions returned
pub const INTERVENTION_CAP: usize = 10;

/// Generates warnings from active risk factors
pub struct WarningGenerator;

impl WarningGenerator {
    /// Map active factors to warnings, sorted non-increasing by severity
    /// and capped at [`WARNING_CAP`].
    ///
    /// Not every factor produces a warning; with no active factors the
    /// result is empty, and callers must not assume otherwise.
    pub fn generate(factors: &[RiskFactor]) -> Vec<Warning> {
        let mut warnings: Vec<Warning> = factors.iter().filter_map(warning_for_factor).collect();

        // Stable sort keeps catalog order among equal severities
        warnings.sort_by(|a, b| b.severity.rank().cmp(&a.severity.rank()));
        warnings.truncate(WARNING_CAP);
        warnings
    }
}

/// Severity as a deterministic function of factor intensity
fn severity_for_intensity(score: f64) -> Severity {
    if score >= 75.0 {
        Severity::Critical
    } else if score >= 50.0 {
        Severity::High
    } else if score >= 25.0 {
        Severity::Medium
    } else {
        Severity::Low
    }
}

/// Map one factor to its warning, if it has one.
///
/// Confidence values are fixed per-factor design constants.
fn warning_for_factor(factor: &RiskFactor) -> Option<Warning> {
    let (id, message, confidence) = match factor.id.as_str() {
        "checkin_decline" => (
            "warn_checkin_decline",
            "You've been checking in less often than usual. Gaps in tracking often come before harder weeks.",
            0.70,
        ),
        "mood_declining" => (
            "warn_mood_declining",
            "Your mood has been trending downward over the past week.",
            0.75,
        ),
        "low_mood" => (
            "warn_low_mood",
            "Your mood has stayed very low recently. This is a strong relapse signal.",
            0.85,
        ),
        "craving_intensity_rising" => (
            "warn_craving_intensity",
            "Your cravings are getting more intense compared to last week.",
            0.80,
        ),
        "frequent_cravings" => (
            "warn_frequent_cravings",
            "You're experiencing cravings more often than usual.",
            0.75,
        ),
        "low_craving_success" => (
            "warn_low_success",
            "More cravings are getting through than you're overcoming right now.",
            0.80,
        ),
        "isolation" => (
            "warn_isolation",
            "You've had little support contact lately. Isolation raises relapse risk.",
            0.75,
        ),
        "meeting_decline" => (
            "warn_meeting_decline",
            "Your meeting attendance has dropped compared to last week.",
            0.70,
        ),
        "high_stress" => (
            "warn_high_stress",
            "Your stress indicators are elevated.",
            0.65,
        ),
        // mood_volatility, meditation_decline and halt_loneliness surface
        // through interventions and other warnings instead
        _ => return None,
    };

    Some(Warning {
        id: id.to_string(),
        message: message.to_string(),
        severity: severity_for_intensity(factor.score),
        confidence,
        trigger_factors: vec![factor.id.clone()],
    })
}

/// Recommends interventions from the behavioral snapshot
pub struct InterventionRecommender;

impl InterventionRecommender {
    /// Build the intervention list, sorted non-increasing by priority and
    /// capped at [`INTERVENTION_CAP`].
    ///
    /// The support-network intervention is always present at immediate
    /// priority; the rest are conditional on the snapshot.
    pub fn recommend(snapshot: &BehavioralSnapshot) -> Vec<Intervention> {
        let mut interventions = vec![contact_support_network()];

        if snapshot.craving_frequency > 3 {
            interventions.push(Intervention {
                id: "craving_management".to_string(),
                title: "Work your craving plan".to_string(),
                priority: Priority::High,
                effectiveness: 0.80,
                actions: vec![
                    "Practice urge surfing for 10 minutes when a craving starts".to_string(),
                    "Write down the trigger for each craving".to_string(),
                    "Delay and distract: set a 20-minute timer before acting".to_string(),
                ],
                time_estimate: "10-20 minutes per craving".to_string(),
            });
        }

        if snapshot.meeting_frequency < 2 {
            interventions.push(Intervention {
                id: "increase_meetings".to_string(),
                title: "Get to more meetings".to_string(),
                priority: Priority::High,
                effectiveness: 0.85,
                actions: vec![
                    "Find a meeting happening in the next 48 hours".to_string(),
                    "Ask someone to go with you".to_string(),
                ],
                time_estimate: "60-90 minutes".to_string(),
            });
        }

        if snapshot.mood_trend == crate::types::TrendDirection::Declining {
            interventions.push(Intervention {
                id: "mood_care".to_string(),
                title: "Tend to your mood".to_string(),
                priority: Priority::Medium,
                effectiveness: 0.70,
                actions: vec![
                    "Schedule one activity you usually enjoy".to_string(),
                    "Get outside for at least 20 minutes".to_string(),
                    "Tell one person how you're actually doing".to_string(),
                ],
                time_estimate: "30-60 minutes".to_string(),
            });
        }

        if snapshot.stress_score > 60.0 {
            interventions.push(Intervention {
                id: "stress_reduction".to_string(),
                title: "Bring your stress down".to_string(),
                priority: Priority::Medium,
                effectiveness: 0.75,
                actions: vec![
                    "Do a 5-minute breathing exercise".to_string(),
                    "Drop or postpone one non-essential commitment".to_string(),
                ],
                time_estimate: "5-15 minutes".to_string(),
            });
        }

        if snapshot.meditation_frequency == 0 {
            interventions.push(Intervention {
                id: "mindfulness_starter".to_string(),
                title: "Restart a short mindfulness practice".to_string(),
                priority: Priority::Low,
                effectiveness: 0.65,
                actions: vec![
                    "Try a guided 5-minute session before bed".to_string(),
                ],
                time_estimate: "5 minutes".to_string(),
            });
        }

        interventions.sort_by(|a, b| b.priority.rank().cmp(&a.priority.rank()));
        interventions.truncate(INTERVENTION_CAP);
        interventions
    }
}

/// The unconditional support-network intervention
fn contact_support_network() -> Intervention {
    Intervention {
        id: "contact_support".to_string(),
        title: "Contact your support network".to_string(),
        priority: Priority::Immediate,
        effectiveness: 0.90,
        actions: vec![
            "Call or message your sponsor".to_string(),
            "Reach out to one trusted friend or family member".to_string(),
            "If you feel at risk right now, use your crisis contact".to_string(),
        ],
        time_estimate: "15-30 minutes".to_string(),
    }
}
