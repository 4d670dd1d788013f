//! Client-side risk estimation.
//!
//! The console derives a quick local risk score for every alert from the
//! reporter confidence and `payload.severity`. This is an estimate for the
//! alert badges and map markers only; plans carry the server's own risk and
//! the two numbers are never reconciled.

use crate::types::{Alert, Severity};

/// Confidence assumed when the feed gives none (or a non-numeric one).
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

/// Risk reported when there is no alert to estimate.
pub const NEUTRAL_RISK: f64 = 0.2;

/// Weight applied for a severity label.
pub fn severity_weight(severity: Option<Severity>) -> f64 {
    match severity {
        Some(Severity::High) => 0.9,
        Some(Severity::Medium) => 0.6,
        Some(Severity::Low) | None => 0.3,
    }
}

/// Estimate the risk of an alert in `[0, 1]`.
///
/// `min(1, confidence * weight)`. Never fails: missing or unusable inputs
/// degrade to their defaults.
pub fn estimate_risk(alert: &Alert) -> f64 {
    risk_from_parts(alert.confidence, alert.severity())
}

/// [`estimate_risk`] for an optional alert; absence is [`NEUTRAL_RISK`].
pub fn estimate_risk_opt(alert: Option<&Alert>) -> f64 {
    alert.map_or(NEUTRAL_RISK, estimate_risk)
}

/// Combine a raw confidence and severity into a risk score.
pub fn risk_from_parts(confidence: Option<f64>, severity: Option<Severity>) -> f64 {
    let confidence = confidence
        .filter(|c| c.is_finite())
        .unwrap_or(DEFAULT_CONFIDENCE);
    (confidence * severity_weight(severity)).clamp(0.0, 1.0)
}

/// Display tier of a risk score, shared by the badges and the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RiskTier {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskTier {
    /// Tier for a risk score: ≥0.85 critical, ≥0.6 high, ≥0.35 medium, else low.
    pub fn from_risk(risk: f64) -> Self {
        if risk >= 0.85 {
            RiskTier::Critical
        } else if risk >= 0.6 {
            RiskTier::High
        } else if risk >= 0.35 {
            RiskTier::Medium
        } else {
            RiskTier::Low
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            RiskTier::Critical => "Critical",
            RiskTier::High => "High",
            RiskTier::Medium => "Medium",
            RiskTier::Low => "Low",
        }
    }
}

/// Whole-percent rendering of a risk score, e.g. `72%`.
pub fn format_percent(risk: f64) -> String {
    format!("{:.0}%", risk * 100.0)
}

/// Badge text for a risk score, e.g. `High (72%)`.
pub fn badge(risk: f64) -> String {
    format!("{} ({})", RiskTier::from_risk(risk).label(), format_percent(risk))
}

/// An alert together with its locally derived risk.
///
/// Built fresh from every successful poll; never cached across polls and
/// never sent back to the server.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredAlert {
    pub alert: Alert,
    pub risk: f64,
}

impl ScoredAlert {
    /// Score an alert.
    pub fn new(alert: Alert) -> Self {
        let risk = estimate_risk(&alert);
        Self { alert, risk }
    }

    /// Display tier of the derived risk.
    pub fn tier(&self) -> RiskTier {
        RiskTier::from_risk(self.risk)
    }
}
