//! Late blight (rancha) risk taxonomy and the threshold rule

use serde::{Deserialize, Serialize};

/// Risk of late blight, ordered by severity ascending
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    /// Not conducive
    Optimo,
    /// Alert
    Rancha,
    /// Conducive
    Favorable,
    /// Emergency-level conducive
    MuyFavorable,
}

/// Every taxonomy member, in model rank order (rank 1 first)
pub const RISK_TAXONOMY: [RiskLevel; 4] = [
    RiskLevel::Optimo,
    RiskLevel::Rancha,
    RiskLevel::Favorable,
    RiskLevel::MuyFavorable,
];

impl RiskLevel {
    /// Stable machine-readable tag
    pub fn code(&self) -> &'static str {
        match self {
            RiskLevel::Optimo => "optimo",
            RiskLevel::Rancha => "rancha",
            RiskLevel::Favorable => "favorable",
            RiskLevel::MuyFavorable => "muy_favorable",
        }
    }

    /// Display label shown to farmers
    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Optimo => "POCO FAVORABLE",
            RiskLevel::Rancha => "ALERTA DE RANCHA",
            RiskLevel::Favorable => "FAVORABLE",
            RiskLevel::MuyFavorable => "MUY FAVORABLE",
        }
    }

    /// Label used by the threshold rule, which flags the top level as an emergency
    pub fn rule_label(&self) -> &'static str {
        match self {
            RiskLevel::MuyFavorable => "MUY FAVORABLE - EMERGENCIA",
            other => other.label(),
        }
    }

    /// Map a 1-based model class rank onto the taxonomy, clamping into [1, 4]
    pub fn from_rank(rank: i64) -> Self {
        let idx = rank.clamp(1, RISK_TAXONOMY.len() as i64) - 1;
        RISK_TAXONOMY[idx as usize]
    }

    /// 1-based model class rank
    pub fn rank(&self) -> u8 {
        match self {
            RiskLevel::Optimo => 1,
            RiskLevel::Rancha => 2,
            RiskLevel::Favorable => 3,
            RiskLevel::MuyFavorable => 4,
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of a classification call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskVerdict {
    pub level: RiskLevel,
    pub label: &'static str,
    pub code: &'static str,
    /// Only the model path carries a confidence, always in [0, 1]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl RiskVerdict {
    /// Verdict produced by the threshold rule
    pub fn from_rule(level: RiskLevel) -> Self {
        Self {
            level,
            label: level.rule_label(),
            code: level.code(),
            confidence: None,
        }
    }

    /// Verdict produced by a classification model
    pub fn from_model(level: RiskLevel, confidence: f64) -> Self {
        Self {
            level,
            label: level.label(),
            code: level.code(),
            confidence: Some(confidence.clamp(0.0, 1.0)),
        }
    }
}

/// Classify late blight risk from temperature (°C) and relative humidity (%).
///
/// Total over every input, including NaN and physically impossible values.
/// Rules are evaluated in order and the first match wins.
pub fn classify_risk(temperature: f64, humidity: f64) -> RiskLevel {
    let ideal_temp = (15.0..=26.0).contains(&temperature);
    let alert_temp = (12.0..15.0).contains(&temperature)
        || (temperature > 26.0 && temperature <= 28.0);

    if ideal_temp && humidity > 95.0 {
        RiskLevel::MuyFavorable
    } else if ideal_temp && humidity > 90.0 {
        RiskLevel::Favorable
    } else if (alert_temp || ideal_temp) && humidity >= 80.0 {
        RiskLevel::Rancha
    } else {
        RiskLevel::Optimo
    }
}

/// Run the threshold rule and wrap the result as a verdict
pub fn evaluate_rule(temperature: f64, humidity: f64) -> RiskVerdict {
    RiskVerdict::from_rule(classify_risk(temperature, humidity))
}
