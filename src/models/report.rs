use serde::{Deserialize, Serialize};

use super::trial::Trial;

/// One mini-block's strategy self-report. Keyed by the raw condition-file
/// path; the key survives until the trial join consumes it and is dropped
/// from the final schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StrategyReport {
    pub condition_file: String,
    /// Raw keypress-sequence string as recorded by the control widget.
    pub keys: String,
    pub rt: Option<f64>,
}

/// One participant's normalized trial table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantTable {
    pub participant: String,
    pub trials: Vec<Trial>,
}

/// One scalar imagery-questionnaire score per participant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VviqScore {
    pub participant: String,
    pub vviq_score: f64,
}
