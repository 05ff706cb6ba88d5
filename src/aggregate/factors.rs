use anyhow::{bail, Result};
use serde::Serialize;

use crate::models::Trial;

/// Grouping variables exposed to the comparison configuration.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Factor {
    Participant,
    Block,
    Wm,
    Dimension,
    RotType,
    Angle,
    Correctness,
    StrategyResponse,
    VividResponse,
}

impl Factor {
    pub fn as_str(&self) -> &'static str {
        match self {
            Factor::Participant => "participant",
            Factor::Block => "block",
            Factor::Wm => "wm",
            Factor::Dimension => "dimension",
            Factor::RotType => "rot_type",
            Factor::Angle => "angle",
            Factor::Correctness => "corr",
            Factor::StrategyResponse => "strategy_response",
            Factor::VividResponse => "vivid_response",
        }
    }

    /// The trial's level on this factor. A trial lacking the level stays
    /// in the table but drops out of groupings that need it.
    pub fn level(&self, trial: &Trial) -> Option<String> {
        match self {
            Factor::Participant => Some(trial.participant.clone()),
            Factor::Block => trial.block.map(|block| block.as_str().to_string()),
            Factor::Wm => trial
                .wm
                .map(|wm| if wm { "WM" } else { "Single" }.to_string()),
            Factor::Dimension => trial.dimension.map(|dim| dim.as_str().to_string()),
            Factor::RotType => Some(trial.rot_type.as_str().to_string()),
            Factor::Angle => trial.angle.map(format_angle),
            Factor::Correctness => trial
                .corr
                .map(|corr| if corr { "correct" } else { "incorrect" }.to_string()),
            Factor::StrategyResponse => trial.strategy_response.map(|v| v.to_string()),
            Factor::VividResponse => trial.vivid_response.map(|v| v.to_string()),
        }
    }
}

/// Angles are whole degrees in the design; keep "60", not "60.0".
fn format_angle(angle: f64) -> String {
    if angle.fract() == 0.0 {
        format!("{}", angle as i64)
    } else {
        format!("{angle}")
    }
}

/// Reject factor selections that name the same factor twice. Surfaced as
/// a user-visible configuration message, not a crash.
pub fn validate_factors(factors: &[Factor]) -> Result<()> {
    for (i, factor) in factors.iter().enumerate() {
        if factors[..i].contains(factor) {
            bail!("factor '{}' selected more than once", factor.as_str());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_duplicate_factors() {
        let err =
            validate_factors(&[Factor::Wm, Factor::Angle, Factor::Wm]).unwrap_err();
        assert!(err.to_string().contains("'wm'"));
        assert!(validate_factors(&[Factor::Wm, Factor::Angle]).is_ok());
    }

    #[test]
    fn formats_whole_degree_angles_without_fraction() {
        assert_eq!(format_angle(120.0), "120");
        assert_eq!(format_angle(22.5), "22.5");
    }
}
