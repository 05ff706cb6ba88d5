//! Imagery-questionnaire normalization.

use anyhow::{bail, Result};

use crate::models::VviqScore;
use crate::parsing::Sheet;

/// Normalize one participant's questionnaire file into a single score: the
/// sum of that participant's item responses. A file mixing participant
/// identifiers is ambiguous and fails validation.
pub fn normalize_vviq(sheet: &Sheet) -> Result<VviqScore> {
    sheet.require_columns(&["participant", "vviq_response"])?;

    let mut participants: Vec<String> = Vec::new();
    let mut total = 0.0;
    for row in sheet.rows() {
        if let Some(id) = row.get("participant") {
            if !participants.iter().any(|seen| seen == id) {
                participants.push(id.to_string());
            }
        }
        if let Some(value) = row.parse_f64("vviq_response") {
            total += value;
        }
    }

    match participants.as_slice() {
        [] => bail!("questionnaire file names no participant"),
        [participant] => Ok(VviqScore {
            participant: participant.clone(),
            vviq_score: total,
        }),
        many => bail!("questionnaire file mixes {} participant ids", many.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(text: &str) -> Sheet {
        Sheet::from_reader(text.as_bytes()).unwrap()
    }

    #[test]
    fn sums_item_responses() {
        let score =
            normalize_vviq(&sheet("participant,vviq_response\n7,1\n7,2\n7,3\n7,4\n")).unwrap();
        assert_eq!(
            score,
            VviqScore {
                participant: "7".to_string(),
                vviq_score: 10.0,
            }
        );
    }

    #[test]
    fn skips_missing_items() {
        let score = normalize_vviq(&sheet("participant,vviq_response\n7,2\n7,None\n7,\n")).unwrap();
        assert_eq!(score.vviq_score, 2.0);
    }

    #[test]
    fn mixed_participants_are_ambiguous() {
        let err = normalize_vviq(&sheet("participant,vviq_response\n7,1\n8,2\n")).unwrap_err();
        assert!(err.to_string().contains("mixes"));
    }

    #[test]
    fn requires_a_participant() {
        assert!(normalize_vviq(&sheet("participant,vviq_response\n,1\n")).is_err());
    }
}
