//! Derived summary tables over the normalized trials.
//!
//! Everything here reads the trial table and builds new tables for the
//! presentation/statistics layer; the normalized trials are never mutated.

mod factors;

pub use factors::{validate_factors, Factor};

use std::cmp::Ordering;
use std::collections::HashMap;

use anyhow::{bail, Result};
use serde::Serialize;

use crate::dataset::{TrialDataset, VviqTable};
use crate::models::{Block, Trial};

/// Dependent variables available for summary views.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Measure {
    Accuracy,
    ReactionTime,
    StrategyResponse,
    VividResponse,
}

impl Measure {
    pub fn as_str(&self) -> &'static str {
        match self {
            Measure::Accuracy => "accuracy",
            Measure::ReactionTime => "rt",
            Measure::StrategyResponse => "strategy_response",
            Measure::VividResponse => "vivid_response",
        }
    }

    /// The trial's value on this measure; trials without one drop out of
    /// the mean.
    fn value(&self, trial: &Trial, options: &SummaryOptions) -> Option<f64> {
        match self {
            Measure::Accuracy => trial.corr.map(|corr| if corr { 1.0 } else { 0.0 }),
            Measure::ReactionTime => {
                if options.correct_only_rt && trial.corr != Some(true) {
                    return None;
                }
                trial.rt
            }
            Measure::StrategyResponse => trial.strategy_response.map(f64::from),
            Measure::VividResponse => trial.vivid_response.map(f64::from),
        }
    }
}

/// Analysis-view options.
#[derive(Debug, Clone, Default)]
pub struct SummaryOptions {
    /// Restrict reaction-time means to correct trials.
    pub correct_only_rt: bool,
    /// Blocks excluded from the view (e.g. dropping 3Dd_wm).
    pub exclude_blocks: Vec<Block>,
}

/// One group's descriptive statistics.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GroupSummary {
    /// Level per grouping factor, in factor order.
    pub levels: Vec<String>,
    pub n: usize,
    pub mean: f64,
    /// Sample standard deviation; absent for singleton groups.
    pub sd: Option<f64>,
}

/// Group mean, sample SD and n of a measure for every combination of the
/// given factors. Group order is deterministic: numeric-aware ascending,
/// independent of trial order.
pub fn summarize(
    trials: &[Trial],
    factors: &[Factor],
    measure: Measure,
    options: &SummaryOptions,
) -> Result<Vec<GroupSummary>> {
    validate_factors(factors)?;

    let mut groups: HashMap<Vec<String>, Vec<f64>> = HashMap::new();
    for trial in trials {
        if excluded(trial, options) {
            continue;
        }
        let levels: Option<Vec<String>> =
            factors.iter().map(|factor| factor.level(trial)).collect();
        let (levels, value) = match (levels, measure.value(trial, options)) {
            (Some(levels), Some(value)) => (levels, value),
            _ => continue,
        };
        groups.entry(levels).or_default().push(value);
    }

    let mut summaries: Vec<GroupSummary> = groups
        .into_iter()
        .map(|(levels, values)| GroupSummary {
            n: values.len(),
            mean: mean(&values),
            sd: sample_sd(&values),
            levels,
        })
        .collect();
    summaries.sort_by(|a, b| compare_level_sets(&a.levels, &b.levels));
    Ok(summaries)
}

/// Two-way cell means for interaction views. Selecting the same factor for
/// both axes is a configuration error.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CellMean {
    pub level_a: String,
    pub level_b: String,
    pub n: usize,
    pub mean: f64,
}

pub fn cell_means(
    trials: &[Trial],
    factor_a: Factor,
    factor_b: Factor,
    measure: Measure,
    options: &SummaryOptions,
) -> Result<Vec<CellMean>> {
    if factor_a == factor_b {
        bail!("factor '{}' selected for both axes", factor_a.as_str());
    }

    let summaries = summarize(trials, &[factor_a, factor_b], measure, options)?;
    Ok(summaries
        .into_iter()
        .map(|summary| {
            let mut levels = summary.levels.into_iter();
            CellMean {
                level_a: levels.next().unwrap_or_default(),
                level_b: levels.next().unwrap_or_default(),
                n: summary.n,
                mean: summary.mean,
            }
        })
        .collect())
}

/// One participant's expanding mean at one trial position.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RunningPoint {
    pub participant: String,
    pub idx: usize,
    pub running_mean: f64,
}

/// Per-participant expanding means over trial order, the performance-
/// over-time view. Trials without a value carry the previous mean
/// forward; nothing is emitted before the first defined value.
pub fn running_averages(
    trials: &[Trial],
    measure: Measure,
    options: &SummaryOptions,
) -> Vec<RunningPoint> {
    let mut sums: HashMap<&str, (f64, usize)> = HashMap::new();
    let mut points = Vec::new();
    for trial in trials {
        if excluded(trial, options) {
            continue;
        }
        let entry = sums.entry(trial.participant.as_str()).or_insert((0.0, 0));
        if let Some(value) = measure.value(trial, options) {
            entry.0 += value;
            entry.1 += 1;
        }
        if entry.1 > 0 {
            points.push(RunningPoint {
                participant: trial.participant.clone(),
                idx: trial.idx,
                running_mean: entry.0 / entry.1 as f64,
            });
        }
    }
    points
}

/// One scalar per participant, for scatter and correlation views.
pub fn participant_means(
    trials: &[Trial],
    measure: Measure,
    options: &SummaryOptions,
) -> Result<Vec<GroupSummary>> {
    summarize(trials, &[Factor::Participant], measure, options)
}

/// A (questionnaire score, measure mean) pair for one participant.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VviqPair {
    pub participant: String,
    pub vviq_score: f64,
    pub mean: f64,
}

/// Per-participant pairs handed to the external correlation routine.
/// Participants without a questionnaire score drop out.
pub fn vviq_pairs(
    dataset: &TrialDataset,
    vviq: &VviqTable,
    measure: Measure,
    options: &SummaryOptions,
) -> Result<Vec<VviqPair>> {
    let means = participant_means(&dataset.trials, measure, options)?;
    Ok(means
        .into_iter()
        .filter_map(|summary| {
            let participant = summary.levels.first().cloned().unwrap_or_default();
            vviq.score_for(&participant).map(|score| VviqPair {
                participant,
                vviq_score: score,
                mean: summary.mean,
            })
        })
        .collect())
}

fn excluded(trial: &Trial, options: &SummaryOptions) -> bool {
    match trial.block {
        Some(block) => options.exclude_blocks.contains(&block),
        None => false,
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1).
fn sample_sd(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|value| (value - m).powi(2)).sum();
    Some((ss / (values.len() - 1) as f64).sqrt())
}

fn compare_level_sets(a: &[String], b: &[String]) -> Ordering {
    for (x, y) in a.iter().zip(b.iter()) {
        let ord = compare_levels(x, y);
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.len().cmp(&b.len())
}

/// Numeric-aware level ordering, so angles sort 0 < 60 < 120 < 180.
fn compare_levels(a: &str, b: &str) -> Ordering {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => a.cmp(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Dimension, RotationType};

    fn trial(
        participant: &str,
        idx: usize,
        block: Option<Block>,
        corr: Option<bool>,
        rt: Option<f64>,
        angle: f64,
    ) -> Trial {
        Trial {
            idx,
            participant: participant.to_string(),
            dimension: Some(Dimension::TwoD),
            rot_type: RotationType::NotApplicable,
            angle: Some(angle),
            mirror: Some(false),
            wm: Some(false),
            pair_id: "na".to_string(),
            obj_id: "na".to_string(),
            orientation1: "na".to_string(),
            orientation2: "na".to_string(),
            image_path_1: "na".to_string(),
            image_path_2: "na".to_string(),
            marker_id: "na".to_string(),
            correct_ans: Some("left".to_string()),
            ans_key: corr.map(|c| if c { "left" } else { "right" }.to_string()),
            rt,
            corr,
            block,
            vivid_response: None,
            vivid_rt: None,
            strategy_response: None,
            strategy_rt: None,
            mini_block: "mb1".to_string(),
        }
    }

    #[test]
    fn accuracy_means_skip_unscored_trials() {
        let trials = vec![
            trial("7", 0, Some(Block::TwoDSingle), Some(true), Some(1.0), 0.0),
            trial("7", 1, Some(Block::TwoDSingle), Some(false), Some(2.0), 0.0),
            trial("7", 2, Some(Block::TwoDSingle), None, None, 0.0),
        ];
        let summary = summarize(
            &trials,
            &[Factor::Block],
            Measure::Accuracy,
            &SummaryOptions::default(),
        )
        .unwrap();
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].n, 2);
        assert!((summary[0].mean - 0.5).abs() < 1e-12);
    }

    #[test]
    fn correct_only_rt_filter_drops_errors_and_unscored() {
        let trials = vec![
            trial("7", 0, Some(Block::TwoDSingle), Some(true), Some(1.0), 0.0),
            trial("7", 1, Some(Block::TwoDSingle), Some(false), Some(9.0), 0.0),
            trial("7", 2, Some(Block::TwoDSingle), None, Some(9.0), 0.0),
        ];
        let options = SummaryOptions {
            correct_only_rt: true,
            ..SummaryOptions::default()
        };
        let summary = summarize(&trials, &[Factor::Block], Measure::ReactionTime, &options).unwrap();
        assert_eq!(summary[0].n, 1);
        assert!((summary[0].mean - 1.0).abs() < 1e-12);
    }

    #[test]
    fn angle_levels_sort_numerically() {
        let trials = vec![
            trial("7", 0, Some(Block::TwoDSingle), Some(true), None, 120.0),
            trial("7", 1, Some(Block::TwoDSingle), Some(true), None, 60.0),
            trial("7", 2, Some(Block::TwoDSingle), Some(true), None, 0.0),
            trial("7", 3, Some(Block::TwoDSingle), Some(true), None, 180.0),
        ];
        let summary = summarize(
            &trials,
            &[Factor::Angle],
            Measure::Accuracy,
            &SummaryOptions::default(),
        )
        .unwrap();
        let levels: Vec<&str> = summary.iter().map(|s| s.levels[0].as_str()).collect();
        assert_eq!(levels, ["0", "60", "120", "180"]);
    }

    #[test]
    fn unclassifiable_blocks_drop_out_of_block_groupings_only() {
        let trials = vec![
            trial("7", 0, Some(Block::TwoDSingle), Some(true), None, 0.0),
            trial("7", 1, None, Some(false), None, 0.0),
        ];
        let by_block = summarize(
            &trials,
            &[Factor::Block],
            Measure::Accuracy,
            &SummaryOptions::default(),
        )
        .unwrap();
        assert_eq!(by_block[0].n, 1);

        let by_participant = summarize(
            &trials,
            &[Factor::Participant],
            Measure::Accuracy,
            &SummaryOptions::default(),
        )
        .unwrap();
        assert_eq!(by_participant[0].n, 2);
    }

    #[test]
    fn excluded_blocks_leave_the_view() {
        let trials = vec![
            trial("7", 0, Some(Block::TwoDSingle), Some(true), None, 0.0),
            trial("7", 1, Some(Block::TwoDWm), Some(true), None, 0.0),
        ];
        let options = SummaryOptions {
            exclude_blocks: vec![Block::TwoDWm],
            ..SummaryOptions::default()
        };
        let summary = summarize(&trials, &[Factor::Block], Measure::Accuracy, &options).unwrap();
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].levels, vec!["2D_single".to_string()]);
    }

    #[test]
    fn same_factor_twice_is_a_configuration_error() {
        let trials = vec![trial("7", 0, Some(Block::TwoDSingle), Some(true), None, 0.0)];
        assert!(cell_means(
            &trials,
            Factor::Wm,
            Factor::Wm,
            Measure::Accuracy,
            &SummaryOptions::default(),
        )
        .is_err());
        assert!(summarize(
            &trials,
            &[Factor::Wm, Factor::Wm],
            Measure::Accuracy,
            &SummaryOptions::default(),
        )
        .is_err());
    }

    #[test]
    fn running_average_is_prefix_mean_over_idx() {
        let trials = vec![
            trial("7", 0, Some(Block::TwoDSingle), Some(true), None, 0.0),
            trial("7", 1, Some(Block::TwoDSingle), Some(false), None, 0.0),
            trial("7", 2, Some(Block::TwoDSingle), None, None, 0.0),
            trial("7", 3, Some(Block::TwoDSingle), Some(true), None, 0.0),
        ];
        let points = running_averages(&trials, Measure::Accuracy, &SummaryOptions::default());
        let means: Vec<f64> = points.iter().map(|p| p.running_mean).collect();
        assert_eq!(points.len(), 4);
        assert!((means[0] - 1.0).abs() < 1e-12);
        assert!((means[1] - 0.5).abs() < 1e-12);
        // Unscored trial carries the mean forward.
        assert!((means[2] - 0.5).abs() < 1e-12);
        assert!((means[3] - 2.0 / 3.0).abs() < 1e-12);
    }
}
