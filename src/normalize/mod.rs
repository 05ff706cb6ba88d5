//! Per-participant table normalization: one raw log sheet in, one
//! normalized trial table out.

mod vviq;

pub use vviq::normalize_vviq;

use std::collections::HashMap;

use anyhow::{anyhow, bail, Context, Result};

use crate::models::{
    score_correctness, Block, Dimension, ParticipantTable, RotationType, StrategyReport, Trial,
};
use crate::parsing::{decode_answer, decode_keypress_sequence, has_answer_variant, Row, Sheet};

/// Columns every recognized log version must carry. The answer key/RT
/// variant columns are checked separately since their names drift across
/// versions.
pub const REQUIRED_COLUMNS: [&str; 19] = [
    "dimension",
    "rot_type",
    "angle",
    "mirror",
    "wm",
    "pair_id",
    "obj_id",
    "orientation1",
    "orientation2",
    "image_path_1",
    "image_path_2",
    "marker_id",
    "correctAns",
    "participant",
    "condition_file",
    "key_resp_vivid_slider_control.keys",
    "key_resp_vivid_slider_control.rt",
    "key_resp_strat_control.keys",
    "key_resp_strat_control.rt",
];

const VIVID_KEYS: &str = "key_resp_vivid_slider_control.keys";
const VIVID_RT: &str = "key_resp_vivid_slider_control.rt";
const STRAT_KEYS: &str = "key_resp_strat_control.keys";
const STRAT_RT: &str = "key_resp_strat_control.rt";

/// Normalize one participant's raw log into a trial table.
pub fn normalize_participant(sheet: &Sheet) -> Result<ParticipantTable> {
    sheet.require_columns(&REQUIRED_COLUMNS)?;
    if !has_answer_variant(sheet) {
        bail!("no answer key column found (expected one of the key_resp variants)");
    }

    // Step 1: pull out the one-per-mini-block strategy summary rows, keyed
    // by the raw condition-file path.
    let reports = collect_strategy_reports(sheet)?;

    // Step 2: rows carrying a dimension are completed trials; everything
    // else is configuration/instruction bookkeeping and is dropped.
    let trial_rows: Vec<Row<'_>> = sheet
        .rows()
        .filter(|row| row.get("dimension").is_some())
        .collect();

    // Edge case: a log with no completed trials is unusable.
    if trial_rows.is_empty() {
        bail!("no trial rows found (every row is missing 'dimension')");
    }

    let participant = trial_rows[0]
        .get("participant")
        .ok_or_else(|| anyhow!("first trial row has no participant identifier"))?
        .to_string();

    // Step 3: re-index by position in the filtered sequence and decode
    // each row.
    let mut trials = Vec::with_capacity(trial_rows.len());
    for (idx, row) in trial_rows.iter().enumerate() {
        let trial = parse_trial_row(idx, row, &participant, &reports)
            .with_context(|| format!("trial row {idx}"))?;
        trials.push(trial);
    }

    Ok(ParticipantTable {
        participant,
        trials,
    })
}

/// The strategy-report stream is the single source of truth per
/// mini-block: duplicate keys with conflicting keypress strings fail the
/// file, identical duplicates collapse to one report.
fn collect_strategy_reports(sheet: &Sheet) -> Result<HashMap<String, StrategyReport>> {
    let mut reports: HashMap<String, StrategyReport> = HashMap::new();
    for row in sheet.rows() {
        let keys = match row.get(STRAT_KEYS) {
            Some(keys) => keys,
            None => continue,
        };
        let condition_file = match row.get("condition_file") {
            Some(value) => value.to_string(),
            None => {
                log::warn!("strategy report without a condition file, dropping it");
                continue;
            }
        };

        if let Some(existing) = reports.get(&condition_file) {
            if existing.keys != keys {
                bail!("conflicting strategy reports for mini-block key '{condition_file}'");
            }
            continue;
        }

        reports.insert(
            condition_file.clone(),
            StrategyReport {
                condition_file,
                keys: keys.to_string(),
                rt: row.parse_f64(STRAT_RT),
            },
        );
    }
    Ok(reports)
}

fn parse_trial_row(
    idx: usize,
    row: &Row<'_>,
    file_participant: &str,
    reports: &HashMap<String, StrategyReport>,
) -> Result<Trial> {
    let dimension = row.get("dimension").and_then(|raw| {
        let parsed = Dimension::parse(raw);
        if parsed.is_none() {
            log::warn!("unrecognized dimension '{raw}', leaving block unclassified");
        }
        parsed
    });
    let rot_type = row
        .get("rot_type")
        .map(RotationType::parse)
        .unwrap_or(RotationType::NotApplicable);
    let angle = row.parse_f64("angle");
    let mirror = row.parse_bool("mirror");
    let wm = row.parse_bool("wm");

    let (ans_key, rt) = decode_answer(row);
    let correct_ans = row.get("correctAns").map(str::to_string);
    let corr = score_correctness(ans_key.as_deref(), correct_ans.as_deref());
    let block = dimension.and_then(|d| Block::classify(d, rot_type, wm));

    let vivid_response = row.get(VIVID_KEYS).and_then(decode_keypress_sequence);
    let vivid_rt = row.parse_f64(VIVID_RT);

    // The join key must survive until here; the final schema only keeps
    // the mini-block name derived from it.
    let condition_file = row
        .get("condition_file")
        .ok_or_else(|| anyhow!("missing condition_file, cannot derive mini_block"))?;
    let mini_block = mini_block_from(condition_file)
        .ok_or_else(|| anyhow!("condition_file '{condition_file}' has no second path segment"))?;

    // Left join: every trial inherits its mini-block's single strategy
    // report, when one exists.
    let report = reports.get(condition_file);
    let strategy_response = report.and_then(|r| decode_keypress_sequence(&r.keys));
    let strategy_rt = report.and_then(|r| r.rt);

    let participant = row
        .get("participant")
        .unwrap_or(file_participant)
        .to_string();

    Ok(Trial {
        idx,
        participant,
        dimension,
        rot_type,
        angle,
        mirror,
        wm,
        pair_id: row.get_or_na("pair_id"),
        obj_id: row.get_or_na("obj_id"),
        orientation1: row.get_or_na("orientation1"),
        orientation2: row.get_or_na("orientation2"),
        image_path_1: row.get_or_na("image_path_1"),
        image_path_2: row.get_or_na("image_path_2"),
        marker_id: row.get_or_na("marker_id"),
        correct_ans,
        ans_key,
        rt,
        corr,
        block,
        vivid_response,
        vivid_rt,
        strategy_response,
        strategy_rt,
        mini_block,
    })
}

/// Second path segment of the condition-file key, extension stripped.
fn mini_block_from(condition_file: &str) -> Option<String> {
    let segment = condition_file.split('/').nth(1)?;
    let stem = segment.split('.').next().unwrap_or(segment);
    Some(stem.to_string())
}
