//! Analysis core for mental-rotation experiment logs.
//!
//! Raw per-participant CSV logs go in; one normalized trial table plus
//! derived summary tables come out. The interactive presentation layer,
//! archive extraction and the statistical test routines themselves live
//! outside this crate and consume its output.

pub mod aggregate;
pub mod dataset;
pub mod models;
pub mod normalize;
pub mod parsing;

pub use aggregate::{
    cell_means, participant_means, running_averages, summarize, validate_factors, vviq_pairs,
    CellMean, Factor, GroupSummary, Measure, RunningPoint, SummaryOptions, VviqPair,
};
pub use dataset::{
    build_trial_dataset, build_vviq_table, participants_missing_vviq, FileFailure, SourceFile,
    TrialDataset, VviqTable,
};
pub use models::{
    score_correctness, Block, Dimension, ParticipantTable, RotationType, StrategyReport, Trial,
    VviqScore,
};
pub use normalize::{normalize_participant, normalize_vviq, REQUIRED_COLUMNS};
pub use parsing::{decode_answer, decode_keypress_sequence, Sheet};
