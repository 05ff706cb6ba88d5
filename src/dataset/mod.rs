//! Multi-file dataset assembly.
//!
//! Each file is normalized independently; one bad file never takes down
//! the run, and zero usable files is its own error. The core never reads
//! the filesystem; whatever extracted the upload hands in named byte
//! streams.

use anyhow::{bail, Result};
use rayon::prelude::*;
use serde::Serialize;

use crate::models::{ParticipantTable, Trial, VviqScore};
use crate::normalize::{normalize_participant, normalize_vviq};
use crate::parsing::Sheet;

/// A named CSV payload from the extraction collaborator.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub contents: Vec<u8>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
        }
    }

    fn is_csv(&self) -> bool {
        self.name.to_ascii_lowercase().ends_with(".csv")
    }
}

/// A normalization failure tied to the file it came from.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FileFailure {
    pub file: String,
    pub error: String,
}

/// All participants' normalized trials, concatenated in input-file order.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrialDataset {
    pub trials: Vec<Trial>,
    /// Participants that parsed successfully, sorted.
    pub participants: Vec<String>,
    pub failures: Vec<FileFailure>,
}

impl TrialDataset {
    /// Drop the named participants, e.g. pilot runs or known-bad sessions.
    pub fn exclude_participants<S: AsRef<str>>(mut self, excluded: &[S]) -> TrialDataset {
        let excluded: Vec<&str> = excluded.iter().map(|s| s.as_ref()).collect();
        self.trials
            .retain(|trial| !excluded.contains(&trial.participant.as_str()));
        self.participants
            .retain(|participant| !excluded.contains(&participant.as_str()));
        self
    }
}

/// Normalize every CSV in the collection, tolerating per-file failures.
pub fn build_trial_dataset(files: &[SourceFile]) -> Result<TrialDataset> {
    let csv_files: Vec<&SourceFile> = files.iter().filter(|file| file.is_csv()).collect();
    if csv_files.is_empty() {
        bail!("no CSV files in the input collection");
    }

    // Per-file normalization is pure, so fan out and collect in input
    // order; the shared table only exists after every per-file result is
    // in.
    let results: Vec<(&str, Result<ParticipantTable>)> = csv_files
        .par_iter()
        .map(|file| (file.name.as_str(), normalize_file(file)))
        .collect();

    let mut trials = Vec::new();
    let mut participants = Vec::new();
    let mut failures = Vec::new();
    for (name, result) in results {
        match result {
            Ok(table) => {
                log::debug!("parsed {} trials from {name}", table.trials.len());
                participants.push(table.participant);
                trials.extend(table.trials);
            }
            Err(err) => failures.push(FileFailure {
                file: name.to_string(),
                error: format!("{err:#}"),
            }),
        }
    }

    if participants.is_empty() {
        let detail: Vec<String> = failures
            .iter()
            .map(|f| format!("{}: {}", f.file, f.error))
            .collect();
        bail!("no input file parsed successfully:\n{}", detail.join("\n"));
    }

    participants.sort();
    Ok(TrialDataset {
        trials,
        participants,
        failures,
    })
}

fn normalize_file(file: &SourceFile) -> Result<ParticipantTable> {
    let sheet = Sheet::from_reader(file.contents.as_slice())?;
    normalize_participant(&sheet)
}

/// Questionnaire scores plus their per-file failures.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VviqTable {
    /// One score per participant, sorted by participant.
    pub scores: Vec<VviqScore>,
    pub failures: Vec<FileFailure>,
}

impl VviqTable {
    pub fn score_for(&self, participant: &str) -> Option<f64> {
        self.scores
            .iter()
            .find(|score| score.participant == participant)
            .map(|score| score.vviq_score)
    }
}

/// Normalize every questionnaire CSV, tolerating per-file failures.
pub fn build_vviq_table(files: &[SourceFile]) -> Result<VviqTable> {
    let csv_files: Vec<&SourceFile> = files.iter().filter(|file| file.is_csv()).collect();
    if csv_files.is_empty() {
        bail!("no CSV files in the questionnaire collection");
    }

    let results: Vec<(&str, Result<VviqScore>)> = csv_files
        .par_iter()
        .map(|file| (file.name.as_str(), normalize_vviq_file(file)))
        .collect();

    let mut scores = Vec::new();
    let mut failures = Vec::new();
    for (name, result) in results {
        match result {
            Ok(score) => scores.push(score),
            Err(err) => failures.push(FileFailure {
                file: name.to_string(),
                error: format!("{err:#}"),
            }),
        }
    }

    if scores.is_empty() {
        let detail: Vec<String> = failures
            .iter()
            .map(|f| format!("{}: {}", f.file, f.error))
            .collect();
        bail!(
            "no questionnaire file parsed successfully:\n{}",
            detail.join("\n")
        );
    }

    scores.sort_by(|a, b| a.participant.cmp(&b.participant));
    Ok(VviqTable { scores, failures })
}

fn normalize_vviq_file(file: &SourceFile) -> Result<VviqScore> {
    let sheet = Sheet::from_reader(file.contents.as_slice())?;
    normalize_vviq(&sheet)
}

/// Participants with trials but no questionnaire score. Reported to the
/// experimenter, never fatal.
pub fn participants_missing_vviq(dataset: &TrialDataset, vviq: &VviqTable) -> Vec<String> {
    dataset
        .participants
        .iter()
        .filter(|participant| vviq.score_for(participant).is_none())
        .cloned()
        .collect()
}
