//! CLI runner: normalizes a directory of trial logs and prints the
//! headline summaries. This binary is the extraction collaborator for the
//! library: it turns a directory listing into the named byte streams the
//! core consumes.

use std::env;
use std::fs;
use std::path::Path;
use std::process;

use anyhow::{bail, Context, Result};

use rotolab::{
    build_trial_dataset, build_vviq_table, participants_missing_vviq, summarize, Factor,
    GroupSummary, Measure, SourceFile, SummaryOptions,
};

fn main() {
    env_logger::init();

    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let mut args = env::args().skip(1);
    let data_dir = match args.next() {
        Some(dir) => dir,
        None => bail!("usage: rotolab <trial-csv-dir> [vviq-csv-dir]"),
    };
    let vviq_dir = args.next();

    let files = read_dir_sources(Path::new(&data_dir))?;
    let dataset = build_trial_dataset(&files)?;

    println!(
        "Parsed {} trials from {} participant(s): {}",
        dataset.trials.len(),
        dataset.participants.len(),
        dataset.participants.join(", ")
    );
    for failure in &dataset.failures {
        println!("> Error parsing {}: {}", failure.file, failure.error);
    }

    let options = SummaryOptions::default();
    print_summary(
        "Accuracy by block",
        &summarize(&dataset.trials, &[Factor::Block], Measure::Accuracy, &options)?,
    );
    print_summary(
        "Accuracy by condition",
        &summarize(&dataset.trials, &[Factor::Wm], Measure::Accuracy, &options)?,
    );
    print_summary(
        "Reaction time by block",
        &summarize(
            &dataset.trials,
            &[Factor::Block],
            Measure::ReactionTime,
            &options,
        )?,
    );
    print_summary(
        "Accuracy by angle",
        &summarize(&dataset.trials, &[Factor::Angle], Measure::Accuracy, &options)?,
    );

    if let Some(vviq_dir) = vviq_dir {
        let vviq_files = read_dir_sources(Path::new(&vviq_dir))?;
        let vviq = build_vviq_table(&vviq_files)?;
        println!("\nVVIQ scores:");
        for score in &vviq.scores {
            println!("  {:<10} {:>6.0}", score.participant, score.vviq_score);
        }
        for failure in &vviq.failures {
            println!("> Error parsing {}: {}", failure.file, failure.error);
        }
        let missing = participants_missing_vviq(&dataset, &vviq);
        if !missing.is_empty() {
            println!("Participants without VVIQ data: {}", missing.join(", "));
        }
    }

    Ok(())
}

fn read_dir_sources(dir: &Path) -> Result<Vec<SourceFile>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("listing {}", dir.display()))? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        let contents =
            fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
        files.push(SourceFile::new(name, contents));
    }
    // Directory order is not stable across platforms.
    files.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(files)
}

fn print_summary(title: &str, rows: &[GroupSummary]) {
    println!("\n{title}:");
    for row in rows {
        match row.sd {
            Some(sd) => println!(
                "  {:<12} mean={:.3} sd={:.3} n={}",
                row.levels.join("/"),
                row.mean,
                sd,
                row.n
            ),
            None => println!(
                "  {:<12} mean={:.3} n={}",
                row.levels.join("/"),
                row.mean,
                row.n
            ),
        }
    }
}
