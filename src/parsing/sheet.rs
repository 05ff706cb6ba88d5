//! Header-indexed access to one raw log CSV.
//!
//! Experiment-software versions disagree on which columns exist, so cells
//! are looked up by header name and an absent column reads the same as a
//! missing value. The log's missing-value sentinels (empty cell, literal
//! "None") are normalized to `None` here, before any field reaches the
//! decoders.

use std::collections::HashMap;
use std::io::Read;

use anyhow::{bail, Context, Result};
use csv::{ReaderBuilder, StringRecord};

pub struct Sheet {
    columns: HashMap<String, usize>,
    records: Vec<StringRecord>,
}

impl Sheet {
    pub fn from_reader(input: impl Read) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(input);

        let headers = reader.headers().context("reading CSV header row")?;
        let columns = headers
            .iter()
            .enumerate()
            .map(|(i, name)| (name.trim().to_string(), i))
            .collect();

        let mut records = Vec::new();
        for record in reader.records() {
            records.push(record.context("reading CSV row")?);
        }

        Ok(Self { columns, records })
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Validate that every required column exists, naming the first one
    /// that does not.
    pub fn require_columns(&self, names: &[&str]) -> Result<()> {
        for name in names {
            if !self.has_column(name) {
                bail!("required column '{name}' is missing");
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> + '_ {
        self.records.iter().map(|record| Row {
            columns: &self.columns,
            record,
        })
    }
}

/// One raw row of a sheet.
#[derive(Clone, Copy)]
pub struct Row<'a> {
    columns: &'a HashMap<String, usize>,
    record: &'a StringRecord,
}

impl<'a> Row<'a> {
    /// Cell value with missing-sentinel normalization applied.
    pub fn get(&self, column: &str) -> Option<&'a str> {
        let idx = *self.columns.get(column)?;
        let value = self.record.get(idx)?.trim();
        if value.is_empty() || value == "None" {
            None
        } else {
            Some(value)
        }
    }

    /// Cell as an owned string, with the "na" sentinel for absent stimulus
    /// identity fields.
    pub fn get_or_na(&self, column: &str) -> String {
        self.get(column).unwrap_or("na").to_string()
    }

    /// Numeric cell; unparseable values degrade to missing with a warning
    /// instead of failing the row.
    pub fn parse_f64(&self, column: &str) -> Option<f64> {
        let raw = self.get(column)?;
        match raw.parse::<f64>() {
            Ok(value) if value.is_finite() => Some(value),
            _ => {
                log::warn!("cell '{raw}' in column '{column}' is not numeric, treating as missing");
                None
            }
        }
    }

    /// Boolean cell; the logs write Python-style `True`/`False`.
    pub fn parse_bool(&self, column: &str) -> Option<bool> {
        let raw = self.get(column)?;
        match raw {
            "True" | "true" | "TRUE" | "1" => Some(true),
            "False" | "false" | "FALSE" | "0" => Some(false),
            _ => {
                log::warn!("cell '{raw}' in column '{column}' is not a boolean, treating as missing");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(text: &str) -> Sheet {
        Sheet::from_reader(text.as_bytes()).unwrap()
    }

    #[test]
    fn normalizes_missing_sentinels() {
        let sheet = sheet("a,b,c\nNone,, 1 \n");
        let row = sheet.rows().next().unwrap();
        assert_eq!(row.get("a"), None);
        assert_eq!(row.get("b"), None);
        assert_eq!(row.get("c"), Some("1"));
        // Absent column reads the same as a missing value.
        assert_eq!(row.get("d"), None);
    }

    #[test]
    fn unparseable_cells_degrade_to_missing() {
        let sheet = sheet("x,y\nabc,maybe\n");
        let row = sheet.rows().next().unwrap();
        assert_eq!(row.parse_f64("x"), None);
        assert_eq!(row.parse_bool("y"), None);
    }

    #[test]
    fn parses_typed_cells() {
        let sheet = sheet("angle,wm\n120.0,True\n");
        let row = sheet.rows().next().unwrap();
        assert_eq!(row.parse_f64("angle"), Some(120.0));
        assert_eq!(row.parse_bool("wm"), Some(true));
    }

    #[test]
    fn names_the_missing_required_column() {
        let sheet = sheet("a,b\n1,2\n");
        let err = sheet.require_columns(&["a", "wm"]).unwrap_err();
        assert!(err.to_string().contains("'wm'"));
    }
}
