// File: src/convert.rs
// Offline step: interchange export -> normalized events file
use crate::model::CalendarEvent;
use crate::model::adapter::HANDLED_KEYS;
use crate::model::parser::parse_events;
use crate::storage::EventFile;
use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("input file not found: {0}")]
    InputNotFound(PathBuf),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvertReport {
    /// VEVENT blocks found in the input.
    pub parsed: usize,
    /// Records written to the output.
    pub kept: usize,
    /// Records dropped for a missing or malformed start/end.
    pub removed: usize,
    /// Keys present in the input that no event field is built from.
    pub ignored_keys: BTreeSet<String>,
}

/// Converts export text into normalized events, all assigned to one calendar.
pub fn convert_text(
    input: &str,
    calendar_id: &str,
    calendar_name: &str,
) -> (Vec<CalendarEvent>, ConvertReport) {
    let raw_events = parse_events(input);
    let mut report = ConvertReport {
        parsed: raw_events.len(),
        ..ConvertReport::default()
    };

    let mut events = Vec::with_capacity(raw_events.len());
    for (index, raw) in raw_events.iter().enumerate() {
        report.ignored_keys.extend(
            raw.keys()
                .filter(|k| !HANDLED_KEYS.contains(&k.as_str()))
                .cloned(),
        );
        match CalendarEvent::from_raw(raw, index, calendar_id, calendar_name) {
            Some(event) => events.push(event),
            None => debug!("record {} dropped: no usable start/end", index),
        }
    }

    report.kept = events.len();
    report.removed = report.parsed - report.kept;
    (events, report)
}

/// Reads `input`, converts it and writes the result to `output`.
///
/// A missing input is reported as [`ConvertError::InputNotFound`]; malformed
/// content never fails, it only shrinks the output.
pub fn convert_file(
    input: &Path,
    output: &Path,
    calendar_id: &str,
    calendar_name: &str,
) -> Result<(Vec<CalendarEvent>, ConvertReport)> {
    if !input.exists() {
        return Err(ConvertError::InputNotFound(input.to_path_buf()).into());
    }
    let bytes = fs::read(input).with_context(|| format!("Failed to read {:?}", input))?;
    let text = String::from_utf8_lossy(&bytes);

    info!("converting {:?}", input);
    let (events, report) = convert_text(&text, calendar_id, calendar_name);
    EventFile::save(output, &events)?;
    info!(
        "wrote {} events to {:?} ({} parsed, {} removed)",
        report.kept, output, report.parsed, report.removed
    );
    Ok((events, report))
}
