//! File-output mode: the run's records as one JSON artifact.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io;
use std::path::Path;

use crate::extractor::TranscriptRecord;

#[derive(Debug, Serialize)]
struct Artifact<'a> {
    scraped_at: DateTime<Utc>,
    count: usize,
    transcripts: &'a [TranscriptRecord],
}

pub fn to_json(records: &[TranscriptRecord], scraped_at: DateTime<Utc>) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&Artifact {
        scraped_at,
        count: records.len(),
        transcripts: records,
    })
}

pub fn write_json(
    path: &Path,
    records: &[TranscriptRecord],
    scraped_at: DateTime<Utc>,
) -> io::Result<()> {
    let json = to_json(records, scraped_at)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    std::fs::write(path, json)
}
