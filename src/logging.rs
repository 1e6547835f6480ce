use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

const LOG_DIR: &str = ".tubedit";
const LOG_FILE: &str = "change_log.jsonl";
const MAX_ENTRIES: usize = 500;

#[derive(Debug, Serialize, Deserialize)]
pub struct ChangeLogEntry {
    pub timestamp: String,
    pub command: String,
    pub video_id: String,
    pub action: String,
    pub detail: String,
}

pub fn record_change(command: &str, video_id: &str, action: &str, detail: &str) -> Result<()> {
    let log_path = ensure_log_file(Path::new(LOG_DIR))?;
    append_entry(&log_path, command, video_id, action, detail)
}

pub fn read_recent(tail: usize) -> Result<Vec<ChangeLogEntry>> {
    read_recent_at(&Path::new(LOG_DIR).join(LOG_FILE), tail)
}

fn ensure_log_file(dir: &Path) -> Result<PathBuf> {
    if !dir.exists() {
        fs::create_dir_all(dir).with_context(|| format!("creating {dir:?}"))?;
    }
    Ok(dir.join(LOG_FILE))
}

fn append_entry(
    log_path: &Path,
    command: &str,
    video_id: &str,
    action: &str,
    detail: &str,
) -> Result<()> {
    let timestamp = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "unknown".into());
    let entry = ChangeLogEntry {
        timestamp,
        command: command.to_string(),
        video_id: video_id.to_string(),
        action: action.to_string(),
        detail: detail.to_string(),
    };
    let json = serde_json::to_string(&entry)?;
    let mut file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(log_path)
        .with_context(|| format!("opening {log_path:?}"))?;
    writeln!(file, "{json}")?;
    truncate_log(log_path)?;
    Ok(())
}

fn read_recent_at(log_path: &Path, tail: usize) -> Result<Vec<ChangeLogEntry>> {
    if !log_path.exists() {
        return Ok(Vec::new());
    }
    let file = OpenOptions::new()
        .read(true)
        .open(log_path)
        .with_context(|| format!("reading {log_path:?}"))?;
    let reader = BufReader::new(file);
    let mut entries = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let entry: ChangeLogEntry = serde_json::from_str(&line)
            .with_context(|| format!("parsing change log line in {log_path:?}"))?;
        entries.push(entry);
    }
    if entries.len() > tail {
        entries.drain(..entries.len() - tail);
    }
    Ok(entries)
}

fn truncate_log(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .read(true)
        .open(path)
        .with_context(|| format!("reading {path:?}"))?;
    let reader = BufReader::new(file);
    let lines: Vec<_> = reader.lines().collect::<Result<_, _>>()?;
    if lines.len() <= MAX_ENTRIES {
        return Ok(());
    }
    let keep = &lines[lines.len() - MAX_ENTRIES..];
    fs::write(path, keep.join("\n") + "\n")?;
    Ok(())
}
