#![deny(warnings)]

//! Event table loading: YAML or JSON files validated before use, with
//! reload-on-change so an event's economy can be swapped without touching
//! engine code.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tasha_core::{validate_event, EventConfig, ValidationError};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("io error: {0}")]
    Io(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("unsupported table format: {0}")]
    UnsupportedFormat(String),
    #[error("invalid event table: {0}")]
    Invalid(#[from] ValidationError),
}

impl From<std::io::Error> for LoadError {
    fn from(e: std::io::Error) -> Self {
        LoadError::Io(e.to_string())
    }
}

impl From<serde_yaml::Error> for LoadError {
    fn from(e: serde_yaml::Error) -> Self {
        LoadError::Parse(e.to_string())
    }
}

impl From<serde_json::Error> for LoadError {
    fn from(e: serde_json::Error) -> Self {
        LoadError::Parse(e.to_string())
    }
}

/// Parse and validate a YAML event table.
pub fn parse_yaml(text: &str) -> Result<EventConfig, LoadError> {
    let event: EventConfig = serde_yaml::from_str(text)?;
    validate_event(&event)?;
    Ok(event)
}

/// Parse and validate a JSON event table.
pub fn parse_json(text: &str) -> Result<EventConfig, LoadError> {
    let event: EventConfig = serde_json::from_str(text)?;
    validate_event(&event)?;
    Ok(event)
}

/// Load an event table, choosing the format from the file extension.
pub fn load_event<P: AsRef<Path>>(path: P) -> Result<EventConfig, LoadError> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    let text = fs::read_to_string(path)?;
    let event = match ext.as_str() {
        "yaml" | "yml" => parse_yaml(&text)?,
        "json" => parse_json(&text)?,
        _ => return Err(LoadError::UnsupportedFormat(path.display().to_string())),
    };
    info!(
        path = %path.display(),
        name = %event.name,
        version = event.version,
        categories = event.categories.len(),
        "loaded event table"
    );
    Ok(event)
}

/// An event table bound to the file it came from.
#[derive(Debug, Clone)]
pub struct EventTableFile {
    path: PathBuf,
    mtime: SystemTime,
    event: EventConfig,
}

impl EventTableFile {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref().to_path_buf();
        let mtime = modified(&path)?;
        let event = load_event(&path)?;
        Ok(Self { path, mtime, event })
    }

    pub fn event(&self) -> &EventConfig {
        &self.event
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn into_event(self) -> EventConfig {
        self.event
    }

    /// Re-read the file if it changed since the last load. Returns whether the
    /// table was replaced; on error the previous table stays in place.
    pub fn reload_if_changed(&mut self) -> Result<bool, LoadError> {
        let mtime = modified(&self.path)?;
        if mtime <= self.mtime {
            return Ok(false);
        }
        let event = load_event(&self.path)?;
        info!(path = %self.path.display(), "reloaded event table");
        self.mtime = mtime;
        self.event = event;
        Ok(true)
    }
}

fn modified(path: &Path) -> Result<SystemTime, LoadError> {
    Ok(fs::metadata(path)?
        .modified()
        .unwrap_or(SystemTime::UNIX_EPOCH))
}
