use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::config::Settings;

const COMPANION_KEY_PREFIX: &str = "student_companion_name_";

#[derive(Debug, Error)]
pub enum PreferencesError {
    #[error("preferences io error: {0}")]
    Io(#[from] io::Error),
    #[error("preferences file is not valid json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Display names a student picked for the AI companion, one per account email.
/// Stored as a flat JSON object of string keys to string values.
#[derive(Debug, Clone)]
pub struct CompanionNames {
    path: PathBuf,
}

impl CompanionNames {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(&settings.preferences().path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, email: &str) -> Result<Option<String>, PreferencesError> {
        Ok(self.read()?.remove(&key_for(email)))
    }

    pub fn set(&self, email: &str, name: &str) -> Result<(), PreferencesError> {
        let mut entries = self.read()?;
        let name = name.trim();
        if name.is_empty() {
            entries.remove(&key_for(email));
        } else {
            entries.insert(key_for(email), name.to_string());
        }
        self.write(&entries)
    }

    pub fn clear(&self, email: &str) -> Result<(), PreferencesError> {
        let mut entries = self.read()?;
        if entries.remove(&key_for(email)).is_some() {
            self.write(&entries)?;
        }
        Ok(())
    }

    fn read(&self) -> Result<BTreeMap<String, String>, PreferencesError> {
        match fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn write(&self, entries: &BTreeMap<String, String>) -> Result<(), PreferencesError> {
        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_vec_pretty(entries)?)?;
        Ok(())
    }
}

fn key_for(email: &str) -> String {
    format!("{COMPANION_KEY_PREFIX}{}", email.trim().to_ascii_lowercase())
}
