//! Non-fatal advisories.
//!
//! Some layouts are unusual but survivable: a session without a task-code
//! folder, without a camera folder, or with several recordings. Validators
//! report these as [`Advisory`] values next to their result instead of
//! failing, and log them at `warn` level.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

/// The unusual-but-survivable conditions a validator can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvisoryKind {
    /// `run_task-task_files` is absent from the session root.
    MissingTaskFolder,
    /// `{session}_cameras` is absent from the session root.
    MissingVideoFolder,
    /// More than one `*_g?` recording folder was found.
    MultipleRecordings,
}

/// A non-fatal finding about a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advisory {
    pub kind: AdvisoryKind,
    /// Directory the advisory is about.
    pub path: PathBuf,
    pub message: String,
}

/// Collects advisories raised during one validation call.
#[derive(Debug, Default)]
pub struct Advisories {
    items: Vec<Advisory>,
}

impl Advisories {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an advisory and logs it.
    pub fn push(&mut self, kind: AdvisoryKind, path: &Path, message: impl Into<String>) {
        let message = message.into();
        warn!(kind = ?kind, path = %path.display(), "{}", message);
        self.items.push(Advisory {
            kind,
            path: path.to_path_buf(),
            message,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_vec(self) -> Vec<Advisory> {
        self.items
    }
}

/// Files accepted by a validator, with the advisories it raised.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedFiles {
    pub files: Vec<PathBuf>,
    pub advisories: Vec<Advisory>,
}

impl ValidatedFiles {
    pub fn new(files: Vec<PathBuf>, advisories: Advisories) -> Self {
        Self {
            files,
            advisories: advisories.into_vec(),
        }
    }

    /// Whether an advisory of the given kind was raised.
    pub fn has_advisory(&self, kind: AdvisoryKind) -> bool {
        self.advisories.iter().any(|a| a.kind == kind)
    }
}
