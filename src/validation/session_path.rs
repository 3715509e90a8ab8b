//! Session folder naming.
//!
//! A session folder is named `{subject}_{date}` where the date is written as
//! `%Y_%m_%d_%H_%M`, e.g. `M016_2023_08_15_16_00`. Every other validator
//! runs this check first.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::error::{ValidationError, ValidationResult};

/// Format of the date part of a session folder name.
pub const EXPECTED_DATE_FORMAT: &str = "%Y_%m_%d_%H_%M";

/// A session directory whose name has been validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionPath {
    path: PathBuf,
    name: String,
    subject: String,
    date: NaiveDateTime,
}

impl SessionPath {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The session folder name, `{subject}_{date}`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn date(&self) -> NaiveDateTime {
        self.date
    }

    pub fn parent(&self) -> Option<&Path> {
        self.path.parent()
    }

    pub fn join(&self, child: impl AsRef<Path>) -> PathBuf {
        self.path.join(child)
    }
}

/// Checks that `date_str` is a date in [`EXPECTED_DATE_FORMAT`], written canonically.
///
/// The string is parsed, formatted again and compared byte for byte, which
/// rejects values that parse but are not zero-padded (`2023_8_15_16_00`).
pub fn validate_date_format(date_str: &str) -> ValidationResult<NaiveDateTime> {
    let date = NaiveDateTime::parse_from_str(date_str, EXPECTED_DATE_FORMAT).map_err(|e| {
        ValidationError::format_mismatch(
            date_str,
            format!(
                "wrong date format, expected {} ({})",
                EXPECTED_DATE_FORMAT, e
            ),
        )
    })?;

    let canonical = date.format(EXPECTED_DATE_FORMAT).to_string();
    if canonical != date_str {
        return Err(ValidationError::format_mismatch(
            date_str,
            format!("wrong date format, expected {}", canonical),
        ));
    }

    Ok(date)
}

/// Validates that `session_path` exists and is named `{subject}_{date}`.
pub fn validate_session_path(session_path: &Path, subject: &str) -> ValidationResult<SessionPath> {
    if !session_path.exists() {
        return Err(ValidationError::not_found("Session folder", session_path));
    }

    let folder_name = session_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| {
            ValidationError::format_mismatch(
                session_path.display().to_string(),
                "session path has no folder name",
            )
        })?;

    let after_subject = folder_name.strip_prefix(subject).ok_or_else(|| {
        ValidationError::format_mismatch(
            &folder_name,
            format!("wrong prefix, folder name has to start with subject name '{}'", subject),
        )
    })?;

    let date_str = after_subject.strip_prefix('_').ok_or_else(|| {
        ValidationError::format_mismatch(
            &folder_name,
            format!("missing underscore after subject name '{}'", subject),
        )
    })?;

    let date = validate_date_format(date_str)?;

    Ok(SessionPath {
        path: session_path.to_path_buf(),
        name: folder_name,
        subject: subject.to_string(),
        date,
    })
}
