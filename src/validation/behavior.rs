//! PyControl behavioral data.
//!
//! The session root holds two motion-sensor `.pca` files and one `.txt`
//! event log, all named after the session. The task script that ran the
//! session lives in `run_task-task_files/`.

use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::{debug, info, instrument};

use crate::error::{ValidationError, ValidationResult};

use super::advisory::{Advisories, AdvisoryKind, ValidatedFiles};
use super::entries::{file_name, list_children, Partition};
use super::session_path::validate_session_path;

/// Folder holding the `.py` file that ran the task.
pub const TASK_FOLDER_NAME: &str = "run_task-task_files";

/// Naming policy for one behavioral file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilePattern {
    pub extension: &'static str,
    /// Pattern the end of the filename must match.
    pub ending: &'static str,
    pub expected_count: usize,
}

/// Expected PyControl files in the session root.
pub const PYCONTROL_FILE_PATTERNS: &[FilePattern] = &[
    FilePattern {
        extension: ".pca",
        ending: r"_MotSen\d-(X|Y)\.pca",
        expected_count: 2,
    },
    FilePattern {
        extension: ".txt",
        ending: r"\.txt",
        expected_count: 1,
    },
];

/// A [`FilePattern`] compiled against a concrete session name.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    pub pattern: FilePattern,
    pub regex: Regex,
}

impl CompiledPattern {
    /// Builds `^{session}.*{ending}` for the given session name.
    pub fn compile(pattern: FilePattern, session_name: &str) -> ValidationResult<Self> {
        let source = format!(r"^{}.*{}", regex::escape(session_name), pattern.ending);
        let regex = Regex::new(&source)
            .map_err(|e| ValidationError::format_mismatch(session_name, e.to_string()))?;
        Ok(Self { pattern, regex })
    }

    pub fn is_match(&self, filename: &str) -> bool {
        self.regex.is_match(filename)
    }

    /// Whether `filename` is one this pattern is responsible for.
    pub fn applies_to(&self, filename: &str) -> bool {
        filename.ends_with(self.pattern.extension)
    }
}

/// Validator for the behavioral files of a session.
#[derive(Debug, Clone)]
pub struct BehaviorValidator {
    whitelisted_files_in_root: Vec<String>,
    warn_if_no_task_folder: bool,
}

impl BehaviorValidator {
    pub fn new<I, S>(whitelisted_files_in_root: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            whitelisted_files_in_root: whitelisted_files_in_root
                .into_iter()
                .map(Into::into)
                .collect(),
            warn_if_no_task_folder: true,
        }
    }

    /// Set whether a missing task folder is reported as an advisory.
    pub fn with_warn_if_no_task_folder(mut self, warn: bool) -> Self {
        self.warn_if_no_task_folder = warn;
        self
    }

    fn is_whitelisted(&self, path: &Path) -> bool {
        let name = file_name(path);
        self.whitelisted_files_in_root.iter().any(|w| *w == name)
    }

    /// Validate the behavioral data of a raw session.
    ///
    /// Returns the PyControl files in the root followed by the task script.
    #[instrument(skip(self), fields(session = %session_path.display()))]
    pub fn validate(&self, session_path: &Path, subject: &str) -> ValidationResult<ValidatedFiles> {
        let session = validate_session_path(session_path, subject)?;
        let mut advisories = Advisories::new();

        let root_entries = list_children(session.path())?;
        let root = Partition::of(root_entries, |p| self.is_whitelisted(p));
        if !root.exempt.is_empty() {
            debug!("Skipping {} whitelisted files in root", root.exempt.len());
        }

        let mut files = Vec::new();
        for pattern in PYCONTROL_FILE_PATTERNS {
            let compiled = CompiledPattern::compile(*pattern, session.name())?;
            files.extend(match_extension(&compiled, &root.remaining, session.path())?);
        }

        let task_folder = session.join(TASK_FOLDER_NAME);
        if task_folder.exists() {
            files.push(find_task_file(&task_folder)?);
        } else if self.warn_if_no_task_folder {
            advisories.push(
                AdvisoryKind::MissingTaskFolder,
                session.path(),
                format!("No PyControl task folder found in {}", session.path().display()),
            );
        }

        info!("Validated {} behavioral files", files.len());
        Ok(ValidatedFiles::new(files, advisories))
    }
}

/// Matches the candidates carrying `compiled`'s extension against its pattern.
///
/// Every candidate with the extension must match, and the number of matches
/// must equal the expected count.
fn match_extension(
    compiled: &CompiledPattern,
    candidates: &[PathBuf],
    session_path: &Path,
) -> ValidationResult<Vec<PathBuf>> {
    let mut matched = Vec::new();
    for path in candidates {
        let name = file_name(path);
        if !compiled.applies_to(&name) {
            continue;
        }
        if !compiled.is_match(&name) {
            return Err(ValidationError::format_mismatch(
                name,
                format!(
                    "does not match the PyControl {} pattern and is not whitelisted",
                    compiled.pattern.extension
                ),
            ));
        }
        matched.push(path.clone());
    }

    if matched.len() != compiled.pattern.expected_count {
        return Err(ValidationError::count_mismatch(
            format!("{} files", compiled.pattern.extension),
            compiled.pattern.expected_count,
            matched.len(),
            session_path,
        ));
    }

    Ok(matched)
}

/// Returns the single `.py` file in the task folder.
fn find_task_file(task_folder: &Path) -> ValidationResult<PathBuf> {
    let mut scripts: Vec<PathBuf> = list_children(task_folder)?
        .into_iter()
        .filter(|p| file_name(p).ends_with(".py"))
        .collect();

    match scripts.len() {
        0 => Err(ValidationError::not_found(".py file in task folder", task_folder)),
        1 => Ok(scripts.remove(0)),
        n => Err(ValidationError::count_mismatch(".py files", 1, n, task_folder)),
    }
}
