//! SpikeGLX electrophysiology recordings.
//!
//! A session holds recording folders `{session}_g{N}`. Each recording holds
//! one folder per probe, `{recording}_imec{M}`, and each probe folder holds
//! exactly four files:
//!
//! ```text
//! M016_2023_08_15_16_00/
//! └── M016_2023_08_15_16_00_g0/
//!     ├── M016_2023_08_15_16_00_g0_imec0/
//!     │   ├── M016_2023_08_15_16_00_g0_t0.imec0.lf.meta
//!     │   ├── M016_2023_08_15_16_00_g0_t0.imec0.lf.bin
//!     │   ├── M016_2023_08_15_16_00_g0_t0.imec0.ap.meta
//!     │   └── M016_2023_08_15_16_00_g0_t0.imec0.ap.bin
//!     └── M016_2023_08_15_16_00_g0_imec1/
//!         └── ...
//! ```
//!
//! Kilosort output folders inside a probe folder are not accepted.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::error::{ValidationError, ValidationResult};

use super::advisory::{Advisories, AdvisoryKind, ValidatedFiles};
use super::entries::{
    ensure_inside, file_name, files_under, find_recursive, is_hidden, list_children, suffix,
    Partition,
};
use super::session_path::validate_session_path;

/// Endings of the files SpikeGLX writes per probe.
pub const SPIKEGLX_FILE_ENDINGS: [&str; 4] = [".lf.meta", ".lf.bin", ".ap.meta", ".ap.bin"];

fn gid_regex() -> &'static Regex {
    static GID: OnceLock<Regex> = OnceLock::new();
    GID.get_or_init(|| Regex::new(r"_g(\d)$").expect("Invalid regex for recording id"))
}

/// Extracts the recording id digit from a folder name.
///
/// `M016_2023_08_15_16_00_g1` -> `1`
pub fn extract_gid(folder_name: &str) -> ValidationResult<String> {
    gid_regex()
        .captures(folder_name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| {
            ValidationError::format_mismatch(
                folder_name,
                "could not extract recording id, expected a trailing '_g<digit>'",
            )
        })
}

/// Whether `name` matches the `*_g?` recording folder glob.
pub fn is_recording_folder_candidate(name: &str) -> bool {
    let mut rev = name.chars().rev();
    rev.next().is_some() && rev.next() == Some('g') && rev.next() == Some('_')
}

/// The four filenames a probe folder must contain.
pub fn expected_probe_filenames(recording_name: &str, imec: &str) -> BTreeSet<String> {
    SPIKEGLX_FILE_ENDINGS
        .iter()
        .map(|ending| format!("{recording_name}_t0.{imec}{ending}"))
        .collect()
}

/// A validated probe folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeFolder {
    pub path: PathBuf,
    /// `imec{N}`
    pub imec: String,
}

/// A validated recording folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordingFolder {
    pub path: PathBuf,
    pub gid: String,
    pub probes: Vec<ProbeFolder>,
}

/// Validator for the SpikeGLX recordings of a session.
#[derive(Debug, Clone)]
pub struct EphysValidator {
    allowed_extensions_not_in_root: Vec<String>,
}

impl EphysValidator {
    /// `allowed_extensions_not_in_root` lists extensions (with leading dot)
    /// that may sit loose in a recording folder, e.g. `.txt`.
    pub fn new<I, S>(allowed_extensions_not_in_root: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed_extensions_not_in_root: allowed_extensions_not_in_root
                .into_iter()
                .map(Into::into)
                .collect(),
        }
    }

    fn is_exempt_in_recording(&self, path: &Path) -> bool {
        let name = file_name(path);
        if is_hidden(&name) {
            return true;
        }
        suffix(&name).is_some_and(|ext| self.allowed_extensions_not_in_root.contains(&ext))
    }

    /// Validate electrophysiology data of a raw session.
    ///
    /// Returns every file in the recording folders.
    #[instrument(skip(self), fields(session = %session_path.display()))]
    pub fn validate(&self, session_path: &Path, subject: &str) -> ValidationResult<ValidatedFiles> {
        let session = validate_session_path(session_path, subject)?;
        let mut advisories = Advisories::new();

        let recording_paths: Vec<PathBuf> = list_children(session.path())?
            .into_iter()
            .filter(|p| is_recording_folder_candidate(&file_name(p)))
            .collect();

        if recording_paths.len() > 1 {
            advisories.push(
                AdvisoryKind::MultipleRecordings,
                session.path(),
                format!(
                    "More than one raw ephys recording found in {}",
                    session.path().display()
                ),
            );
        }

        for recording_path in &recording_paths {
            let recording = self.validate_recording(recording_path)?;
            debug!(
                "Recording g{} has {} probes",
                recording.gid,
                recording.probes.len()
            );
        }

        let spikeglx_files = find_recursive(session.path(), |name| {
            SPIKEGLX_FILE_ENDINGS.iter().any(|e| name.ends_with(e))
        })?;
        ensure_inside(
            &spikeglx_files,
            &recording_paths,
            "SpikeGLX file is not in any known recording folder",
        )?;

        let mut files = Vec::new();
        for recording_path in &recording_paths {
            files.extend(files_under(recording_path)?);
        }

        info!(
            "Validated {} recordings with {} files",
            recording_paths.len(),
            files.len()
        );
        Ok(ValidatedFiles::new(files, advisories))
    }

    /// Validate a single recording folder and its probe folders.
    pub fn validate_recording(&self, recording_path: &Path) -> ValidationResult<RecordingFolder> {
        let recording_name = file_name(recording_path);
        let gid = extract_gid(&recording_name)?;

        let session_name = recording_path
            .parent()
            .map(file_name)
            .unwrap_or_default();
        let expected_name = format!("{session_name}_g{gid}");
        if recording_name != expected_name {
            return Err(ValidationError::format_mismatch(
                recording_name,
                format!("recording folder has to be named {expected_name}"),
            ));
        }

        if !recording_path.is_dir() {
            return Err(ValidationError::structure_mismatch(
                recording_path,
                "recording has to be a folder",
            ));
        }

        let children = Partition::of(list_children(recording_path)?, |p| {
            self.is_exempt_in_recording(p)
        });

        let probe_pattern = Regex::new(&format!(r"^{}_imec\d$", regex::escape(&recording_name)))
            .map_err(|e| ValidationError::format_mismatch(&recording_name, e.to_string()))?;

        children.require_each(|child| {
            if !child.is_dir() {
                return Err(ValidationError::structure_mismatch(
                    child,
                    "only probe folders are allowed in a recording folder",
                ));
            }
            Ok(())
        })?;
        children.require_each(|child| {
            let name = file_name(child);
            if !probe_pattern.is_match(&name) {
                return Err(ValidationError::format_mismatch(
                    name,
                    format!("probe folder has to be named {recording_name}_imec<digit>"),
                ));
            }
            Ok(())
        })?;

        let probes = children
            .remaining
            .iter()
            .map(|probe_path| validate_probe(&recording_name, probe_path))
            .collect::<ValidationResult<Vec<_>>>()?;

        Ok(RecordingFolder {
            path: recording_path.to_path_buf(),
            gid,
            probes,
        })
    }
}

/// Checks that a probe folder holds exactly the four expected files.
fn validate_probe(recording_name: &str, probe_path: &Path) -> ValidationResult<ProbeFolder> {
    let probe_name = file_name(probe_path);
    let imec = probe_name
        .rsplit('_')
        .next()
        .unwrap_or_default()
        .to_string();

    let expected = expected_probe_filenames(recording_name, &imec);
    let found: BTreeSet<String> = list_children(probe_path)?
        .iter()
        .map(|p| file_name(p))
        .collect();

    if found != expected {
        let missing: Vec<&String> = expected.difference(&found).collect();
        let extra: Vec<&String> = found.difference(&expected).collect();
        return Err(ValidationError::structure_mismatch(
            probe_path,
            format!(
                "files in probe folder do not match the expected set (missing: {:?}, unexpected: {:?})",
                missing, extra
            ),
        ));
    }

    Ok(ProbeFolder {
        path: probe_path.to_path_buf(),
        imec,
    })
}
