//! Camera recordings.
//!
//! Videos live in `{session}_cameras/` inside the session folder, named
//! `{session}_camera_*.avi`, next to a single `metadata.csv`.

use std::path::{Path, PathBuf};

use tracing::{info, instrument};

use crate::error::{ValidationError, ValidationResult};

use super::advisory::{Advisories, AdvisoryKind, ValidatedFiles};
use super::entries::{ensure_inside, file_name, files_under, find_recursive, list_children, Partition};
use super::session_path::validate_session_path;

pub const VIDEO_EXTENSION: &str = ".avi";
pub const VIDEO_METADATA_FILENAME: &str = "metadata.csv";

/// `{session}_cameras`
pub fn video_folder_name(session_name: &str) -> String {
    format!("{session_name}_cameras")
}

/// Validator for the camera recordings of a session.
#[derive(Debug, Clone)]
pub struct VideoValidator {
    warn_if_no_video_folder: bool,
}

impl Default for VideoValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoValidator {
    pub fn new() -> Self {
        Self {
            warn_if_no_video_folder: true,
        }
    }

    /// Set whether a missing video folder is reported as an advisory.
    pub fn with_warn_if_no_video_folder(mut self, warn: bool) -> Self {
        self.warn_if_no_video_folder = warn;
        self
    }

    /// Validate the videos of a raw session.
    ///
    /// Video files and `metadata.csv` anywhere outside the expected folder
    /// fail validation, also when that folder does not exist. Returns the
    /// files of the video folder, or nothing if there is none.
    #[instrument(skip(self), fields(session = %session_path.display()))]
    pub fn validate(&self, session_path: &Path, subject: &str) -> ValidationResult<ValidatedFiles> {
        let session = validate_session_path(session_path, subject)?;
        let mut advisories = Advisories::new();

        let video_folder = session.join(video_folder_name(session.name()));
        let folder_exists = video_folder.exists();

        if folder_exists {
            validate_video_folder(&video_folder, session.name())?;
        } else if self.warn_if_no_video_folder {
            advisories.push(
                AdvisoryKind::MissingVideoFolder,
                session.path(),
                format!(
                    "No correctly named video folder found in {}",
                    session.path().display()
                ),
            );
        }

        let expected_location = [video_folder.clone()];
        let videos = find_recursive(session.path(), |name| name.ends_with(VIDEO_EXTENSION))?;
        ensure_inside(
            &videos,
            &expected_location,
            &format!(
                "{VIDEO_EXTENSION} file in unexpected location, expected it in {}",
                video_folder.display()
            ),
        )?;
        let metadata = find_recursive(session.path(), |name| name == VIDEO_METADATA_FILENAME)?;
        ensure_inside(
            &metadata,
            &expected_location,
            &format!(
                "{VIDEO_METADATA_FILENAME} in unexpected location, expected it in {}",
                video_folder.display()
            ),
        )?;

        let files = if folder_exists {
            files_under(&video_folder)?
        } else {
            Vec::new()
        };

        info!("Validated {} video folder files", files.len());
        Ok(ValidatedFiles::new(files, advisories))
    }
}

/// Checks the contents of an existing video folder.
fn validate_video_folder(video_folder: &Path, session_name: &str) -> ValidationResult<()> {
    if !video_folder.is_dir() {
        return Err(ValidationError::structure_mismatch(
            video_folder,
            "video folder has to be a folder",
        ));
    }

    let entries = Partition::of(list_children(video_folder)?, |p| {
        file_name(p).ends_with(VIDEO_EXTENSION)
    });

    if entries.exempt.is_empty() {
        return Err(ValidationError::not_found(
            "Video files in video folder",
            video_folder,
        ));
    }

    let expected_start = format!("{session_name}_camera_");
    if let Some(video) = entries
        .exempt
        .iter()
        .find(|p| !file_name(p).starts_with(&expected_start))
    {
        return Err(ValidationError::format_mismatch(
            file_name(video),
            format!("video filename has to start with {expected_start}"),
        ));
    }

    let metadata_path: PathBuf = video_folder.join(VIDEO_METADATA_FILENAME);
    if !entries.remaining.contains(&metadata_path) {
        return Err(ValidationError::not_found(
            VIDEO_METADATA_FILENAME,
            metadata_path,
        ));
    }

    entries.require_each(|p| {
        if file_name(p) != VIDEO_METADATA_FILENAME {
            return Err(ValidationError::unexpected_file(
                p,
                "only videos and metadata.csv are allowed in the video folder",
            ));
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const SESSION: &str = "M016_2023_08_15_16_00";

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        fs::write(path, b"").expect("Failed to write file");
    }

    fn video_session() -> (TempDir, PathBuf, PathBuf) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let session = temp_dir.path().join(SESSION);
        let folder = session.join(video_folder_name(SESSION));
        touch(&folder.join(format!("{SESSION}_camera_1.avi")));
        touch(&folder.join(format!("{SESSION}_camera_2.avi")));
        touch(&folder.join(VIDEO_METADATA_FILENAME));
        (temp_dir, session, folder)
    }

    #[test]
    fn test_valid_video_folder() {
        let (_tmp, session, _folder) = video_session();
        let result = VideoValidator::new()
            .validate(&session, "M016")
            .expect("should be valid");
        assert_eq!(result.files.len(), 3);
        assert!(result.advisories.is_empty());
    }

    #[test]
    fn test_missing_video_folder_is_advisory() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let session = temp_dir.path().join(SESSION);
        fs::create_dir_all(&session).expect("mkdir");

        let result = VideoValidator::new()
            .validate(&session, "M016")
            .expect("should be valid");
        assert!(result.files.is_empty());
        assert!(result.has_advisory(AdvisoryKind::MissingVideoFolder));

        let quiet = VideoValidator::new()
            .with_warn_if_no_video_folder(false)
            .validate(&session, "M016")
            .expect("should be valid");
        assert!(quiet.advisories.is_empty());
    }

    #[test]
    fn test_empty_video_folder_fails() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let session = temp_dir.path().join(SESSION);
        touch(&session.join(video_folder_name(SESSION)).join(VIDEO_METADATA_FILENAME));

        let err = VideoValidator::new()
            .validate(&session, "M016")
            .expect_err("should fail");
        assert!(matches!(err, ValidationError::NotFound { .. }), "{err:?}");
    }

    #[test]
    fn test_badly_named_video_fails() {
        let (_tmp, session, folder) = video_session();
        touch(&folder.join("cam3.avi"));

        let err = VideoValidator::new()
            .validate(&session, "M016")
            .expect_err("should fail");
        assert!(matches!(err, ValidationError::FormatMismatch { .. }), "{err:?}");
    }

    #[test]
    fn test_missing_metadata_fails() {
        let (_tmp, session, folder) = video_session();
        fs::remove_file(folder.join(VIDEO_METADATA_FILENAME)).expect("remove");

        let err = VideoValidator::new()
            .validate(&session, "M016")
            .expect_err("should fail");
        assert!(matches!(err, ValidationError::NotFound { .. }), "{err:?}");
    }

    #[test]
    fn test_extra_file_in_video_folder_fails() {
        let (_tmp, session, folder) = video_session();
        touch(&folder.join("notes.txt"));

        let err = VideoValidator::new()
            .validate(&session, "M016")
            .expect_err("should fail");
        assert!(matches!(err, ValidationError::UnexpectedFile { .. }), "{err:?}");
    }

    #[test]
    fn test_misplaced_avi_without_video_folder_fails() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let session = temp_dir.path().join(SESSION);
        touch(&session.join(format!("{SESSION}_camera_1.avi")));

        let err = VideoValidator::new()
            .validate(&session, "M016")
            .expect_err("should fail");
        assert!(matches!(err, ValidationError::UnexpectedFile { .. }), "{err:?}");
    }

    #[test]
    fn test_misplaced_metadata_fails() {
        let (_tmp, session, _folder) = video_session();
        touch(&session.join("other").join(VIDEO_METADATA_FILENAME));

        let err = VideoValidator::new()
            .validate(&session, "M016")
            .expect_err("should fail");
        assert!(matches!(err, ValidationError::UnexpectedFile { .. }), "{err:?}");
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_video_is_returned() {
        let (tmp, session, folder) = video_session();
        let name = format!("{SESSION}_camera_3.avi");
        let target = tmp.path().join("transcoded").join(&name);
        touch(&target);
        std::os::unix::fs::symlink(&target, folder.join(&name)).expect("Failed to symlink");

        let result = VideoValidator::new()
            .validate(&session, "M016")
            .expect("should be valid");
        assert_eq!(result.files.len(), 4);
        assert!(result.files.contains(&folder.join(&name)));
    }
}
