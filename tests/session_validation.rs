//! End-to-end validation of complete session trees.
//!
//! Each test builds a session on disk with all three data streams and then
//! breaks one convention.

use std::fs;
use std::path::{Path, PathBuf};

use sessioncheck::validation::{
    validate_subject_dir, video_folder_name, AdvisoryKind, SessionOutcome, TASK_FOLDER_NAME,
    VIDEO_METADATA_FILENAME,
};
use sessioncheck::{
    validate_raw_session, SessionValidator, ValidationError, ValidationErrorKind, ValidatorConfig,
};
use tempfile::TempDir;

const SUBJECT: &str = "M016";
const SESSION: &str = "M016_2023_08_15_16_00";

fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent dir");
    }
    fs::write(path, b"data").expect("Failed to write file");
}

/// Builds a complete, valid session under `root`.
fn build_session(root: &Path, name: &str) -> PathBuf {
    let session = root.join(name);

    touch(&session.join(format!("{name}-2023-08-15-160000_MotSen1-X.pca")));
    touch(&session.join(format!("{name}-2023-08-15-160000_MotSen1-Y.pca")));
    touch(&session.join(format!("{name}-2023-08-15-160000.txt")));
    touch(&session.join(TASK_FOLDER_NAME).join("reaching_task.py"));
    touch(&session.join("comment.txt"));

    let recording = format!("{name}_g0");
    for imec in ["imec0", "imec1"] {
        let probe = session.join(&recording).join(format!("{recording}_{imec}"));
        for ending in [".lf.meta", ".lf.bin", ".ap.meta", ".ap.bin"] {
            touch(&probe.join(format!("{recording}_t0.{imec}{ending}")));
        }
    }
    touch(&session.join(&recording).join("channel_map.txt"));

    let cameras = session.join(video_folder_name(name));
    touch(&cameras.join(format!("{name}_camera_1.avi")));
    touch(&cameras.join(format!("{name}_camera_2.avi")));
    touch(&cameras.join(VIDEO_METADATA_FILENAME));

    session
}

#[test]
fn test_complete_session_is_valid() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let session = build_session(temp_dir.path(), SESSION);

    let files = SessionValidator::default()
        .validate(&session, SUBJECT)
        .expect("complete session should be valid");

    assert_eq!(files.behavior.len(), 4);
    assert_eq!(files.ephys.len(), 9);
    assert_eq!(files.video.len(), 3);
    assert!(files.advisories.is_empty(), "{:?}", files.advisories);
}

#[test]
fn test_validation_is_idempotent() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let session = build_session(temp_dir.path(), SESSION);
    let validator = SessionValidator::default();

    let first = validator.validate(&session, SUBJECT).expect("first run");
    let second = validator.validate(&session, SUBJECT).expect("second run");
    assert_eq!(first, second);

    touch(&session.join("stray.avi"));
    let first = validator.validate(&session, SUBJECT).expect_err("first run");
    let second = validator.validate(&session, SUBJECT).expect_err("second run");
    assert_eq!(first.to_string(), second.to_string());
}

#[test]
fn test_non_padded_date_fails_every_stream() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let session = build_session(temp_dir.path(), "M016_2023_8_15_16_00");

    let err = SessionValidator::default()
        .validate(&session, SUBJECT)
        .expect_err("should fail");
    assert_eq!(err.kind(), ValidationErrorKind::FormatMismatch);
}

#[test]
fn test_misplaced_avi_without_camera_folder() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let session = build_session(temp_dir.path(), SESSION);
    fs::remove_dir_all(session.join(video_folder_name(SESSION))).expect("remove cameras");
    touch(&session.join(format!("{SESSION}_camera_1.avi")));

    let err = SessionValidator::default()
        .validate(&session, SUBJECT)
        .expect_err("should fail");
    assert!(matches!(err, ValidationError::UnexpectedFile { .. }), "{err:?}");
}

#[test]
fn test_missing_optional_folders_are_advisories() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let session = build_session(temp_dir.path(), SESSION);
    fs::remove_dir_all(session.join(video_folder_name(SESSION))).expect("remove cameras");
    fs::remove_dir_all(session.join(TASK_FOLDER_NAME)).expect("remove task folder");

    let files = SessionValidator::default()
        .validate(&session, SUBJECT)
        .expect("should be valid");

    let kinds: Vec<AdvisoryKind> = files.advisories.iter().map(|a| a.kind).collect();
    assert_eq!(
        kinds,
        vec![AdvisoryKind::MissingTaskFolder, AdvisoryKind::MissingVideoFolder]
    );
    assert!(files.video.is_empty());
    assert_eq!(files.behavior.len(), 3);
}

#[test]
fn test_probe_file_set_must_be_exact() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let session = build_session(temp_dir.path(), SESSION);
    let probe = session
        .join(format!("{SESSION}_g0"))
        .join(format!("{SESSION}_g0_imec1"));
    touch(&probe.join(format!("{SESSION}_g0_t0.imec1.sync.bin")));

    let err = SessionValidator::default()
        .validate(&session, SUBJECT)
        .expect_err("should fail");
    assert_eq!(err.kind(), ValidationErrorKind::StructureMismatch);
}

#[test]
fn test_disabled_stream_ignores_its_violations() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let session = build_session(temp_dir.path(), SESSION);
    touch(&session.join("stray.avi"));

    let config = ValidatorConfig::default().with_videos(false);
    let files = validate_raw_session(&session, SUBJECT, &config).expect("should be valid");
    assert!(files.video.is_empty());
    assert_eq!(files.ephys.len(), 9);
}

#[test]
fn test_subject_directory_batch() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let subject_dir = temp_dir.path().join(SUBJECT);
    build_session(&subject_dir, "M016_2023_08_15_16_00");
    let broken = build_session(&subject_dir, "M016_2023_08_16_10_30");
    fs::remove_file(broken.join("M016_2023_08_16_10_30-2023-08-15-160000_MotSen1-Y.pca"))
        .expect("remove pca");

    let reports = validate_subject_dir(&subject_dir, SUBJECT, &SessionValidator::default())
        .expect("batch should run");

    assert_eq!(reports.len(), 2);
    assert!(reports[0].passed());
    match &reports[1].outcome {
        SessionOutcome::Failed { kind, message } => {
            assert_eq!(*kind, ValidationErrorKind::CountMismatch);
            assert!(message.contains("Expected 2 .pca files"), "{message}");
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}
