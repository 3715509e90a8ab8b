//! Validation of raw session directories.
//!
//! Each data stream has its own validator; all of them first check the
//! session folder name with [`validate_session_path`]. [`SessionValidator`]
//! combines them.

pub mod advisory;
pub mod behavior;
pub mod entries;
pub mod ephys;
pub mod session;
pub mod session_path;
pub mod video;

pub use advisory::{Advisory, AdvisoryKind, ValidatedFiles};
pub use behavior::{BehaviorValidator, FilePattern, PYCONTROL_FILE_PATTERNS, TASK_FOLDER_NAME};
pub use ephys::{extract_gid, EphysValidator, ProbeFolder, RecordingFolder, SPIKEGLX_FILE_ENDINGS};
pub use session::{
    validate_raw_session, validate_subject_dir, SessionFiles, SessionOutcome, SessionReport,
    SessionValidator,
};
pub use session_path::{
    validate_date_format, validate_session_path, SessionPath, EXPECTED_DATE_FORMAT,
};
pub use video::{video_folder_name, VideoValidator, VIDEO_EXTENSION, VIDEO_METADATA_FILENAME};
