//! sessioncheck: naming-convention validation for raw session directories.
//!
//! A raw session holds PyControl behavioral files, SpikeGLX recordings and
//! camera videos. This library checks that the directory tree follows the
//! expected layout before it is uploaded, and returns the files it found.
//!
//! ```no_run
//! use std::path::Path;
//! use sessioncheck::{SessionValidator, ValidatorConfig};
//!
//! let validator = SessionValidator::new(ValidatorConfig::default());
//! let files = validator.validate(Path::new("/data/raw/M016/M016_2023_08_15_16_00"), "M016")?;
//! println!("{} ephys files", files.ephys.len());
//! # Ok::<(), sessioncheck::ValidationError>(())
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod validation;

pub use config::ValidatorConfig;
pub use error::{ConfigError, ValidationError, ValidationErrorKind, ValidationResult};
pub use validation::{
    validate_raw_session, validate_session_path, Advisory, AdvisoryKind, SessionFiles,
    SessionValidator,
};
