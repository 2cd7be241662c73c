//! Recording system module
//!
//! This module implements the session recorder:
//! - SessionRecorder to mount the medium and append samples
//! - Session state and lifecycle tracking
//! - Log file naming and line format

pub mod naming;
pub mod sample;
pub mod session;
pub mod state;

pub use naming::{parse_session_suffix, session_file_name};
pub use sample::{ParseSampleError, Sample};
pub use session::SessionRecorder;
pub use state::{RecorderState, Session, SessionStart};
