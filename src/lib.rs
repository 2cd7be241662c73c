//! Shake recorder - vibration logging for a laundry machine.
//!
//! Records timestamped sensor samples to a removable storage medium, one log
//! file per session, so the end of a wash cycle can be found afterwards.
//! Storage and time are injected through [`StorageMedium`] and [`Clock`].

pub mod clock;
pub mod config;
pub mod recorder;
pub mod storage;
pub mod utils;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::RecorderConfig;
pub use recorder::{RecorderState, Sample, Session, SessionRecorder, SessionStart};
pub use storage::{FsMedium, MemoryMedium, SlotId, StorageMedium};
pub use utils::error::{RecorderError, RecorderResult};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the diagnostic sink: a fmt subscriber filtered by `RUST_LOG`.
///
/// Panics if a global subscriber is already installed.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shake_recorder=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting shake-recorder v{}", env!("CARGO_PKG_VERSION"));
}
