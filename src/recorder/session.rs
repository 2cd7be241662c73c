//! Session recorder
//!
//! Mounts the storage medium, allocates a fresh log file per session and
//! appends timestamped samples to it, one open-append-close per sample.

use super::naming::{parse_session_suffix, session_file_name};
use super::sample::{parse_log, Sample};
use super::state::{RecorderState, Session, SessionStart};
use crate::clock::Clock;
use crate::config::RecorderConfig;
use crate::storage::{SlotId, StorageMedium};
use crate::utils::error::{RecorderError, RecorderResult};
use std::io::{self, Write};

/// Records samples of one session at a time to a storage medium
pub struct SessionRecorder<S, C> {
    /// Mounted medium
    medium: S,

    /// Time source for names, deadlines and timestamps
    clock: C,

    config: RecorderConfig,

    state: RecorderState,

    /// Active session, if any
    session: Option<Session>,

    /// Sessions started so far
    sessions_started: usize,
}

impl<S: StorageMedium, C: Clock> SessionRecorder<S, C> {
    /// Create a recorder with the default configuration
    pub fn new(medium: S, clock: C) -> Self {
        Self::with_config(medium, clock, RecorderConfig::default())
    }

    pub fn with_config(medium: S, clock: C, config: RecorderConfig) -> Self {
        Self {
            medium,
            clock,
            config,
            state: RecorderState::Uninitialized,
            session: None,
            sessions_started: 0,
        }
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn config(&self) -> &RecorderConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn medium(&self) -> &S {
        &self.medium
    }

    pub fn medium_mut(&mut self) -> &mut S {
        &mut self.medium
    }

    /// Mount the storage medium on `slot`. Single attempt.
    ///
    /// A failed mount drops the recorder back to `Uninitialized`, also when
    /// it was mounted before. The active session, if any, is kept and
    /// resumes once a later `initialize` succeeds.
    pub fn initialize(&mut self, slot: SlotId) -> RecorderResult<()> {
        tracing::info!("Initializing storage medium [slot = {}]", slot);

        if let Err(source) = self.medium.mount(slot) {
            self.state = RecorderState::Uninitialized;
            let err = RecorderError::MediumUnavailable { slot, source };
            tracing::error!(code = err.code(), "{}", err);
            return Err(err);
        }

        self.state = if self.session.is_some() {
            RecorderState::Recording
        } else {
            RecorderState::Initialized
        };
        tracing::info!("Medium initialized");
        Ok(())
    }

    /// Mount the medium on the configured slot
    pub fn initialize_from_config(&mut self) -> RecorderResult<()> {
        self.initialize(self.config.slot)
    }

    /// Start a new session lasting `duration_secs`.
    ///
    /// Picks a file name derived from the clock that does not exist yet on
    /// the medium. The file itself is created by the first `record`. An
    /// active session is superseded and its file left as is.
    pub fn start(&mut self, duration_secs: u32) -> RecorderResult<SessionStart> {
        if self.state == RecorderState::Uninitialized {
            return Err(RecorderError::NotInitialized);
        }

        tracing::info!("Starting recording for {} s", duration_secs);

        let (filename, now) = self.allocate_file_name()?;
        tracing::info!("Recording to {}", filename);

        let session = Session::new(self.sessions_started, filename, now, duration_secs);
        self.sessions_started += 1;

        let superseded = self.session.replace(session.clone());
        if let Some(previous) = &superseded {
            tracing::warn!(
                "Superseding session {} after {} records",
                previous.filename,
                previous.records_written
            );
        }
        self.state = RecorderState::Recording;

        Ok(SessionStart {
            session,
            superseded,
        })
    }

    /// Start a new session with the configured default duration
    pub fn start_default(&mut self) -> RecorderResult<SessionStart> {
        self.start(self.config.default_duration_secs)
    }

    fn allocate_file_name(&self) -> RecorderResult<(String, u64)> {
        let attempts = self.config.max_name_attempts;
        for attempt in 0..attempts {
            if attempt > 0 {
                self.clock.delay_ms(self.config.collision_delay_ms);
            }
            let now = self.clock.now_ms();
            let candidate = session_file_name(now);
            if !self.medium.exists(&candidate) {
                return Ok((candidate, now));
            }
            tracing::debug!("{} already exists, retrying", candidate);
        }

        Err(RecorderError::NameExhausted { attempts })
    }

    /// Append one sample to the active session file.
    ///
    /// The file is opened, written and closed within this call. An open
    /// failure skips the sample; the next call tries again.
    pub fn record(&mut self, value: i32) -> RecorderResult<()> {
        let session = match (self.state, self.session.as_mut()) {
            (RecorderState::Uninitialized, _) => return Err(RecorderError::NotInitialized),
            (_, None) => return Err(RecorderError::NotStarted),
            (_, Some(session)) => session,
        };

        tracing::debug!("Recording value {}", value);

        let mut handle = match self.medium.open_append(&session.filename) {
            Ok(handle) => handle,
            Err(source) => {
                let err = RecorderError::OpenFailure {
                    filename: session.filename.clone(),
                    source,
                };
                tracing::warn!(code = err.code(), "{}", err);
                return Err(err);
            }
        };

        let sample = Sample {
            timestamp_ms: self.clock.now_ms(),
            value,
        };
        let written = writeln!(handle, "{sample}").and_then(|_| handle.flush());

        if let Err(e) = self.medium.close(handle) {
            tracing::warn!("Error closing {}: {}", session.filename, e);
        }
        if let Err(e) = written {
            let err = RecorderError::from(e);
            tracing::warn!(
                code = err.code(),
                "Error writing {}: {}",
                session.filename,
                err
            );
            return Err(err);
        }

        session.records_written += 1;
        Ok(())
    }

    /// Whether the clock has passed the active session's deadline
    pub fn is_finished(&self) -> RecorderResult<bool> {
        let session = self.session.as_ref().ok_or(RecorderError::NotStarted)?;
        Ok(session.is_finished_at(self.clock.now_ms()))
    }

    /// Milliseconds left until the deadline, zero once reached
    pub fn remaining_ms(&self) -> RecorderResult<u64> {
        let session = self.session.as_ref().ok_or(RecorderError::NotStarted)?;
        Ok(session.remaining_ms_at(self.clock.now_ms()))
    }

    /// Session log files on the medium, ordered by their clock suffix
    pub fn session_files(&self) -> RecorderResult<Vec<String>> {
        let mut files: Vec<(u32, String)> = self
            .medium
            .list()?
            .into_iter()
            .filter_map(|name| parse_session_suffix(&name).map(|suffix| (suffix, name)))
            .collect();
        files.sort();
        Ok(files.into_iter().map(|(_, name)| name).collect())
    }

    /// Read back the samples of the active session file
    pub fn read_samples(&self) -> RecorderResult<Vec<Sample>> {
        let session = self.session.as_ref().ok_or(RecorderError::NotStarted)?;

        let text = match self.medium.read_to_string(&session.filename) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        parse_log(&text).map_err(|(line, source)| RecorderError::Parse { line, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::{FsMedium, MemoryMedium};
    use tempfile::tempdir;

    const SLOT: SlotId = SlotId(4);

    type TestRecorder = SessionRecorder<MemoryMedium, ManualClock>;

    fn recorder_at(start_ms: u64) -> (TestRecorder, MemoryMedium, ManualClock) {
        let medium = MemoryMedium::new(SLOT);
        let clock = ManualClock::new(start_ms);
        let mut recorder = SessionRecorder::new(medium.clone(), clock.clone());
        recorder.initialize(SLOT).unwrap();
        (recorder, medium, clock)
    }

    #[test]
    fn test_initialize_fails_without_card() {
        let medium = MemoryMedium::new(SLOT);
        medium.set_present(false);
        let mut recorder = SessionRecorder::new(medium, ManualClock::new(0));

        let err = recorder.initialize(SLOT).unwrap_err();
        assert!(matches!(err, RecorderError::MediumUnavailable { slot, .. } if slot == SLOT));
        assert_eq!(recorder.state(), RecorderState::Uninitialized);
    }

    #[test]
    fn test_initialize_fails_on_unwired_slot() {
        let mut recorder = SessionRecorder::new(MemoryMedium::new(SLOT), ManualClock::new(0));
        assert!(recorder.initialize(SlotId(9)).is_err());
        assert!(recorder.initialize_from_config().is_ok());
        assert_eq!(recorder.state(), RecorderState::Initialized);
    }

    #[test]
    fn test_operations_before_initialize_are_rejected() {
        let mut recorder = SessionRecorder::new(MemoryMedium::new(SLOT), ManualClock::new(0));
        assert!(matches!(recorder.start(10), Err(RecorderError::NotInitialized)));
        assert!(matches!(recorder.record(1), Err(RecorderError::NotInitialized)));
    }

    #[test]
    fn test_queries_before_start_are_not_started() {
        let (mut recorder, medium, _) = recorder_at(0);
        assert!(matches!(recorder.is_finished(), Err(RecorderError::NotStarted)));
        assert!(matches!(recorder.remaining_ms(), Err(RecorderError::NotStarted)));
        assert!(matches!(recorder.record(5), Err(RecorderError::NotStarted)));
        assert!(medium.file_names().is_empty());
    }

    #[test]
    fn test_start_names_file_from_clock() {
        let (mut recorder, medium, _) = recorder_at(1_234_567_890);
        let started = recorder.start(60).unwrap();

        assert_eq!(started.session.filename, "wm567890.txt");
        assert_eq!(started.session.deadline_ms, 1_234_567_890 + 60_000);
        assert!(started.superseded.is_none());
        assert_eq!(recorder.state(), RecorderState::Recording);
        // start alone creates nothing
        assert!(medium.file_names().is_empty());
    }

    #[test]
    fn test_start_skips_existing_name() {
        let (mut recorder, medium, clock) = recorder_at(7);
        medium.seed_file("wm000007.txt", "1\t1\n");

        let started = recorder.start(1).unwrap();
        assert_ne!(started.session.filename, "wm000007.txt");
        assert_eq!(started.session.filename, "wm000008.txt");
        assert_eq!(started.session.started_at_ms, clock.now_ms());
        assert_eq!(started.session.deadline_ms, 8 + 1_000);
        assert_eq!(medium.contents("wm000007.txt").as_deref(), Some("1\t1\n"));
    }

    #[test]
    fn test_start_gives_up_when_clock_stalls() {
        let medium = MemoryMedium::new(SLOT);
        let clock = ManualClock::new(42);
        clock.freeze(true);
        medium.seed_file("wm000042.txt", "");
        let config = RecorderConfig {
            max_name_attempts: 5,
            ..RecorderConfig::default()
        };
        let mut recorder = SessionRecorder::with_config(medium, clock, config);
        recorder.initialize(SLOT).unwrap();

        let err = recorder.start(10).unwrap_err();
        assert!(matches!(err, RecorderError::NameExhausted { attempts: 5 }));
        assert!(recorder.session().is_none());
        assert_eq!(recorder.state(), RecorderState::Initialized);
    }

    #[test]
    fn test_deadline_transition_is_one_way() {
        let (mut recorder, _, clock) = recorder_at(500);
        recorder.start(2).unwrap();

        assert!(!recorder.is_finished().unwrap());
        clock.set(2_500);
        assert!(!recorder.is_finished().unwrap());
        assert_eq!(recorder.remaining_ms().unwrap(), 0);
        clock.set(2_501);
        assert!(recorder.is_finished().unwrap());
        clock.advance(60_000);
        assert!(recorder.is_finished().unwrap());
    }

    #[test]
    fn test_zero_duration_expires_on_next_tick() {
        let (mut recorder, _, clock) = recorder_at(100);
        recorder.start(0).unwrap();
        clock.advance(1);
        assert!(recorder.is_finished().unwrap());
    }

    #[test]
    fn test_record_appends_in_call_order() {
        let (mut recorder, medium, clock) = recorder_at(10);
        recorder.start(60).unwrap();

        for value in [3, -1, 250] {
            clock.advance(100);
            recorder.record(value).unwrap();
        }

        assert_eq!(medium.file_names(), vec!["wm000010.txt".to_string()]);
        assert_eq!(
            medium.contents("wm000010.txt").as_deref(),
            Some("110\t3\n210\t-1\n310\t250\n")
        );
        assert_eq!(medium.open_count(), 3);
        assert_eq!(medium.close_count(), 3);
        assert_eq!(recorder.session().unwrap().records_written, 3);
    }

    #[test]
    fn test_open_failure_skips_sample_then_recovers() {
        let (mut recorder, medium, clock) = recorder_at(0);
        recorder.start(60).unwrap();
        recorder.record(1).unwrap();

        medium.set_open_failure(true);
        clock.advance(5);
        let err = recorder.record(2).unwrap_err();
        assert!(matches!(
            err,
            RecorderError::OpenFailure { ref filename, .. } if filename == "wm000000.txt"
        ));
        assert!(err.is_transient());

        medium.set_open_failure(false);
        clock.advance(5);
        recorder.record(3).unwrap();

        assert_eq!(medium.contents("wm000000.txt").as_deref(), Some("0\t1\n10\t3\n"));
        assert_eq!(recorder.session().unwrap().records_written, 2);
    }

    #[test]
    fn test_open_failure_on_first_record_creates_no_file() {
        let (mut recorder, medium, _) = recorder_at(0);
        recorder.start(60).unwrap();
        medium.set_open_failure(true);

        assert!(recorder.record(9).is_err());
        assert!(medium.file_names().is_empty());
        assert!(recorder.read_samples().unwrap().is_empty());
    }

    #[test]
    fn test_restart_supersedes_previous_session() {
        let (mut recorder, medium, clock) = recorder_at(1_000);
        recorder.start(60).unwrap();
        recorder.record(11).unwrap();

        clock.advance(70_000);
        assert!(recorder.is_finished().unwrap());

        let started = recorder.start(60).unwrap();
        let previous = started.superseded.expect("previous session");
        assert_eq!(previous.filename, "wm001000.txt");
        assert_eq!(previous.records_written, 1);
        assert_eq!(started.session.filename, "wm071000.txt");
        assert_eq!(started.session.index, 1);
        assert!(!recorder.is_finished().unwrap());

        recorder.record(22).unwrap();
        assert_eq!(medium.contents("wm001000.txt").as_deref(), Some("1000\t11\n"));
        assert_eq!(medium.contents("wm071000.txt").as_deref(), Some("71000\t22\n"));
    }

    #[test]
    fn test_read_back_yields_every_sample() {
        let (mut recorder, _, clock) = recorder_at(3);
        recorder.start_default().unwrap();

        let values: Vec<i32> = (0..25).map(|i| i * 7 - 40).collect();
        for &value in &values {
            clock.advance(50);
            recorder.record(value).unwrap();
        }

        let samples = recorder.read_samples().unwrap();
        assert_eq!(samples.len(), values.len());
        assert_eq!(samples.iter().map(|s| s.value).collect::<Vec<_>>(), values);
        assert!(samples.windows(2).all(|w| w[0].timestamp_ms < w[1].timestamp_ms));
    }

    #[test]
    fn test_read_back_reports_corrupt_line() {
        let (mut recorder, medium, _) = recorder_at(0);
        recorder.start(60).unwrap();
        recorder.record(1).unwrap();
        medium.seed_file("wm000000.txt", "0\t1\ngarbage\n");

        let err = recorder.read_samples().unwrap_err();
        assert!(matches!(err, RecorderError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_records_to_directory_medium() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("wm000020.txt"), "old\n").unwrap();

        let clock = ManualClock::new(20);
        let mut recorder = SessionRecorder::new(FsMedium::new(dir.path()), clock.clone());
        recorder.initialize(SLOT).unwrap();

        let started = recorder.start(5).unwrap();
        assert_eq!(started.session.filename, "wm000021.txt");

        recorder.record(100).unwrap();
        clock.advance(1);
        recorder.record(200).unwrap();

        let text = std::fs::read_to_string(dir.path().join("wm000021.txt")).unwrap();
        assert_eq!(text, "21\t100\n22\t200\n");
        assert_eq!(
            std::fs::read_to_string(dir.path().join("wm000020.txt")).unwrap(),
            "old\n"
        );
    }

    #[test]
    fn test_write_failure_is_io_error_and_still_closes() {
        let (mut recorder, medium, clock) = recorder_at(0);
        recorder.start(60).unwrap();
        recorder.record(1).unwrap();

        medium.set_write_failure(true);
        clock.advance(5);
        let err = recorder.record(2).unwrap_err();
        assert!(matches!(err, RecorderError::Io(_)));
        assert_eq!(err.code(), "IO_ERROR");
        assert_eq!(medium.close_count(), 2);
        assert_eq!(recorder.session().unwrap().records_written, 1);

        medium.set_write_failure(false);
        clock.advance(5);
        recorder.record(3).unwrap();
        assert_eq!(medium.contents("wm000000.txt").as_deref(), Some("0\t1\n10\t3\n"));
    }

    #[test]
    fn test_close_failure_is_not_surfaced() {
        let (mut recorder, medium, _) = recorder_at(0);
        recorder.start(60).unwrap();
        medium.set_close_failure(true);

        recorder.record(4).unwrap();
        assert_eq!(medium.close_count(), 1);
        assert_eq!(recorder.session().unwrap().records_written, 1);
        assert_eq!(medium.contents("wm000000.txt").as_deref(), Some("0\t4\n"));
    }

    #[test]
    fn test_failed_remount_drops_to_uninitialized() {
        let (mut recorder, medium, _) = recorder_at(0);
        recorder.start(60).unwrap();

        medium.set_present(false);
        assert!(recorder.initialize(SLOT).is_err());
        assert_eq!(recorder.state(), RecorderState::Uninitialized);
        assert!(matches!(recorder.record(1), Err(RecorderError::NotInitialized)));
        assert_eq!(recorder.session().unwrap().filename, "wm000000.txt");

        medium.set_present(true);
        recorder.initialize(SLOT).unwrap();
        assert_eq!(recorder.state(), RecorderState::Recording);
        recorder.record(1).unwrap();
    }

    #[test]
    fn test_session_files_lists_only_log_files_in_order() {
        let (mut recorder, medium, clock) = recorder_at(500);
        medium.seed_file("notes.txt", "");
        medium.seed_file("wm000900.txt", "");
        medium.seed_file("wm12.txt", "");

        recorder.start(1).unwrap();
        recorder.record(1).unwrap();
        clock.set(1_000_123);
        recorder.start(1).unwrap();
        recorder.record(2).unwrap();

        assert_eq!(
            recorder.session_files().unwrap(),
            vec!["wm000123.txt", "wm000500.txt", "wm000900.txt"]
        );
    }
}
