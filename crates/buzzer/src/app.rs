//! The buzzer context: everything the scan callback and the playback task
//! share.
//!
//! One [`Buzzer`] owns the sound catalog, the dedup history, the session
//! guard and the hand-off to the playback task. It is built once by
//! [`Buzzer::init`] and then shared by reference (typically from a
//! `StaticCell` on hardware).
//!
//! The scan side is synchronous and never waits on I/O: it classifies,
//! filters repeats and admits at most one session. The admitted index
//! crosses to the playback task through a single-slot [`Signal`]; the task
//! parks on it between sessions.

use core::cell::RefCell;

use bluetooth::{AdvertisementReport, Classifier, DedupHistory};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::signal::Signal;
use library::SoundCatalog;
use platform::{AudioOutput, Storage};
use playback::{PlaybackEngine, SessionGuard, SessionReport, SessionState, DEFAULT_FRAME_BYTES};

use crate::config::BuzzerConfig;

/// Result of a playback request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Admission {
    /// The session was admitted and handed to the playback task.
    Accepted,
    /// A session is already running; the request was dropped.
    Busy,
}

/// What the pipeline did with one advertisement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Dispatch {
    /// Not an alert, no sound in the selected slot, or a repeat.
    Ignored,
    /// A fresh alert arrived while a session was running.
    Busy,
    /// A session for this catalog index was started.
    Started(u8),
}

/// Application context.
///
/// `M` is the raw mutex guarding the dedup history and the hand-off signal:
/// `CriticalSectionRawMutex` when the scan callback runs in interrupt
/// context, `NoopRawMutex` when everything shares one executor.
pub struct Buzzer<M: RawMutex, const FRAME: usize = DEFAULT_FRAME_BYTES> {
    classifier: Classifier,
    catalog: SoundCatalog,
    engine: PlaybackEngine<FRAME>,
    history: Mutex<M, RefCell<DedupHistory>>,
    guard: SessionGuard,
    pending: Signal<M, u8>,
}

impl<M: RawMutex, const FRAME: usize> Buzzer<M, FRAME> {
    /// One-time setup: build the catalog from `storage`, start with an
    /// empty dedup history and an idle guard.
    ///
    /// A missing card is not an error; every index then resolves to nothing.
    pub async fn init<S: Storage>(config: BuzzerConfig, storage: &mut S) -> Self {
        tracing::info!(
            app = platform::config::APP_NAME,
            version = platform::config::APP_VERSION,
            gap_name = platform::config::GAP_NAME,
            "buzzer: init"
        );
        let catalog = SoundCatalog::build(storage).await;
        Self::new(config, catalog)
    }

    /// Context over an already built catalog.
    pub fn new(config: BuzzerConfig, catalog: SoundCatalog) -> Self {
        Self {
            classifier: Classifier::new(config.classifier),
            catalog,
            engine: PlaybackEngine::new(config.engine),
            history: Mutex::new(RefCell::new(DedupHistory::new())),
            guard: SessionGuard::new(),
            pending: Signal::new(),
        }
    }

    /// The sound catalog.
    pub fn catalog(&self) -> &SoundCatalog {
        &self.catalog
    }

    /// Whether a session is running.
    pub fn state(&self) -> SessionState {
        self.guard.state()
    }

    /// Admit a session for `index` unless one is already running.
    ///
    /// Never waits: the session itself runs on the playback task.
    pub fn request_playback(&self, index: u8) -> Admission {
        if !self.guard.try_acquire() {
            tracing::warn!(index, "buzzer: already playing, request dropped");
            return Admission::Busy;
        }
        tracing::info!(index, "buzzer: playback admitted");
        self.pending.signal(index);
        Admission::Accepted
    }

    /// [`Self::request_playback`] with the boolean polarity of the scan
    /// callback: `true` means the request was rejected.
    pub fn trigger(&self, index: u8) -> bool {
        self.request_playback(index) == Admission::Busy
    }

    /// Classify `report` and filter repeats. Returns the filename to play, or
    /// `None` when the event should be ignored. Does not start playback.
    pub fn classify_and_maybe_trigger(&self, report: &AdvertisementReport<'_>) -> Option<&str> {
        self.resolve(report).map(|(_, name)| name)
    }

    /// Full scan-side pipeline: classify, filter repeats, admit.
    pub fn on_advertisement(&self, report: &AdvertisementReport<'_>) -> Dispatch {
        let Some((index, _)) = self.resolve(report) else {
            return Dispatch::Ignored;
        };
        match self.request_playback(index) {
            Admission::Accepted => Dispatch::Started(index),
            Admission::Busy => Dispatch::Busy,
        }
    }

    /// Wait for the next admitted session and run it to the end.
    pub async fn play_next<S, A>(&self, storage: &mut S, audio: &mut A) -> SessionReport
    where
        S: Storage,
        A: AudioOutput,
    {
        let index = self.pending.wait().await;
        let name = self.catalog.get(index);
        self.engine.play(&self.guard, storage, audio, name).await
    }

    /// Body of the playback task: serve admitted sessions forever.
    pub async fn run_playback<S, A>(&self, storage: &mut S, audio: &mut A)
    where
        S: Storage,
        A: AudioOutput,
    {
        loop {
            let _report = self.play_next(storage, audio).await;
        }
    }

    /// Catalog index and filename for an alert that is new and has a sound.
    ///
    /// The token is recorded only once a filename resolved, so alerts for an
    /// empty slot never occupy the history.
    fn resolve(&self, report: &AdvertisementReport<'_>) -> Option<(u8, &str)> {
        let classification = self.classifier.classify(report);
        let index = classification.sound_index?;
        let Some(name) = self.catalog.get(index) else {
            tracing::debug!(index, "buzzer: no sound in slot");
            return None;
        };
        let token = classification.token;
        if self.history.lock(|history| history.borrow_mut().seen_before(token)) {
            tracing::debug!(token, "buzzer: repeat suppressed");
            return None;
        }
        tracing::info!(index, token, name, peer = %report.addr, "buzzer: alert");
        Some((index, name))
    }
}
