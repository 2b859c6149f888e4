//! Operator control signals
//!
//! `CrawlSignals` carries the pause and stop flags shared between a running
//! crawl and whoever drives it. Setters are plain synchronous calls, so they
//! work from a stdin thread or a signal handler as well as from async code.

use crate::state::CrawlState;
use std::str::FromStr;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct SignalState {
    paused: bool,
    stopped: bool,
}

/// Pause and stop flags for one crawl run
#[derive(Debug)]
pub struct CrawlSignals {
    state: watch::Sender<SignalState>,
}

impl Default for CrawlSignals {
    fn default() -> Self {
        Self::new()
    }
}

impl CrawlSignals {
    pub fn new() -> Self {
        let (state, _) = watch::channel(SignalState::default());
        Self { state }
    }

    /// Pauses or resumes the crawl
    ///
    /// While paused no new fetch is issued. Fetches already in flight finish.
    pub fn set_paused(&self, paused: bool) {
        self.state.send_modify(|state| state.paused = paused);
        tracing::info!("{}", if paused { "Crawling paused." } else { "Crawling resumed." });
    }

    pub fn is_paused(&self) -> bool {
        self.state.borrow().paused
    }

    /// Stops the crawl; also releases a pause so waiters can observe the stop
    pub fn set_stopped(&self) {
        self.state.send_modify(|state| {
            state.stopped = true;
            state.paused = false;
        });
        tracing::info!("Crawling stopped.");
    }

    pub fn is_stopped(&self) -> bool {
        self.state.borrow().stopped
    }

    /// The phase an active run is in, as seen from the flags alone
    pub fn state(&self) -> CrawlState {
        let state = *self.state.borrow();
        if state.stopped {
            CrawlState::Stopped
        } else if state.paused {
            CrawlState::Paused
        } else {
            CrawlState::Running
        }
    }

    /// Clears both flags before starting a new run
    pub fn reset(&self) {
        self.state.send_replace(SignalState::default());
    }

    /// Waits until the crawl is not paused or has been stopped
    ///
    /// Returns immediately when not paused.
    pub async fn wait_while_paused(&self) {
        let mut receiver = self.state.subscribe();
        // The sender lives in self, so the channel cannot close while we wait
        let _ = receiver
            .wait_for(|state| !state.paused || state.stopped)
            .await;
    }
}

/// A command typed by the operator while a crawl runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorCommand {
    Pause,
    Resume,
    Stop,
}

impl OperatorCommand {
    pub fn apply(&self, signals: &CrawlSignals) {
        match self {
            Self::Pause => signals.set_paused(true),
            Self::Resume => signals.set_paused(false),
            Self::Stop => signals.set_stopped(),
        }
    }
}

impl FromStr for OperatorCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pause" | "p" => Ok(Self::Pause),
            "resume" | "r" => Ok(Self::Resume),
            "stop" | "s" => Ok(Self::Stop),
            other => Err(format!(
                "unknown command {:?} (expected pause, resume, or stop)",
                other
            )),
        }
    }
}
