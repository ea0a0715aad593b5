use crate::error::{Result, WatchError};
use crate::event::{parse_line, SessionEvent};
use crate::filter::IgnoreFilter;
use crate::tail::LineSource;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);
const EVENT_CHANNEL_CAPACITY: usize = 100;
const READ_BUFFER_SIZE: usize = 8192;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Idle,
    Running,
    Stopped,
}

/// Tails an auth log on a background task and publishes accepted session
/// events, in log order, to a single consumer.
///
/// Lifecycle is one-way: Idle → Running → Stopped. A stopped monitor cannot be
/// restarted.
#[derive(Debug)]
pub struct ActivityMonitor {
    log_file: PathBuf,
    filter: IgnoreFilter,
    poll_interval: Duration,
    cancel: watch::Sender<bool>,
    worker: Option<JoinHandle<Result<()>>>,
    state: MonitorState,
}

impl ActivityMonitor {
    pub fn new<P: Into<PathBuf>>(log_file: P, filter: IgnoreFilter) -> Self {
        Self {
            log_file: log_file.into(),
            filter,
            poll_interval: DEFAULT_POLL_INTERVAL,
            cancel: watch::Sender::new(false),
            worker: None,
            state: MonitorState::Idle,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn log_file(&self) -> &Path {
        &self.log_file
    }

    /// Handle to the ignore list the worker consults.
    pub fn filter(&self) -> &IgnoreFilter {
        &self.filter
    }

    pub fn state(&self) -> MonitorState {
        match (self.state, &self.worker) {
            (MonitorState::Running, Some(worker)) if worker.is_finished() => {
                MonitorState::Stopped
            }
            (state, _) => state,
        }
    }

    /// Open the log at its current end and spawn the tailing worker.
    ///
    /// Must be called from within a tokio runtime. If the log cannot be
    /// opened the monitor goes straight to `Stopped` and the error is
    /// returned.
    pub fn start(&mut self) -> Result<mpsc::Receiver<SessionEvent>> {
        if self.state != MonitorState::Idle {
            return Err(WatchError::AlreadyStarted);
        }

        let source = match LineSource::open(&self.log_file, READ_BUFFER_SIZE) {
            Ok(source) => source,
            Err(e) => {
                error!("{}", e);
                self.state = MonitorState::Stopped;
                return Err(e);
            }
        };

        let (tx, rx) = mpsc::channel::<SessionEvent>(EVENT_CHANNEL_CAPACITY);
        let worker = Worker {
            source,
            filter: self.filter.clone(),
            cancel: self.cancel.subscribe(),
            poll_interval: self.poll_interval,
            tx,
        };

        info!("Monitoring {}", self.log_file.display());
        self.worker = Some(tokio::spawn(worker.run()));
        self.state = MonitorState::Running;

        Ok(rx)
    }

    /// Request cancellation without waiting for the worker.
    pub fn request_stop(&self) {
        self.cancel.send_replace(true);
    }

    /// Request cancellation and wait for the worker to exit.
    ///
    /// Returns within one poll interval even when the consumer has stopped
    /// draining the event channel.
    ///
    /// Returns the worker's failure, if it ended on one. Calling `stop` on an
    /// idle monitor just marks it stopped.
    pub async fn stop(&mut self) -> Result<()> {
        self.request_stop();
        self.state = MonitorState::Stopped;

        let Some(worker) = self.worker.take() else {
            return Ok(());
        };

        match worker.await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Monitor worker panicked: {}", e);
                Ok(())
            }
        }
    }
}

impl Drop for ActivityMonitor {
    fn drop(&mut self) {
        self.request_stop();
    }
}

struct Worker {
    source: LineSource,
    filter: IgnoreFilter,
    cancel: watch::Receiver<bool>,
    poll_interval: Duration,
    tx: mpsc::Sender<SessionEvent>,
}

impl Worker {
    async fn run(mut self) -> Result<()> {
        let outcome = self.poll_loop().await;
        match &outcome {
            Ok(()) => debug!("Stopped tailing {}", self.source.path().display()),
            Err(e) => error!("{}", e),
        }
        outcome
    }

    async fn poll_loop(&mut self) -> Result<()> {
        while !self.cancelled() {
            let Some(line) = self.source.next_line()? else {
                tokio::select! {
                    _ = sleep(self.poll_interval) => {}
                    _ = self.cancel.changed() => break,
                }
                continue;
            };

            let Some(event) = parse_line(&line) else {
                continue;
            };
            if !self.filter.accepts(&event) || self.cancelled() {
                continue;
            }

            tokio::select! {
                sent = self.tx.send(event) => {
                    if sent.is_err() {
                        debug!("Event consumer went away");
                        break;
                    }
                }
                _ = self.cancel.changed() => {
                    debug!("Stop requested before the event was delivered");
                    break;
                }
            }
        }
        Ok(())
    }

    fn cancelled(&self) -> bool {
        *self.cancel.borrow()
    }
}
