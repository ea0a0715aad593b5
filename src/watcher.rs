use crate::cli::{Command, IgnoreAction};
use crate::config::Config;
use crate::event::SessionEvent;
use crate::filter::IgnoreFilter;
use crate::highlighter::{Highlighter, WatcherStats};
use crate::monitor::ActivityMonitor;
use crate::notifier::{Delivery, Notifier};
use crate::registry::{ConnectionRegistry, KillSignaler, ProcessLister, ProcessSignaler, PsLister};
use crate::settings::{Settings, SettingsStore};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

/// Top-level runner: tails the log in monitor mode and serves the
/// connection and ignore-list commands.
#[derive(Debug)]
pub struct SshWatcher<L = PsLister, S = KillSignaler> {
    config: Config,
    highlighter: Highlighter,
    settings: SettingsStore,
    registry: ConnectionRegistry<L, S>,
    stats: WatcherStats,
}

impl SshWatcher {
    pub fn new(config: Config) -> Self {
        Self::with_registry(config, ConnectionRegistry::system())
    }
}

impl<L: ProcessLister, S: ProcessSignaler> SshWatcher<L, S> {
    pub fn with_registry(config: Config, registry: ConnectionRegistry<L, S>) -> Self {
        let highlighter = Highlighter::new(config.no_color);
        let settings = SettingsStore::new(config.settings_path.clone());

        Self {
            config,
            highlighter,
            settings,
            registry,
            stats: WatcherStats::default(),
        }
    }

    pub async fn execute(&mut self, command: Option<Command>) -> Result<()> {
        match command {
            None => self.run().await,
            Some(Command::Connections) => self.show_connections(),
            Some(Command::Kill { pid }) => self.kill_connection(pid),
            Some(Command::Ignore { action }) => self.manage_ignored(action),
            Some(Command::Completions { shell }) => {
                crate::cli::Args::print_completions(shell);
                Ok(())
            }
        }
    }

    /// Tail the log until Ctrl+C or until the worker gives up.
    pub async fn run(&mut self) -> Result<()> {
        let settings = match self.settings.load() {
            Ok(settings) => settings,
            Err(e) => {
                self.highlighter
                    .print_warning(&format!("{}; continuing with an empty ignore list", e))?;
                Settings::default()
            }
        };
        let filter = IgnoreFilter::new(settings.ignored_users);

        let _settings_watch = match self.settings.watch(filter.clone()) {
            Ok(watcher) => Some(watcher),
            Err(e) => {
                warn!("Ignore list will not be reloaded live: {:#}", e);
                None
            }
        };

        let mut monitor = ActivityMonitor::new(self.config.log_file.clone(), filter.clone())
            .with_poll_interval(self.config.poll_interval);

        self.highlighter
            .print_startup_info(&self.config, filter.len())?;

        let mut events = match monitor.start() {
            Ok(events) => events,
            Err(e) => {
                self.highlighter.print_error(&e.to_string())?;
                return Err(e).context("Monitoring could not start");
            }
        };

        let notifier = if self.config.command_line_only {
            None
        } else {
            Some(Arc::new(Notifier::desktop(Highlighter::new(
                self.config.no_color,
            ))))
        };

        let interrupt = tokio::signal::ctrl_c();
        tokio::pin!(interrupt);

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => self.dispatch(&event, notifier.as_ref()).await?,
                    None => break,
                },
                _ = &mut interrupt => {
                    info!("Interrupted, stopping monitor");
                    break;
                }
            }
        }

        // Nothing reads past this point
        drop(events);
        let outcome = monitor.stop().await;
        self.highlighter.print_shutdown_summary(&self.stats)?;

        if let Err(e) = outcome {
            self.highlighter.print_error(&e.to_string())?;
            return Err(e).context("Monitoring stopped");
        }
        Ok(())
    }

    /// Desktop delivery blocks on D-Bus, so it runs off the async workers.
    async fn dispatch(
        &mut self,
        event: &SessionEvent,
        notifier: Option<&Arc<Notifier>>,
    ) -> Result<()> {
        self.stats.record(event);

        match notifier {
            None => self.highlighter.print_event(event)?,
            Some(notifier) => {
                let notifier = Arc::clone(notifier);
                let event = event.clone();
                let delivery = tokio::task::spawn_blocking(move || notifier.notify(&event))
                    .await
                    .unwrap_or_else(|e| {
                        warn!("Notification task failed: {}", e);
                        Delivery::Failed
                    });
                if delivery != Delivery::Failed {
                    self.stats.notifications_sent += 1;
                }
            }
        }

        Ok(())
    }

    pub fn show_connections(&mut self) -> Result<()> {
        match self.registry.try_list() {
            Ok(connections) => self.highlighter.print_connections(&connections),
            Err(e) => {
                self.highlighter
                    .print_error(&format!("Unable to retrieve SSH connections: {}", e))?;
                self.highlighter.print_connections(&[])
            }
        }
    }

    /// Terminate a connection, then show the refreshed list.
    pub fn kill_connection(&mut self, pid: u32) -> Result<()> {
        let outcome = self.registry.terminate(pid);

        match &outcome {
            Ok(()) => self.highlighter.print_info(&format!(
                "Connection with PID {} has been terminated.",
                pid
            ))?,
            Err(e) => self.highlighter.print_error(&e.to_string())?,
        }

        self.show_connections()?;
        outcome.map_err(Into::into)
    }

    /// Edit the persisted ignore list. Refuses to overwrite a settings file
    /// it cannot parse.
    pub fn manage_ignored(&mut self, action: IgnoreAction) -> Result<()> {
        let mut settings = self.settings.load()?;

        match action {
            IgnoreAction::List => {
                return self.highlighter.print_ignored_users(&settings.ignored_users);
            }
            IgnoreAction::Add { username } => {
                if settings.add_ignored_user(&username) {
                    self.settings.save(&settings)?;
                    self.highlighter
                        .print_info(&format!("Ignoring {}", username))?;
                } else {
                    self.highlighter
                        .print_info(&format!("{} is already ignored", username))?;
                }
            }
            IgnoreAction::Remove { username } => {
                if settings.remove_ignored_user(&username) {
                    self.settings.save(&settings)?;
                    self.highlighter
                        .print_info(&format!("No longer ignoring {}", username))?;
                } else {
                    self.highlighter
                        .print_warning(&format!("{} is not in the ignore list", username))?;
                }
            }
        }

        Ok(())
    }
}
