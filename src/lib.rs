pub mod cli;
pub mod config;
pub mod error;
pub mod event;
pub mod filter;
pub mod highlighter;
pub mod monitor;
pub mod notifier;
pub mod registry;
pub mod settings;
pub mod tail;
pub mod watcher;

pub use cli::Args;
pub use config::Config;
pub use error::{Result, WatchError};
pub use event::{parse_line, SessionEvent, SessionKind};
pub use filter::IgnoreFilter;
pub use highlighter::Highlighter;
pub use monitor::{ActivityMonitor, MonitorState};
pub use notifier::{NotificationSink, Notifier};
pub use registry::{Connection, ConnectionRegistry, ProcessLister, ProcessSignaler};
pub use settings::{Settings, SettingsStore};
pub use tail::LineSource;
pub use watcher::SshWatcher;
