use crate::error::{Result, WatchError};
use crate::event::SessionEvent;
use crate::highlighter::Highlighter;
use notify_rust::Notification;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// Directory holding per-user home folders, used to find `~/.face`.
const HOME_ROOT: &str = "/home";
const FACE_IMAGE_NAME: &str = ".face";

/// Displays a notification.
pub trait NotificationSink: Send + Sync {
    fn show(&self, title: &str, message: &str, image: Option<&Path>) -> Result<()>;
}

/// Desktop notification through the session's notification daemon.
#[derive(Debug, Default)]
pub struct DesktopSink;

impl NotificationSink for DesktopSink {
    fn show(&self, title: &str, message: &str, image: Option<&Path>) -> Result<()> {
        let mut notification = Notification::new();
        notification
            .summary(title)
            .body(message)
            .appname("watchssh")
            .timeout(5000); // 5 seconds

        if let Some(image) = image {
            notification.icon(&image.to_string_lossy());
        }

        notification
            .show()
            .map_err(|e| WatchError::Notification(e.to_string()))?;

        Ok(())
    }
}

/// Last resort: write the notification to the terminal.
#[derive(Debug)]
pub struct ConsoleSink {
    highlighter: Mutex<Highlighter>,
}

impl ConsoleSink {
    pub fn new(highlighter: Highlighter) -> Self {
        Self {
            highlighter: Mutex::new(highlighter),
        }
    }
}

impl NotificationSink for ConsoleSink {
    fn show(&self, title: &str, message: &str, _image: Option<&Path>) -> Result<()> {
        let mut highlighter = self
            .highlighter
            .lock()
            .map_err(|e| WatchError::Notification(e.to_string()))?;
        highlighter
            .print_notification(title, message)
            .map_err(|e| WatchError::Notification(e.to_string()))
    }
}

/// How a notification ended up being shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    WithImage,
    Plain,
    Fallback,
    Failed,
}

/// Turns session events into notifications, degrading from an image
/// notification to a plain one and finally to the fallback sink.
pub struct Notifier {
    sink: Box<dyn NotificationSink>,
    fallback: Box<dyn NotificationSink>,
    home_root: PathBuf,
}

impl Notifier {
    pub fn new(sink: Box<dyn NotificationSink>, fallback: Box<dyn NotificationSink>) -> Self {
        Self {
            sink,
            fallback,
            home_root: PathBuf::from(HOME_ROOT),
        }
    }

    /// Desktop notifications with the terminal as fallback.
    pub fn desktop(highlighter: Highlighter) -> Self {
        Self::new(
            Box::new(DesktopSink),
            Box::new(ConsoleSink::new(highlighter)),
        )
    }

    pub fn with_home_root<P: Into<PathBuf>>(mut self, home_root: P) -> Self {
        self.home_root = home_root.into();
        self
    }

    /// `<home root>/<user>/.face`, if the user has one.
    pub fn face_image(&self, username: &str) -> Option<PathBuf> {
        if username.is_empty() || username.contains('/') || username.starts_with('.') {
            return None;
        }
        let path = self.home_root.join(username).join(FACE_IMAGE_NAME);
        path.is_file().then_some(path)
    }

    pub fn notify(&self, event: &SessionEvent) -> Delivery {
        let title = event.title();
        let message = event.message();

        if let Some(image) = self.face_image(event.username()) {
            match self.sink.show(&title, &message, Some(&image)) {
                Ok(()) => return Delivery::WithImage,
                Err(e) => warn!("{} (with image {})", e, image.display()),
            }
        }

        match self.sink.show(&title, &message, None) {
            Ok(()) => return Delivery::Plain,
            Err(e) => warn!("{}", e),
        }

        match self.fallback.show(&title, &message, None) {
            Ok(()) => Delivery::Fallback,
            Err(e) => {
                warn!("{}", e);
                Delivery::Failed
            }
        }
    }
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("home_root", &self.home_root)
            .finish_non_exhaustive()
    }
}
