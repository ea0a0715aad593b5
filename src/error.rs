use std::path::PathBuf;

/// Errors raised by the monitoring pipeline, the connection registry and the
/// settings store.
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    /// The log file could not be opened or read (missing, permission denied).
    #[error("Log file '{}' {}", .path.display(), unavailable_reason(.source))]
    ResourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The log file shrank below the read cursor (truncated or rotated).
    #[error("Log file '{}' was truncated or rotated", .path.display())]
    LogTruncated { path: PathBuf },

    /// An external command (process listing, signalling) failed.
    #[error("Command '{command}' failed: {message}")]
    ExternalCommand { command: String, message: String },

    /// A connection could not be terminated.
    #[error("Failed to terminate connection with PID {pid}: {message}")]
    Termination { pid: u32, message: String },

    /// A notification could not be delivered.
    #[error("Failed to send notification: {0}")]
    Notification(String),

    #[error("Failed to read settings '{}': {}", .path.display(), .source)]
    SettingsRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed settings '{}': {}", .path.display(), .source)]
    SettingsMalformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write settings '{}': {}", .path.display(), .source)]
    SettingsWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `start` was called on a monitor that is not idle.
    #[error("Activity monitor can only be started once")]
    AlreadyStarted,
}

pub type Result<T> = std::result::Result<T, WatchError>;

fn unavailable_reason(source: &std::io::Error) -> String {
    match source.kind() {
        std::io::ErrorKind::NotFound => "not found".to_string(),
        std::io::ErrorKind::PermissionDenied => "permission denied".to_string(),
        _ => format!("unreadable: {}", source),
    }
}
