use crate::error::{Result, WatchError};
use std::fmt;
use std::process::Command;
use tracing::{debug, error, info};

/// Token `ps` shows in place of the command name for an sshd session worker.
const SSHD_MARKER: &str = "sshd:";
const PID_INDEX: usize = 1;
const ADDRESS_INDEX: usize = 8;

/// A live SSH session as seen in the process table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub pid: u32,
    pub username: String,
    pub remote_address: String,
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - PID: {} - {}",
            self.username, self.pid, self.remote_address
        )
    }
}

/// Source of the raw process table.
pub trait ProcessLister {
    fn list_processes(&self) -> Result<String>;
}

/// Sends a termination signal to a process.
pub trait ProcessSignaler {
    fn signal(&self, pid: u32) -> Result<()>;
}

/// `ps -ef`
#[derive(Debug, Default, Clone, Copy)]
pub struct PsLister;

impl ProcessLister for PsLister {
    fn list_processes(&self) -> Result<String> {
        let output = Command::new("ps")
            .arg("-ef")
            .output()
            .map_err(|e| WatchError::ExternalCommand {
                command: "ps -ef".to_string(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(WatchError::ExternalCommand {
                command: "ps -ef".to_string(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// `kill <pid>` (SIGTERM)
#[derive(Debug, Default, Clone, Copy)]
pub struct KillSignaler;

impl ProcessSignaler for KillSignaler {
    fn signal(&self, pid: u32) -> Result<()> {
        let output = Command::new("kill")
            .arg(pid.to_string())
            .output()
            .map_err(|e| WatchError::Termination {
                pid,
                message: e.to_string(),
            })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(WatchError::Termination {
                pid,
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

/// On-demand view of live SSH sessions. Nothing is cached between calls.
#[derive(Debug, Default)]
pub struct ConnectionRegistry<L = PsLister, S = KillSignaler> {
    lister: L,
    signaler: S,
}

impl ConnectionRegistry {
    pub fn system() -> Self {
        Self::default()
    }
}

impl<L: ProcessLister, S: ProcessSignaler> ConnectionRegistry<L, S> {
    pub fn new(lister: L, signaler: S) -> Self {
        Self { lister, signaler }
    }

    /// Snapshot the current sessions, propagating a listing failure.
    pub fn try_list(&self) -> Result<Vec<Connection>> {
        let table = self.lister.list_processes()?;
        let connections: Vec<Connection> = table.lines().filter_map(parse_process_line).collect();
        debug!("Found {} SSH connection(s)", connections.len());
        Ok(connections)
    }

    /// Snapshot the current sessions. A listing failure is logged and yields
    /// an empty list.
    pub fn list(&self) -> Vec<Connection> {
        self.try_list().unwrap_or_else(|e| {
            error!("Unable to retrieve SSH connections: {}", e);
            Vec::new()
        })
    }

    /// Signal the session process. The caller re-lists to observe the result.
    pub fn terminate(&self, pid: u32) -> Result<()> {
        match self.signaler.signal(pid) {
            Ok(()) => {
                info!("Connection with PID {} has been terminated", pid);
                Ok(())
            }
            Err(e) => {
                error!("{}", e);
                Err(e)
            }
        }
    }
}

/// Parse one `ps -ef` row of the form
/// `UID PID PPID C STIME TTY TIME sshd: user@address ...`.
pub fn parse_process_line(line: &str) -> Option<Connection> {
    if !line.contains(SSHD_MARKER) || !line.contains('@') {
        return None;
    }

    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() <= ADDRESS_INDEX || !tokens.contains(&SSHD_MARKER) {
        return None;
    }

    let pid = tokens[PID_INDEX].parse::<u32>().ok()?;
    let (username, remote_address) = tokens[ADDRESS_INDEX].split_once('@')?;
    if username.is_empty() || remote_address.is_empty() {
        return None;
    }

    Some(Connection {
        pid,
        username: username.to_string(),
        remote_address: remote_address.to_string(),
    })
}
