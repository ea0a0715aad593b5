use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

pub const DEFAULT_LOG_FILE: &str = "/var/log/auth.log";

#[derive(Parser, Debug)]
#[command(
    name = "watchssh",
    about = "WatchSSH - An SSH Login/Logout Monitor",
    long_about = "WatchSSH follows the system authentication log and reports SSH logins and logouts as desktop notifications or, with --command-line-only, on standard output. It can also list and terminate live SSH connections and manage a list of users whose sessions are ignored."
)]
pub struct Args {
    /// Run in command-line mode only (print events instead of notifying)
    #[arg(short = 'c', long = "command-line-only")]
    pub command_line_only: bool,

    /// Log file to monitor
    #[arg(short = 'f', long = "log-file", default_value = DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,

    /// Show version information
    #[arg(short = 'v', long = "version")]
    pub version: bool,

    /// Settings file holding the ignore list (default: ~/.watchssh_config.json)
    #[arg(long = "config", env = "WATCHSSH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log polling interval in milliseconds
    #[arg(long = "poll-interval", default_value = "100")]
    pub poll_interval: u64,

    /// Disable ANSI colors
    #[arg(long = "no-color")]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List live SSH connections
    Connections,

    /// Terminate the SSH connection with the given PID
    Kill {
        pid: u32,
    },

    /// Manage users whose logins and logouts are ignored
    Ignore {
        #[command(subcommand)]
        action: IgnoreAction,
    },

    /// Print shell completions
    Completions {
        shell: Shell,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum IgnoreAction {
    /// Show the ignore list
    List,
    /// Add a user to the ignore list
    Add { username: String },
    /// Remove a user from the ignore list
    Remove { username: String },
}

impl Args {
    pub fn version_string() -> String {
        format!("WatchSSH v{}", env!("CARGO_PKG_VERSION"))
    }

    /// Write completions for `shell` to stdout.
    pub fn print_completions(shell: Shell) {
        let mut command = Args::command();
        clap_complete::generate(shell, &mut command, "watchssh", &mut std::io::stdout());
    }
}
