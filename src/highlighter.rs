use crate::config::Config;
use crate::event::{SessionEvent, SessionKind};
use crate::registry::Connection;
use anyhow::Result;
use std::io::Write;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Coloured terminal output. Events and listings go to stdout, diagnostics
/// to stderr.
pub struct Highlighter {
    stdout: StandardStream,
    stderr: StandardStream,
}

impl std::fmt::Debug for Highlighter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Highlighter").finish_non_exhaustive()
    }
}

impl Highlighter {
    pub fn new(no_color: bool) -> Self {
        let color_choice = if no_color {
            ColorChoice::Never
        } else {
            ColorChoice::Auto
        };

        Self {
            stdout: StandardStream::stdout(color_choice),
            stderr: StandardStream::stderr(color_choice),
        }
    }

    /// `SSH Login Detected: alice`
    pub fn print_event(&mut self, event: &SessionEvent) -> Result<()> {
        let color = match event.kind() {
            SessionKind::Login => Color::Green,
            SessionKind::Logout => Color::Yellow,
        };
        self.print_colored(&event.to_string(), color)
    }

    pub fn print_notification(&mut self, title: &str, message: &str) -> Result<()> {
        self.stdout
            .set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true))?;
        write!(self.stdout, "{}", title)?;
        self.stdout.reset()?;
        writeln!(self.stdout, ": {}", message)?;
        self.stdout.flush()?;
        Ok(())
    }

    fn print_colored(&mut self, text: &str, color: Color) -> Result<()> {
        self.stdout
            .set_color(ColorSpec::new().set_fg(Some(color)))?;
        writeln!(self.stdout, "{}", text)?;
        self.stdout.reset()?;
        self.stdout.flush()?;
        Ok(())
    }

    pub fn print_plain(&mut self, text: &str) -> Result<()> {
        writeln!(self.stdout, "{}", text)?;
        self.stdout.flush()?;
        Ok(())
    }

    pub fn print_error(&mut self, message: &str) -> Result<()> {
        self.stderr
            .set_color(ColorSpec::new().set_fg(Some(Color::Red)))?;
        writeln!(self.stderr, "Error: {}", message)?;
        self.stderr.reset()?;
        self.stderr.flush()?;
        Ok(())
    }

    pub fn print_warning(&mut self, message: &str) -> Result<()> {
        self.stderr
            .set_color(ColorSpec::new().set_fg(Some(Color::Yellow)))?;
        writeln!(self.stderr, "Warning: {}", message)?;
        self.stderr.reset()?;
        self.stderr.flush()?;
        Ok(())
    }

    pub fn print_info(&mut self, message: &str) -> Result<()> {
        self.stderr
            .set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
        writeln!(self.stderr, "Info: {}", message)?;
        self.stderr.reset()?;
        self.stderr.flush()?;
        Ok(())
    }

    pub fn print_startup_info(&mut self, config: &Config, ignored: usize) -> Result<()> {
        self.print_info(&format!("Watching {}", config.log_file.display()))?;

        if config.command_line_only {
            self.print_info("Running in command-line mode. Press Ctrl+C to exit.")?;
        } else {
            self.print_info("Desktop notifications enabled. Press Ctrl+C to exit.")?;
        }

        if ignored > 0 {
            self.print_info(&format!("Ignoring {} user(s)", ignored))?;
        }

        Ok(())
    }

    /// One `user - PID: pid - address` line per connection.
    pub fn print_connections(&mut self, connections: &[Connection]) -> Result<()> {
        if connections.is_empty() {
            self.print_info("No active SSH connections")?;
            return Ok(());
        }

        for connection in connections {
            self.print_plain(&connection.to_string())?;
        }
        Ok(())
    }

    pub fn print_ignored_users(&mut self, users: &[String]) -> Result<()> {
        if users.is_empty() {
            self.print_info("No ignored users")?;
            return Ok(());
        }

        for user in users {
            self.print_plain(user)?;
        }
        Ok(())
    }

    pub fn print_shutdown_summary(&mut self, stats: &WatcherStats) -> Result<()> {
        self.print_info("Shutdown summary:")?;
        self.print_plain(&format!("  Logins: {}", stats.logins))?;
        self.print_plain(&format!("  Logouts: {}", stats.logouts))?;
        self.print_plain(&format!(
            "  Notifications sent: {}",
            stats.notifications_sent
        ))?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct WatcherStats {
    pub logins: usize,
    pub logouts: usize,
    pub notifications_sent: usize,
}

impl WatcherStats {
    pub fn record(&mut self, event: &SessionEvent) {
        match event.kind() {
            SessionKind::Login => self.logins += 1,
            SessionKind::Logout => self.logouts += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connection(pid: u32, username: &str) -> Connection {
        Connection {
            pid,
            username: username.to_string(),
            remote_address: "10.0.0.5".to_string(),
        }
    }

    #[test]
    fn test_print_event() {
        let mut highlighter = Highlighter::new(true);
        let result = highlighter.print_event(&SessionEvent::new("alice", SessionKind::Login));
        assert!(result.is_ok());
        let result = highlighter.print_event(&SessionEvent::new("alice", SessionKind::Logout));
        assert!(result.is_ok());
    }

    #[test]
    fn test_print_connections() {
        let mut highlighter = Highlighter::new(true);
        assert!(highlighter.print_connections(&[]).is_ok());
        assert!(highlighter
            .print_connections(&[connection(4821, "carol"), connection(5002, "dave")])
            .is_ok());
    }

    #[test]
    fn test_print_ignored_users() {
        let mut highlighter = Highlighter::new(true);
        assert!(highlighter.print_ignored_users(&[]).is_ok());
        assert!(highlighter
            .print_ignored_users(&["root".to_string()])
            .is_ok());
    }

    #[test]
    fn test_print_diagnostics() {
        let mut highlighter = Highlighter::new(true);
        assert!(highlighter.print_error("Log file '/x' not found").is_ok());
        assert!(highlighter.print_warning("Malformed settings").is_ok());
        assert!(highlighter.print_info("Watching /var/log/auth.log").is_ok());
    }

    #[test]
    fn test_stats_and_summary() {
        let mut stats = WatcherStats::default();
        stats.record(&SessionEvent::new("alice", SessionKind::Login));
        stats.record(&SessionEvent::new("alice", SessionKind::Logout));
        stats.record(&SessionEvent::new("bob", SessionKind::Login));
        assert_eq!(stats.logins, 2);
        assert_eq!(stats.logouts, 1);

        let mut highlighter = Highlighter::new(true);
        assert!(highlighter.print_shutdown_summary(&stats).is_ok());
    }
}
