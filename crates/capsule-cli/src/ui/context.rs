//! UI context for environment detection.

use std::io::IsTerminal;

use super::mode::OutputMode;

/// Terminal and environment context for UI decisions.
#[derive(Debug, Clone)]
pub struct UiContext {
    /// Whether color output is enabled
    pub color: bool,
    /// Whether unicode symbols are enabled
    pub unicode: bool,
    /// Resolved output mode
    pub mode: OutputMode,
    /// Suppress informational output
    pub quiet: bool,
}

impl UiContext {
    /// Create context from the environment and CLI flags.
    pub fn from_env(json_flag: bool, quiet: bool) -> Self {
        let is_tty = std::io::stdout().is_terminal();
        let term_is_dumb = std::env::var("TERM").map(|v| v == "dumb").unwrap_or(false);
        let no_color_env = std::env::var("NO_COLOR").is_ok();

        let mode = OutputMode::resolve(json_flag, is_tty, term_is_dumb);

        Self {
            color: is_tty && !no_color_env && !term_is_dumb,
            unicode: mode.is_pretty(),
            mode,
            quiet,
        }
    }

    /// Whether interactive prompts are possible.
    pub fn is_interactive(&self) -> bool {
        std::io::stdin().is_terminal() && std::io::stderr().is_terminal()
    }

    /// Print an informational line unless quiet or in JSON mode.
    pub fn say(&self, message: &str) {
        if !self.quiet && !self.mode.is_json() {
            println!("{}", message);
        }
    }
}

#[cfg(test)]
impl UiContext {
    pub fn plain() -> Self {
        Self {
            color: false,
            unicode: false,
            mode: OutputMode::Plain,
            quiet: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_mode_from_flag() {
        let ctx = UiContext::from_env(true, false);
        assert_eq!(ctx.mode, OutputMode::Json);
    }

    #[test]
    fn test_quiet_is_kept() {
        assert!(UiContext::from_env(false, true).quiet);
    }
}
