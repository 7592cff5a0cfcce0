use std::io::Write;
use tracing::info;

/// Completion cue: terminal bell plus an optional notification line.
#[derive(Debug, Clone, Copy)]
pub struct CompletionAlert {
    pub chime: bool,
    pub notify: bool,
}

impl CompletionAlert {
    #[must_use]
    pub const fn silent() -> Self {
        Self {
            chime: false,
            notify: false,
        }
    }

    pub fn fire(&self, minutes: u32) {
        if self.chime {
            let mut out = std::io::stdout();
            let _ = out.write_all(b"\x07");
            let _ = out.flush();
        }
        if self.notify {
            info!(minutes, "Focus session complete");
            eprintln!("\nFocus session complete: {minutes} minute(s)");
        }
    }
}

impl From<&crate::config::TimerConfig> for CompletionAlert {
    fn from(config: &crate::config::TimerConfig) -> Self {
        Self {
            chime: config.chime,
            notify: config.notifications,
        }
    }
}
