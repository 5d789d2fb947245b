use crate::log_util::log_debug;
use std::{
    fmt,
    io::{self, Write},
};

/// Page id of the grammar section in the shell.
pub const GRAMMAR_SECTION: &str = "grammar";
/// Page id of the settings section in the shell.
pub const CONFIG_SECTION: &str = "config";

/// Optional capabilities offered by the host shell. Every method defaults to a no-op.
pub trait HostSignals: fmt::Debug {
    /// Non-fatal warning, e.g. advancing a quiz without an answer.
    fn warning_feedback(&mut self) {}

    /// Hide the host's main action control. Issued once per leaf entry.
    fn hide_main_button(&mut self) {}
}

/// Terminal host: rings the bell for warnings when enabled.
#[derive(Debug)]
pub struct TerminalSignals {
    bell: bool,
}

impl TerminalSignals {
    pub fn new(bell: bool) -> Self {
        Self { bell }
    }
}

impl HostSignals for TerminalSignals {
    fn warning_feedback(&mut self) {
        if !self.bell {
            return;
        }
        let mut stdout = io::stdout();
        if let Err(err) = stdout.write_all(b"\x07").and_then(|_| stdout.flush()) {
            log_debug(&format!("Host: failed to ring bell: {}", err));
        }
    }

    fn hide_main_button(&mut self) {
        log_debug("Host: main control hidden for leaf");
    }
}
