use std::io::{self, Write};

use crate::session::{Notice, Prompter};

/// Confirmations on stdin, alerts on stderr
pub struct TerminalPrompter {
    assume_yes: bool,
}

impl TerminalPrompter {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

impl Prompter for TerminalPrompter {
    fn confirm(&mut self, question: &str) -> bool {
        if self.assume_yes {
            return true;
        }

        eprint!("{} [y/N] ", question);
        let _ = io::stderr().flush();

        let mut input = String::new();
        match io::stdin().read_line(&mut input) {
            Ok(_) => input.trim().eq_ignore_ascii_case("y"),
            Err(e) => {
                tracing::warn!(error = %e, "could not read confirmation");
                false
            }
        }
    }

    fn alert(&mut self, notice: &Notice) {
        match notice {
            Notice::StorageRecovered { .. } | Notice::StorageUnavailable { .. } => {
                eprintln!("Warning: {}", notice)
            }
            _ => eprintln!("{}", notice),
        }
    }
}
