use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use crate::error::CounterError;

pub const CHANNEL_MENU: &str = "Select a channel:\n1 - A\n2 - B\n";
pub const ATTENUATION_MENU: &str = "Enter an attenuation level:\n1 - 1\n2 - 20\n";
pub const FILTER_MENU: &str = "Turn A-Input 100kHz LPF:\n1 - OFF\n2 - ON\n";

/// Operator-facing side of the driver: status output and value prompts.
pub trait Console {
    /// Show `menu` and return the operator's answer without the line terminator.
    fn prompt(&mut self, menu: &str) -> Result<String, CounterError>;

    /// Show a status sentence.
    fn show(&mut self, text: &str);
}

/// Terminal console on stdin/stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdConsole;

impl Console for StdConsole {
    fn prompt(&mut self, menu: &str) -> Result<String, CounterError> {
        let mut stdout = io::stdout();
        write!(stdout, "{menu}").and_then(|_| stdout.flush()).map_err(|source| {
            CounterError::Io {
                source,
                context: "Writing prompt".to_string(),
            }
        })?;

        let mut line = String::new();
        io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|source| CounterError::Io {
                source,
                context: "Reading operator input".to_string(),
            })?;
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn show(&mut self, text: &str) {
        println!("{text}");
    }
}

/// Console with canned answers that records what it was shown.
#[derive(Debug, Default, Clone)]
pub struct ScriptedConsole {
    answers: VecDeque<String>,
    prompts: Vec<String>,
    shown: Vec<String>,
}

impl ScriptedConsole {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    pub fn shown(&self) -> &[String] {
        &self.shown
    }

    pub fn last_shown(&self) -> Option<&str> {
        self.shown.last().map(String::as_str)
    }
}

impl Console for ScriptedConsole {
    fn prompt(&mut self, menu: &str) -> Result<String, CounterError> {
        self.prompts.push(menu.to_string());
        self.answers.pop_front().ok_or_else(|| CounterError::Io {
            source: io::Error::new(io::ErrorKind::UnexpectedEof, "no scripted answer left"),
            context: "Reading operator input".to_string(),
        })
    }

    fn show(&mut self, text: &str) {
        self.shown.push(text.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_answers_in_order() {
        let mut console = ScriptedConsole::new(["1", "B"]);
        assert_eq!(console.prompt(CHANNEL_MENU).unwrap(), "1");
        assert_eq!(console.prompt(CHANNEL_MENU).unwrap(), "B");
        assert_eq!(console.prompts().len(), 2);
    }

    #[test]
    fn test_scripted_exhausted() {
        let mut console = ScriptedConsole::default();
        let result = console.prompt(FILTER_MENU);
        assert!(matches!(result, Err(CounterError::Io { .. })));
    }

    #[test]
    fn test_records_shown_text() {
        let mut console = ScriptedConsole::default();
        console.show("hello");
        assert_eq!(console.last_shown(), Some("hello"));
    }
}
