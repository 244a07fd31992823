use log::debug;
use std::collections::{HashMap, HashSet};

use super::Bus;
use crate::error::CounterError;

/// One command seen by a [`MockBus`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusCall {
    Write(String),
    Query(String),
}

impl BusCall {
    pub fn command(&self) -> &str {
        match self {
            BusCall::Write(c) | BusCall::Query(c) => c,
        }
    }
}

/// In-memory bus that records traffic and answers from a reply table.
///
/// ```
/// use hp5385a::bus::{Bus, MockBus};
///
/// let mut bus = MockBus::new().with_reply("ENTER", "1.0E+07");
/// bus.write("FU1")?;
/// assert_eq!(bus.query("ENTER")?, "1.0E+07");
/// assert_eq!(bus.writes(), vec!["FU1"]);
/// # Ok::<(), hp5385a::CounterError>(())
/// ```
#[derive(Debug, Default, Clone)]
pub struct MockBus {
    calls: Vec<BusCall>,
    replies: HashMap<String, String>,
    default_reply: Option<String>,
    failing: HashSet<String>,
}

impl MockBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `command` with `reply`.
    pub fn with_reply(mut self, command: &str, reply: &str) -> Self {
        self.replies.insert(command.to_string(), reply.to_string());
        self
    }

    /// Reply used for queries with no entry in the table.
    pub fn with_default_reply(mut self, reply: &str) -> Self {
        self.default_reply = Some(reply.to_string());
        self
    }

    /// Make every write or query of `command` fail.
    pub fn fail_on(mut self, command: &str) -> Self {
        self.failing.insert(command.to_string());
        self
    }

    pub fn calls(&self) -> &[BusCall] {
        &self.calls
    }

    /// Commands sent with [`Bus::write`], in order.
    pub fn writes(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                BusCall::Write(cmd) => Some(cmd.as_str()),
                BusCall::Query(_) => None,
            })
            .collect()
    }

    fn check(&self, command: &str) -> Result<(), CounterError> {
        if self.failing.contains(command) {
            return Err(CounterError::Bus {
                command: command.to_string(),
                message: "simulated bus failure".to_string(),
            });
        }
        Ok(())
    }
}

impl Bus for MockBus {
    fn write(&mut self, command: &str) -> Result<(), CounterError> {
        debug!("mock write: {command}");
        self.calls.push(BusCall::Write(command.to_string()));
        self.check(command)
    }

    fn query(&mut self, command: &str) -> Result<String, CounterError> {
        debug!("mock query: {command}");
        self.calls.push(BusCall::Query(command.to_string()));
        self.check(command)?;
        self.replies
            .get(command)
            .or(self.default_reply.as_ref())
            .cloned()
            .ok_or_else(|| CounterError::Bus {
                command: command.to_string(),
                message: "no reply scripted".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_calls_in_order() {
        let mut bus = MockBus::new().with_default_reply("x");
        bus.write("AT0").unwrap();
        bus.query("ENTER").unwrap();
        bus.write("IN").unwrap();
        assert_eq!(
            bus.calls(),
            &[
                BusCall::Write("AT0".into()),
                BusCall::Query("ENTER".into()),
                BusCall::Write("IN".into()),
            ]
        );
        assert_eq!(bus.writes(), vec!["AT0", "IN"]);
    }

    #[test]
    fn test_unscripted_query_fails() {
        let mut bus = MockBus::new();
        assert!(matches!(bus.query("*IDN?"), Err(CounterError::Bus { .. })));
    }

    #[test]
    fn test_fail_on() {
        let mut bus = MockBus::new().fail_on("IN");
        assert!(bus.write("IN").is_err());
        assert!(bus.write("AT1").is_ok());
        assert_eq!(bus.calls()[0].command(), "IN");
    }
}
