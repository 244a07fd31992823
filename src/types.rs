use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CounterError;

/// Highest primary address allowed on a GPIB bus.
pub const MAX_PRIMARY_ADDRESS: u8 = 30;

/// Raw value supplied by a caller or typed at a prompt.
///
/// Channel, attenuation and filter selections accept both numbers and
/// strings (`1`, `"1"`, `"A"`, ...). Each typed setting parses a `Setting`
/// through its `TryFrom<&Setting>` impl.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Setting {
    Number(i64),
    Text(String),
}

impl fmt::Display for Setting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Setting::Number(n) => write!(f, "{n}"),
            Setting::Text(s) => write!(f, "'{s}'"),
        }
    }
}

impl From<i64> for Setting {
    fn from(value: i64) -> Self {
        Setting::Number(value)
    }
}

impl From<i32> for Setting {
    fn from(value: i32) -> Self {
        Setting::Number(value.into())
    }
}

impl From<u8> for Setting {
    fn from(value: u8) -> Self {
        Setting::Number(value.into())
    }
}

impl From<&str> for Setting {
    fn from(value: &str) -> Self {
        Setting::Text(value.to_string())
    }
}

impl From<String> for Setting {
    fn from(value: String) -> Self {
        Setting::Text(value)
    }
}

/// Counter input channel. The discriminant is the code sent with `FU`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    A = 1,
    B = 3,
}

impl Channel {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            Channel::A => "A",
            Channel::B => "B",
        }
    }
}

impl TryFrom<&Setting> for Channel {
    type Error = CounterError;

    fn try_from(setting: &Setting) -> Result<Self, Self::Error> {
        match setting {
            Setting::Number(1) => Ok(Channel::A),
            Setting::Number(2 | 3) => Ok(Channel::B),
            Setting::Text(s) => match s.as_str() {
                "1" | "A" => Ok(Channel::A),
                "2" | "3" | "B" => Ok(Channel::B),
                _ => Err(invalid("channel", setting, "1, '1', 'A', 2, '2', 3, '3' or 'B'")),
            },
            _ => Err(invalid("channel", setting, "1, '1', 'A', 2, '2', 3, '3' or 'B'")),
        }
    }
}

/// Input attenuation applied before the counter front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Attenuation {
    X1,
    X20,
}

impl Attenuation {
    /// Attenuation factor as reported to the user.
    pub fn level(self) -> u8 {
        match self {
            Attenuation::X1 => 1,
            Attenuation::X20 => 20,
        }
    }

    /// Code sent with the `AT` command.
    pub fn code(self) -> u8 {
        match self {
            Attenuation::X1 => 0,
            Attenuation::X20 => 1,
        }
    }
}

impl TryFrom<&Setting> for Attenuation {
    type Error = CounterError;

    fn try_from(setting: &Setting) -> Result<Self, Self::Error> {
        const EXPECTED: &str = "1, '1', 2, '2', 20 or '20'";
        match setting {
            Setting::Number(1) => Ok(Attenuation::X1),
            Setting::Number(2 | 20) => Ok(Attenuation::X20),
            Setting::Text(s) => match s.as_str() {
                "1" => Ok(Attenuation::X1),
                "2" | "20" => Ok(Attenuation::X20),
                _ => Err(invalid("attenuation", setting, EXPECTED)),
            },
            _ => Err(invalid("attenuation", setting, EXPECTED)),
        }
    }
}

/// State of the 100 kHz low-pass filter on input A.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterState {
    Off,
    On,
}

impl FilterState {
    /// Code sent with the `FI` command.
    pub fn code(self) -> u8 {
        match self {
            FilterState::Off => 0,
            FilterState::On => 1,
        }
    }
}

impl fmt::Display for FilterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterState::Off => write!(f, "OFF"),
            FilterState::On => write!(f, "ON"),
        }
    }
}

impl TryFrom<&Setting> for FilterState {
    type Error = CounterError;

    fn try_from(setting: &Setting) -> Result<Self, Self::Error> {
        const EXPECTED: &str = "1, '1', 'off', 'Off', 'OFF', 2, '2', 'on', 'On' or 'ON'";
        match setting {
            Setting::Number(1) => Ok(FilterState::Off),
            Setting::Number(2) => Ok(FilterState::On),
            Setting::Text(s) => match s.as_str() {
                "1" | "off" | "Off" | "OFF" => Ok(FilterState::Off),
                "2" | "on" | "On" | "ON" => Ok(FilterState::On),
                _ => Err(invalid("filter state", setting, EXPECTED)),
            },
            _ => Err(invalid("filter state", setting, EXPECTED)),
        }
    }
}

fn invalid(what: &str, setting: &Setting, expected: &str) -> CounterError {
    CounterError::InvalidArgument(format!(
        "invalid {what} {setting}, expected one of {expected}"
    ))
}

/// Location of an instrument on a GPIB board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GpibAddress {
    pub board: u8,
    pub primary: u8,
}

impl GpibAddress {
    /// Address on board 0.
    pub fn new(primary: u8) -> Result<Self, CounterError> {
        Self::on_board(0, primary)
    }

    pub fn on_board(board: u8, primary: u8) -> Result<Self, CounterError> {
        if primary > MAX_PRIMARY_ADDRESS {
            return Err(CounterError::InvalidArgument(format!(
                "GPIB primary address {primary} out of range 0..={MAX_PRIMARY_ADDRESS}"
            )));
        }
        Ok(Self { board, primary })
    }

    /// VISA resource string, e.g. `GPIB0::12::INSTR`.
    pub fn resource(&self) -> String {
        format!("GPIB{}::{}::INSTR", self.board, self.primary)
    }
}

// The session header shows only the primary address.
impl fmt::Display for GpibAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.primary)
    }
}
