use chrono::{DateTime, Local};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::bus::{self, Bus};
use crate::console::{ATTENUATION_MENU, CHANNEL_MENU, Console, FILTER_MENU, StdConsole};
use crate::error::CounterError;
use crate::journal::SentenceLog;
use crate::types::{Attenuation, Channel, FilterState, GpibAddress, Setting};

/// Query used to read the instrument identity at open.
pub const IDENTITY_QUERY: &str = "*IDN?";
/// Read issued after a frequency-function command.
pub const READ_COMMAND: &str = "ENTER";
/// Rendering of the session timestamp in the header.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Builder for [`Hp5385a`] sessions.
///
/// ```
/// use hp5385a::{GpibAddress, Hp5385aBuilder, MockBus, ScriptedConsole};
///
/// let bus = MockBus::new().with_reply("*IDN?", "HP5385A");
/// let counter = Hp5385aBuilder::new()
///     .address(GpibAddress::new(12)?)
///     .channel("A")
///     .console(ScriptedConsole::default())
///     .build(bus)?;
/// assert_eq!(counter.channel().code(), 1);
/// # Ok::<(), hp5385a::CounterError>(())
/// ```
pub struct Hp5385aBuilder<C: Console = StdConsole> {
    address: Option<GpibAddress>,
    channel: Option<Setting>,
    log_file: Option<PathBuf>,
    identity_query: String,
    console: C,
}

impl Default for Hp5385aBuilder<StdConsole> {
    fn default() -> Self {
        Self::new()
    }
}

impl Hp5385aBuilder<StdConsole> {
    pub fn new() -> Self {
        Self {
            address: None,
            channel: None,
            log_file: None,
            identity_query: IDENTITY_QUERY.to_string(),
            console: StdConsole,
        }
    }
}

impl<C: Console> Hp5385aBuilder<C> {
    pub fn address(mut self, address: GpibAddress) -> Self {
        self.address = Some(address);
        self
    }

    /// Channel to select at open. Without one, the operator is prompted.
    pub fn channel(mut self, channel: impl Into<Setting>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    pub fn maybe_channel(mut self, channel: Option<Setting>) -> Self {
        self.channel = channel;
        self
    }

    /// Append every status sentence to this file.
    pub fn log_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.log_file = Some(path.into());
        self
    }

    pub fn maybe_log_file(mut self, path: Option<PathBuf>) -> Self {
        self.log_file = path;
        self
    }

    pub fn identity_query(mut self, query: &str) -> Self {
        self.identity_query = query.to_string();
        self
    }

    /// Replace the operator console.
    pub fn console<C2: Console>(self, console: C2) -> Hp5385aBuilder<C2> {
        Hp5385aBuilder {
            address: self.address,
            channel: self.channel,
            log_file: self.log_file,
            identity_query: self.identity_query,
            console,
        }
    }

    /// Open a VISA session at the configured address and start the session.
    pub fn connect(self, timeout: Duration) -> Result<Hp5385a<Box<dyn Bus>, C>, CounterError> {
        let address = self.require_address()?;
        let bus = bus::open_visa(address, timeout)?;
        self.build(bus)
    }

    /// Start a session on an already opened bus.
    pub fn build<B: Bus>(self, mut bus: B) -> Result<Hp5385a<B, C>, CounterError> {
        let address = self.require_address()?;

        let name = bus.query(&self.identity_query)?.trim().to_string();
        let timestamp = Local::now();
        info!("Connected to '{name}' at {}", address.resource());

        let mut counter = Hp5385a {
            bus,
            console: self.console,
            address,
            name,
            timestamp,
            channel: Channel::A,
            log: self.log_file.map(SentenceLog::new),
            header: String::new(),
        };
        counter.select_channel(self.channel)?;
        Ok(counter)
    }

    fn require_address(&self) -> Result<GpibAddress, CounterError> {
        self.address.ok_or_else(|| {
            CounterError::InvalidArgument("GPIB address must be specified".to_string())
        })
    }
}

/// Session with one HP 5385A frequency counter.
///
/// Every operation writes a short command to the bus, shows a status sentence
/// prefixed by [`header_text`](Self::header_text) on the console, and appends
/// it to the log file when one was configured.
pub struct Hp5385a<B: Bus, C: Console = StdConsole> {
    bus: B,
    console: C,
    address: GpibAddress,
    name: String,
    timestamp: DateTime<Local>,
    channel: Channel,
    log: Option<SentenceLog>,
    header: String,
}

impl<B: Bus> Hp5385a<B, StdConsole> {
    /// Open a session on the terminal console.
    pub fn open(
        bus: B,
        address: GpibAddress,
        channel: Option<Setting>,
        log_file: Option<PathBuf>,
    ) -> Result<Self, CounterError> {
        Hp5385aBuilder::new()
            .address(address)
            .maybe_channel(channel)
            .maybe_log_file(log_file)
            .build(bus)
    }
}

impl<B: Bus, C: Console> Hp5385a<B, C> {
    pub fn address(&self) -> GpibAddress {
        self.address
    }

    /// Identity string reported by the instrument at open.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// Header prefixed to every status sentence.
    pub fn header_text(&self) -> &str {
        &self.header
    }

    pub fn log_path(&self) -> Option<&Path> {
        self.log.as_ref().map(SentenceLog::path)
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    /// Select the input channel, prompting when `requested` is `None`.
    pub fn select_channel(&mut self, requested: Option<Setting>) -> Result<Channel, CounterError> {
        let setting = self.resolve(requested, CHANNEL_MENU)?;
        let channel = Channel::try_from(&setting).inspect_err(|e| warn!("{e}"))?;

        self.channel = channel;
        self.header = format!(
            "Time: {}\nAddress: {}\nChannel: {}\n",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.address,
            channel.code()
        );

        self.report(&format!("The selected channel is: {}\n", channel.code()), false)?;
        Ok(channel)
    }

    /// Measure frequency on the selected channel.
    ///
    /// The reading is returned exactly as the instrument sent it.
    pub fn meas_freq(&mut self) -> Result<String, CounterError> {
        self.send(&format!("FU{}", self.channel.code()))?;
        let freq = self.bus.query(READ_COMMAND)?;
        debug!("Frequency reading: {freq}");

        self.report(&format!("The measured frequency is: {freq} Hz.\n"), false)?;
        Ok(freq)
    }

    /// Set input attenuation to 1 or 20, prompting when `requested` is `None`.
    pub fn set_attn(&mut self, requested: Option<Setting>) -> Result<Attenuation, CounterError> {
        let setting = match requested {
            Some(setting) => setting,
            None => self.prompt_number(ATTENUATION_MENU)?,
        };
        let attn = Attenuation::try_from(&setting).inspect_err(|e| warn!("{e}"))?;

        self.send(&format!("AT{}", attn.code()))?;
        self.report(&format!("Attenuation has been set to: {}\n", attn.level()), false)?;
        Ok(attn)
    }

    /// Switch the A-input 100 kHz low-pass filter, prompting when `requested` is `None`.
    pub fn set_filter(&mut self, requested: Option<Setting>) -> Result<FilterState, CounterError> {
        let setting = self.resolve(requested, FILTER_MENU)?;
        let state = FilterState::try_from(&setting).inspect_err(|e| warn!("{e}"))?;

        self.send(&format!("FI{}", state.code()))?;
        self.report(&format!("A-Input 100 kHz LPF is set to: {state}.\n"), false)?;
        Ok(state)
    }

    /// Return the instrument to its power-on state.
    ///
    /// The reset sentence is always appended to the log; without a log file
    /// this fails with [`CounterError::NoLogFile`] after the instrument was reset.
    pub fn reset(&mut self) -> Result<(), CounterError> {
        self.send("IN")?;
        info!("Instrument at {} reset", self.address.resource());
        self.report("Device has been reset.\n", true)
    }

    fn resolve(&mut self, requested: Option<Setting>, menu: &str) -> Result<Setting, CounterError> {
        match requested {
            Some(setting) => Ok(setting),
            None => Ok(Setting::Text(self.console.prompt(menu)?)),
        }
    }

    // Attenuation answers are read as integers, so " 20" and "020" are accepted.
    fn prompt_number(&mut self, menu: &str) -> Result<Setting, CounterError> {
        let answer = self.console.prompt(menu)?;
        answer.trim().parse::<i64>().map(Setting::Number).map_err(|_| {
            let e = CounterError::InvalidArgument(format!(
                "invalid attenuation '{answer}', expected an integer"
            ));
            warn!("{e}");
            e
        })
    }

    fn send(&mut self, command: &str) -> Result<(), CounterError> {
        debug!("{} <- {command}", self.address.resource());
        self.bus.write(command)
    }

    fn report(&mut self, sentence: &str, always_log: bool) -> Result<(), CounterError> {
        let text = format!("{}{sentence}", self.header);
        self.console.show(&text);

        match &self.log {
            Some(log) => log.append(&text),
            None if always_log => Err(CounterError::NoLogFile),
            None => Ok(()),
        }
    }
}
