pub mod bus;
pub mod console;
pub mod driver;
pub mod error;
pub mod journal;
pub mod types;

pub use bus::{Bus, MockBus};
#[cfg(feature = "visa")]
pub use bus::VisaBus;
pub use console::{Console, ScriptedConsole, StdConsole};
pub use driver::{Hp5385a, Hp5385aBuilder, IDENTITY_QUERY, READ_COMMAND};
pub use error::CounterError;
pub use journal::SentenceLog;
pub use types::{Attenuation, Channel, FilterState, GpibAddress, Setting};
