mod config;

use clap::{Parser, Subcommand};
use env_logger::Env;
use hp5385a::{Bus, Hp5385a, Hp5385aBuilder, MockBus, READ_COMMAND, Setting};
use hp5385a::types::GpibAddress;
use log::{error, info, LevelFilter};
use std::path::PathBuf;
use std::time::Duration;

use crate::config::{load_config, AppConfig};

/// HP 5385A frequency counter control
#[derive(Parser, Debug)]
#[command(name = "hp5385a")]
#[command(about = "Control an HP 5385A frequency counter over GPIB", long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error)
    #[arg(short, long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// GPIB primary address of the counter
    #[arg(short, long)]
    address: Option<u8>,

    /// GPIB board index
    #[arg(short, long)]
    board: Option<u8>,

    /// Input channel (1, A, 2, 3, B); prompted for when omitted
    #[arg(long)]
    channel: Option<String>,

    /// Append status sentences to this file
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Run against a simulated counter instead of a VISA session
    #[arg(long)]
    simulate: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the instrument identity and session header
    Info,
    /// Measure frequency on the selected channel
    Measure,
    /// Set input attenuation (1 or 20)
    Attn { level: Option<String> },
    /// Switch the A-input 100 kHz low-pass filter (on/off)
    Filter { state: Option<String> },
    /// Reset the counter to its power-on state
    Reset,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    let log_level = args
        .log_level
        .clone()
        .unwrap_or(config.console.verbosity.clone());
    initialize_logging(&log_level);

    let mut counter = open_counter(&args, &config)?;
    info!(
        "Session opened with '{}' on channel {}",
        counter.name(),
        counter.channel().label()
    );

    let result = match args.command {
        Command::Info => {
            println!("Instrument: {}", counter.name());
            print!("{}", counter.header_text());
            Ok(())
        }
        Command::Measure => counter.meas_freq().map(|_| ()),
        Command::Attn { level } => counter.set_attn(level.map(Setting::from)).map(|_| ()),
        Command::Filter { state } => counter.set_filter(state.map(Setting::from)).map(|_| ()),
        Command::Reset => counter.reset(),
    };

    if let Err(e) = &result {
        error!("{e}");
    }
    Ok(result?)
}

/// Build the counter session from CLI arguments layered over the configuration
fn open_counter(
    args: &Args,
    config: &AppConfig,
) -> Result<Hp5385a<Box<dyn Bus>>, Box<dyn std::error::Error>> {
    let instrument = &config.instrument;
    let address = GpibAddress::on_board(
        args.board.unwrap_or(instrument.board),
        args.address.unwrap_or(instrument.address),
    )?;

    let channel = args
        .channel
        .clone()
        .map(Setting::from)
        .or_else(|| instrument.channel.clone());
    let log_file = args
        .log_file
        .clone()
        .or_else(|| config.logging.sentence_log.as_ref().map(PathBuf::from));

    let builder = Hp5385aBuilder::new()
        .address(address)
        .maybe_channel(channel)
        .maybe_log_file(log_file)
        .identity_query(&instrument.identity_query);

    let counter = if args.simulate {
        info!("Using simulated counter at {}", address.resource());
        let bus = MockBus::new()
            .with_reply(&instrument.identity_query, "HP5385A (simulated)")
            .with_reply(READ_COMMAND, "+0010.000000E+06");
        builder.build(Box::new(bus) as Box<dyn Bus>)?
    } else {
        builder.connect(Duration::from_millis(instrument.timeout_ms))?
    };

    Ok(counter)
}

/// Map a verbosity name to a level filter, falling back to info
fn parse_level(log_level: &str) -> LevelFilter {
    log_level.trim().parse().unwrap_or_else(|_| {
        eprintln!("Warning: unknown log level '{log_level}', using 'info'");
        LevelFilter::Info
    })
}

fn initialize_logging(log_level: &str) {
    env_logger::Builder::from_env(Env::default())
        .filter_level(parse_level(log_level))
        .format_timestamp_millis()
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug"), LevelFilter::Debug);
        assert_eq!(parse_level("WARN"), LevelFilter::Warn);
        assert_eq!(parse_level("off"), LevelFilter::Off);
        assert_eq!(parse_level("chatty"), LevelFilter::Info);
    }

    #[test]
    fn test_args_parse_subcommand() {
        let args = Args::try_parse_from(["hp5385a", "--simulate", "--channel", "B", "attn", "20"])
            .unwrap();
        assert!(args.simulate);
        assert_eq!(args.channel.as_deref(), Some("B"));
        assert!(matches!(args.command, Command::Attn { level: Some(ref l) } if l == "20"));
    }
}
