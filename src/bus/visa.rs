use log::{debug, info};
use std::ffi::CString;
use std::io::{BufRead, BufReader, Write};
use std::time::Duration;
use visa_rs::prelude::*;

use super::Bus;
use crate::error::CounterError;
use crate::types::GpibAddress;

/// GPIB session opened through the system VISA library.
pub struct VisaBus {
    // Declared before the resource manager so it is closed first.
    instr: Instrument,
    _rm: DefaultRM,
    resource: String,
}

impl VisaBus {
    pub fn open(address: GpibAddress, timeout: Duration) -> Result<Self, CounterError> {
        let resource = address.resource();
        let connection_error = |e: visa_rs::Error| CounterError::Connection {
            resource: resource.clone(),
            message: e.to_string(),
        };

        let rm = DefaultRM::new().map_err(connection_error)?;
        let res_name = CString::new(resource.clone()).map_err(|_| {
            CounterError::InvalidArgument(format!("resource name '{resource}' contains NUL"))
        })?;

        debug!("Opening VISA resource {resource}");
        let instr = rm
            .open(&res_name.into(), AccessMode::NO_LOCK, timeout)
            .map_err(connection_error)?;
        info!("Opened VISA resource {resource}");

        Ok(Self {
            instr,
            _rm: rm,
            resource,
        })
    }

    fn bus_error(command: &str, e: std::io::Error) -> CounterError {
        CounterError::Bus {
            command: command.to_string(),
            message: e.to_string(),
        }
    }
}

impl Bus for VisaBus {
    fn write(&mut self, command: &str) -> Result<(), CounterError> {
        debug!("{} <- {command}", self.resource);
        self.instr
            .write_all(format!("{command}\n").as_bytes())
            .map_err(|e| Self::bus_error(command, e))
    }

    fn query(&mut self, command: &str) -> Result<String, CounterError> {
        self.write(command)?;
        // Replies are single lines; anything buffered past the newline is discarded.
        let mut reply = String::new();
        BufReader::new(&self.instr)
            .read_line(&mut reply)
            .map_err(|e| Self::bus_error(command, e))?;
        let reply = reply.trim_end_matches(['\r', '\n']).to_string();
        debug!("{} -> {reply}", self.resource);
        Ok(reply)
    }
}
