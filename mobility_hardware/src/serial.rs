//! Serial-port byte source for the real sensor box.

use std::io::{ErrorKind, Read};
use std::time::Duration;

use mobility_traits::ByteSource;
use serialport::SerialPort;

use crate::error::{HwError, Result};

pub struct SerialSource {
    port: Box<dyn SerialPort>,
    timeout: Duration,
}

impl SerialSource {
    pub fn open(path: &str, baud_rate: u32, timeout: Duration) -> Result<Self> {
        let port = serialport::new(path, baud_rate)
            .timeout(timeout)
            .open()
            .map_err(|e| HwError::Serial(format!("open {path}: {e}")))?;
        tracing::info!(port = path, baud_rate, "serial port opened");
        Ok(Self { port, timeout })
    }
}

impl ByteSource for SerialSource {
    fn read(
        &mut self,
        buf: &mut [u8],
        timeout: Duration,
    ) -> std::result::Result<usize, Box<dyn std::error::Error + Send + Sync>> {
        if timeout != self.timeout {
            self.port
                .set_timeout(timeout)
                .map_err(|e| HwError::Serial(e.to_string()))?;
            self.timeout = timeout;
        }
        match self.port.read(buf) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == ErrorKind::TimedOut => Ok(0),
            Err(e) => Err(Box::new(HwError::Io(e))),
        }
    }
}

/// Names of the serial ports the OS currently reports.
pub fn list_ports() -> Result<Vec<String>> {
    let ports = serialport::available_ports().map_err(|e| HwError::Serial(e.to_string()))?;
    Ok(ports.into_iter().map(|p| p.port_name).collect())
}
