//! Finding the robot among the serial ports of the host
//!
//! The firmware answers the identification line `IsDelta` with `YesDelta`,
//! which is enough to tell it apart from whatever else is plugged in.


use crate::{
    cmd::{map::TERMINATOR, Command},
    config::ControllerConfig,
    controller::ControllerError,
    parse::is_identify_reply,
    util::is_idle,
};
use log::debug;
use serialport::{ClearBuffer, SerialPort};
use std::{
    io::{Read, Write},
    thread,
    time::Duration,
};

// boards reset when the port is opened and need a moment before they listen
const SETTLE: Duration = Duration::from_millis(300);

/// Sends the identification line and checks the reply
///
/// Reads a single line, byte by byte so nothing after it is consumed. The
/// read ends at `'\n'` or when `interface` reports that nothing arrived, so
/// its own timeout bounds how long this takes.
///
/// # Errors
/// [`ControllerError::TransportError`] on any I/O error other than a timeout.
pub fn identify<I: Read + Write>(interface: &mut I) -> Result<bool, ControllerError> {
    write!(interface, "{}{}", Command::Identify, TERMINATOR)?;
    interface.flush()?;
    let mut raw = Vec::with_capacity(16);
    for byte in (&mut *interface).bytes() {
        match byte {
            Ok(b'\n') => break,
            Ok(b) => raw.push(b),
            Err(e) if is_idle(&e) => break,
            Err(e) => return Err(e.into()),
        }
    }
    let line = String::from_utf8_lossy(&raw);
    debug!("identification reply {:?}", line);
    Ok(is_identify_reply(&line))
}

/// Returns the name of the first serial port the robot answers on
///
/// Every port is opened with [`ControllerConfig::baud_rate`] and
/// [`ControllerConfig::probe_timeout`]. Ports that can't be opened are
/// skipped.
///
/// # Errors
/// * [`ControllerError::RobotNotFound`] if no port answered
/// * [`ControllerError::SerialPortError`] if the ports can't be listed
///
/// # Examples
/// ```no_run
/// # use delta_robot_controller::{probe, Controller, ControllerConfig};
/// let config = ControllerConfig::default();
/// let port = probe::find_robot(&config).unwrap();
/// let mut controller = Controller::open(&port, config).unwrap();
/// ```
pub fn find_robot(config: &ControllerConfig) -> Result<String, ControllerError> {
    for info in serialport::available_ports()? {
        let name = info.port_name;
        let mut port = match serialport::new(name.as_str(), config.baud_rate)
            .timeout(config.probe_timeout)
            .open()
        {
            Ok(p) => p,
            Err(e) => {
                debug!("skipping {}: {}", name, e);
                continue;
            }
        };
        thread::sleep(SETTLE);
        if let Err(e) = port.clear(ClearBuffer::Input) {
            debug!("skipping {}: {}", name, e);
            continue;
        }
        match identify(&mut port) {
            Ok(true) => {
                debug!("robot found on {}", name);
                return Ok(name);
            }
            Ok(false) => debug!("{} didn't identify as the robot", name),
            Err(e) => debug!("skipping {}: {}", name, e),
        }
    }
    Err(ControllerError::RobotNotFound)
}
