//! Rust controller for Delta X style robots that take G-code over a serial
//! line. The firmware acknowledges every line with `Ok` once it accepted it.
//!
//! # Usage
//! A [`Controller`] owns the serial link. The motion functions
//! ([`home`][Controller::home], [`move_z`][Controller::move_z],
//! [`move_xy`][Controller::move_xy], [`gcode`][Controller::gcode], ...) send
//! one line each and block until it is acknowledged. Set
//! [`ControllerConfig::ack_timeout`] to bound that wait, or abort it from
//! another thread through a [`CancelHandle`].
//!
//! Commands issued between [`begin_program`][Controller::begin_program] and
//! [`end_program`][Controller::end_program] are not sent but recorded into a
//! named [`Program`]. [`run_program`][Controller::run_program] selects a
//! program for replay, which then advances by one line per call of
//! [`tick`][Controller::tick], each line going out only after the previous
//! one was acknowledged. `tick` never blocks, so it fits into a main loop that
//! does other work.
//!
//! # Examples
//! ```no_run
//! # use delta_robot_controller::{probe, Controller, ControllerConfig};
//! use std::time::Duration;
//!
//! let config = ControllerConfig::default().with_ack_timeout(Duration::from_secs(30));
//! let port = probe::find_robot(&config).unwrap();
//! let mut robot = Controller::open(&port, config).unwrap();
//!
//! robot.home().unwrap();
//!
//! robot.begin_program("pick");
//! robot.move_z(-320.0).unwrap();
//! robot.move_xy(-100.0, 0.0).unwrap();
//! robot.move_z(-350.0).unwrap();
//! robot.move_z(-320.0).unwrap();
//! robot.end_program();
//!
//! robot.run_program("pick").unwrap();
//! while !robot.is_program_stopped("pick").unwrap() {
//!     robot.tick().unwrap();
//! }
//! ```
//!

mod cmd;
mod config;
mod controller;
mod parse;
pub mod probe;
pub(crate) mod util;

pub use cmd::{is_ack, Command};
pub use config::ControllerConfig;
pub use controller::{
    cancel::CancelHandle, program::Program, Controller, ControllerError, TickOutcome,
};
pub use parse::{parse_position, Position};
