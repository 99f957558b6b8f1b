
mod ack;
pub mod cancel;
pub mod program;

use self::{
    ack::{AckTracker, Received},
    cancel::CancelHandle,
    program::{Program, ProgramStore, Step},
};
use crate::{
    cmd::{map::TERMINATOR, Command},
    config::ControllerConfig,
    parse::{parse_position, Position},
    util::{ensure, is_idle},
};
use log::{debug, info, trace, warn};
use serialport::SerialPort;
use std::{
    fmt::Debug,
    io::{self, Read, Write},
    time::{Duration, Instant},
};
use thiserror::Error;

/// Errors returned by the controller
#[derive(Error, Debug)]
pub enum ControllerError {
    /// Thrown by lookups by name if no program carries that name
    #[error("program not found: {0}")]
    ProgramNotFound(String),
    /// Thrown if a line should be recorded but no program is selected
    #[error("no program selected")]
    NoProgramSelected,
    /// Thrown if the firmware didn't acknowledge within
    /// [`ControllerConfig::ack_timeout`]
    #[error("no acknowledgement within {0:?}")]
    AcknowledgementTimeout(Duration),
    /// Thrown by a blocking wait that was aborted through a [`CancelHandle`]
    #[error("wait was cancelled")]
    Cancelled,
    /// Thrown by operations that need a live link while a program is being
    /// authored
    #[error("not available while authoring a program")]
    Authoring,
    /// Thrown by [`find_robot`][crate::probe::find_robot] if no port answered
    /// the identification
    #[error("no robot answered on any serial port")]
    RobotNotFound,
    /// Thrown if writing a line failed after part of it already went out.
    /// The line counts as sent, the firmware most likely got a garbled command.
    #[error("line only partially sent ({sent} bytes): {source}")]
    PartialWrite {
        sent: usize,
        #[source]
        source: io::Error,
    },
    /// Wrapper around [`io::Error`]
    #[error(transparent)]
    TransportError(#[from] io::Error),
    /// Wrapper around [`serialport::Error`]
    #[error(transparent)]
    SerialPortError(#[from] serialport::Error),
}

/// Result of a single [`Controller::tick`]
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum TickOutcome {
    /// Nothing was sent
    Idle,
    /// The next line of the selected program was sent
    Sent(String),
    /// The selected program ran out of lines and was stopped
    Finished(String),
}

type LineObserver = Box<dyn FnMut(&str) + Send>;

//

/// Talks G-code to the robot firmware and records and replays programs
///
/// `I` is the byte transport, usually a serial port (see [`Controller::open`]).
/// Reads on it are expected to time out or return [`io::ErrorKind::WouldBlock`]
/// when nothing arrived, every poll reads at most one byte.
///
/// The controller is in one of two modes. Normally every command is sent and
/// the call blocks until the firmware answers with `Ok`. Between
/// [`begin_program`][Controller::begin_program] and
/// [`end_program`][Controller::end_program] commands are appended to the
/// program under construction instead and nothing goes out on the link.
///
/// Replay is cooperative: [`tick`][Controller::tick] has to be called from the
/// caller's main loop and sends at most one line of the selected program per
/// call, each only after the previous one was acknowledged.
pub struct Controller<I: Read + Write> {
    interface: I,
    config: ControllerConfig,
    tracker: AckTracker,
    store: ProgramStore,
    authoring: bool,
    ready: bool,
    last_position: Option<Position>,
    observer: Option<LineObserver>,
    cancel: CancelHandle,
}

impl Controller<Box<dyn SerialPort>> {
    /// Opens the serial port at `path` and returns a controller on it. The
    /// port uses [`ControllerConfig::baud_rate`] and
    /// [`ControllerConfig::read_timeout`].
    ///
    /// # Errors
    /// [`ControllerError::SerialPortError`] if the port can't be opened, plus
    /// everything [`Controller::new`] returns.
    ///
    /// # Examples
    /// ```no_run
    /// # use delta_robot_controller::{Controller, ControllerConfig};
    /// let mut controller = Controller::open("/dev/ttyUSB0", ControllerConfig::default()).unwrap();
    /// controller.home().unwrap();
    /// controller.move_xy(100.0, -100.0).unwrap();
    /// ```
    pub fn open(path: &str, config: ControllerConfig) -> Result<Self, ControllerError> {
        let port = serialport::new(path, config.baud_rate)
            .timeout(config.read_timeout)
            .open()?;
        Self::new(port, config)
    }
}

impl<I: Read + Write> Controller<I> {
    /// Returns a new controller on `interface`. If
    /// [`ControllerConfig::handshake`] is set the identification line is sent
    /// right away.
    ///
    /// # Errors
    /// [`ControllerError::TransportError`] if the handshake can't be written.
    pub fn new(interface: I, config: ControllerConfig) -> Result<Self, ControllerError> {
        let handshake = config.handshake;
        let mut controller = Controller {
            interface,
            config,
            tracker: AckTracker::default(),
            store: ProgramStore::default(),
            authoring: false,
            ready: true,
            last_position: None,
            observer: None,
            cancel: CancelHandle::default(),
        };
        if handshake {
            controller.handshake()?;
        }
        Ok(controller)
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn interface(&self) -> &I {
        &self.interface
    }

    /// Gives back the transport
    pub fn into_inner(self) -> I {
        self.interface
    }

    //

    /// Sends `G28` and waits for the acknowledgement
    pub fn home(&mut self) -> Result<(), ControllerError> {
        self.dispatch(Command::Home)
    }

    /// Sends `G01 Z<z>` and waits for the acknowledgement
    pub fn move_z(&mut self, z: f32) -> Result<(), ControllerError> {
        self.dispatch(Command::MoveZ(z))
    }

    /// Sends `G01 X<x> Y<y>` and waits for the acknowledgement
    pub fn move_xy(&mut self, x: f32, y: f32) -> Result<(), ControllerError> {
        self.dispatch(Command::MoveXY(x, y))
    }

    /// Sends `gcode` verbatim and waits for the acknowledgement
    ///
    /// # Examples
    /// ```no_run
    /// # use delta_robot_controller::{Controller, ControllerConfig};
    /// let mut controller = Controller::open("/dev/ttyUSB0", ControllerConfig::default()).unwrap();
    /// controller.gcode("G01 X-100 Y-100 Z-320").unwrap();
    /// ```
    pub fn gcode(&mut self, gcode: &str) -> Result<(), ControllerError> {
        self.dispatch(Command::from(gcode))
    }

    /// Sends `G01 F<feedrate>` and waits for the acknowledgement
    pub fn set_feedrate(&mut self, feedrate: u32) -> Result<(), ControllerError> {
        self.dispatch(Command::Feedrate(feedrate))
    }

    /// Sends `M204 A<acceleration>` and waits for the acknowledgement
    pub fn set_acceleration(&mut self, acceleration: u32) -> Result<(), ControllerError> {
        self.dispatch(Command::Acceleration(acceleration))
    }

    /// Sends any [`Command`] the way the motion functions above do
    ///
    /// While authoring the line is appended to the selected program and the
    /// function returns right away. Otherwise it is sent and the call blocks
    /// in [`wait_ok`][Controller::wait_ok].
    ///
    /// # Errors
    /// * [`ControllerError::NoProgramSelected`] while authoring without a
    /// selected program
    /// * [`ControllerError::TransportError`] if writing or reading fails
    /// * [`ControllerError::AcknowledgementTimeout`] and
    /// [`ControllerError::Cancelled`] from the wait
    pub fn dispatch(&mut self, command: Command) -> Result<(), ControllerError> {
        let line = command.to_string();
        if self.authoring {
            let program = self
                .store
                .selected_mut()
                .ok_or(ControllerError::NoProgramSelected)?;
            program.append(&line);
            debug!("recorded {:?} into program {}", line, program.name());
            return Ok(());
        }
        self.transmit(&line)?;
        self.wait_ok()
    }

    /// Sends the identification line `IsDelta` twice
    ///
    /// Does not touch the ready flag, the firmware answers this with its own
    /// reply rather than an acknowledgement.
    pub fn handshake(&mut self) -> Result<(), ControllerError> {
        ensure!(!self.authoring, ControllerError::Authoring);
        let line = Command::Identify.to_string();
        self.write_line(&line)?;
        self.write_line(&line)
    }

    /// Asks the firmware for the effector position and waits for the report
    ///
    /// The report counts as the acknowledgement of the query. Other lines,
    /// including stray acknowledgements, are handled as usual while waiting.
    ///
    /// # Errors
    /// [`ControllerError::Authoring`] while authoring, otherwise the same as
    /// [`wait_ok`][Controller::wait_ok].
    pub fn query_position(&mut self) -> Result<Position, ControllerError> {
        ensure!(!self.authoring, ControllerError::Authoring);
        self.transmit(&Command::Position.to_string())?;
        let position = self.wait_for(|r| match r {
            Received::Line(line) => parse_position(line),
            _ => None,
        })?;
        self.ready = true;
        Ok(position)
    }

    /// Last position report seen on the link, if any
    pub fn last_position(&self) -> Option<Position> {
        self.last_position
    }

    //

    /// Reads at most one byte from the transport
    ///
    /// Returns `true` if that byte completed an acknowledgement, which also
    /// marks the controller ready. Lines that aren't acknowledgements are
    /// dropped, after being passed to the observer set with
    /// [`set_line_observer`][Controller::set_line_observer].
    pub fn poll_transport(&mut self) -> Result<bool, ControllerError> {
        Ok(self.receive()? == Received::Ack)
    }

    /// Blocks until the firmware acknowledges the last line
    ///
    /// Returns immediately while authoring. Without
    /// [`ControllerConfig::ack_timeout`] this waits as long as it takes.
    ///
    /// # Errors
    /// * [`ControllerError::AcknowledgementTimeout`] once the configured
    /// timeout passed
    /// * [`ControllerError::Cancelled`] if the [`CancelHandle`] fired
    /// * [`ControllerError::TransportError`] if reading fails
    pub fn wait_ok(&mut self) -> Result<(), ControllerError> {
        if self.authoring {
            return Ok(());
        }
        self.wait_for(|r| (*r == Received::Ack).then_some(()))
    }

    /// Returns a handle that aborts blocking waits of this controller
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Installs a callback that sees every inbound line that wasn't an
    /// acknowledgement. Empty lines are left out.
    pub fn set_line_observer<F>(&mut self, observer: F)
    where
        F: FnMut(&str) + Send + 'static,
    {
        self.observer = Some(Box::new(observer));
    }

    pub fn clear_line_observer(&mut self) {
        self.observer = None;
    }

    /// `true` if the last transmitted line was acknowledged
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    //

    /// One step of program replay, to be called from the main loop
    ///
    /// Polls the transport for one byte first. Then, if the last line was
    /// acknowledged and the selected program is running, sends that program's
    /// next line. A program with less than 3 bytes left is stopped and
    /// rewound instead. Never blocks on an acknowledgement and never sends
    /// while authoring.
    ///
    /// # Errors
    /// [`ControllerError::TransportError`] if reading or writing fails. The
    /// program isn't advanced in that case, so the next tick retries.
    ///
    /// # Examples
    /// ```no_run
    /// # use delta_robot_controller::{Controller, ControllerConfig};
    /// let mut controller = Controller::open("/dev/ttyUSB0", ControllerConfig::default()).unwrap();
    /// controller.begin_program("pick");
    /// controller.move_z(-320.0).unwrap();
    /// controller.move_xy(-100.0, 0.0).unwrap();
    /// controller.end_program();
    ///
    /// controller.run_program("pick").unwrap();
    /// while !controller.is_all_stopped() {
    ///     controller.tick().unwrap();
    ///     // other work of the main loop
    /// }
    /// ```
    pub fn tick(&mut self) -> Result<TickOutcome, ControllerError> {
        self.poll_transport()?;
        if !self.ready || self.authoring {
            return Ok(TickOutcome::Idle);
        }
        let (name, step) = match self.store.selected() {
            Some(p) if !p.is_stopped() => (p.name().to_owned(), p.peek()),
            _ => return Ok(TickOutcome::Idle),
        };
        match step {
            Step::Exhausted => {
                if let Some(p) = self.store.selected_mut() {
                    p.finish();
                }
                info!("program {} finished", name);
                Ok(TickOutcome::Finished(name))
            }
            Step::Line { text, next } => {
                let sent = self.transmit(&text);
                if went_out(&sent) {
                    if let Some(p) = self.store.selected_mut() {
                        p.advance(next);
                    }
                }
                sent?;
                Ok(TickOutcome::Sent(text))
            }
        }
    }

    /// Starts a new program named `name` and switches to authoring
    ///
    /// The program is appended to the collection even if the name already
    /// exists, lookups by name find the older one first.
    pub fn begin_program(&mut self, name: &str) {
        let index = self.store.create(name);
        self.store.select(Some(index));
        self.authoring = true;
        info!("authoring program {}", name);
    }

    /// Leaves authoring and clears the selection
    pub fn end_program(&mut self) {
        if let Some(p) = self.store.selected() {
            info!("program {} recorded, {} bytes", p.name(), p.buffer().len());
        }
        self.authoring = false;
        self.store.select(None);
    }

    /// Selects the first program named `name` and marks it running
    ///
    /// The cursor is kept, so a program that was interrupted resumes where it
    /// left off. A program that ran to the end was rewound and starts over.
    ///
    /// # Errors
    /// * [`ControllerError::ProgramNotFound`] if there's no such program
    /// * [`ControllerError::Authoring`] while authoring
    pub fn run_program(&mut self, name: &str) -> Result<(), ControllerError> {
        ensure!(!self.authoring, ControllerError::Authoring);
        let index = self
            .store
            .find(name)
            .ok_or_else(|| ControllerError::ProgramNotFound(name.to_owned()))?;
        self.store.select(Some(index));
        if let Some(p) = self.store.program_mut(index) {
            p.start();
            info!("running program {} from byte {}", name, p.cursor());
        }
        Ok(())
    }

    /// `true` if no program is running. Also `true` without any programs.
    pub fn is_all_stopped(&self) -> bool {
        self.store.all_stopped()
    }

    /// Returns the stopped flag of the first program named `name`
    ///
    /// # Errors
    /// [`ControllerError::ProgramNotFound`] if there's no such program
    pub fn is_program_stopped(&self, name: &str) -> Result<bool, ControllerError> {
        self.store
            .get(name)
            .map(Program::is_stopped)
            .ok_or_else(|| ControllerError::ProgramNotFound(name.to_owned()))
    }

    /// `true` if a program is selected and it is called `name`
    pub fn is_selected_program(&self, name: &str) -> bool {
        self.store.selected().map_or(false, |p| p.name() == name)
    }

    pub fn is_authoring(&self) -> bool {
        self.authoring
    }

    /// Returns the first program named `name`
    pub fn program(&self, name: &str) -> Option<&Program> {
        self.store.get(name)
    }

    /// All programs in the order they were created
    pub fn programs(&self) -> &[Program] {
        self.store.as_slice()
    }

    pub fn selected_program(&self) -> Option<&Program> {
        self.store.selected()
    }

    //

    // the whole line goes out in one buffer. an error before the first byte
    // is a plain TransportError, after it the line is on the wire and there's
    // no taking it back
    fn write_line(&mut self, line: &str) -> Result<(), ControllerError> {
        let buf = format!("{}{}", line, TERMINATOR);
        let bytes = buf.as_bytes();
        let mut sent = 0;
        while sent < bytes.len() {
            match self.interface.write(&bytes[sent..]) {
                Ok(0) => return Err(write_error(sent, io::ErrorKind::WriteZero.into())),
                Ok(n) => sent += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(write_error(sent, e)),
            }
        }
        self.interface
            .flush()
            .map_err(|e| write_error(sent, e))?;
        debug!("sent {:?}", line);
        Ok(())
    }

    // goes straight to the link, authoring is checked by the callers
    fn transmit(&mut self, line: &str) -> Result<(), ControllerError> {
        let sent = self.write_line(line);
        if went_out(&sent) {
            self.ready = false;
        }
        sent
    }

    fn receive(&mut self) -> Result<Received, ControllerError> {
        let mut byte = [0u8; 1];
        let n = loop {
            match self.interface.read(&mut byte) {
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) if is_idle(&e) => break 0,
                Err(e) => return Err(e.into()),
            }
        };
        if n == 0 {
            return Ok(Received::Nothing);
        }
        trace!("received byte {:#04x}", byte[0]);
        let received = self.tracker.feed(byte[0]);
        match &received {
            Received::Ack => self.ready = true,
            Received::Line(line) => self.discard(line),
            _ => {}
        }
        Ok(received)
    }

    fn discard(&mut self, line: &str) {
        if line.is_empty() {
            return;
        }
        debug!("discarding inbound line {:?}", line);
        if let Some(position) = parse_position(line) {
            self.last_position = Some(position);
        }
        if let Some(observer) = self.observer.as_mut() {
            observer(line);
        }
    }

    // polls until accept returns something, the configured timeout passes or
    // the cancel handle fires
    fn wait_for<T, F>(&mut self, mut accept: F) -> Result<T, ControllerError>
    where
        F: FnMut(&Received) -> Option<T>,
    {
        let start = Instant::now();
        loop {
            if self.cancel.take() {
                warn!("wait cancelled");
                return Err(ControllerError::Cancelled);
            }
            let received = self.receive()?;
            if let Some(t) = accept(&received) {
                return Ok(t);
            }
            if let Some(limit) = self.config.ack_timeout {
                if start.elapsed() >= limit {
                    warn!("no acknowledgement within {:?}", limit);
                    return Err(ControllerError::AcknowledgementTimeout(limit));
                }
            }
        }
    }
}

fn write_error(sent: usize, source: io::Error) -> ControllerError {
    if sent == 0 {
        ControllerError::TransportError(source)
    } else {
        warn!("line cut off after {} bytes: {}", sent, source);
        ControllerError::PartialWrite { sent, source }
    }
}

// whether a transmit put anything on the wire
fn went_out(result: &Result<(), ControllerError>) -> bool {
    matches!(result, Ok(()) | Err(ControllerError::PartialWrite { .. }))
}

impl<I: Read + Write> Debug for Controller<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Controller {{ interface: _, config: {:?}, store: {:?}, authoring: {:?}, ready: {:?}, receiving: {:?}, last_position: {:?} }}",
            self.config, self.store, self.authoring, self.ready, self.tracker.partial(), self.last_position,
        )
    }
}
