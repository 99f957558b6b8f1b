use std::time::Duration;

/// Settings for a [`Controller`][crate::Controller] and its serial link
///
/// The defaults match the firmware: 115200 baud, the `IsDelta` handshake on
/// connect and no bound on how long a command may wait for its
/// acknowledgement.
///
/// # Examples
/// ```
/// # use delta_robot_controller::ControllerConfig;
/// use std::time::Duration;
///
/// let config = ControllerConfig::default()
///     .with_ack_timeout(Duration::from_secs(30))
///     .with_handshake(false);
/// assert_eq!(config.baud_rate, 115200);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    pub baud_rate: u32,
    /// Timeout of a single read on the serial port. Every poll reads at most
    /// one byte, so this is how long a [`tick`][crate::Controller::tick] may
    /// sit in the port when nothing arrives.
    pub read_timeout: Duration,
    /// Upper bound for every blocking wait on an acknowledgement. `None`
    /// blocks until the firmware answers.
    pub ack_timeout: Option<Duration>,
    /// Read timeout used while probing ports for the robot
    pub probe_timeout: Duration,
    /// Send the identification line twice when the controller is created
    pub handshake: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        ControllerConfig {
            baud_rate: 115200,
            read_timeout: Duration::from_millis(10),
            ack_timeout: None,
            probe_timeout: Duration::from_secs(1),
            handshake: true,
        }
    }
}

impl ControllerConfig {
    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn with_ack_timeout(mut self, timeout: Duration) -> Self {
        self.ack_timeout = Some(timeout);
        self
    }

    pub fn without_ack_timeout(mut self) -> Self {
        self.ack_timeout = None;
        self
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    pub fn with_handshake(mut self, handshake: bool) -> Self {
        self.handshake = handshake;
        self
    }
}
