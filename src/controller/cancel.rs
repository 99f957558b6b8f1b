use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Aborts a blocking wait from another thread
///
/// Obtained through [`Controller::cancel_handle`][crate::Controller::cancel_handle].
/// After [`cancel`][CancelHandle::cancel] the wait that is currently running,
/// or the next one to start, returns [`ControllerError::Cancelled`][crate::ControllerError::Cancelled].
/// The request is used up by that wait.
///
/// Cancelling does not stop the robot, the line that was sent is still
/// executed by the firmware. It only gives the calling thread back.
///
/// # Example
/// ```no_run
/// # use delta_robot_controller::{Controller, ControllerConfig};
/// let mut controller = Controller::open("/dev/ttyUSB0", ControllerConfig::default()).unwrap();
/// let cancel = controller.cancel_handle();
/// std::thread::spawn(move || {
///     std::thread::sleep(std::time::Duration::from_secs(5));
///     cancel.cancel();
/// });
/// match controller.home() {
///     Ok(()) => println!("homed"),
///     Err(e) => println!("gave up: {}", e),
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Withdraws a request that no wait has picked up yet
    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    // clears the flag, returning whether it was set
    pub(super) fn take(&self) -> bool {
        self.0.swap(false, Ordering::SeqCst)
    }
}
