// Basically does same as anyhow::ensure
macro_rules! ensure {
    ($cond:expr, $err:expr) => {
        if !$cond {
            return Err($err);
        }
    };
}

pub(crate) use ensure;

// a read that ran into the port timeout (or a non-blocking read with nothing
// buffered) just means no byte arrived yet. Interrupted is retried by callers
pub(crate) fn is_idle(e: &std::io::Error) -> bool {
    use std::io::ErrorKind;
    matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut)
}
