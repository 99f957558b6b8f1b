#[cfg(test)]
mod tests;

use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
    io::{self, Read, Write},
    rc::Rc,
};

// used to mock a serial link to the robot firmware
// read hands out the bytes queued with add_read and reports WouldBlock once
// they run out, the same way a serialport with a short timeout reports that
// nothing arrived. everything written is recorded so tests can look at it
// afterwards. clones share the same buffers, so one clone goes into the
// controller and the test keeps the other
//
// write_limit lets a number of bytes through and then fails every write with
// TimedOut, like a serial port whose write timeout hits halfway through a
// line. interrupt makes the next read fail with Interrupted once
//
// it doesn't need to be fast or efficient, just easy to reason about
pub struct Interface {
    read: Rc<RefCell<VecDeque<u8>>>,
    written: Rc<RefCell<Vec<u8>>>,
    reads: Rc<Cell<usize>>,
    broken: Rc<Cell<bool>>,
    write_limit: Rc<Cell<Option<usize>>>,
    interrupt: Rc<Cell<bool>>,
}

impl Read for Interface {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.broken.get() {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "interface broken"));
        }
        if self.interrupt.replace(false) {
            return Err(io::Error::new(io::ErrorKind::Interrupted, "interrupted"));
        }
        self.reads.set(self.reads.get() + 1);
        let mut q = self.read.borrow_mut();
        if q.is_empty() {
            return Err(io::Error::new(io::ErrorKind::WouldBlock, "nothing to read"));
        }
        let n = buf.len().min(q.len());
        for (dst, src) in buf.iter_mut().zip(q.drain(..n)) {
            *dst = src;
        }
        Ok(n)
    }
}

impl Write for Interface {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.broken.get() {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "interface broken"));
        }
        let n = match self.write_limit.get() {
            Some(0) => {
                return Err(io::Error::new(io::ErrorKind::TimedOut, "write timed out"));
            }
            Some(limit) => {
                let n = limit.min(buf.len());
                self.write_limit.set(Some(limit - n));
                n
            }
            None => buf.len(),
        };
        self.written.borrow_mut().extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Clone for Interface {
    fn clone(&self) -> Self {
        Interface {
            read: self.read.clone(),
            written: self.written.clone(),
            reads: self.reads.clone(),
            broken: self.broken.clone(),
            write_limit: self.write_limit.clone(),
            interrupt: self.interrupt.clone(),
        }
    }
}

impl Default for Interface {
    fn default() -> Self {
        Self::new()
    }
}

impl Interface {
    pub fn new() -> Self {
        Interface {
            read: Rc::new(RefCell::new(VecDeque::new())),
            written: Rc::new(RefCell::new(Vec::new())),
            reads: Rc::new(Cell::new(0)),
            broken: Rc::new(Cell::new(false)),
            write_limit: Rc::new(Cell::new(None)),
            interrupt: Rc::new(Cell::new(false)),
        }
    }

    pub fn add_read(&mut self, buf: &[u8]) {
        self.read.borrow_mut().extend(buf.iter().copied())
    }

    /// queues an acknowledgement line from the firmware
    pub fn add_ok(&mut self) {
        self.add_read(b"Ok\n")
    }

    pub fn pending_read(&self) -> usize {
        self.read.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read.borrow().is_empty()
    }

    /// number of read calls that got past the broken check
    pub fn read_count(&self) -> usize {
        self.reads.get()
    }

    pub fn written(&self) -> Vec<u8> {
        self.written.borrow().clone()
    }

    /// everything written so far, split into lines without terminators
    pub fn written_lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.written.borrow())
            .lines()
            .map(str::to_owned)
            .collect()
    }

    pub fn clear_written(&mut self) {
        self.written.borrow_mut().clear()
    }

    /// lets `limit` more bytes be written, after that writes time out.
    /// `None` lifts the limit
    pub fn set_write_limit(&mut self, limit: Option<usize>) {
        self.write_limit.set(limit)
    }

    /// makes the next read fail with Interrupted
    pub fn interrupt_next_read(&mut self) {
        self.interrupt.set(true)
    }

    /// makes every following read and write fail with BrokenPipe
    pub fn set_broken(&mut self, broken: bool) {
        self.broken.set(broken)
    }
}
