use portable_pty::{native_pty_system, MasterPty, PtySize, SlavePty};
use std::io::{self, Read, Write};
use std::os::unix::io::RawFd;
use std::time::Duration;

use super::error::PtyError;

/// Result of a non-blocking read on the controller side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// `n` bytes were placed at the front of the buffer.
    Data(usize),
    /// Nothing available right now.
    WouldBlock,
    /// The dependent side hung up; no more output will arrive.
    Closed,
}

/// Byte-level access to the controller side of a terminal.
pub trait Terminal {
    /// Block up to `timeout` until a read would not block.
    ///
    /// Returns `Ok(false)` on timeout or when the wait was interrupted by a
    /// signal.
    fn wait_readable(&mut self, timeout: Duration) -> io::Result<bool>;

    fn read(&mut self, buf: &mut [u8]) -> io::Result<ReadOutcome>;

    /// Write every byte, waiting for the descriptor when it is full.
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Release the controller side. Idempotent.
    fn close(&mut self);
}

const WRITE_WAIT: Duration = Duration::from_millis(100);

/// Owns the controller side of a pseudo-terminal pair.
pub struct PtyHandle {
    master: Option<Box<dyn MasterPty + Send>>,
    reader: Option<Box<dyn Read + Send>>,
    writer: Option<Box<dyn Write + Send>>,
    fd: RawFd,
}

impl PtyHandle {
    /// Allocate a controller/dependent pair.
    ///
    /// The dependent side is returned to the caller, who hands it to
    /// [`ChildHandle::spawn`](super::ChildHandle::spawn); that call drops it
    /// in this process once the child has inherited it.
    pub fn open(size: PtySize) -> Result<(Self, Box<dyn SlavePty + Send>), PtyError> {
        let pty_system = native_pty_system();
        let pair = pty_system
            .openpty(size)
            .map_err(|e| PtyError::Open(e.to_string()))?;

        let fd = pair.master.as_raw_fd().ok_or(PtyError::NoDescriptor)?;
        let reader = pair
            .master
            .try_clone_reader()
            .map_err(|e| PtyError::Open(format!("failed to clone reader: {e}")))?;
        let writer = pair
            .master
            .take_writer()
            .map_err(|e| PtyError::Open(format!("failed to take writer: {e}")))?;

        let handle = Self {
            master: Some(pair.master),
            reader: Some(reader),
            writer: Some(writer),
            fd,
        };
        Ok((handle, pair.slave))
    }

    /// Put the controller descriptor in non-blocking mode.
    ///
    /// The cloned reader and the writer share the open file description, so
    /// the flag applies to them as well.
    pub fn set_non_blocking(&self) -> Result<(), PtyError> {
        let flags = unsafe { libc::fcntl(self.fd, libc::F_GETFL) };
        if flags < 0 {
            return Err(io::Error::last_os_error().into());
        }
        if unsafe { libc::fcntl(self.fd, libc::F_SETFL, flags | libc::O_NONBLOCK) } < 0 {
            return Err(io::Error::last_os_error().into());
        }
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.master.is_none()
    }

    fn poll(&self, events: libc::c_short, timeout: Duration) -> io::Result<bool> {
        if self.is_closed() {
            return Err(closed_error());
        }
        let mut fds = [libc::pollfd {
            fd: self.fd,
            events,
            revents: 0,
        }];
        let millis = timeout.as_millis().min(libc::c_int::MAX as u128) as libc::c_int;
        let rc = unsafe { libc::poll(fds.as_mut_ptr(), 1, millis) };
        if rc < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                return Ok(false);
            }
            return Err(err);
        }
        if fds[0].revents & libc::POLLNVAL != 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "controller descriptor is not open",
            ));
        }
        // Hang-up and error are reported as readable so the next read can
        // observe them.
        Ok(rc > 0 && fds[0].revents & (events | libc::POLLHUP | libc::POLLERR) != 0)
    }
}

impl Terminal for PtyHandle {
    fn wait_readable(&mut self, timeout: Duration) -> io::Result<bool> {
        self.poll(libc::POLLIN, timeout)
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<ReadOutcome> {
        let reader = self.reader.as_mut().ok_or_else(closed_error)?;
        match reader.read(buf) {
            Ok(0) => Ok(ReadOutcome::Closed),
            Ok(n) => Ok(ReadOutcome::Data(n)),
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
                ) =>
            {
                Ok(ReadOutcome::WouldBlock)
            }
            // Linux reports EIO on the controller once every dependent
            // descriptor is closed.
            Err(e) if e.raw_os_error() == Some(libc::EIO) => Ok(ReadOutcome::Closed),
            Err(e) => Err(e),
        }
    }

    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        let mut written = 0;
        while written < bytes.len() {
            let result = self
                .writer
                .as_mut()
                .ok_or_else(closed_error)?
                .write(&bytes[written..]);
            match result {
                Ok(0) => {
                    return Err(io::Error::new(
                        io::ErrorKind::WriteZero,
                        "terminal accepted no bytes",
                    ))
                }
                Ok(n) => written += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    self.poll(libc::POLLOUT, WRITE_WAIT)?;
                }
                Err(e) => return Err(e),
            }
        }
        match self.writer.as_mut() {
            Some(writer) => writer.flush(),
            None => Err(closed_error()),
        }
    }

    fn close(&mut self) {
        self.writer = None;
        self.reader = None;
        self.master = None;
    }
}

impl Drop for PtyHandle {
    fn drop(&mut self) {
        self.close();
    }
}

fn closed_error() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, "terminal already closed")
}
