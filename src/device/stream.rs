//! Local evdev device file with a bounded wait for input.

use std::fs::File;
use std::io::{self, ErrorKind, Read};
use std::os::fd::AsRawFd;
use std::path::Path;
use std::time::Duration;

use crate::error::Result;

pub struct DeviceStream {
    file: File,
    timeout: Option<Duration>,
}

impl DeviceStream {
    /// Open `path` for reading. With a timeout, reads that see no input for
    /// that long fail with `TimedOut` instead of blocking.
    pub fn open(path: &Path, timeout: Option<Duration>) -> Result<Self> {
        let file = File::open(path)?;
        log::debug!("Opened {} (read timeout {:?})", path.display(), timeout);
        Ok(Self { file, timeout })
    }

    fn wait_readable(&self, timeout: Duration) -> io::Result<()> {
        let mut pfd = libc::pollfd {
            fd: self.file.as_raw_fd(),
            events: libc::POLLIN,
            revents: 0,
        };
        let ms = timeout.as_millis().min(libc::c_int::MAX as u128) as libc::c_int;

        // SAFETY: pfd is a valid pollfd for the duration of the call and nfds is 1.
        let rc = unsafe { libc::poll(&mut pfd, 1, ms) };
        match rc {
            n if n < 0 => Err(io::Error::last_os_error()),
            0 => Err(io::Error::new(ErrorKind::TimedOut, "no input within timeout")),
            _ => Ok(()),
        }
    }
}

impl Read for DeviceStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if let Some(timeout) = self.timeout {
            self.wait_readable(timeout)?;
        }
        match self.file.read(buf) {
            // Unplugged evdev nodes fail with ENODEV; report it as end of stream.
            Err(e) if e.raw_os_error() == Some(libc::ENODEV) => Ok(0),
            other => other,
        }
    }
}
