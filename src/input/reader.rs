//! Pulls whole fixed-size records out of a byte stream.

use std::io::{ErrorKind, Read};

use crate::error::{Error, Result};

use super::event::{parse_input_event, EventLayout, RawEvent};

pub struct EventReader<R> {
    inner: R,
    layout: EventLayout,
    buf: Vec<u8>,
    filled: usize,
}

impl<R: Read> EventReader<R> {
    pub fn new(inner: R, layout: EventLayout) -> Self {
        Self {
            inner,
            layout,
            buf: vec![0u8; layout.record_size()],
            filled: 0,
        }
    }

    pub fn layout(&self) -> EventLayout {
        self.layout
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Read the next record.
    ///
    /// Returns `Ok(None)` when the source timed out with no complete record;
    /// bytes of a partially received record are kept for the next call.
    /// EOF between records is [`Error::DeviceDisconnected`], EOF inside one
    /// is [`Error::Protocol`].
    pub fn read_event(&mut self) -> Result<Option<RawEvent>> {
        while self.filled < self.buf.len() {
            match self.inner.read(&mut self.buf[self.filled..]) {
                Ok(0) if self.filled == 0 => return Err(Error::DeviceDisconnected),
                Ok(0) => {
                    let got = self.filled;
                    self.filled = 0;
                    return Err(Error::Protocol(format!(
                        "stream ended inside a record ({} of {} bytes)",
                        got,
                        self.buf.len()
                    )));
                }
                Ok(n) => self.filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => {
                    return Ok(None);
                }
                Err(e) => return Err(e.into()),
            }
        }

        self.filled = 0;
        let ev = parse_input_event(&self.buf, self.layout)?;
        log::trace!(
            "{:.6} {} value={}",
            ev.timestamp(),
            super::event::code_name(ev.kind(), ev.code()),
            ev.value()
        );
        Ok(Some(ev))
    }
}
