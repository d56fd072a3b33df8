//! Driver object tying a record source to the decoder, plus the optional
//! background polling worker.

use std::io::Read;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::config::Config;
use crate::device::{DeviceLocator, DeviceStream, SysfsLocator};
use crate::error::{Error, Result};
use crate::input::{
    Dispatcher, EventLayout, EventReader, Position, ProtocolDecoder, RawEvent, Step, TouchState,
};
use crate::ssh;

/// Cooperative shutdown flag shared between a worker and its handle.
#[derive(Debug, Clone, Default)]
pub struct StopToken(Arc<AtomicBool>);

impl StopToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    fn clear(&self) {
        self.0.store(false, Ordering::Relaxed);
    }
}

/// Boxed source returned by [`Touchscreen::open`].
pub type DeviceSource = Box<dyn Read + Send>;

pub struct Touchscreen<R> {
    reader: EventReader<R>,
    decoder: ProtocolDecoder,
    /// Slot states as of the last completed frame.
    polled: Vec<TouchState>,
    stop: StopToken,
}

impl<R: Read> Touchscreen<R> {
    pub fn new(source: R, layout: EventLayout, slots: usize) -> Self {
        let decoder = ProtocolDecoder::new(slots);
        Self {
            reader: EventReader::new(source, layout),
            polled: decoder.registry().all().to_vec(),
            decoder,
            stop: StopToken::new(),
        }
    }

    /// Register callbacks here before polling.
    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher {
        self.decoder.dispatcher_mut()
    }

    pub fn stop_token(&self) -> StopToken {
        self.stop.clone()
    }

    pub fn layout(&self) -> EventLayout {
        self.reader.layout()
    }

    /// Read one raw record without decoding it. `None` means the source timed out.
    pub fn read_event(&mut self) -> Result<Option<RawEvent>> {
        self.reader.read_event()
    }

    /// Consume records until one SYN-terminated frame has been decoded and
    /// its callbacks have fired, then return every slot (active or not).
    ///
    /// Returns `Ok(None)` if the stop token is set before the frame completes.
    pub fn poll_once(&mut self) -> Result<Option<&[TouchState]>> {
        loop {
            if self.stop.is_stopped() {
                return Ok(None);
            }
            let Some(ev) = self.reader.read_event()? else {
                continue;
            };
            if self.decoder.feed(&ev)? == Step::Frame {
                self.polled.clone_from_slice(self.decoder.registry().all());
                return Ok(Some(&self.polled));
            }
        }
    }

    /// Live slot states, including records of a frame not yet terminated.
    pub fn touches(&self) -> &[TouchState] {
        self.decoder.registry().all()
    }

    /// Slots holding a contact as of the last frame `poll_once` completed.
    /// Records of an unfinished or failed frame are not visible here.
    pub fn valid_touches(&self) -> impl Iterator<Item = &TouchState> + '_ {
        self.polled.iter().filter(|t| t.valid())
    }

    pub fn position(&self) -> &Position {
        self.decoder.registry().position()
    }

    pub fn frame_count(&self) -> u64 {
        self.decoder.frame_count()
    }
}

impl Touchscreen<DeviceSource> {
    /// Locate and open the configured device, locally or over SSH.
    pub fn open(config: &Config) -> Result<Self> {
        config.validate()?;

        let (source, layout) = match config.host {
            Some(_) => {
                let session = ssh::connect(config)?;
                let path = match &config.device {
                    Some(device) => PathBuf::from(device),
                    None => ssh::RemoteLocator::new(&session, config.device_name.as_str()).locate()?,
                };
                let layout = match config.layout()? {
                    Some(layout) => layout,
                    None => ssh::detect_layout(&session)?,
                };
                let stream = ssh::open_input_stream(session, &path, config.read_timeout())?;
                (Box::new(stream) as DeviceSource, layout)
            }
            None => {
                let path = match &config.device {
                    Some(device) => PathBuf::from(device).locate()?,
                    None => SysfsLocator::new(config.device_name.as_str()).locate()?,
                };
                let layout = config.layout()?.unwrap_or_else(EventLayout::native);
                let stream = DeviceStream::open(&path, config.read_timeout())?;
                (Box::new(stream) as DeviceSource, layout)
            }
        };

        log::info!(
            "Touch decoding ready ({} slots, {}-byte records)",
            config.slots,
            layout.record_size()
        );
        Ok(Self::new(source, layout, config.slots))
    }
}

impl<R: Read + Send + 'static> Touchscreen<R> {
    /// Poll on a dedicated thread until stopped or the source fails.
    ///
    /// A stop requested before `run` is honoured: the worker exits at once.
    pub fn run(self) -> PollHandle<R> {
        let stop = self.stop.clone();
        let thread = thread::spawn(move || {
            let mut ts = self;
            log::info!("Touch polling thread started");
            loop {
                match ts.poll_once() {
                    Ok(Some(_)) => {}
                    Ok(None) => {
                        log::debug!("Touch polling thread stopping");
                        return Ok(ts);
                    }
                    Err(e) => {
                        log::error!("Touch polling stopped: {}", e);
                        return Err(e);
                    }
                }
            }
        });
        PollHandle { stop, thread }
    }
}

/// Handle to a running poll worker.
pub struct PollHandle<R> {
    stop: StopToken,
    thread: JoinHandle<Result<Touchscreen<R>>>,
}

impl<R> PollHandle<R> {
    pub fn stop_token(&self) -> StopToken {
        self.stop.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Signal the worker and wait for it. Returns the touchscreen so it can
    /// be polled or run again, or the error that ended the loop.
    ///
    /// The returned touchscreen's token is cleared again, so it is ready to poll.
    pub fn stop(self) -> Result<Touchscreen<R>> {
        self.stop.stop();
        let ts = self.join()?;
        ts.stop.clear();
        Ok(ts)
    }

    /// Wait for the worker to end on its own (disconnect or error).
    pub fn join(self) -> Result<Touchscreen<R>> {
        self.thread
            .join()
            .map_err(|_| Error::WorkerPanicked)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{ABS_MT_SLOT, ABS_MT_TRACKING_ID, EV_ABS, EV_SYN};
    use std::io::{self, Cursor, ErrorKind};

    /// Never produces data; every read times out.
    struct Idle;

    impl Read for Idle {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            thread::sleep(std::time::Duration::from_millis(5));
            Err(io::Error::new(ErrorKind::TimedOut, "idle"))
        }
    }

    fn stream(events: &[RawEvent]) -> Cursor<Vec<u8>> {
        Cursor::new(
            events
                .iter()
                .flat_map(|e| e.encode(EventLayout::Compact))
                .collect(),
        )
    }

    #[test]
    fn poll_once_returns_all_slots() {
        let source = stream(&[
            RawEvent::new(EV_ABS, ABS_MT_SLOT, 1),
            RawEvent::new(EV_ABS, ABS_MT_TRACKING_ID, 3),
            RawEvent::new(EV_SYN, 0, 0),
        ]);
        let mut ts = Touchscreen::new(source, EventLayout::Compact, 4);
        let touches = ts.poll_once().unwrap().unwrap();
        assert_eq!(touches.len(), 4);
        assert_eq!(ts.valid_touches().map(|t| t.slot()).collect::<Vec<_>>(), vec![1]);
        assert!(matches!(ts.poll_once(), Err(Error::DeviceDisconnected)));
    }

    #[test]
    fn valid_touches_ignores_unfinished_frame() {
        let source = stream(&[
            RawEvent::new(EV_ABS, ABS_MT_TRACKING_ID, 1),
            RawEvent::new(EV_SYN, 0, 0),
            RawEvent::new(EV_ABS, ABS_MT_SLOT, 1),
            RawEvent::new(EV_ABS, ABS_MT_TRACKING_ID, 2),
        ]);
        let mut ts = Touchscreen::new(source, EventLayout::Compact, 4);
        ts.poll_once().unwrap();
        assert!(matches!(ts.poll_once(), Err(Error::DeviceDisconnected)));

        assert!(ts.touches()[1].valid());
        let valid: Vec<usize> = ts.valid_touches().map(|t| t.slot()).collect();
        assert_eq!(valid, vec![0]);
    }

    #[test]
    fn stop_does_not_wait_for_input() {
        let ts = Touchscreen::new(Idle, EventLayout::Wide, 10);
        let handle = ts.run();
        thread::sleep(std::time::Duration::from_millis(20));
        assert!(!handle.is_finished());
        let ts = handle.stop().unwrap();
        assert_eq!(ts.frame_count(), 0);
    }

    #[test]
    fn worker_reports_disconnect() {
        let source = stream(&[RawEvent::new(EV_SYN, 0, 0)]);
        let handle = Touchscreen::new(source, EventLayout::Compact, 10).run();
        assert!(matches!(handle.join(), Err(Error::DeviceDisconnected)));
    }

    #[test]
    fn stopped_touchscreen_can_run_again() {
        let ts = Touchscreen::new(Idle, EventLayout::Wide, 2);
        let ts = ts.run().stop().unwrap();
        assert!(!ts.stop_token().is_stopped());
        let handle = ts.run();
        thread::sleep(std::time::Duration::from_millis(20));
        assert!(!handle.is_finished());
        let ts = handle.stop().unwrap();
        assert_eq!(ts.touches().len(), 2);
    }

    #[test]
    fn stop_before_run_ends_worker_immediately() {
        let ts = Touchscreen::new(Idle, EventLayout::Wide, 2);
        let token = ts.stop_token();
        token.stop();
        let ts = ts.run().join().unwrap();
        assert!(token.is_stopped());
        assert_eq!(ts.frame_count(), 0);
    }
}
