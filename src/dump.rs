//! Dump raw input events for debugging.
//! Run: mt-touch dump  to stream and print every record until the device goes away.

use std::io::{Read, Write};

use crate::error::{Error, Result};
use crate::input::code_name;
use crate::touchscreen::{StopToken, Touchscreen};

/// Print records from `ts` to `out` until the stream ends or `stop` is set.
/// Returns the number of records printed; a disconnect ends the dump cleanly.
pub fn run_dump<R: Read, W: Write>(
    ts: &mut Touchscreen<R>,
    out: &mut W,
    stop: &StopToken,
) -> Result<u64> {
    let mut n = 0u64;
    while !stop.is_stopped() {
        let ev = match ts.read_event() {
            Ok(Some(ev)) => ev,
            Ok(None) => continue,
            Err(Error::DeviceDisconnected) => {
                log::info!("Device disconnected after {} events", n);
                break;
            }
            Err(e) => return Err(e),
        };
        n += 1;
        writeln!(
            out,
            "{:6}  {:.6}  {}  value={}",
            n,
            ev.timestamp(),
            code_name(ev.kind(), ev.code()),
            ev.value()
        )?;
    }
    Ok(n)
}
