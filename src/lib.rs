//! Decode the Linux multitouch (Type B slot) protocol into press, move and
//! release callbacks per contact slot.
//!
//! ```no_run
//! use mt_touch::{Config, DeviceProfile, Touchscreen};
//!
//! let config = Config::from_profile(DeviceProfile::current());
//! let mut ts = Touchscreen::open(&config)?;
//! ts.dispatcher_mut()
//!     .on_press(|_, t| println!("down {} at {},{}", t.slot(), t.x(), t.y()))
//!     .on_release(|_, t| println!("up {}", t.slot()));
//! while let Some(touches) = ts.poll_once()? {
//!     println!("{} active", touches.iter().filter(|t| t.valid()).count());
//! }
//! # Ok::<(), mt_touch::Error>(())
//! ```

pub mod config;
pub mod device;
pub mod dump;
pub mod error;
pub mod input;
pub mod ssh;
pub mod touchscreen;

pub use config::Config;
pub use device::{DeviceLocator, DeviceProfile, SysfsLocator};
pub use error::{Error, Result};
pub use input::{EventLayout, Position, RawEvent, TouchEvent, TouchRegistry, TouchState};
pub use touchscreen::{PollHandle, StopToken, Touchscreen};
