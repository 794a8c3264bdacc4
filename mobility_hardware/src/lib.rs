//! Concrete byte sources for the joint mobility monitor.
//!
//! - `SimulatedImu`: deterministic sine-wave device, paced by a `Clock`
//! - `ReplaySource`: plays back a recorded capture file
//! - `SerialSource` (feature `serial`): the real sensor box

pub mod error;
pub mod replay;
#[cfg(feature = "serial")]
pub mod serial;
pub mod sim;
pub mod util;

pub use error::HwError;
pub use replay::ReplaySource;
#[cfg(feature = "serial")]
pub use serial::{SerialSource, list_ports};
pub use sim::SimulatedImu;
