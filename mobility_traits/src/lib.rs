pub mod clock;

pub use clock::{Clock, ManualClock, SystemClock};

use std::error::Error;
use std::time::Duration;

/// Raw byte transport from the sensor device (serial port, replay file, simulator).
///
/// `read` fills `buf` with whatever bytes are available, waiting at most `timeout`.
/// `Ok(0)` means nothing arrived in time. End of stream is reported as an
/// `std::io::ErrorKind::UnexpectedEof` error.
pub trait ByteSource {
    fn read(
        &mut self,
        buf: &mut [u8],
        timeout: Duration,
    ) -> Result<usize, Box<dyn Error + Send + Sync>>;
}

impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    fn read(
        &mut self,
        buf: &mut [u8],
        timeout: Duration,
    ) -> Result<usize, Box<dyn Error + Send + Sync>> {
        (**self).read(buf, timeout)
    }
}

/// Presentation-side sink receiving every decoded sample for live display.
pub trait PlotFeed {
    fn push(&mut self, values: &[f64]);
}
