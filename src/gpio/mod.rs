//! GPIO line controller
//!
//! Only knows how to claim, release, configure and sample single lines; the
//! I2C protocol lives in `crate::i2c`.

mod line;
mod sysfs;

#[cfg(test)]
pub mod mock;

use std::io;
use std::thread;
use std::time::{
	Duration,
	Instant,
};

pub use self::line::{
	Direction,
	LineId,
};

pub use self::sysfs::{
	SysfsGpio,
	SYSFS_GPIO_BASE,
};

// `thread::sleep` may return early; keep sleeping until `duration` passed
pub fn reliable_sleep(mut duration: Duration) {
	loop {
		let now = Instant::now();
		thread::sleep(duration);
		let elapsed = now.elapsed();
		if elapsed >= duration {
			return;
		}
		duration -= elapsed;
	}
}

/// Capabilities the bus engine needs from the platform.
pub trait GpioLines {
	/// Make a line available for direction/level control.
	///
	/// Must succeed if the line is already claimed (by us or an earlier
	/// session that didn't clean up).
	fn claim(&mut self, line: LineId) -> io::Result<()>;

	/// Return a line to the system.
	fn release(&mut self, line: LineId) -> io::Result<()>;

	/// Might fail with `io::ErrorKind::PermissionDenied` for a short while
	/// after `claim`.
	fn set_direction(&mut self, line: LineId, direction: Direction) -> io::Result<()>;

	fn read(&mut self, line: LineId) -> io::Result<bool>;

	/// Set the level of a line in one of the output directions.
	fn write(&mut self, line: LineId, value: bool) -> io::Result<()>;

	// delay for (at least) `duration`
	fn delay(&mut self, duration: Duration) {
		reliable_sleep(duration);
	}
}
