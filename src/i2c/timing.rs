use std::fmt;
use std::time::Duration;

use super::Wait;

const NANOS_PER_KHZ_PERIOD: u64 = 1_000_000;

/// Bus timing derived from the clock speed: one clock period is
/// `1 / (speed_khz * 1000)` seconds.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Timing {
	period: Duration,
}

impl Timing {
	pub fn from_khz(speed_khz: u32) -> crate::AResult<Self> {
		ensure!(speed_khz > 0, "I2C clock speed must be positive");
		ensure!(u64::from(speed_khz) <= NANOS_PER_KHZ_PERIOD, "I2C clock speed {} kHz too high", speed_khz);

		Ok(Timing {
			period: Duration::from_nanos(NANOS_PER_KHZ_PERIOD / u64::from(speed_khz)),
		})
	}

	pub fn period(&self) -> Duration {
		self.period
	}

	pub fn half_period(&self) -> Duration {
		self.period / 2
	}

	pub fn duration(&self, wait: Wait) -> Duration {
		match wait {
			Wait::Half => self.half_period(),
			Wait::Full => self.period(),
		}
	}

	// number of full periods covering `timeout` (rounding up)
	pub fn periods_in(&self, timeout: Duration) -> u32 {
		let period = self.period.as_nanos();
		let periods = (timeout.as_nanos() + period - 1) / period;
		if periods > u128::from(u32::max_value()) {
			u32::max_value()
		} else {
			periods as u32
		}
	}
}

impl fmt::Display for Timing {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "{:?} clock period", self.period)
	}
}
