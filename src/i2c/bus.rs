use std::io;
use std::time::Duration;

use crate::gpio::{
	Direction,
	GpioLines,
	LineId,
};

use super::{
	Hardware,
	Line,
	Timing,
	Wait,
};

pub const DEFAULT_SPEED_KHZ: u32 = 1;
pub const DEFAULT_SETUP_ATTEMPTS: u32 = 1000;

const SETUP_RETRY_DELAY: Duration = Duration::from_millis(1);

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct BusConfig {
	/// SDA
	pub data_line: LineId,
	/// SCL
	pub clock_line: LineId,
	pub speed_khz: u32,
	/// Attempts to configure the lines after claiming them (the kernel might
	/// deny access for a short time); `None` retries forever.
	pub setup_attempts: Option<u32>,
	/// Give up waiting for a slave stretching the clock after this time;
	/// `None` waits forever.
	pub stretch_timeout: Option<Duration>,
}

impl BusConfig {
	pub fn new(data_line: LineId, clock_line: LineId) -> Self {
		BusConfig {
			data_line,
			clock_line,
			speed_khz: DEFAULT_SPEED_KHZ,
			setup_attempts: Some(DEFAULT_SETUP_ATTEMPTS),
			stretch_timeout: None,
		}
	}

	pub fn set_speed_khz(&mut self, speed_khz: u32) -> &mut Self {
		self.speed_khz = speed_khz;
		self
	}

	pub fn set_setup_attempts(&mut self, setup_attempts: Option<u32>) -> &mut Self {
		self.setup_attempts = setup_attempts;
		self
	}

	pub fn set_stretch_timeout(&mut self, stretch_timeout: Option<Duration>) -> &mut Self {
		self.stretch_timeout = stretch_timeout;
		self
	}
}

/// I2C master owning two GPIO lines; releases them when dropped (or
/// `close`d).
pub struct I2cBus<G: GpioLines> {
	gpio: G,
	data_line: LineId,
	clock_line: LineId,
	timing: Timing,
	stretch_limit: Option<u32>,
	claimed: bool, // false once released
}

impl<G: GpioLines> I2cBus<G> {
	pub fn open(mut gpio: G, config: &BusConfig) -> crate::AResult<Self> {
		let timing = Timing::from_khz(config.speed_khz)?;
		ensure!(config.data_line != config.clock_line, "SDA and SCL must be different GPIO lines (both are {})", config.data_line);
		let stretch_limit = config.stretch_timeout.map(|t| timing.periods_in(t));

		with_context!(("GPIO {}: failed to claim SDA line", config.data_line),
			Ok(gpio.claim(config.data_line)?)
		)?;
		if let Err(e) = gpio.claim(config.clock_line) {
			if let Err(e) = gpio.release(config.data_line) {
				error!("GPIO {}: Failed to release SDA line: {}", config.data_line, e);
			}
			bail!("GPIO {}: failed to claim SCL line: {}", config.clock_line, e);
		}

		// from here on `Drop` releases the lines
		let mut bus = I2cBus {
			gpio,
			data_line: config.data_line,
			clock_line: config.clock_line,
			timing,
			stretch_limit,
			claimed: true,
		};
		bus.setup_lines(config.setup_attempts)?;
		debug!("I2C bus on GPIO {} (SDA) / {} (SCL) with {}", bus.data_line, bus.clock_line, bus.timing);

		Ok(bus)
	}

	pub fn data_line(&self) -> LineId {
		self.data_line
	}

	pub fn clock_line(&self) -> LineId {
		self.clock_line
	}

	pub fn timing(&self) -> Timing {
		self.timing
	}

	/// Release the lines now, reporting failures.
	pub fn close(mut self) -> crate::AResult<()> {
		self.release_lines()
	}

	fn line_id(&self, line: Line) -> LineId {
		match line {
			Line::Clock => self.clock_line,
			Line::Data => self.data_line,
		}
	}

	// drive both lines high once (so they don't float low), then release them
	fn try_setup_lines(&mut self) -> io::Result<()> {
		self.gpio.set_direction(self.data_line, Direction::DriveHigh)?;
		self.gpio.set_direction(self.clock_line, Direction::DriveHigh)?;
		self.gpio.set_direction(self.data_line, Direction::Input)?;
		self.gpio.set_direction(self.clock_line, Direction::Input)?;
		Ok(())
	}

	fn setup_lines(&mut self, attempts: Option<u32>) -> crate::AResult<()> {
		let mut attempt = 0u32;
		loop {
			attempt += 1;
			match self.try_setup_lines() {
				Ok(()) => return Ok(()),
				Err(ref e) if e.kind() == io::ErrorKind::PermissionDenied => {
					if let Some(attempts) = attempts {
						ensure!(attempt < attempts, "GPIO {}/{}: still no access after {} attempts: {}", self.data_line, self.clock_line, attempt, e);
					}
					debug!("GPIO {}/{}: access denied, retrying: {}", self.data_line, self.clock_line, e);
					self.gpio.delay(SETUP_RETRY_DELAY);
				},
				Err(e) => bail!("GPIO {}/{}: failed to set up lines: {}", self.data_line, self.clock_line, e),
			}
		}
	}

	fn release_lines(&mut self) -> crate::AResult<()> {
		if !self.claimed {
			return Ok(());
		}
		self.claimed = false;

		let data = self.gpio.release(self.data_line);
		let clock = self.gpio.release(self.clock_line);
		with_context!(("GPIO {}: failed to release SDA line", self.data_line), Ok(data?))?;
		with_context!(("GPIO {}: failed to release SCL line", self.clock_line), Ok(clock?))?;
		debug!("GPIO {}/{}: released", self.data_line, self.clock_line);
		Ok(())
	}
}

impl<G: GpioLines> Drop for I2cBus<G> {
	fn drop(&mut self) {
		if let Err(e) = self.release_lines() {
			error!("{}", e);
		}
	}
}

impl<G: GpioLines> Hardware for I2cBus<G> {
	fn set_line(&mut self, line: Line, direction: Direction) -> crate::AResult<()> {
		let id = self.line_id(line);
		let gpio = &mut self.gpio;
		with_context!(("GPIO {}: failed to set direction {}", id, direction),
			Ok(gpio.set_direction(id, direction)?)
		)
	}

	fn drive(&mut self, line: Line, high: bool) -> crate::AResult<()> {
		let id = self.line_id(line);
		let gpio = &mut self.gpio;
		with_context!(("GPIO {}: failed to write value", id),
			Ok(gpio.write(id, high)?)
		)
	}

	fn sense(&mut self, line: Line) -> crate::AResult<bool> {
		let id = self.line_id(line);
		let gpio = &mut self.gpio;
		with_context!(("GPIO {}: failed to read value", id),
			Ok(gpio.read(id)?)
		)
	}

	fn wait(&mut self, wait: Wait) {
		self.gpio.delay(self.timing.duration(wait));
	}

	fn stretch_limit(&self) -> Option<u32> {
		self.stretch_limit
	}
}
