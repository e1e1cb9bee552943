use std::ops::{
	Deref,
	DerefMut,
};

use crate::gpio::Direction;

use super::{
	Hardware,
	I2cError,
	Line,
	Wait,
};

/// Sends a stop condition when dropped, whatever way the transaction ends.
pub struct Transaction<'a, H: ?Sized+LowLevel+'a>(&'a mut H);

impl<'a, H: ?Sized+LowLevel> Transaction<'a, H> {
	// repeated start; with a stop in between as some slaves (AVR) get stuck
	// with SCL low on a plain repeated start
	pub fn restart(&mut self) -> crate::AResult<()> {
		self.stop_condition()?;
		self.start_condition()
	}
}

impl<'a, H: ?Sized+LowLevel> Drop for Transaction<'a, H> {
	fn drop(&mut self) {
		if let Err(e) = self.0.stop_condition() {
			error!("Failed to send I2C stop condition: {}", e);
		}
	}
}

impl<'a, H: ?Sized+LowLevel> Deref for Transaction<'a, H> {
	type Target = H;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl<'a, H: ?Sized+LowLevel> DerefMut for Transaction<'a, H> {
	fn deref_mut(&mut self) -> &mut Self::Target {
		&mut self.0
	}
}

trait InternalLowLevel: Hardware {
	// poll (one period apart) until the slave releases SCL
	fn _wait_for_clock(&mut self) -> crate::AResult<()> {
		let limit = self.stretch_limit();
		let mut polls = 0u32;
		while !self.sense(Line::Clock)? {
			if let Some(limit) = limit {
				if polls >= limit {
					return Err(I2cError::ClockStretchTimeout { periods: limit }.into());
				}
			}
			polls += 1;
			self.wait(Wait::Full);
		}
		if polls > 0 {
			trace!("clock stretched for {} periods", polls);
		}
		Ok(())
	}

	fn _stop_sequence(&mut self) -> crate::AResult<()> {
		self.set_line(Line::Clock, Direction::DriveLow)?;
		self.wait(Wait::Half);
		self.set_line(Line::Data, Direction::DriveLow)?;
		self.wait(Wait::Half);
		self.set_line(Line::Clock, Direction::Input)?;
		self.wait(Wait::Half);
		self.set_line(Line::Data, Direction::Input)?;
		self.wait(Wait::Half);
		Ok(())
	}
}

impl<H: Hardware+?Sized> InternalLowLevel for H {
}

pub trait LowLevel: Hardware {
	/// Start condition (also used as repeated start): SDA falls while SCL is
	/// high.
	///
	/// Fails with `I2cError::BusBusy` if SCL is low after releasing both
	/// lines.
	fn start_condition(&mut self) -> crate::AResult<()> {
		trace!("start condition");
		self.wait(Wait::Full);
		self.set_line(Line::Data, Direction::Input)?;
		self.set_line(Line::Clock, Direction::Input)?;
		if !self.sense(Line::Clock)? {
			return Err(I2cError::BusBusy.into());
		}

		self.wait(Wait::Half);
		self.set_line(Line::Clock, Direction::Input)?;
		self.wait(Wait::Half);
		self.set_line(Line::Data, Direction::DriveLow)?;
		self.wait(Wait::Full);
		Ok(())
	}

	/// Stop condition: SDA rises while SCL is high; leaves both lines
	/// released.
	fn stop_condition(&mut self) -> crate::AResult<()> {
		trace!("stop condition");
		let result = self._stop_sequence();
		if result.is_err() {
			// don't leave anything pulled low
			for &line in &[Line::Clock, Line::Data] {
				if let Err(e) = self.set_line(line, Direction::Input) {
					warn!("Failed to release {:?} line: {}", line, e);
				}
			}
		}
		result
	}

	/// Send a byte (MSB first); returns whether the slave acknowledged it.
	fn write_byte(&mut self, byte: u8) -> crate::AResult<bool> {
		trace!("write 0x{:02x}", byte);
		self.set_line(Line::Clock, Direction::DriveLow)?;
		self.wait(Wait::Full);

		for bit in (0..8).rev() {
			let data = if 0 != byte & (1 << bit) { Direction::Input } else { Direction::DriveLow };
			self.set_line(Line::Data, data)?;
			self.set_line(Line::Clock, Direction::Input)?;
			self._wait_for_clock()?;
			self.wait(Wait::Full);
			self.set_line(Line::Clock, Direction::DriveLow)?;
			self.set_line(Line::Data, Direction::Input)?;
			self.wait(Wait::Full);
		}

		// ACK bit: slave pulls SDA low
		self.set_line(Line::Data, Direction::Input)?;
		self.set_line(Line::Clock, Direction::Input)?;
		self.wait(Wait::Half);
		let ack = !self.sense(Line::Data)?;
		self.wait(Wait::Half);
		self._wait_for_clock()?;
		self.set_line(Line::Clock, Direction::DriveLow)?;

		trace!("write 0x{:02x}: {}", byte, if ack { "ACK" } else { "NACK" });
		Ok(ack)
	}

	/// Receive a byte (MSB first); answers with ACK if `ack`, otherwise
	/// NACK (used for the last byte of a transfer).
	fn read_byte(&mut self, ack: bool) -> crate::AResult<u8> {
		let mut result = 0u8;

		self.set_line(Line::Clock, Direction::DriveLow)?;
		self.wait(Wait::Full);
		self.set_line(Line::Data, Direction::Input)?;

		for _ in 0..8 {
			self.set_line(Line::Clock, Direction::Input)?;
			self.wait(Wait::Half);
			result = (result << 1) | (self.sense(Line::Data)? as u8);
			self.wait(Wait::Half);
			self.set_line(Line::Clock, Direction::DriveLow)?;
			self.wait(Wait::Full);
		}

		self.set_line(Line::Data, if ack { Direction::DriveLow } else { Direction::Input })?;

		// master clocks its own ACK/NACK bit
		self.drive(Line::Clock, true)?;
		self.wait(Wait::Full);
		self.drive(Line::Clock, false)?;
		self.wait(Wait::Full);

		trace!("read 0x{:02x} ({})", result, if ack { "ACK" } else { "NACK" });
		Ok(result)
	}

	/// Begin a transaction; the returned guard sends the stop condition when
	/// dropped. The start condition is up to the caller.
	fn begin_transaction(&mut self) -> Transaction<Self> {
		Transaction(self)
	}
}

impl<H: Hardware+?Sized> LowLevel for H {
}
