use super::{
	I2cError,
	LowLevel,
};

/// Highest 7-bit address
pub const MAX_ADDRESS: u8 = 0x7f;

// buffer grows beyond this while bytes arrive
const READ_PREALLOCATE: usize = 256;

fn check_address(address: u8) -> crate::AResult<()> {
	if address > MAX_ADDRESS {
		return Err(I2cError::InvalidAddress(address).into());
	}
	Ok(())
}

fn address_write(address: u8) -> u8 {
	address << 1
}

fn address_read(address: u8) -> u8 {
	(address << 1) | 1
}

/// Addressed transfers; each one ends with a stop condition, even on errors.
pub trait BusOperations: LowLevel {
	/// Write `register` to the slave, then read `length` bytes back.
	///
	/// All bytes but the last are acknowledged.
	fn read(&mut self, address: u8, register: u8, length: usize) -> crate::AResult<Vec<u8>> {
		check_address(address)?;
		debug!("I2C read 0x{:02x} @ 0x{:02x}: {} bytes", address, register, length);

		let mut tx = self.begin_transaction();
		tx.start_condition()?;
		if !tx.write_byte(address_write(address))? {
			return Err(I2cError::UnknownSlave { address }.into());
		}
		if !tx.write_byte(register)? {
			debug!("I2C read 0x{:02x}: register 0x{:02x} not acknowledged", address, register);
		}
		tx.restart()?;
		if !tx.write_byte(address_read(address))? {
			return Err(I2cError::UnknownSlave { address }.into());
		}

		let mut data = Vec::with_capacity(length.min(READ_PREALLOCATE));
		for n in 0..length {
			data.push(tx.read_byte(n + 1 != length)?);
		}

		Ok(data)
	}

	/// Write `data` to the slave; stops at the first byte that isn't
	/// acknowledged.
	///
	/// Returns how many bytes were acknowledged; a short count is not an
	/// error.
	fn write(&mut self, address: u8, data: &[u8]) -> crate::AResult<usize> {
		check_address(address)?;
		debug!("I2C write 0x{:02x}: {} bytes", address, data.len());

		let mut tx = self.begin_transaction();
		tx.start_condition()?;
		if !tx.write_byte(address_write(address))? {
			return Err(I2cError::UnknownSlave { address }.into());
		}

		let mut sent = 0;
		for &byte in data {
			if !tx.write_byte(byte)? {
				debug!("I2C write 0x{:02x}: NACK after {} bytes", address, sent);
				break;
			}
			sent += 1;
		}

		Ok(sent)
	}

	/// Check whether a slave acknowledges its address.
	fn probe(&mut self, address: u8) -> crate::AResult<bool> {
		check_address(address)?;

		let mut tx = self.begin_transaction();
		tx.start_condition()?;
		let ack = tx.write_byte(address_write(address))?;
		debug!("I2C probe 0x{:02x}: {}", address, if ack { "ACK" } else { "NACK" });

		Ok(ack)
	}
}

impl<H: LowLevel+?Sized> BusOperations for H {
}
