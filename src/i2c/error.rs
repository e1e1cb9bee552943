use failure::Fail;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Fail)]
pub enum I2cError {
	/// SCL was low before sending a start condition; some earlier transaction
	/// didn't finish.
	#[fail(display = "I2C bus is busy (SCL held low)")]
	BusBusy,

	/// Address byte wasn't acknowledged
	#[fail(display = "Unknown slave device (address: 0x{:02x})", address)]
	UnknownSlave {
		address: u8,
	},

	#[fail(display = "Invalid 7-bit I2C address: 0x{:02x}", _0)]
	InvalidAddress(u8),

	/// Only with a configured clock stretching limit
	#[fail(display = "SCL held low by slave for more than {} clock periods", periods)]
	ClockStretchTimeout {
		periods: u32,
	},
}
