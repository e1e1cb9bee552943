//! Software ("bit-banged") I2C master on two GPIO lines
//!
//! Both lines are emulated open-drain: a line is either released to the bus
//! pull-up (`Direction::Input`) or pulled low (`Direction::DriveLow`). Timing
//! relies on sleeping, so only very slow clocks (about 1 kHz) are realistic.
//!
//! Layers:
//! - `Hardware`: set/sense the SDA and SCL lines, wait half or full periods
//! - `LowLevel`: start/stop conditions, byte write/read
//! - `BusOperations`: addressed transfers, always terminated by a stop condition

mod bus;
mod error;
mod hardware;
mod low_level;
mod operations;
mod timing;

pub use self::bus::{
	BusConfig,
	I2cBus,
	DEFAULT_SETUP_ATTEMPTS,
	DEFAULT_SPEED_KHZ,
};

pub use self::error::I2cError;

pub use self::hardware::{
	Hardware,
	Line,
	Wait,
};

pub use self::low_level::{
	LowLevel,
	Transaction,
};

pub use self::operations::{
	BusOperations,
	MAX_ADDRESS,
};

pub use self::timing::Timing;

#[cfg(test)]
mod testing;
