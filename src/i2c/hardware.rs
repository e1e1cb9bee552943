use crate::gpio::Direction;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Line {
	/// SCL
	Clock,
	/// SDA
	Data,
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Wait {
	Half,
	Full,
}

/// Line level access to an I2C bus
pub trait Hardware {
	fn set_line(&mut self, line: Line, direction: Direction) -> crate::AResult<()>;

	/// Set the level of a line that is already in an output direction.
	fn drive(&mut self, line: Line, high: bool) -> crate::AResult<()>;

	/// Sample the current level of a line.
	fn sense(&mut self, line: Line) -> crate::AResult<bool>;

	// delay for (at least) half or a full clock period
	fn wait(&mut self, wait: Wait);

	/// How many clock periods to wait for a slave releasing SCL; `None`
	/// waits forever.
	fn stretch_limit(&self) -> Option<u32> {
		None
	}
}
