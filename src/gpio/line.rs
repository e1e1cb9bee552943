use std::fmt;
use std::str;

/// GPIO line number as used by the kernel
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct LineId(pub u32);

impl fmt::Display for LineId {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl str::FromStr for LineId {
	type Err = ::failure::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		// accept both "17" and "gpio17" (the sysfs directory name)
		let num = if s.starts_with("gpio") { &s[4..] } else { s };

		ensure!(!num.is_empty(), "Missing GPIO line number: {:?}", s);
		ensure!(num.bytes().all(|b| b.is_ascii_digit()), "Invalid GPIO line number: {:?}", s);

		let line = with_context!(("invalid GPIO line number: {}", num),
			Ok(num.parse::<u32>()?)
		)?;

		Ok(LineId(line))
	}
}

/// Electrical mode of a line.
///
/// Open-drain is emulated: `Input` releases the line to the bus pull-up,
/// `DriveLow` asserts it. `DriveHigh` is only used while setting up the lines
/// and never for data bits.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Direction {
	Input,
	DriveHigh,
	DriveLow,
}

impl Direction {
	/// Value for the sysfs `direction` attribute
	pub fn as_sysfs(&self) -> &'static str {
		match *self {
			Direction::Input => "in",
			Direction::DriveHigh => "high",
			Direction::DriveLow => "low",
		}
	}

	pub fn is_output(&self) -> bool {
		*self != Direction::Input
	}
}

impl fmt::Display for Direction {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str(self.as_sysfs())
	}
}
