use std::fs;
use std::io::{
	self,
	Read,
	Write,
};
use std::path::{
	Path,
	PathBuf,
};

use super::{
	Direction,
	GpioLines,
	LineId,
};

pub const SYSFS_GPIO_BASE: &str = "/sys/class/gpio";

/// GPIO lines through the (legacy) sysfs interface
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct SysfsGpio {
	base: PathBuf,
}

impl SysfsGpio {
	pub fn new() -> Self {
		Self::with_base(SYSFS_GPIO_BASE)
	}

	pub fn with_base<P: Into<PathBuf>>(base: P) -> Self {
		SysfsGpio { base: base.into() }
	}

	fn line_file(&self, line: LineId, name: &str) -> PathBuf {
		self.base.join(format!("gpio{}", line)).join(name)
	}
}

impl Default for SysfsGpio {
	fn default() -> Self {
		Self::new()
	}
}

// sysfs attributes need the value in one write syscall
fn write_attribute(path: &Path, value: &str) -> io::Result<()> {
	fs::OpenOptions::new()
		.write(true)
		.truncate(true)
		.open(path)?
		.write_all(value.as_bytes())
}

// exporting an already exported line fails with EBUSY
fn ignore_busy(result: io::Result<()>) -> io::Result<()> {
	match result {
		Err(ref e) if e.raw_os_error() == Some(libc::EBUSY) => Ok(()),
		r => r,
	}
}

fn parse_level(value: u8) -> io::Result<bool> {
	match value {
		b'0' => Ok(false),
		b'1' => Ok(true),
		v => Err(io::Error::new(io::ErrorKind::InvalidData, format!("invalid GPIO value {:?}", v as char))),
	}
}

impl GpioLines for SysfsGpio {
	fn claim(&mut self, line: LineId) -> io::Result<()> {
		let result = ignore_busy(write_attribute(&self.base.join("export"), &line.to_string()));
		if result.is_ok() {
			debug!("GPIO {}: exported", line);
		}
		result
	}

	fn release(&mut self, line: LineId) -> io::Result<()> {
		write_attribute(&self.base.join("unexport"), &line.to_string())?;
		debug!("GPIO {}: unexported", line);
		Ok(())
	}

	fn set_direction(&mut self, line: LineId, direction: Direction) -> io::Result<()> {
		write_attribute(&self.line_file(line, "direction"), direction.as_sysfs())
	}

	fn read(&mut self, line: LineId) -> io::Result<bool> {
		let mut buf = [0u8];
		fs::File::open(self.line_file(line, "value"))?.read_exact(&mut buf)?;
		parse_level(buf[0])
	}

	fn write(&mut self, line: LineId, value: bool) -> io::Result<()> {
		write_attribute(&self.line_file(line, "value"), if value { "1" } else { "0" })
	}
}
