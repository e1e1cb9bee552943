//! Recording GPIO lines for tests

use std::cell::RefCell;
use std::collections::{
	HashMap,
	VecDeque,
};
use std::io;
use std::rc::Rc;
use std::time::Duration;

use super::{
	Direction,
	GpioLines,
	LineId,
};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Event {
	Claim(LineId),
	Release(LineId),
	Direction(LineId, Direction),
	Write(LineId, bool),
	Read(LineId, bool),
	Delay(Duration),
}

#[derive(Default, Debug)]
struct State {
	events: Vec<Event>,
	directions: HashMap<LineId, Direction>,
	// level set by the last output direction / write
	outputs: HashMap<LineId, bool>,
	// levels returned by reads of released lines; pull-up (high) once empty
	script: HashMap<LineId, VecDeque<bool>>,
	read_errors: HashMap<LineId, usize>,
	permission_failures: usize,
}

/// Cloned handles share the same state, so tests can keep one while the bus
/// owns another.
#[derive(Clone, Default, Debug)]
pub struct MockGpio(Rc<RefCell<State>>);

impl MockGpio {
	pub fn new() -> Self {
		Self::default()
	}

	/// Levels seen by the next reads of `line` while it is an input.
	pub fn script(&self, line: LineId, levels: &[bool]) {
		self.0.borrow_mut().script.entry(line).or_default().extend(levels);
	}

	/// Script the 8 bits of `byte`, MSB first.
	pub fn script_byte(&self, line: LineId, byte: u8) {
		let bits: Vec<bool> = (0..8).rev().map(|bit| byte & (1 << bit) != 0).collect();
		self.script(line, &bits);
	}

	/// Fail the `n`-th next read of `line` (counting from 1).
	pub fn fail_read(&self, line: LineId, n: usize) {
		self.0.borrow_mut().read_errors.insert(line, n);
	}

	/// The next `count` direction changes fail with `PermissionDenied`.
	pub fn deny_permission(&self, count: usize) {
		self.0.borrow_mut().permission_failures = count;
	}

	pub fn events(&self) -> Vec<Event> {
		self.0.borrow().events.clone()
	}

	pub fn clear_events(&self) {
		self.0.borrow_mut().events.clear();
	}

	pub fn direction(&self, line: LineId) -> Option<Direction> {
		self.0.borrow().directions.get(&line).cloned()
	}

	pub fn count(&self, event: Event) -> usize {
		self.0.borrow().events.iter().filter(|&&e| e == event).count()
	}
}

impl GpioLines for MockGpio {
	fn claim(&mut self, line: LineId) -> io::Result<()> {
		self.0.borrow_mut().events.push(Event::Claim(line));
		Ok(())
	}

	fn release(&mut self, line: LineId) -> io::Result<()> {
		let mut state = self.0.borrow_mut();
		state.events.push(Event::Release(line));
		state.directions.remove(&line);
		Ok(())
	}

	fn set_direction(&mut self, line: LineId, direction: Direction) -> io::Result<()> {
		let mut state = self.0.borrow_mut();
		if state.permission_failures > 0 {
			state.permission_failures -= 1;
			return Err(io::Error::from(io::ErrorKind::PermissionDenied));
		}
		state.events.push(Event::Direction(line, direction));
		state.directions.insert(line, direction);
		match direction {
			Direction::Input => (),
			Direction::DriveHigh => { state.outputs.insert(line, true); },
			Direction::DriveLow => { state.outputs.insert(line, false); },
		}
		Ok(())
	}

	fn read(&mut self, line: LineId) -> io::Result<bool> {
		let mut state = self.0.borrow_mut();
		let fail = match state.read_errors.get_mut(&line) {
			Some(n) => {
				*n -= 1;
				*n == 0
			},
			None => false,
		};
		if fail {
			state.read_errors.remove(&line);
			return Err(io::Error::new(io::ErrorKind::Other, "injected read error"));
		}
		let direction = state.directions.get(&line).cloned().unwrap_or(Direction::Input);
		let level = if direction.is_output() {
			state.outputs.get(&line).cloned().unwrap_or(false)
		} else {
			state.script.get_mut(&line).and_then(|s| s.pop_front()).unwrap_or(true)
		};
		state.events.push(Event::Read(line, level));
		Ok(level)
	}

	fn write(&mut self, line: LineId, value: bool) -> io::Result<()> {
		let mut state = self.0.borrow_mut();
		if !state.directions.get(&line).map_or(false, |d| d.is_output()) {
			return Err(io::Error::new(io::ErrorKind::Other, "writing value of an input line"));
		}
		state.events.push(Event::Write(line, value));
		state.outputs.insert(line, value);
		Ok(())
	}

	fn delay(&mut self, duration: Duration) {
		self.0.borrow_mut().events.push(Event::Delay(duration));
	}
}
