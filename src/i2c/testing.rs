//! Helpers for tests running the bus on `MockGpio`

use std::time::Duration;

use crate::gpio::{
	mock::{
		Event,
		MockGpio,
	},
	Direction,
	LineId,
};

use super::{
	BusConfig,
	I2cBus,
};

pub const SDA: LineId = LineId(2);
pub const SCL: LineId = LineId(3);

pub fn config() -> BusConfig {
	BusConfig::new(SDA, SCL)
}

// bus with default config and an empty event log
pub fn mock_bus() -> (MockGpio, I2cBus<MockGpio>) {
	mock_bus_with(&config())
}

pub fn mock_bus_with(config: &BusConfig) -> (MockGpio, I2cBus<MockGpio>) {
	let mock = MockGpio::new();
	let bus = I2cBus::open(mock.clone(), config).unwrap();
	mock.clear_events();
	(mock, bus)
}

pub fn stop_sequence(period: Duration) -> Vec<Event> {
	let half = Event::Delay(period / 2);
	vec![
		Event::Direction(SCL, Direction::DriveLow), half,
		Event::Direction(SDA, Direction::DriveLow), half,
		Event::Direction(SCL, Direction::Input), half,
		Event::Direction(SDA, Direction::Input), half,
	]
}

pub fn count_stops(events: &[Event], period: Duration) -> usize {
	let stop = stop_sequence(period);
	events.windows(stop.len()).filter(|w| *w == &stop[..]).count()
}

/// Decode the bits put on SDA by `write_byte`: SDA set, SCL released, SCL
/// read high, then a full period wait (a start condition waits half a
/// period there).
pub fn written_bits(events: &[Event], period: Duration) -> Vec<bool> {
	let mut bits = Vec::new();
	for w in events.windows(4) {
		match (w[0], w[1], w[2], w[3]) {
			(
				Event::Direction(SDA, data),
				Event::Direction(SCL, Direction::Input),
				Event::Read(SCL, true),
				Event::Delay(d),
			) if d == period => bits.push(data == Direction::Input),
			_ => (),
		}
	}
	bits
}

pub fn written_bytes(events: &[Event], period: Duration) -> Vec<u8> {
	let bits = written_bits(events, period);
	assert_eq!(bits.len() % 8, 0, "incomplete byte written: {:?}", bits);
	bits.chunks(8)
		.map(|byte| byte.iter().fold(0u8, |acc, &bit| (acc << 1) | bit as u8))
		.collect()
}

/// SDA level the master answered with after each received byte (`true` for
/// ACK): the direction set right before driving SCL high.
pub fn sent_acks(events: &[Event]) -> Vec<bool> {
	events.windows(2)
		.filter_map(|w| match (w[0], w[1]) {
			(Event::Direction(SDA, data), Event::Write(SCL, true)) => Some(data == Direction::DriveLow),
			_ => None,
		})
		.collect()
}

pub fn assert_idle(mock: &MockGpio) {
	assert_eq!(mock.direction(SDA), Some(Direction::Input), "SDA not released");
	assert_eq!(mock.direction(SCL), Some(Direction::Input), "SCL not released");
}
