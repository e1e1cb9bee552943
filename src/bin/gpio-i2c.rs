#[macro_use]
extern crate clap;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

extern crate gpio_i2c_bitbang;
use gpio_i2c_bitbang::*;

use std::process::exit;
use std::str::FromStr;
use std::time::Duration;

use gpio_i2c_bitbang::gpio::{
	LineId,
	SysfsGpio,
	SYSFS_GPIO_BASE,
};
use gpio_i2c_bitbang::i2c::{
	BusConfig,
	BusOperations,
	I2cBus,
	MAX_ADDRESS,
};

// first and last address `detect` probes (others are reserved)
const FIRST_PROBE_ADDRESS: u8 = 0x08;
const LAST_PROBE_ADDRESS: u8 = 0x77;

/// Number given as decimal or "0x" hex
struct Number(u32);

impl FromStr for Number {
	type Err = failure::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let value = if s.starts_with("0x") || s.starts_with("0X") {
			u32::from_str_radix(&s[2..], 16)?
		} else {
			s.parse::<u32>()?
		};
		Ok(Number(value))
	}
}

fn byte(value: Number, what: &str) -> AResult<u8> {
	ensure!(value.0 <= 0xff, "{} out of range: 0x{:x}", what, value.0);
	Ok(value.0 as u8)
}

fn get_param<T>(matches: &clap::ArgMatches, name: &str) -> AResult<T>
where
	T: std::str::FromStr,
	failure::Error: From<<T as std::str::FromStr>::Err>,
{
	let param = match matches.value_of(name) {
		Some(p) => p,
		None => bail!("missing parameter {}", name),
	};
	param.parse::<T>().map_err(|e| {
		let e = failure::Error::from(e);
		let msg = format!("invalid parameter {}: {}", name, e);
		e.context(msg).into()
	})
}

fn get_optional_param<T>(matches: &clap::ArgMatches, name: &str) -> AResult<Option<T>>
where
	T: std::str::FromStr,
	failure::Error: From<<T as std::str::FromStr>::Err>,
{
	if matches.is_present(name) {
		get_param(matches, name).map(Some)
	} else {
		Ok(None)
	}
}

fn get_address(matches: &clap::ArgMatches) -> AResult<u8> {
	let address = byte(get_param(matches, "ADDRESS")?, "address")?;
	ensure!(address <= MAX_ADDRESS, "not a 7-bit I2C address: 0x{:02x}", address);
	Ok(address)
}

fn open_bus(matches: &clap::ArgMatches) -> AResult<I2cBus<SysfsGpio>> {
	let data_line: LineId = get_param(matches, "sda")?;
	let clock_line: LineId = get_param(matches, "scl")?;

	let mut config = BusConfig::new(data_line, clock_line);
	if let Some(speed) = get_optional_param::<Number>(matches, "speed")? {
		config.set_speed_khz(speed.0);
	}
	if let Some(timeout) = get_optional_param::<Number>(matches, "timeout")? {
		config.set_stretch_timeout(Some(Duration::from_millis(u64::from(timeout.0))));
	}

	let gpio = SysfsGpio::with_base(matches.value_of("sysfs").unwrap_or(SYSFS_GPIO_BASE));

	I2cBus::open(gpio, &config)
}

fn get(matches: &clap::ArgMatches, sub_m: &clap::ArgMatches) -> AResult<()> {
	let address = get_address(sub_m)?;
	let register = byte(get_param(sub_m, "REGISTER")?, "register")?;
	let length = get_optional_param::<Number>(sub_m, "LENGTH")?.map_or(1, |n| n.0 as usize);

	let mut bus = open_bus(matches)?;
	let data = bus.read(address, register, length)?;
	bus.close()?;

	let hex: Vec<String> = data.iter().map(|b| format!("0x{:02x}", b)).collect();
	println!("{}", hex.join(" "));

	Ok(())
}

fn set(matches: &clap::ArgMatches, sub_m: &clap::ArgMatches) -> AResult<()> {
	let address = get_address(sub_m)?;
	let mut data = Vec::new();
	for value in sub_m.values_of("DATA").into_iter().flatten() {
		let number = value.parse::<Number>().map_err(|e| {
			let msg = format!("invalid data byte {:?}: {}", value, e);
			failure::Error::from(e.context(msg))
		})?;
		data.push(byte(number, "data byte")?);
	}

	let mut bus = open_bus(matches)?;
	let sent = bus.write(address, &data)?;
	bus.close()?;

	println!("{}", sent);
	if sent != data.len() {
		warn!("Slave 0x{:02x} acknowledged only {} of {} bytes", address, sent, data.len());
		exit(2);
	}

	Ok(())
}

fn detect(matches: &clap::ArgMatches) -> AResult<()> {
	let mut bus = open_bus(matches)?;
	let mut found = 0;
	for address in FIRST_PROBE_ADDRESS..=LAST_PROBE_ADDRESS {
		if bus.probe(address)? {
			println!("0x{:02x}", address);
			found += 1;
		}
	}
	bus.close()?;

	info!("Found {} I2C devices", found);
	Ok(())
}

fn main_app() -> AResult<()> {
	let matches = clap_app!(@app (app_from_crate!())
		(@setting SubcommandRequiredElseHelp)
		(global_setting: clap::AppSettings::VersionlessSubcommands)
		(@arg sda: --sda +takes_value +required "GPIO line number of SDA")
		(@arg scl: --scl +takes_value +required "GPIO line number of SCL")
		(@arg speed: --speed +takes_value "Clock speed in kHz (default: 1)")
		(@arg timeout: --timeout +takes_value "Give up if a slave stretches the clock longer than this (in ms)")
		(@subcommand get =>
			(about: "read bytes from a register")
			(@arg ADDRESS: +required "7-bit slave address")
			(@arg REGISTER: +required "register to read from")
			(@arg LENGTH: "number of bytes to read (default: 1)")
		)
		(@subcommand set =>
			(about: "write bytes to a slave")
			(@arg ADDRESS: +required "7-bit slave address")
			(@arg DATA: ... "bytes to write (usually starting with the register)")
		)
		(@subcommand detect =>
			(about: "list addresses acknowledged by a slave")
		)
	)
	.arg(clap::Arg::with_name("sysfs")
		.long("sysfs")
		.takes_value(true)
		.default_value(SYSFS_GPIO_BASE)
		.help("sysfs GPIO directory"))
	.get_matches();

	match matches.subcommand() {
		("get", Some(sub_m)) => {
			get(&matches, sub_m)
		}
		("set", Some(sub_m)) => {
			set(&matches, sub_m)
		}
		("detect", _) => {
			detect(&matches)
		}
		("", _) => bail!("no subcommand"),
		(cmd, _) => bail!("not implemented subcommand {:?}", cmd),
	}
}

fn main() {
	env_logger::from_env(env_logger::Env::default().default_filter_or("info")).init();

	if let Err(e) = main_app() {
		error!("Error: {}", e);
		exit(1);
	}
}
