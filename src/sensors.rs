//! Drivers for the environmental sensor board on the Pi's I2C bus.
//!
//! The board carries three devices: a humidity sensor (which also supplies the
//! temperature), a pressure sensor and a colour sensor whose clear channel is
//! used as brightness.

use i2cdev::core::I2CDevice;

use crate::config;
use crate::model;

pub mod colour;
pub mod humidity;
pub mod pressure;

/// Source of environment readings for the collector.
pub trait Environment {
    fn read_environment(&mut self) -> Result<model::EnvironmentReading, failure::Error>;
}

pub struct SenseBoard<D> {
    humidity: humidity::Hts221<D>,
    pressure: pressure::Lps25h<D>,
    colour: colour::Tcs34725<D>,
}

impl SenseBoard<i2cdev::linux::LinuxI2CDevice> {
    pub fn open(log: &slog::Logger, config: &config::Sensor) -> Result<Self, failure::Error> {
        let device = |address: u16| {
            debug!(log, "opening I2C device";
                   "bus" => %config.i2c_bus.display(), "address" => format!("{:#04x}", address));
            i2cdev::linux::LinuxI2CDevice::new(&config.i2c_bus, address)
        };

        SenseBoard::new(
            device(config.humidity_address)?,
            device(config.pressure_address)?,
            device(config.colour_address)?,
            config.colour_gain,
            config.colour_integration_cycles,
        )
    }
}

impl<D> SenseBoard<D>
where
    D: I2CDevice,
    <D as I2CDevice>::Error: Send + Sync + 'static,
{
    pub fn new(
        humidity_device: D,
        pressure_device: D,
        colour_device: D,
        colour_gain: u8,
        colour_integration_cycles: u16,
    ) -> Result<Self, failure::Error> {
        Ok(SenseBoard {
            humidity: humidity::Hts221::new(humidity_device)?,
            pressure: pressure::Lps25h::new(pressure_device)?,
            colour: colour::Tcs34725::new(
                colour_device,
                colour::Gain::from_factor(colour_gain)?,
                colour_integration_cycles,
            )?,
        })
    }
}

impl<D> Environment for SenseBoard<D>
where
    D: I2CDevice,
    <D as I2CDevice>::Error: Send + Sync + 'static,
{
    fn read_environment(&mut self) -> Result<model::EnvironmentReading, failure::Error> {
        let climate = self.humidity.read()?;
        let pressure = self.pressure.read()?;
        let brightness = self.colour.brightness()?;

        Ok(model::EnvironmentReading {
            temperature: climate.temperature,
            pressure: pressure.hectopascals,
            humidity: climate.humidity,
            brightness,
            collected_at: chrono::Utc::now(),
        })
    }
}

fn read_u8<D>(device: &mut D, register: u8) -> Result<u8, failure::Error>
where
    D: I2CDevice,
    <D as I2CDevice>::Error: Send + Sync + 'static,
{
    Ok(device.smbus_read_byte_data(register)?)
}

fn write_u8<D>(device: &mut D, register: u8, value: u8) -> Result<(), failure::Error>
where
    D: I2CDevice,
    <D as I2CDevice>::Error: Send + Sync + 'static,
{
    Ok(device.smbus_write_byte_data(register, value)?)
}

/// Fills `buf` from consecutive registers, one byte at a time.
fn read_le_bytes<D>(device: &mut D, register: u8, buf: &mut [u8]) -> Result<(), failure::Error>
where
    D: I2CDevice,
    <D as I2CDevice>::Error: Send + Sync + 'static,
{
    for (offset, byte) in buf.iter_mut().enumerate() {
        *byte = read_u8(device, register + offset as u8)?;
    }
    Ok(())
}

fn read_i16<D>(device: &mut D, register: u8) -> Result<i16, failure::Error>
where
    D: I2CDevice,
    <D as I2CDevice>::Error: Send + Sync + 'static,
{
    let mut buf = [0; 2];
    read_le_bytes(device, register, &mut buf)?;
    Ok(i16::from_le_bytes(buf))
}

fn expect_id<D>(
    device: &mut D,
    register: u8,
    accepted: &[u8],
    name: &str,
) -> Result<(), failure::Error>
where
    D: I2CDevice,
    <D as I2CDevice>::Error: Send + Sync + 'static,
{
    let id = read_u8(device, register)?;
    if accepted.contains(&id) {
        Ok(())
    } else {
        Err(failure::err_msg(format!(
            "unexpected {} device id {:#04x}, expected one of {:02x?}",
            name, id, accepted
        )))
    }
}
