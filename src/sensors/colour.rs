use std::thread;
use std::time;

use i2cdev::core::I2CDevice;

// Every register access carries the command bit.
const COMMAND: u8 = 0x80;
const ENABLE: u8 = 0x00;
const ATIME: u8 = 0x01;
const CONTROL: u8 = 0x0f;
const ID: u8 = 0x12;
const CDATA: u8 = 0x14;

const ENABLE_POWER_ON: u8 = 0x01;
const ENABLE_ADC: u8 = 0x02;
const DEVICE_IDS: &[u8] = &[0x44, 0x4d];

const MAX_INTEGRATION_CYCLES: u16 = 256;
const COUNTS_PER_CYCLE: u32 = 1024;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gain {
    X1,
    X4,
    X16,
    X60,
}

impl Gain {
    pub fn from_factor(factor: u8) -> Result<Self, failure::Error> {
        match factor {
            1 => Ok(Gain::X1),
            4 => Ok(Gain::X4),
            16 => Ok(Gain::X16),
            60 => Ok(Gain::X60),
            other => bail!("unsupported colour sensor gain {}, expected 1, 4, 16 or 60", other),
        }
    }

    fn bits(self) -> u8 {
        match self {
            Gain::X1 => 0b00,
            Gain::X4 => 0b01,
            Gain::X16 => 0b10,
            Gain::X60 => 0b11,
        }
    }
}

pub struct Tcs34725<D> {
    device: D,
    max_count: u32,
}

impl<D> Tcs34725<D>
where
    D: I2CDevice,
    <D as I2CDevice>::Error: Send + Sync + 'static,
{
    /// Powers the sensor up; each reading integrates over `integration_cycles` × 2.4 ms.
    pub fn new(mut device: D, gain: Gain, integration_cycles: u16) -> Result<Self, failure::Error> {
        if integration_cycles == 0 || integration_cycles > MAX_INTEGRATION_CYCLES {
            bail!(
                "colour sensor integration cycles must be within 1..={}, got {}",
                MAX_INTEGRATION_CYCLES,
                integration_cycles
            );
        }

        super::expect_id(&mut device, COMMAND | ID, DEVICE_IDS, "colour sensor")?;
        super::write_u8(
            &mut device,
            COMMAND | ATIME,
            (MAX_INTEGRATION_CYCLES - integration_cycles) as u8,
        )?;
        super::write_u8(&mut device, COMMAND | CONTROL, gain.bits())?;
        super::write_u8(&mut device, COMMAND | ENABLE, ENABLE_POWER_ON)?;
        // The oscillator needs 2.4 ms after power on before the ADC may be enabled.
        thread::sleep(time::Duration::from_millis(3));
        super::write_u8(&mut device, COMMAND | ENABLE, ENABLE_POWER_ON | ENABLE_ADC)?;

        let max_count = (COUNTS_PER_CYCLE * u32::from(integration_cycles))
            .min(u32::from(u16::max_value()));

        Ok(Tcs34725 { device, max_count })
    }

    /// Clear channel count, scaled so that a saturated channel reads 256.
    pub fn brightness(&mut self) -> Result<f64, failure::Error> {
        let mut raw = [0; 2];
        super::read_le_bytes(&mut self.device, COMMAND | CDATA, &mut raw)?;
        let clear = u16::from_le_bytes(raw);

        Ok(f64::from(clear) * 256.0 / f64::from(self.max_count))
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    use i2cdev::mock::MockI2CDevice;

    pub fn device_reading(clear: u16) -> MockI2CDevice {
        let mut device = MockI2CDevice::new();
        device.regmap.write_regs(usize::from(COMMAND | ID), &[0x44]);
        device
            .regmap
            .write_regs(usize::from(COMMAND | CDATA), &clear.to_le_bytes());
        device
    }

    #[test]
    fn configures_gain_and_integration_time() {
        let sensor = Tcs34725::new(device_reading(0), Gain::X16, 4).unwrap();
        let mut device = sensor.device;

        assert_eq!(super::super::read_u8(&mut device, COMMAND | ATIME).unwrap(), 252);
        assert_eq!(super::super::read_u8(&mut device, COMMAND | CONTROL).unwrap(), 0b10);
        assert_eq!(
            super::super::read_u8(&mut device, COMMAND | ENABLE).unwrap(),
            ENABLE_POWER_ON | ENABLE_ADC
        );
    }

    #[test]
    fn brightness_scales_with_integration_time() {
        let mut short = Tcs34725::new(device_reading(512), Gain::X16, 1).unwrap();
        assert_eq!(short.brightness().unwrap(), 128.0);

        let mut long = Tcs34725::new(device_reading(65535), Gain::X1, 256).unwrap();
        assert_eq!(long.brightness().unwrap(), 256.0);
    }

    #[test]
    fn rejects_bad_settings() {
        assert!(Gain::from_factor(8).is_err());
        assert!(Tcs34725::new(device_reading(0), Gain::X1, 0).is_err());
        assert!(Tcs34725::new(device_reading(0), Gain::X1, 257).is_err());
    }
}
