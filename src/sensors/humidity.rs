use i2cdev::core::I2CDevice;

const WHO_AM_I: u8 = 0x0f;
const DEVICE_ID: u8 = 0xbc;
const CTRL_REG1: u8 = 0x20;
// Power on, block data update, 1 Hz output rate.
const CTRL_REG1_ACTIVE: u8 = 0x85;
const HUMIDITY_OUT: u8 = 0x28;
const TEMP_OUT: u8 = 0x2a;
const H0_RH_X2: u8 = 0x30;
const H1_RH_X2: u8 = 0x31;
const T0_DEGC_X8: u8 = 0x32;
const T1_DEGC_X8: u8 = 0x33;
const T1_T0_MSB: u8 = 0x35;
const H0_T0_OUT: u8 = 0x36;
const H1_T0_OUT: u8 = 0x3a;
const T0_OUT: u8 = 0x3c;
const T1_OUT: u8 = 0x3e;

/// Factory calibration points of the humidity sensor.
///
/// Each quantity is stored as two reference points (raw output, physical value);
/// readings are linearly interpolated between them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Calibration {
    pub h0_rh: f64,
    pub h1_rh: f64,
    pub h0_out: f64,
    pub h1_out: f64,
    pub t0_degc: f64,
    pub t1_degc: f64,
    pub t0_out: f64,
    pub t1_out: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Climate {
    pub humidity: f64,
    pub temperature: f64,
}

pub struct Hts221<D> {
    device: D,
    calibration: Calibration,
}

impl Calibration {
    pub fn humidity(&self, raw: i16) -> f64 {
        interpolate(f64::from(raw), self.h0_out, self.h1_out, self.h0_rh, self.h1_rh)
            .max(0.0)
            .min(100.0)
    }

    pub fn temperature(&self, raw: i16) -> f64 {
        interpolate(
            f64::from(raw),
            self.t0_out,
            self.t1_out,
            self.t0_degc,
            self.t1_degc,
        )
    }
}

fn interpolate(x: f64, x0: f64, x1: f64, y0: f64, y1: f64) -> f64 {
    y0 + (x - x0) * (y1 - y0) / (x1 - x0)
}

impl<D> Hts221<D>
where
    D: I2CDevice,
    <D as I2CDevice>::Error: Send + Sync + 'static,
{
    pub fn new(mut device: D) -> Result<Self, failure::Error> {
        super::expect_id(&mut device, WHO_AM_I, &[DEVICE_ID], "humidity sensor")?;
        super::write_u8(&mut device, CTRL_REG1, CTRL_REG1_ACTIVE)?;
        let calibration = read_calibration(&mut device)?;

        Ok(Hts221 {
            device,
            calibration,
        })
    }

    pub fn read(&mut self) -> Result<Climate, failure::Error> {
        let humidity = super::read_i16(&mut self.device, HUMIDITY_OUT)?;
        let temperature = super::read_i16(&mut self.device, TEMP_OUT)?;

        Ok(Climate {
            humidity: self.calibration.humidity(humidity),
            temperature: self.calibration.temperature(temperature),
        })
    }
}

fn read_calibration<D>(device: &mut D) -> Result<Calibration, failure::Error>
where
    D: I2CDevice,
    <D as I2CDevice>::Error: Send + Sync + 'static,
{
    let msb = super::read_u8(device, T1_T0_MSB)?;
    let t0_x8 = u16::from(msb & 0x03) << 8 | u16::from(super::read_u8(device, T0_DEGC_X8)?);
    let t1_x8 = u16::from(msb & 0x0c) << 6 | u16::from(super::read_u8(device, T1_DEGC_X8)?);

    let calibration = Calibration {
        h0_rh: f64::from(super::read_u8(device, H0_RH_X2)?) / 2.0,
        h1_rh: f64::from(super::read_u8(device, H1_RH_X2)?) / 2.0,
        h0_out: f64::from(super::read_i16(device, H0_T0_OUT)?),
        h1_out: f64::from(super::read_i16(device, H1_T0_OUT)?),
        t0_degc: f64::from(t0_x8) / 8.0,
        t1_degc: f64::from(t1_x8) / 8.0,
        t0_out: f64::from(super::read_i16(device, T0_OUT)?),
        t1_out: f64::from(super::read_i16(device, T1_OUT)?),
    };

    if calibration.h0_out == calibration.h1_out || calibration.t0_out == calibration.t1_out {
        bail!("humidity sensor calibration is degenerate: {:?}", calibration);
    }

    Ok(calibration)
}

#[cfg(test)]
pub mod tests {
    use super::*;

    use i2cdev::mock::MockI2CDevice;

    /// 32..80 %rH over raw 0..1000, 20..30 °C over raw 0..1000, both reading 500.
    pub fn calibrated_device() -> MockI2CDevice {
        let mut device = MockI2CDevice::new();
        device.regmap.write_regs(usize::from(WHO_AM_I), &[DEVICE_ID]);
        device
            .regmap
            .write_regs(usize::from(H0_RH_X2), &[64, 160, 160, 240]);
        device.regmap.write_regs(usize::from(T1_T0_MSB), &[0x00]);
        device.regmap.write_regs(usize::from(H0_T0_OUT), &[0x00, 0x00]);
        device.regmap.write_regs(usize::from(H1_T0_OUT), &[0xe8, 0x03]);
        device
            .regmap
            .write_regs(usize::from(T0_OUT), &[0x00, 0x00, 0xe8, 0x03]);
        device
            .regmap
            .write_regs(usize::from(HUMIDITY_OUT), &[0xf4, 0x01, 0xf4, 0x01]);
        device
    }

    #[test]
    fn reads_calibrated_climate() {
        let mut sensor = Hts221::new(calibrated_device()).unwrap();

        assert_eq!(
            sensor.calibration,
            Calibration {
                h0_rh: 32.0,
                h1_rh: 80.0,
                h0_out: 0.0,
                h1_out: 1000.0,
                t0_degc: 20.0,
                t1_degc: 30.0,
                t0_out: 0.0,
                t1_out: 1000.0,
            }
        );

        let climate = sensor.read().unwrap();
        assert!((climate.humidity - 56.0).abs() < 1e-9);
        assert!((climate.temperature - 25.0).abs() < 1e-9);
    }

    #[test]
    fn temperature_msb_bits_extend_the_range() {
        let mut device = calibrated_device();
        // T0 = (0b01 << 8 | 160) / 8 = 52, T1 = (0b10 << 8 | 240) / 8 = 94
        device.regmap.write_regs(usize::from(T1_T0_MSB), &[0b1001]);

        let sensor = Hts221::new(device).unwrap();
        assert_eq!(sensor.calibration.t0_degc, 52.0);
        assert_eq!(sensor.calibration.t1_degc, 94.0);
    }

    #[test]
    fn humidity_is_clamped() {
        let calibration = Calibration {
            h0_rh: 32.0,
            h1_rh: 80.0,
            h0_out: 0.0,
            h1_out: 1000.0,
            t0_degc: 20.0,
            t1_degc: 30.0,
            t0_out: 0.0,
            t1_out: 1000.0,
        };

        assert_eq!(calibration.humidity(5000), 100.0);
        assert_eq!(calibration.humidity(-5000), 0.0);
    }

    #[test]
    fn degenerate_calibration_is_rejected() {
        let mut device = calibrated_device();
        device.regmap.write_regs(usize::from(H1_T0_OUT), &[0x00, 0x00]);

        assert!(Hts221::new(device).is_err());
    }
}
