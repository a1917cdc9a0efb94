use i2cdev::core::I2CDevice;

const WHO_AM_I: u8 = 0x0f;
const DEVICE_ID: u8 = 0xbd;
const CTRL_REG1: u8 = 0x20;
// Power on, 1 Hz output rate, block data update.
const CTRL_REG1_ACTIVE: u8 = 0x94;
const PRESS_OUT: u8 = 0x28;
const TEMP_OUT: u8 = 0x2b;

const COUNTS_PER_HPA: f64 = 4096.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pressure {
    pub hectopascals: f64,
    pub temperature: f64,
}

pub struct Lps25h<D> {
    device: D,
}

impl<D> Lps25h<D>
where
    D: I2CDevice,
    <D as I2CDevice>::Error: Send + Sync + 'static,
{
    pub fn new(mut device: D) -> Result<Self, failure::Error> {
        super::expect_id(&mut device, WHO_AM_I, &[DEVICE_ID], "pressure sensor")?;
        super::write_u8(&mut device, CTRL_REG1, CTRL_REG1_ACTIVE)?;
        Ok(Lps25h { device })
    }

    pub fn read(&mut self) -> Result<Pressure, failure::Error> {
        let mut raw = [0; 3];
        super::read_le_bytes(&mut self.device, PRESS_OUT, &mut raw)?;
        let temperature = super::read_i16(&mut self.device, TEMP_OUT)?;

        Ok(Pressure {
            hectopascals: hectopascals(raw),
            temperature: 42.5 + f64::from(temperature) / 480.0,
        })
    }
}

/// Converts the signed 24-bit little-endian pressure output.
fn hectopascals(raw: [u8; 3]) -> f64 {
    let counts = i32::from_le_bytes([0, raw[0], raw[1], raw[2]]) >> 8;
    f64::from(counts) / COUNTS_PER_HPA
}
