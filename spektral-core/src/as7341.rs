//! AS7341 11-Kanal Spektral-Sensor (I2C)
//!
//! Datasheet: https://ams.com/documents/20143/36005/AS7341_DS000504_3-00.pdf
//!
//! Der Sensor hat nur 6 ADCs. Die 8 sichtbaren Kanäle F1..F8 werden daher
//! in zwei Durchläufen gemessen: SMUX-Konfiguration F1..F4, dann F5..F8.

use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;

use crate::traits::SpectralSensor;
use crate::types::{CHANNEL_COUNT, SpectralReading};

/// Feste I2C-Adresse des AS7341
pub const DEFAULT_ADDRESS: u8 = 0x39;

// Register-Adressen
mod reg {
    /// SMUX-RAM (20 Bytes), nur nach `CFG6 = SMUX_WRITE` beschreibbar
    pub const SMUX_RAM: u8 = 0x00;
    /// Bank 1 (REG_BANK = 1)
    pub const CONFIG: u8 = 0x70;
    /// Bank 1 (REG_BANK = 1)
    pub const LED: u8 = 0x74;
    pub const ENABLE: u8 = 0x80;
    pub const ATIME: u8 = 0x81;
    pub const WHOAMI: u8 = 0x92;
    pub const CH0_DATA_L: u8 = 0x95;
    pub const STATUS2: u8 = 0xA3;
    pub const CFG0: u8 = 0xA9;
    pub const CFG1: u8 = 0xAA;
    pub const CFG6: u8 = 0xAF;
    pub const ASTEP_L: u8 = 0xCA;
}

// Bit-Masken
mod bits {
    pub const ENABLE_PON: u8 = 1 << 0;
    pub const ENABLE_SP_EN: u8 = 1 << 1;
    pub const ENABLE_SMUXEN: u8 = 1 << 4;
    pub const STATUS2_AVALID: u8 = 1 << 6;
    pub const CFG0_REG_BANK: u8 = 1 << 4;
    pub const CONFIG_LED_SEL: u8 = 1 << 3;
    pub const LED_ACT: u8 = 1 << 7;
    pub const LED_DRIVE_MASK: u8 = 0x7F;
    /// SMUX_CMD = 2: SMUX-Konfiguration aus RAM schreiben
    pub const CFG6_SMUX_WRITE: u8 = 2 << 3;
}

const CHIP_ID: u8 = 0x24;
const CHIP_ID_MASK: u8 = 0xFC;

/// LED-Strom-Grenzen laut Datasheet: 4 mA + 2 mA × LED_DRIVE
pub const LED_CURRENT_MIN_MA: u16 = 4;
pub const LED_CURRENT_MAX_MA: u16 = 258;

/// SMUX: F1..F4 auf ADC0..ADC3, Clear auf ADC4, NIR auf ADC5
const SMUX_F1_F4: [u8; 20] = [
    0x30, 0x01, 0x00, 0x00, 0x00, 0x42, 0x00, 0x00, 0x50, 0x00, //
    0x00, 0x00, 0x20, 0x04, 0x00, 0x30, 0x01, 0x50, 0x00, 0x06,
];

/// SMUX: F5..F8 auf ADC0..ADC3, Clear auf ADC4, NIR auf ADC5
const SMUX_F5_F8: [u8; 20] = [
    0x00, 0x00, 0x00, 0x40, 0x02, 0x00, 0x10, 0x03, 0x50, 0x10, //
    0x03, 0x00, 0x00, 0x00, 0x24, 0x00, 0x00, 0x50, 0x00, 0x06,
];

/// Analog-Verstärkung (CFG1.AGAIN)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Gain {
    X0_5 = 0,
    X1 = 1,
    X2 = 2,
    X4 = 3,
    X8 = 4,
    X16 = 5,
    X32 = 6,
    X64 = 7,
    X128 = 8,
    X256 = 9,
    X512 = 10,
}

/// Mess-Konfiguration
///
/// Integrationszeit = (ATIME + 1) × (ASTEP + 1) × 2.78 µs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    pub atime: u8,
    pub astep: u16,
    pub gain: Gain,
    /// Abstand zwischen zwei Status-Abfragen
    pub poll_interval_ms: u32,
    /// Maximale Anzahl Status-Abfragen bevor `Error::Timeout`
    pub max_polls: u32,
}

impl Default for Config {
    /// ~281 ms Integrationszeit, 128× Gain
    fn default() -> Self {
        Self {
            atime: 100,
            astep: 999,
            gain: Gain::X128,
            poll_interval_ms: 5,
            max_polls: 200,
        }
    }
}

/// AS7341 Fehler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// I2C communication error
    Bus(E),
    /// Chip ID mismatch (WHOAMI)
    InvalidChipId(u8),
    /// SMUX oder Messung nicht innerhalb von `max_polls` fertig
    Timeout,
}

/// LED-Strom in mA → LED_DRIVE Code (geklemmt auf 4..=258 mA)
pub fn led_drive_code(milliamps: u16) -> u8 {
    let clamped = milliamps.clamp(LED_CURRENT_MIN_MA, LED_CURRENT_MAX_MA);
    ((clamped - LED_CURRENT_MIN_MA) / 2) as u8
}

/// AS7341 Treiber über embedded-hal-async I2C
pub struct As7341<I2C, D> {
    i2c: I2C,
    delay: D,
    config: Config,
}

impl<I2C, D> As7341<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    pub fn new(i2c: I2C, delay: D, config: Config) -> Self {
        Self { i2c, delay, config }
    }

    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    /// Prüft die Chip-ID, schaltet den Sensor ein und setzt Integration/Gain.
    /// Die Beleuchtungs-LED ist danach aus.
    pub async fn init(&mut self) -> Result<(), Error<I2C::Error>> {
        let id = self.read_reg(reg::WHOAMI).await?;
        if id & CHIP_ID_MASK != CHIP_ID {
            return Err(Error::InvalidChipId(id));
        }

        self.write_reg(reg::ENABLE, bits::ENABLE_PON).await?;
        self.write_reg(reg::ATIME, self.config.atime).await?;
        let [astep_l, astep_h] = self.config.astep.to_le_bytes();
        self.i2c
            .write(DEFAULT_ADDRESS, &[reg::ASTEP_L, astep_l, astep_h])
            .await
            .map_err(Error::Bus)?;
        self.write_reg(reg::CFG1, self.config.gain as u8).await?;

        self.set_led(0).await
    }

    /// Setzt den LED-Strom; `0` schaltet die LED aus
    pub async fn set_led(&mut self, milliamps: u16) -> Result<(), Error<I2C::Error>> {
        self.select_led_bank(true).await?;
        let result = self.write_led_registers(milliamps).await;
        // Bank immer zurückschalten, auch nach einem Fehler
        let restore = self.select_led_bank(false).await;
        result.and(restore)
    }

    async fn write_led_registers(&mut self, milliamps: u16) -> Result<(), Error<I2C::Error>> {
        if milliamps == 0 {
            self.modify_reg(reg::CONFIG, bits::CONFIG_LED_SEL, 0).await?;
            self.write_reg(reg::LED, 0).await
        } else {
            let drive = led_drive_code(milliamps) & bits::LED_DRIVE_MASK;
            self.modify_reg(reg::CONFIG, bits::CONFIG_LED_SEL, bits::CONFIG_LED_SEL)
                .await?;
            self.write_reg(reg::LED, bits::LED_ACT | drive).await
        }
    }

    /// Misst F1..F8 in zwei SMUX-Durchläufen
    pub async fn read_all(&mut self) -> Result<SpectralReading, Error<I2C::Error>> {
        let low = self.measure(&SMUX_F1_F4).await?;
        let high = self.measure(&SMUX_F5_F8).await?;

        let mut channels = [0u16; CHANNEL_COUNT];
        channels[..4].copy_from_slice(&low[..4]);
        channels[4..].copy_from_slice(&high[..4]);
        Ok(SpectralReading::new(channels))
    }

    /// Ein Messdurchlauf: SMUX laden, messen, 6 ADC-Kanäle lesen
    async fn measure(&mut self, smux: &[u8; 20]) -> Result<[u16; 6], Error<I2C::Error>> {
        self.modify_reg(reg::ENABLE, bits::ENABLE_SP_EN, 0).await?;

        self.write_reg(reg::CFG6, bits::CFG6_SMUX_WRITE).await?;
        for (offset, value) in smux.iter().enumerate() {
            self.write_reg(reg::SMUX_RAM + offset as u8, *value).await?;
        }
        self.modify_reg(reg::ENABLE, bits::ENABLE_SMUXEN, bits::ENABLE_SMUXEN)
            .await?;
        self.poll_until(reg::ENABLE, bits::ENABLE_SMUXEN, 0).await?;

        self.modify_reg(reg::ENABLE, bits::ENABLE_SP_EN, bits::ENABLE_SP_EN)
            .await?;
        self.poll_until(reg::STATUS2, bits::STATUS2_AVALID, bits::STATUS2_AVALID)
            .await?;

        let mut raw = [0u8; 12];
        self.read_regs(reg::CH0_DATA_L, &mut raw).await?;

        let mut adc = [0u16; 6];
        for (value, pair) in adc.iter_mut().zip(raw.chunks_exact(2)) {
            *value = u16::from_le_bytes([pair[0], pair[1]]);
        }
        Ok(adc)
    }

    /// Wartet bis `(reg & mask) == expected`
    async fn poll_until(&mut self, register: u8, mask: u8, expected: u8) -> Result<(), Error<I2C::Error>> {
        for _ in 0..self.config.max_polls {
            if self.read_reg(register).await? & mask == expected {
                return Ok(());
            }
            self.delay.delay_ms(self.config.poll_interval_ms).await;
        }
        Err(Error::Timeout)
    }

    /// Register 0x60..0x74 (CONFIG, LED) liegen in Bank 1
    async fn select_led_bank(&mut self, enabled: bool) -> Result<(), Error<I2C::Error>> {
        let value = if enabled { bits::CFG0_REG_BANK } else { 0 };
        self.modify_reg(reg::CFG0, bits::CFG0_REG_BANK, value).await
    }

    async fn modify_reg(&mut self, register: u8, mask: u8, value: u8) -> Result<(), Error<I2C::Error>> {
        let current = self.read_reg(register).await?;
        self.write_reg(register, (current & !mask) | (value & mask)).await
    }

    async fn write_reg(&mut self, register: u8, value: u8) -> Result<(), Error<I2C::Error>> {
        self.i2c
            .write(DEFAULT_ADDRESS, &[register, value])
            .await
            .map_err(Error::Bus)
    }

    async fn read_reg(&mut self, register: u8) -> Result<u8, Error<I2C::Error>> {
        let mut buf = [0u8];
        self.read_regs(register, &mut buf).await?;
        Ok(buf[0])
    }

    async fn read_regs(&mut self, register: u8, buf: &mut [u8]) -> Result<(), Error<I2C::Error>> {
        self.i2c
            .write_read(DEFAULT_ADDRESS, &[register], buf)
            .await
            .map_err(Error::Bus)
    }
}

impl<I2C, D> SpectralSensor for As7341<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    type Error = Error<I2C::Error>;

    async fn set_led_current(&mut self, milliamps: u16) -> Result<(), Self::Error> {
        self.set_led(milliamps).await
    }

    async fn read_channels(&mut self) -> Result<SpectralReading, Self::Error> {
        self.read_all().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_led_drive_code_range() {
        assert_eq!(led_drive_code(4), 0);
        assert_eq!(led_drive_code(20), 8);
        assert_eq!(led_drive_code(258), 127);
    }

    #[test]
    fn test_led_drive_code_clamps() {
        assert_eq!(led_drive_code(1), 0);
        assert_eq!(led_drive_code(1000), 127);
    }
}
