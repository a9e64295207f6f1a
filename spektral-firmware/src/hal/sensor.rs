// AS7341 Spektral-Sensor am I2C0 Bus
//
// Initialisierungsfehler sind fatal: ohne Sensor gibt es nichts zu tun.

use defmt::info;
use embassy_time::Delay;
use esp_hal::Async;
use esp_hal::i2c::master::{Config as I2cConfig, I2c};
use esp_hal::time::Rate;
use spektral_core::As7341;

use crate::config::{I2C_FREQUENCY_KHZ, SENSOR_CONFIG};

/// AS7341 auf dem async I2C-Treiber von esp-hal
pub type Sensor = As7341<I2c<'static, Async>, Delay>;

/// Öffnet I2C0 auf SDA/SCL und initialisiert den AS7341
///
/// # Parameter
/// - `i2c0`: I2C0 Peripheral
/// - `sda`: GPIO5 (Daten)
/// - `scl`: GPIO6 (Takt)
///
/// # Panics
/// Wenn der Bus nicht konfiguriert werden kann oder der Sensor nicht antwortet.
pub async fn init_sensor(
    i2c0: esp_hal::peripherals::I2C0<'static>,
    sda: esp_hal::peripherals::GPIO5<'static>,
    scl: esp_hal::peripherals::GPIO6<'static>,
) -> Sensor {
    let i2c_config = I2cConfig::default().with_frequency(Rate::from_khz(I2C_FREQUENCY_KHZ));
    let i2c = match I2c::new(i2c0, i2c_config) {
        Ok(i2c) => i2c.with_sda(sda).with_scl(scl).into_async(),
        Err(e) => defmt::panic!("I2C: Konfiguration fehlgeschlagen: {}", e),
    };

    let mut sensor = As7341::new(i2c, Delay, SENSOR_CONFIG);
    if let Err(e) = sensor.init().await {
        defmt::panic!("AS7341: Init fehlgeschlagen: {}", e);
    }

    info!("AS7341: bereit ({})", SENSOR_CONFIG);
    sensor
}
