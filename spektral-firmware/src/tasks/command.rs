// Kommando Task - Serielle Zeilen lesen, dispatchen, antworten
use defmt::{Format, debug, error, info, warn};
use embassy_time::{Delay, Duration};
use embedded_hal_async::delay::DelayNs;
use spektral_core::{
    CommandConsole, DispatchError, Dispatcher, Handled, IndicatorLed, Report, SerialPort,
    SpectralSensor,
};

use crate::config::{LINE_TIMEOUT_MS, SPEC_SETTLE_MS};
use crate::hal::{UsbSerial, init_sensor, init_status_led};
use crate::{HardwareConsole, HardwareDispatcher};

/// Kommando-Schleife - Testbare Logik ohne esp-hal Abhängigkeit
///
/// Verarbeitet Zeile für Zeile und loggt jedes Ergebnis.
/// Läuft für die gesamte Lebensdauer der Firmware; kein Fehler beendet sie.
///
/// # Trait-basierte Abstraktion
/// Die generischen Parameter erlauben:
/// - Real Hardware (UsbSerial, StatusLed, As7341) im Production-Code
/// - Mock Implementationen in Tests
pub async fn command_logic<P, L, S, D>(mut console: CommandConsole<P, L, S, D>) -> !
where
    P: SerialPort,
    P::Error: Format,
    L: IndicatorLed,
    S: SpectralSensor,
    S::Error: Format,
    D: DelayNs,
{
    info!("Console: bereit fuer Kommandos");

    loop {
        match console.poll_once().await {
            Ok(Report::KeepAlive) => debug!("Console: Keep-Alive"),
            Ok(Report::Handled(Handled::Blinked { micros })) => {
                info!("Blink: LED {} us an", micros)
            }
            Ok(Report::Handled(Handled::Captured {
                led_current_ma,
                reading,
            })) => info!("Spec: {} mA -> {}", led_current_ma, reading),
            Ok(Report::Malformed(e)) => warn!("Console: wrong arguments ({})", e),
            Ok(Report::Rejected(DispatchError::Sensor(e))) => {
                error!("Spec: Sensor-Fehler: {}", e)
            }
            Ok(Report::Rejected(DispatchError::LedReset { reading, error: e })) => {
                error!("Spec: {} gemeldet, LED nicht aus: {}", reading, e)
            }
            Ok(Report::Rejected(e)) => warn!("Console: abgelehnt: {}", e),
            Err(e) => warn!("Console: serieller Fehler: {}", e),
        }
    }
}

/// Kommando Task - Embassy Task
///
/// Übernimmt die Hardware-Initialisierung (LED, I2C + AS7341, USB CDC)
/// und ruft dann die testbare `command_logic()` Funktion auf.
///
/// # Parameter
/// - `gpio21`: On-Board LED
/// - `i2c0`, `sda`, `scl`: I2C Bus für den AS7341
/// - `usb_device`: USB-Serial-JTAG für die Kommando-Schnittstelle
#[embassy_executor::task]
pub async fn command_task(
    gpio21: esp_hal::peripherals::GPIO21<'static>,
    i2c0: esp_hal::peripherals::I2C0<'static>,
    sda: esp_hal::peripherals::GPIO5<'static>,
    scl: esp_hal::peripherals::GPIO6<'static>,
    usb_device: esp_hal::peripherals::USB_DEVICE<'static>,
) {
    let led = init_status_led(gpio21);
    let sensor = init_sensor(i2c0, sda, scl).await;
    let serial = UsbSerial::new(usb_device, Duration::from_millis(LINE_TIMEOUT_MS));

    let dispatcher: HardwareDispatcher =
        Dispatcher::new(led, sensor, Delay).with_settle_ms(SPEC_SETTLE_MS);
    let console: HardwareConsole = CommandConsole::new(serial, dispatcher);

    command_logic(console).await
}
