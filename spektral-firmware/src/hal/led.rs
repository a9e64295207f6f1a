// Indikator-LED: On-Board LED des XIAO ESP32-S3 (GPIO21, active low)

use esp_hal::gpio::{Level, Output, OutputConfig};
use spektral_core::ActiveLowLed;

/// Indikator-LED auf einem esp-hal Output-Pin
pub type StatusLed = ActiveLowLed<Output<'static>>;

/// Konfiguriert GPIO21 als Ausgang; die LED startet aus (High)
pub fn init_status_led(gpio21: esp_hal::peripherals::GPIO21<'static>) -> StatusLed {
    let pin = Output::new(gpio21, Level::High, OutputConfig::default());

    // Output::set_high ist infallible
    match ActiveLowLed::new(pin) {
        Ok(led) => led,
        Err(e) => defmt::panic!("LED: Init fehlgeschlagen: {}", e),
    }
}
