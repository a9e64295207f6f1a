//! Indikator-LED über einen embedded-hal Output-Pin

use embedded_hal::digital::OutputPin;

use crate::traits::{IndicatorLed, LedError};

/// LED die bei Low-Pegel leuchtet (XIAO ESP32-S3 On-Board LED)
pub struct ActiveLowLed<P> {
    pin: P,
}

impl<P: OutputPin> ActiveLowLed<P> {
    /// Übernimmt den Pin und schaltet die LED aus
    pub fn new(mut pin: P) -> Result<Self, LedError> {
        pin.set_high().map_err(|_| LedError::WriteFailed)?;
        Ok(Self { pin })
    }

    pub fn release(self) -> P {
        self.pin
    }
}

impl<P: OutputPin> IndicatorLed for ActiveLowLed<P> {
    fn set_lit(&mut self, lit: bool) -> Result<(), LedError> {
        let result = if lit {
            self.pin.set_low()
        } else {
            self.pin.set_high()
        };
        result.map_err(|_| LedError::WriteFailed)
    }
}
