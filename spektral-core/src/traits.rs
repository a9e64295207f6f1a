//! Hardware Abstraction Traits
//!
//! Diese Traits definieren Schnittstellen für Hardware-Zugriff
//! ohne konkrete Implementierung.
//!
//! Alle Implementierungen laufen auf einem einzigen Executor-Task,
//! daher keine `Send`-Bounds auf den async Methoden.
#![allow(async_fn_in_trait)]

use crate::types::SpectralReading;

/// Fehler-Typ für LED-Operationen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LedError {
    WriteFailed,
}

/// Trait für die Indikator-LED (On-Board LED)
///
/// # Implementierungen
/// - **Production:** `ActiveLowLed<Output>` (GPIO21, low = an)
/// - **Testing:** MockLed (zeichnet Zustandswechsel auf)
pub trait IndicatorLed {
    /// Schaltet die LED ein (`true`) oder aus (`false`)
    fn set_lit(&mut self, lit: bool) -> Result<(), LedError>;
}

/// Trait für den Spektral-Sensor inklusive Beleuchtungs-LED
///
/// # Implementierungen
/// - **Production:** `As7341` über I2C
/// - **Testing:** MockSensor
pub trait SpectralSensor {
    type Error;

    /// Setzt den Strom der Beleuchtungs-LED in mA. `0` schaltet die LED aus.
    async fn set_led_current(&mut self, milliamps: u16) -> Result<(), Self::Error>;

    /// Liest alle 8 Kanäle F1..F8
    async fn read_channels(&mut self) -> Result<SpectralReading, Self::Error>;
}

/// Trait für die serielle Kommando-Schnittstelle (USB CDC)
///
/// Einziger Konsument der Eingabe; Zeilen werden byteweise gelesen.
pub trait SerialPort {
    type Error;

    /// Wartet (ohne Timeout) bis ein Byte verfügbar ist
    async fn read_byte(&mut self) -> Result<u8, Self::Error>;

    /// Startet die Zeilen-Frist; wird nach dem ersten Byte einer Zeile aufgerufen
    fn start_line(&mut self);

    /// Liest das nächste Byte, solange die Zeilen-Frist läuft.
    /// `Ok(None)` wenn die Frist abgelaufen ist.
    async fn read_byte_bounded(&mut self) -> Result<Option<u8>, Self::Error>;

    /// Schreibt alle Bytes und leert den Sendepuffer
    async fn write_all(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;
}
