//! Kommando-Dispatcher
//!
//! Bildet `<action>,<parameter>` auf einen der festen Handler ab
//! (`blink`, `spec`) und führt ihn aus.

use core::convert::TryFrom;

use embedded_hal_async::delay::DelayNs;

use crate::logic::{
    ParameterError, REPLY_HARDWARE_FAILURE, REPLY_UNKNOWN_ACTION, REPLY_WRONG_ARGUMENTS,
    parse_blink_duration, parse_led_current,
};
use crate::traits::{IndicatorLed, LedError, SpectralSensor};
use crate::types::{Action, SpectralReading};

/// Einschwingzeit der Beleuchtungs-LED vor dem Auslesen (ms)
pub const DEFAULT_SETTLE_MS: u32 = 1000;

/// Erfolgreich ausgeführtes Kommando
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Handled {
    /// LED war `micros` Mikrosekunden an
    Blinked { micros: u64 },
    /// Messung mit dem angegebenen LED-Strom
    Captured {
        led_current_ma: u16,
        reading: SpectralReading,
    },
}

/// Fehler beim Ausführen eines Kommandos
///
/// Jeder Fehler ist nicht-fatal: es wird eine Fehlerzeile gesendet
/// und die Schleife läuft weiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DispatchError<E> {
    /// Parameter ist keine gültige Zahl (keine Hardware wurde angefasst)
    WrongArguments(ParameterError),
    /// Aktion nicht in der Tabelle
    UnknownAction,
    /// Indikator-LED konnte nicht geschaltet werden
    Led(LedError),
    /// Sensor-Fehler während der Messung
    Sensor(E),
    /// Messung gelungen, aber die Beleuchtungs-LED ließ sich nicht ausschalten
    LedReset { reading: SpectralReading, error: E },
}

impl<E> DispatchError<E> {
    /// Fehlerzeile für die serielle Ausgabe (ohne Zeilenende)
    pub fn reply(&self) -> &'static str {
        match self {
            DispatchError::WrongArguments(_) => REPLY_WRONG_ARGUMENTS,
            DispatchError::UnknownAction => REPLY_UNKNOWN_ACTION,
            DispatchError::Led(_) | DispatchError::Sensor(_) | DispatchError::LedReset { .. } => {
                REPLY_HARDWARE_FAILURE
            }
        }
    }
}

/// Besitzt die Indikator-LED, den Sensor und die Delay-Quelle
///
/// Die Handler blockieren die Kommando-Schleife für ihre gesamte Dauer;
/// während `blink`/`spec` werden keine weiteren Zeilen gelesen.
pub struct Dispatcher<L, S, D> {
    led: L,
    sensor: S,
    delay: D,
    settle_ms: u32,
}

impl<L, S, D> Dispatcher<L, S, D>
where
    L: IndicatorLed,
    S: SpectralSensor,
    D: DelayNs,
{
    pub fn new(led: L, sensor: S, delay: D) -> Self {
        Self {
            led,
            sensor,
            delay,
            settle_ms: DEFAULT_SETTLE_MS,
        }
    }

    /// Überschreibt die Einschwingzeit vor dem Auslesen
    pub fn with_settle_ms(mut self, settle_ms: u32) -> Self {
        self.settle_ms = settle_ms;
        self
    }

    pub fn led(&self) -> &L {
        &self.led
    }

    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    pub fn release(self) -> (L, S, D) {
        (self.led, self.sensor, self.delay)
    }

    /// Sucht den Handler für `action` und ruft ihn mit `parameter` auf
    pub async fn act(
        &mut self,
        action: &str,
        parameter: &str,
    ) -> Result<Handled, DispatchError<S::Error>> {
        match Action::try_from(action) {
            Ok(Action::Blink) => self.blink(parameter).await,
            Ok(Action::Spec) => self.spec(parameter).await,
            Err(()) => Err(DispatchError::UnknownAction),
        }
    }

    /// `blink,<sekunden>`: LED an, warten, LED aus
    async fn blink(&mut self, parameter: &str) -> Result<Handled, DispatchError<S::Error>> {
        let micros = parse_blink_duration(parameter).map_err(DispatchError::WrongArguments)?;

        self.led.set_lit(true).map_err(DispatchError::Led)?;
        self.wait_micros(micros).await;
        self.led.set_lit(false).map_err(DispatchError::Led)?;

        Ok(Handled::Blinked { micros })
    }

    /// `spec,<led_strom_ma>`: beleuchten, einschwingen, 8 Kanäle lesen, LED aus
    ///
    /// Die LED wird auch dann auf 0 mA gesetzt, wenn das Auslesen fehlschlägt.
    /// Scheitert nur das Ausschalten, bleibt die Messung in
    /// `DispatchError::LedReset` erhalten.
    async fn spec(&mut self, parameter: &str) -> Result<Handled, DispatchError<S::Error>> {
        let led_current_ma = parse_led_current(parameter).map_err(DispatchError::WrongArguments)?;

        let captured = self.capture(led_current_ma).await;
        let reset = self.sensor.set_led_current(0).await;

        let reading = captured.map_err(DispatchError::Sensor)?;
        reset.map_err(|error| DispatchError::LedReset { reading, error })?;

        Ok(Handled::Captured {
            led_current_ma,
            reading,
        })
    }

    async fn capture(&mut self, led_current_ma: u16) -> Result<SpectralReading, S::Error> {
        self.sensor.set_led_current(led_current_ma).await?;
        self.delay.delay_ms(self.settle_ms).await;
        self.sensor.read_channels().await
    }

    /// DelayNs nimmt u32; lange Pulse werden in Stücke geteilt
    async fn wait_micros(&mut self, micros: u64) {
        let mut remaining = micros;
        while remaining > 0 {
            let chunk = remaining.min(u64::from(u32::MAX));
            self.delay.delay_us(chunk as u32).await;
            remaining -= chunk;
        }
    }
}
