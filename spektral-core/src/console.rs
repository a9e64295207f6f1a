//! Serielle Kommando-Konsole
//!
//! Liest eine Zeile, klassifiziert sie, ruft den Dispatcher auf und sendet
//! die Antwort. Die Endlos-Schleife selbst lebt im Firmware-Task, damit dort
//! jedes Ergebnis geloggt werden kann.

use embedded_hal_async::delay::DelayNs;
use heapless::Vec;

use crate::dispatch::{DispatchError, Dispatcher, Handled};
use crate::logic::{LINE_ENDING, LineError, LineOutcome, REPLY_WRONG_ARGUMENTS, format_reading, parse_line};
use crate::traits::{IndicatorLed, SerialPort, SpectralSensor};

/// Maximale Zeilenlänge inklusive `\n`
pub const MAX_LINE_LEN: usize = 64;

/// Ergebnis einer verarbeiteten Zeile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Report<E> {
    /// Nackter `\r`, keine Ausgabe
    KeepAlive,
    /// Kommando erfolgreich ausgeführt
    Handled(Handled),
    /// Zeile hatte nicht die Form `<action>,<parameter>`
    Malformed(LineError),
    /// Kommando erkannt, aber abgelehnt oder fehlgeschlagen
    Rejected(DispatchError<E>),
}

/// Puffer für genau eine Eingabezeile
#[derive(Default)]
pub struct LineBuffer {
    bytes: Vec<u8, MAX_LINE_LEN>,
    overflowed: bool,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn overflowed(&self) -> bool {
        self.overflowed
    }

    fn clear(&mut self) {
        self.bytes.clear();
        self.overflowed = false;
    }

    fn push(&mut self, byte: u8) {
        if self.bytes.push(byte).is_err() {
            self.overflowed = true;
        }
    }

    /// Liest bis `\n` (inklusive) oder bis die Zeilen-Frist abläuft
    ///
    /// Wartet unbegrenzt auf das erste Byte; ab dort gilt eine Frist für die
    /// ganze Zeile. Überlange Zeilen werden bis zum Ende gelesen und verworfen.
    pub async fn read_line<P: SerialPort>(&mut self, port: &mut P) -> Result<(), P::Error> {
        self.clear();

        let mut byte = port.read_byte().await?;
        port.start_line();
        loop {
            self.push(byte);
            if byte == b'\n' {
                return Ok(());
            }
            match port.read_byte_bounded().await? {
                Some(next) => byte = next,
                // Frist abgelaufen: Teil-Zeile wird so verarbeitet wie sie ist
                None => return Ok(()),
            }
        }
    }
}

/// Serielle Schnittstelle + Dispatcher als ein Besitzer aller Hardware-Handles
pub struct CommandConsole<P, L, S, D> {
    port: P,
    dispatcher: Dispatcher<L, S, D>,
    line: LineBuffer,
}

impl<P, L, S, D> CommandConsole<P, L, S, D>
where
    P: SerialPort,
    L: IndicatorLed,
    S: SpectralSensor,
    D: DelayNs,
{
    pub fn new(port: P, dispatcher: Dispatcher<L, S, D>) -> Self {
        Self {
            port,
            dispatcher,
            line: LineBuffer::new(),
        }
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    pub fn dispatcher(&self) -> &Dispatcher<L, S, D> {
        &self.dispatcher
    }

    pub fn release(self) -> (P, Dispatcher<L, S, D>) {
        (self.port, self.dispatcher)
    }

    /// Verarbeitet genau eine Eingabezeile
    ///
    /// Serielle Fehler werden an den Aufrufer gegeben; alle anderen Fehler
    /// werden als Fehlerzeile beantwortet und im `Report` zurückgemeldet.
    pub async fn poll_once(&mut self) -> Result<Report<S::Error>, P::Error> {
        self.line.read_line(&mut self.port).await?;

        let outcome = if self.line.overflowed() {
            Err(LineError::TooLong)
        } else {
            parse_line(self.line.as_bytes())
        };

        let report = match outcome {
            Ok(LineOutcome::KeepAlive) => return Ok(Report::KeepAlive),
            Ok(LineOutcome::Command { action, parameter }) => {
                match self.dispatcher.act(action, parameter).await {
                    Ok(handled) => Report::Handled(handled),
                    Err(error) => Report::Rejected(error),
                }
            }
            Err(error) => Report::Malformed(error),
        };

        match &report {
            Report::Handled(Handled::Captured { reading, .. }) => {
                self.port.write_all(format_reading(reading).as_bytes()).await?;
            }
            Report::Rejected(error) => {
                // Messwerte zuerst, dann die Fehlerzeile
                if let DispatchError::LedReset { reading, .. } = error {
                    self.port.write_all(format_reading(reading).as_bytes()).await?;
                }
                self.reply(error.reply()).await?
            }
            Report::Malformed(_) => self.reply(REPLY_WRONG_ARGUMENTS).await?,
            Report::Handled(Handled::Blinked { .. }) | Report::KeepAlive => {}
        }

        Ok(report)
    }

    async fn reply(&mut self, message: &str) -> Result<(), P::Error> {
        self.port.write_all(message.as_bytes()).await?;
        self.port.write_all(LINE_ENDING.as_bytes()).await
    }
}
