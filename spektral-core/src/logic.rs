//! Pure Protocol Logic
//!
//! Zeilen-Parser, Parameter-Parser und Text-Ausgabe für das serielle Protokoll.
//! Funktionen ohne Hardware-Dependencies (testbar!)

use core::fmt::Write;

use heapless::String;

use crate::as7341::{LED_CURRENT_MAX_MA, LED_CURRENT_MIN_MA};
use crate::types::SpectralReading;

/// Antwort bei falscher Feld-Anzahl, Encoding-Fehler oder ungültigem Parameter
pub const REPLY_WRONG_ARGUMENTS: &str = "Error: wrong arguments";

/// Antwort bei unbekannter Aktion
pub const REPLY_UNKNOWN_ACTION: &str = "Error: Unknown action";

/// Antwort wenn LED oder Sensor während eines Kommandos versagen
pub const REPLY_HARDWARE_FAILURE: &str = "Error: hardware failure";

/// Zeilenende für alle Ausgaben
pub const LINE_ENDING: &str = "\r\n";

/// Puffergröße für eine formatierte Messung inklusive Zeilenende
/// (8 × `'415': 65535` + Trennzeichen = 112 Zeichen)
pub const READING_LINE_CAPACITY: usize = 128;

/// Ergebnis der Zeilen-Analyse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome<'a> {
    /// Nackter Carriage-Return: Keep-Alive, wird ignoriert
    KeepAlive,
    /// Zwei Felder `<action>,<parameter>`
    Command { action: &'a str, parameter: &'a str },
}

/// Warum eine Zeile nicht als Kommando interpretiert werden konnte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineError {
    /// Kein gültiges UTF-8
    Encoding,
    /// Falsche Anzahl Komma-getrennter Felder
    FieldCount(usize),
    /// Zeile länger als der Zeilenpuffer
    TooLong,
}

/// Fehler beim Parsen eines Kommando-Parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParameterError {
    /// Keine Zahl
    NotANumber,
    /// Blink-Dauer negativ, NaN oder unendlich
    OutOfRange,
}

/// Analysiert eine rohe Eingabezeile (inklusive Zeilenende)
///
/// # Beispiele
///
/// ```
/// # use spektral_core::logic::{parse_line, LineOutcome};
/// let outcome = parse_line(b"blink,0.5\n");
/// assert_eq!(outcome, Ok(LineOutcome::Command { action: "blink", parameter: "0.5" }));
/// ```
pub fn parse_line(raw: &[u8]) -> Result<LineOutcome<'_>, LineError> {
    // Nur der exakte Einzel-CR ist ein Keep-Alive; "\r\n" ist ein leeres Kommando
    if raw == b"\r" {
        return Ok(LineOutcome::KeepAlive);
    }

    let text = core::str::from_utf8(raw)
        .map_err(|_| LineError::Encoding)?
        .trim();

    let mut fields = text.split(',');
    match (fields.next(), fields.next(), fields.next()) {
        (Some(action), Some(parameter), None) => Ok(LineOutcome::Command { action, parameter }),
        _ => Err(LineError::FieldCount(text.split(',').count())),
    }
}

/// Parst die Blink-Dauer in Sekunden und liefert Mikrosekunden
///
/// Erlaubt sind endliche Werte `>= 0` (z.B. `0.5`, `2`, `1e-3`).
pub fn parse_blink_duration(parameter: &str) -> Result<u64, ParameterError> {
    let seconds: f64 = parameter
        .trim()
        .parse()
        .map_err(|_| ParameterError::NotANumber)?;

    if !seconds.is_finite() || seconds < 0.0 {
        return Err(ParameterError::OutOfRange);
    }

    // Auf µs gerundet; `as` sättigt bei sehr großen Werten
    Ok((seconds * 1_000_000.0 + 0.5) as u64)
}

/// Parst den LED-Strom für eine Spektral-Messung in mA
///
/// Jede Ganzzahl ist gültig und wird auf den Chip-Bereich geklemmt:
/// `0` schaltet die LED aus, negative Werte und 1..3 ergeben 4 mA,
/// alles über 258 ergibt 258 mA. Nur Nicht-Ganzzahlen sind ein Fehler.
pub fn parse_led_current(parameter: &str) -> Result<u16, ParameterError> {
    let parameter = parameter.trim();
    let milliamps = match parameter.parse::<i64>() {
        Ok(value) => value,
        // Ganzzahl jenseits von i64: nur das Vorzeichen zählt
        Err(_) if is_integer_literal(parameter) => {
            if parameter.starts_with('-') {
                i64::MIN
            } else {
                i64::MAX
            }
        }
        Err(_) => return Err(ParameterError::NotANumber),
    };

    if milliamps == 0 {
        return Ok(0);
    }
    let clamped = milliamps.clamp(
        i64::from(LED_CURRENT_MIN_MA),
        i64::from(LED_CURRENT_MAX_MA),
    );
    Ok(clamped as u16)
}

fn is_integer_literal(text: &str) -> bool {
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Formatiert eine Messung als eine Ausgabezeile inklusive `\r\n`
pub fn format_reading(reading: &SpectralReading) -> String<READING_LINE_CAPACITY> {
    let mut line = String::new();
    // Kapazität reicht für 8 × u16, write! kann hier nicht überlaufen
    let _ = write!(line, "{}{}", reading, LINE_ENDING);
    line
}
