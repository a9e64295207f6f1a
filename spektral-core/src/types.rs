//! Core Types für die Spektral-Brücke
//!
//! Datenstrukturen ohne Hardware-Dependencies

use core::fmt;

/// Anzahl der Spektral-Kanäle die pro Messung gemeldet werden (F1..F8)
pub const CHANNEL_COUNT: usize = 8;

/// Wellenlängen der Kanäle F1..F8 in nm
pub const CHANNEL_WAVELENGTHS_NM: [u16; CHANNEL_COUNT] = [415, 445, 480, 515, 555, 590, 630, 680];

/// Kanal-Labels wie sie über die serielle Schnittstelle ausgegeben werden
pub const CHANNEL_LABELS: [&str; CHANNEL_COUNT] =
    ["415", "445", "480", "515", "555", "590", "630", "680"];

/// Eine Spektral-Messung: ADC-Rohwerte der 8 Kanäle F1..F8
///
/// Wird im `spec`-Handler erzeugt, sofort als Text ausgegeben und danach verworfen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpectralReading {
    pub channels: [u16; CHANNEL_COUNT],
}

impl SpectralReading {
    pub fn new(channels: [u16; CHANNEL_COUNT]) -> Self {
        Self { channels }
    }

    /// Liefert den Rohwert für eine Wellenlänge (z.B. `555`)
    pub fn channel(&self, wavelength_nm: u16) -> Option<u16> {
        CHANNEL_WAVELENGTHS_NM
            .iter()
            .position(|&nm| nm == wavelength_nm)
            .map(|index| self.channels[index])
    }

    /// Iteriert über `(label, wert)` Paare in Kanal-Reihenfolge
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, u16)> + '_ {
        CHANNEL_LABELS.iter().copied().zip(self.channels.iter().copied())
    }
}

/// Text-Darstellung für die serielle Ausgabe:
/// `{'415': 12, '445': 34, ..., '680': 56}`
impl fmt::Display for SpectralReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (index, (label, value)) in self.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "'{}': {}", label, value)?;
        }
        f.write_str("}")
    }
}

/// Aktionen die über die serielle Schnittstelle ausgelöst werden können
///
/// Geschlossene Menge: neue Kommandos brauchen eine neue Variante.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action {
    /// `blink,<sekunden>` - Indikator-LED für eine Dauer einschalten
    Blink,
    /// `spec,<led_strom_ma>` - Spektral-Messung mit Beleuchtung
    Spec,
}

impl Action {
    /// Alle bekannten Aktionen (Lookup-Tabelle)
    pub const ALL: [Action; 2] = [Action::Blink, Action::Spec];

    /// Name der Aktion wie er im Kommando steht
    pub fn name(self) -> &'static str {
        match self {
            Action::Blink => "blink",
            Action::Spec => "spec",
        }
    }
}

impl core::convert::TryFrom<&str> for Action {
    type Error = ();

    fn try_from(name: &str) -> Result<Self, Self::Error> {
        Action::ALL
            .into_iter()
            .find(|action| action.name() == name)
            .ok_or(())
    }
}

// ============================================================================
// serde::Serialize (optional feature)
// ============================================================================

#[cfg(feature = "serde")]
impl serde::Serialize for SpectralReading {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(CHANNEL_COUNT))?;
        for (label, value) in self.iter() {
            map.serialize_entry(label, &value)?;
        }
        map.end()
    }
}

// ============================================================================
// defmt::Format Implementations (optional feature)
// ============================================================================

#[cfg(feature = "defmt")]
impl defmt::Format for SpectralReading {
    fn format(&self, fmt: defmt::Formatter) {
        let c = &self.channels;
        defmt::write!(
            fmt,
            "SpectralReading {{ 415: {}, 445: {}, 480: {}, 515: {}, 555: {}, 590: {}, 630: {}, 680: {} }}",
            c[0],
            c[1],
            c[2],
            c[3],
            c[4],
            c[5],
            c[6],
            c[7]
        )
    }
}
