//! Spektral Core - Platform-agnostic Logic and Traits
//!
//! Diese Crate enthält KEINE esp-hal Dependencies.
//! Sie definiert Traits, das serielle Protokoll, den Dispatcher
//! und den AS7341-Treiber (nur gegen embedded-hal Traits).

#![no_std]

pub mod as7341;
pub mod console;
pub mod dispatch;
pub mod led;
pub mod logic;
pub mod traits;
pub mod types;

// Re-exports für einfachen Zugriff
pub use as7341::As7341;
pub use console::{CommandConsole, LineBuffer, Report};
pub use dispatch::{DispatchError, Dispatcher, Handled};
pub use led::ActiveLowLed;
pub use logic::{LineError, LineOutcome, ParameterError, format_reading, parse_line};
pub use traits::{IndicatorLed, LedError, SerialPort, SpectralSensor};
pub use types::{Action, CHANNEL_LABELS, SpectralReading};
