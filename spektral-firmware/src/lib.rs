// Library-Root: Wiederverwendbare Logik und Module
// Keine Standard-Bibliothek (Embedded System)
#![no_std]

// Module
pub mod config;
pub mod hal;
pub mod tasks;

// Re-exports von spektral-core
pub use spektral_core::{
    Action, As7341, CommandConsole, DispatchError, Dispatcher, Handled, IndicatorLed, Report,
    SerialPort, SpectralReading, SpectralSensor,
};

// ============================================================================
// Type-Aliase für die Hardware-Kombination
// ============================================================================

/// Dispatcher mit der realen Hardware
pub type HardwareDispatcher = Dispatcher<hal::StatusLed, hal::Sensor, embassy_time::Delay>;

/// Konsole mit der realen Hardware
pub type HardwareConsole =
    CommandConsole<hal::UsbSerial, hal::StatusLed, hal::Sensor, embassy_time::Delay>;
