// Projekt-Konfiguration: Konstanten und Hardware-Zuordnungen
// Zielboard: Seeed XIAO ESP32-S3 + AS7341 Breakout
//
// Pins sind über die Peripheral-Typen in main.rs festgelegt:
// LED GPIO21 (active low), I2C SDA GPIO5, SCL GPIO6

use spektral_core::as7341::{Config as SensorConfig, Gain};

// ============================================================================
// I2C / AS7341
// ============================================================================

/// I2C Busfrequenz in kHz (AS7341 unterstützt Fast Mode)
pub const I2C_FREQUENCY_KHZ: u32 = 400;

/// Sensor-Konfiguration: ~281 ms Integrationszeit, 128× Gain
pub const SENSOR_CONFIG: SensorConfig = SensorConfig {
    atime: 100,
    astep: 999,
    gain: Gain::X128,
    poll_interval_ms: 5,
    max_polls: 200,
};

/// Einschwingzeit der Beleuchtungs-LED vor dem Auslesen (ms)
pub const SPEC_SETTLE_MS: u32 = 1000;

// ============================================================================
// Serielle Schnittstelle (USB CDC über USB-Serial-JTAG)
// ============================================================================

/// Zeilen-Frist in Millisekunden, gemessen ab dem ersten Byte einer Zeile
/// Ohne Frist würde eine Zeile ohne `\n` die Schleife für immer blockieren
pub const LINE_TIMEOUT_MS: u64 = 1000;

// ============================================================================
// Speicher
// ============================================================================

/// Heap-Größe für esp-rtos (Bytes)
pub const HEAP_SIZE: usize = 32 * 1024;
