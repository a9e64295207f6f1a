//! Mock-Hardware für die Host-Tests
//!
//! Alle Mocks schreiben in eine gemeinsame Timeline, damit Tests die
//! Reihenfolge von LED, Warten und Sensor-Zugriffen prüfen können.
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use embedded_hal::i2c::{ErrorKind, ErrorType, NoAcknowledgeSource, Operation};
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;
use spektral_core::{IndicatorLed, LedError, SerialPort, SpectralReading, SpectralSensor};

// ============================================================================
// Timeline
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Indikator-LED an/aus
    Led(bool),
    /// Wartezeit in ns (aufeinanderfolgende Delays werden zusammengefasst)
    Wait(u64),
    /// Beleuchtungs-LED Strom in mA
    LedCurrent(u16),
    /// Kanäle gelesen
    Read,
}

pub type Timeline = Rc<RefCell<Vec<Event>>>;

pub fn timeline() -> Timeline {
    Rc::new(RefCell::new(Vec::new()))
}

/// Summe aller Wartezeiten in µs
pub fn waited_micros(timeline: &Timeline) -> u64 {
    timeline
        .borrow()
        .iter()
        .map(|event| match event {
            Event::Wait(ns) => *ns / 1_000,
            _ => 0,
        })
        .sum()
}

// ============================================================================
// Mock Delay
// ============================================================================

pub struct MockDelay {
    pub timeline: Timeline,
}

impl MockDelay {
    pub fn new(timeline: &Timeline) -> Self {
        Self {
            timeline: timeline.clone(),
        }
    }
}

impl DelayNs for MockDelay {
    async fn delay_ns(&mut self, ns: u32) {
        let mut events = self.timeline.borrow_mut();
        match events.last_mut() {
            Some(Event::Wait(total)) => *total += u64::from(ns),
            _ => events.push(Event::Wait(u64::from(ns))),
        }
    }
}

// ============================================================================
// Mock Indicator LED
// ============================================================================

pub struct MockLed {
    pub timeline: Timeline,
    pub lit: bool,
    pub fail_next_write: bool,
}

impl MockLed {
    pub fn new(timeline: &Timeline) -> Self {
        Self {
            timeline: timeline.clone(),
            lit: false,
            fail_next_write: false,
        }
    }
}

impl IndicatorLed for MockLed {
    fn set_lit(&mut self, lit: bool) -> Result<(), LedError> {
        if self.fail_next_write {
            self.fail_next_write = false;
            return Err(LedError::WriteFailed);
        }
        self.lit = lit;
        self.timeline.borrow_mut().push(Event::Led(lit));
        Ok(())
    }
}

// ============================================================================
// Mock Spectral Sensor
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockSensorError;

pub struct MockSensor {
    pub timeline: Timeline,
    pub reading: SpectralReading,
    pub led_current: u16,
    pub fail_read: bool,
    /// Ausschalten (0 mA) schlägt fehl
    pub fail_led_reset: bool,
}

impl MockSensor {
    pub fn new(timeline: &Timeline, reading: SpectralReading) -> Self {
        Self {
            timeline: timeline.clone(),
            reading,
            led_current: 0,
            fail_read: false,
            fail_led_reset: false,
        }
    }
}

impl SpectralSensor for MockSensor {
    type Error = MockSensorError;

    async fn set_led_current(&mut self, milliamps: u16) -> Result<(), Self::Error> {
        if milliamps == 0 && self.fail_led_reset {
            return Err(MockSensorError);
        }
        self.led_current = milliamps;
        self.timeline.borrow_mut().push(Event::LedCurrent(milliamps));
        Ok(())
    }

    async fn read_channels(&mut self) -> Result<SpectralReading, Self::Error> {
        if self.fail_read {
            return Err(MockSensorError);
        }
        self.timeline.borrow_mut().push(Event::Read);
        Ok(self.reading)
    }
}

// ============================================================================
// Mock Serial Port
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockSerialError {
    /// Keine Eingabe mehr vorhanden (Test-Ende)
    Exhausted,
    WriteFailed,
}

/// Skriptgesteuerte serielle Schnittstelle
///
/// `None` im Eingabe-Skript steht für eine abgelaufene Zeilen-Frist.
/// Mit `line_budget` läuft die Frist zusätzlich nach so vielen Bytes
/// hinter dem ersten Byte einer Zeile ab (Sender ohne Pause).
#[derive(Default)]
pub struct MockSerial {
    pub input: VecDeque<Option<u8>>,
    pub output: Vec<u8>,
    pub fail_writes: bool,
    pub line_budget: Option<usize>,
    pub line_bytes: usize,
}

impl MockSerial {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input(bytes: &[u8]) -> Self {
        let mut serial = Self::new();
        serial.feed(bytes);
        serial
    }

    pub fn feed(&mut self, bytes: &[u8]) {
        self.input.extend(bytes.iter().copied().map(Some));
    }

    pub fn timeout(&mut self) {
        self.input.push_back(None);
    }

    pub fn output_str(&self) -> &str {
        std::str::from_utf8(&self.output).expect("output is UTF-8")
    }
}

impl SerialPort for MockSerial {
    type Error = MockSerialError;

    async fn read_byte(&mut self) -> Result<u8, Self::Error> {
        loop {
            match self.input.pop_front() {
                Some(Some(byte)) => return Ok(byte),
                // Timeouts sind beim Warten auf das erste Byte bedeutungslos
                Some(None) => continue,
                None => return Err(MockSerialError::Exhausted),
            }
        }
    }

    fn start_line(&mut self) {
        self.line_bytes = 0;
    }

    async fn read_byte_bounded(&mut self) -> Result<Option<u8>, Self::Error> {
        if self.line_budget.is_some_and(|budget| self.line_bytes >= budget) {
            return Ok(None);
        }
        let byte = self.input.pop_front().flatten();
        if byte.is_some() {
            self.line_bytes += 1;
        }
        Ok(byte)
    }

    async fn write_all(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        if self.fail_writes {
            return Err(MockSerialError::WriteFailed);
        }
        self.output.extend_from_slice(bytes);
        Ok(())
    }
}

// ============================================================================
// AS7341 Register-Modell (Mock I2C)
// ============================================================================

pub const AS7341_ADDRESS: u8 = 0x39;

pub const REG_CONFIG: u8 = 0x70;
pub const REG_LED: u8 = 0x74;
pub const REG_ENABLE: u8 = 0x80;
pub const REG_ATIME: u8 = 0x81;
pub const REG_WHOAMI: u8 = 0x92;
pub const REG_CH0_DATA_L: u8 = 0x95;
pub const REG_STATUS2: u8 = 0xA3;
pub const REG_CFG0: u8 = 0xA9;
pub const REG_CFG1: u8 = 0xAA;
pub const REG_CFG6: u8 = 0xAF;
pub const REG_ASTEP_L: u8 = 0xCA;
pub const REG_ASTEP_H: u8 = 0xCB;

const ENABLE_PON: u8 = 0x01;
const ENABLE_SP_EN: u8 = 0x02;
const ENABLE_SMUXEN: u8 = 0x10;
const STATUS2_AVALID: u8 = 0x40;
const CFG0_REG_BANK: u8 = 0x10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmuxConfig {
    None,
    F1F4,
    F5F8,
}

/// Simuliert die Register des AS7341 inklusive SMUX und Datenbereit-Flag
pub struct MockAs7341Bus {
    pub regs: [u8; 256],
    pointer: u8,
    /// ADC0..ADC5 Werte wenn F1..F4 geschaltet sind
    pub adc_f1_f4: [u16; 6],
    /// ADC0..ADC5 Werte wenn F5..F8 geschaltet sind
    pub adc_f5_f8: [u16; 6],
    pub active_smux: SmuxConfig,
    /// Zugriffe auf CONFIG/LED ohne REG_BANK
    pub bank_violations: usize,
    /// SMUX-RAM Schreibzugriffe ohne SMUX_CMD = write
    pub smux_violations: usize,
    /// Anzahl abgeschlossener Messungen
    pub measurements: usize,
    pub never_ready: bool,
    pub fail_all: bool,
}

impl MockAs7341Bus {
    pub fn new() -> Self {
        let mut regs = [0u8; 256];
        regs[REG_WHOAMI as usize] = 0x24;
        Self {
            regs,
            pointer: 0,
            adc_f1_f4: [0; 6],
            adc_f5_f8: [0; 6],
            active_smux: SmuxConfig::None,
            bank_violations: 0,
            smux_violations: 0,
            measurements: 0,
            never_ready: false,
            fail_all: false,
        }
    }

    pub fn reg(&self, register: u8) -> u8 {
        self.regs[register as usize]
    }

    fn check_bank(&mut self, register: u8) {
        if (0x60..=0x74).contains(&register) && self.regs[REG_CFG0 as usize] & CFG0_REG_BANK == 0 {
            self.bank_violations += 1;
        }
    }

    fn read(&mut self, register: u8) -> u8 {
        self.check_bank(register);
        self.regs[register as usize]
    }

    fn write(&mut self, register: u8, value: u8) {
        self.check_bank(register);

        if register < 0x14 && self.regs[REG_CFG6 as usize] != 0x10 {
            self.smux_violations += 1;
        }

        if register != REG_ENABLE {
            self.regs[register as usize] = value;
            return;
        }

        let mut value = value;
        if value & ENABLE_SMUXEN != 0 {
            // SMUX-RAM → aktive Konfiguration (F5 links liegt auf 0x06)
            self.active_smux = match (self.regs[0x01], self.regs[0x06]) {
                (0x01, _) => SmuxConfig::F1F4,
                (_, 0x10) => SmuxConfig::F5F8,
                _ => SmuxConfig::None,
            };
            value &= !ENABLE_SMUXEN;
        }

        if value & ENABLE_SP_EN != 0 && !self.never_ready {
            let adc = match self.active_smux {
                SmuxConfig::F1F4 => self.adc_f1_f4,
                SmuxConfig::F5F8 => self.adc_f5_f8,
                SmuxConfig::None => [0; 6],
            };
            for (index, value) in adc.iter().enumerate() {
                let [low, high] = value.to_le_bytes();
                self.regs[REG_CH0_DATA_L as usize + 2 * index] = low;
                self.regs[REG_CH0_DATA_L as usize + 2 * index + 1] = high;
            }
            self.regs[REG_STATUS2 as usize] |= STATUS2_AVALID;
            self.measurements += 1;
        } else {
            self.regs[REG_STATUS2 as usize] &= !STATUS2_AVALID;
        }

        self.regs[REG_ENABLE as usize] = value;
    }

    pub fn powered_on(&self) -> bool {
        self.reg(REG_ENABLE) & ENABLE_PON != 0
    }

    pub fn bank_selected(&self) -> bool {
        self.reg(REG_CFG0) & CFG0_REG_BANK != 0
    }
}

impl ErrorType for MockAs7341Bus {
    type Error = ErrorKind;
}

impl I2c for MockAs7341Bus {
    async fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if self.fail_all {
            return Err(ErrorKind::Other);
        }
        if address != AS7341_ADDRESS {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }

        for operation in operations {
            match operation {
                Operation::Write(bytes) => {
                    let Some((&register, data)) = bytes.split_first() else {
                        continue;
                    };
                    self.pointer = register;
                    for &byte in data {
                        self.write(self.pointer, byte);
                        self.pointer = self.pointer.wrapping_add(1);
                    }
                }
                Operation::Read(buf) => {
                    for byte in buf.iter_mut() {
                        *byte = self.read(self.pointer);
                        self.pointer = self.pointer.wrapping_add(1);
                    }
                }
            }
        }
        Ok(())
    }
}
