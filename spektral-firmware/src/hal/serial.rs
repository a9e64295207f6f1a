// USB CDC über das USB-Serial-JTAG Peripheral des ESP32-S3

use embassy_time::{Duration, Instant, with_deadline};
use embedded_io_async::{Read, Write};
use esp_hal::Async;
use esp_hal::usb_serial_jtag::{UsbSerialJtag, UsbSerialJtagRx, UsbSerialJtagTx};
use spektral_core::SerialPort;

/// Fehler-Typ für die serielle Schnittstelle
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum SerialError {
    ReadFailed,
    WriteFailed,
}

/// Kommando-Schnittstelle über USB-Serial-JTAG
///
/// Einziger Leser der Eingabe. Bytes die während eines laufenden
/// Kommandos ankommen, puffert nur der Hardware-FIFO.
pub struct UsbSerial {
    rx: UsbSerialJtagRx<'static, Async>,
    tx: UsbSerialJtagTx<'static, Async>,
    line_timeout: Duration,
    line_deadline: Instant,
}

impl UsbSerial {
    /// # Parameter
    /// - `usb_device`: USB_DEVICE Peripheral
    /// - `line_timeout`: maximale Dauer einer Zeile ab ihrem ersten Byte
    pub fn new(usb_device: esp_hal::peripherals::USB_DEVICE<'static>, line_timeout: Duration) -> Self {
        let (rx, tx) = UsbSerialJtag::new(usb_device).into_async().split();
        Self {
            rx,
            tx,
            line_timeout,
            line_deadline: Instant::now(),
        }
    }
}

impl SerialPort for UsbSerial {
    type Error = SerialError;

    async fn read_byte(&mut self) -> Result<u8, Self::Error> {
        let mut buf = [0u8; 1];
        loop {
            let count = Read::read(&mut self.rx, &mut buf)
                .await
                .map_err(|_| SerialError::ReadFailed)?;
            if count == 1 {
                return Ok(buf[0]);
            }
        }
    }

    fn start_line(&mut self) {
        self.line_deadline = Instant::now() + self.line_timeout;
    }

    async fn read_byte_bounded(&mut self) -> Result<Option<u8>, Self::Error> {
        let mut buf = [0u8; 1];
        match with_deadline(self.line_deadline, Read::read(&mut self.rx, &mut buf)).await {
            Ok(Ok(1)) => Ok(Some(buf[0])),
            Ok(Ok(_)) => Ok(None),
            Ok(Err(_)) => Err(SerialError::ReadFailed),
            // Frist abgelaufen: Zeile endet hier
            Err(_) => Ok(None),
        }
    }

    async fn write_all(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        Write::write_all(&mut self.tx, bytes)
            .await
            .map_err(|_| SerialError::WriteFailed)?;
        Write::flush(&mut self.tx)
            .await
            .map_err(|_| SerialError::WriteFailed)
    }
}
