// Hardware Abstraction Layer (HAL) Module
//
// Initialisiert die esp-hal Peripherals und verbindet sie
// mit den Traits aus spektral-core.

pub mod led;
pub mod sensor;
pub mod serial;

pub use led::{StatusLed, init_status_led};
pub use sensor::{Sensor, init_sensor};
pub use serial::{SerialError, UsbSerial};
