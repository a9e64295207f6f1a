// Task-Modul: Enthält alle Embassy Tasks
//
// Nur ein Task: die Kommando-Schleife besitzt LED, Sensor und USB CDC.
// Kommandos laufen strikt nacheinander.

pub mod command;

// Re-export Tasks für einfachen Import
pub use command::{command_logic, command_task};
