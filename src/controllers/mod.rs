//! Controllers
//!
//! Orquestan repositorios y reglas de dominio; cada escritura corre en una
//! transacción propia.

pub mod customer_controller;
pub mod salesperson_controller;
pub mod vehicle_controller;
