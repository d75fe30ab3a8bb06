//! Modelos del sistema
//!
//! Este módulo contiene los modelos de datos que mapean exactamente
//! al schema PostgreSQL del inventario.

pub mod customer;
pub mod salesperson;
pub mod vehicle;
