//! Configuración del proyecto
//!
//! Variables de entorno de la aplicación y configuración del pool de base
//! de datos.

pub mod database;
pub mod environment;

pub use database::DatabaseConfig;
pub use environment::*;
