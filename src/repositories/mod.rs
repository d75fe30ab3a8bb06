//! Repositorios
//!
//! Acceso a PostgreSQL con SQLx. Las escrituras reciben la conexión de la
//! transacción abierta por el controlador.

pub mod customer_repository;
pub mod salesperson_repository;
pub mod vehicle_repository;
