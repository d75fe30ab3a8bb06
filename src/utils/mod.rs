//! Utilidades del sistema
//!
//! Este módulo contiene utilidades para manejo de errores, validación
//! de formatos y formateo de valores para presentación.

pub mod errors;
pub mod formatting;
pub mod validation;
