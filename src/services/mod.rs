//! Services module
//!
//! Este módulo contiene la lógica de negocio del inventario: reglas de
//! vehículos, reglas de personas y métricas de ventas. Son funciones puras;
//! la persistencia queda en los repositorios.

pub mod person_rules;
pub mod sales_ledger;
pub mod vehicle_rules;
