//! DTOs de la API
//!
//! Requests validados con `validator` y responses serializadas con serde.

pub mod api_response;
pub mod customer_dto;
pub mod salesperson_dto;
pub mod vehicle_dto;
