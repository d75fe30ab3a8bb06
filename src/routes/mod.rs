pub mod customer_routes;
pub mod health_routes;
pub mod salesperson_routes;
pub mod vehicle_routes;
