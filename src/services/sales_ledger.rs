//! Métricas de ventas por vendedor
//!
//! Se recalculan en cada lectura a partir de los vehículos vendidos
//! atribuidos al vendedor (O(vehículos atribuidos) por request); no hay
//! cache ni ledger incremental.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::cmp::Ordering;
use std::str::FromStr;
use uuid::Uuid;

use crate::models::salesperson::Salesperson;
use crate::models::vehicle::Vehicle;
use crate::services::vehicle_rules::calculate_commission;

/// Métricas agregadas de un vendedor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SalesMetrics {
    pub total_commission: Decimal,
    pub total_sales: Decimal,
    pub total_vehicles_sold: i64,
}

impl Default for SalesMetrics {
    fn default() -> Self {
        Self {
            total_commission: two_places(Decimal::ZERO),
            total_sales: two_places(Decimal::ZERO),
            total_vehicles_sold: 0,
        }
    }
}

fn two_places(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
    rounded.rescale(2);
    rounded
}

fn sold_by(salesperson_id: Uuid, vehicles: &[Vehicle]) -> impl Iterator<Item = &Vehicle> {
    vehicles
        .iter()
        .filter(move |vehicle| vehicle.sold && vehicle.salesperson_id == Some(salesperson_id))
}

/// Suma de comisiones (cada una ya redondeada a 2 decimales)
pub fn total_commission(salesperson_id: Uuid, vehicles: &[Vehicle], rate: Decimal) -> Decimal {
    two_places(
        sold_by(salesperson_id, vehicles)
            .map(|vehicle| calculate_commission(vehicle, rate))
            .sum(),
    )
}

/// Suma de precios de los vehículos vendidos
pub fn total_sales(salesperson_id: Uuid, vehicles: &[Vehicle]) -> Decimal {
    two_places(
        sold_by(salesperson_id, vehicles)
            .map(|vehicle| Decimal::from(vehicle.price))
            .sum(),
    )
}

/// Número de vehículos vendidos
pub fn total_vehicles_sold(salesperson_id: Uuid, vehicles: &[Vehicle]) -> i64 {
    sold_by(salesperson_id, vehicles).count() as i64
}

/// Las tres métricas de una pasada
pub fn compute_metrics(salesperson_id: Uuid, vehicles: &[Vehicle], rate: Decimal) -> SalesMetrics {
    SalesMetrics {
        total_commission: total_commission(salesperson_id, vehicles, rate),
        total_sales: total_sales(salesperson_id, vehicles),
        total_vehicles_sold: total_vehicles_sold(salesperson_id, vehicles),
    }
}

/// Vendedor junto con sus métricas, para listados
#[derive(Debug, Clone)]
pub struct SalespersonSummary {
    pub salesperson: Salesperson,
    pub metrics: SalesMetrics,
}

/// Orden permitido en el listado de vendedores
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SalespersonOrdering {
    TotalSalesAsc,
    TotalSalesDesc,
    VehiclesSoldAsc,
    VehiclesSoldDesc,
}

impl SalespersonOrdering {
    fn is_descending(&self) -> bool {
        matches!(
            self,
            SalespersonOrdering::TotalSalesDesc | SalespersonOrdering::VehiclesSoldDesc
        )
    }

    fn compare_metric(&self, a: &SalesMetrics, b: &SalesMetrics) -> Ordering {
        match self {
            SalespersonOrdering::TotalSalesAsc | SalespersonOrdering::TotalSalesDesc => {
                a.total_sales.cmp(&b.total_sales)
            }
            SalespersonOrdering::VehiclesSoldAsc | SalespersonOrdering::VehiclesSoldDesc => {
                a.total_vehicles_sold.cmp(&b.total_vehicles_sold)
            }
        }
    }
}

impl FromStr for SalespersonOrdering {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "total_sales" => Ok(SalespersonOrdering::TotalSalesAsc),
            "-total_sales" => Ok(SalespersonOrdering::TotalSalesDesc),
            "vehicles_sold" => Ok(SalespersonOrdering::VehiclesSoldAsc),
            "-vehicles_sold" => Ok(SalespersonOrdering::VehiclesSoldDesc),
            other => Err(format!(
                "Unknown salesperson ordering '{}', expected total_sales, -total_sales, vehicles_sold or -vehicles_sold",
                other
            )),
        }
    }
}

fn compare_names(a: &Salesperson, b: &Salesperson) -> Ordering {
    a.last_name
        .to_lowercase()
        .cmp(&b.last_name.to_lowercase())
        .then_with(|| a.first_name.to_lowercase().cmp(&b.first_name.to_lowercase()))
}

/// Ordena vendedores por métrica
///
/// Los vendedores sin ventas van primero en orden ascendente y al final en
/// orden descendente; los empates se resuelven por apellido y nombre.
pub fn sort_salespeople(summaries: &mut [SalespersonSummary], ordering: SalespersonOrdering) {
    summaries.sort_by(|a, b| {
        let a_has_sales = a.metrics.total_vehicles_sold > 0;
        let b_has_sales = b.metrics.total_vehicles_sold > 0;

        let primary = a_has_sales
            .cmp(&b_has_sales)
            .then_with(|| ordering.compare_metric(&a.metrics, &b.metrics));
        let primary = if ordering.is_descending() {
            primary.reverse()
        } else {
            primary
        };

        primary.then_with(|| compare_names(&a.salesperson, &b.salesperson))
    });
}
