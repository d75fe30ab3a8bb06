//! Modelo de Vehicle
//!
//! Este módulo contiene el struct Vehicle, su borrador editable y los
//! tipos auxiliares de filtrado. Mapea exactamente a la tabla `vehicles`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Tipo de carrocería - mapea al ENUM car_type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq, Hash, Default)]
#[sqlx(type_name = "car_type")]
pub enum CarType {
    Convertible,
    Coupe,
    #[default]
    Sedan,
    #[sqlx(rename = "SUV")]
    #[serde(rename = "SUV")]
    Suv,
    Truck,
    Wagon,
}

impl CarType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CarType::Convertible => "Convertible",
            CarType::Coupe => "Coupe",
            CarType::Sedan => "Sedan",
            CarType::Suv => "SUV",
            CarType::Truck => "Truck",
            CarType::Wagon => "Wagon",
        }
    }
}

impl fmt::Display for CarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Vehicle principal - mapea exactamente a la tabla vehicles
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Vehicle {
    pub id: Uuid,
    pub vin: String,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub color: String,
    pub car_type: CarType,
    pub price: i64,
    pub mileage: Option<i64>,
    pub sold: bool,
    pub date_sold: Option<NaiveDate>,
    pub salesperson_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Vehicle {
    /// Borrador editable con los valores actuales
    pub fn to_draft(&self) -> VehicleDraft {
        VehicleDraft {
            vin: Some(self.vin.clone()),
            make: self.make.clone(),
            model: self.model.clone(),
            year: self.year,
            color: self.color.clone(),
            car_type: self.car_type,
            price: self.price,
            mileage: self.mileage,
            sold: self.sold,
            date_sold: self.date_sold,
            salesperson_id: self.salesperson_id,
        }
    }

    /// `2020 BMW X5 - SUV`
    pub fn display_name(&self) -> String {
        format!("{} {} {} - {}", self.year, self.make, self.model, self.car_type)
    }
}

/// Campos escribibles de un vehículo antes de persistir
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleDraft {
    pub vin: Option<String>,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub color: String,
    pub car_type: CarType,
    pub price: i64,
    pub mileage: Option<i64>,
    pub sold: bool,
    pub date_sold: Option<NaiveDate>,
    pub salesperson_id: Option<Uuid>,
}

/// Estado de venta derivado de la terna (sold, date_sold, salesperson)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaleState {
    Available,
    Sold {
        date_sold: NaiveDate,
        salesperson_id: Uuid,
    },
}

impl VehicleDraft {
    /// `None` cuando la terna está a medias
    pub fn sale_state(&self) -> Option<SaleState> {
        match (self.sold, self.date_sold, self.salesperson_id) {
            (false, None, None) => Some(SaleState::Available),
            (true, Some(date_sold), Some(salesperson_id)) => Some(SaleState::Sold {
                date_sold,
                salesperson_id,
            }),
            _ => None,
        }
    }

    /// Available -> Sold, los tres campos a la vez
    pub fn mark_as_sold(&mut self, salesperson_id: Uuid, date_sold: NaiveDate) {
        self.sold = true;
        self.date_sold = Some(date_sold);
        self.salesperson_id = Some(salesperson_id);
    }

    /// Sold -> Available, los tres campos a la vez
    pub fn mark_as_unsold(&mut self) {
        self.sold = false;
        self.date_sold = None;
        self.salesperson_id = None;
    }

    /// Compara la tupla (make, model, year, color, mileage, car_type) sin distinguir mayúsculas
    pub fn same_spec_as(&self, other: &Vehicle) -> bool {
        self.make.to_lowercase() == other.make.to_lowercase()
            && self.model.to_lowercase() == other.model.to_lowercase()
            && self.year == other.year
            && self.color.to_lowercase() == other.color.to_lowercase()
            && self.mileage == other.mileage
            && self.car_type == other.car_type
    }
}

/// Orden permitido en el listado de vehículos
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleOrdering {
    PriceAsc,
    PriceDesc,
    MileageAsc,
    MileageDesc,
}

impl VehicleOrdering {
    pub fn order_by_clause(&self) -> &'static str {
        match self {
            VehicleOrdering::PriceAsc => " ORDER BY price ASC, id ASC",
            VehicleOrdering::PriceDesc => " ORDER BY price DESC, id ASC",
            VehicleOrdering::MileageAsc => " ORDER BY COALESCE(mileage, 0) ASC, id ASC",
            VehicleOrdering::MileageDesc => " ORDER BY COALESCE(mileage, 0) DESC, id ASC",
        }
    }
}

impl FromStr for VehicleOrdering {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "price" => Ok(VehicleOrdering::PriceAsc),
            "-price" => Ok(VehicleOrdering::PriceDesc),
            "mileage" => Ok(VehicleOrdering::MileageAsc),
            "-mileage" => Ok(VehicleOrdering::MileageDesc),
            other => Err(format!(
                "Unknown vehicle ordering '{}', expected price, -price, mileage or -mileage",
                other
            )),
        }
    }
}

/// Filtros para búsqueda de vehículos
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VehicleFilters {
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub car_type: Option<CarType>,
    pub color: Option<String>,
    pub price: Option<i64>,
    pub sold: Option<bool>,
}

/// Valores distintos disponibles para los selectores de filtro
#[derive(Debug, Clone, Default, Serialize)]
pub struct VehicleFacets {
    pub makes: Vec<String>,
    pub models: Vec<String>,
    pub colors: Vec<String>,
    pub years: Vec<i32>,
    pub car_types: Vec<CarType>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> VehicleDraft {
        VehicleDraft {
            vin: None,
            make: "BMW".to_string(),
            model: "X5".to_string(),
            year: 2020,
            color: "Black".to_string(),
            car_type: CarType::Suv,
            price: 50000,
            mileage: Some(10000),
            sold: false,
            date_sold: None,
            salesperson_id: None,
        }
    }

    #[test]
    fn test_sale_state_transitions() {
        let mut vehicle = draft();
        assert_eq!(vehicle.sale_state(), Some(SaleState::Available));

        let salesperson_id = Uuid::new_v4();
        let date = NaiveDate::from_ymd_opt(2024, 7, 13).unwrap();
        vehicle.mark_as_sold(salesperson_id, date);
        assert_eq!(
            vehicle.sale_state(),
            Some(SaleState::Sold { date_sold: date, salesperson_id })
        );

        vehicle.mark_as_unsold();
        assert_eq!(vehicle.sale_state(), Some(SaleState::Available));
    }

    #[test]
    fn test_partial_sale_state_is_inconsistent() {
        let mut vehicle = draft();
        vehicle.sold = true;
        assert_eq!(vehicle.sale_state(), None);

        let mut vehicle = draft();
        vehicle.salesperson_id = Some(Uuid::new_v4());
        assert_eq!(vehicle.sale_state(), None);
    }

    #[test]
    fn test_car_type_serde_names() {
        assert_eq!(serde_json::to_string(&CarType::Suv).unwrap(), "\"SUV\"");
        let parsed: CarType = serde_json::from_str("\"Wagon\"").unwrap();
        assert_eq!(parsed, CarType::Wagon);
        assert_eq!(CarType::default(), CarType::Sedan);
    }

    #[test]
    fn test_vehicle_ordering_from_str() {
        assert_eq!("price".parse::<VehicleOrdering>(), Ok(VehicleOrdering::PriceAsc));
        assert_eq!("-mileage".parse::<VehicleOrdering>(), Ok(VehicleOrdering::MileageDesc));
        assert!("year".parse::<VehicleOrdering>().is_err());
    }
}
