//! Reglas del registro de vehículos
//!
//! Normalización de marca/modelo, validación de invariantes, generación
//! de VIN y cálculo de comisión. Todo es puro: la persistencia vive en
//! `VehicleRepository` y la orquestación en `VehicleController`.

use chrono::NaiveDate;
use rand::Rng;
use rust_decimal::{Decimal, RoundingStrategy};
use uuid::Uuid;

use crate::models::vehicle::{Vehicle, VehicleDraft};
use crate::services::person_rules::capitalize_word;
use crate::utils::errors::{AppError, AppResult};
use crate::utils::validation::{validate_non_negative, validate_not_empty, validate_vin};

/// Longitud del VIN generado
pub const VIN_LENGTH: usize = 17;

const VIN_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Palabras cuya grafía no sigue el title case
const SPELLING_EXCEPTIONS: &[(&str, &str)] = &[
    ("bmw", "BMW"),
    ("gmc", "GMC"),
    ("amg", "AMG"),
    ("vw", "VW"),
    ("gt", "GT"),
    ("gti", "GTI"),
    ("srt", "SRT"),
    ("trd", "TRD"),
    ("suv", "SUV"),
    ("mclaren", "McLaren"),
    ("xdrive", "xDrive"),
    ("e-tron", "e-tron"),
    ("rav4", "RAV4"),
    ("cr-v", "CR-V"),
    ("hr-v", "HR-V"),
    ("cx-5", "CX-5"),
    ("mx-5", "MX-5"),
    ("iq", "iQ"),
];

/// Aplica la regla de mayúsculas a una marca o modelo
///
/// - exactamente 3 caracteres: todo en mayúsculas (`bmw` -> `BMW`)
/// - más de 3: title case por palabra y tabla de excepciones
/// - menos de 3: se deja como viene (`X5`)
pub fn normalize_make_model(value: &str) -> String {
    let value = value.trim();
    match value.chars().count() {
        3 => value.to_uppercase(),
        n if n > 3 => value
            .split_whitespace()
            .map(title_case_word)
            .collect::<Vec<_>>()
            .join(" "),
        _ => value.to_string(),
    }
}

fn title_case_word(word: &str) -> String {
    let lower = word.to_lowercase();
    if let Some((_, spelling)) = SPELLING_EXCEPTIONS.iter().find(|(key, _)| *key == lower) {
        return spelling.to_string();
    }
    lower
        .split('-')
        .map(capitalize_word)
        .collect::<Vec<_>>()
        .join("-")
}

/// Normaliza un borrador: marca, modelo, color y VIN
pub fn normalize(draft: VehicleDraft) -> VehicleDraft {
    VehicleDraft {
        vin: draft
            .vin
            .map(|vin| vin.trim().to_uppercase())
            .filter(|vin| !vin.is_empty()),
        make: normalize_make_model(&draft.make),
        model: normalize_make_model(&draft.model),
        color: draft.color.trim().to_string(),
        ..draft
    }
}

/// Genera un VIN de 17 caracteres tomados uniformemente de `A-Z0-9`
///
/// No garantiza unicidad: el llamador inserta con `ON CONFLICT (vin)` y
/// reintenta con un VIN nuevo.
pub fn generate_vin<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..VIN_LENGTH)
        .map(|_| VIN_ALPHABET[rng.gen_range(0..VIN_ALPHABET.len())] as char)
        .collect()
}

/// `price * rate` redondeado a 2 decimales (mitad al par)
pub fn commission_for_price(price: i64, rate: Decimal) -> Decimal {
    let mut commission = (Decimal::from(price) * rate)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
    commission.rescale(2);
    commission
}

/// Comisión de un vehículo con la tasa dada
pub fn calculate_commission(vehicle: &Vehicle, rate: Decimal) -> Decimal {
    commission_for_price(vehicle.price, rate)
}

/// Comprueba las invariantes de un vehículo antes de guardarlo
///
/// `existing` son los registros candidatos a conflicto (mismo VIN o misma
/// ficha); `exclude_id` es el propio vehículo en una actualización.
pub fn validate(
    draft: &VehicleDraft,
    existing: &[Vehicle],
    exclude_id: Option<Uuid>,
    today: NaiveDate,
) -> AppResult<()> {
    validate_not_empty(&draft.make)
        .map_err(|_| AppError::InvalidFormat("Make is required".to_string()))?;
    validate_not_empty(&draft.model)
        .map_err(|_| AppError::InvalidFormat("Model is required".to_string()))?;
    validate_not_empty(&draft.color)
        .map_err(|_| AppError::InvalidFormat("Color is required".to_string()))?;
    validate_non_negative(draft.price)
        .map_err(|_| AppError::InvalidFormat("Price must not be negative".to_string()))?;
    if let Some(mileage) = draft.mileage {
        validate_non_negative(mileage)
            .map_err(|_| AppError::InvalidFormat("Mileage must not be negative".to_string()))?;
    }
    if let Some(vin) = &draft.vin {
        validate_vin(vin).map_err(|_| {
            AppError::InvalidFormat("VIN must be 17 uppercase letters or digits".to_string())
        })?;
    }

    let others = existing.iter().filter(|other| Some(other.id) != exclude_id);
    for other in others {
        if draft.vin.as_deref() == Some(other.vin.as_str()) {
            return Err(AppError::DuplicateRecord(format!(
                "A vehicle with VIN '{}' already exists",
                other.vin
            )));
        }
        if draft.same_spec_as(other) {
            return Err(AppError::DuplicateRecord(format!(
                "A vehicle with the same details already exists: {}",
                other.display_name()
            )));
        }
    }

    if draft.sale_state().is_none() {
        return Err(AppError::InconsistentSaleState(
            "A sold vehicle needs both a sale date and a salesperson, and an unsold one needs neither"
                .to_string(),
        ));
    }

    if let Some(date_sold) = draft.date_sold {
        if date_sold > today {
            return Err(AppError::InvalidDate(format!(
                "Sale date {} is in the future",
                date_sold
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::vehicle::CarType;
    use chrono::Utc;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

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

    fn stored(draft: &VehicleDraft, vin: &str) -> Vehicle {
        Vehicle {
            id: Uuid::new_v4(),
            vin: vin.to_string(),
            make: draft.make.clone(),
            model: draft.model.clone(),
            year: draft.year,
            color: draft.color.clone(),
            car_type: draft.car_type,
            price: draft.price,
            mileage: draft.mileage,
            sold: draft.sold,
            date_sold: draft.date_sold,
            salesperson_id: draft.salesperson_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, 13).unwrap()
    }

    #[test]
    fn test_normalize_make_model() {
        assert_eq!(normalize_make_model("bmw"), "BMW");
        assert_eq!(normalize_make_model("X5"), "X5");
        assert_eq!(normalize_make_model("x5"), "x5");
        assert_eq!(normalize_make_model("toyota"), "Toyota");
        assert_eq!(normalize_make_model("LAND ROVER"), "Land Rover");
        assert_eq!(normalize_make_model("mercedes-benz"), "Mercedes-Benz");
        assert_eq!(normalize_make_model("mclaren"), "McLaren");
        assert_eq!(normalize_make_model("rav4"), "RAV4");
        assert_eq!(normalize_make_model("honda cr-v"), "Honda CR-V");
        assert_eq!(normalize_make_model(" kia "), "KIA");
    }

    #[test]
    fn test_normalize_is_deterministic() {
        let mut input = draft();
        input.make = "bmw".to_string();
        input.vin = Some(" 1hgcm82633a004352 ".to_string());

        let once = normalize(input.clone());
        let twice = normalize(once.clone());
        assert_eq!(once, twice);
        assert_eq!(once.make, "BMW");
        assert_eq!(once.model, "X5");
        assert_eq!(once.vin.as_deref(), Some("1HGCM82633A004352"));
    }

    #[test]
    fn test_generate_vin() {
        let mut rng = StdRng::seed_from_u64(42);
        let vin = generate_vin(&mut rng);
        assert_eq!(vin.len(), VIN_LENGTH);
        assert!(validate_vin(&vin).is_ok());

        let mut same_seed = StdRng::seed_from_u64(42);
        assert_eq!(generate_vin(&mut same_seed), vin);
        assert_ne!(generate_vin(&mut rng), vin);
    }

    #[test]
    fn test_commission_for_price() {
        assert_eq!(commission_for_price(50000, Decimal::new(20, 2)).to_string(), "10000.00");
        assert_eq!(commission_for_price(0, Decimal::new(15, 2)).to_string(), "0.00");
        assert_eq!(commission_for_price(12345, Decimal::new(15, 2)).to_string(), "1851.75");
        // 0.125 -> 0.12 (mitad al par)
        assert_eq!(commission_for_price(1, Decimal::new(125, 3)).to_string(), "0.12");
        assert_eq!(commission_for_price(1, Decimal::new(135, 3)).to_string(), "0.14");
    }

    #[test]
    fn test_validate_accepts_available_vehicle() {
        assert!(validate(&draft(), &[], None, today()).is_ok());
    }

    #[test]
    fn test_validate_duplicate_details() {
        let existing = vec![stored(&draft(), "AAAAAAAAAAAAAAAAA")];

        let mut candidate = draft();
        candidate.make = "bmw".to_string();
        candidate.color = "BLACK".to_string();
        let result = validate(&candidate, &existing, None, today());
        assert!(matches!(result, Err(AppError::DuplicateRecord(_))));

        let mut different_mileage = draft();
        different_mileage.mileage = Some(10001);
        assert!(validate(&different_mileage, &existing, None, today()).is_ok());

        let mut different_type = draft();
        different_type.car_type = CarType::Wagon;
        assert!(validate(&different_type, &existing, None, today()).is_ok());

        let mut different_make = draft();
        different_make.make = "Audi".to_string();
        assert!(validate(&different_make, &existing, None, today()).is_ok());

        let mut different_model = draft();
        different_model.model = "X6".to_string();
        assert!(validate(&different_model, &existing, None, today()).is_ok());

        let mut different_year = draft();
        different_year.year = 2021;
        assert!(validate(&different_year, &existing, None, today()).is_ok());

        let mut different_color = draft();
        different_color.color = "White".to_string();
        assert!(validate(&different_color, &existing, None, today()).is_ok());

        assert!(validate(&draft(), &existing, Some(existing[0].id), today()).is_ok());
    }

    #[test]
    fn test_validate_missing_mileage_compares_equal() {
        let mut base = draft();
        base.mileage = None;
        let existing = vec![stored(&base, "AAAAAAAAAAAAAAAAA")];
        assert!(matches!(
            validate(&base, &existing, None, today()),
            Err(AppError::DuplicateRecord(_))
        ));
    }

    #[test]
    fn test_validate_duplicate_vin() {
        let mut other = draft();
        other.model = "X3".to_string();
        let existing = vec![stored(&other, "1HGCM82633A004352")];

        let mut candidate = draft();
        candidate.vin = Some("1HGCM82633A004352".to_string());
        assert!(matches!(
            validate(&candidate, &existing, None, today()),
            Err(AppError::DuplicateRecord(_))
        ));
    }

    #[test]
    fn test_validate_sale_state() {
        let mut sold_without_salesperson = draft();
        sold_without_salesperson.sold = true;
        sold_without_salesperson.date_sold = Some(today());
        assert!(matches!(
            validate(&sold_without_salesperson, &[], None, today()),
            Err(AppError::InconsistentSaleState(_))
        ));

        let mut salesperson_without_sold = draft();
        salesperson_without_sold.salesperson_id = Some(Uuid::new_v4());
        assert!(matches!(
            validate(&salesperson_without_sold, &[], None, today()),
            Err(AppError::InconsistentSaleState(_))
        ));

        let mut sold = draft();
        sold.mark_as_sold(Uuid::new_v4(), today());
        assert!(validate(&sold, &[], None, today()).is_ok());
    }

    #[test]
    fn test_validate_future_sale_date() {
        let mut sold = draft();
        sold.mark_as_sold(Uuid::new_v4(), today().succ_opt().unwrap());
        assert!(matches!(
            validate(&sold, &[], None, today()),
            Err(AppError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_validate_formats() {
        let mut negative = draft();
        negative.price = -1;
        assert!(matches!(validate(&negative, &[], None, today()), Err(AppError::InvalidFormat(_))));

        let mut bad_vin = draft();
        bad_vin.vin = Some("SHORT".to_string());
        assert!(matches!(validate(&bad_vin, &[], None, today()), Err(AppError::InvalidFormat(_))));
    }
}
