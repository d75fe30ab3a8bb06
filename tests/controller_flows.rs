//! Flujos transaccionales de los controladores contra PostgreSQL.
//!
//! Cada test recibe una base de datos nueva con las migraciones aplicadas
//! (`#[sqlx::test]`, requiere `DATABASE_URL`).

use std::time::Duration;

use chrono::Utc;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use dealership_inventory::config::EnvironmentConfig;
use dealership_inventory::controllers::customer_controller::CustomerController;
use dealership_inventory::controllers::salesperson_controller::SalespersonController;
use dealership_inventory::controllers::vehicle_controller::{insert_with_candidate_vins, VehicleController};
use dealership_inventory::dto::salesperson_dto::{CreateSalespersonRequest, UpdateSalespersonRequest};
use dealership_inventory::dto::vehicle_dto::{
    CreateVehicleRequest, SellVehicleRequest, UpdateVehicleRequest, VehicleResponse,
};
use dealership_inventory::models::vehicle::{CarType, VehicleDraft};
use dealership_inventory::repositories::vehicle_repository::VehicleRepository;
use dealership_inventory::services::vehicle_rules;
use dealership_inventory::utils::errors::AppError;

const VIN: &str = "1HGCM82633A004352";

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn vehicles(pool: &PgPool) -> VehicleController {
    VehicleController::new(pool.clone(), &EnvironmentConfig::default())
}

fn salespeople(pool: &PgPool) -> SalespersonController {
    SalespersonController::new(pool.clone(), &EnvironmentConfig::default())
}

fn vehicle_request(vin: Option<&str>, color: &str) -> CreateVehicleRequest {
    serde_json::from_value(json!({
        "vin": vin,
        "make": "bmw",
        "model": "X5",
        "year": 2020,
        "color": color,
        "car_type": "SUV",
        "price": 50000,
        "mileage": 10000
    }))
    .unwrap()
}

fn salesperson_request(first: &str, email: &str, phone: &str) -> CreateSalespersonRequest {
    serde_json::from_value(json!({
        "first_name": first,
        "last_name": "lee",
        "email": email,
        "phone_number": phone
    }))
    .unwrap()
}

fn attribution_request(first: &str, email: &str, phone: &str, vehicle_id: Uuid) -> UpdateSalespersonRequest {
    serde_json::from_value(json!({
        "first_name": first,
        "last_name": "lee",
        "email": email,
        "phone_number": phone,
        "vehicle_id": vehicle_id
    }))
    .unwrap()
}

async fn create_vehicle(pool: &PgPool, vin: Option<&str>, color: &str) -> VehicleResponse {
    vehicles(pool)
        .create(vehicle_request(vin, color))
        .await
        .unwrap()
        .data
        .unwrap()
}

async fn create_salesperson(pool: &PgPool, first: &str, email: &str, phone: &str) -> Uuid {
    salespeople(pool)
        .create(salesperson_request(first, email, phone))
        .await
        .unwrap()
        .data
        .unwrap()
        .id
}

async fn count(pool: &PgPool, table: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await
        .unwrap()
}

fn draft(color: &str) -> VehicleDraft {
    vehicle_rules::normalize(VehicleDraft {
        vin: None,
        make: "ford".to_string(),
        model: "Focus".to_string(),
        year: 2018,
        color: color.to_string(),
        car_type: CarType::Sedan,
        price: 12000,
        mileage: Some(40000),
        sold: false,
        date_sold: None,
        salesperson_id: None,
    })
}

// ---------------------------------------------------------------------------
// Vehículos
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_update_keeps_the_stored_vin(pool: PgPool) {
    let created = create_vehicle(&pool, Some(VIN), "Black").await;

    let request: UpdateVehicleRequest = serde_json::from_value(json!({
        "make": "audi",
        "model": "Q7",
        "year": 2021,
        "color": "White",
        "car_type": "SUV",
        "price": 61000,
        "mileage": 5000
    }))
    .unwrap();
    let updated = vehicles(&pool).update(created.id, request).await.unwrap().data.unwrap();

    assert_eq!(updated.vin, VIN);
    assert_eq!(updated.make, "Audi");

    let stored = vehicles(&pool).get_by_id(created.id).await.unwrap();
    assert_eq!(stored.vin, VIN);
    assert_eq!(stored.price, 61000);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_rejected_vehicle_leaves_no_row(pool: PgPool) {
    let request: CreateVehicleRequest = serde_json::from_value(json!({
        "make": "Ford",
        "model": "Focus",
        "year": 2018,
        "color": "Red",
        "price": 12000,
        "sold": true,
        "date_sold": Utc::now().date_naive()
    }))
    .unwrap();

    let result = vehicles(&pool).create(request).await;
    assert!(matches!(result, Err(AppError::InconsistentSaleState(_))));

    // Vendedor inexistente: falla ya dentro de la transacción
    let mut request = vehicle_request(None, "Red");
    request.sold = true;
    request.date_sold = Some(Utc::now().date_naive());
    request.salesperson_id = Some(Uuid::new_v4());
    let result = vehicles(&pool).create(request).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));

    assert_eq!(count(&pool, "vehicles").await, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_duplicate_salesperson_leaves_a_single_row(pool: PgPool) {
    create_salesperson(&pool, "ann", "ann@dealer.com", "5551112222").await;

    let result = salespeople(&pool)
        .create(salesperson_request("ANN", "ann.lee@dealer.com", "5553334444"))
        .await;
    assert!(matches!(result, Err(AppError::DuplicateRecord(_))));

    assert_eq!(count(&pool, "salespeople").await, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_generated_vin_is_retried_after_a_collision(pool: PgPool) {
    create_vehicle(&pool, Some(VIN), "Black").await;
    let repository = VehicleRepository::new(pool.clone());

    let mut tx = repository.begin().await.unwrap();
    let candidates = vec![VIN.to_string(), "2T1BURHE0JC000001".to_string()];
    let vehicle = insert_with_candidate_vins(&repository, &mut tx, &draft("Red"), candidates)
        .await
        .unwrap();
    tx.commit().await.unwrap();

    assert_eq!(vehicle.vin, "2T1BURHE0JC000001");
    assert_eq!(count(&pool, "vehicles").await, 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_generated_vin_gives_up_after_the_attempt_limit(pool: PgPool) {
    create_vehicle(&pool, Some(VIN), "Black").await;
    let repository = VehicleRepository::new(pool.clone());

    let mut tx = repository.begin().await.unwrap();
    let candidates = std::iter::repeat(VIN.to_string()).take(3);
    let result = insert_with_candidate_vins(&repository, &mut tx, &draft("Blue"), candidates).await;

    assert!(matches!(
        result,
        Err(AppError::Internal(msg)) if msg == "Could not generate a unique VIN after 3 attempts"
    ));
    drop(tx);
    assert_eq!(count(&pool, "vehicles").await, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_without_vin_generates_one(pool: PgPool) {
    let created = create_vehicle(&pool, None, "Green").await;

    assert_eq!(created.vin.len(), 17);
    assert!(created.vin.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
}

// ---------------------------------------------------------------------------
// Atribución de ventas
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_salesperson_update_sells_an_available_vehicle(pool: PgPool) {
    let ann = create_salesperson(&pool, "ann", "ann@dealer.com", "5551112222").await;
    let vehicle = create_vehicle(&pool, None, "Black").await;

    salespeople(&pool)
        .update(ann, attribution_request("ann", "ann@dealer.com", "5551112222", vehicle.id))
        .await
        .unwrap();

    let stored = vehicles(&pool).get_by_id(vehicle.id).await.unwrap();
    assert!(stored.sold);
    assert_eq!(stored.salesperson_id, Some(ann));
    assert_eq!(stored.date_sold, Some(Utc::now().date_naive()));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_salesperson_update_rejects_a_sold_vehicle(pool: PgPool) {
    let ann = create_salesperson(&pool, "ann", "ann@dealer.com", "5551112222").await;
    let bob = create_salesperson(&pool, "bob", "bob@dealer.com", "5553334444").await;
    let vehicle = create_vehicle(&pool, None, "Black").await;

    vehicles(&pool)
        .sell(
            vehicle.id,
            SellVehicleRequest {
                salesperson_id: ann,
                date_sold: None,
            },
        )
        .await
        .unwrap();

    let result = salespeople(&pool)
        .update(bob, attribution_request("robert", "bob@dealer.com", "5553334444", vehicle.id))
        .await;
    assert!(matches!(result, Err(AppError::InconsistentSaleState(_))));

    // Ni la venta ni los datos del vendedor cambian
    let stored = vehicles(&pool).get_by_id(vehicle.id).await.unwrap();
    assert_eq!(stored.salesperson_id, Some(ann));
    let bob = salespeople(&pool).get_by_id(bob).await.unwrap();
    assert_eq!(bob.salesperson.first_name, "Bob");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_attribution_and_sale_of_the_same_vehicle_serialize(pool: PgPool) {
    let ann = create_salesperson(&pool, "ann", "ann@dealer.com", "5551112222").await;
    let bob = create_salesperson(&pool, "bob", "bob@dealer.com", "5553334444").await;
    let vehicle = create_vehicle(&pool, None, "Black").await;

    let (attributing, selling) = (salespeople(&pool), vehicles(&pool));
    let race = async {
        tokio::join!(
            attributing.update(ann, attribution_request("ann", "ann@dealer.com", "5551112222", vehicle.id)),
            selling.sell(
                vehicle.id,
                SellVehicleRequest {
                    salesperson_id: bob,
                    date_sold: None,
                },
            ),
        )
    };
    let (attributed, sold) = tokio::time::timeout(Duration::from_secs(10), race)
        .await
        .unwrap();

    // Uno gana; el otro ve el vehículo vendido, nunca un interbloqueo
    let winner = match (attributed, sold) {
        (Ok(_), Err(AppError::InconsistentSaleState(_))) => ann,
        (Err(AppError::InconsistentSaleState(_)), Ok(_)) => bob,
        (attributed, sold) => panic!(
            "unexpected outcome: {:?} / {:?}",
            attributed.map(|_| ()),
            sold.map(|_| ())
        ),
    };

    let stored = vehicles(&pool).get_by_id(vehicle.id).await.unwrap();
    assert_eq!(stored.salesperson_id, Some(winner));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_deleting_a_salesperson_releases_their_vehicles(pool: PgPool) {
    let ann = create_salesperson(&pool, "ann", "ann@dealer.com", "5551112222").await;
    let first = create_vehicle(&pool, None, "Black").await;
    let second = create_vehicle(&pool, None, "White").await;

    for id in [first.id, second.id] {
        vehicles(&pool)
            .sell(
                id,
                SellVehicleRequest {
                    salesperson_id: ann,
                    date_sold: None,
                },
            )
            .await
            .unwrap();
    }

    salespeople(&pool).delete(ann).await.unwrap();

    for id in [first.id, second.id] {
        let stored = vehicles(&pool).get_by_id(id).await.unwrap();
        assert!(!stored.sold);
        assert_eq!(stored.date_sold, None);
        assert_eq!(stored.salesperson_id, None);
    }
    assert_eq!(count(&pool, "salespeople").await, 0);
}

// ---------------------------------------------------------------------------
// Ids desconocidos
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_unknown_ids_are_not_found(pool: PgPool) {
    let missing = Uuid::new_v4();

    let request: UpdateVehicleRequest = serde_json::from_value(json!({
        "make": "Ford",
        "model": "Focus",
        "year": 2018,
        "color": "Red",
        "price": 12000
    }))
    .unwrap();
    assert!(matches!(vehicles(&pool).update(missing, request).await, Err(AppError::NotFound(_))));
    assert!(matches!(vehicles(&pool).delete(missing).await, Err(AppError::NotFound(_))));

    let request: UpdateSalespersonRequest = serde_json::from_value(json!({
        "first_name": "ann",
        "last_name": "lee",
        "email": "ann@dealer.com",
        "phone_number": "5551112222"
    }))
    .unwrap();
    assert!(matches!(salespeople(&pool).update(missing, request).await, Err(AppError::NotFound(_))));
    assert!(matches!(salespeople(&pool).delete(missing).await, Err(AppError::NotFound(_))));

    let customers = CustomerController::new(pool.clone());
    assert!(matches!(customers.delete(missing).await, Err(AppError::NotFound(_))));
}
