use crate::models::vehicle::{CarType, Vehicle, VehicleDraft, VehicleFacets, VehicleFilters, VehicleOrdering};
use crate::utils::errors::AppError;
use chrono::Utc;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder, Transaction};
use uuid::Uuid;

pub struct VehicleRepository {
    pool: PgPool,
}

impl VehicleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Abrir una transacción; toda escritura pasa por aquí
    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>, AppError> {
        Ok(self.pool.begin().await?)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Vehicle>, AppError> {
        let vehicle = sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(vehicle)
    }

    /// Bloquea la fila hasta el fin de la transacción
    pub async fn find_by_id_for_update(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<Vehicle>, AppError> {
        let vehicle = sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(vehicle)
    }

    pub async fn find_many_for_update(
        &self,
        conn: &mut PgConnection,
        ids: &[Uuid],
    ) -> Result<Vec<Vehicle>, AppError> {
        let vehicles = sqlx::query_as::<_, Vehicle>(
            "SELECT * FROM vehicles WHERE id = ANY($1) ORDER BY id FOR UPDATE",
        )
        .bind(ids)
        .fetch_all(&mut *conn)
        .await?;

        Ok(vehicles)
    }

    /// Vehículos que chocan con el borrador: mismo VIN o misma ficha
    pub async fn find_conflicts(
        &self,
        conn: &mut PgConnection,
        draft: &VehicleDraft,
        exclude_id: Option<Uuid>,
    ) -> Result<Vec<Vehicle>, AppError> {
        let vehicles = sqlx::query_as::<_, Vehicle>(
            r#"
            SELECT * FROM vehicles
            WHERE ($7::uuid IS NULL OR id <> $7)
              AND (
                ($8::text IS NOT NULL AND vin = $8)
                OR (
                    LOWER(make) = LOWER($1)
                    AND LOWER(model) = LOWER($2)
                    AND year = $3
                    AND LOWER(color) = LOWER($4)
                    AND car_type = $5
                    AND mileage IS NOT DISTINCT FROM $6
                )
              )
            "#,
        )
        .bind(&draft.make)
        .bind(&draft.model)
        .bind(draft.year)
        .bind(&draft.color)
        .bind(draft.car_type)
        .bind(draft.mileage)
        .bind(exclude_id)
        .bind(draft.vin.as_deref())
        .fetch_all(&mut *conn)
        .await?;

        Ok(vehicles)
    }

    /// Inserta con el VIN dado; `None` si el VIN ya existía
    pub async fn insert(
        &self,
        conn: &mut PgConnection,
        draft: &VehicleDraft,
        vin: &str,
    ) -> Result<Option<Vehicle>, AppError> {
        let now = Utc::now();
        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            INSERT INTO vehicles (
                id, vin, make, model, year, color, car_type, price, mileage,
                sold, date_sold, salesperson_id, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $13)
            ON CONFLICT (vin) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(vin)
        .bind(&draft.make)
        .bind(&draft.model)
        .bind(draft.year)
        .bind(&draft.color)
        .bind(draft.car_type)
        .bind(draft.price)
        .bind(draft.mileage)
        .bind(draft.sold)
        .bind(draft.date_sold)
        .bind(draft.salesperson_id)
        .bind(now)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(vehicle)
    }

    /// Actualiza todo menos el VIN, que es inmutable
    pub async fn update(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        draft: &VehicleDraft,
    ) -> Result<Vehicle, AppError> {
        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            UPDATE vehicles
            SET make = $2, model = $3, year = $4, color = $5, car_type = $6, price = $7,
                mileage = $8, sold = $9, date_sold = $10, salesperson_id = $11, updated_at = $12
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&draft.make)
        .bind(&draft.model)
        .bind(draft.year)
        .bind(&draft.color)
        .bind(draft.car_type)
        .bind(draft.price)
        .bind(draft.mileage)
        .bind(draft.sold)
        .bind(draft.date_sold)
        .bind(draft.salesperson_id)
        .bind(Utc::now())
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Vehicle with id '{}' not found", id)))?;

        Ok(vehicle)
    }

    /// `false` si no existía
    pub async fn delete(&self, conn: &mut PgConnection, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM vehicles WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn list(
        &self,
        filters: &VehicleFilters,
        ordering: Option<VehicleOrdering>,
    ) -> Result<Vec<Vehicle>, AppError> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT * FROM vehicles WHERE TRUE");

        if let Some(make) = &filters.make {
            builder.push(" AND LOWER(make) = LOWER(").push_bind(make.clone()).push(")");
        }
        if let Some(model) = &filters.model {
            builder.push(" AND LOWER(model) = LOWER(").push_bind(model.clone()).push(")");
        }
        if let Some(year) = filters.year {
            builder.push(" AND year = ").push_bind(year);
        }
        if let Some(car_type) = filters.car_type {
            builder.push(" AND car_type = ").push_bind(car_type);
        }
        if let Some(color) = &filters.color {
            builder.push(" AND LOWER(color) = LOWER(").push_bind(color.clone()).push(")");
        }
        if let Some(price) = filters.price {
            builder.push(" AND price = ").push_bind(price);
        }
        if let Some(sold) = filters.sold {
            builder.push(" AND sold = ").push_bind(sold);
        }

        match ordering {
            Some(ordering) => builder.push(ordering.order_by_clause()),
            None => builder.push(" ORDER BY created_at DESC, id ASC"),
        };

        let vehicles = builder
            .build_query_as::<Vehicle>()
            .fetch_all(&self.pool)
            .await?;

        Ok(vehicles)
    }

    /// Vehículos vendidos por un vendedor (consulta filtrada, sin back-reference)
    pub async fn find_sold_by_salesperson(&self, salesperson_id: Uuid) -> Result<Vec<Vehicle>, AppError> {
        let vehicles = sqlx::query_as::<_, Vehicle>(
            "SELECT * FROM vehicles WHERE salesperson_id = $1 AND sold ORDER BY date_sold DESC, id ASC",
        )
        .bind(salesperson_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(vehicles)
    }

    pub async fn find_all_sold(&self) -> Result<Vec<Vehicle>, AppError> {
        let vehicles = sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE sold")
            .fetch_all(&self.pool)
            .await?;

        Ok(vehicles)
    }

    /// Devuelve a disponibles los vehículos de un vendedor; retorna cuántos
    pub async fn release_salesperson(
        &self,
        conn: &mut PgConnection,
        salesperson_id: Uuid,
    ) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE vehicles
            SET sold = FALSE, date_sold = NULL, salesperson_id = NULL, updated_at = $2
            WHERE salesperson_id = $1
            "#,
        )
        .bind(salesperson_id)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn facets(&self) -> Result<VehicleFacets, AppError> {
        let makes = sqlx::query_scalar::<_, String>("SELECT DISTINCT make FROM vehicles ORDER BY make")
            .fetch_all(&self.pool)
            .await?;
        let models = sqlx::query_scalar::<_, String>("SELECT DISTINCT model FROM vehicles ORDER BY model")
            .fetch_all(&self.pool)
            .await?;
        let colors = sqlx::query_scalar::<_, String>("SELECT DISTINCT color FROM vehicles ORDER BY color")
            .fetch_all(&self.pool)
            .await?;
        let years = sqlx::query_scalar::<_, i32>("SELECT DISTINCT year FROM vehicles ORDER BY year")
            .fetch_all(&self.pool)
            .await?;
        let car_types = sqlx::query_scalar::<_, CarType>("SELECT DISTINCT car_type FROM vehicles ORDER BY car_type")
            .fetch_all(&self.pool)
            .await?;

        Ok(VehicleFacets {
            makes,
            models,
            colors,
            years,
            car_types,
        })
    }
}
