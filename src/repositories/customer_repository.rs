use crate::models::customer::{Customer, CustomerDraft};
use crate::utils::errors::AppError;
use chrono::Utc;
use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use uuid::Uuid;

pub struct CustomerRepository {
    pool: PgPool,
}

impl CustomerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>, AppError> {
        Ok(self.pool.begin().await?)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Customer>, AppError> {
        let customer = sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(customer)
    }

    pub async fn find_by_id_for_update(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<Customer>, AppError> {
        let customer = sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(customer)
    }

    pub async fn find_by_email(
        &self,
        conn: &mut PgConnection,
        email: &str,
    ) -> Result<Vec<Customer>, AppError> {
        let customers = sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_all(&mut *conn)
            .await?;

        Ok(customers)
    }

    pub async fn insert(&self, conn: &mut PgConnection, draft: &CustomerDraft) -> Result<Customer, AppError> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (
                id, first_name, last_name, email, phone_number, address, city, state,
                zip_code, handled_by, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&draft.first_name)
        .bind(&draft.last_name)
        .bind(&draft.email)
        .bind(&draft.phone_number)
        .bind(&draft.address)
        .bind(&draft.city)
        .bind(&draft.state)
        .bind(&draft.zip_code)
        .bind(draft.handled_by)
        .bind(Utc::now())
        .fetch_one(&mut *conn)
        .await?;

        Ok(customer)
    }

    pub async fn update(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        draft: &CustomerDraft,
    ) -> Result<Customer, AppError> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            UPDATE customers
            SET first_name = $2, last_name = $3, email = $4, phone_number = $5, address = $6,
                city = $7, state = $8, zip_code = $9, handled_by = $10, updated_at = $11
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&draft.first_name)
        .bind(&draft.last_name)
        .bind(&draft.email)
        .bind(&draft.phone_number)
        .bind(&draft.address)
        .bind(&draft.city)
        .bind(&draft.state)
        .bind(&draft.zip_code)
        .bind(draft.handled_by)
        .bind(Utc::now())
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Customer with id '{}' not found", id)))?;

        Ok(customer)
    }

    /// Reemplaza la lista de vehículos comprados
    pub async fn replace_purchased_vehicles(
        &self,
        conn: &mut PgConnection,
        customer_id: Uuid,
        vehicle_ids: &[Uuid],
    ) -> Result<(), AppError> {
        sqlx::query("DELETE FROM customer_vehicles WHERE customer_id = $1")
            .bind(customer_id)
            .execute(&mut *conn)
            .await?;

        if !vehicle_ids.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO customer_vehicles (customer_id, vehicle_id)
                SELECT $1, vehicle_id FROM UNNEST($2::uuid[]) AS vehicle_id
                "#,
            )
            .bind(customer_id)
            .bind(vehicle_ids)
            .execute(&mut *conn)
            .await?;
        }

        Ok(())
    }

    pub async fn purchased_vehicle_ids(&self, customer_id: Uuid) -> Result<Vec<Uuid>, AppError> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT vehicle_id FROM customer_vehicles WHERE customer_id = $1 ORDER BY vehicle_id",
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    pub async fn delete(&self, conn: &mut PgConnection, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn list_all(&self) -> Result<Vec<Customer>, AppError> {
        let customers = sqlx::query_as::<_, Customer>(
            "SELECT * FROM customers ORDER BY LOWER(last_name), LOWER(first_name)",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }
}
