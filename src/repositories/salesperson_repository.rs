use crate::models::salesperson::{Salesperson, SalespersonDraft};
use crate::utils::errors::AppError;
use chrono::Utc;
use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use uuid::Uuid;

pub struct SalespersonRepository {
    pool: PgPool,
}

impl SalespersonRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>, AppError> {
        Ok(self.pool.begin().await?)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Salesperson>, AppError> {
        let salesperson = sqlx::query_as::<_, Salesperson>("SELECT * FROM salespeople WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(salesperson)
    }

    pub async fn find_by_id_for_update(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<Salesperson>, AppError> {
        let salesperson =
            sqlx::query_as::<_, Salesperson>("SELECT * FROM salespeople WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *conn)
                .await?;

        Ok(salesperson)
    }

    /// Bloquea los datos del vendedor sin bloquear su clave
    ///
    /// Compatible con el `FOR KEY SHARE` de `exists` y de las claves foráneas,
    /// así que una venta en curso no espera por la edición del vendedor.
    pub async fn find_by_id_for_edit(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<Salesperson>, AppError> {
        let salesperson =
            sqlx::query_as::<_, Salesperson>("SELECT * FROM salespeople WHERE id = $1 FOR NO KEY UPDATE")
                .bind(id)
                .fetch_optional(&mut *conn)
                .await?;

        Ok(salesperson)
    }

    /// Comprueba existencia dentro de la transacción; solo impide borrar la fila
    pub async fn exists(&self, conn: &mut PgConnection, id: Uuid) -> Result<bool, AppError> {
        let row: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM salespeople WHERE id = $1 FOR KEY SHARE")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(row.is_some())
    }

    /// Vendedores que chocan por nombre completo, email o teléfono
    pub async fn find_conflicts(
        &self,
        conn: &mut PgConnection,
        draft: &SalespersonDraft,
        exclude_id: Option<Uuid>,
    ) -> Result<Vec<Salesperson>, AppError> {
        let salespeople = sqlx::query_as::<_, Salesperson>(
            r#"
            SELECT * FROM salespeople
            WHERE ($5::uuid IS NULL OR id <> $5)
              AND (
                (LOWER(first_name) = LOWER($1) AND LOWER(last_name) = LOWER($2))
                OR LOWER(email) = LOWER($3)
                OR phone_number = $4
              )
            "#,
        )
        .bind(&draft.first_name)
        .bind(&draft.last_name)
        .bind(&draft.email)
        .bind(&draft.phone_number)
        .bind(exclude_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(salespeople)
    }

    pub async fn insert(
        &self,
        conn: &mut PgConnection,
        draft: &SalespersonDraft,
    ) -> Result<Salesperson, AppError> {
        let salesperson = sqlx::query_as::<_, Salesperson>(
            r#"
            INSERT INTO salespeople (id, first_name, last_name, email, phone_number, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&draft.first_name)
        .bind(&draft.last_name)
        .bind(&draft.email)
        .bind(&draft.phone_number)
        .bind(Utc::now())
        .fetch_one(&mut *conn)
        .await?;

        Ok(salesperson)
    }

    pub async fn update(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        draft: &SalespersonDraft,
    ) -> Result<Salesperson, AppError> {
        let salesperson = sqlx::query_as::<_, Salesperson>(
            r#"
            UPDATE salespeople
            SET first_name = $2, last_name = $3, email = $4, phone_number = $5, updated_at = $6
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&draft.first_name)
        .bind(&draft.last_name)
        .bind(&draft.email)
        .bind(&draft.phone_number)
        .bind(Utc::now())
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Salesperson with id '{}' not found", id)))?;

        Ok(salesperson)
    }

    pub async fn delete(&self, conn: &mut PgConnection, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM salespeople WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn list_all(&self) -> Result<Vec<Salesperson>, AppError> {
        let salespeople = sqlx::query_as::<_, Salesperson>(
            "SELECT * FROM salespeople ORDER BY LOWER(last_name), LOWER(first_name)",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(salespeople)
    }
}
