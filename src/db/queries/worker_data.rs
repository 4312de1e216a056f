//! Database queries for the `worker_data` table.

use sqlx::PgConnection;
use uuid::Uuid;

use crate::types::WorkerRecord;

/// Check whether a worker with this id is already stored
pub async fn worker_id_exists(conn: &mut PgConnection, worker_id: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM worker_data WHERE worker_id = $1)")
        .bind(worker_id)
        .fetch_one(conn)
        .await
}

/// Insert a worker record and return its generated id
pub async fn insert_worker(
    conn: &mut PgConnection,
    record: &WorkerRecord,
    created_by: &str,
) -> Result<Uuid, sqlx::Error> {
    let id = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO worker_data (
            id, worker_id, worker_name, nationality, company_id, company_name,
            border_number, iqama_number, occupation, iqama_expiry, entry_date_ksa,
            worker_type, created_by, created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, NOW())
        "#,
    )
    .bind(id)
    .bind(&record.worker_id)
    .bind(&record.worker_name)
    .bind(&record.nationality)
    .bind(&record.company_id)
    .bind(&record.company_name)
    .bind(&record.border_number)
    .bind(&record.iqama_number)
    .bind(&record.occupation)
    .bind(record.iqama_expiry)
    .bind(record.entry_date_ksa)
    .bind(&record.worker_type)
    .bind(created_by)
    .execute(conn)
    .await?;

    Ok(id)
}
