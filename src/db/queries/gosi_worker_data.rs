//! Database queries for the `gosi_worker_data` table.

use sqlx::PgConnection;
use uuid::Uuid;

use crate::types::GosiWorkerRecord;

/// Check whether a subscriber with this identity number is already stored
pub async fn identity_number_exists(
    conn: &mut PgConnection,
    identity_number: &str,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM gosi_worker_data WHERE identity_number = $1)",
    )
    .bind(identity_number)
    .fetch_one(conn)
    .await
}

/// Insert a subscriber record and return its generated id
pub async fn insert_gosi_worker(
    conn: &mut PgConnection,
    record: &GosiWorkerRecord,
    created_by: &str,
) -> Result<Uuid, sqlx::Error> {
    let id = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO gosi_worker_data (
            id, identity_number, subscriber_name, nationality, gender,
            date_of_birth, basic_salary, housing, commissions, other_allowances,
            total_salary, contributable_salary, occupation, joining_date,
            created_by, created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, NOW())
        "#,
    )
    .bind(id)
    .bind(&record.identity_number)
    .bind(&record.subscriber_name)
    .bind(&record.nationality)
    .bind(&record.gender)
    .bind(record.date_of_birth)
    .bind(&record.basic_salary)
    .bind(&record.housing)
    .bind(&record.commissions)
    .bind(&record.other_allowances)
    .bind(&record.total_salary)
    .bind(&record.contributable_salary)
    .bind(&record.occupation)
    .bind(record.joining_date)
    .bind(created_by)
    .execute(conn)
    .await?;

    Ok(id)
}
