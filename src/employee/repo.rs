use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::Employee;
use crate::{
    common::{like_pattern, Audit, PageWindow},
    error::AppResult,
};

const EMPLOYEE_COLUMNS: &str = "id, name, username, password_hash, phone, sex, id_number, status, \
                                create_time, update_time, create_user, update_user";

/// Fields written by update; password and status have their own paths.
pub struct EmployeeChanges<'a> {
    pub name: &'a str,
    pub username: &'a str,
    pub phone: &'a str,
    pub sex: &'a str,
    pub id_number: &'a str,
}

impl Employee {
    pub async fn get_by_username(db: &PgPool, username: &str) -> AppResult<Option<Employee>> {
        let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employee WHERE username = $1");
        let employee = sqlx::query_as::<_, Employee>(&sql)
            .bind(username)
            .fetch_optional(db)
            .await?;
        Ok(employee)
    }

    pub async fn get_by_id(db: &PgPool, id: Uuid) -> AppResult<Option<Employee>> {
        let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employee WHERE id = $1");
        let employee = sqlx::query_as::<_, Employee>(&sql)
            .bind(id)
            .fetch_optional(db)
            .await?;
        Ok(employee)
    }

    pub async fn insert(db: &PgPool, e: &Employee) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO employee
                (id, name, username, password_hash, phone, sex, id_number, status,
                 create_time, update_time, create_user, update_user)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(e.id)
        .bind(&e.name)
        .bind(&e.username)
        .bind(&e.password_hash)
        .bind(&e.phone)
        .bind(&e.sex)
        .bind(&e.id_number)
        .bind(e.status)
        .bind(e.create_time)
        .bind(e.update_time)
        .bind(e.create_user)
        .bind(e.update_user)
        .execute(db)
        .await?;
        Ok(())
    }

    /// Page of employees whose name contains `name` literally, newest first, plus the total count.
    pub async fn page_query(
        db: &PgPool,
        name: Option<&str>,
        window: PageWindow,
    ) -> AppResult<(i64, Vec<Employee>)> {
        let pattern = name.map(like_pattern);
        let (total,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM employee
            WHERE ($1::text IS NULL OR name LIKE $1 ESCAPE '\')
            "#,
        )
        .bind(pattern.as_deref())
        .fetch_one(db)
        .await?;

        let sql = format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employee \
             WHERE ($1::text IS NULL OR name LIKE $1 ESCAPE '\\') \
             ORDER BY create_time DESC \
             LIMIT $2 OFFSET $3"
        );
        let rows = sqlx::query_as::<_, Employee>(&sql)
            .bind(pattern.as_deref())
            .bind(window.limit)
            .bind(window.offset)
            .fetch_all(db)
            .await?;

        Ok((total, rows))
    }

    /// Returns false when no employee has this id.
    pub async fn update(
        db: &PgPool,
        id: Uuid,
        changes: EmployeeChanges<'_>,
        audit: Audit,
    ) -> AppResult<bool> {
        let done = sqlx::query(
            r#"
            UPDATE employee
            SET name = $1, username = $2, phone = $3, sex = $4, id_number = $5,
                update_time = $6, update_user = $7
            WHERE id = $8
            "#,
        )
        .bind(changes.name)
        .bind(changes.username)
        .bind(changes.phone)
        .bind(changes.sex)
        .bind(changes.id_number)
        .bind(audit.at)
        .bind(audit.by)
        .bind(id)
        .execute(db)
        .await?;
        Ok(done.rows_affected() > 0)
    }

    pub async fn set_status(db: &PgPool, id: Uuid, status: i32, audit: Audit) -> AppResult<bool> {
        let done = sqlx::query(
            r#"
            UPDATE employee
            SET status = $1, update_time = $2, update_user = $3
            WHERE id = $4
            "#,
        )
        .bind(status)
        .bind(audit.at)
        .bind(audit.by)
        .bind(id)
        .execute(db)
        .await?;
        Ok(done.rows_affected() > 0)
    }
}
