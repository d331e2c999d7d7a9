use lazy_static::lazy_static;
use regex::Regex;
use sqlx::PgPool;
use time::OffsetDateTime;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::EmployeeDto;
use super::repo::EmployeeChanges;
use super::repo_types::Employee;
use crate::{
    auth::password::{hash_password, verify_password, DEFAULT_PASSWORD},
    common::{non_blank, Audit, PageResult, PageWindow, STATUS_DISABLED, STATUS_ENABLED},
    error::{AppError, AppResult},
};

pub const ADMIN_USERNAME: &str = "admin";

lazy_static! {
    static ref PHONE_RE: Regex = Regex::new(r"^1\d{10}$").unwrap();
    static ref ID_NUMBER_RE: Regex = Regex::new(r"^\d{17}[\dXx]$").unwrap();
}

pub(crate) fn validate_employee(dto: &EmployeeDto) -> AppResult<()> {
    if dto.name.trim().is_empty() {
        return Err(AppError::BadRequest("name must not be empty".into()));
    }
    let username_len = dto.username.trim().chars().count();
    if !(3..=20).contains(&username_len) {
        return Err(AppError::BadRequest("username must be 3-20 characters".into()));
    }
    if !PHONE_RE.is_match(&dto.phone) {
        return Err(AppError::BadRequest("invalid phone number".into()));
    }
    if !ID_NUMBER_RE.is_match(&dto.id_number) {
        return Err(AppError::BadRequest("invalid id number".into()));
    }
    if dto.sex != "0" && dto.sex != "1" {
        return Err(AppError::BadRequest("sex must be \"0\" or \"1\"".into()));
    }
    Ok(())
}

pub(crate) fn validate_status(status: i32) -> AppResult<()> {
    if status != STATUS_ENABLED && status != STATUS_DISABLED {
        return Err(AppError::BadRequest(format!("unknown status {status}")));
    }
    Ok(())
}

/// Checks credentials; disabled accounts are refused even with the right password.
#[instrument(skip(db, password))]
pub async fn login(db: &PgPool, username: &str, password: &str) -> AppResult<Employee> {
    let employee = match Employee::get_by_username(db, username.trim()).await? {
        Some(e) => e,
        None => {
            warn!(username = %username, "login unknown username");
            return Err(AppError::Unauthorized);
        }
    };

    if !verify_password(password, &employee.password_hash)? {
        warn!(employee_id = %employee.id, "login invalid password");
        return Err(AppError::Unauthorized);
    }

    if employee.status == STATUS_DISABLED {
        warn!(employee_id = %employee.id, "login on disabled account");
        return Err(AppError::AccountLocked);
    }

    Ok(employee)
}

fn new_employee(dto: &EmployeeDto, password_hash: String, created_by: Option<Uuid>) -> Employee {
    let now = OffsetDateTime::now_utc();
    Employee {
        id: Uuid::new_v4(),
        name: dto.name.trim().to_string(),
        username: dto.username.trim().to_string(),
        password_hash,
        phone: dto.phone.clone(),
        sex: dto.sex.clone(),
        id_number: dto.id_number.clone(),
        status: STATUS_ENABLED,
        create_time: now,
        update_time: now,
        create_user: created_by,
        update_user: created_by,
    }
}

/// Creates an enabled employee with the default password.
#[instrument(skip(db, dto), fields(username = %dto.username))]
pub async fn save(db: &PgPool, dto: &EmployeeDto, actor: Uuid) -> AppResult<Uuid> {
    validate_employee(dto)?;
    let hash = hash_password(DEFAULT_PASSWORD)?;
    let employee = new_employee(dto, hash, Some(actor));

    Employee::insert(db, &employee).await.map_err(|e| match e {
        AppError::AlreadyExists(_) => AppError::AlreadyExists(format!("username {}", employee.username)),
        other => other,
    })?;
    info!(employee_id = %employee.id, "employee created");
    Ok(employee.id)
}

pub async fn page(
    db: &PgPool,
    name: Option<String>,
    page: i64,
    page_size: i64,
) -> AppResult<PageResult<Employee>> {
    let name = non_blank(name);
    let (total, records) =
        Employee::page_query(db, name.as_deref(), PageWindow::new(page, page_size)).await?;
    Ok(PageResult { total, records })
}

pub async fn get(db: &PgPool, id: Uuid) -> AppResult<Employee> {
    Employee::get_by_id(db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("employee".into()))
}

#[instrument(skip(db, dto))]
pub async fn update(db: &PgPool, dto: &EmployeeDto, actor: Uuid) -> AppResult<()> {
    let id = dto
        .id
        .ok_or_else(|| AppError::BadRequest("id is required".into()))?;
    validate_employee(dto)?;

    let changes = EmployeeChanges {
        name: dto.name.trim(),
        username: dto.username.trim(),
        phone: &dto.phone,
        sex: &dto.sex,
        id_number: &dto.id_number,
    };
    if !Employee::update(db, id, changes, Audit::now(actor)).await? {
        return Err(AppError::NotFound("employee".into()));
    }
    Ok(())
}

#[instrument(skip(db))]
pub async fn set_status(db: &PgPool, id: Uuid, status: i32, actor: Uuid) -> AppResult<()> {
    validate_status(status)?;
    if !Employee::set_status(db, id, status, Audit::now(actor)).await? {
        return Err(AppError::NotFound("employee".into()));
    }
    Ok(())
}

/// Makes sure an `admin` account exists so a fresh database can be logged into.
pub async fn ensure_admin(db: &PgPool, password: &str) -> AppResult<()> {
    if Employee::get_by_username(db, ADMIN_USERNAME).await?.is_some() {
        return Ok(());
    }
    let dto = EmployeeDto {
        id: None,
        name: "Administrator".into(),
        username: ADMIN_USERNAME.into(),
        phone: "13800000000".into(),
        sex: "1".into(),
        id_number: "110101199001011234".into(),
    };
    let employee = new_employee(&dto, hash_password(password)?, None);
    Employee::insert(db, &employee).await?;
    info!(employee_id = %employee.id, "bootstrap admin created");
    Ok(())
}
