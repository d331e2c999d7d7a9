use std::collections::HashSet;

use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;

use super::dto::{DishDto, DishPageQuery};
use super::repo::DishFilter;
use super::repo_types::{Dish, DishFlavor, DishView};
use crate::{
    category::{Category, DISH_CATEGORY},
    common::{non_blank, Audit, PageResult, PageWindow, STATUS_DISABLED, STATUS_ENABLED},
    error::{AppError, AppResult},
};

pub(crate) fn validate_dish(dto: &DishDto) -> AppResult<()> {
    if dto.name.trim().is_empty() {
        return Err(AppError::BadRequest("dish name must not be empty".into()));
    }
    if dto.price < 0 {
        return Err(AppError::BadRequest("price must not be negative".into()));
    }
    if dto.status != STATUS_ENABLED && dto.status != STATUS_DISABLED {
        return Err(AppError::BadRequest(format!("unknown status {}", dto.status)));
    }
    let mut seen = HashSet::new();
    for f in &dto.flavors {
        if f.name.trim().is_empty() || f.value.trim().is_empty() {
            return Err(AppError::BadRequest("flavor name and value are required".into()));
        }
        if !seen.insert(f.name.trim()) {
            return Err(AppError::BadRequest(format!("duplicate flavor {}", f.name.trim())));
        }
    }
    Ok(())
}

/// Builds the dish row and its flavor rows from the request.
pub(crate) fn build_dish(dto: &DishDto, audit: Audit) -> (Dish, Vec<DishFlavor>) {
    let dish = Dish {
        id: Uuid::new_v4(),
        name: dto.name.trim().to_string(),
        category_id: dto.category_id,
        price: dto.price,
        image: non_blank(dto.image.clone()),
        description: non_blank(dto.description.clone()),
        status: dto.status,
        create_time: audit.at,
        update_time: audit.at,
        create_user: Some(audit.by),
        update_user: Some(audit.by),
    };
    let flavors = dto
        .flavors
        .iter()
        .map(|f| DishFlavor {
            id: Uuid::new_v4(),
            dish_id: dish.id,
            name: f.name.trim().to_string(),
            value: f.value.clone(),
        })
        .collect();
    (dish, flavors)
}

#[instrument(skip(db, dto), fields(name = %dto.name))]
pub async fn save_with_flavor(db: &PgPool, dto: &DishDto, actor: Uuid) -> AppResult<Uuid> {
    validate_dish(dto)?;
    if !Category::exists(db, dto.category_id, DISH_CATEGORY).await? {
        return Err(AppError::BadRequest("unknown dish category".into()));
    }

    let (dish, flavors) = build_dish(dto, Audit::now(actor));
    Dish::insert_with_flavors(db, &dish, &flavors)
        .await
        .map_err(|e| match e {
            AppError::AlreadyExists(_) => AppError::AlreadyExists(format!("dish {}", dish.name)),
            other => other,
        })?;

    info!(dish_id = %dish.id, flavors = flavors.len(), "dish created");
    Ok(dish.id)
}

pub async fn query_page(db: &PgPool, q: DishPageQuery) -> AppResult<PageResult<DishView>> {
    let filter = DishFilter {
        name: non_blank(q.name),
        category_id: q.category_id,
        status: q.status,
    };
    let (total, records) =
        Dish::page_query(db, &filter, PageWindow::new(q.page, q.page_size)).await?;
    Ok(PageResult { total, records })
}
