use std::collections::{HashMap, HashSet};

use sqlx::PgPool;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::{SetmealDto, SetmealPageQuery};
use super::repo::SetmealFilter;
use super::repo_types::{Setmeal, SetmealDetail, SetmealDish, SetmealView};
use crate::{
    category::{Category, SETMEAL_CATEGORY},
    common::{non_blank, Audit, PageResult, PageWindow, STATUS_DISABLED, STATUS_ENABLED},
    dish::Dish,
    error::{AppError, AppResult},
};

pub(crate) fn validate_setmeal(dto: &SetmealDto) -> AppResult<()> {
    if dto.name.trim().is_empty() {
        return Err(AppError::BadRequest("setmeal name must not be empty".into()));
    }
    if dto.price < 0 {
        return Err(AppError::BadRequest("price must not be negative".into()));
    }
    if dto.status != STATUS_ENABLED && dto.status != STATUS_DISABLED {
        return Err(AppError::BadRequest(format!("unknown status {}", dto.status)));
    }
    if dto.setmeal_dishes.is_empty() {
        return Err(AppError::BadRequest("a setmeal needs at least one dish".into()));
    }
    let mut seen = HashSet::new();
    for d in &dto.setmeal_dishes {
        if d.copies < 1 {
            return Err(AppError::BadRequest("copies must be at least 1".into()));
        }
        if !seen.insert(d.dish_id) {
            return Err(AppError::BadRequest(format!("dish {} listed twice", d.dish_id)));
        }
    }
    Ok(())
}

/// Builds the setmeal row and its dish links. Every referenced dish must be in `dishes`.
pub(crate) fn build_setmeal(
    dto: &SetmealDto,
    dishes: &[Dish],
    audit: Audit,
) -> AppResult<(Setmeal, Vec<SetmealDish>)> {
    let by_id: HashMap<Uuid, &Dish> = dishes.iter().map(|d| (d.id, d)).collect();

    let setmeal = Setmeal {
        id: Uuid::new_v4(),
        category_id: dto.category_id,
        name: dto.name.trim().to_string(),
        price: dto.price,
        status: dto.status,
        description: non_blank(dto.description.clone()),
        image: non_blank(dto.image.clone()),
        create_time: audit.at,
        update_time: audit.at,
        create_user: Some(audit.by),
        update_user: Some(audit.by),
    };

    let links = dto
        .setmeal_dishes
        .iter()
        .map(|link| {
            let dish = by_id
                .get(&link.dish_id)
                .ok_or_else(|| AppError::BadRequest(format!("unknown dish {}", link.dish_id)))?;
            Ok(SetmealDish {
                id: Uuid::new_v4(),
                setmeal_id: setmeal.id,
                dish_id: dish.id,
                name: dish.name.clone(),
                price: dish.price,
                copies: link.copies,
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

    Ok((setmeal, links))
}

/// Parses a comma separated id list, ignoring empty segments.
pub(crate) fn parse_ids(raw: &str) -> AppResult<Vec<Uuid>> {
    let ids = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            Uuid::parse_str(s).map_err(|_| AppError::BadRequest(format!("invalid id {s}")))
        })
        .collect::<AppResult<Vec<_>>>()?;
    if ids.is_empty() {
        return Err(AppError::BadRequest("ids must not be empty".into()));
    }
    Ok(ids)
}

/// Rejects the batch when any of the locked rows is still on sale.
pub(crate) fn ensure_off_sale(rows: &[(Uuid, i32)]) -> AppResult<()> {
    match rows.iter().find(|(_, status)| *status == STATUS_ENABLED) {
        Some((id, _)) => Err(AppError::DeletionNotAllowed(format!(
            "setmeal {id} is on sale"
        ))),
        None => Ok(()),
    }
}

#[instrument(skip(db, dto), fields(name = %dto.name))]
pub async fn save_with_dish(db: &PgPool, dto: &SetmealDto, actor: Uuid) -> AppResult<Uuid> {
    validate_setmeal(dto)?;
    if !Category::exists(db, dto.category_id, SETMEAL_CATEGORY).await? {
        return Err(AppError::BadRequest("unknown setmeal category".into()));
    }

    let dish_ids: Vec<Uuid> = dto.setmeal_dishes.iter().map(|d| d.dish_id).collect();
    let dishes = Dish::find_by_ids(db, &dish_ids).await?;
    let (setmeal, links) = build_setmeal(dto, &dishes, Audit::now(actor))?;

    Setmeal::insert_with_dishes(db, &setmeal, &links)
        .await
        .map_err(|e| match e {
            AppError::AlreadyExists(_) => {
                AppError::AlreadyExists(format!("setmeal {}", setmeal.name))
            }
            other => other,
        })?;

    info!(setmeal_id = %setmeal.id, dishes = links.len(), "setmeal created");
    Ok(setmeal.id)
}

pub async fn query_page(db: &PgPool, q: SetmealPageQuery) -> AppResult<PageResult<SetmealView>> {
    let filter = SetmealFilter {
        name: non_blank(q.name),
        category_id: q.category_id,
        status: q.status,
    };
    let (total, records) =
        Setmeal::page_query(db, &filter, PageWindow::new(q.page, q.page_size)).await?;
    Ok(PageResult { total, records })
}

#[instrument(skip(db))]
pub async fn delete_batch(db: &PgPool, ids: &[Uuid]) -> AppResult<()> {
    let removed = Setmeal::delete_batch(db, ids, ensure_off_sale)
        .await
        .inspect_err(|e| {
            if matches!(e, AppError::DeletionNotAllowed(_)) {
                warn!(error = %e, "setmeal delete refused");
            }
        })?;
    info!(removed, "setmeals deleted");
    Ok(())
}

pub async fn get_by_id(db: &PgPool, id: Uuid) -> AppResult<SetmealDetail> {
    let setmeal = Setmeal::get_view(db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("setmeal {id}")))?;
    let setmeal_dishes = Setmeal::dishes_of(db, id).await?;
    Ok(SetmealDetail {
        setmeal,
        setmeal_dishes,
    })
}
