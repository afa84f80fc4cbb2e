use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

#[derive(Debug, Deserialize, ToSchema)]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl Pagination {
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;
        (page, per_page, offset)
    }
}

/// Parse a comma-separated id list query value ("id1,id2,..."). Empty values
/// between commas are skipped; a malformed id is a client error.
pub fn parse_id_list(raw: &str) -> AppResult<Vec<Uuid>> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            Uuid::parse_str(part)
                .map_err(|_| AppError::BadRequest(format!("invalid id in filter: {part}")))
        })
        .collect()
}

// Pagination fields are inlined rather than flattened: serde_urlencoded
// cannot deserialize numeric fields through serde(flatten), so a flattened
// Pagination would reject every ?page=N request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ProductQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    /// Comma-separated tag ids; a product matches if it carries any of them.
    pub tags: Option<String>,
    /// Comma-separated category ids.
    pub categories: Option<String>,
}

impl ProductQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }

    pub fn tag_ids(&self) -> AppResult<Option<Vec<Uuid>>> {
        match self.tags.as_deref() {
            Some(raw) => {
                let ids = parse_id_list(raw)?;
                Ok(if ids.is_empty() { None } else { Some(ids) })
            }
            None => Ok(None),
        }
    }

    pub fn category_ids(&self) -> AppResult<Option<Vec<Uuid>>> {
        match self.categories.as_deref() {
            Some(raw) => {
                let ids = parse_id_list(raw)?;
                Ok(if ids.is_empty() { None } else { Some(ids) })
            }
            None => Ok(None),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignedQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    /// When true, only return tags/categories attached to at least one product.
    pub assigned_only: Option<bool>,
}

impl AssignedQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }
}
