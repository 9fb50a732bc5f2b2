//! Catalog endpoints: product listing with search and category filters, and
//! localized display names the way the storefront renders them.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::{ApiError, ListParams, PaginatedResponse};
use crate::domain::{Category, Language, Product};
use crate::state::AppState;
use crate::sync::LogLevel;

#[derive(Debug, Deserialize)]
pub struct LangParam {
    pub lang: Option<String>,
}

/// A catalog entity plus its name resolved for the requested language,
/// falling back to English.
#[derive(Debug, Serialize)]
pub struct Localized<T> {
    #[serde(flatten)]
    pub inner: T,
    pub display_name: String,
}

pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Json<PaginatedResponse<Product>> {
    let page = params.page.unwrap_or(1).max(1);
    let per_page = params.per_page.unwrap_or(20).min(100) as usize;

    let mut products = state.store.list_products().await;
    if let Some(category) = params.category.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        products.retain(|p| p.category.eq_ignore_ascii_case(category));
    }
    if let Some(term) = params.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        products.retain(|p| p.matches_search(term));
        state.sync.log(
            LogLevel::Info,
            format!("Search performed: {term}"),
            "anonymous",
            "catalog",
        );
    }

    let total = products.len();
    let data = products
        .into_iter()
        .skip((page as usize - 1) * per_page)
        .take(per_page)
        .collect();
    Json(PaginatedResponse { data, total, page })
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(q): Query<LangParam>,
) -> Result<Json<Localized<Product>>, ApiError> {
    let lang = q.lang.as_deref().map(Language::from_tag).unwrap_or_default();
    let product = state
        .store
        .find_product(&id)
        .await
        .ok_or_else(|| ApiError::NotFound("Product not found".into()))?;
    let display_name = product.display_name(lang).to_string();
    Ok(Json(Localized { inner: product, display_name }))
}

pub async fn list_categories(
    State(state): State<AppState>,
    Query(q): Query<LangParam>,
) -> Json<Vec<Localized<Category>>> {
    let lang = q.lang.as_deref().map(Language::from_tag).unwrap_or_default();
    let categories = state
        .store
        .list_categories()
        .await
        .into_iter()
        .map(|c| {
            let display_name = c.display_name(lang).to_string();
            Localized { inner: c, display_name }
        })
        .collect();
    Json(categories)
}
