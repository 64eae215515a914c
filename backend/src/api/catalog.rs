//! Product and category endpoints.

use axum::extract::{Path, State};
use serde::Deserialize;

use super::{success, ApiJson, ApiQuery, ApiResult};
use crate::errors::AppError;
use crate::models::{
    Category, CreateCategoryRequest, CreateProductRequest, Product, UpdateCategoryRequest,
    UpdateProductRequest,
};
use crate::AppState;

/// Storefront product filter.
#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    /// Category slug
    #[serde(default)]
    pub category: Option<String>,
}

/// GET /api/products?category= - Active products, optionally for one category slug.
pub async fn list_public_products(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ProductQuery>,
) -> ApiResult<Vec<Product>> {
    let products = state.repo.list_products().await?;

    let category_id = match query.category.as_deref().filter(|c| !c.is_empty()) {
        Some(slug) => {
            let categories = state.repo.list_categories().await?;
            match categories.into_iter().find(|c| c.slug == slug) {
                Some(category) => Some(category.id),
                None => return success(Vec::new()),
            }
        }
        None => None,
    };

    success(
        products
            .into_iter()
            .filter(|p| p.active)
            .filter(|p| category_id.is_none() || p.category_id == category_id)
            .collect(),
    )
}

/// GET /api/products/:slug - One active product.
pub async fn get_public_product(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Product> {
    match state.repo.get_product_by_slug(&slug).await? {
        Some(product) if product.active => success(product),
        _ => Err(AppError::NotFound(format!("Product {} not found", slug))),
    }
}

/// GET /api/categories
pub async fn list_categories(State(state): State<AppState>) -> ApiResult<Vec<Category>> {
    success(state.repo.list_categories().await?)
}

/// GET /api/admin/products - All products including inactive ones.
pub async fn list_products(State(state): State<AppState>) -> ApiResult<Vec<Product>> {
    success(state.repo.list_products().await?)
}

/// GET /api/admin/products/:id
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Product> {
    match state.repo.get_product(&id).await? {
        Some(product) => success(product),
        None => Err(AppError::NotFound(format!("Product {} not found", id))),
    }
}

/// POST /api/admin/products
pub async fn create_product(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateProductRequest>,
) -> ApiResult<Product> {
    success(state.repo.create_product(&request).await?)
}

/// PUT /api/admin/products/:id
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<UpdateProductRequest>,
) -> ApiResult<Product> {
    success(state.repo.update_product(&id, &request).await?)
}

/// DELETE /api/admin/products/:id
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    state.repo.delete_product(&id).await?;
    success(())
}

/// POST /api/admin/categories
pub async fn create_category(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateCategoryRequest>,
) -> ApiResult<Category> {
    success(state.repo.create_category(&request).await?)
}

/// PUT /api/admin/categories/:id
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<UpdateCategoryRequest>,
) -> ApiResult<Category> {
    success(state.repo.update_category(&id, &request).await?)
}

/// DELETE /api/admin/categories/:id
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    state.repo.delete_category(&id).await?;
    success(())
}
