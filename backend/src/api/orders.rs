//! Order endpoints, including the print view and CSV export.

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};

use super::{success, ApiJson, ApiQuery, ApiResult};
use crate::errors::AppError;
use crate::models::{CreateOrderRequest, Order, OrderFilter, UpdateOrderRequest};
use crate::print::{groups_to_csv, print_sheet, PrintSheet};
use crate::AppState;

/// POST /api/orders - Place an order. Rejected while the shop is closed.
pub async fn create_order(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateOrderRequest>,
) -> ApiResult<Order> {
    let config = state.repo.get_site_config().await?;
    if config.shop_closed {
        return Err(AppError::Validation(
            "The shop is currently closed".to_string(),
        ));
    }

    success(state.repo.create_order(&request).await?)
}

/// GET /api/admin/orders?status= - List orders.
pub async fn list_orders(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<OrderFilter>,
) -> ApiResult<Vec<Order>> {
    success(state.repo.list_orders(filter.status).await?)
}

/// GET /api/admin/orders/:id
pub async fn get_order(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Order> {
    match state.repo.get_order(&id).await? {
        Some(order) => success(order),
        None => Err(AppError::NotFound(format!("Order {} not found", id))),
    }
}

/// POST /api/admin/orders - Enter an order from the back-office, even while the shop is closed.
pub async fn create_admin_order(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateOrderRequest>,
) -> ApiResult<Order> {
    success(state.repo.create_order(&request).await?)
}

/// PUT /api/admin/orders/:id - Update status, notes or line details.
pub async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<UpdateOrderRequest>,
) -> ApiResult<Order> {
    success(state.repo.update_order(&id, &request).await?)
}

/// DELETE /api/admin/orders/:id
pub async fn delete_order(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    state.repo.delete_order(&id).await?;
    success(())
}

/// GET /api/admin/orders/print?status= - Grouped quantities for the print view.
pub async fn print_orders(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<OrderFilter>,
) -> ApiResult<PrintSheet> {
    let orders = state.repo.list_orders(filter.status).await?;
    success(print_sheet(&orders))
}

/// GET /api/admin/orders/export?status= - The print view as CSV.
pub async fn export_orders(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<OrderFilter>,
) -> Result<impl IntoResponse, AppError> {
    let orders = state.repo.list_orders(filter.status).await?;
    let csv = groups_to_csv(&print_sheet(&orders).groups)?;

    let filename = match filter.status {
        Some(status) => format!("orders-{}.csv", status.as_str()),
        None => "orders.csv".to_string(),
    };

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        csv,
    ))
}
