use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::errors::ServiceError;
use crate::services::notifier;
use crate::services::sales::CreateSaleRequest;
use crate::services::web_sales::CreateWebSaleRequest;
use crate::{ApiResponse, AppState};

/// Tenant scope accepted on read/delete endpoints. Auth middleware is an
/// external collaborator; handlers take the resolved ids explicitly.
#[derive(Debug, Deserialize)]
pub struct TenantQuery {
    pub organization_id: Option<i32>,
    pub company_id: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct ListSalesQuery {
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub organization_id: Option<i32>,
    pub company_id: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteSaleQuery {
    pub actor_id: Option<i32>,
    pub organization_id: Option<i32>,
    pub company_id: Option<i32>,
}

fn default_limit() -> u64 {
    10
}

pub async fn create_sale(
    State(state): State<AppState>,
    Json(payload): Json<CreateSaleRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let hook = state.accounting.clone().map(notifier::hook_from_notifier);
    let receipt = state.services.sales.create_sale(payload, hook).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(receipt))))
}

pub async fn create_web_sale(
    State(state): State<AppState>,
    Json(payload): Json<CreateWebSaleRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let hook = state.accounting.clone().map(notifier::hook_from_notifier);
    let receipt = state
        .services
        .web_sales
        .create_web_sale(payload, hook)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(receipt))))
}

pub async fn get_sale(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(query): Query<TenantQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let sale = state
        .services
        .sales
        .get_sale(id, query.organization_id, query.company_id)
        .await?;
    Ok(Json(ApiResponse::success(sale)))
}

pub async fn list_sales(
    State(state): State<AppState>,
    Query(query): Query<ListSalesQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let sales = state
        .services
        .sales
        .list_recent_sales(query.limit, query.organization_id, query.company_id)
        .await?;
    Ok(Json(ApiResponse::success(sales)))
}

pub async fn delete_sale(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(query): Query<DeleteSaleQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let sale = state
        .services
        .sales
        .delete_sale(id, query.actor_id, query.organization_id, query.company_id)
        .await?;
    Ok(Json(ApiResponse::success(sale)))
}
