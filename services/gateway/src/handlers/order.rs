use crate::error::AppError;
use crate::intake::OrderSubmission;
use crate::models::{CreateOrderRequest, OpenOrderView, OrderResponse};
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

pub async fn create_order(
    State(state): State<AppState>,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<Json<OrderResponse>, AppError> {
    let Json(request) = payload.map_err(|rejection| AppError::InvalidRequest(rejection.body_text()))?;

    // 1. Validate required fields
    let submission = OrderSubmission::try_from(request)?;

    // 2. Rate limit per submitter
    state.rate_limiter.check(&submission.submitter_id)?;

    // 3. Sign, match, settle
    let outcome = state.intake.submit(submission).await?;
    Ok(Json(outcome.into()))
}

pub async fn list_orders(State(state): State<AppState>) -> Result<Json<Vec<OpenOrderView>>, AppError> {
    let orders = state.intake.open_orders()?;
    Ok(Json(orders.iter().map(OpenOrderView::from).collect()))
}
