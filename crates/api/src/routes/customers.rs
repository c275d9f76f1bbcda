//! Customer CRUD route handlers.
//!
//! Every handler requires [`RequireApiToken`]. Ids arrive as raw path tokens
//! and are parsed by the service so that a bad id is reported as
//! `invalid_id` rather than a routing failure.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use farmaup_core::{Customer, CustomerFilter, CustomerInput};

use crate::error::{AppError, Result};
use crate::middleware::RequireApiToken;
use crate::services::CustomerList;
use crate::state::AppState;

/// Query parameters for `GET /customers`.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub name: Option<String>,
    pub city: Option<String>,
}

/// Response body for writes: a confirmation plus the affected record.
#[derive(Debug, Serialize)]
pub struct CustomerEnvelope {
    pub message: &'static str,
    pub customer: Customer,
}

/// Unwrap a JSON body, reporting malformed input as `invalid_body`.
fn json_body(body: std::result::Result<Json<CustomerInput>, JsonRejection>) -> Result<CustomerInput> {
    body.map(|Json(input)| input)
        .map_err(|rejection| AppError::InvalidBody(rejection.body_text()))
}

/// `GET /customers` - list customers, optionally filtered by name and city.
pub async fn list(
    _: RequireApiToken,
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<CustomerList>> {
    let filter = CustomerFilter::new(params.name, params.city);
    let list = state.customers().list(filter).await?;
    Ok(Json(list))
}

/// `GET /customers/{id}` - fetch one customer.
pub async fn show(
    _: RequireApiToken,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Customer>> {
    let customer = state.customers().get(&id).await?;
    Ok(Json(customer))
}

/// `POST /customers` - create a customer.
pub async fn create(
    _: RequireApiToken,
    State(state): State<AppState>,
    body: std::result::Result<Json<CustomerInput>, JsonRejection>,
) -> Result<(StatusCode, Json<CustomerEnvelope>)> {
    let input = json_body(body)?;
    let customer = state.customers().create(&input).await?;
    Ok((
        StatusCode::CREATED,
        Json(CustomerEnvelope {
            message: "Customer created",
            customer,
        }),
    ))
}

/// `PUT /customers/{id}` - replace all fields of a customer.
pub async fn update(
    _: RequireApiToken,
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: std::result::Result<Json<CustomerInput>, JsonRejection>,
) -> Result<Json<CustomerEnvelope>> {
    let input = json_body(body)?;
    let customer = state.customers().update(&id, &input).await?;
    Ok(Json(CustomerEnvelope {
        message: "Customer updated",
        customer,
    }))
}

/// `DELETE /customers/{id}` - delete a customer.
pub async fn delete(
    _: RequireApiToken,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CustomerEnvelope>> {
    let customer = state.customers().delete(&id).await?;
    Ok(Json(CustomerEnvelope {
        message: "Customer deleted",
        customer,
    }))
}
