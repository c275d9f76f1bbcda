//! Service information endpoint.

use axum::{Json, extract::State};
use serde::Serialize;

use crate::state::AppState;

/// One entry of the endpoint listing.
#[derive(Debug, Serialize)]
pub struct EndpointInfo {
    pub method: &'static str,
    pub path: &'static str,
    pub description: &'static str,
}

/// Response body for `GET /`.
#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub storage: &'static str,
    pub endpoints: &'static [EndpointInfo],
}

const ENDPOINTS: &[EndpointInfo] = &[
    EndpointInfo {
        method: "GET",
        path: "/customers",
        description: "List customers, filter with ?name= and ?city=",
    },
    EndpointInfo {
        method: "GET",
        path: "/customers/{id}",
        description: "Fetch a customer by id",
    },
    EndpointInfo {
        method: "POST",
        path: "/customers",
        description: "Create a customer",
    },
    EndpointInfo {
        method: "PUT",
        path: "/customers/{id}",
        description: "Replace a customer",
    },
    EndpointInfo {
        method: "DELETE",
        path: "/customers/{id}",
        description: "Delete a customer",
    },
];

/// `GET /` - name, version and endpoint listing. Not token-gated.
pub async fn index(State(state): State<AppState>) -> Json<ServiceInfo> {
    Json(ServiceInfo {
        name: "FarmaUP Customers API",
        version: env!("CARGO_PKG_VERSION"),
        storage: state.customers().store().backend(),
        endpoints: ENDPOINTS,
    })
}
