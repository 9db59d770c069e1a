//! `/1/packages` handlers

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use tracing::debug;

use super::HttpServer;
use super::response::error_response;
use crate::error;
use crate::operations::PackageRequest;

#[derive(Debug, Deserialize)]
pub(super) struct VersionQuery {
    version: Option<String>,
}

pub(super) async fn list(State(server): State<HttpServer>) -> Response {
    match server.call(|o| o.packages()).await {
        Ok(packages) => Json(packages).into_response(),
        Err(e) => error_response("failed to list packages", &e),
    }
}

pub(super) async fn describe(
    State(server): State<HttpServer>,
    Path(name): Path<String>,
    Query(query): Query<VersionQuery>,
) -> Response {
    debug!(package = %name, version = ?query.version, "Describe package");
    let result = server
        .call(move |o| o.package(&name, query.version.as_deref()))
        .await;
    match result {
        Ok(definition) => Json(definition).into_response(),
        Err(e) => error_response("failed to describe package", &e),
    }
}

pub(super) async fn install(State(server): State<HttpServer>, body: Bytes) -> Response {
    let request = match PackageRequest::parse(&body) {
        Ok(request) => request,
        Err(e) => return error_response("failed to parse request", &e),
    };
    debug!(package = %request.name, version = ?request.version, "Install package");

    match server.call(move |o| o.install_package(&request)).await {
        Ok(body) => (
            StatusCode::CREATED,
            [(header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response(),
        Err(e) => error_response("failed to install package", &e),
    }
}

pub(super) async fn uninstall(
    State(server): State<HttpServer>,
    Path(name): Path<String>,
    body: Bytes,
) -> Response {
    let request = match PackageRequest::parse_for_name(&body, &name) {
        Ok(request) => request,
        Err(e) => return error_response("failed to parse request", &e),
    };
    debug!(package = %request.name, version = ?request.version, "Uninstall package");

    let result = server
        .call(move |o| {
            let app = o
                .find_installed(&request)?
                .ok_or_else(|| error::package::not_installed(&request.name))?;
            o.uninstall_package(&app)
        })
        .await;

    match result {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response("failed to uninstall package", &e),
    }
}
