//! Marathon scheduler client

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use super::{DeleteOutcome, InstalledApp, LABEL_PACKAGE_NAME, Scheduler};
use crate::error::{self, PkgError, Result};

#[derive(Debug, Deserialize)]
struct AppsResponse {
    #[serde(default)]
    apps: Vec<InstalledApp>,
}

/// Basic auth credentials
#[derive(Debug, Clone)]
pub struct Credentials {
    pub user: String,
    pub password: Option<String>,
}

/// Scheduler backed by Marathon's `/v2/apps` API
#[derive(Debug, Clone)]
pub struct MarathonScheduler {
    client: Client,
    base: Url,
    credentials: Option<Credentials>,
}

impl MarathonScheduler {
    pub fn new(
        address: &str,
        credentials: Option<Credentials>,
        accept_invalid_certs: bool,
        timeout: Duration,
    ) -> Result<Self> {
        let base = Url::parse(address).map_err(|e| {
            error::config::invalid(format!("Invalid Marathon address '{address}': {e}"))
        })?;

        let client = Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()
            .map_err(|e| {
                error::scheduler::unavailable(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            base,
            credentials,
        })
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .map_err(|e| error::config::invalid(format!("Invalid Marathon path '{path}': {e}")))
    }

    fn send(&self, request: RequestBuilder) -> Result<Response> {
        let request = match &self.credentials {
            Some(credentials) => {
                request.basic_auth(&credentials.user, credentials.password.as_ref())
            }
            None => request,
        };
        request
            .send()
            .map_err(|e| error::scheduler::unavailable(e.to_string()))
    }
}

fn failed(response: Response) -> PkgError {
    let status = response.status().as_u16();
    let body = response.text().unwrap_or_default();
    error::scheduler::request_failed(status, body)
}

impl Scheduler for MarathonScheduler {
    fn submit(&self, job: &Value) -> Result<String> {
        let url = self.url("/v2/apps")?;
        trace!(%url, "Submitting job");

        let response = self.send(self.client.post(url).json(job))?;
        if !response.status().is_success() {
            return Err(failed(response));
        }
        response
            .text()
            .map_err(|e| error::scheduler::unavailable(e.to_string()))
    }

    fn list_apps(&self) -> Result<Vec<InstalledApp>> {
        let mut url = self.url("/v2/apps")?;
        url.query_pairs_mut().append_pair("label", LABEL_PACKAGE_NAME);
        trace!(%url, "Listing apps");

        let response = self.send(self.client.get(url))?;
        if !response.status().is_success() {
            return Err(failed(response));
        }

        let apps: AppsResponse = response
            .json()
            .map_err(|e| error::scheduler::unavailable(format!("Invalid apps response: {e}")))?;
        debug!(count = apps.apps.len(), "Listed installed apps");
        Ok(apps.apps)
    }

    fn delete(&self, app_id: &str) -> Result<DeleteOutcome> {
        let url = self.url(&format!("/v2/apps/{}", app_id.trim_start_matches('/')))?;
        trace!(%url, "Deleting app");

        let response = self.send(self.client.delete(url))?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(DeleteOutcome::AlreadyGone),
            s if s.is_success() => Ok(DeleteOutcome::Deleted),
            _ => Err(failed(response)),
        }
    }
}
