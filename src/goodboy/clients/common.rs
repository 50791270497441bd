//! Pieces shared by the HTTP-backed clients: one pooled `reqwest::Client`
//! per base URL and a JSON POST helper that maps every failure to
//! [`GoodBoyError::BackendUnavailable`].

use crate::goodboy::error::GoodBoyError;
use lazy_static::lazy_static;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

lazy_static! {
    static ref HTTP_CLIENT_POOL: Mutex<HashMap<String, reqwest::Client>> =
        Mutex::new(HashMap::new());
}

/// Get or create the shared HTTP client for `base_url`.
pub fn get_http_client(base_url: &str) -> reqwest::Client {
    let mut pool = match HTTP_CLIENT_POOL.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };

    if let Some(client) = pool.get(base_url) {
        return client.clone();
    }

    let client = reqwest::ClientBuilder::new()
        .pool_idle_timeout(Some(Duration::from_secs(90)))
        .pool_max_idle_per_host(4)
        .tcp_keepalive(Some(Duration::from_secs(60)))
        .build()
        .unwrap_or_else(|e| {
            log::warn!("goodboy::clients: custom HTTP client failed ({}), using defaults", e);
            reqwest::Client::new()
        });

    pool.insert(base_url.to_string(), client.clone());
    client
}

/// Join a base URL and a path without doubling or dropping the slash.
pub fn join_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// POST `body` as JSON and decode the JSON reply.
pub async fn post_json<B: Serialize + ?Sized, R: DeserializeOwned>(
    base_url: &str,
    path: &str,
    body: &B,
    bearer: Option<&str>,
    timeout: Duration,
) -> Result<R, GoodBoyError> {
    let url = join_url(base_url, path);
    let mut request = get_http_client(base_url)
        .post(&url)
        .timeout(timeout)
        .json(body);
    if let Some(token) = bearer {
        request = request.bearer_auth(token);
    }

    let response = request.send().await.map_err(|e| {
        log::error!("goodboy::clients::common::post_json({}): {}", url, e);
        GoodBoyError::BackendUnavailable(format!("{} unreachable: {}", url, e))
    })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        log::error!(
            "goodboy::clients::common::post_json({}): HTTP {} {}",
            url,
            status,
            body
        );
        return Err(GoodBoyError::BackendUnavailable(format!(
            "{} returned HTTP {}",
            url, status
        )));
    }

    response.json::<R>().await.map_err(|e| {
        GoodBoyError::BackendUnavailable(format!("{} sent an unreadable reply: {}", url, e))
    })
}
