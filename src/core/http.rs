use std::time::Duration;

use reqwest::{
    blocking::{
        Client,
        Response,
    },
    header::USER_AGENT,
};

use crate::core::AnkipeekError;

/// Public CORS relay used when a browser-hosted deck URL refuses direct GETs.
pub const DEFAULT_CORS_PROXY: &str = "http://cors-anywhere.herokuapp.com/";

pub fn http_client() -> Result<Client, AnkipeekError> {
    Client::builder()
        .timeout(Duration::from_secs(120))
        .build()
        .map_err(|e| AnkipeekError::Custom(format!("HTTP client build failed: {e}")))
}

/// Fetch a packaged deck over HTTP, optionally through a CORS-relay prefix.
///
/// Returns the raw body bytes. Nothing is parsed here; callers hand the bytes
/// to the archive layer, so an aborted or failed fetch can never publish a
/// partially loaded collection.
pub fn fetch_apkg(
    client: &Client,
    url: &str,
    cors_proxy: Option<&str>,
) -> Result<Vec<u8>, AnkipeekError> {
    let full_url = match cors_proxy {
        Some(prefix) => format!("{prefix}{url}"),
        None => url.to_string(),
    };

    let resp = client.get(&full_url).header(USER_AGENT, "ankipeek/0.2 (+reqwest)").send()?;
    ensure_success(&resp)?;

    Ok(resp.bytes()?.to_vec())
}

fn ensure_success(resp: &Response) -> Result<(), AnkipeekError> {
    if !resp.status().is_success() {
        return Err(AnkipeekError::Custom(format!(
            "HTTP GET {} returned status {}",
            resp.url(),
            resp.status()
        )));
    }
    Ok(())
}
