mod basic;
mod client;
pub mod auth;

pub use basic::BasicClient;
pub use client::HttpClient;

use crate::error::FetchError;

/// Issues a GET for `url` and returns the body of a successful response.
///
/// Non-2xx responses become [`FetchError::Status`] carrying the body text.
pub async fn fetch_bytes<C: HttpClient + ?Sized>(client: &C, url: &str) -> Result<Vec<u8>, FetchError> {
    let url = url
        .parse()
        .map_err(|e| FetchError::Unavailable(format!("invalid url '{url}': {e}")))?;
    let req = reqwest::Request::new(reqwest::Method::GET, url);

    let resp = client.execute(req).await?;
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(FetchError::Status {
            status: status.as_u16(),
            body,
        });
    }

    Ok(resp.bytes().await?.to_vec())
}
