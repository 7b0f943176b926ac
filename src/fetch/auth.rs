use super::REQUEST_TIMEOUT;
use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

const AAD_TOKEN_URL: &str = "https://login.windows.net";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct TokenError {
    #[serde(default)]
    error_description: Option<String>,
}

/// Turn a failed token response body into the message shown to the user.
fn token_error_message(body: &str) -> String {
    let described = serde_json::from_str::<TokenError>(body)
        .ok()
        .and_then(|e| e.error_description)
        .filter(|d| !d.trim().is_empty());
    match described {
        Some(d) => d,
        None => format!(
            "Error occured while fetching Azure AD Token. Details: {}",
            body.trim()
        ),
    }
}

/// Password-grant token for `resource`.
#[tracing::instrument(level = "debug", skip_all, fields(tenant = %tenant, resource = %resource))]
pub async fn aad_token(
    client: &Client,
    tenant: &str,
    app_id: &str,
    username: &str,
    password: &str,
    resource: &str,
) -> Result<String> {
    let url = format!("{AAD_TOKEN_URL}/{tenant}/oauth2/token");
    let resp = client
        .post(&url)
        .header("Accept", "application/json")
        .timeout(REQUEST_TIMEOUT)
        .form(&[
            ("resource", resource),
            ("client_id", app_id),
            ("grant_type", "password"),
            ("username", username),
            ("password", password),
            ("scope", "openid"),
        ])
        .send()
        .await
        .with_context(|| format!("requesting token from {url}"))?;

    let status = resp.status();
    let body = resp.text().await?;
    if !status.is_success() {
        return Err(anyhow!(token_error_message(&body)));
    }
    let token: TokenResponse =
        serde_json::from_str(&body).context("parsing Azure AD token response")?;
    debug!("token acquired");
    Ok(token.access_token)
}
