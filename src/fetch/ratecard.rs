use super::{auth::aad_token, bearer, Credentials, REQUEST_TIMEOUT};
use crate::model::RateCard;
use anyhow::{bail, Result};
use reqwest::Client;
use tracing::info;
use uuid::Uuid;

pub const PARTNER_CENTER_URL: &str = "https://api.partnercenter.microsoft.com";

pub fn rate_card_url(currency: &str, region: &str) -> String {
    format!("{PARTNER_CENTER_URL}/v1/ratecards/azure?currency={currency}&region={region}")
}

/// Download the Azure CSP rate card as raw JSON. The body is parsed once
/// so an empty card fails here instead of at mapping time.
#[tracing::instrument(level = "info", skip(client, creds))]
pub async fn fetch_rate_card(
    client: &Client,
    creds: &Credentials,
    currency: &str,
    region: &str,
    locale: &str,
) -> Result<String> {
    let token = aad_token(
        client,
        &creds.tenant_id,
        &creds.app_id,
        &creds.username,
        &creds.password,
        PARTNER_CENTER_URL,
    )
    .await?;

    let resp = client
        .get(rate_card_url(currency, region))
        .header("Authorization", bearer(&token))
        .header("Accept", "application/json")
        .header("MS-CorrelationId", Uuid::new_v4().to_string())
        .header("MS-RequestId", Uuid::new_v4().to_string())
        .header("X-Locale", locale)
        .timeout(REQUEST_TIMEOUT)
        .send()
        .await?;

    let status = resp.status();
    let body = resp.text().await?;
    if !status.is_success() {
        bail!(
            "Error occured while fetching Rate Card. Status Code: {}. Error details: {}",
            status,
            body
        );
    }
    let card = RateCard::parse(&body)?;
    info!(meters = card.meters().len(), currency = %card.currency, "rate card fetched");
    Ok(body)
}
