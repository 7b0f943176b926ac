use super::{auth::aad_token, bearer, Credentials, REQUEST_TIMEOUT};
use crate::model::{VmSize, VmSizeList};
use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

const ARM_RESOURCE: &str = "https://management.azure.com/";
const ARM_URL: &str = "https://management.azure.com";
const COMPUTE_API_VERSION: &str = "2017-03-30";

#[derive(Debug, Deserialize)]
struct ArmErrorBody {
    error: Option<ArmError>,
}

#[derive(Debug, Deserialize)]
struct ArmError {
    #[serde(default)]
    message: Option<String>,
}

fn arm_error_message(body: &str) -> String {
    let message = serde_json::from_str::<ArmErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .and_then(|e| e.message)
        .filter(|m| !m.trim().is_empty());
    message.unwrap_or_else(|| {
        format!("Error occured while running ARM API. Details: {}", body.trim())
    })
}

pub fn vm_sizes_url(subscription: &str, location: &str) -> String {
    format!(
        "{ARM_URL}/subscriptions/{subscription}/providers/Microsoft.Compute/locations/{location}/vmSizes?api-version={COMPUTE_API_VERSION}"
    )
}

/// List the VM sizes offered in an ARM `location` such as `westus`.
#[tracing::instrument(level = "info", skip(client, creds))]
pub async fn fetch_vm_sizes(
    client: &Client,
    creds: &Credentials,
    subscription: &str,
    location: &str,
) -> Result<Vec<VmSize>> {
    let token = aad_token(
        client,
        &creds.tenant_id,
        &creds.app_id,
        &creds.username,
        &creds.password,
        ARM_RESOURCE,
    )
    .await?;

    let resp = client
        .get(vm_sizes_url(subscription, location))
        .header("Authorization", bearer(&token))
        .header("Accept", "application/json")
        .header("x-ms-request-id", Uuid::new_v4().to_string())
        .timeout(REQUEST_TIMEOUT)
        .send()
        .await?;

    let status = resp.status();
    let body = resp.text().await?;
    if !status.is_success() {
        return Err(anyhow!(arm_error_message(&body)));
    }
    let list: VmSizeList = serde_json::from_str(&body).context("parsing VM size list")?;
    info!(sizes = list.value.len(), "VM sizes fetched");
    Ok(list.value)
}
