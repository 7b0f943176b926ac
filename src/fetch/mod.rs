// src/fetch/mod.rs
//! Online sources: Azure AD tokens, the Partner Center rate card and the
//! ARM VM size list.

pub mod auth;
pub mod ratecard;
pub mod vmsizes;

use std::time::Duration;

/// Per-request timeout for every online call.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Admin-agent account used for the password grant. The tenant and app
/// differ between the rate card (partner tenant) and the VM size list
/// (customer tenant).
#[derive(Debug, Clone)]
pub struct Credentials {
    pub tenant_id: String,
    pub app_id: String,
    pub username: String,
    pub password: String,
}

fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}
