//! Site-wide configuration toggles.

use serde::{Deserialize, Serialize};

/// The single site config record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct SiteConfig {
    pub maintenance_mode: bool,
    pub shop_closed: bool,
    pub maintenance_password: String,
}

/// The part of the config visitors may see.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteStatus {
    pub maintenance_mode: bool,
    pub shop_closed: bool,
}

impl From<&SiteConfig> for SiteStatus {
    fn from(config: &SiteConfig) -> Self {
        Self {
            maintenance_mode: config.maintenance_mode,
            shop_closed: config.shop_closed,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSiteConfigRequest {
    #[serde(default)]
    pub maintenance_mode: Option<bool>,
    #[serde(default)]
    pub shop_closed: Option<bool>,
    #[serde(default)]
    pub maintenance_password: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnlockRequest {
    pub password: String,
}
