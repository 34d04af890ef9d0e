use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::service::ServiceConfig;

/// Configuration for the housing module (`modules.housing`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HousingConfig {
    #[serde(default = "default_min_monthly_price")]
    pub min_monthly_price: i64,
    #[serde(default = "default_max_monthly_price")]
    pub max_monthly_price: i64,
    #[serde(default = "default_max_title_length")]
    pub max_title_length: usize,
    #[serde(default)]
    pub auth: AuthConfig,
}

/// How callers are identified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    /// `Authorization: Bearer <token>` looked up in `tokens`.
    #[default]
    Tokens,
    /// Identity forwarded by a trusted gateway in `x-user-id` / `x-user-role`.
    TrustedHeaders,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    #[serde(default)]
    pub mode: AuthMode,
    #[serde(default)]
    pub tokens: Vec<TokenEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokenEntry {
    pub token: String,
    pub user_id: Uuid,
    /// "student" | "landlord"
    pub role: String,
}

impl Default for HousingConfig {
    fn default() -> Self {
        Self {
            min_monthly_price: default_min_monthly_price(),
            max_monthly_price: default_max_monthly_price(),
            max_title_length: default_max_title_length(),
            auth: AuthConfig::default(),
        }
    }
}

impl HousingConfig {
    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            min_monthly_price: self.min_monthly_price,
            max_monthly_price: self.max_monthly_price,
            max_title_length: self.max_title_length,
        }
    }
}

fn default_min_monthly_price() -> i64 {
    1
}

fn default_max_monthly_price() -> i64 {
    15_000
}

fn default_max_title_length() -> usize {
    200
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_section_uses_defaults() {
        let cfg: HousingConfig = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(cfg.max_monthly_price, 15_000);
        assert_eq!(cfg.min_monthly_price, 1);
        assert_eq!(cfg.max_title_length, 200);
        assert_eq!(cfg.auth.mode, AuthMode::Tokens);
        assert!(cfg.auth.tokens.is_empty());
    }

    #[test]
    fn parses_auth_tokens() {
        let cfg: HousingConfig = serde_json::from_value(serde_json::json!({
            "max_monthly_price": 20000,
            "auth": {
                "mode": "trusted_headers",
                "tokens": [{
                    "token": "s3cret",
                    "user_id": "7f1c1d2e-0000-4000-8000-000000000001",
                    "role": "landlord"
                }]
            }
        }))
        .unwrap();
        assert_eq!(cfg.service_config().max_monthly_price, 20000);
        assert_eq!(cfg.auth.mode, AuthMode::TrustedHeaders);
        assert_eq!(cfg.auth.tokens[0].role, "landlord");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let res: Result<HousingConfig, _> =
            serde_json::from_value(serde_json::json!({ "max_price": 1 }));
        assert!(res.is_err());
    }
}
