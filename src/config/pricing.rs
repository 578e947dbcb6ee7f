//! Pricing of name applications

use serde::Deserialize;

use super::error::ValidationError;

/// Coin costs and listing size for the application workflow
#[derive(Debug, Clone, Deserialize)]
pub struct PricingConfig {
    /// Coins reserved by a normal application
    #[serde(default = "default_coins_for_normal")]
    pub coins_for_normal: i64,

    /// Base coins reserved by a special application, before extra coins
    #[serde(default = "default_coins_for_special")]
    pub coins_for_special: i64,

    /// Coins charged to enable or disable a registered name
    #[serde(default = "default_coins_for_toggle")]
    pub coins_for_toggle: i64,

    /// Applications shown per page when listing
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl PricingConfig {
    /// Validate pricing configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.coins_for_normal < 0 {
            return Err(ValidationError::NegativeCoinCost("normal"));
        }
        if self.coins_for_special < 0 {
            return Err(ValidationError::NegativeCoinCost("special"));
        }
        if self.coins_for_toggle < 0 {
            return Err(ValidationError::NegativeCoinCost("toggle"));
        }
        if self.page_size == 0 {
            return Err(ValidationError::InvalidPageSize);
        }
        Ok(())
    }
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            coins_for_normal: default_coins_for_normal(),
            coins_for_special: default_coins_for_special(),
            coins_for_toggle: default_coins_for_toggle(),
            page_size: default_page_size(),
        }
    }
}

fn default_coins_for_normal() -> i64 {
    30
}

fn default_coins_for_special() -> i64 {
    50
}

fn default_coins_for_toggle() -> i64 {
    1
}

fn default_page_size() -> u32 {
    4
}
