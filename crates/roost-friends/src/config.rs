use anyhow::Result;

/// Tunables for the friend services.
#[derive(Debug, Clone)]
pub struct FriendsConfig {
    /// Page size used when a caller passes 0.
    pub default_page_size: u32,
    /// Hard clamp on requested page sizes.
    pub max_page_size: u32,
}

impl Default for FriendsConfig {
    fn default() -> Self {
        Self {
            default_page_size: 10,
            max_page_size: 50,
        }
    }
}

impl FriendsConfig {
    /// Read config from the environment (`ROOST_PAGE_SIZE`,
    /// `ROOST_MAX_PAGE_SIZE`), loading `.env` if present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let defaults = Self::default();
        let default_page_size: u32 = std::env::var("ROOST_PAGE_SIZE")
            .unwrap_or_else(|_| defaults.default_page_size.to_string())
            .parse()?;
        let max_page_size: u32 = std::env::var("ROOST_MAX_PAGE_SIZE")
            .unwrap_or_else(|_| defaults.max_page_size.to_string())
            .parse()?;

        Ok(Self {
            default_page_size,
            max_page_size,
        })
    }

    /// Clamp a requested page size into the configured bounds.
    pub fn clamp_page_size(&self, requested: u32) -> u32 {
        if requested == 0 {
            self.default_page_size
        } else {
            requested.min(self.max_page_size)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_page_size() {
        let config = FriendsConfig::default();
        assert_eq!(config.clamp_page_size(0), 10);
        assert_eq!(config.clamp_page_size(20), 20);
        assert_eq!(config.clamp_page_size(10_000), 50);
    }
}
