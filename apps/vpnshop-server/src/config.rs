use anyhow::{anyhow, Context, Result};
use vpnshop_shared::AdminSet;

#[derive(Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub admins: AdminSet,
    pub listen_port: u16,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        tracing::info!("Loading config from environment");
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            database_url: var("DATABASE_URL").ok_or_else(|| anyhow!("DATABASE_URL is not set"))?,
            admins: AdminSet::parse(&var("ADMIN_IDS").unwrap_or_default())
                .map_err(|e| anyhow!("ADMIN_IDS: {}", e))?,
            listen_port: var("LISTEN_PORT")
                .map(|p| p.trim().parse::<u16>())
                .transpose()
                .context("LISTEN_PORT must be a port number")?
                .unwrap_or(8080),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_defaults_to_8080() {
        let cfg = ServerConfig::from_lookup(|key| match key {
            "DATABASE_URL" => Some("postgres://localhost/shop".into()),
            _ => None,
        })
        .unwrap();
        assert_eq!(cfg.listen_port, 8080);
        assert!(cfg.admins.is_empty());
    }

    #[test]
    fn bad_port_is_an_error() {
        let cfg = ServerConfig::from_lookup(|key| match key {
            "DATABASE_URL" => Some("postgres://localhost/shop".into()),
            "LISTEN_PORT" => Some("eighty".into()),
            _ => None,
        });
        assert!(cfg.is_err());
    }
}
