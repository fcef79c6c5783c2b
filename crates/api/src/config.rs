//! Typed process configuration.
//!
//! Every knob is an explicit field with a default; nothing is read from the
//! environment outside of `Config::from_env`.

/// Service configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP listener binds to.
    pub bind: String,
    /// Phone number the requisition deep link targets.
    pub whatsapp_phone: String,
    /// Bootstrap administrator account, seeded when the user list is empty.
    pub admin_name: String,
    pub admin_username: String,
    pub admin_password: String,
    /// Postgres connection string; the in-memory gateway is used when unset.
    pub database_url: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        let admin_password = std::env::var("ALMOX_ADMIN_PASSWORD").unwrap_or_else(|_| {
            tracing::warn!("ALMOX_ADMIN_PASSWORD not set; using insecure dev default");
            "123".to_string()
        });

        Self {
            bind: env_or("ALMOX_BIND", "0.0.0.0:8080"),
            whatsapp_phone: env_or("ALMOX_WHATSAPP", "553221040257"),
            admin_name: env_or("ALMOX_ADMIN_NAME", "Administrador"),
            admin_username: env_or("ALMOX_ADMIN_USERNAME", "admin"),
            admin_password,
            database_url: std::env::var("DATABASE_URL").ok(),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_field() {
        // Scoped to keys this test does not set; from_env must not panic.
        let config = Config::from_env();
        assert!(!config.bind.is_empty());
        assert!(!config.whatsapp_phone.is_empty());
        assert!(!config.admin_username.is_empty());
    }
}
