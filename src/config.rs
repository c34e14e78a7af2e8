use std::{fmt, net::SocketAddr};

use anyhow::Context;

pub const PASSWORD_VAR: &str = "DATABASE_PASSWORD";

#[derive(Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub explicit_url: Option<String>,
    pub database_scheme: String,
    pub database_server: String,
    pub database_user: String,
    pub database_name: String,
    pub database_password: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let host = var("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port: u16 = var("PORT").unwrap_or_else(|| "3000".to_string()).parse().context("PORT")?;

        let config = Self {
            addr: format!("{host}:{port}").parse().context("HOST/PORT")?,
            explicit_url: var("DATABASE_URL").filter(|s| !s.is_empty()),
            database_scheme: var("DATABASE_SCHEME").unwrap_or_else(|| "postgres".to_string()),
            database_server: var("DATABASE_SERVER")
                .unwrap_or_else(|| "localhost:5432".to_string()),
            database_user: var("DATABASE_USER").unwrap_or_else(|| "movies-admin".to_string()),
            database_name: var("DATABASE_NAME").unwrap_or_else(|| "movies".to_string()),
            database_password: var(PASSWORD_VAR),
        };

        // Fail at startup rather than on first connect.
        config.database_url()?;
        Ok(config)
    }

    pub fn database_url(&self) -> anyhow::Result<String> {
        if let Some(url) = &self.explicit_url {
            return Ok(url.clone());
        }

        let password = self
            .database_password
            .as_deref()
            .with_context(|| format!("unable to find {PASSWORD_VAR} in the environment"))?;

        Ok(format!(
            "{}://{}:{}@{}/{}",
            self.database_scheme,
            urlencoding::encode(&self.database_user),
            urlencoding::encode(password),
            self.database_server,
            self.database_name,
        ))
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("explicit_url", &self.explicit_url.as_ref().map(|_| "<redacted>"))
            .field("database_scheme", &self.database_scheme)
            .field("database_server", &self.database_server)
            .field("database_user", &self.database_user)
            .field("database_name", &self.database_name)
            .field("database_password", &self.database_password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
