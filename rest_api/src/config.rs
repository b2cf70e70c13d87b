// rest_api/src/config.rs

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Runtime configuration, sourced from the environment once at startup and
/// handed to constructors explicitly. Core logic never reads the
/// environment itself.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub jwt_secret: String,
    pub doctor_domain: String,
}

impl AppConfig {
    /// Reads configuration from the environment. `JWT_SECRET` is required;
    /// everything else has a default.
    pub fn from_env() -> Result<Self> {
        let host = env::var("BIND_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = match env::var("PORT") {
            Ok(value) => value
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            Err(_) => 5000,
        };
        let data_dir = env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data"));
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
        let doctor_domain =
            env::var("DOCTOR_EMAIL_DOMAIN").unwrap_or_else(|_| "@doctor.com".to_string());

        Ok(Self {
            host,
            port,
            data_dir,
            jwt_secret,
            doctor_domain,
        })
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .context("Invalid bind host/port combination")
    }
}
