use config::{Config, ConfigError, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct Admin {
    /// Identity of the bootstrap administrator, seeded with role admin and
    /// treated as approved.
    pub identity: String,
}

#[derive(Debug, Deserialize)]
pub struct Telegram {
    pub link: String,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: Server,
    pub admin: Admin,
    pub telegram: Telegram,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name("config.toml"))
            .build()?;

        config.try_deserialize()
    }
}
