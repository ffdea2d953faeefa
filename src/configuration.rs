use config::ConfigError;

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub application: ApplicationSettings,
    pub auth: AuthSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
}

#[derive(serde::Deserialize, Clone)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub port: u16,
    pub host: String,
    pub database_name: String,
}

impl DatabaseSettings {
    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name
        )
    }
}

/// Secrets loaded once at startup and never mutated afterwards
#[derive(serde::Deserialize, Clone)]
pub struct AuthSettings {
    /// HMAC key for access tokens
    pub jwt_secret: String,
    /// Key trusted services present as `Authorization: ApiKey <key>`
    pub api_key: String,
}

impl AuthSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.trim().is_empty() {
            return Err(ConfigError::Message("auth.jwt_secret must be set".to_string()));
        }
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::Message("auth.api_key must be set".to_string()));
        }
        Ok(())
    }
}

/// Read `configuration.{yaml,toml,json}` if present, then `APP__*` environment
/// variables (e.g. `APP__AUTH__JWT_SECRET`).
pub fn get_configuration() -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(config::Environment::with_prefix("APP").separator("__"))
        .build()?;
    let settings = settings.try_deserialize::<Settings>()?;
    settings.auth.validate()?;
    Ok(settings)
}
