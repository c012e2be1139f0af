use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub payment: PaymentConfig,
    #[serde(default)]
    pub teams: TeamsConfig,
    #[serde(default)]
    pub admin: AdminConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8080, worker_threads: Some(4) }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_secs: u64,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    #[serde(default)]
    pub sqlx_logging: bool,
}

fn default_max_connections() -> u32 { 10 }
fn default_min_connections() -> u32 { 2 }
fn default_connect_timeout() -> u64 { 30 }
fn default_idle_timeout() -> u64 { 600 }
fn default_max_lifetime() -> u64 { 3600 }
fn default_acquire_timeout() -> u64 { 30 }

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            max_lifetime_secs: default_max_lifetime(),
            acquire_timeout_secs: default_acquire_timeout(),
            sqlx_logging: false,
        }
    }
}

/// Session signing and identity-provider verification settings.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,
    #[serde(default)]
    pub cookie_secure: bool,
    /// Shared secret used to verify identity-provider session tokens.
    #[serde(default)]
    pub identity_secret: String,
    #[serde(default)]
    pub identity_issuer: Option<String>,
}

fn default_token_ttl_hours() -> i64 { 24 * 7 }

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_ttl_hours: default_token_ttl_hours(),
            cookie_secure: false,
            identity_secret: String::new(),
            identity_issuer: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    #[serde(default)]
    pub key_id: String,
    #[serde(default)]
    pub key_secret: String,
    #[serde(default = "default_payment_api_base")]
    pub api_base: String,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_payment_api_base() -> String { "https://api.razorpay.com/v1".into() }
fn default_currency() -> String { "INR".into() }

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            key_id: String::new(),
            key_secret: String::new(),
            api_base: default_payment_api_base(),
            currency: default_currency(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeamsConfig {
    #[serde(default = "default_max_members")]
    pub max_members: usize,
}

fn default_max_members() -> usize { 5 }

impl Default for TeamsConfig {
    fn default() -> Self { Self { max_members: default_max_members() } }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    #[serde(default = "default_admin_email")]
    pub email: String,
    #[serde(default)]
    pub bootstrap_password: Option<String>,
    /// Mounts `/api/debug/admin` for seeding the administrator account.
    #[serde(default)]
    pub debug_routes: bool,
}

fn default_admin_email() -> String { "admin@roborumble.com".into() }

impl Default for AdminConfig {
    fn default() -> Self {
        Self { email: default_admin_email(), bootstrap_password: None, debug_routes: false }
    }
}

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    load_from_str(&content)
}

pub fn load_from_str(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Config file when present, otherwise defaults; environment variables fill the gaps either way.
    pub fn load_or_env() -> Result<Self> {
        let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        Self::load_or_env_from(&path)
    }

    /// A missing file means defaults; unreadable or malformed files are errors.
    pub fn load_or_env_from(path: &str) -> Result<Self> {
        let mut cfg = match std::fs::read_to_string(path) {
            Ok(content) => load_from_str(&content).map_err(|e| anyhow!("{path}: {e}"))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => AppConfig::default(),
            Err(e) => return Err(anyhow!("{path}: {e}")),
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.database.normalize_from_env();
        self.database.validate()?;
        self.auth.normalize_from_env();
        self.auth.validate()?;
        self.payment.normalize_from_env();
        if self.teams.max_members == 0 {
            return Err(anyhow!("teams.max_members must be >= 1"));
        }
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if let Ok(host) = std::env::var("SERVER_HOST") {
            if !host.trim().is_empty() { self.host = host; }
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            self.port = port;
        }
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be within 1..=65535"));
        }
        if let Some(w) = std::env::var("TOKIO_WORKER_THREADS").ok().and_then(|v| v.parse::<usize>().ok()) {
            self.worker_threads = Some(w);
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }
}

impl DatabaseConfig {
    pub fn normalize_from_env(&mut self) {
        if self.url.trim().is_empty() {
            if let Ok(url) = std::env::var("DATABASE_URL") {
                self.url = url;
            }
        }
        if self.min_connections == 0 { self.min_connections = default_min_connections(); }
        if self.max_connections == 0 { self.max_connections = default_max_connections(); }
        if self.connect_timeout_secs == 0 { self.connect_timeout_secs = default_connect_timeout(); }
        if self.acquire_timeout_secs == 0 { self.acquire_timeout_secs = default_acquire_timeout(); }
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(anyhow!("database.url is empty; set it in config.toml or DATABASE_URL"));
        }
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("postgresql://") || lower.starts_with("postgres://")) {
            return Err(anyhow!("database.url must start with postgresql:// or postgres://"));
        }
        if self.min_connections == 0 {
            return Err(anyhow!("database.min_connections must be >= 1"));
        }
        if self.max_connections < self.min_connections {
            return Err(anyhow!("database.max_connections must be >= min_connections"));
        }
        Ok(())
    }
}

impl AuthConfig {
    pub fn normalize_from_env(&mut self) {
        if self.jwt_secret.trim().is_empty() {
            if let Ok(secret) = std::env::var("JWT_SECRET") {
                self.jwt_secret = secret;
            }
        }
        if self.identity_secret.trim().is_empty() {
            if let Ok(secret) = std::env::var("IDENTITY_JWT_SECRET") {
                self.identity_secret = secret;
            }
        }
        if self.token_ttl_hours <= 0 {
            self.token_ttl_hours = default_token_ttl_hours();
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.jwt_secret.trim().is_empty() {
            return Err(anyhow!("auth.jwt_secret is empty; set it in config.toml or JWT_SECRET"));
        }
        if self.identity_secret.trim().is_empty() {
            return Err(anyhow!("auth.identity_secret is empty; set it in config.toml or IDENTITY_JWT_SECRET"));
        }
        Ok(())
    }
}

impl PaymentConfig {
    pub fn normalize_from_env(&mut self) {
        if self.key_id.trim().is_empty() {
            if let Ok(v) = std::env::var("RAZORPAY_KEY_ID") { self.key_id = v; }
        }
        if self.key_secret.trim().is_empty() {
            if let Ok(v) = std::env::var("RAZORPAY_KEY_SECRET") { self.key_secret = v; }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [server]
        host = "0.0.0.0"
        port = 9000

        [database]
        url = "postgres://rr:rr@localhost:5432/robo_rumble"
        max_connections = 8
        min_connections = 1

        [auth]
        jwt_secret = "legacy-secret"
        identity_secret = "identity-secret"

        [teams]
        max_members = 4
    "#;

    #[test]
    fn parses_sections_and_defaults() {
        let cfg = load_from_str(SAMPLE).unwrap();
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.database.max_connections, 8);
        assert_eq!(cfg.auth.token_ttl_hours, 168);
        assert_eq!(cfg.payment.currency, "INR");
        assert_eq!(cfg.teams.max_members, 4);
        assert_eq!(cfg.admin.email, "admin@roborumble.com");
        assert!(!cfg.admin.debug_routes);
    }

    #[test]
    fn validate_accepts_complete_config() {
        let mut cfg = load_from_str(SAMPLE).unwrap();
        cfg.normalize_and_validate().unwrap();
        assert_eq!(cfg.server.worker_threads, Some(4));
    }

    #[test]
    fn rejects_non_postgres_url() {
        let cfg = DatabaseConfig { url: "mysql://x".into(), min_connections: 1, max_connections: 2, ..Default::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_inverted_pool_limits() {
        let cfg = DatabaseConfig { url: "postgres://x".into(), min_connections: 5, max_connections: 2, ..Default::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn defaults_keep_a_valid_pool() {
        let cfg = DatabaseConfig::default();
        assert_eq!(cfg.min_connections, 2);
        assert_eq!(cfg.max_connections, 10);
    }

    #[test]
    fn missing_file_falls_back_to_env() {
        std::env::set_var("DATABASE_URL", "postgres://rr:rr@localhost:5432/robo_rumble");
        std::env::set_var("JWT_SECRET", "env-legacy-secret");
        std::env::set_var("IDENTITY_JWT_SECRET", "env-identity-secret");
        let cfg = AppConfig::load_or_env_from("/nonexistent/robo_rumble/config.toml").unwrap();
        assert_eq!(cfg.database.min_connections, 2);
        assert_eq!(cfg.auth.jwt_secret, "env-legacy-secret");
        assert_eq!(cfg.auth.identity_secret, "env-identity-secret");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let path = std::env::temp_dir().join(format!("robo_rumble_bad_{}.toml", std::process::id()));
        std::fs::write(&path, "[server\nport = ").unwrap();
        let res = AppConfig::load_or_env_from(path.to_str().unwrap());
        std::fs::remove_file(&path).ok();
        assert!(res.is_err());
    }

    #[test]
    fn rejects_missing_identity_secret() {
        let cfg = AuthConfig { jwt_secret: "s".into(), ..Default::default() };
        assert!(cfg.validate().is_err());
    }
}
