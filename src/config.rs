use figment::{
    Figment,
    providers::{Format, Serialized, Toml},
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::{
    net::{IpAddr, Ipv4Addr},
    path::PathBuf,
    sync::Arc,
};

/// The out-of-the-box admin secret. Running with it is only acceptable on a
/// box nobody else can reach; `main` logs a warning when it is still in use.
pub const DEFAULT_ADMIN_SECRET: &str = "123456";

const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Application configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// HTTP server listen address (e.g., "0.0.0.0", "127.0.0.1").
    /// TOML: `listen_addr`. Default: `0.0.0.0`.
    #[serde(default = "default_listen_ip")]
    pub listen_addr: IpAddr,

    /// HTTP server listen port.
    /// TOML: `listen_port`. Default: `3000`.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Database URL for SQLite.
    /// TOML: `database_url`. Default: `sqlite://blog.db`.
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Log level for tracing subscriber initialization (e.g., "error", "warn", "info", "debug", "trace").
    /// TOML: `loglevel`. Default: `info`.
    #[serde(default = "default_loglevel")]
    pub loglevel: String,

    /// Shared secret for mutating requests (`Authorization: Bearer <secret>`).
    /// TOML: `admin_secret`. Defaults to an insecure placeholder.
    #[serde(default = "default_admin_secret")]
    #[serde(deserialize_with = "deserialize_string_lax")]
    pub admin_secret: String,

    /// Directory image uploads are written to and served from.
    /// TOML: `upload_dir`. Default: `uploads`.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,

    /// Working directory of the static-site project the build runs in.
    /// TOML: `site_dir`. Default: `..`.
    #[serde(default = "default_site_dir")]
    pub site_dir: PathBuf,

    /// Build command as argv, first element is the program.
    /// TOML: `build_command`. Default: `["bun", "run", "build"]`.
    #[serde(default = "default_build_command")]
    pub build_command: Vec<String>,

    /// Upper bound on a single build run, in seconds.
    /// TOML: `build_timeout_secs`. Default: `600`.
    #[serde(default = "default_build_timeout_secs")]
    pub build_timeout_secs: u64,

    /// Maximum accepted request body size in bytes. Must leave room for
    /// image uploads.
    /// TOML: `max_body_bytes`. Default: 10 MiB.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_ip(),
            listen_port: default_listen_port(),
            database_url: default_database_url(),
            loglevel: default_loglevel(),
            admin_secret: default_admin_secret(),
            upload_dir: default_upload_dir(),
            site_dir: default_site_dir(),
            build_command: default_build_command(),
            build_timeout_secs: default_build_timeout_secs(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl Config {
    /// Builds a Figment that merges defaults and a config TOML file.
    pub fn figment() -> Figment {
        let figment = Figment::new().merge(Serialized::defaults(Config::default()));
        if PathBuf::from(DEFAULT_CONFIG_FILE).is_file() {
            figment.merge(Toml::file(DEFAULT_CONFIG_FILE))
        } else {
            figment
        }
    }

    /// Loads configuration by merging defaults and `config.toml` if present.
    ///
    /// The result is wrapped in `Arc` so it can be shared into router state;
    /// handlers never reach for ambient configuration.
    pub fn load() -> Arc<Self> {
        let cfg: Self = Self::figment().extract().unwrap_or_else(|err| {
            panic!("failed to extract configuration (defaults + optional config.toml): {err}")
        });
        Arc::new(cfg)
    }

    /// True while the operator has not replaced the shipped admin secret.
    pub fn uses_default_secret(&self) -> bool {
        self.admin_secret == DEFAULT_ADMIN_SECRET
    }
}

fn deserialize_string_lax<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;

    match v {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(serde::de::Error::custom(
            "expected a string or a number for admin_secret",
        )),
    }
}

/// Default IP address for the HTTP server listen address.
fn default_listen_ip() -> IpAddr {
    Ipv4Addr::new(0, 0, 0, 0).into()
}

/// Default port for the HTTP server.
fn default_listen_port() -> u16 {
    3000
}

fn default_database_url() -> String {
    "sqlite://blog.db".to_string()
}

fn default_loglevel() -> String {
    "info".to_string()
}

fn default_admin_secret() -> String {
    DEFAULT_ADMIN_SECRET.to_string()
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_site_dir() -> PathBuf {
    PathBuf::from("..")
}

fn default_build_command() -> Vec<String> {
    vec!["bun".to_string(), "run".to_string(), "build".to_string()]
}

fn default_build_timeout_secs() -> u64 {
    600
}

fn default_max_body_bytes() -> usize {
    10 * 1024 * 1024
}
