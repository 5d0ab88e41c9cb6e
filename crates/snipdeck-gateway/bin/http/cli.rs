use clap::{ArgAction, Parser, ValueEnum};
use snipdeck_catalog::settings::DEFAULT_UPLOAD_API_KEY;
use snipdeck_telemetry::LogFormat;
use std::fmt::{Display, Formatter};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

pub const LISTEN_ADDR_ENV: &str = "SNIPDECK_LISTEN_ADDR";
pub const HOST_ENV: &str = "SNIPDECK_HOST";
pub const PORT_ENV: &str = "PORT";
pub const UPLOAD_API_KEY_ENV: &str = "UPLOAD_API_KEY";
pub const STORAGE_BACKEND_ENV: &str = "SNIPDECK_STORAGE_BACKEND";
pub const DATABASE_PATH_ENV: &str = "SNIPDECK_DATABASE_PATH";
pub const PUBLIC_BASE_URL_ENV: &str = "SNIPDECK_PUBLIC_BASE_URL";
pub const SEED_DEMO_ENV: &str = "SNIPDECK_SEED_DEMO";
pub const LOG_FORMAT_ENV: &str = "SNIPDECK_LOG_FORMAT";
pub const OTLP_ENDPOINT_ENV: &str = "SNIPDECK_OTLP_ENDPOINT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_DATABASE_PATH: &str = "database.db";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackendArg {
    #[value(name = "sqlite")]
    Sqlite,
    #[value(name = "in-memory")]
    InMemory,
}

impl Display for StorageBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackendArg::Sqlite => write!(f, "sqlite"),
            StorageBackendArg::InMemory => write!(f, "in-memory"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    #[value(name = "text")]
    Text,
    #[value(name = "json")]
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Text => LogFormat::Text,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "snipdeck", about = "Command snippet catalog over HTTP")]
pub struct CLI {
    /// Full socket address; takes precedence over --host and --port.
    #[arg(long, env = LISTEN_ADDR_ENV)]
    pub listen_addr: Option<SocketAddr>,

    #[arg(long, env = HOST_ENV, default_value = DEFAULT_HOST)]
    pub host: IpAddr,

    #[arg(long, env = PORT_ENV, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    #[arg(
        long,
        env = UPLOAD_API_KEY_ENV,
        default_value = DEFAULT_UPLOAD_API_KEY,
        hide_env_values = true
    )]
    pub upload_api_key: String,

    #[arg(
        long,
        env = STORAGE_BACKEND_ENV,
        value_enum,
        default_value_t = StorageBackendArg::Sqlite
    )]
    pub storage: StorageBackendArg,

    #[arg(long, env = DATABASE_PATH_ENV, default_value = DEFAULT_DATABASE_PATH)]
    pub database_path: PathBuf,

    /// Prefix for raw links, e.g. `https://snip.example`. Empty keeps links relative.
    #[arg(long, env = PUBLIC_BASE_URL_ENV, default_value = "")]
    pub public_base_url: String,

    #[arg(long, env = SEED_DEMO_ENV, default_value_t = true, action = ArgAction::Set)]
    pub seed_demo: bool,

    #[arg(
        long,
        env = LOG_FORMAT_ENV,
        value_enum,
        default_value_t = LogFormatArg::Text
    )]
    pub log_format: LogFormatArg,

    #[arg(long, env = OTLP_ENDPOINT_ENV)]
    pub otlp_endpoint: Option<String>,
}

impl CLI {
    pub fn socket_addr(&self) -> SocketAddr {
        self.listen_addr
            .unwrap_or_else(|| SocketAddr::new(self.host, self.port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_flags_are_parsed() {
        let cli = CLI::try_parse_from([
            "snipdeck",
            "--host",
            "127.0.0.1",
            "--port",
            "8080",
            "--upload-api-key",
            "k",
            "--storage",
            "in-memory",
            "--database-path",
            "/tmp/snip.db",
            "--public-base-url",
            "https://snip.example",
            "--seed-demo",
            "false",
            "--log-format",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.socket_addr(), "127.0.0.1:8080".parse().unwrap());
        assert_eq!(cli.upload_api_key, "k");
        assert_eq!(cli.storage, StorageBackendArg::InMemory);
        assert_eq!(cli.database_path, PathBuf::from("/tmp/snip.db"));
        assert_eq!(cli.public_base_url, "https://snip.example");
        assert!(!cli.seed_demo);
        assert_eq!(LogFormat::from(cli.log_format), LogFormat::Json);
    }

    #[test]
    fn listen_addr_overrides_host_and_port() {
        let cli = CLI::try_parse_from([
            "snipdeck",
            "--listen-addr",
            "127.0.0.1:9000",
            "--port",
            "8080",
        ])
        .unwrap();

        assert_eq!(cli.socket_addr(), "127.0.0.1:9000".parse().unwrap());
    }

    #[test]
    fn unknown_backend_is_rejected() {
        assert!(CLI::try_parse_from(["snipdeck", "--storage", "mysql"]).is_err());
    }
}
