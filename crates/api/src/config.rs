/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables (or a `.env` file,
/// loaded by the binary before calling [`ServerConfig::from_env`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Deployment environment (default: `development`).
    pub app_env: String,
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `10000`).
    pub port: u16,
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Default tracing level when `RUST_LOG` is unset (default: `info`).
    pub log_level: String,
    /// Transport-level request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
}

/// Command-line overrides, layered over the environment by
/// [`ServerConfig::with_args`]. Underscore spellings (`--db_name`) are
/// accepted as aliases.
#[derive(Debug, Default, Clone, PartialEq, Eq, clap::Parser)]
#[command(name = "prototodo-api", version, about = "To-do RPC server", long_about = None)]
pub struct ServerArgs {
    /// The server port
    #[arg(long)]
    pub port: Option<u16>,

    /// The database name (replaces the name in DATABASE_URL)
    #[arg(long, alias = "db_name")]
    pub db_name: Option<String>,

    /// The app environment
    #[arg(long, alias = "app_env")]
    pub app_env: Option<String>,

    /// Global log level
    #[arg(long, alias = "log_level")]
    pub log_level: Option<String>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be a valid {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                          |
    /// |------------------------|----------------------------------|
    /// | `APP_ENV`              | `development`                    |
    /// | `HOST`                 | `0.0.0.0`                        |
    /// | `PORT`                 | `10000`                          |
    /// | `DATABASE_URL`         | `postgres://localhost/{DB_NAME}` |
    /// | `DB_NAME`              | `prototodos`                     |
    /// | `LOG_LEVEL`            | `info`                           |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                             |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.into());

        let port = parse("PORT", "u16", var("PORT", "10000"))?;
        let request_timeout_secs = parse(
            "REQUEST_TIMEOUT_SECS",
            "u64",
            var("REQUEST_TIMEOUT_SECS", "30"),
        )?;

        let database_url = match lookup("DATABASE_URL") {
            Some(url) => url,
            None => format!("postgres://localhost/{}", var("DB_NAME", "prototodos")),
        };

        Ok(Self {
            app_env: var("APP_ENV", "development"),
            host: var("HOST", "0.0.0.0"),
            port,
            database_url,
            log_level: var("LOG_LEVEL", "info"),
            request_timeout_secs,
        })
    }

    /// Apply command-line overrides. A flag wins over its environment
    /// variable; absent flags leave the loaded value alone.
    pub fn with_args(mut self, args: ServerArgs) -> Self {
        if let Some(port) = args.port {
            self.port = port;
        }
        if let Some(db_name) = args.db_name {
            self.database_url = replace_database_name(&self.database_url, &db_name);
        }
        if let Some(app_env) = args.app_env {
            self.app_env = app_env;
        }
        if let Some(log_level) = args.log_level {
            self.log_level = log_level;
        }
        self
    }

    /// Production deployments log JSON lines instead of human-readable text.
    pub fn is_production(&self) -> bool {
        matches!(self.app_env.as_str(), "production" | "prod")
    }
}

/// Swap the path segment of a connection URL, keeping any query string.
fn replace_database_name(url: &str, name: &str) -> String {
    let (base, query) = match url.split_once('?') {
        Some((base, query)) => (base, Some(query)),
        None => (url, None),
    };

    let authority_start = base.find("://").map_or(0, |i| i + 3);
    let authority_end = base[authority_start..]
        .find('/')
        .map_or(base.len(), |i| authority_start + i);

    let mut replaced = format!("{}/{name}", &base[..authority_end]);
    if let Some(query) = query {
        replaced.push('?');
        replaced.push_str(query);
    }
    replaced
}

fn parse<T: std::str::FromStr>(
    name: &'static str,
    expected: &'static str,
    value: String,
) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        expected,
        value,
    })
}
