//! [`Config`]-related definitions.

use config::{builder::DefaultState, ConfigBuilder, ConfigError, Source};
use serde::Deserialize;
use service::infra::postgres;
use smart_default::SmartDefault;
use tower_http::cors::AllowOrigin;

/// Application configuration.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: Server,

    /// Service configuration.
    pub service: Service,

    /// Postgres configuration.
    pub postgres: Postgres,

    /// Log configuration.
    pub log: Log,
}

impl Config {
    /// Creates a new [`Config`] by:
    /// - loading it from the provided `path` (if any);
    /// - merging it with the environment variables (if any);
    /// - using default values for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(path: impl AsRef<str>) -> Result<Self, ConfigError> {
        Self::load(config::File::with_name(path.as_ref()).required(false))
    }

    /// Loads a [`Config`] from the provided `file` source, merged with the
    /// environment variables (if any).
    fn load<S>(file: S) -> Result<Self, ConfigError>
    where
        S: Source + Send + Sync + 'static,
    {
        let conf: Self = ConfigBuilder::<DefaultState>::default()
            .add_source(file)
            .add_source(config::Environment::with_prefix("CONF").separator("."))
            .build()?
            .try_deserialize()?;

        if conf.postgres.max_connections == 0 {
            return Err(ConfigError::Message(
                "`postgres.max_connections` must be positive".to_owned(),
            ));
        }
        _ = conf.server.cors.allowed_origin()?;

        Ok(conf)
    }
}

/// Server configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Server {
    /// Host to bind the server to.
    #[default("0.0.0.0".to_owned())]
    pub host: String,

    /// Port to bind the server to.
    #[default(8080)]
    pub port: u16,

    /// [CORS] configuration.
    ///
    /// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
    pub cors: Cors,
}

/// [CORS] configuration.
///
/// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Cors {
    /// List of allowed origins, `*` allowing any.
    #[default(vec!["*".to_owned()])]
    pub origins: Vec<String>,
}

impl Cors {
    /// Returns the [`AllowOrigin`] matching the configured
    /// [`Cors::origins`].
    ///
    /// # Errors
    ///
    /// If any of the [`Cors::origins`] is not a valid header value.
    pub fn allowed_origin(&self) -> Result<AllowOrigin, ConfigError> {
        if self.origins.iter().any(|o| o == "*") {
            return Ok(AllowOrigin::any());
        }
        self.origins
            .iter()
            .map(|origin| {
                origin.parse::<http::HeaderValue>().map_err(|e| {
                    ConfigError::Message(format!(
                        "`{origin}` is not a valid CORS origin: {e}",
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(AllowOrigin::list)
    }
}

/// Service configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Service {
    /// [JWT] secret shared with the identity provider.
    ///
    /// [JWT]: https://wikipedia.org/wiki/JSON_Web_Token
    #[default("secret".to_owned())]
    pub jwt_secret: String,
}

impl From<Service> for service::Config {
    fn from(value: Service) -> Self {
        let Service { jwt_secret } = value;
        Self {
            jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(
                jwt_secret.as_bytes(),
            ),
        }
    }
}

/// Postgres configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Postgres {
    /// Host to connect to.
    #[default("127.0.0.1".to_owned())]
    pub host: String,

    /// Port to connect to.
    #[default(5432)]
    pub port: u16,

    /// User to connect as.
    #[default("postgres".to_owned())]
    pub user: String,

    /// Password to connect with.
    #[default("postgres".to_owned())]
    pub password: String,

    /// Database name to connect to.
    #[default("postgres".to_owned())]
    pub dbname: String,

    /// Maximum size of the connection pool.
    #[default(16)]
    pub max_connections: usize,
}

impl From<Postgres> for postgres::Config {
    fn from(value: Postgres) -> Self {
        let Postgres {
            host,
            port,
            user,
            password,
            dbname,
            max_connections,
        } = value;

        let mut conf = Self::new();
        conf.host = Some(host);
        conf.port = Some(port);
        conf.user = Some(user);
        conf.password = Some(password);
        conf.dbname = Some(dbname);
        conf.pool = Some(postgres::PoolConfig::new(max_connections));
        conf
    }
}

/// Log configuration.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Log {
    /// Log level.
    pub level: LogLevel,
}

/// Log level.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    /// Designates very low priority, often extremely verbose, information.
    Trace,

    /// Designates lower priority information.
    Debug,

    /// Designates useful information.
    #[default]
    Info,

    /// Designates hazardous situations.
    Warn,

    /// Designates very serious errors.
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}

#[cfg(test)]
mod spec {
    use config::{File, FileFormat};
    use service::infra::postgres;

    use super::{Config, Cors, LogLevel};

    fn load(toml: &str) -> Result<Config, config::ConfigError> {
        Config::load(File::from_str(toml, FileFormat::Toml))
    }

    #[test]
    fn defaults_missing_fields() {
        let conf = load("").unwrap();

        assert_eq!(conf.server.port, 8080);
        assert_eq!(conf.server.cors.origins, ["*"]);
        assert_eq!(conf.postgres.max_connections, 16);
        assert!(matches!(conf.log.level, LogLevel::Info));
    }

    #[test]
    fn sizes_pool_by_max_connections() {
        let conf = load(
            r#"
            [postgres]
            host = "db"
            max_connections = 4

            [log]
            level = "DEBUG"
            "#,
        )
        .unwrap();
        assert!(matches!(conf.log.level, LogLevel::Debug));

        let pg = postgres::Config::from(conf.postgres);
        assert_eq!(pg.host.as_deref(), Some("db"));
        assert_eq!(pg.port, Some(5432));
        assert_eq!(pg.pool.map(|p| p.max_size), Some(4));
    }

    #[test]
    fn rejects_empty_pool() {
        let err = load("[postgres]\nmax_connections = 0").unwrap_err();

        assert!(err.to_string().contains("max_connections"));
    }

    #[test]
    fn validates_cors_origins() {
        let cors = |origins: &[&str]| Cors {
            origins: origins.iter().map(ToString::to_string).collect(),
        };

        assert!(cors(&["*"]).allowed_origin().is_ok());
        assert!(cors(&["https://dogs.example", "http://localhost:3000"])
            .allowed_origin()
            .is_ok());
        assert!(cors(&["https://dogs.example\n"]).allowed_origin().is_err());
    }
}
