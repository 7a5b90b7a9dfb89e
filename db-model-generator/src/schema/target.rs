//! Connection URL handling

use std::path::PathBuf;

use crate::error::{GeneratorError, Result};

/// Where the schema is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionTarget {
    Sqlite(PathBuf),
    Postgres(String),
    MySql(String),
}

impl ConnectionTarget {
    /// Parse a normalized URL (see [`normalize_database_url`])
    pub fn parse(url: &str) -> Result<Self> {
        let Some((scheme, rest)) = url.split_once("://") else {
            return Err(GeneratorError::ConnectionError(format!(
                "Invalid database URL: {}",
                url
            )));
        };

        match scheme {
            // sqlite:///relative.db and sqlite:////absolute.db, as SQLAlchemy spells them
            "sqlite" => {
                let path = rest.strip_prefix('/').unwrap_or(rest);
                if path.is_empty() {
                    return Err(GeneratorError::ConnectionError(
                        "SQLite URL has no database path".into(),
                    ));
                }
                Ok(ConnectionTarget::Sqlite(PathBuf::from(path)))
            }
            "postgres" | "postgresql" => Ok(ConnectionTarget::Postgres(url.to_string())),
            "mysql" | "mariadb" => Ok(ConnectionTarget::MySql(format!("mysql://{}", rest))),
            other => Err(GeneratorError::ConnectionError(format!(
                "Unsupported database scheme: {}",
                other
            ))),
        }
    }
}

/// Normalize a user-supplied connection string.
///
/// A value without a scheme is a SQLite file path. SQLAlchemy driver suffixes
/// (`postgresql+psycopg2://`) are dropped.
pub fn normalize_database_url(raw: &str) -> String {
    let raw = raw.trim();
    match raw.split_once("://") {
        Some((scheme, rest)) => {
            let dialect = scheme.split('+').next().unwrap_or(scheme).to_lowercase();
            format!("{}://{}", dialect, rest)
        }
        None => format!("sqlite:///{}", raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_database_url() {
        assert_eq!(normalize_database_url("app.db"), "sqlite:///app.db");
        assert_eq!(normalize_database_url("sqlite:///app.db"), "sqlite:///app.db");
        assert_eq!(
            normalize_database_url("postgresql+psycopg2://u:p@localhost/db"),
            "postgresql://u:p@localhost/db"
        );
        assert_eq!(
            normalize_database_url("mysql+pymysql://root@localhost/shop"),
            "mysql://root@localhost/shop"
        );
    }

    #[test]
    fn test_parse_sqlite_paths() {
        assert_eq!(
            ConnectionTarget::parse("sqlite:///data/app.db").unwrap(),
            ConnectionTarget::Sqlite(PathBuf::from("data/app.db"))
        );
        assert_eq!(
            ConnectionTarget::parse("sqlite:////var/app.db").unwrap(),
            ConnectionTarget::Sqlite(PathBuf::from("/var/app.db"))
        );
        assert!(ConnectionTarget::parse("sqlite:///").is_err());
    }

    #[test]
    fn test_parse_server_urls() {
        assert_eq!(
            ConnectionTarget::parse("postgresql://localhost/db").unwrap(),
            ConnectionTarget::Postgres("postgresql://localhost/db".into())
        );
        assert_eq!(
            ConnectionTarget::parse("mariadb://localhost/db").unwrap(),
            ConnectionTarget::MySql("mysql://localhost/db".into())
        );
        let err = ConnectionTarget::parse("oracle://localhost/db").unwrap_err();
        assert_eq!(err.kind(), "ConnectionError");
    }
}
