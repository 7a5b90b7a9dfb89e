//! Live schema introspection over sqlx
//!
//! The generator is synchronous; the reader owns a current-thread runtime and
//! blocks on every driver call.

use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use tokio::runtime::Runtime;
use tracing::{debug, info};

use super::metadata::{ColumnDescriptor, NativeColumn};
use super::target::ConnectionTarget;
use crate::error::{GeneratorError, Result};

const SQLITE_COLUMNS: &str = r#"
    SELECT name, type, "notnull", dflt_value, pk
    FROM pragma_table_info(?1)
    ORDER BY cid
"#;

const POSTGRES_COLUMNS: &str = r#"
    SELECT c.column_name::text AS name,
           c.data_type::text AS data_type,
           c.character_maximum_length::int4 AS length,
           (c.is_nullable = 'YES') AS nullable,
           c.column_default::text AS default_value,
           EXISTS (
               SELECT 1
               FROM information_schema.table_constraints tc
               JOIN information_schema.key_column_usage k
                 ON k.constraint_name = tc.constraint_name
                AND k.table_schema = tc.table_schema
                AND k.table_name = tc.table_name
               WHERE tc.constraint_type = 'PRIMARY KEY'
                 AND tc.table_schema = c.table_schema
                 AND tc.table_name = c.table_name
                 AND k.column_name = c.column_name
           ) AS primary_key
    FROM information_schema.columns c
    WHERE c.table_schema = COALESCE($1::text, current_schema())
      AND c.table_name = $2
    ORDER BY c.ordinal_position
"#;

const MYSQL_COLUMNS: &str = r#"
    SELECT CAST(COLUMN_NAME AS CHAR) AS name,
           CAST(COLUMN_TYPE AS CHAR) AS data_type,
           CAST(IS_NULLABLE = 'YES' AS SIGNED) AS nullable,
           CAST(COLUMN_DEFAULT AS CHAR) AS default_value,
           CAST(COLUMN_KEY = 'PRI' AS SIGNED) AS primary_key
    FROM information_schema.COLUMNS
    WHERE TABLE_SCHEMA = DATABASE()
      AND TABLE_NAME = ?
    ORDER BY ORDINAL_POSITION
"#;

/// Anything that can list the columns of a table
pub trait ColumnSource {
    /// Columns of `table_name` in the database's reported order
    fn read_columns(&self, table_name: &str) -> Result<Vec<ColumnDescriptor>>;
}

/// Reads table metadata from a live database connection
pub struct SchemaReader {
    // Declared before the runtime so it is closed while the runtime is alive
    pool: DatabasePool,
    runtime: Runtime,
}

enum DatabasePool {
    Sqlite(SqlitePool),
    Postgres(PgPool),
    MySql(MySqlPool),
}

impl SchemaReader {
    /// Open one connection to the database behind `database_url`
    pub fn connect(database_url: &str) -> Result<Self> {
        let target = ConnectionTarget::parse(database_url)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let pool = runtime.block_on(DatabasePool::connect(&target))?;
        Ok(Self { pool, runtime })
    }
}

impl ColumnSource for SchemaReader {
    fn read_columns(&self, table_name: &str) -> Result<Vec<ColumnDescriptor>> {
        let native = self.runtime.block_on(self.pool.fetch_columns(table_name))?;
        if native.is_empty() {
            return Err(GeneratorError::TableNotFound(table_name.to_string()));
        }

        let columns: Vec<ColumnDescriptor> = native
            .into_iter()
            .map(ColumnDescriptor::from_native)
            .collect();
        info!("Read {} columns from table {}", columns.len(), table_name);
        for col in &columns {
            debug!(
                "  {} {} nullable={} pk={} length={:?}",
                col.name, col.type_keyword, col.nullable, col.primary_key, col.length
            );
        }
        Ok(columns)
    }
}

impl Drop for SchemaReader {
    fn drop(&mut self) {
        self.runtime.block_on(self.pool.close());
    }
}

impl DatabasePool {
    async fn connect(target: &ConnectionTarget) -> Result<Self> {
        match target {
            ConnectionTarget::Sqlite(path) => {
                if !path.exists() {
                    return Err(GeneratorError::ConnectionError(format!(
                        "SQLite database does not exist: {}",
                        path.display()
                    )));
                }
                debug!("Connecting to SQLite at {}", path.display());
                let options = SqliteConnectOptions::new().filename(path).read_only(true);
                let pool = SqlitePoolOptions::new()
                    .max_connections(1)
                    .connect_with(options)
                    .await
                    .map_err(connection_error)?;
                Ok(DatabasePool::Sqlite(pool))
            }
            ConnectionTarget::Postgres(url) => {
                debug!("Connecting to PostgreSQL");
                let pool = PgPoolOptions::new()
                    .max_connections(1)
                    .connect(url)
                    .await
                    .map_err(connection_error)?;
                Ok(DatabasePool::Postgres(pool))
            }
            ConnectionTarget::MySql(url) => {
                debug!("Connecting to MySQL");
                let pool = MySqlPoolOptions::new()
                    .max_connections(1)
                    .connect(url)
                    .await
                    .map_err(connection_error)?;
                Ok(DatabasePool::MySql(pool))
            }
        }
    }

    async fn fetch_columns(&self, table_name: &str) -> Result<Vec<NativeColumn>> {
        let columns = match self {
            DatabasePool::Sqlite(pool) => {
                let rows = sqlx::query(SQLITE_COLUMNS)
                    .bind(table_name)
                    .fetch_all(pool)
                    .await?;
                // pragma columns carry no declared types, so decode by value
                rows.iter()
                    .map(|row| {
                        Ok(NativeColumn {
                            name: row.try_get_unchecked("name")?,
                            data_type: row.try_get_unchecked("type")?,
                            length: None,
                            nullable: row.try_get_unchecked::<i64, _>("notnull")? == 0,
                            default_value: row.try_get_unchecked("dflt_value")?,
                            primary_key: row.try_get_unchecked::<i64, _>("pk")? > 0,
                        })
                    })
                    .collect::<std::result::Result<Vec<_>, sqlx::Error>>()?
            }
            DatabasePool::Postgres(pool) => {
                let (schema, table) = match table_name.split_once('.') {
                    Some((schema, table)) => (Some(schema), table),
                    None => (None, table_name),
                };
                let rows = sqlx::query(POSTGRES_COLUMNS)
                    .bind(schema)
                    .bind(table)
                    .fetch_all(pool)
                    .await?;
                rows.iter()
                    .map(|row| {
                        Ok(NativeColumn {
                            name: row.try_get("name")?,
                            data_type: row.try_get("data_type")?,
                            length: row.try_get::<Option<i32>, _>("length")?.map(i64::from),
                            nullable: row.try_get("nullable")?,
                            default_value: row.try_get("default_value")?,
                            primary_key: row.try_get("primary_key")?,
                        })
                    })
                    .collect::<std::result::Result<Vec<_>, sqlx::Error>>()?
            }
            DatabasePool::MySql(pool) => {
                let rows = sqlx::query(MYSQL_COLUMNS)
                    .bind(table_name)
                    .fetch_all(pool)
                    .await?;
                rows.iter()
                    .map(|row| {
                        Ok(NativeColumn {
                            name: row.try_get("name")?,
                            data_type: row.try_get("data_type")?,
                            length: None,
                            nullable: row.try_get::<i64, _>("nullable")? != 0,
                            default_value: row.try_get("default_value")?,
                            primary_key: row.try_get::<i64, _>("primary_key")? != 0,
                        })
                    })
                    .collect::<std::result::Result<Vec<_>, sqlx::Error>>()?
            }
        };
        Ok(columns)
    }

    async fn close(&self) {
        match self {
            DatabasePool::Sqlite(pool) => pool.close().await,
            DatabasePool::Postgres(pool) => pool.close().await,
            DatabasePool::MySql(pool) => pool.close().await,
        }
    }
}

fn connection_error(err: sqlx::Error) -> GeneratorError {
    GeneratorError::ConnectionError(err.to_string())
}
