//! Layer record persistence using SQLite with sqlx.

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};
use uuid::Uuid;

use ogc_common::{OgcError, OgcResult, ServiceType};
use ogc_registry::{LayerQuery, LayerRecord, LayerRecordCreate, LayerRecordUpdate, LayerRepository};

type LayerRow = (
    String,         // resource_id
    String,         // service_name
    String,         // service_url
    String,         // service_type
    String,         // layer_name
    Option<String>, // layer_title
    Option<String>, // layer_abstract
    String,         // created_at
    String,         // updated_at
);

const SELECT_COLUMNS: &str = "resource_id, service_name, service_url, service_type, \
     layer_name, layer_title, layer_abstract, created_at, updated_at";

/// SQLite-backed layer repository.
pub struct SqliteLayerRepository {
    pool: SqlitePool,
}

impl SqliteLayerRepository {
    /// Open or create the registry database at the given path.
    pub async fn open(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        Self::init_schema(&pool).await?;

        info!(path = %path.display(), "Opened layer registry database");
        Ok(Self { pool })
    }

    /// Open an in-memory database (for testing).
    pub async fn open_memory() -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(":memory:")
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        Self::init_schema(&pool).await?;
        Ok(Self { pool })
    }

    async fn init_schema(pool: &SqlitePool) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS layers (
                resource_id TEXT PRIMARY KEY,
                service_name TEXT NOT NULL,
                service_url TEXT NOT NULL,
                service_type TEXT NOT NULL,
                layer_name TEXT NOT NULL,
                layer_title TEXT,
                layer_abstract TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                UNIQUE(service_url, layer_name, service_type)
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_layers_service_url ON layers(service_url)")
            .execute(pool)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_layers_layer_name ON layers(layer_name)")
            .execute(pool)
            .await?;

        Ok(())
    }

    fn row_to_record(row: LayerRow) -> OgcResult<LayerRecord> {
        let resource_id = Uuid::parse_str(&row.0)
            .map_err(|e| OgcError::Repository(format!("bad resource id {}: {}", row.0, e)))?;
        let service_type = row.3.parse::<ServiceType>()?;

        Ok(LayerRecord {
            resource_id,
            service_name: row.1,
            service_url: row.2,
            service_type,
            layer_name: row.4,
            layer_title: row.5,
            layer_abstract: row.6,
            created_at: parse_timestamp(&row.7),
            updated_at: parse_timestamp(&row.8),
        })
    }
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn repo_err(e: sqlx::Error) -> OgcError {
    OgcError::Repository(e.to_string())
}

#[async_trait]
impl LayerRepository for SqliteLayerRepository {
    async fn create(&self, create: LayerRecordCreate) -> OgcResult<LayerRecord> {
        let record = create.into_record();

        let result = sqlx::query(
            r#"
            INSERT INTO layers (resource_id, service_name, service_url, service_type,
                                layer_name, layer_title, layer_abstract, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.resource_id.to_string())
        .bind(&record.service_name)
        .bind(&record.service_url)
        .bind(record.service_type.as_str())
        .bind(&record.layer_name)
        .bind(&record.layer_title)
        .bind(&record.layer_abstract)
        .bind(record.created_at.to_rfc3339())
        .bind(record.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                debug!(layer = %record.layer_name, "layer record created");
                Ok(record)
            }
            Err(sqlx::Error::Database(db)) if db.message().contains("UNIQUE") => {
                Err(OgcError::DuplicateResource {
                    service_url: record.service_url,
                    layer_name: record.layer_name,
                    service_type: record.service_type.to_string(),
                })
            }
            Err(e) => Err(repo_err(e)),
        }
    }

    async fn get_by_id(&self, resource_id: Uuid) -> OgcResult<Option<LayerRecord>> {
        let row: Option<LayerRow> = sqlx::query_as(&format!(
            "SELECT {} FROM layers WHERE resource_id = ?",
            SELECT_COLUMNS
        ))
        .bind(resource_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(repo_err)?;

        row.map(Self::row_to_record).transpose()
    }

    async fn get_by_service_layer_and_type(
        &self,
        service_url: &str,
        layer_name: &str,
        service_type: ServiceType,
    ) -> OgcResult<Option<LayerRecord>> {
        let row: Option<LayerRow> = sqlx::query_as(&format!(
            "SELECT {} FROM layers WHERE service_url = ? AND layer_name = ? AND service_type = ?",
            SELECT_COLUMNS
        ))
        .bind(service_url)
        .bind(layer_name)
        .bind(service_type.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(repo_err)?;

        row.map(Self::row_to_record).transpose()
    }

    async fn get_layers_by_service_url(&self, service_url: &str) -> OgcResult<Vec<LayerRecord>> {
        let rows: Vec<LayerRow> = sqlx::query_as(&format!(
            "SELECT {} FROM layers WHERE service_url = ? ORDER BY created_at ASC",
            SELECT_COLUMNS
        ))
        .bind(service_url)
        .fetch_all(&self.pool)
        .await
        .map_err(repo_err)?;

        rows.into_iter().map(Self::row_to_record).collect()
    }

    async fn update(
        &self,
        resource_id: Uuid,
        update: LayerRecordUpdate,
    ) -> OgcResult<Option<LayerRecord>> {
        let Some(mut record) = self.get_by_id(resource_id).await? else {
            return Ok(None);
        };
        update.apply(&mut record);

        sqlx::query(
            r#"
            UPDATE layers
            SET service_name = ?, service_type = ?, layer_title = ?,
                layer_abstract = ?, updated_at = ?
            WHERE resource_id = ?
            "#,
        )
        .bind(&record.service_name)
        .bind(record.service_type.as_str())
        .bind(&record.layer_title)
        .bind(&record.layer_abstract)
        .bind(record.updated_at.to_rfc3339())
        .bind(resource_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(repo_err)?;

        Ok(Some(record))
    }

    async fn delete(&self, resource_id: Uuid) -> OgcResult<bool> {
        let result = sqlx::query("DELETE FROM layers WHERE resource_id = ?")
            .bind(resource_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(repo_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_resources(&self, query: &LayerQuery) -> OgcResult<Vec<LayerRecord>> {
        // LIMIT -1 means unbounded in SQLite.
        let limit = query.limit.map(|l| l as i64).unwrap_or(-1);
        let offset = query.offset.unwrap_or(0) as i64;

        let rows: Vec<LayerRow> = sqlx::query_as(&format!(
            r#"
            SELECT {} FROM layers
            WHERE (?1 IS NULL OR service_type = ?1)
              AND (?2 IS NULL OR LOWER(service_name) LIKE '%' || LOWER(?2) || '%')
              AND (?3 IS NULL OR LOWER(layer_name) LIKE '%' || LOWER(?3) || '%')
            ORDER BY created_at DESC
            LIMIT ?4 OFFSET ?5
            "#,
            SELECT_COLUMNS
        ))
        .bind(query.service_type.map(|t| t.as_str().to_string()))
        .bind(&query.service_name)
        .bind(&query.layer_name)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(repo_err)?;

        rows.into_iter().map(Self::row_to_record).collect()
    }

    async fn count(&self, query: &LayerQuery) -> OgcResult<u64> {
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM layers
            WHERE (?1 IS NULL OR service_type = ?1)
              AND (?2 IS NULL OR LOWER(service_name) LIKE '%' || LOWER(?2) || '%')
              AND (?3 IS NULL OR LOWER(layer_name) LIKE '%' || LOWER(?3) || '%')
            "#,
        )
        .bind(query.service_type.map(|t| t.as_str().to_string()))
        .bind(&query.service_name)
        .bind(&query.layer_name)
        .fetch_one(&self.pool)
        .await
        .map_err(repo_err)?;

        Ok(count.0 as u64)
    }
}
