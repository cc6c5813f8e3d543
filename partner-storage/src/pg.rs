//! PostgreSQL/PostGIS partner store.
//!
//! Connection pooling via deadpool-postgres; plain SQL text, no ORM.
//! Geometries cross the wire as WKT and are stored in PostGIS
//! `geometry` columns (see `migrations/`). Created rows are read back
//! from `INSERT ... RETURNING`, so the geometry a caller receives is
//! the geometry the engine actually stored.

use std::time::Duration;

use deadpool_postgres::{Config, ManagerConfig, Pool, PoolConfig, RecyclingMethod, Runtime};
use partner_core::{NewPartner, Partner, PartnerError, PartnerResult};
use tokio_postgres::error::SqlState;
use tokio_postgres::{NoTls, Row};

use crate::codec;
use crate::traits::PartnerStore;

// ============================================================================
// CONNECTION POOL CONFIGURATION
// ============================================================================

/// Database connection pool configuration.
#[derive(Debug, Clone)]
pub struct PgConfig {
    /// PostgreSQL host
    pub host: String,
    /// PostgreSQL port
    pub port: u16,
    /// Database name
    pub dbname: String,
    /// Database user
    pub user: String,
    /// Database password
    pub password: String,
    /// Maximum pool size
    pub max_size: usize,
    /// Connection timeout
    pub timeout: Duration,
}

impl Default for PgConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            dbname: "partners".to_string(),
            user: "postgres".to_string(),
            password: "".to_string(),
            max_size: 16,
            timeout: Duration::from_secs(30),
        }
    }
}

impl PgConfig {
    /// Create a new database configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("PARTNER_DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: std::env::var("PARTNER_DB_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5432),
            dbname: std::env::var("PARTNER_DB_NAME").unwrap_or_else(|_| "partners".to_string()),
            user: std::env::var("PARTNER_DB_USER").unwrap_or_else(|_| "postgres".to_string()),
            password: std::env::var("PARTNER_DB_PASSWORD").unwrap_or_default(),
            max_size: std::env::var("PARTNER_DB_POOL_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(16),
            timeout: Duration::from_secs(
                std::env::var("PARTNER_DB_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
        }
    }

    /// Create a connection pool from this configuration.
    pub fn create_pool(&self) -> PartnerResult<Pool> {
        let mut cfg = Config::new();
        cfg.host = Some(self.host.clone());
        cfg.port = Some(self.port);
        cfg.dbname = Some(self.dbname.clone());
        cfg.user = Some(self.user.clone());
        cfg.password = Some(self.password.clone());

        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });

        let mut pool_config = PoolConfig::new(self.max_size);
        pool_config.timeouts.wait = Some(self.timeout);
        cfg.pool = Some(pool_config);

        cfg.create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| PartnerError::store_unavailable(format!("Failed to create pool: {}", e)))
    }
}

// ============================================================================
// PARTNER STORE
// ============================================================================

/// Columns shared by every partner query. Geometries come back as WKT.
const PARTNER_COLUMNS: &str = "id, trading_name, owner_name, document, \
     ST_AsText(coverage_area) AS coverage_area, ST_AsText(address) AS address";

/// PostGIS-backed [`PartnerStore`] over a deadpool connection pool.
#[derive(Clone)]
pub struct PgPartnerStore {
    pool: Pool,
}

impl PgPartnerStore {
    /// Create a store from an existing pool.
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Create a store from configuration.
    pub fn from_config(config: &PgConfig) -> PartnerResult<Self> {
        Ok(Self::new(config.create_pool()?))
    }

    async fn get_conn(&self) -> PartnerResult<deadpool_postgres::Object> {
        self.pool.get().await.map_err(|e| {
            PartnerError::store_unavailable(format!("Failed to acquire connection: {}", e))
        })
    }

    fn row_to_partner(row: &Row) -> PartnerResult<Partner> {
        let coverage_wkt: String = row.get("coverage_area");
        let address_wkt: String = row.get("address");

        Ok(Partner {
            id: row.get("id"),
            trading_name: row.get("trading_name"),
            owner_name: row.get("owner_name"),
            document: row.get("document"),
            coverage_area: codec::decode_multi_polygon(&coverage_wkt)?,
            address: codec::decode_point(&address_wkt)?,
        })
    }
}

#[async_trait::async_trait]
impl PartnerStore for PgPartnerStore {
    async fn create(&self, candidate: &NewPartner) -> PartnerResult<Partner> {
        let coverage_wkt = codec::encode_multi_polygon(&candidate.coverage_area)?;
        let address_wkt = codec::encode_point(&candidate.address)?;

        let conn = self.get_conn().await?;
        let statement = format!(
            "INSERT INTO partners (trading_name, owner_name, document, coverage_area, address) \
             VALUES ($1, $2, $3, ST_GeomFromText($4, 4326), ST_GeomFromText($5, 4326)) \
             RETURNING {PARTNER_COLUMNS}"
        );

        let row = conn
            .query_one(
                statement.as_str(),
                &[
                    &candidate.trading_name,
                    &candidate.owner_name,
                    &candidate.document,
                    &coverage_wkt,
                    &address_wkt,
                ],
            )
            .await
            .map_err(|e| classify_insert_error(e, &candidate.document))?;

        Self::row_to_partner(&row)
    }

    async fn get_by_id(&self, id: i64) -> PartnerResult<Option<Partner>> {
        let conn = self.get_conn().await?;
        let statement = format!("SELECT {PARTNER_COLUMNS} FROM partners WHERE id = $1");

        let row = conn
            .query_opt(statement.as_str(), &[&id])
            .await
            .map_err(|e| PartnerError::store_unavailable(e.to_string()))?;

        row.as_ref().map(Self::row_to_partner).transpose()
    }

    async fn search_nearest_containing(
        &self,
        longitude: f64,
        latitude: f64,
    ) -> PartnerResult<Option<Partner>> {
        let conn = self.get_conn().await?;
        // Containment is a hard filter; ranking is the engine's own
        // distance in CRS 4326 with lowest id breaking exact ties.
        let statement = format!(
            "SELECT {PARTNER_COLUMNS}, \
                    ST_Distance(address, ST_SetSRID(ST_MakePoint($1, $2), 4326)) AS distance \
             FROM partners \
             WHERE ST_Contains(coverage_area, ST_SetSRID(ST_MakePoint($1, $2), 4326)) \
             ORDER BY distance ASC, id ASC \
             LIMIT 1"
        );

        let row = conn
            .query_opt(statement.as_str(), &[&longitude, &latitude])
            .await
            .map_err(|e| PartnerError::store_unavailable(e.to_string()))?;

        row.as_ref().map(Self::row_to_partner).transpose()
    }
}

/// Classify an insert failure.
///
/// A unique violation on the document constraint means the caller
/// tried to register an already-registered legal entity; anything
/// else (connection loss, unrelated constraints) stays opaque. The
/// distinction is made from the error detail, not the return code
/// alone.
fn classify_insert_error(err: tokio_postgres::Error, document: &str) -> PartnerError {
    if let Some(db_err) = err.as_db_error() {
        if db_err.code() == &SqlState::UNIQUE_VIOLATION
            && db_err.constraint().is_some_and(|c| c.contains("document"))
        {
            return PartnerError::duplicate_document(document);
        }
    }
    PartnerError::store_unavailable(err.to_string())
}

// ============================================================================
// TESTS
// ============================================================================
