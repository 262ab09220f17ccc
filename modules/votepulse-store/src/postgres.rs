use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Row;
use uuid::Uuid;

use votepulse_common::{Post, VotePulseError, WorkerInfo};
use votepulse_geo::{CityRecord, CityRepository};

use crate::documents::{ConfigStore, PostStore, WorkerRegistry};

fn store_err(e: sqlx::Error) -> VotePulseError {
    VotePulseError::Store(e.to_string())
}

/// Postgres-backed document store: worker liveness, worker configs,
/// persisted posts, and the read-only city reference table.
#[derive(Clone)]
pub struct DocumentStore {
    pool: PgPool,
}

impl DocumentStore {
    /// Connect to Postgres with a small shared pool.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(url)
            .await
            .map_err(store_err)?;
        Ok(Self { pool })
    }

    /// Idempotent schema bootstrap for the document collections. The cities
    /// reference table is loaded out of band and only asserted here.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS workers (id uuid PRIMARY KEY, doc jsonb NOT NULL)",
        )
        .execute(&self.pool)
        .await
        .map_err(store_err)?;
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS configs (id uuid PRIMARY KEY, doc jsonb NOT NULL)",
        )
        .execute(&self.pool)
        .await
        .map_err(store_err)?;
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS postitems (id text PRIMARY KEY, doc jsonb NOT NULL)",
        )
        .execute(&self.pool)
        .await
        .map_err(store_err)?;
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS cities (
                name text NOT NULL,
                display_name text NOT NULL DEFAULT '',
                country text NOT NULL,
                country_code text NOT NULL,
                admin1_code text NOT NULL DEFAULT '',
                admin1 text NOT NULL DEFAULT '',
                admin2_code text NOT NULL DEFAULT '',
                admin2 text NOT NULL DEFAULT '',
                timezone text NOT NULL DEFAULT '',
                population bigint NOT NULL DEFAULT 0,
                lng double precision NOT NULL,
                lat double precision NOT NULL,
                languages text[] NOT NULL DEFAULT '{}'
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(store_err)?;
        sqlx::query("CREATE INDEX IF NOT EXISTS cities_name_idx ON cities (name)")
            .execute(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(())
    }
}

#[async_trait]
impl WorkerRegistry for DocumentStore {
    async fn upsert_liveness(&self, info: &WorkerInfo) -> Result<()> {
        let doc = serde_json::to_value(info)?;
        sqlx::query(
            "INSERT INTO workers (id, doc) VALUES ($1, $2)
             ON CONFLICT (id) DO UPDATE SET doc = EXCLUDED.doc",
        )
        .bind(info.id)
        .bind(doc)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;
        Ok(())
    }
}

#[async_trait]
impl ConfigStore for DocumentStore {
    async fn fetch(&self, id: Uuid) -> Result<Option<Value>> {
        let row = sqlx::query("SELECT doc FROM configs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(row.map(|r| r.get::<Value, _>("doc")))
    }

    async fn save(&self, id: Uuid, doc: &Value) -> Result<()> {
        sqlx::query(
            "INSERT INTO configs (id, doc) VALUES ($1, $2)
             ON CONFLICT (id) DO UPDATE SET doc = EXCLUDED.doc",
        )
        .bind(id)
        .bind(doc)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;
        Ok(())
    }
}

#[async_trait]
impl PostStore for DocumentStore {
    async fn upsert(&self, post: &Post) -> Result<()> {
        let doc = serde_json::to_value(post)?;
        sqlx::query(
            "INSERT INTO postitems (id, doc) VALUES ($1, $2)
             ON CONFLICT (id) DO UPDATE SET doc = EXCLUDED.doc",
        )
        .bind(&post.id)
        .bind(doc)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;
        Ok(())
    }
}

const CITY_COLUMNS: &str = "name, display_name, country, country_code, \
     admin1_code, admin1, admin2_code, admin2, timezone, population, lng, lat, languages";

fn city_from_row(row: &sqlx::postgres::PgRow) -> CityRecord {
    CityRecord {
        name: row.get("name"),
        display_name: row.get("display_name"),
        country: row.get("country"),
        country_code: row.get("country_code"),
        admin1_code: row.get("admin1_code"),
        admin1: row.get("admin1"),
        admin2_code: row.get("admin2_code"),
        admin2: row.get("admin2"),
        timezone: row.get("timezone"),
        population: row.get("population"),
        location: [row.get("lng"), row.get("lat")],
        languages: row.get("languages"),
    }
}

#[async_trait]
impl CityRepository for DocumentStore {
    async fn find_by_name(&self, name: &str) -> Result<Vec<CityRecord>> {
        let rows = sqlx::query(&format!("SELECT {CITY_COLUMNS} FROM cities WHERE name = $1"))
            .bind(name)
            .fetch_all(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(rows.iter().map(city_from_row).collect())
    }

    async fn find_near(&self, lng: f64, lat: f64) -> Result<Option<CityRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {CITY_COLUMNS} FROM cities \
             ORDER BY point(lng, lat) <-> point($1, $2) LIMIT 1"
        ))
        .bind(lng)
        .bind(lat)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;
        Ok(row.as_ref().map(city_from_row))
    }
}
