//! City catalog using PostgreSQL.

use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};
use tracing::info;

use cities_common::{CitiesError, CitiesResult, CityId, CityRecord};

use crate::seed::{CitySeed, SeedCity};
use crate::store::{non_blank, CityStore, MetadataStore};

/// Database connection pool and catalog operations.
pub struct Catalog {
    pool: PgPool,
}

impl Catalog {
    /// Create a new catalog connection from database URL.
    pub async fn connect(database_url: &str) -> CitiesResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(|e| CitiesError::DatabaseError(format!("Connection failed: {}", e)))?;

        Ok(Self { pool })
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> CitiesResult<()> {
        // Split SQL statements and execute them individually
        for statement in SCHEMA_SQL.split(';') {
            let trimmed = statement.trim();
            if !trimmed.is_empty() {
                sqlx::query(trimmed)
                    .execute(&self.pool)
                    .await
                    .map_err(|e| CitiesError::DatabaseError(format!("Migration failed: {}", e)))?;
            }
        }

        Ok(())
    }

    /// Insert or update every city in a seed document.
    pub async fn import_seed(&self, seed: &CitySeed) -> CitiesResult<usize> {
        for city in &seed.cities {
            self.upsert_city(city).await?;
        }

        info!(cities = seed.cities.len(), "Imported city seed into catalog");
        Ok(seed.cities.len())
    }

    async fn upsert_city(&self, city: &SeedCity) -> CitiesResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| CitiesError::DatabaseError(format!("Transaction failed: {}", e)))?;

        sqlx::query(
            r#"
            INSERT INTO cities (id, title, status)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE SET
                title = EXCLUDED.title,
                status = EXCLUDED.status
            "#,
        )
        .bind(city.id)
        .bind(&city.name)
        .bind(city.status.as_str())
        .execute(&mut *tx)
        .await
        .map_err(|e| CitiesError::DatabaseError(format!("Insert failed: {}", e)))?;

        sqlx::query("DELETE FROM city_countries WHERE city_id = $1")
            .bind(city.id)
            .execute(&mut *tx)
            .await
            .map_err(|e| CitiesError::DatabaseError(format!("Delete failed: {}", e)))?;

        for country in &city.countries {
            let country_id: i64 = sqlx::query_scalar(
                r#"
                INSERT INTO countries (name) VALUES ($1)
                ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
                RETURNING id
                "#,
            )
            .bind(country)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| CitiesError::DatabaseError(format!("Insert failed: {}", e)))?;

            sqlx::query(
                "INSERT INTO city_countries (city_id, country_id) VALUES ($1, $2) \
                 ON CONFLICT DO NOTHING",
            )
            .bind(city.id)
            .bind(country_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| CitiesError::DatabaseError(format!("Insert failed: {}", e)))?;
        }

        for (key, value) in &city.meta {
            sqlx::query(
                r#"
                INSERT INTO city_meta (city_id, meta_key, meta_value)
                VALUES ($1, $2, $3)
                ON CONFLICT (city_id, meta_key) DO UPDATE SET
                    meta_value = EXCLUDED.meta_value
                "#,
            )
            .bind(city.id)
            .bind(key)
            .bind(value)
            .execute(&mut *tx)
            .await
            .map_err(|e| CitiesError::DatabaseError(format!("Insert failed: {}", e)))?;
        }

        tx.commit()
            .await
            .map_err(|e| CitiesError::DatabaseError(format!("Commit failed: {}", e)))
    }
}

#[async_trait]
impl CityStore for Catalog {
    async fn search_published(&self, query: &str) -> CitiesResult<Vec<CityRecord>> {
        let pattern = like_pattern(query);

        let rows = sqlx::query_as::<_, CityRow>(
            r#"
            SELECT c.id, c.title, COALESCE(
                       array_agg(co.name ORDER BY co.name) FILTER (WHERE co.name IS NOT NULL),
                       ARRAY[]::TEXT[]
                   ) AS countries
            FROM cities c
            LEFT JOIN city_countries cc ON cc.city_id = c.id
            LEFT JOIN countries co ON co.id = cc.country_id
            WHERE c.status = 'publish'
              AND c.title ILIKE $1 ESCAPE '\'
            GROUP BY c.id, c.title
            ORDER BY c.id ASC
            "#,
        )
        .bind(pattern)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| CitiesError::DatabaseError(format!("Query failed: {}", e)))?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn list_published(&self) -> CitiesResult<Vec<CityRecord>> {
        let rows = sqlx::query_as::<_, CityRow>(
            r#"
            SELECT c.id, c.title, COALESCE(
                       array_agg(co.name ORDER BY co.name) FILTER (WHERE co.name IS NOT NULL),
                       ARRAY[]::TEXT[]
                   ) AS countries
            FROM cities c
            LEFT JOIN city_countries cc ON cc.city_id = c.id
            LEFT JOIN countries co ON co.id = cc.country_id
            WHERE c.status = 'publish'
            GROUP BY c.id, c.title
            ORDER BY lower(c.title) ASC, c.id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| CitiesError::DatabaseError(format!("Query failed: {}", e)))?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn get_published(&self, id: CityId) -> CitiesResult<Option<CityRecord>> {
        let row = sqlx::query_as::<_, CityRow>(
            r#"
            SELECT c.id, c.title, COALESCE(
                       array_agg(co.name ORDER BY co.name) FILTER (WHERE co.name IS NOT NULL),
                       ARRAY[]::TEXT[]
                   ) AS countries
            FROM cities c
            LEFT JOIN city_countries cc ON cc.city_id = c.id
            LEFT JOIN countries co ON co.id = cc.country_id
            WHERE c.status = 'publish' AND c.id = $1
            GROUP BY c.id, c.title
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| CitiesError::DatabaseError(format!("Query failed: {}", e)))?;

        Ok(row.map(|r| r.into()))
    }

    async fn ping(&self) -> CitiesResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| CitiesError::DatabaseError(format!("Ping failed: {}", e)))?;
        Ok(())
    }
}

#[async_trait]
impl MetadataStore for Catalog {
    async fn get_meta(&self, id: CityId, key: &str) -> CitiesResult<Option<String>> {
        let value: Option<String> = sqlx::query_scalar(
            "SELECT meta_value FROM city_meta WHERE city_id = $1 AND meta_key = $2 LIMIT 1",
        )
        .bind(id.0)
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| CitiesError::DatabaseError(format!("Query failed: {}", e)))?;

        Ok(non_blank(value))
    }
}

/// Build an `ILIKE` pattern that matches `query` literally as a substring.
pub fn like_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for ch in query.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

/// Internal row type for database queries.
#[derive(FromRow)]
struct CityRow {
    id: i64,
    title: String,
    countries: Vec<String>,
}

impl From<CityRow> for CityRecord {
    fn from(row: CityRow) -> Self {
        CityRecord {
            id: CityId(row.id),
            name: row.title,
            countries: row.countries,
        }
    }
}

/// Database schema SQL.
const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS cities (
    id BIGINT PRIMARY KEY,
    title TEXT NOT NULL,
    status VARCHAR(20) NOT NULL DEFAULT 'publish'
);

CREATE INDEX IF NOT EXISTS idx_cities_status_title ON cities(status, title);

CREATE TABLE IF NOT EXISTS countries (
    id BIGSERIAL PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS city_countries (
    city_id BIGINT NOT NULL REFERENCES cities(id) ON DELETE CASCADE,
    country_id BIGINT NOT NULL REFERENCES countries(id) ON DELETE CASCADE,

    PRIMARY KEY (city_id, country_id)
);

CREATE TABLE IF NOT EXISTS city_meta (
    city_id BIGINT NOT NULL REFERENCES cities(id) ON DELETE CASCADE,
    meta_key VARCHAR(255) NOT NULL,
    meta_value TEXT NOT NULL DEFAULT '',

    UNIQUE(city_id, meta_key)
)
"#;
