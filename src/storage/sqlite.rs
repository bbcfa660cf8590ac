//! SQLite-backed status store and domain registry.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection, SqlitePool};

use super::migrations::run_migrations;
use super::models::{AddReport, GroupSummary, StoredDomain};
use super::pool::{init_db_pool_with_path, init_memory_pool};
use super::{detect_transitions, StatusStore};
use crate::check::{CheckResult, Status};
use crate::config::{BULK_WRITE_CHUNK_ROWS, DEFAULT_GROUP};
use crate::domain::DomainTarget;
use crate::error_handling::StoreError;
use crate::notify::Transition;

const DOMAIN_COLUMNS: &str = "domain, group_name, last_status, last_checked, \
     last_response_time, last_status_code, last_error";

/// Durable store keyed by domain name.
#[derive(Clone)]
pub struct SqliteStore {
    pool: Arc<SqlitePool>,
}

impl SqliteStore {
    /// Opens (creating if needed) the database at `path` and applies migrations.
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        let pool = init_db_pool_with_path(path).await?;
        run_migrations(&pool).await?;
        Ok(SqliteStore { pool })
    }

    /// A migrated store that lives only as long as this value.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let pool = init_memory_pool().await?;
        run_migrations(&pool).await?;
        Ok(SqliteStore { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Registers `names` under `group`.
    ///
    /// Names are trimmed; blanks and repeats within `names` are skipped. A name
    /// that is already registered keeps its current group.
    pub async fn add_domains(&self, group: &str, names: &[String]) -> Result<AddReport, StoreError> {
        let mut seen = HashSet::new();
        let names: Vec<String> = names
            .iter()
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty() && seen.insert(n.clone()))
            .collect();
        if names.is_empty() {
            return Ok(AddReport::default());
        }

        let mut tx = self.pool.begin().await?;
        let mut existing: HashMap<String, String> = HashMap::new();
        for chunk in names.chunks(BULK_WRITE_CHUNK_ROWS) {
            let mut qb: QueryBuilder<Sqlite> =
                QueryBuilder::new("SELECT domain, group_name FROM domains WHERE domain IN (");
            let mut list = qb.separated(", ");
            for name in chunk {
                list.push_bind(name.as_str());
            }
            list.push_unseparated(")");
            for row in qb.build().fetch_all(&mut *tx).await? {
                existing.insert(row.try_get("domain")?, row.try_get("group_name")?);
            }
        }

        let mut report = AddReport::default();
        for name in &names {
            match existing.get(name) {
                None => report.added.push(name.clone()),
                Some(current) if current == group => report.existing_same_group.push(name.clone()),
                Some(current) => report
                    .existing_other_groups
                    .push((name.clone(), current.clone())),
            }
        }

        let added_at = Utc::now().timestamp_millis();
        for chunk in report.added.chunks(BULK_WRITE_CHUNK_ROWS) {
            let mut qb: QueryBuilder<Sqlite> =
                QueryBuilder::new("INSERT INTO domains (domain, group_name, added_at) ");
            qb.push_values(chunk, |mut row, name| {
                row.push_bind(name.as_str())
                    .push_bind(group)
                    .push_bind(added_at);
            });
            qb.build().execute(&mut *tx).await?;
        }
        tx.commit().await?;

        if !report.added.is_empty() {
            log::info!("Added {} domains to group {}", report.added.len(), group);
        }
        Ok(report)
    }

    /// Unregisters `name`. Returns whether it was registered.
    pub async fn remove_domain(&self, name: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM domains WHERE domain = ?")
            .bind(name.trim())
            .execute(self.pool.as_ref())
            .await?;
        let removed = result.rows_affected() > 0;
        if removed {
            log::info!("Removed domain from monitoring: {}", name.trim());
        }
        Ok(removed)
    }

    /// Files `name` under `group`. Returns whether the domain exists.
    pub async fn move_domain(&self, name: &str, group: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE domains SET group_name = ? WHERE domain = ?")
            .bind(group)
            .bind(name.trim())
            .execute(self.pool.as_ref())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Registered domains in insertion order, optionally limited to one group.
    pub async fn list_domains(&self, group: Option<&str>) -> Result<Vec<StoredDomain>, StoreError> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT ");
        qb.push(DOMAIN_COLUMNS).push(" FROM domains");
        if let Some(group) = group {
            qb.push(" WHERE group_name = ").push_bind(group);
        }
        qb.push(" ORDER BY id");

        qb.build()
            .fetch_all(self.pool.as_ref())
            .await?
            .iter()
            .map(stored_domain_from_row)
            .collect()
    }

    /// Targets to hand to a checker, in insertion order.
    pub async fn list_targets(&self, group: Option<&str>) -> Result<Vec<DomainTarget>, StoreError> {
        Ok(self
            .list_domains(group)
            .await?
            .iter()
            .map(StoredDomain::target)
            .collect())
    }

    /// Distinct group names, sorted. An empty registry reports the default group.
    pub async fn groups(&self) -> Result<Vec<String>, StoreError> {
        let groups: Vec<String> =
            sqlx::query_scalar("SELECT DISTINCT group_name FROM domains ORDER BY group_name")
                .fetch_all(self.pool.as_ref())
                .await?;
        if groups.is_empty() {
            return Ok(vec![DEFAULT_GROUP.to_string()]);
        }
        Ok(groups)
    }

    /// Status counts per group.
    pub async fn group_summary(&self) -> Result<BTreeMap<String, GroupSummary>, StoreError> {
        let rows = sqlx::query(
            "SELECT group_name,
                    COUNT(*) AS total,
                    SUM(CASE WHEN last_status = 'up' THEN 1 ELSE 0 END) AS up,
                    SUM(CASE WHEN last_status = 'down' THEN 1 ELSE 0 END) AS down,
                    SUM(CASE WHEN last_status IS NULL THEN 1 ELSE 0 END) AS unknown
             FROM domains
             GROUP BY group_name",
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        let mut summary = BTreeMap::new();
        for row in rows {
            summary.insert(
                row.try_get("group_name")?,
                GroupSummary {
                    total: count(&row, "total")?,
                    up: count(&row, "up")?,
                    down: count(&row, "down")?,
                    unknown: count(&row, "unknown")?,
                },
            );
        }
        Ok(summary)
    }
}

#[async_trait]
impl StatusStore for SqliteStore {
    async fn get_previous_statuses(
        &self,
        domains: &[String],
    ) -> Result<HashMap<String, Status>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        fetch_statuses(&mut conn, domains).await
    }

    async fn bulk_apply(&self, results: &[CheckResult]) -> Result<Vec<Transition>, StoreError> {
        let observed: Vec<&CheckResult> = results
            .iter()
            .filter(|r| r.status() != Status::Unknown)
            .collect();
        if observed.is_empty() {
            return Ok(Vec::new());
        }

        let domains: Vec<String> = observed.iter().map(|r| r.domain.clone()).collect();
        let mut tx = self.pool.begin().await?;
        let previous = fetch_statuses(&mut tx, &domains).await?;
        let transitions = detect_transitions(previous, results);

        let added_at = Utc::now().timestamp_millis();
        for chunk in observed.chunks(BULK_WRITE_CHUNK_ROWS) {
            let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
                "INSERT INTO domains (domain, group_name, added_at, last_status, last_checked, \
                 last_response_time, last_status_code, last_error) ",
            );
            qb.push_values(chunk, |mut row, result| {
                row.push_bind(result.domain.as_str())
                    .push_bind(result.group.as_str())
                    .push_bind(added_at)
                    .push_bind(result.status().to_string())
                    .push_bind(result.checked_at.timestamp_millis())
                    .push_bind(result.response_time)
                    .push_bind(result.status_code().map(i64::from))
                    .push_bind(result.error().map(ToString::to_string));
            });
            qb.push(
                " ON CONFLICT(domain) DO UPDATE SET \
                 last_status = excluded.last_status, \
                 last_checked = excluded.last_checked, \
                 last_response_time = excluded.last_response_time, \
                 last_status_code = excluded.last_status_code, \
                 last_error = excluded.last_error",
            );
            qb.build().execute(&mut *tx).await?;
        }
        tx.commit().await?;

        log::debug!(
            "Bulk updated {} domains ({} transitions)",
            observed.len(),
            transitions.len()
        );
        Ok(transitions)
    }
}

/// Stored statuses for `domains`; never-checked domains are absent.
async fn fetch_statuses(
    conn: &mut SqliteConnection,
    domains: &[String],
) -> Result<HashMap<String, Status>, StoreError> {
    let mut statuses = HashMap::with_capacity(domains.len());
    for chunk in domains.chunks(BULK_WRITE_CHUNK_ROWS) {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT domain, last_status FROM domains WHERE last_status IS NOT NULL AND domain IN (",
        );
        let mut list = qb.separated(", ");
        for domain in chunk {
            list.push_bind(domain.as_str());
        }
        list.push_unseparated(")");

        for row in qb.build().fetch_all(&mut *conn).await? {
            let domain: String = row.try_get("domain")?;
            let raw: String = row.try_get("last_status")?;
            let status = parse_status(&domain, &raw)?;
            statuses.insert(domain, status);
        }
    }
    Ok(statuses)
}

fn parse_status(domain: &str, raw: &str) -> Result<Status, StoreError> {
    Status::from_str(raw).map_err(|_| StoreError::CorruptValue {
        domain: domain.to_string(),
        detail: format!("unrecognized status {raw:?}"),
    })
}

fn stored_domain_from_row(row: &SqliteRow) -> Result<StoredDomain, StoreError> {
    let name: String = row.try_get("domain")?;
    let last_status = row
        .try_get::<Option<String>, _>("last_status")?
        .map(|raw| parse_status(&name, &raw))
        .transpose()?;
    let last_checked = row
        .try_get::<Option<i64>, _>("last_checked")?
        .and_then(DateTime::<Utc>::from_timestamp_millis);
    let last_status_code = row
        .try_get::<Option<i64>, _>("last_status_code")?
        .map(|code| {
            u16::try_from(code).map_err(|_| StoreError::CorruptValue {
                domain: name.clone(),
                detail: format!("status code {code} out of range"),
            })
        })
        .transpose()?;

    Ok(StoredDomain {
        group: row.try_get("group_name")?,
        last_status,
        last_checked,
        last_response_time: row.try_get("last_response_time")?,
        last_status_code,
        last_error: row.try_get("last_error")?,
        name,
    })
}

fn count(row: &SqliteRow, column: &str) -> Result<usize, StoreError> {
    let value: i64 = row.try_get(column)?;
    Ok(usize::try_from(value).unwrap_or_default())
}
