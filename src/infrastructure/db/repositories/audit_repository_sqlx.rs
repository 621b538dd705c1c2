use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Postgres, QueryBuilder, Row};

use crate::application::ports::audit_repository::AuditRepository;
use crate::domain::audit::{AuditEntry, AuditFilter, NewAuditEntry};
use crate::domain::pagination::{Page, PageRequest};
use crate::infrastructure::db::PgPool;
use crate::infrastructure::db::repositories::escape_like;

const AUDIT_COLUMNS: &str = r#"id, occurred_at, actor_id, actor_email, action, entity_type,
    entity_id, outcome, ip_address, user_agent, details"#;

pub struct SqlxAuditRepository {
    pub pool: PgPool,
}

impl SqlxAuditRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_entry(r: &PgRow) -> anyhow::Result<AuditEntry> {
    Ok(AuditEntry {
        id: r.get("id"),
        occurred_at: r.get("occurred_at"),
        actor_id: r.get("actor_id"),
        actor_email: r.get("actor_email"),
        action: r.get("action"),
        entity_type: r.get("entity_type"),
        entity_id: r.get("entity_id"),
        outcome: r.get::<String, _>("outcome").parse()?,
        ip_address: r.get("ip_address"),
        user_agent: r.get("user_agent"),
        details: r.get("details"),
    })
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &AuditFilter) {
    builder.push(" WHERE TRUE");
    if let Some(actor) = filter.actor_id {
        builder.push(" AND actor_id = ").push_bind(actor);
    }
    if let Some(prefix) = filter.action_prefix.as_deref() {
        builder
            .push(" AND action LIKE ")
            .push_bind(format!("{}%", escape_like(prefix)));
    }
    if let Some(kind) = filter.entity_type.clone() {
        builder.push(" AND entity_type = ").push_bind(kind);
    }
    if let Some(entity) = filter.entity_id.clone() {
        builder.push(" AND entity_id = ").push_bind(entity);
    }
    if let Some(outcome) = filter.outcome {
        builder.push(" AND outcome = ").push_bind(outcome.as_str());
    }
    if let Some(from) = filter.from {
        builder.push(" AND occurred_at >= ").push_bind(from);
    }
    if let Some(to) = filter.to {
        builder.push(" AND occurred_at <= ").push_bind(to);
    }
}

#[async_trait]
impl AuditRepository for SqlxAuditRepository {
    async fn append(&self, entry: &NewAuditEntry) -> anyhow::Result<AuditEntry> {
        let row = sqlx::query(&format!(
            r#"INSERT INTO audit_logs
                 (actor_id, actor_email, action, entity_type, entity_id, outcome, ip_address, user_agent, details)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
               RETURNING {AUDIT_COLUMNS}"#
        ))
        .bind(entry.actor_id)
        .bind(&entry.actor_email)
        .bind(&entry.action)
        .bind(&entry.entity_type)
        .bind(&entry.entity_id)
        .bind(entry.outcome.as_str())
        .bind(&entry.ip_address)
        .bind(&entry.user_agent)
        .bind(&entry.details)
        .fetch_one(&self.pool)
        .await?;
        map_entry(&row)
    }

    async fn list(&self, filter: &AuditFilter, page: PageRequest) -> anyhow::Result<Page<AuditEntry>> {
        let mut count: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*)::BIGINT FROM audit_logs");
        push_filters(&mut count, filter);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {AUDIT_COLUMNS} FROM audit_logs"));
        push_filters(&mut select, filter);
        select
            .push(" ORDER BY occurred_at DESC, id DESC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());
        let rows = select.build().fetch_all(&self.pool).await?;
        let items = rows.iter().map(map_entry).collect::<anyhow::Result<Vec<_>>>()?;
        Ok(Page::new(items, page, total))
    }
}
