use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use crate::application::ports::role_repository::RoleRepository;
use crate::domain::identity::permission::Permission;
use crate::domain::identity::role::Role;
use crate::infrastructure::db::PgPool;
use crate::infrastructure::db::repositories::map_unique;

const ROLE_COLUMNS: &str = "id, name, description, permissions, is_system, created_at, updated_at";

pub struct SqlxRoleRepository {
    pub pool: PgPool,
}

impl SqlxRoleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_role(r: &PgRow) -> anyhow::Result<Role> {
    let codes: Vec<String> = r.get("permissions");
    let permissions = codes
        .iter()
        .map(|c| c.parse::<Permission>())
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(Role {
        id: r.get("id"),
        name: r.get("name"),
        description: r.get("description"),
        permissions,
        is_system: r.get("is_system"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    })
}

fn codes(permissions: &[Permission]) -> Vec<String> {
    permissions.iter().map(|p| p.code().to_string()).collect()
}

#[async_trait]
impl RoleRepository for SqlxRoleRepository {
    async fn create_role(
        &self,
        name: &str,
        description: Option<&str>,
        permissions: &[Permission],
        is_system: bool,
    ) -> anyhow::Result<Role> {
        let row = sqlx::query(&format!(
            r#"INSERT INTO roles (name, description, permissions, is_system)
               VALUES ($1, $2, $3, $4)
               RETURNING {ROLE_COLUMNS}"#
        ))
        .bind(name)
        .bind(description)
        .bind(codes(permissions))
        .bind(is_system)
        .fetch_one(&self.pool)
        .await
        .map_err(map_unique)?;
        map_role(&row)
    }

    async fn get_by_id(&self, id: Uuid) -> anyhow::Result<Option<Role>> {
        let row = sqlx::query(&format!("SELECT {ROLE_COLUMNS} FROM roles WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(map_role).transpose()
    }

    async fn find_by_name(&self, name: &str) -> anyhow::Result<Option<Role>> {
        let row = sqlx::query(&format!(
            "SELECT {ROLE_COLUMNS} FROM roles WHERE LOWER(name) = LOWER($1)"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(map_role).transpose()
    }

    async fn find_by_names(&self, names: &[String]) -> anyhow::Result<Vec<Role>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }
        let lowered: Vec<String> = names.iter().map(|n| n.to_lowercase()).collect();
        let rows = sqlx::query(&format!(
            "SELECT {ROLE_COLUMNS} FROM roles WHERE LOWER(name) = ANY($1) ORDER BY name"
        ))
        .bind(lowered)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(map_role).collect()
    }

    async fn list_roles(&self) -> anyhow::Result<Vec<Role>> {
        let rows = sqlx::query(&format!(
            "SELECT {ROLE_COLUMNS} FROM roles ORDER BY is_system DESC, name ASC"
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(map_role).collect()
    }

    async fn update_role(&self, role: &Role) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"UPDATE roles SET name = $2, description = $3, permissions = $4, updated_at = now()
               WHERE id = $1"#,
        )
        .bind(role.id)
        .bind(&role.name)
        .bind(&role.description)
        .bind(codes(&role.permissions))
        .execute(&self.pool)
        .await
        .map_err(map_unique)?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete_role(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn roles_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Role>> {
        let rows = sqlx::query(
            r#"SELECT r.id, r.name, r.description, r.permissions, r.is_system, r.created_at, r.updated_at
               FROM roles r
               JOIN user_roles ur ON ur.role_id = r.id
               WHERE ur.user_id = $1
               ORDER BY r.name"#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(map_role).collect()
    }

    async fn set_user_roles(&self, user_id: Uuid, role_ids: &[Uuid]) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        if !role_ids.is_empty() {
            sqlx::query(
                r#"INSERT INTO user_roles (user_id, role_id)
                   SELECT $1, UNNEST($2::uuid[])
                   ON CONFLICT DO NOTHING"#,
            )
            .bind(user_id)
            .bind(role_ids)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }
}
