//! Users and their roles, as principals

use std::collections::BTreeSet;

use assetdesk_common::types::RoleCode;
use async_trait::async_trait;
use uuid::Uuid;

use super::PgStore;
use crate::models::Principal;
use crate::store::{PrincipalResolver, StoreError, StoreResult};

#[derive(Debug, sqlx::FromRow)]
struct PrincipalRow {
    id: Uuid,
    department_id: Option<Uuid>,
    status: String,
    roles: Vec<String>,
}

impl TryFrom<PrincipalRow> for Principal {
    type Error = StoreError;

    fn try_from(row: PrincipalRow) -> Result<Self, Self::Error> {
        let roles = row
            .roles
            .iter()
            .map(|code| code.parse::<RoleCode>())
            .collect::<Result<BTreeSet<_>, _>>()?;

        Ok(Principal {
            id: row.id,
            roles,
            department_id: row.department_id,
            active: row.status == "ACTIVE",
        })
    }
}

#[async_trait]
impl PrincipalResolver for PgStore {
    async fn resolve_principal(&self, user_id: Uuid) -> StoreResult<Option<Principal>> {
        let row = sqlx::query_as::<_, PrincipalRow>(
            r#"
            SELECT u.id, u.department_id, u.status,
                   COALESCE(
                       array_agg(ur.role_code) FILTER (WHERE ur.role_code IS NOT NULL),
                       '{}'::text[]
                   ) AS roles
            FROM users u
            LEFT JOIN user_roles ur ON ur.user_id = u.id
            WHERE u.id = $1
            GROUP BY u.id
            "#,
        )
        .bind(user_id)
        .fetch_optional(self.pool())
        .await?;

        row.map(Principal::try_from).transpose()
    }
}
