//! List share requests
//!
//! Administrators see every request; everyone else sees their own.

use assetdesk_common::types::ShareStatus;
use serde::{Deserialize, Serialize};

use crate::access::AccessEvaluator;
use crate::features::FeatureState;
use crate::models::{Principal, ShareRequest};
use crate::store::{ShareRequestFilter, StoreError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListShareRequestsQuery {
    /// Status code, case-insensitive
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ListShareRequestsError {
    #[error("Unknown share request status '{0}'")]
    InvalidStatus(String),

    #[error("Database error: {0}")]
    Store(#[from] StoreError),
}

#[tracing::instrument(skip(state, principal), fields(principal_id = %principal.id))]
pub async fn handle(
    state: &FeatureState,
    principal: &Principal,
    query: ListShareRequestsQuery,
) -> Result<Vec<ShareRequest>, ListShareRequestsError> {
    let status = match query.status.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(code) => Some(
            code.to_ascii_uppercase()
                .parse::<ShareStatus>()
                .map_err(|_| ListShareRequestsError::InvalidStatus(code.to_string()))?,
        ),
    };

    let requester_id = (!AccessEvaluator::is_admin(principal)).then_some(principal.id);
    let filter = ShareRequestFilter {
        status,
        requester_id,
    };

    Ok(state.share_requests.list_share_requests(&filter).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::shared::test_helpers::{admin, user, TestAsset, TestFixture};
    use crate::features::share_requests::commands::{create, CreateShareRequestCommand};
    use assetdesk_common::types::PublishStatus;

    #[tokio::test]
    async fn test_scoped_to_requester_unless_admin() {
        let fixture = TestFixture::new().await;
        let asset = TestAsset::new("Deck")
            .with_status(PublishStatus::Published)
            .insert(&fixture)
            .await;
        let alice = user();
        let bob = user();
        for who in [&alice, &bob, &alice] {
            let command = CreateShareRequestCommand {
                asset_id: asset.id,
                reason: "client visit".to_string(),
            };
            create::handle(&fixture.state, who, command).await.unwrap();
        }

        let mine = handle(&fixture.state, &alice, Default::default()).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|r| r.requester_id == alice.id));

        let all = handle(&fixture.state, &admin(), Default::default()).await.unwrap();
        assert_eq!(all.len(), 3);

        let pending = ListShareRequestsQuery {
            status: Some("pending".to_string()),
        };
        assert_eq!(handle(&fixture.state, &admin(), pending).await.unwrap().len(), 3);

        let bogus = ListShareRequestsQuery {
            status: Some("LOST".to_string()),
        };
        assert!(matches!(
            handle(&fixture.state, &admin(), bogus).await,
            Err(ListShareRequestsError::InvalidStatus(_))
        ));
    }
}
