//! List an asset's access rules (admin)

use uuid::Uuid;

use crate::features::shared::gate::{load_asset, require_admin, GateError};
use crate::features::FeatureState;
use crate::models::{AccessRule, Principal};

#[tracing::instrument(skip(state, principal), fields(principal_id = %principal.id))]
pub async fn handle(
    state: &FeatureState,
    principal: &Principal,
    asset_id: Uuid,
) -> Result<Vec<AccessRule>, GateError> {
    require_admin(principal)?;
    Ok(load_asset(state, asset_id).await?.rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::shared::test_helpers::{admin, user, TestAsset, TestFixture};

    #[tokio::test]
    async fn test_list_permissions_gates() {
        let fixture = TestFixture::new().await;
        let asset = TestAsset::new("Kit").insert(&fixture).await;

        assert!(handle(&fixture.state, &admin(), asset.id).await.unwrap().is_empty());
        assert!(matches!(
            handle(&fixture.state, &user(), asset.id).await,
            Err(GateError::AdminRequired)
        ));
        assert!(matches!(
            handle(&fixture.state, &admin(), Uuid::new_v4()).await,
            Err(GateError::NotFound(_))
        ));
    }
}
