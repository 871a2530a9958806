//! Get asset detail query

use uuid::Uuid;

use crate::features::assets::types::AssetDetail;
use crate::features::shared::gate::{require_view_logged, GateError};
use crate::features::shared::ClientInfo;
use crate::features::FeatureState;
use crate::ledger::LedgerError;
use crate::models::Principal;

#[derive(Debug, thiserror::Error)]
pub enum GetAssetError {
    #[error("{0}")]
    Gate(#[from] GateError),

    #[error("{0}")]
    Version(#[from] LedgerError),
}

/// 404 for a missing asset, 403 when `can_view` refuses; both outcomes of the
/// access decision are written to the access log.
#[tracing::instrument(skip(state, principal, client), fields(principal_id = %principal.id))]
pub async fn handle(
    state: &FeatureState,
    principal: &Principal,
    id: Uuid,
    client: &ClientInfo,
) -> Result<AssetDetail, GetAssetError> {
    let gated = require_view_logged(state, principal, id, client).await?;
    let current = state.ledger.get_current(id).await?;
    Ok(AssetDetail::new(gated.asset, current))
}
