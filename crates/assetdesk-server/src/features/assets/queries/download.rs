//! Download gate query
//!
//! Returns where the current version's content lives. The access decision is
//! recorded as DOWNLOAD/SUCCESS or DENIED before the version lookup.

use assetdesk_common::types::SourceKind;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::features::shared::gate::{require_download, GateError};
use crate::features::shared::ClientInfo;
use crate::features::FeatureState;
use crate::ledger::LedgerError;
use crate::models::Principal;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadResponse {
    pub asset_id: Uuid,
    pub version_id: Uuid,
    pub version_no: i32,
    pub source_kind: SourceKind,
    pub source_locator: String,
    pub source_file_id: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum DownloadAssetError {
    #[error("{0}")]
    Gate(#[from] GateError),

    #[error("Asset '{0}' has no version to download")]
    NoVersion(Uuid),

    #[error("{0}")]
    Version(#[from] LedgerError),
}

#[tracing::instrument(skip(state, principal, client), fields(principal_id = %principal.id))]
pub async fn handle(
    state: &FeatureState,
    principal: &Principal,
    id: Uuid,
    client: &ClientInfo,
) -> Result<DownloadResponse, DownloadAssetError> {
    require_download(state, principal, id, client).await?;

    let version = state
        .ledger
        .get_current(id)
        .await?
        .ok_or(DownloadAssetError::NoVersion(id))?;

    Ok(DownloadResponse {
        asset_id: id,
        version_id: version.id,
        version_no: version.version_no,
        source_kind: version.source_kind,
        source_locator: version.source_locator,
        source_file_id: version.source_file_id,
    })
}
