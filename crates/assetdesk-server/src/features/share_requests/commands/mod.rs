pub mod create;
pub mod decide;

pub use create::{CreateShareRequestCommand, CreateShareRequestError};
pub use decide::{DecideShareRequestCommand, DecideShareRequestError};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::shared::test_helpers::{admin, user, TestAsset, TestFixture};
    use crate::features::shared::GateError;
    use crate::models::{Asset, Principal, RuleSpec, Subject};
    use crate::store::AssetPatch;
    use assetdesk_common::types::{PublishStatus, ShareStatus, ViewScope};

    async fn setup() -> (TestFixture, Asset, Principal, Principal) {
        let fixture = TestFixture::new().await;
        let asset = TestAsset::new("Reference deck")
            .with_status(PublishStatus::Published)
            .insert(&fixture)
            .await;
        let requester = fixture.register(user()).await;
        let approver = fixture.register(admin()).await;
        (fixture, asset, requester, approver)
    }

    fn command(asset: &Asset) -> CreateShareRequestCommand {
        CreateShareRequestCommand {
            asset_id: asset.id,
            reason: "Customer pitch on Friday".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_approve() {
        let (fixture, asset, requester, approver) = setup().await;

        let request = create::handle(&fixture.state, &requester, command(&asset)).await.unwrap();
        assert_eq!(request.status, ShareStatus::Pending);
        assert_eq!(request.requester_id, requester.id);

        let approved = decide::approve(
            &fixture.state,
            &approver,
            request.id,
            DecideShareRequestCommand {
                comment: Some("ok".to_string()),
            },
        )
        .await
        .unwrap();
        assert_eq!(approved.status, ShareStatus::Approved);
        assert_eq!(approved.decided_by, Some(approver.id));
        assert_eq!(approved.comment, "ok");
        assert!(approved.decided_at.is_some());

        let err = decide::reject(&fixture.state, &approver, request.id, Default::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DecideShareRequestError::NotPending {
                status: ShareStatus::Approved,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_create_requires_view_and_reason() {
        let (fixture, asset, requester, _) = setup().await;
        let hidden = TestAsset::new("Hidden").insert(&fixture).await;

        let err = create::handle(&fixture.state, &requester, command(&hidden)).await.unwrap_err();
        assert!(matches!(err, CreateShareRequestError::Gate(GateError::Denied(_))));

        let blank = CreateShareRequestCommand {
            asset_id: asset.id,
            reason: "   ".to_string(),
        };
        let err = create::handle(&fixture.state, &requester, blank).await.unwrap_err();
        assert!(matches!(err, CreateShareRequestError::Field(_)));
    }

    #[tokio::test]
    async fn test_approval_refused_after_access_lost() {
        let (fixture, asset, requester, approver) = setup().await;
        let request = create::handle(&fixture.state, &requester, command(&asset)).await.unwrap();

        fixture
            .patch(
                asset.id,
                AssetPatch {
                    view_scope: Some(ViewScope::Custom),
                    ..Default::default()
                },
            )
            .await;
        fixture
            .state
            .rules
            .replace_rules(asset.id, vec![RuleSpec::new(Subject::User(approver.id), true, true)])
            .await
            .unwrap();

        let err = decide::approve(&fixture.state, &approver, request.id, Default::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DecideShareRequestError::RequesterLostAccess));

        let still = fixture.state.share_requests.get_share_request(request.id).await.unwrap();
        assert_eq!(still.unwrap().status, ShareStatus::Pending);
    }

    #[tokio::test]
    async fn test_only_requester_cancels() {
        let (fixture, asset, requester, approver) = setup().await;
        let request = create::handle(&fixture.state, &requester, command(&asset)).await.unwrap();

        let err = decide::cancel(&fixture.state, &approver, request.id).await.unwrap_err();
        assert!(matches!(err, DecideShareRequestError::NotRequester));

        let cancelled = decide::cancel(&fixture.state, &requester, request.id).await.unwrap();
        assert_eq!(cancelled.status, ShareStatus::Cancelled);
        assert_eq!(cancelled.decided_by, None);
    }

    #[tokio::test]
    async fn test_users_cannot_decide() {
        let (fixture, asset, requester, _) = setup().await;
        let request = create::handle(&fixture.state, &requester, command(&asset)).await.unwrap();

        let err = decide::approve(&fixture.state, &requester, request.id, Default::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DecideShareRequestError::Gate(GateError::AdminRequired)));
    }
}
