use rst_common::standard::chrono::Utc;
use rst_common::with_logging::log::{debug, info};

use crate::queue::types::RequestStatus;
use crate::queue::ConnectionRequestItem;
use crate::types::InvitationID;

use super::types::{Advance, LedgerError, RepoBuilder, Side, Status};
use super::InvitationRecord;

/// `Ledger` drives the invitation records of a single wallet
///
/// Every mutation is a get-then-put of the whole record, which makes each of them safe to
/// retry: a repeated call finds the record already mutated and turns into a no-op
#[derive(Clone)]
pub struct Ledger<TRepo>
where
    TRepo: RepoBuilder,
{
    repo: TRepo,
}

impl<TRepo> Ledger<TRepo>
where
    TRepo: RepoBuilder,
{
    pub fn new(repo: TRepo) -> Self {
        Self { repo }
    }

    /// Stores the record unless its invitation id is already tracked, in which case the
    /// existing record is returned untouched. The flag tells whether it was created
    pub async fn create(
        &self,
        record: InvitationRecord,
    ) -> Result<(InvitationRecord, bool), LedgerError> {
        if let Some(existing) = self
            .repo
            .find_by_invitation_id(record.invitation_id())
            .await?
        {
            debug!(
                "[ledger:create] invitation already tracked: {}",
                existing.invitation_id()
            );
            return Ok((existing, false));
        }

        self.repo.save_record(record.clone()).await?;
        info!(
            "[ledger:create] tracked invitation {} as {}",
            record.invitation_id(),
            record.status()
        );
        Ok((record, true))
    }

    pub async fn get(
        &self,
        invitation_id: InvitationID,
    ) -> Result<Option<InvitationRecord>, LedgerError> {
        self.repo.find_by_invitation_id(invitation_id).await
    }

    async fn get_required(
        &self,
        invitation_id: InvitationID,
    ) -> Result<InvitationRecord, LedgerError> {
        self.repo
            .find_by_invitation_id(invitation_id.clone())
            .await?
            .ok_or(LedgerError::NotFound(invitation_id.to_string()))
    }

    /// Requests a status transition. A transition the state machine does not allow,
    /// including any move out of a terminal state, leaves the record unchanged
    pub async fn advance(
        &self,
        invitation_id: InvitationID,
        next: Status,
    ) -> Result<Advance, LedgerError> {
        let mut record = self.get_required(invitation_id).await?;
        if record.side() != next.side() {
            return Err(LedgerError::InvalidTransition(format!(
                "{} is not a {:?} status",
                next,
                record.side()
            )));
        }

        let current = record.status();
        if !record.apply_status(next, Utc::now()) {
            debug!(
                "[ledger:advance] {} stays at {}, requested {}",
                record.invitation_id(),
                current,
                next
            );
            return Ok(Advance::Unchanged(record));
        }

        self.repo.save_record(record.clone()).await?;
        info!(
            "[ledger:advance] {}: {} -> {}",
            record.invitation_id(),
            current,
            next
        );
        Ok(Advance::Advanced(record))
    }

    pub async fn mark_previewed(&self, invitation_id: InvitationID) -> Result<Advance, LedgerError> {
        self.advance(invitation_id, Status::InvitationPreviewed).await
    }

    pub async fn mark_request_sent(
        &self,
        invitation_id: InvitationID,
    ) -> Result<Advance, LedgerError> {
        self.advance(invitation_id, Status::ConnectionRequestSent)
            .await
    }

    pub async fn mark_established(
        &self,
        invitation_id: InvitationID,
    ) -> Result<Advance, LedgerError> {
        self.advance(invitation_id, Status::ConnectionEstablished)
            .await
    }

    pub async fn mark_connection_requested(
        &self,
        invitation_id: InvitationID,
    ) -> Result<Advance, LedgerError> {
        self.advance(invitation_id, Status::ConnectionRequested)
            .await
    }

    pub async fn mark_connected(&self, invitation_id: InvitationID) -> Result<Advance, LedgerError> {
        self.advance(invitation_id, Status::Connected).await
    }

    /// Moves the record to the rejected state of its own side
    pub async fn mark_rejected(&self, invitation_id: InvitationID) -> Result<Advance, LedgerError> {
        let record = self.get_required(invitation_id.clone()).await?;
        self.advance(invitation_id, record.side().rejected_status())
            .await
    }

    /// Records the DID of the other party, only when it is not known yet
    pub async fn set_counterparty(
        &self,
        invitation_id: InvitationID,
        did: String,
    ) -> Result<InvitationRecord, LedgerError> {
        let mut record = self.get_required(invitation_id).await?;
        let known = match record.side() {
            Side::Inviter => record.invitee_did(),
            Side::Invitee => record.inviter_did(),
        };

        if known.is_some() {
            return Ok(record);
        }

        record.set_counterparty_did(did);
        self.repo.save_record(record.clone()).await?;
        Ok(record)
    }

    pub async fn append_pending_request(
        &self,
        invitation_id: InvitationID,
        item: ConnectionRequestItem,
    ) -> Result<InvitationRecord, LedgerError> {
        let mut record = self.get_required(invitation_id).await?;
        if !record.append_pending(item, Utc::now()) {
            debug!(
                "[ledger:pending] request not appended to {} ({})",
                record.invitation_id(),
                record.status()
            );
            return Ok(record);
        }

        self.repo.save_record(record.clone()).await?;
        Ok(record)
    }

    pub async fn update_pending_request(
        &self,
        invitation_id: InvitationID,
        item_id: String,
        status: RequestStatus,
    ) -> Result<InvitationRecord, LedgerError> {
        let mut record = self.get_required(invitation_id).await?;
        if record.update_pending(&item_id, status, Utc::now()) {
            self.repo.save_record(record.clone()).await?;
        }

        Ok(record)
    }

    /// Every record, oldest first
    pub async fn list(&self) -> Result<Vec<InvitationRecord>, LedgerError> {
        let mut records = self.repo.list_records().await?;
        records.sort_by_key(|record| record.created_at());
        Ok(records)
    }

    /// Bulk deletes terminal records without any pending decision, returns the removed
    /// count
    pub async fn clear_terminal(&self) -> Result<usize, LedgerError> {
        let records = self.repo.list_records().await?;

        let mut removed = 0;
        for record in records.into_iter().filter(|record| record.is_clearable()) {
            self.repo.remove_record(record).await?;
            removed += 1;
        }

        info!("[ledger:clear] removed {} terminal record(s)", removed);
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use mockall::mock;

    use rst_common::standard::async_trait::async_trait;
    use rst_common::with_tokio::tokio;

    use crate::invitation::types::ConnectionRequestMessage;
    use crate::testutil::MemoryLedgerRepo;

    mock!(
        FakeRepo{}

        impl Clone for FakeRepo {
            fn clone(&self) -> Self;
        }

        #[async_trait]
        impl RepoBuilder for FakeRepo {
            async fn save_record(&self, record: InvitationRecord) -> Result<(), LedgerError>;
            async fn get_record(&self, id: String) -> Result<Option<InvitationRecord>, LedgerError>;
            async fn find_by_invitation_id(
                &self,
                invitation_id: InvitationID,
            ) -> Result<Option<InvitationRecord>, LedgerError>;
            async fn list_records(&self) -> Result<Vec<InvitationRecord>, LedgerError>;
            async fn remove_record(&self, record: InvitationRecord) -> Result<(), LedgerError>;
        }
    );

    fn invitee_record(id: &str) -> InvitationRecord {
        InvitationRecord::new(InvitationID::from(id), Side::Invitee, "acme".to_string())
    }

    fn inviter_record(id: &str) -> InvitationRecord {
        InvitationRecord::new(InvitationID::from(id), Side::Inviter, "alice".to_string())
    }

    fn request(label: &str) -> ConnectionRequestItem {
        ConnectionRequestItem::new(
            ConnectionRequestMessage::new(
                InvitationID::from("inv-1"),
                "did:peer:bob".to_string(),
                "did:peer:alice".to_string(),
                label.to_string(),
                vec![],
            ),
            None,
            1,
        ).unwrap()
    }

    mod expect_success {
        use super::*;

        #[tokio::test]
        async fn test_create_idempotent() {
            let ledger = Ledger::new(MemoryLedgerRepo::default());

            let (first, created) = ledger.create(invitee_record("inv-1")).await.unwrap();
            assert!(created);

            let (second, created) = ledger.create(invitee_record("inv-1")).await.unwrap();
            assert!(!created);
            assert_eq!(second.id(), first.id());
            assert_eq!(ledger.list().await.unwrap().len(), 1);
        }

        #[tokio::test]
        async fn test_invitee_lifecycle_monotonic() {
            let ledger = Ledger::new(MemoryLedgerRepo::default());
            let id = InvitationID::from("inv-1");
            ledger.create(invitee_record("inv-1")).await.unwrap();

            let steps = vec![
                (Status::InvitationPreviewed, true),
                (Status::InvitationPreviewed, false),
                (Status::ConnectionRequestSent, true),
                (Status::InvitationPreviewed, false),
                (Status::ConnectionEstablished, true),
                (Status::InvitationRejected, false),
            ];

            let mut observed = vec![Status::InvitationReceived];
            for (next, expected) in steps {
                let advance = ledger.advance(id.clone(), next).await.unwrap();
                assert_eq!(advance.is_advanced(), expected, "advance to {}", next);
                observed.push(advance.record().status());
            }

            let ranks: Vec<u8> = observed.iter().map(|status| status.rank()).collect();
            assert!(ranks.windows(2).all(|pair| pair[0] <= pair[1]));

            let record = ledger.get(id).await.unwrap().unwrap();
            assert_eq!(record.status(), Status::ConnectionEstablished);
            assert!(record.previewed_at().is_some());
            assert!(record.accepted_at().is_some());
            assert!(record.rejected_at().is_none());
        }

        #[tokio::test]
        async fn test_previewed_only_from_received() {
            let ledger = Ledger::new(MemoryLedgerRepo::default());
            let id = InvitationID::from("inv-1");
            ledger.create(invitee_record("inv-1")).await.unwrap();
            ledger.mark_request_sent(id.clone()).await.unwrap();

            let advance = ledger.mark_previewed(id).await.unwrap();
            assert!(!advance.is_advanced());
            assert_eq!(advance.record().status(), Status::ConnectionRequestSent);
            assert!(advance.record().previewed_at().is_none());
        }

        #[tokio::test]
        async fn test_mark_rejected_uses_own_side() {
            let ledger = Ledger::new(MemoryLedgerRepo::default());
            ledger.create(inviter_record("inv-a")).await.unwrap();
            ledger.create(invitee_record("inv-b")).await.unwrap();

            let inviter = ledger
                .mark_rejected(InvitationID::from("inv-a"))
                .await
                .unwrap();
            let invitee = ledger
                .mark_rejected(InvitationID::from("inv-b"))
                .await
                .unwrap();

            assert_eq!(inviter.record().status(), Status::Rejected);
            assert_eq!(invitee.record().status(), Status::InvitationRejected);
        }

        #[tokio::test]
        async fn test_pending_requests_do_not_resurrect() {
            let ledger = Ledger::new(MemoryLedgerRepo::default());
            let id = InvitationID::from("inv-1");
            ledger.create(inviter_record("inv-1")).await.unwrap();
            ledger.mark_rejected(id.clone()).await.unwrap();

            let record = ledger
                .append_pending_request(id, request("bob"))
                .await
                .unwrap();
            assert_eq!(record.status(), Status::Rejected);
            assert!(record.pending_requests().is_empty());
        }

        #[tokio::test]
        async fn test_pending_request_lifecycle() {
            let ledger = Ledger::new(MemoryLedgerRepo::default());
            let id = InvitationID::from("inv-1");
            ledger.create(inviter_record("inv-1")).await.unwrap();

            let item = request("bob");
            ledger
                .append_pending_request(id.clone(), item.clone())
                .await
                .unwrap();
            ledger.mark_connection_requested(id.clone()).await.unwrap();

            let record = ledger
                .update_pending_request(id, item.id(), RequestStatus::Accepted)
                .await
                .unwrap();
            assert_eq!(
                record.pending_requests()[0].status(),
                RequestStatus::Accepted
            );
        }

        #[tokio::test]
        async fn test_set_counterparty_once() {
            let ledger = Ledger::new(MemoryLedgerRepo::default());
            let id = InvitationID::from("inv-1");
            ledger.create(inviter_record("inv-1")).await.unwrap();

            ledger
                .set_counterparty(id.clone(), "did:peer:bob".to_string())
                .await
                .unwrap();
            let record = ledger
                .set_counterparty(id, "did:peer:mallory".to_string())
                .await
                .unwrap();
            assert_eq!(record.invitee_did(), Some("did:peer:bob".to_string()));
        }

        #[tokio::test]
        async fn test_clear_terminal() {
            let ledger = Ledger::new(MemoryLedgerRepo::default());
            ledger.create(inviter_record("done")).await.unwrap();
            ledger.create(inviter_record("waiting")).await.unwrap();
            ledger.create(invitee_record("open")).await.unwrap();

            ledger
                .append_pending_request(InvitationID::from("waiting"), request("bob"))
                .await
                .unwrap();
            ledger
                .mark_connected(InvitationID::from("done"))
                .await
                .unwrap();
            ledger
                .mark_connected(InvitationID::from("waiting"))
                .await
                .unwrap();

            assert_eq!(ledger.clear_terminal().await.unwrap(), 1);

            let remaining: Vec<String> = ledger
                .list()
                .await
                .unwrap()
                .iter()
                .map(|record| record.invitation_id().to_string())
                .collect();
            assert_eq!(remaining.len(), 2);
            assert!(!remaining.contains(&"done".to_string()));
        }
    }

    mod expect_errors {
        use super::*;

        #[tokio::test]
        async fn test_advance_unknown_invitation() {
            let ledger = Ledger::new(MemoryLedgerRepo::default());
            let result = ledger
                .mark_previewed(InvitationID::from("missing"))
                .await;
            assert!(matches!(result, Err(LedgerError::NotFound(_))));
        }

        #[tokio::test]
        async fn test_advance_other_side_status() {
            let ledger = Ledger::new(MemoryLedgerRepo::default());
            ledger.create(invitee_record("inv-1")).await.unwrap();

            let result = ledger.mark_connected(InvitationID::from("inv-1")).await;
            assert!(matches!(result, Err(LedgerError::InvalidTransition(_))));
        }

        #[tokio::test]
        async fn test_create_repo_error() {
            let mut repo = MockFakeRepo::new();
            repo.expect_find_by_invitation_id()
                .times(1)
                .returning(|_| Ok(None));
            repo.expect_save_record()
                .times(1)
                .returning(|_| Err(LedgerError::RepoError("unavailable".to_string())));

            let ledger = Ledger::new(repo);
            let result = ledger.create(invitee_record("inv-1")).await;
            assert!(matches!(result, Err(LedgerError::RepoError(_))));
        }
    }
}
