use crate::domain::actor::Actor;
use crate::domain::fee_entry::{EntryId, FeeEntry, FeeEntryDraft};
use crate::domain::money::Money;
use crate::domain::payment::PaymentStatus;
use crate::domain::policy;
use crate::domain::ports::{ClockBox, FeeEntryStoreBox};
use crate::error::{FeeError, Result};
use crate::infrastructure::clock::SystemClock;
use tracing::{debug, info, warn};

/// A requested manual change to one entry's payment status.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusAction {
    Confirm(EntryId),
    Unconfirm(EntryId),
    Set(EntryId, PaymentStatus),
}

impl StatusAction {
    pub fn entry_id(&self) -> &EntryId {
        match self {
            StatusAction::Confirm(id)
            | StatusAction::Unconfirm(id)
            | StatusAction::Set(id, _) => id,
        }
    }
}

/// Count and amount of the entries sharing one effective status.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusSummary {
    pub status: PaymentStatus,
    pub entries: usize,
    pub total_fee: Money,
}

/// Owns the payment status lifecycle of fee entries.
///
/// Every transition is checked against the actor's role before anything is
/// read, applied to a copy of the stored entry, and written back with a
/// conditional update keyed on the status that was read. The store stays the
/// single source of truth: callers get the persisted entry back, and on any
/// error the stored entry keeps its prior state.
pub struct PaymentStatusEngine {
    store: FeeEntryStoreBox,
    clock: ClockBox,
}

impl PaymentStatusEngine {
    /// Creates an engine stamping confirmations with the system clock.
    pub fn new(store: FeeEntryStoreBox) -> Self {
        Self::with_clock(store, Box::new(SystemClock))
    }

    pub fn with_clock(store: FeeEntryStoreBox, clock: ClockBox) -> Self {
        Self { store, clock }
    }

    /// Records a new entry in the status its payment type implies.
    ///
    /// Any authenticated actor may record an entry; residents log their own
    /// payments.
    pub async fn record_entry(&self, actor: &Actor, draft: FeeEntryDraft) -> Result<FeeEntry> {
        let entry = draft.into_entry(&actor.id, self.clock.now())?;
        let entry = self.store.create(entry).await?;
        info!(
            entry = %entry.id,
            payment_type = %entry.payment_type,
            status = %entry.effective_status(),
            created_by = %actor.id,
            "fee entry recorded"
        );
        Ok(entry)
    }

    pub async fn effective_status(&self, id: &EntryId) -> Result<PaymentStatus> {
        Ok(self.fetch(id).await?.effective_status())
    }

    /// Confirms receipt of the payment.
    ///
    /// Confirming an entry that is already `success` returns it unchanged and
    /// writes nothing, so the original `confirmed_at` survives.
    pub async fn confirm(&self, actor: &Actor, id: &EntryId) -> Result<FeeEntry> {
        authorize(actor, "confirm")?;
        let current = self.fetch(id).await?;
        if current.effective_status() == PaymentStatus::Success {
            debug!(entry = %id, actor = %actor.id, "payment already confirmed");
            return Ok(current);
        }

        let mut next = current.clone();
        next.confirm(&actor.id, self.clock.now());
        self.persist(actor, &current, next).await
    }

    /// Sends a confirmed payment back to `pending` and clears who confirmed it.
    /// An entry that is not confirmed is returned unchanged.
    pub async fn unconfirm(&self, actor: &Actor, id: &EntryId) -> Result<FeeEntry> {
        authorize(actor, "unconfirm")?;
        let current = self.fetch(id).await?;
        if !current.is_confirmed() {
            debug!(entry = %id, actor = %actor.id, "payment not confirmed, nothing to undo");
            return Ok(current);
        }

        let mut next = current.clone();
        next.unconfirm();
        self.persist(actor, &current, next).await
    }

    /// Moves the entry to any of the four statuses.
    pub async fn set_status(
        &self,
        actor: &Actor,
        id: &EntryId,
        status: PaymentStatus,
    ) -> Result<FeeEntry> {
        authorize(actor, "set_status")?;
        let current = self.fetch(id).await?;

        let mut next = current.clone();
        next.set_status(status, &actor.id, self.clock.now());
        self.persist(actor, &current, next).await
    }

    pub async fn apply(&self, actor: &Actor, action: StatusAction) -> Result<FeeEntry> {
        match action {
            StatusAction::Confirm(id) => self.confirm(actor, &id).await,
            StatusAction::Unconfirm(id) => self.unconfirm(actor, &id).await,
            StatusAction::Set(id, status) => self.set_status(actor, &id, status).await,
        }
    }

    /// Removes an entry. Restricted to the same roles that may change statuses.
    pub async fn delete_entry(&self, actor: &Actor, id: &EntryId) -> Result<()> {
        authorize(actor, "delete")?;
        if !self.store.delete(id).await? {
            return Err(FeeError::NotFound(id.clone()));
        }
        info!(entry = %id, actor = %actor.id, "fee entry deleted");
        Ok(())
    }

    /// Every entry, ordered by id.
    pub async fn ledger(&self) -> Result<Vec<FeeEntry>> {
        let mut entries = self.store.get_all().await?;
        entries.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(entries)
    }

    pub async fn entries_with_status(&self, status: PaymentStatus) -> Result<Vec<FeeEntry>> {
        let mut entries = self.ledger().await?;
        entries.retain(|entry| entry.effective_status() == status);
        Ok(entries)
    }

    /// Entries still waiting for an admin to confirm the payment.
    pub async fn pending_confirmations(&self) -> Result<Vec<FeeEntry>> {
        self.entries_with_status(PaymentStatus::Pending).await
    }

    /// Totals per effective status, in `PaymentStatus::ALL` order.
    pub async fn summary(&self) -> Result<Vec<StatusSummary>> {
        let entries = self.store.get_all().await?;
        PaymentStatus::ALL
            .into_iter()
            .map(|status| -> Result<StatusSummary> {
                let matching = entries
                    .iter()
                    .filter(|entry| entry.effective_status() == status);
                Ok(StatusSummary {
                    status,
                    entries: matching.clone().count(),
                    total_fee: Money::sum(matching.map(|entry| entry.total_fee))?,
                })
            })
            .collect()
    }

    async fn fetch(&self, id: &EntryId) -> Result<FeeEntry> {
        self.store
            .get_by_id(id)
            .await?
            .ok_or_else(|| FeeError::NotFound(id.clone()))
    }

    async fn persist(&self, actor: &Actor, current: &FeeEntry, next: FeeEntry) -> Result<FeeEntry> {
        let stored = self
            .store
            .update_status(&current.id, current.status, next.status_patch())
            .await?;
        info!(
            entry = %stored.id,
            actor = %actor.id,
            from = %current.effective_status(),
            to = %stored.effective_status(),
            "payment status changed"
        );
        Ok(stored)
    }
}

fn authorize(actor: &Actor, operation: &'static str) -> Result<()> {
    if policy::can_transition(&actor.role) {
        return Ok(());
    }
    warn!(actor = %actor.id, role = %actor.role, operation, "payment status change denied");
    Err(FeeError::PermissionDenied(actor.role.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::actor::{ActorId, Role};
    use crate::domain::money::LineItem;
    use crate::domain::month::Month;
    use crate::domain::payment::PaymentType;
    use crate::domain::ports::FeeEntryStore;
    use crate::infrastructure::clock::FixedClock;
    use crate::infrastructure::in_memory::InMemoryFeeEntryStore;
    use chrono::{DateTime, TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn jan(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap()
    }

    fn engine_at(day: u32) -> (PaymentStatusEngine, InMemoryFeeEntryStore) {
        let store = InMemoryFeeEntryStore::new();
        let engine = PaymentStatusEngine::with_clock(
            Box::new(store.clone()),
            Box::new(FixedClock(jan(day))),
        );
        (engine, store)
    }

    fn draft(
        id: &str,
        payment_type: &str,
        unit: rust_decimal::Decimal,
        months: Vec<Month>,
    ) -> FeeEntryDraft {
        FeeEntryDraft {
            id: EntryId::from(id),
            member: "Asha Rao".to_string(),
            flat: "A-101".to_string(),
            block: "A".to_string(),
            line_items: vec![LineItem::new(
                "Maintenance",
                Money::new(unit).unwrap(),
                months.len() as u32,
            )],
            months,
            payment_type: PaymentType::from(payment_type),
            remarks: None,
        }
    }

    fn resident() -> Actor {
        Actor::new("res1", Role::Resident)
    }

    fn manager() -> Actor {
        Actor::new("mgr1", Role::BlockManager)
    }

    #[tokio::test]
    async fn test_record_upi_entry_is_auto_confirmed() {
        let (engine, _) = engine_at(1);
        let entry = engine
            .record_entry(&resident(), draft("e1", "UPI", dec!(500), vec![Month::March]))
            .await
            .unwrap();

        assert_eq!(entry.total_fee, Money::new(dec!(500)).unwrap());
        assert_eq!(entry.status, Some(PaymentStatus::Success));
        assert!(entry.payment_confirmed);
    }

    #[tokio::test]
    async fn test_cash_entry_confirmed_by_block_manager() {
        let (engine, _) = engine_at(5);
        let id = EntryId::from("e1");
        let entry = engine
            .record_entry(
                &resident(),
                draft("e1", "Cash", dec!(600), vec![Month::January, Month::February]),
            )
            .await
            .unwrap();
        assert_eq!(entry.total_fee, Money::new(dec!(1200)).unwrap());
        assert_eq!(entry.status, Some(PaymentStatus::Pending));

        let confirmed = engine.confirm(&manager(), &id).await.unwrap();
        assert_eq!(confirmed.status, Some(PaymentStatus::Success));
        assert!(confirmed.payment_confirmed);
        assert_eq!(confirmed.confirmed_by, Some(ActorId::from("mgr1")));
        assert_eq!(confirmed.confirmed_at, Some(jan(5)));
        assert_eq!(engine.effective_status(&id).await.unwrap(), PaymentStatus::Success);
    }

    #[tokio::test]
    async fn test_reconfirm_keeps_original_timestamp() {
        let store = InMemoryFeeEntryStore::new();
        let first =
            PaymentStatusEngine::with_clock(Box::new(store.clone()), Box::new(FixedClock(jan(5))));
        let id = EntryId::from("e1");
        first
            .record_entry(&resident(), draft("e1", "Cash", dec!(100), vec![Month::May]))
            .await
            .unwrap();
        first.confirm(&manager(), &id).await.unwrap();

        let later =
            PaymentStatusEngine::with_clock(Box::new(store.clone()), Box::new(FixedClock(jan(20))));
        let again = later
            .confirm(&Actor::new("admin2", Role::ColonyAdmin), &id)
            .await
            .unwrap();
        assert_eq!(again.confirmed_at, Some(jan(5)));
        assert_eq!(again.confirmed_by, Some(ActorId::from("mgr1")));
    }

    #[tokio::test]
    async fn test_unconfirm_clears_confirmation() {
        let (engine, _) = engine_at(5);
        let id = EntryId::from("e1");
        engine
            .record_entry(&resident(), draft("e1", "Request Payment", dec!(250), vec![Month::July]))
            .await
            .unwrap();
        engine.confirm(&manager(), &id).await.unwrap();

        let entry = engine.unconfirm(&manager(), &id).await.unwrap();
        assert_eq!(entry.status, Some(PaymentStatus::Pending));
        assert!(!entry.payment_confirmed);
        assert_eq!(entry.confirmed_by, None);
        assert_eq!(entry.confirmed_at, None);
    }

    #[tokio::test]
    async fn test_unconfirm_of_pending_is_noop() {
        let (engine, store) = engine_at(5);
        let id = EntryId::from("e1");
        let recorded = engine
            .record_entry(&resident(), draft("e1", "Cash", dec!(250), vec![Month::July]))
            .await
            .unwrap();

        let entry = engine.unconfirm(&manager(), &id).await.unwrap();
        assert_eq!(entry, recorded);
        assert_eq!(store.get_by_id(&id).await.unwrap().unwrap(), recorded);
    }

    #[tokio::test]
    async fn test_resident_cannot_change_status() {
        let (engine, store) = engine_at(5);
        let id = EntryId::from("e1");
        let before = engine
            .record_entry(&resident(), draft("e1", "Card", dec!(900), vec![Month::June]))
            .await
            .unwrap();

        let refund = engine.set_status(&resident(), &id, PaymentStatus::Refunded).await;
        assert!(matches!(refund, Err(FeeError::PermissionDenied(Role::Resident))));
        assert!(matches!(
            engine.unconfirm(&resident(), &id).await,
            Err(FeeError::PermissionDenied(_))
        ));
        assert!(matches!(
            engine.confirm(&resident(), &id).await,
            Err(FeeError::PermissionDenied(_))
        ));

        assert_eq!(store.get_by_id(&id).await.unwrap().unwrap(), before);
    }

    #[tokio::test]
    async fn test_permission_checked_before_lookup() {
        let (engine, _) = engine_at(5);
        let result = engine
            .confirm(&Actor::new("x", Role::from("auditor")), &EntryId::from("missing"))
            .await;
        assert!(matches!(result, Err(FeeError::PermissionDenied(_))));
    }

    #[tokio::test]
    async fn test_missing_entry_is_not_found() {
        let (engine, _) = engine_at(5);
        let result = engine.confirm(&manager(), &EntryId::from("missing")).await;
        assert!(matches!(result, Err(FeeError::NotFound(id)) if id == EntryId::from("missing")));
    }

    #[tokio::test]
    async fn test_failed_preserves_audit_trail() {
        let (engine, store) = engine_at(9);
        let id = EntryId::from("e1");
        let mut entry = draft("e1", "Cash", dec!(100), vec![Month::January])
            .into_entry(&ActorId::from("res1"), jan(1))
            .unwrap();
        entry.confirm(&ActorId::from("mgr1"), jan(5));
        store.create(entry).await.unwrap();

        let admin = Actor::new("admin1", Role::ColonyAdmin);
        let failed = engine.set_status(&admin, &id, PaymentStatus::Failed).await.unwrap();
        assert_eq!(failed.status, Some(PaymentStatus::Failed));
        assert!(!failed.payment_confirmed);
        assert_eq!(failed.confirmed_by, Some(ActorId::from("mgr1")));
        assert_eq!(failed.confirmed_at, Some(jan(5)));
    }

    #[tokio::test]
    async fn test_delete_entry_requires_admin_tier() {
        let (engine, _) = engine_at(1);
        let id = EntryId::from("e1");
        engine
            .record_entry(&resident(), draft("e1", "UPI", dec!(10), vec![Month::April]))
            .await
            .unwrap();

        assert!(matches!(
            engine.delete_entry(&resident(), &id).await,
            Err(FeeError::PermissionDenied(_))
        ));
        engine
            .delete_entry(&Actor::new("root", Role::SuperAdmin), &id)
            .await
            .unwrap();
        assert!(matches!(
            engine.delete_entry(&manager(), &id).await,
            Err(FeeError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_queue_and_summary() {
        let (engine, _) = engine_at(1);
        engine
            .record_entry(&resident(), draft("e3", "Cash", dec!(100), vec![Month::May]))
            .await
            .unwrap();
        engine
            .record_entry(&resident(), draft("e1", "UPI", dec!(500), vec![Month::May]))
            .await
            .unwrap();
        engine
            .record_entry(
                &resident(),
                draft("e2", "Cash", dec!(200), vec![Month::May, Month::June]),
            )
            .await
            .unwrap();

        let queue = engine.pending_confirmations().await.unwrap();
        let ids: Vec<&str> = queue.iter().map(|e| e.id.0.as_str()).collect();
        assert_eq!(ids, vec!["e2", "e3"]);

        let summary = engine.summary().await.unwrap();
        assert_eq!(summary.len(), 4);
        assert_eq!(summary[0].status, PaymentStatus::Pending);
        assert_eq!(summary[0].entries, 2);
        assert_eq!(summary[0].total_fee, Money::new(dec!(500)).unwrap());
        assert_eq!(summary[1].entries, 1);
        assert_eq!(summary[1].total_fee, Money::new(dec!(500)).unwrap());
        assert_eq!(summary[2].entries, 0);
        assert_eq!(summary[3].total_fee, Money::ZERO);
    }

    #[tokio::test]
    async fn test_summary_reports_overflowing_totals() {
        let (engine, store) = engine_at(1);
        for id in ["e1", "e2"] {
            let mut entry = draft(id, "UPI", dec!(1), vec![Month::May])
                .into_entry(&ActorId::from("res1"), jan(1))
                .unwrap();
            entry.total_fee = Money::new(rust_decimal::Decimal::MAX).unwrap();
            store.create(entry).await.unwrap();
        }

        assert!(matches!(
            engine.summary().await,
            Err(FeeError::ValidationError(msg)) if msg == "fee total overflows"
        ));
    }

    #[test]
    fn test_action_entry_id() {
        let action = StatusAction::Set(EntryId::from("e9"), PaymentStatus::Failed);
        assert_eq!(action.entry_id(), &EntryId::from("e9"));
    }
}
