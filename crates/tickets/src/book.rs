// In crates/tickets/src/book.rs

use crate::lifecycle::{apply, Transition};
use crate::shortcode::{code_for, new_ticket_id};
use crate::{Error, Result};
use app_config::types::TicketSettings;
use chrono::Utc;
use core_types::{NewTicket, Ticket};
use rust_decimal::Decimal;
use std::sync::Arc;
use store::{get_json, keys, set_json, KvStore};

type IdSource = Arc<dyn Fn() -> String + Send + Sync>;

/// The only writer of ticket records.
///
/// Every operation is a full read-modify-write against the store. Two
/// replies racing on the same ticket both succeed and the later write wins.
#[derive(Clone)]
pub struct TicketBook {
    store: Arc<dyn KvStore>,
    code_collision_retries: u32,
    next_id: IdSource,
}

impl TicketBook {
    pub fn new(store: Arc<dyn KvStore>, settings: &TicketSettings) -> Self {
        Self {
            store,
            code_collision_retries: settings.code_collision_retries,
            next_id: Arc::new(new_ticket_id),
        }
    }

    /// Replaces the id generator. Ids must stay unique.
    pub fn with_id_source<F>(mut self, next_id: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        self.next_id = Arc::new(next_id);
        self
    }

    /// Opens a `PENDING` ticket and indexes its code.
    ///
    /// The record and the index are two writes. If the index write fails the
    /// record is deleted again, so a ticket never exists without its code.
    pub async fn create(&self, fields: NewTicket) -> Result<Ticket> {
        let (id, code) = self.allocate_code().await?;
        let ticket = Ticket::open(id, code, fields, Utc::now());

        set_json(self.store.as_ref(), &keys::ticket(&ticket.id), &ticket).await?;

        if let Err(source) = self.store.set(&keys::code(&ticket.code), &ticket.id).await {
            tracing::error!(id = %ticket.id, code = %ticket.code, error = %source, "Failed to index ticket code. Removing ticket.");
            if let Err(e) = self.store.delete(&keys::ticket(&ticket.id)).await {
                tracing::error!(id = %ticket.id, error = %e, "Failed to remove unindexed ticket; record is orphaned.");
            }
            return Err(Error::CodeIndex { id: ticket.id, code: ticket.code, source });
        }

        tracing::info!(id = %ticket.id, code = %ticket.code, symbol = %ticket.symbol, qty = ticket.qty, "Ticket opened.");
        Ok(ticket)
    }

    pub async fn load(&self, id: &str) -> Result<Option<Ticket>> {
        Ok(get_json(self.store.as_ref(), &keys::ticket(id)).await?)
    }

    /// Resolves a reply code to its ticket id.
    pub async fn id_for_code(&self, code: &str) -> Result<Option<String>> {
        Ok(self.store.get(&keys::code(&code.to_uppercase())).await?)
    }

    /// Resolves a reply code straight to its ticket.
    pub async fn find_by_code(&self, code: &str) -> Result<Option<Ticket>> {
        match self.id_for_code(code).await? {
            Some(id) => self.load(&id).await,
            None => Ok(None),
        }
    }

    pub async fn cancel(&self, id: &str) -> Result<Ticket> {
        self.transition(id, Transition::Cancel).await
    }

    pub async fn set_qty(&self, id: &str, qty: i64) -> Result<Ticket> {
        self.transition(id, Transition::SetQty(qty)).await
    }

    pub async fn set_stop(&self, id: &str, stop: Decimal) -> Result<Ticket> {
        self.transition(id, Transition::SetStop(stop)).await
    }

    pub async fn confirm_for_instruction(&self, id: &str) -> Result<Ticket> {
        self.transition(id, Transition::ConfirmForInstruction).await
    }

    async fn transition(&self, id: &str, transition: Transition) -> Result<Ticket> {
        let current = self.load(id).await?.ok_or_else(|| Error::NotFound(id.to_string()))?;
        let next = apply(&current, transition)?;
        set_json(self.store.as_ref(), &keys::ticket(id), &next).await?;

        tracing::info!(
            id,
            code = %next.code,
            transition = transition.name(),
            status = %next.status,
            qty = next.qty,
            stop = %next.stop,
            "Ticket updated."
        );
        Ok(next)
    }

    /// Picks an unused id whose code is not held by another pending ticket.
    ///
    /// An id that already has a record is always re-rolled. When code
    /// re-rolls run out, the last unused id keeps its shared code.
    async fn allocate_code(&self) -> Result<(String, String)> {
        let mut fallback = None;
        let mut taken = String::new();

        for attempt in 0..=self.code_collision_retries {
            let id = (self.next_id)();
            let code = code_for(&id);

            if self.store.get(&keys::ticket(&id)).await?.is_some() {
                tracing::warn!(id = %id, attempt, "Ticket id already in use. Re-rolling id.");
                taken = id;
                continue;
            }

            let holder = match self.id_for_code(&code).await? {
                Some(holder) => holder,
                None => return Ok((id, code)),
            };
            match self.load(&holder).await? {
                Some(existing) if existing.is_pending() => {
                    tracing::warn!(code = %code, holder = %holder, attempt, "Short code held by a pending ticket. Re-rolling id.");
                    fallback = Some((id, code));
                }
                _ => return Ok((id, code)),
            }
        }

        match fallback {
            Some((id, code)) => {
                if self.code_collision_retries > 0 {
                    tracing::warn!(code = %code, "Short code re-rolls exhausted. Code may be shared with a pending ticket.");
                }
                Ok((id, code))
            }
            None => Err(Error::IdInUse(taken)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use core_types::TicketStatus;
    use rust_decimal_macros::dec;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use store::MemoryStore;

    fn fields() -> NewTicket {
        NewTicket {
            symbol: "ES".into(),
            side: "LONG".into(),
            entry: dec!(4500),
            stop: dec!(100.0),
            qty: 2,
            risk_per_contract: dec!(250),
            timeframe: "5".into(),
            strategy: "orb".into(),
            note: String::new(),
        }
    }

    fn book(store: Arc<dyn KvStore>, retries: u32) -> TicketBook {
        TicketBook::new(store, &TicketSettings { code_collision_retries: retries })
    }

    fn scripted(ids: &[&str]) -> impl Fn() -> String + Send + Sync + 'static {
        let queue = Mutex::new(ids.iter().map(|s| s.to_string()).collect::<VecDeque<_>>());
        move || queue.lock().unwrap().pop_front().expect("ran out of scripted ids")
    }

    #[tokio::test]
    async fn create_writes_ticket_and_code_index() {
        let store = Arc::new(MemoryStore::new());
        let book = book(store.clone(), 8).with_id_source(scripted(&["A1B2C3D4"]));

        let ticket = book.create(fields()).await.unwrap();

        assert_eq!(ticket.id, "A1B2C3D4");
        assert_eq!(ticket.code, "764");
        assert_eq!(ticket.status, TicketStatus::Pending);
        assert_eq!(book.id_for_code("764").await.unwrap().as_deref(), Some("A1B2C3D4"));
        assert_eq!(book.find_by_code("764").await.unwrap(), Some(ticket));
    }

    #[tokio::test]
    async fn adjust_then_read_back() {
        let store = Arc::new(MemoryStore::new());
        let book = book(store, 8);
        let ticket = book.create(fields()).await.unwrap();

        book.set_qty(&ticket.id, 3).await.unwrap();
        let updated = book.set_stop(&ticket.id, dec!(101.25)).await.unwrap();

        assert_eq!(updated.qty, 3);
        assert_eq!(updated.stop, dec!(101.25));
        assert_eq!(updated.status, TicketStatus::Pending);
        assert_eq!(book.load(&ticket.id).await.unwrap(), Some(updated));
    }

    #[tokio::test]
    async fn resolved_ticket_is_left_untouched() {
        let store = Arc::new(MemoryStore::new());
        let book = book(store, 8);
        let ticket = book.create(fields()).await.unwrap();
        let cancelled = book.cancel(&ticket.id).await.unwrap();

        let err = book.confirm_for_instruction(&ticket.id).await.unwrap_err();
        assert!(matches!(err, Error::AlreadyResolved(TicketStatus::Cancelled)));
        let err = book.set_qty(&ticket.id, 9).await.unwrap_err();
        assert!(matches!(err, Error::AlreadyResolved(TicketStatus::Cancelled)));

        assert_eq!(book.load(&ticket.id).await.unwrap(), Some(cancelled));
    }

    #[tokio::test]
    async fn invalid_quantity_does_not_write() {
        let store = Arc::new(MemoryStore::new());
        let book = book(store, 8);
        let ticket = book.create(fields()).await.unwrap();

        assert!(matches!(book.set_qty(&ticket.id, 0).await, Err(Error::InvalidQuantity(0))));
        assert_eq!(book.load(&ticket.id).await.unwrap().unwrap().qty, 2);
    }

    #[tokio::test]
    async fn missing_ticket_is_not_found() {
        let book = book(Arc::new(MemoryStore::new()), 8);
        assert!(matches!(book.cancel("DEADBEEF").await, Err(Error::NotFound(id)) if id == "DEADBEEF"));
        assert_eq!(book.find_by_code("ABC").await.unwrap(), None);
    }

    #[tokio::test]
    async fn pending_code_holder_forces_a_reroll() {
        let store = Arc::new(MemoryStore::new());
        // AAAA0001 -> D91, AAAA0002 -> 234
        let first = book(store.clone(), 8).with_id_source(scripted(&["AAAA0001"]));
        let held = first.create(fields()).await.unwrap();
        assert_eq!(held.code, "D91");

        // A different id that happens to map to the same code.
        store.set(&keys::code("01A"), "AAAA0001").await.unwrap();
        let second = book(store.clone(), 8).with_id_source(scripted(&["AAAA0003", "AAAA0002"]));
        let ticket = second.create(fields()).await.unwrap();
        assert_eq!(ticket.id, "AAAA0002");
        assert_eq!(ticket.code, "234");
        assert_eq!(second.id_for_code("01A").await.unwrap().as_deref(), Some("AAAA0001"));
        assert_eq!(second.load("AAAA0003").await.unwrap(), None);
    }

    #[tokio::test]
    async fn repeated_id_never_overwrites_a_ticket() {
        let store = Arc::new(MemoryStore::new());
        let book = book(store.clone(), 8).with_id_source(scripted(&["AAAA0001", "AAAA0001", "AAAA0002"]));
        let first = book.create(fields()).await.unwrap();

        let second = book.create(NewTicket { qty: 5, ..fields() }).await.unwrap();

        assert_eq!(second.id, "AAAA0002");
        assert_eq!(book.load("AAAA0001").await.unwrap(), Some(first));
        assert_eq!(book.id_for_code("D91").await.unwrap().as_deref(), Some("AAAA0001"));
    }

    #[tokio::test]
    async fn repeated_id_without_retries_is_refused() {
        let store = Arc::new(MemoryStore::new());
        let book = book(store.clone(), 0).with_id_source(scripted(&["AAAA0001", "AAAA0001"]));
        let first = book.create(fields()).await.unwrap();

        let err = book.create(NewTicket { qty: 5, ..fields() }).await.unwrap_err();

        assert!(matches!(err, Error::IdInUse(ref id) if id == "AAAA0001"));
        assert_eq!(book.load("AAAA0001").await.unwrap(), Some(first));
    }

    #[tokio::test]
    async fn resolved_code_holder_is_reused() {
        let store = Arc::new(MemoryStore::new());
        let first = book(store.clone(), 8).with_id_source(scripted(&["AAAA0001"]));
        let old = first.create(fields()).await.unwrap();
        first.cancel(&old.id).await.unwrap();

        // A different id that happens to map to the same code.
        store.set(&keys::code("01A"), "AAAA0001").await.unwrap();
        let second = book(store.clone(), 8).with_id_source(scripted(&["AAAA0003"]));
        let ticket = second.create(fields()).await.unwrap();

        assert_eq!(ticket.code, "01A");
        assert_eq!(second.id_for_code("01A").await.unwrap().as_deref(), Some("AAAA0003"));
    }

    #[tokio::test]
    async fn zero_retries_keeps_the_first_code() {
        let store = Arc::new(MemoryStore::new());
        let first = book(store.clone(), 0).with_id_source(scripted(&["AAAA0001"]));
        first.create(fields()).await.unwrap();

        store.set(&keys::code("01A"), "AAAA0001").await.unwrap();
        let second = book(store.clone(), 0).with_id_source(scripted(&["AAAA0003"]));
        let ticket = second.create(fields()).await.unwrap();
        assert_eq!(ticket.id, "AAAA0003");
        assert_eq!(ticket.code, "01A");
    }

    /// A store that refuses writes to code index keys.
    struct IndexOutage(MemoryStore);

    #[async_trait]
    impl KvStore for IndexOutage {
        fn name(&self) -> &'static str {
            "IndexOutage"
        }

        async fn get(&self, key: &str) -> store::Result<Option<String>> {
            self.0.get(key).await
        }

        async fn set(&self, key: &str, value: &str) -> store::Result<()> {
            if key.starts_with("code:") {
                return Err(store::Error::Backend("connection reset".into()));
            }
            self.0.set(key, value).await
        }

        async fn delete(&self, key: &str) -> store::Result<()> {
            self.0.delete(key).await
        }
    }

    #[tokio::test]
    async fn failed_index_write_removes_the_ticket() {
        let store = Arc::new(IndexOutage(MemoryStore::new()));
        let book = book(store.clone(), 8).with_id_source(scripted(&["A1B2C3D4"]));

        let err = book.create(fields()).await.unwrap_err();

        assert!(matches!(err, Error::CodeIndex { ref code, .. } if code == "764"));
        assert!(store.0.is_empty().await);
    }
}
