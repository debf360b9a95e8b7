//! Booking store.

use std::sync::Arc;

use homefix::{
    bookings::{
        Booking, BookingDraft, BookingId, BookingStatus, StoredBookings, parse_stored_bookings,
        provider_earnings, sort_by_date_desc,
    },
    catalog::ProviderId,
    profiles::UserId,
};
use jiff::Timestamp;
use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{
    domain::bookings::errors::BookingsError,
    gateway::{Collection, GatewayError, Query, RemoteGateway, decode_rows, records::BookingRow},
    storage::{LocalStorage, keys},
};

/// Bookings known to this device, persisted durably after every change.
#[derive(Debug)]
pub struct BookingStore {
    storage: Arc<LocalStorage>,
    bookings: Mutex<Vec<Booking>>,
}

impl BookingStore {
    /// Load persisted bookings.
    #[must_use]
    pub fn load(storage: Arc<LocalStorage>) -> Self {
        let store = Self {
            storage,
            bookings: Mutex::default(),
        };

        store.reload();
        store
    }

    /// Re-read persisted bookings, replacing what is in memory.
    ///
    /// Records missing a required field are dropped one by one; a value
    /// that is not a list at all is discarded. Returns how many loaded.
    pub fn reload(&self) -> usize {
        let records: Vec<Value> = self
            .storage
            .read_durable(keys::BOOKINGS)
            .unwrap_or_default();

        let StoredBookings { bookings, dropped } = parse_stored_bookings(records);

        if dropped > 0 {
            warn!(dropped, "dropped malformed stored bookings");
        }

        let loaded = bookings.len();
        *self.bookings.lock() = bookings;

        debug!(loaded, "loaded bookings");

        loaded
    }

    /// Add a booking, assigning a local id when it has none.
    ///
    /// A booking whose id is already known replaces the existing one. The
    /// booking stays in memory even if it cannot be persisted.
    pub fn add(&self, draft: impl Into<BookingDraft>) -> Booking {
        let mut bookings = self.bookings.lock();
        let booking = upsert(&mut bookings, draft.into());

        self.persist(&bookings);

        booking
    }

    /// Add a booking only if it can be persisted.
    ///
    /// # Errors
    ///
    /// Returns [`BookingsError::NotPersisted`] when the durable write fails;
    /// the store is left as it was.
    pub fn try_add(&self, draft: impl Into<BookingDraft>) -> Result<Booking, BookingsError> {
        let mut bookings = self.bookings.lock();
        let previous = bookings.clone();
        let booking = upsert(&mut bookings, draft.into());

        if self.persist(&bookings) {
            Ok(booking)
        } else {
            *bookings = previous;
            Err(BookingsError::NotPersisted(booking.id))
        }
    }

    /// Cancel a pending or confirmed booking.
    ///
    /// # Errors
    ///
    /// Returns an error when the id is unknown or the booking has already
    /// completed or been cancelled.
    pub fn cancel(&self, id: &BookingId) -> Result<Booking, BookingsError> {
        self.transition(id, BookingStatus::Cancelled)
    }

    /// Confirm a pending booking.
    ///
    /// # Errors
    ///
    /// Returns an error when the id is unknown or the booking is not pending.
    pub fn confirm(&self, id: &BookingId) -> Result<Booking, BookingsError> {
        self.transition(id, BookingStatus::Confirmed)
    }

    /// Mark a confirmed booking as done.
    ///
    /// # Errors
    ///
    /// Returns an error when the id is unknown or the booking is not
    /// confirmed.
    pub fn complete(&self, id: &BookingId) -> Result<Booking, BookingsError> {
        self.transition(id, BookingStatus::Completed)
    }

    /// One booking by id.
    pub fn get(&self, id: &BookingId) -> Option<Booking> {
        self.bookings
            .lock()
            .iter()
            .find(|booking| &booking.id == id)
            .cloned()
    }

    /// Every booking, newest service date first.
    pub fn bookings(&self) -> Vec<Booking> {
        self.bookings.lock().clone()
    }

    /// Bookings of one customer, matching the id case-insensitively.
    pub fn by_user(&self, user: &UserId) -> Vec<Booking> {
        self.bookings
            .lock()
            .iter()
            .filter(|booking| booking.user_id.eq_ignore_case(user))
            .cloned()
            .collect()
    }

    /// Bookings assigned to one provider.
    pub fn by_provider(&self, provider: &ProviderId) -> Vec<Booking> {
        self.bookings
            .lock()
            .iter()
            .filter(|booking| &booking.provider_id == provider)
            .cloned()
            .collect()
    }

    /// Price plus tip over a provider's completed bookings.
    pub fn provider_earnings(&self, provider: &ProviderId) -> u64 {
        provider_earnings(self.bookings.lock().iter(), provider)
    }

    /// Forget every booking, in memory and on disk.
    pub fn clear(&self) {
        self.bookings.lock().clear();
        self.storage.remove_durable(keys::BOOKINGS);
    }

    /// Merge bookings fetched from the backend, upserting by id.
    ///
    /// Display fields and the address snapshot exist only locally, so they
    /// are kept when the remote copy lacks them. Returns how many merged.
    pub fn merge_remote(&self, remote: Vec<Booking>) -> usize {
        let mut bookings = self.bookings.lock();
        let merged = remote.len();

        for mut incoming in remote {
            match bookings.iter_mut().find(|booking| booking.id == incoming.id) {
                Some(existing) => {
                    incoming.service_name = incoming.service_name.or(existing.service_name.take());
                    incoming.provider_name =
                        incoming.provider_name.or(existing.provider_name.take());
                    incoming.service_image =
                        incoming.service_image.or(existing.service_image.take());
                    incoming.address = incoming.address.or(existing.address.take());
                    *existing = incoming;
                }
                None => bookings.push(incoming),
            }
        }

        sort_by_date_desc(&mut bookings);
        self.persist(&bookings);

        merged
    }

    /// Fetch the signed-in user's bookings and merge them in.
    ///
    /// # Errors
    ///
    /// Returns the gateway error when there is no session or the fetch
    /// fails; local bookings are untouched in that case.
    pub async fn sync_from_remote(
        &self,
        gateway: &dyn RemoteGateway,
    ) -> Result<usize, GatewayError> {
        let session = gateway.session().ok_or(GatewayError::NotAuthenticated)?;

        let rows = gateway
            .select(
                Collection::Bookings,
                Query::new().eq("user_id", &session.user_id),
            )
            .await?;

        let remote: Vec<Booking> = decode_rows::<BookingRow>(Collection::Bookings, rows)
            .into_iter()
            .map(|row| row.into_booking(None))
            .collect();

        let merged = self.merge_remote(remote);

        info!(merged, "synced bookings from backend");

        Ok(merged)
    }

    fn transition(&self, id: &BookingId, to: BookingStatus) -> Result<Booking, BookingsError> {
        let mut bookings = self.bookings.lock();

        let Some(booking) = bookings.iter_mut().find(|booking| &booking.id == id) else {
            warn!(%id, "booking not found");
            return Err(BookingsError::NotFound(id.clone()));
        };

        booking.status = booking.status.transition(to)?;
        let updated = booking.clone();

        self.persist(&bookings);

        Ok(updated)
    }

    fn persist(&self, bookings: &[Booking]) -> bool {
        self.storage.write_durable(keys::BOOKINGS, bookings)
    }
}

fn upsert(bookings: &mut Vec<Booking>, draft: BookingDraft) -> Booking {
    let booking = match draft {
        BookingDraft::New(booking) => {
            booking.with_id(BookingId::local_with_token(Timestamp::now(), &mut rand::thread_rng()))
        }
        BookingDraft::Identified(booking) => booking,
    };

    match bookings.iter_mut().find(|existing| existing.id == booking.id) {
        Some(existing) => *existing = booking.clone(),
        None => bookings.push(booking.clone()),
    }

    booking
}

#[cfg(test)]
mod tests {
    use homefix::{bookings::NewBooking, cart::CartLine};
    use jiff::civil::date;
    use serde_json::json;
    use testresult::TestResult;

    use crate::test::{TestContext, USER_ID, address, row, service};

    use super::*;

    fn draft(service_id: &str, day: jiff::civil::Date) -> NewBooking {
        let line = CartLine {
            service: service(service_id),
            quantity: 1,
        };

        NewBooking::for_line(
            &line,
            UserId::new(USER_ID),
            &address("a-1", "Mumbai"),
            day,
            "09:00 AM - 11:00 AM",
        )
    }

    #[test]
    fn add_assigns_a_local_id_and_persists() {
        let ctx = TestContext::new();
        let store = BookingStore::load(ctx.storage.clone());

        let booking = store.add(draft("101", date(2025, 4, 25)));

        assert!(booking.id.is_local(), "expected local id, got {}", booking.id);
        assert_eq!(BookingStore::load(ctx.restarted()).bookings(), vec![booking]);
    }

    #[test]
    fn add_with_known_id_replaces_in_place() {
        let ctx = TestContext::new();
        let store = BookingStore::load(ctx.storage.clone());

        let first = store.add(draft("101", date(2025, 4, 25)).with_id(BookingId::new("b-1")));
        let mut changed = first.clone();
        changed.time = "05:00 PM - 07:00 PM".to_string();

        store.add(changed.clone());

        assert_eq!(store.bookings(), vec![changed]);
    }

    #[test]
    fn cancel_changes_status_once() -> TestResult {
        let ctx = TestContext::new();
        let store = BookingStore::load(ctx.storage.clone());
        let booking = store.add(draft("101", date(2025, 4, 25)));

        let cancelled = store.cancel(&booking.id)?;
        assert_eq!(cancelled.status, BookingStatus::Cancelled);

        let again = store.cancel(&booking.id);
        assert!(
            matches!(again, Err(BookingsError::InvalidTransition(_))),
            "expected InvalidTransition, got {again:?}"
        );

        let reloaded = BookingStore::load(ctx.restarted());
        assert_eq!(
            reloaded.get(&booking.id).map(|b| b.status),
            Some(BookingStatus::Cancelled)
        );

        Ok(())
    }

    #[test]
    fn cancel_unknown_id_leaves_store_unchanged() {
        let ctx = TestContext::new();
        let store = BookingStore::load(ctx.storage.clone());
        let booking = store.add(draft("101", date(2025, 4, 25)));

        let result = store.cancel(&BookingId::new("nope"));

        assert_eq!(result, Err(BookingsError::NotFound(BookingId::new("nope"))));
        assert_eq!(store.bookings(), vec![booking]);
    }

    #[test]
    fn completed_booking_cannot_be_cancelled() -> TestResult {
        let ctx = TestContext::new();
        let store = BookingStore::load(ctx.storage.clone());
        let booking = store.add(draft("101", date(2025, 4, 25)));

        store.complete(&booking.id)?;
        let result = store.cancel(&booking.id);

        assert!(
            matches!(result, Err(BookingsError::InvalidTransition(_))),
            "expected InvalidTransition, got {result:?}"
        );

        Ok(())
    }

    #[test]
    fn load_drops_malformed_records_and_sorts_newest_first() {
        let ctx = TestContext::new();

        let records = json!([
            {"id": "old", "userId": USER_ID, "serviceId": "101", "providerId": "1",
             "addressId": "a-1", "date": "2025-04-10", "time": "09:00 AM - 11:00 AM",
             "status": "confirmed", "price": 499},
            {"id": "broken", "userId": USER_ID, "serviceId": "101"},
            {"id": "new", "userId": USER_ID, "serviceId": "102", "providerId": "1",
             "addressId": "a-1", "date": "2025-04-20", "time": "09:00 AM - 11:00 AM",
             "status": "pending", "price": 599}
        ]);
        assert!(ctx.storage.write_durable(keys::BOOKINGS, &records), "seeded");

        let store = BookingStore::load(ctx.storage.clone());
        let ids: Vec<String> = store
            .bookings()
            .into_iter()
            .map(|b| b.id.into_string())
            .collect();

        assert_eq!(ids, ["new", "old"]);
    }

    #[test]
    fn non_list_value_loads_empty() {
        let ctx = TestContext::new();
        assert!(ctx.storage.write_durable(keys::BOOKINGS, &json!({"id": "x"})), "seeded");

        assert_eq!(BookingStore::load(ctx.storage.clone()).reload(), 0);
    }

    #[test]
    fn by_user_ignores_case_and_by_provider_filters() {
        let ctx = TestContext::new();
        let store = BookingStore::load(ctx.storage.clone());
        store.add(draft("101", date(2025, 4, 25)));

        let mut other = draft("102", date(2025, 4, 26));
        other.user_id = UserId::new("someone-else");
        other.provider_id = ProviderId::new("7");
        store.add(other);

        assert_eq!(store.by_user(&UserId::new("USER-1")).len(), 1);
        assert_eq!(store.by_provider(&ProviderId::new("7")).len(), 1);
        assert_eq!(store.by_provider(&ProviderId::new("1")).len(), 1);
    }

    #[test]
    fn earnings_follow_completion() -> TestResult {
        let ctx = TestContext::new();
        let store = BookingStore::load(ctx.storage.clone());

        let mut tipped = draft("101", date(2025, 4, 25));
        tipped.tip_amount = Some(50);
        let tipped = store.add(tipped);
        store.add(draft("102", date(2025, 4, 26)));

        assert_eq!(store.provider_earnings(&ProviderId::new("1")), 0);

        store.complete(&tipped.id)?;

        assert_eq!(store.provider_earnings(&ProviderId::new("1")), 549);

        Ok(())
    }

    #[test]
    fn try_add_rolls_back_when_storage_is_full() {
        let ctx = TestContext::full();
        let store = BookingStore::load(ctx.storage.clone());

        let result = store.try_add(draft("101", date(2025, 4, 25)));

        assert!(
            matches!(result, Err(BookingsError::NotPersisted(_))),
            "expected NotPersisted, got {result:?}"
        );
        assert!(store.bookings().is_empty(), "store rolled back");
    }

    #[test]
    fn clear_removes_everything() {
        let ctx = TestContext::new();
        let store = BookingStore::load(ctx.storage.clone());
        store.add(draft("101", date(2025, 4, 25)));

        store.clear();

        assert!(store.bookings().is_empty(), "memory cleared");
        assert!(BookingStore::load(ctx.restarted()).bookings().is_empty(), "disk cleared");
    }

    #[test]
    fn merge_keeps_local_display_fields() {
        let ctx = TestContext::new();
        let store = BookingStore::load(ctx.storage.clone());
        let local = store.add(draft("101", date(2025, 4, 25)).with_id(BookingId::new("b-1")));

        let mut remote = local.clone();
        remote.service_name = None;
        remote.address = None;
        remote.status = BookingStatus::Completed;

        assert_eq!(store.merge_remote(vec![remote]), 1);

        let merged = store.get(&BookingId::new("b-1"));
        assert_eq!(merged.as_ref().map(|b| b.status), Some(BookingStatus::Completed));
        assert_eq!(merged.and_then(|b| b.service_name), local.service_name);
    }

    #[tokio::test]
    async fn sync_pulls_the_users_remote_bookings() -> TestResult {
        let ctx = TestContext::new();
        let store = BookingStore::load(ctx.storage.clone());

        let mut gateway = TestContext::signed_in_gateway();
        gateway
            .expect_select()
            .withf(|collection, query| {
                *collection == Collection::Bookings
                    && *query == Query::new().eq("user_id", USER_ID)
            })
            .times(1)
            .returning(|_, _| {
                Ok(vec![row(json!({
                    "id": "b-remote",
                    "user_id": USER_ID,
                    "service_id": 202,
                    "provider_id": "4",
                    "address_id": "a-1",
                    "booking_date": "2025-05-01",
                    "booking_time": "01:00 PM - 03:00 PM",
                    "status": "pending",
                    "price": 699
                }))])
            });

        assert_eq!(store.sync_from_remote(&gateway).await?, 1);
        assert_eq!(store.by_provider(&ProviderId::new("4")).len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn sync_without_session_is_not_authenticated() {
        let ctx = TestContext::new();
        let store = BookingStore::load(ctx.storage.clone());

        let result = store.sync_from_remote(&TestContext::signed_out_gateway()).await;

        assert_eq!(result, Err(GatewayError::NotAuthenticated));
    }
}
