use crate::domain::counter::{
    CountDelta, CounterLimits, CounterRecord, Counts, LimitKind, Period, Reservation,
};
use crate::domain::ports::{ClockBox, CounterStore};
use crate::error::{StorageError, StorageResult};
use crate::infrastructure::clock::SystemClock;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// A thread-safe in-process counter store.
///
/// Uses `Arc<Mutex<HashMap<String, CounterRecord>>>` so clones share the same
/// counters. Every operation holds the lock for its whole read-check-write,
/// which makes reservations atomic per store. Counts live as long as the
/// process.
#[derive(Clone)]
pub struct InMemoryCounterStore {
    records: Arc<Mutex<HashMap<String, CounterRecord>>>,
    clock: ClockBox,
}

impl Default for InMemoryCounterStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCounterStore {
    /// Creates an empty store dated by the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: ClockBox) -> Self {
        Self {
            records: Arc::new(Mutex::new(HashMap::new())),
            clock,
        }
    }

    fn period(&self) -> Period {
        Period::of(self.clock.today())
    }
}

#[async_trait]
impl CounterStore for InMemoryCounterStore {
    async fn ensure_provider(&self, provider: &str) -> StorageResult<()> {
        let period = self.period();
        let mut records = self.records.lock().await;
        records
            .entry(provider.to_string())
            .or_insert_with(|| CounterRecord::new(&period));
        Ok(())
    }

    async fn get_counts(&self, provider: &str) -> StorageResult<Counts> {
        let period = self.period();
        let mut records = self.records.lock().await;
        let record = records
            .entry(provider.to_string())
            .or_insert_with(|| CounterRecord::new(&period));
        record.refresh(&period);
        Ok(record.counts)
    }

    async fn set_counts(&self, provider: &str, delta: CountDelta) -> StorageResult<Counts> {
        let period = self.period();
        let mut records = self.records.lock().await;
        let record = records
            .entry(provider.to_string())
            .or_insert_with(|| CounterRecord::new(&period));
        record.apply(&period, delta).map_err(StorageError::Overflow)
    }

    async fn reserve(
        &self,
        provider: &str,
        delta: CountDelta,
        limits: &CounterLimits,
    ) -> StorageResult<Result<Reservation, LimitKind>> {
        let period = self.period();
        let mut records = self.records.lock().await;
        let record = records
            .entry(provider.to_string())
            .or_insert_with(|| CounterRecord::new(&period));
        Ok(record
            .reserve(&period, delta, limits)
            .map(|_| Reservation {
                provider: provider.to_string(),
                delta,
                period,
            }))
    }

    async fn release(&self, reservation: &Reservation) -> StorageResult<()> {
        let period = self.period();
        let mut records = self.records.lock().await;
        let record = records
            .entry(reservation.provider.clone())
            .or_insert_with(|| CounterRecord::new(&period));
        record.release(&period, &reservation.period, reservation.delta);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::FixedClock;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_unknown_provider_reads_zero() {
        let store = InMemoryCounterStore::new();
        assert_eq!(store.get_counts("nobody").await.unwrap(), Counts::ZERO);
    }

    #[tokio::test]
    async fn test_ensure_provider_is_idempotent() {
        let store = InMemoryCounterStore::new();
        store
            .set_counts("dummy", CountDelta::transaction(dec!(3)))
            .await
            .unwrap();

        store.ensure_provider("dummy").await.unwrap();
        store.ensure_provider("dummy").await.unwrap();

        assert_eq!(store.get_counts("dummy").await.unwrap().day_count, 1);
    }

    #[tokio::test]
    async fn test_providers_are_independent() {
        let store = InMemoryCounterStore::new();
        store
            .set_counts("a", CountDelta::transaction(dec!(10)))
            .await
            .unwrap();

        assert_eq!(store.get_counts("b").await.unwrap(), Counts::ZERO);
        assert_eq!(store.get_counts("a").await.unwrap().month_amount, dec!(10));
    }

    #[tokio::test]
    async fn test_day_rollover_keeps_month() {
        let clock = FixedClock::ymd(2024, 5, 14);
        let store = InMemoryCounterStore::with_clock(Arc::new(clock.clone()));
        store
            .set_counts("dummy", CountDelta::transaction(dec!(40)))
            .await
            .unwrap();

        clock.advance_days(1);
        let counts = store.get_counts("dummy").await.unwrap();

        assert_eq!(counts.day_amount, Decimal::ZERO);
        assert_eq!(counts.day_count, 0);
        assert_eq!(counts.month_amount, dec!(40));
        assert_eq!(counts.month_count, 1);
    }

    #[tokio::test]
    async fn test_month_rollover_resets_everything() {
        let clock = FixedClock::ymd(2024, 5, 31);
        let store = InMemoryCounterStore::with_clock(Arc::new(clock.clone()));
        store
            .set_counts("dummy", CountDelta::transaction(dec!(40)))
            .await
            .unwrap();

        clock.advance_days(1);

        assert_eq!(store.get_counts("dummy").await.unwrap(), Counts::ZERO);
    }

    #[tokio::test]
    async fn test_concurrent_reservations_respect_limit() {
        let store = InMemoryCounterStore::new();
        let limits = CounterLimits::new().day_transactions(11);

        let mut handles = Vec::new();
        for _ in 0..50 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .reserve("dummy", CountDelta::transaction(dec!(1)), &limits)
                    .await
                    .unwrap()
                    .is_ok()
            }));
        }

        let mut granted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                granted += 1;
            }
        }

        // inclusive boundary: a limit of 11 admits 10
        assert_eq!(granted, 10);
        assert_eq!(store.get_counts("dummy").await.unwrap().day_count, 10);
    }
}
