use crate::domain::counter::{
    CountDelta, CounterLimits, CounterRecord, Counts, LimitKind, Period, Reservation,
};
use crate::domain::ports::{ClockBox, CounterStore};
use crate::error::{StorageError, StorageResult};
use crate::infrastructure::clock::SystemClock;
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, Options};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column Family holding one counter row per provider.
pub const CF_COUNTERS: &str = "counters";

/// A persistent counter store backed by RocksDB.
///
/// Each provider is a row keyed by its tag, holding the four totals and the
/// day/month stamps as JSON. RocksDB has no row locks, so a store-wide async
/// mutex serialises every read-modify-write cycle.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBCounterStore {
    db: Arc<DB>,
    write_lock: Arc<Mutex<()>>,
    clock: ClockBox,
}

impl RocksDBCounterStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the "counters" column family exists.
    pub fn open<P: AsRef<Path>>(path: P) -> StorageResult<Self> {
        Self::open_with_clock(path, Arc::new(SystemClock))
    }

    pub fn open_with_clock<P: AsRef<Path>>(path: P, clock: ClockBox) -> StorageResult<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_counters = ColumnFamilyDescriptor::new(CF_COUNTERS, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf_counters])?;

        Ok(Self {
            db: Arc::new(db),
            write_lock: Arc::new(Mutex::new(())),
            clock,
        })
    }

    fn period(&self) -> Period {
        Period::of(self.clock.today())
    }

    fn load(&self, provider: &str) -> StorageResult<Option<CounterRecord>> {
        let cf = self
            .db
            .cf_handle(CF_COUNTERS)
            .ok_or(StorageError::MissingColumnFamily(CF_COUNTERS))?;
        match self.db.get_cf(&cf, provider.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn save(&self, provider: &str, record: &CounterRecord) -> StorageResult<()> {
        let cf = self
            .db
            .cf_handle(CF_COUNTERS)
            .ok_or(StorageError::MissingColumnFamily(CF_COUNTERS))?;
        let value = serde_json::to_vec(record)?;
        self.db.put_cf(&cf, provider.as_bytes(), value)?;
        Ok(())
    }

    /// Loads the row for `provider`, creating a zeroed one if missing, and
    /// brings its periods up to date.
    fn load_current(&self, provider: &str, period: &Period) -> StorageResult<CounterRecord> {
        let mut record = self
            .load(provider)?
            .unwrap_or_else(|| CounterRecord::new(period));
        record.refresh(period);
        Ok(record)
    }
}

#[async_trait]
impl CounterStore for RocksDBCounterStore {
    async fn ensure_provider(&self, provider: &str) -> StorageResult<()> {
        let _guard = self.write_lock.lock().await;
        if self.load(provider)?.is_none() {
            self.save(provider, &CounterRecord::new(&self.period()))?;
        }
        Ok(())
    }

    async fn get_counts(&self, provider: &str) -> StorageResult<Counts> {
        let _guard = self.write_lock.lock().await;
        let period = self.period();
        let stored = self.load(provider)?;
        let mut record = stored
            .clone()
            .unwrap_or_else(|| CounterRecord::new(&period));
        record.refresh(&period);
        if stored.as_ref() != Some(&record) {
            self.save(provider, &record)?;
        }
        Ok(record.counts)
    }

    async fn set_counts(&self, provider: &str, delta: CountDelta) -> StorageResult<Counts> {
        let _guard = self.write_lock.lock().await;
        let period = self.period();
        let mut record = self.load_current(provider, &period)?;
        let counts = record
            .apply(&period, delta)
            .map_err(StorageError::Overflow)?;
        self.save(provider, &record)?;
        Ok(counts)
    }

    async fn reserve(
        &self,
        provider: &str,
        delta: CountDelta,
        limits: &CounterLimits,
    ) -> StorageResult<Result<Reservation, LimitKind>> {
        let _guard = self.write_lock.lock().await;
        let period = self.period();
        let mut record = self.load_current(provider, &period)?;
        if let Err(kind) = record.reserve(&period, delta, limits) {
            return Ok(Err(kind));
        }
        self.save(provider, &record)?;
        Ok(Ok(Reservation {
            provider: provider.to_string(),
            delta,
            period,
        }))
    }

    async fn release(&self, reservation: &Reservation) -> StorageResult<()> {
        let _guard = self.write_lock.lock().await;
        let period = self.period();
        let mut record = self.load_current(&reservation.provider, &period)?;
        record.release(&period, &reservation.period, reservation.delta);
        self.save(&reservation.provider, &record)
    }
}
