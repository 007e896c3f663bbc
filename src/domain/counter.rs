use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Neg;

/// Which ceiling stopped a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LimitKind {
    /// Per-transaction amount ceiling of a single gateway.
    TransactionAmount,
    DayAmount,
    MonthAmount,
    DayTransactions,
    MonthTransactions,
}

impl fmt::Display for LimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            LimitKind::TransactionAmount => "transaction amount limit exceeded",
            LimitKind::DayAmount => "gateway day amount limit reached",
            LimitKind::MonthAmount => "gateway month amount limit reached",
            LimitKind::DayTransactions => "gateway day transaction limit reached",
            LimitKind::MonthTransactions => "gateway month transaction limit reached",
        };
        f.write_str(msg)
    }
}

/// How a prospective running total is compared against a configured limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LimitBoundary {
    /// Reject when the new total reaches the limit (`>=`).
    #[default]
    Inclusive,
    /// Reject only when the new total goes past the limit (`>`).
    Exclusive,
}

impl LimitBoundary {
    fn trips<T: PartialOrd>(self, prospective: T, limit: T) -> bool {
        match self {
            LimitBoundary::Inclusive => prospective >= limit,
            LimitBoundary::Exclusive => prospective > limit,
        }
    }
}

/// Day/month usage ceilings enforced by the counter guard. `None` disables a limit.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CounterLimits {
    #[serde(default)]
    pub day_amount: Option<Decimal>,
    #[serde(default)]
    pub month_amount: Option<Decimal>,
    #[serde(default)]
    pub day_transactions: Option<i64>,
    #[serde(default)]
    pub month_transactions: Option<i64>,
    #[serde(default)]
    pub boundary: LimitBoundary,
}

impl CounterLimits {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn day_amount(mut self, limit: Decimal) -> Self {
        self.day_amount = Some(limit);
        self
    }

    pub fn month_amount(mut self, limit: Decimal) -> Self {
        self.month_amount = Some(limit);
        self
    }

    pub fn day_transactions(mut self, limit: i64) -> Self {
        self.day_transactions = Some(limit);
        self
    }

    pub fn month_transactions(mut self, limit: i64) -> Self {
        self.month_transactions = Some(limit);
        self
    }

    pub fn boundary(mut self, boundary: LimitBoundary) -> Self {
        self.boundary = boundary;
        self
    }

    /// Returns the first limit the prospective totals would trip, checked in
    /// day amount, month amount, day count, month count order.
    pub fn first_exceeded(&self, prospective: &Counts) -> Option<LimitKind> {
        let b = self.boundary;
        if let Some(limit) = self.day_amount
            && b.trips(prospective.day_amount, limit)
        {
            return Some(LimitKind::DayAmount);
        }
        if let Some(limit) = self.month_amount
            && b.trips(prospective.month_amount, limit)
        {
            return Some(LimitKind::MonthAmount);
        }
        if let Some(limit) = self.day_transactions
            && b.trips(prospective.day_count, limit)
        {
            return Some(LimitKind::DayTransactions);
        }
        if let Some(limit) = self.month_transactions
            && b.trips(prospective.month_count, limit)
        {
            return Some(LimitKind::MonthTransactions);
        }
        None
    }
}

/// The four running totals tracked per provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Counts {
    pub day_amount: Decimal,
    pub month_amount: Decimal,
    pub day_count: i64,
    pub month_count: i64,
}

impl Counts {
    pub const ZERO: Self = Self {
        day_amount: Decimal::ZERO,
        month_amount: Decimal::ZERO,
        day_count: 0,
        month_count: 0,
    };

    /// Adds `delta`, or names the first total that would overflow.
    pub fn checked_add(self, delta: CountDelta) -> Result<Self, LimitKind> {
        Ok(Self {
            day_amount: self
                .day_amount
                .checked_add(delta.day_amount)
                .ok_or(LimitKind::DayAmount)?,
            month_amount: self
                .month_amount
                .checked_add(delta.month_amount)
                .ok_or(LimitKind::MonthAmount)?,
            day_count: self
                .day_count
                .checked_add(delta.day_count)
                .ok_or(LimitKind::DayTransactions)?,
            month_count: self
                .month_count
                .checked_add(delta.month_count)
                .ok_or(LimitKind::MonthTransactions)?,
        })
    }
}

/// A signed change to the four counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CountDelta {
    pub day_amount: Decimal,
    pub month_amount: Decimal,
    pub day_count: i64,
    pub month_count: i64,
}

impl CountDelta {
    /// The delta of one transaction of `amount`.
    pub fn transaction(amount: Decimal) -> Self {
        Self {
            day_amount: amount,
            month_amount: amount,
            day_count: 1,
            month_count: 1,
        }
    }
}

impl Neg for CountDelta {
    type Output = Self;
    fn neg(self) -> Self::Output {
        Self {
            day_amount: -self.day_amount,
            month_amount: -self.month_amount,
            day_count: -self.day_count,
            month_count: -self.month_count,
        }
    }
}

/// Calendar buckets a counter value belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    /// `YYYYMMDD`
    pub day: String,
    /// `YYYYMM`
    pub month: String,
}

impl Period {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            day: date.format("%Y%m%d").to_string(),
            month: date.format("%Y%m").to_string(),
        }
    }
}

/// Stored state for one provider: the totals plus the period each was last
/// valid in. Day values share the day stamp and month values the month stamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterRecord {
    pub counts: Counts,
    pub day_timestamp: String,
    pub month_timestamp: String,
}

impl CounterRecord {
    pub fn new(period: &Period) -> Self {
        Self {
            counts: Counts::ZERO,
            day_timestamp: period.day.clone(),
            month_timestamp: period.month.clone(),
        }
    }

    /// Zeroes any value whose stamp is not the current period.
    pub fn refresh(&mut self, period: &Period) {
        if self.day_timestamp != period.day {
            self.counts.day_amount = Decimal::ZERO;
            self.counts.day_count = 0;
            self.day_timestamp = period.day.clone();
        }
        if self.month_timestamp != period.month {
            self.counts.month_amount = Decimal::ZERO;
            self.counts.month_count = 0;
            self.month_timestamp = period.month.clone();
        }
    }

    /// Applies `delta` unconditionally. Fails without writing if a total
    /// would overflow.
    pub fn apply(&mut self, period: &Period, delta: CountDelta) -> Result<Counts, LimitKind> {
        self.refresh(period);
        self.counts = self.counts.checked_add(delta)?;
        Ok(self.counts)
    }

    /// Check-then-increment. Leaves the record untouched when a limit trips or
    /// a total would overflow.
    pub fn reserve(
        &mut self,
        period: &Period,
        delta: CountDelta,
        limits: &CounterLimits,
    ) -> Result<Counts, LimitKind> {
        self.refresh(period);
        let prospective = self.counts.checked_add(delta)?;
        if let Some(kind) = limits.first_exceeded(&prospective) {
            return Err(kind);
        }
        self.counts = prospective;
        Ok(prospective)
    }

    /// Undoes a reservation taken in `reserved_in`. Buckets that rolled over
    /// since then were already reset and are left alone.
    pub fn release(&mut self, period: &Period, reserved_in: &Period, delta: CountDelta) {
        self.refresh(period);
        if self.day_timestamp == reserved_in.day {
            self.counts.day_amount = self.counts.day_amount.saturating_sub(delta.day_amount);
            self.counts.day_count = self.counts.day_count.saturating_sub(delta.day_count);
        }
        if self.month_timestamp == reserved_in.month {
            self.counts.month_amount = self
                .counts
                .month_amount
                .saturating_sub(delta.month_amount);
            self.counts.month_count = self.counts.month_count.saturating_sub(delta.month_count);
        }
    }
}

/// Proof of an increment committed by [`CounterStore::reserve`](crate::domain::ports::CounterStore::reserve).
#[derive(Debug, Clone, PartialEq)]
pub struct Reservation {
    pub provider: String,
    pub delta: CountDelta,
    pub period: Period,
}
