//! Summary totals recomputed from the raw event log.
//!
//! Derived values are never read from persisted running totals: every call
//! is a fresh filter-and-reduce over the full log, so two calls with an
//! unchanged log always agree.

use rust_decimal::Decimal;

/// How one event contributes to the totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contribution {
    Inflow(Decimal),
    Outflow(Decimal),
}

/// Reduced totals over a filtered event set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Totals {
    pub inflow: Decimal,
    pub outflow: Decimal,
    pub count: usize,
}

impl Totals {
    pub fn net(&self) -> Decimal {
        self.inflow - self.outflow
    }
}

/// Filter the event log by `predicate` and reduce to totals.
pub fn summarize<E>(
    events: &[E],
    predicate: impl Fn(&E) -> bool,
    classify: impl Fn(&E) -> Contribution,
) -> Totals {
    events
        .iter()
        .filter(|event| predicate(event))
        .fold(Totals::default(), |mut totals, event| {
            match classify(event) {
                Contribution::Inflow(amount) => totals.inflow += amount,
                Contribution::Outflow(amount) => totals.outflow += amount,
            }
            totals.count += 1;
            totals
        })
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    struct Entry {
        amount: Decimal,
        expense: bool,
    }

    fn log() -> Vec<Entry> {
        vec![
            Entry { amount: dec!(100), expense: false },
            Entry { amount: dec!(40), expense: true },
            Entry { amount: dec!(15.50), expense: true },
        ]
    }

    fn classify(entry: &Entry) -> Contribution {
        if entry.expense {
            Contribution::Outflow(entry.amount)
        } else {
            Contribution::Inflow(entry.amount)
        }
    }

    #[test]
    fn totals_reduce_inflow_and_outflow() {
        let totals = summarize(&log(), |_| true, classify);
        assert_eq!(totals.inflow, dec!(100));
        assert_eq!(totals.outflow, dec!(55.50));
        assert_eq!(totals.net(), dec!(44.50));
        assert_eq!(totals.count, 3);
    }

    #[test]
    fn repeated_calls_over_an_unchanged_log_agree() {
        let events = log();
        let first = summarize(&events, |e| e.expense, classify);
        let second = summarize(&events, |e| e.expense, classify);
        assert_eq!(first, second);
    }
}
