//! Cumulative token and cost accounting for one display session.

use crate::event::Usage;

/// Running totals across all completed messages. Fields only ever grow.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UsageTotals {
    pub input: u64,
    pub output: u64,
    pub cache_read: u64,
    pub cache_write: u64,
    pub cost: f64,
}

/// Context-window footprint of the most recent completed message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContextOccupancy {
    pub used: u64,
    /// Zero means the window is unknown and no percentage is shown.
    pub window: u64,
}

impl ContextOccupancy {
    pub fn percent(&self) -> Option<f64> {
        (self.window > 0).then(|| self.used as f64 / self.window as f64 * 100.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UsageStats {
    totals: UsageTotals,
    context: ContextOccupancy,
    received: bool,
}

impl UsageStats {
    pub fn new(context_window: u64) -> Self {
        Self {
            context: ContextOccupancy {
                used: 0,
                window: context_window,
            },
            ..Default::default()
        }
    }

    /// Fold one completed message's usage into the session.
    pub fn record(&self, usage: &Usage) -> Self {
        let totals = UsageTotals {
            input: self.totals.input.saturating_add(usage.input),
            output: self.totals.output.saturating_add(usage.output),
            cache_read: self.totals.cache_read.saturating_add(usage.cache_read),
            cache_write: self.totals.cache_write.saturating_add(usage.cache_write),
            cost: self.totals.cost + usage.cost.total.max(0.0),
        };

        Self {
            totals,
            context: ContextOccupancy {
                used: usage.total_tokens(),
                window: self.context.window,
            },
            received: true,
        }
    }

    /// Totals, or `None` before the first completed message.
    pub fn totals(&self) -> Option<&UsageTotals> {
        self.received.then_some(&self.totals)
    }

    pub fn context(&self) -> &ContextOccupancy {
        &self.context
    }

    pub fn has_stats(&self) -> bool {
        self.received
    }
}
