//! Minute accumulation per day and channel.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;

/// Day → channel → accumulated minutes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DailyChannelStats {
    days: BTreeMap<NaiveDate, BTreeMap<String, i64>>,
}

impl DailyChannelStats {
    pub fn add(&mut self, day: NaiveDate, channel: &str, minutes: i64) {
        *self
            .days
            .entry(day)
            .or_default()
            .entry(channel.to_string())
            .or_default() += minutes;
    }

    /// Per-channel minutes recorded on `day`, if any video was counted.
    pub fn day(&self, day: NaiveDate) -> Option<&BTreeMap<String, i64>> {
        self.days.get(&day)
    }

    /// Sum over all channels for `day`; zero for days with no entry.
    pub fn day_total(&self, day: NaiveDate) -> i64 {
        self.day(day).map_or(0, |channels| channels.values().sum())
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

/// Channel → total minutes, remembering first encounter order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelTotals {
    totals: Vec<(String, i64)>,
    index: HashMap<String, usize>,
}

impl ChannelTotals {
    pub fn add(&mut self, channel: &str, minutes: i64) {
        if let Some(&idx) = self.index.get(channel) {
            self.totals[idx].1 += minutes;
        } else {
            self.index.insert(channel.to_string(), self.totals.len());
            self.totals.push((channel.to_string(), minutes));
        }
    }

    pub fn get(&self, channel: &str) -> Option<i64> {
        self.index.get(channel).map(|&idx| self.totals[idx].1)
    }

    /// Channels by descending total; equal totals keep encounter order.
    pub fn ranked(&self) -> Vec<&str> {
        let mut ranked: Vec<&(String, i64)> = self.totals.iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.into_iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }
}

/// Both accumulators, updated together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchStats {
    pub daily: DailyChannelStats,
    pub totals: ChannelTotals,
}

impl WatchStats {
    pub fn record(&mut self, day: NaiveDate, channel: &str, minutes: i64) {
        self.daily.add(day, channel, minutes);
        self.totals.add(channel, minutes);
    }
}
