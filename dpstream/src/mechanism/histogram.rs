// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use std::fmt;

/// A published snapshot of the private histogram.
///
/// Entries are ordered by descending count, ties broken by ascending key. Counts are the
/// released noisy sums rounded to the nearest integer and clamped at zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Histogram {
    entries: Vec<(String, i64)>,
}

impl Histogram {
    /// Builds a histogram from released noisy sums.
    pub(super) fn from_released<'a>(released: impl IntoIterator<Item = (&'a str, f64)>) -> Self {
        let mut entries: Vec<(String, i64)> = released
            .into_iter()
            .map(|(key, sum)| (key.to_string(), round_non_negative(sum)))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        Self { entries }
    }

    /// Returns the count published for `key`, if it has been released.
    pub fn get(&self, key: &str) -> Option<i64> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, count)| *count)
    }

    /// Returns true if `key` has been released.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Returns the number of released keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no key has been released.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the sum of all published counts.
    pub fn total(&self) -> i64 {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    /// Iterates entries in published order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> + '_ {
        self.entries.iter().map(|(key, count)| (key.as_str(), *count))
    }

    /// Iterates keys in published order.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// Consumes the histogram, returning its entries in published order.
    pub fn into_entries(self) -> Vec<(String, i64)> {
        self.entries
    }
}

impl IntoIterator for Histogram {
    type Item = (String, i64);
    type IntoIter = std::vec::IntoIter<(String, i64)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl fmt::Display for Histogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, count) in &self.entries {
            writeln!(f, "{key}: {count}")?;
        }
        Ok(())
    }
}

fn round_non_negative(sum: f64) -> i64 {
    if sum.is_nan() {
        return 0;
    }
    // `as` saturates at i64::MAX
    sum.round().max(0.0) as i64
}
