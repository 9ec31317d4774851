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

use std::collections::HashMap;

/// Tracks cumulative units per user and enforces a hard per-user maximum.
#[derive(Debug, Clone, Default)]
pub struct ContributionLimiter {
    counts: HashMap<String, u64>,
}

impl ContributionLimiter {
    /// Creates a limiter with no recorded contributions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Charges up to `requested` units to `user_id` and returns how many were accepted.
    ///
    /// The accepted amount is clamped to the user's remaining budget `max_units - used`, so it
    /// lies in `[0, requested]`. Accepted units are charged immediately. A `None` user is never
    /// bounded and always gets `requested` back.
    pub fn allow(&mut self, user_id: Option<&str>, requested: u64, max_units: u64) -> u64 {
        let Some(user_id) = user_id else {
            return requested;
        };
        let used = self.counts.get(user_id).copied().unwrap_or(0);
        let accepted = requested.min(max_units.saturating_sub(used));
        if accepted > 0 {
            *self.counts.entry(user_id.to_string()).or_insert(0) += accepted;
        }
        accepted
    }

    /// Returns the units charged to `user_id` so far, zero for `None` or unknown users.
    pub fn contributed(&self, user_id: Option<&str>) -> u64 {
        user_id
            .and_then(|user_id| self.counts.get(user_id).copied())
            .unwrap_or(0)
    }

    /// Returns the number of distinct users charged so far.
    pub fn num_users(&self) -> usize {
        self.counts.len()
    }
}
