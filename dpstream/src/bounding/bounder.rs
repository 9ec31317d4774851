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

use tracing::debug;

use crate::bounding::ContributionLimiter;
use crate::error::Error;

/// Result of passing a record through a [`ContributionBounder`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoundingOutcome {
    /// The user's budget is exhausted; the record must be dropped.
    Dropped,
    /// Some or all of the record was accepted.
    Accepted {
        /// Units charged to the user's budget.
        units: u64,
        /// Accepted units clamped to `[-per_record_clamp, per_record_clamp]`.
        clamped: f64,
    },
}

impl BoundingOutcome {
    /// Returns the clamped value, or `None` if the record was dropped.
    pub fn clamped(&self) -> Option<f64> {
        match self {
            BoundingOutcome::Dropped => None,
            BoundingOutcome::Accepted { clamped, .. } => Some(*clamped),
        }
    }
}

/// Upstream bounding stage enforcing `C` records per user and `Lm` per record.
///
/// Each bounding stage keeps its own budget ledger; it is meant to sit in front of the
/// partition that feeds a [`StreamingMechanism`](crate::mechanism::StreamingMechanism).
#[derive(Debug, Clone)]
pub struct ContributionBounder {
    limiter: ContributionLimiter,
    max_contributions: u64,
    per_record_clamp: f64,
}

impl ContributionBounder {
    /// Creates a bounding stage.
    ///
    /// # Errors
    ///
    /// Fails if `max_contributions` is zero or `per_record_clamp` is not a positive finite
    /// number.
    pub fn new(max_contributions: u64, per_record_clamp: f64) -> Result<Self, Error> {
        if max_contributions == 0 {
            return Err(Error::invalid_parameter(
                "max_contributions",
                max_contributions,
            ));
        }
        if !per_record_clamp.is_finite() || per_record_clamp <= 0.0 {
            return Err(Error::invalid_parameter(
                "per_record_clamp",
                per_record_clamp,
            ));
        }
        Ok(Self {
            limiter: ContributionLimiter::new(),
            max_contributions,
            per_record_clamp,
        })
    }

    /// Returns the per-user contribution bound `C`.
    pub fn max_contributions(&self) -> u64 {
        self.max_contributions
    }

    /// Returns the per-record bound `Lm`.
    pub fn per_record_clamp(&self) -> f64 {
        self.per_record_clamp
    }

    /// Charges `count` units to `user_id` and clamps the accepted part to `Lm`.
    ///
    /// A record is dropped when nothing of it is accepted, including a zero `count`.
    pub fn check_and_clamp(&mut self, user_id: Option<&str>, count: u64) -> BoundingOutcome {
        let units = self
            .limiter
            .allow(user_id, count, self.max_contributions);
        if units == 0 {
            debug!(
                user_id = user_id.unwrap_or_default(),
                max_contributions = self.max_contributions,
                "rejected contribution over the per-user bound"
            );
            return BoundingOutcome::Dropped;
        }
        let clamped = (units as f64).clamp(-self.per_record_clamp, self.per_record_clamp);
        BoundingOutcome::Accepted { units, clamped }
    }

    /// Returns the units charged to `user_id` so far.
    pub fn contributed(&self, user_id: Option<&str>) -> u64 {
        self.limiter.contributed(user_id)
    }
}
