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

//! Per-user contribution bounding.
//!
//! The noise of a private histogram is calibrated to its sensitivity, the largest change a
//! single user can cause. Bounding every user to at most `C` records, each clamped to
//! `[-Lm, Lm]`, caps that change at `C * Lm`.
//!
//! * [`ContributionLimiter`] charges units against a per-user budget.
//! * [`ContributionBounder`] is the upstream bounding stage: it charges a record's units and
//!   clamps what was accepted to the per-record bound.
//!
//! Records without a user id bypass bounding entirely; this is event-level rather than
//! user-level privacy.
//!
//! # Usage
//!
//! ```rust
//! # use dpstream::bounding::ContributionLimiter;
//! let mut limiter = ContributionLimiter::new();
//! assert_eq!(limiter.allow(Some("alice"), 3, 5), 3);
//! assert_eq!(limiter.allow(Some("alice"), 3, 5), 2);
//! assert_eq!(limiter.allow(Some("alice"), 1, 5), 0);
//! assert_eq!(limiter.allow(None, 7, 5), 7);
//! ```

mod bounder;
mod limiter;

pub use self::bounder::BoundingOutcome;
pub use self::bounder::ContributionBounder;
pub use self::limiter::ContributionLimiter;
