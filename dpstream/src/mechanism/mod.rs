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

//! Streaming differentially private histogram release.
//!
//! # Overview
//!
//! [`StreamingMechanism`] publishes a noisy `key -> count` histogram once per discrete step,
//! for a bounded horizon of `T` steps. It implements Algorithms 1 to 3 of "Differentially
//! Private Stream Processing at Scale":
//!
//! * **Key selection.** Every key observed so far owns a selection tree counting *new* unique
//!   users per step. A key is released only once its noisy unique-user count reaches
//!   `mu + tau`, where `tau` widens with the estimator's variance so that noise alone selects a
//!   key with probability at most `beta`.
//! * **Hierarchical release.** A selected key owns a histogram tree. Weight accumulated while
//!   the key was unselected is flushed into that tree at selection time, and every later step
//!   adds that step's weight. The published value is the tree's private prefix sum.
//! * **Empty-key prediction.** When a key fails selection the mechanism reads its selection
//!   tree forward to find the first future step at which noise alone would select it, and
//!   makes sure the key is processed at that step even without new data.
//!
//! Per key the lifecycle is `Unseen -> Tracked -> (Predicted) -> Selected`, and `Selected` is
//! terminal. Keys that go quiet without being selected or predicted lose their selection tree.
//!
//! The mechanism is single-owner: callers serialise [`StreamingMechanism::add_contribution`]
//! and [`StreamingMechanism::snapshot`] themselves. Noise scales are calibrated by the caller;
//! the histogram channel must be calibrated for the sensitivity reported by
//! [`StreamingMechanism::l1_sensitivity`].
//!
//! # Usage
//!
//! ```rust
//! # use dpstream::mechanism::StreamingMechanism;
//! let mut mechanism = StreamingMechanism::builder()
//!     .sigma_key(0.0)
//!     .sigma_hist(0.0)
//!     .horizon(4)
//!     .mu(1.0)
//!     .max_contributions(10)
//!     .seed(7)
//!     .build()
//!     .unwrap();
//!
//! assert!(mechanism.add_contribution("apple", 1.0, Some("alice")));
//! assert!(mechanism.add_contribution("apple", 1.0, Some("bob")));
//! assert!(mechanism.add_contribution("pear", 1.0, Some("alice")));
//!
//! let histogram = mechanism.snapshot();
//! assert_eq!(histogram.get("apple"), Some(2));
//! assert_eq!(histogram.get("pear"), Some(1));
//! ```

mod builder;
mod histogram;
mod state;
mod streaming;
mod threshold;

pub use self::builder::DEFAULT_BETA;
pub use self::builder::DEFAULT_MAX_CONTRIBUTIONS;
pub use self::builder::DEFAULT_MU;
pub use self::builder::DEFAULT_PER_RECORD_CLAMP;
pub use self::builder::MechanismBuilder;
pub use self::builder::MechanismConfig;
pub use self::histogram::Histogram;
pub use self::streaming::StreamingMechanism;
pub use self::threshold::SelectionThreshold;
