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

use std::collections::BTreeSet;
use std::collections::HashMap;

use rand::rngs::StdRng;
use tracing::debug;
use tracing::trace;

use crate::bounding::ContributionLimiter;
use crate::mechanism::Histogram;
use crate::mechanism::MechanismBuilder;
use crate::mechanism::MechanismConfig;
use crate::mechanism::SelectionThreshold;
use crate::mechanism::state::KeyState;
use crate::mechanism::state::StepBuffer;
use crate::tree::AggregationTree;

/// Streaming private histogram over a bounded horizon of releases.
///
/// See [`crate::mechanism`] for an overview of the selection, release and prediction steps.
#[derive(Debug)]
pub struct StreamingMechanism {
    config: MechanismConfig,
    rng: StdRng,
    time_step: usize,
    keys: HashMap<String, KeyState>,
    step_buffers: HashMap<String, StepBuffer>,
    previous_active: BTreeSet<String>,
    limiter: ContributionLimiter,
}

impl StreamingMechanism {
    /// Create a new builder for StreamingMechanism.
    pub fn builder() -> MechanismBuilder {
        MechanismBuilder::default()
    }

    pub(super) fn with_config(config: MechanismConfig, rng: StdRng) -> Self {
        Self {
            config,
            rng,
            time_step: 0,
            keys: HashMap::new(),
            step_buffers: HashMap::new(),
            previous_active: BTreeSet::new(),
            limiter: ContributionLimiter::new(),
        }
    }

    /// Returns the immutable parameters of this mechanism.
    pub fn config(&self) -> &MechanismConfig {
        &self.config
    }

    /// Returns the number of releases `T`.
    pub fn horizon(&self) -> usize {
        self.config.horizon
    }

    /// Returns the L1 sensitivity `C * Lm` of the histogram channel.
    pub fn l1_sensitivity(&self) -> f64 {
        self.config.l1_sensitivity()
    }

    /// Returns the step the next [`StreamingMechanism::snapshot`] will release.
    pub fn time_step(&self) -> usize {
        self.time_step
    }

    /// Returns true once all `T` releases have been made.
    ///
    /// An exhausted mechanism rejects new contributions and its snapshots are re-reads.
    pub fn is_exhausted(&self) -> bool {
        self.time_step >= self.config.horizon
    }

    /// Returns true if `key` has passed selection and is being released.
    pub fn is_selected(&self, key: &str) -> bool {
        self.keys.get(key).is_some_and(|state| state.selected)
    }

    /// Returns the future step at which noise alone is expected to select `key`.
    pub fn predicted_release_step(&self, key: &str) -> Option<usize> {
        self.keys
            .get(key)
            .and_then(|state| state.predicted_release_step)
    }

    /// Returns true if `key` currently holds a selection tree.
    pub fn is_tracking(&self, key: &str) -> bool {
        self.keys
            .get(key)
            .is_some_and(|state| state.selection.is_some())
    }

    /// Returns the number of keys the mechanism holds state for.
    pub fn num_tracked_keys(&self) -> usize {
        self.keys.len()
    }

    /// Returns the number of selected keys.
    pub fn num_selected_keys(&self) -> usize {
        self.keys.values().filter(|state| state.selected).count()
    }

    /// Returns the records charged to `user_id` so far.
    pub fn contributed(&self, user_id: Option<&str>) -> u64 {
        self.limiter.contributed(user_id)
    }

    /// Buffers one record for the current step.
    ///
    /// Every record costs one unit of the user's budget `C`. Returns false, leaving the
    /// mechanism unchanged, when the budget is exhausted or all releases have been made.
    /// Records without a user id are never bounded and each counts as a distinct contributor
    /// towards selection.
    ///
    /// `weight` is expected to lie in `[-Lm, Lm]`; bounding it is the caller's job.
    pub fn add_contribution(&mut self, key: &str, weight: f64, user_id: Option<&str>) -> bool {
        if self.is_exhausted() {
            trace!(key, "ignored contribution after the last release");
            return false;
        }
        if self
            .limiter
            .allow(user_id, 1, self.config.max_contributions)
            == 0
        {
            debug!(
                key,
                user_id = user_id.unwrap_or_default(),
                max_contributions = self.config.max_contributions,
                "rejected contribution over the per-user bound"
            );
            return false;
        }

        let buffer = self.step_buffers.entry(key.to_string()).or_default();
        buffer.weight += weight;
        match user_id {
            Some(user_id) => {
                if !buffer.contributors.contains(user_id) {
                    buffer.contributors.insert(user_id.to_string());
                }
            }
            None => buffer.anonymous += 1,
        }
        true
    }

    /// Releases the histogram for the current step and advances to the next one.
    ///
    /// Once all `T` releases have been made this only re-reads the last histogram.
    pub fn snapshot(&mut self) -> Histogram {
        if self.is_exhausted() {
            return self.histogram();
        }
        let t = self.time_step;
        let mut buffers = std::mem::take(&mut self.step_buffers);

        let mut active: BTreeSet<String> = buffers.keys().cloned().collect();
        for (key, state) in &self.keys {
            if state.selected || state.predicted_release_step == Some(t) {
                active.insert(key.clone());
            }
        }

        for key in &active {
            let buffer = buffers.remove(key);
            self.process_key(key, buffer, t);
        }

        for key in self.previous_active.difference(&active) {
            let vacant = match self.keys.get_mut(key) {
                Some(state) if !state.selected && state.predicted_release_step.is_none() => {
                    state.release_selection();
                    state.is_vacant()
                }
                _ => continue,
            };
            trace!(key = key.as_str(), step = t, "released selection state of inactive key");
            if vacant {
                self.keys.remove(key);
            }
        }

        trace!(
            step = t,
            active = active.len(),
            tracked = self.keys.len(),
            "processed step"
        );
        self.previous_active = active;
        self.time_step += 1;
        self.histogram()
    }

    /// Runs selection, prediction and release for one active key at step `t`.
    fn process_key(&mut self, key: &str, buffer: Option<StepBuffer>, t: usize) {
        let config = self.config;
        let rng = &mut self.rng;
        let state = self.keys.entry(key.to_string()).or_default();

        let (weight, contributors, anonymous) = match buffer {
            Some(buffer) => (buffer.weight, buffer.contributors, buffer.anonymous),
            None => Default::default(),
        };
        state.pending_delta += weight;

        // fresh evidence invalidates a forecast made from noise alone
        if state.predicted_release_step.is_some_and(|step| step > t) {
            state.predicted_release_step = None;
        }

        if !state.selected {
            let mut new_users = anonymous;
            for user in contributors {
                if state.observed_users.insert(user) {
                    new_users += 1;
                }
            }

            let tree = state.selection.get_or_insert_with(|| {
                Box::new(AggregationTree::sample(
                    config.horizon,
                    config.num_leaves,
                    config.sigma_key,
                    &mut *rng,
                ))
            });
            let noisy_users = tree.add_to_tree(t, new_users as f64);
            let tau = config.threshold.tau(tree.honaker_variance(t));

            if noisy_users >= config.mu + tau {
                state.selected = true;
                state.predicted_release_step = None;
                state.release_selection();
                debug!(key, step = t, noisy_users, tau, "selected key");
            } else {
                state.predicted_release_step =
                    predict_release(tree, t, config.horizon, config.mu, &config.threshold);
                if let Some(step) = state.predicted_release_step {
                    debug!(key, step = t, predicted = step, "predicted release from noise");
                }
            }
        }

        if state.selected {
            let tree = state.histogram.get_or_insert_with(|| {
                Box::new(AggregationTree::sample(
                    config.horizon,
                    config.num_leaves,
                    config.sigma_hist,
                    &mut *rng,
                ))
            });
            state.published = Some(tree.add_to_tree(t, state.pending_delta));
            state.pending_delta = 0.0;
        }
    }

    fn histogram(&self) -> Histogram {
        Histogram::from_released(self.keys.iter().filter_map(|(key, state)| {
            if state.selected {
                state.published.map(|sum| (key.as_str(), sum))
            } else {
                None
            }
        }))
    }
}

/// Returns the first step after `t` at which the selection tree crosses the threshold with no
/// further contributions.
///
/// The node noise was fixed when the tree was built, so reading future prefixes without adding
/// anything shows exactly what those steps would release for a key that stays quiet.
///
/// Each candidate step costs one prefix read and one variance walk, `O(L)` each in the worst
/// case, so a scan is `O((T - t) * L)` for every unselected active key.
fn predict_release(
    tree: &AggregationTree,
    t: usize,
    horizon: usize,
    mu: f64,
    threshold: &SelectionThreshold,
) -> Option<usize> {
    (t + 1..horizon).find(|&step| {
        tree.query(step) >= mu + threshold.tau(tree.honaker_variance(step))
    })
}
