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

use std::collections::HashSet;

use crate::tree::AggregationTree;

/// Contributions buffered for one key during the current step.
#[derive(Debug, Default)]
pub(super) struct StepBuffer {
    pub weight: f64,
    pub contributors: HashSet<String>,
    /// Records without a user id; each counts as its own contributor.
    pub anonymous: u64,
}

/// Everything the mechanism remembers about one key across steps.
#[derive(Debug, Default)]
pub(super) struct KeyState {
    /// Noisy count of new unique users per step; dropped once the key is selected.
    pub selection: Option<Box<AggregationTree>>,
    pub observed_users: HashSet<String>,
    /// Noisy released weight; exists only after selection.
    pub histogram: Option<Box<AggregationTree>>,
    pub selected: bool,
    pub predicted_release_step: Option<usize>,
    /// Weight not yet flushed into the histogram tree.
    pub pending_delta: f64,
    /// Last released noisy prefix sum.
    pub published: Option<f64>,
}

impl KeyState {
    /// Forgets selection bookkeeping for a key that went quiet.
    pub fn release_selection(&mut self) {
        self.selection = None;
        self.observed_users = HashSet::new();
    }

    /// Whether the key carries nothing worth remembering.
    pub fn is_vacant(&self) -> bool {
        !self.selected
            && self.selection.is_none()
            && self.predicted_release_step.is_none()
            && self.pending_delta == 0.0
    }
}
