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

use rand::Rng;
use rand_distr::Distribution;
use rand_distr::StandardNormal;

use crate::error::Error;
use crate::tree::canonical::CanonicalNodes;

/// Complete binary tree of noisy partial sums over a fixed horizon of time steps.
///
/// See [`crate::tree`] for an overview.
#[derive(Debug, Clone)]
pub struct AggregationTree {
    /// Heap-ordered nodes: children of `i` are `2i + 1` and `2i + 2`, leaf `j` is at
    /// `num_leaves - 1 + j`.
    nodes: Box<[f64]>,
    height: u32,
    num_leaves: usize,
    horizon: usize,
    sigma: f64,
}

impl AggregationTree {
    /// Creates a tree covering `horizon` steps whose nodes are seeded with `N(0, sigma^2)` noise
    /// drawn from the thread-local generator.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidArgument`](crate::error::ErrorKind::InvalidArgument) if
    /// `horizon` is zero or `sigma` is negative or not finite.
    pub fn new(horizon: usize, sigma: f64) -> Result<Self, Error> {
        Self::with_rng(horizon, sigma, &mut rand::rng())
    }

    /// Creates a tree like [`AggregationTree::new`], drawing the node noise from `rng`.
    pub fn with_rng<R: Rng + ?Sized>(
        horizon: usize,
        sigma: f64,
        rng: &mut R,
    ) -> Result<Self, Error> {
        let num_leaves = leaves_for_horizon(horizon)?;
        validate_sigma(sigma)?;
        Ok(Self::sample(horizon, num_leaves, sigma, rng))
    }

    /// Allocates a tree for parameters that were already validated.
    pub(crate) fn sample<R: Rng + ?Sized>(
        horizon: usize,
        num_leaves: usize,
        sigma: f64,
        rng: &mut R,
    ) -> Self {
        let nodes = (0..2 * num_leaves - 1)
            .map(|_| {
                let z: f64 = StandardNormal.sample(&mut *rng);
                z * sigma
            })
            .collect();
        Self {
            nodes,
            height: num_leaves.trailing_zeros(),
            num_leaves,
            horizon,
            sigma,
        }
    }

    /// Returns the tree height `H = ceil(log2(horizon))`.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the number of leaves `L = 2^H`.
    pub fn num_leaves(&self) -> usize {
        self.num_leaves
    }

    /// Returns the number of nodes `2L - 1`.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the configured horizon.
    pub fn horizon(&self) -> usize {
        self.horizon
    }

    /// Returns the noise scale of every node.
    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Adds `value` to every node on the path from `leaf` to the root.
    ///
    /// # Panics
    ///
    /// Panics if `leaf >= num_leaves()`.
    pub fn add(&mut self, leaf: usize, value: f64) {
        let mut index = self.leaf_index(leaf);
        loop {
            self.nodes[index] += value;
            if index == 0 {
                break;
            }
            index = (index - 1) / 2;
        }
    }

    /// Adds `value` at `leaf` and returns the private prefix sum over `[0, leaf]`.
    pub fn add_to_tree(&mut self, leaf: usize, value: f64) -> f64 {
        self.add(leaf, value);
        self.query(leaf)
    }

    /// Returns the private estimate of the prefix sum over `[0, leaf]`.
    ///
    /// Reading never changes the tree, so repeated queries of the same leaf return the same
    /// value until something is added beneath it.
    ///
    /// # Panics
    ///
    /// Panics if `leaf >= num_leaves()`.
    pub fn query(&self, leaf: usize) -> f64 {
        self.leaf_index(leaf);
        CanonicalNodes::new(leaf, self.height)
            .map(|node| self.honaker_estimate(node.index, node.kappa))
            .sum()
    }

    /// Returns the variance of [`AggregationTree::query`] at `leaf`.
    ///
    /// Every canonical subtree of height `kappa` contributes `sigma^2 / (2 * (1 - 2^-kappa))`.
    ///
    /// # Panics
    ///
    /// Panics if `leaf >= num_leaves()`.
    pub fn honaker_variance(&self, leaf: usize) -> f64 {
        self.leaf_index(leaf);
        let sigma_sq = self.sigma * self.sigma;
        CanonicalNodes::new(leaf, self.height)
            .map(|node| sigma_sq / level_normalizer(node.kappa))
            .sum()
    }

    /// Combines every level of the subtree rooted at `root` into one estimate of its sum.
    ///
    /// Level `j` holds `2^j` nodes whose sum has noise variance `2^j * sigma^2`; weighting it by
    /// `2^-j` and normalising gives the minimum-variance unbiased combination.
    fn honaker_estimate(&self, root: usize, kappa: u32) -> f64 {
        let mut weighted = 0.0;
        for level in 0..kappa {
            let width = 1usize << level;
            let first = (root + 1) * width - 1;
            let level_sum: f64 = self.nodes[first..first + width].iter().sum();
            weighted += level_sum / width as f64;
        }
        weighted / level_normalizer(kappa)
    }

    fn leaf_index(&self, leaf: usize) -> usize {
        assert!(
            leaf < self.num_leaves,
            "leaf {leaf} out of range for a tree with {} leaves",
            self.num_leaves
        );
        self.num_leaves - 1 + leaf
    }
}

/// Returns the leaf count `2^ceil(log2(horizon))` of a tree covering `horizon` steps.
pub(crate) fn leaves_for_horizon(horizon: usize) -> Result<usize, Error> {
    if horizon == 0 {
        return Err(Error::invalid_parameter("horizon", horizon));
    }
    horizon
        .checked_next_power_of_two()
        .filter(|leaves| leaves.checked_mul(2).is_some())
        .ok_or_else(|| Error::invalid_parameter("horizon", horizon))
}

/// Checks that `sigma` is a usable noise scale.
pub(crate) fn validate_sigma(sigma: f64) -> Result<(), Error> {
    if !sigma.is_finite() || sigma < 0.0 {
        return Err(Error::invalid_parameter("sigma", sigma));
    }
    Ok(())
}

/// Returns `sum_{j < kappa} 2^-j = 2 * (1 - 2^-kappa)`.
fn level_normalizer(kappa: u32) -> f64 {
    2.0 * (1.0 - 0.5f64.powi(kappa as i32))
}
