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

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::error::Error;
use crate::mechanism::SelectionThreshold;
use crate::mechanism::StreamingMechanism;
use crate::tree::leaves_for_horizon;
use crate::tree::validate_sigma;

/// Default failure probability of the selection threshold.
pub const DEFAULT_BETA: f64 = 1e-5;
/// Default minimum noisy unique-user count before a key is released.
pub const DEFAULT_MU: f64 = 50.0;
/// Default maximum number of records per user over the whole stream.
pub const DEFAULT_MAX_CONTRIBUTIONS: u64 = 100;
/// Default bound on the absolute weight of a single record.
pub const DEFAULT_PER_RECORD_CLAMP: f64 = 1.0;

/// Immutable parameters of a [`StreamingMechanism`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MechanismConfig {
    pub(super) sigma_key: f64,
    pub(super) sigma_hist: f64,
    pub(super) horizon: usize,
    pub(super) num_leaves: usize,
    pub(super) mu: f64,
    pub(super) threshold: SelectionThreshold,
    pub(super) max_contributions: u64,
    pub(super) per_record_clamp: f64,
}

impl MechanismConfig {
    /// Noise scale of the key selection trees (sensitivity 1).
    pub fn sigma_key(&self) -> f64 {
        self.sigma_key
    }

    /// Noise scale of the histogram trees (sensitivity `C * Lm`).
    pub fn sigma_hist(&self) -> f64 {
        self.sigma_hist
    }

    /// Number of releases `T` the mechanism supports.
    pub fn horizon(&self) -> usize {
        self.horizon
    }

    /// Selection threshold `mu` on the noisy unique-user count.
    pub fn mu(&self) -> f64 {
        self.mu
    }

    /// Failure probability `beta` of the selection threshold.
    pub fn beta(&self) -> f64 {
        self.threshold.beta()
    }

    /// Per-user contribution bound `C`.
    pub fn max_contributions(&self) -> u64 {
        self.max_contributions
    }

    /// Per-record bound `Lm`.
    pub fn per_record_clamp(&self) -> f64 {
        self.per_record_clamp
    }

    /// L1 sensitivity `C * Lm` of the histogram channel.
    pub fn l1_sensitivity(&self) -> f64 {
        self.max_contributions as f64 * self.per_record_clamp
    }
}

/// Builder for [`StreamingMechanism`].
///
/// `sigma_key`, `sigma_hist` and `horizon` are required; everything else has a default.
#[derive(Debug, Clone)]
pub struct MechanismBuilder {
    sigma_key: Option<f64>,
    sigma_hist: Option<f64>,
    horizon: Option<usize>,
    mu: f64,
    beta: f64,
    max_contributions: u64,
    per_record_clamp: f64,
    seed: Option<u64>,
}

impl Default for MechanismBuilder {
    fn default() -> Self {
        Self {
            sigma_key: None,
            sigma_hist: None,
            horizon: None,
            mu: DEFAULT_MU,
            beta: DEFAULT_BETA,
            max_contributions: DEFAULT_MAX_CONTRIBUTIONS,
            per_record_clamp: DEFAULT_PER_RECORD_CLAMP,
            seed: None,
        }
    }
}

impl MechanismBuilder {
    /// Set the noise scale of the key selection trees.
    pub fn sigma_key(mut self, sigma: f64) -> Self {
        self.sigma_key = Some(sigma);
        self
    }

    /// Set the noise scale of the histogram trees.
    pub fn sigma_hist(mut self, sigma: f64) -> Self {
        self.sigma_hist = Some(sigma);
        self
    }

    /// Set the number of releases `T`.
    pub fn horizon(mut self, horizon: usize) -> Self {
        self.horizon = Some(horizon);
        self
    }

    /// Set the selection threshold `mu`.
    pub fn mu(mut self, mu: f64) -> Self {
        self.mu = mu;
        self
    }

    /// Set the failure probability `beta` of the selection threshold.
    pub fn beta(mut self, beta: f64) -> Self {
        self.beta = beta;
        self
    }

    /// Set the per-user contribution bound `C`.
    pub fn max_contributions(mut self, max_contributions: u64) -> Self {
        self.max_contributions = max_contributions;
        self
    }

    /// Set the per-record bound `Lm`.
    pub fn per_record_clamp(mut self, per_record_clamp: f64) -> Self {
        self.per_record_clamp = per_record_clamp;
        self
    }

    /// Seed the noise generator, making every release reproducible.
    ///
    /// Without a seed the generator is seeded from the operating system.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validate the parameters and build the mechanism.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidArgument`](crate::error::ErrorKind::InvalidArgument) when a
    /// required parameter is missing, when `horizon` is zero, a sigma is negative, `mu` is
    /// negative, `beta` is outside `(0, 1)`, `max_contributions` is zero or
    /// `per_record_clamp` is not positive.
    pub fn build(self) -> Result<StreamingMechanism, Error> {
        let sigma_key = self.sigma_key.ok_or_else(|| missing("sigma_key"))?;
        let sigma_hist = self.sigma_hist.ok_or_else(|| missing("sigma_hist"))?;
        let horizon = self.horizon.ok_or_else(|| missing("horizon"))?;

        let num_leaves = leaves_for_horizon(horizon)?;
        validate_sigma(sigma_key).map_err(|_| Error::invalid_parameter("sigma_key", sigma_key))?;
        validate_sigma(sigma_hist)
            .map_err(|_| Error::invalid_parameter("sigma_hist", sigma_hist))?;
        if !self.mu.is_finite() || self.mu < 0.0 {
            return Err(Error::invalid_parameter("mu", self.mu));
        }
        let threshold = SelectionThreshold::new(self.beta)?;
        if self.max_contributions == 0 {
            return Err(Error::invalid_parameter(
                "max_contributions",
                self.max_contributions,
            ));
        }
        if !self.per_record_clamp.is_finite() || self.per_record_clamp <= 0.0 {
            return Err(Error::invalid_parameter(
                "per_record_clamp",
                self.per_record_clamp,
            ));
        }

        let config = MechanismConfig {
            sigma_key,
            sigma_hist,
            horizon,
            num_leaves,
            mu: self.mu,
            threshold,
            max_contributions: self.max_contributions,
            per_record_clamp: self.per_record_clamp,
        };
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Ok(StreamingMechanism::with_config(config, rng))
    }
}

fn missing(name: &'static str) -> Error {
    Error::invalid_argument(format!("missing required parameter {name}"))
        .with_context("parameter", name)
}
