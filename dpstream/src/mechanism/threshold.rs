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

use statrs::distribution::ContinuousCDF;
use statrs::distribution::Normal;

use crate::error::Error;

/// Confidence-adjusted margin added to the selection threshold `mu`.
///
/// A noisy unique-user count with estimator variance `lambda^2` exceeds `mu + tau` by noise
/// alone with probability at most `beta`, where `tau = z_{1 - beta} * lambda`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionThreshold {
    beta: f64,
    z: f64,
}

impl SelectionThreshold {
    /// Creates a threshold for failure probability `beta`.
    ///
    /// # Errors
    ///
    /// Fails unless `0 < beta < 1`.
    pub fn new(beta: f64) -> Result<Self, Error> {
        if !(beta > 0.0 && beta < 1.0) {
            return Err(Error::invalid_parameter("beta", beta));
        }
        let normal = Normal::new(0.0, 1.0).map_err(|err| {
            Error::invalid_argument(format!("failed to create standard normal: {err}"))
        })?;
        Ok(Self {
            beta,
            z: normal.inverse_cdf(1.0 - beta),
        })
    }

    /// Returns the failure probability.
    pub fn beta(&self) -> f64 {
        self.beta
    }

    /// Returns the standard normal quantile `z_{1 - beta}`.
    pub fn z(&self) -> f64 {
        self.z
    }

    /// Returns `tau` for an estimator with the given variance.
    pub fn tau(&self, variance: f64) -> f64 {
        if variance <= 0.0 {
            return 0.0;
        }
        self.z * variance.sqrt()
    }
}
