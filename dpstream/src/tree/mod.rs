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

//! Binary aggregation trees for differentially private prefix sums.
//!
//! # Overview
//!
//! An [`AggregationTree`] covers a fixed horizon of `T` discrete time steps with a complete
//! binary tree of `L = 2^ceil(log2(T))` leaves. Every node starts from independent Gaussian
//! noise `N(0, sigma^2)` and afterwards only accumulates the true values added beneath it, so
//! each node holds "true partial sum over its leaves + noise".
//!
//! A prefix sum over leaves `[0, i]` is decomposed into at most `height + 1` disjoint canonical
//! subtrees (the binary expansion of `i + 1`). Each canonical subtree is read with the Honaker
//! estimator, which averages every level of the subtree with inverse-variance weights, so the
//! variance of the estimate grows only logarithmically with the number of releases.
//!
//! This is Algorithm 4 of "Differentially Private Stream Processing at Scale" with the variance
//! reduction of its Appendix C.
//!
//! # Usage
//!
//! ```rust
//! # use dpstream::tree::AggregationTree;
//! let mut tree = AggregationTree::new(8, 0.0).unwrap();
//! assert_eq!(tree.height(), 3);
//! assert_eq!(tree.add_to_tree(0, 2.0), 2.0);
//! assert_eq!(tree.add_to_tree(1, 3.0), 5.0);
//! assert_eq!(tree.query(7), 5.0);
//! ```

mod aggregation_tree;
mod canonical;

pub use self::aggregation_tree::AggregationTree;
pub(crate) use self::aggregation_tree::leaves_for_horizon;
pub(crate) use self::aggregation_tree::validate_sigma;
