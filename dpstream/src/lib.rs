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

//! # dpstream
//!
//! Differentially private running histograms over key/value event streams.
//!
//! A [`StreamingMechanism`](mechanism::StreamingMechanism) takes `(key, weight, user)` records,
//! and once per discrete step publishes a noisy histogram of the keys that enough distinct
//! users contributed to. Noise is organised in binary aggregation trees so that the error of
//! every release grows only logarithmically with the number of releases.
//!
//! The crate is organised as follows:
//!
//! * [`tree`] - the binary aggregation tree producing private prefix sums and their variance.
//! * [`bounding`] - per-user contribution limits and per-record clamping.
//! * [`mechanism`] - key selection, hierarchical release and empty-key prediction.
//!
//! Calibrating `sigma` from an `(epsilon, delta)` budget is left to the caller.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]

pub mod bounding;
pub mod error;
pub mod mechanism;
pub mod tree;
