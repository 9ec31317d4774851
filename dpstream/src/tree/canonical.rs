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

//! Canonical decomposition of a prefix `[0, leaf]` into disjoint subtrees.

/// A subtree covering one canonical block of a prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct CanonicalNode {
    /// Array index of the subtree root.
    pub index: usize,
    /// Height of the subtree, where a single leaf has height 1.
    pub kappa: u32,
}

/// Walks root to leaf, yielding the canonical subtree for every set bit of `leaf + 1`.
///
/// Bits of `leaf + 1` are read from the most significant one (depth 0, the root) down to the
/// least significant one (depth `height`, the leaf level). A set bit at depth `j` selects the
/// left sibling of the path node at that depth, which covers `2^(height - j)` leaves.
#[derive(Debug, Clone)]
pub(super) struct CanonicalNodes {
    leaf: usize,
    prefix_len: usize,
    height: u32,
    depth: u32,
    node: usize,
}

impl CanonicalNodes {
    pub fn new(leaf: usize, height: u32) -> Self {
        Self {
            leaf,
            prefix_len: leaf + 1,
            height,
            depth: 0,
            node: 0,
        }
    }
}

impl Iterator for CanonicalNodes {
    type Item = CanonicalNode;

    fn next(&mut self) -> Option<CanonicalNode> {
        while self.depth <= self.height {
            let depth = self.depth;
            let level_bit = (self.prefix_len >> (self.height - depth)) & 1;
            let current = self.node;

            if depth < self.height {
                let path_bit = (self.leaf >> (self.height - 1 - depth)) & 1;
                self.node = 2 * current + 1 + path_bit;
            }
            self.depth += 1;

            if level_bit == 1 {
                // right children hand over to their left sibling
                let index = if current != 0 && current % 2 == 0 {
                    current - 1
                } else {
                    current
                };
                return Some(CanonicalNode {
                    index,
                    kappa: self.height - depth + 1,
                });
            }
        }
        None
    }
}
