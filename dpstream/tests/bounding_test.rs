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

use dpstream::bounding::BoundingOutcome;
use dpstream::bounding::ContributionBounder;
use dpstream::bounding::ContributionLimiter;
use dpstream::error::ErrorKind;
use googletest::prelude::*;

#[test]
fn test_unit_contributions_over_budget() {
    let mut limiter = ContributionLimiter::new();
    let mut accepted = 0;
    let mut rejected = 0;
    for i in 0..15 {
        // interleave another user that stays within budget
        if i % 2 == 0 {
            assert_eq!(limiter.allow(Some("bob"), 1, 10), 1);
        }
        match limiter.allow(Some("alice"), 1, 10) {
            1 => accepted += 1,
            0 => rejected += 1,
            other => panic!("unexpected acceptance {other}"),
        }
    }
    assert_eq!(accepted, 10);
    assert_eq!(rejected, 5);
    assert_eq!(limiter.contributed(Some("alice")), 10);
    assert_eq!(limiter.contributed(Some("bob")), 8);
    assert_eq!(limiter.num_users(), 2);
}

#[test]
fn test_partial_acceptance() {
    let mut limiter = ContributionLimiter::new();
    assert_eq!(limiter.allow(Some("carol"), 3, 5), 3);
    assert_eq!(limiter.allow(Some("carol"), 3, 5), 2);
    assert_eq!(limiter.allow(Some("carol"), 3, 5), 0);
    assert_eq!(limiter.contributed(Some("carol")), 5);
}

#[test]
fn test_anonymous_contributions_are_unbounded() {
    let mut limiter = ContributionLimiter::new();
    for _ in 0..100 {
        assert_eq!(limiter.allow(None, 4, 1), 4);
    }
    assert_eq!(limiter.contributed(None), 0);
    assert_eq!(limiter.num_users(), 0);
}

#[test]
fn test_rejected_user_is_not_recorded() {
    let mut limiter = ContributionLimiter::new();
    assert_eq!(limiter.allow(Some("dave"), 0, 5), 0);
    assert_eq!(limiter.contributed(Some("dave")), 0);
    assert_eq!(limiter.num_users(), 0);
}

#[gtest]
fn test_bounder_clamps_accepted_units() {
    let mut bounder = ContributionBounder::new(3, 1.0).unwrap();
    expect_that!(
        bounder.check_and_clamp(Some("erin"), 2),
        eq(BoundingOutcome::Accepted {
            units: 2,
            clamped: 1.0
        })
    );
    expect_that!(
        bounder.check_and_clamp(Some("erin"), 2),
        eq(BoundingOutcome::Accepted {
            units: 1,
            clamped: 1.0
        })
    );
    expect_that!(
        bounder.check_and_clamp(Some("erin"), 1),
        eq(BoundingOutcome::Dropped)
    );
    expect_that!(bounder.contributed(Some("erin")), eq(3));
    expect_that!(bounder.check_and_clamp(Some("frank"), 1).clamped(), some(eq(1.0)));
}

#[test]
fn test_bounder_keeps_values_within_clamp() {
    let mut bounder = ContributionBounder::new(100, 2.5).unwrap();
    assert_eq!(bounder.max_contributions(), 100);
    assert_eq!(bounder.per_record_clamp(), 2.5);
    assert_eq!(bounder.check_and_clamp(Some("gina"), 2).clamped(), Some(2.0));
    assert_eq!(bounder.check_and_clamp(Some("gina"), 7).clamped(), Some(2.5));
    assert_eq!(bounder.check_and_clamp(None, 40).clamped(), Some(2.5));
    assert_eq!(bounder.check_and_clamp(None, 0), BoundingOutcome::Dropped);
}

#[gtest]
fn test_bounder_invalid_arguments() {
    let err = ContributionBounder::new(0, 1.0).unwrap_err();
    expect_that!(err.kind(), eq(ErrorKind::InvalidArgument));
    expect_that!(err.context("parameter"), some(eq("max_contributions")));

    let err = ContributionBounder::new(5, 0.0).unwrap_err();
    expect_that!(err.context("parameter"), some(eq("per_record_clamp")));
    expect_that!(ContributionBounder::new(5, f64::NAN).is_err(), eq(true));
}

#[test]
fn test_bounder_clamps_only_the_accepted_part() {
    let mut bounder = ContributionBounder::new(3, 5.0).unwrap();
    assert_eq!(
        bounder.check_and_clamp(Some("hana"), 2),
        BoundingOutcome::Accepted {
            units: 2,
            clamped: 2.0
        }
    );
    // only one unit of budget is left, so only one unit is forwarded
    assert_eq!(
        bounder.check_and_clamp(Some("hana"), 2),
        BoundingOutcome::Accepted {
            units: 1,
            clamped: 1.0
        }
    );
}
