//! # SetBot Test Suite
//!
//! Unified test crate for scenarios that cross crate boundaries.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── sessions.rs        # Menu guarantees over the real broker
//!     ├── choice_waiter.rs   # Waiter fed by the broker's message stream
//!     ├── match_rules.rs     # Ruleset scenarios and racing transitions
//!     └── full_set.rs        # A whole set driven through BotRuntime
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p sb-tests
//!
//! # By area
//! cargo test -p sb-tests integration::full_set
//!
//! # Benchmarks
//! cargo bench -p sb-tests
//! ```

#![allow(unused_variables)]
#![allow(dead_code)]

pub mod integration;
