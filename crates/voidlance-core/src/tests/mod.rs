//! Cross-module test suites.
//!
//! Module-local behavior is tested next to the code it exercises; the suites
//! here drive several modules together:
//! - [`determinism`]: digest equality across runs, seeded fuzz replays,
//!   serialization round-trips
//! - [`integration`]: multi-tick battles exercising the full
//!   strike → effect → heat loop
//! - [`properties`]: proptest invariants over arbitrary inputs

mod helpers;
