//! Property-based and end-to-end scenario tests for `abeles-core`, kept out
//! of the library crate so a `cargo test` here can take a heavier
//! `proptest` dependency without pulling it into library consumers.
