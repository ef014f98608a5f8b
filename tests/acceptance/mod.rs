//! Integration tests for trace timestamp acceptance testing.
//!
//! Simulated interrupt context runs on scoped threads; the host
//! critical-section implementation serializes them like masked interrupts.

mod common;
mod examples_test;
mod interleaving_test;
mod port_test;
