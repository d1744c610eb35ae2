//! Integration test driver for the `tests/integration/` submodules.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against mock adapters. All tests run on the host (x86_64) with no
//! real hardware required.

mod bench;
mod dispatcher_tests;
mod link_flow_tests;
mod mock_hw;
mod motion_tests;
