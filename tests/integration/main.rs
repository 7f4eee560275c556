//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against mock adapters.  All tests run on the host with no real
//! hardware required; the TCP tests use loopback sockets.

mod mock_hw;
mod motor_shield_tests;
mod tcp_channel_tests;
