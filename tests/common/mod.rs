//! Common test utilities for booru-rank-dl integration tests

#[allow(dead_code)]
pub mod board;
#[allow(dead_code)]
pub mod fixtures;
#[allow(dead_code)]
pub mod logs;

#[allow(unused_imports)]
pub use board::*;
#[allow(unused_imports)]
pub use fixtures::*;
#[allow(unused_imports)]
pub use logs::*;
