pub mod actions;
pub mod assertions;
pub mod setup;

// Re-export main utilities for use by test files
#[allow(unused_imports)]
pub use actions::{end_round, flip, next_notification};
#[allow(unused_imports)]
pub use assertions::{assert_no_notification, assert_stats_consistent};
#[allow(unused_imports)]
pub use setup::{TestSession, TestSessionBuilder};
