mod orphan_sweeper;

pub use orphan_sweeper::{OrphanSweeper, SweepStats};
