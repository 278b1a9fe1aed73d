pub mod exporter;
pub mod join;

pub use exporter::{combine_and_save, write_csv, MergeOutcome, MergeReport, Merger};
pub use join::{duplicate_keys, inner_join, KeyMatch, JOIN_KEYS};
