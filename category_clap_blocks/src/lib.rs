//! Building blocks for [`clap`]-driven configuration of categorical columns.

pub mod dictionary;
