//! Implementations behind each CLI subcommand.

pub mod migrate;
pub mod seed;
pub mod serve;
pub mod superuser;
