//! CLI subcommand implementations.

pub mod add;
pub mod edit;
pub mod log;
pub mod lookup;
pub mod meal;
pub mod profile;
pub mod today;
pub mod util;
