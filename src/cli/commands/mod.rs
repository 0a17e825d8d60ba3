//! One module per subcommand, each exposing an `execute` function.

pub mod completions;
pub mod open;
pub mod send;
pub mod serve;
pub mod version;
