//! CLI domain: parse, route and output only.
//! No capture logic here; the route table dispatches to the engine and output modules.

mod output;
mod parse;
mod route;

pub use output::map_error;
pub use parse::{Cli, Commands};
pub use route::{CommandOutput, RunContext};
