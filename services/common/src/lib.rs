//! Process plumbing shared by the GSM services: tracing setup, typed
//! environment lookups and listener/shutdown helpers.

mod env;
mod logging;
mod net;

pub use env::{env_list, env_or, parse_or, split_list};
pub use logging::{init_tracing, prune_logs_older_than, TracingGuards};
pub use net::{bind_listener, shutdown_signal};
