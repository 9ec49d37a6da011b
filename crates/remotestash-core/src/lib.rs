pub mod config;
pub mod logging;

pub mod client;
pub mod discovery;
pub mod item;
pub mod mime;
pub mod server;
pub mod stash;
