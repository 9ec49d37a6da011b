pub mod stash_server;
