pub mod config_io;
pub mod identity_io;
pub mod remote;
