pub mod board;
pub mod config;
pub mod member;
pub mod permission;
pub mod task;
pub mod toast;

pub use board::*;
pub use config::*;
pub use member::*;
pub use permission::*;
pub use task::*;
pub use toast::*;
