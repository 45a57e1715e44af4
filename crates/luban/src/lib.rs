pub mod server;

pub mod apps;
pub mod config;
pub mod error;
pub mod service;
pub mod storage;
pub mod sync;
pub mod users;

pub use crate::config::ServiceConfig;
pub use crate::error::{CoreError, CoreResult};
pub use crate::server::Server;
pub use crate::service::{CurrentUser, EntryService, UserProfile};
