//! # services
//!
//! Application services sitting between the HTTP adapters and the ports
//! declared in `domains`. No I/O happens here directly.

pub mod post_service;
pub mod user_service;
mod validation;

pub use post_service::PostService;
pub use user_service::UserService;
