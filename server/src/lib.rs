//! The prediction service: one validated record in, one bounded score
//! and remark out, over artifacts loaded once at startup.

pub mod error;
pub mod remark;
pub mod request;
pub mod service;
pub mod state;

pub use error::ApiError;
pub use state::Artifacts;
