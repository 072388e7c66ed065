//! Request handlers for the video API.
//!
//! Each submodule provides async handler functions for a single resource.
//! Handlers delegate to the corresponding repository in `reelgen_db` and
//! map errors via [`AppError`](crate::error::AppError).

pub mod revisions;
pub mod videos;
