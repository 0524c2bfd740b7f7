//! mdsweep CLI - command line and operator API
//!
//! - [`commands`]: `plan`, `submit`, `probe` and `serve`
//! - [`api`]: warp routes behind `serve`

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod api;
pub mod commands;
