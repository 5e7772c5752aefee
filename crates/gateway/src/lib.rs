//! Liveness HTTP server.
//!
//! Hosting platforms probe an HTTP route to decide the process is alive;
//! this serves that probe and nothing else.

mod server;

pub use server::{build_app, serve};
