//! WFM ticket portal HTTP application.
//!
//! Route handlers, session store, and shared state over [`wfm_core`]. The
//! binary in `main.rs` wires this router to a TCP listener.

pub mod pages;
pub mod routes;
pub mod session;
pub mod state;

pub use routes::router;
pub use state::AppState;
