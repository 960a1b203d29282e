//! Runtime core: state, periodic loops, and lifecycle.
//!
//! This module contains the embedded implementation of the relayvisor
//! runtime. The only public API from this module is [`Supervisor`], which
//! owns the process table and the two periodic loops.
//!
//! Internal modules:
//! - [`state`]: process records behind the single state lock;
//! - [`reconcile`]: periodic (re)start of dead instances;
//! - [`health`]: periodic suspected-hang snapshot to the sink file;
//! - [`shutdown`]: cross-platform shutdown signal handling;
//! - [`supervisor`]: idempotent start/stop over both loops.

mod health;
mod reconcile;
mod shutdown;
mod state;
mod supervisor;

pub use supervisor::Supervisor;
