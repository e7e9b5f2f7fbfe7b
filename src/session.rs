//! Session controller: the only thing allowed to mutate a conversation
//!
//! Each session is an explicit object owned by whatever drives the UI.
//! There is no global instance, so any number of sessions can coexist in
//! one process.

mod controller;

#[cfg(test)]
pub mod testing;

pub use controller::{SessionController, SubmitOutcome};
