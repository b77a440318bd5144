//! tonebench session control.
//!
//! The binary in this crate is a thin shell over [`Session`]: every subcommand that
//! touches the signal chain, the recorder, or the preset store does so by dispatching
//! [`Action`]s and ticking the session, exactly as an interactive front end would.

pub mod session;

pub use session::{Action, Outcome, Session, SessionStatus};
