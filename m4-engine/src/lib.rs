//! The tokenizer, call stack, quote state, diversion set, and outer loop
//! that drive macro expansion.
//!
//! This crate knows nothing about what any particular built-in does — it
//! only knows how to recognize a call, collect its arguments, and hand off
//! to whatever implements [`BuiltinDispatcher`] once a call is complete.

mod diversion;
mod engine;
mod error;
mod frame;
mod quote;
mod substitute;
mod token;

pub use diversion::Diversions;
pub use engine::{BuiltinDispatcher, Engine};
pub use error::{BuiltinError, EngineError};
pub use frame::{CallFrame, CallStack, FrameError};
pub use quote::QuoteState;
pub use substitute::{strip_dollar_args, substitute_args};
pub use token::{next_token, Token};
