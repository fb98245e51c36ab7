//! The ~25 built-in macro semantics and the two dispatch tables (bare call
//! vs. parenthesized call) that `m4-engine`'s outer loop drives through the
//! [`m4_engine::BuiltinDispatcher`] trait.
//!
//! This crate knows the symbol table, the input stream, the diversion set,
//! and the quote state only through `Engine`'s public fields — it has no
//! access to the engine's private call-stack bookkeeping, which is exactly
//! the seam the specification draws between "the engine recognizes a
//! completed call" and "a built-in decides what that call means."

mod arith;
mod control;
mod dispatch;
mod diversion_ops;
mod registry;
mod text;

pub use dispatch::Dispatcher;
pub use registry::{install, BUILTIN_NAMES};
