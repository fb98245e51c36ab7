//! The unsigned arithmetic built-ins: `add`, `mult`, `sub`, `div`, `mod`,
//! `incr`. All operate on `u64` with explicit overflow/underflow/
//! division-by-zero detection — never signed semantics, matching the
//! reference's `size_t` arithmetic exactly (see §9 of the specification).

use m4_engine::{BuiltinError, Engine};

/// Parses a non-empty run of ASCII digit bytes into a `u64`, checking the
/// accumulation itself for overflow rather than trusting a parser to reject
/// what the reference's own digit-by-digit `str_to_num` would.
pub(crate) fn parse_num(bytes: &[u8]) -> Option<u64> {
    if bytes.is_empty() || !bytes.iter().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let mut n: u64 = 0;
    for &b in bytes {
        n = n.checked_mul(10)?;
        n = n.checked_add((b - b'0') as u64)?;
    }
    Some(n)
}

fn require_num(name: &'static str, bytes: &[u8]) -> Result<u64, BuiltinError> {
    parse_num(bytes).ok_or_else(|| BuiltinError::malformed(name, "invalid number"))
}

fn push_result(engine: &mut Engine, n: u64) -> Result<(), BuiltinError> {
    engine.input.push_str(&n.to_string())?;
    Ok(())
}

pub fn incr(engine: &mut Engine, args: &[Vec<u8>; 9]) -> Result<(), BuiltinError> {
    let n = require_num("incr", &args[0])?;
    let n = n.checked_add(1).ok_or_else(|| BuiltinError::malformed("incr", "integer overflow"))?;
    push_result(engine, n)
}

pub fn add(engine: &mut Engine, args: &[Vec<u8>; 9]) -> Result<(), BuiltinError> {
    let mut total: u64 = 0;
    for a in args {
        if a.is_empty() {
            continue;
        }
        let n = require_num("add", a)?;
        total = total.checked_add(n).ok_or_else(|| BuiltinError::malformed("add", "integer overflow"))?;
    }
    push_result(engine, total)
}

pub fn mult(engine: &mut Engine, args: &[Vec<u8>; 9]) -> Result<(), BuiltinError> {
    let mut total: u64 = 1;
    for a in args {
        if a.is_empty() {
            continue;
        }
        let n = require_num("mult", a)?;
        total = total.checked_mul(n).ok_or_else(|| BuiltinError::malformed("mult", "integer overflow"))?;
    }
    push_result(engine, total)
}

pub fn sub(engine: &mut Engine, args: &[Vec<u8>; 9]) -> Result<(), BuiltinError> {
    if args[0].is_empty() {
        return Err(BuiltinError::malformed("sub", "argument 1 must be used"));
    }
    let mut total = require_num("sub", &args[0])?;
    for a in &args[1..] {
        if a.is_empty() {
            continue;
        }
        let n = require_num("sub", a)?;
        if n > total {
            return Err(BuiltinError::malformed("sub", "integer underflow"));
        }
        total -= n;
    }
    push_result(engine, total)
}

pub fn div(engine: &mut Engine, args: &[Vec<u8>; 9]) -> Result<(), BuiltinError> {
    if args[0].is_empty() {
        return Err(BuiltinError::malformed("div", "argument 1 must be used"));
    }
    let mut total = require_num("div", &args[0])?;
    for a in &args[1..] {
        if a.is_empty() {
            continue;
        }
        let n = require_num("div", a)?;
        if n == 0 {
            return Err(BuiltinError::malformed("div", "divide by zero"));
        }
        total /= n;
    }
    push_result(engine, total)
}

pub fn modulo(engine: &mut Engine, args: &[Vec<u8>; 9]) -> Result<(), BuiltinError> {
    if args[0].is_empty() {
        return Err(BuiltinError::malformed("mod", "argument 1 must be used"));
    }
    let mut total = require_num("mod", &args[0])?;
    for a in &args[1..] {
        if a.is_empty() {
            continue;
        }
        let n = require_num("mod", a)?;
        if n == 0 {
            return Err(BuiltinError::malformed("mod", "modulo by zero"));
        }
        total %= n;
    }
    push_result(engine, total)
}
