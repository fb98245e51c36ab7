//! `divert`, `undivert`, `divnum`, `dnl`, `htdist`, `dirsep` — the six
//! built-ins whose bare and parenthesized forms are both real entry points,
//! matching `PROCESS_BI_NO_ARGS`/`PROCESS_BI_WITH_ARGS` in the reference.
//! `divert` and `undivert` behave differently bare vs. with arguments, so
//! they are not shared; the other four ignore any arguments they were
//! given and behave identically either way.

use std::io::Write;

use m4_engine::{next_token, BuiltinError, Engine, Token};

/// Consumes tokens up to and including the next newline. Shared by both the
/// bare and parenthesized forms of `dnl`.
pub fn dnl(engine: &mut Engine) -> Result<(), BuiltinError> {
    loop {
        match next_token(&mut engine.input)? {
            Token::Byte(b'\n') | Token::Eof => return Ok(()),
            _ => {}
        }
    }
}

/// Pushes the active diversion number, or `-1` while diverted to the
/// discard sink (index 10).
pub fn divnum(engine: &mut Engine) -> Result<(), BuiltinError> {
    let n: i64 = if engine.diversions.active == 10 { -1 } else { engine.diversions.active as i64 };
    engine.input.push_str(&n.to_string())?;
    Ok(())
}

pub fn htdist(engine: &Engine) {
    engine.symtab.dump_distribution();
}

#[cfg(windows)]
pub fn dirsep(engine: &mut Engine) -> Result<(), BuiltinError> {
    engine.input.push_str("\\")?;
    Ok(())
}

#[cfg(not(windows))]
pub fn dirsep(engine: &mut Engine) -> Result<(), BuiltinError> {
    engine.input.push_str("/")?;
    Ok(())
}

/// `divert()` called bare always resets to diversion 0.
pub fn divert_bare(engine: &mut Engine) {
    engine.diversions.active = 0;
}

/// `divert(n)` with an argument: `n` must be a single digit `0..9` or the
/// literal `-1`.
pub fn divert_call(engine: &mut Engine, args: &[Vec<u8>; 9]) -> Result<(), BuiltinError> {
    let n = &args[0];
    engine.diversions.active = if n.len() == 1 && n[0].is_ascii_digit() {
        n[0] - b'0'
    } else if n.as_slice() == b"-1" {
        10
    } else {
        return Err(BuiltinError::malformed("divert", "diversion number must be 0 to 9 or -1"));
    };
    Ok(())
}

/// `undivert()` called bare: only legal from diversion 0, where it flushes
/// every diversion (0..9, in order) to standard output.
pub fn undivert_bare(engine: &mut Engine, stdout: &mut dyn Write) -> Result<(), BuiltinError> {
    if engine.diversions.active != 0 {
        return Err(BuiltinError::malformed(
            "undivert",
            "can only call from diversion 0 when called without arguments",
        ));
    }
    for k in 0..10u8 {
        engine.diversions.flush(k, stdout).map_err(m4_buffer::BufferError::from)?;
    }
    Ok(())
}

/// `undivert(ids...)` with arguments. From diversion 0, each single-digit
/// `1..9` argument is flushed straight to standard output. From any other
/// diversion, each such diversion is folded into the *active* one instead —
/// skipping diversion 0 and a self-reference, both of which the reference
/// treats as no-ops rather than errors.
pub fn undivert_call(engine: &mut Engine, args: &[Vec<u8>; 9], stdout: &mut dyn Write) -> Result<(), BuiltinError> {
    let active = engine.diversions.active;
    for a in args {
        let Some(n) = single_digit_one_to_nine(a) else { continue };
        if active == 0 {
            engine.diversions.flush(n, stdout).map_err(m4_buffer::BufferError::from)?;
        } else if n != active {
            engine.diversions.fold_into(active, n)?;
        }
    }
    Ok(())
}

fn single_digit_one_to_nine(bytes: &[u8]) -> Option<u8> {
    if bytes.len() == 1 && bytes[0].is_ascii_digit() && bytes[0] != b'0' {
        Some(bytes[0] - b'0')
    } else {
        None
    }
}
