//! `define`, `undefine`, `changequote`, `ifdef`, `ifelse`, `include`,
//! `dumpdef`, `errprint` — the binding, conditional, and diagnostic
//! built-ins that don't belong to the arithmetic or diversion groups.

use std::io::Write;
use std::path::Path;

use m4_engine::{BuiltinError, Engine};

pub fn define(engine: &mut Engine, args: &[Vec<u8>; 9]) {
    let name = String::from_utf8_lossy(&args[0]).into_owned();
    let def = String::from_utf8_lossy(&args[1]).into_owned();
    engine.symtab.upsert(&name, Some(def));
}

pub fn undefine(engine: &mut Engine, args: &[Vec<u8>; 9]) -> Result<(), BuiltinError> {
    let name = String::from_utf8_lossy(&args[0]).into_owned();
    if !engine.symtab.delete(&name) {
        return Err(BuiltinError::UnknownUndefine(name));
    }
    Ok(())
}

/// Both quote bytes must be single graphic bytes, distinct from each other,
/// and none of comma or either parenthesis — matching the reference's
/// `changequote` validation exactly.
pub fn changequote(engine: &mut Engine, args: &[Vec<u8>; 9]) -> Result<(), BuiltinError> {
    let l = single_valid_quote_byte("changequote", &args[0])?;
    let r = single_valid_quote_byte("changequote", &args[1])?;
    if l == r {
        return Err(BuiltinError::malformed(
            "changequote",
            "quotes must be different single graphic characters, not a comma or parenthesis",
        ));
    }
    engine.quote.left = l;
    engine.quote.right = r;
    Ok(())
}

fn single_valid_quote_byte(name: &'static str, bytes: &[u8]) -> Result<u8, BuiltinError> {
    let invalid = || {
        BuiltinError::malformed(
            name,
            "quotes must be different single graphic characters, not a comma or parenthesis",
        )
    };
    if bytes.len() != 1 {
        return Err(invalid());
    }
    let b = bytes[0];
    if !b.is_ascii_graphic() || matches!(b, b',' | b'(' | b')') {
        return Err(invalid());
    }
    Ok(b)
}

pub fn ifdef(engine: &mut Engine, args: &[Vec<u8>; 9]) -> Result<(), BuiltinError> {
    let name = String::from_utf8_lossy(&args[0]);
    let chosen = if engine.symtab.contains(&name) { &args[1] } else { &args[2] };
    engine.input.push_bytes(chosen)?;
    Ok(())
}

pub fn ifelse(engine: &mut Engine, args: &[Vec<u8>; 9]) -> Result<(), BuiltinError> {
    let chosen = if args[0] == args[1] { &args[2] } else { &args[3] };
    engine.input.push_bytes(chosen)?;
    Ok(())
}

pub fn include(engine: &mut Engine, args: &[Vec<u8>; 9]) -> Result<(), BuiltinError> {
    let path = String::from_utf8_lossy(&args[0]).into_owned();
    engine.input.load_file(Path::new(&path)).map_err(|_| {
        BuiltinError::malformed("include", format!("failed to include file: {path}"))
    })
}

pub fn dumpdef(engine: &Engine, args: &[Vec<u8>; 9]) {
    for raw in args {
        if raw.is_empty() {
            continue;
        }
        let name = String::from_utf8_lossy(raw);
        match engine.symtab.contains(&name).then(|| engine.symtab.get_def(&name)) {
            Some(Some(def)) => eprintln!("{name}: {def}"),
            Some(None) => eprintln!("{name}: built-in"),
            None => eprintln!("{name}: undefined"),
        }
    }
}

pub fn errprint(args: &[Vec<u8>; 9]) {
    let mut stderr = std::io::stderr();
    for a in args {
        if !a.is_empty() {
            let _ = stderr.write_all(a);
            let _ = stderr.write_all(b"\n");
        }
    }
}
