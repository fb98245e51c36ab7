//! The fixed set of built-in names and their startup registration.
//!
//! `esyscmd`/`maketemp` are deliberately absent: they are external
//! collaborators outside this crate's scope, so invoking either hits the
//! ordinary "unknown macro, pass through as text" path rather than a
//! built-in dispatch.

use m4_symtab::SymbolTable;

/// Every built-in name this crate implements, in the order the reference
/// implementation registers them at startup.
pub const BUILTIN_NAMES: &[&str] = &[
    "define",
    "undefine",
    "changequote",
    "divert",
    "dumpdef",
    "errprint",
    "ifdef",
    "ifelse",
    "include",
    "len",
    "index",
    "translit",
    "substr",
    "dnl",
    "divnum",
    "undivert",
    "incr",
    "htdist",
    "dirsep",
    "add",
    "mult",
    "sub",
    "div",
    "mod",
];

/// Registers every built-in name in `symtab` with an absent definition —
/// the symbol table's own marker for "known, but built-in."
pub fn install(symtab: &mut SymbolTable) {
    for name in BUILTIN_NAMES {
        symtab.upsert(name, None);
    }
}
