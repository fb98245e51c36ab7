//! `len`, `index`, `substr`, `translit` — the string-inspection built-ins.
//!
//! All four operate on raw bytes, never on a decoded `str`: an argument is
//! an arbitrary byte sequence (§3 of the specification), and indexing a
//! `String` at a byte offset that lands inside a multi-byte UTF-8 sequence
//! panics even when that sequence is itself perfectly valid — `substr` in
//! particular must be able to slice at any byte offset without regard to
//! character boundaries, exactly like the reference's `memcpy`-based cut.

use m4_engine::{BuiltinError, Engine};

use crate::arith::parse_num;

fn push(engine: &mut Engine, bytes: &[u8]) -> Result<(), BuiltinError> {
    engine.input.push_bytes(bytes)?;
    Ok(())
}

pub fn len(engine: &mut Engine, args: &[Vec<u8>; 9]) -> Result<(), BuiltinError> {
    push(engine, args[0].len().to_string().as_bytes())
}

/// First byte offset of `args[1]` within `args[0]`, or `-1`. An empty
/// needle matches at offset 0, the same as `str::find`'s convention.
pub fn index(engine: &mut Engine, args: &[Vec<u8>; 9]) -> Result<(), BuiltinError> {
    let offset = find_subslice(&args[0], &args[1]).map(|p| p as i64).unwrap_or(-1);
    push(engine, offset.to_string().as_bytes())
}

fn find_subslice(hay: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    if needle.len() > hay.len() {
        return None;
    }
    hay.windows(needle.len()).position(|w| w == needle)
}

/// `w` and `n` are parsed as plain decimal digit runs, exactly like the
/// arithmetic built-ins' `str_to_num` — a parse failure is fatal, not a
/// silent empty result.
pub fn substr(engine: &mut Engine, args: &[Vec<u8>; 9]) -> Result<(), BuiltinError> {
    let s = &args[0];
    if s.is_empty() {
        return Ok(());
    }
    let w = parse_num(&args[1]).ok_or_else(|| BuiltinError::malformed("substr", "invalid index or length"))?
        as usize;
    let n = parse_num(&args[2]).ok_or_else(|| BuiltinError::malformed("substr", "invalid index or length"))?
        as usize;
    if w < s.len() {
        let end = s.len().min(w.saturating_add(n));
        push(engine, &s[w..end])?;
    }
    Ok(())
}

/// Builds the 256-entry transliteration map and applies it to `s`.
///
/// Mapping rule, matching the reference exactly: walk `from` and `to` in
/// parallel, mapping `from[i] -> to[i]` unless `from[i]` already has a
/// mapping (first occurrence wins); any byte left over in `from` once `to`
/// is exhausted maps to deletion, not pass-through (Design Notes open
/// question (b) — this is the historical `m4` behavior, not an oversight).
pub fn translit(engine: &mut Engine, args: &[Vec<u8>; 9]) -> Result<(), BuiltinError> {
    const PASS_THROUGH: i16 = -1;
    const DELETE: i16 = -2;
    let mut map = [PASS_THROUGH; 256];

    let from = &args[1];
    let to = &args[2];
    let mut i = 0;
    while i < from.len() && i < to.len() {
        let slot = &mut map[from[i] as usize];
        if *slot == PASS_THROUGH {
            *slot = to[i] as i16;
        }
        i += 1;
    }
    while i < from.len() {
        map[from[i] as usize] = DELETE;
        i += 1;
    }

    let mut out = Vec::with_capacity(args[0].len());
    for &b in &args[0] {
        match map[b as usize] {
            PASS_THROUGH => out.push(b),
            DELETE => {}
            repl => out.push(repl as u8),
        }
    }
    push(engine, &out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(vals: &[&[u8]]) -> [Vec<u8>; 9] {
        std::array::from_fn(|i| vals.get(i).map(|v| v.to_vec()).unwrap_or_default())
    }

    fn run(engine: &mut Engine) -> Vec<u8> {
        let mut buf = Vec::new();
        while let Some(b) = engine.input.read_byte().unwrap() {
            buf.push(b);
        }
        buf
    }

    // ==================== len/index TESTS ====================

    #[test]
    fn len_counts_bytes() {
        let mut e = Engine::new(false);
        len(&mut e, &args(&[b"goat"])).unwrap();
        assert_eq!(run(&mut e), b"4");
    }

    #[test]
    fn len_counts_raw_bytes_not_decoded_chars() {
        // A lone 0xFF is not valid UTF-8; byte length must still be 1,
        // not the 3 bytes a lossy U+FFFD replacement would report.
        let mut e = Engine::new(false);
        len(&mut e, &args(&[&[0xFF]])).unwrap();
        assert_eq!(run(&mut e), b"1");
    }

    #[test]
    fn index_finds_first_occurrence() {
        let mut e = Engine::new(false);
        index(&mut e, &args(&[b"elephant", b"ha"])).unwrap();
        assert_eq!(run(&mut e), b"6");
    }

    #[test]
    fn index_reports_minus_one_when_absent() {
        let mut e = Engine::new(false);
        index(&mut e, &args(&[b"elephant", b"zz"])).unwrap();
        assert_eq!(run(&mut e), b"-1");
    }

    // ==================== substr TESTS ====================

    #[test]
    fn substr_extracts_a_window() {
        let mut e = Engine::new(false);
        substr(&mut e, &args(&[b"elephant", b"2", b"4"])).unwrap();
        assert_eq!(run(&mut e), b"epha");
    }

    #[test]
    fn substr_out_of_range_offset_is_empty() {
        let mut e = Engine::new(false);
        substr(&mut e, &args(&[b"cat", b"10", b"4"])).unwrap();
        assert_eq!(run(&mut e), b"");
    }

    #[test]
    fn substr_clamps_length_to_remaining_bytes() {
        let mut e = Engine::new(false);
        substr(&mut e, &args(&[b"cat", b"1", b"50"])).unwrap();
        assert_eq!(run(&mut e), b"at");
    }

    #[test]
    fn substr_cuts_inside_a_multibyte_char_without_panicking() {
        // "café" is 5 bytes (c-a-f-\xc3-\xa9); offset 3 lands mid-"é".
        let s = "café".as_bytes();
        let mut e = Engine::new(false);
        substr(&mut e, &args(&[s, b"3", b"1"])).unwrap();
        assert_eq!(run(&mut e), vec![s[3]]);
    }

    // ==================== translit TESTS ====================

    #[test]
    fn translit_maps_replaces_and_deletes() {
        let mut e = Engine::new(false);
        translit(&mut e, &args(&[b"bananas", b"abcs", b"xyz"])).unwrap();
        assert_eq!(run(&mut e), b"yxnxnx");
    }

    #[test]
    fn translit_first_mapping_wins_on_repeated_from_byte() {
        let mut e = Engine::new(false);
        translit(&mut e, &args(&[b"aa", b"aa", b"xy"])).unwrap();
        assert_eq!(run(&mut e), b"xx");
    }

    #[test]
    fn translit_passes_through_bytes_absent_from_from() {
        let mut e = Engine::new(false);
        translit(&mut e, &args(&[b"hello", b"l", b"L"])).unwrap();
        assert_eq!(run(&mut e), b"heLLo");
    }
}
