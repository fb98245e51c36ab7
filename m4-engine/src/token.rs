use m4_buffer::{BufferError, InputStream};

/// One unit of lexical input: an identifier run, or a single other byte.
///
/// An identifier is the only token shape that can name a macro; every other
/// byte, including whitespace and punctuation, is its own one-byte token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Ident(String),
    Byte(u8),
    Eof,
}

impl Token {
    pub fn is_byte(&self, b: u8) -> bool {
        matches!(self, Token::Byte(x) if *x == b)
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_cont(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Reads one token from `input`, pushing back any look-ahead byte that
/// turned out not to belong to the token.
pub fn next_token(input: &mut InputStream) -> Result<Token, BufferError> {
    let first = match input.read_byte()? {
        Some(b) => b,
        None => return Ok(Token::Eof),
    };
    if !is_ident_start(first) {
        return Ok(Token::Byte(first));
    }
    let mut ident = vec![first];
    loop {
        match input.read_byte()? {
            Some(b) if is_ident_cont(b) => ident.push(b),
            Some(b) => {
                input.push_byte(b)?;
                break;
            }
            None => break,
        }
    }
    Ok(Token::Ident(String::from_utf8_lossy(&ident).into_owned()))
}
