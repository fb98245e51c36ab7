use std::io::Write;

use m4_buffer::{BufferError, InputStream};
use m4_symtab::SymbolTable;

use crate::diversion::Diversions;
use crate::error::EngineError;
use crate::frame::{CallFrame, CallStack};
use crate::quote::QuoteState;
use crate::substitute::{strip_dollar_args, substitute_args};
use crate::token::{next_token, Token};

/// Executes a built-in once its call has been recognized. Implemented by
/// the builtin crate against the concrete [`Engine`] type, so that the
/// engine's outer loop never has to depend on the builtin table — it only
/// needs *something* that can run one.
///
/// Bare and parenthesized invocations of the same name are genuinely
/// different code paths (see [`Engine::run`]'s handling of the look-ahead
/// token after a known identifier), matching what the reference
/// implementation's two separate macro bodies do. Both entry points receive
/// `stdout` directly because `undivert` is the one built-in that writes to
/// standard output outside of the outer loop's own per-iteration flush.
pub trait BuiltinDispatcher {
    fn dispatch_bare(
        &mut self,
        engine: &mut Engine,
        name: &str,
        stdout: &mut dyn Write,
    ) -> Result<(), EngineError>;

    fn dispatch_call(
        &mut self,
        engine: &mut Engine,
        name: &str,
        args: &[Vec<u8>; 9],
        stdout: &mut dyn Write,
    ) -> Result<(), EngineError>;
}

/// Owns every piece of mutable state the outer loop touches. Built-in
/// handlers receive `&mut Engine` explicitly rather than holding a
/// back-pointer, so there is never a reference cycle between a call frame
/// and the engine that owns its stack.
pub struct Engine {
    pub input: InputStream,
    pub symtab: SymbolTable,
    pub call_stack: CallStack,
    pub quote: QuoteState,
    pub diversions: Diversions,
}

impl Engine {
    /// `drain_stdin` controls whether the input stream falls through to
    /// process stdin once pushed-back/loaded text is exhausted.
    pub fn new(drain_stdin: bool) -> Self {
        Self {
            input: InputStream::new(drain_stdin),
            symtab: SymbolTable::new(),
            call_stack: CallStack::new(),
            quote: QuoteState::new(),
            diversions: Diversions::new(),
        }
    }

    /// Runs the tokenize-dispatch-substitute loop until end-of-input,
    /// flushing diversion 0 to `stdout` at the top of every iteration and
    /// at shutdown (which also flushes diversions 1..9 in order via
    /// [`Engine::undivert_all`]).
    pub fn run(
        &mut self,
        dispatcher: &mut impl BuiltinDispatcher,
        stdout: &mut dyn Write,
    ) -> Result<(), EngineError> {
        loop {
            self.diversions.flush(0, stdout).map_err(BufferError::from)?;
            let tok = next_token(&mut self.input)?;
            log::trace!("token: {tok:?}");
            if matches!(tok, Token::Eof) {
                break;
            }
            self.step(tok, dispatcher, stdout)?;
        }
        if !self.call_stack.is_empty() {
            return Err(EngineError::UnterminatedCall);
        }
        if self.quote.is_quoting() {
            return Err(EngineError::UnterminatedQuote);
        }
        self.undivert_all(stdout)?;
        Ok(())
    }

    fn step(
        &mut self,
        tok: Token,
        dispatcher: &mut impl BuiltinDispatcher,
        stdout: &mut dyn Write,
    ) -> Result<(), EngineError> {
        if token_matches_byte(&tok, self.quote.left) {
            if self.quote.is_quoting() {
                self.sink_write(&token_bytes(&tok))?;
            }
            self.quote.depth += 1;
            return Ok(());
        }
        if token_matches_byte(&tok, self.quote.right) {
            self.quote.depth = self.quote.depth.saturating_sub(1);
            if self.quote.depth >= 1 {
                self.sink_write(&token_bytes(&tok))?;
            }
            return Ok(());
        }
        if self.quote.is_quoting() {
            return self.sink_write(&token_bytes(&tok));
        }
        if let Token::Ident(name) = &tok {
            if self.symtab.contains(name) {
                let name = name.clone();
                return self.invoke(name, dispatcher, stdout);
            }
        }
        if !self.call_stack.is_empty() {
            let depth = self.call_stack.top().expect("checked non-empty").bracket_depth;
            if tok.is_byte(b')') && depth == 1 {
                return self.finalize_call(dispatcher, stdout);
            }
            if tok.is_byte(b')') {
                self.sink_write(&token_bytes(&tok))?;
                self.call_stack.top_mut().expect("checked non-empty").bracket_depth -= 1;
                return Ok(());
            }
            if tok.is_byte(b'(') {
                self.sink_write(&token_bytes(&tok))?;
                self.call_stack.top_mut().expect("checked non-empty").bracket_depth += 1;
                return Ok(());
            }
            if tok.is_byte(b',') && depth == 1 {
                self.call_stack.top_mut().expect("checked non-empty").start_next_arg()?;
                self.eat_whitespace()?;
                return Ok(());
            }
        }
        self.sink_write(&token_bytes(&tok))
    }

    /// Reads the look-ahead token after a known macro name and either opens
    /// a call frame (on `(`) or runs the "bare" path (every other token,
    /// which is pushed back unread).
    fn invoke(
        &mut self,
        name: String,
        dispatcher: &mut impl BuiltinDispatcher,
        stdout: &mut dyn Write,
    ) -> Result<(), EngineError> {
        let next = next_token(&mut self.input)?;
        if next.is_byte(b'(') {
            let definition = self.symtab.get_def(&name).map(str::to_string);
            self.call_stack.push(CallFrame::new(name, definition));
            self.eat_whitespace()?;
        } else {
            self.push_back_token(&next)?;
            let definition = self.symtab.get_def(&name).map(str::to_string);
            match definition {
                None => dispatcher.dispatch_bare(self, &name, stdout)?,
                Some(def) => {
                    let stripped = strip_dollar_args(&def);
                    self.input.push_str(&stripped)?;
                }
            }
        }
        Ok(())
    }

    /// Finalizes the innermost pending call on its matching close paren:
    /// either runs the built-in with its collected arguments, or
    /// substitutes `$n` into the snapshot definition and re-feeds it.
    fn finalize_call(
        &mut self,
        dispatcher: &mut impl BuiltinDispatcher,
        stdout: &mut dyn Write,
    ) -> Result<(), EngineError> {
        {
            let frame = self.call_stack.top_mut().expect("ARG_END implies a frame");
            frame.bracket_depth -= 1;
        }
        let (name, builtin_args) = {
            let frame = self.call_stack.top().expect("frame still present");
            let is_builtin = frame.definition.is_none();
            (
                frame.name.clone(),
                is_builtin.then(|| frame.args_as_bytes()),
            )
        };
        if let Some(args) = builtin_args {
            dispatcher.dispatch_call(self, &name, &args, stdout)?;
        } else {
            let expanded = {
                let frame = self.call_stack.top().expect("frame still present");
                let def = frame.definition.as_deref().unwrap_or("");
                substitute_args(def, frame)
            };
            self.input.push_bytes(&expanded)?;
        }
        self.call_stack.pop();
        Ok(())
    }

    fn eat_whitespace(&mut self) -> Result<(), EngineError> {
        loop {
            let t = next_token(&mut self.input)?;
            if is_whitespace_token(&t) {
                continue;
            }
            self.push_back_token(&t)?;
            return Ok(());
        }
    }

    fn push_back_token(&mut self, t: &Token) -> Result<(), EngineError> {
        match t {
            Token::Ident(s) => self.input.push_str(s)?,
            Token::Byte(b) => self.input.push_byte(*b)?,
            Token::Eof => {}
        }
        Ok(())
    }

    /// Appends to the top frame's active argument if a call is pending,
    /// otherwise to the active diversion buffer. Public so built-in
    /// handlers (e.g. `dnl`'s bare form has nothing to write, but others
    /// route text here the same way the outer loop does) can target the
    /// same sink the loop itself would have used.
    pub fn sink_write(&mut self, bytes: &[u8]) -> Result<(), EngineError> {
        if let Some(frame) = self.call_stack.top_mut() {
            frame.push_to_active_arg(bytes)?;
        } else {
            self.diversions.active_buf().push_bytes(bytes)?;
        }
        Ok(())
    }

    /// Flushes diversions 0 through 9, in order, to `stdout`. Diversion 10
    /// is never included.
    pub fn undivert_all(&mut self, stdout: &mut dyn Write) -> Result<(), EngineError> {
        for k in 0..10u8 {
            self.diversions.flush(k, stdout).map_err(BufferError::from)?;
        }
        Ok(())
    }
}

fn token_bytes(t: &Token) -> Vec<u8> {
    match t {
        Token::Ident(s) => s.clone().into_bytes(),
        Token::Byte(b) => vec![*b],
        Token::Eof => Vec::new(),
    }
}

fn token_matches_byte(t: &Token, b: u8) -> bool {
    match t {
        Token::Byte(x) => *x == b,
        Token::Ident(s) => s.len() == 1 && s.as_bytes()[0] == b,
        Token::Eof => false,
    }
}

fn is_whitespace_token(t: &Token) -> bool {
    matches!(t, Token::Byte(b) if matches!(b, b' ' | b'\t' | b'\n' | b'\r'))
}
