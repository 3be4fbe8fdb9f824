//! The scanner driver: token types in declaration order, one combined
//! tagged DFA built lazily, and a longest-match loop over a markable
//! input stream.

use std::cell::OnceCell;

use crate::automaton::{Automaton, Matcher};
use crate::regex::RegEx;
use crate::stream::InputStream;
use crate::token::{Token, TokenType, TokenTypeId};

/// Collects token types in declaration order. Earlier declarations win
/// ties against later ones.
pub struct ScannerBuilder<V> {
    types: Vec<TokenType<V>>,
}

impl<V> Default for ScannerBuilder<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> ScannerBuilder<V> {
    pub fn new() -> Self {
        Self { types: Vec::new() }
    }

    /// Declares a token type and returns its id.
    pub fn token(&mut self, token_type: TokenType<V>) -> TokenTypeId {
        let id = TokenTypeId(self.types.len());
        self.types.push(token_type);
        id
    }

    pub fn build(self) -> Scanner<V> {
        Scanner::new(self.types)
    }
}

/// A scanner over a fixed set of token types.
///
/// The combined DFA is built on the first scan and cached for the
/// scanner's lifetime. A scanner can run any number of scans, one at a
/// time; each scan borrows it together with the input stream.
pub struct Scanner<V> {
    types: Vec<TokenType<V>>,
    declared: usize,
    error_type: TokenTypeId,
    eof_type: TokenTypeId,
    dfa: OnceCell<Automaton<TokenTypeId>>,
}

impl<V> Scanner<V> {
    fn new(mut types: Vec<TokenType<V>>) -> Self {
        let declared = types.len();
        // the two implicit types: the error type tags spans nothing else
        // matched, the eof type tags the end sentinel; neither takes
        // part in the combined automaton
        let error_type = TokenTypeId(types.len());
        types.push(TokenType::implicit("ERROR", RegEx::any_char().repeated()));
        let eof_type = TokenTypeId(types.len());
        types.push(TokenType::implicit("EOF", RegEx::literal("EOF")));
        Self {
            types,
            declared,
            error_type,
            eof_type,
            dfa: OnceCell::new(),
        }
    }

    /// All token types, the implicit error and EOF types last.
    pub fn token_types(&self) -> &[TokenType<V>] {
        &self.types
    }

    pub fn token_type(&self, id: TokenTypeId) -> &TokenType<V> {
        &self.types[id.0]
    }

    pub fn error_type(&self) -> TokenTypeId {
        self.error_type
    }

    pub fn eof_type(&self) -> TokenTypeId {
        self.eof_type
    }

    /// The combined deterministic automaton over all declared types,
    /// built on first use.
    fn dfa(&self) -> &Automaton<TokenTypeId> {
        self.dfa.get_or_init(|| self.build_dfa())
    }

    fn build_dfa(&self) -> Automaton<TokenTypeId> {
        let tagged: Vec<Automaton<TokenTypeId>> = self.types[..self.declared]
            .iter()
            .enumerate()
            .map(|(i, t)| t.pattern().automaton().map_tags(|_| TokenTypeId(i)))
            .collect();
        let refs: Vec<&Automaton<TokenTypeId>> = tagged.iter().collect();
        let mut dfa = Automaton::choice(&refs).deterministic();
        // several types may accept the same prefix; the lowest declared
        // index claims the state
        for state in dfa.states_mut() {
            if state.recognizables().len() > 1 {
                let winner = state
                    .recognizables()
                    .iter()
                    .min()
                    .copied()
                    .unwrap_or_else(|| unreachable!());
                state.set_recognizables(vec![winner]);
            }
        }
        dfa
    }

    /// Scans `stream` to its end, yielding tokens in source order and a
    /// final EOF token.
    pub fn scan<'a, S: InputStream>(&'a self, stream: &'a mut S) -> Tokens<'a, V, S> {
        Tokens {
            matcher: Matcher::new(self.dfa()),
            scanner: self,
            stream,
            done: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// No character consumed yet for this token.
    Start,
    /// Inside a potential token, no accept state reached yet.
    Good,
    /// An accept state has been entered; looking for a longer match.
    Recognizing,
    /// Consuming characters no token can start with.
    Bad,
}

/// Iterator over the tokens of one stream. Ends with exactly one EOF
/// token.
pub struct Tokens<'a, V, S: InputStream> {
    scanner: &'a Scanner<V>,
    stream: &'a mut S,
    matcher: Matcher<'a, TokenTypeId>,
    done: bool,
}

impl<V, S: InputStream> Tokens<'_, V, S> {
    /// One run of the longest-match loop.
    ///
    /// The stream carries one outer mark for the whole scan and one
    /// look-ahead mark per character. Committing a character drops its
    /// look-ahead mark; committing an accepted prefix (or, after the
    /// loop, an error lexeme) also moves the outer mark to the current
    /// position, so the single final reset rolls the stream back to the
    /// last accept and leaves lookahead unread.
    fn scan_token(&mut self) -> Token<V> {
        let position = self.stream.position();
        self.matcher.reset();
        let mut lexeme: Vec<u16> = Vec::new();
        let mut consumed: Vec<u16> = Vec::new();
        let mut mode = Mode::Start;

        self.stream.mark();
        while self.stream.has_more_symbols() {
            self.stream.mark();
            let symbol = self.stream.read_next_symbol();
            let does_match = self.matcher.step(symbol);
            let does_recognize = self.matcher.is_recognizing();

            if mode == Mode::Start {
                mode = if does_match { Mode::Good } else { Mode::Bad };
            }
            if does_match != (mode == Mode::Bad) {
                // the character belongs to the current mode
                self.stream.unmark();
                consumed.push(symbol);
                if does_match && does_recognize {
                    mode = Mode::Recognizing;
                    lexeme.append(&mut consumed);
                    self.stream.unmark();
                    self.stream.mark();
                }
            } else {
                // mode flip: leave the offending character unread
                self.stream.reset();
                break;
            }
        }
        if mode != Mode::Recognizing {
            // no accept was ever reached; whatever was consumed is an
            // error lexeme
            self.matcher.reset();
            lexeme.append(&mut consumed);
            self.stream.unmark();
            self.stream.mark();
        }
        self.stream.reset();

        let lexeme = String::from_utf16_lossy(&lexeme);
        let type_id = match self.matcher.last_recognized().first() {
            Some(&id) => id,
            None => self.scanner.error_type,
        };
        let value = self.scanner.token_type(type_id).parse(&lexeme);
        Token {
            type_id,
            lexeme,
            position,
            value,
        }
    }
}

impl<V, S: InputStream> Iterator for Tokens<'_, V, S> {
    type Item = Token<V>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if !self.stream.has_more_symbols() {
            self.done = true;
            return Some(Token {
                type_id: self.scanner.eof_type,
                lexeme: "EOF".into(),
                position: self.stream.position(),
                value: None,
            });
        }
        Some(self.scan_token())
    }
}
