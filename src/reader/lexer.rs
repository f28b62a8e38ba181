//! Splits straight-line program text into tokens.
use super::{char_ext::*, char_lexer::*, error::*, tokens::*};

type LexResult = Result<Vec<Token>, ReadError>;

pub fn lex(source: &str) -> LexResult {
    Lexer::new(source).run()
}

struct Lexer<'s> {
    lexer: CharLexer<'s>,
    tokens: Vec<Token>,
}

impl<'s> Lexer<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            lexer: CharLexer::new(source),
            tokens: vec![],
        }
    }

    fn run(mut self) -> LexResult {
        loop {
            self.lexer.consume_while(CharExt::is_non_newline_whitespace);
            if self.try_consume_comment() {
                continue;
            }

            let line = self.lexer.line();
            let Some(next) = self.lexer.peek() else {
                break;
            };

            let kind = if next == ';' || next.is_linebreak() {
                self.lexer.try_next();
                TokenKind::Terminator
            } else if next == '#' || next.is_ascii_digit() {
                self.integer(line)?
            } else if next.is_identifier_start() {
                self.word()
            } else {
                self.symbol(line, next)?
            };

            self.tokens.push(Token { line, kind });
        }

        Ok(self.tokens)
    }

    /// Skips a `//` comment up to, but not including, the line break.
    fn try_consume_comment(&mut self) -> bool {
        let mut lookahead = self.lexer.clone();
        if !(lookahead.recognise('/') && lookahead.recognise('/')) {
            return false;
        }
        self.lexer.consume_while(CharExt::is_not_linebreak);
        true
    }

    /// An integer literal, optionally written with a leading `#`.
    fn integer(&mut self, line: usize) -> Result<TokenKind, ReadError> {
        let hash = self.lexer.recognise('#');
        let digits = self.lexer.consume_while(char::is_ascii_digit);

        digits.parse().map(TokenKind::Integer).map_err(|_| {
            let text = if hash { format!("#{}", digits) } else { digits };
            ReadError::new(line, ReadErrorKind::InvalidInteger(text))
        })
    }

    fn word(&mut self) -> TokenKind {
        let word = self.lexer.consume_while(CharExt::is_identifier_continue);
        match Keyword::from_word(&word) {
            Some(keyword) => TokenKind::Keyword(keyword),
            None => TokenKind::Identifier(word),
        }
    }

    fn symbol(&mut self, line: usize, next: char) -> Result<TokenKind, ReadError> {
        let symbol = match next {
            '=' => Symbol::Assign,
            '+' => Symbol::Plus,
            '-' => Symbol::Minus,
            '*' => Symbol::Asterisk,
            '/' => Symbol::Slash,
            ',' => Symbol::Comma,
            other => return Err(ReadError::new(line, ReadErrorKind::UnknownSymbol(other))),
        };
        self.lexer.try_next();
        Ok(TokenKind::Symbol(symbol))
    }
}
