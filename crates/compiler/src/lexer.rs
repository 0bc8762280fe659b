use crate::token::{Token, TokenKind};

/// A cursor over the source buffer. Byte-oriented (not `char`-oriented,
/// matching the reference's `char*` cursor) since Ape source is restricted
/// to ASCII identifiers, operators, and comments.
pub struct Lexer<'src> {
    src: &'src [u8],
    start: usize,
    current: usize,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Lexer {
            src: source.as_bytes(),
            start: 0,
            current: 0,
        }
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.src.len()
    }

    fn advance(&mut self) -> u8 {
        let c = self.src[self.current];
        self.current += 1;
        c
    }

    fn peek(&self) -> u8 {
        if self.is_at_end() {
            0
        } else {
            self.src[self.current]
        }
    }

    fn peek_next(&self) -> u8 {
        if self.current + 1 >= self.src.len() {
            0
        } else {
            self.src[self.current + 1]
        }
    }

    fn matches(&mut self, expected: u8) -> bool {
        if self.is_at_end() || self.src[self.current] != expected {
            return false;
        }
        self.current += 1;
        true
    }

    fn lexeme(&self) -> &'src str {
        std::str::from_utf8(&self.src[self.start..self.current])
            .expect("Ape source is ASCII-only within a token span")
    }

    fn make(&self, kind: TokenKind) -> Token<'src> {
        Token::new(kind, self.lexeme())
    }

    fn error(&self, message: &'static str) -> Token<'src> {
        Token::new(TokenKind::Error, message)
    }

    fn skip_whitespace(&mut self) {
        loop {
            match self.peek() {
                b' ' | b'\r' | b'\t' | b'\n' => {
                    self.advance();
                }
                b'#' => {
                    while self.peek() != b'\n' && !self.is_at_end() {
                        self.advance();
                    }
                }
                _ => return,
            }
        }
    }

    /// The keyword trie, ported one-to-one from the reference's
    /// `identifierType`: it switches on the first one-to-three bytes of the
    /// lexeme rather than hashing or doing a table lookup.
    fn identifier_kind(&self) -> TokenKind {
        let lexeme = &self.src[self.start..self.current];
        let rest = |offset: usize, tail: &[u8]| -> bool {
            lexeme.len() == offset + tail.len() && &lexeme[offset..] == tail
        };
        match lexeme.first() {
            Some(b'a') if lexeme.len() > 1 => match lexeme[1] {
                b'p' if rest(2, b"e") => TokenKind::Ape,
                b'a' if rest(2, b"h") => TokenKind::Minus,
                b's' if rest(2, b"k") => TokenKind::Ask,
                _ => TokenKind::Id,
            },
            Some(b'b') if lexeme.len() > 1 => match lexeme[1] {
                b'a' if rest(2, b"nana") => TokenKind::Banana,
                b'u' if rest(2, b"nch") => TokenKind::Bunch,
                _ => TokenKind::Id,
            },
            Some(b'c') if lexeme.len() > 2 && lexeme[1] == b'a' => match lexeme[2] {
                b'n' if rest(3, b"opy") => TokenKind::Canopy,
                b't' if rest(3, b"ch") => TokenKind::Catch,
                _ => TokenKind::Id,
            },
            Some(b'e') if lexeme.len() > 1 => match lexeme[1] {
                b'l' if rest(2, b"se") => TokenKind::Else,
                b'e' if rest(2, b"k") => TokenKind::Star,
                _ => TokenKind::Id,
            },
            Some(b'f') if rest(1, b"alse") => TokenKind::False,
            Some(b'f') if rest(1, b"orage") => TokenKind::Forage,
            Some(b'g') if rest(1, b"ive") => TokenKind::Give,
            Some(b'i') if rest(1, b"f") => TokenKind::If,
            Some(b'i') if rest(1, b"nscribe") => TokenKind::Inscribe,
            Some(b'n') if rest(1, b"il") => TokenKind::Nil,
            Some(b'o') if lexeme.len() > 2 && lexeme[1] == b'o' && lexeme[2] == b'h' => {
                TokenKind::Plus
            }
            Some(b'o') if lexeme.len() > 2 && lexeme[1] == b'o' && lexeme[2] == b'k' => {
                TokenKind::Slash
            }
            Some(b's') if lexeme.len() > 1 => match lexeme[1] {
                b'w' if rest(2, b"ing") => TokenKind::Swing,
                b'u' if rest(2, b"mmon") => TokenKind::Summon,
                _ => TokenKind::Id,
            },
            Some(b't') if lexeme.len() > 2 && lexeme[1] == b'r' => match lexeme[2] {
                b'e' if rest(3, b"e") => TokenKind::Tree,
                b'u' if rest(3, b"e") => TokenKind::True,
                b'i' if rest(3, b"be") => TokenKind::Tribe,
                _ => TokenKind::Id,
            },
            Some(b't') if lexeme.len() > 1 && lexeme[1] == b'u' && rest(2, b"mble") => {
                TokenKind::Tumble
            }
            Some(b'r') if rest(1, b"ipe") => TokenKind::Ripe,
            Some(b'y') if rest(1, b"ellow") => TokenKind::Yellow,
            _ => TokenKind::Id,
        }
    }

    fn identifier(&mut self) -> Token<'src> {
        while self.peek().is_ascii_alphanumeric() || self.peek() == b'_' {
            self.advance();
        }
        self.make(self.identifier_kind())
    }

    fn number(&mut self) -> Token<'src> {
        while self.peek().is_ascii_digit() {
            self.advance();
        }
        if self.peek() == b'.' && self.peek_next().is_ascii_digit() {
            self.advance();
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }
        self.make(TokenKind::Num)
    }

    fn string(&mut self) -> Token<'src> {
        while self.peek() != b'"' && !self.is_at_end() {
            self.advance();
        }
        if self.is_at_end() {
            return self.error("Unterminated string.");
        }
        self.advance();
        self.make(TokenKind::String)
    }

    pub fn scan(&mut self) -> Token<'src> {
        self.skip_whitespace();
        self.start = self.current;

        if self.is_at_end() {
            return self.make(TokenKind::Eof);
        }

        let c = self.advance();
        if c.is_ascii_alphabetic() || c == b'_' {
            return self.identifier();
        }
        if c.is_ascii_digit() {
            return self.number();
        }

        match c {
            b'(' => self.make(TokenKind::LParen),
            b')' => self.make(TokenKind::RParen),
            b'{' => self.make(TokenKind::LBrace),
            b'}' => self.make(TokenKind::RBrace),
            b'[' => self.make(TokenKind::LBracket),
            b']' => self.make(TokenKind::RBracket),
            b':' => self.make(TokenKind::Colon),
            b',' => self.make(TokenKind::Comma),
            b'!' => {
                let k = if self.matches(b'=') {
                    TokenKind::BangEqual
                } else {
                    TokenKind::Bang
                };
                self.make(k)
            }
            b'=' => {
                let k = if self.matches(b'=') {
                    TokenKind::EqualEqual
                } else {
                    TokenKind::Equal
                };
                self.make(k)
            }
            b'<' => {
                let k = if self.matches(b'=') {
                    TokenKind::LessEqual
                } else {
                    TokenKind::Less
                };
                self.make(k)
            }
            b'>' => {
                let k = if self.matches(b'=') {
                    TokenKind::GreaterEqual
                } else {
                    TokenKind::Greater
                };
                self.make(k)
            }
            b'"' => self.string(),
            _ => self.error("Unexpected character."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(src);
        let mut out = Vec::new();
        loop {
            let tok = lexer.scan();
            let done = tok.kind == TokenKind::Eof;
            out.push(tok.kind);
            if done {
                break;
            }
        }
        out
    }

    #[test]
    fn keyword_trie_covers_every_keyword() {
        assert_eq!(kinds("ape")[0], TokenKind::Ape);
        assert_eq!(kinds("tribe")[0], TokenKind::Tribe);
        assert_eq!(kinds("give")[0], TokenKind::Give);
        assert_eq!(kinds("tree")[0], TokenKind::Tree);
        assert_eq!(kinds("ask")[0], TokenKind::Ask);
        assert_eq!(kinds("swing")[0], TokenKind::Swing);
        assert_eq!(kinds("banana")[0], TokenKind::Banana);
        assert_eq!(kinds("if")[0], TokenKind::If);
        assert_eq!(kinds("else")[0], TokenKind::Else);
        assert_eq!(kinds("tumble")[0], TokenKind::Tumble);
        assert_eq!(kinds("catch")[0], TokenKind::Catch);
        assert_eq!(kinds("summon")[0], TokenKind::Summon);
        assert_eq!(kinds("ripe")[0], TokenKind::Ripe);
        assert_eq!(kinds("yellow")[0], TokenKind::Yellow);
        assert_eq!(kinds("true")[0], TokenKind::True);
        assert_eq!(kinds("false")[0], TokenKind::False);
        assert_eq!(kinds("nil")[0], TokenKind::Nil);
        assert_eq!(kinds("bunch")[0], TokenKind::Bunch);
        assert_eq!(kinds("canopy")[0], TokenKind::Canopy);
        assert_eq!(kinds("forage")[0], TokenKind::Forage);
        assert_eq!(kinds("inscribe")[0], TokenKind::Inscribe);
        assert_eq!(kinds("ooh")[0], TokenKind::Plus);
        assert_eq!(kinds("aah")[0], TokenKind::Minus);
        assert_eq!(kinds("eek")[0], TokenKind::Star);
        assert_eq!(kinds("ook")[0], TokenKind::Slash);
    }

    #[test]
    fn identifiers_that_shadow_keyword_prefixes_stay_ids() {
        assert_eq!(kinds("apex")[0], TokenKind::Id);
        assert_eq!(kinds("tribesman")[0], TokenKind::Id);
        assert_eq!(kinds("oohing")[0], TokenKind::Id);
    }

    #[test]
    fn comment_runs_to_end_of_line() {
        let toks = kinds("ape x = 1 # trailing comment\ntree x");
        assert!(toks.contains(&TokenKind::Tree));
    }

    #[test]
    fn unterminated_string_is_an_error_token() {
        let mut lexer = Lexer::new("\"abc");
        let tok = lexer.scan();
        assert_eq!(tok.kind, TokenKind::Error);
    }

    #[test]
    fn number_allows_optional_fraction() {
        let mut lexer = Lexer::new("12.5");
        let tok = lexer.scan();
        assert_eq!(tok.kind, TokenKind::Num);
        assert_eq!(tok.text, "12.5");
    }

    #[test]
    fn two_char_operators_are_greedy() {
        assert_eq!(kinds("!=")[0], TokenKind::BangEqual);
        assert_eq!(kinds(">=")[0], TokenKind::GreaterEqual);
        assert_eq!(kinds("<=")[0], TokenKind::LessEqual);
        assert_eq!(kinds("!")[0], TokenKind::Bang);
    }
}
