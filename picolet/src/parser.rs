//! The lexer.
//!
//! [`Parser`] walks a source string byte by byte and produces a stream of
//! typed tokens whose `begin..end` byte ranges point back into the source.
//! It is a small state machine: `in_string` is set while inside a bare word,
//! `in_quote` inside a double-quoted word, and `in_brace` (with a nesting
//! level) inside a braced literal.  The kind of the previously emitted token
//! is remembered because it decides both comment position and word
//! boundaries; its initial value is [`Token::Eol`] so the first real token
//! starts a statement.
//!
//! The lexer never fails.  Unmatched braces, quotes, and brackets are
//! consumed to end of input and whatever was collected is emitted; the
//! evaluator rejects ill-formed streams downstream if it must.
//!
//! # Example
//!
//! ```
//! use picolet::{Parser, Token};
//!
//! let mut parser = Parser::new("set x 5");
//! assert_eq!(parser.next_token(), Token::Esc);
//! assert_eq!(parser.token_body(), "set");
//! assert_eq!(parser.next_token(), Token::Sep);
//! ```

use std::fmt;

/// A lexical token kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Token {
    /// An ordinary string fragment.
    Esc,
    /// A literal needing no further substitution: a braced word, or a lone
    /// `$` with no variable name after it.
    Str,
    /// A command substitution; the body is a script to evaluate.
    Cmd,
    /// A variable reference; the body is the name without the `$` sigil.
    Var,
    /// Intra-line whitespace separating arguments.
    Sep,
    /// A statement terminator: newline or `;`.
    Eol,
    /// End of source.
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Token::Esc => "TK_ESC",
            Token::Str => "TK_STR",
            Token::Cmd => "TK_CMD",
            Token::Var => "TK_VAR",
            Token::Sep => "TK_SEP",
            Token::Eol => "TK_EOL",
            Token::Eof => "TK_EOF",
        };
        write!(f, "{name}")
    }
}

/// A stateful lexer over a borrowed source slice.
///
/// The parser holds only byte offsets into the source, so the source must
/// outlive any token bodies taken from it.  Sub-parsers created for bracket
/// matching borrow the same slice.
pub struct Parser<'a> {
    body: &'a str,

    cursor: usize,
    begin: usize,
    end: usize,

    /// Kind of the most recently returned token.
    token: Token,

    in_string: bool,
    in_quote: bool,
    in_brace: bool,
    brace_level: usize,

    /// Byte that ends this parser's input, for the bracket-matching
    /// sub-parser; zero means none.
    terminator: u8,
}

impl<'a> Parser<'a> {
    pub fn new(body: &'a str) -> Parser<'a> {
        Parser {
            body,
            cursor: 0,
            begin: 0,
            end: 0,
            token: Token::Eol,
            in_string: false,
            in_quote: false,
            in_brace: false,
            brace_level: 0,
            terminator: 0,
        }
    }

    /// The kind of the most recently returned token.  Before the first call
    /// to [`next_token`](Self::next_token) this is [`Token::Eol`].
    pub fn token(&self) -> Token {
        self.token
    }

    /// Byte offset where the current token's body begins.
    pub fn begin(&self) -> usize {
        self.begin
    }

    /// Byte offset one past the current token's body.
    pub fn end(&self) -> usize {
        self.end
    }

    /// The current token's slice of the source.
    pub fn token_body(&self) -> &'a str {
        &self.body[self.begin..self.end]
    }

    /// Formats the current token as one compact JSON trace record.
    /// Newlines, carriage returns, and tabs in the body are escaped as
    /// two-character sequences.
    pub fn trace_record(&self) -> String {
        let body = self.token_body();
        let mut escaped = String::with_capacity(body.len());
        for ch in body.chars() {
            match ch {
                '\n' => escaped.push_str("\\n"),
                '\r' => escaped.push_str("\\r"),
                '\t' => escaped.push_str("\\t"),
                _ => escaped.push(ch),
            }
        }
        format!(
            "{{\"type\":\"{}\",\"begin\":{},\"end\":{},\"body\":\"{}\"}}",
            self.token, self.begin, self.end, escaped
        )
    }

    fn done(&self) -> bool {
        self.cursor >= self.body.len()
    }

    fn peek(&self) -> u8 {
        self.body.as_bytes()[self.cursor]
    }

    fn getc(&mut self) -> u8 {
        let c = self.peek();
        self.cursor += 1;
        c
    }

    fn back(&mut self) {
        self.cursor -= 1;
    }

    /// Consumes a run of intra-line whitespace.  Newlines and semicolons are
    /// statement terminators and are left for the next token.
    fn skip_blanks(&mut self) {
        while !self.done() {
            match self.peek() {
                b' ' | b'\t' | b'\r' => {
                    self.getc();
                }
                _ => break,
            }
        }
    }

    /// Consumes the run of whitespace and semicolons following a statement
    /// terminator, collapsing blank statements into one EOL.
    fn skip_statement_gap(&mut self) {
        while !self.done() {
            match self.peek() {
                b' ' | b'\t' | b'\r' | b'\n' | b';' => {
                    self.getc();
                }
                _ => break,
            }
        }
    }

    /// Drives a sub-parser until it consumes its terminating byte, then
    /// advances this parser past everything the sub-parser saw.  Nested
    /// `[` tokens recurse again, so bracket nesting is matched.
    fn recurse(&mut self, sub: &mut Parser, terminator: u8) {
        sub.terminator = terminator;
        loop {
            if sub.next_token() == Token::Eof {
                break;
            }
        }
        self.cursor += sub.cursor;
    }

    /// Advances to the next token and returns its kind.  After the last real
    /// token one EOL is emitted, so a trailing unterminated command is still
    /// dispatched; after that the parser returns EOF indefinitely.
    pub fn next_token(&mut self) -> Token {
        loop {
            if self.done() {
                self.token = if self.token != Token::Eol && self.token != Token::Eof {
                    Token::Eol
                } else {
                    Token::Eof
                };
                self.begin = self.cursor;
                self.end = self.cursor;
                return self.token;
            }

            let at_statement = self.token == Token::Eol;
            self.token = Token::Esc;
            self.begin = self.cursor;
            let mut adj = 0;
            let mut in_comment = false;

            while !self.done() {
                adj = 0;
                let c = self.getc();

                if self.terminator != 0
                    && c == self.terminator
                    && !self.in_brace
                    && !self.in_quote
                {
                    self.end = self.cursor - 1;
                    return Token::Eof;
                }

                match c {
                    b'{' => {
                        if self.in_quote || self.in_string {
                            continue;
                        }
                        if !self.in_brace {
                            // The opening brace is not part of the body.
                            self.begin += 1;
                            self.token = Token::Str;
                            self.in_brace = true;
                        }
                        self.brace_level += 1;
                    }

                    b'\\' if self.in_brace => {
                        // Inside braces a backslash shields the next byte
                        // from brace counting.
                        if !self.done() {
                            self.getc();
                        }
                    }

                    b'}' => {
                        if self.in_quote || self.in_string {
                            continue;
                        }
                        if self.brace_level > 0 {
                            self.brace_level -= 1;
                            if self.brace_level == 0 {
                                self.in_brace = false;
                                adj = 1; // skip the closing brace
                                break;
                            }
                        } else {
                            // Unmatched `}` is ordinary text.
                            self.in_string = true;
                        }
                    }

                    b'[' => {
                        if self.in_string || self.in_quote || self.in_brace {
                            continue;
                        }
                        self.begin += 1;
                        let mut sub = Parser::new(&self.body[self.cursor..]);
                        self.recurse(&mut sub, b']');
                        adj = 1;
                        self.token = Token::Cmd;
                        break;
                    }

                    b'$' => {
                        if self.in_string || self.in_brace {
                            continue;
                        }
                        if self.in_quote && self.cursor != self.begin + 1 {
                            // A variable is cutting a quoted run short; emit
                            // the run first and revisit the `$` next call.
                            self.back();
                            break;
                        }
                        let mut name_len = 0;
                        while !self.done() {
                            let n = self.peek();
                            if n.is_ascii_alphanumeric() || n == b'_' {
                                self.getc();
                                name_len += 1;
                            } else {
                                break;
                            }
                        }
                        if name_len == 0 {
                            // A `$` with no name after it is literal text.
                            self.token = Token::Str;
                        } else {
                            self.begin += 1;
                            self.token = Token::Var;
                        }
                        break;
                    }

                    b'#' => {
                        if self.in_string || self.in_quote || self.in_brace {
                            continue;
                        }
                        if !at_statement {
                            // Only a `#` in command position starts a
                            // comment; elsewhere it is ordinary text.
                            self.in_string = true;
                            continue;
                        }
                        while !self.done() {
                            if self.getc() == b'\n' {
                                break;
                            }
                        }
                        in_comment = true;
                        break;
                    }

                    b'"' => {
                        if self.in_string || self.in_brace {
                            continue;
                        }
                        if self.in_quote {
                            self.in_quote = false;
                            adj = 1; // skip the closing quote
                            break;
                        }
                        self.in_quote = true;
                        self.begin += 1;
                        adj = 1;
                    }

                    b' ' | b'\t' | b'\r' => {
                        if self.in_brace {
                            continue;
                        }
                        if self.in_string {
                            // Whitespace ends the bare word; back up so the
                            // separator is tokenized on its own.
                            self.back();
                            self.in_string = false;
                            break;
                        }
                        if self.in_quote {
                            continue;
                        }
                        self.token = Token::Sep;
                        self.skip_blanks();
                        break;
                    }

                    b'\n' | b';' => {
                        if self.in_brace {
                            continue;
                        }
                        if self.in_string {
                            self.back();
                            self.in_string = false;
                            break;
                        }
                        if self.in_quote {
                            continue;
                        }
                        self.token = Token::Eol;
                        self.skip_statement_gap();
                        break;
                    }

                    _ => {
                        if !self.in_quote && !self.in_brace {
                            self.in_string = true;
                        }
                    }
                }
            }

            if in_comment {
                // The statement hasn't started yet; lex from the top.
                self.token = Token::Eol;
                continue;
            }

            self.end = self.cursor.saturating_sub(adj).max(self.begin);
            return self.token;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> Vec<(Token, String)> {
        let mut parser = Parser::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = parser.next_token();
            if token == Token::Eof {
                break;
            }
            tokens.push((token, parser.token_body().to_string()));
        }
        tokens
    }

    fn kinds(source: &str) -> Vec<Token> {
        lex(source).into_iter().map(|(kind, _)| kind).collect()
    }

    #[test]
    fn simple_command() {
        assert_eq!(
            lex("set x 5\n"),
            vec![
                (Token::Esc, "set".into()),
                (Token::Sep, " ".into()),
                (Token::Esc, "x".into()),
                (Token::Sep, " ".into()),
                (Token::Esc, "5".into()),
                (Token::Eol, "\n".into()),
            ]
        );
    }

    #[test]
    fn trailing_command_gets_a_flush_eol() {
        assert_eq!(
            kinds("set x 5"),
            vec![Token::Esc, Token::Sep, Token::Esc, Token::Sep, Token::Esc, Token::Eol]
        );
    }

    #[test]
    fn eof_is_sticky() {
        let mut parser = Parser::new("a");
        assert_eq!(parser.next_token(), Token::Esc);
        assert_eq!(parser.next_token(), Token::Eol);
        assert_eq!(parser.next_token(), Token::Eof);
        assert_eq!(parser.next_token(), Token::Eof);
    }

    #[test]
    fn braces_are_literal() {
        assert_eq!(lex("{a $b [c] \"d\"}"), vec![
            (Token::Str, "a $b [c] \"d\"".into()),
            (Token::Eol, String::new()),
        ]);
    }

    #[test]
    fn braces_nest() {
        assert_eq!(lex("{a {b c} d}")[0], (Token::Str, "a {b c} d".into()));
    }

    #[test]
    fn backslash_escapes_inside_braces() {
        assert_eq!(lex(r"{a \} b}")[0], (Token::Str, r"a \} b".into()));
    }

    #[test]
    fn variable_reference() {
        assert_eq!(
            lex("puts $x\n"),
            vec![
                (Token::Esc, "puts".into()),
                (Token::Sep, " ".into()),
                (Token::Var, "x".into()),
                (Token::Eol, "\n".into()),
            ]
        );
    }

    #[test]
    fn variable_name_stops_at_non_name_chars() {
        let tokens = lex("$ab-cd\n");
        assert_eq!(tokens[0], (Token::Var, "ab".into()));
        assert_eq!(tokens[1], (Token::Esc, "-cd".into()));
    }

    #[test]
    fn lone_dollar_is_a_literal() {
        assert_eq!(lex("$ x\n")[0], (Token::Str, "$".into()));
    }

    #[test]
    fn quotes_keep_whitespace_and_substitute_variables() {
        let tokens = lex("puts \"a b $c d\"\n");
        assert_eq!(tokens[2], (Token::Esc, "a b ".into()));
        assert_eq!(tokens[3], (Token::Var, "c".into()));
        assert_eq!(tokens[4], (Token::Esc, " d".into()));
    }

    #[test]
    fn command_substitution_spans_to_matching_bracket() {
        let tokens = lex("puts [+ 1 [- 2 3]]\n");
        assert_eq!(tokens[2], (Token::Cmd, "+ 1 [- 2 3]".into()));
    }

    #[test]
    fn bracket_inside_braces_does_not_close_substitution() {
        let tokens = lex("puts [set x {a]b}]\n");
        assert_eq!(tokens[2], (Token::Cmd, "set x {a]b}".into()));
    }

    #[test]
    fn comment_at_statement_start() {
        assert_eq!(
            lex("# hello\nputs x\n"),
            vec![
                (Token::Esc, "puts".into()),
                (Token::Sep, " ".into()),
                (Token::Esc, "x".into()),
                (Token::Eol, "\n".into()),
            ]
        );
    }

    #[test]
    fn hash_mid_line_is_ordinary_text() {
        let tokens = lex("puts #x\n");
        assert_eq!(tokens[2], (Token::Esc, "#x".into()));
    }

    #[test]
    fn comment_after_semicolon() {
        let tokens = lex("set a 1; # done\n");
        assert_eq!(
            tokens.iter().map(|(kind, _)| *kind).collect::<Vec<_>>(),
            vec![Token::Esc, Token::Sep, Token::Esc, Token::Sep, Token::Esc, Token::Eol]
        );
    }

    #[test]
    fn semicolon_after_separator_still_ends_the_statement() {
        assert_eq!(
            kinds("a ; b\n"),
            vec![Token::Esc, Token::Sep, Token::Eol, Token::Esc, Token::Eol]
        );
    }

    #[test]
    fn offsets_point_back_into_the_source() {
        let source = "set x {a b}\nputs \"c $d\"\n";
        let mut parser = Parser::new(source);
        loop {
            let token = parser.next_token();
            if token == Token::Eof {
                break;
            }
            assert!(parser.begin() <= parser.end());
            assert!(parser.end() <= source.len());
            assert_eq!(&source[parser.begin()..parser.end()], parser.token_body());
        }
    }

    #[test]
    fn trace_record_escapes_whitespace() {
        let mut parser = Parser::new("a\n");
        parser.next_token();
        assert_eq!(
            parser.trace_record(),
            "{\"type\":\"TK_ESC\",\"begin\":0,\"end\":1,\"body\":\"a\"}"
        );
        parser.next_token();
        assert_eq!(
            parser.trace_record(),
            "{\"type\":\"TK_EOL\",\"begin\":1,\"end\":2,\"body\":\"\\n\"}"
        );
    }
}
