use std::marker::PhantomData;
use crate::{
    chars::{any_char, char, digit, hex_digit, oct_digit, one_of, satisfy, string},
    combinators::{between, choice, not_followed_by, option, option_maybe, sep_by, sep_by1, skip_many1},
    error::{Message, ParseError},
    language::LanguageDef,
    pos::SourcePos,
    primitives::{attempt, many, many1, pure, skip_many, tokens_by, unexpected},
    reply::ParseResult,
    stream::{Item, State},
    BoxedParser,
    Parser,
    Pattern,
};

/// Lexeme parsers generated from a [`LanguageDef`].
///
/// Every lexeme skips the white space and comments that follow it, so a grammar only has to
/// skip leading white space once, with [`TokenParser::white_space`].
pub struct TokenParser<U: Clone> {
    lang: LanguageDef<U>,
    white_space: BoxedParser<char, U, ()>,
}

impl<U: Clone + 'static> TokenParser<U> {
    pub fn new(lang: LanguageDef<U>) -> Self {
        let white_space = make_white_space(&lang);
        Self { lang, white_space }
    }

    pub fn language(&self) -> &LanguageDef<U> {
        &self.lang
    }

    pub fn white_space(&self) -> BoxedParser<char, U, ()> {
        self.white_space.clone()
    }

    /// `parser` followed by any white space.
    pub fn lexeme<P>(&self, parser: Parser<P>) -> Parser<impl Pattern<Input=char, User=U, Output=P::Output>>
        where P: Pattern<Input=char, User=U>,
    {
        parser.padded_by(self.white_space())
    }

    pub fn symbol(&self, name: &str) -> Parser<impl Pattern<Input=char, User=U, Output=String>> {
        self.lexeme(string(name))
    }

    // Brackets and separators

    pub fn parens<P>(&self, parser: Parser<P>) -> Parser<impl Pattern<Input=char, User=U, Output=P::Output>>
        where P: Pattern<Input=char, User=U>,
    {
        between(self.symbol("("), self.symbol(")"), parser)
    }

    pub fn braces<P>(&self, parser: Parser<P>) -> Parser<impl Pattern<Input=char, User=U, Output=P::Output>>
        where P: Pattern<Input=char, User=U>,
    {
        between(self.symbol("{"), self.symbol("}"), parser)
    }

    pub fn angles<P>(&self, parser: Parser<P>) -> Parser<impl Pattern<Input=char, User=U, Output=P::Output>>
        where P: Pattern<Input=char, User=U>,
    {
        between(self.symbol("<"), self.symbol(">"), parser)
    }

    pub fn brackets<P>(&self, parser: Parser<P>) -> Parser<impl Pattern<Input=char, User=U, Output=P::Output>>
        where P: Pattern<Input=char, User=U>,
    {
        between(self.symbol("["), self.symbol("]"), parser)
    }

    pub fn semi(&self) -> Parser<impl Pattern<Input=char, User=U, Output=String>> {
        self.symbol(";")
    }

    pub fn comma(&self) -> Parser<impl Pattern<Input=char, User=U, Output=String>> {
        self.symbol(",")
    }

    pub fn colon(&self) -> Parser<impl Pattern<Input=char, User=U, Output=String>> {
        self.symbol(":")
    }

    pub fn dot(&self) -> Parser<impl Pattern<Input=char, User=U, Output=String>> {
        self.symbol(".")
    }

    pub fn semi_sep<P>(&self, parser: Parser<P>) -> Parser<impl Pattern<Input=char, User=U, Output=Vec<P::Output>>>
        where P: Pattern<Input=char, User=U>,
    {
        sep_by(parser, self.semi())
    }

    pub fn semi_sep1<P>(&self, parser: Parser<P>) -> Parser<impl Pattern<Input=char, User=U, Output=Vec<P::Output>>>
        where P: Pattern<Input=char, User=U>,
    {
        sep_by1(parser, self.semi())
    }

    pub fn comma_sep<P>(&self, parser: Parser<P>) -> Parser<impl Pattern<Input=char, User=U, Output=Vec<P::Output>>>
        where P: Pattern<Input=char, User=U>,
    {
        sep_by(parser, self.comma())
    }

    pub fn comma_sep1<P>(&self, parser: Parser<P>) -> Parser<impl Pattern<Input=char, User=U, Output=Vec<P::Output>>>
        where P: Pattern<Input=char, User=U>,
    {
        sep_by1(parser, self.comma())
    }

    // Numbers

    /// Decimal digits. Not a lexeme.
    pub fn decimal(&self) -> Parser<impl Pattern<Input=char, User=U, Output=u64>> {
        number(10, digit())
    }

    /// `x` or `X` followed by hexadecimal digits. Not a lexeme.
    pub fn hexadecimal(&self) -> Parser<impl Pattern<Input=char, User=U, Output=u64>> {
        one_of("xX").padding_for(number(16, hex_digit()))
    }

    /// `o` or `O` followed by octal digits. Not a lexeme.
    pub fn octal(&self) -> Parser<impl Pattern<Input=char, User=U, Output=u64>> {
        one_of("oO").padding_for(number(8, oct_digit()))
    }

    fn nat(&self) -> Parser<impl Pattern<Input=char, User=U, Output=u64>> {
        let zero_number = char('0')
            .padding_for(self.hexadecimal().or(self.octal()).or(self.decimal()).or(pure(0)))
            .label("");
        zero_number.or(self.decimal())
    }

    /// A decimal, `0x` hexadecimal or `0o` octal number.
    pub fn natural(&self) -> Parser<impl Pattern<Input=char, User=U, Output=u64>> {
        self.lexeme(self.nat()).label("natural")
    }

    /// A natural number with an optional sign. White space may follow the sign.
    pub fn integer(&self) -> Parser<impl Pattern<Input=char, User=U, Output=i64>> {
        let sign = self.lexeme(char('-').to(true).or(char('+').to(false))).or(pure(false));
        let int = sign
            .then(self.nat())
            .try_map(|(negative, n)| {
                let n = i128::from(n);
                i64::try_from(if negative { -n } else { n })
            });
        self.lexeme(int).label("integer")
    }

    /// A signed number with a fraction, an exponent or both.
    pub fn float(&self) -> Parser<impl Pattern<Input=char, User=U, Output=f64>> {
        let sign = char('-').to(-1.0f64).or(char('+').to(1.0)).or(pure(1.0));
        self.lexeme(sign.then(floating()).map(|(sign, f)| sign * f)).label("float")
    }

    // Literals

    pub fn char_literal(&self) -> Parser<impl Pattern<Input=char, User=U, Output=char>> {
        let letter = satisfy(|c| c != '\'' && c != '\\' && c > '\u{1a}');
        let literal = between(
            char('\''),
            char('\'').label("end of character"),
            letter.or(escape_code()),
        );
        self.lexeme(literal).label("character")
    }

    pub fn string_literal(&self) -> Parser<impl Pattern<Input=char, User=U, Output=String>> {
        let letter = satisfy(|c| c != '"' && c != '\\' && c > '\u{1a}');
        let literal = between(
            char('"'),
            char('"').label("end of string"),
            many(letter.or(escape_code())),
        );
        self.lexeme(literal.map(|chars| chars.into_iter().collect::<String>()))
            .label("literal string")
    }

    // Names

    /// An identifier that is not a reserved name.
    pub fn identifier(&self) -> Parser<impl Pattern<Input=char, User=U, Output=String>> {
        let reserved = self.lang.reserved_names.clone();
        let case_sensitive = self.lang.case_sensitive;
        let ident = word(self.lang.ident_start.clone(), self.lang.ident_letter.clone())
            .bind(move |name| -> BoxedParser<char, U, String> {
                if is_reserved(&reserved, &name, case_sensitive) {
                    unexpected(format!("reserved word {:?}", name)).boxed()
                } else {
                    pure(name).boxed()
                }
            });
        self.lexeme(attempt(ident)).label("identifier")
    }

    /// The reserved word `name`, not followed by an identifier letter.
    pub fn reserved(&self, name: &str) -> Parser<impl Pattern<Input=char, User=U, Output=()>> {
        let case_sensitive = self.lang.case_sensitive;
        let keyword = tokens_by(
            char::show_many,
            advance,
            name.chars().collect::<Vec<_>>(),
            move |a: &char, b: &char| same_char(*a, *b, case_sensitive),
        );
        let end = not_followed_by(self.lang.ident_letter.clone()).label(format!("end of {:?}", name));
        self.lexeme(attempt(keyword.then(end)).map(|_| ()))
    }

    /// An operator that is not a reserved operator.
    pub fn operator(&self) -> Parser<impl Pattern<Input=char, User=U, Output=String>> {
        let reserved = self.lang.reserved_op_names.clone();
        let op = word(self.lang.op_start.clone(), self.lang.op_letter.clone())
            .bind(move |name| -> BoxedParser<char, U, String> {
                if is_reserved(&reserved, &name, true) {
                    unexpected(format!("reserved operator {:?}", name)).boxed()
                } else {
                    pure(name).boxed()
                }
            });
        self.lexeme(attempt(op)).label("operator")
    }

    /// The reserved operator `name`, not followed by an operator letter.
    pub fn reserved_op(&self, name: &str) -> Parser<impl Pattern<Input=char, User=U, Output=()>> {
        let end = not_followed_by(self.lang.op_letter.clone()).label(format!("end of {:?}", name));
        self.lexeme(attempt(string(name).then(end)).map(|_| ()))
    }
}

fn advance(pos: &SourcePos, chars: &[char]) -> SourcePos {
    pos.advance_chars(chars)
}

fn same_char(a: char, b: char, case_sensitive: bool) -> bool {
    a == b || (!case_sensitive && a.to_lowercase().eq(b.to_lowercase()))
}

fn is_reserved(reserved: &[String], name: &str, case_sensitive: bool) -> bool {
    if case_sensitive {
        reserved.iter().any(|r| r == name)
    } else {
        let name = name.to_lowercase();
        reserved.iter().any(|r| r.to_lowercase() == name)
    }
}

fn word<U: Clone + 'static>(
    start: BoxedParser<char, U, char>,
    letter: BoxedParser<char, U, char>,
) -> Parser<impl Pattern<Input=char, User=U, Output=String>> {
    start.then(many(letter)).map(|(c, cs)| {
        let mut name = String::with_capacity(cs.len() + 1);
        name.push(c);
        name.extend(cs);
        name
    })
}

fn number<U: Clone>(
    radix: u32,
    digit: Parser<impl Pattern<Input=char, User=U, Output=char>>,
) -> Parser<impl Pattern<Input=char, User=U, Output=u64>> {
    many1(digit).try_map(move |digits| {
        u64::from_str_radix(&digits.into_iter().collect::<String>(), radix)
    })
}

fn digits<U: Clone>() -> Parser<impl Pattern<Input=char, User=U, Output=String>> {
    many1(digit()).map(|ds| ds.into_iter().collect::<String>())
}

fn floating<U: Clone>() -> Parser<impl Pattern<Input=char, User=U, Output=f64>> {
    let exponent = one_of("eE")
        .padding_for(option_maybe(one_of("+-")).then(digits()))
        .map(|(sign, ds)| match sign {
            Some(sign) => format!("e{}{}", sign, ds),
            None => format!("e{}", ds),
        })
        .label("exponent");
    let fraction = char('.')
        .padding_for(digits())
        .map(|ds| format!(".{}", ds))
        .label("fraction");
    let tail = fraction
        .then(option(String::new(), exponent.clone()))
        .map(|(f, e)| f + &e)
        .or(exponent);
    digits()
        .then(tail)
        .try_map(|(int, tail)| format!("{}{}", int, tail).parse::<f64>())
}

fn escape_code<U: Clone>() -> Parser<impl Pattern<Input=char, User=U, Output=char>> {
    char('\\')
        .padding_for(any_char().map(|c| match c {
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'b' => '\u{8}',
            'f' => '\u{c}',
            c => c,
        }))
        .label("escape code")
}

// White space

fn make_white_space<U: Clone + 'static>(lang: &LanguageDef<U>) -> BoxedParser<char, U, ()> {
    let mut parts = vec![skip_many1(satisfy(char::is_whitespace)).boxed()];
    if !lang.comment_line.is_empty() {
        let line = string(&lang.comment_line)
            .then(skip_many(satisfy(|c| c != '\n')))
            .map(|_| ());
        parts.push(line.boxed());
    }
    if !lang.comment_start.is_empty() && !lang.comment_end.is_empty() {
        let block = BlockComment {
            start: lang.comment_start.chars().collect(),
            end: lang.comment_end.chars().collect(),
            nested: lang.nested_comments,
            phantom: PhantomData,
        };
        parts.push(Parser::from_pat(block).boxed());
    }
    skip_many(choice(parts).label("")).boxed()
}

/// A block comment, scanned in one pass. Nested comments must be balanced when `nested` is set.
struct BlockComment<U> {
    start: Vec<char>,
    end: Vec<char>,
    nested: bool,
    phantom: PhantomData<fn() -> U>,
}

impl<U: Clone> Pattern for BlockComment<U> {
    type Input = char;
    type User = U;
    type Output = ();

    fn parse<'a>(&self, state: &State<'a, char, U>) -> ParseResult<'a, char, U, ()> {
        let input = state.input();
        if !input.starts_with(&self.start) {
            let found = input.first().map(char::show).unwrap_or_default();
            return ParseResult::err_empty(
                ParseError::new(state.pos().clone(), Message::sys_unexpected(found))
                    .with_message(Message::expect(char::show_many(&self.start))),
            );
        }

        let mut idx = self.start.len();
        let mut depth = 1usize;
        while depth > 0 {
            let rest = &input[idx..];
            if rest.starts_with(&self.end) {
                depth -= 1;
                idx += self.end.len();
            } else if self.nested && rest.starts_with(&self.start) {
                depth += 1;
                idx += self.start.len();
            } else if rest.is_empty() {
                let pos = state.pos().advance_chars(input);
                return ParseResult::err_consumed(
                    ParseError::new(pos, Message::sys_unexpected(""))
                        .with_message(Message::expect("end of comment")),
                );
            } else {
                idx += 1;
            }
        }

        let pos = state.pos().advance_chars(&input[..idx]);
        ParseResult::ok_consumed((), state.advance(idx, pos.clone()), ParseError::unknown(pos))
    }

    fn cloned(&self) -> Self where Self: Sized {
        Self {
            start: self.start.clone(),
            end: self.end.clone(),
            nested: self.nested,
            phantom: PhantomData,
        }
    }
}
