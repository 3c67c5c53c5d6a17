use crate::{
    primitives::{token, tokens, look_ahead, skip_many},
    pos::SourcePos,
    stream::Item,
    Parser,
    Pattern,
};

/// Any character for which `f` holds.
pub fn satisfy<U: Clone>(f: impl Fn(char) -> bool + Clone) -> Parser<impl Pattern<Input=char, User=U, Output=char>> {
    token(char::show, move |c: &char| if f(*c) { Some(*c) } else { None })
}

pub fn char<U: Clone>(c: char) -> Parser<impl Pattern<Input=char, User=U, Output=char>> {
    satisfy(move |x| x == c).label(c.show())
}

pub fn one_of<U: Clone>(chars: &str) -> Parser<impl Pattern<Input=char, User=U, Output=char>> {
    let chars = chars.chars().collect::<Vec<_>>();
    satisfy(move |c| chars.contains(&c))
}

pub fn none_of<U: Clone>(chars: &str) -> Parser<impl Pattern<Input=char, User=U, Output=char>> {
    let chars = chars.chars().collect::<Vec<_>>();
    satisfy(move |c| !chars.contains(&c))
}

pub fn space<U: Clone>() -> Parser<impl Pattern<Input=char, User=U, Output=char>> {
    satisfy(char::is_whitespace).label("space")
}

/// Skip any amount of white space.
pub fn spaces<U: Clone>() -> Parser<impl Pattern<Input=char, User=U, Output=()>> {
    skip_many(space()).label("white space")
}

pub fn newline<U: Clone>() -> Parser<impl Pattern<Input=char, User=U, Output=char>> {
    char('\n').label("lf new-line")
}

/// `\r\n`, returned as `'\n'`.
pub fn crlf<U: Clone>() -> Parser<impl Pattern<Input=char, User=U, Output=char>> {
    char('\r').padding_for(char('\n')).label("crlf new-line")
}

pub fn end_of_line<U: Clone>() -> Parser<impl Pattern<Input=char, User=U, Output=char>> {
    newline().or(crlf()).label("new-line")
}

pub fn tab<U: Clone>() -> Parser<impl Pattern<Input=char, User=U, Output=char>> {
    char('\t').label("tab")
}

pub fn upper<U: Clone>() -> Parser<impl Pattern<Input=char, User=U, Output=char>> {
    satisfy(char::is_uppercase).label("uppercase letter")
}

pub fn lower<U: Clone>() -> Parser<impl Pattern<Input=char, User=U, Output=char>> {
    satisfy(char::is_lowercase).label("lowercase letter")
}

pub fn alpha_num<U: Clone>() -> Parser<impl Pattern<Input=char, User=U, Output=char>> {
    satisfy(char::is_alphanumeric).label("letter or digit")
}

pub fn letter<U: Clone>() -> Parser<impl Pattern<Input=char, User=U, Output=char>> {
    satisfy(char::is_alphabetic).label("letter")
}

pub fn digit<U: Clone>() -> Parser<impl Pattern<Input=char, User=U, Output=char>> {
    satisfy(|c| c.is_ascii_digit()).label("digit")
}

pub fn hex_digit<U: Clone>() -> Parser<impl Pattern<Input=char, User=U, Output=char>> {
    satisfy(|c| c.is_ascii_hexdigit()).label("hexadecimal digit")
}

pub fn oct_digit<U: Clone>() -> Parser<impl Pattern<Input=char, User=U, Output=char>> {
    satisfy(|c| ('0'..='7').contains(&c)).label("octal digit")
}

pub fn any_char<U: Clone>() -> Parser<impl Pattern<Input=char, User=U, Output=char>> {
    satisfy(|_| true)
}

fn advance(pos: &SourcePos, chars: &[char]) -> SourcePos {
    pos.advance_chars(chars)
}

/// The exact text `s`, matched in one step: a partial match consumes nothing.
pub fn string<U: Clone>(s: &str) -> Parser<impl Pattern<Input=char, User=U, Output=String>> {
    tokens(char::show_many, advance, s.chars().collect::<Vec<_>>())
        .map(|chars| chars.into_iter().collect::<String>())
}

/// [`string`] without consuming on success.
pub fn string_prime<U: Clone>(s: &str) -> Parser<impl Pattern<Input=char, User=U, Output=String>> {
    look_ahead(string(s))
}
