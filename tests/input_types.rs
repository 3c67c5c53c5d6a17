use parzec::prelude::*;

// Tokens as an earlier lexer might produce them. Positions use the defaults: one column per token.
#[derive(Clone, Debug, PartialEq)]
enum Tok {
    Int(i64),
    Plus,
    Ident(String),
}

impl Item for Tok {}

fn int() -> Parser<impl Pattern<Input=Tok, User=(), Output=i64>> {
    token(Tok::show, |t: &Tok| match t {
        Tok::Int(n) => Some(*n),
        _ => None,
    })
    .label("integer")
}

fn plus() -> Parser<impl Pattern<Input=Tok, User=(), Output=fn(i64, i64) -> i64>> {
    token(Tok::show, |t: &Tok| match t {
        Tok::Plus => Some((|a: i64, b: i64| a + b) as fn(i64, i64) -> i64),
        _ => None,
    })
    .label("'+'")
}

#[test]
fn token_streams() {
    use Tok::*;

    let sum = chain_l1(int(), plus()).padded_by(eof());

    assert_eq!(sum.parse(vec![Int(1), Plus, Int(2), Plus, Int(3)]), Ok(6));

    let err = sum.parse(vec![Int(1), Plus, Plus]).unwrap_err();
    assert_eq!(err.to_string(), "(line 1, column 3): unexpected Plus; expecting integer");

    let err = sum.parse(vec![Int(1), Ident("x".to_string())]).unwrap_err();
    assert_eq!(
        err.to_string(),
        "(line 1, column 2): unexpected Ident(\"x\"); expecting '+' or end of input",
    );
}

#[test]
fn token_sequences() {
    use Tok::*;

    let pair = tokens::<Tok, ()>(
        Tok::show_many,
        |pos: &SourcePos, items: &[Tok]| Tok::next_pos_many(items, pos),
        vec![Plus, Plus],
    );

    assert_eq!(pair.parse(vec![Plus, Plus, Int(1)]), Ok(vec![Plus, Plus]));

    let err = pair.parse(vec![Plus, Int(1)]).unwrap_err();
    assert_eq!(err.to_string(), "(line 1, column 1): unexpected [Plus, Int(1)]; expecting [Plus, Plus]");
}

// Tokens that remember where they came from
#[derive(Clone, Debug, PartialEq)]
struct Located {
    word: String,
    line: u32,
    column: u32,
}

impl Item for Located {
    fn show(&self) -> String {
        format!("{:?}", self.word)
    }
}

fn located(text: &str) -> Vec<Located> {
    let mut out = Vec::new();
    for (line, row) in text.lines().enumerate() {
        let mut column = 1;
        for word in row.split(' ') {
            if !word.is_empty() {
                out.push(Located { word: word.to_string(), line: line as u32 + 1, column });
            }
            column += word.len() as u32 + 1;
        }
    }
    out
}

fn word(expected: &'static str) -> Parser<impl Pattern<Input=Located, User=(), Output=String>> {
    token_prim(
        Located::show,
        |pos: &SourcePos, tok: &Located, rest: &[Located]| match rest.first() {
            Some(next) => SourcePos::at(pos.name(), next.line, next.column),
            None => pos.with_column(tok.column + tok.word.len() as u32),
        },
        move |tok: &Located| if tok.word == expected { Some(tok.word.clone()) } else { None },
    )
    .label(format!("{:?}", expected))
}

#[test]
fn positions_from_tokens() {
    let p = word("let").then(word("x")).then(word("=")).then(word("1"));

    assert!(p.parse_with(located("let x\n  = 1"), (), "tokens").is_ok());

    let err = p.parse_with(located("let x\n  = 2"), (), "tokens").unwrap_err();
    assert_eq!(
        err.to_string(),
        "\"tokens\" (line 2, column 5): unexpected \"2\"; expecting \"1\"",
    );
}
