use parzec::prelude::*;

fn num() -> Parser<impl Pattern<Input=char, User=(), Output=i64>> {
    digit().map(|c| c.to_digit(10).map_or(0, i64::from))
}

fn remaining<P>(parser: &Parser<P>, input: &str) -> (Result<String, ParseError>, bool)
    where P: Pattern<Input=char, User=()>,
{
    let input = input.chars().collect::<Vec<_>>();
    let result = parser.parse_state(&State::new(&input, SourcePos::new(""), ()));
    let consumed = result.consumed;
    (result.reply.map(|(_, next, _)| next.input().iter().collect()), consumed)
}

#[test]
fn choice_merges_expectations() {
    let p = choice(vec![char::<()>('a'), char('b'), char('c')]);

    assert_eq!(p.parse("b".chars()), Ok('b'));

    let err = p.parse("d".chars()).unwrap_err();
    assert_eq!(err.to_string(), "(line 1, column 1): unexpected 'd'; expecting 'a', 'b' or 'c'");

    let none = choice(Vec::<BoxedParser<char, (), char>>::new());
    let err = none.parse("a".chars()).unwrap_err();
    assert_eq!(err.to_string(), "(line 1, column 1): no alternatives");
}

#[test]
fn consumed_failure_commits() {
    let p = char::<()>('a').then(char('b')).map(|(a, _)| a).or(char('a'));

    let (reply, consumed) = remaining(&p, "ac");
    assert!(reply.is_err());
    assert!(consumed);
    assert_eq!(
        p.parse("ac".chars()).unwrap_err().to_string(),
        "(line 1, column 2): unexpected 'c'; expecting 'b'",
    );

    let p = attempt(char::<()>('a').then(char('b')).map(|(a, _)| a)).or(char('a'));

    assert_eq!(remaining(&p, "ac"), (Ok("c".to_string()), true));
    assert_eq!(p.parse("ab".chars()), Ok('a'));
}

#[test]
fn ghost_errors_reach_the_next_failure() {
    let p = many(char::<()>('a')).then(char('b'));

    let err = p.parse("aac".chars()).unwrap_err();
    assert_eq!(err.to_string(), "(line 1, column 3): unexpected 'c'; expecting 'a' or 'b'");
}

#[test]
fn labels() {
    let p = many1(digit::<()>()).label("number");

    let err = p.parse("x".chars()).unwrap_err();
    assert_eq!(err.to_string(), "(line 1, column 1): unexpected 'x'; expecting number");

    // A label says nothing about failures after input was consumed
    let p = string::<()>("ab").or(char('a').then(char('c')).map(|_| String::new())).label("thing");
    let err = p.parse("ax".chars()).unwrap_err();
    assert_eq!(err.to_string(), "(line 1, column 2): unexpected 'x'; expecting 'c'");

    // Expectations left behind by an empty success are renamed too
    let p = many(digit::<()>()).label("digits").then(char('x'));
    let err = p.parse("y".chars()).unwrap_err();
    assert_eq!(err.to_string(), "(line 1, column 1): unexpected 'y'; expecting 'x' or digits");
}

#[test]
fn look_ahead_restores_input() {
    let p = look_ahead(string::<()>("ab"));

    assert_eq!(remaining(&p, "abc"), (Ok("abc".to_string()), false));
    assert_eq!(string_prime::<()>("ab").parse("ab".chars()), Ok("ab".to_string()));
}

#[test]
fn options() {
    let p = option('x', char::<()>('a'));

    assert_eq!(p.parse("a".chars()), Ok('a'));
    assert_eq!(p.parse("b".chars()), Ok('x'));

    let p = option(('x', 'x'), char::<()>('a').then(char('b')));
    let (reply, consumed) = remaining(&p, "ac");
    assert!(reply.is_err());
    assert!(consumed);

    assert_eq!(option_maybe(char::<()>('a')).parse("".chars()), Ok(None));
    assert_eq!(remaining(&optional(char::<()>('a')), "ab"), (Ok("b".to_string()), true));
}

#[test]
fn separated_lists() {
    let p = sep_by(char::<()>('a'), char(','));

    assert_eq!(p.parse("".chars()), Ok(vec![]));
    assert_eq!(p.parse("a".chars()), Ok(vec!['a']));
    assert_eq!(p.parse("a,a,a".chars()), Ok(vec!['a', 'a', 'a']));
    assert!(p.parse("a,".chars()).is_err());

    let p = sep_by1(char::<()>('a'), char(','));

    assert!(p.parse("".chars()).is_err());
    assert_eq!(p.parse("a,a".chars()), Ok(vec!['a', 'a']));

    let p = end_by(char::<()>('a'), char(';'));

    assert_eq!(p.parse("a;a;".chars()), Ok(vec!['a', 'a']));
    assert_eq!(p.parse("".chars()), Ok(vec![]));
    assert!(p.parse("a;a".chars()).is_err());

    assert!(end_by1(char::<()>('a'), char(';')).parse("".chars()).is_err());

    let p = sep_end_by(char::<()>('a'), char(','));

    assert_eq!(p.parse("a,a,".chars()), Ok(vec!['a', 'a']));
    assert_eq!(p.parse("a,a".chars()), Ok(vec!['a', 'a']));
    assert_eq!(p.parse("".chars()), Ok(vec![]));
    assert_eq!(remaining(&p, "a,a,,"), (Ok(",".to_string()), true));

    assert!(sep_end_by1(char::<()>('a'), char(',')).parse("".chars()).is_err());
}

#[test]
fn counts_and_brackets() {
    let p = count(3, any_char::<()>());

    assert_eq!(p.parse("abcd".chars()), Ok(vec!['a', 'b', 'c']));
    assert!(p.parse("ab".chars()).is_err());
    assert_eq!(remaining(&count(0, any_char::<()>()), "ab"), (Ok("ab".to_string()), false));

    let err = count(usize::MAX / 2, digit::<()>()).parse("12".chars()).unwrap_err();
    assert_eq!(err.to_string(), "(line 1, column 3): unexpected end of input; expecting digit");

    let p = between(char::<()>('('), char(')'), many(letter()));

    assert_eq!(p.parse("(abc)".chars()), Ok(vec!['a', 'b', 'c']));
    assert!(p.parse("(abc".chars()).is_err());
}

#[test]
fn chains() {
    let minus = char::<()>('-').to((|a: i64, b: i64| a - b) as fn(i64, i64) -> i64);
    let pow = char::<()>('^').to((|a: i64, b: i64| a.pow(b as u32)) as fn(i64, i64) -> i64);

    assert_eq!(chain_l1(num(), minus.clone()).parse("9-3-2".chars()), Ok(4));
    assert_eq!(chain_r1(num(), pow.clone()).parse("2^3^2".chars()), Ok(512));
    assert_eq!(chain_r1(num(), minus.clone()).parse("9-3-2".chars()), Ok(8));
    assert_eq!(chain_l1(num(), minus.clone()).parse("7".chars()), Ok(7));

    // A dangling operator is an error, not a shorter chain
    assert!(chain_l1(num(), minus.clone()).parse("9-".chars()).is_err());

    assert_eq!(chain_l(num(), minus.clone(), 42).parse("".chars()), Ok(42));
    assert_eq!(chain_r(num(), pow, 42).parse("x".chars()), Ok(42));
}

#[test]
fn chains_with_empty_operators() {
    let juxtapose = pure::<char, (), _>((|a: i64, b: i64| a * 10 + b) as fn(i64, i64) -> i64);

    assert_eq!(chain_l1(num(), juxtapose.clone()).parse("123".chars()), Ok(123));
    assert_eq!(chain_r1(num(), juxtapose.clone()).parse("123".chars()), Ok(33));
    assert_eq!(remaining(&chain_l1(num(), juxtapose.clone()), "12x"), (Ok("x".to_string()), true));
    assert_eq!(chain_l(num(), juxtapose.clone(), 0).parse("".chars()), Ok(0));

    // The operand that was not there still shows up as an expectation
    let err = chain_l1(num(), juxtapose).padded_by(eof()).parse("12x".chars()).unwrap_err();
    assert_eq!(err.to_string(), "(line 1, column 3): unexpected 'x'; expecting digit or end of input");
}

#[test]
fn many_till_stops_at_end() {
    let comment = string::<()>("<!--")
        .padding_for(many_till(any_char(), attempt(string("-->"))))
        .map(|chars| chars.into_iter().collect::<String>());

    assert_eq!(comment.parse("<!-- hi -->".chars()), Ok(" hi ".to_string()));
    assert_eq!(comment.parse("<!---->".chars()), Ok(String::new()));
    assert!(comment.parse("<!-- hi".chars()).is_err());
}

#[test]
fn assertions() {
    let keyword = string::<()>("let").padded_by(not_followed_by(alpha_num()));

    assert_eq!(keyword.parse("let".chars()), Ok("let".to_string()));
    assert_eq!(remaining(&keyword, "let x"), (Ok(" x".to_string()), true));

    let err = keyword.parse("lets".chars()).unwrap_err();
    assert_eq!(err.to_string(), "(line 1, column 4): unexpected 's'");

    let p = char::<()>('a').padded_by(eof());

    assert_eq!(p.parse("a".chars()), Ok('a'));
    assert_eq!(
        p.parse("ab".chars()).unwrap_err().to_string(),
        "(line 1, column 2): unexpected 'b'; expecting end of input",
    );
}

#[test]
fn no_progress_is_reported() {
    let p = many(optional(char::<()>('a')));

    let err = p.parse("b".chars()).unwrap_err();
    assert!(err.to_string().contains("accepts an empty string"));

    let err = many(pure::<char, (), i32>(0)).parse("".chars()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "(line 1, column 1): combinator 'many' is applied to a parser that accepts an empty string",
    );

    assert!(sep_end_by(optional(char::<()>('a')), optional(char(','))).parse("x".chars()).is_err());
}

#[test]
fn fallible_conversion() {
    let p = many1(digit::<()>()).try_map(|ds| ds.into_iter().collect::<String>().parse::<u8>());

    assert_eq!(p.parse("255".chars()), Ok(255));
    assert_eq!(
        p.parse("300".chars()).unwrap_err().to_string(),
        "(line 1, column 4): number too large to fit in target type",
    );
}

#[test]
fn fail_and_unexpected() {
    let p = char::<()>('a').or(fail("nothing fits"));

    assert_eq!(
        p.parse("b".chars()).unwrap_err().to_string(),
        "(line 1, column 1): unexpected 'b'; expecting 'a'; nothing fits",
    );

    let p = unexpected::<char, (), ()>("thing");
    assert_eq!(p.parse("".chars()).unwrap_err().to_string(), "(line 1, column 1): unexpected thing");
}

#[test]
fn positions_and_user_state() {
    let p = string::<()>("ab\n\t").padding_for(get_position());

    assert_eq!(p.parse("ab\n\t".chars()), Ok(SourcePos::at("", 2, 9)));

    let counted = many(char::<usize>('a').padded_by(modify_state(|n: &usize| n + 1)))
        .padding_for(get_state());

    assert_eq!(counted.parse_with("aaa".chars(), 10, ""), Ok(13));

    let reset = put_state::<char, usize>(0).padding_for(get_state());
    assert_eq!(reset.parse_with("".chars(), 7, ""), Ok(0));
}

#[test]
fn traced() {
    let _ = env_logger::builder().is_test(true).try_init();

    let p = parser_trace::<char, ()>("start").padding_for(parser_traced("digit", digit()));

    assert_eq!(p.parse("7".chars()), Ok('7'));
    assert_eq!(
        p.parse("x".chars()).unwrap_err().to_string(),
        "(line 1, column 1): unexpected 'x'; expecting digit",
    );
}

#[test]
fn long_inputs() {
    let text = "a".repeat(100_000);
    assert_eq!(many(char::<()>('a')).parse(text.chars()).map(|v| v.len()), Ok(100_000));

    let list = vec!["1"; 10_000].join(",");
    assert_eq!(sep_by(num(), char(',')).parse(list.chars()).map(|v| v.len()), Ok(10_000));

    let sum = vec!["1"; 10_000].join("+");
    let plus = char::<()>('+').to((|a: i64, b: i64| a + b) as fn(i64, i64) -> i64);
    assert_eq!(chain_l1(num(), plus.clone()).parse(sum.chars()), Ok(10_000));
    assert_eq!(chain_r1(num(), plus).parse(sum.chars()), Ok(10_000));
}
