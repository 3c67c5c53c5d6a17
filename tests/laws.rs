use parzec::prelude::*;
use proptest::prelude::*;

type Outcome = (Result<(i64, usize), ParseError>, bool);

fn outcome<P>(parser: &Parser<P>, input: &[char]) -> Outcome
    where P: Pattern<Input=char, User=(), Output=i64>,
{
    let state = State::new(input, SourcePos::new(""), ());
    let result = parser.parse_state(&state);
    let consumed = result.consumed;
    let reply = result.reply.map(|(value, next, _)| (value, next.input().len()));
    (reply, consumed)
}

fn m() -> BoxedParser<char, (), i64> {
    digit()
        .map(|c| c.to_digit(10).map_or(0, i64::from))
        .or(char('a').to(10))
        .boxed()
}

fn f(x: i64) -> BoxedParser<char, (), i64> {
    char('a').map(move |_| x * 2).or(pure(x + 1)).boxed()
}

fn g(x: i64) -> BoxedParser<char, (), i64> {
    char('b').map(move |_| x - 3).boxed()
}

proptest! {
    #[test]
    fn left_identity(v in -100i64..100, input in "[ab0-9]{0,4}") {
        let input = input.chars().collect::<Vec<_>>();
        let lhs = pure(v).bind(f);
        prop_assert_eq!(outcome(&lhs, &input), outcome(&f(v), &input));
    }

    #[test]
    fn right_identity(input in "[ab0-9]{0,4}") {
        let input = input.chars().collect::<Vec<_>>();
        let lhs = m().bind(|x| pure(x));
        let (lhs, lhs_consumed) = outcome(&lhs, &input);
        let (rhs, rhs_consumed) = outcome(&m(), &input);
        prop_assert_eq!(lhs_consumed, rhs_consumed);
        // Ghost errors may differ on success, values and failures may not
        match (lhs, rhs) {
            (Ok(a), Ok(b)) => prop_assert_eq!(a, b),
            (Err(a), Err(b)) => prop_assert_eq!(a, b),
            (a, b) => prop_assert!(false, "{:?} != {:?}", a, b),
        }
    }

    #[test]
    fn associativity(input in "[ab0-9]{0,4}") {
        let input = input.chars().collect::<Vec<_>>();
        let lhs = m().bind(f).bind(g);
        let rhs = m().bind(|x| f(x).bind(g));
        prop_assert_eq!(outcome(&lhs, &input), outcome(&rhs, &input));
    }

    #[test]
    fn empty_failures_leave_state_untouched(input in "[abc ]{0,6}") {
        let input = input.chars().collect::<Vec<_>>();
        let state = State::new(&input[..], SourcePos::new("src"), 0u8);
        let before = state.clone();

        let parsers = vec![
            char('a').then(char('b')).map(|_| ()).boxed(),
            attempt(string("abc")).map(|_| ()).boxed(),
            string("ab").map(|_| ()).boxed(),
            look_ahead(char('c')).map(|_| ()).boxed(),
            not_followed_by(char('a')).boxed(),
            skip_many1(space()).boxed(),
            eof().boxed(),
        ];
        for parser in parsers.iter() {
            let result = parser.parse_state(&state);
            if result.is_empty_err() {
                prop_assert_eq!(&state, &before);
            }
        }
    }

    #[test]
    fn count_takes_exactly_n(text in "[a-z]{0,12}", n in 0usize..8) {
        let result = count(n, any_char::<()>()).parse(text.chars());
        if text.len() >= n {
            prop_assert_eq!(result, Ok(text.chars().take(n).collect::<Vec<_>>()));
        } else {
            prop_assert!(result.is_err());
        }
    }

    #[test]
    fn many_agrees_with_prefix_length(text in "[ab]{0,40}") {
        let expected = text.chars().take_while(|c| *c == 'a').count();
        let result = many(char::<()>('a')).parse(text.chars());
        prop_assert_eq!(result.map(|v| v.len()), Ok(expected));
    }
}
