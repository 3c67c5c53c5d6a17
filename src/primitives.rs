use std::marker::PhantomData;
use crate::{
    util::{Progress, Step},
    error::{Message, ParseError},
    pos::SourcePos,
    reply::ParseResult,
    stream::{Item, State},
    Parser,
    Pattern,
};

// Pure

pub fn pure<I, U, O>(value: O) -> Parser<impl Pattern<Input=I, User=U, Output=O>>
    where
        I: Item,
        U: Clone,
        O: Clone,
{
    pure_with(move || value.clone())
}

/// Like [`pure`], but the value is built afresh each time the parser runs.
pub fn pure_with<I, U, O>(f: impl Fn() -> O + Clone) -> Parser<impl Pattern<Input=I, User=U, Output=O>>
    where
        I: Item,
        U: Clone,
{
    struct PureWith<F, I, U>(F, PhantomData<fn() -> (I, U)>);

    impl<I, U, O, F> Pattern for PureWith<F, I, U>
        where
            I: Item,
            U: Clone,
            F: Fn() -> O + Clone,
    {
        type Input = I;
        type User = U;
        type Output = O;

        fn parse<'a>(&self, state: &State<'a, I, U>) -> ParseResult<'a, I, U, O> {
            ParseResult::ok_empty((self.0)(), state.clone(), ParseError::unknown(state.pos().clone()))
        }

        fn cloned(&self) -> Self where Self: Sized {
            Self(self.0.clone(), PhantomData)
        }
    }

    Parser::from_pat(PureWith(f, PhantomData))
}

// Fail

struct Reject<I, U, O>(Message, PhantomData<fn() -> (I, U, O)>);

impl<I: Item, U: Clone, O> Pattern for Reject<I, U, O> {
    type Input = I;
    type User = U;
    type Output = O;

    fn parse<'a>(&self, state: &State<'a, I, U>) -> ParseResult<'a, I, U, O> {
        ParseResult::err_empty(ParseError::new(state.pos().clone(), self.0.clone()))
    }

    fn cloned(&self) -> Self where Self: Sized {
        Self(self.0.clone(), PhantomData)
    }
}

pub fn fail<I, U, O>(msg: impl Into<String>) -> Parser<impl Pattern<Input=I, User=U, Output=O>>
    where
        I: Item,
        U: Clone,
{
    Parser::from_pat(Reject(Message::generic(msg), PhantomData))
}

pub fn unexpected<I, U, O>(msg: impl Into<String>) -> Parser<impl Pattern<Input=I, User=U, Output=O>>
    where
        I: Item,
        U: Clone,
{
    Parser::from_pat(Reject(Message::unexpected(msg), PhantomData))
}

// Token

/// Accept a single item for which `test` produces a value.
pub fn token<I, U, O>(
    show: impl Fn(&I) -> String + Clone,
    test: impl Fn(&I) -> Option<O> + Clone,
) -> Parser<impl Pattern<Input=I, User=U, Output=O>>
    where
        I: Item,
        U: Clone,
{
    token_prim(show, |pos: &SourcePos, item: &I, _: &[I]| item.next_pos(pos), test)
}

/// [`token`] with an explicit position rule. `next_pos` receives the current position, the
/// accepted item and the input following it.
pub fn token_prim<I, U, O>(
    show: impl Fn(&I) -> String + Clone,
    next_pos: impl Fn(&SourcePos, &I, &[I]) -> SourcePos + Clone,
    test: impl Fn(&I) -> Option<O> + Clone,
) -> Parser<impl Pattern<Input=I, User=U, Output=O>>
    where
        I: Item,
        U: Clone,
{
    struct TokenPrim<S, N, T, I, U>(S, N, T, PhantomData<fn() -> (I, U)>);

    impl<I, U, O, S, N, T> Pattern for TokenPrim<S, N, T, I, U>
        where
            I: Item,
            U: Clone,
            S: Fn(&I) -> String + Clone,
            N: Fn(&SourcePos, &I, &[I]) -> SourcePos + Clone,
            T: Fn(&I) -> Option<O> + Clone,
    {
        type Input = I;
        type User = U;
        type Output = O;

        fn parse<'a>(&self, state: &State<'a, I, U>) -> ParseResult<'a, I, U, O> {
            match state.input().split_first() {
                None => ParseResult::err_empty(ParseError::new(state.pos().clone(), Message::sys_unexpected(""))),
                Some((item, rest)) => match (self.2)(item) {
                    Some(out) => {
                        let pos = (self.1)(state.pos(), item, rest);
                        let next = state.advance(1, pos.clone());
                        ParseResult::ok_consumed(out, next, ParseError::unknown(pos))
                    },
                    None => ParseResult::err_empty(ParseError::new(
                        state.pos().clone(),
                        Message::sys_unexpected((self.0)(item)),
                    )),
                },
            }
        }

        fn cloned(&self) -> Self where Self: Sized {
            Self(self.0.clone(), self.1.clone(), self.2.clone(), PhantomData)
        }
    }

    Parser::from_pat(TokenPrim(show, next_pos, test, PhantomData))
}

// Tokens

/// Match `target` at the front of the input in one comparison.
///
/// A mismatch anywhere in the target is an empty failure, however far the match got.
pub fn tokens<I, U>(
    show: impl Fn(&[I]) -> String + Clone,
    next_pos: impl Fn(&SourcePos, &[I]) -> SourcePos + Clone,
    target: impl IntoIterator<Item=I>,
) -> Parser<impl Pattern<Input=I, User=U, Output=Vec<I>>>
    where
        I: Item + PartialEq,
        U: Clone,
{
    tokens_by(show, next_pos, target, |a: &I, b: &I| a == b)
}

/// [`tokens`] with a custom item equality. The matched input items are returned.
pub fn tokens_by<I, U>(
    show: impl Fn(&[I]) -> String + Clone,
    next_pos: impl Fn(&SourcePos, &[I]) -> SourcePos + Clone,
    target: impl IntoIterator<Item=I>,
    eq: impl Fn(&I, &I) -> bool + Clone,
) -> Parser<impl Pattern<Input=I, User=U, Output=Vec<I>>>
    where
        I: Item,
        U: Clone,
{
    struct Tokens<S, N, E, I, U>(S, N, Vec<I>, E, PhantomData<fn() -> U>);

    impl<I, U, S, N, E> Pattern for Tokens<S, N, E, I, U>
        where
            I: Item,
            U: Clone,
            S: Fn(&[I]) -> String + Clone,
            N: Fn(&SourcePos, &[I]) -> SourcePos + Clone,
            E: Fn(&I, &I) -> bool + Clone,
    {
        type Input = I;
        type User = U;
        type Output = Vec<I>;

        fn parse<'a>(&self, state: &State<'a, I, U>) -> ParseResult<'a, I, U, Vec<I>> {
            let target = &self.2;
            if target.is_empty() {
                return ParseResult::ok_empty(Vec::new(), state.clone(), ParseError::unknown(state.pos().clone()));
            }

            let input = state.input();
            let prefix = &input[..target.len().min(input.len())];
            let mismatch = prefix.iter().zip(target.iter()).any(|(a, b)| !(self.3)(a, b));

            if !mismatch && prefix.len() == target.len() {
                let pos = (self.1)(state.pos(), prefix);
                let next = state.advance(prefix.len(), pos.clone());
                return ParseResult::ok_consumed(prefix.to_vec(), next, ParseError::unknown(pos));
            }

            // Nothing to show when the input ran out part way through the target
            let found = if mismatch { (self.0)(prefix) } else { String::new() };
            ParseResult::err_empty(
                ParseError::new(state.pos().clone(), Message::sys_unexpected(found))
                    .with_message(Message::expect((self.0)(target))),
            )
        }

        fn cloned(&self) -> Self where Self: Sized {
            Self(self.0.clone(), self.1.clone(), self.2.clone(), self.3.clone(), PhantomData)
        }
    }

    Parser::from_pat(Tokens(show, next_pos, target.into_iter().collect(), eq, PhantomData))
}

/// [`tokens`] without consuming on success.
pub fn tokens_prime<I, U>(
    show: impl Fn(&[I]) -> String + Clone,
    next_pos: impl Fn(&SourcePos, &[I]) -> SourcePos + Clone,
    target: impl IntoIterator<Item=I>,
) -> Parser<impl Pattern<Input=I, User=U, Output=Vec<I>>>
    where
        I: Item + PartialEq,
        U: Clone,
{
    look_ahead(tokens(show, next_pos, target))
}

// Attempt

/// Run `parser`, turning a consumed failure into an empty one so that alternatives may be tried.
pub fn attempt<P>(parser: Parser<P>) -> Parser<impl Pattern<Input=P::Input, User=P::User, Output=P::Output>>
    where P: Pattern,
{
    struct Attempt<A>(A);

    impl<A: Pattern> Pattern for Attempt<A> {
        type Input = A::Input;
        type User = A::User;
        type Output = A::Output;

        fn parse<'a>(&self, state: &State<'a, A::Input, A::User>) -> ParseResult<'a, A::Input, A::User, A::Output> {
            let result = self.0.parse(state);
            match result.reply {
                Err(err) => ParseResult::err_empty(err),
                reply => ParseResult { reply, consumed: result.consumed },
            }
        }

        fn cloned(&self) -> Self where Self: Sized {
            Self(self.0.cloned())
        }
    }

    Parser::from_pat(Attempt(parser.pat))
}

// LookAhead

/// Run `parser` and, if it succeeds, hand back its value without moving past any input.
pub fn look_ahead<P>(parser: Parser<P>) -> Parser<impl Pattern<Input=P::Input, User=P::User, Output=P::Output>>
    where P: Pattern,
{
    struct LookAhead<A>(A);

    impl<A: Pattern> Pattern for LookAhead<A> {
        type Input = A::Input;
        type User = A::User;
        type Output = A::Output;

        fn parse<'a>(&self, state: &State<'a, A::Input, A::User>) -> ParseResult<'a, A::Input, A::User, A::Output> {
            let result = self.0.parse(state);
            match result.reply {
                Ok((value, _, _)) => ParseResult::ok_empty(value, state.clone(), ParseError::unknown(state.pos().clone())),
                Err(err) => ParseResult { reply: Err(err), consumed: result.consumed },
            }
        }

        fn cloned(&self) -> Self where Self: Sized {
            Self(self.0.cloned())
        }
    }

    Parser::from_pat(LookAhead(parser.pat))
}

// ManyAccum

/// Run `parser` until it fails without consuming, folding each value into an accumulator
/// created by `seed`.
///
/// A consumed failure fails the whole repetition. A success that consumed nothing is reported
/// as an error rather than looping forever.
pub fn many_accum<P, A>(
    combine: impl Fn(&mut A, P::Output) + Clone,
    parser: Parser<P>,
    seed: impl Fn() -> A + Clone,
) -> Parser<impl Pattern<Input=P::Input, User=P::User, Output=A>>
    where P: Pattern,
{
    struct ManyAccum<C, A, S>(C, A, S);

    impl<C, A, S, X> Pattern for ManyAccum<C, A, S>
        where
            A: Pattern,
            C: Fn(&mut X, A::Output) + Clone,
            S: Fn() -> X + Clone,
    {
        type Input = A::Input;
        type User = A::User;
        type Output = X;

        fn parse<'a>(&self, state: &State<'a, A::Input, A::User>) -> ParseResult<'a, A::Input, A::User, X> {
            let mut acc = (self.2)();
            let mut progress = Progress::new(state);
            loop {
                match progress.step(&self.1) {
                    Step::Value(value, true) => (self.0)(&mut acc, value),
                    Step::Value(_, false) => return progress.stuck("many"),
                    Step::Empty(err) => return progress.settle(acc, err),
                    Step::Fatal(err) => return progress.fatal(err),
                }
            }
        }

        fn cloned(&self) -> Self where Self: Sized {
            Self(self.0.clone(), self.1.cloned(), self.2.clone())
        }
    }

    Parser::from_pat(ManyAccum(combine, parser.pat, seed))
}

pub fn many<P>(parser: Parser<P>) -> Parser<impl Pattern<Input=P::Input, User=P::User, Output=Vec<P::Output>>>
    where P: Pattern,
{
    many_accum(|items: &mut Vec<P::Output>, item| items.push(item), parser, Vec::new)
}

pub fn many1<P>(parser: Parser<P>) -> Parser<impl Pattern<Input=P::Input, User=P::User, Output=Vec<P::Output>>>
    where P: Pattern,
{
    parser.clone()
        .then(many(parser))
        .map(|(head, mut tail)| {
            tail.insert(0, head);
            tail
        })
}

pub fn skip_many<P>(parser: Parser<P>) -> Parser<impl Pattern<Input=P::Input, User=P::User, Output=()>>
    where P: Pattern,
{
    many_accum(|_: &mut (), _| (), parser, || ())
}

// User state and position

struct Inspect<I, U, O>(for<'s> fn(&State<'s, I, U>) -> O);

impl<I: Item, U: Clone, O> Pattern for Inspect<I, U, O> {
    type Input = I;
    type User = U;
    type Output = O;

    fn parse<'a>(&self, state: &State<'a, I, U>) -> ParseResult<'a, I, U, O> {
        ParseResult::ok_empty((self.0)(state), state.clone(), ParseError::unknown(state.pos().clone()))
    }

    fn cloned(&self) -> Self where Self: Sized {
        Self(self.0)
    }
}

pub fn get_state<I, U>() -> Parser<impl Pattern<Input=I, User=U, Output=U>>
    where
        I: Item,
        U: Clone,
{
    Parser::from_pat(Inspect(|state: &State<'_, I, U>| state.user().clone()))
}

pub fn get_position<I, U>() -> Parser<impl Pattern<Input=I, User=U, Output=SourcePos>>
    where
        I: Item,
        U: Clone,
{
    Parser::from_pat(Inspect(|state: &State<'_, I, U>| state.pos().clone()))
}

/// Replace the user state with `f` applied to it. Never consumes.
pub fn modify_state<I, U>(f: impl Fn(&U) -> U + Clone) -> Parser<impl Pattern<Input=I, User=U, Output=()>>
    where
        I: Item,
        U: Clone,
{
    struct ModifyState<F, I, U>(F, PhantomData<fn() -> (I, U)>);

    impl<I, U, F> Pattern for ModifyState<F, I, U>
        where
            I: Item,
            U: Clone,
            F: Fn(&U) -> U + Clone,
    {
        type Input = I;
        type User = U;
        type Output = ();

        fn parse<'a>(&self, state: &State<'a, I, U>) -> ParseResult<'a, I, U, ()> {
            let next = state.with_user((self.0)(state.user()));
            ParseResult::ok_empty((), next, ParseError::unknown(state.pos().clone()))
        }

        fn cloned(&self) -> Self where Self: Sized {
            Self(self.0.clone(), PhantomData)
        }
    }

    Parser::from_pat(ModifyState(f, PhantomData))
}

pub fn put_state<I, U>(user: U) -> Parser<impl Pattern<Input=I, User=U, Output=()>>
    where
        I: Item,
        U: Clone,
{
    modify_state(move |_: &U| user.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chars::char;

    fn state(input: &[char]) -> State<'_, char, ()> {
        State::new(input, SourcePos::new(""), ())
    }

    #[test]
    fn token_consumes_only_on_success() {
        let input = ['a', 'b'];
        let p = token(|c: &char| c.show(), |c: &char| if *c == 'a' { Some(1) } else { None });

        let ok = p.parse_state(&state(&input));
        assert!(ok.consumed);
        assert_eq!(ok.into_result(), Ok(1));

        let err = p.parse_state(&state(&input[1..]));
        assert!(err.is_empty_err());
        assert_eq!(err.error().to_string(), "(line 1, column 1): unexpected 'b'");

        let end = p.parse_state(&state(&[]));
        assert!(end.is_empty_err());
        assert_eq!(end.error().to_string(), "(line 1, column 1): unexpected end of input");
    }

    #[test]
    fn tokens_matches_whole_prefix() {
        let input = "abd".chars().collect::<Vec<_>>();
        let abc = tokens(<char as Item>::show_many, |pos: &SourcePos, s: &[char]| pos.advance_chars(s), "abc".chars());
        let ab = tokens(<char as Item>::show_many, |pos: &SourcePos, s: &[char]| pos.advance_chars(s), "ab".chars());

        let result = ab.parse_state(&state(&input));
        assert!(result.consumed);
        match result.reply {
            Ok((out, next, _)) => {
                assert_eq!(out, vec!['a', 'b']);
                assert_eq!(next.input(), &['d']);
                assert_eq!(next.pos(), &SourcePos::at("", 1, 3));
            },
            Err(err) => panic!("{}", err),
        }

        let result = abc.parse_state(&state(&input));
        assert!(result.is_empty_err());
        assert_eq!(
            result.error().to_string(),
            "(line 1, column 1): unexpected \"abd\"; expecting \"abc\"",
        );

        let short = ['a', 'b'];
        let result = abc.parse_state(&state(&short));
        assert!(result.is_empty_err());
        assert_eq!(
            result.error().to_string(),
            "(line 1, column 1): unexpected end of input; expecting \"abc\"",
        );
    }

    #[test]
    fn empty_target_never_consumes() {
        let input = ['x'];
        let p = tokens(<char as Item>::show_many, |pos: &SourcePos, s: &[char]| pos.advance_chars(s), Vec::new());
        let result = p.parse_state(&state(&input));
        assert!(!result.consumed);
        assert_eq!(result.into_result(), Ok(vec![]));
    }

    #[test]
    fn attempt_turns_consumed_failure_empty() {
        let input = ['a', 'c'];
        let ab = char::<()>('a').then(char('b'));

        let plain = ab.parse_state(&state(&input));
        assert!(plain.consumed && !plain.is_ok());

        let tried = attempt(ab).parse_state(&state(&input));
        assert!(tried.is_empty_err());
        assert_eq!(tried.error().pos(), &SourcePos::at("", 1, 2));
    }

    #[test]
    fn look_ahead_keeps_state() {
        let input = ['a', 'b'];
        let s = state(&input);
        let result = look_ahead(char::<()>('a')).parse_state(&s);
        assert!(!result.consumed);
        match result.reply {
            Ok((c, next, _)) => {
                assert_eq!(c, 'a');
                assert_eq!(next, s);
            },
            Err(err) => panic!("{}", err),
        }

        let failed = look_ahead(char::<()>('a').then(char('x'))).parse_state(&s);
        assert!(failed.consumed && !failed.is_ok());
    }

    #[test]
    fn many_rejects_empty_loops() {
        let err = many(pure::<char, (), _>(0)).parse("abc".chars()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "(line 1, column 1): combinator 'many' is applied to a parser that accepts an empty string",
        );
    }

    #[test]
    fn many_propagates_consumed_failure() {
        let input = "ababac".chars().collect::<Vec<_>>();
        let result = many(char::<()>('a').then(char('b'))).parse_state(&state(&input));
        assert!(result.consumed);
        assert_eq!(result.error().pos(), &SourcePos::at("", 1, 6));
    }

    #[test]
    fn user_state() {
        let p = modify_state(|n: &u32| n + 1)
            .then(char('x'))
            .then(modify_state(|n: &u32| n * 10))
            .padding_for(get_state());
        assert_eq!(p.parse_with("x".chars(), 4, ""), Ok(50));

        let p = put_state::<char, _>(7u32).padding_for(get_state());
        assert_eq!(p.parse("".chars()), Ok(7));
    }
}
