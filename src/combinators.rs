use std::{
    fmt,
    marker::PhantomData,
};
use crate::{
    util::{Progress, Step},
    primitives::{pure, pure_with, many, many1, skip_many, token},
    error::{Message, ParseError},
    reply::ParseResult,
    stream::{Item, State},
    Parser,
    Pattern,
};

// Choice

/// Try each parser in turn until one succeeds or fails after consuming input.
///
/// Errors of alternatives that failed without consuming are merged into the final reply.
pub fn choice<P>(parsers: impl IntoIterator<Item=Parser<P>>) -> Parser<impl Pattern<Input=P::Input, User=P::User, Output=P::Output>>
    where P: Pattern,
{
    struct Choice<A>(Vec<A>);

    impl<A: Pattern> Pattern for Choice<A> {
        type Input = A::Input;
        type User = A::User;
        type Output = A::Output;

        fn parse<'a>(&self, state: &State<'a, A::Input, A::User>) -> ParseResult<'a, A::Input, A::User, A::Output> {
            let mut error: Option<ParseError> = None;
            for pat in self.0.iter() {
                let result = pat.parse(state);
                let result = match error.take() {
                    Some(err) if !result.consumed => result.merge_error(err),
                    _ => result,
                };
                let consumed = result.consumed;
                match result.reply {
                    Err(err) if !consumed => error = Some(err),
                    reply => return ParseResult { reply, consumed },
                }
            }
            ParseResult::err_empty(error.unwrap_or_else(|| {
                ParseError::new(state.pos().clone(), Message::generic("no alternatives"))
            }))
        }

        fn cloned(&self) -> Self where Self: Sized {
            Self(self.0.iter().map(|pat| pat.cloned()).collect())
        }
    }

    Parser::from_pat(Choice(parsers.into_iter().map(|parser| parser.pat).collect()))
}

// Count

/// Exactly `n` occurrences of `parser`.
pub fn count<P>(n: usize, parser: Parser<P>) -> Parser<impl Pattern<Input=P::Input, User=P::User, Output=Vec<P::Output>>>
    where P: Pattern,
{
    struct Count<A>(usize, A);

    impl<A: Pattern> Pattern for Count<A> {
        type Input = A::Input;
        type User = A::User;
        type Output = Vec<A::Output>;

        fn parse<'a>(&self, state: &State<'a, A::Input, A::User>) -> ParseResult<'a, A::Input, A::User, Vec<A::Output>> {
            let mut items = Vec::with_capacity(self.0.min(state.input().len()));
            let mut progress = Progress::new(state);
            for _ in 0..self.0 {
                match progress.step(&self.1) {
                    Step::Value(item, _) => items.push(item),
                    Step::Empty(err) => return progress.fail(err),
                    Step::Fatal(err) => return progress.fatal(err),
                }
            }
            progress.succeed(items)
        }

        fn cloned(&self) -> Self where Self: Sized {
            Self(self.0, self.1.cloned())
        }
    }

    Parser::from_pat(Count(n, parser.pat))
}

pub fn between<P, X, Y>(
    open: Parser<impl Pattern<Input=P::Input, User=P::User, Output=X>>,
    close: Parser<impl Pattern<Input=P::Input, User=P::User, Output=Y>>,
    parser: Parser<P>,
) -> Parser<impl Pattern<Input=P::Input, User=P::User, Output=P::Output>>
    where P: Pattern,
{
    open.padding_for(parser).padded_by(close)
}

// Option

/// `parser`, or `default` if it fails without consuming input.
pub fn option<P>(default: P::Output, parser: Parser<P>) -> Parser<impl Pattern<Input=P::Input, User=P::User, Output=P::Output>>
    where
        P: Pattern,
        P::Output: Clone,
{
    parser.or(pure(default))
}

pub fn option_maybe<P>(parser: Parser<P>) -> Parser<impl Pattern<Input=P::Input, User=P::User, Output=Option<P::Output>>>
    where P: Pattern,
{
    parser.map(Some).or(pure_with(|| None))
}

pub fn optional<P>(parser: Parser<P>) -> Parser<impl Pattern<Input=P::Input, User=P::User, Output=()>>
    where P: Pattern,
{
    parser.map(|_| ()).or(pure(()))
}

pub fn skip_many1<P>(parser: Parser<P>) -> Parser<impl Pattern<Input=P::Input, User=P::User, Output=()>>
    where P: Pattern,
{
    parser.clone().then(skip_many(parser)).map(|_| ())
}

// Separated lists

pub fn sep_by<P, Y>(
    parser: Parser<P>,
    sep: Parser<impl Pattern<Input=P::Input, User=P::User, Output=Y>>,
) -> Parser<impl Pattern<Input=P::Input, User=P::User, Output=Vec<P::Output>>>
    where P: Pattern,
{
    sep_by1(parser, sep).or(pure_with(Vec::new))
}

pub fn sep_by1<P, Y>(
    parser: Parser<P>,
    sep: Parser<impl Pattern<Input=P::Input, User=P::User, Output=Y>>,
) -> Parser<impl Pattern<Input=P::Input, User=P::User, Output=Vec<P::Output>>>
    where P: Pattern,
{
    parser.clone()
        .then(many(sep.padding_for(parser)))
        .map(|(head, mut tail)| {
            tail.insert(0, head);
            tail
        })
}

/// Zero or more occurrences of `parser`, each followed by `sep`.
pub fn end_by<P, Y>(
    parser: Parser<P>,
    sep: Parser<impl Pattern<Input=P::Input, User=P::User, Output=Y>>,
) -> Parser<impl Pattern<Input=P::Input, User=P::User, Output=Vec<P::Output>>>
    where P: Pattern,
{
    many(parser.padded_by(sep))
}

pub fn end_by1<P, Y>(
    parser: Parser<P>,
    sep: Parser<impl Pattern<Input=P::Input, User=P::User, Output=Y>>,
) -> Parser<impl Pattern<Input=P::Input, User=P::User, Output=Vec<P::Output>>>
    where P: Pattern,
{
    many1(parser.padded_by(sep))
}

pub fn sep_end_by<P, Y>(
    parser: Parser<P>,
    sep: Parser<impl Pattern<Input=P::Input, User=P::User, Output=Y>>,
) -> Parser<impl Pattern<Input=P::Input, User=P::User, Output=Vec<P::Output>>>
    where P: Pattern,
{
    sep_end_by1(parser, sep).or(pure_with(Vec::new))
}

/// One or more occurrences of `parser` separated by `sep`, with an optional trailing `sep`.
pub fn sep_end_by1<P, Y>(
    parser: Parser<P>,
    sep: Parser<impl Pattern<Input=P::Input, User=P::User, Output=Y>>,
) -> Parser<impl Pattern<Input=P::Input, User=P::User, Output=Vec<P::Output>>>
    where P: Pattern,
{
    struct SepEndBy1<A, B>(A, B);

    impl<A, B> Pattern for SepEndBy1<A, B>
        where
            A: Pattern,
            B: Pattern<Input=A::Input, User=A::User>,
    {
        type Input = A::Input;
        type User = A::User;
        type Output = Vec<A::Output>;

        fn parse<'a>(&self, state: &State<'a, A::Input, A::User>) -> ParseResult<'a, A::Input, A::User, Vec<A::Output>> {
            let mut progress = Progress::new(state);
            let mut items = match progress.step(&self.0) {
                Step::Value(item, _) => vec![item],
                Step::Empty(err) => return progress.fail(err),
                Step::Fatal(err) => return progress.fatal(err),
            };
            loop {
                let sep_consumed = match progress.step(&self.1) {
                    Step::Value(_, consumed) => consumed,
                    Step::Empty(err) => return progress.settle(items, err),
                    Step::Fatal(err) => return progress.fatal(err),
                };
                match progress.step(&self.0) {
                    Step::Value(_, false) if !sep_consumed => return progress.stuck("sep_end_by"),
                    Step::Value(item, _) => items.push(item),
                    // A trailing separator ends the list
                    Step::Empty(err) => return progress.settle(items, err),
                    Step::Fatal(err) => return progress.fatal(err),
                }
            }
        }

        fn cloned(&self) -> Self where Self: Sized {
            Self(self.0.cloned(), self.1.cloned())
        }
    }

    Parser::from_pat(SepEndBy1(parser.pat, sep.pat))
}

// Chains

/// One or more `parser` separated by `op`, folded to the left.
///
/// An operator that consumed input must be followed by an operand: if it is not, the chain
/// fails. An operator that consumed nothing simply ends the chain.
pub fn chain_l1<P, F>(
    parser: Parser<P>,
    op: Parser<impl Pattern<Input=P::Input, User=P::User, Output=F>>,
) -> Parser<impl Pattern<Input=P::Input, User=P::User, Output=P::Output>>
    where
        P: Pattern,
        F: Fn(P::Output, P::Output) -> P::Output,
{
    struct ChainL1<A, B>(A, B);

    impl<A, B, F> Pattern for ChainL1<A, B>
        where
            A: Pattern,
            B: Pattern<Input=A::Input, User=A::User, Output=F>,
            F: Fn(A::Output, A::Output) -> A::Output,
    {
        type Input = A::Input;
        type User = A::User;
        type Output = A::Output;

        fn parse<'a>(&self, state: &State<'a, A::Input, A::User>) -> ParseResult<'a, A::Input, A::User, A::Output> {
            let mut progress = Progress::new(state);
            let mut acc = match progress.step(&self.0) {
                Step::Value(x, _) => x,
                Step::Empty(err) => return progress.fail(err),
                Step::Fatal(err) => return progress.fatal(err),
            };
            loop {
                let before = progress.state().clone();
                let (f, op_consumed) = match progress.step(&self.1) {
                    Step::Value(f, consumed) => (f, consumed),
                    Step::Empty(err) => return progress.settle(acc, err),
                    Step::Fatal(err) => return progress.fatal(err),
                };
                let y = match progress.step(&self.0) {
                    Step::Value(_, false) if !op_consumed => return progress.stuck("chain_l1"),
                    Step::Value(y, _) => y,
                    Step::Empty(err) if !op_consumed => {
                        progress.rewind(before);
                        return progress.settle(acc, err);
                    },
                    Step::Empty(err) => return progress.fail(err),
                    Step::Fatal(err) => return progress.fatal(err),
                };
                acc = f(acc, y);
            }
        }

        fn cloned(&self) -> Self where Self: Sized {
            Self(self.0.cloned(), self.1.cloned())
        }
    }

    Parser::from_pat(ChainL1(parser.pat, op.pat))
}

/// One or more `parser` separated by `op`, folded to the right.
pub fn chain_r1<P, F>(
    parser: Parser<P>,
    op: Parser<impl Pattern<Input=P::Input, User=P::User, Output=F>>,
) -> Parser<impl Pattern<Input=P::Input, User=P::User, Output=P::Output>>
    where
        P: Pattern,
        F: Fn(P::Output, P::Output) -> P::Output,
{
    struct ChainR1<A, B>(A, B);

    impl<A, B, F> Pattern for ChainR1<A, B>
        where
            A: Pattern,
            B: Pattern<Input=A::Input, User=A::User, Output=F>,
            F: Fn(A::Output, A::Output) -> A::Output,
    {
        type Input = A::Input;
        type User = A::User;
        type Output = A::Output;

        fn parse<'a>(&self, state: &State<'a, A::Input, A::User>) -> ParseResult<'a, A::Input, A::User, A::Output> {
            let mut progress = Progress::new(state);
            let first = match progress.step(&self.0) {
                Step::Value(x, _) => x,
                Step::Empty(err) => return progress.fail(err),
                Step::Fatal(err) => return progress.fatal(err),
            };
            let mut rest = Vec::new();
            loop {
                let before = progress.state().clone();
                let (f, op_consumed) = match progress.step(&self.1) {
                    Step::Value(f, consumed) => (f, consumed),
                    Step::Empty(err) => return progress.settle(fold_right(first, rest), err),
                    Step::Fatal(err) => return progress.fatal(err),
                };
                match progress.step(&self.0) {
                    Step::Value(_, false) if !op_consumed => return progress.stuck("chain_r1"),
                    Step::Value(y, _) => rest.push((f, y)),
                    Step::Empty(err) if !op_consumed => {
                        progress.rewind(before);
                        return progress.settle(fold_right(first, rest), err);
                    },
                    Step::Empty(err) => return progress.fail(err),
                    Step::Fatal(err) => return progress.fatal(err),
                }
            }
        }

        fn cloned(&self) -> Self where Self: Sized {
            Self(self.0.cloned(), self.1.cloned())
        }
    }

    Parser::from_pat(ChainR1(parser.pat, op.pat))
}

// `rest` pairs each operator with the operand to its right
fn fold_right<O, F: Fn(O, O) -> O>(first: O, mut rest: Vec<(F, O)>) -> O {
    let (mut f, mut acc) = match rest.pop() {
        Some(last) => last,
        None => return first,
    };
    while let Some((g, x)) = rest.pop() {
        acc = f(x, acc);
        f = g;
    }
    f(first, acc)
}

pub fn chain_l<P, F>(
    parser: Parser<P>,
    op: Parser<impl Pattern<Input=P::Input, User=P::User, Output=F>>,
    default: P::Output,
) -> Parser<impl Pattern<Input=P::Input, User=P::User, Output=P::Output>>
    where
        P: Pattern,
        P::Output: Clone,
        F: Fn(P::Output, P::Output) -> P::Output,
{
    option(default, chain_l1(parser, op))
}

pub fn chain_r<P, F>(
    parser: Parser<P>,
    op: Parser<impl Pattern<Input=P::Input, User=P::User, Output=F>>,
    default: P::Output,
) -> Parser<impl Pattern<Input=P::Input, User=P::User, Output=P::Output>>
    where
        P: Pattern,
        P::Output: Clone,
        F: Fn(P::Output, P::Output) -> P::Output,
{
    option(default, chain_r1(parser, op))
}

// Single items and assertions

pub fn any_token<I, U>() -> Parser<impl Pattern<Input=I, User=U, Output=I>>
    where
        I: Item,
        U: Clone,
{
    token(I::show, |item: &I| Some(item.clone()))
}

/// Succeed, consuming nothing, exactly when `parser` fails.
///
/// Behaves as `attempt(look_ahead(parser))` with the outcome inverted: input is never consumed
/// whatever `parser` does.
pub fn not_followed_by<P>(parser: Parser<P>) -> Parser<impl Pattern<Input=P::Input, User=P::User, Output=()>>
    where
        P: Pattern,
        P::Output: fmt::Debug,
{
    struct NotFollowedBy<A>(A);

    impl<A> Pattern for NotFollowedBy<A>
        where
            A: Pattern,
            A::Output: fmt::Debug,
    {
        type Input = A::Input;
        type User = A::User;
        type Output = ();

        fn parse<'a>(&self, state: &State<'a, A::Input, A::User>) -> ParseResult<'a, A::Input, A::User, ()> {
            match self.0.parse(state).reply {
                Ok((found, _, _)) => ParseResult::err_empty(ParseError::new(
                    state.pos().clone(),
                    Message::unexpected(format!("{:?}", found)),
                )),
                Err(_) => ParseResult::ok_empty((), state.clone(), ParseError::unknown(state.pos().clone())),
            }
        }

        fn cloned(&self) -> Self where Self: Sized {
            Self(self.0.cloned())
        }
    }

    Parser::from_pat(NotFollowedBy(parser.pat))
}

pub fn eof<I, U>() -> Parser<impl Pattern<Input=I, User=U, Output=()>>
    where
        I: Item,
        U: Clone,
{
    not_followed_by(any_token()).label("end of input")
}

/// Zero or more `parser` up to the first `end`. The value of `end` is dropped.
pub fn many_till<P, Y>(
    parser: Parser<P>,
    end: Parser<impl Pattern<Input=P::Input, User=P::User, Output=Y>>,
) -> Parser<impl Pattern<Input=P::Input, User=P::User, Output=Vec<P::Output>>>
    where P: Pattern,
{
    struct ManyTill<A, B>(A, B);

    impl<A, B> Pattern for ManyTill<A, B>
        where
            A: Pattern,
            B: Pattern<Input=A::Input, User=A::User>,
    {
        type Input = A::Input;
        type User = A::User;
        type Output = Vec<A::Output>;

        fn parse<'a>(&self, state: &State<'a, A::Input, A::User>) -> ParseResult<'a, A::Input, A::User, Vec<A::Output>> {
            let mut items = Vec::new();
            let mut progress = Progress::new(state);
            loop {
                match progress.step(&self.1) {
                    Step::Value(_, _) => return progress.succeed(items),
                    Step::Fatal(err) => return progress.fatal(err),
                    Step::Empty(end_err) => match progress.step(&self.0) {
                        Step::Value(_, false) => return progress.stuck("many_till"),
                        Step::Value(item, true) => items.push(item),
                        Step::Empty(err) => return progress.fail(end_err.merge(err)),
                        Step::Fatal(err) => return progress.fatal(err),
                    },
                }
            }
        }

        fn cloned(&self) -> Self where Self: Sized {
            Self(self.0.cloned(), self.1.cloned())
        }
    }

    Parser::from_pat(ManyTill(parser.pat, end.pat))
}

// Tracing

fn show_remaining<I: Item>(input: &[I]) -> String {
    I::show_many(&input[..input.len().min(16)])
}

/// Log the label, position and upcoming input at debug level. Always succeeds.
pub fn parser_trace<I, U>(label: impl Into<String>) -> Parser<impl Pattern<Input=I, User=U, Output=()>>
    where
        I: Item,
        U: Clone,
{
    struct Trace<I, U>(String, PhantomData<fn() -> (I, U)>);

    impl<I: Item, U: Clone> Pattern for Trace<I, U> {
        type Input = I;
        type User = U;
        type Output = ();

        fn parse<'a>(&self, state: &State<'a, I, U>) -> ParseResult<'a, I, U, ()> {
            log::debug!("{}: {} at {}", self.0, show_remaining(state.input()), state.pos());
            ParseResult::ok_empty((), state.clone(), ParseError::unknown(state.pos().clone()))
        }

        fn cloned(&self) -> Self where Self: Sized {
            Self(self.0.clone(), PhantomData)
        }
    }

    Parser::from_pat(Trace(label.into(), PhantomData))
}

/// Trace entry into `parser` with [`parser_trace`], and log when it fails.
pub fn parser_traced<P>(label: impl Into<String>, parser: Parser<P>) -> Parser<impl Pattern<Input=P::Input, User=P::User, Output=P::Output>>
    where P: Pattern,
{
    struct Traced<A>(String, A);

    impl<A: Pattern> Pattern for Traced<A> {
        type Input = A::Input;
        type User = A::User;
        type Output = A::Output;

        fn parse<'a>(&self, state: &State<'a, A::Input, A::User>) -> ParseResult<'a, A::Input, A::User, A::Output> {
            log::debug!("{}: {} at {}", self.0, show_remaining(state.input()), state.pos());
            let result = self.1.parse(state);
            if !result.is_ok() {
                log::debug!("{} backtracked: {}", self.0, result.error());
            }
            result
        }

        fn cloned(&self) -> Self where Self: Sized {
            Self(self.0.clone(), self.1.cloned())
        }
    }

    Parser::from_pat(Traced(label.into(), parser.pat))
}
