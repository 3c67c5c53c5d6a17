use std::fmt;
use crate::{
    primitives,
    combinators,
    error::{Message, ParseError},
    reply::ParseResult,
    stream::State,
    Parser,
    Pattern,
};

impl<P> Parser<P> {
    pub fn map<X>(self, f: impl Fn(P::Output) -> X + Clone) -> Parser<impl Pattern<Input=P::Input, User=P::User, Output=X>>
        where P: Pattern,
    {
        struct Map<A, F>(A, F);

        impl<A, F, X> Pattern for Map<A, F>
            where
                A: Pattern,
                F: Fn(A::Output) -> X + Clone,
        {
            type Input = A::Input;
            type User = A::User;
            type Output = X;

            fn parse<'a>(&self, state: &State<'a, A::Input, A::User>) -> ParseResult<'a, A::Input, A::User, X> {
                self.0.parse(state).map(|out| (self.1)(out))
            }

            fn cloned(&self) -> Self where Self: Sized {
                Self(self.0.cloned(), self.1.clone())
            }
        }

        Parser::from_pat(Map(self.pat, f))
    }

    /// Convert the output with a fallible function. An `Err` becomes a generic parse error at the
    /// position reached by this parser.
    pub fn try_map<X, E>(self, f: impl Fn(P::Output) -> Result<X, E> + Clone) -> Parser<impl Pattern<Input=P::Input, User=P::User, Output=X>>
        where
            P: Pattern,
            E: fmt::Display,
    {
        struct TryMap<A, F>(A, F);

        impl<A, F, X, E> Pattern for TryMap<A, F>
            where
                A: Pattern,
                F: Fn(A::Output) -> Result<X, E> + Clone,
                E: fmt::Display,
        {
            type Input = A::Input;
            type User = A::User;
            type Output = X;

            fn parse<'a>(&self, state: &State<'a, A::Input, A::User>) -> ParseResult<'a, A::Input, A::User, X> {
                let result = self.0.parse(state);
                let reply = match result.reply {
                    Ok((out, next, ghost)) => match (self.1)(out) {
                        Ok(out) => Ok((out, next, ghost)),
                        Err(err) => Err(ParseError::new(next.pos().clone(), Message::generic(err.to_string()))),
                    },
                    Err(err) => Err(err),
                };
                ParseResult { reply, consumed: result.consumed }
            }

            fn cloned(&self) -> Self where Self: Sized {
                Self(self.0.cloned(), self.1.clone())
            }
        }

        Parser::from_pat(TryMap(self.pat, f))
    }

    pub fn to<X>(self, out: X) -> Parser<impl Pattern<Input=P::Input, User=P::User, Output=X>>
        where
            P: Pattern,
            X: Clone,
    {
        self.map(move |_| out.clone())
    }

    /// Monadic bind: feed this parser's output to `f` and run the parser it returns.
    pub fn bind<Q>(self, f: impl Fn(P::Output) -> Parser<Q> + Clone) -> Parser<impl Pattern<Input=P::Input, User=P::User, Output=Q::Output>>
        where
            P: Pattern,
            Q: Pattern<Input=P::Input, User=P::User>,
    {
        struct Bind<A, F>(A, F);

        impl<A, F, B> Pattern for Bind<A, F>
            where
                A: Pattern,
                B: Pattern<Input=A::Input, User=A::User>,
                F: Fn(A::Output) -> Parser<B> + Clone,
        {
            type Input = A::Input;
            type User = A::User;
            type Output = B::Output;

            fn parse<'a>(&self, state: &State<'a, A::Input, A::User>) -> ParseResult<'a, A::Input, A::User, B::Output> {
                let first = self.0.parse(state);
                match first.reply {
                    Ok((out, next, ghost)) => (self.1)(out)
                        .parse_state(&next)
                        .after(first.consumed, ghost),
                    Err(err) => ParseResult { reply: Err(err), consumed: first.consumed },
                }
            }

            fn cloned(&self) -> Self where Self: Sized {
                Self(self.0.cloned(), self.1.clone())
            }
        }

        Parser::from_pat(Bind(self.pat, f))
    }

    pub fn then<Y>(self, other: Parser<impl Pattern<Input=P::Input, User=P::User, Output=Y>>) -> Parser<impl Pattern<Input=P::Input, User=P::User, Output=(P::Output, Y)>>
        where P: Pattern,
    {
        struct Then<A, B>(A, B);

        impl<A, B, Y> Pattern for Then<A, B>
            where
                A: Pattern,
                B: Pattern<Input=A::Input, User=A::User, Output=Y>,
        {
            type Input = A::Input;
            type User = A::User;
            type Output = (A::Output, Y);

            fn parse<'a>(&self, state: &State<'a, A::Input, A::User>) -> ParseResult<'a, A::Input, A::User, (A::Output, Y)> {
                let first = self.0.parse(state);
                match first.reply {
                    Ok((a, next, ghost)) => self.1
                        .parse(&next)
                        .after(first.consumed, ghost)
                        .map(|b| (a, b)),
                    Err(err) => ParseResult { reply: Err(err), consumed: first.consumed },
                }
            }

            fn cloned(&self) -> Self where Self: Sized {
                Self(self.0.cloned(), self.1.cloned())
            }
        }

        Parser::from_pat(Then(self.pat, other.pat))
    }

    pub fn padding_for<Y>(self, other: Parser<impl Pattern<Input=P::Input, User=P::User, Output=Y>>) -> Parser<impl Pattern<Input=P::Input, User=P::User, Output=Y>>
        where P: Pattern,
    {
        self.then(other).map(|(_, b)| b)
    }

    pub fn padded_by<Y>(self, other: Parser<impl Pattern<Input=P::Input, User=P::User, Output=Y>>) -> Parser<impl Pattern<Input=P::Input, User=P::User, Output=P::Output>>
        where P: Pattern,
    {
        self.then(other).map(|(a, _)| a)
    }

    /// Try this parser, then `other` if this one failed without consuming input.
    ///
    /// A failure after consuming input is final: wrap the left side in [`Parser::attempt`] to
    /// allow backtracking.
    pub fn or(self, other: Parser<impl Pattern<Input=P::Input, User=P::User, Output=P::Output>>) -> Parser<impl Pattern<Input=P::Input, User=P::User, Output=P::Output>>
        where P: Pattern,
    {
        struct Or<A, B>(A, B);

        impl<A, B> Pattern for Or<A, B>
            where
                A: Pattern,
                B: Pattern<Input=A::Input, User=A::User, Output=A::Output>,
        {
            type Input = A::Input;
            type User = A::User;
            type Output = A::Output;

            fn parse<'a>(&self, state: &State<'a, A::Input, A::User>) -> ParseResult<'a, A::Input, A::User, A::Output> {
                let first = self.0.parse(state);
                let consumed = first.consumed;
                match first.reply {
                    Err(err) if !consumed => {
                        let second = self.1.parse(state);
                        if second.consumed {
                            second
                        } else {
                            second.merge_error(err)
                        }
                    },
                    reply => ParseResult { reply, consumed },
                }
            }

            fn cloned(&self) -> Self where Self: Sized {
                Self(self.0.cloned(), self.1.cloned())
            }
        }

        Parser::from_pat(Or(self.pat, other.pat))
    }

    /// Name what this parser expects.
    ///
    /// Only outcomes that consumed nothing are relabelled: empty failures, and the ghost error
    /// of an empty success when it carries any messages.
    pub fn label(self, msg: impl Into<String>) -> Parser<impl Pattern<Input=P::Input, User=P::User, Output=P::Output>>
        where P: Pattern,
    {
        struct Label<A>(A, String);

        impl<A: Pattern> Pattern for Label<A> {
            type Input = A::Input;
            type User = A::User;
            type Output = A::Output;

            fn parse<'a>(&self, state: &State<'a, A::Input, A::User>) -> ParseResult<'a, A::Input, A::User, A::Output> {
                let result = self.0.parse(state);
                let consumed = result.consumed;
                match result.reply {
                    Err(err) if !consumed => ParseResult::err_empty(err.set_expect(self.1.as_str())),
                    Ok((value, next, ghost)) if !consumed && !ghost.is_unknown() => {
                        ParseResult::ok_empty(value, next, ghost.set_expect(self.1.as_str()))
                    },
                    reply => ParseResult { reply, consumed },
                }
            }

            fn cloned(&self) -> Self where Self: Sized {
                Self(self.0.cloned(), self.1.clone())
            }
        }

        Parser::from_pat(Label(self.pat, msg.into()))
    }

    pub fn attempt(self) -> Parser<impl Pattern<Input=P::Input, User=P::User, Output=P::Output>>
        where P: Pattern,
    {
        primitives::attempt(self)
    }

    pub fn look_ahead(self) -> Parser<impl Pattern<Input=P::Input, User=P::User, Output=P::Output>>
        where P: Pattern,
    {
        primitives::look_ahead(self)
    }

    pub fn repeated(self) -> Parser<impl Pattern<Input=P::Input, User=P::User, Output=Vec<P::Output>>>
        where P: Pattern,
    {
        primitives::many(self)
    }

    pub fn once_or_more(self) -> Parser<impl Pattern<Input=P::Input, User=P::User, Output=Vec<P::Output>>>
        where P: Pattern,
    {
        primitives::many1(self)
    }

    pub fn separated_by<Y>(self, sep: Parser<impl Pattern<Input=P::Input, User=P::User, Output=Y>>) -> Parser<impl Pattern<Input=P::Input, User=P::User, Output=Vec<P::Output>>>
        where P: Pattern,
    {
        combinators::sep_by(self, sep)
    }

    pub fn or_not(self) -> Parser<impl Pattern<Input=P::Input, User=P::User, Output=Option<P::Output>>>
        where P: Pattern,
    {
        combinators::option_maybe(self)
    }
}
