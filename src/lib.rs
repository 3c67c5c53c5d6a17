pub mod pos;
pub mod error;
pub mod stream;
pub mod reply;
pub mod primitives;
pub mod ops;
pub mod combinators;
pub mod expr;
pub mod declare;
pub mod chars;
pub mod language;
pub mod token;
mod util;

use std::sync::Arc;
use crate::{
    error::*,
    stream::*,
    pos::*,
    reply::*,
};

pub trait Pattern {
    type Input: Item;
    type User: Clone;
    type Output;

    // An empty failure must leave `state` exactly as it was found, which it does trivially
    // since `state` is only borrowed.
    fn parse<'a>(&self, state: &State<'a, Self::Input, Self::User>) -> ParseResult<'a, Self::Input, Self::User, Self::Output>;

    fn cloned(&self) -> Self where Self: Sized;
}

/// A parser value. Parsers are built once, then run any number of times, from any number of
/// threads, against independent inputs.
pub struct Parser<P> {
    pat: P,
}

impl<P: Pattern> Clone for Parser<P> {
    fn clone(&self) -> Self {
        Self {
            pat: self.pat.cloned(),
        }
    }
}

/// A type-erased parser, cheap to clone.
pub type BoxedParser<I, U, O> = Parser<Boxed<I, U, O>>;

pub struct Boxed<I: Item, U: Clone, O>(Arc<dyn Pattern<Input=I, User=U, Output=O> + Send + Sync>);

impl<I: Item, U: Clone, O> Pattern for Boxed<I, U, O> {
    type Input = I;
    type User = U;
    type Output = O;

    fn parse<'a>(&self, state: &State<'a, I, U>) -> ParseResult<'a, I, U, O> {
        self.0.parse(state)
    }

    fn cloned(&self) -> Self where Self: Sized {
        Self(self.0.clone())
    }
}

impl<P> Parser<P> {
    pub fn from_pat(pat: P) -> Self {
        Self { pat }
    }

    pub fn pattern(&self) -> &P {
        &self.pat
    }

    /// Run a single parse step against `state`.
    pub fn parse_state<'a>(&self, state: &State<'a, P::Input, P::User>) -> ParseResult<'a, P::Input, P::User, P::Output>
        where P: Pattern,
    {
        self.pat.parse(state)
    }

    pub fn parse<Ins>(&self, inputs: Ins) -> Result<P::Output, ParseError>
        where
            P: Pattern,
            P::User: Default,
            Ins: IntoIterator<Item=P::Input>,
    {
        run(self, inputs, P::User::default(), "")
    }

    pub fn parse_with<Ins>(&self, inputs: Ins, user: P::User, name: &str) -> Result<P::Output, ParseError>
        where
            P: Pattern,
            Ins: IntoIterator<Item=P::Input>,
    {
        run(self, inputs, user, name)
    }

    pub fn parse_slice(&self, inputs: &[P::Input], user: P::User, name: &str) -> Result<P::Output, ParseError>
        where P: Pattern,
    {
        let state = State::new(inputs, SourcePos::new(name), user);
        let result = self.parse_state(&state);
        log::trace!(
            "parse of {} items from {:?} {} (consumed: {})",
            inputs.len(),
            name,
            if result.is_ok() { "succeeded" } else { "failed" },
            result.consumed,
        );
        result.into_result()
    }

    pub fn boxed(self) -> BoxedParser<P::Input, P::User, P::Output>
        where P: Pattern + Send + Sync + 'static,
    {
        Parser::from_pat(Boxed(Arc::new(self.pat)))
    }
}

/// Parse `inputs` from the start, with the given user state and source name.
///
/// Parse failures come back as a [`ParseError`] value; nothing here panics on bad input.
pub fn run<P, Ins>(parser: &Parser<P>, inputs: Ins, user: P::User, name: &str) -> Result<P::Output, ParseError>
    where
        P: Pattern,
        Ins: IntoIterator<Item=P::Input>,
{
    let inputs = inputs.into_iter().collect::<Vec<_>>();
    parser.parse_slice(&inputs, user, name)
}

pub mod prelude {
    pub use crate::{
        Parser,
        Pattern,
        BoxedParser,
        run,
        pos::SourcePos,
        error::{ParseError, Message, MessageKind},
        stream::{Item, State},
        reply::ParseResult,
        primitives::*,
        combinators::*,
        expr::*,
        declare::*,
        chars::*,
    };
}
