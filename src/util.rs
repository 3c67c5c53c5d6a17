use std::mem;
use crate::{
    error::{Message, ParseError},
    reply::ParseResult,
    stream::{Item, State},
    Pattern,
};

/// Outcome of running one parser inside a loop.
pub(crate) enum Step<O> {
    /// A value, and whether producing it consumed input.
    Value(O, bool),
    /// A failure that consumed nothing. The loop may stop here.
    Empty(ParseError),
    /// A failure after consuming input.
    Fatal(ParseError),
}

/// Bookkeeping for combinators that run parsers back to back in a loop.
///
/// Sequencing follows `bind`: the consumed flag is sticky, and the ghost error of an empty step
/// is merged into whatever comes next while a consuming step starts afresh.
pub(crate) struct Progress<'a, I, U> {
    state: State<'a, I, U>,
    consumed: bool,
    ghost: ParseError,
}

impl<'a, I: Item, U: Clone> Progress<'a, I, U> {
    pub fn new(state: &State<'a, I, U>) -> Self {
        Self {
            state: state.clone(),
            consumed: false,
            ghost: ParseError::unknown(state.pos().clone()),
        }
    }

    pub fn state(&self) -> &State<'a, I, U> {
        &self.state
    }

    /// Return to an earlier snapshot. Only valid while nothing has been consumed since.
    pub fn rewind(&mut self, state: State<'a, I, U>) {
        self.state = state;
    }

    pub fn step<P>(&mut self, pat: &P) -> Step<P::Output>
        where P: Pattern<Input=I, User=U>,
    {
        let result = pat.parse(&self.state);
        let consumed = result.consumed;
        self.consumed |= consumed;
        match result.reply {
            Ok((value, next, error)) => {
                self.ghost = if consumed {
                    error
                } else {
                    self.take_ghost().merge(error)
                };
                self.state = next;
                Step::Value(value, consumed)
            },
            Err(error) if consumed => Step::Fatal(error),
            Err(error) => Step::Empty(error),
        }
    }

    fn take_ghost(&mut self) -> ParseError {
        let blank = ParseError::unknown(self.state.pos().clone());
        mem::replace(&mut self.ghost, blank)
    }

    pub fn succeed<O>(self, value: O) -> ParseResult<'a, I, U, O> {
        if self.consumed {
            ParseResult::ok_consumed(value, self.state, self.ghost)
        } else {
            ParseResult::ok_empty(value, self.state, self.ghost)
        }
    }

    /// Succeed after an empty failure ended the loop, keeping its error as a ghost.
    pub fn settle<O>(mut self, value: O, error: ParseError) -> ParseResult<'a, I, U, O> {
        self.ghost = self.take_ghost().merge(error);
        self.succeed(value)
    }

    /// Fail with the error of an empty step.
    pub fn fail<O>(mut self, error: ParseError) -> ParseResult<'a, I, U, O> {
        let error = self.take_ghost().merge(error);
        ParseResult { reply: Err(error), consumed: self.consumed }
    }

    pub fn fatal<O>(self, error: ParseError) -> ParseResult<'a, I, U, O> {
        ParseResult::err_consumed(error)
    }

    /// A hard failure at the current position, whatever was consumed so far.
    pub fn abort<O>(self, msg: impl Into<String>) -> ParseResult<'a, I, U, O> {
        ParseResult::err_consumed(ParseError::new(self.state.pos().clone(), Message::generic(msg)))
    }

    /// The loop made a full round without consuming anything and would never terminate.
    pub fn stuck<O>(self, combinator: &str) -> ParseResult<'a, I, U, O> {
        log::debug!("'{}' stopped at {}: no progress", combinator, self.state.pos());
        self.abort(format!(
            "combinator '{}' is applied to a parser that accepts an empty string",
            combinator,
        ))
    }
}
