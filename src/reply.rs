use crate::{
    error::ParseError,
    stream::State,
};

/// Success carries the value, the state to continue from and a "ghost" error describing
/// alternatives that were still open. Failure carries only the error.
pub type Reply<'a, I, U, O> = Result<(O, State<'a, I, U>, ParseError), ParseError>;

/// The outcome of running a parser once.
///
/// `consumed` records whether any input was taken, whatever the reply. Only an empty failure
/// (`consumed == false` and `Err`) allows an alternative to be tried.
#[derive(Debug)]
pub struct ParseResult<'a, I, U, O> {
    pub reply: Reply<'a, I, U, O>,
    pub consumed: bool,
}

impl<'a, I, U, O> ParseResult<'a, I, U, O> {
    pub fn ok_consumed(value: O, state: State<'a, I, U>, error: ParseError) -> Self {
        Self { reply: Ok((value, state, error)), consumed: true }
    }

    pub fn ok_empty(value: O, state: State<'a, I, U>, error: ParseError) -> Self {
        Self { reply: Ok((value, state, error)), consumed: false }
    }

    pub fn err_consumed(error: ParseError) -> Self {
        Self { reply: Err(error), consumed: true }
    }

    pub fn err_empty(error: ParseError) -> Self {
        Self { reply: Err(error), consumed: false }
    }

    pub fn is_ok(&self) -> bool {
        self.reply.is_ok()
    }

    /// True only for a failure that consumed nothing.
    pub fn is_empty_err(&self) -> bool {
        !self.consumed && self.reply.is_err()
    }

    /// The ghost error of a success, or the error of a failure.
    pub fn error(&self) -> &ParseError {
        match &self.reply {
            Ok((_, _, error)) => error,
            Err(error) => error,
        }
    }

    /// Fold `error` into the reply's error. The consumed flag is left alone.
    pub fn merge_error(self, error: ParseError) -> Self {
        let reply = match self.reply {
            Ok((value, state, ghost)) => Ok((value, state, error.merge(ghost))),
            Err(err) => Err(error.merge(err)),
        };
        Self { reply, consumed: self.consumed }
    }

    pub fn map<X>(self, f: impl FnOnce(O) -> X) -> ParseResult<'a, I, U, X> {
        ParseResult {
            reply: self.reply.map(|(value, state, error)| (f(value), state, error)),
            consumed: self.consumed,
        }
    }

    /// Continue a sequence: `self` is the result of the second parser, run after a first
    /// parser that succeeded with `consumed` and `ghost`.
    pub(crate) fn after(self, consumed: bool, ghost: ParseError) -> Self {
        if self.consumed {
            self
        } else {
            Self { consumed, ..self.merge_error(ghost) }
        }
    }

    pub fn into_result(self) -> Result<O, ParseError> {
        self.reply.map(|(value, _, _)| value)
    }
}
