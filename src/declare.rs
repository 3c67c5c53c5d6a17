use std::sync::{Arc, OnceLock, Weak};
use crate::{
    error::{Message, ParseError},
    reply::ParseResult,
    stream::{Item, State},
    Boxed,
    Parser,
    Pattern,
};

/// A parser that can be referred to before it is defined.
pub struct Declaration<I: Item, U: Clone, O> {
    parser: Arc<OnceLock<Boxed<I, U, O>>>,
}

impl<I: Item, U: Clone, O> Default for Declaration<I, U, O> {
    fn default() -> Self {
        Self { parser: Arc::new(OnceLock::new()) }
    }
}

impl<I: Item, U: Clone, O> Declaration<I, U, O> {
    /// A reference to the declared parser.
    ///
    /// Links do not keep the definition alive, so a parser may contain links to itself without
    /// leaking. A link that is run before the declaration is defined, or after the defined parser
    /// has been dropped, fails without consuming input.
    pub fn link(&self) -> Parser<impl Pattern<Input=I, User=U, Output=O>> {
        struct Linked<I: Item, U: Clone, O>(Weak<OnceLock<Boxed<I, U, O>>>);

        impl<I: Item, U: Clone, O> Pattern for Linked<I, U, O> {
            type Input = I;
            type User = U;
            type Output = O;

            fn parse<'a>(&self, state: &State<'a, I, U>) -> ParseResult<'a, I, U, O> {
                match self.0.upgrade().and_then(|slot| slot.get().map(|pat| pat.cloned())) {
                    Some(pat) => pat.parse(state),
                    None => {
                        log::error!("linked parser invoked at {} but never defined", state.pos());
                        ParseResult::err_empty(ParseError::new(
                            state.pos().clone(),
                            Message::generic("undefined parser"),
                        ))
                    },
                }
            }

            fn cloned(&self) -> Self where Self: Sized {
                Self(self.0.clone())
            }
        }

        Parser::from_pat(Linked(Arc::downgrade(&self.parser)))
    }

    pub fn define<P>(self, parser: Parser<P>) -> Parser<impl Pattern<Input=I, User=U, Output=O>>
        where P: Pattern<Input=I, User=U, Output=O> + Send + Sync + 'static,
    {
        struct Defined<I: Item, U: Clone, O>(Arc<OnceLock<Boxed<I, U, O>>>);

        impl<I: Item, U: Clone, O> Pattern for Defined<I, U, O> {
            type Input = I;
            type User = U;
            type Output = O;

            fn parse<'a>(&self, state: &State<'a, I, U>) -> ParseResult<'a, I, U, O> {
                match self.0.get() {
                    Some(pat) => pat.parse(state),
                    None => ParseResult::err_empty(ParseError::new(
                        state.pos().clone(),
                        Message::generic("undefined parser"),
                    )),
                }
            }

            fn cloned(&self) -> Self where Self: Sized {
                Self(self.0.clone())
            }
        }

        if self.parser.set(parser.boxed().pat).is_err() {
            log::warn!("declaration defined twice; keeping the first definition");
        }

        Parser::from_pat(Defined(self.parser))
    }
}

pub fn declare<I: Item, U: Clone, O>() -> Declaration<I, U, O> {
    Declaration::default()
}

/// Build a self-referential parser. `f` receives the declaration to link to.
pub fn recursive<I, U, O, P>(f: impl FnOnce(&Declaration<I, U, O>) -> Parser<P>) -> Parser<impl Pattern<Input=I, User=U, Output=O>>
    where
        I: Item,
        U: Clone,
        P: Pattern<Input=I, User=U, Output=O> + Send + Sync + 'static,
{
    let declaration = declare();
    let parser = f(&declaration);
    declaration.define(parser)
}

/// Defer building a parser until it is first run, then keep it.
///
/// Each copy of the returned parser shares the built value. Grammars that refer to themselves
/// through `lazy` only build as many levels as the input actually nests.
pub fn lazy<P, F>(f: F) -> Parser<impl Pattern<Input=P::Input, User=P::User, Output=P::Output>>
    where
        P: Pattern,
        F: Fn() -> Parser<P> + Clone,
{
    struct Lazy<F, A>(F, Arc<OnceLock<A>>);

    impl<F, A> Pattern for Lazy<F, A>
        where
            A: Pattern,
            F: Fn() -> Parser<A> + Clone,
    {
        type Input = A::Input;
        type User = A::User;
        type Output = A::Output;

        fn parse<'a>(&self, state: &State<'a, A::Input, A::User>) -> ParseResult<'a, A::Input, A::User, A::Output> {
            self.1.get_or_init(|| (self.0)().pat).parse(state)
        }

        fn cloned(&self) -> Self where Self: Sized {
            Self(self.0.clone(), self.1.clone())
        }
    }

    Parser::from_pat(Lazy(f, Arc::new(OnceLock::new())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{chars::char, combinators::option};

    #[test]
    fn unresolved_link_fails_cleanly() {
        let declaration = declare::<char, (), char>();
        let link = declaration.link();
        let err = link.parse("a".chars()).unwrap_err();
        assert_eq!(err.to_string(), "(line 1, column 1): undefined parser");
    }

    #[test]
    fn nested_parens() {
        // depth of nested parentheses
        let parens = recursive(|parens| {
            option(0, char::<()>('(').padding_for(parens.link()).padded_by(char(')')).map(|d: u32| d + 1))
        });
        assert_eq!(parens.parse("((()))".chars()), Ok(3));
        assert_eq!(parens.parse("".chars()), Ok(0));
        assert!(parens.parse("(()".chars()).is_err());
    }
}
