use std::sync::Arc;
use crate::{
    util::{Progress, Step},
    primitives::pure,
    combinators::{choice, option, chain_l1, chain_r1},
    reply::ParseResult,
    stream::{Item, State},
    Boxed,
    BoxedParser,
    Parser,
    Pattern,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Assoc {
    None,
    Left,
    Right,
}

pub type UnaryFn<O> = Arc<dyn Fn(O) -> O + Send + Sync>;
pub type BinaryFn<O> = Arc<dyn Fn(O, O) -> O + Send + Sync>;

/// An entry of an operator table. Each operator is a parser producing the function it applies.
pub enum Operator<I: Item, U: Clone, O> {
    Infix(BoxedParser<I, U, BinaryFn<O>>, Assoc),
    Prefix(BoxedParser<I, U, UnaryFn<O>>),
    Postfix(BoxedParser<I, U, UnaryFn<O>>),
}

impl<I, U, O> Operator<I, U, O>
    where
        I: Item + 'static,
        U: Clone + 'static,
        O: 'static,
{
    pub fn infix<P>(op: Parser<P>, f: impl Fn(O, O) -> O + Send + Sync + 'static, assoc: Assoc) -> Self
        where P: Pattern<Input=I, User=U> + Send + Sync + 'static,
    {
        let f: BinaryFn<O> = Arc::new(f);
        Operator::Infix(op.map(move |_| f.clone()).boxed(), assoc)
    }

    pub fn prefix<P>(op: Parser<P>, f: impl Fn(O) -> O + Send + Sync + 'static) -> Self
        where P: Pattern<Input=I, User=U> + Send + Sync + 'static,
    {
        let f: UnaryFn<O> = Arc::new(f);
        Operator::Prefix(op.map(move |_| f.clone()).boxed())
    }

    pub fn postfix<P>(op: Parser<P>, f: impl Fn(O) -> O + Send + Sync + 'static) -> Self
        where P: Pattern<Input=I, User=U> + Send + Sync + 'static,
    {
        let f: UnaryFn<O> = Arc::new(f);
        Operator::Postfix(op.map(move |_| f.clone()).boxed())
    }
}

/// Build a parser for expressions over `term` from an operator table.
///
/// The table lists precedence levels from the tightest binding to the loosest. Within a level,
/// operands may carry any of the level's prefix and postfix operators; left-associative
/// operators bind tighter than right-associative ones, which bind tighter than non-associative
/// ones. Two non-associative operators of one level in a row are rejected.
pub fn build_expression_parser<I, U, O>(table: Vec<Vec<Operator<I, U, O>>>, term: BoxedParser<I, U, O>) -> BoxedParser<I, U, O>
    where
        I: Item + 'static,
        U: Clone + 'static,
        O: 'static,
{
    table.into_iter().fold(term, make_level)
}

fn make_level<I, U, O>(term: BoxedParser<I, U, O>, ops: Vec<Operator<I, U, O>>) -> BoxedParser<I, U, O>
    where
        I: Item + 'static,
        U: Clone + 'static,
        O: 'static,
{
    let mut left = Vec::new();
    let mut right = Vec::new();
    let mut non = Vec::new();
    let mut prefix = Vec::new();
    let mut postfix = Vec::new();
    for op in ops {
        match op {
            Operator::Infix(p, Assoc::Left) => left.push(p),
            Operator::Infix(p, Assoc::Right) => right.push(p),
            Operator::Infix(p, Assoc::None) => non.push(p),
            Operator::Prefix(p) => prefix.push(p),
            Operator::Postfix(p) => postfix.push(p),
        }
    }

    let mut level = unary_op(prefix)
        .then(term)
        .then(unary_op(postfix))
        .map(|((pre, x), post)| post(pre(x)))
        .boxed();

    if !left.is_empty() {
        level = chain_l1(level, binary_op(left)).boxed();
    }
    if !right.is_empty() {
        level = chain_r1(level, binary_op(right)).boxed();
    }
    if !non.is_empty() {
        let op = choice(non).label("operator").boxed();
        level = Parser::from_pat(NonAssoc(level.pat, op.pat)).boxed();
    }
    level
}

// Absent operators parse as the identity
fn unary_op<I, U, O>(ops: Vec<BoxedParser<I, U, UnaryFn<O>>>) -> BoxedParser<I, U, UnaryFn<O>>
    where
        I: Item + 'static,
        U: Clone + 'static,
        O: 'static,
{
    let identity: UnaryFn<O> = Arc::new(|x: O| x);
    if ops.is_empty() {
        pure(identity).boxed()
    } else {
        option(identity, choice(ops).label("")).boxed()
    }
}

fn binary_op<I, U, O>(ops: Vec<BoxedParser<I, U, BinaryFn<O>>>) -> Parser<impl Pattern<Input=I, User=U, Output=impl Fn(O, O) -> O + Clone>>
    where
        I: Item + 'static,
        U: Clone + 'static,
        O: 'static,
{
    choice(ops)
        .label("operator")
        .map(|f: BinaryFn<O>| move |x: O, y: O| f(x, y))
}

struct NonAssoc<I: Item, U: Clone, O>(Boxed<I, U, O>, Boxed<I, U, BinaryFn<O>>);

impl<I: Item, U: Clone, O> Pattern for NonAssoc<I, U, O> {
    type Input = I;
    type User = U;
    type Output = O;

    fn parse<'a>(&self, state: &State<'a, I, U>) -> ParseResult<'a, I, U, O> {
        let mut progress = Progress::new(state);
        let x = match progress.step(&self.0) {
            Step::Value(x, _) => x,
            Step::Empty(err) => return progress.fail(err),
            Step::Fatal(err) => return progress.fatal(err),
        };
        let f = match progress.step(&self.1) {
            Step::Value(f, _) => f,
            Step::Empty(err) => return progress.settle(x, err),
            Step::Fatal(err) => return progress.fatal(err),
        };
        let y = match progress.step(&self.0) {
            Step::Value(y, _) => y,
            Step::Empty(err) => return progress.fail(err),
            Step::Fatal(err) => return progress.fatal(err),
        };
        if self.1.parse(progress.state()).is_ok() {
            return progress.abort("ambiguous use of a non-associative operator");
        }
        progress.succeed(f(x, y))
    }

    fn cloned(&self) -> Self where Self: Sized {
        Self(self.0.cloned(), self.1.cloned())
    }
}
