//! Expression layer for WHERE/HAVING/ON conditions.
//!
//! An [`Expression`] is an operator tag plus operands. Literal operands become
//! placeholders whose values are bound in textual (left-to-right) order, so
//! `eq("foo", col)` renders `? = users.name` with the placeholder first.
//! Column operands render as their bare qualified name; projection aliases
//! are never written inside an expression.

use crate::column::{Column, Projection};
use crate::derived::DerivedColumn;
use crate::dialect::{RenderContext, Symbol};
use crate::function::Function;
use crate::meta::ColumnDef;
use crate::render::{Render, joined_scan, joined_size, sym_len, write_placeholder, write_sym};
use crate::selection::SelectionId;
use crate::value::Value;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// One operand of an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Literal value, rendered as a placeholder.
    Value(Value),
    /// Column, derived column or function call, rendered as SQL text.
    Projection(Projection),
    /// Nested expression.
    Expression(Box<Expression>),
}

impl Operand {
    fn collect_projections<'a>(&'a self, out: &mut Vec<&'a Projection>) {
        match self {
            Operand::Value(_) => {}
            Operand::Projection(p) => {
                out.push(p);
                if let Projection::Function(f) = p
                    && let Some(arg) = f.arg()
                {
                    arg.collect_projections(out);
                }
            }
            Operand::Expression(e) => e.collect_projections(out),
        }
    }
}

impl Render for Operand {
    fn size(&self, ctx: &RenderContext) -> usize {
        match self {
            Operand::Value(_) => sym_len(ctx, Symbol::Placeholder),
            Operand::Projection(p) => p.size_with(ctx, false),
            Operand::Expression(e) => e.size(ctx),
        }
    }

    fn arg_count(&self) -> usize {
        match self {
            Operand::Value(_) => 1,
            Operand::Projection(p) => p.arg_count(),
            Operand::Expression(e) => e.arg_count(),
        }
    }

    fn scan(
        &self,
        ctx: &RenderContext,
        buf: &mut [u8],
        args: &mut [Value],
        cur_arg: &mut usize,
    ) -> usize {
        match self {
            Operand::Value(v) => write_placeholder(ctx, buf, args, cur_arg, v),
            Operand::Projection(p) => p.scan_with(ctx, buf, args, cur_arg, false),
            Operand::Expression(e) => e.scan(ctx, buf, args, cur_arg),
        }
    }
}

macro_rules! impl_operand_from_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Operand {
                fn from(v: $ty) -> Self {
                    Operand::Value(Value::from(v))
                }
            }
        )*
    };
}

impl_operand_from_value!(
    bool,
    i16,
    i32,
    i64,
    u32,
    f32,
    f64,
    &str,
    String,
    &String,
    Vec<u8>,
    Uuid,
    DateTime<Utc>,
    serde_json::Value,
);

impl From<Value> for Operand {
    fn from(v: Value) -> Self {
        Operand::Value(v)
    }
}

impl From<Projection> for Operand {
    fn from(p: Projection) -> Self {
        Operand::Projection(p)
    }
}

impl From<Column> for Operand {
    fn from(c: Column) -> Self {
        Operand::Projection(Projection::Column(c))
    }
}

impl From<&Column> for Operand {
    fn from(c: &Column) -> Self {
        Operand::Projection(Projection::Column(c.clone()))
    }
}

impl From<ColumnDef> for Operand {
    fn from(c: ColumnDef) -> Self {
        Operand::Projection(Projection::Column(c.column()))
    }
}

impl From<&ColumnDef> for Operand {
    fn from(c: &ColumnDef) -> Self {
        Operand::Projection(Projection::Column(c.column()))
    }
}

impl From<DerivedColumn> for Operand {
    fn from(d: DerivedColumn) -> Self {
        Operand::Projection(Projection::Derived(d))
    }
}

impl From<&DerivedColumn> for Operand {
    fn from(d: &DerivedColumn) -> Self {
        Operand::Projection(Projection::Derived(d.clone()))
    }
}

impl From<Function> for Operand {
    fn from(f: Function) -> Self {
        Operand::Projection(Projection::Function(f))
    }
}

impl From<Expression> for Operand {
    fn from(e: Expression) -> Self {
        Operand::Expression(Box::new(e))
    }
}

/// Operator tag of an [`Expression`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Like,
    In,
    NotIn,
    Between,
    NotBetween,
    IsNull,
    IsNotNull,
    And,
    Or,
    /// Constant truth, used for an empty `NOT IN` list.
    True,
    /// Constant falsehood, used for an empty `IN` list.
    False,
}

impl Op {
    /// Operator text: the infix symbol, the list opener or the constant.
    fn symbol(self) -> Symbol {
        match self {
            Op::Equal => Symbol::Equal,
            Op::NotEqual => Symbol::NotEqual,
            Op::LessThan => Symbol::LessThan,
            Op::LessThanOrEqual => Symbol::LessThanOrEqual,
            Op::GreaterThan => Symbol::GreaterThan,
            Op::GreaterThanOrEqual => Symbol::GreaterThanOrEqual,
            Op::Like => Symbol::Like,
            Op::In => Symbol::In,
            Op::NotIn => Symbol::NotIn,
            Op::Between => Symbol::Between,
            Op::NotBetween => Symbol::NotBetween,
            Op::IsNull => Symbol::IsNull,
            Op::IsNotNull => Symbol::IsNotNull,
            Op::And => Symbol::And,
            Op::Or => Symbol::Or,
            Op::True => Symbol::AlwaysTrue,
            Op::False => Symbol::AlwaysFalse,
        }
    }
}

/// A boolean SQL expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    op: Op,
    operands: Vec<Operand>,
}

impl Expression {
    fn new(op: Op, operands: Vec<Operand>) -> Self {
        Self { op, operands }
    }

    pub fn op(&self) -> Op {
        self.op
    }

    pub fn operands(&self) -> &[Operand] {
        &self.operands
    }

    /// Every projection referenced anywhere in the expression tree, in
    /// textual order.
    pub fn projections(&self) -> Vec<&Projection> {
        let mut out = Vec::new();
        self.collect_projections(&mut out);
        out
    }

    fn collect_projections<'a>(&'a self, out: &mut Vec<&'a Projection>) {
        for o in &self.operands {
            o.collect_projections(out);
        }
    }

    /// Selections referenced by the expression's columns, in textual order,
    /// without duplicates.
    pub fn selection_ids(&self) -> Vec<SelectionId> {
        let mut ids = Vec::new();
        for p in self.projections() {
            if let Some(id) = p.selection_id()
                && !ids.contains(&id)
            {
                ids.push(id);
            }
        }
        ids
    }
}

impl Render for Expression {
    fn size(&self, ctx: &RenderContext) -> usize {
        let ops = &self.operands;
        let sym = self.op.symbol();
        match self.op {
            Op::In | Op::NotIn => {
                ops[0].size(ctx)
                    + sym_len(ctx, sym)
                    + joined_size(ctx, &ops[1..], Symbol::Comma)
                    + sym_len(ctx, Symbol::RParen)
            }
            Op::Between | Op::NotBetween => {
                ops[0].size(ctx)
                    + sym_len(ctx, sym)
                    + ops[1].size(ctx)
                    + sym_len(ctx, Symbol::And)
                    + ops[2].size(ctx)
            }
            Op::IsNull | Op::IsNotNull => ops[0].size(ctx) + sym_len(ctx, sym),
            Op::And | Op::Or => {
                sym_len(ctx, Symbol::LParen)
                    + joined_size(ctx, ops, sym)
                    + sym_len(ctx, Symbol::RParen)
            }
            Op::True | Op::False => sym_len(ctx, sym),
            _ => ops[0].size(ctx) + sym_len(ctx, sym) + ops[1].size(ctx),
        }
    }

    fn arg_count(&self) -> usize {
        self.operands.iter().map(Render::arg_count).sum()
    }

    fn scan(
        &self,
        ctx: &RenderContext,
        buf: &mut [u8],
        args: &mut [Value],
        cur_arg: &mut usize,
    ) -> usize {
        let ops = &self.operands;
        let sym = self.op.symbol();
        let mut bw = 0;
        match self.op {
            Op::In | Op::NotIn => {
                bw += ops[0].scan(ctx, buf, args, cur_arg);
                bw += write_sym(ctx, &mut buf[bw..], sym);
                bw += joined_scan(ctx, &ops[1..], Symbol::Comma, &mut buf[bw..], args, cur_arg);
                bw += write_sym(ctx, &mut buf[bw..], Symbol::RParen);
            }
            Op::Between | Op::NotBetween => {
                bw += ops[0].scan(ctx, buf, args, cur_arg);
                bw += write_sym(ctx, &mut buf[bw..], sym);
                bw += ops[1].scan(ctx, &mut buf[bw..], args, cur_arg);
                bw += write_sym(ctx, &mut buf[bw..], Symbol::And);
                bw += ops[2].scan(ctx, &mut buf[bw..], args, cur_arg);
            }
            Op::IsNull | Op::IsNotNull => {
                bw += ops[0].scan(ctx, buf, args, cur_arg);
                bw += write_sym(ctx, &mut buf[bw..], sym);
            }
            Op::And | Op::Or => {
                bw += write_sym(ctx, buf, Symbol::LParen);
                bw += joined_scan(ctx, ops, sym, &mut buf[bw..], args, cur_arg);
                bw += write_sym(ctx, &mut buf[bw..], Symbol::RParen);
            }
            Op::True | Op::False => bw += write_sym(ctx, buf, sym),
            _ => {
                bw += ops[0].scan(ctx, buf, args, cur_arg);
                bw += write_sym(ctx, &mut buf[bw..], sym);
                bw += ops[1].scan(ctx, &mut buf[bw..], args, cur_arg);
            }
        }
        bw
    }
}

fn binary(op: Op, left: impl Into<Operand>, right: impl Into<Operand>) -> Expression {
    Expression::new(op, vec![left.into(), right.into()])
}

/// `left = right`
pub fn eq(left: impl Into<Operand>, right: impl Into<Operand>) -> Expression {
    binary(Op::Equal, left, right)
}

/// `left != right`
pub fn ne(left: impl Into<Operand>, right: impl Into<Operand>) -> Expression {
    binary(Op::NotEqual, left, right)
}

/// `left < right`
pub fn lt(left: impl Into<Operand>, right: impl Into<Operand>) -> Expression {
    binary(Op::LessThan, left, right)
}

/// `left <= right`
pub fn lte(left: impl Into<Operand>, right: impl Into<Operand>) -> Expression {
    binary(Op::LessThanOrEqual, left, right)
}

/// `left > right`
pub fn gt(left: impl Into<Operand>, right: impl Into<Operand>) -> Expression {
    binary(Op::GreaterThan, left, right)
}

/// `left >= right`
pub fn gte(left: impl Into<Operand>, right: impl Into<Operand>) -> Expression {
    binary(Op::GreaterThanOrEqual, left, right)
}

/// `left LIKE pattern`
pub fn like(left: impl Into<Operand>, pattern: impl Into<Operand>) -> Expression {
    binary(Op::Like, left, pattern)
}

fn list(op: Op, empty: Op, subject: Operand, values: Vec<Operand>) -> Expression {
    if values.is_empty() {
        return Expression::new(empty, Vec::new());
    }
    let mut operands = Vec::with_capacity(values.len() + 1);
    operands.push(subject);
    operands.extend(values);
    Expression::new(op, operands)
}

/// `subject IN (v1, v2, ...)`. An empty list renders as `1=0`.
pub fn in_list<I>(subject: impl Into<Operand>, values: I) -> Expression
where
    I: IntoIterator,
    I::Item: Into<Operand>,
{
    let values = values.into_iter().map(Into::into).collect();
    list(Op::In, Op::False, subject.into(), values)
}

/// `subject NOT IN (v1, v2, ...)`. An empty list renders as `1=1`.
pub fn not_in<I>(subject: impl Into<Operand>, values: I) -> Expression
where
    I: IntoIterator,
    I::Item: Into<Operand>,
{
    let values = values.into_iter().map(Into::into).collect();
    list(Op::NotIn, Op::True, subject.into(), values)
}

/// `subject BETWEEN from AND to`
pub fn between(
    subject: impl Into<Operand>,
    from: impl Into<Operand>,
    to: impl Into<Operand>,
) -> Expression {
    Expression::new(Op::Between, vec![subject.into(), from.into(), to.into()])
}

/// `subject NOT BETWEEN from AND to`
pub fn not_between(
    subject: impl Into<Operand>,
    from: impl Into<Operand>,
    to: impl Into<Operand>,
) -> Expression {
    Expression::new(Op::NotBetween, vec![subject.into(), from.into(), to.into()])
}

/// `subject IS NULL`
pub fn is_null(subject: impl Into<Operand>) -> Expression {
    Expression::new(Op::IsNull, vec![subject.into()])
}

/// `subject IS NOT NULL`
pub fn is_not_null(subject: impl Into<Operand>) -> Expression {
    Expression::new(Op::IsNotNull, vec![subject.into()])
}

/// `(a AND b)`
pub fn and(a: Expression, b: Expression) -> Expression {
    all([a, b])
}

/// `(a OR b)`
pub fn or(a: Expression, b: Expression) -> Expression {
    any([a, b])
}

/// `(e1 AND e2 AND ...)`. A single expression is returned unwrapped.
pub fn all(exprs: impl IntoIterator<Item = Expression>) -> Expression {
    group(Op::And, Op::True, exprs)
}

/// `(e1 OR e2 OR ...)`. A single expression is returned unwrapped.
pub fn any(exprs: impl IntoIterator<Item = Expression>) -> Expression {
    group(Op::Or, Op::False, exprs)
}

fn group(op: Op, empty: Op, exprs: impl IntoIterator<Item = Expression>) -> Expression {
    let mut exprs: Vec<Expression> = exprs.into_iter().collect();
    match exprs.len() {
        0 => Expression::new(empty, Vec::new()),
        1 => exprs.remove(0),
        _ => Expression::new(op, exprs.into_iter().map(Operand::from).collect()),
    }
}
