//! Clause nodes of a SELECT statement.
//!
//! Each clause renders its own leading keyword and internal separators. The
//! separator between clauses belongs to the statement.

use crate::column::{List, Projection, SortColumn};
use crate::dialect::{RenderContext, Symbol};
use crate::expr::Expression;
use crate::render::{Render, joined_scan, joined_size, sym_len, write_placeholder, write_sym};
use crate::selection::Selection;
use crate::value::Value;
use std::sync::atomic::{AtomicU64, Ordering};

/// `WHERE e1 AND e2 ...`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WhereClause {
    filters: Vec<Expression>,
}

/// `HAVING e1 AND e2 ...`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HavingClause {
    conditions: Vec<Expression>,
}

macro_rules! condition_clause {
    ($ty:ident, $field:ident, $keyword:expr) => {
        impl $ty {
            pub fn push(&mut self, e: Expression) {
                self.$field.push(e);
            }

            pub fn expressions(&self) -> &[Expression] {
                &self.$field
            }

            pub fn is_empty(&self) -> bool {
                self.$field.is_empty()
            }
        }

        impl Render for $ty {
            fn size(&self, ctx: &RenderContext) -> usize {
                sym_len(ctx, $keyword) + joined_size(ctx, &self.$field, Symbol::And)
            }

            fn arg_count(&self) -> usize {
                self.$field.iter().map(Render::arg_count).sum()
            }

            fn scan(
                &self,
                ctx: &RenderContext,
                buf: &mut [u8],
                args: &mut [Value],
                cur_arg: &mut usize,
            ) -> usize {
                let bw = write_sym(ctx, buf, $keyword);
                bw + joined_scan(ctx, &self.$field, Symbol::And, &mut buf[bw..], args, cur_arg)
            }
        }
    };
}

condition_clause!(WhereClause, filters, Symbol::Where);
condition_clause!(HavingClause, conditions, Symbol::Having);

/// `GROUP BY c1, c2 ...`. Projection aliases are not rendered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupByClause {
    cols: List,
}

impl GroupByClause {
    pub fn push(&mut self, p: impl Into<Projection>) {
        self.cols.push(p);
    }

    pub fn columns(&self) -> &List {
        &self.cols
    }
}

impl Render for GroupByClause {
    fn size(&self, ctx: &RenderContext) -> usize {
        sym_len(ctx, Symbol::GroupBy) + self.cols.size_with(ctx, false)
    }

    fn arg_count(&self) -> usize {
        self.cols.arg_count()
    }

    fn scan(
        &self,
        ctx: &RenderContext,
        buf: &mut [u8],
        args: &mut [Value],
        cur_arg: &mut usize,
    ) -> usize {
        let bw = write_sym(ctx, buf, Symbol::GroupBy);
        bw + self.cols.scan_with(ctx, &mut buf[bw..], args, cur_arg, false)
    }
}

/// `ORDER BY s1, s2 ...`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderByClause {
    cols: Vec<SortColumn>,
}

impl OrderByClause {
    pub fn push(&mut self, s: SortColumn) {
        self.cols.push(s);
    }

    pub fn columns(&self) -> &[SortColumn] {
        &self.cols
    }
}

impl Render for OrderByClause {
    fn size(&self, ctx: &RenderContext) -> usize {
        sym_len(ctx, Symbol::OrderBy) + joined_size(ctx, &self.cols, Symbol::Comma)
    }

    fn arg_count(&self) -> usize {
        self.cols.iter().map(Render::arg_count).sum()
    }

    fn scan(
        &self,
        ctx: &RenderContext,
        buf: &mut [u8],
        args: &mut [Value],
        cur_arg: &mut usize,
    ) -> usize {
        let bw = write_sym(ctx, buf, Symbol::OrderBy);
        bw + joined_scan(ctx, &self.cols, Symbol::Comma, &mut buf[bw..], args, cur_arg)
    }
}

/// `LIMIT ?[ OFFSET ?]`. Limit and offset are bound as arguments, in that
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitClause {
    limit: i64,
    offset: Option<i64>,
}

impl LimitClause {
    pub fn new(limit: i64, offset: Option<i64>) -> Self {
        Self { limit, offset }
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    pub fn offset(&self) -> Option<i64> {
        self.offset
    }
}

impl Render for LimitClause {
    fn size(&self, ctx: &RenderContext) -> usize {
        let mut size = sym_len(ctx, Symbol::Limit) + sym_len(ctx, Symbol::Placeholder);
        if self.offset.is_some() {
            size += sym_len(ctx, Symbol::Offset) + sym_len(ctx, Symbol::Placeholder);
        }
        size
    }

    fn arg_count(&self) -> usize {
        if self.offset.is_some() { 2 } else { 1 }
    }

    fn scan(
        &self,
        ctx: &RenderContext,
        buf: &mut [u8],
        args: &mut [Value],
        cur_arg: &mut usize,
    ) -> usize {
        let mut bw = write_sym(ctx, buf, Symbol::Limit);
        bw += write_placeholder(ctx, &mut buf[bw..], args, cur_arg, &Value::Int(self.limit));
        if let Some(offset) = self.offset {
            bw += write_sym(ctx, &mut buf[bw..], Symbol::Offset);
            bw += write_placeholder(ctx, &mut buf[bw..], args, cur_arg, &Value::Int(offset));
        }
        bw
    }
}

static NEXT_JOIN_ID: AtomicU64 = AtomicU64::new(1);

/// Kind of a JOIN.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum JoinKind {
    #[default]
    Inner,
    Left,
    Right,
    Full,
}

impl JoinKind {
    fn symbol(self) -> Symbol {
        match self {
            JoinKind::Inner => Symbol::Join,
            JoinKind::Left => Symbol::LeftJoin,
            JoinKind::Right => Symbol::RightJoin,
            JoinKind::Full => Symbol::FullJoin,
        }
    }
}

/// `[kind ]JOIN right ON condition`
#[derive(Debug, Clone)]
pub struct Join {
    id: u64,
    kind: JoinKind,
    left: Selection,
    right: Selection,
    on: Expression,
}

impl Join {
    pub fn new(
        kind: JoinKind,
        left: impl Into<Selection>,
        right: impl Into<Selection>,
        on: Expression,
    ) -> Self {
        Self {
            id: NEXT_JOIN_ID.fetch_add(1, Ordering::Relaxed),
            kind,
            left: left.into(),
            right: right.into(),
            on,
        }
    }

    /// Inner join of `right` onto `left`.
    pub fn inner(left: impl Into<Selection>, right: impl Into<Selection>, on: Expression) -> Self {
        Self::new(JoinKind::Inner, left, right, on)
    }

    /// Left outer join of `right` onto `left`.
    pub fn left_outer(
        left: impl Into<Selection>,
        right: impl Into<Selection>,
        on: Expression,
    ) -> Self {
        Self::new(JoinKind::Left, left, right, on)
    }

    pub fn kind(&self) -> JoinKind {
        self.kind
    }

    pub fn left(&self) -> &Selection {
        &self.left
    }

    pub fn right(&self) -> &Selection {
        &self.right
    }

    pub fn on(&self) -> &Expression {
        &self.on
    }
}

impl PartialEq for Join {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Render for Join {
    fn size(&self, ctx: &RenderContext) -> usize {
        sym_len(ctx, self.kind.symbol())
            + self.right.size(ctx)
            + sym_len(ctx, Symbol::On)
            + self.on.size(ctx)
    }

    fn arg_count(&self) -> usize {
        self.right.arg_count() + self.on.arg_count()
    }

    fn scan(
        &self,
        ctx: &RenderContext,
        buf: &mut [u8],
        args: &mut [Value],
        cur_arg: &mut usize,
    ) -> usize {
        let mut bw = write_sym(ctx, buf, self.kind.symbol());
        bw += self.right.scan(ctx, &mut buf[bw..], args, cur_arg);
        bw += write_sym(ctx, &mut buf[bw..], Symbol::On);
        bw += self.on.scan(ctx, &mut buf[bw..], args, cur_arg);
        bw
    }
}
