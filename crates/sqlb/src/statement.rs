//! The SELECT statement aggregate.
//!
//! Rendering order:
//!
//! ```text
//! SELECT projections
//! [FROM selections [join ...]]
//! [WHERE ...] [GROUP BY ...] [HAVING ...] [ORDER BY ...] [LIMIT ...]
//! ```
//!
//! Each clause after SELECT is preceded by the context's clause separator.

use crate::clause::{
    GroupByClause, HavingClause, Join, JoinKind, LimitClause, OrderByClause, WhereClause,
};
use crate::column::{List, Projection, SortColumn};
use crate::dialect::{RenderContext, Symbol};
use crate::error::{SqlError, SqlResult};
use crate::expr::Expression;
use crate::render::{Render, joined_scan, joined_size, sym_len, write_str, write_sym};
use crate::selection::{Selection, SelectionId};
use crate::value::Value;

#[derive(Debug, Clone, Default)]
pub struct SelectStatement {
    alias: Option<String>,
    projs: List,
    selections: Vec<Selection>,
    joins: Vec<Join>,
    where_: Option<WhereClause>,
    group_by: Option<GroupByClause>,
    having: Option<HavingClause>,
    order_by: Option<OrderByClause>,
    limit: Option<LimitClause>,
}

impl SelectStatement {
    pub fn alias_name(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn projections(&self) -> &List {
        &self.projs
    }

    /// FROM-clause subjects in registration order. Join targets are not
    /// included.
    pub fn selections(&self) -> &[Selection] {
        &self.selections
    }

    pub fn joins(&self) -> &[Join] {
        &self.joins
    }

    pub fn where_clause(&self) -> Option<&WhereClause> {
        self.where_.as_ref()
    }

    pub fn group_by_clause(&self) -> Option<&GroupByClause> {
        self.group_by.as_ref()
    }

    pub fn having_clause(&self) -> Option<&HavingClause> {
        self.having.as_ref()
    }

    pub fn order_by_clause(&self) -> Option<&OrderByClause> {
        self.order_by.as_ref()
    }

    pub fn limit_clause(&self) -> Option<&LimitClause> {
        self.limit.as_ref()
    }

    pub(crate) fn set_alias(&mut self, alias: String) {
        self.alias = Some(alias);
    }

    /// Append a projection unless one with the same identity is present.
    pub(crate) fn add_projection(&mut self, p: Projection) {
        if let Some(key) = p.key()
            && self.projs.contains_key(key)
        {
            return;
        }
        self.projs.push(p);
    }

    /// Whether `id` is reachable: a registered selection or a join target.
    fn has_selection(&self, id: SelectionId) -> bool {
        self.find_selection(id).is_some()
    }

    /// Whether `id` is the left or right side of a registered join.
    fn is_join_side(&self, id: SelectionId) -> bool {
        self.joins
            .iter()
            .any(|j| j.left().id() == id || j.right().id() == id)
    }

    fn find_selection(&self, id: SelectionId) -> Option<&Selection> {
        self.selections
            .iter()
            .chain(self.joins.iter().map(Join::right))
            .find(|s| s.id() == id)
    }

    /// Register a FROM-clause subject, deduplicated by identity.
    pub(crate) fn add_selection(&mut self, sel: Selection) {
        if !self.has_selection(sel.id()) {
            self.selections.push(sel);
        }
    }

    /// Register a selection and project all of its columns.
    pub(crate) fn add_selection_with_projections(&mut self, sel: Selection) {
        for p in sel.projections() {
            self.add_projection(p);
        }
        self.add_selection(sel);
    }

    /// Join `right` onto whichever selection of the statement the condition
    /// references first.
    ///
    /// A selection already on either side of a join cannot be joined again:
    /// it would leave its earlier join without a FROM entry.
    pub(crate) fn join_on(
        &mut self,
        kind: JoinKind,
        right: Selection,
        on: Expression,
    ) -> SqlResult<()> {
        if self.selections.is_empty() && self.joins.is_empty() {
            return Err(SqlError::JoinNoSelection);
        }
        if self.is_join_side(right.id()) {
            return Err(SqlError::JoinDuplicateTarget);
        }
        let left = on
            .selection_ids()
            .into_iter()
            .filter(|id| *id != right.id())
            .find_map(|id| self.find_selection(id).cloned())
            .ok_or(SqlError::JoinUnknownTarget)?;
        self.push_join(Join::new(kind, left, right, on));
        Ok(())
    }

    /// Add a pre-built join, pulling in its left side as a selection.
    pub(crate) fn add_join(&mut self, join: Join) -> SqlResult<()> {
        if self.joins.contains(&join) {
            return Ok(());
        }
        let right = join.right().id();
        if join.left().id() == right || self.is_join_side(right) {
            return Err(SqlError::JoinDuplicateTarget);
        }
        self.add_selection_with_projections(join.left().clone());
        self.push_join(join);
        Ok(())
    }

    fn push_join(&mut self, join: Join) {
        let right = join.right();
        if !self.projs.references_selection(right.id()) {
            for p in right.projections() {
                self.add_projection(p);
            }
        }
        let right_id = right.id();
        self.selections.retain(|s| s.id() != right_id);
        self.joins.push(join);
    }

    pub(crate) fn add_where(&mut self, e: Expression) {
        self.where_.get_or_insert_with(WhereClause::default).push(e);
    }

    pub(crate) fn add_having(&mut self, e: Expression) {
        self.having.get_or_insert_with(HavingClause::default).push(e);
    }

    pub(crate) fn add_group_by(&mut self, p: Projection) {
        self.group_by.get_or_insert_with(GroupByClause::default).push(p);
    }

    pub(crate) fn add_order_by(&mut self, s: SortColumn) {
        self.order_by.get_or_insert_with(OrderByClause::default).push(s);
    }

    pub(crate) fn set_limit(&mut self, limit: LimitClause) {
        self.limit = Some(limit);
    }

    fn clause_size<R: Render>(ctx: &RenderContext, clause: Option<&R>) -> usize {
        clause.map_or(0, |c| ctx.clause_separator().len() + c.size(ctx))
    }

    fn clause_scan<R: Render>(
        ctx: &RenderContext,
        clause: Option<&R>,
        buf: &mut [u8],
        args: &mut [Value],
        cur_arg: &mut usize,
    ) -> usize {
        match clause {
            Some(c) => {
                let bw = write_str(buf, ctx.clause_separator());
                bw + c.scan(ctx, &mut buf[bw..], args, cur_arg)
            }
            None => 0,
        }
    }
}

impl Render for SelectStatement {
    fn size(&self, ctx: &RenderContext) -> usize {
        let sep = ctx.clause_separator().len();
        let mut size = sym_len(ctx, Symbol::Select) + self.projs.size(ctx);
        if !self.selections.is_empty() {
            size += sep + sym_len(ctx, Symbol::From);
            size += joined_size(ctx, &self.selections, Symbol::Comma);
            for j in &self.joins {
                size += sep + j.size(ctx);
            }
        }
        size += Self::clause_size(ctx, self.where_.as_ref());
        size += Self::clause_size(ctx, self.group_by.as_ref());
        size += Self::clause_size(ctx, self.having.as_ref());
        size += Self::clause_size(ctx, self.order_by.as_ref());
        size += Self::clause_size(ctx, self.limit.as_ref());
        size
    }

    fn arg_count(&self) -> usize {
        let mut argc = self.projs.arg_count();
        if !self.selections.is_empty() {
            argc += self.selections.iter().map(Render::arg_count).sum::<usize>();
            argc += self.joins.iter().map(Render::arg_count).sum::<usize>();
        }
        argc += self.where_.as_ref().map_or(0, Render::arg_count);
        argc += self.group_by.as_ref().map_or(0, Render::arg_count);
        argc += self.having.as_ref().map_or(0, Render::arg_count);
        argc += self.order_by.as_ref().map_or(0, Render::arg_count);
        argc += self.limit.as_ref().map_or(0, Render::arg_count);
        argc
    }

    fn scan(
        &self,
        ctx: &RenderContext,
        buf: &mut [u8],
        args: &mut [Value],
        cur_arg: &mut usize,
    ) -> usize {
        let mut bw = write_sym(ctx, buf, Symbol::Select);
        bw += self.projs.scan(ctx, &mut buf[bw..], args, cur_arg);
        if !self.selections.is_empty() {
            bw += write_str(&mut buf[bw..], ctx.clause_separator());
            bw += write_sym(ctx, &mut buf[bw..], Symbol::From);
            bw += joined_scan(ctx, &self.selections, Symbol::Comma, &mut buf[bw..], args, cur_arg);
            for j in &self.joins {
                bw += write_str(&mut buf[bw..], ctx.clause_separator());
                bw += j.scan(ctx, &mut buf[bw..], args, cur_arg);
            }
        }
        bw += Self::clause_scan(ctx, self.where_.as_ref(), &mut buf[bw..], args, cur_arg);
        bw += Self::clause_scan(ctx, self.group_by.as_ref(), &mut buf[bw..], args, cur_arg);
        bw += Self::clause_scan(ctx, self.having.as_ref(), &mut buf[bw..], args, cur_arg);
        bw += Self::clause_scan(ctx, self.order_by.as_ref(), &mut buf[bw..], args, cur_arg);
        bw += Self::clause_scan(ctx, self.limit.as_ref(), &mut buf[bw..], args, cur_arg);
        bw
    }
}
