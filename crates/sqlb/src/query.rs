//! The `select(..)` entry point and the fluent [`SelectQuery`] handle.

use crate::clause::{Join, JoinKind, LimitClause};
use crate::column::{Column, List, Projection, SortColumn};
use crate::derived::{DerivedColumn, DerivedTable};
use crate::dialect::{Dialect, RenderContext};
use crate::error::{SqlError, SqlResult};
use crate::expr::Expression;
use crate::function::Function;
use crate::ident::validate_alias;
use crate::meta::{ColumnDef, Table, TableDef};
use crate::render::render;
use crate::selection::Selection;
use crate::statement::SelectStatement;
use crate::value::Value;

/// One heterogeneous input to [`select`].
#[derive(Debug, Clone)]
pub enum SelectItem {
    /// Table, table definition or derived table: all of its columns.
    Selection(Selection),
    /// A single column, derived column or function call.
    Projection(Projection),
    /// Several projections, flattened in order.
    List(List),
    /// A pre-built join: both sides' columns and the join itself.
    Join(Join),
    /// A sub-select, wrapped as a derived table.
    Query(SelectQuery),
}

macro_rules! impl_select_item_from {
    ($variant:ident: $($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for SelectItem {
                fn from(v: $ty) -> Self {
                    SelectItem::$variant(v.into())
                }
            }
        )*
    };
}

impl_select_item_from!(Selection: Selection, Table, &Table, TableDef, &TableDef, DerivedTable, &DerivedTable);
impl_select_item_from!(
    Projection: Projection,
    Column,
    &Column,
    ColumnDef,
    &ColumnDef,
    DerivedColumn,
    &DerivedColumn,
    Function,
);

impl From<List> for SelectItem {
    fn from(l: List) -> Self {
        SelectItem::List(l)
    }
}

impl From<Join> for SelectItem {
    fn from(j: Join) -> Self {
        SelectItem::Join(j)
    }
}

impl From<SelectQuery> for SelectItem {
    fn from(q: SelectQuery) -> Self {
        SelectItem::Query(q)
    }
}

/// Compose a SELECT from heterogeneous inputs.
///
/// Selections are deduplicated by identity, so passing a table and one of
/// its columns yields a single FROM entry. Unaliased sub-selects are named
/// `derived0`, `derived1`, ... in the order they appear in this call.
///
/// Composition errors are captured on the returned handle.
pub fn select<I>(items: I) -> SelectQuery
where
    I: IntoIterator,
    I::Item: Into<SelectItem>,
{
    let mut q = SelectQuery::default();
    let mut derived = 0usize;
    for item in items {
        q.ingest(item.into(), &mut derived);
    }
    q
}

/// A SELECT statement under construction.
///
/// Mutators consume and return the handle so they chain. The first error a
/// mutator hits is stored and sticks; later mutators on an invalid handle do
/// nothing. Rendering never caches: every `to_sql*` call walks the current
/// state.
#[derive(Debug, Clone, Default)]
pub struct SelectQuery {
    stmt: SelectStatement,
    error: Option<SqlError>,
    ctx: RenderContext,
}

impl SelectQuery {
    fn fail(&mut self, err: SqlError) {
        if self.error.is_none() {
            #[cfg(feature = "tracing")]
            tracing::debug!(error = %err, "select composition failed");
            self.error = Some(err);
        }
    }

    fn check(&mut self, res: SqlResult<()>) -> bool {
        match res {
            Ok(()) => true,
            Err(err) => {
                self.fail(err);
                false
            }
        }
    }

    fn ingest(&mut self, item: SelectItem, derived: &mut usize) {
        if self.error.is_some() {
            return;
        }
        match item {
            SelectItem::Selection(sel) => self.stmt.add_selection_with_projections(sel),
            SelectItem::Projection(p) => self.add_projection(p),
            SelectItem::List(list) => {
                for p in list.elements() {
                    self.add_projection(p.clone());
                }
            }
            SelectItem::Join(join) => {
                let res = self.stmt.add_join(join);
                self.check(res);
            }
            SelectItem::Query(sub) => {
                if let Some(err) = sub.error {
                    self.fail(err);
                    return;
                }
                let alias = match sub.stmt.alias_name() {
                    Some(a) => a.to_string(),
                    None => {
                        let a = format!("derived{derived}");
                        *derived += 1;
                        a
                    }
                };
                match DerivedTable::from_statement(alias, sub.stmt) {
                    Ok(dt) => self.stmt.add_selection_with_projections(dt.into()),
                    Err(err) => self.fail(err),
                }
            }
        }
    }

    fn add_projection(&mut self, p: Projection) {
        if !self.check(validate_alias(p.alias_name())) {
            return;
        }
        if let Some(sel) = p.selection() {
            self.stmt.add_selection(sel);
        }
        self.stmt.add_projection(p);
    }

    // ==================== Clause mutators ====================

    /// Append a WHERE condition, AND-ed with the existing ones.
    pub fn and_where(mut self, e: Expression) -> Self {
        if self.error.is_none() {
            self.stmt.add_where(e);
        }
        self
    }

    /// Append a HAVING condition, AND-ed with the existing ones.
    pub fn and_having(mut self, e: Expression) -> Self {
        if self.error.is_none() {
            self.stmt.add_having(e);
        }
        self
    }

    /// Append GROUP BY columns.
    pub fn group_by<I>(mut self, cols: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Projection>,
    {
        if self.error.is_none() {
            for c in cols {
                self.stmt.add_group_by(c.into());
            }
        }
        self
    }

    /// Append ORDER BY columns. Plain columns sort ascending.
    pub fn order_by<I>(mut self, cols: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<SortColumn>,
    {
        if self.error.is_none() {
            for c in cols {
                self.stmt.add_order_by(c.into());
            }
        }
        self
    }

    /// Inner join `target` on `on`.
    ///
    /// The condition must reference a selection already in the statement;
    /// otherwise the handle becomes invalid. If no projection reads from
    /// `target` yet, all of its columns are appended.
    pub fn join(self, target: impl Into<Selection>, on: Expression) -> Self {
        self.join_kind(JoinKind::Inner, target, on)
    }

    pub fn left_join(self, target: impl Into<Selection>, on: Expression) -> Self {
        self.join_kind(JoinKind::Left, target, on)
    }

    pub fn right_join(self, target: impl Into<Selection>, on: Expression) -> Self {
        self.join_kind(JoinKind::Right, target, on)
    }

    pub fn full_join(self, target: impl Into<Selection>, on: Expression) -> Self {
        self.join_kind(JoinKind::Full, target, on)
    }

    /// Join `target` with an explicit join kind.
    pub fn join_kind(mut self, kind: JoinKind, target: impl Into<Selection>, on: Expression) -> Self {
        if self.error.is_some() {
            return self;
        }
        let res = self.stmt.join_on(kind, target.into(), on);
        self.check(res);
        self
    }

    /// Set `LIMIT ?`.
    pub fn limit(mut self, limit: i64) -> Self {
        if self.error.is_none() {
            self.stmt.set_limit(LimitClause::new(limit, None));
        }
        self
    }

    /// Set `LIMIT ? OFFSET ?`.
    pub fn limit_with_offset(mut self, limit: i64, offset: i64) -> Self {
        if self.error.is_none() {
            self.stmt.set_limit(LimitClause::new(limit, Some(offset)));
        }
        self
    }

    /// Alias used when this query becomes a derived table.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        if self.error.is_some() {
            return self;
        }
        let alias = alias.into();
        if self.check(validate_alias(Some(&alias))) {
            self.stmt.set_alias(alias);
        }
        self
    }

    // ==================== Configuration ====================

    /// Render under `dialect` by default.
    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.ctx.dialect = dialect;
        self
    }

    /// Replace the default render context.
    pub fn context(mut self, ctx: RenderContext) -> Self {
        if self.check(ctx.validate()) {
            self.ctx = ctx;
        }
        self
    }

    pub fn render_context(&self) -> &RenderContext {
        &self.ctx
    }

    // ==================== Validity ====================

    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }

    /// The deferred composition error, if any.
    pub fn error(&self) -> Option<&SqlError> {
        self.error.as_ref()
    }

    pub fn validate(&self) -> SqlResult<()> {
        match &self.error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    pub fn statement(&self) -> &SelectStatement {
        &self.stmt
    }

    pub fn into_statement(self) -> SelectStatement {
        self.stmt
    }

    // ==================== Rendering ====================

    /// SQL text under the handle's context.
    pub fn to_sql(&self) -> String {
        self.to_sql_with_args().0
    }

    /// SQL text and positional arguments under the handle's context.
    pub fn to_sql_with_args(&self) -> (String, Vec<Value>) {
        self.to_sql_with(&self.ctx)
    }

    /// SQL text and arguments under an explicit context.
    ///
    /// An invalid handle renders as an empty string with no arguments.
    pub fn to_sql_with(&self, ctx: &RenderContext) -> (String, Vec<Value>) {
        if let Some(_err) = &self.error {
            #[cfg(feature = "tracing")]
            tracing::warn!(error = %_err, "rendering an invalid select");
            return (String::new(), Vec::new());
        }
        render(&self.stmt, ctx)
    }

    /// Validate, then render under the handle's context.
    pub fn build(&self) -> SqlResult<(String, Vec<Value>)> {
        self.validate()?;
        Ok(render(&self.stmt, &self.ctx))
    }
}

#[cfg(test)]
mod tests;
