//! Sub-selects used as FROM-clause subjects.
//!
//! A derived table exposes its own projections, distinct from the wrapped
//! statement's. Given
//!
//! ```sql
//! SELECT u.user_id, u.name FROM (
//!   SELECT users.id AS user_id, users.name FROM users
//! ) AS u
//! ```
//!
//! the outer list holds derived columns qualified by the derived alias `u`
//! and named by the inner alias or, failing that, the inner column name.

use crate::column::SortColumn;
use crate::dialect::{RenderContext, Symbol};
use crate::error::{SqlError, SqlResult};
use crate::ident::validate_ident;
use crate::query::SelectQuery;
use crate::render::{Render, sym_len, write_str, write_sym};
use crate::selection::{ProjectionKey, SelectionId};
use crate::statement::SelectStatement;
use crate::value::Value;
use std::sync::Arc;

#[derive(Debug)]
struct DerivedTableInner {
    id: SelectionId,
    alias: String,
    from: SelectStatement,
}

/// A SELECT in the FROM clause, always aliased.
///
/// The wrapped statement is a snapshot taken at construction. Clones share
/// identity.
#[derive(Debug, Clone)]
pub struct DerivedTable(Arc<DerivedTableInner>);

impl DerivedTable {
    /// Wrap `query` under `alias`. Fails if the query carries a deferred
    /// error, the alias is not a valid identifier, or no inner projection
    /// has an output name.
    pub fn new(alias: impl Into<String>, query: SelectQuery) -> SqlResult<Self> {
        query.validate()?;
        Self::from_statement(alias.into(), query.into_statement())
    }

    pub(crate) fn from_statement(alias: String, from: SelectStatement) -> SqlResult<Self> {
        validate_ident(&alias)?;
        if !from
            .projections()
            .elements()
            .iter()
            .any(|p| p.output_name().is_some())
        {
            return Err(SqlError::EmptyDerivedTable(alias));
        }
        Ok(DerivedTable(Arc::new(DerivedTableInner {
            id: SelectionId::next(),
            alias,
            from,
        })))
    }

    pub fn id(&self) -> SelectionId {
        self.0.id
    }

    pub fn alias_name(&self) -> &str {
        &self.0.alias
    }

    /// The wrapped statement.
    pub fn statement(&self) -> &SelectStatement {
        &self.0.from
    }

    /// Derived columns for every inner projection that has an output name.
    /// Unaliased function calls have none and are not exposed.
    pub fn columns(&self) -> Vec<DerivedColumn> {
        self.0
            .from
            .projections()
            .elements()
            .iter()
            .enumerate()
            .filter(|(_, p)| p.output_name().is_some())
            .map(|(ordinal, _)| DerivedColumn {
                table: self.clone(),
                ordinal,
                alias: None,
            })
            .collect()
    }

    /// Look up an exposed column by its output name.
    pub fn column(&self, name: &str) -> SqlResult<DerivedColumn> {
        self.columns()
            .into_iter()
            .find(|c| c.inner_name() == name)
            .ok_or_else(|| SqlError::unknown_column(self.alias_name(), name))
    }
}

impl PartialEq for DerivedTable {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for DerivedTable {}

impl Render for DerivedTable {
    fn size(&self, ctx: &RenderContext) -> usize {
        sym_len(ctx, Symbol::LParen)
            + self.0.from.size(ctx)
            + sym_len(ctx, Symbol::RParen)
            + sym_len(ctx, Symbol::As)
            + self.0.alias.len()
    }

    fn arg_count(&self) -> usize {
        self.0.from.arg_count()
    }

    fn scan(
        &self,
        ctx: &RenderContext,
        buf: &mut [u8],
        args: &mut [Value],
        cur_arg: &mut usize,
    ) -> usize {
        let mut bw = write_sym(ctx, buf, Symbol::LParen);
        bw += self.0.from.scan(ctx, &mut buf[bw..], args, cur_arg);
        bw += write_sym(ctx, &mut buf[bw..], Symbol::RParen);
        bw += write_sym(ctx, &mut buf[bw..], Symbol::As);
        bw += write_str(&mut buf[bw..], &self.0.alias);
        bw
    }
}

/// A projection read from a [`DerivedTable`].
///
/// Renders as `derived_alias.inner_name[ AS alias]`.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedColumn {
    table: DerivedTable,
    ordinal: usize,
    alias: Option<String>,
}

impl DerivedColumn {
    pub fn table(&self) -> &DerivedTable {
        &self.table
    }

    pub fn key(&self) -> ProjectionKey {
        ProjectionKey {
            selection: self.table.id(),
            ordinal: self.ordinal,
        }
    }

    /// Name of the inner projection: its alias, else its column name.
    pub fn inner_name(&self) -> &str {
        self.table.0.from.projections().elements()[self.ordinal]
            .output_name()
            .unwrap_or_default()
    }

    /// Set the outer projection alias.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn alias_name(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Name visible from an enclosing query.
    pub fn output_name(&self) -> &str {
        self.alias.as_deref().unwrap_or_else(|| self.inner_name())
    }

    pub fn asc(&self) -> SortColumn {
        SortColumn::new(self.clone(), false)
    }

    pub fn desc(&self) -> SortColumn {
        SortColumn::new(self.clone(), true)
    }

    pub(crate) fn size_with(&self, ctx: &RenderContext, aliased: bool) -> usize {
        let mut size =
            self.table.alias_name().len() + sym_len(ctx, Symbol::Period) + self.inner_name().len();
        if aliased && let Some(alias) = &self.alias {
            size += sym_len(ctx, Symbol::As) + alias.len();
        }
        size
    }

    pub(crate) fn scan_with(&self, ctx: &RenderContext, buf: &mut [u8], aliased: bool) -> usize {
        let mut bw = write_str(buf, self.table.alias_name());
        bw += write_sym(ctx, &mut buf[bw..], Symbol::Period);
        bw += write_str(&mut buf[bw..], self.inner_name());
        if aliased && let Some(alias) = &self.alias {
            bw += write_sym(ctx, &mut buf[bw..], Symbol::As);
            bw += write_str(&mut buf[bw..], alias);
        }
        bw
    }
}

impl Render for DerivedColumn {
    fn size(&self, ctx: &RenderContext) -> usize {
        self.size_with(ctx, true)
    }

    fn arg_count(&self) -> usize {
        0
    }

    fn scan(&self, ctx: &RenderContext, buf: &mut [u8], _: &mut [Value], _: &mut usize) -> usize {
        self.scan_with(ctx, buf, true)
    }
}
