//! Columns and the projection variants placed in a SELECT list.

use crate::derived::DerivedColumn;
use crate::dialect::{RenderContext, Symbol};
use crate::function::Function;
use crate::meta::{ColumnDef, Table};
use crate::render::{Render, sym_len, write_str, write_sym};
use crate::selection::{ProjectionKey, Selection, SelectionId};
use crate::value::Value;

/// A usage of a column on a particular [`Table`], optionally aliased.
///
/// Renders as `qualifier.name[ AS alias]`, where the qualifier is the table's
/// alias or name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    table: Table,
    ordinal: usize,
    alias: Option<String>,
}

impl Column {
    pub(crate) fn new(table: Table, ordinal: usize) -> Self {
        Self {
            table,
            ordinal,
            alias: None,
        }
    }

    pub fn name(&self) -> &str {
        self.table.def().column_name(self.ordinal)
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn alias_name(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Set the projection alias (`AS alias`).
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Replace or clear the projection alias in place.
    pub fn set_alias(&mut self, alias: Option<String>) {
        self.alias = alias;
    }

    /// Identity used to deduplicate projections.
    pub fn key(&self) -> ProjectionKey {
        ProjectionKey {
            selection: self.table.id(),
            ordinal: self.ordinal,
        }
    }

    /// Ascending sort on this column (no explicit keyword).
    pub fn asc(&self) -> SortColumn {
        SortColumn::new(self.clone(), false)
    }

    /// Descending sort on this column.
    pub fn desc(&self) -> SortColumn {
        SortColumn::new(self.clone(), true)
    }

    pub(crate) fn size_with(&self, ctx: &RenderContext, aliased: bool) -> usize {
        let mut size = self.table.qualifier().len() + sym_len(ctx, Symbol::Period) + self.name().len();
        if aliased && let Some(alias) = &self.alias {
            size += sym_len(ctx, Symbol::As) + alias.len();
        }
        size
    }

    pub(crate) fn scan_with(&self, ctx: &RenderContext, buf: &mut [u8], aliased: bool) -> usize {
        let mut bw = write_str(buf, self.table.qualifier());
        bw += write_sym(ctx, &mut buf[bw..], Symbol::Period);
        bw += write_str(&mut buf[bw..], self.name());
        if aliased && let Some(alias) = &self.alias {
            bw += write_sym(ctx, &mut buf[bw..], Symbol::As);
            bw += write_str(&mut buf[bw..], alias);
        }
        bw
    }
}

impl Render for Column {
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

/// Anything that can sit in a SELECT list.
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    Column(Column),
    Derived(DerivedColumn),
    Function(Function),
}

impl Projection {
    /// The selection this projection reads from, if any.
    pub fn selection(&self) -> Option<Selection> {
        match self {
            Projection::Column(c) => Some(Selection::Table(c.table().clone())),
            Projection::Derived(d) => Some(Selection::Derived(d.table().clone())),
            Projection::Function(f) => f.selection(),
        }
    }

    pub fn selection_id(&self) -> Option<SelectionId> {
        match self {
            Projection::Column(c) => Some(c.table().id()),
            Projection::Derived(d) => Some(d.table().id()),
            Projection::Function(f) => f.selection().map(|s| s.id()),
        }
    }

    /// Identity used for deduplication. Function calls have none.
    pub fn key(&self) -> Option<ProjectionKey> {
        match self {
            Projection::Column(c) => Some(c.key()),
            Projection::Derived(d) => Some(d.key()),
            Projection::Function(_) => None,
        }
    }

    pub fn alias_name(&self) -> Option<&str> {
        match self {
            Projection::Column(c) => c.alias_name(),
            Projection::Derived(d) => d.alias_name(),
            Projection::Function(f) => f.alias_name(),
        }
    }

    /// Name the projection is visible under from an enclosing query:
    /// the alias if set, else the column name. Unaliased function calls have
    /// no usable name.
    pub fn output_name(&self) -> Option<&str> {
        match self {
            Projection::Column(c) => Some(c.alias_name().unwrap_or_else(|| c.name())),
            Projection::Derived(d) => Some(d.output_name()),
            Projection::Function(f) => f.alias_name(),
        }
    }

    pub(crate) fn size_with(&self, ctx: &RenderContext, aliased: bool) -> usize {
        match self {
            Projection::Column(c) => c.size_with(ctx, aliased),
            Projection::Derived(d) => d.size_with(ctx, aliased),
            Projection::Function(f) => f.size_with(ctx, aliased),
        }
    }

    pub(crate) fn scan_with(
        &self,
        ctx: &RenderContext,
        buf: &mut [u8],
        args: &mut [Value],
        cur_arg: &mut usize,
        aliased: bool,
    ) -> usize {
        match self {
            Projection::Column(c) => c.scan_with(ctx, buf, aliased),
            Projection::Derived(d) => d.scan_with(ctx, buf, aliased),
            Projection::Function(f) => f.scan_with(ctx, buf, args, cur_arg, aliased),
        }
    }
}

impl Render for Projection {
    fn size(&self, ctx: &RenderContext) -> usize {
        self.size_with(ctx, true)
    }

    fn arg_count(&self) -> usize {
        match self {
            Projection::Column(_) | Projection::Derived(_) => 0,
            Projection::Function(f) => f.arg_count(),
        }
    }

    fn scan(
        &self,
        ctx: &RenderContext,
        buf: &mut [u8],
        args: &mut [Value],
        cur_arg: &mut usize,
    ) -> usize {
        self.scan_with(ctx, buf, args, cur_arg, true)
    }
}

impl From<Column> for Projection {
    fn from(c: Column) -> Self {
        Projection::Column(c)
    }
}

impl From<&Column> for Projection {
    fn from(c: &Column) -> Self {
        Projection::Column(c.clone())
    }
}

impl From<ColumnDef> for Projection {
    fn from(c: ColumnDef) -> Self {
        Projection::Column(c.column())
    }
}

impl From<&ColumnDef> for Projection {
    fn from(c: &ColumnDef) -> Self {
        Projection::Column(c.column())
    }
}

impl From<DerivedColumn> for Projection {
    fn from(d: DerivedColumn) -> Self {
        Projection::Derived(d)
    }
}

impl From<&DerivedColumn> for Projection {
    fn from(d: &DerivedColumn) -> Self {
        Projection::Derived(d.clone())
    }
}

impl From<Function> for Projection {
    fn from(f: Function) -> Self {
        Projection::Function(f)
    }
}

/// Ordered sequence of projections, rendered comma-separated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct List {
    elements: Vec<Projection>,
}

impl List {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a projection.
    pub fn push(&mut self, p: impl Into<Projection>) {
        self.elements.push(p.into());
    }

    /// Builder form of [`List::push`].
    pub fn with(mut self, p: impl Into<Projection>) -> Self {
        self.push(p);
        self
    }

    pub fn elements(&self) -> &[Projection] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub(crate) fn contains_key(&self, key: ProjectionKey) -> bool {
        self.elements.iter().any(|p| p.key() == Some(key))
    }

    pub(crate) fn references_selection(&self, id: SelectionId) -> bool {
        self.elements.iter().any(|p| p.selection_id() == Some(id))
    }

    pub(crate) fn size_with(&self, ctx: &RenderContext, aliased: bool) -> usize {
        let mut size: usize = self.elements.iter().map(|p| p.size_with(ctx, aliased)).sum();
        if self.elements.len() > 1 {
            size += sym_len(ctx, Symbol::Comma) * (self.elements.len() - 1);
        }
        size
    }

    pub(crate) fn scan_with(
        &self,
        ctx: &RenderContext,
        buf: &mut [u8],
        args: &mut [Value],
        cur_arg: &mut usize,
        aliased: bool,
    ) -> usize {
        let mut bw = 0;
        for (x, p) in self.elements.iter().enumerate() {
            if x > 0 {
                bw += write_sym(ctx, &mut buf[bw..], Symbol::Comma);
            }
            bw += p.scan_with(ctx, &mut buf[bw..], args, cur_arg, aliased);
        }
        bw
    }
}

impl<P: Into<Projection>> FromIterator<P> for List {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        Self {
            elements: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl Render for List {
    fn size(&self, ctx: &RenderContext) -> usize {
        self.size_with(ctx, true)
    }

    fn arg_count(&self) -> usize {
        self.elements.iter().map(Render::arg_count).sum()
    }

    fn scan(
        &self,
        ctx: &RenderContext,
        buf: &mut [u8],
        args: &mut [Value],
        cur_arg: &mut usize,
    ) -> usize {
        self.scan_with(ctx, buf, args, cur_arg, true)
    }
}

/// A projection plus sort direction, used in ORDER BY.
///
/// Ascending renders with no keyword; descending appends ` DESC`. The
/// projection's alias is never rendered here.
#[derive(Debug, Clone, PartialEq)]
pub struct SortColumn {
    proj: Projection,
    desc: bool,
}

impl SortColumn {
    pub fn new(proj: impl Into<Projection>, desc: bool) -> Self {
        Self {
            proj: proj.into(),
            desc,
        }
    }

    pub fn projection(&self) -> &Projection {
        &self.proj
    }

    pub fn is_desc(&self) -> bool {
        self.desc
    }
}

impl Render for SortColumn {
    fn size(&self, ctx: &RenderContext) -> usize {
        let mut size = self.proj.size_with(ctx, false);
        if self.desc {
            size += sym_len(ctx, Symbol::Desc);
        }
        size
    }

    fn arg_count(&self) -> usize {
        self.proj.arg_count()
    }

    fn scan(
        &self,
        ctx: &RenderContext,
        buf: &mut [u8],
        args: &mut [Value],
        cur_arg: &mut usize,
    ) -> usize {
        let mut bw = self.proj.scan_with(ctx, buf, args, cur_arg, false);
        if self.desc {
            bw += write_sym(ctx, &mut buf[bw..], Symbol::Desc);
        }
        bw
    }
}

impl From<Column> for SortColumn {
    fn from(c: Column) -> Self {
        SortColumn::new(c, false)
    }
}

impl From<&Column> for SortColumn {
    fn from(c: &Column) -> Self {
        SortColumn::new(c.clone(), false)
    }
}

impl From<&ColumnDef> for SortColumn {
    fn from(c: &ColumnDef) -> Self {
        SortColumn::new(c.column(), false)
    }
}

impl From<DerivedColumn> for SortColumn {
    fn from(d: DerivedColumn) -> Self {
        SortColumn::new(d, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::TableDef;
    use crate::render::render;

    fn users() -> Table {
        TableDef::new("test", "users", ["id", "name"]).unwrap().table()
    }

    #[test]
    fn column_renders_qualified() {
        let c = users().column("name").unwrap();
        let ctx = RenderContext::default();
        assert_eq!(render(&c, &ctx).0, "users.name");
        assert_eq!(render(&c.clone().alias("n"), &ctx).0, "users.name AS n");
    }

    #[test]
    fn column_on_aliased_table_uses_alias() {
        let u = users().alias("u").unwrap();
        let c = u.column("id").unwrap();
        assert_eq!(render(&c, &RenderContext::default()).0, "u.id");
    }

    #[test]
    fn list_joins_with_commas() {
        let t = users();
        let list: List = t.columns().into_iter().collect();
        let ctx = RenderContext::default();
        assert_eq!(list.size(&ctx), "users.id, users.name".len());
        assert_eq!(render(&list, &ctx).0, "users.id, users.name");
        assert_eq!(list.arg_count(), 0);
    }

    #[test]
    fn sort_columns() {
        let c = users().column("name").unwrap().alias("n");
        let ctx = RenderContext::default();
        assert_eq!(render(&c.asc(), &ctx).0, "users.name");
        assert_eq!(render(&c.desc(), &ctx).0, "users.name DESC");
    }

    #[test]
    fn projection_keys() {
        let t = users();
        let a = Projection::from(t.column("id").unwrap());
        let b = Projection::from(t.column("id").unwrap().alias("x"));
        assert_eq!(a.key(), b.key());
        assert_eq!(a.output_name(), Some("id"));
        assert_eq!(b.output_name(), Some("x"));
        assert_eq!(a.selection_id(), Some(t.id()));
    }
}
