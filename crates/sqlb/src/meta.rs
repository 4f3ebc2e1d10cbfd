//! Table and column metadata.
//!
//! A [`TableDef`] describes a table once; [`Table`] and
//! [`Column`] are usages of that description inside statements. Loading
//! definitions from a live database is left to the caller, who feeds the
//! names into [`Meta::define_table`] or [`TableDef::new`].

use crate::column::Column;
use crate::dialect::{RenderContext, Symbol};
use crate::error::{SqlError, SqlResult};
use crate::ident::validate_ident;
use crate::render::{Render, sym_len, write_str, write_sym};
use crate::selection::SelectionId;
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

struct TableDefInner {
    id: SelectionId,
    schema: String,
    name: String,
    columns: Vec<String>,
}

/// Definition of a table: schema, name and ordered column names.
///
/// Cheap to clone; clones share identity.
#[derive(Clone)]
pub struct TableDef(Arc<TableDefInner>);

impl TableDef {
    /// Define a table. Column order is preserved and significant.
    pub fn new<I, S>(schema: &str, name: &str, columns: I) -> SqlResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if !schema.is_empty() {
            validate_ident(schema)?;
        }
        validate_ident(name)?;

        let mut cols: Vec<String> = Vec::new();
        for col in columns {
            let col = col.into();
            validate_ident(&col)?;
            if cols.contains(&col) {
                return Err(SqlError::DuplicateColumn {
                    table: name.to_string(),
                    column: col,
                });
            }
            cols.push(col);
        }

        Ok(TableDef(Arc::new(TableDefInner {
            id: SelectionId::next(),
            schema: schema.to_string(),
            name: name.to_string(),
            columns: cols,
        })))
    }

    pub fn id(&self) -> SelectionId {
        self.0.id
    }

    pub fn schema(&self) -> &str {
        &self.0.schema
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Column names in definition order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.0.columns.iter().map(String::as_str)
    }

    pub(crate) fn column_name(&self, ordinal: usize) -> &str {
        &self.0.columns[ordinal]
    }

    pub(crate) fn ordinal_of(&self, name: &str) -> SqlResult<usize> {
        self.0
            .columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| SqlError::unknown_column(self.name(), name))
    }

    /// Look up a column definition by name.
    pub fn column_def(&self, name: &str) -> SqlResult<ColumnDef> {
        let ordinal = self.ordinal_of(name)?;
        Ok(ColumnDef {
            table: self.clone(),
            ordinal,
        })
    }

    /// All column definitions in definition order.
    pub fn column_defs(&self) -> Vec<ColumnDef> {
        (0..self.0.columns.len())
            .map(|ordinal| ColumnDef {
                table: self.clone(),
                ordinal,
            })
            .collect()
    }

    /// The unaliased usage of this table. It shares the definition's identity,
    /// so every call refers to the same FROM-clause subject.
    pub fn table(&self) -> Table {
        Table {
            id: self.id(),
            def: self.clone(),
            alias: None,
        }
    }

    /// A new aliased usage with its own identity (`users AS u`).
    ///
    /// The alias qualifies every column of the usage, wherever it is
    /// rendered, so it is validated here.
    pub fn alias(&self, alias: impl Into<String>) -> SqlResult<Table> {
        let alias = alias.into();
        validate_ident(&alias)?;
        Ok(Table {
            id: SelectionId::next(),
            def: self.clone(),
            alias: Some(alias),
        })
    }

    /// Column usage on the unaliased table.
    pub fn column(&self, name: &str) -> SqlResult<Column> {
        self.table().column(name)
    }

    /// All column usages on the unaliased table.
    pub fn columns(&self) -> Vec<Column> {
        self.table().columns()
    }
}

impl fmt::Debug for TableDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableDef")
            .field("id", &self.0.id)
            .field("schema", &self.0.schema)
            .field("name", &self.0.name)
            .field("columns", &self.0.columns)
            .finish()
    }
}

impl PartialEq for TableDef {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for TableDef {}

/// Definition of one column, with a back-reference to its table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    table: TableDef,
    ordinal: usize,
}

impl ColumnDef {
    pub fn name(&self) -> &str {
        self.table.column_name(self.ordinal)
    }

    pub fn table_def(&self) -> &TableDef {
        &self.table
    }

    /// Position of the column in its table definition.
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// Usage of this column on the unaliased table.
    pub fn column(&self) -> Column {
        Column::new(self.table.table(), self.ordinal)
    }

    /// Usage of this column with a projection alias.
    pub fn alias(&self, alias: impl Into<String>) -> Column {
        self.column().alias(alias)
    }
}

/// A usage of a [`TableDef`] in a statement, optionally aliased.
#[derive(Debug, Clone)]
pub struct Table {
    id: SelectionId,
    def: TableDef,
    alias: Option<String>,
}

impl Table {
    pub fn id(&self) -> SelectionId {
        self.id
    }

    pub fn def(&self) -> &TableDef {
        &self.def
    }

    pub fn alias_name(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Re-alias this table. The result is a distinct selection.
    pub fn alias(&self, alias: impl Into<String>) -> SqlResult<Table> {
        self.def.alias(alias)
    }

    /// Name columns are qualified with: the alias if set, else the table name.
    pub fn qualifier(&self) -> &str {
        self.alias.as_deref().unwrap_or_else(|| self.def.name())
    }

    /// Column usage on this table.
    pub fn column(&self, name: &str) -> SqlResult<Column> {
        let ordinal = self.def.ordinal_of(name)?;
        Ok(Column::new(self.clone(), ordinal))
    }

    /// All column usages on this table, in definition order.
    pub fn columns(&self) -> Vec<Column> {
        (0..self.def.0.columns.len())
            .map(|ordinal| Column::new(self.clone(), ordinal))
            .collect()
    }
}

impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Table {}

impl Render for Table {
    fn size(&self, ctx: &RenderContext) -> usize {
        let mut size = self.def.name().len();
        if let Some(alias) = &self.alias {
            size += sym_len(ctx, Symbol::As) + alias.len();
        }
        size
    }

    fn arg_count(&self) -> usize {
        0
    }

    fn scan(&self, ctx: &RenderContext, buf: &mut [u8], _: &mut [Value], _: &mut usize) -> usize {
        let mut bw = write_str(buf, self.def.name());
        if let Some(alias) = &self.alias {
            bw += write_sym(ctx, &mut buf[bw..], Symbol::As);
            bw += write_str(&mut buf[bw..], alias);
        }
        bw
    }
}

/// Table definitions for one schema.
#[derive(Debug, Clone, Default)]
pub struct Meta {
    schema: String,
    tables: Vec<TableDef>,
}

impl Meta {
    /// Create an empty registry for `schema`.
    pub fn new(schema: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            tables: Vec::new(),
        }
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Define a table in this schema and register it.
    ///
    /// Re-defining an existing name replaces the earlier definition.
    pub fn define_table<I, S>(&mut self, name: &str, columns: I) -> SqlResult<TableDef>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let def = TableDef::new(&self.schema, name, columns)?;
        self.tables.retain(|t| t.name() != name);
        self.tables.push(def.clone());
        Ok(def)
    }

    /// Look up a table definition by name.
    pub fn table_def(&self, name: &str) -> SqlResult<TableDef> {
        self.tables
            .iter()
            .find(|t| t.name() == name)
            .cloned()
            .ok_or_else(|| SqlError::UnknownTable(name.to_string()))
    }

    /// Unaliased usage of a registered table.
    pub fn table(&self, name: &str) -> SqlResult<Table> {
        Ok(self.table_def(name)?.table())
    }

    /// Registered definitions in registration order.
    pub fn tables(&self) -> impl Iterator<Item = &TableDef> {
        self.tables.iter()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::render;

    fn users() -> TableDef {
        TableDef::new("test", "users", ["id", "email"]).unwrap()
    }

    #[test]
    fn table_renders_name() {
        let (sql, args) = render(&users().table(), &RenderContext::default());
        assert_eq!(sql, "users");
        assert!(args.is_empty());
    }

    #[test]
    fn table_renders_alias() {
        let t = users().alias("u").unwrap();
        let ctx = RenderContext::default();
        assert_eq!(t.size(&ctx), "users AS u".len());
        assert_eq!(render(&t, &ctx).0, "users AS u");
        assert_eq!(t.qualifier(), "u");
    }

    #[test]
    fn column_defs_keep_insertion_order() {
        let td = users();
        let defs = td.column_defs();
        assert_eq!(defs.len(), 2);
        assert_eq!(defs[0].name(), "id");
        assert_eq!(defs[1].name(), "email");
        for def in &defs {
            assert_eq!(def.table_def(), &td);
        }
    }

    #[test]
    fn column_lookup() {
        let td = users();
        let c = td.column_def("email").unwrap();
        assert_eq!(c.name(), "email");
        assert_eq!(c.ordinal(), 1);
        assert!(matches!(
            td.column_def("unknown"),
            Err(SqlError::UnknownColumn { .. })
        ));
    }

    #[test]
    fn unaliased_usage_shares_identity() {
        let td = users();
        assert_eq!(td.table().id(), td.id());
        assert_eq!(td.table(), td.table());

        let u = td.alias("u").unwrap();
        assert_ne!(u.id(), td.id());
        assert_eq!(u.def(), &td);
        assert_eq!(u.alias_name(), Some("u"));
    }

    #[test]
    fn alias_rejects_bad_names() {
        let td = users();
        assert!(matches!(td.alias("a?b"), Err(SqlError::InvalidIdentifier { .. })));
        assert!(td.alias("x; DROP TABLE users; --").is_err());
        assert!(td.alias("").is_err());

        let u = td.alias("u").unwrap();
        assert!(u.alias("u 2").is_err());
        assert_eq!(u.alias("u2").unwrap().qualifier(), "u2");
    }

    #[test]
    fn definition_rejects_bad_names() {
        assert!(TableDef::new("test", "bad name", ["id"]).is_err());
        assert!(TableDef::new("test", "users", ["id", "i?d"]).is_err());
        assert!(matches!(
            TableDef::new("test", "users", ["id", "id"]),
            Err(SqlError::DuplicateColumn { .. })
        ));
    }

    #[test]
    fn meta_registry() {
        let mut m = Meta::new("test");
        m.define_table("users", ["id", "name"]).unwrap();
        m.define_table("articles", ["id", "author"]).unwrap();
        assert_eq!(m.len(), 2);
        assert_eq!(m.table_def("users").unwrap().schema(), "test");
        assert!(m.table("missing").unwrap_err().is_not_found());

        let names: Vec<&str> = m.tables().map(TableDef::name).collect();
        assert_eq!(names, vec!["users", "articles"]);

        // Redefinition replaces.
        m.define_table("users", ["id"]).unwrap();
        assert_eq!(m.len(), 2);
        assert_eq!(m.table_def("users").unwrap().column_names().count(), 1);
    }
}
