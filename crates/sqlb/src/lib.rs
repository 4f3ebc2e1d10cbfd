//! # sqlb
//!
//! A SELECT statement builder that renders into parameterized SQL text plus
//! a positional argument list.
//!
//! ## Features
//!
//! - **Typed metadata**: tables and columns are defined once ([`TableDef`],
//!   [`Meta`]) and referenced by identity, not by string
//! - **Exact rendering**: every node reports its byte length and argument
//!   count before writing, so the output is allocated once and checked
//! - **Dialects**: `?` placeholders for MySQL, `$n` for PostgreSQL, plus
//!   dialect-specific function spellings
//! - **Deferred errors**: composition errors are kept on the handle, so the
//!   fluent chain never breaks
//!
//! ## Example
//!
//! ```
//! use sqlb::{Meta, eq, select};
//!
//! let mut meta = Meta::new("blog");
//! let users = meta.define_table("users", ["id", "name"]).unwrap();
//! let articles = meta.define_table("articles", ["id", "author"]).unwrap();
//!
//! let q = select([articles.column("id").unwrap(), users.column("name").unwrap().alias("author")])
//!     .join(&users, eq(articles.column("author").unwrap(), users.column("id").unwrap()))
//!     .and_where(eq(users.column("name").unwrap(), "alice"))
//!     .limit(10);
//!
//! let (sql, args) = q.build().unwrap();
//! assert_eq!(
//!     sql,
//!     "SELECT articles.id, users.name AS author FROM articles \
//!      JOIN users ON articles.author = users.id WHERE users.name = ? LIMIT ?"
//! );
//! assert_eq!(args.len(), 2);
//! ```

pub mod clause;
pub mod column;
pub mod derived;
pub mod dialect;
pub mod error;
pub mod expr;
pub mod function;
pub mod ident;
pub mod meta;
pub mod query;
pub mod render;
pub mod selection;
pub mod statement;
pub mod value;

pub use clause::{Join, JoinKind};
pub use column::{Column, List, Projection, SortColumn};
pub use derived::{DerivedColumn, DerivedTable};
pub use dialect::{Dialect, FormatOptions, PlaceholderStyle, RenderContext, Symbol};
pub use error::{SqlError, SqlResult};
pub use expr::{
    Expression, Op, Operand, all, and, any, between, eq, gt, gte, in_list, is_not_null, is_null,
    like, lt, lte, ne, not_between, not_in, or,
};
pub use function::{
    Function, FunctionKind, SqlType, avg, cast, char_length, count, count_distinct, count_star,
    lower, ltrim, max, min, rtrim, sum, trim, upper,
};
pub use meta::{ColumnDef, Meta, Table, TableDef};
pub use query::{SelectItem, SelectQuery, select};
pub use render::{Render, render};
pub use selection::{ProjectionKey, Selection, SelectionId};
pub use statement::SelectStatement;
pub use value::{Value, as_refs};

/// Compose a SELECT from heterogeneous inputs.
///
/// Each argument is converted with [`SelectItem::from`], so tables, columns,
/// function calls and sub-selects can be mixed:
///
/// ```
/// use sqlb::{TableDef, count_star};
///
/// let users = TableDef::new("app", "users", ["id", "name"]).unwrap();
/// let q = sqlb::select![users.column("name").unwrap(), count_star().alias("n")];
/// assert_eq!(q.to_sql(), "SELECT users.name, COUNT(*) AS n FROM users");
/// ```
#[macro_export]
macro_rules! select {
    () => {
        $crate::select(::std::vec::Vec::<$crate::SelectItem>::new())
    };
    ($($item:expr),+ $(,)?) => {
        $crate::select([$($crate::SelectItem::from($item)),+])
    };
}
