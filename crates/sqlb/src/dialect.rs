//! Dialect-indexed symbol table and render configuration.
//!
//! Every keyword, operator and punctuation mark a node writes is looked up
//! here through a [`RenderContext`], never hard-coded in the node. The same
//! built statement can therefore render under different dialects.

use crate::error::{SqlError, SqlResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A named SQL flavor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// `?` placeholders, `TRIM`/`LTRIM`/`RTRIM`.
    #[default]
    #[serde(alias = "mariadb")]
    MySql,
    /// `$n` placeholders, `BTRIM`/`TRIM(LEADING FROM ..)`.
    #[serde(alias = "postgres")]
    PostgreSql,
}

/// Placeholder convention of a dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// `?` for every argument.
    QuestionMark,
    /// `$1`, `$2`, ... numbered by textual position.
    Numbered,
}

/// Syntactic markers resolved to literal text per dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    Select,
    From,
    Where,
    GroupBy,
    Having,
    OrderBy,
    Limit,
    Offset,
    Join,
    LeftJoin,
    RightJoin,
    FullJoin,
    On,
    As,
    Comma,
    Period,
    LParen,
    RParen,
    Star,
    Placeholder,
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    In,
    NotIn,
    Like,
    Between,
    NotBetween,
    And,
    Or,
    IsNull,
    IsNotNull,
    AlwaysTrue,
    AlwaysFalse,
    Desc,
    Max,
    Min,
    Sum,
    Avg,
    Count,
    CountDistinct,
    Upper,
    Lower,
    CharLength,
    Trim,
    LTrim,
    RTrim,
    Cast,
    TypeChar,
    TypeVarchar,
    TypeText,
    TypeInt,
    TypeFloat,
    TypeDecimal,
    TypeBinary,
}

impl Dialect {
    /// Literal text of `sym` under this dialect.
    pub fn symbol(self, sym: Symbol) -> &'static str {
        use Symbol::*;
        match (self, sym) {
            (_, Select) => "SELECT ",
            (_, From) => "FROM ",
            (_, Where) => "WHERE ",
            (_, GroupBy) => "GROUP BY ",
            (_, Having) => "HAVING ",
            (_, OrderBy) => "ORDER BY ",
            (_, Limit) => "LIMIT ",
            (_, Offset) => " OFFSET ",
            (_, Join) => "JOIN ",
            (_, LeftJoin) => "LEFT JOIN ",
            (_, RightJoin) => "RIGHT JOIN ",
            (_, FullJoin) => "FULL JOIN ",
            (_, On) => " ON ",
            (_, As) => " AS ",
            (_, Comma) => ", ",
            (_, Period) => ".",
            (_, LParen) => "(",
            (_, RParen) => ")",
            (_, Star) => "*",
            // Numbered dialects are interpolated after the scan.
            (_, Placeholder) => "?",
            (_, Equal) => " = ",
            (_, NotEqual) => " != ",
            (_, LessThan) => " < ",
            (_, LessThanOrEqual) => " <= ",
            (_, GreaterThan) => " > ",
            (_, GreaterThanOrEqual) => " >= ",
            (_, In) => " IN (",
            (_, NotIn) => " NOT IN (",
            (_, Like) => " LIKE ",
            (_, Between) => " BETWEEN ",
            (_, NotBetween) => " NOT BETWEEN ",
            (_, And) => " AND ",
            (_, Or) => " OR ",
            (_, IsNull) => " IS NULL",
            (_, IsNotNull) => " IS NOT NULL",
            (_, AlwaysTrue) => "1=1",
            (_, AlwaysFalse) => "1=0",
            (_, Desc) => " DESC",
            (_, Max) => "MAX(",
            (_, Min) => "MIN(",
            (_, Sum) => "SUM(",
            (_, Avg) => "AVG(",
            (_, Count) => "COUNT(",
            (_, CountDistinct) => "COUNT(DISTINCT ",
            (_, Upper) => "UPPER(",
            (_, Lower) => "LOWER(",
            (_, CharLength) => "CHAR_LENGTH(",
            (_, Cast) => "CAST(",
            (Dialect::MySql, Trim) => "TRIM(",
            (Dialect::PostgreSql, Trim) => "BTRIM(",
            (Dialect::MySql, LTrim) => "LTRIM(",
            (Dialect::PostgreSql, LTrim) => "TRIM(LEADING FROM ",
            (Dialect::MySql, RTrim) => "RTRIM(",
            (Dialect::PostgreSql, RTrim) => "TRIM(TRAILING FROM ",
            (_, TypeChar) => "CHAR",
            (Dialect::MySql, TypeVarchar) => "CHAR",
            (Dialect::PostgreSql, TypeVarchar) => "VARCHAR",
            (Dialect::MySql, TypeText) => "CHAR",
            (Dialect::PostgreSql, TypeText) => "TEXT",
            (Dialect::MySql, TypeInt) => "SIGNED",
            (Dialect::PostgreSql, TypeInt) => "INTEGER",
            (Dialect::MySql, TypeFloat) => "DOUBLE",
            (Dialect::PostgreSql, TypeFloat) => "DOUBLE PRECISION",
            (Dialect::MySql, TypeDecimal) => "DECIMAL",
            (Dialect::PostgreSql, TypeDecimal) => "NUMERIC",
            (Dialect::MySql, TypeBinary) => "BINARY",
            (Dialect::PostgreSql, TypeBinary) => "BYTEA",
        }
    }

    /// Placeholder convention.
    pub fn placeholder_style(self) -> PlaceholderStyle {
        match self {
            Dialect::MySql => PlaceholderStyle::QuestionMark,
            Dialect::PostgreSql => PlaceholderStyle::Numbered,
        }
    }

    /// Extra bytes the placeholder pass adds for `argc` arguments.
    ///
    /// For numbered placeholders each `?` (one byte) becomes `$n`, so the
    /// growth is the total number of decimal digits of `1..=argc`.
    pub fn interpolation_length(self, argc: usize) -> usize {
        match self.placeholder_style() {
            PlaceholderStyle::QuestionMark => 0,
            PlaceholderStyle::Numbered => (1..=argc).map(decimal_digits).sum(),
        }
    }

    /// Rewrite neutral `?` placeholders into this dialect's style.
    ///
    /// `buf` must contain exactly `argc` placeholder glyphs.
    pub(crate) fn interpolate(self, buf: Vec<u8>, argc: usize) -> Vec<u8> {
        if self.placeholder_style() == PlaceholderStyle::QuestionMark || argc == 0 {
            return buf;
        }
        let mut out = Vec::with_capacity(buf.len() + self.interpolation_length(argc));
        let mut n = 0usize;
        for &b in &buf {
            if b == b'?' {
                n += 1;
                out.push(b'$');
                out.extend_from_slice(n.to_string().as_bytes());
            } else {
                out.push(b);
            }
        }
        assert_eq!(n, argc, "placeholder count does not match argument count");
        out
    }
}

fn decimal_digits(mut n: usize) -> usize {
    let mut digits = 1;
    while n >= 10 {
        n /= 10;
        digits += 1;
    }
    digits
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::MySql => f.write_str("mysql"),
            Dialect::PostgreSql => f.write_str("postgresql"),
        }
    }
}

impl FromStr for Dialect {
    type Err = SqlError;

    fn from_str(s: &str) -> SqlResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(Dialect::MySql),
            "postgresql" | "postgres" | "pg" => Ok(Dialect::PostgreSql),
            other => Err(SqlError::InvalidFormat(format!("unknown dialect: {other}"))),
        }
    }
}

/// Layout options for the rendered text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatOptions {
    /// Written before each clause keyword after SELECT (default `" "`).
    pub clause_separator: String,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            clause_separator: " ".to_string(),
        }
    }
}

impl FormatOptions {
    /// Create options with defaults (single-line output).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the clause separator, e.g. `"\n"` for one clause per line.
    pub fn with_clause_separator(mut self, sep: impl Into<String>) -> Self {
        self.clause_separator = sep.into();
        self
    }

    /// Check that the separator is non-empty whitespace.
    pub fn validate(&self) -> SqlResult<()> {
        if self.clause_separator.is_empty() {
            return Err(SqlError::InvalidFormat(
                "clause separator cannot be empty".to_string(),
            ));
        }
        if !self.clause_separator.chars().all(char::is_whitespace) {
            return Err(SqlError::InvalidFormat(format!(
                "clause separator must be whitespace, got {:?}",
                self.clause_separator
            )));
        }
        Ok(())
    }
}

/// Immutable configuration threaded through every `size`/`scan` call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderContext {
    pub dialect: Dialect,
    pub format: FormatOptions,
}

impl RenderContext {
    /// Create a context for `dialect` with default formatting.
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            format: FormatOptions::default(),
        }
    }

    /// Set the dialect.
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Set the format options.
    pub fn with_format(mut self, format: FormatOptions) -> Self {
        self.format = format;
        self
    }

    /// Literal text of a symbol under the configured dialect.
    #[inline]
    pub fn sym(&self, sym: Symbol) -> &'static str {
        self.dialect.symbol(sym)
    }

    /// Separator written before each clause keyword.
    #[inline]
    pub fn clause_separator(&self) -> &str {
        &self.format.clause_separator
    }

    /// Validate the configuration.
    pub fn validate(&self) -> SqlResult<()> {
        self.format.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trim_family_is_dialect_specific() {
        assert_eq!(Dialect::MySql.symbol(Symbol::Trim), "TRIM(");
        assert_eq!(Dialect::PostgreSql.symbol(Symbol::Trim), "BTRIM(");
        assert_eq!(Dialect::PostgreSql.symbol(Symbol::LTrim), "TRIM(LEADING FROM ");
        assert_eq!(Dialect::MySql.symbol(Symbol::RTrim), "RTRIM(");
    }

    #[test]
    fn interpolation_length_counts_digits() {
        assert_eq!(Dialect::MySql.interpolation_length(25), 0);
        assert_eq!(Dialect::PostgreSql.interpolation_length(0), 0);
        assert_eq!(Dialect::PostgreSql.interpolation_length(3), 3);
        // 1..=9 -> 9 digits, 10..=12 -> 6 digits
        assert_eq!(Dialect::PostgreSql.interpolation_length(12), 15);
    }

    #[test]
    fn interpolate_numbers_placeholders() {
        let buf = b"a = ? AND b IN (?, ?)".to_vec();
        let out = Dialect::PostgreSql.interpolate(buf.clone(), 3);
        assert_eq!(out, b"a = $1 AND b IN ($2, $3)".to_vec());
        assert_eq!(out.len(), buf.len() + Dialect::PostgreSql.interpolation_length(3));

        let same = Dialect::MySql.interpolate(buf.clone(), 3);
        assert_eq!(same, buf);
    }

    #[test]
    fn dialect_from_str() {
        assert_eq!("postgres".parse::<Dialect>().unwrap(), Dialect::PostgreSql);
        assert_eq!("MySQL".parse::<Dialect>().unwrap(), Dialect::MySql);
        assert!("oracle".parse::<Dialect>().is_err());
        assert_eq!(Dialect::PostgreSql.to_string(), "postgresql");
    }

    #[test]
    fn context_deserializes_with_defaults() {
        let ctx: RenderContext = serde_json::from_str(r#"{"dialect":"postgres"}"#).unwrap();
        assert_eq!(ctx.dialect, Dialect::PostgreSql);
        assert_eq!(ctx.clause_separator(), " ");

        let ctx: RenderContext =
            serde_json::from_str(r#"{"format":{"clause_separator":"\n"}}"#).unwrap();
        assert_eq!(ctx.dialect, Dialect::MySql);
        assert_eq!(ctx.clause_separator(), "\n");
    }

    #[test]
    fn format_validation() {
        assert!(FormatOptions::new().validate().is_ok());
        assert!(FormatOptions::new().with_clause_separator("\n  ").validate().is_ok());
        assert!(FormatOptions::new().with_clause_separator("").validate().is_err());
        assert!(FormatOptions::new().with_clause_separator(" ? ").validate().is_err());
    }
}
