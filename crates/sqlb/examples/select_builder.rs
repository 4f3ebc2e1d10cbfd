//! SELECT builder example for sqlb
//!
//! Run with: cargo run --example select_builder -p sqlb
//!
//! Builds a few statements and prints the SQL and arguments for both
//! dialects. Nothing is executed; `sqlb::as_refs` shows the hand-off shape a
//! `tokio-postgres` client expects.

use sqlb::{
    Dialect, FormatOptions, Meta, RenderContext, SqlError, SqlType, between, count_star, eq,
    in_list, select,
};

fn main() -> Result<(), SqlError> {
    let mut meta = Meta::new("blog");
    let users = meta.define_table("users", ["id", "name", "created_on"])?;
    let articles = meta.define_table("articles", ["id", "title", "author", "state"])?;
    let states = meta.define_table("article_states", ["id", "name"])?;

    // ============================================
    // Example 1: join with projection aliases
    // ============================================
    let q = sqlb::select![
        articles.column("title")?,
        users.column("name")?.alias("author"),
        states.column("name")?.alias("state"),
    ]
    .join(&users, eq(articles.column("author")?, users.column("id")?))
    .join(&states, eq(articles.column("state")?, states.column("id")?))
    .and_where(in_list(states.column("name")?, ["draft", "published"]))
    .order_by([articles.column("id")?.desc()])
    .limit_with_offset(20, 40);

    let (sql, args) = q.build()?;
    println!("MySQL:\n  {sql}\n  args: {args:?}");

    let (sql, args) = q.to_sql_with(&RenderContext::new(Dialect::PostgreSql));
    println!("PostgreSQL:\n  {sql}\n  params: {}", sqlb::as_refs(&args).len());

    // ============================================
    // Example 2: aggregate over a derived table
    // ============================================
    let recent = select([&users])
        .and_where(between(users.column("id")?, 1, 1000))
        .alias("recent");
    let q = select([recent]).dialect(Dialect::PostgreSql);
    let recent_table = q.statement().selections()[0].clone();
    println!("\nDerived table `{}`:", recent_table.alias_name().unwrap_or_default());
    println!("  {}", q.to_sql());

    let q = sqlb::select![
        users.column("name")?.upper().alias("name"),
        users.column("created_on")?.cast(SqlType::Text).alias("created"),
        count_star().alias("n"),
    ]
    .group_by([users.column("name")?, users.column("created_on")?])
    .context(RenderContext::default().with_format(FormatOptions::new().with_clause_separator("\n  ")));
    println!("\nMulti-line:\n  {}", q.to_sql());

    // ============================================
    // Example 3: deferred errors
    // ============================================
    let bad = sqlb::select![].join(&users, eq(articles.column("author")?, users.column("id")?));
    if let Err(err) = bad.build() {
        println!("\nInvalid query: {err}");
    }

    Ok(())
}
