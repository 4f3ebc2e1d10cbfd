use super::*;
use crate::expr::eq;
use crate::function::count_star;

fn users() -> TableDef {
    TableDef::new("test", "users", ["id", "name"]).unwrap()
}

fn articles() -> TableDef {
    TableDef::new("test", "articles", ["id", "author", "state"]).unwrap()
}

#[test]
fn default_handle_is_valid_and_empty() {
    let q = SelectQuery::default();
    assert!(q.is_valid());
    assert!(q.error().is_none());
    assert!(q.statement().projections().is_empty());
}

#[test]
fn column_registers_owning_table_once() {
    let u = users();
    let q = select([u.column("id").unwrap(), u.column("name").unwrap()]);
    assert_eq!(q.statement().selections().len(), 1);
    assert_eq!(q.to_sql(), "SELECT users.id, users.name FROM users");
}

#[test]
fn duplicate_projection_is_dropped() {
    let u = users();
    let q = select::<Vec<SelectItem>>(vec![
        u.column("name").unwrap().into(),
        u.clone().into(),
    ]);
    assert_eq!(q.to_sql(), "SELECT users.name, users.id FROM users");
}

#[test]
fn list_input_is_flattened() {
    let u = users();
    let list: List = [u.column("name").unwrap(), u.column("id").unwrap()]
        .into_iter()
        .collect();
    let q = select([list]);
    assert_eq!(q.to_sql(), "SELECT users.name, users.id FROM users");
}

#[test]
fn function_projection_registers_its_table() {
    let u = users();
    let q = select::<Vec<SelectItem>>(vec![
        u.column("name").unwrap().into(),
        count_star().alias("n").into(),
    ])
    .group_by([u.column("name").unwrap()]);
    assert_eq!(
        q.to_sql(),
        "SELECT users.name, COUNT(*) AS n FROM users GROUP BY users.name"
    );
}

#[test]
fn derived_counter_skips_aliased_subselects() {
    let (u, a) = (users(), articles());
    let q = select([
        select([u.clone()]),
        select([a.column("id").unwrap()]).alias("x"),
        select([a.column("state").unwrap()]),
    ]);
    let names: Vec<&str> = q
        .statement()
        .selections()
        .iter()
        .filter_map(Selection::alias_name)
        .collect();
    assert_eq!(names, vec!["derived0", "x", "derived1"]);
}

#[test]
fn derived_counter_restarts_per_call() {
    let u = users();
    let first = select([select([u.clone()])]);
    let second = select([select([u.clone()])]);
    assert!(first.to_sql().ends_with("AS derived0"));
    assert!(second.to_sql().ends_with("AS derived0"));
}

#[test]
fn first_error_sticks() {
    let (u, a) = (users(), articles());
    let q = select(Vec::<SelectItem>::new())
        .join(u.clone(), eq(a.column("author").unwrap(), u.column("id").unwrap()))
        .alias("bad alias")
        .and_where(eq(u.column("id").unwrap(), 1));
    assert_eq!(q.error(), Some(&SqlError::JoinNoSelection));
    assert!(q.statement().where_clause().is_none());
}

#[test]
fn invalid_handle_renders_empty() {
    let u = users();
    let q = select([u.clone()]).alias("no-dash");
    assert!(!q.is_valid());
    assert!(matches!(q.error(), Some(SqlError::InvalidIdentifier { .. })));
    assert_eq!(q.to_sql_with_args(), (String::new(), Vec::new()));
    assert!(q.build().is_err());
    assert!(q.validate().is_err());
}

#[test]
fn bad_projection_alias_is_deferred() {
    let u = users();
    let q = select([u.column("name").unwrap().alias("a b")]);
    assert!(matches!(q.error(), Some(SqlError::InvalidIdentifier { .. })));
}

#[test]
fn bad_table_alias_never_reaches_a_clause() {
    let u = users();
    assert!(u.alias("u;").is_err());
    assert!(u.alias("x?").is_err());
    assert!(u.alias("x; DROP TABLE users; --").is_err());
}

#[test]
fn invalid_subselect_poisons_outer() {
    let u = users();
    let inner = select([u.clone()]).alias("1x");
    let q = select([inner]);
    assert!(matches!(q.error(), Some(SqlError::InvalidIdentifier { .. })));
}

#[test]
fn bad_context_is_rejected() {
    let q = select([users()]).context(
        RenderContext::default()
            .with_format(crate::dialect::FormatOptions::new().with_clause_separator("--")),
    );
    assert!(matches!(q.error(), Some(SqlError::InvalidFormat(_))));
}

#[test]
fn build_returns_sql_and_args() {
    let u = users();
    let (sql, args) = select([u.clone()])
        .and_where(eq(u.column("id").unwrap(), 7))
        .dialect(Dialect::PostgreSql)
        .build()
        .unwrap();
    assert_eq!(sql, "SELECT users.id, users.name FROM users WHERE users.id = $1");
    assert_eq!(args, vec![Value::Int(7)]);
}

#[test]
fn to_sql_with_overrides_context() {
    let q = select([users()]).limit(3);
    let (sql, _) = q.to_sql_with(&RenderContext::new(Dialect::PostgreSql));
    assert_eq!(sql, "SELECT users.id, users.name FROM users LIMIT $1");
    assert_eq!(q.to_sql(), "SELECT users.id, users.name FROM users LIMIT ?");
}

#[test]
fn standalone_join_input() {
    let (u, a) = (users(), articles());
    let j = Join::inner(
        &a,
        &u,
        eq(a.column("author").unwrap(), u.column("id").unwrap()),
    );
    let q = select([j]);
    assert_eq!(
        q.to_sql(),
        "SELECT articles.id, articles.author, articles.state, users.id, users.name \
         FROM articles JOIN users ON articles.author = users.id"
    );
}

#[test]
fn same_join_is_ingested_once() {
    let (u, a) = (users(), articles());
    let j = Join::inner(
        &a,
        &u,
        eq(a.column("author").unwrap(), u.column("id").unwrap()),
    );
    let q = select([j.clone(), j]);
    assert_eq!(q.statement().joins().len(), 1);
}

#[test]
fn standalone_join_onto_joined_selection_is_deferred() {
    let (u, a) = (users(), articles());
    let on = eq(a.column("author").unwrap(), u.column("id").unwrap());
    let first = Join::inner(&a, &u, on.clone());
    let back = Join::inner(&u, &a, on);
    let q = select([first, back]);
    assert_eq!(q.error(), Some(&SqlError::JoinDuplicateTarget));
    assert_eq!(q.to_sql(), "");
}
