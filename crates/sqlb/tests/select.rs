use sqlb::{
    Dialect, FormatOptions, Meta, Render, RenderContext, SelectQuery, SqlError, TableDef, Value,
    and, between, eq, in_list, is_not_null, ne, select, trim,
};

struct Fixture {
    users: TableDef,
    articles: TableDef,
    article_states: TableDef,
}

fn fixture() -> Fixture {
    let mut meta = Meta::new("test");
    Fixture {
        users: meta.define_table("users", ["id", "name"]).unwrap(),
        articles: meta
            .define_table("articles", ["id", "author", "state"])
            .unwrap(),
        article_states: meta.define_table("article_states", ["id", "name"]).unwrap(),
    }
}

/// Render and check the size/argument invariants against the text.
fn check(q: &SelectQuery, exp: &str, exp_args: Vec<Value>) {
    assert!(q.is_valid(), "unexpected error: {:?}", q.error());
    let ctx = q.render_context();
    let stmt = q.statement();
    assert_eq!(stmt.size(ctx), exp.len(), "size of {exp}");
    assert_eq!(stmt.arg_count(), exp_args.len(), "arg count of {exp}");

    let (sql, args) = q.to_sql_with_args();
    assert_eq!(sql, exp);
    assert_eq!(sql.matches('?').count(), args.len());
    assert_eq!(args, exp_args);
}

#[test]
fn simple_from() {
    let f = fixture();
    check(&select([&f.users]), "SELECT users.id, users.name FROM users", vec![]);
}

#[test]
fn simple_where() {
    let f = fixture();
    let q = select([&f.users]).and_where(eq(f.users.column("name").unwrap(), "foo"));
    check(
        &q,
        "SELECT users.id, users.name FROM users WHERE users.name = ?",
        vec![Value::from("foo")],
    );
}

#[test]
fn multiple_where_conditions_are_anded() {
    let f = fixture();
    let name = f.users.column("name").unwrap();
    let id = f.users.column("id").unwrap();
    let q = select([&f.users])
        .and_where(in_list(&name, ["a", "b"]))
        .and_where(and(ne(&id, 1), is_not_null(&name)));
    check(
        &q,
        "SELECT users.id, users.name FROM users WHERE users.name IN (?, ?) \
         AND (users.id != ? AND users.name IS NOT NULL)",
        vec![Value::from("a"), Value::from("b"), Value::Int(1)],
    );
}

#[test]
fn simple_group_by() {
    let f = fixture();
    let q = select([&f.users]).group_by([f.users.column("name").unwrap()]);
    check(&q, "SELECT users.id, users.name FROM users GROUP BY users.name", vec![]);
}

#[test]
fn group_by_suppresses_projection_alias() {
    let f = fixture();
    let name = f.users.column("name").unwrap().alias("user_name");
    let q = select([&name]).group_by([&name]);
    check(
        &q,
        "SELECT users.name AS user_name FROM users GROUP BY users.name",
        vec![],
    );
}

#[test]
fn simple_order_by() {
    let f = fixture();
    let q = select([&f.users]).order_by([f.users.column("name").unwrap().desc()]);
    check(
        &q,
        "SELECT users.id, users.name FROM users ORDER BY users.name DESC",
        vec![],
    );
}

#[test]
fn simple_limit() {
    let f = fixture();
    check(
        &select([&f.users]).limit(10),
        "SELECT users.id, users.name FROM users LIMIT ?",
        vec![Value::Int(10)],
    );
}

#[test]
fn limit_with_offset() {
    let f = fixture();
    check(
        &select([&f.users]).limit_with_offset(10, 20),
        "SELECT users.id, users.name FROM users LIMIT ? OFFSET ?",
        vec![Value::Int(10), Value::Int(20)],
    );
}

#[test]
fn named_derived_table() {
    let f = fixture();
    let q = select([select([&f.users]).alias("u")]);
    check(
        &q,
        "SELECT u.id, u.name FROM (SELECT users.id, users.name FROM users) AS u",
        vec![],
    );
}

#[test]
fn unnamed_derived_tables() {
    let f = fixture();
    let q = select([select([&f.users])]);
    check(
        &q,
        "SELECT derived0.id, derived0.name FROM (SELECT users.id, users.name FROM users) AS derived0",
        vec![],
    );

    let q = select([select([&f.users]), select([&f.article_states])]);
    check(
        &q,
        "SELECT derived0.id, derived0.name, derived1.id, derived1.name \
         FROM (SELECT users.id, users.name FROM users) AS derived0, \
         (SELECT article_states.id, article_states.name FROM article_states) AS derived1",
        vec![],
    );
}

#[test]
fn derived_table_arguments_come_first() {
    let f = fixture();
    let inner = select([&f.users]).and_where(eq(f.users.column("id").unwrap(), 5));
    let q = select([inner.alias("u")]).limit(1);
    check(
        &q,
        "SELECT u.id, u.name FROM (SELECT users.id, users.name FROM users WHERE users.id = ?) AS u \
         LIMIT ?",
        vec![Value::Int(5), Value::Int(1)],
    );
}

#[test]
fn join_against_no_selection() {
    let f = fixture();
    let q = sqlb::select![].join(
        &f.users,
        eq(f.articles.column("author").unwrap(), f.users.column("id").unwrap()),
    );
    assert!(!q.is_valid());
    assert_eq!(q.error(), Some(&SqlError::JoinNoSelection));
    assert!(q.error().unwrap().is_join_error());
}

#[test]
fn join_against_unknown_target() {
    let f = fixture();
    let q = select([&f.article_states]).join(
        &f.users,
        eq(f.articles.column("author").unwrap(), f.users.column("id").unwrap()),
    );
    assert!(!q.is_valid());
    assert_eq!(q.error(), Some(&SqlError::JoinUnknownTarget));
    assert_eq!(q.to_sql(), "");
}

#[test]
fn simple_inner_join() {
    let f = fixture();
    let q = sqlb::select![
        f.articles.column("id").unwrap(),
        f.users.column("name").unwrap().alias("author"),
    ]
    .join(
        &f.users,
        eq(f.articles.column("author").unwrap(), f.users.column("id").unwrap()),
    );
    check(
        &q,
        "SELECT articles.id, users.name AS author FROM articles \
         JOIN users ON articles.author = users.id",
        vec![],
    );
}

#[test]
fn two_joins() {
    let f = fixture();
    let q = sqlb::select![
        f.articles.column("id").unwrap(),
        f.users.column("name").unwrap().alias("author"),
        f.article_states.column("name").unwrap().alias("state"),
    ]
    .join(
        &f.users,
        eq(f.articles.column("author").unwrap(), f.users.column("id").unwrap()),
    )
    .join(
        &f.article_states,
        eq(
            f.articles.column("state").unwrap(),
            f.article_states.column("id").unwrap(),
        ),
    );
    check(
        &q,
        "SELECT articles.id, users.name AS author, article_states.name AS state \
         FROM articles JOIN users ON articles.author = users.id \
         JOIN article_states ON articles.state = article_states.id",
        vec![],
    );
}

#[test]
fn join_pulls_in_unprojected_table() {
    let f = fixture();
    let q = select([&f.articles]).left_join(
        &f.users,
        eq(f.articles.column("author").unwrap(), f.users.column("id").unwrap()),
    );
    check(
        &q,
        "SELECT articles.id, articles.author, articles.state, users.id, users.name \
         FROM articles LEFT JOIN users ON articles.author = users.id",
        vec![],
    );
}

#[test]
fn join_on_joined_table() {
    let f = fixture();
    let q = select([&f.article_states])
        .join(
            &f.articles,
            eq(
                f.articles.column("state").unwrap(),
                f.article_states.column("id").unwrap(),
            ),
        )
        .join(
            &f.users,
            eq(f.articles.column("author").unwrap(), f.users.column("id").unwrap()),
        );
    assert!(q.is_valid());
    let joins = q.statement().joins();
    assert_eq!(joins.len(), 2);
    assert_eq!(joins[1].left().id(), f.articles.id());
}

#[test]
fn self_join_with_alias() {
    let f = fixture();
    let u2 = f.users.alias("u2").unwrap();
    let q = select([f.users.column("id").unwrap()]).join(
        &u2,
        eq(f.users.column("name").unwrap(), u2.column("name").unwrap()),
    );
    check(
        &q,
        "SELECT users.id, u2.id, u2.name FROM users \
         JOIN users AS u2 ON users.name = u2.name",
        vec![],
    );
}

#[test]
fn mutation_is_reflected_on_next_render() {
    let f = fixture();
    let q = select([&f.users]);
    let (sql, args) = q.to_sql_with_args();
    assert_eq!(sql, "SELECT users.id, users.name FROM users");
    assert!(args.is_empty());

    let q = q.and_where(eq(f.users.column("id").unwrap(), 1));
    let (sql, args) = q.to_sql_with_args();
    assert_eq!(sql, "SELECT users.id, users.name FROM users WHERE users.id = ?");
    assert_eq!(args, vec![Value::Int(1)]);
}

#[test]
fn rendering_is_idempotent() {
    let f = fixture();
    let q = select([&f.users])
        .and_where(between(f.users.column("id").unwrap(), 1, 9))
        .limit_with_offset(5, 10);
    assert_eq!(q.to_sql_with_args(), q.to_sql_with_args());
}

#[test]
fn postgres_numbers_all_placeholders() {
    let f = fixture();
    let q = select([select([&f.users])
        .and_where(eq(f.users.column("name").unwrap(), "x"))
        .alias("u")])
    .limit_with_offset(10, 20)
    .dialect(Dialect::PostgreSql);
    let (sql, args) = q.to_sql_with_args();
    assert_eq!(
        sql,
        "SELECT u.id, u.name FROM (SELECT users.id, users.name FROM users \
         WHERE users.name = $1) AS u LIMIT $2 OFFSET $3"
    );
    assert_eq!(args, vec![Value::from("x"), Value::Int(10), Value::Int(20)]);

    let ctx = q.render_context();
    assert_eq!(
        sql.len(),
        q.statement().size(ctx) + Dialect::PostgreSql.interpolation_length(args.len())
    );
}

#[test]
fn many_placeholders_numbered_past_nine() {
    let f = fixture();
    let ids: Vec<i64> = (1..=12).collect();
    let q = select([&f.users])
        .and_where(in_list(f.users.column("id").unwrap(), ids))
        .dialect(Dialect::PostgreSql);
    let (sql, args) = q.to_sql_with_args();
    assert!(sql.ends_with("$9, $10, $11, $12)"));
    assert_eq!(args.len(), 12);
}

#[test]
fn trim_switches_with_dialect() {
    let f = fixture();
    let q = sqlb::select![trim(f.users.column("name").unwrap()).alias("n")];
    let my = q.to_sql_with(&RenderContext::new(Dialect::MySql));
    let pg = q.to_sql_with(&RenderContext::new(Dialect::PostgreSql));
    assert_eq!(my.0, "SELECT TRIM(users.name) AS n FROM users");
    assert_eq!(pg.0, "SELECT BTRIM(users.name) AS n FROM users");
    assert!(my.1.is_empty() && pg.1.is_empty());
}

#[test]
fn multi_line_clause_separator() {
    let f = fixture();
    let ctx = RenderContext::default().with_format(FormatOptions::new().with_clause_separator("\n"));
    let q = select([&f.articles])
        .join(
            &f.users,
            eq(f.articles.column("author").unwrap(), f.users.column("id").unwrap()),
        )
        .and_where(eq(f.users.column("name").unwrap(), "foo"))
        .order_by([f.articles.column("id").unwrap()])
        .context(ctx);
    check(
        &q,
        "SELECT articles.id, articles.author, articles.state, users.id, users.name\n\
         FROM articles\n\
         JOIN users ON articles.author = users.id\n\
         WHERE users.name = ?\n\
         ORDER BY articles.id",
        vec![Value::from("foo")],
    );
}

#[test]
fn having_follows_group_by() {
    let f = fixture();
    let name = f.users.column("name").unwrap();
    let q = sqlb::select![&name, name.count().alias("n")]
        .group_by([&name])
        .and_having(sqlb::gt(name.count(), 1));
    check(
        &q,
        "SELECT users.name, COUNT(users.name) AS n FROM users \
         GROUP BY users.name HAVING COUNT(users.name) > ?",
        vec![Value::Int(1)],
    );
}

#[test]
fn table_alias_is_checked_before_any_clause_sees_it() {
    let f = fixture();
    for bad in ["a?b", "x; DROP TABLE users; --", "1u"] {
        assert!(matches!(
            f.users.alias(bad),
            Err(SqlError::InvalidIdentifier { .. })
        ));
    }

    // Columns of a valid aliased usage may appear in every clause.
    let u2 = f.users.alias("u2").unwrap();
    let id = u2.column("id").unwrap();
    let q = select([&f.users])
        .join(&u2, eq(f.users.column("name").unwrap(), u2.column("name").unwrap()))
        .and_where(eq(&id, 1))
        .group_by([&id])
        .and_having(sqlb::gt(id.count(), 2))
        .order_by([id.desc()])
        .dialect(Dialect::PostgreSql);
    let (sql, args) = q.to_sql_with_args();
    assert_eq!(
        sql,
        "SELECT users.id, users.name, u2.id, u2.name FROM users \
         JOIN users AS u2 ON users.name = u2.name WHERE u2.id = $1 \
         GROUP BY u2.id HAVING COUNT(u2.id) > $2 ORDER BY u2.id DESC"
    );
    assert_eq!(args, vec![Value::Int(1), Value::Int(2)]);
}

#[test]
fn joining_back_to_a_joined_table_is_rejected() {
    let f = fixture();
    let author = f.articles.column("author").unwrap();
    let user_id = f.users.column("id").unwrap();
    let q = select([&f.articles])
        .join(&f.users, eq(&author, &user_id))
        .join(&f.articles, eq(&user_id, &author));
    assert_eq!(q.error(), Some(&SqlError::JoinDuplicateTarget));
    assert!(q.error().unwrap().is_join_error());
    assert!(q.build().is_err());

    let q = select([&f.articles])
        .join(&f.users, eq(&author, &user_id))
        .join(&f.users, eq(&author, &user_id));
    assert_eq!(q.error(), Some(&SqlError::JoinDuplicateTarget));
}

#[test]
fn derived_table_without_named_columns_is_rejected() {
    let q = select([sqlb::select![sqlb::count_star()]]);
    assert_eq!(
        q.error(),
        Some(&SqlError::EmptyDerivedTable("derived0".to_string()))
    );
    assert_eq!(q.to_sql(), "");

    let q = select([sqlb::select![sqlb::count_star().alias("n")]]);
    check(
        &q,
        "SELECT derived0.n FROM (SELECT COUNT(*) AS n) AS derived0",
        vec![],
    );
}
