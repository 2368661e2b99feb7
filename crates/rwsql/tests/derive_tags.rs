#![cfg(feature = "derive")]

use chrono::{DateTime, TimeZone, Utc};
use rwsql::{BuildError, Opt, Statement, delete, insert, select, update};

#[derive(rwsql::Filter, Default)]
#[rwsql(table = "users")]
struct UserQuery {
    #[sql("col:id")]
    id: u64,
    #[sql("col:email")]
    email: String,
    #[sql("col:kind;op:in")]
    kind_in: Vec<u8>,
    #[sql("col:created_at;op:>=")]
    created_at_gte: Option<DateTime<Utc>>,
    #[sql("col:name; op:%{}%")]
    name_like: String,
    #[sql("col:email; op:{}%")]
    email_like: String,
    #[sql("col:status")]
    status: Option<i32>,
    #[sql("col:status; op:NOTIN")]
    status_not_in: Vec<u8>,
    page: u32,
}

#[derive(rwsql::Filter)]
struct Untabled {
    #[sql("col:id")]
    id: i64,
}

#[derive(rwsql::Filter)]
#[rwsql(table = "notes")]
struct BlankTagged {
    #[sql("col:id")]
    id: i64,
    #[sql("")]
    body: String,
}

#[derive(rwsql::Record, Default)]
#[rwsql(table = "users")]
struct User {
    #[db("id")]
    id: i64,
    #[db("name")]
    name: String,
    #[db("level")]
    level: i32,
    #[db("created_at")]
    created_at: Option<DateTime<Utc>>,
    cached_rank: u32,
}

fn explain(statement: impl Statement) -> String {
    statement.explain().unwrap()
}

#[test]
fn filter_derive_uses_table_and_tags() {
    let query = UserQuery {
        id: 1,
        kind_in: vec![1, 2],
        page: 3,
        ..Default::default()
    };
    assert_eq!(
        explain(select().filter(&query, &[Opt::SkipZero])),
        "SELECT * FROM users WHERE id = 1 AND kind IN (1, 2)"
    );
    assert_eq!(query.page, 3);
}

#[test]
fn filter_derive_operators() {
    let query = UserQuery {
        created_at_gte: Some(Utc.with_ymd_and_hms(2021, 7, 31, 12, 30, 3).unwrap()),
        name_like: "vic".into(),
        email_like: "vic".into(),
        status: Some(0),
        status_not_in: vec![4, 5],
        ..Default::default()
    };
    assert_eq!(
        explain(select().from("users u").filter(&query, &[Opt::SkipZero])),
        "SELECT * FROM users u WHERE created_at >= \"2021-07-31 12:30:03\" \
         AND name LIKE \"%vic%\" AND email LIKE \"vic%\" AND status = 0 \
         AND status NOT IN (4, 5)"
    );
}

#[test]
fn filter_derive_require_and_prefix() {
    let query = UserQuery {
        id: 7,
        email: "a@b.c".into(),
        ..Default::default()
    };
    assert_eq!(
        explain(delete().filter(&query, &[Opt::SkipZero, Opt::prefix("u.")])),
        "DELETE FROM users WHERE u.id = 7 AND u.email = \"a@b.c\""
    );

    let err = select()
        .filter(&UserQuery::default(), &[Opt::Require])
        .build()
        .unwrap_err();
    assert_eq!(err, BuildError::Required { column: "id".into() });
}

#[test]
fn filter_without_table_needs_explicit_one() {
    let err = select().filter(&Untabled { id: 1 }, &[]).build().unwrap_err();
    assert_eq!(err, BuildError::EmptyTable { statement: "select" });
    assert_eq!(
        explain(select().from("t").filter(&Untabled { id: 1 }, &[])),
        "SELECT * FROM t WHERE id = 1"
    );
}

#[test]
fn blank_tag_is_skipped() {
    let query = BlankTagged {
        id: 3,
        body: "ignored".into(),
    };
    assert_eq!(rwsql::Filter::tagged_values(&query).len(), 1);
    assert_eq!(
        explain(select().filter(&query, &[])),
        "SELECT * FROM notes WHERE id = 3"
    );
    assert_eq!(query.body, "ignored");
}

#[test]
fn record_derive_insert_skips_zero_and_untagged_fields() {
    let user = User {
        name: "vic".into(),
        level: 2,
        cached_rank: 9,
        ..Default::default()
    };
    assert_eq!(
        explain(insert().rows(&user)),
        "INSERT INTO users (name, level) VALUES (\"vic\", 2)"
    );
    assert_eq!(user.cached_rank, 9);
}

#[test]
fn record_derive_update() {
    let user = User {
        id: 5,
        level: 3,
        ..Default::default()
    };
    assert_eq!(
        explain(
            update()
                .set_all(&user, &[Opt::SkipZero])
                .and("id = ?", user.id)
        ),
        "UPDATE users SET id = 5, level = 3 WHERE id = 5"
    );
}
