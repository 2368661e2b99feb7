use super::*;
use crate::monitor::explain_sql;
use crate::value::Value;
use crate::value_map;
use chrono::{DateTime, TimeZone, Utc};

fn check(statement: impl Statement, expected: &str, args_len: usize) {
    let (sql, args) = statement.build().unwrap();
    assert_eq!(args.len(), args_len, "{sql}");
    assert_eq!(sql.matches('?').count(), args.len(), "{sql}");
    assert_eq!(explain_sql(&sql, &args), expected);
}

#[derive(Default)]
struct UserQuery {
    id: u64,
    email: String,
    kind_in: Vec<u8>,
    created_at_gte: Option<DateTime<Utc>>,
    name_like: String,
    email_like: String,
    status: Option<i32>,
    kind: Option<i64>,
    status_not_in: Vec<u8>,
}

impl Filter for UserQuery {
    fn table_name(&self) -> Option<&str> {
        Some("users")
    }

    fn tagged_values(&self) -> Vec<TaggedValue> {
        vec![
            TaggedValue::new("col:id", &self.id),
            TaggedValue::new("col:email", &self.email),
            TaggedValue::new("col:kind;op:in", &self.kind_in),
            TaggedValue::new("col:created_at;op:>=", &self.created_at_gte),
            TaggedValue::new("col:name; op:%{}%", &self.name_like),
            TaggedValue::new("col:email; op:{}%", &self.email_like),
            TaggedValue::new("col:status", &self.status),
            TaggedValue::new("col:kind", &self.kind),
            TaggedValue::new("col:status; op:notin", &self.status_not_in),
        ]
    }
}

#[derive(Default)]
struct User {
    id: i64,
    name: String,
    level: i32,
    status: u8,
    created_at: Option<DateTime<Utc>>,
    money: Option<String>,
}

impl Record for User {
    fn table_name(&self) -> Option<&str> {
        Some("users")
    }

    fn fields(&self) -> Vec<FieldValue> {
        vec![
            FieldValue::new("id", &self.id),
            FieldValue::new("name", &self.name),
            FieldValue::new("level", &self.level),
            FieldValue::new("status", &self.status),
            FieldValue::new("created_at", &self.created_at),
            FieldValue::new("money", &self.money),
        ]
    }
}

#[test]
fn test_select_projection() {
    check(select().from("users"), "SELECT * FROM users", 0);
    check(select().from("users").select("id"), "SELECT id FROM users", 0);
    check(
        select().from("users").select("id, name").select("gender as sex"),
        "SELECT id, name, gender as sex FROM users",
        0,
    );
    check(
        select()
            .from("users")
            .select("id, name")
            .select("gender as sex, phone")
            .select_columns(&["address", "email"]),
        "SELECT id, name, gender as sex, phone, address, email FROM users",
        0,
    );
}

#[test]
fn test_select_where() {
    check(
        select()
            .from("users")
            .and("id = ?", 1)
            .or_in("gender IN (?)", vec![1u8, 2])
            .select_columns(&["id", "name", "phone"]),
        "SELECT id, name, phone FROM users WHERE id = 1 OR gender IN (1, 2)",
        3,
    );
    check(
        select()
            .from("users")
            .and("id = ?", 1)
            .and_in("gender IN (?)", vec![vec![3, 4], vec![1, 2]]),
        "SELECT * FROM users WHERE id = 1 AND gender IN (3, 4, 1, 2)",
        5,
    );
    check(
        select()
            .from("users")
            .and("kind = 0", ())
            .and("name LIKE ?", "%vic%")
            .and_opts("id = ?", 0, &[Opt::SkipZero]),
        "SELECT * FROM users WHERE kind = 0 AND name LIKE \"%vic%\"",
        1,
    );
    check(
        select()
            .from("users")
            .and_opts("id = ?", 0, &[Opt::SkipZero])
            .and_opts("kind IN (?)", Vec::<i32>::new(), &[Opt::SkipZero])
            .and_opts("name = ?", "", &[Opt::SkipZero])
            .select("id, kind, name"),
        "SELECT id, kind, name FROM users",
        0,
    );
}

#[test]
fn test_select_join_where() {
    check(
        select()
            .from("users u")
            .and("id = ?", 1)
            .or_in("gender IN (?)", vec![1u8, 2])
            .select_columns(&["id", "name", "phone"])
            .join("projects p ON u.id = p.user_id"),
        "SELECT id, name, phone FROM users u JOIN projects p ON u.id = p.user_id WHERE id = 1 OR gender IN (1, 2)",
        3,
    );
}

#[test]
fn test_where_filter() {
    let opts = [Opt::SkipZero];
    check(
        select().filter(&UserQuery { id: 1, ..Default::default() }, &opts),
        "SELECT * FROM users WHERE id = 1",
        1,
    );
    check(
        select().filter(
            &UserQuery {
                id: 1,
                email: "vic@gmail.com".into(),
                ..Default::default()
            },
            &opts,
        ),
        "SELECT * FROM users WHERE id = 1 AND email = \"vic@gmail.com\"",
        2,
    );
    check(
        select().from("users u").filter(
            &UserQuery {
                id: 1,
                kind_in: vec![1, 2],
                ..Default::default()
            },
            &opts,
        ),
        "SELECT * FROM users u WHERE id = 1 AND kind IN (1, 2)",
        3,
    );
    check(
        select().from("users u").filter(
            &UserQuery {
                id: 1,
                created_at_gte: Some(Utc.with_ymd_and_hms(2021, 7, 31, 12, 30, 3).unwrap()),
                ..Default::default()
            },
            &opts,
        ),
        "SELECT * FROM users u WHERE id = 1 AND created_at >= \"2021-07-31 12:30:03\"",
        2,
    );
    check(
        select().filter(
            &UserQuery {
                id: 1,
                name_like: "vic".into(),
                ..Default::default()
            },
            &opts,
        ),
        "SELECT * FROM users WHERE id = 1 AND name LIKE \"%vic%\"",
        2,
    );
    check(
        select().from("profiles").filter(
            &UserQuery {
                id: 1,
                email_like: "vic".into(),
                ..Default::default()
            },
            &opts,
        ),
        "SELECT * FROM profiles WHERE id = 1 AND email LIKE \"vic%\"",
        2,
    );
    check(
        select().from("profiles").filter(
            &UserQuery {
                status: Some(0),
                ..Default::default()
            },
            &opts,
        ),
        "SELECT * FROM profiles WHERE status = 0",
        1,
    );
    check(
        select().from("profiles").filter(
            &UserQuery {
                status_not_in: vec![1, 2],
                ..Default::default()
            },
            &opts,
        ),
        "SELECT * FROM profiles WHERE status NOT IN (1, 2)",
        2,
    );
}

#[test]
fn test_filter_require() {
    let err = select()
        .filter(&UserQuery { id: 1, ..Default::default() }, &[Opt::Require])
        .build()
        .unwrap_err();
    assert_eq!(err.to_string(), "email cannot be empty");
}

#[test]
fn test_skip_zero_then_require() {
    let err = select()
        .from("users")
        .and_opts("name = ?", "", &[Opt::SkipZero, Opt::Require])
        .build()
        .unwrap_err();
    assert_eq!(err, crate::BuildError::Required { column: "name".into() });

    check(
        select()
            .from("users")
            .and_opts("name = ?", "vic", &[Opt::SkipZero, Opt::Require]),
        "SELECT * FROM users WHERE name = \"vic\"",
        1,
    );
}

#[test]
fn test_filter_prefix() {
    check(
        select().from("users u").filter(
            &UserQuery {
                id: 9,
                kind: Some(3),
                ..Default::default()
            },
            &[Opt::SkipZero, Opt::prefix("u")],
        ),
        "SELECT * FROM users u WHERE u.id = 9 AND u.kind = 3",
        2,
    );
}

#[test]
fn test_sub_query() {
    let stat = select()
        .from("account")
        .select("AVG(amount) sum, user_id")
        .group_by("user_id");
    let profiles = select().select("user_id").from("profiles").and("kind = ?", 0);

    check(
        select().from_query("( ? ) stat", &stat).and("user_id = ?", 100),
        "SELECT * FROM ( SELECT AVG(amount) sum, user_id FROM account GROUP BY user_id ) stat WHERE user_id = 100",
        1,
    );
    check(
        select()
            .from("users")
            .and("id IN (?)", &profiles)
            .and_in("status IN (?)", vec![1u8, 2]),
        "SELECT * FROM users WHERE id IN (SELECT user_id FROM profiles WHERE kind = 0) AND status IN (1, 2)",
        3,
    );
    check(
        select()
            .from_query("( ? ) stat", &stat)
            .and("user_id IN (?)", &profiles)
            .and_in("status IN (?)", vec![1u8, 2]),
        "SELECT * FROM ( SELECT AVG(amount) sum, user_id FROM account GROUP BY user_id ) stat WHERE user_id IN (SELECT user_id FROM profiles WHERE kind = 0) AND status IN (1, 2)",
        3,
    );
    check(
        select()
            .from("users")
            .join_query(
                JoinKind::Inner,
                "(?) u1 ON users.id = u1.id",
                &select().from("users").select("id").limit_offset(100, 10000),
            )
            .and("status = ?", 1),
        "SELECT * FROM users JOIN (SELECT id FROM users LIMIT 100 OFFSET 10000) u1 ON users.id = u1.id WHERE status = 1",
        1,
    );
}

#[test]
fn test_sub_query_error_propagates() {
    let broken = select().and("id = ?", 1);
    let err = select().from("users").and("id IN (?)", &broken).build().unwrap_err();
    assert_eq!(err, crate::BuildError::EmptyTable { statement: "select" });
}

#[test]
fn test_other_clauses() {
    check(
        select().from("users").order_by("id DESC").order_by("created_at ASC"),
        "SELECT * FROM users ORDER BY id DESC, created_at ASC",
        0,
    );
    check(
        select()
            .select("id, status")
            .from("users")
            .group_by("id")
            .order_by("id DESC, created_at ASC")
            .group_by("status"),
        "SELECT id, status FROM users GROUP BY id, status ORDER BY id DESC, created_at ASC",
        0,
    );
    check(
        select()
            .select("id, status")
            .from("users")
            .group_by("id")
            .limit_offset(100, 1)
            .group_by("status")
            .lock(LockMode::ForUpdate),
        "SELECT id, status FROM users GROUP BY id, status LIMIT 100 OFFSET 1 FOR UPDATE",
        0,
    );
    check(
        select().from("users").lock(LockMode::ShareMode),
        "SELECT * FROM users LOCK IN SHARE MODE",
        0,
    );
}

#[test]
fn test_union() {
    check(
        select()
            .from("users")
            .and("s_user_id = ?", 1)
            .union_all(select().from("users").and("b_user_id = ?", 1)),
        "(SELECT * FROM users WHERE s_user_id = 1) UNION ALL (SELECT * FROM users WHERE b_user_id = 1)",
        2,
    );
    check(
        select()
            .from("users")
            .and("s_user_id = ?", 1)
            .union(select().from("users").and("b_user_id = ?", 1))
            .union(select().from("users").and("b_user_id = ?", 2)),
        "(SELECT * FROM users WHERE s_user_id = 1) UNION (SELECT * FROM users WHERE b_user_id = 1) UNION (SELECT * FROM users WHERE b_user_id = 2)",
        3,
    );
    check(
        select()
            .from("users")
            .and("s_user_id = ?", 1)
            .order_by("id")
            .limit_offset(100, 0)
            .union_all(
                select()
                    .from("users")
                    .and("b_user_id = ?", 1)
                    .order_by("id")
                    .limit_offset(100, 0),
            ),
        "(SELECT * FROM users WHERE s_user_id = 1 ORDER BY id LIMIT 100) UNION ALL (SELECT * FROM users WHERE b_user_id = 1 ORDER BY id LIMIT 100)",
        2,
    );
}

#[test]
fn test_update() {
    check(
        update().table("users").set("name", "vic").and("id = ?", 1),
        "UPDATE users SET name = \"vic\" WHERE id = 1",
        2,
    );
    check(
        update()
            .and_in("status IN (?)", vec![1, 2, 3])
            .table("users")
            .set_expr("phone = 1234", ())
            .set_expr("name = ?", "haha"),
        "UPDATE users SET phone = 1234, name = \"haha\" WHERE status IN (1, 2, 3)",
        4,
    );
    check(
        update()
            .table("users")
            .set("level", 1)
            .set_opts("status", 0, &[Opt::SkipZero]),
        "UPDATE users SET level = 1",
        1,
    );
    check(
        update()
            .filter(&UserQuery { id: 1, ..Default::default() }, &[Opt::SkipZero])
            .set("level", 1)
            .set_opts("status", 0, &[Opt::SkipZero]),
        "UPDATE users SET level = 1 WHERE id = 1",
        2,
    );
}

#[test]
fn test_update_with() {
    check(
        update()
            .set_all(
                &User {
                    name: "vic".into(),
                    level: 2,
                    ..Default::default()
                },
                &[Opt::SkipZero],
            )
            .and("id = ?", 1),
        "UPDATE users SET name = \"vic\", level = 2 WHERE id = 1",
        3,
    );
    check(
        update()
            .set_all(
                &User {
                    status: 2,
                    money: Some("100".into()),
                    ..Default::default()
                },
                &[Opt::SkipZero],
            )
            .and("id = ?", 1),
        "UPDATE users SET status = 2, money = \"100\" WHERE id = 1",
        3,
    );
    check(
        update()
            .table("users")
            .set_map(&value_map! { "level" => 1, "id" => 2 }, &[])
            .and("id = ?", 1),
        "UPDATE users SET level = 1, id = 2 WHERE id = 1",
        3,
    );
}

#[test]
fn test_update_explicit_table_wins() {
    let sql = update()
        .table("archived_users")
        .set_all(&User { level: 1, ..Default::default() }, &[Opt::SkipZero])
        .to_sql()
        .unwrap();
    assert_eq!(sql, "UPDATE archived_users SET level = ?");
}

#[test]
fn test_insert() {
    check(
        insert()
            .table("users")
            .rows(value_map! { "id" => 1, "user_id" => 1, "name" => "vic" }),
        "INSERT INTO users (id, user_id, name) VALUES (1, 1, \"vic\")",
        3,
    );
    check(
        insert().rows(&User {
            name: "vic".into(),
            level: 1,
            status: 1,
            money: Some("100".into()),
            ..Default::default()
        }),
        "INSERT INTO users (name, level, status, money) VALUES (\"vic\", 1, 1, \"100\")",
        4,
    );
    let users = vec![
        User {
            name: "vic".into(),
            level: 1,
            status: 1,
            money: Some("100".into()),
            ..Default::default()
        },
        User {
            name: "vic2".into(),
            level: 2,
            status: 2,
            money: Some("200".into()),
            ..Default::default()
        },
    ];
    check(
        insert().rows(&users),
        "INSERT INTO users (name, level, status, money) VALUES (\"vic\", 1, 1, \"100\"), (\"vic2\", 2, 2, \"200\")",
        8,
    );
    check(
        insert().table("users").rows(vec![
            value_map! { "id" => 1, "user_id" => 1, "name" => "vic" },
            value_map! { "id" => 2, "user_id" => 2, "name" => "vic2" },
        ]),
        "INSERT INTO users (id, user_id, name) VALUES (1, 1, \"vic\"), (2, 2, \"vic2\")",
        6,
    );
}

#[test]
fn test_insert_records_with_different_zero_fields() {
    let users = [
        User {
            name: "a".into(),
            level: 1,
            ..Default::default()
        },
        User {
            name: "b".into(),
            ..Default::default()
        },
    ];
    let err = insert().rows(&users[..]).build().unwrap_err();
    assert_eq!(err, crate::BuildError::RowShapeMismatch { row: 1 });
}

#[test]
fn test_delete() {
    check(
        delete().table("users").and("id = ?", 1),
        "DELETE FROM users WHERE id = 1",
        1,
    );
    check(
        delete()
            .filter(&UserQuery { kind_in: vec![3], ..Default::default() }, &[Opt::SkipZero]),
        "DELETE FROM users WHERE kind IN (3)",
        1,
    );
}

#[test]
fn test_args_are_values() {
    let (_, args) = select()
        .from("t")
        .and("a = ?", Some(5i64))
        .and("b = ?", None::<i64>)
        .build()
        .unwrap();
    assert_eq!(args, vec![Value::Int(5), Value::Null]);
}
