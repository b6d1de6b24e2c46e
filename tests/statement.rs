use sqlite_driver::{Connection, Error, ErrorKind, Outcome, State, Type, Value};

mod common;

use common::{count_users, execute, setup_users};

macro_rules! ok(($result:expr) => ($result.unwrap()));

#[test]
fn bind_and_read_back() {
    let connection = ok!(Connection::open(":memory:"));
    let mut statement = ok!(connection.prepare("SELECT ?, ?, ?, ?, ?, ?, ?, ?"));
    assert_eq!(statement.parameter_count(), 8);

    let mut cursor = ok!(statement.query(&[
        Value::Null,
        Value::Boolean(true),
        Value::Boolean(false),
        Value::Integer(i64::MIN),
        Value::Float(1.1),
        Value::String("foo".into()),
        Value::Binary(b"foo".to_vec()),
        Value::Binary(vec![0x00, 0xff, 0x42]),
    ]));
    let row = ok!(ok!(cursor.next()));
    assert_eq!(
        Vec::<Value>::from(row),
        vec![
            Value::Null,
            Value::Integer(1),
            Value::Integer(0),
            Value::Integer(i64::MIN),
            Value::Float(1.1),
            Value::String("foo".into()),
            Value::Binary(b"foo".to_vec()),
            Value::Binary(vec![0x00, 0xff, 0x42]),
        ]
    );
    assert!(cursor.next().is_none());
}

#[test]
fn bind_empty_text_and_binary() {
    let connection = ok!(Connection::open(":memory:"));
    let mut statement = ok!(connection.prepare("SELECT ?, ?, typeof(?), typeof(?)"));
    let values = [
        Value::String(String::new()),
        Value::Binary(Vec::new()),
        Value::String(String::new()),
        Value::Binary(Vec::new()),
    ];
    let row = ok!(ok!(ok!(statement.query(&values)).next()));
    assert_eq!(row[0], Value::String(String::new()));
    assert_eq!(row[1], Value::Binary(Vec::new()));
    assert_eq!(row.read::<&str, _>(2), "text");
    assert_eq!(row.read::<&str, _>(3), "blob");
}

#[test]
fn bind_text_with_multibyte_characters() {
    let connection = ok!(Connection::open(":memory:"));
    let mut statement = ok!(connection.prepare("SELECT ?, length(?)"));
    let text = "日本語 ✓";
    let row = ok!(ok!(ok!(statement.query(&[text.into(), text.into()])).next()));
    assert_eq!(row.read::<&str, _>(0), text);
    assert_eq!(row.read::<i64, _>(1), 5);
}

#[test]
fn bind_too_few() {
    let connection = ok!(Connection::open(":memory:"));
    setup_users(&connection);
    let mut statement = ok!(connection.prepare("INSERT INTO users VALUES (?, ?, ?, ?, ?)"));

    match statement.exec(&[Value::Integer(2), Value::String("Bob".into())]) {
        Err(Error::ArgumentCount {
            expected,
            given,
            position,
            ..
        }) => {
            assert_eq!(expected, 5);
            assert_eq!(given, 2);
            assert_eq!(position, 2);
        }
        _ => unreachable!(),
    }
    assert_eq!(count_users(&connection), 1);
}

#[test]
fn bind_too_many() {
    let connection = ok!(Connection::open(":memory:"));
    let mut statement = ok!(connection.prepare("SELECT ?"));

    match statement.query(&[Value::Integer(1), Value::Integer(2)]) {
        Err(Error::ArgumentCount { position, .. }) => assert_eq!(position, 1),
        _ => unreachable!(),
    }
    match statement.exec(&[]) {
        Err(Error::ArgumentCount { position, .. }) => assert_eq!(position, 0),
        _ => unreachable!(),
    }
}

#[test]
fn exec_insert_and_update() {
    let connection = ok!(Connection::open(":memory:"));
    execute(
        &connection,
        "CREATE TABLE t (id INTEGER PRIMARY KEY, v INTEGER NOT NULL)",
        &[],
    );

    let mut statement = ok!(connection.prepare("INSERT INTO t (v) VALUES (?)"));
    for i in 1..4 {
        let outcome = ok!(statement.exec(&[Value::Integer(i * 10)]));
        assert_eq!(
            outcome,
            Outcome {
                rows_affected: 1,
                last_insert_id: i,
            }
        );
    }
    ok!(statement.close());

    let outcome = execute(&connection, "INSERT INTO t VALUES (42, 0)", &[]);
    assert_eq!(outcome.last_insert_id, 42);
    assert_eq!(connection.last_insert_id(), 42);

    let outcome = execute(
        &connection,
        "UPDATE t SET v = v + 1 WHERE v >= ?",
        &[Value::Integer(20)],
    );
    assert_eq!(outcome.rows_affected, 2);

    let outcome = execute(&connection, "UPDATE t SET v = 0 WHERE v > 1000", &[]);
    assert_eq!(outcome.rows_affected, 0);
}

#[test]
fn exec_discards_rows() {
    let connection = ok!(Connection::open(":memory:"));
    setup_users(&connection);
    let mut statement = ok!(connection.prepare("SELECT * FROM users"));
    ok!(statement.exec(&[]));

    // The statement has been reset, so writes on the connection proceed.
    execute(
        &connection,
        "INSERT INTO users VALUES (2, 'Bob', NULL, NULL, NULL)",
        &[],
    );
    assert_eq!(count_users(&connection), 2);
}

#[test]
fn exec_failure_then_retry() {
    let connection = ok!(Connection::open(":memory:"));
    execute(&connection, "CREATE TABLE t (v INTEGER UNIQUE)", &[]);
    let mut statement = ok!(connection.prepare("INSERT INTO t VALUES (?)"));
    ok!(statement.exec(&[Value::Integer(1)]));

    match statement.exec(&[Value::Integer(1)]) {
        Err(Error::Exec { query, status }) => {
            assert_eq!(query, "INSERT INTO t VALUES (?)");
            assert_eq!(status.kind, ErrorKind::Constraint);
            assert!(status.message.contains("UNIQUE"));
        }
        _ => unreachable!(),
    }

    let outcome = ok!(statement.exec(&[Value::Integer(2)]));
    assert_eq!(outcome.rows_affected, 1);
}

#[test]
fn query_restarts() {
    let connection = ok!(Connection::open(":memory:"));
    setup_users(&connection);
    execute(
        &connection,
        "INSERT INTO users VALUES (2, 'Bob', NULL, NULL, NULL)",
        &[],
    );
    let mut statement = ok!(connection.prepare("SELECT name FROM users ORDER BY id"));

    {
        let mut cursor = ok!(statement.query(&[]));
        let mut row = vec![Value::Null];
        assert_eq!(ok!(cursor.advance(&mut row)), State::Row);
        assert_eq!(row[0], Value::String("Alice".into()));
        ok!(cursor.close());
    }

    let names = ok!(statement.query(&[]))
        .map(|row| ok!(row).read::<String, _>("name"))
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["Alice", "Bob"]);
}

#[test]
fn column_names() {
    let connection = ok!(Connection::open(":memory:"));
    setup_users(&connection);
    let statement = ok!(connection.prepare("SELECT id, name AS who, 1 + 1 FROM users"));
    assert_eq!(statement.column_count(), 3);
    assert_eq!(statement.column_names(), &["id", "who", "1 + 1"][..]);
    assert_eq!(statement.query_text(), "SELECT id, name AS who, 1 + 1 FROM users");
}

#[test]
fn error_names_type_and_position() {
    let error = Error::Bind {
        query: "SELECT ?".into(),
        position: 3,
        kind: Type::Binary,
        status: sqlite_driver::Status::from_code(25),
    };
    assert_eq!(error.kind(), Some(ErrorKind::Range));
    assert!(error
        .to_string()
        .starts_with(r#"error binding binary arg at position 3 for query "SELECT ?""#));
}

#[test]
fn close() {
    let connection = ok!(Connection::open(":memory:"));
    let statement = ok!(connection.prepare("SELECT 1"));
    ok!(statement.close());
    ok!(connection.close());
}
