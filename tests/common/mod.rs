#![allow(dead_code)]

use sqlite_driver::{Connection, Outcome, Value};

macro_rules! ok(($result:expr) => ($result.unwrap()));

pub fn execute(connection: &Connection, query: &str, values: &[Value]) -> Outcome {
    let mut statement = ok!(connection.prepare(query));
    let outcome = ok!(statement.exec(values));
    ok!(statement.close());
    outcome
}

pub fn setup_english(connection: &Connection) {
    execute(connection, "CREATE TABLE english (value TEXT)", &[]);
    execute(
        connection,
        "
        INSERT INTO english VALUES
            ('cerotype'),
            ('metatype'),
            ('ozotype'),
            ('phenotype'),
            ('plastotype'),
            ('undertype'),
            ('nonsence')
        ",
        &[],
    );
}

pub fn setup_users(connection: &Connection) {
    execute(
        connection,
        "CREATE TABLE users (id INTEGER, name TEXT, age REAL, photo BLOB, email TEXT)",
        &[],
    );
    execute(
        connection,
        "INSERT INTO users VALUES (1, 'Alice', 42.69, X'4269', NULL)",
        &[],
    );
}

pub fn pragma(connection: &Connection, name: &str) -> Value {
    let mut statement = ok!(connection.prepare(format!("PRAGMA {}", name)));
    let mut cursor = ok!(statement.query(&[]));
    let row = ok!(ok!(cursor.next()));
    row[0].clone()
}

pub fn count_users(connection: &Connection) -> i64 {
    let mut statement = ok!(connection.prepare("SELECT COUNT(*) FROM users"));
    let mut cursor = ok!(statement.query(&[]));
    let row = ok!(ok!(cursor.next()));
    row.read::<i64, _>(0)
}
