use std::path::PathBuf;
use std::thread;

use sqlite_driver::{Error, JournalMode, Options, Value};
use temporary::Directory;

mod common;

use common::{execute, pragma};

macro_rules! ok(($result:expr) => ($result.unwrap()));

#[test]
fn open_with_default_name() {
    sqlite_driver::register(Options::new());
    let connection = ok!(sqlite_driver::open("sqlite", ":memory:"));
    assert_eq!(connection.config().name(), "sqlite");
}

#[test]
fn open_with_custom_name() {
    let driver = sqlite_driver::register(
        Options::new()
            .with_name("lib-tests-custom")
            .with_journal_mode(JournalMode::Truncate),
    );
    assert_eq!(driver.name(), "lib-tests-custom");

    let directory = ok!(Directory::new("sqlite"));
    let connection = ok!(sqlite_driver::open(
        "lib-tests-custom",
        directory.path().join("database.sqlite3"),
    ));
    assert_eq!(pragma(&connection, "journal_mode"), Value::String("truncate".into()));
}

#[test]
fn open_without_registration() {
    match sqlite_driver::open("lib-tests-unregistered", ":memory:") {
        Err(Error::UnregisteredDriver { name }) => assert_eq!(name, "lib-tests-unregistered"),
        _ => unreachable!(),
    }
}

#[test]
fn workflow() {
    let connection = ok!(sqlite_driver::Connection::open(":memory:"));
    execute(
        &connection,
        "CREATE TABLE users (id INTEGER, name VARCHAR(255), age REAL)",
        &[],
    );

    let values = ok!(sqlite_driver::values_from_args(&[&1i32, &"Alice", &20.99f64]));
    let outcome = execute(
        &connection,
        "INSERT INTO users (id, name, age) VALUES (?, ?, ?)",
        &values,
    );
    assert_eq!(outcome.rows_affected, 1);

    let mut statement = ok!(connection.prepare("SELECT * FROM users"));
    let rows = ok!(statement.query(&[]))
        .map(|row| Vec::<Value>::from(ok!(row)))
        .collect::<Vec<_>>();
    assert_eq!(
        rows,
        vec![vec![
            Value::Integer(1),
            Value::String("Alice".into()),
            Value::Float(20.99),
        ]]
    );
}

#[test]
fn concurrent_drivers() {
    let directory = ok!(Directory::new("sqlite"));
    let names = ["lib-tests-first", "lib-tests-second"];
    for name in names.iter() {
        sqlite_driver::register(Options::new().with_name(*name));
    }

    let guards = names
        .iter()
        .map(|name| {
            let name = name.to_string();
            let path = directory.path().join(format!("{}.sqlite3", name));
            thread::spawn(move || populate(&name, path))
        })
        .collect::<Vec<_>>();
    for guard in guards {
        ok!(guard.join());
    }

    for name in names.iter() {
        let path = directory.path().join(format!("{}.sqlite3", name));
        let connection = ok!(sqlite_driver::open(name, path));
        let mut statement = ok!(connection.prepare("SELECT owner, COUNT(*) FROM t"));
        let row = ok!(ok!(ok!(statement.query(&[])).next()));
        assert_eq!(row.read::<&str, _>(0), *name);
        assert_eq!(row.read::<i64, _>(1), 100);
    }
}

fn populate(name: &str, path: PathBuf) {
    let connection = ok!(sqlite_driver::open(name, path));
    execute(&connection, "CREATE TABLE t (owner TEXT, i INTEGER)", &[]);
    let mut statement = ok!(connection.prepare("INSERT INTO t VALUES (?, ?)"));
    for i in 0..100 {
        ok!(statement.exec(&[name.into(), Value::Integer(i)]));
    }
    ok!(statement.close());
    ok!(connection.close());
}

#[test]
fn contended_writers() {
    let directory = ok!(Directory::new("sqlite"));
    let path = directory.path().join("database.sqlite3");
    {
        let connection = ok!(sqlite_driver::Connection::open(&path));
        execute(&connection, "CREATE TABLE t (i INTEGER)", &[]);
    }

    let guards = (0..10)
        .map(|i| {
            let path = path.clone();
            thread::spawn(move || {
                let connection = ok!(sqlite_driver::Connection::open(&path));
                execute(&connection, "INSERT INTO t VALUES (?)", &[Value::Integer(i)]);
            })
        })
        .collect::<Vec<_>>();
    for guard in guards {
        ok!(guard.join());
    }

    let connection = ok!(sqlite_driver::Connection::open(&path));
    let mut statement = ok!(connection.prepare("SELECT COUNT(*) FROM t"));
    let row = ok!(ok!(ok!(statement.query(&[])).next()));
    assert_eq!(row.read::<i64, _>(0), 10);
}
