//! Engine dialects - the SQL syntax choices that differ between backends
//!
//! Everything here is pure string and descriptor generation. A dialect is an
//! engine tag plus a handful of functions switching on it: identifier
//! quoting, generated-primary-key DDL, string concatenation, and the shape of
//! the connection target. The store consumes these fragments; nothing in this
//! module touches a database.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// Supported database engines.
///
/// Only the SQLite-family engines can be opened by this crate (the bundled
/// driver); the others are dialect targets for SQL generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    Postgres,
    MariaDb,
    MySql,
    /// File-backed SQLite.
    Sqlite,
    /// In-memory SQLite.
    SqliteMemory,
    /// File-backed H2 (embedded JVM engine, dialect target only).
    H2File,
    /// Named in-memory H2 (dialect target only).
    H2Memory,
}

/// Where a connection for an engine points.
///
/// Network engines address a host and port; embedded engines address a file
/// or an in-memory database name, and have no port concept at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectTarget {
    Tcp {
        host: String,
        port: u16,
        database: String,
    },
    File(PathBuf),
    Memory(String),
}

impl Engine {
    /// All known engines, in menu order.
    pub fn all() -> &'static [Engine] {
        &[
            Engine::Postgres,
            Engine::MariaDb,
            Engine::MySql,
            Engine::Sqlite,
            Engine::SqliteMemory,
            Engine::H2File,
            Engine::H2Memory,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Engine::Postgres => "postgres",
            Engine::MariaDb => "mariadb",
            Engine::MySql => "mysql",
            Engine::Sqlite => "sqlite",
            Engine::SqliteMemory => "sqlitememory",
            Engine::H2File => "h2file",
            Engine::H2Memory => "h2memory",
        }
    }

    /// Driver identity tag, shared by engines of the same family.
    pub fn driver(&self) -> &'static str {
        match self {
            Engine::Postgres => "postgres",
            Engine::MariaDb => "mariadb",
            Engine::MySql => "mysql",
            Engine::Sqlite | Engine::SqliteMemory => "sqlite",
            Engine::H2File | Engine::H2Memory => "h2",
        }
    }

    /// True for engines that address a file or in-memory database rather
    /// than a network host.
    pub fn is_embedded(&self) -> bool {
        matches!(
            self,
            Engine::Sqlite | Engine::SqliteMemory | Engine::H2File | Engine::H2Memory
        )
    }

    /// True for the engines the bundled SQLite driver can actually open.
    pub fn runs_on_bundled_driver(&self) -> bool {
        matches!(self, Engine::Sqlite | Engine::SqliteMemory)
    }

    /// Default port of the engine's network listener.
    ///
    /// # Panics
    ///
    /// Panics for embedded engines: asking a file or in-memory engine for a
    /// port is a programming error, not a recoverable condition.
    pub fn default_port(&self) -> u16 {
        match self {
            Engine::Postgres => 5432,
            Engine::MariaDb | Engine::MySql => 3306,
            _ => panic!("no port for {}: direct access to the file system", self),
        }
    }

    /// Connection descriptor for the engine. `host` and `port` are ignored
    /// by embedded engines.
    pub fn connect_target(&self, host: &str, port: u16, database: &str) -> ConnectTarget {
        match self {
            Engine::Postgres | Engine::MariaDb | Engine::MySql => ConnectTarget::Tcp {
                host: host.to_string(),
                port,
                database: database.to_string(),
            },
            Engine::Sqlite | Engine::H2File => ConnectTarget::File(PathBuf::from(database)),
            Engine::SqliteMemory | Engine::H2Memory => {
                ConnectTarget::Memory(database.to_string())
            }
        }
    }

    /// Connection URL form for the engine.
    pub fn url(&self, host: &str, port: u16, database: &str) -> String {
        match self {
            Engine::Postgres | Engine::MariaDb | Engine::MySql => {
                format!("{}://{}:{}/{}", self.driver(), host, port, database)
            }
            Engine::Sqlite => format!("sqlite:{}", database),
            Engine::SqliteMemory => "sqlite::memory:".to_string(),
            Engine::H2File => format!("h2:file:{}", database),
            Engine::H2Memory => format!("h2:mem:{}", database),
        }
    }

    /// The character wrapping identifiers (table and column names).
    /// ANSI engines use the double quote, the MySQL family the backquote.
    pub fn identifier_quote(&self) -> char {
        match self {
            Engine::MariaDb | Engine::MySql => '`',
            _ => '"',
        }
    }

    /// Wrap `name` in the engine's identifier quote, doubling any embedded
    /// quote character.
    pub fn quote_identifier(&self, name: &str) -> String {
        let quote = self.identifier_quote();
        let mut quoted = String::with_capacity(name.len() + 2);
        quoted.push(quote);
        for c in name.chars() {
            quoted.push(c);
            if c == quote {
                quoted.push(quote);
            }
        }
        quoted.push(quote);
        quoted
    }

    /// Column definition producing a database-assigned integer primary key.
    /// `column` is used verbatim; quote it first if it needs quoting.
    pub fn generated_pk_column(&self, column: &str) -> String {
        match self {
            Engine::Postgres => {
                format!("{} INTEGER PRIMARY KEY GENERATED ALWAYS AS IDENTITY", column)
            }
            Engine::MariaDb | Engine::MySql => {
                format!("{} INTEGER PRIMARY KEY AUTO_INCREMENT", column)
            }
            Engine::Sqlite | Engine::SqliteMemory => {
                format!("{} INTEGER PRIMARY KEY AUTOINCREMENT", column)
            }
            Engine::H2File | Engine::H2Memory => format!("{} IDENTITY", column),
        }
    }

    /// String concatenation of two SQL expressions.
    pub fn concat_expression(&self, a: &str, b: &str) -> String {
        match self {
            Engine::Postgres | Engine::H2File | Engine::H2Memory => format!("{} || {}", a, b),
            _ => format!("CONCAT({} , {})", a, b),
        }
    }

    /// Whether the engine accepts `ALTER TABLE ... ADD CONSTRAINT`.
    /// SQLite does not; foreign keys must be declared inline at CREATE time.
    pub fn supports_alter_add_constraint(&self) -> bool {
        !matches!(self, Engine::Sqlite | Engine::SqliteMemory)
    }
}

impl FromStr for Engine {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Engine::Postgres),
            "mariadb" => Ok(Engine::MariaDb),
            "mysql" => Ok(Engine::MySql),
            "sqlite" => Ok(Engine::Sqlite),
            "sqlitememory" | "sqlite-memory" | "memory" => Ok(Engine::SqliteMemory),
            "h2file" | "h2-file" | "h2" => Ok(Engine::H2File),
            "h2memory" | "h2-memory" | "h2mem" => Ok(Engine::H2Memory),
            _ => Err(crate::Error::UnknownEngine(s.to_string())),
        }
    }
}

impl std::fmt::Display for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_roundtrip() {
        for engine in Engine::all() {
            let parsed: Engine = engine.as_str().parse().unwrap();
            assert_eq!(*engine, parsed);
        }
    }

    #[test]
    fn test_quote_plain_identifier() {
        assert_eq!(Engine::Postgres.quote_identifier("user"), "\"user\"");
        assert_eq!(Engine::MariaDb.quote_identifier("user"), "`user`");
        assert_eq!(Engine::Sqlite.quote_identifier("role"), "\"role\"");
    }

    #[test]
    fn test_quote_doubles_embedded_quotes() {
        assert_eq!(Engine::Postgres.quote_identifier("a\"b"), "\"a\"\"b\"");
        assert_eq!(Engine::MySql.quote_identifier("a`b"), "`a``b`");
        // The other family's quote character is data, not a delimiter.
        assert_eq!(Engine::MySql.quote_identifier("a\"b"), "`a\"b`");
    }

    #[test]
    fn test_generated_pk_syntax_per_family() {
        let pg = Engine::Postgres.generated_pk_column("id");
        assert!(pg.contains("GENERATED ALWAYS AS IDENTITY"));
        let maria = Engine::MariaDb.generated_pk_column("id");
        assert!(maria.contains("AUTO_INCREMENT"));
        let lite = Engine::Sqlite.generated_pk_column("id");
        assert!(lite.contains("AUTOINCREMENT"));
        let h2 = Engine::H2Memory.generated_pk_column("id");
        assert_eq!(h2, "id IDENTITY");
    }

    #[test]
    fn test_concat_syntax() {
        assert_eq!(Engine::Postgres.concat_expression("a", "b"), "a || b");
        assert_eq!(Engine::H2File.concat_expression("a", "b"), "a || b");
        assert_eq!(Engine::MySql.concat_expression("a", "b"), "CONCAT(a , b)");
        assert_eq!(Engine::Sqlite.concat_expression("a", "b"), "CONCAT(a , b)");
    }

    #[test]
    fn test_connect_target_shapes() {
        match Engine::Postgres.connect_target("db.example.com", 5432, "likes") {
            ConnectTarget::Tcp { host, port, database } => {
                assert_eq!(host, "db.example.com");
                assert_eq!(port, 5432);
                assert_eq!(database, "likes");
            }
            other => panic!("expected tcp target, got {:?}", other),
        }

        // Embedded engines ignore host and port entirely.
        match Engine::Sqlite.connect_target("ignored", 9999, "likes.db") {
            ConnectTarget::File(path) => assert_eq!(path, PathBuf::from("likes.db")),
            other => panic!("expected file target, got {:?}", other),
        }

        match Engine::H2Memory.connect_target("ignored", 9999, "test") {
            ConnectTarget::Memory(name) => assert_eq!(name, "test"),
            other => panic!("expected memory target, got {:?}", other),
        }
    }

    #[test]
    fn test_url_forms() {
        assert_eq!(
            Engine::Postgres.url("localhost", 5432, "likes"),
            "postgres://localhost:5432/likes"
        );
        assert_eq!(
            Engine::MariaDb.url("localhost", 3306, "likes"),
            "mariadb://localhost:3306/likes"
        );
        assert_eq!(Engine::Sqlite.url("", 0, "likes.db"), "sqlite:likes.db");
        assert_eq!(Engine::SqliteMemory.url("", 0, "ignored"), "sqlite::memory:");
        assert_eq!(Engine::H2File.url("", 0, "likes"), "h2:file:likes");
        assert_eq!(Engine::H2Memory.url("", 0, "test"), "h2:mem:test");
    }

    #[test]
    fn test_default_ports() {
        assert_eq!(Engine::Postgres.default_port(), 5432);
        assert_eq!(Engine::MariaDb.default_port(), 3306);
        assert_eq!(Engine::MySql.default_port(), 3306);
    }

    #[test]
    #[should_panic(expected = "no port")]
    fn test_no_port_for_file_engine() {
        Engine::Sqlite.default_port();
    }

    #[test]
    #[should_panic(expected = "no port")]
    fn test_no_port_for_memory_engine() {
        Engine::H2Memory.default_port();
    }
}
