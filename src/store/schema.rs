//! Schema DDL, built through the engine dialect
//!
//! The logical schema is fixed: `role(id, name, description)`,
//! `user(id generated, login, password, description, role_id)` and the
//! directed edge table `appreciates(u1, u2)`. Everything engine-specific -
//! identifier quoting, the generated-key column, where foreign keys may be
//! declared - comes from the dialect. `user` in particular is a reserved
//! word on several engines, so every identifier goes through the quote rule.

use crate::dialect::Engine;

pub const TABLE_ROLE: &str = "role";
pub const TABLE_USER: &str = "user";
pub const TABLE_APPRECIATES: &str = "appreciates";

pub const FK_USER_ROLE: &str = "fk_user_role_id";
pub const FK_APPRECIATES_U1: &str = "fk_appreciates_u1";
pub const FK_APPRECIATES_U2: &str = "fk_appreciates_u2";

/// One of the six best-effort steps of a schema drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropStep {
    Constraint(&'static str),
    Table(&'static str),
}

impl std::fmt::Display for DropStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DropStep::Constraint(name) => write!(f, "drop constraint {}", name),
            DropStep::Table(name) => write!(f, "drop table {}", name),
        }
    }
}

fn foreign_key_clause(engine: Engine, name: &str, column: &str, target: &str) -> String {
    format!(
        "CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({})",
        engine.quote_identifier(name),
        engine.quote_identifier(column),
        engine.quote_identifier(target),
        engine.quote_identifier("id"),
    )
}

fn create_role(engine: Engine) -> String {
    format!(
        "CREATE TABLE {} (\n  {} INTEGER PRIMARY KEY,\n  {} VARCHAR(20),\n  {} TEXT\n)",
        engine.quote_identifier(TABLE_ROLE),
        engine.quote_identifier("id"),
        engine.quote_identifier("name"),
        engine.quote_identifier("description"),
    )
}

fn create_user(engine: Engine) -> String {
    let mut columns = vec![
        engine.generated_pk_column(&engine.quote_identifier("id")),
        format!("{} VARCHAR(50)", engine.quote_identifier("login")),
        format!("{} VARCHAR(40)", engine.quote_identifier("password")),
        format!("{} TEXT", engine.quote_identifier("description")),
        format!("{} INTEGER", engine.quote_identifier("role_id")),
    ];
    if !engine.supports_alter_add_constraint() {
        columns.push(foreign_key_clause(engine, FK_USER_ROLE, "role_id", TABLE_ROLE));
    }
    format!(
        "CREATE TABLE {} (\n  {}\n)",
        engine.quote_identifier(TABLE_USER),
        columns.join(",\n  "),
    )
}

fn create_appreciates(engine: Engine) -> String {
    let mut columns = vec![
        format!("{} INTEGER", engine.quote_identifier("u1")),
        format!("{} INTEGER", engine.quote_identifier("u2")),
    ];
    if !engine.supports_alter_add_constraint() {
        columns.push(foreign_key_clause(engine, FK_APPRECIATES_U1, "u1", TABLE_USER));
        columns.push(foreign_key_clause(engine, FK_APPRECIATES_U2, "u2", TABLE_USER));
    }
    format!(
        "CREATE TABLE {} (\n  {}\n)",
        engine.quote_identifier(TABLE_APPRECIATES),
        columns.join(",\n  "),
    )
}

fn add_constraint(engine: Engine, table: &str, name: &str, column: &str, target: &str) -> String {
    format!(
        "ALTER TABLE {} ADD {}",
        engine.quote_identifier(table),
        foreign_key_clause(engine, name, column, target),
    )
}

/// All statements of a schema creation, in execution order: the three
/// CREATEs, then the foreign-key additions on engines that take them as
/// separate ALTERs. On engines that do not, the keys are already inline in
/// the CREATEs and the list stops at three.
pub fn create_statements(engine: Engine) -> Vec<String> {
    let mut statements = vec![
        create_role(engine),
        create_user(engine),
        create_appreciates(engine),
    ];
    if engine.supports_alter_add_constraint() {
        statements.push(add_constraint(engine, TABLE_USER, FK_USER_ROLE, "role_id", TABLE_ROLE));
        statements.push(add_constraint(engine, TABLE_APPRECIATES, FK_APPRECIATES_U1, "u1", TABLE_USER));
        statements.push(add_constraint(engine, TABLE_APPRECIATES, FK_APPRECIATES_U2, "u2", TABLE_USER));
    }
    statements
}

/// The six drop steps, most-dependent first: the three constraints, then the
/// three tables. Every step is attempted regardless of the others; on
/// engines without ALTER ... DROP CONSTRAINT the constraint steps simply
/// fail and are reported as skipped.
pub fn drop_statements(engine: Engine) -> Vec<(DropStep, String)> {
    vec![
        (
            DropStep::Constraint(FK_USER_ROLE),
            format!(
                "ALTER TABLE {} DROP CONSTRAINT {}",
                engine.quote_identifier(TABLE_USER),
                engine.quote_identifier(FK_USER_ROLE),
            ),
        ),
        (
            DropStep::Constraint(FK_APPRECIATES_U1),
            format!(
                "ALTER TABLE {} DROP CONSTRAINT {}",
                engine.quote_identifier(TABLE_APPRECIATES),
                engine.quote_identifier(FK_APPRECIATES_U1),
            ),
        ),
        (
            DropStep::Constraint(FK_APPRECIATES_U2),
            format!(
                "ALTER TABLE {} DROP CONSTRAINT {}",
                engine.quote_identifier(TABLE_APPRECIATES),
                engine.quote_identifier(FK_APPRECIATES_U2),
            ),
        ),
        (
            DropStep::Table(TABLE_APPRECIATES),
            format!("DROP TABLE {}", engine.quote_identifier(TABLE_APPRECIATES)),
        ),
        (
            DropStep::Table(TABLE_USER),
            format!("DROP TABLE {}", engine.quote_identifier(TABLE_USER)),
        ),
        (
            DropStep::Table(TABLE_ROLE),
            format!("DROP TABLE {}", engine.quote_identifier(TABLE_ROLE)),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_inlines_foreign_keys() {
        let statements = create_statements(Engine::SqliteMemory);
        assert_eq!(statements.len(), 3);
        assert!(statements[1].contains("FOREIGN KEY"));
        assert!(statements[2].contains(FK_APPRECIATES_U1));
        assert!(statements[2].contains(FK_APPRECIATES_U2));
        assert!(statements.iter().all(|s| !s.starts_with("ALTER")));
    }

    #[test]
    fn test_alter_capable_engines_add_keys_separately() {
        let statements = create_statements(Engine::Postgres);
        assert_eq!(statements.len(), 6);
        // Creation order: tables first, then constraints.
        assert!(statements[0].starts_with("CREATE TABLE \"role\""));
        assert!(statements[1].starts_with("CREATE TABLE \"user\""));
        assert!(statements[2].starts_with("CREATE TABLE \"appreciates\""));
        assert!(statements[3..].iter().all(|s| s.starts_with("ALTER TABLE")));
        // No inline keys when they arrive via ALTER.
        assert!(!statements[1].contains("FOREIGN KEY"));
    }

    #[test]
    fn test_user_pk_uses_dialect_syntax() {
        let pg = create_statements(Engine::Postgres);
        assert!(pg[1].contains("GENERATED ALWAYS AS IDENTITY"));
        let maria = create_statements(Engine::MariaDb);
        assert!(maria[1].contains("AUTO_INCREMENT"));
        assert!(maria[1].contains("`user`"));
        let lite = create_statements(Engine::Sqlite);
        assert!(lite[1].contains("AUTOINCREMENT"));
    }

    #[test]
    fn test_drop_order_constraints_before_tables() {
        let steps = drop_statements(Engine::Postgres);
        assert_eq!(steps.len(), 6);
        assert!(matches!(steps[0].0, DropStep::Constraint(_)));
        assert!(matches!(steps[2].0, DropStep::Constraint(_)));
        assert_eq!(steps[3].0, DropStep::Table(TABLE_APPRECIATES));
        assert_eq!(steps[5].0, DropStep::Table(TABLE_ROLE));
    }
}
