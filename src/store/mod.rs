//! Relationship store - persistence for roles, users and appreciates edges
//!
//! One `Store` owns one connection and one engine dialect. All SQL is built
//! through the dialect so the same logical schema and query set runs
//! unchanged on any supported backend; the crate bundles only the SQLite
//! driver, so network engines can generate SQL here but not execute it.
//!
//! Concurrency model: one caller drives one connection. SQLite transactions
//! are serializable, so readers of an edge set never observe a partial
//! replace. Multi-statement operations scope their transaction with RAII:
//! dropping an uncommitted transaction rolls it back and restores
//! auto-commit on every exit path.

pub mod schema;

use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use tracing::{debug, info};

use crate::dialect::{ConnectTarget, Engine};
use crate::role::Role;
use crate::user::{NewUser, User};
use crate::{Error, Result};
pub use schema::DropStep;

/// Id of the seeded "admin" role.
pub const ADMIN_ROLE_ID: i64 = 1;
/// Id of the seeded "user" role, used for ordinary accounts.
pub const USER_ROLE_ID: i64 = 2;

/// Outcome of one best-effort drop step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    Dropped,
    /// The step failed (object absent, or the engine does not support the
    /// statement) and was skipped. Carries the engine's message.
    Skipped(String),
}

/// One attempted step of [`Store::drop_schema`], with its outcome. A drop is
/// idempotent, so callers get the full attempt list instead of a swallowed
/// error: "already clean" and "partially clean" stay distinguishable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropReport {
    pub step: DropStep,
    pub outcome: DropOutcome,
}

/// SQL statements of the store, rendered once per connection through the
/// engine dialect. `user` is a reserved word on several engines, which is
/// why even the DML goes through identifier quoting.
struct Queries {
    insert_role: String,
    select_roles: String,
    insert_user: String,
    delete_user: String,
    select_users: String,
    select_login: String,
    select_appreciated_by: String,
    select_who_appreciates: String,
    select_friends: String,
    delete_edges: String,
    insert_edge: String,
}

impl Queries {
    fn new(engine: Engine) -> Self {
        let q = |name: &str| engine.quote_identifier(name);
        let role = q(schema::TABLE_ROLE);
        let user = q(schema::TABLE_USER);
        let edges = q(schema::TABLE_APPRECIATES);
        let user_columns = format!(
            "{}, {}, {}, {}, {}",
            q("id"),
            q("login"),
            q("password"),
            q("description"),
            q("role_id"),
        );
        let joined_user_columns = format!(
            "u.{}, u.{}, u.{}, u.{}, u.{}",
            q("id"),
            q("login"),
            q("password"),
            q("description"),
            q("role_id"),
        );

        Self {
            insert_role: format!(
                "INSERT INTO {} ({}, {}, {}) VALUES (?1, ?2, ?3)",
                role,
                q("id"),
                q("name"),
                q("description"),
            ),
            select_roles: format!(
                "SELECT {}, {}, {} FROM {}",
                q("id"),
                q("name"),
                q("description"),
                role,
            ),
            insert_user: format!(
                "INSERT INTO {} ({}, {}, {}, {}) VALUES (?1, ?2, ?3, ?4)",
                user,
                q("login"),
                q("password"),
                q("description"),
                q("role_id"),
            ),
            delete_user: format!("DELETE FROM {} WHERE {} = ?1", user, q("id")),
            select_users: format!("SELECT {} FROM {}", user_columns, user),
            select_login: format!(
                "SELECT {} FROM {} WHERE {} = ?1 AND {} = ?2",
                user_columns,
                user,
                q("login"),
                q("password"),
            ),
            select_appreciated_by: format!(
                "SELECT {} FROM {} AS u JOIN {} AS e ON e.{} = u.{} WHERE e.{} = ?1",
                joined_user_columns,
                user,
                edges,
                q("u2"),
                q("id"),
                q("u1"),
            ),
            select_who_appreciates: format!(
                "SELECT {} FROM {} AS u JOIN {} AS e ON e.{} = u.{} WHERE e.{} = ?1",
                joined_user_columns,
                user,
                edges,
                q("u1"),
                q("id"),
                q("u2"),
            ),
            // Friendship is mutual appreciation: a target of my outgoing
            // edges that also has an edge back to me. One self-join, never
            // an application-level intersection, so the result is consistent
            // under the connection's isolation level.
            select_friends: format!(
                "SELECT {} FROM {} AS a1 \
                 JOIN {} AS a2 ON a1.{} = a2.{} \
                 JOIN {} AS u ON u.{} = a1.{} \
                 WHERE a1.{} = ?1 AND a2.{} = a1.{}",
                joined_user_columns,
                edges,
                edges,
                q("u2"),
                q("u1"),
                user,
                q("id"),
                q("u2"),
                q("u1"),
                q("u2"),
                q("u1"),
            ),
            delete_edges: format!("DELETE FROM {} WHERE {} = ?1", edges, q("u1")),
            insert_edge: format!(
                "INSERT INTO {} ({}, {}) VALUES (?1, ?2)",
                edges,
                q("u1"),
                q("u2"),
            ),
        }
    }
}

/// Store backed by a single database connection.
pub struct Store {
    conn: Connection,
    engine: Engine,
    sql: Queries,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}

impl Store {
    /// Open a file-backed database (creates the file if absent).
    pub fn open(path: &Path) -> Result<Self> {
        Self::from_connection(Connection::open(path)?, Engine::Sqlite)
    }

    /// Open an in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?, Engine::SqliteMemory)
    }

    /// Open a store for the configured engine. Host and port are ignored by
    /// embedded engines; engines without a bundled driver fail with
    /// [`Error::UnsupportedDriver`] before any connection attempt.
    pub fn connect(engine: Engine, host: &str, port: u16, database: &str) -> Result<Self> {
        if !engine.runs_on_bundled_driver() {
            return Err(Error::UnsupportedDriver(engine));
        }
        match engine.connect_target(host, port, database) {
            ConnectTarget::File(path) => Self::from_connection(Connection::open(path)?, engine),
            ConnectTarget::Memory(_) => Self::from_connection(Connection::open_in_memory()?, engine),
            ConnectTarget::Tcp { .. } => Err(Error::UnsupportedDriver(engine)),
        }
    }

    fn from_connection(conn: Connection, engine: Engine) -> Result<Self> {
        // Foreign keys are off by default in SQLite; the data model relies
        // on them being enforced.
        conn.pragma_update(None, "foreign_keys", "ON")?;
        info!(engine = %engine, "store opened");
        Ok(Self {
            conn,
            engine,
            sql: Queries::new(engine),
        })
    }

    pub fn engine(&self) -> Engine {
        self.engine
    }

    // ========== Schema lifecycle ==========

    /// Create the three tables and their foreign keys in one transaction.
    /// Any statement failure rolls back everything this call did and
    /// re-surfaces the original error.
    pub fn create_schema(&mut self) -> Result<()> {
        let statements = schema::create_statements(self.engine);
        let tx = self.conn.transaction()?;
        for statement in &statements {
            debug!(sql = statement.as_str(), "schema statement");
            tx.execute(statement, [])?;
        }
        tx.commit()?;
        info!("schema created");
        Ok(())
    }

    /// Drop the three foreign keys then the three tables, each step
    /// independent and best-effort. Never fails: absent objects (or
    /// unsupported constraint drops) are reported as skipped, so the
    /// operation is safe on a partially-created or absent schema.
    pub fn drop_schema(&self) -> Vec<DropReport> {
        let mut reports = Vec::with_capacity(6);
        for (step, statement) in schema::drop_statements(self.engine) {
            let outcome = match self.conn.execute(&statement, []) {
                Ok(_) => DropOutcome::Dropped,
                Err(err) => {
                    debug!(step = %step, error = %err, "drop step skipped");
                    DropOutcome::Skipped(err.to_string())
                }
            };
            reports.push(DropReport { step, outcome });
        }
        info!("schema dropped");
        reports
    }

    /// Drop, recreate and seed the schema.
    ///
    /// There is no transaction across the three phases: a failure during
    /// creation or seeding after a successful drop leaves an empty or
    /// partially-built schema behind. Known non-atomicity, kept as such.
    pub fn reset_database(&mut self) -> Result<Vec<DropReport>> {
        let reports = self.drop_schema();
        self.create_schema()?;
        self.seed()?;
        Ok(reports)
    }

    /// Seed the two base roles and the admin account.
    pub fn seed(&self) -> Result<()> {
        self.save_role(&Role::new(ADMIN_ROLE_ID, "admin", "administrator"))?;
        self.save_role(&Role::new(USER_ROLE_ID, "user", "regular user"))?;
        self.save_user(&NewUser::new("admin", "admin", "site administrator", ADMIN_ROLE_ID))?;
        info!("database seeded");
        Ok(())
    }

    // ========== Roles ==========

    /// Insert a role. Roles carry caller-assigned ids; inserting an id twice
    /// surfaces the engine's constraint error.
    pub fn save_role(&self, role: &Role) -> Result<()> {
        self.conn
            .execute(&self.sql.insert_role, params![role.id, role.name, role.description])
            .map_err(|e| classify("save role", e))?;
        Ok(())
    }

    /// All roles, loaded eagerly in database iteration order.
    pub fn find_all_roles(&self) -> Result<Vec<Role>> {
        let mut stmt = self.conn.prepare(&self.sql.select_roles)?;
        let roles = stmt
            .query_map([], |row| {
                Ok(Role {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    description: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(roles)
    }

    // ========== Users ==========

    /// Insert a user and return it with the database-assigned id. Insert
    /// only: calling this twice with the same values creates two rows with
    /// two distinct ids.
    pub fn save_user(&self, user: &NewUser) -> Result<User> {
        self.conn
            .execute(
                &self.sql.insert_user,
                params![user.login, user.password, user.description, user.role_id],
            )
            .map_err(|e| classify("save user", e))?;
        let id = self.conn.last_insert_rowid();
        debug!(id, login = user.login.as_str(), "user saved");
        Ok(User {
            id,
            login: user.login.clone(),
            password: user.password.clone(),
            description: user.description.clone(),
            role_id: user.role_id,
        })
    }

    /// Delete exactly the user row with this id; returns whether a row
    /// existed. Does not cascade: a user still referenced by appreciates
    /// edges fails with a constraint violation, and the caller must clear
    /// the edges first.
    pub fn delete_user(&self, id: i64) -> Result<bool> {
        let deleted = self
            .conn
            .execute(&self.sql.delete_user, params![id])
            .map_err(|e| classify("delete user", e))?;
        Ok(deleted > 0)
    }

    /// All users, loaded eagerly in database iteration order.
    pub fn find_all_users(&self) -> Result<Vec<User>> {
        let mut stmt = self.conn.prepare(&self.sql.select_users)?;
        let users = stmt
            .query_map([], row_to_user)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(users)
    }

    /// Exact match on login and password (plaintext, like the schema).
    /// Wrong credentials are an empty result, never an error.
    pub fn login(&self, login: &str, password: &str) -> Result<Option<User>> {
        let user = self
            .conn
            .query_row(&self.sql.select_login, params![login, password], row_to_user)
            .optional()?;
        Ok(user)
    }

    /// Convenience for exercising the graph: inserts `base1` .. `baseN`
    /// with the seeded "user" role.
    pub fn create_test_users(&self, base: &str, count: u32) -> Result<Vec<User>> {
        (1..=count)
            .map(|i| {
                self.save_user(&NewUser::new(
                    format!("{}{}", base, i),
                    "pass",
                    "test user",
                    USER_ROLE_ID,
                ))
            })
            .collect()
    }

    // ========== Appreciates edges ==========

    /// Users this user appreciates (targets of outgoing edges).
    pub fn find_appreciated_by(&self, user_id: i64) -> Result<Vec<User>> {
        self.users_by(&self.sql.select_appreciated_by, user_id)
    }

    /// Users who appreciate this user (sources of incoming edges).
    pub fn find_who_appreciates(&self, user_id: i64) -> Result<Vec<User>> {
        self.users_by(&self.sql.select_who_appreciates, user_id)
    }

    /// Friends: users appreciated by `user_id` who appreciate them back.
    pub fn find_friends(&self, user_id: i64) -> Result<Vec<User>> {
        self.users_by(&self.sql.select_friends, user_id)
    }

    /// Atomically replace all outgoing edges of `user_id` with `targets`.
    ///
    /// One transaction: delete every edge with this source, insert one row
    /// per target (duplicates in `targets` become duplicate edges). On any
    /// failure the transaction rolls back and the prior edge set is fully
    /// preserved.
    pub fn replace_appreciated_set(&mut self, user_id: i64, targets: &[i64]) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute(&self.sql.delete_edges, params![user_id])
            .map_err(|e| classify("replace appreciated set", e))?;
        {
            let mut insert = tx.prepare(&self.sql.insert_edge)?;
            for target in targets {
                insert
                    .execute(params![user_id, target])
                    .map_err(|e| classify("replace appreciated set", e))?;
            }
        }
        tx.commit()?;
        debug!(user_id, count = targets.len(), "appreciated set replaced");
        Ok(())
    }

    fn users_by(&self, sql: &str, user_id: i64) -> Result<Vec<User>> {
        let mut stmt = self.conn.prepare(sql)?;
        let users = stmt
            .query_map(params![user_id], row_to_user)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(users)
    }
}

fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        login: row.get(1)?,
        password: row.get(2)?,
        description: row.get(3)?,
        role_id: row.get(4)?,
    })
}

/// Surface constraint violations as their own error kind; everything else
/// passes through unchanged.
fn classify(operation: &'static str, err: rusqlite::Error) -> Error {
    let constraint = matches!(
        &err,
        rusqlite::Error::SqliteFailure(code, _)
            if code.code == rusqlite::ErrorCode::ConstraintViolation
    );
    if constraint {
        Error::Constraint {
            operation,
            source: err,
        }
    } else {
        Error::Storage(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_store() -> Store {
        let mut store = Store::open_in_memory().unwrap();
        store.create_schema().unwrap();
        store.seed().unwrap();
        store
    }

    #[test]
    fn test_seed_counts() {
        let store = seeded_store();

        let roles = store.find_all_roles().unwrap();
        assert_eq!(roles.len(), 2);
        assert_eq!(roles[0], Role::new(ADMIN_ROLE_ID, "admin", "administrator"));

        let users = store.find_all_users().unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].login, "admin");
        assert_eq!(users[0].role_id, ADMIN_ROLE_ID);
    }

    #[test]
    fn test_save_user_assigns_fresh_ids() {
        let store = seeded_store();

        let alice = NewUser::new("alice", "pw", "", USER_ROLE_ID);
        let first = store.save_user(&alice).unwrap();
        let second = store.save_user(&alice).unwrap();

        assert!(first.id > 0);
        assert!(second.id > 0);
        assert_ne!(first.id, second.id);
        // Two rows exist now, plus the seeded admin.
        assert_eq!(store.find_all_users().unwrap().len(), 3);
    }

    #[test]
    fn test_save_user_with_dangling_role_fails() {
        let store = seeded_store();
        let err = store
            .save_user(&NewUser::new("ghost", "pw", "", 999))
            .unwrap_err();
        assert!(matches!(err, Error::Constraint { operation: "save user", .. }));
    }

    #[test]
    fn test_save_role_duplicate_id_fails() {
        let store = seeded_store();
        let err = store
            .save_role(&Role::new(ADMIN_ROLE_ID, "again", ""))
            .unwrap_err();
        assert!(matches!(err, Error::Constraint { .. }));
    }

    #[test]
    fn test_login() {
        let store = seeded_store();

        let admin = store.login("admin", "admin").unwrap().unwrap();
        assert_eq!(admin.login, "admin");
        assert_eq!(admin.role_id, ADMIN_ROLE_ID);

        assert!(store.login("admin", "wrong").unwrap().is_none());
        assert!(store.login("nobody", "admin").unwrap().is_none());
    }

    #[test]
    fn test_replace_is_exact_not_cumulative() {
        let mut store = seeded_store();
        let users = store.create_test_users("t", 3).unwrap();
        let (u, a, b) = (users[0].id, users[1].id, users[2].id);

        store.replace_appreciated_set(u, &[]).unwrap();
        store.replace_appreciated_set(u, &[a, b]).unwrap();

        let mut appreciated: Vec<i64> = store
            .find_appreciated_by(u)
            .unwrap()
            .iter()
            .map(|user| user.id)
            .collect();
        appreciated.sort();
        assert_eq!(appreciated, vec![a, b]);

        // A further replace fully supersedes the previous set.
        store.replace_appreciated_set(u, &[b]).unwrap();
        let appreciated: Vec<i64> = store
            .find_appreciated_by(u)
            .unwrap()
            .iter()
            .map(|user| user.id)
            .collect();
        assert_eq!(appreciated, vec![b]);
    }

    #[test]
    fn test_replace_keeps_duplicate_targets() {
        let mut store = seeded_store();
        let users = store.create_test_users("t", 2).unwrap();
        let (u, a) = (users[0].id, users[1].id);

        store.replace_appreciated_set(u, &[a, a]).unwrap();
        assert_eq!(store.find_appreciated_by(u).unwrap().len(), 2);
    }

    #[test]
    fn test_replace_rolls_back_on_dangling_target() {
        let mut store = seeded_store();
        let users = store.create_test_users("t", 2).unwrap();
        let (u, a) = (users[0].id, users[1].id);

        store.replace_appreciated_set(u, &[a]).unwrap();

        let err = store.replace_appreciated_set(u, &[a, 12345]).unwrap_err();
        assert!(matches!(err, Error::Constraint { .. }));

        // The failed replace must leave the prior edge set untouched.
        let appreciated: Vec<i64> = store
            .find_appreciated_by(u)
            .unwrap()
            .iter()
            .map(|user| user.id)
            .collect();
        assert_eq!(appreciated, vec![a]);
    }

    #[test]
    fn test_friendship_requires_both_directions() {
        let mut store = seeded_store();
        let users = store.create_test_users("t", 2).unwrap();
        let (t1, t2) = (users[0].id, users[1].id);

        // One direction only: no friendship either way.
        store.replace_appreciated_set(t1, &[t2]).unwrap();
        assert!(store.find_friends(t1).unwrap().is_empty());
        assert!(store.find_friends(t2).unwrap().is_empty());

        // Reciprocate: both see each other.
        store.replace_appreciated_set(t2, &[t1]).unwrap();
        let friends_of_t1 = store.find_friends(t1).unwrap();
        assert_eq!(friends_of_t1.len(), 1);
        assert_eq!(friends_of_t1[0].id, t2);
        let friends_of_t2 = store.find_friends(t2).unwrap();
        assert_eq!(friends_of_t2.len(), 1);
        assert_eq!(friends_of_t2[0].id, t1);
    }

    #[test]
    fn test_who_appreciates_is_the_reverse_direction() {
        let mut store = seeded_store();
        let users = store.create_test_users("t", 2).unwrap();
        let (t1, t2) = (users[0].id, users[1].id);

        store.replace_appreciated_set(t1, &[t2]).unwrap();

        let fans_of_t2 = store.find_who_appreciates(t2).unwrap();
        assert_eq!(fans_of_t2.len(), 1);
        assert_eq!(fans_of_t2[0].id, t1);
        assert!(store.find_who_appreciates(t1).unwrap().is_empty());
    }

    #[test]
    fn test_delete_user_does_not_cascade() {
        let mut store = seeded_store();
        let users = store.create_test_users("t", 2).unwrap();
        let (t1, t2) = (users[0].id, users[1].id);
        store.replace_appreciated_set(t1, &[t2]).unwrap();

        // t2 is referenced by an edge; deleting it must fail, not cascade.
        let err = store.delete_user(t2).unwrap_err();
        assert!(matches!(err, Error::Constraint { operation: "delete user", .. }));

        // Clear the edges, then the delete goes through.
        store.replace_appreciated_set(t1, &[]).unwrap();
        assert!(store.delete_user(t2).unwrap());
        assert!(!store.delete_user(t2).unwrap());
    }

    #[test]
    fn test_drop_schema_is_idempotent() {
        let mut store = seeded_store();

        let first = store.drop_schema();
        assert_eq!(first.len(), 6);
        // SQLite takes foreign keys inline, so the constraint drops are
        // reported as skipped while the table drops succeed.
        assert!(
            first
                .iter()
                .filter(|r| matches!(r.step, DropStep::Table(_)))
                .all(|r| r.outcome == DropOutcome::Dropped)
        );

        let second = store.drop_schema();
        assert!(second.iter().all(|r| matches!(r.outcome, DropOutcome::Skipped(_))));

        // A fresh create succeeds after the double drop.
        store.create_schema().unwrap();
    }

    #[test]
    fn test_reset_database() {
        let mut store = seeded_store();
        store.create_test_users("t", 5).unwrap();

        store.reset_database().unwrap();
        assert_eq!(store.find_all_roles().unwrap().len(), 2);
        assert_eq!(store.find_all_users().unwrap().len(), 1);
    }

    #[test]
    fn test_seed_then_reciprocal_replace_yields_friends() {
        // Full scenario: schema, seed, two test users, reciprocal edges.
        let mut store = Store::open_in_memory().unwrap();
        store.create_schema().unwrap();
        store.seed().unwrap();

        let users = store.create_test_users("t", 2).unwrap();
        let (t1, t2) = (users[0].id, users[1].id);
        store.replace_appreciated_set(t1, &[t2]).unwrap();
        store.replace_appreciated_set(t2, &[t1]).unwrap();

        let friends = store.find_friends(t1).unwrap();
        assert_eq!(friends.len(), 1);
        assert_eq!(friends[0].id, t2);
        assert_eq!(friends[0].login, "t2");
    }

    #[test]
    fn test_file_backed_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("likes.db");

        {
            let mut store = Store::open(&path).unwrap();
            assert_eq!(store.engine(), Engine::Sqlite);
            store.create_schema().unwrap();
            store.seed().unwrap();
        }

        // Reopen: the data survived the connection.
        let store = Store::open(&path).unwrap();
        assert_eq!(store.find_all_users().unwrap().len(), 1);
    }

    #[test]
    fn test_connect_refuses_network_engines() {
        let err = Store::connect(Engine::Postgres, "localhost", 5432, "likes").unwrap_err();
        assert!(matches!(err, Error::UnsupportedDriver(Engine::Postgres)));

        let store = Store::connect(Engine::SqliteMemory, "", 0, "test").unwrap();
        assert_eq!(store.engine(), Engine::SqliteMemory);
    }
}
