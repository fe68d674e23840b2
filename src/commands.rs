//! Command implementations for the likegraph CLI
//!
//! Thin wrappers over the store: no input validation beyond what clap
//! already typed, no business logic. Human output goes through the ui
//! helpers; `--json` prints the raw rows instead.

use anyhow::Context;
use std::path::Path;

use likegraph::config::{self, Config};
use likegraph::ui;
use likegraph::{NewUser, Store};

pub fn run_init(path: &Path, force: bool) -> anyhow::Result<()> {
    let config = Config::default();
    config::write_config(path, &config, force)?;
    ui::success(&format!("wrote {}", path.display()));
    ui::info("engine", config.engine.as_str());
    ui::info("database", &config.database);
    Ok(())
}

pub fn run_url(config: &Config) -> anyhow::Result<()> {
    ui::info("engine", config.engine.as_str());
    ui::info("driver", config.engine.driver());
    ui::info("url", &config.url());
    if !config.engine.runs_on_bundled_driver() {
        ui::warn("dialect target only: this engine cannot be opened by likegraph");
    }
    Ok(())
}

pub fn run_create_schema(store: &mut Store) -> anyhow::Result<()> {
    store.create_schema().context("creating schema")?;
    ui::success("schema created");
    Ok(())
}

pub fn run_drop_schema(store: &Store) -> anyhow::Result<()> {
    let reports = store.drop_schema();
    println!("{}", ui::drop_report_table(&reports));
    Ok(())
}

pub fn run_reset(store: &mut Store) -> anyhow::Result<()> {
    let reports = store.reset_database().context("resetting database")?;
    println!("{}", ui::drop_report_table(&reports));
    ui::success("database reset and seeded");
    Ok(())
}

pub fn run_seed(store: &Store) -> anyhow::Result<()> {
    store.seed().context("seeding database")?;
    ui::success("roles and admin account seeded");
    Ok(())
}

pub fn run_roles(store: &Store, json: bool) -> anyhow::Result<()> {
    let roles = store.find_all_roles().context("listing roles")?;
    if json {
        println!("{}", serde_json::to_string_pretty(&roles)?);
    } else {
        ui::header("Roles");
        println!("{}", ui::roles_table(&roles));
    }
    Ok(())
}

pub fn run_users(store: &Store, json: bool) -> anyhow::Result<()> {
    let users = store.find_all_users().context("listing users")?;
    if json {
        println!("{}", serde_json::to_string_pretty(&users)?);
    } else {
        ui::header("Users");
        println!("{}", ui::users_table(&users));
    }
    Ok(())
}

pub fn run_create_user(
    store: &Store,
    login: String,
    password: String,
    description: String,
    role_id: i64,
) -> anyhow::Result<()> {
    let user = store
        .save_user(&NewUser::new(login, password, description, role_id))
        .context("creating user")?;
    ui::success(&format!("user #{} ({}) created", user.id, user.login));
    Ok(())
}

pub fn run_test_users(store: &Store, base: &str, count: u32) -> anyhow::Result<()> {
    let users = store
        .create_test_users(base, count)
        .context("creating test users")?;
    ui::success(&format!("{} test users created", users.len()));
    Ok(())
}

pub fn run_delete_user(store: &Store, id: i64) -> anyhow::Result<()> {
    let existed = store
        .delete_user(id)
        .context("deleting user (clear their appreciates edges first)")?;
    if existed {
        ui::success(&format!("user #{} deleted", id));
    } else {
        ui::warn(&format!("no user with id {}", id));
    }
    Ok(())
}

pub fn run_login(store: &Store, login: &str, password: &str) -> anyhow::Result<()> {
    match store.login(login, password).context("logging in")? {
        Some(user) => ui::success(&format!("logged in as {} (role {})", user, user.role_id)),
        None => ui::warn("login or password incorrect"),
    }
    Ok(())
}

pub fn run_appreciated(store: &Store, user_id: i64, json: bool) -> anyhow::Result<()> {
    let users = store
        .find_appreciated_by(user_id)
        .context("listing appreciated users")?;
    print_user_list(&format!("Appreciated by #{}", user_id), &users, json)
}

pub fn run_fans(store: &Store, user_id: i64, json: bool) -> anyhow::Result<()> {
    let users = store
        .find_who_appreciates(user_id)
        .context("listing fans")?;
    print_user_list(&format!("Who appreciates #{}", user_id), &users, json)
}

pub fn run_friends(store: &Store, user_id: i64, json: bool) -> anyhow::Result<()> {
    let users = store.find_friends(user_id).context("listing friends")?;
    print_user_list(&format!("Friends of #{}", user_id), &users, json)
}

pub fn run_set_appreciated(store: &mut Store, user_id: i64, targets: &[i64]) -> anyhow::Result<()> {
    store
        .replace_appreciated_set(user_id, targets)
        .context("replacing appreciated set")?;
    ui::success(&format!(
        "user #{} now appreciates {} user(s)",
        user_id,
        targets.len()
    ));
    Ok(())
}

fn print_user_list(title: &str, users: &[likegraph::User], json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(users)?);
        return Ok(());
    }
    ui::section(title);
    if users.is_empty() {
        println!("(none)");
    } else {
        println!("{}", ui::users_table(users));
    }
    Ok(())
}
