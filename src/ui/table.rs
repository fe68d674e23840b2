use tabled::{Table, Tabled, settings::Style};

use crate::role::Role;
use crate::store::{DropOutcome, DropReport};
use crate::user::User;

#[derive(Tabled)]
struct UserRow {
    #[tabled(rename = "Id")]
    id: i64,
    #[tabled(rename = "Login")]
    login: String,
    #[tabled(rename = "Role")]
    role_id: i64,
    #[tabled(rename = "Description")]
    description: String,
}

#[derive(Tabled)]
struct RoleRow {
    #[tabled(rename = "Id")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Description")]
    description: String,
}

#[derive(Tabled)]
struct DropRow {
    #[tabled(rename = "Step")]
    step: String,
    #[tabled(rename = "Outcome")]
    outcome: String,
}

pub fn users_table(users: &[User]) -> String {
    let rows: Vec<UserRow> = users
        .iter()
        .map(|u| UserRow {
            id: u.id,
            login: u.login.clone(),
            role_id: u.role_id,
            description: u.description.clone(),
        })
        .collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

pub fn roles_table(roles: &[Role]) -> String {
    let rows: Vec<RoleRow> = roles
        .iter()
        .map(|r| RoleRow {
            id: r.id,
            name: r.name.clone(),
            description: r.description.clone(),
        })
        .collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

pub fn drop_report_table(reports: &[DropReport]) -> String {
    let rows: Vec<DropRow> = reports
        .iter()
        .map(|r| DropRow {
            step: r.step.to_string(),
            outcome: match &r.outcome {
                DropOutcome::Dropped => "dropped".to_string(),
                DropOutcome::Skipped(reason) => format!("skipped ({})", reason),
            },
        })
        .collect();
    Table::new(rows).with(Style::rounded()).to_string()
}
