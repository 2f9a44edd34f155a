//! Sample records shown by the demo table.

use serde::Deserialize;
use serde::Serialize;
use trellis::prelude::*;
use trellis::tabulator::{Layout, Sorter};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: u32,
    pub name: String,
    pub team: String,
    pub salary: u32,
}

impl Employee {
    pub fn new(id: u32, name: &str, team: &str, salary: u32) -> Self {
        Self {
            id,
            name: name.to_string(),
            team: team.to_string(),
            salary,
        }
    }
}

pub fn seed() -> Vec<Employee> {
    vec![
        Employee::new(1, "Ada", "Platform", 72_000),
        Employee::new(2, "Brian", "Platform", 48_000),
        Employee::new(3, "Chidi", "Design", 51_000),
        Employee::new(4, "Dana", "Support", 39_000),
        Employee::new(5, "Emeka", "Design", 64_000),
        Employee::new(6, "Fatima", "Support", 41_000),
        Employee::new(7, "Goran", "Platform", 83_000),
    ]
}

pub fn catalog() -> Catalog {
    Catalog::new()
        .table(
            "en",
            [
                ("title", "Staff"),
                ("col.name", "Name"),
                ("col.team", "Team"),
                ("col.salary", "Salary"),
            ],
        )
        .table(
            "de",
            [
                ("title", "Mitarbeiter"),
                ("col.name", "Name"),
                ("col.team", "Abteilung"),
                ("col.salary", "Gehalt"),
            ],
        )
}

pub fn table_options() -> TableOptions {
    TableOptions::new()
        .layout(Layout::FitColumns)
        .columns([
            ColumnDefinition::new("col.name", "name")
                .translated()
                .editor("input"),
            ColumnDefinition::new("col.team", "team").translated(),
            ColumnDefinition::new("col.salary", "salary")
                .translated()
                .hoz_align("right")
                .editor("number"),
        ])
        .paginate(5)
        .history(true)
        .initial_sort(Sorter::asc("name"))
        .placeholder("No staff")
}
