mod staff;

use std::error::Error as StdError;
use std::fs::File;
use std::sync::Arc;
use std::time::Duration;

use log::{error, info};
use serde_json::json;
use simplelog::{Config, LevelFilter, WriteLogger};
use trellis::prelude::*;

use crate::staff::Employee;

const LOG_FILE: &str = "trellis-demo.log";
const STEP: Duration = Duration::from_millis(10);

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn StdError>> {
    WriteLogger::init(LevelFilter::Debug, Config::default(), File::create(LOG_FILE)?)?;

    let dom = Dom::new();
    let app = dom.create_element("main");
    dom.set_attribute(app, "id", "app")?;
    dom.append_child(dom.body(), app)?;

    let scheduler = Scheduler::new();
    let mut runtime = Runtime::new(scheduler.clone(), RuntimeConfig::default());

    let employees = ObservableList::new(staff::seed());
    let factory = HeadlessFactory::new();
    let table = Tabulator::json(factory.clone())
        .options(staff::table_options())
        .observable(employees.clone())
        .config(AdapterConfig::new().auto_sync(true).host_id("staff"))
        .build();

    let status = Tag::new("p").class("status").text("Click a row");
    let selected = status.clone();
    table.on_event(TableEvent::RowClick, move |event| {
        match serde_json::from_value::<Employee>(event.detail.clone()) {
            Ok(employee) => selected.set_text(format!("{} ({})", employee.name, employee.team)),
            Err(e) => error!("unexpected row payload: {}", e),
        }
    });

    let page = Container::new("section").class("page");
    page.add(Arc::new(Tag::new("h1").translated("title")));
    page.add(Arc::new(table.clone()));
    page.add(Arc::new(status.clone()));

    let root = Root::mount_by_id(
        &dom,
        "app",
        Arc::new(page),
        &scheduler,
        RootConfig::new().translator(staff::catalog()),
    )?;

    let script = {
        let (root, table, employees, factory) = (
            root.clone(),
            table.clone(),
            employees.clone(),
            factory.clone(),
        );
        async move {
            let Some(grid) = factory.last() else {
                error!("table was not created");
                return;
            };

            employees.push(Employee::new(8, "Hana", "Design", 57_000));
            info!("pushed a record, {} rows", table.get_row_count(false));
            tokio::time::sleep(STEP).await;

            table.set_page(2);
            if let Err(e) = grid.click_row(0) {
                error!("row click failed: {}", e);
            }
            tokio::time::sleep(STEP).await;

            match grid.edit_cell(0, "salary", json!(99_000)) {
                Ok(_) => info!("edited salary, source now {:?}", employees.get(0)),
                Err(e) => error!("edit failed: {}", e),
            }
            tokio::time::sleep(STEP).await;

            root.set_locale("de");
            tokio::time::sleep(STEP).await;
            info!("after locale switch: page {}", table.get_page());

            table.set_filter(|e: &Employee| e.salary >= 50_000);
            match table.apply_filter() {
                Ok(applied) => info!(
                    "filter applied: {}, {} of {} rows",
                    applied,
                    table.get_row_count(true),
                    table.get_row_count(false)
                ),
                Err(e) => error!("filter failed: {}", e),
            }
            tokio::time::sleep(STEP).await;
        }
    };
    runtime.run(script).await?;

    if let Some(node) = root.node() {
        println!("{}", dom.outer_html(node));
    }
    root.unmount()?;
    info!("{} table instances created", factory.created_count());
    Ok(())
}
