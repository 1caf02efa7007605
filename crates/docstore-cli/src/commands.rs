//! Command handlers for CLI subcommands.

use std::path::Path;

use docstore::{Driver, DriverOptions};
use tracing::{error, info};

use crate::cli::Commands;
use crate::seed::{self, User, EMPLOYEE_COLLECTION};

/// Result type for command operations.
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Execute a CLI command against the store at `root`.
pub fn execute(options: DriverOptions, command: Commands, root: &Path) -> Result<()> {
    let db = Driver::with_options(root, options)?;

    match command {
        Commands::Write {
            collection,
            resource,
            json,
        } => cmd_write(&db, &collection, &resource, &json),
        Commands::Read {
            collection,
            resource,
        } => cmd_read(&db, &collection, &resource),
        Commands::List { collection } => cmd_list(&db, &collection),
        Commands::Delete {
            collection,
            resource,
        } => cmd_delete(&db, &collection, &resource),
        Commands::Seed { collection } => cmd_seed(&db, &collection),
        Commands::Demo => {
            for line in run_demo(&db) {
                println!("{}", line);
            }
            Ok(())
        }
    }
}

fn cmd_write(db: &Driver, collection: &str, resource: &str, json: &str) -> Result<()> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    db.write(collection, resource, &value)?;
    info!(collection = %collection, resource = %resource, "Wrote resource");
    println!("Wrote {}/{}", collection, resource);
    Ok(())
}

fn cmd_read(db: &Driver, collection: &str, resource: &str) -> Result<()> {
    let value: serde_json::Value = db.read(collection, resource)?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn cmd_list(db: &Driver, collection: &str) -> Result<()> {
    let records = db.read_all(collection)?;
    if records.is_empty() {
        println!("No resources in '{}'", collection);
        return Ok(());
    }
    for raw in records {
        print!("{}", raw);
    }
    Ok(())
}

fn cmd_delete(db: &Driver, collection: &str, resource: &str) -> Result<()> {
    db.delete(collection, resource)?;
    println!("Deleted {}/{}", collection, resource);
    Ok(())
}

fn cmd_seed(db: &Driver, collection: &str) -> Result<()> {
    let count = seed::seed(db, collection)?;
    println!("Seeded {} employees into '{}'", count, collection);
    Ok(())
}

/// Seeds the sample employees, reads the collection back and decodes it.
///
/// Failures are logged and the demo keeps going. Returns the lines to print.
pub fn run_demo(db: &Driver) -> Vec<String> {
    let mut out = Vec::new();

    for employee in seed::sample_employees() {
        if let Err(e) = db.write(EMPLOYEE_COLLECTION, &employee.name, &employee) {
            error!(name = %employee.name, error = %e, "Failed to write employee");
        }
    }

    let records = match db.read_all(EMPLOYEE_COLLECTION) {
        Ok(records) => records,
        Err(e) => {
            error!(error = %e, "Failed to read employees");
            Vec::new()
        }
    };

    out.push(format!("{} raw records:", records.len()));
    out.extend(records.iter().map(|r| r.trim_end().to_string()));

    let mut employees = Vec::new();
    for raw in &records {
        match serde_json::from_str::<User>(raw) {
            Ok(user) => employees.push(user),
            Err(e) => error!(error = %e, "Failed to decode employee"),
        }
    }

    out.push(format!("{} decoded employees:", employees.len()));
    out.extend(employees.iter().map(|u| format!("{:?}", u)));
    out
}
