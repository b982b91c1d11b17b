use std::io;

use tracing::error;

use roster::cli::Cli;
use roster::db::schema;
use roster::db::PERSON_SCHEMA;
use roster::logging;
use roster::repl::{Editor, LineSource, Repl};

const CONNECTION_PROMPT: &str = "connection string> ";

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse_args();
    logging::init(cli.verbose);

    let mut editor = Editor::new()?;

    // Without a connection there is nothing to do.
    let db = cli
        .connection_source()
        .acquire(|| editor.read_line(CONNECTION_PROMPT))?;

    match schema::sync(&db, &PERSON_SCHEMA) {
        Ok(_) => println!("Database synchronized"),
        Err(e) => {
            error!(url = %db.config(), error = %e, "schema synchronization failed");
            println!("Error synchronizing the database: {}", e);
        }
    }

    let mut repl = Repl::new(db, editor, io::stdout());
    repl.run()?;

    Ok(())
}
