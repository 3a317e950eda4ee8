//! library-erd CLI - render the library schema visualizer outside the browser
//!
//! Usage:
//!   library-erd svg [-o diagram.svg] [--select <table>] [--hide-relationships]
//!   library-erd html [--tab operations] [--operation issue_book] [-o page.html]
//!   library-erd table <table>
//!   library-erd procedure <name>
//!   library-erd operations
//!   library-erd check

use clap::{Args, Parser, Subcommand, ValueEnum};
use library_erd::catalog::{self, Catalog};
use library_erd::html::HtmlRenderer;
use library_erd::session::Session;
use library_erd::state::{SelectionState, Tab};
use library_erd::text;
use library_erd::view_model::{self, operations_tab};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "library-erd")]
#[command(about = "Library management database schema visualizer")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the schema diagram as SVG
    Svg {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        state: StateArgs,
    },

    /// Render the full visualizer as an HTML page
    Html {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Emit only the markup fragment, without the surrounding page
        #[arg(long)]
        fragment: bool,

        #[command(flatten)]
        state: StateArgs,
    },

    /// Print the view model as JSON
    Json {
        #[command(flatten)]
        state: StateArgs,
    },

    /// Show the detail panel for a table
    Table {
        /// Table key, e.g. book_authors
        key: String,
    },

    /// Show the detail panel for a stored procedure
    Procedure {
        /// Procedure name, e.g. issue_book
        name: String,
    },

    /// List procedures, triggers and views
    Operations,

    /// Validate the catalog and report unmirrored relationships
    Check,
}

#[derive(Args)]
struct StateArgs {
    /// Active tab
    #[arg(short, long, default_value = "schema")]
    tab: TabArg,

    /// Table to select (default: books)
    #[arg(short, long)]
    select: Option<String>,

    /// Procedure to select; clears the table selection
    #[arg(long)]
    operation: Option<String>,

    /// Draw the diagram without relationship connectors
    #[arg(long)]
    hide_relationships: bool,
}

#[derive(Clone, ValueEnum)]
enum TabArg {
    Schema,
    Operations,
    Workflow,
}

impl From<TabArg> for Tab {
    fn from(arg: TabArg) -> Self {
        match arg {
            TabArg::Schema => Tab::Schema,
            TabArg::Operations => Tab::Operations,
            TabArg::Workflow => Tab::Workflow,
        }
    }
}

impl StateArgs {
    fn into_state(self) -> SelectionState {
        let mut state = SelectionState::default().select_tab(self.tab.into());
        if let Some(key) = &self.select {
            state = state.select_entity(key);
        }
        if let Some(name) = &self.operation {
            state = state.select_operation(name);
        }
        if self.hide_relationships {
            state = state.toggle_relationships();
        }
        state
    }
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    let catalog = match catalog::library() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Startup error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Svg { output, state } => {
            let session = Session::with_state(catalog, state.into_state());
            write_output(output, &session.render_svg())
        }
        Commands::Html {
            output,
            fragment,
            state,
        } => {
            let session = Session::with_state(catalog, state.into_state());
            let markup = if fragment {
                session.render_html()
            } else {
                HtmlRenderer::default().render_document(&session.view_model())
            };
            write_output(output, &markup)
        }
        Commands::Json { state } => {
            let session = Session::with_state(catalog, state.into_state());
            match session.view_model_json() {
                Ok(json) => write_output(None, &json),
                Err(e) => {
                    eprintln!("Serialization error: {}", e);
                    ExitCode::FAILURE
                }
            }
        }
        Commands::Table { key } => {
            // Unknown tables render an empty panel, like the UI does.
            if let Some(detail) = view_model::entity_detail(&catalog.schema, &key) {
                print!("{}", text::entity_detail(&detail));
            }
            ExitCode::SUCCESS
        }
        Commands::Procedure { name } => {
            if let Some(detail) = view_model::procedure_detail(&catalog.operations, &name) {
                print!("{}", text::procedure_detail(&detail));
            }
            ExitCode::SUCCESS
        }
        Commands::Operations => {
            let tab = operations_tab(&catalog.operations, &SelectionState::default());
            print!("{}", text::operations(&tab));
            ExitCode::SUCCESS
        }
        Commands::Check => cmd_check(catalog),
    }
}

fn cmd_check(catalog: &Catalog) -> ExitCode {
    println!(
        "OK: {} tables, {} procedures, {} triggers, {} views",
        catalog.schema.len(),
        catalog.operations.procedures().len(),
        catalog.operations.triggers().len(),
        catalog.operations.views().len()
    );

    let mismatches = catalog.schema.inverse_mismatches();
    if mismatches.is_empty() {
        println!("Every relationship has a mirrored descriptor on its target.");
    } else {
        println!("Relationships without a mirrored descriptor:");
        for m in &mismatches {
            println!("  {} -> {} ({} via {})", m.from, m.to, m.cardinality, m.via);
        }
    }
    ExitCode::SUCCESS
}

fn write_output(path: Option<PathBuf>, content: &str) -> ExitCode {
    match path {
        Some(path) => {
            if let Err(e) = fs::write(&path, content) {
                eprintln!("Failed to write {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        None => {
            print!("{}", content);
            ExitCode::SUCCESS
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
