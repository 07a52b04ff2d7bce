use anyhow::{bail, Context};
use board_infinity::config::{BoardConfig, StoreBackend, StoreConfig, DEFAULT_CONFIG_FILE};
use board_infinity::form::{TaskForm, DATE, DESCRIPTION, PRIORITY, TITLE};
use board_infinity::store::{DocumentStore, JsonFileStore, MemoryStore};
use board_infinity::ui::{self, App};
use board_infinity::{logging, KanbanBoard, Status};
use clap::{Parser, Subcommand};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "board-infinity", version, about = "Your task management dashboard")]
struct Cli {
    /// Configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// JSON file holding the tasks
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Collection to read and write
    #[arg(long, global = true)]
    collection: Option<String>,

    /// Keep tasks in memory only
    #[arg(long, global = true)]
    memory: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Open the board (default)
    Show,
    /// List tasks per column
    List,
    /// Add a new task
    Add {
        #[arg(long)]
        title: String,
        /// Date as YYYY-MM-DD
        #[arg(long)]
        date: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "TODO")]
        status: Status,
        #[arg(long, default_value = "Medium")]
        priority: String,
    },
    /// Move a task to another column
    Move { id: String, status: Status },
    /// Delete a task
    Delete { id: String },
    /// Count tasks per column
    Stats,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let mut config = BoardConfig::load(&config_path)?;
    if let Some(path) = cli.store {
        config.store.backend = StoreBackend::Json;
        config.store.path = path;
    }
    if cli.memory {
        config.store.backend = StoreBackend::Memory;
    }
    if let Some(collection) = cli.collection {
        config.store.collection = collection;
    }

    let command = cli.command.unwrap_or(Command::Show);
    match command {
        Command::Show => logging::init_file(&config.logging)?,
        _ => logging::init_stderr(&config.logging),
    }

    let store = open_store(&config.store)?;
    let board = KanbanBoard::mount(store, config.store.collection.as_str())?;

    match command {
        Command::Show => run_tui(board, config.ui.tick_rate()),
        command => {
            let result = run_command(&board, command);
            board.unmount();
            result
        }
    }
}

fn open_store(config: &StoreConfig) -> anyhow::Result<Arc<dyn DocumentStore>> {
    Ok(match config.backend {
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
        StoreBackend::Json => Arc::new(
            JsonFileStore::open(&config.path)
                .with_context(|| format!("opening task store {}", config.path.display()))?,
        ),
    })
}

fn run_tui(board: KanbanBoard, tick_rate: Duration) -> anyhow::Result<()> {
    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(board);
    let result = ui::run_app(&mut terminal, &mut app, tick_rate);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    app.board.unmount();
    result?;
    Ok(())
}

fn run_command(board: &KanbanBoard, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Show => bail!("the board is only shown interactively"),
        Command::List => {
            for column in board.columns() {
                println!("{}:", column.status);
                for task in column.tasks {
                    println!(
                        "- [{}] {} ({}, {})",
                        task.id,
                        task.title,
                        task.priority,
                        task.display_date()
                    );
                }
            }
        }
        Command::Add {
            title,
            date,
            description,
            status,
            priority,
        } => {
            let mut form = TaskForm::new();
            form.type_into(TITLE, &title);
            form.type_into(DESCRIPTION, &description);
            form.type_into(DATE, &date);
            form.set_status(status);
            if !form.field_mut(PRIORITY).select_value(&priority) {
                bail!("unknown priority: {priority}");
            }
            let Some(task) = form.submit() else {
                let errors: Vec<String> =
                    form.fields.iter().filter_map(|f| f.error.clone()).collect();
                bail!("{}", errors.join("; "));
            };
            let id = board.create(&task)?;
            println!("{id}");
        }
        Command::Move { id, status } => {
            board.change_status(&id, status)?;
        }
        Command::Delete { id } => {
            if board.task(&id).is_none() {
                bail!("no task with id {id}");
            }
            board.delete(&id)?;
        }
        Command::Stats => {
            for column in board.columns() {
                println!("{}: {}", column.status, column.tasks.len());
            }
        }
    }
    Ok(())
}
