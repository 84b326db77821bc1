//! Command-line driver for the notely client.
//!
//! # Responsibility
//! - Wire config, logging, the HTTP collaborators and SQLite local storage
//!   into one `NoteApp`.
//! - Run a single user action and print the resulting view.

use clap::{Parser, Subcommand};
use log::info;
use notely_core::{
    init_logging_from_config, AppOptions, ClientConfig, HttpAuthApi, HttpNoteApi, NoteApp,
    NoteDraft, NoteId, NotificationKind, SqliteKeyValueStore,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "notely", version, about = "Notes client for the notes REST backend")]
struct Cli {
    /// Path to the TOML config file.
    #[arg(long, short, default_value = "notely.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show notes.
    List {
        /// Only show important notes.
        #[arg(long)]
        important: bool,
    },
    /// Create a note.
    Add {
        content: String,
        #[arg(long)]
        important: bool,
    },
    /// Flip the importance flag of a note.
    Toggle { id: String },
    /// Delete a note.
    Delete { id: String },
    /// Log in and persist the session.
    Login {
        username: String,
        #[arg(long, env = "NOTELY_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Drop the persisted session.
    Logout,
    /// Print the logged-in user.
    Whoami,
}

type App = NoteApp<HttpNoteApi, HttpAuthApi, SqliteKeyValueStore>;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match ClientConfig::load(&cli.config) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("notely: {err}");
            return ExitCode::from(2);
        }
    };

    if let Err(err) = init_logging_from_config(&config.logging) {
        eprintln!("notely: logging disabled: {err}");
    }

    let mut app = match build_app(&config) {
        Ok(app) => app,
        Err(message) => {
            eprintln!("notely: {message}");
            return ExitCode::from(2);
        }
    };

    let loaded = app.start().await;
    let ok = run(&mut app, cli.command, loaded).await;
    print_notifications(&app);

    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn build_app(config: &ClientConfig) -> Result<App, String> {
    let notes = HttpNoteApi::new(&config.api.base_url, config.request_timeout())
        .map_err(|err| err.to_string())?;
    let auth = HttpAuthApi::new(
        &config.api.base_url,
        config.request_timeout(),
        config.session_default_ttl(),
    )
    .map_err(|err| err.to_string())?;
    let storage = SqliteKeyValueStore::open(&config.storage.path).map_err(|err| err.to_string())?;

    info!(
        "event=cli_start module=cli status=ok base_url={} storage={}",
        config.api.base_url,
        config.storage.path.display()
    );
    Ok(NoteApp::new(
        Arc::new(notes),
        auth,
        storage,
        AppOptions::from_config(config),
    ))
}

/// Runs one action; `loaded` is whether startup fetched the note list.
async fn run(app: &mut App, command: Command, loaded: bool) -> bool {
    match command {
        Command::List { important } => {
            app.set_show_all(!important);
            print_notes(app);
            loaded
        }
        Command::Add { content, important } => {
            let ok = app.add_note(&NoteDraft::new(content, important)).await.is_some();
            print_notes(app);
            ok
        }
        Command::Toggle { id } => {
            let ok = app.toggle_importance(&NoteId::new(id)).await.is_some();
            print_notes(app);
            ok
        }
        Command::Delete { id } => {
            let ok = app.delete_note(&NoteId::new(id)).await;
            print_notes(app);
            ok
        }
        Command::Login { username, password } => app.login(&username, &password).await,
        Command::Logout => {
            app.logout();
            true
        }
        Command::Whoami => match app.session() {
            Some(session) => {
                println!("{} ({})", session.name, session.username);
                true
            }
            None => {
                println!("not logged in");
                false
            }
        },
    }
}

fn print_notes(app: &App) {
    for note in app.visible_notes() {
        let marker = if note.important { "*" } else { " " };
        println!("{marker} {:>6}  {}", note.id.as_str(), note.content);
    }
}

fn print_notifications(app: &App) {
    if let Some(notification) = app.notification(NotificationKind::Info) {
        println!("{}", notification.text);
    }
    if let Some(notification) = app.notification(NotificationKind::Error) {
        eprintln!("error: {}", notification.text);
    }
}
