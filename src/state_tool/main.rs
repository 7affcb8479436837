//! Offline inspector and editor for the day count state document.
//!
//! Works directly on the file store, so it is how the first admin gets
//! seeded before the bot can accept any command.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use day_count_bot::config::validate_document_id;
use day_count_bot::store::{GroupState, JsonFileStore, StateStore, StoreError};

/// Day count state document tool.
#[derive(Parser, Debug)]
#[command(name = "day_count_state")]
#[command(about = "Inspects and edits the day count bot's state document")]
#[command(version)]
struct Args {
    /// Directory holding the state documents.
    #[arg(short, long, env = "STORE_PATH", default_value = "data")]
    store: PathBuf,

    /// Id of the state document.
    #[arg(short, long, env = "DOCUMENT_ID")]
    document_id: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the current document.
    Show,
    /// Overwrite the day count.
    SetCount { count: u64 },
    /// Set the group chat that receives the daily count.
    SetChat {
        #[arg(allow_hyphen_values = true)]
        chat_id: i64,
    },
    /// Add a user to the admin list.
    AddAdmin { user_id: i64 },
    /// Remove a user from the admin list.
    RemoveAdmin { user_id: i64 },
}

#[tokio::main]
async fn main() -> ExitCode {
    // `env` defaults above read the same .env file as the bot.
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    if let Err(e) = validate_document_id(&args.document_id) {
        eprintln!("✗ {e}");
        return ExitCode::FAILURE;
    }

    let store = match JsonFileStore::open(&args.store).await {
        Ok(store) => store,
        Err(e) => {
            eprintln!("✗ Failed to open store at {}: {e}", args.store.display());
            return ExitCode::FAILURE;
        }
    };

    match run(&store, &args.document_id, args.command).await {
        Ok(state) => {
            print_state(&state);
            ExitCode::SUCCESS
        }
        Err(StoreError::NotFound { id }) => {
            eprintln!("✗ Document '{id}' does not exist yet.");
            eprintln!("  Create it with: day_count_state -d {id} set-count 0");
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("✗ {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(store: &JsonFileStore, id: &str, command: Command) -> Result<GroupState, StoreError> {
    match command {
        Command::Show => store.load(id).await,
        Command::SetCount { count } => store.set_day_count(id, count).await,
        Command::SetChat { chat_id } => store.set_chat_id(id, chat_id).await,
        Command::AddAdmin { user_id } => {
            store.add_admin(id, user_id).await?;
            store.load(id).await
        }
        Command::RemoveAdmin { user_id } => {
            store.remove_admin(id, user_id).await?;
            store.load(id).await
        }
    }
}

fn print_state(state: &GroupState) {
    let chat = state
        .chat_id
        .map_or_else(|| "not set".to_owned(), |id| id.to_string());
    let admins = if state.admins.is_empty() {
        "none".to_owned()
    } else {
        state
            .admins
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    };

    println!("Document:  {}", state.id);
    println!("Day count: {}", state.day_count);
    println!("Group:     {chat}");
    println!("Admins:    {admins}");
}
