//! Command dispatch: bridges CLI args -> client calls -> output formatting.

pub mod config_cmd;
pub mod tenants;
pub mod util;

use crate::cli::{Command, GlobalOpts};
use crate::config::Session;
use crate::error::CliError;

/// Dispatch a server-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::List(args) => tenants::list(session, args, global).await,
        Command::Get { id } => tenants::get(session, &id, global).await,
        Command::Create { name } => tenants::create(session, &name, global).await,
        Command::Update(args) => tenants::update(session, args, global).await,
        Command::Delete { id } => tenants::delete(session, &id, global).await,
        Command::Info => tenants::info(session, global).await,
        // Config and Completions are handled before a session is built
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
