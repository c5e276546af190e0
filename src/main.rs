mod cli;
mod commands;
mod config;
mod db;
mod prompt;
mod store;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands, ConfigCommands};
use prompt::TermPrompter;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let path = config::connections_path(cli.config)?;
    let mut prompter = TermPrompter;

    match cli.command {
        Commands::Config { command } => match command {
            None => commands::config_summary(),
            Some(ConfigCommands::List) => commands::config_list(&path)?,
            Some(ConfigCommands::Add) => commands::config_add(&path, &mut prompter)?,
            Some(ConfigCommands::Edit { name }) => {
                commands::config_edit(&path, &name, &mut prompter)?
            }
            Some(ConfigCommands::Remove { name, force }) => {
                commands::config_remove(&path, &name, force, &mut prompter)?
            }
            Some(ConfigCommands::Use { name }) => commands::config_use(&path, &name)?,
        },
        Commands::Completions { shell } => commands::completions(shell)?,
        report => {
            let mut client = commands::establish(&path, cli.profile.as_deref(), &mut prompter)?;
            match report {
                Commands::Schemas => db::schemas(&mut client)?,
                Commands::Connections => db::connections(&mut client)?,
                Commands::Users => db::users(&mut client)?,
                Commands::Size { schema: Some(schema) } => db::table_sizes(&mut client, &schema)?,
                Commands::Size { schema: None } => db::schema_sizes(&mut client)?,
                Commands::Config { .. } | Commands::Completions { .. } => unreachable!(),
            }
        }
    }

    Ok(())
}
