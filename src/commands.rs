use anyhow::{bail, Context, Result};
use clap::CommandFactory;
use clap_complete::{generate, Shell};
use colored::*;
use std::io;
use std::path::Path;

use crate::cli::Cli;
use crate::db;
use crate::prompt::Prompter;
use crate::store::{ConnectionProfile, ProfileStore, ProfileUpdate, StoreError};

/// Loads the store and opens a database connection for a report command.
/// When no connections file exists yet, offers to create one interactively
/// before proceeding.
pub fn establish<P: Prompter>(
    path: &Path,
    override_name: Option<&str>,
    prompter: &mut P,
) -> Result<postgres::Client> {
    let store = match ProfileStore::load(path) {
        Ok(store) => store,
        Err(StoreError::Missing(_)) => {
            println!(
                "{}",
                format!("No connections file found at {}", path.display()).yellow()
            );
            if !prompter.confirm("Create one now?")? {
                bail!("a connections file is required; run 'pgdb config add' to create one");
            }
            config_add(path, prompter)?;
            ProfileStore::load(path)?
        }
        Err(e) => return Err(e.into()),
    };

    let url = store.resolve_url(override_name)?;
    db::connect(&url)
}

pub fn config_summary() {
    println!("{}", "Manage named connection profiles.".bold());
    println!();
    println!("Usage: pgdb config <COMMAND>");
    println!();
    println!("Commands:");
    println!("  list    List all configured connections");
    println!("  add     Add a new connection");
    println!("  edit    Edit an existing connection");
    println!("  remove  Remove a connection");
    println!("  use     Set the default connection");
}

pub fn config_list(path: &Path) -> Result<()> {
    let store = match ProfileStore::load(path) {
        Ok(store) => store,
        Err(StoreError::Missing(_)) => {
            println!(
                "{}",
                "No connections file found. Run 'pgdb config add' to create one.".yellow()
            );
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    if store.connections.is_empty() {
        println!(
            "{}",
            "No connections configured. Run 'pgdb config add' to add one.".yellow()
        );
        return Ok(());
    }

    println!("{}", "Available database connections:".bold());
    for conn in &store.connections {
        let is_default = conn.name == store.default_connection;
        let marker = if is_default { "→".green() } else { " ".normal() };
        let name = if is_default {
            conn.name.green().bold()
        } else {
            conn.name.normal()
        };
        println!(
            "  {} {} - {}@{}:{}/{}",
            marker, name, conn.user, conn.host, conn.port, conn.dbname
        );
    }
    Ok(())
}

pub fn config_add<P: Prompter>(path: &Path, prompter: &mut P) -> Result<()> {
    let mut store = match ProfileStore::load(path) {
        Ok(store) => store,
        Err(StoreError::Missing(_)) => ProfileStore::default(),
        Err(e) => return Err(e.into()),
    };

    let name = prompter.ask("Connection name", "")?;
    if name.is_empty() {
        bail!("connection name cannot be empty");
    }
    if store.find(&name).is_some() {
        bail!("connection name '{}' is already in use", name);
    }

    let host = prompter.ask("Database host", "localhost")?;
    let port = ask_port(prompter, "Database port", 5432)?;
    let user = prompter.ask("Database user", "")?;
    let password = prompter.ask_hidden("Database password")?;
    let dbname = prompter.ask("Database name", "")?;
    let sslmode = prompter.ask("SSL mode", "disable")?;

    store.add(ConnectionProfile {
        name: name.clone(),
        host,
        port,
        user,
        password,
        dbname,
        sslmode,
    })?;
    store.save(path)?;

    println!("{} Added connection '{}'", "✓".green(), name.cyan());
    if store.default_connection == name {
        println!("  '{}' is now the default connection", name);
    }
    Ok(())
}

pub fn config_edit<P: Prompter>(path: &Path, target: &str, prompter: &mut P) -> Result<()> {
    let mut store = ProfileStore::load(path)?;
    let current = store
        .find(target)
        .ok_or_else(|| StoreError::NotFound(target.to_string()))?
        .clone();

    println!("{}", format!("Editing connection '{}'", target).bold());
    println!("Press Enter to keep the current value.\n");

    let was_default = store.default_connection == target;

    let name = prompter.ask("Connection name", &current.name)?;
    let host = prompter.ask("Database host", &current.host)?;
    let port = ask_port(prompter, "Database port", current.port)?;
    let user = prompter.ask("Database user", &current.user)?;
    let password = prompter.ask_hidden("Database password (blank to keep current)")?;
    let dbname = prompter.ask("Database name", &current.dbname)?;
    let sslmode = prompter.ask("SSL mode", &current.sslmode)?;

    store.edit(
        target,
        ProfileUpdate {
            name: Some(name),
            host: Some(host),
            port: Some(port),
            user: Some(user),
            password: if password.is_empty() {
                None
            } else {
                Some(password)
            },
            dbname: Some(dbname),
            sslmode: Some(sslmode),
        },
    )?;
    store.save(path)?;

    println!("{} Updated connection '{}'", "✓".green(), target.cyan());
    if was_default && store.default_connection != target {
        println!(
            "  Default connection is now '{}'",
            store.default_connection.cyan()
        );
    }
    Ok(())
}

pub fn config_remove<P: Prompter>(
    path: &Path,
    target: &str,
    force: bool,
    prompter: &mut P,
) -> Result<()> {
    let mut store = ProfileStore::load(path)?;
    if store.find(target).is_none() {
        bail!("connection '{}' not found", target);
    }

    if !force && !prompter.confirm(&format!("Remove connection '{}'?", target))? {
        println!("Cancelled");
        return Ok(());
    }

    store.remove(target)?;
    store.save(path)?;

    println!("{} Removed connection '{}'", "✓".green(), target);
    if !store.default_connection.is_empty() {
        println!(
            "  Default connection is now '{}'",
            store.default_connection.cyan()
        );
    }
    Ok(())
}

pub fn config_use(path: &Path, target: &str) -> Result<()> {
    let mut store = ProfileStore::load(path)?;
    store.set_default(target)?;
    store.save(path)?;

    println!(
        "{} Default connection set to '{}'",
        "✓".green(),
        target.cyan()
    );
    Ok(())
}

pub fn completions(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}

fn ask_port<P: Prompter>(prompter: &mut P, label: &str, default: u16) -> Result<u16> {
    let answer = prompter.ask(label, &default.to_string())?;
    let port: u16 = answer
        .trim()
        .parse()
        .with_context(|| format!("invalid port '{}'", answer.trim()))?;
    if port == 0 {
        bail!("port must be between 1 and 65535");
    }
    Ok(port)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::path::PathBuf;

    /// Prompter fed from canned answers; an empty answer takes the default,
    /// mirroring how the terminal prompter behaves.
    struct ScriptedPrompter {
        answers: VecDeque<&'static str>,
        confirms: VecDeque<bool>,
    }

    impl ScriptedPrompter {
        fn new(answers: &[&'static str], confirms: &[bool]) -> Self {
            Self {
                answers: answers.iter().copied().collect(),
                confirms: confirms.iter().copied().collect(),
            }
        }
    }

    impl Prompter for ScriptedPrompter {
        fn ask(&mut self, _label: &str, default: &str) -> Result<String> {
            let answer = self.answers.pop_front().expect("ran out of answers");
            if answer.is_empty() {
                Ok(default.to_string())
            } else {
                Ok(answer.to_string())
            }
        }

        fn ask_hidden(&mut self, _label: &str) -> Result<String> {
            Ok(self
                .answers
                .pop_front()
                .expect("ran out of answers")
                .to_string())
        }

        fn confirm(&mut self, _label: &str) -> Result<bool> {
            Ok(self.confirms.pop_front().expect("ran out of confirms"))
        }
    }

    fn temp_store_path(dir: &tempfile::TempDir) -> PathBuf {
        dir.path().join("connections.yaml")
    }

    fn seed_store(path: &Path, names: &[&str]) {
        let mut store = ProfileStore::default();
        for name in names {
            store
                .add(ConnectionProfile {
                    name: name.to_string(),
                    host: "localhost".to_string(),
                    port: 5432,
                    user: "postgres".to_string(),
                    password: "secret".to_string(),
                    dbname: "postgres".to_string(),
                    sslmode: "disable".to_string(),
                })
                .unwrap();
        }
        store.save(path).unwrap();
    }

    #[test]
    fn add_flow_creates_file_and_sets_first_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_store_path(&dir);
        // name, host, port, user, password, dbname, sslmode
        let mut prompter = ScriptedPrompter::new(
            &["local", "", "", "postgres", "pw", "appdb", ""],
            &[],
        );

        config_add(&path, &mut prompter).unwrap();

        let store = ProfileStore::load(&path).unwrap();
        assert_eq!(store.default_connection, "local");
        let conn = store.find("local").unwrap();
        assert_eq!(conn.host, "localhost");
        assert_eq!(conn.port, 5432);
        assert_eq!(conn.password, "pw");
        assert_eq!(conn.dbname, "appdb");
        assert_eq!(conn.sslmode, "disable");
    }

    #[test]
    fn add_rejects_duplicate_name_before_saving() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_store_path(&dir);
        seed_store(&path, &["local"]);

        let mut prompter = ScriptedPrompter::new(&["local"], &[]);
        let err = config_add(&path, &mut prompter).unwrap_err();
        assert!(err.to_string().contains("already in use"));

        let store = ProfileStore::load(&path).unwrap();
        assert_eq!(store.connections.len(), 1);
    }

    #[test]
    fn add_rejects_invalid_port() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_store_path(&dir);

        let mut prompter = ScriptedPrompter::new(&["local", "", "not-a-port"], &[]);
        let err = config_add(&path, &mut prompter).unwrap_err();
        assert!(err.to_string().contains("invalid port"));
        assert!(!path.exists());
    }

    #[test]
    fn edit_blank_answers_keep_current_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_store_path(&dir);
        seed_store(&path, &["dev"]);

        // Only the host changes; everything else is left blank.
        let mut prompter =
            ScriptedPrompter::new(&["", "newhost", "", "", "", "", ""], &[]);
        config_edit(&path, "dev", &mut prompter).unwrap();

        let store = ProfileStore::load(&path).unwrap();
        let conn = store.find("dev").unwrap();
        assert_eq!(conn.host, "newhost");
        assert_eq!(conn.user, "postgres");
        assert_eq!(conn.password, "secret");
        assert_eq!(conn.dbname, "postgres");
        assert_eq!(conn.sslmode, "disable");
    }

    #[test]
    fn edit_rename_of_default_tracks_new_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_store_path(&dir);
        seed_store(&path, &["dev", "prod"]);

        let mut prompter =
            ScriptedPrompter::new(&["dev2", "", "", "", "", "", ""], &[]);
        config_edit(&path, "dev", &mut prompter).unwrap();

        let store = ProfileStore::load(&path).unwrap();
        assert_eq!(store.default_connection, "dev2");
        assert_eq!(store.connections.len(), 2);
    }

    #[test]
    fn edit_unknown_connection_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_store_path(&dir);
        seed_store(&path, &["dev"]);

        let mut prompter = ScriptedPrompter::new(&[], &[]);
        let err = config_edit(&path, "missing", &mut prompter).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn remove_declined_confirmation_is_a_noop() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_store_path(&dir);
        seed_store(&path, &["dev", "prod"]);

        let mut prompter = ScriptedPrompter::new(&[], &[false]);
        config_remove(&path, "dev", false, &mut prompter).unwrap();

        let store = ProfileStore::load(&path).unwrap();
        assert_eq!(store.connections.len(), 2);
        assert_eq!(store.default_connection, "dev");
    }

    #[test]
    fn remove_confirmed_promotes_next_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_store_path(&dir);
        seed_store(&path, &["dev", "prod"]);

        let mut prompter = ScriptedPrompter::new(&[], &[true]);
        config_remove(&path, "dev", false, &mut prompter).unwrap();

        let store = ProfileStore::load(&path).unwrap();
        assert_eq!(store.connections.len(), 1);
        assert_eq!(store.default_connection, "prod");
    }

    #[test]
    fn use_sets_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_store_path(&dir);
        seed_store(&path, &["dev", "prod"]);

        config_use(&path, "prod").unwrap();

        let store = ProfileStore::load(&path).unwrap();
        assert_eq!(store.default_connection, "prod");
    }

    #[test]
    fn list_without_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_store_path(&dir);
        config_list(&path).unwrap();
    }
}
