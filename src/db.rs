use anyhow::{Context, Result};
use colored::*;
use postgres::{Client, NoTls};

/// Connects and pings before handing the client out, so report commands fail
/// fast on a bad profile.
pub fn connect(url: &str) -> Result<Client> {
    let mut client = Client::connect(url, NoTls).context("Failed to connect to the database")?;
    client
        .query_one("SELECT 1", &[])
        .context("Failed to ping the database")?;
    println!("{} Connected to the database", "✓".green());
    Ok(client)
}

pub fn schemas(client: &mut Client) -> Result<()> {
    let rows = client.query(
        "SELECT DISTINCT table_schema::text \
         FROM information_schema.tables \
         WHERE table_schema NOT IN ('public', 'sde') \
         ORDER BY table_schema",
        &[],
    )?;

    println!("{}", "Schemas in the database:".bold());
    for row in &rows {
        let name: String = row.get(0);
        println!("  {}", name.cyan());
    }
    Ok(())
}

pub fn connections(client: &mut Client) -> Result<()> {
    let rows = client.query(
        "SELECT COALESCE(usename::text, 'none') AS username, count(*) \
         FROM pg_stat_activity \
         GROUP BY usename",
        &[],
    )?;

    println!("{}", "Active connections by user:".bold());
    let mut total: i64 = 0;
    for row in &rows {
        let username: String = row.get(0);
        let count: i64 = row.get(1);
        total += count;
        println!("  {} {}", username.cyan(), count);
    }
    println!("{} {}", "Total:".bold(), total);
    Ok(())
}

pub fn users(client: &mut Client) -> Result<()> {
    let rows = client.query(
        "SELECT COALESCE(usename::text, 'none') AS username FROM pg_user ORDER BY usename",
        &[],
    )?;

    println!("{}", "Users in the database:".bold());
    for row in &rows {
        let username: String = row.get(0);
        println!("  {}", username.cyan());
    }
    Ok(())
}

/// Total size of every non-system schema, largest first.
pub fn schema_sizes(client: &mut Client) -> Result<()> {
    let rows = client.query(
        "SELECT n.nspname::text AS schema, \
                pg_size_pretty(COALESCE(SUM(pg_total_relation_size(c.oid)), 0)) AS size \
         FROM pg_namespace n \
         LEFT JOIN pg_class c ON c.relnamespace = n.oid AND c.relkind IN ('r', 'm', 'i', 't') \
         WHERE n.nspname NOT IN ('pg_catalog', 'information_schema') \
           AND n.nspname NOT LIKE 'pg_toast%' \
         GROUP BY n.nspname \
         ORDER BY COALESCE(SUM(pg_total_relation_size(c.oid)), 0) DESC",
        &[],
    )?;

    println!("{}", "Schema sizes:".bold());
    for row in &rows {
        let schema: String = row.get(0);
        let size: String = row.get(1);
        println!("  {} {}", schema.cyan(), size);
    }
    Ok(())
}

/// Per-table sizes within a single schema. The schema name is bound as a
/// parameter, never interpolated into the SQL text.
pub fn table_sizes(client: &mut Client, schema: &str) -> Result<()> {
    let rows = client.query(
        "SELECT c.relname::text AS table, \
                pg_size_pretty(pg_total_relation_size(c.oid)) AS size \
         FROM pg_class c \
         JOIN pg_namespace n ON n.oid = c.relnamespace \
         WHERE n.nspname = $1 AND c.relkind = 'r' \
         ORDER BY pg_total_relation_size(c.oid) DESC",
        &[&schema],
    )?;

    if rows.is_empty() {
        println!("{}", format!("No tables found in schema '{}'", schema).yellow());
        return Ok(());
    }

    println!("{}", format!("Table sizes in schema '{}':", schema).bold());
    for row in &rows {
        let table: String = row.get(0);
        let size: String = row.get(1);
        println!("  {} {}", table.cyan(), size);
    }
    Ok(())
}
