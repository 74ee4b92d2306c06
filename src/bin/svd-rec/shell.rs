//! Interactive lookup loop over a loaded store.
//!
//! Lookup errors are reported and the loop keeps going; only I/O and
//! rendering failures end it.

use crate::error::Result;
use crate::output;
use std::io::{BufRead, Write};
use svd_recommender::report::{render_products, render_users, OutputFormat};
use svd_recommender::ModelStore;

const HELP: &str = "\
Commands:
  products <USER_ID> [N]    top-N products for a user
  users <PRODUCT_ID> [N]    users in the product's cluster
  help                      show this message
  quit | exit               leave the shell";

/// A parsed shell line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ShellCommand {
    Products { id: String, top_n: Option<usize> },
    Users { id: String, top_n: Option<usize> },
    Help,
    Quit,
}

/// Whether the loop continues after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CommandResult {
    Continue,
    Quit,
}

/// Parses one input line. Blank lines yield `Ok(None)`.
pub(crate) fn parse_command(line: &str) -> std::result::Result<Option<ShellCommand>, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };

    let command = match verb {
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" => ShellCommand::Quit,
        "products" | "users" => {
            let id = words
                .next()
                .ok_or_else(|| format!("usage: {verb} <ID> [N]"))?
                .to_string();
            let top_n = words
                .next()
                .map(|n| {
                    n.parse::<usize>()
                        .map_err(|_| format!("invalid top-n: {n:?}"))
                })
                .transpose()?;
            if let Some(extra) = words.next() {
                return Err(format!("unexpected argument: {extra:?}"));
            }
            if verb == "products" {
                ShellCommand::Products { id, top_n }
            } else {
                ShellCommand::Users { id, top_n }
            }
        }
        other => return Err(format!("unknown command: {other:?} (try `help`)")),
    };
    Ok(Some(command))
}

fn execute(
    store: &ModelStore,
    command: ShellCommand,
    out: &mut impl Write,
    format: OutputFormat,
) -> Result<CommandResult> {
    let default_n = store.limits().default_top_n;
    match command {
        ShellCommand::Help => writeln!(out, "{HELP}")?,
        ShellCommand::Quit => return Ok(CommandResult::Quit),
        ShellCommand::Products { id, top_n } => {
            match store.recommend_products(&id, top_n.unwrap_or(default_n)) {
                Ok(recs) => output::report(out, &render_products(&recs, format, false)?, format)?,
                Err(e) => writeln!(out, "error: {e}")?,
            }
        }
        ShellCommand::Users { id, top_n } => {
            match store.recommend_users(&id, top_n.unwrap_or(default_n)) {
                Ok(recs) => output::report(out, &render_users(&recs, format)?, format)?,
                Err(e) => writeln!(out, "error: {e}")?,
            }
        }
    }
    Ok(CommandResult::Continue)
}

/// Runs the loop until `quit` or end of input.
pub(crate) fn run(
    store: &ModelStore,
    input: impl BufRead,
    out: &mut impl Write,
    format: OutputFormat,
    prompt: bool,
) -> Result<()> {
    if prompt {
        writeln!(
            out,
            "{} users, {} products loaded. Type `help` for commands.",
            store.n_users(),
            store.n_products()
        )?;
    }

    let mut lines = input.lines();
    loop {
        if prompt {
            write!(out, "svd-rec> ")?;
            out.flush()?;
        }

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;

        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(msg) => {
                writeln!(out, "error: {msg}")?;
                continue;
            }
        };

        tracing::debug!(?command, "shell command");
        if execute(store, command, out, format)? == CommandResult::Quit {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use svd_recommender::prelude::*;

    fn store() -> ModelStore {
        ModelStore::from_parts(ModelParts {
            user_factors: Matrix::from_vec(1, 2, vec![1.0, 0.0]).expect("1x2"),
            singular_values: Vector::from_slice(&[2.0, 1.0]),
            product_factors_t: Matrix::from_vec(2, 3, vec![1.0, 0.0, 0.0, 0.0, 1.0, 1.0])
                .expect("2x3"),
            users: vec![UserRecord::new("U1", 3)],
            products: vec![
                ProductRecord::new("P1", 3),
                ProductRecord::new("P2", 1),
                ProductRecord::new("P3", 3),
            ],
        })
        .expect("consistent")
    }

    fn session(input: &str) -> String {
        let mut out = Vec::new();
        run(&store(), input.as_bytes(), &mut out, OutputFormat::Table, false).expect("session");
        String::from_utf8(out).expect("utf8")
    }

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("   "), Ok(None));
        assert_eq!(parse_command("help"), Ok(Some(ShellCommand::Help)));
        assert_eq!(parse_command("exit"), Ok(Some(ShellCommand::Quit)));
        assert_eq!(
            parse_command("products U1 5"),
            Ok(Some(ShellCommand::Products {
                id: "U1".into(),
                top_n: Some(5)
            }))
        );
        assert_eq!(
            parse_command("users P9"),
            Ok(Some(ShellCommand::Users {
                id: "P9".into(),
                top_n: None
            }))
        );
    }

    #[test]
    fn test_parse_command_errors() {
        assert!(parse_command("products").is_err());
        assert!(parse_command("products U1 many").is_err());
        assert!(parse_command("products U1 2 3").is_err());
        assert!(parse_command("recommend U1").is_err());
    }

    #[test]
    fn test_session_runs_lookups() {
        let text = session("products U1 2\nusers P3\n");
        assert!(text.contains("User ID: U1 | Cluster: 3"));
        assert!(text.contains("P1"));
        assert!(text.contains("Product ID: P3 | Cluster: 3"));
    }

    #[test]
    fn test_errors_do_not_end_session() {
        let text = session("products nobody\nbogus\nusers P2 0\nusers P1 1\n");
        assert!(text.contains("error: unknown user id: \"nobody\""));
        assert!(text.contains("error: unknown command"));
        assert!(text.contains("error: invalid top-n: 0"));
        assert!(text.contains("Product ID: P1 | Cluster: 3"));
    }

    #[test]
    fn test_quit_stops_reading() {
        let text = session("quit\nproducts U1\n");
        assert!(text.is_empty());
    }

    #[test]
    fn test_help() {
        assert!(session("help\n").contains("products <USER_ID> [N]"));
    }
}
