/*!
# Introduction

settingsctl reads and changes settings documents kept in a filesystem document store.

Changes are made through a settings overlay, so only the fields you name are written, and each
applied change is printed.  Documents can also be created, removed, and populated in bulk from a
TOML file whose top-level tables are documents:

```toml
["s#mysql"]
dataset-size = "80%"
tuning = { level = "safest" }
```
*/

#![deny(rust_2018_idioms)]

#[macro_use]
extern crate log;

use snafu::{OptionExt, ResultExt};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::{env, process};

use settings_store::store::FilesystemDocumentStore;
use settings_store::{
    create_settings, overwrite_settings, read_settings, remove_settings, DocumentStore, Fields,
    Value,
};

mod error {
    use snafu::Snafu;
    use std::io;
    use std::path::PathBuf;

    /// Potential errors during execution
    #[derive(Debug, Snafu)]
    #[snafu(visibility = "pub(super)")]
    pub(super) enum Error {
        #[snafu(display("Logger setup error: {}", source))]
        Logger { source: log::SetLoggerError },

        #[snafu(display("Failed to {} settings: {}", op, source))]
        Settings {
            op: &'static str,
            source: settings_store::Error,
        },

        #[snafu(display("Settings '{}' have no field '{}'", key, field))]
        MissingField { key: String, field: String },

        #[snafu(display("Failed to read defaults from '{}': {}", path.display(), source))]
        DefaultsRead { path: PathBuf, source: io::Error },

        #[snafu(display("Defaults in '{}' are not valid TOML: {}", path.display(), source))]
        DefaultsFormatting {
            path: PathBuf,
            source: toml::de::Error,
        },

        #[snafu(display("Defaults for '{}' are not a TOML table", key))]
        DocumentNotTable { key: String },

        #[snafu(display("Default '{}' of '{}' holds a float JSON can't represent", field, key))]
        DefaultsConvert { key: String, field: String },

        #[snafu(display("Unable to format output: {}", source))]
        Output { source: serde_json::Error },
    }
}

type Result<T> = std::result::Result<T, error::Error>;

/// The operation requested on the command line.
#[derive(Debug, PartialEq)]
enum Command {
    Get { key: String, field: Option<String> },
    Set { key: String, values: Fields },
    Unset { key: String, fields: Vec<String> },
    Create { key: String, values: Fields },
    Remove { key: String },
    Populate { path: PathBuf },
}

/// Stores user-supplied arguments.
struct Args {
    verbosity: usize,
    color: stderrlog::ColorChoice,
    datastore_path: String,
    command: Command,
}

/// Informs the user about proper usage of the program and exits.
fn usage() -> ! {
    let program_name = env::args().next().unwrap_or_else(|| "program".to_string());
    eprintln!(
        r"Usage: {}
            --datastore-path PATH
            [ --no-color ]
            [ --verbose --verbose ... ]
            COMMAND

    Options must come before COMMAND.

    Commands:
        get KEY [FIELD]
        set KEY FIELD=VALUE [FIELD=VALUE ...]
        unset KEY FIELD [FIELD ...]
        create KEY [FIELD=VALUE ...]
        remove KEY
        populate TOML-FILE

    VALUE is parsed as JSON if possible, and is otherwise taken as a string.",
        program_name
    );
    process::exit(2);
}

/// Prints a more specific message before exiting through usage().
fn usage_msg<S: AsRef<str>>(msg: S) -> ! {
    eprintln!("{}\n", msg.as_ref());
    usage();
}

/// Parses user arguments into an Args structure.
fn parse_args(args: env::Args) -> Args {
    let mut datastore_path = None;
    let mut verbosity = 2; // default to INFO level
    let mut color = stderrlog::ColorChoice::Auto;
    let mut command_args = Vec::new();

    let mut iter = args.skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "-v" | "--verbose" => verbosity += 1,

            "--no-color" => color = stderrlog::ColorChoice::Never,

            "--datastore-path" => {
                datastore_path = Some(
                    iter.next()
                        .unwrap_or_else(|| usage_msg("Did not give argument to --datastore-path")),
                )
            }

            // Everything from the first non-option on belongs to the command.
            _ => {
                command_args.push(arg);
                command_args.extend(&mut iter);
                break;
            }
        }
    }

    Args {
        verbosity,
        color,
        datastore_path: datastore_path.unwrap_or_else(|| usage()),
        command: parse_command(command_args).unwrap_or_else(|msg| usage_msg(msg)),
    }
}

/// Parses the command name and its arguments.
fn parse_command(args: Vec<String>) -> std::result::Result<Command, String> {
    let mut iter = args.into_iter();
    let name = iter.next().ok_or_else(|| "Did not give a command".to_string())?;
    let mut key = || {
        iter.next()
            .ok_or_else(|| format!("Did not give KEY to '{}'", name))
    };
    let key_arg = key()?;
    let rest: Vec<String> = iter.collect();

    // Options are only recognized before the command.
    if let Some(option) = rest.iter().chain(Some(&key_arg)).find(|a| a.starts_with('-')) {
        return Err(format!(
            "Options must come before the command, got '{}' after '{}'",
            option, name
        ));
    }

    let command = match name.as_ref() {
        "get" => {
            if rest.len() > 1 {
                return Err("'get' takes at most one FIELD".to_string());
            }
            Command::Get {
                key: key_arg,
                field: rest.into_iter().next(),
            }
        }
        "set" => {
            if rest.is_empty() {
                return Err("'set' needs at least one FIELD=VALUE".to_string());
            }
            Command::Set {
                key: key_arg,
                values: parse_assignments(&rest)?,
            }
        }
        "unset" => {
            if rest.is_empty() {
                return Err("'unset' needs at least one FIELD".to_string());
            }
            Command::Unset {
                key: key_arg,
                fields: rest,
            }
        }
        "create" => Command::Create {
            key: key_arg,
            values: parse_assignments(&rest)?,
        },
        "remove" if rest.is_empty() => Command::Remove { key: key_arg },
        "populate" if rest.is_empty() => Command::Populate {
            path: PathBuf::from(key_arg),
        },
        "remove" | "populate" => return Err(format!("Too many arguments to '{}'", name)),
        _ => return Err(format!("Unknown command '{}'", name)),
    };
    Ok(command)
}

/// Parses FIELD=VALUE arguments.  Values that aren't valid JSON are taken as strings, so
/// `a=1` sets a number and `a=hello` sets a string.
fn parse_assignments(args: &[String]) -> std::result::Result<Fields, String> {
    let mut values = Fields::new();
    for arg in args {
        let mut parts = arg.splitn(2, '=');
        let field = parts.next().unwrap_or_default();
        let raw = parts
            .next()
            .ok_or_else(|| format!("Expected FIELD=VALUE, got '{}'", arg))?;
        if field.is_empty() {
            return Err(format!("Empty FIELD in '{}'", arg));
        }
        let value =
            serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        values.insert(field.to_string(), value);
    }
    Ok(values)
}

/// Converts a TOML value to the equivalent settings value.  Datetimes become their RFC 3339
/// strings.  Returns None for NaN and infinite floats, which JSON can't hold.
fn toml_to_json(value: &toml::Value) -> Option<Value> {
    let json = match value {
        toml::Value::String(s) => Value::String(s.clone()),
        toml::Value::Integer(i) => Value::from(*i),
        toml::Value::Float(f) => Value::Number(serde_json::Number::from_f64(*f)?),
        toml::Value::Boolean(b) => Value::Bool(*b),
        toml::Value::Datetime(d) => Value::String(d.to_string()),
        toml::Value::Array(items) => Value::Array(
            items
                .iter()
                .map(toml_to_json)
                .collect::<Option<Vec<Value>>>()?,
        ),
        toml::Value::Table(table) => Value::Object(
            table
                .iter()
                .map(|(k, v)| toml_to_json(v).map(|v| (k.clone(), v)))
                .collect::<Option<serde_json::Map<String, Value>>>()?,
        ),
    };
    Some(json)
}

/// Converts one document's worth of TOML defaults to settings values.
fn toml_to_fields(key: &str, table: &toml::value::Table) -> Result<Fields> {
    table
        .iter()
        .map(|(field, value)| {
            let value = toml_to_json(value).context(error::DefaultsConvert { key, field })?;
            Ok((field.clone(), value))
        })
        .collect()
}

/// Creates a document for each top-level table of the given TOML file, overwriting documents
/// that already exist.
fn populate<S: DocumentStore>(store: &S, path: &Path) -> Result<()> {
    let defaults_str = fs::read_to_string(path).context(error::DefaultsRead { path })?;
    let defaults: toml::value::Table =
        toml::from_str(&defaults_str).context(error::DefaultsFormatting { path })?;

    for (key, doc) in &defaults {
        let table = doc.as_table().context(error::DocumentNotTable { key })?;
        let values = toml_to_fields(key, table)?;

        match create_settings(store, key, values.clone()) {
            Ok(_) => info!("Created settings '{}'", key),
            Err(settings_store::Error::AlreadyExists { .. }) => {
                overwrite_settings(store, key, values).context(error::Settings { op: "overwrite" })?;
                info!("Overwrote existing settings '{}'", key);
            }
            Err(e) => return Err(e).context(error::Settings { op: "create" }),
        }
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context(error::Output)?
    );
    Ok(())
}

/// Runs the requested command against the store.
fn run_command<S: DocumentStore>(store: &S, command: Command) -> Result<()> {
    match command {
        Command::Get { key, field } => {
            let settings = read_settings(store, &key).context(error::Settings { op: "read" })?;
            match field {
                Some(field) => {
                    let value = settings
                        .get(&field)
                        .context(error::MissingField { key: &key, field: &field })?;
                    print_json(value)?;
                }
                None => {
                    // Sorted, for readable output.
                    let sorted: BTreeMap<String, Value> = settings.map().into_iter().collect();
                    print_json(&sorted)?;
                }
            }
        }

        Command::Set { key, values } => {
            let mut settings =
                read_settings(store, &key).context(error::Settings { op: "read" })?;
            settings.update(values);
            for change in settings.write().context(error::Settings { op: "write" })? {
                println!("{}", change);
            }
        }

        Command::Unset { key, fields } => {
            let mut settings =
                read_settings(store, &key).context(error::Settings { op: "read" })?;
            for field in &fields {
                settings.delete(field);
            }
            for change in settings.write().context(error::Settings { op: "write" })? {
                println!("{}", change);
            }
        }

        Command::Create { key, values } => {
            create_settings(store, &key, values).context(error::Settings { op: "create" })?;
            info!("Created settings '{}'", key);
        }

        Command::Remove { key } => {
            remove_settings(store, &key).context(error::Settings { op: "remove" })?;
            info!("Removed settings '{}'", key);
        }

        Command::Populate { path } => populate(store, &path)?,
    }
    Ok(())
}

// Returning a Result from main makes it print a Debug representation of the error, but with Snafu
// we have nice Display representations of the error, so we wrap "main" (run) and print any error.
fn main() {
    if let Err(e) = run() {
        eprintln!("{}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = parse_args(env::args());

    stderrlog::new()
        .module(module_path!())
        .module("settings_store")
        .timestamp(stderrlog::Timestamp::Millisecond)
        .verbosity(args.verbosity)
        .color(args.color)
        .init()
        .context(error::Logger)?;

    debug!("Using datastore at {}", args.datastore_path);
    let store = FilesystemDocumentStore::new(&args.datastore_path);
    run_command(&store, args.command)
}
