use clap::{Parser, Subcommand, ValueEnum};
use std::collections::HashMap;
use time::Date;
use time::macros::format_description;
use todolist_core::config::{ConfigOverrides, canonical_key};
use todolist_core::error::AppError;
use todolist_core::notify::NotificationMode;

/// Interactive in-memory to-do list. Reads one command per line from stdin.
#[derive(Parser, Debug)]
#[command(name = "todolist", author, version, about, long_about = None)]
pub struct Cli {
    /// Output JSON
    #[arg(long)]
    pub json: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE")]
    pub config_override: Vec<String>,
}

/// One line typed into the shell.
#[derive(Parser, Debug)]
#[command(name = "todolist", no_binary_name = true, disable_version_flag = true)]
pub struct Line {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List tasks matching the current filter
    ///
    /// Example: list
    List,
    /// Change the filter
    ///
    /// Example: filter --title milk
    /// Example: filter --status completed
    /// Example: filter --clear
    Filter {
        #[arg(long)]
        title: Option<String>,
        #[arg(long, value_name = "all|pending|completed")]
        status: Option<String>,
        #[arg(long, conflicts_with_all = ["title", "status"])]
        clear: bool,
    },
    /// Open a blank draft for a new task
    ///
    /// Example: new
    New,
    /// Open a draft copy of the task at INDEX
    ///
    /// Example: edit 0
    Edit { index: usize },
    /// Set a field of the open draft
    ///
    /// Example: set title Buy milk
    /// Example: set date 24/12/2024
    /// Example: set status completed
    Set {
        field: DraftFieldName,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        value: Vec<String>,
    },
    /// Show the open draft
    ///
    /// Example: draft
    Draft,
    /// Save the open draft
    ///
    /// Example: save
    Save,
    /// Discard the open draft
    ///
    /// Example: cancel
    Cancel,
    /// Switch the task at INDEX between pending and completed
    ///
    /// Example: toggle 0
    Toggle { index: usize },
    /// Delete the task at INDEX
    ///
    /// Example: delete 0
    Delete { index: usize },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DraftFieldName {
    Title,
    Description,
    Date,
    Status,
}

/// Accepts `dd/mm/yyyy` (with or without zero padding) and `yyyy-mm-dd`.
pub fn parse_date(raw: &str) -> Result<Date, AppError> {
    let trimmed = raw.trim();
    let padded = format_description!("[day]/[month]/[year]");
    let unpadded = format_description!("[day padding:none]/[month padding:none]/[year]");
    let iso = format_description!("[year]-[month]-[day]");

    Date::parse(trimmed, padded)
        .or_else(|_| Date::parse(trimmed, unpadded))
        .or_else(|_| Date::parse(trimmed, iso))
        .map_err(|_| {
            AppError::invalid_input(format!(
                "invalid date '{trimmed}' (expected dd/mm/yyyy or yyyy-mm-dd)"
            ))
        })
}

pub fn split_command_line(line: &str) -> Result<Vec<String>, AppError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escape = false;
    // Set once a quote opens, so `""` still yields an (empty) argument.
    let mut token_started = false;

    for ch in line.chars() {
        if escape {
            if ch != '"' && ch != '\\' {
                current.push('\\');
            }
            current.push(ch);
            escape = false;
            continue;
        }

        if in_quotes && ch == '\\' {
            escape = true;
            continue;
        }

        if ch == '"' {
            in_quotes = !in_quotes;
            token_started = true;
            continue;
        }

        if ch.is_whitespace() && !in_quotes {
            if token_started || !current.is_empty() {
                args.push(std::mem::take(&mut current));
                token_started = false;
            }
            continue;
        }

        current.push(ch);
    }

    if in_quotes {
        return Err(AppError::invalid_input("unterminated quote in command"));
    }

    if token_started || !current.is_empty() {
        args.push(current);
    }

    Ok(args)
}

/// Replaces a leading alias with its configured expansion.
pub fn expand_alias(
    args: Vec<String>,
    aliases: &HashMap<String, String>,
) -> Result<Vec<String>, AppError> {
    let Some(expansion) = args.first().and_then(|first| aliases.get(first)) else {
        return Ok(args);
    };

    let mut expanded = split_command_line(expansion)?;
    expanded.extend(args.into_iter().skip(1));
    Ok(expanded)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    Theme,
    Alias(String),
    SaveDelay,
    Notifications,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let trimmed = raw.trim();
    let (key_raw, value_raw) = trimmed
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let value = value_raw.trim().to_string();
    let (field, remainder) = key_raw
        .split_once('.')
        .map(|(field, rest)| (field.trim(), Some(rest.trim())))
        .unwrap_or((key_raw.trim(), None));

    let canonical_field = canonical_key(field);
    if canonical_field.is_empty() {
        return Err("override key cannot be empty".to_string());
    }

    let target = match canonical_field.as_str() {
        "aliases" | "alias" => {
            let alias_name = remainder
                .filter(|segment| !segment.is_empty())
                .ok_or_else(|| "aliases override requires an alias name".to_string())?;
            return Ok(ParsedConfigOverride {
                target: ConfigOverrideTarget::Alias(alias_name.to_string()),
                value,
            });
        }
        "theme" => ConfigOverrideTarget::Theme,
        "save_delay_ms" | "save_delay" => ConfigOverrideTarget::SaveDelay,
        "notifications" | "notify" => ConfigOverrideTarget::Notifications,
        other => return Err(format!("unknown config field '{other}'")),
    };

    if remainder.is_some() {
        return Err(format!("{canonical_field} override cannot have subfields"));
    }

    Ok(ParsedConfigOverride { target, value })
}

pub fn overrides_from_args(raw: &[String]) -> Result<ConfigOverrides, AppError> {
    let mut overrides = ConfigOverrides::default();

    for entry in raw {
        let parsed = parse_config_override(entry).map_err(AppError::invalid_input)?;
        match parsed.target {
            ConfigOverrideTarget::Theme => overrides.theme = Some(parsed.value),
            ConfigOverrideTarget::Alias(name) => {
                overrides.aliases.insert(name, parsed.value);
            }
            ConfigOverrideTarget::SaveDelay => {
                let millis = parsed.value.parse::<u64>().map_err(|_| {
                    AppError::invalid_input(format!(
                        "save_delay_ms must be a whole number of milliseconds, got '{}'",
                        parsed.value
                    ))
                })?;
                overrides.save_delay_ms = Some(millis);
            }
            ConfigOverrideTarget::Notifications => {
                let mode = NotificationMode::parse(&parsed.value).ok_or_else(|| {
                    AppError::invalid_input(format!(
                        "notifications must be console, desktop or off, got '{}'",
                        parsed.value
                    ))
                })?;
                overrides.notifications = Some(mode);
            }
        }
    }

    Ok(overrides)
}
