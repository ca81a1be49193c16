use clap::{CommandFactory, Parser};
use log::{debug, warn};
use std::io::{self, BufRead};
use std::time::Instant;
use time::{OffsetDateTime, UtcOffset};
use todolist_cli::cli::{
    Cli, Command, DraftFieldName, Line, expand_alias, overrides_from_args, parse_date,
    split_command_line,
};
use todolist_cli::render;
use todolist_core::config::{self, Config};
use todolist_core::error::AppError;
use todolist_core::model::{FilterPatch, StatusFilter, TaskStatus};
use todolist_core::notify::notifier_for;
use todolist_core::session::{DraftField, SaveOutcome, Session};

const LOG_ENV_VAR: &str = "TODOLIST_LOG";

struct Shell {
    session: Session,
    config: Config,
    json: bool,
}

fn now_local() -> OffsetDateTime {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    OffsetDateTime::now_utc().to_offset(offset)
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn print_help() {
    let mut cmd = Line::command();
    let help = cmd.render_help();
    println!("{help}");
}

fn print_list(shell: &Shell) -> Result<(), AppError> {
    let rows = shell.session.store().filtered_view_indexed();
    if shell.json {
        println!("{}", render::render_tasks_json(&rows)?);
    } else {
        println!("{}", render::render_filter(shell.session.store().filter()));
        println!("{}", render::render_tasks(&rows, &shell.config.palette())?);
    }
    Ok(())
}

fn print_draft(shell: &Shell) -> Result<(), AppError> {
    let draft = shell
        .session
        .draft()
        .ok_or_else(|| AppError::invalid_input("no task is being edited"))?;
    if shell.json {
        println!("{}", render::render_draft_json(draft)?);
    } else {
        println!("{}", render::render_draft(draft, &shell.config.palette())?);
    }
    Ok(())
}

fn draft_field(field: DraftFieldName, value: &[String]) -> Result<DraftField, AppError> {
    let value = value.join(" ");
    match field {
        DraftFieldName::Title => Ok(DraftField::Title(value)),
        DraftFieldName::Description => Ok(DraftField::Description(value)),
        DraftFieldName::Date => Ok(DraftField::Date(parse_date(&value)?)),
        DraftFieldName::Status => Ok(DraftField::Status(value.parse::<TaskStatus>()?)),
    }
}

fn run_save(shell: &mut Shell) -> Result<(), AppError> {
    let ticket = shell.session.save(Instant::now())?;
    if !shell.json {
        println!("Saving...");
    }

    if let Some(due) = shell.session.pending_due() {
        std::thread::sleep(due.saturating_duration_since(Instant::now()));
    }

    let outcome = match shell.session.poll(Instant::now()) {
        Some(outcome) => outcome,
        None => shell
            .session
            .finish_save(ticket)
            .ok_or_else(|| AppError::invalid_input("save was cancelled"))?,
    };

    let (verb, id) = match outcome {
        SaveOutcome::Added(id) => ("Added", id),
        SaveOutcome::Updated(id) => ("Updated", id),
        SaveOutcome::Failed(err) => return Err(err),
    };

    let store = shell.session.store();
    let index = store
        .position(id)
        .ok_or_else(|| AppError::not_found(format!("{id} no longer exists")))?;
    let task = &store.tasks()[index];
    if shell.json {
        println!("{}", render::render_task_json(index, task)?);
    } else {
        println!("{verb} task #{index}: {}", task.title);
    }
    Ok(())
}

fn run_command(shell: &mut Shell, command: Command) -> Result<(), AppError> {
    debug!("running {command:?}");
    match command {
        Command::List => print_list(shell)?,
        Command::Filter {
            title,
            status,
            clear,
        } => {
            let patch = if clear {
                FilterPatch::reset()
            } else {
                FilterPatch {
                    title_query: title,
                    status: status.as_deref().map(str::parse::<StatusFilter>).transpose()?,
                }
            };
            shell.session.set_filter(patch);
            print_list(shell)?;
        }
        Command::New => {
            shell.session.begin_create(now_local())?;
            print_draft(shell)?;
        }
        Command::Edit { index } => {
            shell.session.begin_edit(index)?;
            print_draft(shell)?;
        }
        Command::Set { field, value } => {
            shell
                .session
                .update_draft_field(draft_field(field, &value)?)?;
            print_draft(shell)?;
        }
        Command::Draft => print_draft(shell)?,
        Command::Save => run_save(shell)?,
        Command::Cancel => {
            shell.session.cancel_edit();
            if !shell.json {
                println!("Draft discarded");
            }
        }
        Command::Toggle { index } => {
            let status = shell.session.toggle_complete(index)?;
            let task = &shell.session.store().tasks()[index];
            if shell.json {
                println!("{}", render::render_task_json(index, task)?);
            } else {
                println!("Task #{index} is now {}: {}", status.label(), task.title);
            }
        }
        Command::Delete { index } => {
            let removed = shell.session.delete_task(index)?;
            if shell.json {
                println!("{}", render::render_task_json(index, &removed)?);
            } else {
                println!("Deleted task #{index}: {}", removed.title);
            }
        }
    }

    Ok(())
}

fn run_line(shell: &mut Shell, line: &str) -> Result<(), AppError> {
    let args = split_command_line(line)?;
    let args = expand_alias(args, &shell.config.aliases)?;
    if args.is_empty() {
        return Ok(());
    }

    let parsed = match Line::try_parse_from(args) {
        Ok(parsed) => parsed,
        Err(err) if !err.use_stderr() => {
            print!("{err}");
            return Ok(());
        }
        Err(err) => return Err(normalize_parse_error(err)),
    };
    run_command(shell, parsed.command)
}

fn run_interactive(shell: &mut Shell) -> Result<(), AppError> {
    let mut input = String::new();
    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();

    loop {
        input.clear();
        let bytes = stdin_lock
            .read_line(&mut input)
            .map_err(|err| AppError::io(err.to_string()))?;

        if bytes == 0 {
            break;
        }

        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        if line == "help" || line == "?" {
            print_help();
            continue;
        }

        if let Err(err) = run_line(shell, line) {
            eprintln!("ERROR: {}", err);
        }
    }

    Ok(())
}

fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::new().filter_or(LOG_ENV_VAR, "warn")).init();
}

fn load_config(cli: &Cli) -> Result<Config, AppError> {
    let overrides = overrides_from_args(&cli.config_override)?;
    let loaded = config::load_config_with_fallback();
    if let Some(err) = loaded.error {
        warn!("ignoring configuration file: {err}");
    }
    Ok(config::merge_overrides(&loaded.config, &overrides))
}

fn main() {
    init_logging();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if !err.use_stderr() => err.exit(),
        Err(err) => {
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("ERROR: {}", err);
            std::process::exit(1);
        }
    };

    let session = Session::new(
        notifier_for(config.notification_mode()),
        config.save_delay(),
    );
    let mut shell = Shell {
        session,
        config,
        json: cli.json,
    };

    if let Err(err) = run_interactive(&mut shell) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
