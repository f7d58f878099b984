//! Command execution: one page controller per invocation.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::debug;

use portal_core::{
    AlwaysConfirm, ConfirmationGate, ExportFormat, FileStore, KeyValueStore, Notifier,
    PageController, PortalConfig, PortalError, Presentable, RecordRepository, TracingNotifier,
};
use portal_domain::{Activatable, Attachment, DefectGroup, Party, Record, Row, Ticket, TicketStatus};
use portal_search::{SearchMode, SortSpec};

use crate::cli::{Cli, Command, EntityCommand, FilterArgs};
use crate::error::{CliError, Result};
use crate::render;

/// Resolve config and storage, then run the requested command.
pub fn run(cli: Cli, now: DateTime<Utc>) -> Result<()> {
    let config = load_config(&cli)?;
    let data_dir = config
        .storage
        .resolved_data_dir()
        .ok_or(CliError::NoDataDir)?;
    debug!(data_dir = %data_dir.display(), user = %config.storage.user_id, "Opening store");

    let store = FileStore::open(&data_dir)?;
    let repository = RecordRepository::new(store, config.storage.user_id.clone());
    let mut out = io::stdout().lock();

    match cli.entity {
        EntityCommand::Parties(args) => {
            run_page::<Party>(&config, repository, args.command, now, &mut out)
        }
        EntityCommand::DefectGroups(args) => {
            run_page::<DefectGroup>(&config, repository, args.command, now, &mut out)
        }
        EntityCommand::Tickets(args) => {
            run_page::<Ticket>(&config, repository, args.command, now, &mut out)
        }
        EntityCommand::Attachments(args) => {
            run_page::<Attachment>(&config, repository, args.command, now, &mut out)
        }
    }
}

/// Config file (or defaults) with the command line overrides applied.
pub fn load_config(cli: &Cli) -> Result<PortalConfig> {
    let mut config = match config_path(cli) {
        Some(path) => PortalConfig::load(&path)?,
        None => PortalConfig::new(),
    };

    if let Some(dir) = &cli.data_dir {
        config.storage.data_dir = Some(dir.clone());
    }
    if let Some(user) = &cli.user {
        config.storage.user_id = user.clone();
    }

    config.validate()?;
    Ok(config)
}

fn config_path(cli: &Cli) -> Option<PathBuf> {
    cli.config
        .clone()
        .or_else(|| dirs::config_dir().map(|dir| dir.join("portal").join("config.toml")))
}

/// Run one command against a freshly loaded page.
pub fn run_page<T: PageCommands>(
    config: &PortalConfig,
    repository: RecordRepository<FileStore>,
    command: Command,
    now: DateTime<Utc>,
    out: &mut impl Write,
) -> Result<()> {
    let mut controller = PageController::<T, _, _>::new(config, repository, TracingNotifier)?;
    controller.load(now)?;
    execute(&mut controller, command, now, out)
}

/// Run one command against an already loaded controller.
pub fn execute<T, S, N>(
    controller: &mut PageController<T, S, N>,
    command: Command,
    now: DateTime<Utc>,
    out: &mut impl Write,
) -> Result<()>
where
    T: PageCommands,
    S: KeyValueStore,
    N: Notifier,
{
    match command {
        Command::List(args) => {
            apply_filters(controller, &args.filters, now)?;
            controller.go_to_page(args.page);
            let view = controller.page_view(now);
            if args.json {
                writeln!(out, "{}", serde_json::to_string_pretty(&view)?)?;
            } else {
                render::write_page(out, T::LABEL, &view)?;
            }
        }
        Command::Create { set } => {
            let record = controller.create(parse_assignments(&set)?, now)?;
            writeln!(out, "{}", record.id())?;
        }
        Command::Update { id, set } => {
            controller.update(&id, parse_assignments(&set)?, now)?;
        }
        Command::Delete { ids, yes } => {
            let removed = if yes {
                controller.delete(&ids, &mut AlwaysConfirm)?
            } else {
                controller.delete(&ids, &mut StdinConfirm)?
            };
            debug!(removed, "Delete finished");
        }
        Command::Activate { ids } => {
            T::set_active(controller, &ids, true, now)?;
        }
        Command::Deactivate { ids } => {
            T::set_active(controller, &ids, false, now)?;
        }
        Command::Import { file } => {
            controller.import_file(&file, now)?;
        }
        Command::Export(args) => {
            apply_filters(controller, &args.filters, now)?;
            let format = ExportFormat::from(args.format);
            let text = controller.export(format)?;
            match args.output {
                Some(path) => {
                    let path = export_path(&path, format, T::ENTITY);
                    std::fs::write(&path, text)?;
                    writeln!(out, "{}", path.display())?;
                }
                None => writeln!(out, "{}", text)?,
            }
        }
        Command::Status { id, status, by } => {
            T::change_status(controller, &id, &status, &by, now)?;
        }
        Command::Comment { id, text, by } => {
            T::add_comment(controller, &id, &text, &by, now)?;
        }
    }
    Ok(())
}

/// A directory gets the default `<entity>-export.<ext>` file inside it.
fn export_path(path: &Path, format: ExportFormat, entity: &str) -> PathBuf {
    if path.is_dir() {
        path.join(format.file_name(entity))
    } else {
        path.to_path_buf()
    }
}

fn apply_filters<T, S, N>(
    controller: &mut PageController<T, S, N>,
    args: &FilterArgs,
    now: DateTime<Utc>,
) -> Result<()>
where
    T: Presentable,
    S: KeyValueStore,
    N: Notifier,
{
    if args.smart {
        controller.set_mode(SearchMode::Smart);
    }
    if let Some(query) = &args.query {
        controller.search_now(query.as_str());
    }
    for filter in &args.filters {
        let (field, needle) = split_assignment(filter)?;
        controller.set_field_filter(field, needle);
    }
    for chip in &args.chips {
        let (category, value) = split_assignment(chip)?;
        controller.toggle_chip(category, value);
    }
    if args.range.is_some() {
        controller.set_date_range(args.range, now);
    }
    if let Some(field) = &args.sort {
        let sort = if args.desc {
            SortSpec::desc(field.as_str())
        } else {
            SortSpec::asc(field.as_str())
        };
        controller.set_sort(Some(sort));
    }
    Ok(())
}

fn split_assignment(text: &str) -> Result<(&str, &str)> {
    match text.split_once('=') {
        Some((field, value)) if !field.trim().is_empty() => Ok((field.trim(), value.trim())),
        _ => Err(CliError::Assignment(text.to_string())),
    }
}

/// `FIELD=VALUE` pairs as a form row.
///
/// `true`/`false` become booleans and an empty value becomes null, which
/// clears the field on update.
pub fn parse_assignments(pairs: &[String]) -> Result<Row> {
    pairs
        .iter()
        .map(|pair| {
            let (field, value) = split_assignment(pair)?;
            let value = match value {
                "" => Value::Null,
                v if v.eq_ignore_ascii_case("true") => Value::Bool(true),
                v if v.eq_ignore_ascii_case("false") => Value::Bool(false),
                v => Value::String(v.to_string()),
            };
            Ok((field.to_string(), value))
        })
        .collect()
}

/// Asks on stderr and reads the answer from stdin.
struct StdinConfirm;

impl ConfirmationGate for StdinConfirm {
    fn confirm(&mut self, prompt: &str) -> bool {
        eprint!("{} [y/N] ", prompt);
        if io::stderr().flush().is_err() {
            return false;
        }

        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
            Err(_) => false,
        }
    }
}

// ============================================
// Entity-specific commands
// ============================================

/// Commands only some record types support.
pub trait PageCommands: Presentable {
    fn set_active<S: KeyValueStore, N: Notifier>(
        _controller: &mut PageController<Self, S, N>,
        _ids: &[String],
        active: bool,
        _now: DateTime<Utc>,
    ) -> Result<usize> {
        let command = if active { "activate" } else { "deactivate" };
        Err(CliError::Unsupported {
            entity: Self::ENTITY,
            command,
        })
    }

    fn change_status<S: KeyValueStore, N: Notifier>(
        _controller: &mut PageController<Self, S, N>,
        _id: &str,
        _status: &str,
        _changed_by: &str,
        _now: DateTime<Utc>,
    ) -> Result<()> {
        Err(CliError::Unsupported {
            entity: Self::ENTITY,
            command: "status",
        })
    }

    fn add_comment<S: KeyValueStore, N: Notifier>(
        _controller: &mut PageController<Self, S, N>,
        _id: &str,
        _text: &str,
        _author: &str,
        _now: DateTime<Utc>,
    ) -> Result<()> {
        Err(CliError::Unsupported {
            entity: Self::ENTITY,
            command: "comment",
        })
    }
}

/// Select the known `ids` and flip their active flag.
fn set_selected_active<T, S, N>(
    controller: &mut PageController<T, S, N>,
    ids: &[String],
    active: bool,
    now: DateTime<Utc>,
) -> Result<usize>
where
    T: Presentable + Activatable,
    S: KeyValueStore,
    N: Notifier,
{
    controller.clear_selection();
    for id in ids {
        if !controller.view_state().selection.contains(id) {
            controller.toggle_selection(id);
        }
    }

    if controller.view_state().selection.is_empty() {
        let id = ids.first().cloned().unwrap_or_default();
        return Err(PortalError::not_found(T::LABEL, id).into());
    }

    let changed = if active {
        controller.bulk_activate(now)?
    } else {
        controller.bulk_deactivate(now)?
    };
    Ok(changed)
}

impl PageCommands for Party {
    fn set_active<S: KeyValueStore, N: Notifier>(
        controller: &mut PageController<Self, S, N>,
        ids: &[String],
        active: bool,
        now: DateTime<Utc>,
    ) -> Result<usize> {
        set_selected_active(controller, ids, active, now)
    }
}

impl PageCommands for DefectGroup {
    fn set_active<S: KeyValueStore, N: Notifier>(
        controller: &mut PageController<Self, S, N>,
        ids: &[String],
        active: bool,
        now: DateTime<Utc>,
    ) -> Result<usize> {
        set_selected_active(controller, ids, active, now)
    }
}

impl PageCommands for Ticket {
    fn change_status<S: KeyValueStore, N: Notifier>(
        controller: &mut PageController<Self, S, N>,
        id: &str,
        status: &str,
        changed_by: &str,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let to: TicketStatus = status.parse()?;
        controller.change_ticket_status(id, to, changed_by, now)?;
        Ok(())
    }

    fn add_comment<S: KeyValueStore, N: Notifier>(
        controller: &mut PageController<Self, S, N>,
        id: &str,
        text: &str,
        author: &str,
        now: DateTime<Utc>,
    ) -> Result<()> {
        controller.add_ticket_comment(id, author, text, now)?;
        Ok(())
    }
}

impl PageCommands for Attachment {}
