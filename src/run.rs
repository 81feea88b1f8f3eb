use std::io::Write;

use clap::CommandFactory;
use log::debug;

use crate::cli::{Cli, Command};
use crate::config::Config;
use crate::entry::Stamp;
use crate::file_io::Store;
use crate::paint::Paint;
use crate::status;
use crate::time_parse;
use crate::upload::{self, Backup};
use crate::work_log::{Interrupted, Resumed, Stopped};
use crate::Error;

/// Performs one command against the sheet: load, apply, save, back up.
///
/// Nothing is saved when the command is refused. A failing backup comes
/// after the save and leaves the sheet as it is.
pub fn run(
    command: Command,
    config: &Config,
    backup: Option<&dyn Backup>,
    now: Stamp,
    out: &mut dyn Write,
) -> Result<(), Error> {
    let paint = Paint::new(config.use_color);
    let store = Store::new(&config.sheet_path);
    let mutates = command.mutates();

    match command {
        Command::On { name, time } => {
            let time = time_parse::parse(&time.join(" "), now)?;
            let mut document = store.load()?;
            document.start_work(&name, time)?;
            store.save(&document)?;

            writeln!(out, "Started on {}.", paint.green(&name))?;
        }
        Command::Fin { time } => {
            let time = time_parse::parse(&time.join(" "), now)?;
            let mut document = store.load()?;
            let Stopped { stopped, resumed } = document.stop_work(time)?;
            store.save(&document)?;

            writeln!(out, "So you stopped working on {}.", paint.red(&stopped.name))?;
            if let Some(Resumed { name, depth }) = resumed {
                writeln!(out, "Started on {}.", paint.green(&name))?;
                if depth > 0 {
                    writeln!(out, "You are now {depth} deep in interrupts.")?;
                } else {
                    writeln!(out, "Congrats, you're out of interrupts!")?;
                }
            }
        }
        Command::Interrupt { name, time } => {
            let time = time_parse::parse(&time.join(" "), now)?;
            let mut document = store.load()?;
            let Interrupted { stopped, depth } = document.interrupt(&name, time)?;
            store.save(&document)?;

            writeln!(out, "So you stopped working on {}.", paint.red(&stopped.name))?;
            writeln!(out, "Started on {}.", paint.blue(&name))?;
            writeln!(out, "You are now {depth} deep in interrupts.")?;
        }
        Command::Tag { tags } => {
            let count = tags.len();
            let mut document = store.load()?;
            document.add_tags(tags)?;
            store.save(&document)?;

            let suffix = if count > 1 { "s" } else { "" };
            writeln!(out, "Okay, tagged current work with {count} tag{suffix}.")?;
        }
        Command::Note { text } => {
            let mut document = store.load()?;
            let name = document.add_note(text.join(" "))?;
            store.save(&document)?;

            writeln!(out, "Yep, noted to {}.", paint.yellow(&name))?;
        }
        Command::Status => {
            let document = store.load()?;
            let (current, elapsed) = document.status(now)?;
            writeln!(out, "{}", status::status_line(&current.name, elapsed, paint))?;
        }
        Command::Log { period } => {
            if let Some(period) = period {
                debug!("Log period {period:?} given, showing everything");
            }
            let document = store.load()?;
            for line in status::log_lines(&document.log(now)) {
                writeln!(out, "{line}")?;
            }
        }
        Command::Comm => back_up(&store, backup, out)?,
        Command::Help => {
            writeln!(out, "{}", Cli::command().render_long_help())?;
        }
    }

    if mutates {
        if backup.is_some() {
            back_up(&store, backup, out)?;
        } else {
            debug!("No upload configured, keeping the sheet local");
        }
    }

    Ok(())
}

fn back_up(
    store: &Store,
    backup: Option<&dyn Backup>,
    out: &mut dyn Write,
) -> Result<(), Error> {
    let backup = backup.ok_or(upload::Error::NoToken)?;

    writeln!(out, "Uploading file to dropbox")?;
    let contents = store
        .read_raw()
        .map_err(|err| upload::Error::Sheet(err.to_string()))?;
    backup.push(&contents)?;
    writeln!(out, "Upload finished")?;

    Ok(())
}
