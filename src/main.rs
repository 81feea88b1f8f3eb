use std::io;
use std::process::ExitCode;

use clap::Parser;
use log::debug;
use timeme::{Backup, Cli, Config, Dropbox, Error, Paint, Stamp};

fn main() -> color_eyre::Result<ExitCode> {
    color_eyre::install()?;
    timeme::init_logging();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if !err.use_stderr() => {
            err.print()?;
            return Ok(ExitCode::SUCCESS);
        }
        Err(err) => return Ok(fail(&Error::from(err), Paint::new(true))),
    };

    let config = Config::from_env(!cli.no_color);
    let dropbox = config.upload.clone().map(Dropbox::new);
    let backup = dropbox.as_ref().map(|d| d as &dyn Backup);

    let mut stdout = io::stdout().lock();
    match timeme::run(cli.command, &config, backup, Stamp::now(), &mut stdout) {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => Ok(fail(&err, Paint::new(config.use_color))),
    }
}

fn fail(err: &Error, paint: Paint) -> ExitCode {
    debug!("{err:?}");
    eprintln!("{}", err.report(paint));
    ExitCode::from(err.exit_code())
}
