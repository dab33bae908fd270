//! `parklog` - CLI for parkinglog
//!
//! This binary records parking locations and shows where each car was left.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io::{self, BufRead, Write};

use anyhow::{bail, Context};
use clap::Parser;

use parkinglog::app::{open_session, AppSession};
use parkinglog::cli::{
    Cli, Command, ConfigCommand, DeleteCommand, HistoryCommand, OutputFormat, ParkCommand,
};
use parkinglog::render::{self, ViewJson};
use parkinglog::{
    get_or_create_user_id, init_logging, Config, SaveOutcome, SlotInput, SqliteKv, Vehicle,
};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let config = Config::load_from(cli.config.clone()).context("loading configuration")?;

    match cli.command {
        Command::Show(cmd) => handle_show(&config, cmd.format),
        Command::Park(cmd) => handle_park(&config, cmd),
        Command::Delete(cmd) => handle_delete(&config, &cmd),
        Command::History(cmd) => handle_history(&config, &cmd),
        Command::Whoami => handle_whoami(&config),
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn start(config: &Config) -> anyhow::Result<AppSession> {
    let session = open_session(config).context("opening parking records")?;
    if let Some(message) = session.error() {
        bail!("{message}");
    }
    Ok(session)
}

fn print_view(session: &AppSession, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Plain => print!("{}", render::view(session)),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&ViewJson::from_session(session))?
        ),
    }
    Ok(())
}

fn handle_show(config: &Config, format: OutputFormat) -> anyhow::Result<()> {
    let session = start(config)?;
    print_view(&session, format)
}

/// Read a slot number the way the keypad takes it: digits append (three at
/// most), `c` clears, `<` deletes the last digit.
fn prompt_slot_number() -> anyhow::Result<String> {
    print!("Slot number: ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;

    let mut input = SlotInput::new();
    for key in line.trim().chars() {
        match key {
            'c' | 'C' => input.clear(),
            '<' => input.backspace(),
            digit => {
                input.push(digit);
            }
        }
    }
    Ok(input.take())
}

fn handle_park(config: &Config, cmd: ParkCommand) -> anyhow::Result<()> {
    let mut session = start(config)?;
    let car = cmd
        .car
        .map_or(config.vehicles.default_vehicle, Into::into);
    session.select(car);

    let number = match cmd.number {
        Some(number) => number,
        None => prompt_slot_number()?,
    };

    match session.save(cmd.floor.into(), &number, car) {
        SaveOutcome::Saved(record) => {
            println!("{car} parked at {}", render::location(&record));
            Ok(())
        }
        SaveOutcome::NotAttempted => {
            bail!("slot number must be 1 to 3 digits, got '{number}'; nothing saved")
        }
        SaveOutcome::Failed => bail!("{}", session.error().unwrap_or("save failed")),
    }
}

fn handle_delete(config: &Config, cmd: &DeleteCommand) -> anyhow::Result<()> {
    let mut session = start(config)?;
    if session.delete(&cmd.id) {
        print!("{}", render::history(session.records()));
        Ok(())
    } else {
        bail!("{}", session.error().unwrap_or("delete failed"))
    }
}

fn handle_history(config: &Config, cmd: &HistoryCommand) -> anyhow::Result<()> {
    let session = start(config)?;
    let records: Vec<_> = match cmd.car {
        Some(car) => {
            let car: Vehicle = car.into();
            session
                .records()
                .iter()
                .filter(|r| r.car == Some(car))
                .cloned()
                .collect()
        }
        None => session.records().to_vec(),
    };

    match cmd.format {
        OutputFormat::Plain => print!("{}", render::history(&records)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&records)?),
    }
    Ok(())
}

fn handle_whoami(config: &Config) -> anyhow::Result<()> {
    let kv = SqliteKv::open(config.kv_path()).context("opening local store")?;
    println!("{}", get_or_create_user_id(&kv)?);
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Backend:            {}", config.storage.backend);
                println!("  Local store:        {}", config.kv_path().display());
                println!("  Database path:      {}", config.database_path().display());
                println!("  Capacity:           {}", config.storage.capacity);
                println!();
                println!("[Vehicles]");
                println!("  Default vehicle:    {}", config.vehicles.default_vehicle);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
