//! Command line front end for a recordbook slot file.
#![forbid(unsafe_code)]

use std::path::PathBuf;

use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use recordbook::{
    FileRecordStore, LoggingStore, Options, RecordParams, RecordQuery, RecordStore, Snapshot,
    SnapshotFormat, TimingStore, ValidationProfile,
};
use rust_decimal::Decimal;

#[derive(Parser, Debug)]
#[command(name = "recordbook", version, about = "Manage personal records in a slot file")]
struct Cli {
    #[arg(
        long,
        global = true,
        value_name = "PATH",
        default_value = "recordbook.bin",
        help = "Slot file to operate on"
    )]
    file: PathBuf,

    #[arg(
        long,
        global = true,
        value_enum,
        default_value_t = RulesArg::Default,
        help = "Validation rule set"
    )]
    validation_rules: RulesArg,

    #[arg(long, global = true, help = "Log every store call")]
    use_logger: bool,

    #[arg(long, global = true, help = "Log how long every store call takes")]
    use_stopwatch: bool,

    #[arg(long, global = true, help = "Do not keep a .bak copy on file rewrites")]
    no_backup: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum RulesArg {
    Default,
    Custom,
}

impl From<RulesArg> for ValidationProfile {
    fn from(value: RulesArg) -> Self {
        match value {
            RulesArg::Default => ValidationProfile::Default,
            RulesArg::Custom => ValidationProfile::Custom,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FindField {
    Firstname,
    Lastname,
    Dateofbirth,
}

#[derive(Args, Debug)]
struct RecordArgs {
    #[arg(long)]
    first_name: String,

    #[arg(long)]
    last_name: String,

    #[arg(long, value_name = "YYYY-MM-DD")]
    date_of_birth: NaiveDate,

    #[arg(long, allow_negative_numbers = true)]
    prop_short: i16,

    #[arg(long, allow_negative_numbers = true)]
    prop_decimal: Decimal,

    #[arg(long)]
    prop_char: char,
}

impl From<RecordArgs> for RecordParams {
    fn from(args: RecordArgs) -> Self {
        RecordParams {
            first_name: args.first_name,
            last_name: args.last_name,
            date_of_birth: args.date_of_birth,
            prop_short: args.prop_short,
            prop_decimal: args.prop_decimal,
            prop_char: args.prop_char,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(about = "Append a new record with the next free id")]
    Create(RecordArgs),

    #[command(about = "Replace the fields of an existing record")]
    Update {
        #[arg(long)]
        id: i32,

        #[command(flatten)]
        record: RecordArgs,
    },

    #[command(about = "Insert a record under a given id, keeping id order")]
    Insert {
        #[arg(long)]
        id: i32,

        #[command(flatten)]
        record: RecordArgs,
    },

    #[command(about = "Delete a record")]
    Remove {
        #[arg(long)]
        id: i32,
    },

    #[command(about = "Print all live records")]
    List,

    #[command(about = "Print records matching a field value")]
    Find {
        #[arg(value_enum)]
        field: FindField,

        value: String,
    },

    #[command(about = "Print slot counts")]
    Stat,

    #[command(about = "Reclaim the space of deleted records")]
    Purge,

    #[command(about = "Write the live records to a .csv or .json file")]
    Export {
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },

    #[command(about = "Load records from a .csv or .json file")]
    Import {
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },
}

/// Everything needed to build the store, decided once from the flags.
#[derive(Debug)]
struct AppConfig {
    path: PathBuf,
    options: Options,
    use_logger: bool,
    use_stopwatch: bool,
}

impl AppConfig {
    fn from_cli(cli: &Cli) -> Self {
        Self {
            path: cli.file.clone(),
            options: Options::default()
                .validation(cli.validation_rules.into())
                .keep_backup(!cli.no_backup),
            use_logger: cli.use_logger,
            use_stopwatch: cli.use_stopwatch,
        }
    }

    fn build_store(&self) -> anyhow::Result<Box<dyn RecordStore>> {
        let store = FileRecordStore::open(&self.path, self.options.clone())
            .with_context(|| format!("opening {}", self.path.display()))?;

        let mut store: Box<dyn RecordStore> = Box::new(store);
        if self.use_logger {
            store = Box::new(LoggingStore::new(store));
        }
        if self.use_stopwatch {
            store = Box::new(TimingStore::new(store));
        }
        Ok(store)
    }
}

fn main() {
    env_logger::init();

    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::from_cli(&cli);
    let mut store = config.build_store()?;
    execute(store.as_mut(), cli.command)
}

fn execute(store: &mut dyn RecordStore, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Create(record) => {
            let id = store.create(record.into())?;
            println!("Record #{id} is created.");
        }
        Command::Update { id, record } => {
            store.update(id, record.into())?;
            println!("Record #{id} is updated.");
        }
        Command::Insert { id, record } => {
            store.insert(id, record.into())?;
            println!("Record #{id} is inserted.");
        }
        Command::Remove { id } => {
            store.remove(id)?;
            println!("Record #{id} is removed.");
        }
        Command::List => {
            for record in store.records()? {
                println!("{record}");
            }
        }
        Command::Find { field, value } => {
            let query = match field {
                FindField::Firstname => RecordQuery::FirstName(value),
                FindField::Lastname => RecordQuery::LastName(value),
                FindField::Dateofbirth => RecordQuery::DateOfBirth(
                    value.parse().with_context(|| format!("invalid date {value:?}"))?,
                ),
            };
            for record in store.find(&query)? {
                println!("{record}");
            }
        }
        Command::Stat => {
            let stat = store.stat()?;
            println!("{} record(s), {} deleted.", stat.total, stat.deleted());
        }
        Command::Purge => {
            let stats = store.defragment()?;
            println!(
                "Data file processing is completed: {} of {} records were purged.",
                stats.reclaimed(),
                stats.total_before
            );
        }
        Command::Export { path } => {
            let format = SnapshotFormat::from_path(&path)?;
            if path.exists() {
                bail!("{} already exists", path.display());
            }
            let snapshot = store.snapshot()?;
            snapshot.save(&path, format)?;
            println!("All records are exported to file {}.", path.display());
        }
        Command::Import { path } => {
            let format = SnapshotFormat::from_path(&path)?;
            let loaded = Snapshot::load(&path, format)?;
            for skipped in &loaded.skipped {
                eprintln!("skipped entry {}: {}", skipped.position, skipped.reason);
            }

            let report = store.restore(&loaded.snapshot)?;
            for failure in &report.failures {
                eprintln!("record #{} rejected: {}", failure.id, failure.reason);
            }
            println!("{} records were imported from {}.", report.applied, path.display());
        }
    }
    Ok(())
}
