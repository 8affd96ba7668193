use anyhow::Result;
use schedly::cli;
use schedly::config::Config;
use schedly::context::{AppContext, StandardContext};
use schedly::controller::Scheduler;
use schedly::logging;
use schedly::model::parser::parse_command;
use schedly::storage::{LoadSource, LocalStorage};
use schedly::store::EventStore;
use std::env;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let binary_name = args.first().map(String::as_str).unwrap_or("schedly");

    let mut root: Option<PathBuf> = None;
    let mut rest = args.iter().skip(1);
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--help" | "-h" | "help" => {
                cli::print_usage(binary_name);
                return Ok(());
            }
            "--root" | "-r" => match rest.next() {
                Some(path) => root = Some(PathBuf::from(path)),
                None => anyhow::bail!("--root expects a directory"),
            },
            other => anyhow::bail!("Unknown argument '{}'. Try --help", other),
        }
    }

    let ctx = StandardContext::new(root);
    let config = Config::load_or_init(&ctx)?;

    if let Err(e) = logging::init(&ctx, &config.log_level) {
        eprintln!("Warning: logging disabled: {:#}", e);
    }

    let events_path = config.events_path(&ctx)?;
    let (events, source) = LocalStorage::load_initial(&events_path, config.seed_sample_data);
    if source == LoadSource::Recovered {
        println!(
            "Data file {} could not be read. It was moved aside and the scheduler starts empty.",
            events_path.display()
        );
    }

    let store = EventStore::from_events(events).unwrap_or_else(|e| {
        log::warn!("Initial snapshot rejected ({}). Starting empty", e);
        EventStore::new()
    });
    let mut scheduler = Scheduler::new(store, (&config).into());

    println!("Welcome to Schedly! Type 'help' for the list of commands.");
    println!("{}", cli::format_list(&scheduler.list_filtered()));

    run_loop(&mut scheduler, &events_path)?;
    save(&scheduler, &events_path);
    log::info!("Session ended, data dir {:?}", ctx.get_data_dir().ok());
    Ok(())
}

fn run_loop(scheduler: &mut Scheduler, events_path: &Path) -> Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            return Ok(());
        };
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let command = match parse_command(&line) {
            Ok(c) => c,
            Err(e) => {
                log::debug!("Rejected input '{}': {}", line, e);
                println!("{}", e);
                continue;
            }
        };

        match scheduler.execute(command) {
            Ok(outcome) => {
                println!("{}", outcome.message);
                if outcome.show_help {
                    cli::print_help();
                }
                if outcome.exit {
                    return Ok(());
                }
                if outcome.store_changed {
                    save(scheduler, events_path);
                }
                println!("{}", cli::format_list(&scheduler.list_filtered()));
            }
            Err(e) => {
                log::info!("Command failed: {}", e);
                println!("{}", e);
            }
        }
    }
}

fn save(scheduler: &Scheduler, events_path: &Path) {
    if let Err(e) = LocalStorage::save(events_path, &scheduler.export_all()) {
        log::warn!("Failed to save {}: {:#}", events_path.display(), e);
        println!("Could not save to {}: {}", events_path.display(), e);
    }
}
