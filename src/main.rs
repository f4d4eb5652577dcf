//! Binary entrypoint for the puzzlehall terminal front end.
//!
//! Commands:
//! - `init` - write a starter `config.toml`
//! - `halls` - list the configured halls
//! - `show [--hall <id>]` - render a hall: progress bar, rooms, revealed hints
//! - `unlock --hall <id> <room> <key>` - submit a key
//! - `hint --hall <id> <room>` - reveal the next hint
//! - `relock --hall <id> <room>` - relock a room and everything after it
//! - `reset --hall <id>` - relock the whole hall
//! - `play` - interactive session on stdin
//!
//! See the library crate docs for module-level details: `puzzlehall::`.
use std::io::Write;

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::{error, info};
use tokio::io::{AsyncBufReadExt, BufReader};

use puzzlehall::config::Config;
use puzzlehall::content::ContentSource;
use puzzlehall::house::PuzzleHouse;
use puzzlehall::session::AccessState;

#[derive(Parser)]
#[command(name = "puzzlehall")]
#[command(about = "Halls of lockable puzzle rooms, played from the terminal")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init,
    /// List the configured halls
    Halls,
    /// Show a hall and the state of its rooms
    Show {
        /// Hall id (defaults to the first configured hall)
        #[arg(long)]
        hall: Option<String>,
    },
    /// Submit a key for a room
    Unlock {
        #[arg(long)]
        hall: Option<String>,
        room: String,
        key: String,
    },
    /// Reveal the next hint for a room
    Hint {
        #[arg(long)]
        hall: Option<String>,
        room: String,
    },
    /// Relock a room and every room after it
    Relock {
        #[arg(long)]
        hall: Option<String>,
        room: String,
    },
    /// Relock every room in a hall
    Reset {
        #[arg(long)]
        hall: Option<String>,
    },
    /// Interactive session
    Play,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Init = cli.command {
        init_logging(&None, cli.verbose);
        info!("Writing default configuration to {}", cli.config);
        Config::create_default(&cli.config).await?;
        println!("Created {}", cli.config);
        return Ok(());
    }

    // A missing config file is fine; everything has a default
    let config = if std::path::Path::new(&cli.config).exists() {
        Config::load(&cli.config).await?
    } else {
        Config::default()
    };
    init_logging(&Some(config.clone()), cli.verbose);
    info!("Starting puzzlehall v{}", env!("CARGO_PKG_VERSION"));

    let mut house = PuzzleHouse::from_config(&config).await?;

    match cli.command {
        Commands::Init => unreachable!("handled above"),
        Commands::Halls => {
            for choice in house.halls() {
                println!("{:<12} {}", choice.id, choice.label);
            }
        }
        Commands::Show { hall } => {
            select(&mut house, hall.as_deref()).await?;
            render(&house)?;
        }
        Commands::Unlock { hall, room, key } => {
            select(&mut house, hall.as_deref()).await?;
            if house.submit_key(&room, &key)? {
                println!("Unlocked!");
            } else {
                println!("Incorrect key.");
            }
        }
        Commands::Hint { hall, room } => {
            select(&mut house, hall.as_deref()).await?;
            house.reveal_hint(&room)?;
            render(&house)?;
        }
        Commands::Relock { hall, room } => {
            select(&mut house, hall.as_deref()).await?;
            house.relock_from(&room)?;
            render(&house)?;
        }
        Commands::Reset { hall } => {
            select(&mut house, hall.as_deref()).await?;
            house.reset_hall()?;
            render(&house)?;
        }
        Commands::Play => play(&mut house).await?,
    }

    Ok(())
}

async fn select(house: &mut PuzzleHouse<ContentSource>, hall: Option<&str>) -> Result<()> {
    if let Some(id) = hall {
        house.select_hall(id).await?;
    }
    Ok(())
}

/// Print the current hall the way the web page lays it out.
fn render(house: &PuzzleHouse<ContentSource>) -> Result<()> {
    let Some(hall) = house.current_hall() else {
        println!("(no hall loaded)");
        return Ok(());
    };

    let summary = house.summary()?;
    let filled = summary.percent as usize / 5;
    println!("== {} ==", hall.display_name);
    println!(
        "[{}{}] {}% ({}/{})",
        "#".repeat(filled),
        "-".repeat(20 - filled),
        summary.percent,
        summary.unlocked,
        summary.total
    );

    for view in house.room_views()? {
        println!();
        if view.state == AccessState::Locked {
            println!("#{} 🔒 Locked", view.index);
            continue;
        }
        println!("#{} {} [{}]", view.index, view.room.title, view.room.id);
        if !view.room.description.is_empty() {
            println!("   {}", view.room.description);
        }
        for image in view.room.images() {
            println!("   image: {}", image);
        }
        if view.state == AccessState::Completed {
            println!("   ✅ Unlocked");
        }
        for hint in view.visible_hints {
            println!("   💡 {}", hint);
        }
        if view.can_reveal_hint {
            println!("   ({} more hint(s) available)", view.room.hint_count() - view.visible_hints.len());
        }
    }
    Ok(())
}

const PLAY_HELP: &str = "commands: halls | hall <id> | show | key <room> <text> | hint <room> | relock <room> | reset | quit";

async fn play(house: &mut PuzzleHouse<ContentSource>) -> Result<()> {
    render(house)?;
    println!("\n{}", PLAY_HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        let (cmd, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();

        let outcome = match cmd {
            "" => Ok(()),
            "quit" | "exit" => break,
            "help" => {
                println!("{}", PLAY_HELP);
                Ok(())
            }
            "halls" => {
                for choice in house.halls() {
                    println!("{:<12} {}", choice.id, choice.label);
                }
                Ok(())
            }
            "hall" => {
                let selected = house.select_hall(rest).await.map(|_| ());
                selected.map_err(Into::into).and_then(|_| render(house))
            }
            "show" => render(house),
            "key" => {
                let (room, text) = rest.split_once(' ').unwrap_or((rest, ""));
                house.submit_key(room, text).map_err(Into::into).and_then(|ok| {
                    println!("{}", if ok { "Unlocked!" } else { "Incorrect key." });
                    render(house)
                })
            }
            "hint" => house.reveal_hint(rest).map_err(Into::into).and_then(|_| render(house)),
            "relock" => house.relock_from(rest).map_err(Into::into).and_then(|_| render(house)),
            "reset" => house.reset_hall().map_err(Into::into).and_then(|_| render(house)),
            other => {
                println!("unknown command '{}'; {}", other, PLAY_HELP);
                Ok(())
            }
        };

        if let Err(e) = outcome {
            error!("{}", e);
            println!("error: {}", e);
        }
    }
    Ok(())
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    let mut builder = env_logger::Builder::new();
    // CLI verbosity overrides the configured level
    let base_level = match (verbosity, config) {
        (0, Some(cfg)) => cfg.logging.level_filter(),
        (0, None) => log::LevelFilter::Info,
        (1, _) => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    let log_file = config
        .as_ref()
        .and_then(|cfg| cfg.logging.file.as_ref())
        .and_then(|file| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(file)
                .ok()
        });

    if let Some(f) = log_file {
        let write_mutex = std::sync::Arc::new(std::sync::Mutex::new(f));
        // Only echo to the console when attached to a terminal
        let is_tty = atty::is(atty::Stream::Stdout);
        builder.format(move |fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            let line = format!("{} [{}] {}", ts, record.level(), record.args());
            if let Ok(mut guard) = write_mutex.lock() {
                let _ = writeln!(guard, "{}", line);
            }
            if is_tty {
                writeln!(fmt, "{}", line)
            } else {
                Ok(())
            }
        });
    } else {
        builder.format(|fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            writeln!(fmt, "{} [{}] {}", ts, record.level(), record.args())
        });
    }

    let _ = builder.try_init();
}
