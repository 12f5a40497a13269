use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use mathmaps::GameError;
use mathmaps::catalog::MapCatalog;
use mathmaps::config::Config;
use mathmaps::engine::HintLevel;
use mathmaps::engine::scoring::{MAX_STARS, mastery_target};
use mathmaps::engine::unlock;
use mathmaps::generator::{Answer, Category, ComparisonResult, GeneratedProblem, RandomGenerator};
use mathmaps::session::{AnswerInput, LevelSession, SubmitOutcome};
use mathmaps::store::ProgressStore;
use mathmaps::store::json_store::JsonStore;
use mathmaps::store::schema::{ExportData, MapState};

#[derive(Parser)]
#[command(name = "mathmaps", version, about = "Arithmetic map game for young learners")]
struct Cli {
    #[arg(long, help = "Directory holding the progress file")]
    data_dir: Option<PathBuf>,

    #[arg(long, help = "Number of levels in each map")]
    levels: Option<u32>,

    #[arg(long, help = "Map catalog (TOML) to use instead of the bundled one")]
    catalog: Option<PathBuf>,

    #[arg(short, long, action = clap::ArgAction::Count, help = "More log output (-v, -vv)")]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// List maps with their stars
    Maps,
    /// Play a map level by level (default command)
    Play {
        #[arg(short, long, help = "Map id, defaults to the current map")]
        map: Option<String>,
        #[arg(short, long, help = "Level to start at, defaults to the first unfinished one")]
        level: Option<u32>,
    },
    /// Forget all progress
    Reset {
        #[arg(long, help = "Do not ask for confirmation")]
        yes: bool,
    },
    /// Write progress to a file
    Export { path: PathBuf },
    /// Replace progress with a previously exported file
    Import { path: PathBuf },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = Config::load().unwrap_or_else(|e| {
        warn!("ignoring unreadable config: {e:#}");
        Config::default()
    });
    if !Config::config_path().exists()
        && let Err(e) = config.save()
    {
        warn!("could not write default config: {e:#}");
    }
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.to_string_lossy().to_string();
    }
    if let Some(levels) = cli.levels {
        config.levels_per_map = levels;
    }
    if let Some(path) = &cli.catalog {
        config.catalog_path = Some(path.to_string_lossy().to_string());
    }
    config.validate();

    let catalog = MapCatalog::load(config.catalog_path.as_deref().map(Path::new))?;
    catalog.check_answer_digits(config.max_answer_digits)?;
    let first_map = catalog.first().id.clone();

    let json_store = JsonStore::with_base_dir(config.data_dir())?;
    if json_store.check_interrupted_import() {
        warn!("found a leftover backup from an interrupted import");
    }
    let state = match json_store.load_state(&first_map) {
        Some(state) if !state.needs_reset() => state,
        Some(state) => {
            warn!(
                schema = state.schema_version,
                "progress written by a newer release, starting fresh"
            );
            json_store.set_aside_unusable();
            MapState::new(&first_map)
        }
        None => {
            warn!("progress file unusable, starting fresh");
            MapState::new(&first_map)
        }
    };
    let mut store = ProgressStore::new(
        state,
        catalog.order(),
        config.levels_per_map,
        Box::new(json_store.clone()),
    );

    let command = cli.command.unwrap_or(Command::Play {
        map: None,
        level: None,
    });
    match command {
        Command::Maps => {
            list_maps(&store, &catalog);
            Ok(())
        }
        Command::Play { map, level } => play(&mut store, &catalog, &config, map, level),
        Command::Reset { yes } => reset(&mut store, yes),
        Command::Export { path } => export(&json_store, &store, &path),
        Command::Import { path } => import(&json_store, &mut store, &path),
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();
}

fn list_maps(store: &ProgressStore, catalog: &MapCatalog) {
    let state = store.state();
    let levels = store.levels_per_map();
    for map in catalog.iter() {
        let marker = if map.id == state.current_map_id { '*' } else { ' ' };
        if state.is_map_unlocked(&map.id) {
            let stars = unlock::map_stars(state, &map.id, levels);
            let percent = unlock::map_progress(state, &map.id, levels) * 100.0;
            println!(
                "{marker} {:<8} {:<22} {:>3}/{} stars ({percent:.0}%)",
                map.id,
                map.title,
                stars,
                mastery_target(levels)
            );
        } else {
            println!("{marker} {:<8} {:<22} locked", map.id, map.title);
        }
    }
}

fn play(
    store: &mut ProgressStore,
    catalog: &MapCatalog,
    config: &Config,
    map: Option<String>,
    level: Option<u32>,
) -> Result<()> {
    let map_id = map.unwrap_or_else(|| store.state().current_map_id.clone());
    let map_def = catalog
        .get(&map_id)
        .ok_or_else(|| GameError::UnknownMap(map_id.clone()))?;
    if !store.state().is_map_unlocked(&map_id) {
        bail!(GameError::MapLocked(map_id));
    }
    store.set_current_map(&map_id);

    let levels = store.levels_per_map();
    let mut level =
        level.unwrap_or_else(|| unlock::next_playable_level(store.state(), &map_id, levels));
    let mut generator = RandomGenerator::new();
    let mut lines = io::stdin().lock().lines();

    println!("{}: {}", map_def.title, map_def.description);
    println!("Type your answer and press Enter. Type q to stop.");

    loop {
        let mut session = LevelSession::enter(
            store,
            catalog,
            &map_id,
            level,
            config.hint_thresholds(),
            &mut generator,
        )?;
        println!();
        if session.was_resumed() {
            println!("Level {level} (continuing where you left off)");
        } else {
            println!("Level {level}");
        }

        loop {
            print_problem(session.problem(), session.hint_level());
            print!("> ");
            io::stdout().flush()?;

            let Some(line) = lines.next().transpose()? else {
                return Ok(());
            };
            let line = line.trim();
            if line.eq_ignore_ascii_case("q") {
                println!("Progress saved.");
                return Ok(());
            }

            let answer = match read_answer(line, session.problem().category(), config) {
                Ok(answer) => answer,
                Err(e) => {
                    println!("{e}");
                    continue;
                }
            };
            match session.submit(store, answer)? {
                SubmitOutcome::Incorrect { .. } => println!("Not quite. Try again!"),
                SubmitOutcome::Solved(result) => {
                    println!("Correct! {}", star_line(result.stars));
                    if let Some(next) = &result.unlocked_map {
                        let title = catalog.get(next).map_or(next.as_str(), |m| m.title.as_str());
                        println!("Map mastered! New map unlocked: {title}");
                    }
                    break;
                }
            }
        }

        if level >= levels {
            let stars = unlock::map_stars(store.state(), &map_id, levels);
            println!(
                "\nMap finished with {stars}/{} stars.",
                mastery_target(levels)
            );
            return Ok(());
        }
        level += 1;
    }
}

/// Feed typed characters through the keypad model.
fn read_answer(line: &str, category: Category, config: &Config) -> Result<Answer, GameError> {
    let digits = line.chars().filter(char::is_ascii_digit).count();
    if digits > config.max_answer_digits {
        return Err(GameError::InvalidAnswer(line.to_string()));
    }
    let mut input = AnswerInput::new(config.max_answer_digits);
    for ch in line.chars() {
        if let Some(d) = ch.to_digit(10) {
            input.push_digit(d as u8);
        } else if let Some(result) = ComparisonResult::from_symbol(ch) {
            input.choose(result);
        } else {
            return Err(GameError::InvalidAnswer(line.to_string()));
        }
    }
    input.answer(category)
}

fn print_problem(problem: &GeneratedProblem, hint: HintLevel) {
    match *problem {
        GeneratedProblem::Counting { count } => println!("How many? {}", dots(count)),
        GeneratedProblem::Comparison { a, b } => println!("{a}  >  <  =  {b}"),
        _ => println!("{problem}"),
    }

    if hint == HintLevel::None {
        return;
    }
    match *problem {
        GeneratedProblem::Counting { .. } => {}
        GeneratedProblem::Addition { a, b } => println!("  {}  +  {}", dots(a), dots(b)),
        GeneratedProblem::Subtraction { a, b } => {
            println!("  {}{}", dots(a.saturating_sub(b)), "○".repeat(b as usize))
        }
        GeneratedProblem::Comparison { a, b } => println!("  {}\n  {}", dots(a), dots(b)),
    }
    if hint >= HintLevel::ShowResult
        && let Answer::Number(n) = problem.expected_answer()
    {
        println!("  = {}", dots(n));
    }
    if hint >= HintLevel::ShowAnswer {
        println!("  The answer is {}", problem.expected_answer());
    }
}

fn dots(n: u32) -> String {
    "●".repeat(n as usize)
}

fn star_line(stars: u8) -> String {
    let earned = usize::from(stars);
    format!(
        "{}{}",
        "★".repeat(earned),
        "☆".repeat(usize::from(MAX_STARS).saturating_sub(earned))
    )
}

fn reset(store: &mut ProgressStore, yes: bool) -> Result<()> {
    if !yes {
        print!("Erase all stars and unlocked maps? [y/N] ");
        io::stdout().flush()?;
        let mut reply = String::new();
        io::stdin().read_line(&mut reply)?;
        if !reply.trim().eq_ignore_ascii_case("y") {
            println!("Nothing changed.");
            return Ok(());
        }
    }
    store.reset_progress();
    println!("Progress reset.");
    Ok(())
}

fn export(json_store: &JsonStore, store: &ProgressStore, path: &Path) -> Result<()> {
    let data = json_store.export_all(store.state());
    let json = serde_json::to_string_pretty(&data)?;
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    println!("Exported progress to {}", path.display());
    Ok(())
}

fn import(json_store: &JsonStore, store: &mut ProgressStore, path: &Path) -> Result<()> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let data: ExportData =
        serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
    json_store.import_all(&data)?;
    store.replace_state(data.state);
    println!("Imported progress from {}", path.display());
    Ok(())
}
