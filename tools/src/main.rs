//! tablesave: headless save/resume and feature-list tool.
//!
//! Usage:
//!   tablesave demo     [--db saves.db] [--config persist.json]
//!   tablesave inspect  --file game1.json [--config persist.json]
//!   tablesave resume   --file game1.json [--ignore-constraints] [--config persist.json]
//!   tablesave features [--encoded ";ch;users;"] [--peer-version 2300]

use anyhow::{bail, Context, Result};
use chrono::{Duration, Utc};
use std::env;
use tablesave_core::{
    codec,
    config::PersistConfig,
    features::{ServerFeatures, FEAT_CHANNELS, FEAT_USERS},
    game::{Game, GameOptions, GameView, LiveGame, Player},
    game_state::GameState,
    saved_game::{SavedGameData, SavedGameModel},
    store::SaveStore,
    types::{ClientVersion, CURRENT_CLIENT_VERSION},
};

#[derive(serde::Serialize)]
struct ResumeReport<'a> {
    game_name:     &'a str,
    model_version: i32,
    resumed_state: GameState,
    seats:         usize,
    occupied:      usize,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let Some(command) = args.get(1).map(String::as_str) else {
        bail!("usage: tablesave <demo|inspect|resume|features> [flags]");
    };
    let config = match flag_value(&args, "--config") {
        Some(path) => PersistConfig::load(path)?,
        None => PersistConfig::default(),
    };

    match command {
        "demo" => run_demo(&config, flag_value(&args, "--db").unwrap_or(":memory:")),
        "inspect" => {
            let data = read_save(&args, &config)?;
            print_save(&data);
            Ok(())
        }
        "resume" => {
            let data = read_save(&args, &config)?;
            let ignore = args.iter().any(|a| a == "--ignore-constraints");
            resume(&config, data, ignore)
        }
        "features" => {
            let peer_version = parse_arg(&args, "--peer-version", CURRENT_CLIENT_VERSION);
            print_features(peer_version, flag_value(&args, "--encoded"), &config)
        }
        other => bail!("unknown command: {other}"),
    }
}

/// Save the 4-player example game, store it, reload the latest save and resume it.
fn run_demo(config: &PersistConfig, db: &str) -> Result<()> {
    println!("tablesave demo");
    println!("  db:            {db}");
    println!("  model version: {}", config.model_version);
    println!();

    let store = SaveStore::open(db)?;
    store.migrate()?;

    let now = Utc::now();
    let game = demo_game(now);
    let model = SavedGameModel::from_game_at(&game, &config.save_config(), now)?;
    let save_id = store.insert_save(model.data(), now)?;
    println!("saved '{}' as {save_id}", game.name());

    let (latest_id, data) = store
        .latest_for_game(game.name(), config.model_version)?
        .context("saved game vanished from store")?;
    log::info!("reloading save {latest_id}");
    print_save(&data);
    println!();
    resume(config, data, false)?;

    println!();
    println!("=== STORED SAVES ===");
    for s in store.list_saves()? {
        println!(
            "  {} | {} | model {} | {:?} | {}",
            s.save_id, s.game_name, s.model_version, s.game_state, s.saved_at
        );
    }
    Ok(())
}

fn demo_game(now: chrono::DateTime<Utc>) -> Game {
    let mut game = Game::new("game1", 4, now - Duration::seconds(125));
    game.sit_down(0, Player::human("Alice", 12));
    game.sit_down(2, Player::built_in_robot("Bot7", 5));
    game.sit_down(3, Player::human("Carol", 8));
    let mut opts = GameOptions::new();
    opts.set("PL", "4");
    opts.set("VP", "t10");
    game.set_options(Some(opts));
    game.set_client_version_min(2000);
    game.set_game_state(GameState::RollOrCard);
    game
}

fn read_save(args: &[String], config: &PersistConfig) -> Result<SavedGameData> {
    let path = flag_value(args, "--file").context("--file is required")?;
    let json = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
    Ok(codec::from_json(&json, config.model_version)?)
}

fn resume(config: &PersistConfig, data: SavedGameData, ignore_constraints: bool) -> Result<()> {
    let model_version = data.model_version;
    let mut model = SavedGameModel::load_new(data, Utc::now())?;
    let game = model.resume_play(ignore_constraints)?;

    let occupied = (0..game.max_players()).filter(|&pn| !game.is_seat_vacant(pn)).count();
    let report = ResumeReport {
        game_name: game.name(),
        model_version,
        resumed_state: game.game_state(),
        seats: game.max_players(),
        occupied,
    };
    println!("=== RESUMED ===");
    println!("{}", serde_json::to_string_pretty(&report)?);
    println!("features: {}", config.server_features()?);
    Ok(())
}

fn print_save(data: &SavedGameData) {
    println!("=== SAVED GAME ===");
    println!("  name:          {}", data.game_name);
    println!("  model version: {}", data.model_version);
    println!("  game version:  {}", data.game_version);
    println!("  options:       {}", data.game_options.as_deref().unwrap_or("(none)"));
    println!("  duration:      {}s", data.game_duration_seconds);
    println!("  state:         {:?}", data.game_state);
    for (pn, seat) in data.player_seats.iter().enumerate() {
        if seat.is_seat_vacant {
            println!("  seat {pn}:        (vacant)");
        } else {
            let kind = match (seat.is_robot, seat.is_built_in_robot) {
                (false, _)    => "human",
                (true, true)  => "built-in robot",
                (true, false) => "robot",
            };
            println!("  seat {pn}:        {} ({} VP, {kind})", seat.name, seat.total_vp);
        }
    }
}

fn print_features(peer_version: ClientVersion, encoded: Option<&str>, config: &PersistConfig) -> Result<()> {
    let feats = match encoded {
        Some(_) => ServerFeatures::for_peer_version(peer_version, encoded)?,
        None => config.server_features()?,
    };
    println!("{feats}");
    for name in [FEAT_USERS, FEAT_CHANNELS] {
        println!("  {name:<6} {}", if feats.is_active(name)? { "active" } else { "-" });
    }
    for name in feats.names() {
        if !ServerFeatures::is_valid_name(name) {
            log::warn!("feature {name:?} is not a well-formed name");
        }
    }
    Ok(())
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
