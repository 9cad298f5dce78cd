//! Alien War headless driver
//!
//! Logs in a demo pilot, spends points in the shop, plays a scripted
//! autoplay session at a fixed logical rate and prints the leaderboard.
//!
//! Usage: `alien-war [DATA_DIR]`

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use alien_war::account::{self, AccountError};
use alien_war::nav::{MenuAction, Navigator, Screen};
use alien_war::persistence::legacy::import_legacy_users;
use alien_war::session::SessionExit;
use alien_war::sim::{GameEvent, GamePhase, RenderSnapshot, TickInput};
use alien_war::{
    GameSession, JsonFileStore, Leaderboard, PlayerRecordStore, Settings, WeaponTable, shop,
};

const DEMO_USER: &str = "demo_pilot";
const DEMO_PASSWORD: &str = "demo_pass";
/// Old flat user file picked up from the data directory if present
const LEGACY_USERS_FILE: &str = "users.txt";

fn main() {
    env_logger::init();
    log::info!("Alien War (headless) starting...");

    if let Err(e) = run() {
        log::error!("{}", e);
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let data_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| Settings::default().data_dir);
    let settings = Settings::load(&data_dir);

    let mut store = JsonFileStore::open(settings.players_path());
    let legacy = data_dir.join(LEGACY_USERS_FILE);
    if legacy.exists() {
        import_legacy_users(&mut store, &legacy)?;
    }
    let catalog = WeaponTable::load_or_seed(&settings.weapons_path());

    let mut nav = Navigator::new();
    match account::register(&mut store, DEMO_USER, DEMO_PASSWORD) {
        Ok(()) => log::info!("Registered {}", DEMO_USER),
        Err(AccountError::UsernameTaken) => {}
        Err(e) => return Err(e.into()),
    }
    let username = account::login(&store, DEMO_USER, DEMO_PASSWORD)?;
    nav.logged_in(&username);

    // Shop: buy the most expensive affordable weapon
    nav.select(MenuAction::Shop, &mut store)?;
    let mut record = store.load(&username);
    let pick = shop::listing(&catalog, &record)
        .into_iter()
        .filter(|e| !e.owned && e.affordable)
        .max_by_key(|e| e.weapon.price);
    if let Some(entry) = pick {
        let receipt = shop::purchase(&catalog, &mut record, &entry.weapon.name)?;
        store.save(&record)?;
        println!("Bought {} for {} points", receipt.weapon, receipt.price);
    }
    nav.back();

    // Play
    if nav.select(MenuAction::Play, &mut store)? == Screen::Game {
        let exit = autoplay(&settings, &mut store, &catalog, &username);
        nav.on_session_exit(exit);
    }

    // Leaderboard
    nav.select(MenuAction::Leaderboard, &mut store)?;
    let board = Leaderboard::from_store(&store);
    print_leaderboard(&board);
    if let Some(rank) = board.rank_of(&username) {
        println!("{} is ranked #{}", username, rank);
    }
    let export = settings
        .data_dir
        .join(format!("leaderboard_{}.csv", unix_secs()));
    board.export_csv(&export)?;
    println!("Exported to {}", export.display());
    nav.back();

    nav.select(MenuAction::Quit, &mut store)?;
    log::info!("Shutting down (quit requested: {})", nav.should_quit());
    Ok(())
}

/// Run one session until it exits or the tick budget runs out
fn autoplay(
    settings: &Settings,
    store: &mut JsonFileStore,
    catalog: &WeaponTable,
    username: &str,
) -> SessionExit {
    let mut session = GameSession::start(&*store, catalog, username, unix_secs(), settings.auto_fire);
    let interval = settings.tick_interval_ms();

    for n in 0..settings.demo_ticks {
        let now_ms = (n as f64 * interval) as u64;
        let input = steer(&session.snapshot());
        if let Some(exit) = session.step(store, &input, now_ms) {
            return exit;
        }
        for event in session.events() {
            if let GameEvent::LevelUp { level } = event {
                println!("{} reached level {}", session.username(), level);
            }
        }
        if session.phase() == GamePhase::GameOver {
            let snap = session.snapshot();
            let rank = Leaderboard::from_store(&*store).potential_rank(snap.score);
            println!(
                "Game over at level {} with score {} (best {}, would rank #{})",
                snap.level, snap.score, snap.best_score, rank
            );
            let cancel = TickInput {
                cancel: true,
                ..Default::default()
            };
            if let Some(exit) = session.step(store, &cancel, now_ms) {
                return exit;
            }
        }
    }

    let snap = session.snapshot();
    println!(
        "Stopped at level {} with score {}, {} points",
        snap.level,
        snap.score,
        session.record().points
    );
    if let Some(notice) = &snap.notice {
        println!("{}", notice);
    }
    session.quit(store)
}

/// Chase the lowest visible enemy; shots come from auto-fire
fn steer(snap: &RenderSnapshot) -> TickInput {
    let ship_centre = snap.ship.x + alien_war::consts::SHIP_WIDTH / 2.0;
    let target = snap
        .enemies
        .iter()
        .filter(|e| e.y > -alien_war::consts::ENEMY_HEIGHT)
        .max_by(|a, b| a.y.total_cmp(&b.y))
        .map(|e| e.x + alien_war::consts::ENEMY_WIDTH / 2.0);

    let mut input = TickInput::default();
    if let Some(x) = target {
        input.move_left = x < ship_centre - 4.0;
        input.move_right = x > ship_centre + 4.0;
    }
    input
}

fn print_leaderboard(board: &Leaderboard) {
    println!("=== Leaderboard ===");
    if board.is_empty() {
        println!("(no players)");
        return;
    }
    for entry in board.page(1) {
        println!(
            "{:>3}. {:<20} {:>8} (level {})",
            entry.rank, entry.username, entry.best_score, entry.highest_level
        );
    }
    println!("page 1 of {}", board.page_count());
}

fn unix_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
