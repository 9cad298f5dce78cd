//! Game session
//!
//! Binds one simulation run to a player's record. The simulation itself
//! never touches storage; this layer reacts to its events and writes
//! progress at the save points (weapon change, level-up, game over, exit).

use crate::catalog::{DEFAULT_WEAPON, WeaponCatalog, WeaponSpec, builtin_weapons};
use crate::persistence::{PlayerRecord, PlayerRecordStore, StoreError};
use crate::sim::{GameEvent, GamePhase, GameState, Loadout, RenderSnapshot, TickInput, tick};

/// Why a session handed control back to the menus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionExit {
    /// Back to the main menu (exit from play, pause menu or game over)
    ToMenu,
    /// Leave the game entirely
    Quit,
}

/// A running play-through for one player
#[derive(Debug)]
pub struct GameSession {
    record: PlayerRecord,
    state: GameState,
    /// Last save failed; retried on the next step
    save_pending: bool,
    /// Game over already written for the current run
    game_over_saved: bool,
    notice: Option<String>,
    /// Events raised by the latest step
    events: Vec<GameEvent>,
}

impl GameSession {
    /// Start at the player's saved level with their owned weapons
    pub fn start(
        store: &dyn PlayerRecordStore,
        catalog: &dyn WeaponCatalog,
        username: &str,
        seed: u64,
        auto_fire: bool,
    ) -> Self {
        let record = store.load(username);
        let loadout = Loadout::new(owned_weapons(catalog, &record), &record.current_weapon);

        let mut state = GameState::new(seed, record.highest_level, loadout);
        state.best_score = record.best_score;
        state.points = record.points;
        state.auto_fire = auto_fire;

        log::info!(
            "{} starts at level {} with {}",
            record.username,
            state.level,
            state.loadout.current().name
        );

        Self {
            record,
            state,
            save_pending: false,
            game_over_saved: false,
            notice: None,
            events: Vec::new(),
        }
    }

    pub fn username(&self) -> &str {
        &self.record.username
    }

    pub fn record(&self) -> &PlayerRecord {
        &self.record
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn is_save_pending(&self) -> bool {
        self.save_pending
    }

    /// Events raised by the latest `step`
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Advance one tick and handle its save points
    pub fn step(
        &mut self,
        store: &mut dyn PlayerRecordStore,
        input: &TickInput,
        now_ms: u64,
    ) -> Option<SessionExit> {
        if self.save_pending {
            let _ = self.save_progress(store);
        }

        tick(&mut self.state, input, now_ms);
        self.sync_record();

        let mut exit = None;
        self.events = self.state.drain_events();
        for event in self.events.clone() {
            match event {
                GameEvent::WeaponChanged { .. } | GameEvent::LevelUp { .. } => {
                    let _ = self.save_progress(store);
                }
                GameEvent::GameOver { .. } => {
                    let _ = self.persist_game_over(store);
                }
                GameEvent::Restarted => self.game_over_saved = false,
                GameEvent::Exited => {
                    let _ = self.save_progress(store);
                    exit = Some(SessionExit::ToMenu);
                }
                _ => {}
            }
        }
        exit
    }

    /// Write score, currency, weapon and level to the store.
    ///
    /// Every exit path funnels through here. On failure the save stays
    /// pending and the snapshot carries a notice until a retry succeeds.
    pub fn save_progress(&mut self, store: &mut dyn PlayerRecordStore) -> Result<(), StoreError> {
        self.sync_record();
        match store.save(&self.record) {
            Ok(()) => {
                if self.save_pending {
                    log::info!("Pending save for {} written", self.record.username);
                }
                self.save_pending = false;
                self.notice = None;
                Ok(())
            }
            Err(e) => {
                log::warn!("Failed to save progress for {}: {}", self.record.username, e);
                self.save_pending = true;
                self.notice = Some(format!("Progress not saved: {}", e));
                Err(e)
            }
        }
    }

    /// Record the failed level and best score once per game over
    pub fn persist_game_over(&mut self, store: &mut dyn PlayerRecordStore) -> Result<(), StoreError> {
        if self.game_over_saved {
            return Ok(());
        }
        // A failed write stays pending, so the retry covers this run
        self.game_over_saved = true;
        self.save_progress(store)
    }

    /// Save and leave the game
    pub fn quit(&mut self, store: &mut dyn PlayerRecordStore) -> SessionExit {
        let _ = self.save_progress(store);
        SessionExit::Quit
    }

    pub fn snapshot(&self) -> RenderSnapshot {
        RenderSnapshot {
            notice: self.notice.clone(),
            ..RenderSnapshot::capture(&self.state)
        }
    }

    fn sync_record(&mut self) {
        let record = &mut self.record;
        record.best_score = record.best_score.max(self.state.best_score);
        record.points = self.state.points;
        record.current_weapon = self.state.loadout.current().name.clone();
        record.highest_level = self.state.level;
    }
}

/// Owned weapons in catalog order, never empty
fn owned_weapons(catalog: &dyn WeaponCatalog, record: &PlayerRecord) -> Vec<WeaponSpec> {
    let owned: Vec<WeaponSpec> = catalog
        .list_all()
        .into_iter()
        .filter(|w| record.owns(&w.name))
        .collect();
    if !owned.is_empty() {
        return owned;
    }

    log::warn!("{} owns no known weapon, using {}", record.username, DEFAULT_WEAPON);
    catalog
        .get(DEFAULT_WEAPON)
        .or_else(|| builtin_weapons().into_iter().next())
        .into_iter()
        .collect()
}
