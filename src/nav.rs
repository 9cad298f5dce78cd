//! Screen navigation
//!
//! A stack of screens above the login screen. Menus push, `back` pops,
//! and leaving a session or logging out unwinds to the right place.

use crate::persistence::{PlayerRecordStore, StoreError};
use crate::session::SessionExit;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    MainMenu,
    Game,
    Shop,
    Leaderboard,
}

/// Main menu choices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Play,
    Shop,
    Leaderboard,
    /// Wipe every player record
    Reset,
    Logout,
    Quit,
}

#[derive(Debug)]
pub struct Navigator {
    stack: Vec<Screen>,
    user: Option<String>,
    quitting: bool,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator {
    pub fn new() -> Self {
        Self {
            stack: vec![Screen::Login],
            user: None,
            quitting: false,
        }
    }

    pub fn current(&self) -> Screen {
        self.stack.last().copied().unwrap_or(Screen::Login)
    }

    /// Logged-in player, if any
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn should_quit(&self) -> bool {
        self.quitting
    }

    /// Enter the main menu after a successful login
    pub fn logged_in(&mut self, username: &str) {
        self.user = Some(username.to_string());
        self.stack = vec![Screen::Login, Screen::MainMenu];
    }

    fn push(&mut self, screen: Screen) {
        log::debug!("Screen {:?} -> {:?}", self.current(), screen);
        self.stack.push(screen);
    }

    /// Pop one screen; the main menu and login screen stay put
    pub fn back(&mut self) -> Screen {
        if matches!(self.current(), Screen::Game | Screen::Shop | Screen::Leaderboard) {
            self.stack.pop();
        }
        self.current()
    }

    /// Apply a main menu choice. Ignored anywhere but the main menu.
    pub fn select(
        &mut self,
        action: MenuAction,
        store: &mut dyn PlayerRecordStore,
    ) -> Result<Screen, StoreError> {
        if self.current() != Screen::MainMenu {
            return Ok(self.current());
        }
        match action {
            MenuAction::Play => self.push(Screen::Game),
            MenuAction::Shop => self.push(Screen::Shop),
            MenuAction::Leaderboard => self.push(Screen::Leaderboard),
            MenuAction::Reset => self.reset(store)?,
            MenuAction::Logout => self.logout(),
            MenuAction::Quit => self.quitting = true,
        }
        Ok(self.current())
    }

    /// Leave the game screen the way the session asked
    pub fn on_session_exit(&mut self, exit: SessionExit) -> Screen {
        if self.current() == Screen::Game {
            self.stack.pop();
        }
        if exit == SessionExit::Quit {
            self.quitting = true;
        }
        self.current()
    }

    pub fn logout(&mut self) {
        if let Some(user) = self.user.take() {
            log::info!("{} logged out", user);
        }
        self.stack = vec![Screen::Login];
    }

    /// Delete all player data and return to login
    pub fn reset(&mut self, store: &mut dyn PlayerRecordStore) -> Result<(), StoreError> {
        store.reset()?;
        log::warn!("All player data reset");
        self.user = None;
        self.stack = vec![Screen::Login];
        Ok(())
    }
}
