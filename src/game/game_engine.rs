use log::{debug, info, trace, warn};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::SystemTime;

use super::settings::{CustomSettings, Settings};
use super::{
    BlindGame, BundleGame, Clock, ConfigResolver, PairGame, PairInputHandler, StatsManager,
};
use crate::destroyable::Destroyable;
use crate::events::{EventEmitter, EventObserver, Unsubscriber};
use crate::model::{
    BlindCheck, BlindResult, Catalog, GameEngineCommand, GameEngineEvent, GameError, GameKind,
    GameMode, GameOutcome, GameStateSnapshot, GuessOutcome, PairInput, PairVariant, Screen,
    SettingsChange, Tier,
};
use crate::storage::SharedStore;

/// The one live session, whichever game it is.
#[derive(Debug)]
enum ActiveGame {
    Bundle(BundleGame),
    Pair(PairGame),
    Blind(BlindGame),
}

impl ActiveGame {
    fn snapshot(&self) -> GameStateSnapshot {
        match self {
            ActiveGame::Bundle(game) => GameStateSnapshot::Bundle(game.snapshot()),
            ActiveGame::Pair(game) => GameStateSnapshot::Pair(game.snapshot()),
            ActiveGame::Blind(game) => GameStateSnapshot::Blind(game.snapshot()),
        }
    }

    fn stop_timer(&mut self, now: SystemTime) {
        match self {
            ActiveGame::Bundle(_) => (),
            ActiveGame::Pair(game) => game.stop_timer(now),
            ActiveGame::Blind(game) => game.stop_timer(now),
        }
    }

    fn pair_input_handler(&mut self) -> Option<&mut dyn PairInputHandler> {
        match self {
            ActiveGame::Pair(game) => Some(game as &mut dyn PairInputHandler),
            ActiveGame::Blind(game) => Some(game as &mut dyn PairInputHandler),
            ActiveGame::Bundle(_) => None,
        }
    }
}

/// Application controller: owns the screen, the settings, the statistics and
/// the current session, and turns commands into state changes and events.
pub struct GameEngine {
    screen: Screen,
    settings: Settings,
    custom_settings: CustomSettings,
    stats: StatsManager,
    store: SharedStore,
    clock: Rc<dyn Clock>,
    rng: StdRng,
    debug_mode: bool,
    active: Option<ActiveGame>,
    subscription_id: Option<Unsubscriber<GameEngineCommand>>,
    game_engine_event_emitter: EventEmitter<GameEngineEvent>,
}

impl Destroyable for GameEngine {
    fn destroy(&mut self) {
        if let Some(subscription_id) = self.subscription_id.take() {
            subscription_id.unsubscribe();
        }
        self.teardown_session();
    }
}

impl GameEngine {
    pub fn new(
        game_engine_command_observer: EventObserver<GameEngineCommand>,
        game_engine_event_emitter: EventEmitter<GameEngineEvent>,
        store: SharedStore,
        clock: Rc<dyn Clock>,
        seed: Option<u64>,
    ) -> Rc<RefCell<Self>> {
        let (settings, custom_settings) = {
            let store = store.borrow();
            (Settings::load(&*store), CustomSettings::load(&*store))
        };
        let seed = seed.unwrap_or(rand::rng().next_u64());
        info!(target: "game_engine", "Shuffle seed: {}", seed);

        let game_engine = Self {
            screen: Screen::Menu,
            settings,
            custom_settings,
            stats: StatsManager::new(store.clone()),
            store,
            clock,
            rng: StdRng::seed_from_u64(seed),
            debug_mode: Settings::is_debug_mode(),
            active: None,
            subscription_id: None,
            game_engine_event_emitter,
        };
        let refcell = Rc::new(RefCell::new(game_engine));
        GameEngine::wire_subscription(refcell.clone(), game_engine_command_observer);
        refcell
    }

    fn wire_subscription(
        game_engine: Rc<RefCell<Self>>,
        game_engine_command_observer: EventObserver<GameEngineCommand>,
    ) {
        let game_engine_handler = game_engine.clone();
        let subscription_id = game_engine_command_observer.subscribe(move |command| {
            let mut game_engine = game_engine_handler.borrow_mut();
            game_engine.handle_command(command.clone());
        });
        game_engine.borrow_mut().subscription_id = Some(subscription_id);
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn custom_settings(&self) -> CustomSettings {
        self.custom_settings
    }

    pub fn session_snapshot(&self) -> Option<GameStateSnapshot> {
        self.active.as_ref().map(ActiveGame::snapshot)
    }

    fn emit(&self, event: GameEngineEvent) {
        self.game_engine_event_emitter.emit(event);
    }

    pub fn handle_command(&mut self, command: GameEngineCommand) {
        trace!(target: "game_engine", "Handling command: {:?}", command);
        self.expire_overdue_blind();
        let result = match command {
            GameEngineCommand::InitDisplay => {
                self.init_display();
                Ok(())
            }
            GameEngineCommand::ChooseGame(mode) => self.choose_game(mode),
            GameEngineCommand::ChooseTier(tier) => self.choose_tier(tier),
            GameEngineCommand::OpenCustomConfig => self.open_custom_config(),
            GameEngineCommand::ApplyCustomSettings(custom) => self.apply_custom_settings(custom),
            GameEngineCommand::ResetCustomSettings => self.reset_custom_settings(),
            GameEngineCommand::ChoosePairVariant(variant) => self.choose_pair_variant(variant),
            GameEngineCommand::StartGame(kind, tier) => {
                self.start_game(kind, tier);
                Ok(())
            }
            GameEngineCommand::SubmitGuess(value) => self.submit_guess(value),
            GameEngineCommand::SelectItem(index) => self.select_pair_side(index, true),
            GameEngineCommand::SelectPrice(index) => self.select_pair_side(index, false),
            GameEngineCommand::CheckBlindMatches => self.check_blind_matches(),
            GameEngineCommand::Tick => {
                self.tick();
                Ok(())
            }
            GameEngineCommand::Replay => self.replay(),
            GameEngineCommand::BackToMenu => {
                self.teardown_session();
                self.set_screen(Screen::Menu);
                Ok(())
            }
            GameEngineCommand::ShowStats => {
                self.teardown_session();
                self.set_screen(Screen::Stats);
                let ledger = self.stats.ledger().clone();
                self.emit(GameEngineEvent::StatsChanged(ledger));
                Ok(())
            }
            GameEngineCommand::ResetStats { confirmed } => self.reset_stats(confirmed),
            GameEngineCommand::ChangeSettings(change) => {
                self.change_settings(&change);
                Ok(())
            }
        };
        if let Err(e) = result {
            warn!(target: "game_engine", "Rejected on {:?}: {}", self.screen, e);
            self.emit(GameEngineEvent::ActionRejected(e));
        }
    }

    fn init_display(&mut self) {
        self.emit(GameEngineEvent::SettingsChanged(self.settings.clone()));
        self.emit(GameEngineEvent::CustomSettingsChanged(self.custom_settings));
        let ledger = self.stats.ledger().clone();
        self.emit(GameEngineEvent::StatsChanged(ledger));
        self.emit(GameEngineEvent::ScreenChanged(self.screen));
        if let Some(snapshot) = self.session_snapshot() {
            self.emit(GameEngineEvent::SessionUpdated(snapshot));
        }
    }

    fn set_screen(&mut self, screen: Screen) {
        if self.screen != screen {
            debug!(target: "game_engine", "Screen {:?} -> {:?}", self.screen, screen);
        }
        self.screen = screen;
        self.emit(GameEngineEvent::ScreenChanged(screen));
    }

    fn invalid(&self, action: &'static str) -> GameError {
        GameError::InvalidTransition {
            from: self.screen,
            action,
        }
    }

    /// Stops any running timer and drops the session.
    fn teardown_session(&mut self) {
        if let Some(mut active) = self.active.take() {
            active.stop_timer(self.clock.now());
            trace!(target: "game_engine", "Tore down {}", active.snapshot().session_id());
            self.emit(GameEngineEvent::SessionCleared);
        }
    }

    fn choose_game(&mut self, mode: GameMode) -> Result<(), GameError> {
        if self.screen.is_playing() {
            return Err(self.invalid("choose a game"));
        }
        self.teardown_session();
        self.set_screen(Screen::DifficultySelect(mode));
        Ok(())
    }

    fn choose_tier(&mut self, tier: Tier) -> Result<(), GameError> {
        let Screen::DifficultySelect(mode) = self.screen else {
            return Err(self.invalid("choose a difficulty"));
        };
        match (tier, mode) {
            (Tier::Custom, _) => {
                self.emit(GameEngineEvent::CustomSettingsChanged(self.custom_settings));
                self.set_screen(Screen::CustomConfig(mode));
            }
            (_, GameMode::Pair) => self.set_screen(Screen::PairVariantSelect(tier)),
            (_, GameMode::Bundle) => self.start_game(GameKind::Bundle, tier),
        }
        Ok(())
    }

    fn open_custom_config(&mut self) -> Result<(), GameError> {
        let Screen::DifficultySelect(mode) = self.screen else {
            return Err(self.invalid("open custom settings"));
        };
        self.emit(GameEngineEvent::CustomSettingsChanged(self.custom_settings));
        self.set_screen(Screen::CustomConfig(mode));
        Ok(())
    }

    /// Saves the custom tier and carries on into the game it was opened for.
    fn apply_custom_settings(&mut self, custom: CustomSettings) -> Result<(), GameError> {
        let Screen::CustomConfig(mode) = self.screen else {
            return Err(self.invalid("apply custom settings"));
        };
        self.custom_settings = custom.validated()?;
        self.save_custom_settings();
        match mode {
            GameMode::Bundle => self.start_game(GameKind::Bundle, Tier::Custom),
            GameMode::Pair => self.set_screen(Screen::PairVariantSelect(Tier::Custom)),
        }
        Ok(())
    }

    fn reset_custom_settings(&mut self) -> Result<(), GameError> {
        if !matches!(self.screen, Screen::CustomConfig(_)) {
            return Err(self.invalid("reset custom settings"));
        }
        self.custom_settings = CustomSettings::default();
        self.save_custom_settings();
        Ok(())
    }

    fn save_custom_settings(&mut self) {
        if let Err(e) = self.custom_settings.save(&mut *self.store.borrow_mut()) {
            log::error!(target: "settings", "Failed to save custom settings: {}", e);
        }
        self.emit(GameEngineEvent::CustomSettingsChanged(self.custom_settings));
    }

    fn choose_pair_variant(&mut self, variant: PairVariant) -> Result<(), GameError> {
        let Screen::PairVariantSelect(tier) = self.screen else {
            return Err(self.invalid("choose a pair variant"));
        };
        self.start_game(GameKind::Pair(variant), tier);
        Ok(())
    }

    fn start_game(&mut self, kind: GameKind, tier: Tier) {
        self.teardown_session();
        let now = self.clock.now();
        let resolver = ConfigResolver::new(self.custom_settings);
        let catalog = Catalog::for_mode(self.settings.catalog_set, kind.mode());
        let active = match kind {
            GameKind::Bundle => ActiveGame::Bundle(BundleGame::start(
                resolver.bundle_profile(tier),
                &catalog,
                &mut self.rng,
            )),
            GameKind::Pair(PairVariant::Standard) => ActiveGame::Pair(PairGame::start(
                resolver.pair_profile(tier),
                &catalog,
                &mut self.rng,
                now,
            )),
            GameKind::Pair(PairVariant::Blind) => {
                let profile = resolver.pair_profile(tier);
                let limit = resolver.blind_time_limit_secs(tier, profile.pair_count);
                ActiveGame::Blind(BlindGame::start(
                    profile,
                    limit,
                    &catalog,
                    &mut self.rng,
                    now,
                ))
            }
        };
        let snapshot = active.snapshot();
        self.active = Some(active);
        if let Some(answer) = self.hidden_answer() {
            debug!(target: "game_engine", "Session {}: {}", snapshot.session_id(), answer);
        }
        self.set_screen(Screen::Playing(kind, tier));
        self.emit(GameEngineEvent::GameStarted {
            kind,
            tier,
            session_id: snapshot.session_id(),
        });
        self.emit(GameEngineEvent::SessionUpdated(snapshot));
    }

    /// The answer the player is meant to find, only in debug mode.
    fn hidden_answer(&self) -> Option<String> {
        if !self.debug_mode {
            return None;
        }
        Some(match self.active.as_ref()? {
            ActiveGame::Bundle(game) => format!("true total {:?}", game.true_total()),
            ActiveGame::Pair(game) => format!("price order {:?}", game.price_order()),
            ActiveGame::Blind(game) => format!("price order {:?}", game.price_order()),
        })
    }

    fn replay(&mut self) -> Result<(), GameError> {
        let Some((kind, tier)) = self.screen.game() else {
            return Err(self.invalid("replay"));
        };
        self.start_game(kind, tier);
        Ok(())
    }

    fn sync_session(&self) {
        if let Some(snapshot) = self.session_snapshot() {
            self.emit(GameEngineEvent::SessionUpdated(snapshot));
        }
    }

    fn finish(&mut self, outcome: GameOutcome) {
        if let Some((kind, tier)) = self.screen.game() {
            self.set_screen(Screen::Finished(kind, tier));
        }
        self.emit(GameEngineEvent::GameCompleted(outcome));
    }

    fn submit_guess(&mut self, value: f64) -> Result<(), GameError> {
        let Some(ActiveGame::Bundle(game)) = self.active.as_mut() else {
            return Err(GameError::NoActiveGame);
        };
        let outcome = game.submit_guess(value)?;
        let session_id = game.session_id();
        let guesses_charged = game.guesses_charged_for_loss();
        self.emit(GameEngineEvent::GuessScored(outcome));
        self.sync_session();

        let at = self.clock.now().into();
        match outcome {
            GuessOutcome::Hint { .. } => (),
            GuessOutcome::Won {
                attempts_used,
                true_total,
            } => {
                let ledger = self
                    .stats
                    .record_win(GameMode::Bundle, Some(attempts_used as u64), at)
                    .clone();
                self.emit(GameEngineEvent::StatsChanged(ledger));
                self.finish(GameOutcome::BundleWon {
                    session_id,
                    attempts_used,
                    true_total,
                });
            }
            GuessOutcome::Lost { true_total } => {
                let ledger = self
                    .stats
                    .record_loss(GameMode::Bundle, guesses_charged, at)
                    .clone();
                self.emit(GameEngineEvent::StatsChanged(ledger));
                self.finish(GameOutcome::BundleLost {
                    session_id,
                    true_total,
                });
            }
        }
        Ok(())
    }

    fn select_pair_side(&mut self, index: usize, item_side: bool) -> Result<(), GameError> {
        let now = self.clock.now();
        let handler = self
            .active
            .as_mut()
            .and_then(ActiveGame::pair_input_handler)
            .ok_or(GameError::NoActiveGame)?;
        let input = if item_side {
            handler.select_item(index, now)?
        } else {
            handler.select_price(index, now)?
        };
        self.emit(GameEngineEvent::PairInputHandled(input));
        self.sync_session();

        if let PairInput::Completed(result) = input {
            let session_id = self
                .session_snapshot()
                .map(|snapshot| snapshot.session_id())
                .ok_or(GameError::NoActiveGame)?;
            let ledger = self
                .stats
                .record_win(GameMode::Pair, Some(result.elapsed_secs), now.into())
                .clone();
            self.emit(GameEngineEvent::StatsChanged(ledger));
            self.finish(GameOutcome::PairWon { session_id, result });
        }
        Ok(())
    }

    fn check_blind_matches(&mut self) -> Result<(), GameError> {
        let now = self.clock.now();
        let Some(ActiveGame::Blind(game)) = self.active.as_mut() else {
            return Err(GameError::NoActiveGame);
        };
        let session_id = game.session_id();
        match game.check(now)? {
            BlindCheck::Revise(report) => {
                self.emit(GameEngineEvent::BlindChecked(report));
                self.sync_session();
            }
            BlindCheck::Cleared(result) => {
                self.sync_session();
                let ledger = self
                    .stats
                    .record_win(GameMode::Pair, Some(result.elapsed_secs), now.into())
                    .clone();
                self.emit(GameEngineEvent::StatsChanged(ledger));
                self.finish(GameOutcome::Blind { session_id, result });
            }
            BlindCheck::TimedOut(result) => self.finish_blind_timeout(session_id, result, now),
        }
        Ok(())
    }

    /// A round that ran out the clock counts only if something was paired;
    /// all-correct is a win without a time, anything else a loss.
    fn finish_blind_timeout(
        &mut self,
        session_id: uuid::Uuid,
        result: BlindResult,
        now: SystemTime,
    ) {
        self.sync_session();
        if result.report.mapped() == 0 {
            info!(target: "game_engine", "Blind session {} expired untouched", session_id);
        } else {
            let ledger = if result.perfect {
                self.stats.record_win(GameMode::Pair, None, now.into()).clone()
            } else {
                self.stats.record_loss(GameMode::Pair, 0, now.into()).clone()
            };
            self.emit(GameEngineEvent::StatsChanged(ledger));
        }
        self.finish(GameOutcome::Blind { session_id, result });
    }

    fn expire_overdue_blind(&mut self) {
        let now = self.clock.now();
        let Some(ActiveGame::Blind(game)) = self.active.as_mut() else {
            return;
        };
        let session_id = game.session_id();
        if let Some(result) = game.tick(now) {
            self.finish_blind_timeout(session_id, result, now);
        }
    }

    /// Redraw cadence is the caller's business; this only reports the clock.
    fn tick(&mut self) {
        let now = self.clock.now();
        let timer = match self.active.as_ref() {
            Some(ActiveGame::Pair(game)) if !game.is_over() => {
                Some((game.elapsed_secs(now), None))
            }
            Some(ActiveGame::Blind(game)) if game.is_active() => {
                Some((game.elapsed_secs(now), Some(game.remaining_secs(now))))
            }
            _ => None,
        };
        if let Some((elapsed_secs, remaining_secs)) = timer {
            self.emit(GameEngineEvent::TimerTicked {
                elapsed_secs,
                remaining_secs,
            });
        }
    }

    fn reset_stats(&mut self, confirmed: bool) -> Result<(), GameError> {
        let ledger = self.stats.reset(confirmed)?.clone();
        self.emit(GameEngineEvent::StatsChanged(ledger));
        Ok(())
    }

    /// A new catalog set applies from the next session on.
    fn change_settings(&mut self, change: &SettingsChange) {
        self.settings.apply(change);
        if let Err(e) = self.settings.save(&mut *self.store.borrow_mut()) {
            log::error!(target: "settings", "Failed to save settings: {}", e);
        }
        self.emit(GameEngineEvent::SettingsChanged(self.settings.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Channel;
    use crate::game::ManualClock;
    use crate::model::{BlindState, CatalogSet, CheckReport, Currency, PairState, StatsLedger};
    use crate::storage::{shared, MemoryStore, STATS_KEY};
    use crate::tests::UsingLogger;
    use std::time::Duration;
    use test_context::test_context;

    struct Harness {
        engine: Rc<RefCell<GameEngine>>,
        commands: EventEmitter<GameEngineCommand>,
        events: Rc<RefCell<Vec<GameEngineEvent>>>,
        clock: Rc<ManualClock>,
        store: SharedStore,
        _subscription: Unsubscriber<GameEngineEvent>,
    }

    impl Harness {
        fn new() -> Self {
            Self::with_store(shared(MemoryStore::default()))
        }

        fn with_store(store: SharedStore) -> Self {
            let (commands, command_observer) = Channel::<GameEngineCommand>::new();
            let (event_emitter, event_observer) = Channel::<GameEngineEvent>::new();
            let clock = Rc::new(ManualClock::new(
                SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000),
            ));
            let engine = GameEngine::new(
                command_observer,
                event_emitter,
                store.clone(),
                clock.clone(),
                Some(7),
            );
            let events = Rc::new(RefCell::new(Vec::new()));
            let events_clone = events.clone();
            let subscription = event_observer.subscribe(move |event: &GameEngineEvent| {
                events_clone.borrow_mut().push(event.clone());
            });
            Self {
                engine,
                commands,
                events,
                clock,
                store,
                _subscription: subscription,
            }
        }

        fn send(&self, command: GameEngineCommand) {
            self.commands.emit(command);
        }

        fn take_events(&self) -> Vec<GameEngineEvent> {
            self.events.borrow_mut().drain(..).collect()
        }

        fn screen(&self) -> Screen {
            self.engine.borrow().screen()
        }

        fn rejections(&self) -> Vec<GameError> {
            self.events
                .borrow()
                .iter()
                .filter_map(|event| match event {
                    GameEngineEvent::ActionRejected(e) => Some(e.clone()),
                    _ => None,
                })
                .collect()
        }

        fn outcomes(&self) -> Vec<GameOutcome> {
            self.events
                .borrow()
                .iter()
                .filter_map(|event| match event {
                    GameEngineEvent::GameCompleted(outcome) => Some(outcome.clone()),
                    _ => None,
                })
                .collect()
        }

        fn ledger(&self) -> StatsLedger {
            self.engine.borrow_mut().stats.ledger().clone()
        }

        fn bundle_total_dollars(&self) -> f64 {
            match self.engine.borrow().active.as_ref() {
                Some(ActiveGame::Bundle(game)) => game.true_total().as_f64(),
                other => panic!("no bundle game: {:?}", other),
            }
        }

        fn pair_count(&self) -> usize {
            match self.engine.borrow().session_snapshot() {
                Some(GameStateSnapshot::Pair(snapshot)) => snapshot.items.len(),
                Some(GameStateSnapshot::Blind(snapshot)) => snapshot.items.len(),
                other => panic!("no pair game: {:?}", other),
            }
        }

        fn match_pair(&self, index: usize) {
            self.send(GameEngineCommand::SelectItem(index));
            self.send(GameEngineCommand::SelectPrice(index));
        }
    }

    #[test_context(UsingLogger)]
    #[test]
    fn test_menu_flow_into_bundle_game(_: &mut UsingLogger) {
        let harness = Harness::new();
        harness.send(GameEngineCommand::ChooseGame(GameMode::Bundle));
        assert_eq!(harness.screen(), Screen::DifficultySelect(GameMode::Bundle));
        harness.send(GameEngineCommand::ChooseTier(Tier::Hard));
        assert_eq!(harness.screen(), Screen::Playing(GameKind::Bundle, Tier::Hard));

        let events = harness.take_events();
        assert!(events.iter().any(|event| matches!(
            event,
            GameEngineEvent::GameStarted {
                kind: GameKind::Bundle,
                tier: Tier::Hard,
                ..
            }
        )));
        let snapshot = harness.engine.borrow().session_snapshot();
        match snapshot {
            Some(GameStateSnapshot::Bundle(snapshot)) => {
                assert!((6..=8).contains(&snapshot.items.len()));
                assert_eq!(snapshot.attempts_remaining, 2);
            }
            other => panic!("expected a bundle snapshot, got {:?}", other),
        }
    }

    #[test]
    fn test_bundle_win_records_guesses_used() {
        let harness = Harness::new();
        harness.send(GameEngineCommand::StartGame(GameKind::Bundle, Tier::Medium));
        harness.send(GameEngineCommand::SubmitGuess(1.0));
        let total = harness.bundle_total_dollars();
        harness.send(GameEngineCommand::SubmitGuess(total));

        assert_eq!(harness.screen(), Screen::Finished(GameKind::Bundle, Tier::Medium));
        assert!(matches!(
            harness.outcomes().as_slice(),
            [GameOutcome::BundleWon {
                attempts_used: 2,
                ..
            }]
        ));
        let ledger = harness.ledger();
        assert_eq!(ledger.bundle.wins, 1);
        assert_eq!(ledger.bundle.best, Some(2));
        assert!(harness.store.borrow().get(STATS_KEY).unwrap().is_some());
    }

    #[test]
    fn test_bundle_loss_charges_every_allowed_attempt() {
        let harness = Harness::new();
        harness.send(GameEngineCommand::StartGame(GameKind::Bundle, Tier::Easy));
        for _ in 0..5 {
            harness.send(GameEngineCommand::SubmitGuess(0.5));
        }
        assert!(matches!(
            harness.outcomes().as_slice(),
            [GameOutcome::BundleLost { .. }]
        ));
        let ledger = harness.ledger();
        assert_eq!(ledger.bundle.losses, 1);
        assert_eq!(ledger.bundle.total, 5);
        assert_eq!(ledger.bundle.current_streak, 0);

        harness.send(GameEngineCommand::SubmitGuess(10.0));
        assert_eq!(harness.rejections(), vec![GameError::SessionOver]);
    }

    #[test]
    fn test_invalid_guess_is_rejected_without_cost() {
        let harness = Harness::new();
        harness.send(GameEngineCommand::StartGame(GameKind::Bundle, Tier::Medium));
        harness.send(GameEngineCommand::SubmitGuess(-4.0));
        assert_eq!(harness.rejections(), vec![GameError::InvalidGuess]);
        let snapshot = harness.engine.borrow().session_snapshot();
        match snapshot {
            Some(GameStateSnapshot::Bundle(snapshot)) => {
                assert_eq!(snapshot.attempts_remaining, 3)
            }
            other => panic!("expected a bundle snapshot, got {:?}", other),
        }
    }

    #[test]
    fn test_pair_flow_and_timer() {
        let harness = Harness::new();
        harness.send(GameEngineCommand::ChooseGame(GameMode::Pair));
        harness.send(GameEngineCommand::ChooseTier(Tier::Medium));
        assert_eq!(harness.screen(), Screen::PairVariantSelect(Tier::Medium));
        harness.send(GameEngineCommand::ChoosePairVariant(PairVariant::Standard));
        assert_eq!(harness.pair_count(), 5);

        for i in 0..4 {
            harness.match_pair(i);
        }
        assert!(harness.outcomes().is_empty());

        harness.clock.advance(Duration::from_secs(45));
        harness.take_events();
        harness.send(GameEngineCommand::Tick);
        assert!(matches!(
            harness.take_events().as_slice(),
            [GameEngineEvent::TimerTicked {
                elapsed_secs: 45,
                remaining_secs: None
            }]
        ));

        harness.match_pair(4);
        assert!(matches!(
            harness.outcomes().as_slice(),
            [GameOutcome::PairWon { result, .. }] if result.elapsed_secs == 45 && !result.is_perfect
        ));
        let ledger = harness.ledger();
        assert_eq!(ledger.pair.wins, 1);
        assert_eq!(ledger.pair.best, Some(45));
        assert_eq!(ledger.average_pair_time(), Some(45));
        let snapshot = harness.engine.borrow().session_snapshot();
        match snapshot {
            Some(GameStateSnapshot::Pair(snapshot)) => assert_eq!(snapshot.state, PairState::Won),
            other => panic!("expected a pair snapshot, got {:?}", other),
        }
    }

    #[test]
    fn test_blind_perfect_check_scores_time_bonus() {
        let harness = Harness::new();
        harness.send(GameEngineCommand::StartGame(
            GameKind::Pair(PairVariant::Blind),
            Tier::Easy,
        ));
        for i in 0..3 {
            harness.match_pair(i);
        }
        harness.clock.advance(Duration::from_secs(150));
        harness.send(GameEngineCommand::CheckBlindMatches);

        let outcomes = harness.outcomes();
        match outcomes.as_slice() {
            [GameOutcome::Blind { result, .. }] => {
                assert_eq!(result.final_score, 108);
                assert!(result.perfect);
                assert!(!result.timed_out);
            }
            other => panic!("expected a blind outcome, got {:?}", other),
        }
        assert_eq!(harness.ledger().pair.best, Some(150));
    }

    #[test]
    fn test_blind_incomplete_check_is_a_precondition_error() {
        let harness = Harness::new();
        harness.send(GameEngineCommand::StartGame(
            GameKind::Pair(PairVariant::Blind),
            Tier::Medium,
        ));
        harness.send(GameEngineCommand::CheckBlindMatches);
        harness.match_pair(0);
        harness.send(GameEngineCommand::CheckBlindMatches);
        assert_eq!(
            harness.rejections(),
            vec![
                GameError::NoMatchesYet { total: 5 },
                GameError::IncompleteMatches {
                    unmatched: 4,
                    total: 5
                }
            ]
        );
        assert!(harness.screen().is_playing());
    }

    #[test]
    fn test_blind_revision_then_timeout_is_a_loss() {
        let harness = Harness::new();
        harness.send(GameEngineCommand::StartGame(
            GameKind::Pair(PairVariant::Blind),
            Tier::Easy,
        ));
        harness.send(GameEngineCommand::SelectItem(0));
        harness.send(GameEngineCommand::SelectPrice(1));
        harness.send(GameEngineCommand::SelectItem(1));
        harness.send(GameEngineCommand::SelectPrice(0));
        harness.match_pair(2);
        harness.send(GameEngineCommand::CheckBlindMatches);
        assert!(harness.events.borrow().iter().any(|event| matches!(
            event,
            GameEngineEvent::BlindChecked(CheckReport {
                correct: 1,
                wrong: 2,
                unmatched: 0
            })
        )));

        harness.clock.advance(Duration::from_secs(180));
        harness.send(GameEngineCommand::Tick);
        let outcomes = harness.outcomes();
        match outcomes.as_slice() {
            [GameOutcome::Blind { result, .. }] => {
                assert!(result.timed_out);
                assert_eq!(result.final_score, 33);
            }
            other => panic!("expected a timeout, got {:?}", other),
        }
        let ledger = harness.ledger();
        assert_eq!(ledger.pair.losses, 1);
        assert_eq!(ledger.pair.games_played, 1);

        harness.send(GameEngineCommand::Tick);
        assert_eq!(harness.outcomes().len(), 1);
    }

    #[test]
    fn test_blind_timeout_without_pairs_records_nothing() {
        let harness = Harness::new();
        harness.send(GameEngineCommand::StartGame(
            GameKind::Pair(PairVariant::Blind),
            Tier::Hard,
        ));
        harness.clock.advance(Duration::from_secs(210));
        harness.send(GameEngineCommand::SelectItem(0));

        assert_eq!(harness.outcomes().len(), 1);
        assert_eq!(harness.rejections(), vec![GameError::SessionOver]);
        assert_eq!(harness.ledger(), StatsLedger::default());
        let snapshot = harness.engine.borrow().session_snapshot();
        match snapshot {
            Some(GameStateSnapshot::Blind(snapshot)) => {
                assert_eq!(snapshot.state, BlindState::TimedOut);
                assert_eq!(snapshot.final_score, Some(0));
            }
            other => panic!("expected a blind snapshot, got {:?}", other),
        }
    }

    #[test]
    fn test_blind_timeout_noticed_late_reports_the_limit() {
        let harness = Harness::new();
        harness.send(GameEngineCommand::StartGame(
            GameKind::Pair(PairVariant::Blind),
            Tier::Hard,
        ));
        harness.match_pair(0);
        harness.clock.advance(Duration::from_secs(500));
        harness.send(GameEngineCommand::Tick);

        let outcomes = harness.outcomes();
        match outcomes.as_slice() {
            [GameOutcome::Blind { result, .. }] => {
                assert!(result.timed_out);
                assert_eq!(result.elapsed_secs, 210);
                assert_eq!(result.remaining_secs, 0);
            }
            other => panic!("expected one blind outcome, got {:?}", other),
        }
    }

    #[test]
    fn test_hidden_answer_only_in_debug_mode() {
        let harness = Harness::new();
        harness.engine.borrow_mut().debug_mode = false;
        harness.send(GameEngineCommand::StartGame(GameKind::Bundle, Tier::Easy));
        assert_eq!(harness.engine.borrow().hidden_answer(), None);

        harness.engine.borrow_mut().debug_mode = true;
        let total = harness.engine.borrow().hidden_answer();
        assert!(total.is_some_and(|answer| answer.starts_with("true total $")));
        harness.send(GameEngineCommand::StartGame(
            GameKind::Pair(PairVariant::Standard),
            Tier::Easy,
        ));
        let order = harness.engine.borrow().hidden_answer();
        assert!(order.is_some_and(|answer| answer.starts_with("price order")));
    }

    #[test]
    fn test_leaving_a_game_stops_its_timer() {
        let harness = Harness::new();
        harness.send(GameEngineCommand::StartGame(
            GameKind::Pair(PairVariant::Blind),
            Tier::Easy,
        ));
        harness.send(GameEngineCommand::BackToMenu);
        assert_eq!(harness.screen(), Screen::Menu);
        assert!(harness.engine.borrow().session_snapshot().is_none());

        harness.clock.advance(Duration::from_secs(600));
        harness.take_events();
        harness.send(GameEngineCommand::Tick);
        assert!(harness.take_events().is_empty());
        assert_eq!(harness.ledger(), StatsLedger::default());
    }

    #[test]
    fn test_custom_settings_flow() {
        let harness = Harness::new();
        harness.send(GameEngineCommand::ChooseGame(GameMode::Bundle));
        harness.send(GameEngineCommand::ChooseTier(Tier::Custom));
        assert_eq!(harness.screen(), Screen::CustomConfig(GameMode::Bundle));

        harness.send(GameEngineCommand::ApplyCustomSettings(CustomSettings {
            attempts: 0,
            ..Default::default()
        }));
        assert!(matches!(
            harness.rejections().as_slice(),
            [GameError::InvalidCustomSettings(_)]
        ));
        assert_eq!(harness.screen(), Screen::CustomConfig(GameMode::Bundle));

        harness.send(GameEngineCommand::ApplyCustomSettings(CustomSettings {
            attempts: 7,
            item_count: 2,
            ..Default::default()
        }));
        assert_eq!(harness.screen(), Screen::Playing(GameKind::Bundle, Tier::Custom));
        let snapshot = harness.engine.borrow().session_snapshot();
        match snapshot {
            Some(GameStateSnapshot::Bundle(snapshot)) => {
                assert_eq!(snapshot.items.len(), 2);
                assert_eq!(snapshot.attempts_remaining, 7);
            }
            other => panic!("expected a bundle snapshot, got {:?}", other),
        }

        let reloaded = Harness::with_store(harness.store.clone());
        assert_eq!(reloaded.engine.borrow().custom_settings().attempts, 7);
    }

    #[test]
    fn test_custom_blind_uses_custom_timer() {
        let harness = Harness::new();
        harness.send(GameEngineCommand::ChooseGame(GameMode::Pair));
        harness.send(GameEngineCommand::OpenCustomConfig);
        harness.send(GameEngineCommand::ApplyCustomSettings(CustomSettings {
            pair_count: 4,
            blind_timer_secs: 90,
            ..Default::default()
        }));
        assert_eq!(harness.screen(), Screen::PairVariantSelect(Tier::Custom));
        harness.send(GameEngineCommand::ChoosePairVariant(PairVariant::Blind));
        let snapshot = harness.engine.borrow().session_snapshot();
        match snapshot {
            Some(GameStateSnapshot::Blind(snapshot)) => {
                assert_eq!(snapshot.items.len(), 4);
                assert_eq!(snapshot.countdown.limit_secs, 90);
            }
            other => panic!("expected a blind snapshot, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_transitions_are_rejected() {
        let harness = Harness::new();
        harness.send(GameEngineCommand::ChooseTier(Tier::Easy));
        harness.send(GameEngineCommand::Replay);
        harness.send(GameEngineCommand::SelectItem(0));
        assert_eq!(
            harness.rejections(),
            vec![
                GameError::InvalidTransition {
                    from: Screen::Menu,
                    action: "choose a difficulty"
                },
                GameError::InvalidTransition {
                    from: Screen::Menu,
                    action: "replay"
                },
                GameError::NoActiveGame,
            ]
        );
        assert_eq!(harness.screen(), Screen::Menu);
    }

    #[test]
    fn test_replay_deals_a_new_session() {
        let harness = Harness::new();
        harness.send(GameEngineCommand::StartGame(GameKind::Bundle, Tier::Easy));
        let first = harness.engine.borrow().session_snapshot().map(|s| s.session_id());
        harness.send(GameEngineCommand::Replay);
        let second = harness.engine.borrow().session_snapshot().map(|s| s.session_id());
        assert_ne!(first, second);
        assert_eq!(harness.screen(), Screen::Playing(GameKind::Bundle, Tier::Easy));
    }

    #[test]
    fn test_stats_reset_requires_confirmation() {
        let harness = Harness::new();
        harness.send(GameEngineCommand::StartGame(GameKind::Bundle, Tier::Hard));
        harness.send(GameEngineCommand::SubmitGuess(0.5));
        harness.send(GameEngineCommand::SubmitGuess(0.5));
        harness.send(GameEngineCommand::ResetStats { confirmed: false });
        assert_eq!(harness.rejections(), vec![GameError::ConfirmationRequired]);
        assert_eq!(harness.ledger().bundle.losses, 1);

        harness.send(GameEngineCommand::ResetStats { confirmed: true });
        assert_eq!(harness.ledger(), StatsLedger::default());
    }

    #[test]
    fn test_settings_change_persists_and_applies_next_session() {
        let harness = Harness::new();
        harness.send(GameEngineCommand::ChangeSettings(SettingsChange {
            catalog_set: Some(CatalogSet::Colombian),
            currency: Some(Currency::Cop),
            ..Default::default()
        }));
        assert!(harness.events.borrow().iter().any(|event| matches!(
            event,
            GameEngineEvent::SettingsChanged(settings) if settings.currency == Currency::Cop
        )));
        let reloaded = Harness::with_store(harness.store.clone());
        assert_eq!(
            reloaded.engine.borrow().settings().catalog_set,
            CatalogSet::Colombian
        );

        harness.send(GameEngineCommand::StartGame(
            GameKind::Pair(PairVariant::Standard),
            Tier::Hard,
        ));
        let colombian = Catalog::for_mode(CatalogSet::Colombian, GameMode::Pair);
        let snapshot = harness.engine.borrow().session_snapshot();
        match snapshot {
            Some(GameStateSnapshot::Pair(snapshot)) => {
                assert!(snapshot.items.iter().all(|item| colombian.items().contains(item)));
            }
            other => panic!("expected a pair snapshot, got {:?}", other),
        }
    }

    #[test]
    fn test_destroy_detaches_from_commands() {
        let harness = Harness::new();
        harness.engine.borrow_mut().destroy();
        harness.send(GameEngineCommand::ChooseGame(GameMode::Pair));
        assert_eq!(harness.screen(), Screen::Menu);
    }
}
