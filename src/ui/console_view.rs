use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use log::error;

use crate::destroyable::Destroyable;
use crate::events::{subscribe_handler, EventHandler, EventObserver, Unsubscriber};
use crate::game::settings::{CustomSettings, Settings};
use crate::helpers::{format_clock, plural};
use crate::model::{
    BlindResult, BlindSnapshot, BundleProfile, BundleSnapshot, BundleState, CheckReport,
    Currency, GameEngineEvent, GameMode, GameOutcome, GameStateSnapshot, GuessOutcome, ModeStats,
    PairInput, PairProfile, PairSnapshot, Price, PriceTag, Screen, StatsLedger, Theme, Tier,
};

/// Renders engine events as plain text lines, or as JSON for anything with a
/// serialized form when `json` is set.
pub struct ConsoleView {
    out: Box<dyn Write>,
    json: bool,
    currency: Currency,
    theme: Theme,
    screen: Screen,
    custom_settings: CustomSettings,
    ledger: StatsLedger,
}

impl ConsoleView {
    pub fn new(out: Box<dyn Write>, json: bool) -> Self {
        Self {
            out,
            json,
            currency: Currency::default(),
            theme: Theme::default(),
            screen: Screen::default(),
            custom_settings: CustomSettings::default(),
            ledger: StatsLedger::default(),
        }
    }

    pub fn print(&mut self, text: &str) {
        if let Err(e) = writeln!(self.out, "{}", text).and_then(|_| self.out.flush()) {
            error!(target: "console", "Failed to write output: {}", e);
        }
    }

    fn money(&self, price: Price) -> String {
        self.currency.format(price)
    }

    fn banner(&self, title: &str) -> String {
        match self.theme {
            Theme::Party => format!("🎉 {} 🎉", title),
            Theme::Light => format!("== {} ==", title),
            Theme::Dark => format!("## {} ##", title),
        }
    }

    pub fn render(&mut self, event: &GameEngineEvent) -> Vec<String> {
        if self.json {
            if let GameEngineEvent::StatsChanged(ledger) = event {
                self.ledger = ledger.clone();
            }
            if let Some(line) = render_json(event) {
                return vec![line];
            }
        }
        match event {
            GameEngineEvent::ScreenChanged(screen) => {
                self.screen = *screen;
                self.render_screen()
            }
            GameEngineEvent::GameStarted { kind, tier, .. } => {
                vec![self.banner(&format!("{} ({})", kind.mode().title(), tier.label()))]
            }
            GameEngineEvent::SessionUpdated(snapshot) => match snapshot {
                GameStateSnapshot::Bundle(bundle) => self.render_bundle(bundle),
                GameStateSnapshot::Pair(pair) => self.render_pair(pair),
                GameStateSnapshot::Blind(blind) => self.render_blind(blind),
            },
            GameEngineEvent::SessionCleared => Vec::new(),
            GameEngineEvent::GuessScored(outcome) => self.render_guess(outcome),
            GameEngineEvent::PairInputHandled(input) => render_pair_input(input),
            GameEngineEvent::BlindChecked(report) => vec![format!(
                "{}. {} wrong, keep trying!",
                render_report(report),
                report.wrong
            )],
            GameEngineEvent::TimerTicked {
                elapsed_secs,
                remaining_secs,
            } => vec![match remaining_secs {
                Some(remaining) => format!("⏱ {} left", format_clock(*remaining)),
                None => format!("⏱ {}", format_clock(*elapsed_secs)),
            }],
            GameEngineEvent::GameCompleted(outcome) => self.render_outcome(outcome),
            GameEngineEvent::StatsChanged(ledger) => {
                self.ledger = ledger.clone();
                if self.screen == Screen::Stats {
                    self.render_stats()
                } else {
                    Vec::new()
                }
            }
            GameEngineEvent::SettingsChanged(settings) => self.apply_settings(settings),
            GameEngineEvent::CustomSettingsChanged(custom) => {
                self.custom_settings = *custom;
                if matches!(self.screen, Screen::CustomConfig(_)) {
                    vec![render_custom(custom)]
                } else {
                    Vec::new()
                }
            }
            GameEngineEvent::ActionRejected(e) => vec![format!("⚠ {}", e)],
        }
    }

    fn apply_settings(&mut self, settings: &Settings) -> Vec<String> {
        self.currency = settings.currency;
        self.theme = settings.theme;
        vec![format!(
            "Theme {}, {} products, prices in {}",
            settings.theme.name(),
            settings.catalog_set.name(),
            settings.currency.code()
        )]
    }

    fn render_screen(&self) -> Vec<String> {
        match self.screen {
            Screen::Menu => vec![
                self.banner("Price Party"),
                format!("  bundle  {}", GameMode::Bundle.title()),
                format!("  pair    {}", GameMode::Pair.title()),
                "  stats   Statistics".to_string(),
            ],
            Screen::DifficultySelect(mode) => {
                let mut lines = vec![format!("{}: choose a difficulty", mode.title())];
                lines.extend(
                    [Tier::Easy, Tier::Medium, Tier::Hard]
                        .into_iter()
                        .map(|tier| describe_tier(mode, tier)),
                );
                lines.push("  custom  your own rules".to_string());
                lines
            }
            Screen::CustomConfig(mode) => vec![
                format!("Custom {}", mode.title()),
                render_custom(&self.custom_settings),
                "Change with 'set key=value ...', or 'defaults'".to_string(),
            ],
            Screen::PairVariantSelect(tier) => vec![
                format!("Pick a Pair ({}): choose a variant", tier.label()),
                "  standard  matches are checked as you go".to_string(),
                "  blind     no feedback until you check, against the clock".to_string(),
            ],
            Screen::Playing(..) => Vec::new(),
            Screen::Finished(..) => {
                vec!["Type 'again' to play another round or 'menu'".to_string()]
            }
            Screen::Stats => self.render_stats(),
        }
    }

    fn render_bundle(&self, bundle: &BundleSnapshot) -> Vec<String> {
        let mut lines: Vec<String> = bundle
            .items
            .iter()
            .map(|card| match card.price {
                Some(price) => format!("  {} {}  {}", card.icon, card.name, self.money(price)),
                None => format!("  {} {}  ??", card.icon, card.name),
            })
            .collect();
        match bundle.true_total {
            Some(total) => lines.push(format!("Total: {}", self.money(total))),
            None if bundle.state == BundleState::InProgress => lines.push(format!(
                "Guess the total within {}%: {} {} left",
                bundle.profile.tolerance_percent,
                bundle.attempts_remaining,
                plural(bundle.attempts_remaining as u64, "try", "tries")
            )),
            None => (),
        }
        lines
    }

    fn render_prices(&self, prices: &[PriceTag], taken: impl Fn(usize) -> bool) -> Vec<String> {
        prices
            .iter()
            .enumerate()
            .map(|(position, tag)| {
                let mark = if taken(tag.original_index) { "✓" } else { " " };
                format!("  {}{} {}", mark, position + 1, self.money(tag.price))
            })
            .collect()
    }

    fn render_pair(&self, pair: &PairSnapshot) -> Vec<String> {
        let mut lines = vec!["Items:".to_string()];
        lines.extend(pair.items.iter().enumerate().map(|(i, item)| {
            let mark = if pair.matched[i] {
                "✓"
            } else if pair.selected_item == Some(i) {
                ">"
            } else {
                " "
            };
            format!("  {}{} {}", mark, i + 1, item)
        }));
        lines.push("Prices:".to_string());
        lines.extend(self.render_prices(&pair.price_order, |index| {
            pair.matched.get(index).copied().unwrap_or(false)
        }));
        lines.push(format!(
            "{}/{} matched",
            pair.matches_confirmed,
            pair.items.len()
        ));
        lines
    }

    fn render_blind(&self, blind: &BlindSnapshot) -> Vec<String> {
        let mut lines = vec!["Items:".to_string()];
        lines.extend(blind.items.iter().enumerate().map(|(i, item)| {
            let paired = blind
                .matches
                .iter()
                .find(|(item_index, _)| *item_index == i)
                .and_then(|(_, price)| {
                    blind
                        .price_order
                        .iter()
                        .position(|tag| tag.original_index == *price)
                });
            match paired {
                Some(position) => format!("   {} {}  -> price {}", i + 1, item, position + 1),
                None => format!("   {} {}", i + 1, item),
            }
        }));
        lines.push("Prices:".to_string());
        lines.extend(self.render_prices(&blind.price_order, |_| false));
        lines.push(format!(
            "{}/{} paired, {} on the clock",
            blind.matches.len(),
            blind.items.len(),
            format_clock(blind.countdown.limit_secs)
        ));
        lines
    }

    fn render_guess(&self, outcome: &GuessOutcome) -> Vec<String> {
        match outcome {
            GuessOutcome::Hint {
                hint,
                attempts_remaining,
            } => vec![format!(
                "{} ({} {} left)",
                hint.message(),
                attempts_remaining,
                plural(*attempts_remaining as u64, "try", "tries")
            )],
            GuessOutcome::Won { .. } | GuessOutcome::Lost { .. } => Vec::new(),
        }
    }

    fn render_outcome(&self, outcome: &GameOutcome) -> Vec<String> {
        match outcome {
            GameOutcome::BundleWon {
                attempts_used,
                true_total,
                ..
            } => vec![format!(
                "Correct! The total was {}. Got it in {} {}.",
                self.money(*true_total),
                attempts_used,
                plural(*attempts_used as u64, "guess", "guesses")
            )],
            GameOutcome::BundleLost { true_total, .. } => vec![format!(
                "Out of tries! The total was {}.",
                self.money(*true_total)
            )],
            GameOutcome::PairWon { result, .. } => {
                let mut lines = vec![format!(
                    "All pairs matched in {}!",
                    format_clock(result.elapsed_secs)
                )];
                if result.is_perfect {
                    lines.push("Perfect round!".to_string());
                }
                lines
            }
            GameOutcome::Blind { result, .. } => render_blind_result(result),
        }
    }

    fn render_stats(&self) -> Vec<String> {
        let mut lines = vec![self.banner("Statistics")];
        lines.extend(render_mode_stats(
            GameMode::Bundle,
            &self.ledger.bundle,
            self.ledger
                .bundle
                .best
                .map(|best| format!("best {} {}", best, plural(best, "guess", "guesses"))),
        ));
        lines.extend(render_mode_stats(
            GameMode::Pair,
            &self.ledger.pair,
            self.ledger.pair.best.map(|best| {
                let average = self
                    .ledger
                    .average_pair_time()
                    .map(format_clock)
                    .unwrap_or_else(|| "-".to_string());
                format!("best {}, average {}", format_clock(best), average)
            }),
        ));
        lines.push(format!("Games played: {}", self.ledger.overall_games));
        if let Some(last_played) = self.ledger.last_played {
            lines.push(format!(
                "Last played: {}",
                last_played.format("%Y-%m-%d %H:%M UTC")
            ));
        }
        lines
    }
}

impl EventHandler<GameEngineEvent> for ConsoleView {
    fn handle_event(&mut self, event: &GameEngineEvent) {
        for line in self.render(event) {
            self.print(&line);
        }
    }
}

/// Keeps a `ConsoleView` subscribed to the engine's events.
pub struct ConsoleViewBinding {
    view: Rc<RefCell<ConsoleView>>,
    subscription: Option<Unsubscriber<GameEngineEvent>>,
}

impl ConsoleViewBinding {
    pub fn new(view: ConsoleView, observer: &EventObserver<GameEngineEvent>) -> Self {
        let view = Rc::new(RefCell::new(view));
        let subscription = subscribe_handler(view.clone(), observer);
        Self {
            view,
            subscription: Some(subscription),
        }
    }

    pub fn print(&self, text: &str) {
        self.view.borrow_mut().print(text);
    }
}

impl Destroyable for ConsoleViewBinding {
    fn destroy(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
    }
}

fn render_json(event: &GameEngineEvent) -> Option<String> {
    let line = match event {
        GameEngineEvent::SessionUpdated(snapshot) => serde_json::to_string(snapshot),
        GameEngineEvent::GuessScored(outcome) => serde_json::to_string(outcome),
        GameEngineEvent::PairInputHandled(input) => serde_json::to_string(input),
        GameEngineEvent::BlindChecked(report) => serde_json::to_string(report),
        GameEngineEvent::GameCompleted(outcome) => serde_json::to_string(outcome),
        GameEngineEvent::StatsChanged(ledger) => serde_json::to_string(ledger),
        _ => return None,
    };
    match line {
        Ok(line) => Some(line),
        Err(e) => {
            error!(target: "console", "Failed to serialize {:?}: {}", event, e);
            None
        }
    }
}

fn describe_tier(mode: GameMode, tier: Tier) -> String {
    match mode {
        GameMode::Bundle => {
            let profile = BundleProfile::for_tier(tier);
            format!(
                "  {:<7} {} tries, within {}%, {}-{} items",
                tier.name(),
                profile.attempts_allowed,
                profile.tolerance_percent,
                profile.min_items,
                profile.max_items
            )
        }
        GameMode::Pair => {
            let profile = PairProfile::for_tier(tier);
            format!("  {:<7} {} pairs", tier.name(), profile.pair_count)
        }
    }
}

fn render_custom(custom: &CustomSettings) -> String {
    format!(
        "  attempts={} tolerance={} items={} pairs={} timer={}",
        custom.attempts,
        custom.tolerance_percent,
        custom.item_count,
        custom.pair_count,
        custom.blind_timer_secs
    )
}

fn render_pair_input(input: &PairInput) -> Vec<String> {
    match input {
        PairInput::Ignored => vec!["That one is already matched.".to_string()],
        PairInput::Pending => Vec::new(),
        PairInput::Matched { .. } => vec!["✓ Match!".to_string()],
        PairInput::Rejected { .. } => vec!["✗ Not a match, try again.".to_string()],
        PairInput::Completed(_) => Vec::new(),
        PairInput::Paired { mapped, total, .. } if mapped == total => {
            vec!["All pairs matched! Type 'check' to see how you did.".to_string()]
        }
        PairInput::Paired { mapped, total, .. } => {
            vec![format!("Paired! ({}/{})", mapped, total)]
        }
    }
}

fn render_report(report: &CheckReport) -> String {
    format!(
        "{} of {} correct",
        report.correct,
        report.correct + report.wrong + report.unmatched
    )
}

fn render_blind_result(result: &BlindResult) -> Vec<String> {
    let headline = match (result.timed_out, result.perfect) {
        (false, _) => format!(
            "Perfect! Cleared with {} to spare.",
            format_clock(result.remaining_secs)
        ),
        (true, true) => "Time's up, but every pair was right!".to_string(),
        (true, false) => "Time's up!".to_string(),
    };
    vec![
        headline,
        format!("{}. Score: {}", render_report(&result.report), result.final_score),
    ]
}

fn render_mode_stats(mode: GameMode, stats: &ModeStats, best: Option<String>) -> Vec<String> {
    let win_rate = stats
        .win_rate()
        .map(|rate| format!("{}%", rate))
        .unwrap_or_else(|| "-".to_string());
    vec![
        format!("{}:", mode.title()),
        format!(
            "  played {}, won {}, win rate {}",
            stats.games_played, stats.wins, win_rate
        ),
        format!(
            "  streak {}, best streak {}{}",
            stats.current_streak,
            stats.best_streak,
            best.map(|best| format!(", {}", best)).unwrap_or_default()
        ),
    ]
}
