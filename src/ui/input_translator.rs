use std::{cell::RefCell, rc::Rc};

use log::{trace, warn};

use crate::{
    destroyable::Destroyable,
    events::{subscribe_handler, EventEmitter, EventObserver, Unsubscriber},
    game::settings::{CustomSettings, Settings},
    model::{
        CatalogSet, Currency, GameEngineCommand, GameEngineEvent, GameKind, GameMode,
        PairVariant, Screen, SettingsChange, SettingsProjection, Theme, Tier,
    },
};

pub const HELP_TEXT: &str = "\
Commands:
  bundle | pair                 pick a game from the menu
  easy | medium | hard | custom pick a difficulty
  standard | blind              pick a pair-match variant
  set attempts=3 tolerance=5 items=5 pairs=5 timer=180
                                save the custom tier and play it
  defaults                      restore the default custom tier
  play <bundle|pair|blind> <tier>  start a round directly
  <amount> | guess <amount>     guess the bag total
  <item> <price>                pair an item with a price (1-based)
  item <n> | price <n>          select one side of a pair
  check                         score blind matches
  time                          show the clock
  again | menu | stats          replay, back to menu, statistics
  reset-stats [yes]             wipe statistics (needs 'yes')
  theme <party|light|dark>  currency <usd|cop>  catalog <standard|colombian>
  help | quit";

/// What a line of input amounted to, besides any commands it sent.
#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    Handled,
    Help,
    Quit,
    Unrecognized(String),
}

/// Turns console lines into engine commands. Indices typed by the player
/// are 1-based positions as displayed; prices are in the display currency.
pub struct InputTranslator {
    game_engine_command_emitter: EventEmitter<GameEngineCommand>,
    projection: Rc<RefCell<SettingsProjection>>,
    game_engine_subscription: Option<Unsubscriber<GameEngineEvent>>,
}

impl Destroyable for InputTranslator {
    fn destroy(&mut self) {
        if let Some(subscription) = self.game_engine_subscription.take() {
            subscription.unsubscribe();
        }
    }
}

impl InputTranslator {
    pub fn new(
        game_engine_command_emitter: EventEmitter<GameEngineCommand>,
        game_engine_event_observer: &EventObserver<GameEngineEvent>,
        settings: &Settings,
    ) -> Rc<RefCell<Self>> {
        let projection = Rc::new(RefCell::new(SettingsProjection::new(settings)));
        let subscription = subscribe_handler(projection.clone(), game_engine_event_observer);
        Rc::new(RefCell::new(Self {
            game_engine_command_emitter,
            projection,
            game_engine_subscription: Some(subscription),
        }))
    }

    pub fn handle_line(&self, line: &str) -> LineOutcome {
        // The projection borrow must end before emitting: the engine answers
        // synchronously and the projection listens to those events.
        let parsed = parse_line(line, &self.projection.borrow());
        match parsed {
            Ok(Parsed::Commands(commands)) => {
                for command in commands {
                    trace!(target: "input", "Sending {:?}", command);
                    self.game_engine_command_emitter.emit(command);
                }
                LineOutcome::Handled
            }
            Ok(Parsed::Help) => LineOutcome::Help,
            Ok(Parsed::Quit) => LineOutcome::Quit,
            Err(message) => {
                warn!(target: "input", "Unrecognized input {:?}: {}", line, message);
                LineOutcome::Unrecognized(message)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Parsed {
    Commands(Vec<GameEngineCommand>),
    Help,
    Quit,
}

fn one(command: GameEngineCommand) -> Result<Parsed, String> {
    Ok(Parsed::Commands(vec![command]))
}

fn parse_line(line: &str, projection: &SettingsProjection) -> Result<Parsed, String> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let Some((&head, args)) = words.split_first() else {
        return Ok(Parsed::Commands(Vec::new()));
    };
    let head = head.to_ascii_lowercase();
    let screen = projection.screen();

    match (head.as_str(), args) {
        ("help" | "?", _) => Ok(Parsed::Help),
        ("quit" | "exit" | "q", _) => Ok(Parsed::Quit),
        ("bundle" | "bag", []) => one(GameEngineCommand::ChooseGame(GameMode::Bundle)),
        ("pair" | "pairs", []) => one(GameEngineCommand::ChooseGame(GameMode::Pair)),
        ("standard", []) => one(GameEngineCommand::ChoosePairVariant(PairVariant::Standard)),
        ("blind", []) => one(GameEngineCommand::ChoosePairVariant(PairVariant::Blind)),
        ("custom", []) => one(GameEngineCommand::OpenCustomConfig),
        ("set", _) => parse_custom(args, projection.custom_settings())
            .map(|custom| Parsed::Commands(vec![GameEngineCommand::ApplyCustomSettings(custom)])),
        ("defaults", []) => one(GameEngineCommand::ResetCustomSettings),
        ("play", [game, tier]) => {
            let kind = parse_kind(game).ok_or_else(|| format!("unknown game {:?}", game))?;
            let tier = parse_tier(tier).ok_or_else(|| format!("unknown tier {:?}", tier))?;
            one(GameEngineCommand::StartGame(kind, tier))
        }
        ("guess", [amount]) => parse_guess(amount, projection.current_settings().currency),
        ("item", [n]) => one(GameEngineCommand::SelectItem(parse_position(n)?)),
        ("price", [n]) => {
            let position = parse_position(n)?;
            let index = projection
                .price_at(position)
                .ok_or_else(|| format!("there is no price {}", n))?;
            one(GameEngineCommand::SelectPrice(index))
        }
        ("check", []) => one(GameEngineCommand::CheckBlindMatches),
        ("time", []) => one(GameEngineCommand::Tick),
        ("again" | "replay", []) => one(GameEngineCommand::Replay),
        ("menu" | "back", []) => one(GameEngineCommand::BackToMenu),
        ("stats", []) => one(GameEngineCommand::ShowStats),
        ("reset-stats", []) => one(GameEngineCommand::ResetStats { confirmed: false }),
        ("reset-stats", ["yes"]) => one(GameEngineCommand::ResetStats { confirmed: true }),
        ("theme", [name]) => {
            let theme =
                Theme::from_name(name).ok_or_else(|| format!("unknown theme {:?}", name))?;
            one(GameEngineCommand::ChangeSettings(SettingsChange {
                theme: Some(theme),
                ..Default::default()
            }))
        }
        ("currency", [code]) => {
            let currency =
                Currency::from_code(code).ok_or_else(|| format!("unknown currency {:?}", code))?;
            one(GameEngineCommand::ChangeSettings(SettingsChange {
                currency: Some(currency),
                ..Default::default()
            }))
        }
        ("catalog", [name]) => {
            let catalog_set = CatalogSet::from_name(name)
                .ok_or_else(|| format!("unknown catalog {:?}", name))?;
            one(GameEngineCommand::ChangeSettings(SettingsChange {
                catalog_set: Some(catalog_set),
                ..Default::default()
            }))
        }
        (word, []) if parse_tier(word).is_some() => {
            let tier = parse_tier(word).ok_or_else(|| format!("unknown tier {:?}", word))?;
            one(GameEngineCommand::ChooseTier(tier))
        }
        (_, _) => parse_shorthand(&words, screen, projection),
    }
}

/// Bare numbers mean a guess in the bag game and a pair in the pair game.
fn parse_shorthand(
    words: &[&str],
    screen: Screen,
    projection: &SettingsProjection,
) -> Result<Parsed, String> {
    match (screen, words) {
        (Screen::Playing(GameKind::Bundle, _), [amount]) => {
            parse_guess(amount, projection.current_settings().currency)
        }
        (Screen::Playing(GameKind::Pair(_), _), [item, price]) => {
            let item = parse_position(item)?;
            let position = parse_position(price)?;
            let price = projection
                .price_at(position)
                .ok_or_else(|| format!("there is no price {}", position + 1))?;
            Ok(Parsed::Commands(vec![
                GameEngineCommand::SelectItem(item),
                GameEngineCommand::SelectPrice(price),
            ]))
        }
        _ => Err(format!("don't know {:?} (try 'help')", words.join(" "))),
    }
}

fn parse_tier(word: &str) -> Option<Tier> {
    Tier::all()
        .into_iter()
        .find(|tier| tier.name().eq_ignore_ascii_case(word))
}

fn parse_kind(word: &str) -> Option<GameKind> {
    match word.to_ascii_lowercase().as_str() {
        "bundle" | "bag" => Some(GameKind::Bundle),
        "pair" | "standard" => Some(GameKind::Pair(PairVariant::Standard)),
        "blind" => Some(GameKind::Pair(PairVariant::Blind)),
        _ => None,
    }
}

fn parse_position(word: &str) -> Result<usize, String> {
    match word.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(format!("{:?} is not a position (they start at 1)", word)),
    }
}

/// Reads an amount in the display currency. Pesos are whole numbers, so dots
/// there are thousands separators.
fn parse_guess(word: &str, currency: Currency) -> Result<Parsed, String> {
    let cleaned: String = word
        .chars()
        .filter(|c| match currency {
            Currency::Usd => *c != '$' && *c != ',',
            Currency::Cop => *c != '$' && *c != '.' && *c != ',',
        })
        .collect();
    // Unparseable text still goes to the engine, which rejects it as an
    // invalid guess like any other bad amount.
    let amount = cleaned.parse::<f64>().unwrap_or(f64::NAN);
    one(GameEngineCommand::SubmitGuess(currency.to_canonical(amount)))
}

fn parse_custom(args: &[&str], current: CustomSettings) -> Result<CustomSettings, String> {
    let mut custom = current;
    for arg in args {
        let (key, value) = arg
            .split_once('=')
            .ok_or_else(|| format!("expected key=value, got {:?}", arg))?;
        let value: u64 = value
            .parse()
            .map_err(|_| format!("{} needs a whole number", key))?;
        match key {
            "attempts" => custom.attempts = value as u32,
            "tolerance" => custom.tolerance_percent = value as u32,
            "items" => custom.item_count = value as usize,
            "pairs" => custom.pair_count = value as usize,
            "timer" => custom.blind_timer_secs = value,
            other => return Err(format!("unknown custom setting {:?}", other)),
        }
    }
    Ok(custom)
}
