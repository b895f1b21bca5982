use std::io::BufRead;
use std::rc::Rc;

use log::{info, warn};

use price_party::destroyable::Destroyable;
use price_party::events::Channel;
use price_party::game::settings::Settings;
use price_party::game::{GameEngine, SystemClock};
use price_party::model::{GameEngineCommand, GameEngineEvent};
use price_party::storage::{self, FileStore, MemoryStore, SharedStore};
use price_party::ui::{ConsoleView, ConsoleViewBinding, InputTranslator, LineOutcome, HELP_TEXT};

fn init_logging() {
    env_logger::init();
}

fn open_store() -> SharedStore {
    match FileStore::open_default() {
        Ok(store) => {
            info!(target: "main", "Saving to {}", store.data_dir().display());
            storage::shared(store)
        }
        Err(e) => {
            warn!(target: "main", "No data directory ({}), nothing will be saved", e);
            storage::shared(MemoryStore::default())
        }
    }
}

fn main() {
    init_logging();
    let json = std::env::args().skip(1).any(|arg| arg == "--json");

    let store = open_store();
    let settings = Settings::load(&*store.borrow());

    let (game_engine_command_emitter, game_engine_command_observer) =
        Channel::<GameEngineCommand>::new();
    let (game_engine_event_emitter, game_engine_event_observer) =
        Channel::<GameEngineEvent>::new();

    let mut view = ConsoleViewBinding::new(
        ConsoleView::new(Box::new(std::io::stdout()), json),
        &game_engine_event_observer,
    );
    let translator = InputTranslator::new(
        game_engine_command_emitter.clone(),
        &game_engine_event_observer,
        &settings,
    );
    let game_engine = GameEngine::new(
        game_engine_command_observer,
        game_engine_event_emitter,
        store,
        Rc::new(SystemClock),
        Settings::seed_from_env(),
    );

    game_engine_command_emitter.emit(GameEngineCommand::InitDisplay);
    view.print("Type 'help' for commands.");

    for line in std::io::stdin().lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!(target: "main", "Failed to read input: {}", e);
                break;
            }
        };
        game_engine_command_emitter.emit(GameEngineCommand::Tick);
        let outcome = translator.borrow().handle_line(&line);
        match outcome {
            LineOutcome::Handled => (),
            LineOutcome::Help => view.print(HELP_TEXT),
            LineOutcome::Quit => break,
            LineOutcome::Unrecognized(message) => view.print(&format!("⚠ {}", message)),
        }
    }

    translator.borrow_mut().destroy();
    view.destroy();
    game_engine.borrow_mut().destroy();
}
