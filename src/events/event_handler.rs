use std::cell::RefCell;
use std::rc::Rc;

use super::{EventObserver, Unsubscriber};

pub trait EventHandler<T> {
    fn handle_event(&mut self, event: &T);
}

/// Feeds every event on `observer` to `handler` until unsubscribed.
pub fn subscribe_handler<T, H>(
    handler: Rc<RefCell<H>>,
    observer: &EventObserver<T>,
) -> Unsubscriber<T>
where
    T: std::fmt::Debug + 'static,
    H: EventHandler<T> + 'static,
{
    observer.subscribe(move |event| handler.borrow_mut().handle_event(event))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Channel;
    use crate::game::settings::Settings;
    use crate::model::{Currency, GameEngineEvent, SettingsProjection};

    #[test]
    fn test_projection_follows_settings_events() {
        let (emitter, observer) = Channel::<GameEngineEvent>::new();
        let projection = Rc::new(RefCell::new(SettingsProjection::new(&Settings::default())));
        let subscription = subscribe_handler(projection.clone(), &observer);

        let mut settings = Settings::default();
        settings.currency = Currency::Cop;
        emitter.emit(GameEngineEvent::SettingsChanged(settings));
        assert_eq!(projection.borrow().current_settings().currency, Currency::Cop);

        subscription.unsubscribe();
        emitter.emit(GameEngineEvent::SettingsChanged(Settings::default()));
        assert_eq!(projection.borrow().current_settings().currency, Currency::Cop);
    }
}
