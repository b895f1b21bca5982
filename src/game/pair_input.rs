use std::time::SystemTime;

use super::{BlindGame, PairGame};
use crate::model::{GameError, PairInput};

/// Item and price clicks, routed to whichever pair variant is live.
pub trait PairInputHandler {
    fn select_item(&mut self, index: usize, now: SystemTime) -> Result<PairInput, GameError>;
    fn select_price(&mut self, index: usize, now: SystemTime) -> Result<PairInput, GameError>;
}

impl PairInputHandler for PairGame {
    fn select_item(&mut self, index: usize, now: SystemTime) -> Result<PairInput, GameError> {
        PairGame::select_item(self, index, now)
    }

    fn select_price(&mut self, index: usize, now: SystemTime) -> Result<PairInput, GameError> {
        PairGame::select_price(self, index, now)
    }
}

impl PairInputHandler for BlindGame {
    fn select_item(&mut self, index: usize, _now: SystemTime) -> Result<PairInput, GameError> {
        BlindGame::select_item(self, index)
    }

    fn select_price(&mut self, index: usize, _now: SystemTime) -> Result<PairInput, GameError> {
        BlindGame::select_price(self, index)
    }
}
