//! Sequence storage and the per-run button generator.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use simon_core::{ButtonId, BUTTON_COUNT, SEQUENCE_CAPACITY};
use thiserror::Error;

/// Errors raised when the sequence cannot accept another button.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum SequenceError {
    /// The sequence already holds its maximum number of buttons.
    #[error("sequence already holds {capacity} buttons")]
    CapacityExceeded {
        /// Capacity that was reached.
        capacity: usize,
    },
}

/// Ordered, bounded list of buttons the player must reproduce.
#[derive(Clone, Debug)]
pub(crate) struct Sequence {
    buttons: Vec<ButtonId>,
}

impl Sequence {
    /// Creates a sequence holding a single button.
    pub(crate) fn starting_with(first: ButtonId) -> Self {
        let mut buttons = Vec::with_capacity(SEQUENCE_CAPACITY);
        buttons.push(first);
        Self { buttons }
    }

    /// Discards every button and starts over with `first`.
    pub(crate) fn restart(&mut self, first: ButtonId) {
        self.buttons.clear();
        self.buttons.push(first);
    }

    /// Appends a button, refusing to grow past the capacity.
    pub(crate) fn push(&mut self, button: ButtonId) -> Result<(), SequenceError> {
        if self.buttons.len() >= SEQUENCE_CAPACITY {
            return Err(SequenceError::CapacityExceeded {
                capacity: SEQUENCE_CAPACITY,
            });
        }
        self.buttons.push(button);
        Ok(())
    }

    pub(crate) fn len(&self) -> usize {
        self.buttons.len()
    }

    pub(crate) fn get(&self, index: usize) -> Option<ButtonId> {
        self.buttons.get(index).copied()
    }

    pub(crate) fn as_slice(&self) -> &[ButtonId] {
        &self.buttons
    }
}

/// Random source that draws buttons for the active run.
///
/// A master generator hands out one seed per run; the run generator is
/// reseeded from it exactly once when the run starts.
#[derive(Clone, Debug)]
pub(crate) struct ButtonGenerator {
    master: ChaCha8Rng,
    run: ChaCha8Rng,
}

impl ButtonGenerator {
    pub(crate) fn new(master_seed: u64) -> Self {
        let mut master = ChaCha8Rng::seed_from_u64(master_seed);
        let run = ChaCha8Rng::seed_from_u64(master.gen());
        Self { master, run }
    }

    /// Reseeds the run generator for a fresh run.
    pub(crate) fn start_run(&mut self) {
        self.run = ChaCha8Rng::seed_from_u64(self.master.gen());
    }

    /// Draws a button uniformly from the board.
    pub(crate) fn draw_button(&mut self) -> ButtonId {
        let index = self.run.gen_range(0..BUTTON_COUNT);
        ButtonId::ALL[index]
    }
}
