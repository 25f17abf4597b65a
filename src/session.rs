//! The turn loop: title screen, then read, apply, relight and redraw until the
//! game is won or abandoned.

use std::{thread, time::Duration};

use tracing::{debug, info};

use crate::{
    error::SessionError,
    game::{GameState, LossReason, MoveOutcome, Phase},
    input::{CancelToken, Command, InputSource},
    lighting::{LightingEngine, MemoryField},
    render::{Frame, RenderSink},
};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Escaped,
    Quit,
    Interrupted,
}

pub struct Session<I, S> {
    state: GameState,
    lighting: LightingEngine,
    memory: MemoryField,
    input: I,
    sink: S,
    cancel: CancelToken,
    victory_delay: Duration,
    turn: u64,
}

impl<I: InputSource, S: RenderSink> Session<I, S> {
    pub fn new(
        state: GameState,
        lighting: LightingEngine,
        input: I,
        sink: S,
        cancel: CancelToken,
        victory_delay: Duration,
    ) -> Self {
        let memory = MemoryField::new(state.grid().width, state.grid().height);
        Self {
            state,
            lighting,
            memory,
            input,
            sink,
            cancel,
            victory_delay,
            turn: 0,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn memory(&self) -> &MemoryField {
        &self.memory
    }

    pub fn turn(&self) -> u64 {
        self.turn
    }

    pub fn run(&mut self) -> Result<Outcome, SessionError> {
        if let Some(outcome) = self.title()? {
            return Ok(outcome);
        }

        loop {
            self.draw_turn()?;
            match self.state.phase() {
                Phase::Won => {
                    thread::sleep(self.victory_delay);
                    return Ok(Outcome::Escaped);
                }
                Phase::Lost(LossReason::Quit) => return Ok(Outcome::Quit),
                Phase::Lost(LossReason::Interrupted) => return Ok(Outcome::Interrupted),
                Phase::Title | Phase::Playing => {}
            }

            let Some(command) = self.input.next_command(&self.cancel)? else {
                self.state.end(LossReason::Interrupted);
                return Ok(Outcome::Interrupted);
            };
            self.apply(command);
        }
    }

    fn title(&mut self) -> Result<Option<Outcome>, SessionError> {
        let frame = Frame::title();
        loop {
            self.sink.present(&frame)?;
            match self.input.next_command(&self.cancel)? {
                None => {
                    self.state.end(LossReason::Interrupted);
                    return Ok(Some(Outcome::Interrupted));
                }
                Some(Command::Confirm) => {
                    self.state.begin();
                    return Ok(None);
                }
                Some(Command::Quit) => {
                    self.state.end(LossReason::Quit);
                    return Ok(Some(Outcome::Quit));
                }
                Some(_) => {}
            }
        }
    }

    fn apply(&mut self, command: Command) {
        match command {
            Command::Move(direction) => {
                let outcome = self.state.try_move(direction);
                if outcome != MoveOutcome::Blocked {
                    debug!(?direction, ?outcome, "moved");
                }
            }
            Command::PlaceLight => {
                self.state.place_light();
            }
            Command::Quit => self.state.end(LossReason::Quit),
            Command::Confirm | Command::Unknown => {}
        }
    }

    /// Relights the map from the current sources and draws one frame.
    fn draw_turn(&mut self) -> Result<(), SessionError> {
        let visibility = self.lighting.recompute(
            self.state.grid(),
            self.state.lights(),
            self.state.player(),
            &mut self.memory,
        );
        let frame = Frame::play(&self.state, &visibility, &self.memory);
        self.sink.present(&frame)?;
        self.turn += 1;
        if self.turn == 1 {
            info!(lit = visibility.lit_count(), "first frame drawn");
        }
        Ok(())
    }
}
