/// Scavenger: a turn-based tile-grid survival game.
///
/// The library is the simulation core: level generation, the movement
/// primitive, combat, and the turn conductor. Rendering, audio, input and
/// scene loading are collaborators a host plugs in through `sim::services`.

pub mod config;
pub mod domain;
pub mod error;
pub mod sim;

pub use config::{GameConfig, LevelConfig};
pub use error::{ConfigError, SimError};
pub use sim::event::GameEvent;
pub use sim::game::Game;
pub use sim::services::{SceneRequest, Services, SoundCue};
pub use sim::turn::TurnState;
