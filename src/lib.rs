//! Procedural organism ecosystem: chain-animated creatures that wander, hunt,
//! eat and evolve across a ladder of levels.

pub mod body;
pub mod chain;
pub mod config;
pub mod draw;
pub mod ecosystem;
pub mod geom;
pub mod noise_field;
pub mod organism;
pub mod particles;
pub mod player;
pub mod sim;
pub mod spatial;
pub mod stats;
pub mod world;

pub use config::{ConfigError, SimConfig};
pub use draw::{Color, DrawList};
pub use organism::{Organism, OrganismId};
pub use player::{Growth, Player, PlayerInput};
pub use sim::{SimStatus, Simulation};
