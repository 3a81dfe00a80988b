pub mod event;
pub mod game;
pub mod level;
pub mod services;
pub mod turn;
pub mod world;
