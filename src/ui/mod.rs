pub mod app;
pub mod game_panel;
pub mod theme;
