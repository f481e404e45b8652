pub mod app;
pub mod clock;
pub mod event;
pub mod focus;
pub mod input;
pub mod keymap;
pub mod page;
pub mod sound;
pub mod theme;
pub mod widgets;

pub use app::App;
pub use theme::Theme;
