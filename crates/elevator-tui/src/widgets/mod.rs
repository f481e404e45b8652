mod page;
mod status_bar;

pub use page::PageWidget;
pub use status_bar::StatusBarWidget;
