//! TUI widgets for the studio

pub mod history;
pub mod input;
pub mod output;

pub use history::HistoryColumnWidget;
pub use input::InputWidget;
pub use output::OutputWidget;
