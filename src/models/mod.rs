pub mod chat;
pub mod comic;
pub mod history;
pub mod prediction;

pub use chat::*;
pub use comic::*;
pub use history::*;
pub use prediction::*;
