mod command;
mod health;
mod page;

pub use command::*;
pub use health::*;
pub use page::*;
