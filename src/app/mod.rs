pub mod command;
pub mod session;

pub use command::{parse_command, FormEvent};
pub use session::FormSession;
