mod commands;
mod handlers;
mod prompter;

pub use commands::{Cli, Commands};
pub use handlers::{
    handle_delete, handle_edit, handle_info, handle_init, handle_list, handle_new, handle_show,
};
pub use prompter::TerminalPrompter;
