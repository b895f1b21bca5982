mod console_view;
mod input_translator;

pub use console_view::{ConsoleView, ConsoleViewBinding};
pub use input_translator::{InputTranslator, LineOutcome, HELP_TEXT};
