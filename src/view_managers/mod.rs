pub mod config_manager;
pub mod grammar_manager;
pub mod menu_manager;

pub(crate) use config_manager::ConfigManager;
pub(crate) use grammar_manager::GrammarManager;
pub(crate) use menu_manager::MenuManager;
