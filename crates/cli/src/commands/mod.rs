mod check;
mod run;
mod show;

pub use check::check_command;
pub use run::run_command;
pub use show::show_command;
