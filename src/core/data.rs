pub mod fitness_history;
pub mod run_log;
