mod bootstrap;
mod demo;
mod graph_file;
mod input_script;
mod loop_runner;

pub(crate) use bootstrap::build_app;
pub(crate) use loop_runner::run;
