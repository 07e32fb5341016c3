pub type CmdResult<T> = fabhand::Result<(T, i32)>;

pub mod bom;
pub mod config;
pub mod doctor;
pub mod generate;
pub mod push;
pub mod resolve;

/// Dispatch a command to its handler and map the result to JSON.
macro_rules! dispatch {
    ($args:expr, $module:ident) => {
        crate::output::map_cmd_result_to_json($module::run($args))
    };
}

pub(crate) fn run_json(command: crate::Commands) -> (fabhand::Result<serde_json::Value>, i32) {
    match command {
        crate::Commands::Push(args) => dispatch!(args, push),
        crate::Commands::Generate(args) => dispatch!(args, generate),
        crate::Commands::Resolve(args) => dispatch!(args, resolve),
        crate::Commands::Bom(args) => dispatch!(args, bom),
        crate::Commands::Doctor(args) => dispatch!(args, doctor),
        crate::Commands::Config(args) => dispatch!(args, config),
    }
}
