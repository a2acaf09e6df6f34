use clap::Args;

pub type CmdResult<T> = deskthing_template::Result<(T, i32)>;

/// Flags that shape how the tool talks to the user, whatever it is doing.
#[derive(Args, Debug, Default)]
pub(crate) struct GlobalArgs {
    /// Only print errors
    #[arg(long)]
    pub silent: bool,

    /// Print debug output
    #[arg(long)]
    pub debug: bool,

    /// Answer yes to every confirmation and accept default values
    #[arg(long, short = 'y')]
    pub yes: bool,
}

pub mod update;

pub(crate) fn run_json(
    args: update::UpdateArgs,
    global: &GlobalArgs,
) -> (deskthing_template::Result<serde_json::Value>, i32) {
    crate::output::map_cmd_result_to_json(update::run(args, global))
}
