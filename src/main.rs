use clap::Parser;

use deskthing_template::logger::{self, LoggerConfig};

mod commands;
mod output;

use commands::{update::UpdateArgs, GlobalArgs};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "deskthing-template")]
#[command(version = VERSION)]
#[command(about = "Upgrade DeskThing app projects to the current template")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(flatten)]
    update: UpdateArgs,
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    logger::configure(LoggerConfig {
        debug: cli.global.debug,
        silent: cli.global.silent,
    });

    let (json_result, exit_code) = commands::run_json(cli.update, &cli.global);

    if let Err(err) = &json_result {
        logger::error("deskthing", &err.to_string());
    }
    if let Err(err) = output::print_json_result(json_result) {
        logger::error("deskthing", &err.to_string());
    }

    std::process::ExitCode::from(exit_code_to_u8(exit_code))
}

fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        0
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}
