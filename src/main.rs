use clap::Parser;
use taskboard::cli::commands::Cli;
use taskboard::cli::handlers;

fn main() {
    let cli = Cli::parse();
    taskboard::logging::init(cli.verbose);

    if let Err(e) = handlers::dispatch(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
