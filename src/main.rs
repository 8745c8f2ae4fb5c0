pub mod cli;
pub mod diagnose;
pub mod emit;
pub mod value;

use colored::Colorize;

fn main() {
    env_logger::init();
    let command_line_interface = cli::CommandLineInterface::load();
    if let Err(error) = command_line_interface.run() {
        eprintln!("{} {error:#}", "error:".red().bold());
        std::process::exit(1);
    }
}
