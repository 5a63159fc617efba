pub mod catalog;
pub mod classify;
pub mod cli;
pub mod corpus;
pub mod diag;
pub mod emit;
pub mod engine;
pub mod manifest;
pub mod resolve;
pub mod scan;
pub mod workaround;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let command_line_interface = cli::CommandLineInterface::load();
    command_line_interface.run()
}
