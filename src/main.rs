//! nvb - Neovim as the engine editor's external code editor
//!
//! This is the binary entry point. All logic lives in the library.

use clap::Parser;
use neovim_bridge::{run, Args, CliEvent, ConsoleNotifier};

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    let console = ConsoleNotifier::new(args.json);

    if let Err(e) = nvb_core::logging::init() {
        eprintln!("Warning: logging disabled: {}", e);
    }

    match run(args).await {
        Ok(true) => Ok(()),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            tracing::error!("{:?}", e);
            console.emit(&CliEvent::Error {
                message: e.to_string(),
            });
            std::process::exit(1);
        }
    }
}
