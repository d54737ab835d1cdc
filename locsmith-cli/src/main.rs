mod init;
mod status;
mod translate;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
}

/// Supported subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate changed keys into the configured target locales.
    Translate {
        /// Restrict the run to one target locale
        #[arg(short, long)]
        locale: Option<String>,

        /// Bypass change detection and retranslate everything
        #[arg(short, long)]
        force: bool,
    },

    /// Write a starter locsmith.toml into the current directory.
    Init,

    /// Show which keys are pending translation, without calling the model.
    Status,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let exit_code = match args.commands {
        Commands::Translate { locale, force } => translate::run(locale, force).await,
        Commands::Init => init::run(),
        Commands::Status => status::run(),
    };

    std::process::exit(exit_code);
}
