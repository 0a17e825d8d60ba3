use burnlink::cli::{Cli, Commands};
use clap::Parser;

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve {
            ref host,
            port,
            ref log_level,
        } => burnlink::cli::commands::serve::execute(&cli, host.as_deref(), port, log_level),
        Commands::Send(ref args) => burnlink::cli::commands::send::execute(&cli, args),
        Commands::Open {
            ref link,
            ref output,
            force,
        } => burnlink::cli::commands::open::execute(&cli, link, output.as_deref(), force),
        Commands::Version => burnlink::cli::commands::version::execute(&cli),
        Commands::Completions { shell } => burnlink::cli::commands::completions::execute(shell),
    };

    if let Err(e) = result {
        burnlink::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}
