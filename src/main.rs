use clap::Parser;
use hostvault::cli::{commands, output, Cli, Commands};

fn main() {
    hostvault::logging::init_tracing();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Set {
            ref host,
            ref username,
            ref value,
            password_stdin,
            ref keyfile,
            ref reference,
        } => commands::set::execute(
            &cli,
            host,
            username.as_deref(),
            value.as_deref(),
            password_stdin,
            keyfile.as_deref(),
            reference.as_deref(),
        ),
        Commands::Get { ref host, ref kind } => commands::get::execute(&cli, host, kind),
        Commands::List => commands::list::execute(&cli),
        Commands::Delete {
            ref host,
            ref kind,
            force,
        } => commands::delete::execute(&cli, host, kind, force),
        Commands::Tag {
            ref host,
            ref kind,
            ref tags,
        } => commands::tag::execute(&cli, host, kind, tags),
        Commands::Reset { force } => commands::reset::execute(&cli, force),
    };

    if let Err(e) = result {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}
