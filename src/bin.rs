use clap::Parser;
use texcore::cli::{Cli, Command, Execute};

pub fn main() {
    env_logger::init();
    let cli = Cli::parse_from(wild::args());

    let result = match cli.command {
        Command::Tokenize(cmd) => cmd.execute(),
        Command::Run(cmd) => cmd.execute(),
        Command::Expand(cmd) => cmd.execute(),
        Command::Check(cmd) => cmd.execute(),
        #[cfg(feature = "cli-complete")]
        Command::Complete(cmd) => {
            let mut stdout = std::io::stdout();
            cmd.generate_completion_file(texcore::cli::build_cli, &mut stdout);
            Ok(())
        }
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
