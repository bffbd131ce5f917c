mod commands;
mod terminal;

use commands::{CommandLine, Commands, info, methods, scan, wipe};
use terminal::{logging, print};
use umbra_common::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();
    logging::init_logging(commands.verbose, commands.quiet)?;

    let cfg = Config {
        quiet: commands.quiet,
        no_banner: commands.no_banner,
    };
    print::banner(cfg.no_banner, cfg.quiet);

    match commands.command {
        Commands::Info => {
            print::header("local network", cfg.quiet);
            info::info(&cfg)
        }
        Commands::Methods => {
            print::header("overwrite methods", cfg.quiet);
            methods::methods(&cfg);
            Ok(())
        }
        Commands::Wipe(args) => {
            print::header("secure deletion", cfg.quiet);
            wipe::wipe(args, &cfg).await
        }
        Commands::Scan(args) => {
            print::header("subnet scan", cfg.quiet);
            scan::scan(args, &cfg).await
        }
    }
}
