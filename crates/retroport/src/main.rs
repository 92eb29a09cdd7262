use clap::Parser;
use retroport::Args;

fn main() {
    env_logger::init();

    let args = Args::parse();
    if let Err(e) = args.validate() {
        eprintln!("Error: {e}");
        std::process::exit(2);
    }

    let config = args.to_session_config().unwrap_or_else(|err| {
        eprintln!("Error: {err:#}");
        std::process::exit(2);
    });

    if let Err(err) = retroport::run(config) {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}
