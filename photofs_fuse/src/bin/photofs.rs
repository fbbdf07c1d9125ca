use photofs_fuse::Command;
use photofs_fuse::USAGE;
use std::env;
use std::process::exit;
use tracing_subscriber::EnvFilter;

fn main()
{
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let config = match Command::parse(&args, |name| env::var(name).ok()) {
        Ok(Command::Mount(config)) => config,
        Ok(Command::Help) => {
            print!("{}", USAGE);
            return;
        },
        Err(err) => {
            eprintln!("photofs: {}\n\n{}", err, USAGE);
            exit(2);
        },
    };

    if let Err(err) = photofs_fuse::run(&config) {
        tracing::error!("{:#}", err);
        exit(1);
    }
}
