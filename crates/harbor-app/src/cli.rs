use clap::Parser;

/// Harbor: a terminal + calendar desktop shell backend.
#[derive(Parser, Debug)]
#[command(name = "harbor", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long)]
    pub config: Option<String>,

    /// Relay port override.
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Working directory for the shell.
    #[arg(short = 'd', long)]
    pub directory: Option<String>,

    /// Log filter override (e.g. "harbor=debug").
    #[arg(long)]
    pub log_level: Option<String>,
}

pub fn parse() -> Args {
    Args::parse()
}
