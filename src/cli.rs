use clap::Parser;

use crate::db::ConnectionSource;

#[derive(Parser, Debug)]
#[command(name = "roster")]
#[command(author, version, about = "An interactive REPL for managing person records")]
pub struct Cli {
    /// Connection string, e.g. sqlite://roster.db. Prompted for when absent
    #[arg(long, env = "ROSTER_DATABASE_URL")]
    pub database_url: Option<String>,

    /// Log backend statements to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    pub fn connection_source(&self) -> ConnectionSource {
        match &self.database_url {
            Some(url) => ConnectionSource::Static(url.clone()),
            None => ConnectionSource::Prompt,
        }
    }
}
