use std::io;
use std::path::PathBuf;

use clap::Parser;
use env_logger::Env;
use log::debug;

mod libankichou;

use crate::libankichou::session::{Console, Session, SessionError};

#[derive(Parser, Debug)]
#[command(name = "暗記帳 (Ankichō)")]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(short, long, value_name = "FILE")]
    import: Option<PathBuf>,
    #[arg(short, long, value_name = "FILE")]
    export: Option<PathBuf>,
    #[arg(short, long, default_value = "error")]
    log_level: String,
}

fn main() -> Result<(), SessionError> {
    let args = Args::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(args.log_level)).init();

    let console = Console::new(io::stdin().lock(), io::stdout());
    let mut session = Session::new(console, args.export);
    debug!("[Session] Console ready");

    if let Some(path) = args.import {
        session.import_startup(&path)?;
    }

    session.run(&mut rand::rng())
}
