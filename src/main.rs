use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use envfetch::{Fetcher, DEFAULT_COOKIE_NAME, DEFAULT_SESSION_KEY};

/// Fetch a URL with the session cookie stored in the nearest .env file.
#[derive(Debug, Parser)]
#[command(name = "envfetch", version)]
struct Args {
    /// URL to fetch.
    #[arg(required_unless_present = "locate")]
    url: Option<String>,

    /// Name of the environment file.
    #[arg(long, value_name = "NAME", default_value = envfetch::locate::DEFAULT_FILE_NAME)]
    env_file: String,

    /// Directory to start the search from [default: current directory].
    #[arg(long, value_name = "DIR")]
    root: Option<PathBuf>,

    /// Maximum depth searched below the start directory.
    #[arg(long, value_name = "N")]
    max_depth: Option<usize>,

    /// Environment key holding the session token.
    #[arg(long, value_name = "KEY", default_value = DEFAULT_SESSION_KEY)]
    session_key: String,

    /// Name of the cookie carrying the session token.
    #[arg(long, value_name = "NAME", default_value = DEFAULT_COOKIE_NAME)]
    cookie_name: String,

    /// Fail instead of sending an empty session when the token is missing.
    #[arg(long)]
    require_session: bool,

    /// Let values from the environment file replace those of the process.
    #[arg(long)]
    override_env: bool,

    /// Do not follow redirections.
    #[arg(long)]
    no_redirects: bool,

    /// Fail when the server answers with a non-success status.
    #[arg(long)]
    fail: bool,

    /// Print the path of the environment file that would be used, and exit.
    #[arg(long)]
    locate: bool,
}

impl Args {
    fn fetcher(&self) -> Fetcher {
        let mut fetcher = Fetcher::new();
        fetcher.env_file_name(self.env_file.as_str());
        if let Some(root) = &self.root {
            fetcher.search_root(root);
        }
        if let Some(depth) = self.max_depth {
            fetcher.max_depth(depth);
        }
        fetcher.session_key(self.session_key.as_str());
        fetcher.cookie_name(self.cookie_name.as_str());
        fetcher.require_session(self.require_session);
        fetcher.override_process_env(self.override_env);
        fetcher.follow_redirects(!self.no_redirects);
        fetcher
    }
}

fn run(args: &Args) -> envfetch::Result {
    let fetcher = args.fetcher();

    if args.locate {
        if let Some(path) = fetcher.locate()? {
            println!("{}", path.display());
        }
        return Ok(());
    }

    let url = match &args.url {
        Some(url) => url,
        None => return Ok(()),
    };

    let mut response = fetcher.fetch_response(url)?;
    if args.fail {
        response = response.error_for_status()?;
    }
    let body = response.text()?;

    let mut stdout = io::stdout().lock();
    stdout.write_all(body.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("envfetch: {}", err);
            ExitCode::FAILURE
        }
    }
}
