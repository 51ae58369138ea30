use clap::{Parser, Subcommand};
use foglio::auth::{OAuthClient, StdinPrompt, TokenProvider};
use foglio::config::{self, Config, ConfigError};
use foglio::dropbox::DropboxClient;
use foglio::template::PostTemplate;
use foglio::{links, listing, output, portfolio, posts};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "foglio")]
#[command(about = "Generate portfolio posts from photos shared out of a Dropbox folder")]
#[command(long_about = "\
Generate portfolio posts from photos shared out of a Dropbox folder

Every photo is uploaded twice, a large and a small version. The small one
carries a suffix before the extension:

  /photo.heyitsalex.net/
  ├── Sunset.jpg            # large
  ├── sunset-small.jpg      # small → same post as Sunset.jpg
  └── Old Town.png          # large only → skipped, reported on stderr

foglio lists the folder, makes sure every file has a public shared link
(creating one when missing), pairs the two sizes by name and renders one
markdown post per pair from a template:

  ---
  title: [[name]]
  description: [[description]]
  ---
  [![photo]([[smallSizeLink]])]([[largeSizeLink]])

Fields: name, smallSizeLink, largeSizeLink, description (lower-cased name).

The first run asks you to authorize foglio in the browser; the token is
cached afterwards. Run 'foglio gen-config' to generate a documented
config.toml.")]
#[command(version)]
struct Cli {
    /// Config file [default: <user config dir>/foglio/config.toml]
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log HTTP calls and pagination to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List, link, pair and render posts
    Generate {
        /// Post template with [[field]] placeholders
        #[arg(long)]
        template: PathBuf,

        /// Directory the posts are written to (created if missing)
        #[arg(long, alias = "outputDirectory")]
        output_directory: String,
    },
    /// Obtain and cache an access token
    Auth {
        /// Ignore the cached token and authorize again
        #[arg(long)]
        reauthorize: bool,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Command::Generate {
            template,
            output_directory,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let template = PostTemplate::from_file(&template)?;
            let output_dir = config::expand_home(&output_directory)?;

            let prompt = StdinPrompt;
            let exchange = OAuthClient::new()?;
            let token = TokenProvider::from_config(&config, &prompt, &exchange)?.access_token()?;
            let client = DropboxClient::new(&config.dropbox.api_url, token)?;

            let files = listing::list_files(&client, &config.dropbox.folder)?;
            output::print_listing(&config.dropbox.folder, &files);

            let links = links::resolve_links(&client, &files)?;
            output::print_links(&links);

            let elements = portfolio::assemble(&links, &config.naming);
            debug!(elements = elements.len(), "assembled portfolio");

            let report = posts::generate_posts(&template, &elements, &output_dir)?;
            output::print_generate_report(&report);
        }
        Command::Auth { reauthorize } => {
            let config = load_config(cli.config.as_deref())?;
            let prompt = StdinPrompt;
            let exchange = OAuthClient::new()?;
            let provider = TokenProvider::from_config(&config, &prompt, &exchange)?;

            if !reauthorize && provider.cached_token().is_some() {
                println!("{}", output::format_token_stored(provider.token_path(), true));
            } else {
                provider.authorize()?;
                println!("{}", output::format_token_stored(provider.token_path(), false));
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// An explicit `--config` must exist; the default location is optional.
fn load_config(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    match explicit {
        Some(path) => config::load_required_config(path),
        None => match config::default_config_path() {
            Some(path) => {
                debug!(path = %path.display(), "loading config");
                config::load_config(&path)
            }
            None => config::resolve_config(config::stock_defaults_value(), None),
        },
    }
}

/// Diagnostics go to stderr; `RUST_LOG` overrides the level.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "foglio=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
