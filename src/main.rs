use clap::Parser;
use std::path::PathBuf;

use ykushctl::config::Config;
use ykushctl::error::{Error, ErrorKind, Result};
use ykushctl::hub;
use ykushctl::protocol::{FrameVariant, PortSelector, PowerDirection};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
// -h selects the hub as in the original tool, so help is long-form only
#[command(disable_help_flag = true)]
struct Args {
    /// List all attached hubs with their ordinal, identity and
    /// manufacturer/product/serial strings
    #[arg(short = 'l', long, default_value_t = false)]
    list: bool,

    /// Hub to act on, as a 1-based index in enumeration order; note this
    /// index is not stable across replugging
    #[arg(short = 'h', long, value_name = "HUB")]
    hub: Option<usize>,

    /// Power the given port up, or all ports with 'a'
    #[arg(short = 'u', long, value_name = "PORT", conflicts_with_all = ["down", "list"])]
    up: Option<String>,

    /// Power the given port down, or all ports with 'a'
    #[arg(short = 'd', long, value_name = "PORT", conflicts_with = "list")]
    down: Option<String>,

    /// Encode command frames with byte 0 repeated in byte 1; some deployed
    /// firmware expects this legacy layout
    #[arg(long, default_value_t = false)]
    mirror_byte: bool,

    /// Path to config file providing defaults for the flags above
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Turn debugging information on. Alternatively can use RUST_LOG env: INFO, DEBUG, TRACE
    #[arg(short = 'D', long, action = clap::ArgAction::Count)]
    debug: u8,

    /// Print help
    #[arg(long, action = clap::ArgAction::Help)]
    help: Option<bool>,
}

fn run(args: &Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::sys_config()?,
    };
    let variant = if args.mirror_byte || config.mirror_byte {
        FrameVariant::MirrorByte
    } else {
        FrameVariant::Canonical
    };

    // resolve the action and validate the port selector before touching the
    // bus; out of range selectors are never put on the wire
    let action = match (&args.up, &args.down) {
        (Some(port), None) => Some((PowerDirection::Up, port.parse::<PortSelector>()?)),
        (None, Some(port)) => Some((PowerDirection::Down, port.parse::<PortSelector>()?)),
        _ => None,
    };

    if action.is_none() && !args.list {
        return Err(Error::new(
            ErrorKind::InvalidArg,
            "One of --list, --up or --down is required",
        ));
    }

    let mut ctx = rusb::Context::new()
        .map_err(|e| Error::new(ErrorKind::Init, &format!("Failed to initialize USB: {}", e)))?;
    hub::set_rusb_log_level(&mut ctx, args.debug);

    if args.list {
        for summary in hub::list_hubs(&ctx)? {
            println!("{}", summary);
        }
        return Ok(());
    }

    // checked above
    let (direction, selector) = action.ok_or_else(|| {
        Error::new(ErrorKind::InvalidArg, "One of --up or --down is required")
    })?;
    let ordinal = args.hub.unwrap_or(config.default_hub);

    hub::power(&ctx, ordinal, direction, selector, variant)
}

fn main() {
    let args = Args::parse();

    if let Err(e) = ykushctl::set_log_level(args.debug) {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(&args) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
