mod init;
pub use init::cmd_init;

use std::path::Path;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::{config_io, identity_io};
use crate::server::guard;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let json = cli.json;
    let config = cli.config.as_path();

    match cli.command {
        Commands::Init(args) => cmd_init(args, config),
        Commands::Config(cmd) => match cmd.action {
            ConfigAction::Show => cmd_config_show(config, json),
            ConfigAction::SetTimeout(args) => cmd_config_set_timeout(args, config),
        },
        Commands::Check(args) => cmd_check(args, config, json),
        Commands::Permissions(args) => cmd_permissions(args, json),
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

fn cmd_config_show(config: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let settings = config_io::load_settings(config)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&settings)?);
    } else {
        println!("{}", format_settings(&settings));
    }
    Ok(())
}

fn cmd_config_set_timeout(args: SetTimeoutArgs, config: &Path) -> Result<(), Box<dyn std::error::Error>> {
    // validate what's there before touching it
    config_io::load_settings(config)?;
    let mut doc = config_io::read_config_doc(config)?;
    config_io::set_timeout(&mut doc, args.minutes)?;
    config_io::write_config(config, &doc)?;
    println!("session.timeout_minutes = {}", args.minutes);
    Ok(())
}

// ---------------------------------------------------------------------------
// Permissions
// ---------------------------------------------------------------------------

fn cmd_check(args: CheckArgs, config: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let settings = config_io::load_settings(config)?;
    let identity = match &args.identity {
        Some(path) => Some(identity_io::read_identity(path)?),
        None => None,
    };

    let verdict = guard::require(identity.as_ref(), &args.path, &settings.auth);
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&check_to_json(&args.path, &verdict))?
        );
    } else {
        println!("{}", format_check(&args.path, &verdict));
    }
    Ok(())
}

fn cmd_permissions(args: PermissionsArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let identity = identity_io::read_identity(&args.identity)?;
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&permissions_to_json(&identity))?
        );
    } else {
        println!("{}", format_permissions(&identity));
    }
    Ok(())
}
