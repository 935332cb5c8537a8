use std::path::Path;

use crate::cli::commands::InitArgs;
use crate::io::config_io;

pub fn cmd_init(args: InitArgs, config: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let existed = config.exists();
    config_io::init_config(config, args.force)?;

    if existed {
        println!("Overwrote {}", config.display());
    } else {
        println!("Wrote {}", config.display());
    }
    Ok(())
}
