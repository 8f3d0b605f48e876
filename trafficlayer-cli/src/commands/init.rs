//! Init command - initialize configuration file.

use std::path::Path;

use trafficlayer::config::ConfigFile;

use crate::error::CliError;

/// Run the init command.
///
/// An existing config keeps its values and is rewritten with the current
/// layout. An unreadable one is only replaced with `force`.
pub fn run(path: &Path, force: bool) -> Result<(), CliError> {
    let existed = path.exists();
    let config = match ConfigFile::load_from(path) {
        Ok(config) => config,
        Err(e) if force => {
            println!("Replacing unreadable config file ({})", e);
            ConfigFile::default()
        }
        Err(e) => return Err(e.into()),
    };
    config.save_to(path)?;

    if existed {
        println!("Updated configuration file: {}", path.display());
    } else {
        println!("Created configuration file: {}", path.display());
    }
    println!();

    if config.credentials.is_empty() {
        println!("No credentials configured yet. Add a section such as:");
        println!();
        println!("  [credential.primary]");
        println!("  provider = mapbox");
        println!("  token = <access token>");
        println!("  request_limit = 100000");
        println!();
    } else {
        println!("Credentials: {}", config.credentials.len());
    }
    println!("CLI arguments override config file values when specified.");
    Ok(())
}
