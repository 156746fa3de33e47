pub mod mappings;
pub mod transform;
pub mod version;

use crate::errors::Result;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub enum Command {
    Version,
    Transform(transform::TransformArgs),
    Mappings {
        mappings: PathBuf,
        resource: Option<String>,
    },
}

/// Run `command` and return what should be written to the output
pub fn execute(command: &Command) -> Result<String> {
    match command {
        Command::Version => Ok(version::get_version_info()),
        Command::Transform(args) => transform::execute(args),
        Command::Mappings { mappings, resource } => {
            mappings::execute(mappings, resource.as_deref())
        }
    }
}
