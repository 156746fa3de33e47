use crate::commands::Command;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "hypershape")]
#[command(about = "Reshape type-tagged serializer output into hypermedia documents")]
#[command(long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(
        short = 'l',
        long,
        global = true,
        help = "Set logging level",
        default_value = "warn",
        value_enum
    )]
    pub level: crate::tracing::LogLevel,

    #[arg(
        long,
        global = true,
        help = "Log output format",
        default_value = "compact",
        value_enum
    )]
    pub log_format: crate::tracing::TracingFormat,

    #[arg(
        long,
        global = true,
        help = "Tracing filter directive, overrides --level and RUST_LOG"
    )]
    pub log_filter: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(about = "Show version information")]
    Version,
    #[command(about = "Transform a tagged IR document")]
    Transform {
        #[arg(
            long,
            short = 'm',
            env = "HYPERSHAPE_MAPPINGS",
            help = "Mapping file (YAML, or JSON when the extension is .json)"
        )]
        mappings: PathBuf,
        #[arg(
            long,
            short = 'i',
            help = "Tagged IR document to read, '-' for stdin",
            default_value = "-"
        )]
        input: String,
        #[arg(long, short = 'o', help = "Write the document here instead of stdout")]
        output: Option<PathBuf>,
        #[arg(long = "self-url", help = "URL of the 'self' link")]
        self_url: Option<String>,
        #[arg(long = "first-url", help = "URL of the 'first' page link")]
        first_url: Option<String>,
        #[arg(long = "last-url", help = "URL of the 'last' page link")]
        last_url: Option<String>,
        #[arg(long = "prev-url", help = "URL of the 'prev' page link")]
        prev_url: Option<String>,
        #[arg(long = "next-url", help = "URL of the 'next' page link")]
        next_url: Option<String>,
        #[arg(long, help = "Maximum nesting depth")]
        max_depth: Option<usize>,
        #[arg(long, help = "Name containers after mapping aliases instead of class names")]
        alias_keys: bool,
        #[arg(long, help = "Emit compact JSON")]
        compact: bool,
    },
    #[command(about = "List mapped types or resolve a resource name")]
    Mappings {
        #[arg(
            long,
            short = 'm',
            env = "HYPERSHAPE_MAPPINGS",
            help = "Mapping file (YAML, or JSON when the extension is .json)"
        )]
        mappings: PathBuf,
        #[arg(long, short = 'r', help = "Show the mapping serving this resource")]
        resource: Option<String>,
    },
}

impl From<Commands> for Command {
    fn from(cmd: Commands) -> Self {
        match cmd {
            Commands::Version => Self::Version,
            Commands::Transform {
                mappings,
                input,
                output,
                self_url,
                first_url,
                last_url,
                prev_url,
                next_url,
                max_depth,
                alias_keys,
                compact,
            } => Self::Transform(crate::commands::transform::TransformArgs {
                mappings,
                input,
                output,
                links: crate::commands::transform::LinkArgs {
                    self_url,
                    first_url,
                    last_url,
                    prev_url,
                    next_url,
                },
                max_depth,
                alias_keys,
                compact,
            }),
            Commands::Mappings { mappings, resource } => Self::Mappings { mappings, resource },
        }
    }
}

pub fn parse() -> Cli {
    Cli::parse()
}
