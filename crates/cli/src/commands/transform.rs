use crate::errors::{CliError, Result};
use hypershape_core::{ContainerKey, Links, MappingRegistry, Transformer};
use std::io::Read;
use std::path::PathBuf;
use tracing::instrument;

/// Link URLs given on the command line
#[derive(Debug, Clone, Default)]
pub struct LinkArgs {
    pub self_url: Option<String>,
    pub first_url: Option<String>,
    pub last_url: Option<String>,
    pub prev_url: Option<String>,
    pub next_url: Option<String>,
}

impl LinkArgs {
    pub fn to_links(&self) -> Links {
        let mut links = Links::new();
        if let Some(url) = &self.self_url {
            links = links.with_self(url);
        }
        if let Some(url) = &self.first_url {
            links = links.with_first(url);
        }
        if let Some(url) = &self.last_url {
            links = links.with_last(url);
        }
        if let Some(url) = &self.prev_url {
            links = links.with_prev(url);
        }
        if let Some(url) = &self.next_url {
            links = links.with_next(url);
        }
        links
    }
}

#[derive(Debug, Clone)]
pub struct TransformArgs {
    pub mappings: PathBuf,
    /// Input path, `-` for stdin
    pub input: String,
    pub output: Option<PathBuf>,
    pub links: LinkArgs,
    pub max_depth: Option<usize>,
    pub alias_keys: bool,
    pub compact: bool,
}

#[instrument(skip_all, fields(mappings = %args.mappings.display(), input = %args.input))]
pub fn execute(args: &TransformArgs) -> Result<String> {
    let registry = MappingRegistry::load(&args.mappings)?;
    let input = read_input(&args.input)?;
    render(args, &registry, &input)
}

/// Transform `input` against `registry` and encode the resulting document
pub fn render(args: &TransformArgs, registry: &MappingRegistry, input: &str) -> Result<String> {
    let mut builder = Transformer::builder();
    if let Some(depth) = args.max_depth {
        builder = builder.max_depth(depth);
    }
    if args.alias_keys {
        builder = builder.container_key(ContainerKey::Alias);
    }

    let document = builder
        .build(registry)
        .transform_json(input, &args.links.to_links())?;
    tracing::debug!(
        links = document.links().iter().count(),
        "Document transformed"
    );

    let json = document.to_json();
    let encoded = if args.compact {
        serde_json::to_string(&json)
    } else {
        serde_json::to_string_pretty(&json)
    }
    .map_err(|e| hypershape_core::Error::serialization(e.to_string()))?;
    Ok(encoded)
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| CliError::file_error("read", "<stdin>", e))?;
        return Ok(buf);
    }
    std::fs::read_to_string(input).map_err(|e| CliError::file_error("read", input, e))
}
