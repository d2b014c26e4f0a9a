//! ConceptGen CLI - Bridge interface for authoring tools
//!
//! Commands: components, concepts, publish, generate
//! Outputs JSON to stdout
//! Returns non-zero on publication or generation failure

use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use conceptgen_core::{
    generate, hashing, publish, publish_concept, registry::ComponentRegistry, ArtifactWriter,
    ComponentId, GeneratedBundle,
};

#[derive(Parser)]
#[command(name = "conceptgen-cli")]
#[command(about = "ConceptGen CLI - Concept Schema Compiler")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the component registry directory
    #[arg(short, long, default_value = "components")]
    registry_dir: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered components
    Components,

    /// List registered concepts
    Concepts,

    /// Publish a component (or a concept with --concept)
    Publish {
        /// Component or concept identity
        #[arg(short, long)]
        id: ComponentId,

        /// Treat the identity as a Concept
        #[arg(long)]
        concept: bool,
    },

    /// Generate the artifact bundle for a published concept
    Generate {
        /// Concept identity
        #[arg(short, long)]
        id: ComponentId,

        /// Output directory for the artifact files
        #[arg(short, long, default_value = "artifacts")]
        out: PathBuf,
    },
}

/// Filesystem implementation of the writer collaborator: persists the three
/// buffers plus the schema content hash under the conventional names.
struct FsWriter {
    out: PathBuf,
}

impl ArtifactWriter for FsWriter {
    fn write_bundle(&mut self, bundle: &GeneratedBundle) -> std::io::Result<()> {
        fs::create_dir_all(&self.out)?;
        let names = hashing::ArtifactNames::for_concept(bundle.concept_id);
        fs::write(self.out.join(&names.schema), &bundle.schema)?;
        fs::write(self.out.join(&names.instance), &bundle.instance)?;
        fs::write(self.out.join(&names.docs), &bundle.docs)?;
        fs::write(self.out.join(&names.hash), hashing::schema_hash(&bundle.schema))?;
        Ok(())
    }
}

fn save_registry(registry: &ComponentRegistry, dir: &Path) -> Result<(), std::io::Error> {
    registry.save_to_dir(dir)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut registry = match ComponentRegistry::load_from_dir(&cli.registry_dir) {
        Ok(r) => r,
        Err(e) => {
            eprintln!(r#"{{"error": "Failed to load registry: {}"}}"#, e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Components => {
            let components: Vec<_> = registry
                .list()
                .iter()
                .map(|c| {
                    serde_json::json!({
                        "id": c.meta.id,
                        "label": c.meta.label,
                        "kind": c.kind(),
                        "published": c.meta.published,
                    })
                })
                .collect();

            println!("{}", serde_json::to_string_pretty(&components).unwrap());
            ExitCode::SUCCESS
        }

        Commands::Concepts => {
            let concepts: Vec<_> = registry
                .list_concepts()
                .iter()
                .map(|c| {
                    serde_json::json!({
                        "id": c.id,
                        "title": c.metadata.title,
                        "published": c.published,
                        "generated": c.generated,
                    })
                })
                .collect();

            println!("{}", serde_json::to_string_pretty(&concepts).unwrap());
            ExitCode::SUCCESS
        }

        Commands::Publish { id, concept } => {
            let result = if concept {
                publish_concept(&mut registry, id)
            } else {
                publish(&mut registry, id)
            };

            match result {
                Ok(outcome) => {
                    if let Err(e) = save_registry(&registry, &cli.registry_dir) {
                        eprintln!(r#"{{"error": "Failed to save registry: {}"}}"#, e);
                        return ExitCode::FAILURE;
                    }
                    println!(
                        "{}",
                        serde_json::json!({"success": true, "outcome": format!("{:?}", outcome)})
                    );
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    println!(
                        "{}",
                        serde_json::json!({
                            "success": false,
                            "severity": e.severity(),
                            "error": e.to_string(),
                        })
                    );
                    ExitCode::from(2)
                }
            }
        }

        Commands::Generate { id, out } => match generate(&mut registry, id) {
            Ok(bundle) => {
                let mut writer = FsWriter { out };
                if let Err(e) = writer.write_bundle(&bundle) {
                    eprintln!(r#"{{"error": "Failed to write bundle: {}"}}"#, e);
                    return ExitCode::FAILURE;
                }
                if let Err(e) = save_registry(&registry, &cli.registry_dir) {
                    eprintln!(r#"{{"error": "Failed to save registry: {}"}}"#, e);
                    return ExitCode::FAILURE;
                }
                let names = hashing::ArtifactNames::for_concept(bundle.concept_id);
                let output = serde_json::json!({
                    "success": true,
                    "schema": names.schema,
                    "instance": names.instance,
                    "docs": names.docs,
                    "hash": names.hash,
                    "components": bundle.used.len(),
                });
                println!("{}", serde_json::to_string_pretty(&output).unwrap());
                ExitCode::SUCCESS
            }
            Err(e) => {
                let output = serde_json::json!({
                    "success": false,
                    "severity": e.severity(),
                    "error": e.to_string(),
                });
                println!("{}", serde_json::to_string(&output).unwrap());
                ExitCode::from(2)
            }
        },
    }
}
