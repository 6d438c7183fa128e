//! modlookup CLI
//!
//! Resolves packages and types of a TOML world manifest as seen by one of
//! its modules.
//!
//! # Usage
//!
//! ```text
//! modlookup --world <FILE> [OPTIONS] <COMMAND>
//!
//! Commands:
//!   resolve  Resolve a package path
//!   type     Resolve a qualified type name
//!   visible  Resolve a package and show what the module sees of it
//!   modules  List modules with their reads and exports
//!
//! Options:
//!   -w, --world <FILE>  World manifest
//!   -t, --task <NAME>   Task name attached to diagnostics
//!   -v, --verbose       Increase verbosity (can be repeated)
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use modlookup::{LookupEnvironment, PackagePath, TypeLookupError, TypeResolution, World};

#[derive(Parser)]
#[command(name = "modlookup")]
#[command(about = "Split-package resolution over a module graph")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the world manifest
    #[arg(short, long, global = true, default_value = "world.toml")]
    world: PathBuf,

    /// Task name attached to diagnostics (overrides the manifest)
    #[arg(short, long, global = true)]
    task: Option<String>,

    /// Increase verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a package path
    Resolve {
        /// Requesting module
        module: String,

        /// Dotted package path
        package: String,
    },

    /// Resolve a qualified type name
    Type {
        /// Requesting module
        module: String,

        /// Qualified type name, e.g. com.foo.Bar
        name: String,
    },

    /// Resolve a package and show the binding the module sees
    Visible {
        /// Requesting module
        module: String,

        /// Dotted package path
        package: String,

        /// Prefer the module's own contribution
        #[arg(long)]
        prefer_local: bool,
    },

    /// List modules with their reads and exports
    Modules,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(std::io::stderr)
        .init();

    let mut world = World::from_path(&cli.world)
        .with_context(|| format!("Failed to load world: {}", cli.world.display()))?;
    world.options = world.options.merge_env();
    if let Some(task) = cli.task {
        world.options.task = task;
    }
    info!("Loaded {} modules from {}", world.modules.len(), cli.world.display());
    let mut env = world.build().context("Failed to build lookup environment")?;

    match cli.command {
        Commands::Resolve { module, package } => cmd_resolve(&mut env, &module, &package),
        Commands::Type { module, name } => cmd_type(&mut env, &module, &name),
        Commands::Visible {
            module,
            package,
            prefer_local,
        } => cmd_visible(&mut env, &module, &package, prefer_local),
        Commands::Modules => cmd_modules(&env),
    }
}

fn module_id(env: &LookupEnvironment, name: &str) -> Result<modlookup::ModuleId> {
    env.module_by_name(name)
        .with_context(|| format!("Unknown module: {}", name))
}

fn cmd_resolve(env: &mut LookupEnvironment, module: &str, package: &str) -> Result<()> {
    let module = module_id(env, module)?;
    let path = PackagePath::parse(package)?;

    match env.resolve_package(module, &path) {
        Some(found) => println!("{}", env.display(found)),
        None => println!("not found: {}", path),
    }
    Ok(())
}

fn cmd_type(env: &mut LookupEnvironment, module: &str, name: &str) -> Result<()> {
    let module = module_id(env, module)?;

    match env.resolve_type(module, name)? {
        TypeResolution::Found(ty) => print_type(env, ty),
        TypeResolution::NoSuchType(package) => {
            println!("not found: {} has no type {}", env.display(package), name);
        }
        TypeResolution::NoSuchPackage => println!("not found: no package for {}", name),
        TypeResolution::Failed(TypeLookupError::Ambiguous { first, second }) => {
            println!("ambiguous: {}", name);
            print_type(env, first);
            print_type(env, second);
        }
        TypeResolution::Failed(TypeLookupError::NotAccessible { ty }) => {
            println!("not accessible: {}", name);
            print_type(env, ty);
        }
    }
    Ok(())
}

fn print_type(env: &LookupEnvironment, ty: modlookup::TypeId) {
    let data = env.type_data(ty);
    println!(
        "  {}.{} (in {})",
        env.package(data.package()).compound_name(),
        data.name(),
        env.module_name(data.module())
    );
}

fn cmd_visible(env: &mut LookupEnvironment, module: &str, package: &str, prefer_local: bool) -> Result<()> {
    let module = module_id(env, module)?;
    let path = PackagePath::parse(package)?;

    let Some(found) = env.resolve_package(module, &path) else {
        println!("not found: {}", path);
        return Ok(());
    };
    match env.get_visible_for(found, module, prefer_local) {
        Some(visible) if env.package(visible).is_split() => {
            println!("conflict: {}", env.display(visible));
        }
        Some(visible) => println!(
            "{} (in {})",
            env.display(visible),
            env.module_name(env.package(visible).enclosing_module())
        ),
        None => println!("not visible: {}", path),
    }
    Ok(())
}

fn cmd_modules(env: &LookupEnvironment) -> Result<()> {
    for module in env.modules() {
        let kind = if module.is_unnamed() { " (unnamed)" } else { "" };
        println!("{}{}", module.name(), kind);

        let reads: Vec<String> = module
            .reads()
            .map(|(id, transitive)| {
                let name = env.module_name(id);
                if transitive {
                    format!("{} (transitive)", name)
                } else {
                    name.to_string()
                }
            })
            .collect();
        if !reads.is_empty() {
            println!("  reads:   {}", reads.join(", "));
        }

        let exports: Vec<String> = module.exports().iter().map(ToString::to_string).collect();
        if !exports.is_empty() {
            println!("  exports: {}", exports.join(", "));
        }
    }
    Ok(())
}
