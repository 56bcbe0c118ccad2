//! `solbuild versions`: list the catalog and which builds are cached.

use solbuild_cache::BinaryCache;
use solbuild_compiler::Catalog;
use solbuild_config::resolve_build;

use crate::pipeline::load_project;
use crate::GlobalArgs;

/// Runs the `solbuild versions` command.
///
/// Prints one line per known version, newest first, marking builds already
/// present in the local binary cache.
pub async fn run(global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project = load_project(global)?;
    let options = resolve_build(&project.config, &project.root)?;
    let catalog = Catalog::builtin().with_overrides(&options.catalog);
    let cache = BinaryCache::new(&options.cache_dir);

    let mut entries: Vec<_> = catalog.iter().collect();
    entries.reverse();
    for (version, build) in entries {
        let cached = cache.lookup(build).await.is_some();
        println!("{}", format_entry(&version.to_string(), build, cached));
    }

    if !global.quiet {
        eprintln!("{} version(s) available", catalog.len());
    }
    Ok(0)
}

fn format_entry(version: &str, build: &str, cached: bool) -> String {
    let marker = if cached { "  (cached)" } else { "" };
    format!("{version:<10} {build}{marker}")
}
