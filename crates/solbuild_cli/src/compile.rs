//! `solbuild compile`: bring every requested artifact up to date.

use std::time::Instant;

use solbuild_compiler::{BuildReport, CompileError, Engine};
use solbuild_config::{resolve_build, BuildOptions};
use solbuild_diagnostics::DiagnosticSink;

use crate::pipeline::{load_project, render_diagnostics};
use crate::{CompileArgs, GlobalArgs};

/// Runs the `solbuild compile` command.
///
/// Returns exit code 0 when the build succeeds and 1 when the compiler
/// rejected a batch. Every other failure is returned as an error.
pub async fn run(args: &CompileArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project = load_project(global)?;
    let mut options = resolve_build(&project.config, &project.root)?;
    apply_overrides(&mut options, args);

    if !global.quiet {
        eprintln!("   Compiling {} ({})", project.display_name(), project.root.display());
    }

    let started = Instant::now();
    let engine = Engine::from_options(options);
    let sink = DiagnosticSink::new();
    let result = engine.build(&sink).await;
    render_diagnostics(&sink, global);

    match result {
        Ok(report) => {
            if !global.quiet {
                print_report(&report);
                eprintln!(
                    "    Finished {} in {:.2}s",
                    summary(&report),
                    started.elapsed().as_secs_f64()
                );
            }
            Ok(0)
        }
        Err(CompileError::CompilationFailed { version, errors }) => {
            eprintln!(
                "error: could not compile with solc {version} due to {} previous error(s)",
                errors.len()
            );
            Ok(1)
        }
        Err(e) => Err(e.into()),
    }
}

/// Applies command-line overrides on top of the resolved configuration.
fn apply_overrides(options: &mut BuildOptions, args: &CompileArgs) {
    if !args.units.is_empty() {
        options.units = Some(args.units.clone());
    }
    if let Some(version) = &args.compiler_version {
        options.compiler_version = Some(version.clone());
    }
}

fn print_report(report: &BuildReport) {
    for batch in &report.compiled {
        eprintln!(
            "    Compiled {} with solc {}",
            batch.units.join(", "),
            batch.version
        );
    }
}

fn summary(report: &BuildReport) -> String {
    let compiled = report.compiled_units();
    let fresh = report.fresh.len();
    match (compiled, fresh) {
        (0, 0) => "nothing to compile".to_string(),
        (0, f) => format!("{f} unit(s) up to date"),
        (c, 0) => format!("{c} unit(s) compiled"),
        (c, f) => format!("{c} unit(s) compiled, {f} up to date"),
    }
}
