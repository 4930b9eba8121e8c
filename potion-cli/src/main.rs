use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result, bail};
use clap::Parser;
use potion_core::{CompileOptions, compile_erlang, parse_source};
use walkdir::WalkDir;

const SOURCE_EXTENSION: &str = "potion";

/// Compile Potion sources to Erlang modules.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// A `.potion` file, or a directory searched recursively for them
    source: PathBuf,

    #[arg(long, value_name = "DIR", default_value = "target")]
    outdir: PathBuf,

    #[arg(
        long,
        value_name = "NAME",
        help = "Module name (defaults to the file stem; single file only)"
    )]
    module: Option<String>,

    #[arg(long, help = "Print the parsed AST instead of compiling")]
    emit_ast: bool,

    #[arg(long, help = "Print the generated Erlang instead of writing files")]
    stdout: bool,

    #[arg(long, help = "Skip compiling the .erl file with erlc")]
    no_beam: bool,

    #[arg(long, help = "Run <module>:main() after compiling")]
    run: bool,

    #[arg(short, long, help = "Only print errors")]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    execute(cli)
}

fn execute(cli: Cli) -> Result<()> {
    let inputs = collect_inputs(&cli.source)?;
    if inputs.len() > 1 || cli.source.is_dir() {
        if cli.module.is_some() {
            bail!("--module can only be used with a single source file");
        }
        if cli.run {
            bail!("--run can only be used with a single source file");
        }
    }

    let mut modules: HashMap<String, &Path> = HashMap::new();
    let mut jobs = Vec::with_capacity(inputs.len());
    for path in &inputs {
        let module_name = module_name_for(path, cli.module.as_deref())?;
        if let Some(first) = modules.insert(module_name.clone(), path) {
            bail!(
                "{} and {} would both compile to module '{module_name}'",
                first.display(),
                path.display()
            );
        }
        jobs.push((path, module_name));
    }

    for (path, module_name) in jobs {
        compile_file(&cli, path, module_name)?;
    }
    Ok(())
}

fn collect_inputs(source: &Path) -> Result<Vec<PathBuf>> {
    if source.is_dir() {
        let mut files = Vec::new();
        for entry in WalkDir::new(source).sort_by_file_name() {
            let entry = entry.with_context(|| format!("failed to walk {}", source.display()))?;
            if entry.file_type().is_file() && has_source_extension(entry.path()) {
                files.push(entry.into_path());
            }
        }
        if files.is_empty() {
            bail!("no .{SOURCE_EXTENSION} files found in {}", source.display());
        }
        return Ok(files);
    }

    if !source.is_file() {
        bail!("file '{}' not found", source.display());
    }
    if !has_source_extension(source) {
        bail!("the file must have the extension .{SOURCE_EXTENSION}");
    }
    Ok(vec![source.to_path_buf()])
}

fn has_source_extension(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == SOURCE_EXTENSION)
}

fn module_name_for(path: &Path, requested: Option<&str>) -> Result<String> {
    if let Some(name) = requested {
        return Ok(name.to_string());
    }
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_string)
        .with_context(|| format!("cannot derive a module name from {}", path.display()))
}

fn compile_file(cli: &Cli, path: &Path, module_name: String) -> Result<()> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read input file {}", path.display()))?;

    if cli.emit_ast {
        let program =
            parse_source(&source).with_context(|| format!("failed to parse {}", path.display()))?;
        println!("{program:#?}");
        return Ok(());
    }

    let options = CompileOptions::with_module_name(module_name);
    let artifact = compile_erlang(&source, &options)
        .with_context(|| format!("failed to compile {}", path.display()))?;

    if cli.stdout {
        print!("{}", artifact.erlang);
        return Ok(());
    }

    let output_path = cli.outdir.join(format!("{}.erl", artifact.module_name));
    write_output(&output_path, artifact.erlang.as_bytes())?;
    progress(cli, &format!("Erlang file generated: {}", output_path.display()));

    if cli.no_beam {
        if cli.run {
            eprintln!("--run is ignored together with --no-beam");
        }
        return Ok(());
    }

    compile_beam(cli, &output_path)?;
    progress(
        cli,
        &format!(
            "Compilation successful! BEAM file: {}",
            cli.outdir.join(format!("{}.beam", artifact.module_name)).display()
        ),
    );

    if cli.run {
        progress(cli, "Running main/0...");
        run_main(&cli.outdir, &artifact.module_name)?;
    }
    Ok(())
}

fn progress(cli: &Cli, message: &str) {
    if !cli.quiet {
        eprintln!("{message}");
    }
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {parent:?}"))?;
        }
    }
    fs::write(path, bytes)
        .with_context(|| format!("failed to write output file {}", path.display()))?;
    Ok(())
}

fn compile_beam(cli: &Cli, erl_path: &Path) -> Result<()> {
    progress(cli, "Compiling with erlc...");
    let output = Command::new("erlc")
        .arg("-o")
        .arg(&cli.outdir)
        .arg(erl_path)
        .output()
        .context("failed to launch erlc")?;
    if !output.status.success() {
        bail!(
            "erlc compilation failed:\n{}",
            String::from_utf8_lossy(&output.stderr)
        );
    }
    Ok(())
}

fn run_main(outdir: &Path, module_name: &str) -> Result<()> {
    let status = Command::new("erl")
        .arg("-noshell")
        .arg("-pa")
        .arg(outdir)
        .arg("-eval")
        .arg(format!("{module_name}:main(), halt()."))
        .status()
        .context("failed to launch erl")?;
    if !status.success() {
        bail!("{module_name}:main() exited with {status}");
    }
    Ok(())
}
