mod sources;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitCode};

use anyhow::{Context, Result, anyhow, bail};
use clap::{ArgAction, Parser};
use tempfile::NamedTempFile;
use tracing::{Level, debug, info, warn};
use vertex_core::diagnostic;
use vertex_core::{CompileOptions, compile_with};

/// Command-line arguments of `vertexc`.
#[derive(Parser, Debug)]
#[command(name = "vertexc", version, about = "Compile Vertex programs to Python", long_about = None)]
struct Cli {
    #[arg(help = "Source file, or a directory whose .vx files are all compiled")]
    input: PathBuf,

    #[arg(
        short,
        long,
        value_name = "PATH",
        help = "Output file (defaults to <stem>_gen.py); an output directory for directory input"
    )]
    output: Option<PathBuf>,

    #[arg(long, help = "Compile without writing any output")]
    check: bool,

    #[arg(
        long,
        conflicts_with = "check",
        help = "Run the generated program after writing it"
    )]
    run: bool,

    #[arg(
        long,
        value_name = "PATH",
        default_value = "python3",
        help = "Python interpreter used by --run"
    )]
    python: String,

    #[arg(long, help = "Do not write the generated-by header comment")]
    no_header: bool,

    #[arg(short, long, action = ArgAction::Count, help = "Increase log verbosity (-v, -vv, -vvv)")]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match execute(&cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn execute(cli: &Cli) -> Result<ExitCode> {
    if cli.input.is_dir() {
        if cli.run {
            bail!("--run needs a single input file");
        }
        return compile_directory(cli);
    }

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| sources::generated_file_name(&cli.input));
    compile_file(cli, &cli.input, &output)?;

    if cli.run {
        return run_python(&cli.python, &output);
    }
    Ok(ExitCode::SUCCESS)
}

/// Compile every source below the input directory.
///
/// Files are independent: a failure is reported and the next file is
/// still compiled.
fn compile_directory(cli: &Cli) -> Result<ExitCode> {
    let root = &cli.input;
    let files = sources::find_sources(root)
        .with_context(|| format!("failed to scan directory {}", root.display()))?;
    if files.is_empty() {
        warn!(directory = %root.display(), "no .{} files found", sources::SOURCE_EXTENSION);
    }

    let mut failed = 0usize;
    for input in &files {
        let output = batch_output_path(root, cli.output.as_deref(), input);
        if let Err(err) = compile_file(cli, input, &output) {
            eprintln!("{err:#}");
            failed += 1;
        }
    }

    if failed > 0 {
        bail!("{failed} of {} files failed to compile", files.len());
    }
    Ok(ExitCode::SUCCESS)
}

/// Where a file found under `root` is written. With an output directory
/// the layout below `root` is mirrored there; otherwise the generated
/// file sits next to its source.
fn batch_output_path(root: &Path, output_dir: Option<&Path>, input: &Path) -> PathBuf {
    let name = sources::generated_file_name(input);
    match output_dir {
        Some(dir) => {
            let relative_dir = input
                .strip_prefix(root)
                .ok()
                .and_then(Path::parent)
                .unwrap_or_else(|| Path::new(""));
            dir.join(relative_dir).join(name)
        }
        None => input.with_file_name(name),
    }
}

fn compile_file(cli: &Cli, input: &Path, output: &Path) -> Result<()> {
    let source = fs::read_to_string(input)
        .with_context(|| format!("failed to read input file {}", input.display()))?;

    let file_name = input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.display().to_string());
    let mut options = CompileOptions::for_source(file_name);
    if cli.no_header {
        options = options.without_header();
    }

    debug!(input = %input.display(), "compiling");
    let artifact = compile_with(&source, &options).map_err(|err| {
        anyhow!(diagnostic::render(&source, &input.display().to_string(), &err))
    })?;

    if cli.check {
        println!("{}: ok", input.display());
        return Ok(());
    }

    write_output(output, &artifact.python)?;
    info!(
        output = %output.display(),
        symbols = artifact.symbols.len(),
        "wrote generated program"
    );
    println!("Wrote {}", output.display());
    Ok(())
}

/// Write through a temporary file so a failed write never leaves a
/// truncated program at `path`.
fn write_output(path: &Path, contents: &str) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)
        .with_context(|| format!("failed to create directory {}", parent.display()))?;

    let mut file = NamedTempFile::new_in(parent)
        .with_context(|| format!("failed to create temporary file in {}", parent.display()))?;
    file.write_all(contents.as_bytes())
        .with_context(|| format!("failed to write output file {}", path.display()))?;
    file.persist(path)
        .with_context(|| format!("failed to write output file {}", path.display()))?;
    Ok(())
}

fn run_python(python: &str, script: &Path) -> Result<ExitCode> {
    debug!(interpreter = python, script = %script.display(), "running generated program");
    let status = Command::new(python)
        .arg(script)
        .status()
        .with_context(|| format!("failed to start {python}"))?;
    Ok(match status.code() {
        Some(0) => ExitCode::SUCCESS,
        Some(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        None => ExitCode::FAILURE,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mirrors_layout_in_output_directory() {
        let path = batch_output_path(
            Path::new("src"),
            Some(Path::new("out")),
            Path::new("src/demo/hello.vx"),
        );
        assert_eq!(path, PathBuf::from("out/demo/hello_gen.py"));
    }

    #[test]
    fn writes_next_to_source_without_output_directory() {
        let path = batch_output_path(Path::new("src"), None, Path::new("src/demo/hello.vx"));
        assert_eq!(path, PathBuf::from("src/demo/hello_gen.py"));
    }

    #[test]
    fn write_output_creates_parent_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let target = dir.path().join("a/b/out.py");
        write_output(&target, "print(1)\n").expect("write");
        assert_eq!(fs::read_to_string(&target).expect("read"), "print(1)\n");
    }

    #[test]
    fn parses_documented_command_line() {
        let cli = Cli::try_parse_from(["vertexc", "hello.vx", "-o", "out.py"]).expect("parse args");
        assert_eq!(cli.input, PathBuf::from("hello.vx"));
        assert_eq!(cli.output, Some(PathBuf::from("out.py")));
        assert_eq!(cli.python, "python3");
        assert!(!cli.run && !cli.check);
    }

    #[test]
    fn run_conflicts_with_check() {
        assert!(Cli::try_parse_from(["vertexc", "a.vx", "--run", "--check"]).is_err());
    }
}
