use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use colored::Colorize;
use std::io;
use std::process::ExitCode;
use tracing::Level;

mod commands;
mod config;
mod logging;

/// CMake and vcpkg project scaffolding for C and C++.
///
/// Kiln reads a declarative kiln.toml, resolves external packages through
/// vcpkg and writes CMakeLists.txt files, shared options and CMakePresets.json
/// so the project configures and builds with plain CMake and Ninja.
///
/// EXAMPLES:
///     kiln init game               Create ./game/kiln.toml
///     kiln generate                Write CMake files for the project
///     kiln build --run             Build the first preset and run it
///     kiln doctor zlib fmt         Show versions vcpkg can pin
///     kiln unit engine renderer    Add renderer.hpp/.cpp to 'engine'
///
/// ENVIRONMENT VARIABLES:
///     KILN_HOME         Toolchain directory (default ~/.kiln)
///     KILN_VCPKG_ROOT   vcpkg checkout to use
///     KILN_PLATFORM     Override project.platform
///     KILN_COMPILER     Override project.compiler
///     KILN_JSON         Set to '1' for JSON output by default
///     KILN_LOG          Log filter when no flag is given
///     NO_COLOR          Set to disable colored output
#[derive(Parser)]
#[command(name = "kiln")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Verbose logging (debug level)
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    verbose: bool,
    /// Errors only
    #[arg(long, short = 'q', global = true)]
    quiet: bool,
    /// Explicit log level
    #[arg(long, global = true, value_enum)]
    log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new kiln project
    ///
    /// Writes a kiln.toml with a single binary target named after the
    /// project. An existing descriptor is never overwritten.
    ///
    /// EXAMPLES:
    ///     kiln init game                Create ./game/kiln.toml
    ///     kiln init --here              Use the current directory's name
    ///     kiln init tool --lang c       C project
    ///     kiln init web --platform wasm32-emscripten
    #[command(visible_alias = "i")]
    Init {
        /// Project name (defaults to the current directory's name)
        name: Option<String>,
        /// Write into the current directory instead of ./<name>
        #[arg(long)]
        here: bool,
        /// Project language
        #[arg(long, default_value = "c++")]
        lang: kiln_config::Language,
        /// vcpkg triplet (defaults to the host's)
        #[arg(long)]
        platform: Option<String>,
    },

    /// Generate CMake configuration
    ///
    /// Writes CMakePresets.json, .clang-format, one CMakeLists.txt per
    /// target, CMakeCommons.cmake and the top-level CMakeLists.txt. Files
    /// whose content is unchanged are left untouched. Packages that fail to
    /// resolve are reported as warnings.
    ///
    /// EXAMPLES:
    ///     kiln generate                 Generate for the current project
    ///     kiln gen --json               Print the report as JSON
    ///     KILN_PLATFORM=wasm32-emscripten kiln gen
    #[command(visible_alias = "gen")]
    Generate {
        /// Output the generation report as JSON
        #[arg(long, env = "KILN_JSON")]
        json: bool,
    },

    /// Configure and build through a generated preset
    ///
    /// Uses the first preset in CMakePresets.json unless --preset is given.
    ///
    /// EXAMPLES:
    ///     kiln build                          Build the first preset
    ///     kiln build --preset x64-linux-release
    ///     kiln build --list                   Show available presets
    ///     kiln build --clean --run -- --help  Rebuild, then run with args
    #[command(visible_alias = "b")]
    Build {
        /// Preset to build
        #[arg(long, short = 'p')]
        preset: Option<String>,
        /// List presets and exit
        #[arg(long)]
        list: bool,
        /// Remove out/ before building
        #[arg(long)]
        clean: bool,
        /// Run the root target after building
        #[arg(long, short = 'r')]
        run: bool,
        /// Arguments for the executable (after --)
        #[arg(last = true)]
        args: Vec<String>,
    },

    /// Show the versions vcpkg can pin
    ///
    /// Lists versions from the local vcpkg version database, grouped by
    /// major version. Without arguments every external dependency of the
    /// current project is checked.
    ///
    /// EXAMPLES:
    ///     kiln doctor                   Check the project's packages
    ///     kiln doctor zlib lua          Check specific ports
    Doctor {
        /// vcpkg port names
        packages: Vec<String>,
        /// Output as JSON
        #[arg(long, env = "KILN_JSON")]
        json: bool,
    },

    /// Create a header/source pair in a target
    ///
    /// C++ projects get include/<target>/<unit>.hpp and src/<unit>.cpp,
    /// C projects .h and .c. Existing files are left untouched.
    ///
    /// EXAMPLES:
    ///     kiln unit engine renderer
    #[command(visible_alias = "u")]
    Unit {
        /// Target that owns the unit
        target: String,
        /// Unit name (file stem)
        unit: String,
    },

    /// Generate shell completions
    ///
    /// EXAMPLES:
    ///     kiln completions bash > ~/.bash_completions/kiln.bash
    ///     kiln completions zsh > ~/.zfunc/_kiln
    ///     kiln completions fish > ~/.config/fish/completions/kiln.fish
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let cli_config = config::Config::from_env();
    cli_config.apply_color();

    logging::init(logging::LoggingConfig::from_flags(
        cli.log_level.map(Level::from),
        cli.verbose,
        cli.quiet,
    ));

    match run(cli, &cli_config) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, cli_config: &config::Config) -> Result<ExitCode> {
    let cwd = std::env::current_dir()?;

    match cli.command {
        Commands::Init {
            name,
            here,
            lang,
            platform,
        } => {
            commands::init::run(commands::init::InitArgs {
                name,
                here,
                path: cwd,
                language: lang,
                platform,
            })?;
        }
        Commands::Generate { json } => {
            // Command-line flag overrides environment variable
            let use_json = json || cli_config.default_json;
            commands::generate::run(commands::generate::GenerateArgs {
                dir: cwd,
                json: use_json,
                quiet: cli.quiet,
            })?;
        }
        Commands::Build {
            preset,
            list,
            clean,
            run,
            args,
        } => {
            return commands::build::run(commands::build::BuildArgs {
                preset,
                list,
                clean,
                run,
                args,
                dir: cwd,
                quiet: cli.quiet,
            });
        }
        Commands::Doctor { packages, json } => {
            commands::doctor::run(commands::doctor::DoctorArgs {
                packages,
                dir: cwd,
                json: json || cli_config.default_json,
            })?;
        }
        Commands::Unit { target, unit } => {
            commands::unit::run(commands::unit::UnitArgs {
                target,
                unit,
                dir: cwd,
            })?;
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut io::stdout());
        }
    }

    Ok(ExitCode::SUCCESS)
}
