//! Command-line argument parsing for the `neighborgrid` binary.

use std::env;
use std::path::PathBuf;

/// Parsed command-line options.
#[derive(Debug, Default)]
pub struct CliOptions {
    pub config: Option<PathBuf>,
    pub preset: Option<String>,
    pub seed: Option<u64>,
    pub port: Option<u16>,
    /// Print one forecast bundle and grid health view, then exit.
    pub once: bool,
    pub help: bool,
}

/// Parses the process arguments.
///
/// # Errors
///
/// Returns a message describing the first invalid argument.
pub fn parse_args() -> Result<CliOptions, String> {
    parse_args_from(env::args().skip(1))
}

/// Parses an explicit argument list (without the program name).
///
/// # Errors
///
/// Returns a message describing the first invalid argument.
pub fn parse_args_from<I, S>(args: I) -> Result<CliOptions, String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let args: Vec<String> = args.into_iter().map(Into::into).collect();
    let mut opts = CliOptions::default();
    let mut i = 0usize;

    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                let path = args.next_or_err(
                    i,
                    "missing value for --config (expected a TOML file path)",
                )?;
                if opts.config.replace(PathBuf::from(path)).is_some() {
                    return Err("--config provided more than once".to_string());
                }
            }
            "--preset" => {
                i += 1;
                let name = args.next_or_err(
                    i,
                    "missing value for --preset (expected a preset name)",
                )?;
                if opts.preset.replace(name.to_string()).is_some() {
                    return Err("--preset provided more than once".to_string());
                }
            }
            "--seed" => {
                i += 1;
                let raw = args.next_or_err(
                    i,
                    "missing value for --seed (expected a u64)",
                )?;
                let seed = raw
                    .parse::<u64>()
                    .map_err(|_| format!("--seed value \"{raw}\" is not a valid u64"))?;
                opts.seed = Some(seed);
            }
            "--port" => {
                i += 1;
                let raw = args.next_or_err(
                    i,
                    "missing value for --port (expected a u16)",
                )?;
                let port = raw
                    .parse::<u16>()
                    .map_err(|_| format!("--port value \"{raw}\" is not a valid u16"))?;
                opts.port = Some(port);
            }
            "--once" => opts.once = true,
            "--help" | "-h" => opts.help = true,
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    if opts.config.is_some() && opts.preset.is_some() {
        return Err(
            "arguments `--config` and `--preset` are mutually exclusive; choose one source"
                .to_string(),
        );
    }

    Ok(opts)
}

trait SliceArgExt {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String>;
}

impl SliceArgExt for [String] {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String> {
        self.get(index)
            .map(String::as_str)
            .ok_or_else(|| err.to_string())
    }
}

pub fn print_usage() {
    eprintln!("neighborgrid: neighbourhood energy forecast and grid health service");
    eprintln!();
    eprintln!("Usage: neighborgrid [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <path>   Load configuration from a TOML file");
    eprintln!("  --preset <name>   Use a built-in preset (default, demo)");
    eprintln!("  --seed <u64>      Seed the forecast engine's random source");
    eprintln!("  --port <u16>      Override the listen port");
    eprintln!("  --once            Print one forecast and grid health view as JSON, then exit");
    eprintln!("  --help            Show this help message");
    eprintln!();
    eprintln!("Without --config or --preset the default preset is used.");
}

#[cfg(test)]
mod tests {
    use super::parse_args_from;

    #[test]
    fn empty_args_use_defaults() {
        let opts = parse_args_from(Vec::<String>::new()).expect("parse should succeed");
        assert!(opts.config.is_none());
        assert!(opts.preset.is_none());
        assert!(!opts.once);
    }

    #[test]
    fn supports_config_cli() {
        let opts = parse_args_from(["--config", "grid.toml"]).expect("parse should succeed");
        assert_eq!(
            opts.config.as_deref().and_then(|p| p.to_str()),
            Some("grid.toml")
        );
    }

    #[test]
    fn supports_seed_port_once() {
        let opts = parse_args_from([
            "--preset", "demo", "--seed", "7", "--port", "8080", "--once",
        ])
        .expect("parse should succeed");
        assert_eq!(opts.preset.as_deref(), Some("demo"));
        assert_eq!(opts.seed, Some(7));
        assert_eq!(opts.port, Some(8080));
        assert!(opts.once);
    }

    #[test]
    fn rejects_config_and_preset_together() {
        let err = parse_args_from(["--config", "a.toml", "--preset", "demo"]).unwrap_err();
        assert!(err.contains("mutually exclusive"));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(parse_args_from(["--seed", "-1"]).is_err());
        assert!(parse_args_from(["--port", "70000"]).is_err());
        assert!(parse_args_from(["--seed"]).is_err());
        assert!(parse_args_from(["--verbose"]).is_err());
    }
}
