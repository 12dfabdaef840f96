use std::ops::Range;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use clipweave::config::{Config, ConfigError, CopyFailurePolicy};
use clipweave::simulate::parse_range;

#[derive(Parser)]
#[command(name = "clipweave", about = "Copy/paste coordination for editors")]
pub struct Cli {
    #[command(flatten)]
    pub settings: Settings,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args)]
pub struct Settings {
    /// TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Drop all copy data when any copy provider fails
    #[arg(long, global = true)]
    pub abort_all: bool,

    /// Insert nothing when no paste provider produces an edit
    #[arg(long, global = true)]
    pub no_fallback: bool,

    /// Give up waiting for copy data after this many milliseconds
    #[arg(long, global = true)]
    pub copy_wait_timeout_ms: Option<u64>,
}

impl Settings {
    /// The configuration file, if any, with flag overrides applied.
    pub fn resolve(&self) -> Result<Config, ConfigError> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        if self.abort_all {
            config.copy_failure = CopyFailurePolicy::AbortAll;
        }
        if self.no_fallback {
            config.plain_text_fallback = false;
        }
        if let Some(ms) = self.copy_wait_timeout_ms {
            config.copy_wait_timeout_ms = Some(ms);
        }
        Ok(config)
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Copy a byte range from one file and paste it into another
    Transplant {
        /// File to copy from
        source: PathBuf,

        /// Byte range to copy, as START..END
        #[arg(long, value_parser = parse_range)]
        range: Range<usize>,

        /// File to paste into
        target: PathBuf,

        /// Byte offset in the target to paste at
        #[arg(long, default_value_t = 0)]
        at: usize,
    },

    /// Paste a list of URIs into a file
    PasteUris {
        /// File to paste into
        target: PathBuf,

        /// Byte offset in the target to paste at
        #[arg(long, default_value_t = 0)]
        at: usize,

        /// URIs to paste
        #[arg(required = true)]
        uris: Vec<String>,
    },
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn flags_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "plain_text_fallback = true\ncopy_wait_timeout_ms = 50").unwrap();
        let path = file.path().to_string_lossy().into_owned();

        let cli = Cli::try_parse_from([
            "clipweave",
            "paste-uris",
            "notes.md",
            "file:///a.png",
            "--config",
            &path,
            "--no-fallback",
            "--abort-all",
        ])
        .unwrap();
        let config = cli.settings.resolve().unwrap();
        assert!(!config.plain_text_fallback);
        assert_eq!(config.copy_failure, CopyFailurePolicy::AbortAll);
        assert_eq!(config.copy_wait_timeout_ms, Some(50));
    }

    #[test]
    fn transplant_parses_range() {
        let cli = Cli::try_parse_from([
            "clipweave",
            "transplant",
            "src/lib.rs",
            "--range",
            "4..12",
            "notes.md",
            "--at",
            "3",
        ])
        .unwrap();
        match cli.command {
            Command::Transplant { range, at, .. } => {
                assert_eq!(range, 4..12);
                assert_eq!(at, 3);
            }
            Command::PasteUris { .. } => panic!("wrong subcommand"),
        }
        assert!(cli.settings.resolve().unwrap().plain_text_fallback);
    }

    #[test]
    fn bad_range_is_rejected() {
        let parsed = Cli::try_parse_from([
            "clipweave",
            "transplant",
            "a.rs",
            "--range",
            "9..2",
            "b.md",
        ]);
        assert!(parsed.is_err());
    }
}
