//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

/// Download vehicle owner and service manuals into a local archive.
///
/// By default the owner portal catalog is walked model by model and every
/// manual is saved under `<output-dir>/<year>/<model>/`. With `--static-pages`
/// the configured tech-info pages are scraped instead.
#[derive(Parser, Debug)]
#[command(name = "manual-downloader")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Scrape the static tech-info pages instead of the model catalog
    #[arg(long = "static-pages", visible_alias = "kgis", alias = "KGIS")]
    pub static_pages: bool,

    /// Archive root directory [default: PDFs]
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Config file (TOML) [default: $XDG_CONFIG_HOME/manual-downloader/config.toml]
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// WebDriver endpoint used to render static pages (e.g. http://localhost:9515)
    #[arg(long, value_name = "URL")]
    pub webdriver_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_args_parses_successfully() {
        let args = Args::try_parse_from(["manual-downloader"]).unwrap();
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
        assert!(!args.static_pages);
        assert!(args.output_dir.is_none());
        assert!(args.config.is_none());
        assert!(args.webdriver_url.is_none());
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let args = Args::try_parse_from(["manual-downloader", "-v"]).unwrap();
        assert_eq!(args.verbose, 1);

        let args = Args::try_parse_from(["manual-downloader", "-vv"]).unwrap();
        assert_eq!(args.verbose, 2);

        let args =
            Args::try_parse_from(["manual-downloader", "--verbose", "--verbose"]).unwrap();
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_cli_quiet_flag_sets_quiet() {
        let args = Args::try_parse_from(["manual-downloader", "-q"]).unwrap();
        assert!(args.quiet);

        let args = Args::try_parse_from(["manual-downloader", "--quiet"]).unwrap();
        assert!(args.quiet);
    }

    #[test]
    fn test_cli_static_pages_flag_and_kgis_alias() {
        let args = Args::try_parse_from(["manual-downloader", "--static-pages"]).unwrap();
        assert!(args.static_pages);

        let args = Args::try_parse_from(["manual-downloader", "--kgis"]).unwrap();
        assert!(args.static_pages);

        let args = Args::try_parse_from(["manual-downloader", "--KGIS"]).unwrap();
        assert!(args.static_pages);
    }

    #[test]
    fn test_cli_output_dir_short_and_long() {
        let args = Args::try_parse_from(["manual-downloader", "-o", "/tmp/manuals"]).unwrap();
        assert_eq!(args.output_dir, Some(PathBuf::from("/tmp/manuals")));

        let args =
            Args::try_parse_from(["manual-downloader", "--output-dir", "archive"]).unwrap();
        assert_eq!(args.output_dir, Some(PathBuf::from("archive")));
    }

    #[test]
    fn test_cli_config_and_webdriver_url() {
        let args = Args::try_parse_from([
            "manual-downloader",
            "--config",
            "custom.toml",
            "--webdriver-url",
            "http://localhost:9515",
        ])
        .unwrap();
        assert_eq!(args.config, Some(PathBuf::from("custom.toml")));
        assert_eq!(args.webdriver_url.as_deref(), Some("http://localhost:9515"));
    }

    #[test]
    fn test_cli_help_flag_shows_usage() {
        // --help causes early exit, so we check it returns an error with Help kind
        let result = Args::try_parse_from(["manual-downloader", "--help"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_cli_version_flag_shows_version() {
        let result = Args::try_parse_from(["manual-downloader", "--version"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_cli_invalid_flag_returns_error() {
        let result = Args::try_parse_from(["manual-downloader", "--invalid-flag"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_cli_positional_args_rejected() {
        let result = Args::try_parse_from(["manual-downloader", "EV6"]);
        assert!(result.is_err());
    }
}
