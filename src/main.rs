//! annobox command-line front end.
//!
//! ```text
//! annobox [--config FILE] <image | annotation.json> [--out FILE]
//! ```
//!
//! Loads the file into a session, prints the annotated rectangles and, with
//! `--out` (or `auto_save` in the config), writes the normalized annotation.

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::path::{Path, PathBuf};

    use annobox::constants::ANNOTATION_EXTENSION;
    use annobox::{AppConfig, Result, Session};

    pub const USAGE: &str = "usage: annobox [--config FILE] <image|annotation.json> [--out FILE]";

    /// Parsed command line.
    #[derive(Debug, Default)]
    pub struct Args {
        pub config: Option<PathBuf>,
        pub input: PathBuf,
        pub out: Option<PathBuf>,
    }

    pub fn parse_args(args: impl IntoIterator<Item = String>) -> std::result::Result<Args, String> {
        let mut config = None;
        let mut input = None;
        let mut out = None;
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" | "-c" => {
                    config = Some(PathBuf::from(args.next().ok_or("--config needs a file")?));
                }
                "--out" | "-o" => {
                    out = Some(PathBuf::from(args.next().ok_or("--out needs a file")?));
                }
                "--help" | "-h" => return Err(USAGE.to_string()),
                flag if flag.starts_with('-') => return Err(format!("unknown option {}", flag)),
                _ if input.is_some() => return Err(format!("unexpected argument {}", arg)),
                _ => input = Some(PathBuf::from(arg)),
            }
        }
        Ok(Args {
            config,
            input: input.ok_or(USAGE)?,
            out,
        })
    }

    /// An explicit config file must load; the default one is optional.
    fn load_config(path: Option<&Path>) -> Result<AppConfig> {
        match path {
            Some(path) => Ok(AppConfig::load_from_path(path)?),
            None => Ok(AppConfig::load_from_default_path().unwrap_or_default()),
        }
    }

    fn is_annotation(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(ANNOTATION_EXTENSION))
    }

    pub fn run(args: Args) -> Result<()> {
        let config = load_config(args.config.as_deref())?;

        env_logger::Builder::new()
            .filter_level(config.preferences.log_level.to_level_filter())
            .parse_default_env()
            .init();

        let auto_save = config.preferences.auto_save;
        let mut session = Session::new(config);
        if is_annotation(&args.input) {
            session.open_annotation(&args.input)?;
        } else {
            session.open_image(&args.input)?;
        }

        if let Some(image) = session.image() {
            println!(
                "{} ({}x{}, depth {})",
                image.path.display(),
                image.width,
                image.height,
                image.depth
            );
        }
        for item in session.labels().items() {
            if let Some((min, max)) = session.canvas().shape(item.shape).and_then(|s| s.corners()) {
                println!(
                    "  {:<16} ({}, {}) - ({}, {})",
                    item.text, min.x, min.y, max.x, max.y
                );
            }
        }
        log::info!("{} shape(s) loaded", session.canvas().shapes().len());

        if args.out.is_some() || auto_save {
            let path = session.save(args.out.as_deref())?;
            println!("saved {}", path.display());
        }
        Ok(())
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        use annobox::AnnotateError;
        use annobox::config::ConfigError;

        fn args(list: &[&str]) -> std::result::Result<Args, String> {
            parse_args(list.iter().map(|s| s.to_string()))
        }

        #[test]
        fn test_parse_input_only() {
            let parsed = args(&["cat.png"]).unwrap();
            assert_eq!(parsed.input, PathBuf::from("cat.png"));
            assert!(parsed.config.is_none());
            assert!(parsed.out.is_none());
        }

        #[test]
        fn test_parse_all_options() {
            let parsed = args(&["--config", "c.json", "a.json", "-o", "b.json"]).unwrap();
            assert_eq!(parsed.config, Some(PathBuf::from("c.json")));
            assert_eq!(parsed.input, PathBuf::from("a.json"));
            assert_eq!(parsed.out, Some(PathBuf::from("b.json")));
        }

        #[test]
        fn test_parse_errors() {
            assert!(args(&[]).is_err());
            assert!(args(&["--out"]).is_err());
            assert!(args(&["--frobnicate", "a.png"]).is_err());
            assert!(args(&["a.png", "b.png"]).is_err());
        }

        #[test]
        fn test_annotation_detection() {
            assert!(is_annotation(Path::new("a.json")));
            assert!(is_annotation(Path::new("a.JSON")));
            assert!(!is_annotation(Path::new("a.png")));
            assert!(!is_annotation(Path::new("json")));
        }

        #[test]
        fn test_explicit_config_must_load() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("config.json");
            std::fs::write(&path, "{ not json").unwrap();
            assert!(matches!(
                load_config(Some(&path)),
                Err(AnnotateError::Config(ConfigError::ParseError(_)))
            ));
            assert!(matches!(
                load_config(Some(&dir.path().join("missing.json"))),
                Err(AnnotateError::Config(ConfigError::IoError(_)))
            ));
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    let args = match cli::parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(usage) => {
            eprintln!("{}", usage);
            return std::process::ExitCode::FAILURE;
        }
    };
    match cli::run(args) {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("annobox: {}", e);
            std::process::ExitCode::FAILURE
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}
