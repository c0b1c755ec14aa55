use anyhow::Context;
use serde::Serialize;
use std::path::Path;
use watermarker_client::{ConvertOptions, Format, Position};

/// Option values given on the command line. Unset values keep whatever the
/// options file (or the defaults) specify.
#[derive(Debug, Clone, Default)]
pub struct OptionOverrides {
    pub size: Option<u32>,
    pub position: Option<Position>,
    pub format: Option<Format>,
    pub quality: Option<u32>,
    pub blur: Option<u32>,
    pub opacity: Option<u32>,
}

impl OptionOverrides {
    pub fn apply_to(&self, mut options: ConvertOptions) -> ConvertOptions {
        if let Some(size) = self.size {
            options.size = size;
        }
        if let Some(position) = self.position {
            options.position = position;
        }
        if let Some(format) = self.format {
            options.format = format;
        }
        if let Some(quality) = self.quality {
            options.quality = quality;
        }
        if self.blur.is_some() {
            options.blur = self.blur;
        }
        if self.opacity.is_some() {
            options.opacity = self.opacity;
        }
        options
    }
}

/// Builds the convert options from an optional JSON file plus overrides.
pub fn resolve_options(
    options_file: Option<&Path>,
    overrides: &OptionOverrides,
) -> anyhow::Result<ConvertOptions> {
    let base = match options_file {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read options file: {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("Invalid options file: {}", path.display()))?
        }
        None => ConvertOptions::default(),
    };
    Ok(overrides.apply_to(base))
}

pub fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn resolve_defaults() {
        let options = resolve_options(None, &OptionOverrides::default()).unwrap();
        assert_eq!(options, ConvertOptions::default());
    }

    #[test]
    fn overrides_replace_defaults() {
        let overrides = OptionOverrides {
            size: Some(40),
            position: Some(Position::BottomRight),
            opacity: Some(25),
            ..Default::default()
        };
        let options = resolve_options(None, &overrides).unwrap();
        assert_eq!(options.size, 40);
        assert_eq!(options.position, Position::BottomRight);
        assert_eq!(options.format, Format::Png);
        assert_eq!(options.quality, 100);
        assert_eq!(options.blur, None);
        assert_eq!(options.opacity, Some(25));
    }

    #[test]
    fn overrides_win_over_options_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"format":"gif","quality":80,"blur":2}}"#).unwrap();

        let overrides = OptionOverrides {
            quality: Some(60),
            ..Default::default()
        };
        let options = resolve_options(Some(file.path()), &overrides).unwrap();
        assert_eq!(options.format, Format::Gif);
        assert_eq!(options.quality, 60);
        assert_eq!(options.blur, Some(2));
        assert_eq!(options.size, 75);
    }

    #[test]
    fn invalid_options_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"position":"middle"}}"#).unwrap();

        let err = resolve_options(Some(file.path()), &OptionOverrides::default()).unwrap_err();
        assert!(err.to_string().contains("Invalid options file"));
    }

    #[test]
    fn missing_options_file() {
        let err = resolve_options(
            Some(Path::new("/definitely/not/here.json")),
            &OptionOverrides::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("Failed to read options file"));
    }
}
