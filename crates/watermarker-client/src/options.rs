//! Conversion options forwarded to the watermarker service.

use crate::error::ParseOptionError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_SIZE: u32 = 75;
pub const DEFAULT_QUALITY: u32 = 100;

/// Watermark position
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Position {
    #[default]
    Center,
    Top,
    TopLeft,
    TopRight,
    Left,
    Right,
    Bottom,
    BottomLeft,
    BottomRight,
}

impl Position {
    pub const ALL: [Position; 9] = [
        Position::Center,
        Position::Top,
        Position::TopLeft,
        Position::TopRight,
        Position::Left,
        Position::Right,
        Position::Bottom,
        Position::BottomLeft,
        Position::BottomRight,
    ];

    /// Wire value sent in the `position` form field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Position::Center => "center",
            Position::Top => "top",
            Position::TopLeft => "top-left",
            Position::TopRight => "top-right",
            Position::Left => "left",
            Position::Right => "right",
            Position::Bottom => "bottom",
            Position::BottomLeft => "bottom-left",
            Position::BottomRight => "bottom-right",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Position {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        Position::ALL
            .into_iter()
            .find(|p| p.as_str() == normalized)
            .ok_or_else(|| ParseOptionError {
                kind: "position",
                value: s.to_string(),
                expected: Position::ALL.map(|p| p.as_str()).join(", "),
            })
    }
}

/// Output image format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Jpg,
    #[default]
    Png,
    Gif,
}

impl Format {
    pub const ALL: [Format; 3] = [Format::Jpg, Format::Png, Format::Gif];

    /// Wire value sent in the `format` form field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Jpg => "jpg",
            Format::Png => "png",
            Format::Gif => "gif",
        }
    }

    pub fn extension(&self) -> &'static str {
        self.as_str()
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Format::Jpg => "image/jpeg",
            Format::Png => "image/png",
            Format::Gif => "image/gif",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "jpg" | "jpeg" => Ok(Format::Jpg),
            "png" => Ok(Format::Png),
            "gif" => Ok(Format::Gif),
            _ => Err(ParseOptionError {
                kind: "format",
                value: s.to_string(),
                expected: Format::ALL.map(|f| f.as_str()).join(", "),
            }),
        }
    }
}

/// Options for a single `apply` call.
///
/// Values are not range-checked here; the service rejects out-of-range
/// values with a 4xx response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    /// Size of the watermark relative to the image, in percent.
    pub size: u32,
    pub position: Position,
    pub format: Format,
    /// Output quality, 0-100.
    pub quality: u32,
    /// Blur radius applied to the underlying image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blur: Option<u32>,
    /// Watermark opacity, 0-100.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<u32>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            position: Position::default(),
            format: Format::default(),
            quality: DEFAULT_QUALITY,
            blur: None,
            opacity: None,
        }
    }
}

impl ConvertOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    pub fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    pub fn with_quality(mut self, quality: u32) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_blur(mut self, blur: u32) -> Self {
        self.blur = Some(blur);
        self
    }

    pub fn with_opacity(mut self, opacity: u32) -> Self {
        self.opacity = Some(opacity);
        self
    }

    /// Text form fields in the order they are sent. `blur` and `opacity`
    /// appear only when set.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("size", self.size.to_string()),
            ("position", self.position.as_str().to_string()),
            ("format", self.format.as_str().to_string()),
            ("quality", self.quality.to_string()),
        ];
        if let Some(blur) = self.blur {
            fields.push(("blur", blur.to_string()));
        }
        if let Some(opacity) = self.opacity {
            fields.push(("opacity", opacity.to_string()));
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_names(options: &ConvertOptions) -> Vec<&'static str> {
        options.form_fields().into_iter().map(|(k, _)| k).collect()
    }

    #[test]
    fn test_defaults() {
        let options = ConvertOptions::default();
        assert_eq!(options.size, 75);
        assert_eq!(options.position, Position::Center);
        assert_eq!(options.format, Format::Png);
        assert_eq!(options.quality, 100);
        assert_eq!(options.blur, None);
        assert_eq!(options.opacity, None);
    }

    #[test]
    fn test_default_form_fields() {
        let fields = ConvertOptions::default().form_fields();
        assert_eq!(
            fields,
            vec![
                ("size", "75".to_string()),
                ("position", "center".to_string()),
                ("format", "png".to_string()),
                ("quality", "100".to_string()),
            ]
        );
    }

    #[test]
    fn test_optional_fields_only_when_set() {
        let blur_only = ConvertOptions::default().with_blur(3);
        assert_eq!(
            field_names(&blur_only),
            vec!["size", "position", "format", "quality", "blur"]
        );

        let opacity_only = ConvertOptions::default().with_opacity(30);
        assert_eq!(
            field_names(&opacity_only),
            vec!["size", "position", "format", "quality", "opacity"]
        );

        let both = ConvertOptions::new()
            .with_size(50)
            .with_position(Position::TopLeft)
            .with_format(Format::Jpg)
            .with_quality(90)
            .with_blur(3)
            .with_opacity(30);
        assert_eq!(
            both.form_fields(),
            vec![
                ("size", "50".to_string()),
                ("position", "top-left".to_string()),
                ("format", "jpg".to_string()),
                ("quality", "90".to_string()),
                ("blur", "3".to_string()),
                ("opacity", "30".to_string()),
            ]
        );
    }

    #[test]
    fn test_zero_values_are_still_sent() {
        let options = ConvertOptions::default().with_blur(0).with_opacity(0);
        let fields = options.form_fields();
        assert!(fields.contains(&("blur", "0".to_string())));
        assert!(fields.contains(&("opacity", "0".to_string())));
    }

    #[test]
    fn test_position_wire_values() {
        let values: Vec<&str> = Position::ALL.iter().map(|p| p.as_str()).collect();
        assert_eq!(
            values,
            vec![
                "center",
                "top",
                "top-left",
                "top-right",
                "left",
                "right",
                "bottom",
                "bottom-left",
                "bottom-right"
            ]
        );
    }

    #[test]
    fn test_position_from_str() {
        assert_eq!("top-left".parse::<Position>(), Ok(Position::TopLeft));
        assert_eq!("BOTTOM_RIGHT".parse::<Position>(), Ok(Position::BottomRight));
        assert_eq!(" center ".parse::<Position>(), Ok(Position::Center));

        let err = "middle".parse::<Position>().unwrap_err();
        assert_eq!(err.kind, "position");
        assert_eq!(err.value, "middle");
        assert!(err.to_string().contains("bottom-left"));
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("jpg".parse::<Format>(), Ok(Format::Jpg));
        assert_eq!("JPEG".parse::<Format>(), Ok(Format::Jpg));
        assert_eq!("gif".parse::<Format>(), Ok(Format::Gif));
        assert!("webp".parse::<Format>().is_err());
    }

    #[test]
    fn test_format_mime_type() {
        assert_eq!(Format::Jpg.mime_type(), "image/jpeg");
        assert_eq!(Format::Png.extension(), "png");
        assert_eq!(Format::Gif.to_string(), "gif");
    }

    #[test]
    fn test_deserialize_partial_options() {
        let options: ConvertOptions =
            serde_json::from_str(r#"{"position":"bottom-right","opacity":40}"#).unwrap();
        assert_eq!(options.size, 75);
        assert_eq!(options.position, Position::BottomRight);
        assert_eq!(options.format, Format::Png);
        assert_eq!(options.opacity, Some(40));
        assert_eq!(options.blur, None);
    }

    #[test]
    fn test_serialize_skips_unset_optionals() {
        let json = serde_json::to_value(ConvertOptions::default().with_format(Format::Gif)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"size": 75, "position": "center", "format": "gif", "quality": 100})
        );
    }
}
