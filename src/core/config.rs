//! Viewer configuration
//!
//! A configuration is resolved once, by merging whatever the host supplied
//! over the documented defaults, and never changes for the lifetime of the
//! viewer. Hosts embedding the viewer in markup tend to hand every value
//! over as a string, so numeric and boolean options also accept strings.

use crate::{
    core::{constants::TILE_SIZE, geo::ImagePoint, pyramid::Pyramid},
    tiles::TileScheme,
    Result, ViewerError,
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Lenient field decoders for values that may arrive as strings
mod lenient {
    use serde::{de::Error, Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    pub(super) enum Scalar {
        Bool(bool),
        Number(f64),
        Text(String),
    }

    pub fn integer<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        match Scalar::deserialize(deserializer)? {
            Scalar::Number(n) => Ok(n.trunc() as i64),
            Scalar::Text(s) => s
                .trim()
                .parse::<f64>()
                .map(|n| n.trunc() as i64)
                .map_err(|_| D::Error::custom(format!("expected a number, got {:?}", s))),
            Scalar::Bool(b) => Err(D::Error::custom(format!("expected a number, got {}", b))),
        }
    }

    pub fn boolean<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        match Scalar::deserialize(deserializer)? {
            Scalar::Bool(b) => Ok(b),
            Scalar::Number(n) => Ok(n != 0.0),
            Scalar::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => Ok(true),
                "false" | "0" | "no" | "" => Ok(false),
                other => Err(D::Error::custom(format!("expected a boolean, got {:?}", other))),
            },
        }
    }
}

use lenient::Scalar;

/// Initial position on one axis of the normalized plane
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InitialCoordinate {
    #[default]
    Center,
    At(f64),
}

impl InitialCoordinate {
    pub fn resolve(&self) -> f64 {
        match self {
            Self::Center => 0.0,
            Self::At(value) => *value,
        }
    }
}

impl<'de> Deserialize<'de> for InitialCoordinate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        use serde::de::Error;
        match Scalar::deserialize(deserializer)? {
            Scalar::Number(n) => Ok(Self::At(n)),
            Scalar::Text(s) => {
                let s = s.trim();
                if s.is_empty() || s.eq_ignore_ascii_case("center") {
                    Ok(Self::Center)
                } else {
                    s.parse::<f64>()
                        .map(Self::At)
                        .map_err(|_| D::Error::custom(format!("expected \"center\" or a number, got {:?}", s)))
                }
            }
            Scalar::Bool(b) => Err(D::Error::custom(format!(
                "expected \"center\" or a number, got {}",
                b
            ))),
        }
    }
}

impl Serialize for InitialCoordinate {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Center => serializer.serialize_str("center"),
            Self::At(value) => serializer.serialize_f64(*value),
        }
    }
}

/// How the initial zoom level is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InitialZoom {
    /// Deepest level that fits inside the container
    #[default]
    Fit,
    Level(usize),
}

impl<'de> Deserialize<'de> for InitialZoom {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        use serde::de::Error;
        let level = |n: f64| {
            if n >= 0.0 {
                Ok(Self::Level(n.trunc() as usize))
            } else {
                Err(D::Error::custom(format!("zoom level must not be negative, got {}", n)))
            }
        };
        match Scalar::deserialize(deserializer)? {
            Scalar::Number(n) => level(n),
            Scalar::Text(s) => {
                let s = s.trim();
                if s.is_empty() || s.eq_ignore_ascii_case("fit") {
                    Ok(Self::Fit)
                } else {
                    let n = s.parse::<f64>().map_err(|_| {
                        D::Error::custom(format!("expected \"fit\" or a zoom level, got {:?}", s))
                    })?;
                    level(n)
                }
            }
            Scalar::Bool(b) => Err(D::Error::custom(format!(
                "expected \"fit\" or a zoom level, got {}",
                b
            ))),
        }
    }
}

impl Serialize for InitialZoom {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Fit => serializer.serialize_str("fit"),
            Self::Level(level) => serializer.serialize_u64(*level as u64),
        }
    }
}

/// Size of the widget's zoom control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ZoomControlSize {
    #[default]
    Large,
    Small,
    /// Whatever the widget picks; also used for unrecognized values
    Default,
}

impl From<String> for ZoomControlSize {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "large" => Self::Large,
            "small" => Self::Small,
            _ => Self::Default,
        }
    }
}

impl From<ZoomControlSize> for String {
    fn from(value: ZoomControlSize) -> Self {
        match value {
            ZoomControlSize::Large => "large",
            ZoomControlSize::Small => "small",
            ZoomControlSize::Default => "default",
        }
        .to_string()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CaptionRepr {
    Plain(String),
    Styled {
        #[serde(default)]
        text: Option<String>,
        #[serde(default, rename = "cssClass", alias = "css_class")]
        css_class: Option<String>,
    },
}

/// Caption text shown above or below the image
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CaptionRepr", rename_all = "camelCase")]
pub struct Caption {
    pub text: String,
    pub css_class: Option<String>,
}

impl From<CaptionRepr> for Caption {
    fn from(repr: CaptionRepr) -> Self {
        match repr {
            CaptionRepr::Plain(text) => Self {
                text,
                css_class: None,
            },
            CaptionRepr::Styled { text, css_class } => Self {
                text: text.unwrap_or_default(),
                css_class,
            },
        }
    }
}

impl Caption {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            css_class: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Copyright notice shown in the bottom-right corner
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Copyright {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, rename = "URL", alias = "url")]
    pub url: Option<String>,
}

/// Options recognized by a viewer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewerConfig {
    /// Enables diagnostic logging for this viewer only
    #[serde(deserialize_with = "lenient::boolean")]
    pub debug: bool,
    /// Prefix for log lines; defaults to the container id
    #[serde(alias = "log_id")]
    pub log_id: Option<String>,
    #[serde(alias = "show_pan_control", deserialize_with = "lenient::boolean")]
    pub show_pan_control: bool,
    #[serde(alias = "image_width", deserialize_with = "lenient::integer")]
    pub image_width: i64,
    #[serde(alias = "image_height", deserialize_with = "lenient::integer")]
    pub image_height: i64,
    #[serde(
        alias = "imageTileSize",
        alias = "tile_size",
        deserialize_with = "lenient::integer"
    )]
    pub tile_size: i64,
    #[serde(alias = "initial_x")]
    pub initial_x: InitialCoordinate,
    #[serde(alias = "initial_y")]
    pub initial_y: InitialCoordinate,
    #[serde(alias = "initial_zoom")]
    pub initial_zoom: InitialZoom,
    #[serde(alias = "tile_scheme")]
    pub tile_scheme: TileScheme,
    #[serde(alias = "tile_path")]
    pub tile_path: String,
    #[serde(alias = "zoom_size")]
    pub zoom_size: ZoomControlSize,
    #[serde(alias = "background_color")]
    pub background_color: String,
    #[serde(
        alias = "show_full_screen_control",
        alias = "fullscreen_control",
        deserialize_with = "lenient::boolean"
    )]
    pub show_full_screen_control: bool,
    #[serde(alias = "title_top")]
    pub title_top: Caption,
    #[serde(alias = "title_bottom")]
    pub title_bottom: Caption,
    pub copyright: Copyright,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            debug: false,
            log_id: None,
            show_pan_control: false,
            image_width: 0,
            image_height: 0,
            tile_size: TILE_SIZE as i64,
            initial_x: InitialCoordinate::Center,
            initial_y: InitialCoordinate::Center,
            initial_zoom: InitialZoom::Fit,
            tile_scheme: TileScheme::ImageMagick,
            tile_path: "tiles".to_string(),
            zoom_size: ZoomControlSize::Large,
            background_color: "#000".to_string(),
            show_full_screen_control: false,
            title_top: Caption::default(),
            title_bottom: Caption::default(),
            copyright: Copyright::default(),
        }
    }
}

fn positive_u32(value: i64, what: &str) -> Result<u32> {
    if value <= 0 || value > u32::MAX as i64 {
        return Err(ViewerError::InvalidDimension(format!(
            "{} must be a positive integer, got {}",
            what, value
        )));
    }
    Ok(value as u32)
}

impl ViewerConfig {
    /// Defaults for an image of the given size
    pub fn new(image_width: u32, image_height: u32) -> Self {
        Self {
            image_width: image_width as i64,
            image_height: image_height as i64,
            ..Default::default()
        }
    }

    /// Parses a JSON object and merges it over the defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_value(serde_json::from_str(json)?)
    }

    /// Merges an options object over the defaults. `null` means no options.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::Null => Ok(Self::default()),
            serde_json::Value::Object(_) => Ok(serde_json::from_value(value)?),
            other => Err(ViewerError::Config(format!(
                "options must be an object, got {}",
                other
            ))),
        }
    }

    /// Checks the image and tile dimensions
    pub fn validate(&self) -> Result<()> {
        self.dimensions().map(|_| ())
    }

    /// Validated `(image_width, image_height, tile_size)`
    pub fn dimensions(&self) -> Result<(u32, u32, u32)> {
        Ok((
            positive_u32(self.image_width, "imageWidth")?,
            positive_u32(self.image_height, "imageHeight")?,
            positive_u32(self.tile_size, "tileSize")?,
        ))
    }

    /// Zoom levels for the configured image
    pub fn pyramid(&self) -> Result<Pyramid> {
        let (width, height, tile_size) = self.dimensions()?;
        Pyramid::new(width, height, tile_size)
    }

    /// Initial center in normalized coordinates
    pub fn initial_center(&self) -> ImagePoint {
        ImagePoint::new(self.initial_x.resolve(), self.initial_y.resolve())
    }

    pub fn with_tile_path(mut self, tile_path: &str) -> Self {
        self.tile_path = tile_path.to_string();
        self
    }

    pub fn with_tile_size(mut self, tile_size: u32) -> Self {
        self.tile_size = tile_size as i64;
        self
    }

    pub fn with_tile_scheme(mut self, scheme: TileScheme) -> Self {
        self.tile_scheme = scheme;
        self
    }

    pub fn with_initial_zoom(mut self, zoom: InitialZoom) -> Self {
        self.initial_zoom = zoom;
        self
    }

    pub fn with_initial_center(mut self, x: f64, y: f64) -> Self {
        self.initial_x = InitialCoordinate::At(x);
        self.initial_y = InitialCoordinate::At(y);
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_full_screen_control(mut self, enabled: bool) -> Self {
        self.show_full_screen_control = enabled;
        self
    }

    pub fn with_titles(mut self, top: Caption, bottom: Caption) -> Self {
        self.title_top = top;
        self.title_bottom = bottom;
        self
    }

    pub fn with_copyright(mut self, text: &str, url: Option<&str>) -> Self {
        self.copyright = Copyright {
            text: Some(text.to_string()),
            url: url.map(str::to_string),
        };
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_merges_over_defaults() {
        let config = ViewerConfig::from_json(r#"{ "imageWidth": 4000, "imageHeight": 3000 }"#).unwrap();
        assert_eq!(config.image_width, 4000);
        assert_eq!(config.tile_size, 256);
        assert_eq!(config.initial_zoom, InitialZoom::Fit);
        assert_eq!(config.initial_center(), ImagePoint::center());
        assert_eq!(config.tile_path, "tiles");
        assert_eq!(config.background_color, "#000");
        assert_eq!(config.zoom_size, ZoomControlSize::Large);
        assert!(!config.debug);
        assert!(config.title_top.is_empty());
        assert!(config.copyright.text.is_none());
    }

    #[test]
    fn test_string_valued_options_are_accepted() {
        let config = ViewerConfig::from_json(
            r#"{
                "image_width": "1000",
                "image_height": "500",
                "tile_path": "/wp-content/uploads/liv/tiles",
                "initial_x": "12.5",
                "initial_y": "center",
                "initial_zoom": "2",
                "fullscreen_control": "true",
                "debug": "false",
                "zoomSize": "tiny"
            }"#,
        )
        .unwrap();

        assert_eq!(config.dimensions().unwrap(), (1000, 500, 256));
        assert_eq!(config.tile_path, "/wp-content/uploads/liv/tiles");
        assert_eq!(config.initial_center(), ImagePoint::new(12.5, 0.0));
        assert_eq!(config.initial_zoom, InitialZoom::Level(2));
        assert!(config.show_full_screen_control);
        assert!(!config.debug);
        assert_eq!(config.zoom_size, ZoomControlSize::Default);
    }

    #[test]
    fn test_legacy_tile_size_key() {
        let config = ViewerConfig::from_json(
            r#"{ "imageWidth": 10, "imageHeight": 10, "imageTileSize": 512 }"#,
        )
        .unwrap();
        assert_eq!(config.tile_size, 512);
    }

    #[test]
    fn test_captions_accept_string_or_object() {
        let config = ViewerConfig::from_json(
            r#"{
                "titleTop": "Harbor at dusk",
                "titleBottom": { "text": "Shot in 2013", "cssClass": "credits" },
                "copyright": { "text": "(c) Someone", "URL": "https://example.com" }
            }"#,
        )
        .unwrap();

        assert_eq!(config.title_top, Caption::new("Harbor at dusk"));
        assert_eq!(config.title_bottom.text, "Shot in 2013");
        assert_eq!(config.title_bottom.css_class.as_deref(), Some("credits"));
        assert_eq!(config.copyright.url.as_deref(), Some("https://example.com"));

        let empty: ViewerConfig = ViewerConfig::from_json(r#"{ "titleTop": {} }"#).unwrap();
        assert!(empty.title_top.is_empty());
    }

    #[test]
    fn test_validation_rejects_non_positive_dimensions() {
        let missing = ViewerConfig::default();
        assert!(matches!(missing.validate(), Err(ViewerError::InvalidDimension(_))));

        let negative = ViewerConfig::from_json(r#"{ "imageWidth": -5, "imageHeight": 10 }"#).unwrap();
        assert!(matches!(negative.pyramid(), Err(ViewerError::InvalidDimension(_))));

        let zero_tile = ViewerConfig::new(100, 100).with_tile_size(0);
        assert!(matches!(zero_tile.validate(), Err(ViewerError::InvalidDimension(_))));

        assert!(ViewerConfig::new(100, 100).validate().is_ok());
    }

    #[test]
    fn test_malformed_values_are_serialization_errors() {
        let result = ViewerConfig::from_json(r#"{ "imageWidth": "wide" }"#);
        assert!(matches!(result, Err(ViewerError::Serialization(_))));

        let result = ViewerConfig::from_json(r#"{ "initialZoom": -1 }"#);
        assert!(matches!(result, Err(ViewerError::Serialization(_))));
    }

    #[test]
    fn test_options_must_be_an_object() {
        assert!(matches!(ViewerConfig::from_json("[1, 2]"), Err(ViewerError::Config(_))));
        assert!(matches!(ViewerConfig::from_json("\"fit\""), Err(ViewerError::Config(_))));
        assert_eq!(ViewerConfig::from_json("null").unwrap(), ViewerConfig::default());
    }

    #[test]
    fn test_serialized_form_round_trips() {
        let config = ViewerConfig::new(800, 600)
            .with_initial_center(-10.0, 20.0)
            .with_initial_zoom(InitialZoom::Level(1))
            .with_copyright("(c) Someone", None);
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["initialZoom"], serde_json::json!(1));
        assert_eq!(json["zoomSize"], serde_json::json!("large"));

        let back = ViewerConfig::from_value(json).unwrap();
        assert_eq!(back, config);
    }
}
