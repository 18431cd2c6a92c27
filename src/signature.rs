//! Signature capture
//!
//! A drawing surface that records pen strokes and exports them as an opaque
//! image payload. Consumers never look inside the payload; they only check
//! whether the surface has content and pass the image along.

use std::fmt::Write as _;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::ValidationError;

/// Default surface width in logical pixels
pub const DEFAULT_WIDTH: u32 = 500;

/// Default surface height in logical pixels
pub const DEFAULT_HEIGHT: u32 = 200;

const SVG_DATA_URL_PREFIX: &str = "data:image/svg+xml;base64,";

/// A pen position on the surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Opaque signature image, carried as a data URL.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SignatureImage(String);

impl SignatureImage {
    /// Wrap an image data URL produced by another capture surface
    pub fn from_data_url(data_url: impl Into<String>) -> Result<Self, ValidationError> {
        let data_url = data_url.into();
        let Some(rest) = data_url.strip_prefix("data:image/") else {
            return Err(ValidationError::invalid_format(
                "signature",
                "expected an image data URL",
            ));
        };

        match rest.split_once(',') {
            Some((_, payload)) if !payload.is_empty() => Ok(Self(data_url)),
            _ => Err(ValidationError::SignatureMissing),
        }
    }

    pub fn as_data_url(&self) -> &str {
        &self.0
    }

    /// Media type declared by the data URL, e.g. `image/svg+xml`
    pub fn media_type(&self) -> &str {
        self.0
            .strip_prefix("data:")
            .and_then(|rest| rest.split(|c| c == ';' || c == ',').next())
            .unwrap_or_default()
    }

    /// SHA-256 of the payload, safe to log in place of the image itself
    pub fn fingerprint(&self) -> String {
        hex::encode(Sha256::digest(self.0.as_bytes()))
    }
}

impl std::fmt::Debug for SignatureImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SignatureImage")
            .field(&format_args!("sha256:{}", &self.fingerprint()[..12]))
            .finish()
    }
}

impl TryFrom<String> for SignatureImage {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_data_url(value)
    }
}

impl From<SignatureImage> for String {
    fn from(image: SignatureImage) -> Self {
        image.0
    }
}

/// Stroke-recording signature surface.
#[derive(Debug, Clone)]
pub struct SignaturePad {
    width: u32,
    height: u32,
    strokes: Vec<Vec<Point>>,
    drawing: bool,
}

impl SignaturePad {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            strokes: Vec::new(),
            drawing: false,
        }
    }

    /// Pen down
    pub fn begin_stroke(&mut self, at: Point) {
        let at = self.clamp(at);
        self.strokes.push(vec![at]);
        self.drawing = true;
    }

    /// Pen moved; starts a stroke if the pen was up
    pub fn extend(&mut self, to: Point) {
        if !self.drawing {
            self.begin_stroke(to);
            return;
        }
        let to = self.clamp(to);
        if let Some(stroke) = self.strokes.last_mut() {
            stroke.push(to);
        }
    }

    /// Pen up
    pub fn end_stroke(&mut self) {
        self.drawing = false;
    }

    /// Erase everything
    pub fn clear(&mut self) {
        self.strokes.clear();
        self.drawing = false;
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    pub fn stroke_count(&self) -> usize {
        self.strokes.len()
    }

    /// Export the drawing; an empty surface exports nothing
    pub fn to_image(&self) -> Option<SignatureImage> {
        if self.is_empty() {
            return None;
        }
        let svg = self.render_svg();
        Some(SignatureImage(format!(
            "{}{}",
            SVG_DATA_URL_PREFIX,
            STANDARD.encode(svg.as_bytes())
        )))
    }

    fn clamp(&self, p: Point) -> Point {
        Point {
            x: p.x.clamp(0.0, self.width as f32),
            y: p.y.clamp(0.0, self.height as f32),
        }
    }

    fn render_svg(&self) -> String {
        let mut path = String::new();
        for stroke in &self.strokes {
            let mut points = stroke.iter();
            let Some(first) = points.next() else { continue };
            let _ = write!(path, "M{:.1} {:.1}", first.x, first.y);

            if stroke.len() == 1 {
                // a tap still leaves a visible dot
                path.push_str(" l0.1 0");
            }
            for p in points {
                let _ = write!(path, " L{:.1} {:.1}", p.x, p.y);
            }
            path.push(' ');
        }

        format!(
            concat!(
                r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
                r#"<rect width="100%" height="100%" fill="white"/>"#,
                r#"<path d="{d}" fill="none" stroke="black" stroke-width="2" stroke-linecap="round" stroke-linejoin="round"/>"#,
                "</svg>"
            ),
            w = self.width,
            h = self.height,
            d = path.trim_end()
        )
    }
}

impl Default for SignaturePad {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}
