// ABOUTME: Declarative slide model for the upgrade deck generator
// ABOUTME: Describes slides, rectangle overlays, images, lengths and colors as plain data

use std::fmt;
use std::path::PathBuf;

/// Number of EMUs in one inch
pub const EMU_PER_INCH: i64 = 914_400;

/// A length in English Metric Units, the native OOXML unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Emu(pub i64);

impl Emu {
    /// Length from inches, rounded to the nearest EMU.
    pub fn inches(value: f64) -> Self {
        Emu((value * EMU_PER_INCH as f64).round() as i64)
    }
}

impl fmt::Display for Emu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Position and size of an overlay on a slide
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub left: Emu,
    pub top: Emu,
    pub width: Emu,
    pub height: Emu,
}

impl Frame {
    pub fn new(left: Emu, top: Emu, width: Emu, height: Emu) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Frame given entirely in inches
    pub fn from_inches(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self::new(
            Emu::inches(left),
            Emu::inches(top),
            Emu::inches(width),
            Emu::inches(height),
        )
    }
}

/// 24-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RgbColor(pub u8, pub u8, pub u8);

impl RgbColor {
    pub const BLACK: RgbColor = RgbColor(0, 0, 0);

    /// Upper-case `RRGGBB` form used by `a:srgbClr`
    pub fn hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

impl fmt::Display for RgbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.hex())
    }
}

/// Built-in slide layouts, in the order the slide master lists them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlideLayout {
    /// Centered title with a subtitle
    Title,
    /// Title with a bulleted body placeholder
    TitleAndContent,
}

impl SlideLayout {
    /// 1-based layout number, matching `slideLayoutN.xml`
    pub fn number(self) -> usize {
        match self {
            SlideLayout::Title => 1,
            SlideLayout::TitleAndContent => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SlideLayout::Title => "Title Slide",
            SlideLayout::TitleAndContent => "Title and Content",
        }
    }
}

/// Rectangle overlay with a caption
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeSpec {
    pub frame: Frame,
    pub text: String,
    pub fill_color: Option<RgbColor>,
    pub text_color: Option<RgbColor>,
}

impl ShapeSpec {
    pub fn new(frame: Frame, text: impl Into<String>) -> Self {
        Self {
            frame,
            text: text.into(),
            fill_color: None,
            text_color: None,
        }
    }

    pub fn fill(mut self, color: RgbColor) -> Self {
        self.fill_color = Some(color);
        self
    }

    pub fn text_color(mut self, color: RgbColor) -> Self {
        self.text_color = Some(color);
        self
    }
}

/// Picture overlay. The path is resolved by the renderer, relative to the working directory.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageSpec {
    pub path: PathBuf,
    pub frame: Frame,
}

impl ImageSpec {
    pub fn new(path: impl Into<PathBuf>, frame: Frame) -> Self {
        Self {
            path: path.into(),
            frame,
        }
    }
}

/// One slide of the deck.
///
/// For [`SlideLayout::Title`] the body is rendered into the subtitle placeholder.
#[derive(Debug, Clone, PartialEq)]
pub struct SlideSpec {
    pub layout: SlideLayout,
    pub title: String,
    pub body: Option<String>,
    pub shapes: Vec<ShapeSpec>,
    pub images: Vec<ImageSpec>,
}

impl SlideSpec {
    /// Title slide with a subtitle
    pub fn title(title: impl Into<String>, subtitle: impl Into<String>) -> Self {
        Self {
            layout: SlideLayout::Title,
            title: title.into(),
            body: Some(subtitle.into()),
            shapes: Vec::new(),
            images: Vec::new(),
        }
    }

    /// Title-and-content slide with an empty body
    pub fn content(title: impl Into<String>) -> Self {
        Self {
            layout: SlideLayout::TitleAndContent,
            title: title.into(),
            body: None,
            shapes: Vec::new(),
            images: Vec::new(),
        }
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn shape(mut self, shape: ShapeSpec) -> Self {
        self.shapes.push(shape);
        self
    }

    pub fn image(mut self, image: ImageSpec) -> Self {
        self.images.push(image);
        self
    }
}
