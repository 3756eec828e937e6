// ABOUTME: Deck builder for the upgrade deck generator
// ABOUTME: Walks the slide specifications once and drives a renderer, then saves the deck

use crate::clock::{Clock, FixedClock};
use crate::config::DeckConfig;
use crate::content;
use crate::errors::Result;
use crate::model::{Frame, ImageSpec, RgbColor, ShapeSpec, SlideLayout, SlideSpec};
use crate::pptx::PptxRenderer;
use crate::utils;
use log::{debug, info};
use std::path::{Path, PathBuf};

/// Placeholder index of the subtitle / body on both built-in layouts
pub const BODY_PLACEHOLDER_IDX: u32 = 1;

/// Handle to a slide, by position in the deck
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlideId(pub usize);

/// Handle to an overlay shape on a slide, by insertion order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeRef {
    pub slide: SlideId,
    pub index: usize,
}

/// The presentation capabilities the builder needs.
///
/// Every call mutates the renderer's deck in place; nothing is written to disk before `save`.
pub trait Renderer {
    fn add_slide(&mut self, layout: SlideLayout) -> Result<SlideId>;

    /// Set the slide's title placeholder
    fn set_title(&mut self, slide: SlideId, text: &str) -> Result<()>;

    fn set_placeholder_text(&mut self, slide: SlideId, idx: u32, text: &str) -> Result<()>;

    fn add_rectangle(&mut self, slide: SlideId, frame: Frame) -> Result<ShapeRef>;

    fn fill_solid(&mut self, shape: ShapeRef, color: RgbColor) -> Result<()>;

    /// Replace the shape's text, one paragraph per line
    fn set_shape_text(&mut self, shape: ShapeRef, text: &str) -> Result<()>;

    /// Color every run of every paragraph of the shape's text
    fn color_text(&mut self, shape: ShapeRef, color: RgbColor) -> Result<()>;

    fn add_picture(&mut self, slide: SlideId, path: &Path, frame: Frame) -> Result<ShapeRef>;

    fn save(&mut self, path: &Path) -> Result<()>;
}

/// Owns the deck for the duration of a run
pub struct DeckBuilder<R: Renderer, C: Clock> {
    renderer: R,
    clock: C,
    config: DeckConfig,
}

impl<R: Renderer, C: Clock> DeckBuilder<R, C> {
    pub fn new(renderer: R, clock: C, config: DeckConfig) -> Self {
        Self {
            renderer,
            clock,
            config,
        }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn into_renderer(self) -> R {
        self.renderer
    }

    pub fn add_image_shape(&mut self, slide: SlideId, image: &ImageSpec) -> Result<ShapeRef> {
        debug!("Adding image {:?} to slide {}", image.path, slide.0 + 1);
        self.renderer.add_picture(slide, &image.path, image.frame)
    }

    pub fn add_rectangle_with_text(
        &mut self,
        slide: SlideId,
        shape: &ShapeSpec,
    ) -> Result<ShapeRef> {
        debug!("Adding rectangle {:?} to slide {}", shape.text, slide.0 + 1);
        let handle = self.renderer.add_rectangle(slide, shape.frame)?;

        if let Some(fill) = shape.fill_color {
            self.renderer.fill_solid(handle, fill)?;
        }

        match shape.text_color {
            Some(color) => {
                self.renderer.set_shape_text(handle, &shape.text)?;
                self.renderer.color_text(handle, color)?;
            }
            None if !self.config.caption_requires_text_color => {
                self.renderer.set_shape_text(handle, &shape.text)?;
            }
            None => {
                debug!("No text color for {:?}, caption left empty", shape.text);
            }
        }

        Ok(handle)
    }

    pub fn build_title_slide(&mut self, title: &str, subtitle: &str) -> Result<SlideId> {
        let slide = self.renderer.add_slide(SlideLayout::Title)?;
        self.renderer.set_title(slide, title)?;
        self.renderer.set_placeholder_text(slide, BODY_PLACEHOLDER_IDX, subtitle)?;
        Ok(slide)
    }

    pub fn build_content_slide(
        &mut self,
        title: &str,
        body: Option<&str>,
        shapes: &[ShapeSpec],
        images: &[ImageSpec],
    ) -> Result<SlideId> {
        let slide = self.renderer.add_slide(SlideLayout::TitleAndContent)?;
        self.renderer.set_title(slide, title)?;

        if let Some(body) = body {
            self.renderer.set_placeholder_text(slide, BODY_PLACEHOLDER_IDX, body)?;
        }

        self.add_overlays(slide, shapes, images)?;
        Ok(slide)
    }

    /// Render one slide specification
    pub fn build_slide(&mut self, spec: &SlideSpec) -> Result<SlideId> {
        info!("Building slide: {}", spec.title);
        match spec.layout {
            SlideLayout::Title => {
                let slide =
                    self.build_title_slide(&spec.title, spec.body.as_deref().unwrap_or_default())?;
                self.add_overlays(slide, &spec.shapes, &spec.images)?;
                Ok(slide)
            }
            SlideLayout::TitleAndContent => self.build_content_slide(
                &spec.title,
                spec.body.as_deref(),
                &spec.shapes,
                &spec.images,
            ),
        }
    }

    /// Render every slide, in order
    pub fn build(&mut self, specs: &[SlideSpec]) -> Result<()> {
        info!("Building deck with {} slides", specs.len());
        for spec in specs {
            self.build_slide(spec)?;
        }
        Ok(())
    }

    /// Where `save` will write, based on the clock's current time
    pub fn output_path(&self) -> PathBuf {
        let file_name = utils::deck_file_name(
            &self.config.file_prefix,
            &self.clock.now(),
            &self.config.extension,
        );
        self.config.output_dir.join(file_name)
    }

    /// Serialize the deck to its timestamped output path
    pub fn save(&mut self) -> Result<PathBuf> {
        let path = self.output_path();
        info!("Saving deck to {:?}", path);
        self.renderer.save(&path)?;
        Ok(path)
    }

    fn add_overlays(
        &mut self,
        slide: SlideId,
        shapes: &[ShapeSpec],
        images: &[ImageSpec],
    ) -> Result<()> {
        for shape in shapes {
            self.add_rectangle_with_text(slide, shape)?;
        }
        for image in images {
            self.add_image_shape(slide, image)?;
        }
        Ok(())
    }
}

/// Build the upgrade deck and write it, returning the path of the new file.
pub fn generate_deck<C: Clock>(config: &DeckConfig, clock: C) -> Result<PathBuf> {
    render_deck(config, &content::upgrade_deck(), clock)
}

/// Render `slides` through the PPTX backend and save them.
///
/// The clock is read once; the file name and the document's creation time share that reading.
pub fn render_deck<C: Clock>(
    config: &DeckConfig,
    slides: &[SlideSpec],
    clock: C,
) -> Result<PathBuf> {
    let at = clock.now();
    let renderer = PptxRenderer::new(config.get_pptx_config(), at);
    let mut builder = DeckBuilder::new(renderer, FixedClock(at), config.clone());
    builder.build(slides)?;
    let path = builder.save()?;
    info!(
        "Deck created at {:?} ({} slides)",
        path,
        builder.renderer().presentation().slide_count()
    );
    Ok(path)
}
