// ABOUTME: PPTX generation module for the upgrade deck generator
// ABOUTME: Holds the deck in memory and serializes it as an OOXML package with embedded images

use crate::builder::{Renderer, ShapeRef, SlideId};
use crate::errors::{DeckError, Result};
use crate::model::{Emu, Frame, RgbColor, SlideLayout};
use crate::templates::*;
use crate::utils::{self, escape_xml};
use chrono::{DateTime, Local, Utc};
use image::io::Reader as ImageReader;
use image::ImageFormat;
use log::{debug, info};
use std::collections::BTreeSet;
use std::fmt::Write as FmtWrite;
use std::fs;
use std::io::{Cursor, Seek, Write};
use std::path::Path;
use zip::{write::FileOptions, ZipWriter};

/// Document-level settings for PPTX generation
#[derive(Debug, Clone)]
pub struct PptxConfig {
    pub title: String,
    pub creator: String,
    pub slide_width: Emu,
    pub slide_height: Emu,
}

impl Default for PptxConfig {
    fn default() -> Self {
        Self {
            title: "Presentation".to_string(),
            creator: "odoo-upgrade-deck".to_string(),
            slide_width: Emu::inches(10.0),
            slide_height: Emu::inches(7.5),
        }
    }
}

/// A run of text with an optional explicit color
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub text: String,
    pub color: Option<RgbColor>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Paragraph {
    pub runs: Vec<Run>,
}

impl Paragraph {
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

/// Text body of a placeholder or autoshape
#[derive(Debug, Clone, PartialEq)]
pub struct TextFrame {
    paragraphs: Vec<Paragraph>,
}

impl Default for TextFrame {
    fn default() -> Self {
        Self {
            paragraphs: vec![Paragraph::default()],
        }
    }
}

impl TextFrame {
    /// Replace all text. Each line becomes a paragraph; empty lines carry no run.
    pub fn set_text(&mut self, text: &str) {
        self.paragraphs = text
            .split('\n')
            .map(|line| Paragraph {
                runs: if line.is_empty() {
                    Vec::new()
                } else {
                    vec![Run {
                        text: line.to_string(),
                        color: None,
                    }]
                },
            })
            .collect();
    }

    /// Paragraph texts joined with `\n`
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(Paragraph::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    pub fn runs(&self) -> impl Iterator<Item = &Run> {
        self.paragraphs.iter().flat_map(|p| p.runs.iter())
    }

    pub fn set_color(&mut self, color: RgbColor) {
        for run in self.paragraphs.iter_mut().flat_map(|p| p.runs.iter_mut()) {
            run.color = Some(color);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderKind {
    CenteredTitle,
    Subtitle,
    Title,
    Body,
}

impl PlaceholderKind {
    fn ph_xml(self) -> &'static str {
        match self {
            PlaceholderKind::CenteredTitle => r#"<p:ph type="ctrTitle"/>"#,
            PlaceholderKind::Subtitle => r#"<p:ph type="subTitle" idx="1"/>"#,
            PlaceholderKind::Title => r#"<p:ph type="title"/>"#,
            PlaceholderKind::Body => r#"<p:ph idx="1"/>"#,
        }
    }

    fn base_name(self) -> &'static str {
        match self {
            PlaceholderKind::CenteredTitle | PlaceholderKind::Title => "Title",
            PlaceholderKind::Subtitle => "Subtitle",
            PlaceholderKind::Body => "Content Placeholder",
        }
    }
}

/// Layout-provided text region
#[derive(Debug, Clone, PartialEq)]
pub struct Placeholder {
    pub idx: u32,
    pub kind: PlaceholderKind,
    pub text: TextFrame,
}

/// Rectangle autoshape
#[derive(Debug, Clone, PartialEq)]
pub struct AutoShape {
    pub frame: Frame,
    pub fill: Option<RgbColor>,
    pub text: TextFrame,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Picture {
    pub frame: Frame,
    /// Index into the presentation's media list
    pub media: usize,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Rectangle(AutoShape),
    Picture(Picture),
}

impl Shape {
    pub fn as_rectangle(&self) -> Option<&AutoShape> {
        match self {
            Shape::Rectangle(shape) => Some(shape),
            Shape::Picture(_) => None,
        }
    }

    pub fn as_picture(&self) -> Option<&Picture> {
        match self {
            Shape::Picture(picture) => Some(picture),
            Shape::Rectangle(_) => None,
        }
    }
}

/// Embedded image part
#[derive(Debug, Clone)]
pub struct Media {
    pub data: Vec<u8>,
    pub extension: &'static str,
    pub content_type: &'static str,
}

#[derive(Debug, Clone)]
pub struct Slide {
    layout: SlideLayout,
    placeholders: Vec<Placeholder>,
    shapes: Vec<Shape>,
}

impl Slide {
    fn new(layout: SlideLayout) -> Self {
        let placeholders = match layout {
            SlideLayout::Title => vec![
                Placeholder {
                    idx: 0,
                    kind: PlaceholderKind::CenteredTitle,
                    text: TextFrame::default(),
                },
                Placeholder {
                    idx: 1,
                    kind: PlaceholderKind::Subtitle,
                    text: TextFrame::default(),
                },
            ],
            SlideLayout::TitleAndContent => vec![
                Placeholder {
                    idx: 0,
                    kind: PlaceholderKind::Title,
                    text: TextFrame::default(),
                },
                Placeholder {
                    idx: 1,
                    kind: PlaceholderKind::Body,
                    text: TextFrame::default(),
                },
            ],
        };
        Self {
            layout,
            placeholders,
            shapes: Vec::new(),
        }
    }

    pub fn layout(&self) -> SlideLayout {
        self.layout
    }

    pub fn placeholder(&self, idx: u32) -> Option<&Placeholder> {
        self.placeholders.iter().find(|p| p.idx == idx)
    }

    pub fn title(&self) -> Option<String> {
        self.placeholder(0).map(|p| p.text.text())
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    fn placeholder_mut(&mut self, idx: u32) -> Option<&mut Placeholder> {
        self.placeholders.iter_mut().find(|p| p.idx == idx)
    }

    fn pictures(&self) -> impl Iterator<Item = &Picture> {
        self.shapes.iter().filter_map(Shape::as_picture)
    }
}

/// In-memory presentation
#[derive(Debug)]
pub struct Presentation {
    config: PptxConfig,
    created: DateTime<Utc>,
    slides: Vec<Slide>,
    media: Vec<Media>,
}

impl Presentation {
    pub fn new(config: PptxConfig, created: DateTime<Utc>) -> Self {
        Self {
            config,
            created,
            slides: Vec::new(),
            media: Vec::new(),
        }
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn slide(&self, index: usize) -> Option<&Slide> {
        self.slides.get(index)
    }

    pub fn media(&self) -> &[Media] {
        &self.media
    }

    fn slide_mut(&mut self, slide: SlideId) -> Result<&mut Slide> {
        self.slides
            .get_mut(slide.0)
            .ok_or(DeckError::SlideNotFound(slide.0))
    }

    fn shape_mut(&mut self, shape: ShapeRef) -> Result<&mut Shape> {
        self.slide_mut(shape.slide)?
            .shapes
            .get_mut(shape.index)
            .ok_or(DeckError::ShapeNotFound {
                slide: shape.slide.0,
                shape: shape.index,
            })
    }

    fn autoshape_mut(&mut self, shape: ShapeRef) -> Result<&mut AutoShape> {
        match self.shape_mut(shape)? {
            Shape::Rectangle(autoshape) => Ok(autoshape),
            Shape::Picture(_) => Err(DeckError::NoTextFrame {
                slide: shape.slide.0,
                shape: shape.index,
            }),
        }
    }

    fn push_shape(&mut self, slide: SlideId, shape: Shape) -> Result<ShapeRef> {
        let target = self.slide_mut(slide)?;
        target.shapes.push(shape);
        Ok(ShapeRef {
            slide,
            index: target.shapes.len() - 1,
        })
    }

    /// Serialize the whole package into `writer`
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<W> {
        let mut zip = ZipWriter::new(writer);

        info!("Creating PPTX structure: [Content_Types].xml");
        write_part(&mut zip, "[Content_Types].xml", &self.content_types_xml()?)?;

        info!("Creating PPTX structure: _rels/.rels");
        write_part(&mut zip, "_rels/.rels", &root_rels_xml()?)?;

        info!("Creating PPTX structure: docProps");
        write_part(&mut zip, "docProps/app.xml", &self.app_xml())?;
        write_part(&mut zip, "docProps/core.xml", &self.core_xml())?;

        info!("Creating PPTX structure: ppt/presentation.xml");
        write_part(&mut zip, "ppt/presentation.xml", &self.presentation_xml()?)?;
        write_part(
            &mut zip,
            "ppt/_rels/presentation.xml.rels",
            &self.presentation_rels_xml()?,
        )?;
        write_part(&mut zip, "ppt/presProps.xml", PRES_PROPS_XML)?;
        write_part(&mut zip, "ppt/viewProps.xml", VIEW_PROPS_XML)?;
        write_part(&mut zip, "ppt/tableStyles.xml", TABLE_STYLES_XML)?;

        info!("Creating PPTX structure: slide master, layouts and theme");
        write_part(&mut zip, "ppt/slideMasters/slideMaster1.xml", SLIDE_MASTER_XML)?;
        write_part(
            &mut zip,
            "ppt/slideMasters/_rels/slideMaster1.xml.rels",
            SLIDE_MASTER_RELS_XML,
        )?;
        for layout in [SlideLayout::Title, SlideLayout::TitleAndContent] {
            let n = layout.number();
            let xml = match layout {
                SlideLayout::Title => TITLE_LAYOUT_XML,
                SlideLayout::TitleAndContent => CONTENT_LAYOUT_XML,
            };
            write_part(&mut zip, &format!("ppt/slideLayouts/slideLayout{}.xml", n), xml)?;
            write_part(
                &mut zip,
                &format!("ppt/slideLayouts/_rels/slideLayout{}.xml.rels", n),
                LAYOUT_RELS_XML,
            )?;
        }
        write_part(&mut zip, "ppt/theme/theme1.xml", THEME_XML)?;

        for (i, media) in self.media.iter().enumerate() {
            let name = media_file_name(i, media);
            info!("Adding image to PPTX: ppt/media/{}", name);
            zip.start_file(format!("ppt/media/{}", name), FileOptions::default())?;
            zip.write_all(&media.data)?;
        }

        for (i, slide) in self.slides.iter().enumerate() {
            let slide_num = i + 1;
            info!("Creating slide XML: ppt/slides/slide{}.xml", slide_num);
            write_part(
                &mut zip,
                &format!("ppt/slides/slide{}.xml", slide_num),
                &slide_xml(slide)?,
            )?;
            write_part(
                &mut zip,
                &format!("ppt/slides/_rels/slide{}.xml.rels", slide_num),
                &self.slide_rels_xml(slide)?,
            )?;
        }

        info!("Finalizing PPTX file");
        Ok(zip.finish()?)
    }

    /// Serialize the package into memory
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.write_to(Cursor::new(Vec::new()))?.into_inner())
    }

    /// Write the package to `path`. The file is only created once the archive is fully built.
    pub fn save(&self, path: &Path) -> Result<()> {
        let bytes = self.to_bytes()?;
        utils::ensure_parent_directory_exists(path)?;
        fs::write(path, bytes)?;
        info!("PPTX file created at {:?}", path);
        Ok(())
    }

    fn content_types_xml(&self) -> Result<String> {
        let mut xml = String::with_capacity(4096);
        xml.push_str(XML_HEADER);
        xml.push_str(
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
        );
        xml.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);
        xml.push_str(r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#);

        let image_types: BTreeSet<(&str, &str)> = self
            .media
            .iter()
            .map(|m| (m.extension, m.content_type))
            .collect();
        for (extension, content_type) in image_types {
            write!(
                xml,
                r#"<Default Extension="{}" ContentType="{}"/>"#,
                extension, content_type
            )?;
        }

        let overrides = [
            ("/ppt/presentation.xml", CT_PRESENTATION),
            ("/ppt/presProps.xml", CT_PRES_PROPS),
            ("/ppt/viewProps.xml", CT_VIEW_PROPS),
            ("/ppt/tableStyles.xml", CT_TABLE_STYLES),
            ("/ppt/slideMasters/slideMaster1.xml", CT_SLIDE_MASTER),
            ("/ppt/slideLayouts/slideLayout1.xml", CT_SLIDE_LAYOUT),
            ("/ppt/slideLayouts/slideLayout2.xml", CT_SLIDE_LAYOUT),
            ("/ppt/theme/theme1.xml", CT_THEME),
            ("/docProps/core.xml", CT_CORE_PROPS),
            ("/docProps/app.xml", CT_EXTENDED_PROPS),
        ];
        for (part, content_type) in overrides {
            write!(
                xml,
                r#"<Override PartName="{}" ContentType="{}"/>"#,
                part, content_type
            )?;
        }
        for i in 0..self.slides.len() {
            write!(
                xml,
                r#"<Override PartName="/ppt/slides/slide{}.xml" ContentType="{}"/>"#,
                i + 1,
                CT_SLIDE
            )?;
        }

        xml.push_str("</Types>");
        Ok(xml)
    }

    fn app_xml(&self) -> String {
        format!(
            r#"{}
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">
    <Application>{}</Application>
    <PresentationFormat>On-screen Show (4:3)</PresentationFormat>
    <Slides>{}</Slides>
</Properties>"#,
            XML_HEADER,
            escape_xml(&self.config.creator),
            self.slides.len()
        )
    }

    fn core_xml(&self) -> String {
        let created = self.created.format("%Y-%m-%dT%H:%M:%SZ");
        format!(
            r#"{}
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
    <dc:title>{}</dc:title>
    <dc:creator>{}</dc:creator>
    <cp:lastModifiedBy>{}</cp:lastModifiedBy>
    <cp:revision>1</cp:revision>
    <dcterms:created xsi:type="dcterms:W3CDTF">{}</dcterms:created>
    <dcterms:modified xsi:type="dcterms:W3CDTF">{}</dcterms:modified>
</cp:coreProperties>"#,
            XML_HEADER,
            escape_xml(&self.config.title),
            escape_xml(&self.config.creator),
            escape_xml(&self.config.creator),
            created,
            created
        )
    }

    fn presentation_xml(&self) -> Result<String> {
        let mut xml = String::with_capacity(2048);
        xml.push_str(XML_HEADER);
        write!(
            xml,
            r#"<p:presentation xmlns:a="{}" xmlns:r="{}" xmlns:p="{}" saveSubsetFonts="1">"#,
            NS_DRAWING, NS_REL, NS_MAIN
        )?;

        write!(
            xml,
            r#"<p:sldMasterIdLst><p:sldMasterId id="{}" r:id="rId1"/></p:sldMasterIdLst>"#,
            SLIDE_MASTER_ID
        )?;

        if !self.slides.is_empty() {
            xml.push_str("<p:sldIdLst>");
            for i in 0..self.slides.len() {
                write!(
                    xml,
                    r#"<p:sldId id="{}" r:id="rId{}"/>"#,
                    FIRST_SLIDE_ID as usize + i,
                    i + 2
                )?;
            }
            xml.push_str("</p:sldIdLst>");
        }

        write!(
            xml,
            r#"<p:sldSz cx="{}" cy="{}" type="screen4x3"/>"#,
            self.config.slide_width, self.config.slide_height
        )?;
        xml.push_str(r#"<p:notesSz cx="6858000" cy="9144000"/>"#);
        xml.push_str("</p:presentation>");
        Ok(xml)
    }

    fn presentation_rels_xml(&self) -> Result<String> {
        let mut rels = Relationships::new();
        rels.push(RT_SLIDE_MASTER, "slideMasters/slideMaster1.xml");
        for i in 0..self.slides.len() {
            rels.push(RT_SLIDE, &format!("slides/slide{}.xml", i + 1));
        }
        rels.push(RT_PRES_PROPS, "presProps.xml");
        rels.push(RT_VIEW_PROPS, "viewProps.xml");
        rels.push(RT_THEME, "theme/theme1.xml");
        rels.push(RT_TABLE_STYLES, "tableStyles.xml");
        rels.to_xml()
    }

    fn slide_rels_xml(&self, slide: &Slide) -> Result<String> {
        let mut rels = Relationships::new();
        rels.push(
            RT_SLIDE_LAYOUT,
            &format!("../slideLayouts/slideLayout{}.xml", slide.layout.number()),
        );
        for picture in slide.pictures() {
            let media = self
                .media
                .get(picture.media)
                .ok_or_else(|| DeckError::PptxError(format!("Missing media {}", picture.media)))?;
            rels.push(
                RT_IMAGE,
                &format!("../media/{}", media_file_name(picture.media, media)),
            );
        }
        rels.to_xml()
    }
}

/// Ordered relationship list; ids are assigned as `rId1`, `rId2`, ...
struct Relationships {
    entries: Vec<(&'static str, String)>,
}

impl Relationships {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn push(&mut self, rel_type: &'static str, target: &str) {
        self.entries.push((rel_type, target.to_string()));
    }

    fn to_xml(&self) -> Result<String> {
        let mut xml = String::with_capacity(256 + self.entries.len() * 160);
        xml.push_str(XML_HEADER);
        write!(xml, r#"<Relationships xmlns="{}">"#, NS_PACKAGE_REL)?;
        for (i, (rel_type, target)) in self.entries.iter().enumerate() {
            write!(
                xml,
                r#"<Relationship Id="rId{}" Type="{}" Target="{}"/>"#,
                i + 1,
                rel_type,
                escape_xml(target)
            )?;
        }
        xml.push_str("</Relationships>");
        Ok(xml)
    }
}

fn root_rels_xml() -> Result<String> {
    let mut rels = Relationships::new();
    rels.push(RT_OFFICE_DOCUMENT, "ppt/presentation.xml");
    rels.push(RT_CORE_PROPS, "docProps/core.xml");
    rels.push(RT_EXTENDED_PROPS, "docProps/app.xml");
    rels.to_xml()
}

fn write_part<W: Write + Seek>(zip: &mut ZipWriter<W>, name: &str, content: &str) -> Result<()> {
    zip.start_file(name, FileOptions::default())?;
    zip.write_all(content.as_bytes())?;
    Ok(())
}

fn media_file_name(index: usize, media: &Media) -> String {
    format!("image{}.{}", index + 1, media.extension)
}

fn slide_xml(slide: &Slide) -> Result<String> {
    let mut xml = String::with_capacity(4096);
    xml.push_str(XML_HEADER);
    write!(
        xml,
        r#"<p:sld xmlns:a="{}" xmlns:r="{}" xmlns:p="{}">"#,
        NS_DRAWING, NS_REL, NS_MAIN
    )?;
    xml.push_str("<p:cSld><p:spTree>");
    xml.push_str(r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#);
    xml.push_str(r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#);

    // Group shape is id 1
    let mut shape_id = 2;
    for placeholder in &slide.placeholders {
        write_placeholder(&mut xml, placeholder, shape_id)?;
        shape_id += 1;
    }

    // Image relationships follow the layout relationship (rId1)
    let mut image_rel = 2;
    for shape in &slide.shapes {
        match shape {
            Shape::Rectangle(autoshape) => write_rectangle(&mut xml, autoshape, shape_id)?,
            Shape::Picture(picture) => {
                write_picture(&mut xml, picture, shape_id, image_rel)?;
                image_rel += 1;
            }
        }
        shape_id += 1;
    }

    xml.push_str("</p:spTree></p:cSld>");
    xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>");
    xml.push_str("</p:sld>");
    Ok(xml)
}

fn write_placeholder(xml: &mut String, placeholder: &Placeholder, shape_id: u32) -> Result<()> {
    xml.push_str("<p:sp><p:nvSpPr>");
    write!(
        xml,
        r#"<p:cNvPr id="{}" name="{} {}"/>"#,
        shape_id,
        placeholder.kind.base_name(),
        shape_id - 1
    )?;
    xml.push_str(r#"<p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr>"#);
    write!(xml, "<p:nvPr>{}</p:nvPr>", placeholder.kind.ph_xml())?;
    xml.push_str("</p:nvSpPr><p:spPr/>");
    xml.push_str("<p:txBody><a:bodyPr/><a:lstStyle/>");
    write_paragraphs(xml, &placeholder.text, None)?;
    xml.push_str("</p:txBody></p:sp>");
    Ok(())
}

fn write_rectangle(xml: &mut String, shape: &AutoShape, shape_id: u32) -> Result<()> {
    xml.push_str("<p:sp><p:nvSpPr>");
    write!(
        xml,
        r#"<p:cNvPr id="{}" name="Rectangle {}"/>"#,
        shape_id,
        shape_id - 1
    )?;
    xml.push_str("<p:cNvSpPr/><p:nvPr/></p:nvSpPr>");

    xml.push_str("<p:spPr>");
    write_xfrm(xml, &shape.frame)?;
    xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom>"#);
    if let Some(fill) = shape.fill {
        write!(
            xml,
            r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#,
            fill.hex()
        )?;
    }
    xml.push_str("</p:spPr>");

    xml.push_str(concat!(
        "<p:style>",
        r#"<a:lnRef idx="1"><a:schemeClr val="accent1"/></a:lnRef>"#,
        r#"<a:fillRef idx="3"><a:schemeClr val="accent1"/></a:fillRef>"#,
        r#"<a:effectRef idx="2"><a:schemeClr val="accent1"/></a:effectRef>"#,
        r#"<a:fontRef idx="minor"><a:schemeClr val="lt1"/></a:fontRef>"#,
        "</p:style>"
    ));

    xml.push_str(r#"<p:txBody><a:bodyPr rtlCol="0" anchor="ctr"/><a:lstStyle/>"#);
    write_paragraphs(xml, &shape.text, Some("ctr"))?;
    xml.push_str("</p:txBody></p:sp>");
    Ok(())
}

fn write_picture(xml: &mut String, picture: &Picture, shape_id: u32, rel_id: usize) -> Result<()> {
    xml.push_str("<p:pic><p:nvPicPr>");
    write!(
        xml,
        r#"<p:cNvPr id="{}" name="Picture {}" descr="{}"/>"#,
        shape_id,
        shape_id - 1,
        escape_xml(&picture.description)
    )?;
    xml.push_str(r#"<p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/>"#);
    xml.push_str("</p:nvPicPr>");

    xml.push_str("<p:blipFill>");
    write!(xml, r#"<a:blip r:embed="rId{}"/>"#, rel_id)?;
    xml.push_str("<a:stretch><a:fillRect/></a:stretch></p:blipFill>");

    xml.push_str("<p:spPr>");
    write_xfrm(xml, &picture.frame)?;
    xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom>"#);
    xml.push_str("</p:spPr></p:pic>");
    Ok(())
}

fn write_xfrm(xml: &mut String, frame: &Frame) -> Result<()> {
    write!(
        xml,
        r#"<a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm>"#,
        frame.left, frame.top, frame.width, frame.height
    )?;
    Ok(())
}

fn write_paragraphs(xml: &mut String, text: &TextFrame, align: Option<&str>) -> Result<()> {
    for paragraph in text.paragraphs() {
        xml.push_str("<a:p>");
        if let Some(align) = align {
            write!(xml, r#"<a:pPr algn="{}"/>"#, align)?;
        }
        for run in &paragraph.runs {
            xml.push_str("<a:r>");
            match run.color {
                Some(color) => write!(
                    xml,
                    r#"<a:rPr lang="en-US" dirty="0"><a:solidFill><a:srgbClr val="{}"/></a:solidFill></a:rPr>"#,
                    color.hex()
                )?,
                None => xml.push_str(r#"<a:rPr lang="en-US" dirty="0"/>"#),
            }
            write!(xml, "<a:t>{}</a:t>", escape_xml(&run.text))?;
            xml.push_str("</a:r>");
        }
        xml.push_str("</a:p>");
    }
    Ok(())
}

/// Read an image file and identify its format from its content
pub fn load_media(path: &Path) -> Result<Media> {
    let data = fs::read(path).map_err(|source| DeckError::ImageReadError {
        path: path.to_path_buf(),
        source,
    })?;

    let reader = ImageReader::new(Cursor::new(&data))
        .with_guessed_format()
        .map_err(|source| DeckError::ImageReadError {
            path: path.to_path_buf(),
            source,
        })?;

    let (extension, content_type) = match reader.format() {
        Some(ImageFormat::Png) => ("png", "image/png"),
        Some(ImageFormat::Jpeg) => ("jpeg", "image/jpeg"),
        Some(ImageFormat::Gif) => ("gif", "image/gif"),
        Some(ImageFormat::Bmp) => ("bmp", "image/bmp"),
        Some(ImageFormat::Tiff) => ("tiff", "image/tiff"),
        _ => return Err(DeckError::UnsupportedImage(path.to_path_buf())),
    };

    let (width, height) = reader
        .into_dimensions()
        .map_err(|source| DeckError::ImageDecodeError {
            path: path.to_path_buf(),
            source,
        })?;
    debug!("Loaded {:?}: {}x{} {}", path, width, height, extension);

    Ok(Media {
        data,
        extension,
        content_type,
    })
}

/// [`Renderer`] that builds a `.pptx` package
#[derive(Debug)]
pub struct PptxRenderer {
    presentation: Presentation,
}

impl PptxRenderer {
    pub fn new(config: PptxConfig, created: DateTime<Local>) -> Self {
        Self {
            presentation: Presentation::new(config, created.with_timezone(&Utc)),
        }
    }

    pub fn presentation(&self) -> &Presentation {
        &self.presentation
    }
}

impl Renderer for PptxRenderer {
    fn add_slide(&mut self, layout: SlideLayout) -> Result<SlideId> {
        let slides = &mut self.presentation.slides;
        slides.push(Slide::new(layout));
        debug!("Added slide {} ({})", slides.len(), layout.name());
        Ok(SlideId(slides.len() - 1))
    }

    fn set_title(&mut self, slide: SlideId, text: &str) -> Result<()> {
        self.set_placeholder_text(slide, 0, text)
    }

    fn set_placeholder_text(&mut self, slide: SlideId, idx: u32, text: &str) -> Result<()> {
        let placeholder = self
            .presentation
            .slide_mut(slide)?
            .placeholder_mut(idx)
            .ok_or(DeckError::PlaceholderNotFound {
                slide: slide.0,
                idx,
            })?;
        placeholder.text.set_text(text);
        Ok(())
    }

    fn add_rectangle(&mut self, slide: SlideId, frame: Frame) -> Result<ShapeRef> {
        self.presentation.push_shape(
            slide,
            Shape::Rectangle(AutoShape {
                frame,
                fill: None,
                text: TextFrame::default(),
            }),
        )
    }

    fn fill_solid(&mut self, shape: ShapeRef, color: RgbColor) -> Result<()> {
        self.presentation.autoshape_mut(shape)?.fill = Some(color);
        Ok(())
    }

    fn set_shape_text(&mut self, shape: ShapeRef, text: &str) -> Result<()> {
        self.presentation.autoshape_mut(shape)?.text.set_text(text);
        Ok(())
    }

    fn color_text(&mut self, shape: ShapeRef, color: RgbColor) -> Result<()> {
        self.presentation.autoshape_mut(shape)?.text.set_color(color);
        Ok(())
    }

    fn add_picture(&mut self, slide: SlideId, path: &Path, frame: Frame) -> Result<ShapeRef> {
        self.presentation.slide_mut(slide)?;
        let media = load_media(path)?;
        self.presentation.media.push(media);

        let description = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let picture = Picture {
            frame,
            media: self.presentation.media.len() - 1,
            description,
        };
        self.presentation.push_shape(slide, Shape::Picture(picture))
    }

    fn save(&mut self, path: &Path) -> Result<()> {
        self.presentation.save(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn renderer() -> PptxRenderer {
        let created = Local.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        PptxRenderer::new(PptxConfig::default(), created)
    }

    #[test]
    fn test_text_frame_lines() {
        let mut frame = TextFrame::default();
        assert_eq!(frame.text(), "");
        assert_eq!(frame.paragraphs().len(), 1);

        frame.set_text("- Installing the library\n");
        assert_eq!(frame.paragraphs().len(), 2);
        assert!(frame.paragraphs()[1].runs.is_empty());
        assert_eq!(frame.text(), "- Installing the library\n");

        frame.set_text("a\n\nb");
        assert_eq!(frame.runs().count(), 2);
        assert_eq!(frame.text(), "a\n\nb");
    }

    #[test]
    fn test_set_color_touches_every_run() {
        let mut frame = TextFrame::default();
        frame.set_text("one\ntwo\nthree");
        frame.set_color(RgbColor(1, 2, 3));
        assert!(frame.runs().all(|r| r.color == Some(RgbColor(1, 2, 3))));
    }

    #[test]
    fn test_placeholders_by_layout() {
        let mut r = renderer();
        let title = r.add_slide(SlideLayout::Title).unwrap();
        let content = r.add_slide(SlideLayout::TitleAndContent).unwrap();
        r.set_title(title, "Deck").unwrap();
        r.set_placeholder_text(content, 1, "- a\n- b").unwrap();

        let pres = r.presentation();
        let title_slide = pres.slide(0).unwrap();
        let content_slide = pres.slide(1).unwrap();
        assert_eq!(
            title_slide.placeholder(0).unwrap().kind,
            PlaceholderKind::CenteredTitle
        );
        assert_eq!(
            title_slide.placeholder(1).unwrap().kind,
            PlaceholderKind::Subtitle
        );
        assert_eq!(title_slide.title().as_deref(), Some("Deck"));
        assert_eq!(
            content_slide.placeholder(1).unwrap().kind,
            PlaceholderKind::Body
        );
        assert_eq!(content_slide.placeholder(1).unwrap().text.text(), "- a\n- b");
    }

    #[test]
    fn test_invalid_handles_are_errors() {
        let mut r = renderer();
        assert!(matches!(
            r.set_title(SlideId(3), "x"),
            Err(DeckError::SlideNotFound(3))
        ));
        let slide = r.add_slide(SlideLayout::TitleAndContent).unwrap();
        assert!(matches!(
            r.set_placeholder_text(slide, 7, "x"),
            Err(DeckError::PlaceholderNotFound { idx: 7, .. })
        ));
        let missing = ShapeRef { slide, index: 0 };
        assert!(matches!(
            r.fill_solid(missing, RgbColor::BLACK),
            Err(DeckError::ShapeNotFound { .. })
        ));
    }

    #[test]
    fn test_missing_image_is_an_error() {
        let mut r = renderer();
        let slide = r.add_slide(SlideLayout::TitleAndContent).unwrap();
        let result = r.add_picture(
            slide,
            Path::new("does/not/exist.png"),
            Frame::from_inches(1.0, 1.0, 1.0, 1.0),
        );
        assert!(matches!(result, Err(DeckError::ImageReadError { .. })));
        assert!(r.presentation().slide(0).unwrap().shapes().is_empty());
        assert!(r.presentation().media().is_empty());
    }

    #[test]
    fn test_unrecognised_image_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("notes.png");
        fs::write(&path, "definitely not an image").unwrap();
        assert!(matches!(
            load_media(&path),
            Err(DeckError::UnsupportedImage(_))
        ));
    }

    #[test]
    fn test_slide_xml_shapes() {
        let mut r = renderer();
        let slide = r.add_slide(SlideLayout::TitleAndContent).unwrap();
        r.set_title(slide, "Steps & <more>").unwrap();
        let rect = r
            .add_rectangle(slide, Frame::from_inches(1.0, 2.0, 4.0, 0.5))
            .unwrap();
        r.fill_solid(rect, RgbColor(221, 235, 247)).unwrap();
        r.set_shape_text(rect, "1. Navigate").unwrap();
        r.color_text(rect, RgbColor::BLACK).unwrap();

        let xml = slide_xml(r.presentation().slide(0).unwrap()).unwrap();
        assert!(xml.contains(r#"<p:ph type="title"/>"#));
        assert!(xml.contains("<a:t>Steps &amp; &lt;more&gt;</a:t>"));
        assert!(xml.contains(r#"<p:cNvPr id="4" name="Rectangle 3"/>"#));
        let geometry = r#"<a:off x="914400" y="1828800"/><a:ext cx="3657600" cy="457200"/>"#;
        let fill = r#"<a:solidFill><a:srgbClr val="DDEBF7"/></a:solidFill></p:spPr>"#;
        let caption = r#"<a:srgbClr val="000000"/></a:solidFill></a:rPr><a:t>1. Navigate</a:t>"#;
        assert!(xml.contains(geometry));
        assert!(xml.contains(fill));
        assert!(xml.contains(caption));
    }

    #[test]
    fn test_presentation_xml_lists_slides() {
        let mut r = renderer();
        r.add_slide(SlideLayout::Title).unwrap();
        r.add_slide(SlideLayout::TitleAndContent).unwrap();
        let pres = r.presentation();

        let xml = pres.presentation_xml().unwrap();
        let slide_ids = r#"<p:sldId id="256" r:id="rId2"/><p:sldId id="257" r:id="rId3"/>"#;
        assert!(xml.contains(slide_ids));
        assert!(xml.contains(r#"<p:sldSz cx="9144000" cy="6858000" type="screen4x3"/>"#));

        let rels = pres.presentation_rels_xml().unwrap();
        let master = format!(r#"Id="rId1" Type="{}""#, RT_SLIDE_MASTER);
        let second_slide = format!(r#"Id="rId3" Type="{}" Target="slides/slide2.xml""#, RT_SLIDE);
        assert!(rels.contains(&master));
        assert!(rels.contains(&second_slide));

        let slide_rels = pres.slide_rels_xml(pres.slide(0).unwrap()).unwrap();
        assert!(slide_rels.contains("../slideLayouts/slideLayout1.xml"));
    }

    #[test]
    fn test_core_properties_use_creation_time() {
        let r = renderer();
        let core = r.presentation().core_xml();
        let expected = Local
            .with_ymd_and_hms(2024, 1, 15, 12, 0, 0)
            .unwrap()
            .with_timezone(&Utc)
            .format("%Y-%m-%dT%H:%M:%SZ")
            .to_string();
        assert!(core.contains(&format!(">{}</dcterms:created>", expected)));
        assert!(core.contains("<dc:title>Presentation</dc:title>"));
    }
}
