use image::{ImageBuffer, Rgb};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;
use zip::ZipArchive;

const IMAGES: [&str; 4] = [
    "images/export_database_diagram.png",
    "images/upload_database_diagram.png",
    "images/testing_diagram.png",
    "images/migration_diagram.png",
];

fn run_command(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_odoo-upgrade-deck"))
        .args(args)
        .current_dir(dir)
        .env("RUST_LOG", "warn")
        .output()
        .expect("Failed to execute command")
}

fn create_images(dir: &Path) {
    fs::create_dir_all(dir.join("images")).expect("Failed to create images directory");
    for (i, image) in IMAGES.iter().enumerate() {
        let shade = 60 * i as u8;
        let img = ImageBuffer::from_fn(64, 32, |_, _| Rgb([shade, 128u8, 255u8 - shade]));
        img.save(dir.join(image)).expect("Failed to save image");
    }
}

fn generated_decks(dir: &Path) -> Vec<PathBuf> {
    let pattern = format!(
        "{}/Odoo_Database_Upgrade_Process_*.pptx",
        dir.to_string_lossy()
    );
    glob::glob(&pattern)
        .expect("Failed to read glob pattern")
        .filter_map(Result::ok)
        .collect()
}

fn read_entry(archive: &mut ZipArchive<fs::File>, name: &str) -> String {
    let mut entry = archive.by_name(name).expect("Missing archive entry");
    let mut content = String::new();
    entry.read_to_string(&mut content).unwrap();
    content
}

/// Text of every shape on a slide, paragraphs joined with newlines
fn shape_texts(xml: &str) -> Vec<String> {
    let mut reader = Reader::from_str(xml);
    let mut shapes = Vec::new();
    let mut current: Option<String> = None;
    let mut first_paragraph = true;
    let mut in_text = false;

    loop {
        match reader.read_event().expect("Invalid slide XML") {
            Event::Start(e) => match e.name().as_ref() {
                b"p:sp" | b"p:pic" => {
                    current = Some(String::new());
                    first_paragraph = true;
                }
                b"a:p" => {
                    if let Some(text) = current.as_mut() {
                        if !first_paragraph {
                            text.push('\n');
                        }
                    }
                    first_paragraph = false;
                }
                b"a:t" => in_text = true,
                _ => {}
            },
            Event::Text(t) if in_text => {
                if let Some(text) = current.as_mut() {
                    text.push_str(&t.unescape().unwrap());
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"a:t" => in_text = false,
                b"p:sp" | b"p:pic" => {
                    if let Some(text) = current.take() {
                        shapes.push(text);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }
    shapes
}

#[test]
fn test_generate_deck_command() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    create_images(temp_dir.path());

    let output = run_command(temp_dir.path(), &[]);
    assert!(output.status.success(), "Command failed: {:?}", output);

    let decks = generated_decks(temp_dir.path());
    assert_eq!(decks.len(), 1, "Expected exactly one generated deck");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Odoo_Database_Upgrade_Process_"));

    let file = fs::File::open(&decks[0]).expect("Failed to open PPTX file");
    let mut archive = ZipArchive::new(file).expect("Failed to read PPTX as ZIP");
    let names: Vec<String> = archive.file_names().map(str::to_string).collect();

    let slide_count = names
        .iter()
        .filter(|n| n.starts_with("ppt/slides/slide") && n.ends_with(".xml"))
        .count();
    assert_eq!(slide_count, 9, "Expected nine slide XML files");
    let media_count = names.iter().filter(|n| n.starts_with("ppt/media/")).count();
    assert_eq!(media_count, 4, "Expected four embedded images");

    let title = shape_texts(&read_entry(&mut archive, "ppt/slides/slide1.xml"));
    assert_eq!(title[0], "Upgrade Process for Odoo Database");
    assert_eq!(title[1], "Using the Python-pptx Library");

    let intro = shape_texts(&read_entry(&mut archive, "ppt/slides/slide2.xml"));
    assert_eq!(intro[0], "Introduction");
    assert_eq!(
        intro[1],
        "- What is Odoo?\n- Why upgrade the Odoo database?\n- What is Python-pptx?"
    );

    let overview = shape_texts(&read_entry(&mut archive, "ppt/slides/slide4.xml"));
    assert_eq!(overview[0], "Python-pptx Overview");
    assert_eq!(overview[1], "", "Body placeholder should stay empty");
    assert_eq!(overview[2], "- Installing the library\n");
    assert_eq!(overview[4], "- Creating a PowerPoint presentation with Python");

    let presentation = read_entry(&mut archive, "ppt/presentation.xml");
    assert_eq!(presentation.matches("<p:sldId ").count(), 9);
}

#[test]
fn test_relationship_targets_resolve() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    create_images(temp_dir.path());

    let output = run_command(temp_dir.path(), &[]);
    assert!(output.status.success(), "Command failed: {:?}", output);

    let decks = generated_decks(temp_dir.path());
    let file = fs::File::open(&decks[0]).expect("Failed to open PPTX file");
    let mut archive = ZipArchive::new(file).expect("Failed to read PPTX as ZIP");
    let names: Vec<String> = archive.file_names().map(str::to_string).collect();

    for i in 1..=9 {
        let rels = read_entry(&mut archive, &format!("ppt/slides/_rels/slide{}.xml.rels", i));
        for target in rels.split("Target=\"").skip(1) {
            let target = &target[..target.find('"').unwrap()];
            let resolved = format!("ppt/{}", target.trim_start_matches("../"));
            assert!(
                names.contains(&resolved),
                "slide{} points at missing part {}",
                i,
                resolved
            );
        }
    }
}

#[test]
fn test_missing_images_abort_without_output() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    let output = run_command(temp_dir.path(), &[]);
    assert!(!output.status.success(), "Command should fail without images");
    assert_eq!(output.status.code(), Some(1));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error:"), "Missing diagnostic: {}", stderr);
    assert!(stderr.contains("export_database_diagram.png"));

    assert!(generated_decks(temp_dir.path()).is_empty());
}

#[test]
fn test_help_flag() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let output = run_command(temp_dir.path(), &["--help"]);
    assert!(output.status.success());
    assert!(generated_decks(temp_dir.path()).is_empty());
}
