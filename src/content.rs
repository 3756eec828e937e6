// ABOUTME: Literal content of the Odoo database upgrade deck
// ABOUTME: Every slide, caption, color and coordinate of the generated presentation lives here

use crate::model::{Frame, ImageSpec, RgbColor, ShapeSpec, SlideSpec};

/// Light blue used behind every step caption
pub const STEP_FILL: RgbColor = RgbColor(221, 235, 247);

/// Caption text color
pub const STEP_TEXT: RgbColor = RgbColor::BLACK;

pub const EXPORT_DIAGRAM: &str = "images/export_database_diagram.png";
pub const UPLOAD_DIAGRAM: &str = "images/upload_database_diagram.png";
pub const TESTING_DIAGRAM: &str = "images/testing_diagram.png";
pub const MIGRATION_DIAGRAM: &str = "images/migration_diagram.png";

fn step(left: f64, top: f64, width: f64, height: f64, text: &str) -> ShapeSpec {
    ShapeSpec::new(Frame::from_inches(left, top, width, height), text)
        .fill(STEP_FILL)
        .text_color(STEP_TEXT)
}

/// Five stacked steps on the left half of the slide
fn step_column(captions: [&str; 5]) -> Vec<ShapeSpec> {
    const TOPS: [f64; 5] = [2.0, 2.7, 3.4, 4.1, 4.8];
    TOPS.iter()
        .zip(captions)
        .map(|(top, text)| step(1.0, *top, 4.0, 0.5, text))
        .collect()
}

fn diagram(path: &str, left: f64) -> ImageSpec {
    ImageSpec::new(path, Frame::from_inches(left, 3.0, 4.0, 2.0))
}

/// The nine slides of the upgrade deck, in presentation order.
pub fn upgrade_deck() -> Vec<SlideSpec> {
    let mut overview = SlideSpec::content("Python-pptx Overview");
    overview.shapes = vec![
        step(3.0, 2.0, 4.0, 0.7, "- Installing the library\n"),
        step(3.0, 3.0, 4.0, 0.7, "- Basic syntax and usage\n"),
        step(
            3.0,
            4.0,
            4.0,
            0.8,
            "- Creating a PowerPoint presentation with Python",
        ),
    ];

    let mut exporting = SlideSpec::content("Exporting the Odoo Database");
    exporting.shapes = step_column([
        "1. Navigate to the Odoo Database Manager",
        "2. Select the database to upgrade",
        "3. Click on the 'Backup' button",
        "4. Choose 'zip' as the backup format",
        "5. Download the backup file",
    ]);
    exporting = exporting.image(diagram(EXPORT_DIAGRAM, 5.0));

    let mut uploading = SlideSpec::content("Uploading the Database to the Odoo Upgrade Platform");
    uploading.shapes = step_column([
        "1. Visit the Odoo Upgrade Platform (https://upgrade.odoo.com)\n",
        "2. Log in with your Odoo account\n",
        "3. Choose the target Odoo version\n",
        "4. Upload the previously exported database backup file\n",
        "5. Wait for the upgrade process to complete",
    ]);
    uploading = uploading.image(diagram(UPLOAD_DIAGRAM, 5.0));

    vec![
        SlideSpec::title(
            "Upgrade Process for Odoo Database",
            "Using the Python-pptx Library",
        ),
        SlideSpec::content("Introduction").body(
            "- What is Odoo?\n\
             - Why upgrade the Odoo database?\n\
             - What is Python-pptx?",
        ),
        SlideSpec::content("Prerequisites").body(
            "- Python and Odoo installation\n\
             - Python-pptx library\n\
             - Backup your Odoo database\n\
             - Latest Odoo version",
        ),
        overview,
        SlideSpec::content("Odoo Database Upgrade Process Overview").body(
            "- Exporting the Odoo database\n\
             - Uploading the database to the Odoo Upgrade Platform\n\
             - Testing the upgraded database\n\
             - Migrating the database to the production environment",
        ),
        exporting,
        uploading,
        SlideSpec::content("Testing the Upgraded Database")
            .body(
                "1. Download the upgraded database from the Odoo Upgrade Platform\n\
                 2. Restore the upgraded database in a test environment\n\
                 3. Test all critical business processes and custom modules\n\
                 4. Report any issues found during testing\n\
                 5. Repeat the process until all issues are resolved",
            )
            .image(diagram(TESTING_DIAGRAM, 1.0)),
        SlideSpec::content("Migrating the Database to the Production Environment")
            .body(
                "1. Schedule downtime for the migration\n\
                 2. Backup the current production database\n\
                 3. Restore the upgraded and tested database in the production environment\n\
                 4. Update the Odoo configuration file\n\
                 5. Restart the Odoo server\n\
                 6. Verify functionality and perform sanity checks",
            )
            .image(diagram(MIGRATION_DIAGRAM, 1.0)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Emu, SlideLayout};

    #[test]
    fn test_deck_has_nine_slides_in_order() {
        let deck = upgrade_deck();
        let titles: Vec<&str> = deck.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Upgrade Process for Odoo Database",
                "Introduction",
                "Prerequisites",
                "Python-pptx Overview",
                "Odoo Database Upgrade Process Overview",
                "Exporting the Odoo Database",
                "Uploading the Database to the Odoo Upgrade Platform",
                "Testing the Upgraded Database",
                "Migrating the Database to the Production Environment",
            ]
        );
        assert_eq!(deck[0].layout, SlideLayout::Title);
        assert!(deck[1..]
            .iter()
            .all(|s| s.layout == SlideLayout::TitleAndContent));
    }

    #[test]
    fn test_multiline_literals_keep_line_breaks() {
        let deck = upgrade_deck();
        assert_eq!(
            deck[1].body.as_deref(),
            Some("- What is Odoo?\n- Why upgrade the Odoo database?\n- What is Python-pptx?")
        );
        assert_eq!(
            deck[2].body.as_deref(),
            Some("- Python and Odoo installation\n- Python-pptx library\n- Backup your Odoo database\n- Latest Odoo version")
        );
        assert_eq!(deck[8].body.as_deref().map(|b| b.lines().count()), Some(6));
    }

    #[test]
    fn test_step_shapes() {
        let deck = upgrade_deck();
        assert_eq!(deck[3].shapes.len(), 3);
        assert_eq!(deck[3].shapes[0].text, "- Installing the library\n");
        assert_eq!(deck[3].shapes[2].frame.height, Emu::inches(0.8));

        let exporting = &deck[5];
        assert_eq!(exporting.shapes.len(), 5);
        assert_eq!(exporting.shapes[3].frame.top, Emu::inches(4.1));
        assert_eq!(exporting.shapes[4].text, "5. Download the backup file");
        assert!(exporting
            .shapes
            .iter()
            .all(|s| s.fill_color == Some(STEP_FILL) && s.text_color == Some(STEP_TEXT)));

        assert_eq!(
            deck[6].shapes[0].text,
            "1. Visit the Odoo Upgrade Platform (https://upgrade.odoo.com)\n"
        );
    }

    #[test]
    fn test_images_in_slide_order() {
        let paths: Vec<String> = upgrade_deck()
            .iter()
            .flat_map(|s| s.images.iter())
            .map(|i| i.path.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            paths,
            vec![
                EXPORT_DIAGRAM,
                UPLOAD_DIAGRAM,
                TESTING_DIAGRAM,
                MIGRATION_DIAGRAM
            ]
        );
    }
}
