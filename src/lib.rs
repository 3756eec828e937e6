// ABOUTME: Library module for the odoo-upgrade-deck program.
// ABOUTME: Contains the slide model, deck content, deck builder and PPTX backend.

// Reexport modules
pub mod builder;
pub mod clock;
pub mod config;
pub mod content;
pub mod errors;
pub mod model;
pub mod pptx;
pub mod templates;
pub mod utils;

// Reexport common types and functions
pub use builder::{generate_deck, render_deck, DeckBuilder, Renderer, ShapeRef, SlideId};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::DeckConfig;
pub use content::upgrade_deck;
pub use errors::{DeckError, Result};
pub use model::{Emu, Frame, ImageSpec, RgbColor, ShapeSpec, SlideLayout, SlideSpec};
pub use pptx::{Presentation, PptxConfig, PptxRenderer};
