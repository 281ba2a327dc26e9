//! Font configuration for text drawing.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

/// Which fonts a context can draw text with.
#[derive(Clone, Debug)]
pub struct FontConfig {
    /// Font files supplied as bytes.
    pub custom_fonts: Vec<CustomFont>,
    /// Concrete families tried, in order, for each generic CSS family.
    pub generic_families: GenericFamilyMap,
    /// Whether to scan the system font directories (default: true).
    pub load_system_fonts: bool,
    /// Additional directories to scan for font files.
    pub font_dirs: Vec<PathBuf>,
    /// Snap glyph outlines to the pixel grid (default: false).
    pub hinting_enabled: bool,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            custom_fonts: Vec::new(),
            generic_families: GenericFamilyMap::defaults(),
            load_system_fonts: true,
            font_dirs: Vec::new(),
            hinting_enabled: false,
        }
    }
}

/// Raw font file data. Arc-wrapped so configs clone cheaply.
#[derive(Clone, Debug)]
pub struct CustomFont {
    pub data: Arc<Vec<u8>>,
}

impl CustomFont {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data: Arc::new(data),
        }
    }
}

/// Preference lists for the generic CSS families.
#[derive(Clone, Debug, Default)]
pub struct GenericFamilyMap {
    pub serif: Vec<String>,
    pub sans_serif: Vec<String>,
    pub monospace: Vec<String>,
    pub cursive: Vec<String>,
    pub fantasy: Vec<String>,
}

impl GenericFamilyMap {
    /// Common desktop fonts first, then the Liberation/DejaVu families found on most Linux systems.
    pub fn defaults() -> Self {
        Self {
            sans_serif: vec![
                "Arial".into(),
                "Helvetica".into(),
                "Liberation Sans".into(),
                "DejaVu Sans".into(),
            ],
            monospace: vec![
                "Courier New".into(),
                "Courier".into(),
                "Liberation Mono".into(),
                "DejaVu Sans Mono".into(),
            ],
            serif: vec![
                "Times New Roman".into(),
                "Times".into(),
                "Liberation Serif".into(),
                "DejaVu Serif".into(),
            ],
            cursive: vec!["Comic Sans MS".into(), "Apple Chancery".into()],
            fantasy: vec!["Impact".into(), "Papyrus".into()],
        }
    }
}

impl FontConfig {
    /// Build a font database from this configuration.
    ///
    /// Scanning system fonts is slow; build once and hand the database to
    /// [`Canvas2dContextBuilder::font_db`](crate::Canvas2dContextBuilder::font_db)
    /// when creating many contexts.
    pub fn to_fontdb(&self) -> fontdb::Database {
        let mut db = fontdb::Database::new();
        if self.load_system_fonts {
            db.load_system_fonts();
        }
        for dir in &self.font_dirs {
            db.load_fonts_dir(dir);
        }
        for font in &self.custom_fonts {
            db.load_font_data(font.data.as_ref().clone());
        }
        apply_generic_families(&mut db, &self.generic_families);
        log::debug!(target: "canvas", "font database loaded with {} faces", db.len());
        db
    }
}

/// Point each generic family at the first preferred family present in `db`.
fn apply_generic_families(db: &mut fontdb::Database, families: &GenericFamilyMap) {
    let available: HashSet<String> = db
        .faces()
        .flat_map(|face| face.families.iter().map(|(name, _)| name.clone()))
        .collect();
    let pick = |list: &[String]| list.iter().find(|f| available.contains(*f)).cloned();

    if let Some(family) = pick(&families.sans_serif) {
        db.set_sans_serif_family(family);
    }
    if let Some(family) = pick(&families.serif) {
        db.set_serif_family(family);
    }
    if let Some(family) = pick(&families.monospace) {
        db.set_monospace_family(family);
    }
    if let Some(family) = pick(&families.cursive) {
        db.set_cursive_family(family);
    }
    if let Some(family) = pick(&families.fantasy) {
        db.set_fantasy_family(family);
    }
}
