//! Font discovery and family resolution.
//!
//! Families are matched against the `name` table of font files found on disk, with the bundled
//! DejaVu Sans Bold face standing in for every generic family and for names that are not
//! installed.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use ab_glyph::FontArc;
use log::{debug, warn};
use walkdir::WalkDir;

use crate::PixelError;

const FALLBACK_FONT: &[u8] = include_bytes!("../../assets/DejaVuSans-Bold.ttf");
const FALLBACK_FAMILY: &str = "DejaVu Sans";

const GENERIC_FAMILIES: &[&str] =
    &["sans-serif", "serif", "monospace", "cursive", "fantasy", "system-ui", "ui-sans-serif"];

const FONT_EXTENSIONS: &[&str] = &["ttf", "otf", "ttc"];

#[derive(Clone, Debug)]
struct FaceEntry {
    family: String,
    path: PathBuf,
    index: u32,
    weight: u16,
    italic: bool,
    /// Parsed face, shared between clones of the catalog.
    loaded: Arc<OnceLock<FontArc>>,
}

impl FaceEntry {
    /// The face, read from disk on first use only.
    fn load(&self) -> Result<FontArc, FontFileError> {
        if let Some(font) = self.loaded.get() {
            return Ok(font.clone());
        }
        let font = load_face(&self.path, self.index)?;
        Ok(self.loaded.get_or_init(|| font).clone())
    }

    #[cfg(test)]
    fn is_loaded(&self) -> bool {
        self.loaded.get().is_some()
    }
}

/// Set of font faces a render may draw with.
#[derive(Clone, Default)]
pub struct FontCatalog {
    faces: Vec<FaceEntry>,
    fallback: Option<FontArc>,
}

impl fmt::Debug for FontCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontCatalog")
            .field("faces", &self.faces)
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}

impl FontCatalog {
    /// Catalog without any face; every render fails with [`PixelError::RenderUnavailable`].
    pub fn empty() -> Self {
        Self::default()
    }

    /// Only the bundled sans-serif face.
    pub fn embedded() -> Self {
        let fallback = match FontArc::try_from_slice(FALLBACK_FONT) {
            Ok(font) => Some(font),
            Err(err) => {
                warn!("bundled fallback font is unreadable: {err}");
                None
            },
        };
        Self { faces: Vec::new(), fallback }
    }

    /// Bundled face plus everything found under `dirs`.
    pub fn scan<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut catalog = Self::embedded();
        for dir in dirs {
            catalog.add_dir(dir.as_ref());
        }
        catalog
    }

    /// Bundled face plus the platform font directories.
    pub fn system() -> Self {
        Self::scan(system_font_dirs())
    }

    pub fn add_dir(&mut self, dir: &Path) {
        if !dir.is_dir() {
            debug!("skipping missing font directory {}", dir.display());
            return;
        }

        let before = self.faces.len();
        let files = WalkDir::new(dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| has_font_extension(entry.path()));

        for entry in files {
            if let Err(err) = self.add_file(entry.path()) {
                warn!("skipping font {}: {err}", entry.path().display());
            }
        }

        debug!("found {} font faces in {}", self.faces.len() - before, dir.display());
    }

    /// Register every face of a font file.
    pub fn add_file(&mut self, path: &Path) -> Result<(), FontFileError> {
        let data = fs::read(path)?;
        let count = ttf_parser::fonts_in_collection(&data).unwrap_or(1);

        let mut added = 0;
        for index in 0..count {
            let face = match ttf_parser::Face::parse(&data, index) {
                Ok(face) => face,
                Err(err) if added == 0 && index + 1 == count => return Err(err.into()),
                Err(_) => continue,
            };
            let Some(family) = family_name(&face) else {
                continue;
            };
            self.faces.push(FaceEntry {
                family,
                path: path.to_path_buf(),
                index,
                weight: face.weight().to_number(),
                italic: face.is_italic(),
                loaded: Arc::default(),
            });
            added += 1;
        }

        if added == 0 {
            return Err(FontFileError::Unnamed);
        }
        Ok(())
    }

    /// Sorted, deduplicated family names, the fallback included.
    pub fn families(&self) -> Vec<String> {
        let mut families: Vec<String> = self.faces.iter().map(|face| face.family.clone()).collect();
        if self.fallback.is_some() {
            families.push(FALLBACK_FAMILY.to_owned());
        }
        families.sort_by_key(|family| family.to_lowercase());
        families.dedup_by(|a, b| a.eq_ignore_ascii_case(b));
        families
    }

    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    /// Resolve a CSS style family list such as `"Heebo, Arial Hebrew, sans-serif"`.
    ///
    /// Names are tried in order. Generic families and names that are not installed fall through
    /// to the bundled face.
    pub fn resolve(&self, families: &str, weight: u16) -> Result<FontArc, PixelError> {
        for name in parse_family_list(families) {
            if is_generic(&name) {
                break;
            }

            for face in self.candidates(&name, weight) {
                match face.load() {
                    Ok(font) => {
                        debug!("resolved {name:?} to {}", face.path.display());
                        return Ok(font);
                    },
                    Err(err) => warn!("failed to load {}: {err}", face.path.display()),
                }
            }
        }

        match &self.fallback {
            Some(font) => {
                debug!("using fallback {FALLBACK_FAMILY} for {families:?}");
                Ok(font.clone())
            },
            None => Err(PixelError::RenderUnavailable(format!(
                "no font face available for {families:?}"
            ))),
        }
    }

    /// Faces of one family, best match for `weight` first.
    fn candidates(&self, family: &str, weight: u16) -> Vec<&FaceEntry> {
        let mut faces: Vec<&FaceEntry> =
            self.faces.iter().filter(|face| face.family.eq_ignore_ascii_case(family)).collect();
        faces.sort_by_key(|face| (face.italic, face.weight.abs_diff(weight)));
        faces
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FontFileError {
    #[error("failed to read font file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse font file: {0}")]
    Parse(#[from] ttf_parser::FaceParsingError),
    #[error("font file has no family name")]
    Unnamed,
    #[error("font data rejected by the rasterizer")]
    Invalid,
}

fn load_face(path: &Path, index: u32) -> Result<FontArc, FontFileError> {
    let data = fs::read(path)?;
    if index == 0 {
        return FontArc::try_from_vec(data).map_err(|_| FontFileError::Invalid);
    }

    let font = ab_glyph::FontVec::try_from_vec_and_index(data, index)
        .map_err(|_| FontFileError::Invalid)?;
    Ok(FontArc::new(font))
}

fn family_name(face: &ttf_parser::Face<'_>) -> Option<String> {
    let names = face.names();
    let lookup = |id: u16| {
        names
            .into_iter()
            .filter(|name| name.name_id == id)
            .find_map(|name| name.to_string())
            .filter(|name| !name.trim().is_empty())
    };
    lookup(ttf_parser::name_id::TYPOGRAPHIC_FAMILY).or_else(|| lookup(ttf_parser::name_id::FAMILY))
}

fn parse_family_list(families: &str) -> Vec<String> {
    families
        .split(',')
        .map(|name| name.trim().trim_matches(|ch| ch == '"' || ch == '\'').trim().to_owned())
        .filter(|name| !name.is_empty())
        .collect()
}

fn is_generic(name: &str) -> bool {
    GENERIC_FAMILIES.iter().any(|generic| generic.eq_ignore_ascii_case(name))
}

fn has_font_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| FONT_EXTENSIONS.iter().any(|known| known.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

fn system_font_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    let home = home::home_dir();

    if cfg!(target_os = "macos") {
        dirs.push(PathBuf::from("/System/Library/Fonts"));
        dirs.push(PathBuf::from("/Library/Fonts"));
        dirs.extend(home.iter().map(|home| home.join("Library/Fonts")));
    } else if cfg!(windows) {
        dirs.push(PathBuf::from(r"C:\Windows\Fonts"));
    } else {
        dirs.push(PathBuf::from("/usr/share/fonts"));
        dirs.push(PathBuf::from("/usr/local/share/fonts"));
        dirs.extend(home.iter().map(|home| home.join(".local/share/fonts")));
        dirs.extend(home.iter().map(|home| home.join(".fonts")));
    }

    dirs
}
