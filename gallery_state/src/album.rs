//! Albums, photos and theme colours.
//!
//! Photos carry only what the animation engine needs: a stable id, an image
//! URL for the renderer, and the initial placement in galaxy space.

use std::fmt;

use glam::Vec3;
use rand::Rng;
use serde::Deserialize;

use crate::GalleryError;

// ════════════════════════════════════════════════════════════════════════════
// Rgb
// ════════════════════════════════════════════════════════════════════════════

/// Linear RGB colour, components in `[0, 1]`.
///
/// Deserializes from a `"#rrggbb"` string.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(try_from = "String")]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(1.0, 1.0, 1.0);
    pub const BLACK: Rgb = Rgb::new(0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Rgb { r, g, b }
    }

    /// `0xRRGGBB` → colour.
    pub fn from_u32(hex: u32) -> Self {
        Rgb {
            r: ((hex >> 16) & 0xFF) as f32 / 255.0,
            g: ((hex >>  8) & 0xFF) as f32 / 255.0,
            b: ( hex        & 0xFF) as f32 / 255.0,
        }
    }

    /// Parse `"#rrggbb"` (the leading `#` is optional).
    pub fn from_hex(s: &str) -> Result<Self, GalleryError> {
        let digits = s.strip_prefix('#').unwrap_or(s);
        if digits.len() != 6 {
            return Err(GalleryError::BadColor(s.to_string()));
        }
        u32::from_str_radix(digits, 16)
            .map(Rgb::from_u32)
            .map_err(|_| GalleryError::BadColor(s.to_string()))
    }

    pub fn lerp(self, to: Rgb, t: f32) -> Rgb {
        Rgb {
            r: self.r + (to.r - self.r) * t,
            g: self.g + (to.g - self.g) * t,
            b: self.b + (to.b - self.b) * t,
        }
    }

    pub fn scale(self, k: f32) -> Rgb {
        Rgb { r: self.r * k, g: self.g * k, b: self.b * k }
    }

    /// Pack into `0xFFRRGGBB` for a framebuffer.
    pub fn to_argb(self) -> u32 {
        let c = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u32;
        0xFF00_0000 | (c(self.r) << 16) | (c(self.g) << 8) | c(self.b)
    }
}

impl TryFrom<String> for Rgb {
    type Error = GalleryError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        Rgb::from_hex(&s)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// PhotoId
// ════════════════════════════════════════════════════════════════════════════

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_LEN: usize = 9;

/// Opaque photo identifier, generated once at creation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PhotoId(String);

impl PhotoId {
    /// Nine random base-36 characters.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let s = (0..ID_LEN)
            .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
            .collect();
        PhotoId(s)
    }

    pub fn as_str(&self) -> &str { &self.0 }

    /// First byte of the id, used as a per-photo phase constant.
    pub fn phase_code(&self) -> u8 {
        self.0.as_bytes().first().copied().unwrap_or(0)
    }
}

impl From<&str> for PhotoId {
    fn from(s: &str) -> Self { PhotoId(s.to_string()) }
}

impl fmt::Display for PhotoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Photo
// ════════════════════════════════════════════════════════════════════════════

/// One memory fragment.
#[derive(Clone, Debug, PartialEq)]
pub struct Photo {
    pub id:       PhotoId,
    pub url:      String,
    /// Initial position in galaxy space; the animation engine scales and
    /// orbits around this.
    pub position: Vec3,
    pub rotation: Vec3,
    pub title:    Option<String>,
}

impl Photo {
    /// Procedural placeholder used when generating albums at startup.
    pub fn placeholder<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Self {
        let seed: f64 = rng.gen();
        Photo {
            id:       PhotoId::generate(rng),
            url:      format!("https://picsum.photos/seed/{}/400/600", seed),
            position: Vec3::new(
                (rng.gen::<f32>() - 0.5) * 10.0,
                (rng.gen::<f32>() - 0.5) * 8.0,
                (rng.gen::<f32>() - 0.5) * 8.0,
            ),
            rotation: Vec3::new(rng.gen::<f32>() * 0.2, rng.gen::<f32>() * 0.2, 0.0),
            title:    Some(format!("Memory Fragment #{}", n)),
        }
    }

    /// A user-supplied image appended to the current album.
    pub fn uploaded<R: Rng + ?Sized>(url: &str, rng: &mut R) -> Self {
        Photo {
            id:       PhotoId::generate(rng),
            url:      url.to_string(),
            position: Vec3::new(
                (rng.gen::<f32>() - 0.5) * 8.0,
                (rng.gen::<f32>() - 0.5) * 8.0,
                (rng.gen::<f32>() - 0.5) * 8.0,
            ),
            rotation: Vec3::new(rng.gen::<f32>() * 0.5, rng.gen::<f32>() * 0.5, 0.0),
            title:    Some("New Memory".to_string()),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Album
// ════════════════════════════════════════════════════════════════════════════

/// A named galaxy of photos with its own theme colour.
#[derive(Clone, Debug, PartialEq)]
pub struct Album {
    pub id:          String,
    pub name:        String,
    pub theme_color: Rgb,
    pub photos:      Vec<Photo>,
}

impl Album {
    pub fn new(id: &str, name: &str, theme_color: Rgb) -> Self {
        Album {
            id:          id.to_string(),
            name:        name.to_string(),
            theme_color,
            photos:      Vec::new(),
        }
    }

    /// Fill with `count` placeholder photos.
    pub fn with_placeholders<R: Rng + ?Sized>(mut self, count: usize, rng: &mut R) -> Self {
        self.photos = (1..=count).map(|n| Photo::placeholder(n, rng)).collect();
        self
    }

    pub fn photo(&self, id: &PhotoId) -> Option<&Photo> {
        self.photos.iter().find(|p| &p.id == id)
    }

    pub fn contains(&self, id: &PhotoId) -> bool {
        self.photo(id).is_some()
    }
}

/// The three built-in galaxies.  The first starts empty and receives uploads.
pub fn default_albums<R: Rng + ?Sized>(rng: &mut R) -> Vec<Album> {
    vec![
        Album::new("galaxy-1", "CYBER NEBULA",   Rgb::from_u32(0x00ccff)),
        Album::new("galaxy-2", "CRIMSON VOID",   Rgb::from_u32(0xff0055)).with_placeholders(5, rng),
        Album::new("galaxy-3", "GOLDEN HORIZON", Rgb::from_u32(0xffaa00)).with_placeholders(5, rng),
    ]
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn hex_parsing() {
        let c = Rgb::from_hex("#ff0055").unwrap();
        assert_eq!(c, Rgb::from_u32(0xff0055));
        assert!((c.r - 1.0).abs() < 1e-6);
        assert!((c.b - 85.0 / 255.0).abs() < 1e-6);
        assert_eq!(Rgb::from_hex("00ccff").unwrap(), Rgb::from_u32(0x00ccff));
        assert!(Rgb::from_hex("#fff").is_err());
        assert!(Rgb::from_hex("#gg0000").is_err());
    }

    #[test]
    fn argb_packing() {
        assert_eq!(Rgb::from_u32(0x4fd4ff).to_argb(), 0xFF4FD4FF);
        assert_eq!(Rgb::new(2.0, -1.0, 0.0).to_argb(), 0xFFFF0000);
    }

    #[test]
    fn ids_are_nine_base36_chars() {
        let mut rng = StdRng::seed_from_u64(7);
        let a = PhotoId::generate(&mut rng);
        let b = PhotoId::generate(&mut rng);
        assert_eq!(a.as_str().len(), 9);
        assert!(a.as_str().chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
        assert_ne!(a, b);
    }

    #[test]
    fn default_albums_layout() {
        let mut rng = StdRng::seed_from_u64(1);
        let albums = default_albums(&mut rng);
        assert_eq!(albums.len(), 3);
        assert!(albums[0].photos.is_empty());
        assert_eq!(albums[1].photos.len(), 5);
        assert_eq!(albums[2].name, "GOLDEN HORIZON");
        let p = &albums[1].photos[0];
        assert_eq!(p.title.as_deref(), Some("Memory Fragment #1"));
        assert!(p.position.x.abs() <= 5.0 && p.position.y.abs() <= 4.0 && p.position.z.abs() <= 4.0);
        assert!(p.url.starts_with("https://picsum.photos/seed/"));
    }

    #[test]
    fn uploaded_photo_bounds() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            let p = Photo::uploaded("blob:local/1", &mut rng);
            assert!(p.position.abs().max_element() <= 4.0);
            assert!(p.rotation.x < 0.5 && p.rotation.y < 0.5 && p.rotation.z == 0.0);
            assert_eq!(p.url, "blob:local/1");
        }
    }
}
