//! Random physical descriptions for players.

use crate::types::Attributes;
use rand::seq::IndexedRandom;
use rand::Rng;

pub const HAIR_COLORS: &[&str] = &["Black", "Brown", "Blonde", "Red", "Gray"];
pub const HAIR_STYLES: &[&str] = &["Short", "Long", "Curly", "Bald", "Ponytail"];
pub const EYE_COLORS: &[&str] = &["Brown", "Blue", "Green", "Hazel", "Gray"];
pub const OUTFITS: &[&str] = &["Suit", "Hoodie", "Dress", "Overalls", "Trench Coat"];
pub const ACCESSORIES: &[&str] = &["Glasses", "Hat", "Scarf", "Watch", "Earrings"];
pub const BUILDS: &[&str] = &["Slim", "Athletic", "Stocky", "Lanky", "Broad"];
pub const FOOTWEAR: &[&str] = &["Boots", "Sneakers", "Sandals", "Loafers", "Heels"];

/// Inclusive range of rolled heights, 4'8" to 6'4"
pub const MIN_HEIGHT_INCHES: u8 = 56;
pub const MAX_HEIGHT_INCHES: u8 = 76;

/// Every trait a clue can be drawn from, height included
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trait {
    HairColor,
    HairStyle,
    EyeColor,
    Outfit,
    Accessory,
    Build,
    Footwear,
    Height,
}

impl Trait {
    pub const ALL: [Trait; 8] = [
        Trait::HairColor,
        Trait::HairStyle,
        Trait::EyeColor,
        Trait::Outfit,
        Trait::Accessory,
        Trait::Build,
        Trait::Footwear,
        Trait::Height,
    ];

    /// Raw value of this trait in a profile
    pub fn value_of(self, attributes: &Attributes) -> &str {
        match self {
            Trait::HairColor => &attributes.hair_color,
            Trait::HairStyle => &attributes.hair_style,
            Trait::EyeColor => &attributes.eye_color,
            Trait::Outfit => &attributes.outfit,
            Trait::Accessory => &attributes.accessory,
            Trait::Build => &attributes.build,
            Trait::Footwear => &attributes.footwear,
            Trait::Height => &attributes.height,
        }
    }
}

/// Render inches as feet and inches, e.g. `5'7"`
pub fn format_height(inches: u8) -> String {
    format!("{}'{}\"", inches / 12, inches % 12)
}

fn pick<R: Rng + ?Sized>(rng: &mut R, table: &[&str]) -> String {
    table.choose(rng).copied().unwrap_or_default().to_string()
}

/// Roll a fresh profile
pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Attributes {
    let height_inches = rng.random_range(MIN_HEIGHT_INCHES..=MAX_HEIGHT_INCHES);
    Attributes {
        hair_color: pick(rng, HAIR_COLORS),
        hair_style: pick(rng, HAIR_STYLES),
        eye_color: pick(rng, EYE_COLORS),
        outfit: pick(rng, OUTFITS),
        accessory: pick(rng, ACCESSORIES),
        build: pick(rng, BUILDS),
        footwear: pick(rng, FOOTWEAR),
        height_inches,
        height: format_height(height_inches),
    }
}
