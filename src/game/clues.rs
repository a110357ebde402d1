//! Clue text generation.
//!
//! A clue names one trait of its subject, but never the raw value: each value
//! maps to a few alternate phrasings so players have to cross-reference.

use super::attributes::Trait;
use crate::types::{Attributes, Lobby, Player};
use rand::seq::IndexedRandom;
use rand::Rng;

/// Heights below this are "Short"
const AVERAGE_PIVOT_INCHES: u8 = 60;
/// Heights from this up are "Tall"
const TALL_FROM_INCHES: u8 = 72;

pub fn height_bucket(inches: u8) -> &'static str {
    if inches < AVERAGE_PIVOT_INCHES {
        "Short"
    } else if inches < TALL_FROM_INCHES {
        "Average"
    } else {
        "Tall"
    }
}

fn label(t: Trait) -> &'static str {
    match t {
        Trait::HairColor => "Hair",
        Trait::HairStyle => "Hairstyle",
        Trait::EyeColor => "Eyes",
        Trait::Outfit => "Clothing",
        Trait::Accessory => "Accessory",
        Trait::Build => "Build",
        Trait::Footwear => "Shoes",
        Trait::Height => "Height",
    }
}

fn phrasings(t: Trait, value: &str) -> Option<&'static [&'static str; 3]> {
    let table: &'static [&'static str; 3] = match (t, value) {
        (Trait::HairColor, "Black") => &["dark as a raven", "jet black", "inky strands"],
        (Trait::HairColor, "Brown") => &["chestnut", "the colour of coffee", "mousy brown"],
        (Trait::HairColor, "Blonde") => &["golden", "straw-coloured", "sun-bleached"],
        (Trait::HairColor, "Red") => &["fiery", "copper-toned", "ginger"],
        (Trait::HairColor, "Gray") => &["silver", "salt and pepper", "ashen"],

        (Trait::HairStyle, "Short") => &["cropped close", "a neat trim", "barely past the ears"],
        (Trait::HairStyle, "Long") => &["past the shoulders", "flowing", "long enough to tie back"],
        (Trait::HairStyle, "Curly") => &["tight ringlets", "a mess of curls", "springy coils"],
        (Trait::HairStyle, "Bald") => &["a shiny scalp", "not a hair in sight", "clean shaven head"],
        (Trait::HairStyle, "Ponytail") => &["tied back", "a swinging tail", "pulled up high"],

        (Trait::EyeColor, "Brown") => &["warm and dark", "like strong tea", "deep brown"],
        (Trait::EyeColor, "Blue") => &["ice-pale", "the colour of the sea", "bright blue"],
        (Trait::EyeColor, "Green") => &["emerald", "like moss", "cat-like green"],
        (Trait::EyeColor, "Hazel") => &["flecked gold and green", "amber-ish", "shifting hazel"],
        (Trait::EyeColor, "Gray") => &["steely", "stormy", "like slate"],

        (Trait::Outfit, "Suit") => &["sharply tailored", "buttoned-up formal", "pinstriped"],
        (Trait::Outfit, "Hoodie") => &["hood pulled up", "casual sweatshirt", "baggy and zipped"],
        (Trait::Outfit, "Dress") => &["a long hem", "swishing skirt", "elegant gown"],
        (Trait::Outfit, "Overalls") => &["work clothes", "denim with straps", "paint-stained bib"],
        (Trait::Outfit, "Trench Coat") => &["a long coat", "collar turned up", "belted raincoat"],

        (Trait::Accessory, "Glasses") => &["lenses glinting", "thick frames", "spectacles"],
        (Trait::Accessory, "Hat") => &["something on their head", "a brimmed hat", "a cap"],
        (Trait::Accessory, "Scarf") => &["wrapped at the neck", "a knitted scarf", "a trailing scarf"],
        (Trait::Accessory, "Watch") => &["ticking wrist", "a glint on the wrist", "checked the time"],
        (Trait::Accessory, "Earrings") => &["something dangling from the ears", "sparkling ears", "hoops"],

        (Trait::Build, "Slim") => &["narrow shoulders", "slight frame", "wiry"],
        (Trait::Build, "Athletic") => &["toned", "moves like a runner", "fit"],
        (Trait::Build, "Stocky") => &["solid and square", "thickset", "heavy-footed"],
        (Trait::Build, "Lanky") => &["all elbows", "long limbs", "gangly"],
        (Trait::Build, "Broad") => &["wide shoulders", "filled the doorway", "barrel-chested"],

        (Trait::Footwear, "Boots") => &["heavy soles", "laced to the ankle", "stomping heels"],
        (Trait::Footwear, "Sneakers") => &["rubber soles", "quiet footsteps", "trainers"],
        (Trait::Footwear, "Sandals") => &["bare toes", "open straps", "flip-flopping"],
        (Trait::Footwear, "Loafers") => &["polished slip-ons", "tasselled leather", "no laces"],
        (Trait::Footwear, "Heels") => &["clicking on the floor", "pointed toes", "a few inches taller"],

        _ => return None,
    };
    Some(table)
}

/// One phrasing for a trait value, or the raw value if none is known
pub fn phrase_for<R: Rng + ?Sized>(t: Trait, value: &str, rng: &mut R) -> String {
    match phrasings(t, value).and_then(|options| options.choose(rng)) {
        Some(phrase) => phrase.to_string(),
        None => value.to_string(),
    }
}

/// Describe one randomly chosen trait of a profile
pub fn describe<R: Rng + ?Sized>(attributes: &Attributes, rng: &mut R) -> String {
    let t = Trait::ALL.choose(rng).copied().unwrap_or(Trait::Height);
    let detail = match t {
        Trait::Height => height_bucket(attributes.height_inches).to_string(),
        _ => phrase_for(t, t.value_of(attributes), rng),
    };
    format!("{}: {}", label(t), detail)
}

/// Pick the clue subject: the killer for a truthful clue, a random
/// non-killer for a tampered one.
pub fn pick_subject<'a, R: Rng + ?Sized>(
    lobby: &'a Lobby,
    tampered: bool,
    rng: &mut R,
) -> Option<&'a Player> {
    if tampered {
        let decoys: Vec<&Player> = lobby.players.iter().filter(|p| !p.is_killer()).collect();
        decoys.choose(rng).copied()
    } else {
        lobby.players.iter().find(|p| p.is_killer())
    }
}

/// Generate clue text for a lobby. `None` if there is no eligible subject.
pub fn synthesize<R: Rng + ?Sized>(lobby: &Lobby, tampered: bool, rng: &mut R) -> Option<String> {
    let subject = pick_subject(lobby, tampered, rng)?;
    let attributes = subject.attributes.as_ref()?;
    Some(describe(attributes, rng))
}
