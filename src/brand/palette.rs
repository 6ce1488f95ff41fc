use crate::foundation::core::{ColorPair, Rgb};

const RED_BULL: ColorPair = ColorPair::new(Rgb::new(6, 29, 66), Rgb::new(255, 0, 0));
const FERRARI: ColorPair = ColorPair::new(Rgb::new(200, 0, 0), Rgb::new(255, 242, 0));
const MERCEDES: ColorPair = ColorPair::new(Rgb::new(0, 0, 0), Rgb::new(0, 161, 155));
const MCLAREN: ColorPair = ColorPair::new(Rgb::new(255, 128, 0), Rgb::new(71, 199, 252));
const ASTON_MARTIN: ColorPair = ColorPair::new(Rgb::new(0, 111, 98), Rgb::new(206, 220, 0));

/// Pair used when no entity is mentioned.
pub const DEFAULT_PAIR: ColorPair = ColorPair::new(Rgb::new(15, 20, 35), Rgb::new(255, 0, 50));

/// Ordered rule table. Evaluated top to bottom; the first match decides, so reordering
/// changes results for headlines that mention several entities.
pub const TEAM_RULES: &[(&str, ColorPair)] = &[
    ("Red Bull", RED_BULL),
    ("Verstappen", RED_BULL),
    ("Perez", RED_BULL),
    ("Ferrari", FERRARI),
    ("Leclerc", FERRARI),
    ("Sainz", FERRARI),
    ("Mercedes", MERCEDES),
    ("Hamilton", MERCEDES),
    ("Russell", MERCEDES),
    ("McLaren", MCLAREN),
    ("Norris", MCLAREN),
    ("Piastri", MCLAREN),
    ("Aston Martin", ASTON_MARTIN),
    ("Alonso", ASTON_MARTIN),
];

/// Brand colors for a headline: the pair of the first entity named in `text`
/// (case-insensitive substring), or [`DEFAULT_PAIR`].
pub fn resolve(text: &str) -> ColorPair {
    let haystack = text.to_lowercase();
    TEAM_RULES
        .iter()
        .find(|(name, _)| haystack.contains(&name.to_lowercase()))
        .map(|(_, pair)| *pair)
        .unwrap_or(DEFAULT_PAIR)
}
