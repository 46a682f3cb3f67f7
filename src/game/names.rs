//! Random display names for players who attach without one.

use rand::seq::SliceRandom;

const ADJECTIVES: &[&str] = &[
    "abundant", "abysmal", "aged", "ancient", "arbitrary", "artificial", "barren", "bitter",
    "bland", "blurry", "boiling", "bumpy", "chaotic", "clumsy", "coarse", "cold", "colossal",
    "confused", "crooked", "crude", "curved", "damaged", "decent", "distant", "dusty", "earthy",
    "empty", "faint", "feeble", "fickle", "filthy", "flat", "flimsy", "foul", "fragile", "frigid",
    "fuzzy", "giant", "greasy", "grim", "grimy", "harsh", "hazy", "hollow", "humid", "inferior",
    "jagged", "jumbled", "lean", "lethal", "limp", "loose", "lousy", "massive", "messy", "mild",
    "misty", "moist", "muddy", "murky", "narrow", "nasty", "obscure", "odd", "ordinary", "pale",
    "plain", "pointless", "poor", "prickly", "primitive", "raw", "rigid", "rocky", "rough",
    "rusty", "scattered", "shabby", "shallow", "shrill", "slimy", "slippery", "small", "smoky",
    "solid", "spare", "spiky", "spotted", "square", "stale", "stiff", "sturdy", "tarnished",
    "tense", "thick", "thin", "uneven", "vague", "weak", "wilted", "wiry", "worn", "wrinkled",
];

const NOUNS: &[&str] = &[
    "abyss", "angle", "arch", "ash", "badge", "bark", "beam", "beast", "blaze", "blend", "bluff",
    "blur", "branch", "brink", "burst", "canyon", "cave", "charm", "cliff", "coil", "creek",
    "crest", "crust", "dash", "depth", "ditch", "drain", "drift", "edge", "ember", "feast",
    "flake", "flicker", "flood", "fog", "forge", "fringe", "frost", "glow", "grain", "groove",
    "gust", "heap", "hitch", "hollow", "hue", "husk", "ice", "knot", "ledge", "loop", "marsh",
    "moss", "mound", "notch", "patch", "peak", "pebble", "pile", "plume", "pond", "pool", "pulse",
    "quarry", "ripple", "ridge", "rift", "ring", "river", "rust", "scale", "scrap", "shade",
    "shaft", "shard", "shear", "shell", "shrine", "slab", "slate", "slice", "smoke", "spark",
    "speck", "splinter", "spring", "stack", "stain", "streak", "stream", "stretch", "stripe",
    "thicket", "trail", "trench", "veil", "void", "wave", "whisper", "wrinkle", "zone",
];

/// Generate an "adjective noun" display name
pub fn random_name() -> String {
    let mut rng = rand::thread_rng();
    let adjective = ADJECTIVES.choose(&mut rng).expect("non-empty list");
    let noun = NOUNS.choose(&mut rng).expect("non-empty list");
    format!("{} {}", adjective, noun)
}
