//! The synthetic row written by the harness
//!
//! A cat has a name and a species and nothing else. Identity is the
//! auto-incrementing key the store assigns on insert, which is never read back.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Column width of both string fields
pub const MAX_FIELD_LEN: usize = 20;

const FIRST_HALVES: &[&str] = &[
    "Fluff", "Whisk", "Mitten", "Pounce", "Snooze", "Biscuit", "Pickle", "Noodle", "Waffle",
    "Pudding", "Sprocket", "Marble", "Crumb", "Zigzag", "Tumble", "Gizmo", "Pepper", "Socks",
    "Mango", "Rascal",
];

const SECOND_HALVES: &[&str] = &[
    "paw", "tail", "whisker", "purr", "bean", "nose", "claw", "fuzz", "loaf", "boots", "sprout",
    "bottom", "muffin", "button", "pants", "wiggle", "nugget", "face", "snout", "toes",
];

/// A row of the `cats` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Cat {
    pub name: String,
    pub species: String,
}

impl Cat {
    /// Create a cat, truncating both fields to the column width
    pub fn new(name: impl Into<String>, species: impl Into<String>) -> Self {
        Self {
            name: truncate(name.into()),
            species: truncate(species.into()),
        }
    }

    /// Create a cat with silly random name and species
    pub fn random() -> Self {
        let mut rng = rand::thread_rng();
        Self::random_with(&mut rng)
    }

    /// Create a cat with silly random name and species drawn from `rng`
    pub fn random_with<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::new(silly_name(rng), silly_name(rng))
    }
}

/// Two random halves glued together, e.g. "Pickletoes"
pub fn silly_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    let first = FIRST_HALVES.choose(rng).copied().unwrap_or("Cat");
    let second = SECOND_HALVES.choose(rng).copied().unwrap_or("paw");
    format!("{}{}", first, second)
}

fn truncate(mut value: String) -> String {
    if value.len() > MAX_FIELD_LEN {
        let mut end = MAX_FIELD_LEN;
        while !value.is_char_boundary(end) {
            end -= 1;
        }
        value.truncate(end);
    }
    value
}
