//! Gate for the research pipeline: an article is kept only when it mentions
//! both an ornamental plant and a disease term.

/// Scientific names of common ornamental plants the dataset targets.
pub const ORNAMENTAL_PLANTS: &[&str] = &[
    "Rosa sp",
    "Tulipa sp",
    "Orchidaceae",
    "Chrysanthemum",
    "Lilium",
    "Anthurium",
    "Begonia",
    "Cyclamen",
    "Dianthus",
    "Fuchsia",
    "Geranium",
    "Helianthus",
    "Impatiens",
    "Narcissus",
    "Petunia",
    "Pelargonium",
    "Saintpaulia",
    "Tagetes",
    "Viola",
    "Zinnia",
    "Calathea",
    "Monstera",
    "Philodendron",
    "Ficus",
    "Dracaena",
    "Spathiphyllum",
    "Sansevieria",
    "Kalanchoe",
    "Primula",
    "Poinsettia",
];

/// Terms that mark a text as plant-pathology related.
pub const DISEASE_TERMS: &[&str] = &[
    "disease",
    "pathogen",
    "fungus",
    "bacteria",
    "virus",
    "infection",
    "rot",
    "blight",
    "mildew",
    "rust",
    "necrosis",
    "spot",
    "wilt",
    "mosaic",
    "canker",
];

/// True when the title or body mentions at least one ornamental plant AND at
/// least one disease term, case-insensitively.
pub fn is_relevant(title: &str, body: &str) -> bool {
    let title = title.to_lowercase();
    let body = body.to_lowercase();
    let mentions_any = |terms: &[&str]| {
        terms.iter().any(|term| {
            let term = term.to_lowercase();
            title.contains(&term) || body.contains(&term)
        })
    };
    mentions_any(ORNAMENTAL_PLANTS) && mentions_any(DISEASE_TERMS)
}

// ── Tests ──
