//! Built-in category catalogue (English and Spanish tokens).

use super::{CategoryRule, TagPair};

/// Canonical name, synonyms, and the tag pairs ORed in the query.
type RuleRow = (
    &'static str,
    &'static [&'static str],
    &'static [(&'static str, &'static str)],
);

const RULES: &[RuleRow] = &[
    (
        "restaurant",
        &["restaurante", "comida", "food"],
        &[("amenity", "restaurant")],
    ),
    ("cafe", &["coffee", "cafeteria"], &[("amenity", "cafe")]),
    (
        "bar",
        &["pub", "cantina"],
        &[("amenity", "bar"), ("amenity", "pub")],
    ),
    (
        "fast_food",
        &["comida_rapida"],
        &[("amenity", "fast_food")],
    ),
    (
        "ice_cream",
        &["helado", "heladeria"],
        &[("amenity", "ice_cream")],
    ),
    ("park", &["parque"], &[("leisure", "park")]),
    (
        "garden",
        &["jardin", "jardines"],
        &[
            ("leisure", "garden"),
            ("leisure", "park"),
            ("leisure", "common"),
        ],
    ),
    (
        "playground",
        &["juegos", "parque_infantil"],
        &[("leisure", "playground")],
    ),
    ("museum", &["museo"], &[("tourism", "museum")]),
    ("gallery", &["galeria"], &[("tourism", "gallery")]),
    ("viewpoint", &["mirador"], &[("tourism", "viewpoint")]),
    (
        "monument",
        &["monumento", "historic"],
        &[("historic", "monument"), ("historic", "memorial")],
    ),
    ("library", &["biblioteca"], &[("amenity", "library")]),
    ("cinema", &["cine"], &[("amenity", "cinema")]),
    (
        "theatre",
        &["theater", "teatro"],
        &[("amenity", "theatre")],
    ),
    ("pharmacy", &["farmacia"], &[("amenity", "pharmacy")]),
    (
        "hospital",
        &["clinica"],
        &[("amenity", "hospital"), ("amenity", "clinic")],
    ),
    (
        "supermarket",
        &["supermercado"],
        &[("shop", "supermarket")],
    ),
    ("bakery", &["panaderia"], &[("shop", "bakery")]),
    ("market", &["mercado"], &[("amenity", "marketplace")]),
    (
        "hotel",
        &["hostal"],
        &[("tourism", "hotel"), ("tourism", "hostel")],
    ),
    (
        "gym",
        &["gimnasio", "fitness"],
        &[("leisure", "fitness_centre")],
    ),
    (
        "sports",
        &["deportes", "cancha"],
        &[("leisure", "sports_centre"), ("leisure", "pitch")],
    ),
    ("bank", &["banco"], &[("amenity", "bank")]),
    ("atm", &["cajero"], &[("amenity", "atm")]),
    ("fuel", &["gasolinera"], &[("amenity", "fuel")]),
    ("parking", &["estacionamiento"], &[("amenity", "parking")]),
];

/// Materialise the built-in rules.
pub(super) fn rules() -> Vec<CategoryRule> {
    RULES
        .iter()
        .map(|(name, synonyms, tags)| CategoryRule {
            name: (*name).to_owned(),
            synonyms: synonyms.iter().map(|s| (*s).to_owned()).collect(),
            tags: tags
                .iter()
                .map(|(key, value)| TagPair::from_static(key, value))
                .collect(),
        })
        .collect()
}
