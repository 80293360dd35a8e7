//! Keyword tables for the category classifier
//!
//! Each table is an ordered list of `(keyword, category path)` pairs. The
//! classifier scans tables in the order of [`KEYWORD_TABLES`] and each table in
//! declaration order, so reordering entries changes where documents land.

/// A named, ordered keyword table
pub struct KeywordTable {
    pub name: &'static str,
    pub entries: &'static [(&'static str, &'static str)],
}

/// Engine and vehicle-platform keywords
pub const ENGINE: KeywordTable = KeywordTable {
    name: "engine",
    entries: &[
        // BMW
        ("bmw", "technical-library/engines/bmw"),
        ("m50", "technical-library/engines/bmw"),
        ("m52", "technical-library/engines/bmw"),
        ("m54", "technical-library/engines/bmw"),
        ("s50", "technical-library/engines/bmw"),
        ("s52", "technical-library/engines/bmw"),
        ("s54", "technical-library/engines/bmw"),
        ("n54", "technical-library/engines/bmw"),
        ("n55", "technical-library/engines/bmw"),
        // Ford
        ("ford", "technical-library/engines/ford"),
        ("barra", "technical-library/engines/ford"),
        ("windsor", "technical-library/engines/ford"),
        ("modular", "technical-library/engines/ford"),
        ("coyote", "technical-library/engines/ford"),
        ("ecoboost", "technical-library/engines/ford"),
        // Honda
        ("honda", "technical-library/engines/honda"),
        ("b-series", "technical-library/engines/honda"),
        ("b16", "technical-library/engines/honda"),
        ("b18", "technical-library/engines/honda"),
        ("b20", "technical-library/engines/honda"),
        ("d-series", "technical-library/engines/honda"),
        ("d16", "technical-library/engines/honda"),
        ("k-series", "technical-library/engines/honda"),
        ("k20", "technical-library/engines/honda"),
        ("k24", "technical-library/engines/honda"),
        // Mazda
        ("mazda", "technical-library/engines/mazda"),
        ("miata", "technical-library/engines/mazda"),
        ("mx-5", "technical-library/engines/mazda"),
        ("mx5", "technical-library/engines/mazda"),
        ("na-nb", "technical-library/engines/mazda"),
        ("bp", "technical-library/engines/mazda"),
        ("b6", "technical-library/engines/mazda"),
        ("rotary", "technical-library/engines/mazda"),
        ("13b", "technical-library/engines/mazda"),
        ("20b", "technical-library/engines/mazda"),
        // Mitsubishi
        ("mitsubishi", "technical-library/engines/mitsubishi"),
        ("4g63", "technical-library/engines/mitsubishi"),
        ("4g93", "technical-library/engines/mitsubishi"),
        ("4b11", "technical-library/engines/mitsubishi"),
        ("evo", "technical-library/engines/mitsubishi"),
        // Nissan
        ("nissan", "technical-library/engines/nissan"),
        ("rb", "technical-library/engines/nissan"),
        ("rb20", "technical-library/engines/nissan"),
        ("rb25", "technical-library/engines/nissan"),
        ("rb26", "technical-library/engines/nissan"),
        ("rb30", "technical-library/engines/nissan"),
        ("sr20", "technical-library/engines/nissan"),
        ("vq", "technical-library/engines/nissan"),
        ("vq35", "technical-library/engines/nissan"),
        ("vr38", "technical-library/engines/nissan"),
        ("ca18", "technical-library/engines/nissan"),
        // Subaru
        ("subaru", "technical-library/engines/subaru"),
        ("ej", "technical-library/engines/subaru"),
        ("ej20", "technical-library/engines/subaru"),
        ("ej25", "technical-library/engines/subaru"),
        ("fa20", "technical-library/engines/subaru"),
        ("fb", "technical-library/engines/subaru"),
        // Toyota
        ("toyota", "technical-library/engines/toyota"),
        ("1jz", "technical-library/engines/toyota"),
        ("2jz", "technical-library/engines/toyota"),
        ("1uz", "technical-library/engines/toyota"),
        ("2uz", "technical-library/engines/toyota"),
        ("3uz", "technical-library/engines/toyota"),
        ("4ag", "technical-library/engines/toyota"),
        ("3sg", "technical-library/engines/toyota"),
        ("2zz", "technical-library/engines/toyota"),
        ("1nz", "technical-library/engines/toyota"),
        ("2az", "technical-library/engines/toyota"),
        ("2rz", "technical-library/engines/toyota"),
        ("3rz", "technical-library/engines/toyota"),
        // VW / Audi
        ("vw", "technical-library/engines/vw"),
        ("volkswagen", "technical-library/engines/vw"),
        ("audi", "technical-library/engines/vw"),
        ("1.8t", "technical-library/engines/vw"),
        ("1.8-turbo", "technical-library/engines/vw"),
        ("2.0t", "technical-library/engines/vw"),
        ("vr6", "technical-library/engines/vw"),
        // GM / Chevrolet
        ("gm", "technical-library/engines/gm"),
        ("chevrolet", "technical-library/engines/gm"),
        ("chevy", "technical-library/engines/gm"),
        ("ls", "technical-library/engines/gm"),
        ("ls1", "technical-library/engines/gm"),
        ("ls2", "technical-library/engines/gm"),
        ("ls3", "technical-library/engines/gm"),
        ("ls6", "technical-library/engines/gm"),
        ("ls7", "technical-library/engines/gm"),
        ("lsx", "technical-library/engines/gm"),
    ],
};

/// ECU, display and sensor product lines
pub const PRODUCT: KeywordTable = KeywordTable {
    name: "product",
    entries: &[
        ("elite", "products/elite-series"),
        ("elite-1000", "products/elite-series"),
        ("elite-1500", "products/elite-series"),
        ("elite-2000", "products/elite-series"),
        ("elite-2500", "products/elite-series"),
        ("nexus", "products/nexus-series"),
        ("nexus-r3", "products/nexus-series"),
        ("nexus-r5", "products/nexus-series"),
        ("nexus-s3", "products/nexus-series"),
        ("ic-7", "products/displays"),
        ("iq3", "products/displays"),
        ("dash", "products/displays"),
        ("display", "products/displays"),
        ("wideband", "products/sensors"),
        ("wb1", "products/sensors"),
        ("wb2", "products/sensors"),
    ],
};

/// Technical topics
pub const TECHNICAL: KeywordTable = KeywordTable {
    name: "technical",
    entries: &[
        // Triggers
        ("trigger", "technical-library/triggers"),
        ("crank-trigger", "technical-library/triggers"),
        ("cam-trigger", "technical-library/triggers"),
        ("home-signal", "technical-library/triggers"),
        // Fuel
        ("fuel", "technical-library/fuel"),
        ("injector", "technical-library/fuel"),
        ("fuel-pump", "technical-library/fuel"),
        ("flex-fuel", "technical-library/fuel"),
        ("e85", "technical-library/fuel"),
        // Ignition
        ("ignition", "technical-library/ignition-systems"),
        ("coil", "technical-library/ignition-systems"),
        ("spark", "technical-library/ignition-systems"),
        ("cdi", "technical-library/ignition-systems"),
        // Sensors
        ("sensor", "technical-library/sensors"),
        ("map", "technical-library/sensors"),
        ("maf", "technical-library/sensors"),
        ("tps", "technical-library/sensors"),
        ("iat", "technical-library/sensors"),
        ("ect", "technical-library/sensors"),
        ("lambda", "technical-library/sensors"),
        ("o2", "technical-library/sensors"),
        // Functions
        ("boost", "technical-library/functions"),
        ("idle", "technical-library/functions"),
        ("launch", "technical-library/functions"),
        ("antilag", "technical-library/functions"),
        ("traction", "technical-library/functions"),
        ("nitrous", "technical-library/functions"),
        ("cam-control", "technical-library/functions"),
        ("vvt", "technical-library/functions"),
    ],
};

/// Tuning software
pub const SOFTWARE: KeywordTable = KeywordTable {
    name: "software",
    entries: &[
        ("nsp", "nexus-software-programmer-nsp"),
        ("nexus-software", "nexus-software-programmer-nsp"),
        ("esp", "elite-software-programmer"),
        ("elite-software", "elite-software-programmer"),
        ("datalog", "software/datalog"),
        ("tuning", "software/tuning"),
    ],
};

/// All keyword tables in priority order
pub const KEYWORD_TABLES: &[&KeywordTable] = &[&ENGINE, &PRODUCT, &TECHNICAL, &SOFTWARE];

/// Slug-term fallbacks for `/kb/articles/<slug>` URLs, in priority order
pub const SLUG_FALLBACKS: &[(&[&str], &str)] = &[
    (&["engine", "motor"], "technical-library/engines"),
    (&["trigger", "crank", "cam"], "technical-library/triggers"),
    (&["fuel", "injector"], "technical-library/fuel"),
    (&["wire", "wiring", "harness", "pinout"], "technical-library/wiring"),
    (&["tune", "tuning", "map"], "technical-library/tuning"),
];

/// Catch-all category
pub const FALLBACK_CATEGORY: &str = "articles";
