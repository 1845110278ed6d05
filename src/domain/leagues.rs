//! Tracked competitions: default allowlist and display names.

/// Competition ids tracked by default (api-sports league ids).
pub const DEFAULT_TRACKED_LEAGUES: &[u32] = &[
    135,  // Serie A
    137,  // Coppa Italia
    547,  // Supercoppa Italiana
    39,   // Premier League
    45,   // FA Cup
    48,   // Carabao Cup
    528,  // Community Shield
    140,  // La Liga
    143,  // Copa del Rey
    556,  // Supercopa de España
    2,    // Champions League
    3,    // Europa League
    848,  // Conference League
    531,  // UEFA Super Cup
    1168, // Intercontinental Cup
    15,   // Club World Cup
    1,    // FIFA World Cup
    4,    // UEFA EURO
];

/// Display name for a competition id, if known.
pub fn league_name(id: u32) -> Option<&'static str> {
    let name = match id {
        135 => "Serie A",
        137 => "Coppa Italia",
        547 => "Supercoppa Italiana",
        39 => "Premier League",
        45 => "FA Cup",
        48 => "Carabao Cup",
        528 => "Community Shield",
        140 => "La Liga",
        143 => "Copa del Rey",
        556 => "Supercopa de España",
        2 => "Champions League",
        3 => "Europa League",
        848 => "Conference League",
        531 => "UEFA Super Cup",
        1168 => "Intercontinental Cup",
        15 => "Club World Cup",
        1 => "FIFA World Cup",
        4 => "UEFA EURO",
        _ => return None,
    };
    Some(name)
}
