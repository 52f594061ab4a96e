//! Identifier canonicalization.
//!
//! All functions here are total: an identifier that matches no alias still
//! produces a deterministic canonical form. An unknown champion only risks
//! missing upstream data, which is not an error.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Champions whose canonical id is not a plain capitalization of the
/// lower-cased name. Keys are lower-case with separators removed.
static CHAMPION_ALIASES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("aurelionsol", "AurelionSol"),
        ("belveth", "Belveth"),
        ("chogath", "Chogath"),
        ("drmundo", "DrMundo"),
        ("jarvaniv", "JarvanIV"),
        ("jarvan", "JarvanIV"),
        ("kaisa", "Kaisa"),
        ("khazix", "Khazix"),
        ("kogmaw", "KogMaw"),
        ("ksante", "KSante"),
        ("leblanc", "Leblanc"),
        ("leesin", "LeeSin"),
        ("masteryi", "MasterYi"),
        ("missfortune", "MissFortune"),
        ("monkeyking", "MonkeyKing"),
        ("wukong", "MonkeyKing"),
        ("nunuwillump", "Nunu"),
        ("renataglasc", "Renata"),
        ("reksai", "RekSai"),
        ("tahmkench", "TahmKench"),
        ("twistedfate", "TwistedFate"),
        ("velkoz", "Velkoz"),
        ("xinzhao", "XinZhao"),
    ])
});

static RANK_ALIASES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("PLAT", "PLATINUM"),
        ("DIA", "DIAMOND"),
        ("GM", "GRANDMASTER"),
        ("CHALL", "CHALLENGER"),
    ])
});

/// Platform routing ids as returned by the game's own APIs.
static REGION_ALIASES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("na1", "na"),
        ("euw1", "euw"),
        ("eun1", "eune"),
        ("kr1", "kr"),
        ("br1", "br"),
        ("jp1", "jp"),
        ("la1", "lan"),
        ("la2", "las"),
        ("oc1", "oce"),
        ("tr1", "tr"),
        ("ru1", "ru"),
    ])
});

static ROLE_ALIASES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("bot", "adc"),
        ("bottom", "adc"),
        ("carry", "adc"),
        ("middle", "mid"),
        ("jg", "jungle"),
        ("jungler", "jungle"),
        ("supp", "support"),
        ("sup", "support"),
        ("utility", "support"),
        ("toplane", "top"),
    ])
});

fn is_separator(c: char) -> bool {
    matches!(c, ' ' | '\'' | '.' | '&' | '_' | '-')
}

/// Canonicalize a champion identifier.
///
/// Lower-cases the input and drops separators, consults the alias table and
/// otherwise capitalizes the first letter:
///
/// ```
/// use champ_stats_cache::keys::normalize_champion_id;
///
/// assert_eq!(normalize_champion_id("khazix"), "Khazix");
/// assert_eq!(normalize_champion_id("Kai'Sa"), "Kaisa");
/// assert_eq!(normalize_champion_id("notachampion"), "Notachampion");
/// ```
pub fn normalize_champion_id(raw: &str) -> String {
    let lowered: String = raw
        .trim()
        .chars()
        .filter(|c| !is_separator(*c))
        .flat_map(char::to_lowercase)
        .collect();

    if let Some(canonical) = CHAMPION_ALIASES.get(lowered.as_str()) {
        return (*canonical).to_string();
    }

    let mut chars = lowered.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Canonicalize a rank name (upper-case, with short-hand aliases).
pub fn normalize_rank(raw: &str) -> String {
    let upper = raw.trim().to_uppercase();
    match RANK_ALIASES.get(upper.as_str()) {
        Some(canonical) => (*canonical).to_string(),
        None => upper,
    }
}

/// Canonicalize a region (lower-case, platform ids folded onto region names).
pub fn normalize_region(raw: &str) -> String {
    let lower = raw.trim().to_lowercase();
    match REGION_ALIASES.get(lower.as_str()) {
        Some(canonical) => (*canonical).to_string(),
        None => lower,
    }
}

/// Canonicalize a role. Unknown roles are kept, lower-cased.
pub fn normalize_role(raw: &str) -> String {
    let lower = raw.trim().to_lowercase();
    match ROLE_ALIASES.get(lower.as_str()) {
        Some(canonical) => (*canonical).to_string(),
        None => lower,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_capitalization() {
        assert_eq!(normalize_champion_id("khazix"), "Khazix");
        assert_eq!(normalize_champion_id("Ahri"), "Ahri");
        assert_eq!(normalize_champion_id("AHRI"), "Ahri");
        assert_eq!(normalize_champion_id("notachampion"), "Notachampion");
    }

    #[test]
    fn test_alias_table() {
        assert_eq!(normalize_champion_id("leesin"), "LeeSin");
        assert_eq!(normalize_champion_id("Lee Sin"), "LeeSin");
        assert_eq!(normalize_champion_id("wukong"), "MonkeyKing");
        assert_eq!(normalize_champion_id("Dr. Mundo"), "DrMundo");
        assert_eq!(normalize_champion_id("jarvaniv"), "JarvanIV");
        assert_eq!(normalize_champion_id("KSANTE"), "KSante");
    }

    #[test]
    fn test_degenerate_inputs() {
        assert_eq!(normalize_champion_id(""), "");
        assert_eq!(normalize_champion_id("   "), "");
        assert_eq!(normalize_champion_id("*"), "*");
    }

    #[test]
    fn test_idempotent() {
        for raw in ["khazix", "MonkeyKing", "kai'sa", "TwistedFate", "zed"] {
            let once = normalize_champion_id(raw);
            assert_eq!(normalize_champion_id(&once), once);
        }
    }

    #[test]
    fn test_rank_region_role() {
        assert_eq!(normalize_rank("gold"), "GOLD");
        assert_eq!(normalize_rank("plat"), "PLATINUM");
        assert_eq!(normalize_region("EUW1"), "euw");
        assert_eq!(normalize_region("NA"), "na");
        assert_eq!(normalize_region("la2"), "las");
        assert_eq!(normalize_role("BOTTOM"), "adc");
        assert_eq!(normalize_role("Mid"), "mid");
        assert_eq!(normalize_role("roamer"), "roamer");
    }
}
