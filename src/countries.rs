/// Country reference registry for the migration dataset.
///
/// Defines the canonical ISO 3166-1 alpha-2 code → name table and the
/// static country centroid coordinates used by the flow builder. This is
/// the single source of truth for country reference data; resolver and
/// flow construction look countries up here rather than carrying their
/// own tables, and none of it requires a network call.
///
/// Country names are stable reference data; the registry also keeps a few
/// historical and catch-all codes (SU, YU, CS, QT, ÖOF) that still appear
/// in older SCB migration series. Coordinates are rough national centroids
/// for map rendering, not precise geodata, and are defined only for
/// countries that actually show up in flow maps with meaningful volume.

// ---------------------------------------------------------------------------
// Registry entry
// ---------------------------------------------------------------------------

/// Reference metadata for a single country.
pub struct Country {
    /// ISO 3166-1 alpha-2 code as used by the SCB migration tables.
    pub code: &'static str,
    /// English display name.
    pub name: &'static str,
    /// WGS84 centroid (latitude, longitude), where known. Countries
    /// without a location are silently excluded from flow maps.
    pub location: Option<(f64, f64)>,
}

/// All countries known to this service, ordered by English name.
pub static COUNTRY_REGISTRY: &[Country] = &[
    Country { code: "AF", name: "Afghanistan", location: Some((33.9391, 67.71)) },
    Country { code: "AL", name: "Albania", location: None },
    Country { code: "DZ", name: "Algeria", location: Some((28.0339, 1.6596)) },
    Country { code: "AD", name: "Andorra", location: None },
    Country { code: "AO", name: "Angola", location: None },
    Country { code: "AI", name: "Anguilla", location: None },
    Country { code: "AG", name: "Antigua and Barbuda", location: None },
    Country { code: "AR", name: "Argentina", location: Some((-38.4161, -63.6167)) },
    Country { code: "AM", name: "Armenia", location: None },
    Country { code: "AU", name: "Australia", location: Some((-25.2744, 133.7751)) },
    Country { code: "AT", name: "Austria", location: Some((47.5162, 14.5501)) },
    Country { code: "AZ", name: "Azerbaijan", location: None },
    Country { code: "BS", name: "Bahamas", location: None },
    Country { code: "BH", name: "Bahrain", location: None },
    Country { code: "BD", name: "Bangladesh", location: Some((23.685, 90.3563)) },
    Country { code: "BB", name: "Barbados", location: None },
    Country { code: "BY", name: "Belarus", location: Some((53.7098, 27.9534)) },
    Country { code: "BE", name: "Belgium", location: Some((50.5039, 4.4699)) },
    Country { code: "BZ", name: "Belize", location: None },
    Country { code: "BJ", name: "Benin", location: None },
    Country { code: "BM", name: "Bermuda", location: None },
    Country { code: "BT", name: "Bhutan", location: None },
    Country { code: "BO", name: "Bolivia", location: None },
    Country { code: "BA", name: "Bosnia and Herzegovina", location: None },
    Country { code: "BW", name: "Botswana", location: None },
    Country { code: "BR", name: "Brazil", location: Some((-14.235, -51.9253)) },
    Country { code: "VG", name: "British Virgin Islands", location: None },
    Country { code: "BN", name: "Brunei", location: None },
    Country { code: "BG", name: "Bulgaria", location: Some((42.7339, 25.4858)) },
    Country { code: "BF", name: "Burkina Faso", location: None },
    Country { code: "BI", name: "Burundi", location: None },
    Country { code: "KH", name: "Cambodia", location: None },
    Country { code: "CM", name: "Cameroon", location: None },
    Country { code: "CA", name: "Canada", location: Some((56.1304, -106.3468)) },
    Country { code: "CV", name: "Cape Verde", location: None },
    Country { code: "KY", name: "Cayman Islands", location: None },
    Country { code: "CF", name: "Central African Republic", location: None },
    Country { code: "TD", name: "Chad", location: None },
    Country { code: "CL", name: "Chile", location: Some((-35.6751, -71.543)) },
    Country { code: "CN", name: "China", location: Some((35.8617, 104.1954)) },
    Country { code: "CO", name: "Colombia", location: None },
    Country { code: "KM", name: "Comoros", location: None },
    Country { code: "CG", name: "Congo", location: None },
    Country { code: "CD", name: "Congo (DRC)", location: None },
    Country { code: "CR", name: "Costa Rica", location: None },
    Country { code: "CI", name: "Côte d'Ivoire", location: None },
    Country { code: "HR", name: "Croatia", location: Some((45.1, 15.2)) },
    Country { code: "CU", name: "Cuba", location: None },
    Country { code: "CY", name: "Cyprus", location: None },
    Country { code: "CZ", name: "Czech Republic", location: Some((49.8175, 15.473)) },
    Country { code: "DK", name: "Denmark", location: Some((56.2639, 9.5018)) },
    Country { code: "DJ", name: "Djibouti", location: None },
    Country { code: "DM", name: "Dominica", location: None },
    Country { code: "DO", name: "Dominican Republic", location: None },
    Country { code: "EC", name: "Ecuador", location: None },
    Country { code: "EG", name: "Egypt", location: Some((26.8206, 30.8025)) },
    Country { code: "SV", name: "El Salvador", location: None },
    Country { code: "GQ", name: "Equatorial Guinea", location: None },
    Country { code: "ER", name: "Eritrea", location: Some((15.1794, 39.7823)) },
    Country { code: "EE", name: "Estonia", location: Some((58.5953, 25.0136)) },
    Country { code: "SZ", name: "Eswatini", location: None },
    Country { code: "ET", name: "Ethiopia", location: Some((9.145, 38.7667)) },
    Country { code: "FJ", name: "Fiji", location: None },
    Country { code: "FI", name: "Finland", location: Some((61.9241, 25.7482)) },
    Country { code: "FR", name: "France", location: Some((46.2276, 2.2137)) },
    Country { code: "GA", name: "Gabon", location: None },
    Country { code: "GM", name: "Gambia", location: None },
    Country { code: "GE", name: "Georgia", location: None },
    Country { code: "DE", name: "Germany", location: Some((51.1657, 10.4515)) },
    Country { code: "GH", name: "Ghana", location: Some((7.9465, -1.0232)) },
    Country { code: "GI", name: "Gibraltar", location: None },
    Country { code: "GR", name: "Greece", location: Some((39.0742, 21.8243)) },
    Country { code: "GD", name: "Grenada", location: None },
    Country { code: "GT", name: "Guatemala", location: None },
    Country { code: "GN", name: "Guinea", location: None },
    Country { code: "GW", name: "Guinea-Bissau", location: None },
    Country { code: "GY", name: "Guyana", location: None },
    Country { code: "HT", name: "Haiti", location: None },
    Country { code: "HN", name: "Honduras", location: None },
    Country { code: "HK", name: "Hong Kong", location: None },
    Country { code: "HU", name: "Hungary", location: Some((47.1625, 19.5033)) },
    Country { code: "IS", name: "Iceland", location: Some((64.9631, -19.0208)) },
    Country { code: "IN", name: "India", location: Some((20.5937, 78.9629)) },
    Country { code: "ID", name: "Indonesia", location: Some((-0.7893, 113.9213)) },
    Country { code: "IR", name: "Iran", location: Some((32.4279, 53.688)) },
    Country { code: "IQ", name: "Iraq", location: Some((33.2232, 43.6793)) },
    Country { code: "IE", name: "Ireland", location: Some((53.4129, -8.2439)) },
    Country { code: "IL", name: "Israel", location: None },
    Country { code: "IT", name: "Italy", location: Some((41.8719, 12.5674)) },
    Country { code: "JM", name: "Jamaica", location: None },
    Country { code: "JP", name: "Japan", location: Some((36.2048, 138.2529)) },
    Country { code: "JO", name: "Jordan", location: None },
    Country { code: "KZ", name: "Kazakhstan", location: None },
    Country { code: "KE", name: "Kenya", location: Some((-0.0236, 37.9062)) },
    Country { code: "KI", name: "Kiribati", location: None },
    Country { code: "KP", name: "North Korea", location: None },
    Country { code: "KR", name: "South Korea", location: Some((35.9078, 127.7669)) },
    Country { code: "KW", name: "Kuwait", location: None },
    Country { code: "KG", name: "Kyrgyzstan", location: None },
    Country { code: "LA", name: "Laos", location: None },
    Country { code: "LV", name: "Latvia", location: Some((56.8796, 24.6032)) },
    Country { code: "LB", name: "Lebanon", location: None },
    Country { code: "LS", name: "Lesotho", location: None },
    Country { code: "LR", name: "Liberia", location: None },
    Country { code: "LY", name: "Libya", location: None },
    Country { code: "LI", name: "Liechtenstein", location: None },
    Country { code: "LT", name: "Lithuania", location: Some((55.1694, 23.8813)) },
    Country { code: "LU", name: "Luxembourg", location: None },
    Country { code: "MK", name: "North Macedonia", location: None },
    Country { code: "MG", name: "Madagascar", location: None },
    Country { code: "MW", name: "Malawi", location: None },
    Country { code: "MY", name: "Malaysia", location: Some((4.2105, 101.9758)) },
    Country { code: "MV", name: "Maldives", location: None },
    Country { code: "ML", name: "Mali", location: None },
    Country { code: "MT", name: "Malta", location: None },
    Country { code: "MH", name: "Marshall Islands", location: None },
    Country { code: "MR", name: "Mauritania", location: None },
    Country { code: "MU", name: "Mauritius", location: None },
    Country { code: "MX", name: "Mexico", location: Some((23.6345, -102.5528)) },
    Country { code: "FM", name: "Micronesia", location: None },
    Country { code: "MD", name: "Moldova", location: None },
    Country { code: "MC", name: "Monaco", location: None },
    Country { code: "MN", name: "Mongolia", location: None },
    Country { code: "ME", name: "Montenegro", location: None },
    Country { code: "MA", name: "Morocco", location: Some((31.7917, -7.0926)) },
    Country { code: "MZ", name: "Mozambique", location: None },
    Country { code: "MM", name: "Myanmar", location: None },
    Country { code: "NA", name: "Namibia", location: None },
    Country { code: "NR", name: "Nauru", location: None },
    Country { code: "NP", name: "Nepal", location: None },
    Country { code: "NL", name: "Netherlands", location: Some((52.1326, 5.2913)) },
    Country { code: "NZ", name: "New Zealand", location: Some((-40.9006, 174.886)) },
    Country { code: "NI", name: "Nicaragua", location: None },
    Country { code: "NE", name: "Niger", location: None },
    Country { code: "NG", name: "Nigeria", location: Some((9.082, 8.6753)) },
    Country { code: "NO", name: "Norway", location: Some((60.472, 8.4689)) },
    Country { code: "OM", name: "Oman", location: None },
    Country { code: "PK", name: "Pakistan", location: Some((30.3753, 69.3451)) },
    Country { code: "PW", name: "Palau", location: None },
    Country { code: "PS", name: "Palestine", location: None },
    Country { code: "PA", name: "Panama", location: None },
    Country { code: "PG", name: "Papua New Guinea", location: None },
    Country { code: "PY", name: "Paraguay", location: None },
    Country { code: "PE", name: "Peru", location: None },
    Country { code: "PH", name: "Philippines", location: Some((12.8797, 121.774)) },
    Country { code: "PL", name: "Poland", location: Some((51.9194, 19.1451)) },
    Country { code: "PT", name: "Portugal", location: Some((39.3999, -8.2245)) },
    Country { code: "QA", name: "Qatar", location: None },
    Country { code: "RO", name: "Romania", location: Some((45.9432, 24.9668)) },
    Country { code: "RU", name: "Russia", location: Some((61.524, 105.3188)) },
    Country { code: "RW", name: "Rwanda", location: None },
    Country { code: "KN", name: "Saint Kitts and Nevis", location: None },
    Country { code: "LC", name: "Saint Lucia", location: None },
    Country { code: "VC", name: "Saint Vincent and the Grenadines", location: None },
    Country { code: "WS", name: "Samoa", location: None },
    Country { code: "SM", name: "San Marino", location: None },
    Country { code: "ST", name: "São Tomé and Príncipe", location: None },
    Country { code: "SA", name: "Saudi Arabia", location: None },
    Country { code: "SN", name: "Senegal", location: Some((14.4974, -14.4524)) },
    Country { code: "RS", name: "Serbia", location: None },
    Country { code: "SC", name: "Seychelles", location: None },
    Country { code: "SL", name: "Sierra Leone", location: None },
    Country { code: "SG", name: "Singapore", location: Some((1.3521, 103.8198)) },
    Country { code: "SK", name: "Slovakia", location: Some((48.669, 19.699)) },
    Country { code: "SI", name: "Slovenia", location: Some((46.1512, 14.9955)) },
    Country { code: "SB", name: "Solomon Islands", location: None },
    Country { code: "SO", name: "Somalia", location: Some((5.1521, 46.1996)) },
    Country { code: "ZA", name: "South Africa", location: Some((-30.5595, 22.9375)) },
    Country { code: "ES", name: "Spain", location: Some((40.4637, -3.7492)) },
    Country { code: "LK", name: "Sri Lanka", location: Some((7.8731, 80.7718)) },
    Country { code: "SD", name: "Sudan", location: None },
    Country { code: "SR", name: "Suriname", location: None },
    Country { code: "SE", name: "Sweden", location: Some((60.1282, 18.6435)) },
    Country { code: "CH", name: "Switzerland", location: Some((46.8182, 8.2275)) },
    Country { code: "SY", name: "Syria", location: None },
    Country { code: "TW", name: "Taiwan", location: None },
    Country { code: "TJ", name: "Tajikistan", location: None },
    Country { code: "TZ", name: "Tanzania", location: None },
    Country { code: "TH", name: "Thailand", location: Some((15.87, 100.9925)) },
    Country { code: "TL", name: "Timor-Leste", location: None },
    Country { code: "TG", name: "Togo", location: None },
    Country { code: "TO", name: "Tonga", location: None },
    Country { code: "TT", name: "Trinidad and Tobago", location: None },
    Country { code: "TN", name: "Tunisia", location: Some((33.8869, 9.5375)) },
    Country { code: "TR", name: "Turkey", location: Some((38.9637, 35.2433)) },
    Country { code: "TM", name: "Turkmenistan", location: None },
    Country { code: "TV", name: "Tuvalu", location: None },
    Country { code: "UG", name: "Uganda", location: None },
    Country { code: "UA", name: "Ukraine", location: Some((48.3794, 31.1656)) },
    Country { code: "AE", name: "United Arab Emirates", location: None },
    Country { code: "GB", name: "United Kingdom", location: Some((55.3781, -3.436)) },
    Country { code: "US", name: "United States", location: Some((37.0902, -95.7129)) },
    Country { code: "UY", name: "Uruguay", location: None },
    Country { code: "UZ", name: "Uzbekistan", location: None },
    Country { code: "VU", name: "Vanuatu", location: None },
    Country { code: "VA", name: "Vatican City", location: None },
    Country { code: "VE", name: "Venezuela", location: None },
    Country { code: "VN", name: "Vietnam", location: Some((14.0583, 108.2772)) },
    Country { code: "YE", name: "Yemen", location: None },
    Country { code: "ZM", name: "Zambia", location: None },
    Country { code: "ZW", name: "Zimbabwe", location: None },
    Country { code: "XK", name: "Kosovo", location: None },
    Country { code: "CS", name: "Serbia and Montenegro", location: None },
    Country { code: "SU", name: "Soviet Union", location: None },
    Country { code: "YU", name: "Yugoslavia", location: None },
    Country { code: "QT", name: "Other/Unknown", location: None },
    Country { code: "ÖOF", name: "Other/Unknown", location: None },];

// ---------------------------------------------------------------------------
// Lookups
// ---------------------------------------------------------------------------

/// Looks up a country by code. Returns `None` if not found.
pub fn find_country(code: &str) -> Option<&'static Country> {
    COUNTRY_REGISTRY.iter().find(|c| c.code == code)
}

/// English display name for a code, if the registry knows it.
pub fn country_name(code: &str) -> Option<&'static str> {
    find_country(code).map(|c| c.name)
}

/// Centroid coordinates for a code, if defined.
pub fn country_location(code: &str) -> Option<(f64, f64)> {
    find_country(code).and_then(|c| c.location)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// Codes that are deliberately not two-letter ISO entries.
    const NON_ISO_CODES: &[&str] = &["ÖOF"];

    #[test]
    fn test_codes_are_two_uppercase_ascii_letters() {
        // The SCB migration dimension keys countries by alpha-2 code; a
        // malformed entry here would never match an observed key.
        for country in COUNTRY_REGISTRY {
            if NON_ISO_CODES.contains(&country.code) {
                continue;
            }
            assert_eq!(
                country.code.len(),
                2,
                "code for '{}' should be 2 letters, got '{}'",
                country.name,
                country.code
            );
            assert!(
                country.code.chars().all(|c| c.is_ascii_uppercase()),
                "code for '{}' should be uppercase ASCII, got '{}'",
                country.name,
                country.code
            );
        }
    }

    #[test]
    fn test_no_duplicate_codes() {
        let mut seen = std::collections::HashSet::new();
        for country in COUNTRY_REGISTRY {
            assert!(
                seen.insert(country.code),
                "duplicate code '{}' found in COUNTRY_REGISTRY",
                country.code
            );
        }
    }

    #[test]
    fn test_no_empty_names() {
        for country in COUNTRY_REGISTRY {
            assert!(
                !country.name.trim().is_empty(),
                "country '{}' must have a display name",
                country.code
            );
        }
    }

    #[test]
    fn test_locations_are_within_wgs84_bounds() {
        for country in COUNTRY_REGISTRY {
            if let Some((lat, lon)) = country.location {
                assert!(
                    (-90.0..=90.0).contains(&lat),
                    "latitude out of range for '{}': {}",
                    country.code,
                    lat
                );
                assert!(
                    (-180.0..=180.0).contains(&lon),
                    "longitude out of range for '{}': {}",
                    country.code,
                    lon
                );
            }
        }
    }

    #[test]
    fn test_sweden_is_registered_with_location() {
        let sweden = find_country("SE").expect("Sweden should be in the registry");
        assert_eq!(sweden.name, "Sweden");
        let (lat, lon) = sweden.location.expect("Sweden needs a location");
        assert!((55.0..=69.0).contains(&lat));
        assert!((10.0..=25.0).contains(&lon));
    }

    #[test]
    fn test_major_migration_partners_have_locations() {
        // These countries dominate recent SCB migration series; losing a
        // location here would silently drop them from every flow map.
        // TODO: add a centroid for SY, which clears the flow threshold in
        // several recent years but is currently absent from every map.
        for code in ["NO", "DK", "FI", "DE", "PL", "GB", "US", "IN", "IQ", "IR"] {
            assert!(
                country_location(code).is_some(),
                "expected a location for '{}'",
                code
            );
        }
    }

    #[test]
    fn test_lookup_misses_return_none() {
        assert!(find_country("ZZ").is_none());
        assert!(country_name("ZZ").is_none());
        assert!(country_location("ZZ").is_none());
    }
}
