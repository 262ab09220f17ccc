//! Static lookup tables: pure data, loaded once, read-only thereafter.
//! Safe for concurrent access from any number of tasks.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

/// Literal substring replacements applied before comma-splitting a raw
/// location string. Region names that themselves contain a comma would
/// otherwise be corrupted by the tokenizer.
pub const COMMA_STATE_SUBSTITUTIONS: &[(&str, &str)] = &[
    ("washington, d.c.", "washington dc"),
    ("washington, dc", "washington dc"),
    ("washington d.c.", "washington dc"),
];

/// Countries that report state-equivalent data at the second administrative
/// level instead of the first. A policy table, overridable per country.
const ADMIN2_COUNTRIES: &[&str] = &["United Kingdom"];

pub fn uses_admin2(country: &str) -> bool {
    ADMIN2_COUNTRIES.contains(&country)
}

/// Countries whose state codes are qualified as `"CC-SS"` rather than
/// collapsed to the bare country code.
const COUNTRIES_WITH_STATES: &[&str] = &["GB", "US"];

pub fn has_state_codes(country_code: &str) -> bool {
    COUNTRIES_WITH_STATES.contains(&country_code)
}

/// Full lowercase US state name (including common abbreviated variants) to
/// its 2-letter code.
static US_STATES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("alabama", "AL"),
        ("alaska", "AK"),
        ("arizona", "AZ"),
        ("arkansas", "AR"),
        ("california", "CA"),
        ("colorado", "CO"),
        ("connecticut", "CT"),
        ("delaware", "DE"),
        ("florida", "FL"),
        ("georgia", "GA"),
        ("hawaii", "HI"),
        ("idaho", "ID"),
        ("illinois", "IL"),
        ("indiana", "IN"),
        ("iowa", "IA"),
        ("kansas", "KS"),
        ("kentucky", "KY"),
        ("louisiana", "LA"),
        ("maine", "ME"),
        ("maryland", "MD"),
        ("massachusetts", "MA"),
        ("michigan", "MI"),
        ("minnesota", "MN"),
        ("mississippi", "MS"),
        ("missouri", "MO"),
        ("montana", "MT"),
        ("nebraska", "NE"),
        ("nevada", "NV"),
        ("new hampshire", "NH"),
        ("new jersey", "NJ"),
        ("new mexico", "NM"),
        ("new york", "NY"),
        ("north carolina", "NC"),
        ("n carolina", "NC"),
        ("north dakota", "ND"),
        ("n dakota", "ND"),
        ("ohio", "OH"),
        ("oklahoma", "OK"),
        ("oregon", "OR"),
        ("pennsylvania", "PA"),
        ("rhode island", "RI"),
        ("south carolina", "SC"),
        ("s carolina", "SC"),
        ("south dakota", "SD"),
        ("s dakota", "SD"),
        ("tennessee", "TN"),
        ("texas", "TX"),
        ("utah", "UT"),
        ("vermont", "VT"),
        ("virginia", "VA"),
        ("washington", "WA"),
        ("west virginia", "WV"),
        ("w virginia", "WV"),
        ("wisconsin", "WI"),
        ("wyoming", "WY"),
    ])
});

pub fn us_state_code(name: &str) -> Option<&'static str> {
    US_STATES.get(name).copied()
}

/// IANA zone identifiers covering the United States. A post whose profile
/// timezone falls in this set (or is unset) is treated as "in-US" context.
static US_TIMEZONES: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    HashSet::from([
        "Pacific/Honolulu",
        "America/Juneau",
        "America/Phoenix",
        "America/Los_Angeles",
        "America/Denver",
        "America/Chicago",
        "America/New_York",
        "America/Indiana/Indianapolis",
    ])
});

pub fn is_us_timezone(zone: &str) -> bool {
    US_TIMEZONES.contains(zone)
}

/// Vendor timezone display names (Rails-style, as supplied by the social
/// network) to IANA zone identifiers.
static TIMEZONE_ALIASES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("International Date Line West", "Pacific/Midway"),
        ("Midway Island", "Pacific/Midway"),
        ("American Samoa", "Pacific/Pago_Pago"),
        ("Hawaii", "Pacific/Honolulu"),
        ("Alaska", "America/Juneau"),
        ("Pacific Time (US & Canada)", "America/Los_Angeles"),
        ("Tijuana", "America/Tijuana"),
        ("Mountain Time (US & Canada)", "America/Denver"),
        ("Arizona", "America/Phoenix"),
        ("Chihuahua", "America/Chihuahua"),
        ("Mazatlan", "America/Mazatlan"),
        ("Central Time (US & Canada)", "America/Chicago"),
        ("Saskatchewan", "America/Regina"),
        ("Guadalajara", "America/Mexico_City"),
        ("Mexico City", "America/Mexico_City"),
        ("Monterrey", "America/Monterrey"),
        ("Central America", "America/Guatemala"),
        ("Eastern Time (US & Canada)", "America/New_York"),
        ("Indiana (East)", "America/Indiana/Indianapolis"),
        ("Bogota", "America/Bogota"),
        ("Lima", "America/Lima"),
        ("Quito", "America/Lima"),
        ("Atlantic Time (Canada)", "America/Halifax"),
        ("Caracas", "America/Caracas"),
        ("La Paz", "America/La_Paz"),
        ("Santiago", "America/Santiago"),
        ("Newfoundland", "America/St_Johns"),
        ("Brasilia", "America/Sao_Paulo"),
        ("Buenos Aires", "America/Argentina/Buenos_Aires"),
        ("Georgetown", "America/Guyana"),
        ("Greenland", "America/Godthab"),
        ("Mid-Atlantic", "Atlantic/South_Georgia"),
        ("Azores", "Atlantic/Azores"),
        ("Cape Verde Is.", "Atlantic/Cape_Verde"),
        ("Dublin", "Europe/Dublin"),
        ("Edinburgh", "Europe/London"),
        ("Lisbon", "Europe/Lisbon"),
        ("London", "Europe/London"),
        ("Casablanca", "Africa/Casablanca"),
        ("Monrovia", "Africa/Monrovia"),
        ("UTC", "Etc/UTC"),
        ("Belgrade", "Europe/Belgrade"),
        ("Bratislava", "Europe/Bratislava"),
        ("Budapest", "Europe/Budapest"),
        ("Ljubljana", "Europe/Ljubljana"),
        ("Prague", "Europe/Prague"),
        ("Sarajevo", "Europe/Sarajevo"),
        ("Skopje", "Europe/Skopje"),
        ("Warsaw", "Europe/Warsaw"),
        ("Zagreb", "Europe/Zagreb"),
        ("Brussels", "Europe/Brussels"),
        ("Copenhagen", "Europe/Copenhagen"),
        ("Madrid", "Europe/Madrid"),
        ("Paris", "Europe/Paris"),
        ("Amsterdam", "Europe/Amsterdam"),
        ("Berlin", "Europe/Berlin"),
        ("Bern", "Europe/Berlin"),
        ("Rome", "Europe/Rome"),
        ("Stockholm", "Europe/Stockholm"),
        ("Vienna", "Europe/Vienna"),
        ("West Central Africa", "Africa/Algiers"),
        ("Bucharest", "Europe/Bucharest"),
        ("Cairo", "Africa/Cairo"),
        ("Helsinki", "Europe/Helsinki"),
        ("Kyiv", "Europe/Kiev"),
        ("Riga", "Europe/Riga"),
        ("Sofia", "Europe/Sofia"),
        ("Tallinn", "Europe/Tallinn"),
        ("Vilnius", "Europe/Vilnius"),
        ("Athens", "Europe/Athens"),
        ("Istanbul", "Europe/Istanbul"),
        ("Minsk", "Europe/Minsk"),
        ("Jerusalem", "Asia/Jerusalem"),
        ("Harare", "Africa/Harare"),
        ("Pretoria", "Africa/Johannesburg"),
        ("Moscow", "Europe/Moscow"),
        ("St. Petersburg", "Europe/Moscow"),
        ("Volgograd", "Europe/Moscow"),
        ("Kuwait", "Asia/Kuwait"),
        ("Riyadh", "Asia/Riyadh"),
        ("Nairobi", "Africa/Nairobi"),
        ("Baghdad", "Asia/Baghdad"),
        ("Tehran", "Asia/Tehran"),
        ("Abu Dhabi", "Asia/Muscat"),
        ("Muscat", "Asia/Muscat"),
        ("Baku", "Asia/Baku"),
        ("Tbilisi", "Asia/Tbilisi"),
        ("Yerevan", "Asia/Yerevan"),
        ("Kabul", "Asia/Kabul"),
        ("Ekaterinburg", "Asia/Yekaterinburg"),
        ("Islamabad", "Asia/Karachi"),
        ("Karachi", "Asia/Karachi"),
        ("Tashkent", "Asia/Tashkent"),
        ("Chennai", "Asia/Kolkata"),
        ("Kolkata", "Asia/Kolkata"),
        ("Mumbai", "Asia/Kolkata"),
        ("New Delhi", "Asia/Kolkata"),
        ("Kathmandu", "Asia/Kathmandu"),
        ("Astana", "Asia/Dhaka"),
        ("Dhaka", "Asia/Dhaka"),
        ("Sri Jayawardenepura", "Asia/Colombo"),
        ("Almaty", "Asia/Almaty"),
        ("Novosibirsk", "Asia/Novosibirsk"),
        ("Rangoon", "Asia/Rangoon"),
        ("Bangkok", "Asia/Bangkok"),
        ("Hanoi", "Asia/Bangkok"),
        ("Jakarta", "Asia/Jakarta"),
        ("Krasnoyarsk", "Asia/Krasnoyarsk"),
        ("Beijing", "Asia/Shanghai"),
        ("Chongqing", "Asia/Chongqing"),
        ("Hong Kong", "Asia/Hong_Kong"),
        ("Urumqi", "Asia/Urumqi"),
        ("Kuala Lumpur", "Asia/Kuala_Lumpur"),
        ("Singapore", "Asia/Singapore"),
        ("Taipei", "Asia/Taipei"),
        ("Perth", "Australia/Perth"),
        ("Irkutsk", "Asia/Irkutsk"),
        ("Ulaan Bataar", "Asia/Ulaanbaatar"),
        ("Seoul", "Asia/Seoul"),
        ("Osaka", "Asia/Tokyo"),
        ("Sapporo", "Asia/Tokyo"),
        ("Tokyo", "Asia/Tokyo"),
        ("Yakutsk", "Asia/Yakutsk"),
        ("Darwin", "Australia/Darwin"),
        ("Adelaide", "Australia/Adelaide"),
        ("Canberra", "Australia/Melbourne"),
        ("Melbourne", "Australia/Melbourne"),
        ("Sydney", "Australia/Sydney"),
        ("Brisbane", "Australia/Brisbane"),
        ("Hobart", "Australia/Hobart"),
        ("Vladivostok", "Asia/Vladivostok"),
        ("Guam", "Pacific/Guam"),
        ("Port Moresby", "Pacific/Port_Moresby"),
        ("Magadan", "Asia/Magadan"),
        ("Solomon Is.", "Asia/Magadan"),
        ("New Caledonia", "Pacific/Noumea"),
        ("Fiji", "Pacific/Fiji"),
        ("Kamchatka", "Asia/Kamchatka"),
        ("Marshall Is.", "Pacific/Majuro"),
        ("Auckland", "Pacific/Auckland"),
        ("Wellington", "Pacific/Auckland"),
        ("Nuku'alofa", "Pacific/Tongatapu"),
        ("Tokelau Is.", "Pacific/Fakaofo"),
        ("Samoa", "Pacific/Apia"),
    ])
});

pub fn iana_timezone(display_name: &str) -> Option<&'static str> {
    TIMEZONE_ALIASES.get(display_name).copied()
}

/// Upper-case country name (with common aliases) to ISO 3166-1 alpha-2 code.
static COUNTRY_CODES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("ANDORRA", "AD"),
        ("UNITED ARAB EMIRATES", "AE"),
        ("AFGHANISTAN", "AF"),
        ("ANTIGUA AND BARBUDA", "AG"),
        ("ANGUILLA", "AI"),
        ("ALBANIA", "AL"),
        ("ARMENIA", "AM"),
        ("ANGOLA", "AO"),
        ("ANTARCTICA", "AQ"),
        ("ARGENTINA", "AR"),
        ("AMERICAN SAMOA", "AS"),
        ("AUSTRIA", "AT"),
        ("AUSTRALIA", "AU"),
        ("ARUBA", "AW"),
        ("ALAND ISLANDS", "AX"),
        ("AZERBAIJAN", "AZ"),
        ("BOSNIA AND HERZEGOVINA", "BA"),
        ("BARBADOS", "BB"),
        ("BANGLADESH", "BD"),
        ("BELGIUM", "BE"),
        ("BURKINA FASO", "BF"),
        ("BULGARIA", "BG"),
        ("BAHRAIN", "BH"),
        ("BURUNDI", "BI"),
        ("BENIN", "BJ"),
        ("SAINT BARTHELEMY", "BL"),
        ("BERMUDA", "BM"),
        ("BRUNEI", "BN"),
        ("BOLIVIA", "BO"),
        ("SAINT EUSTATIUS AND SABA", "BQ"),
        ("BONAIRE", "BQ"),
        ("BRAZIL", "BR"),
        ("BAHAMAS", "BS"),
        ("BHUTAN", "BT"),
        ("BOUVET ISLAND", "BV"),
        ("BOTSWANA", "BW"),
        ("BELARUS", "BY"),
        ("BELIZE", "BZ"),
        ("CANADA", "CA"),
        ("COCOS ISLANDS", "CC"),
        ("DEMOCRATIC REPUBLIC OF THE CONGO", "CD"),
        ("CENTRAL AFRICAN REPUBLIC", "CF"),
        ("REPUBLIC OF THE CONGO", "CG"),
        ("SWITZERLAND", "CH"),
        ("IVORY COAST", "CI"),
        ("COOK ISLANDS", "CK"),
        ("CHILE", "CL"),
        ("CAMEROON", "CM"),
        ("CHINA", "CN"),
        ("COLOMBIA", "CO"),
        ("COSTA RICA", "CR"),
        ("CUBA", "CU"),
        ("CAPE VERDE", "CV"),
        ("CURACAO", "CW"),
        ("CHRISTMAS ISLAND", "CX"),
        ("CYPRUS", "CY"),
        ("CZECH REPUBLIC", "CZ"),
        ("GERMANY", "DE"),
        ("DJIBOUTI", "DJ"),
        ("DENMARK", "DK"),
        ("DOMINICA", "DM"),
        ("DOMINICAN REPUBLIC", "DO"),
        ("ALGERIA", "DZ"),
        ("ECUADOR", "EC"),
        ("ESTONIA", "EE"),
        ("EGYPT", "EG"),
        ("WESTERN SAHARA", "EH"),
        ("ERITREA", "ER"),
        ("SPAIN", "ES"),
        ("ETHIOPIA", "ET"),
        ("FINLAND", "FI"),
        ("FIJI", "FJ"),
        ("FALKLAND ISLANDS", "FK"),
        ("MICRONESIA", "FM"),
        ("FAROE ISLANDS", "FO"),
        ("FRANCE", "FR"),
        ("GABON", "GA"),
        ("GREAT BRITAIN", "GB"),
        ("GB", "GB"),
        ("UNITED KINGDOM", "GB"),
        ("UK", "GB"),
        ("GRENADA", "GD"),
        ("GEORGIA", "GE"),
        ("FRENCH GUIANA", "GF"),
        ("GUERNSEY", "GG"),
        ("GHANA", "GH"),
        ("GIBRALTAR", "GI"),
        ("GREENLAND", "GL"),
        ("GAMBIA", "GM"),
        ("GUINEA", "GN"),
        ("GUADELOUPE", "GP"),
        ("EQUATORIAL GUINEA", "GQ"),
        ("GREECE", "GR"),
        ("SOUTH GEORGIA AND THE SOUTH SANDWICH ISLANDS", "GS"),
        ("GUATEMALA", "GT"),
        ("GUAM", "GU"),
        ("GUINEA-BISSAU", "GW"),
        ("GUYANA", "GY"),
        ("HONG KONG", "HK"),
        ("HEARD ISLAND AND MCDONALD ISLANDS", "HM"),
        ("HONDURAS", "HN"),
        ("CROATIA", "HR"),
        ("HAITI", "HT"),
        ("HUNGARY", "HU"),
        ("INDONESIA", "ID"),
        ("IRELAND", "IE"),
        ("ISRAEL", "IL"),
        ("ISLE OF MAN", "IM"),
        ("INDIA", "IN"),
        ("BRITISH INDIAN OCEAN TERRITORY", "IO"),
        ("IRAQ", "IQ"),
        ("IRAN", "IR"),
        ("ICELAND", "IS"),
        ("ITALY", "IT"),
        ("JERSEY", "JE"),
        ("JAMAICA", "JM"),
        ("JORDAN", "JO"),
        ("JAPAN", "JP"),
        ("KENYA", "KE"),
        ("KYRGYZSTAN", "KG"),
        ("CAMBODIA", "KH"),
        ("KIRIBATI", "KI"),
        ("COMOROS", "KM"),
        ("SAINT KITTS AND NEVIS", "KN"),
        ("NORTH KOREA", "KP"),
        ("SOUTH KOREA", "KR"),
        ("KOSOVO", "XK"),
        ("KUWAIT", "KW"),
        ("CAYMAN ISLANDS", "KY"),
        ("KAZAKHSTAN", "KZ"),
        ("LAOS", "LA"),
        ("LEBANON", "LB"),
        ("SAINT LUCIA", "LC"),
        ("LIECHTENSTEIN", "LI"),
        ("SRI LANKA", "LK"),
        ("LIBERIA", "LR"),
        ("LESOTHO", "LS"),
        ("LITHUANIA", "LT"),
        ("LUXEMBOURG", "LU"),
        ("LATVIA", "LV"),
        ("LIBYA", "LY"),
        ("MOROCCO", "MA"),
        ("MONACO", "MC"),
        ("MOLDOVA", "MD"),
        ("MONTENEGRO", "ME"),
        ("SAINT MARTIN", "MF"),
        ("MADAGASCAR", "MG"),
        ("MARSHALL ISLANDS", "MH"),
        ("MACEDONIA", "MK"),
        ("MALI", "ML"),
        ("MYANMAR", "MM"),
        ("MONGOLIA", "MN"),
        ("MACAO", "MO"),
        ("NORTHERN MARIANA ISLANDS", "MP"),
        ("MARTINIQUE", "MQ"),
        ("MAURITANIA", "MR"),
        ("MONTSERRAT", "MS"),
        ("MALTA", "MT"),
        ("MAURITIUS", "MU"),
        ("MALDIVES", "MV"),
        ("MALAWI", "MW"),
        ("MEXICO", "MX"),
        ("MALAYSIA", "MY"),
        ("MOZAMBIQUE", "MZ"),
        ("NAMIBIA", "NA"),
        ("NEW CALEDONIA", "NC"),
        ("NIGER", "NE"),
        ("NORFOLK ISLAND", "NF"),
        ("NIGERIA", "NG"),
        ("NICARAGUA", "NI"),
        ("NETHERLANDS", "NL"),
        ("NORWAY", "NO"),
        ("NEPAL", "NP"),
        ("NAURU", "NR"),
        ("NIUE", "NU"),
        ("NEW ZEALAND", "NZ"),
        ("OMAN", "OM"),
        ("PANAMA", "PA"),
        ("PERU", "PE"),
        ("FRENCH POLYNESIA", "PF"),
        ("PAPUA NEW GUINEA", "PG"),
        ("PHILIPPINES", "PH"),
        ("PAKISTAN", "PK"),
        ("POLAND", "PL"),
        ("SAINT PIERRE AND MIQUELON", "PM"),
        ("PITCAIRN", "PN"),
        ("PUERTO RICO", "PR"),
        ("PALESTINIAN TERRITORY", "PS"),
        ("PORTUGAL", "PT"),
        ("PALAU", "PW"),
        ("PARAGUAY", "PY"),
        ("QATAR", "QA"),
        ("REUNION", "RE"),
        ("ROMANIA", "RO"),
        ("SERBIA", "RS"),
        ("RUSSIA", "RU"),
        ("RWANDA", "RW"),
        ("SAUDI ARABIA", "SA"),
        ("SOLOMON ISLANDS", "SB"),
        ("SEYCHELLES", "SC"),
        ("SUDAN", "SD"),
        ("SOUTH SUDAN", "SS"),
        ("SWEDEN", "SE"),
        ("SINGAPORE", "SG"),
        ("SAINT HELENA", "SH"),
        ("SLOVENIA", "SI"),
        ("SVALBARD AND JAN MAYEN", "SJ"),
        ("SLOVAKIA", "SK"),
        ("SIERRA LEONE", "SL"),
        ("SAN MARINO", "SM"),
        ("SENEGAL", "SN"),
        ("SOMALIA", "SO"),
        ("SURINAME", "SR"),
        ("SAO TOME AND PRINCIPE", "ST"),
        ("EL SALVADOR", "SV"),
        ("SINT MAARTEN", "SX"),
        ("SYRIA", "SY"),
        ("SWAZILAND", "SZ"),
        ("TURKS AND CAICOS ISLANDS", "TC"),
        ("CHAD", "TD"),
        ("FRENCH SOUTHERN TERRITORIES", "TF"),
        ("TOGO", "TG"),
        ("THAILAND", "TH"),
        ("TAJIKISTAN", "TJ"),
        ("TOKELAU", "TK"),
        ("EAST TIMOR", "TL"),
        ("TURKMENISTAN", "TM"),
        ("TUNISIA", "TN"),
        ("TONGA", "TO"),
        ("TURKEY", "TR"),
        ("TRINIDAD AND TOBAGO", "TT"),
        ("TUVALU", "TV"),
        ("TAIWAN", "TW"),
        ("TANZANIA", "TZ"),
        ("UKRAINE", "UA"),
        ("UGANDA", "UG"),
        ("UNITED STATES MINOR OUTLYING ISLANDS", "UM"),
        ("UNITED STATES", "US"),
        ("UNITED STATES OF AMERICA", "US"),
        ("US", "US"),
        ("USA", "US"),
        ("U.S.A.", "US"),
        ("URUGUAY", "UY"),
        ("UZBEKISTAN", "UZ"),
        ("VATICAN", "VA"),
        ("SAINT VINCENT AND THE GRENADINES", "VC"),
        ("VENEZUELA", "VE"),
        ("BRITISH VIRGIN ISLANDS", "VG"),
        ("U.S. VIRGIN ISLANDS", "VI"),
        ("VIETNAM", "VN"),
        ("VANUATU", "VU"),
        ("WALLIS AND FUTUNA", "WF"),
        ("SAMOA", "WS"),
        ("YEMEN", "YE"),
        ("MAYOTTE", "YT"),
        ("SOUTH AFRICA", "ZA"),
        ("ZAMBIA", "ZM"),
        ("ZIMBABWE", "ZW"),
        ("SERBIA AND MONTENEGRO", "CS"),
        ("NETHERLANDS ANTILLES", "AN"),
    ])
});

pub fn country_code(name: &str) -> Option<&'static str> {
    COUNTRY_CODES.get(name).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_names_include_abbreviated_variants() {
        assert_eq!(us_state_code("new york"), Some("NY"));
        assert_eq!(us_state_code("n carolina"), Some("NC"));
        assert_eq!(us_state_code("s dakota"), Some("SD"));
        assert_eq!(us_state_code("New York"), None); // lookups are lowercase
    }

    #[test]
    fn vendor_timezones_map_to_iana() {
        assert_eq!(
            iana_timezone("Eastern Time (US & Canada)"),
            Some("America/New_York")
        );
        assert_eq!(iana_timezone("Wellington"), Some("Pacific/Auckland"));
        assert_eq!(iana_timezone("Narnia"), None);
    }

    #[test]
    fn us_context_zones() {
        assert!(is_us_timezone("America/Chicago"));
        assert!(!is_us_timezone("Europe/London"));
    }

    #[test]
    fn country_aliases_resolve() {
        assert_eq!(country_code("UNITED KINGDOM"), Some("GB"));
        assert_eq!(country_code("UK"), Some("GB"));
        assert_eq!(country_code("U.S.A."), Some("US"));
    }

    #[test]
    fn admin_level_policy() {
        assert!(uses_admin2("United Kingdom"));
        assert!(!uses_admin2("United States"));
        assert!(has_state_codes("US"));
        assert!(has_state_codes("GB"));
        assert!(!has_state_codes("FR"));
    }
}
