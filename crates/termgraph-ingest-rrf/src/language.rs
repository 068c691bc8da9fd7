//! ISO 639-2 (three-letter) to ISO 639-1 (two-letter) language codes.
//!
//! Atom records carry three-letter codes; literals are tagged with two-letter
//! ones. An unknown code is a hard error at the call site: it means this table
//! is stale relative to the corpus.

/// Map a three-letter code (bibliographic or terminologic form) to two letters.
pub fn two_letter(code: &str) -> Option<&'static str> {
    let short = match code {
        "ABK" => "ab",
        "AAR" => "aa",
        "AFR" => "af",
        "ALB" | "SQI" => "sq",
        "AMH" => "am",
        "ARA" => "ar",
        "ARG" => "an",
        "ARM" | "HYE" => "hy",
        "ASM" => "as",
        "AVE" => "ae",
        "AYM" => "ay",
        "AZE" => "az",
        "BAK" => "ba",
        "BAQ" | "EUS" => "eu",
        "BEL" => "be",
        "BEN" => "bn",
        "BIH" => "bh",
        "BIS" => "bi",
        "BOS" => "bs",
        "BRE" => "br",
        "BUL" => "bg",
        "BUR" | "MYA" => "my",
        "CAT" => "ca",
        "CHA" => "ch",
        "CHE" => "ce",
        "CHI" | "ZHO" => "zh",
        "CHU" => "cu",
        "CHV" => "cv",
        "COR" => "kw",
        "COS" => "co",
        "SCR" | "HRV" => "hr",
        "CZE" | "CES" => "cs",
        "DAN" => "da",
        "DIV" => "dv",
        "DUT" | "NLD" => "nl",
        "DZO" => "dz",
        "ENG" => "en",
        "EPO" => "eo",
        "EST" => "et",
        "FAO" => "fo",
        "FIJ" => "fj",
        "FIN" => "fi",
        "FRE" | "FRA" => "fr",
        "GLA" => "gd",
        "GLG" => "gl",
        "GEO" | "KAT" => "ka",
        "GER" | "DEU" => "de",
        "GRE" | "ELL" => "el",
        "GRN" => "gn",
        "GUJ" => "gu",
        "HAT" => "ht",
        "HAU" => "ha",
        "HEB" => "he",
        "HER" => "hz",
        "HIN" => "hi",
        "HMO" => "ho",
        "HUN" => "hu",
        "ICE" | "ISL" => "is",
        "IDO" => "io",
        "IND" => "id",
        "INA" => "ia",
        "ILE" => "ie",
        "IKU" => "iu",
        "IPK" => "ik",
        "GLE" => "ga",
        "ITA" => "it",
        "JPN" => "ja",
        "JAV" => "jv",
        "KAL" => "kl",
        "KAN" => "kn",
        "KAS" => "ks",
        "KAZ" => "kk",
        "KHM" => "km",
        "KIK" => "ki",
        "KIN" => "rw",
        "KIR" => "ky",
        "KOM" => "kv",
        "KOR" => "ko",
        "KUA" => "kj",
        "KUR" => "ku",
        "LAO" => "lo",
        "LAT" => "la",
        "LAV" => "lv",
        "LIM" => "li",
        "LIN" => "ln",
        "LIT" => "lt",
        "LTZ" => "lb",
        "MAC" | "MKD" => "mk",
        "MLG" => "mg",
        "MAY" | "MSA" => "ms",
        "MAL" => "ml",
        "MLT" => "mt",
        "GLV" => "gv",
        "MAO" | "MRI" => "mi",
        "MAR" => "mr",
        "MAH" => "mh",
        "MOL" => "mo",
        "MON" => "mn",
        "NAU" => "na",
        "NAV" => "nv",
        "NDE" => "nd",
        "NBL" => "nr",
        "NDO" => "ng",
        "NEP" => "ne",
        "SME" => "se",
        "NOR" => "no",
        "NOB" => "nb",
        "NNO" => "nn",
        "NYA" => "ny",
        "OCI" => "oc",
        "ORI" => "or",
        "ORM" => "om",
        "OSS" => "os",
        "PLI" => "pi",
        "PAN" => "pa",
        "PER" | "FAS" => "fa",
        "POL" => "pl",
        "POR" => "pt",
        "PUS" => "ps",
        "QUE" => "qu",
        "ROH" => "rm",
        "RUM" | "RON" => "ro",
        "RUN" => "rn",
        "RUS" => "ru",
        "SMO" => "sm",
        "SAG" => "sg",
        "SAN" => "sa",
        "SRD" => "sc",
        "SCC" | "SRP" => "sr",
        "SNA" => "sn",
        "III" => "ii",
        "SND" => "sd",
        "SIN" => "si",
        "SLO" | "SLK" => "sk",
        "SLV" => "sl",
        "SOM" => "so",
        "SOT" => "st",
        "SPA" => "es",
        "SUN" => "su",
        "SWA" => "sw",
        "SSW" => "ss",
        "SWE" => "sv",
        "TGL" => "tl",
        "TAH" => "ty",
        "TGK" => "tg",
        "TAM" => "ta",
        "TAT" => "tt",
        "TEL" => "te",
        "THA" => "th",
        "TIB" | "BOD" => "bo",
        "TIR" => "ti",
        "TON" => "to",
        "TSO" => "ts",
        "TSN" => "tn",
        "TUR" => "tr",
        "TUK" => "tk",
        "TWI" => "tw",
        "UIG" => "ug",
        "UKR" => "uk",
        "URD" => "ur",
        "UZB" => "uz",
        "VIE" => "vi",
        "VOL" => "vo",
        "WLN" => "wa",
        "WEL" | "CYM" => "cy",
        "FRY" => "fy",
        "WOL" => "wo",
        "XHO" => "xh",
        "YID" => "yi",
        "YOR" => "yo",
        "ZHA" => "za",
        "ZUL" => "zu",
        _ => return None,
    };
    Some(short)
}
