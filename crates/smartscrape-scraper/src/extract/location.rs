use std::sync::LazyLock;

use regex::Regex;

/// Location used when no table, TLD, or page pattern identifies one.
pub const INTERNATIONAL: &str = "International";

const DOMAIN_COUNTRIES: &[(&str, &str)] = &[
    ("amazon.com", "United States"),
    ("amazon.co.uk", "United Kingdom"),
    ("amazon.ca", "Canada"),
    ("amazon.de", "Germany"),
    ("amazon.fr", "France"),
    ("amazon.it", "Italy"),
    ("amazon.es", "Spain"),
    ("amazon.in", "India"),
    ("amazon.com.au", "Australia"),
    ("amazon.co.jp", "Japan"),
    ("ebay.co.uk", "United Kingdom"),
    ("ebay.de", "Germany"),
    ("ebay.fr", "France"),
    ("walmart.com", "United States"),
    ("target.com", "United States"),
    ("bestbuy.com", "United States"),
    ("flipkart.com", "India"),
    ("myntra.com", "India"),
    ("snapdeal.com", "India"),
    ("rakuten.co.jp", "Japan"),
    ("mercadolibre.com", "Latin America"),
    ("allegro.pl", "Poland"),
    ("bol.com", "Netherlands"),
    ("cdiscount.com", "France"),
    ("coupang.com", "South Korea"),
    ("takealot.com", "South Africa"),
];

/// Country-code suffixes, longest first so `.com.au` wins over `.au`.
const TLD_COUNTRIES: &[(&str, &str)] = &[
    (".com.au", "Australia"),
    (".com.br", "Brazil"),
    (".com.mx", "Mexico"),
    (".co.uk", "United Kingdom"),
    (".co.jp", "Japan"),
    (".co.kr", "South Korea"),
    (".co.za", "South Africa"),
    (".uk", "United Kingdom"),
    (".de", "Germany"),
    (".fr", "France"),
    (".it", "Italy"),
    (".es", "Spain"),
    (".nl", "Netherlands"),
    (".pl", "Poland"),
    (".ro", "Romania"),
    (".dk", "Denmark"),
    (".no", "Norway"),
    (".fi", "Finland"),
    (".se", "Sweden"),
    (".in", "India"),
    (".ca", "Canada"),
    (".au", "Australia"),
    (".jp", "Japan"),
    (".kr", "South Korea"),
    (".br", "Brazil"),
    (".mx", "Mexico"),
    (".cn", "China"),
];

static LOCATION_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    ["ships from", "sold by", "location", "country"]
        .iter()
        .map(|label| {
            Regex::new(&format!(r"{label}[\s:]+([a-z][a-z ,]*)")).expect("valid location regex")
        })
        .collect()
});

/// Resolves a seller location for a product page.
///
/// Order: known domain, then country-code TLD, then a "ships from" /
/// "sold by" / "location" / "country" phrase in `page_text`, then
/// [`INTERNATIONAL`].
#[must_use]
pub fn resolve_location(host: &str, page_text: &str) -> String {
    let host = host.to_ascii_lowercase();
    if let Some(country) = country_for_domain(&host) {
        return country.to_string();
    }
    if let Some((_, country)) = TLD_COUNTRIES.iter().find(|(tld, _)| host.ends_with(tld)) {
        return (*country).to_string();
    }
    location_from_text(page_text).unwrap_or_else(|| INTERNATIONAL.to_string())
}

fn country_for_domain(host: &str) -> Option<&'static str> {
    DOMAIN_COUNTRIES
        .iter()
        .filter(|(domain, _)| host == *domain || host.ends_with(&format!(".{domain}")))
        .max_by_key(|(domain, _)| domain.len())
        .map(|(_, country)| *country)
}

fn location_from_text(page_text: &str) -> Option<String> {
    let lower = page_text.to_lowercase();
    LOCATION_RES.iter().find_map(|re| {
        let caps = re.captures(&lower)?;
        let raw = caps[1].trim().trim_end_matches(',').trim();
        let len = raw.chars().count();
        (3..50).contains(&len).then(|| title_case(raw))
    })
}

fn title_case(text: &str) -> String {
    text.split(' ')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}
