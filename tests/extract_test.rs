//! Result extraction against saved results pages

mod common;

use common::serp_fixture;
use tripdesk::parser::{detect_format, ResultExtractor, SerpFormat};

fn links(html: &str, max: usize) -> Vec<String> {
    ResultExtractor::new()
        .extract(html, max)
        .into_iter()
        .map(|l| l.link)
        .collect()
}

#[test]
fn test_detects_each_fixture() {
    assert_eq!(detect_format(&serp_fixture("modern")), SerpFormat::Modern);
    assert_eq!(detect_format(&serp_fixture("container")), SerpFormat::Container);
    assert_eq!(detect_format(&serp_fixture("redirect")), SerpFormat::Redirect);
    assert_eq!(detect_format(&serp_fixture("blocked")), SerpFormat::Unknown);
}

#[test]
fn test_modern_page_top_five() {
    let html = serp_fixture("modern");
    let results = ResultExtractor::new().extract(&html, 5);

    assert_eq!(results.len(), 5);
    assert_eq!(
        results.iter().map(|r| r.link.as_str()).collect::<Vec<_>>(),
        vec![
            "https://www.booking.com/region/es/tenerife.es.html",
            "https://www.tripadvisor.es/Hotels-g187479-Tenerife_Canary_Islands-Hotels.html",
            "https://www.webtenerife.com/alojamiento/",
            "https://www.expedia.es/Tenerife-Hoteles.d6051133.Guia-Viajes-Hoteles",
            "https://www.hotelsbarcelo.com/es/hoteles-espana/hoteles-tenerife/",
        ]
    );
    assert_eq!(
        results[0].title.as_deref(),
        Some("Los 10 mejores hoteles de Tenerife")
    );
    assert_eq!(
        results[1].title.as_deref(),
        Some("Hoteles en Tenerife - Tripadvisor")
    );
}

#[test]
fn test_cap_larger_than_page() {
    // 8 anchors, 2 of them back to the engine
    assert_eq!(links(&serp_fixture("modern"), 20).len(), 6);
    assert_eq!(links(&serp_fixture("modern"), 1).len(), 1);
}

#[test]
fn test_engine_links_excluded() {
    for name in ["modern", "container", "redirect"] {
        for link in links(&serp_fixture(name), 20) {
            assert!(!link.contains("google"), "{name}: {link}");
            assert!(link.starts_with("https://"), "{name}: {link}");
        }
    }
}

#[test]
fn test_container_page_titles() {
    let results = ResultExtractor::new().extract(&serp_fixture("container"), 5);
    let titles: Vec<_> = results.iter().filter_map(|r| r.title.as_deref()).collect();

    assert_eq!(results.len(), 3);
    assert_eq!(
        titles,
        vec![
            "Casas rurales en La Palma - Escapada Rural",
            "Casas Rurales en La Palma | Clubrural",
            "Alojamiento - Visit La Palma",
        ]
    );
}

#[test]
fn test_redirects_unwrapped() {
    assert_eq!(
        links(&serp_fixture("redirect"), 5),
        vec![
            "https://www.lanzarote.com/apartamentos/",
            "https://www.airbnb.es/lanzarote-spain/stays",
            "https://www.turismolanzarote.com/alojamiento/",
        ]
    );
}

#[test]
fn test_blocked_page_yields_nothing() {
    assert!(links(&serp_fixture("blocked"), 5).is_empty());
}

#[test]
fn test_pinned_format() {
    let html = serp_fixture("modern");

    // The modern page also has result blocks; pinning picks the block shape
    let extractor = ResultExtractor::new().with_format(SerpFormat::Container);
    assert_eq!(extractor.detect(&html), SerpFormat::Container);
    assert_eq!(extractor.extract(&html, 5).len(), 5);

    let extractor = ResultExtractor::new().with_format(SerpFormat::Redirect);
    assert!(extractor.extract(&html, 5).is_empty());
}
