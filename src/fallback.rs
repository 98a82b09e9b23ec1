//! Built-in articles served when the live listing cannot be scraped.
//!
//! The dashboard should never render an empty page, so when every candidate
//! listing page fails the API answers with this fixed set instead. Each summary
//! carries a note saying the live feed is unavailable, and the response gets a
//! top-level [`FALLBACK_NOTE`].

use crate::models::Article;
use crate::scrapers::SOURCE_LABEL;
use chrono::{Duration, SecondsFormat, Utc};
use rand::{Rng, rng};

/// Top-level note attached to a listing response served from this set.
pub const FALLBACK_NOTE: &str =
    "Using fallback space articles - live scraping temporarily unavailable";

const SUMMARY_NOTE: &str = "(Note: Live Space.com feed temporarily unavailable)";

/// Fallback dates are spread over this many days before now.
const DATE_SPREAD_DAYS: i64 = 30;

struct Seed {
    id: &'static str,
    title: &'static str,
    summary: &'static str,
    content: &'static str,
    image_url: &'static str,
}

const SEEDS: [Seed; 5] = [
    Seed {
        id: "space-1",
        title: "SpaceX Starship Successfully Completes Orbital Test Flight",
        summary: "The massive rocket achieved key milestones in its journey toward Mars missions.",
        content: "SpaceX's Starship has completed another successful test flight, bringing the company closer to its goal of Mars colonization. The vehicle demonstrated improved heat shield performance and landing capabilities...",
        image_url: "https://cdn.mos.cms.futurecdn.net/placeholder-spacex-starship.jpg",
    },
    Seed {
        id: "space-2",
        title: "Astronomers Detect Mysterious Radio Signals from Distant Galaxy",
        summary: "Fast radio bursts reveal new insights about the universe's magnetic fields.",
        content: "A team of astronomers has detected a series of mysterious radio signals originating from a galaxy billions of light-years away. These fast radio bursts could help scientists understand cosmic magnetism...",
        image_url: "https://cdn.mos.cms.futurecdn.net/placeholder-radio-telescope.jpg",
    },
    Seed {
        id: "space-3",
        title: "China's Space Station Receives New Research Modules",
        summary: "Tiangong space station expands capabilities for scientific experiments.",
        content: "China has successfully attached new research modules to its Tiangong space station, significantly expanding the facility's scientific capabilities for microgravity research...",
        image_url: "https://cdn.mos.cms.futurecdn.net/placeholder-tiangong-station.jpg",
    },
    Seed {
        id: "space-4",
        title: "Europa Clipper Mission Launches to Jupiter's Icy Moon",
        summary: "NASA probe begins journey to search for signs of life in Europa's subsurface ocean.",
        content: "NASA's Europa Clipper spacecraft has begun its journey to Jupiter's moon Europa, where it will investigate the moon's subsurface ocean and potential for harboring life...",
        image_url: "https://cdn.mos.cms.futurecdn.net/placeholder-europa-clipper.jpg",
    },
    Seed {
        id: "space-5",
        title: "Breakthrough in Fusion Rocket Technology Could Enable Faster Mars Travel",
        summary: "New propulsion system could cut Mars journey time to just 3 months.",
        content: "Scientists have achieved a major breakthrough in fusion rocket technology that could revolutionize space travel, potentially reducing the journey time to Mars from 9 months to just 3 months...",
        image_url: "https://cdn.mos.cms.futurecdn.net/placeholder-fusion-rocket.jpg",
    },
];

/// A timestamp somewhere in the last [`DATE_SPREAD_DAYS`] days.
fn recent_date() -> String {
    let spread_ms = DATE_SPREAD_DAYS * 24 * 60 * 60 * 1000;
    let offset = Duration::milliseconds(rng().random_range(0..spread_ms));
    (Utc::now() - offset).to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// The fallback articles, each summary annotated with the unavailability note.
pub fn fallback_articles() -> Vec<Article> {
    SEEDS
        .iter()
        .map(|seed| Article {
            id: seed.id.to_string(),
            title: seed.title.to_string(),
            summary: format!("{} {}", seed.summary, SUMMARY_NOTE),
            content: seed.content.to_string(),
            image_url: seed.image_url.to_string(),
            date: recent_date(),
            source: SOURCE_LABEL.to_string(),
        })
        .collect()
}
