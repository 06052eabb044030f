//! Canned and randomised content for the example and smoke-test endpoints.

use rand::seq::IndexedRandom;

use crate::content::{Contact, Game, MAX_GAMES, MovieContent, ScheduleContent};

const ASSET_HOST: &str = "https://placehold.co";

fn asset(size: &str, text: &str) -> String {
    format!("{ASSET_HOST}/{size}/png?text={text}")
}

fn contact() -> Contact {
    Contact {
        website: Some("www.example-cinema.tv".into()),
        phone: Some("+1 555 0100".into()),
        telegram: Some("@examplecinema".into()),
    }
}

pub fn movie_example() -> MovieContent {
    MovieContent {
        title: "The Last Horizon".into(),
        description: "A veteran pilot takes one final mission beyond the edge of the known map, \
                      where the storms never end and the crew must decide what is worth saving."
            .into(),
        genre: Some("Adventure".into()),
        year: Some(2024),
        rating: Some(8.1),
        logo_url: asset("400x200", "LOGO"),
        poster_url: asset("600x900", "POSTER"),
        background_url: None,
        background_color: Some("#1f3b5c".into()),
        contact: contact(),
    }
}

fn game(home: &str, away: &str, time: &str, competition: &str) -> Game {
    Game {
        home_team: home.into(),
        away_team: away.into(),
        home_logo_url: asset("200x200", &home.replace(' ', "+")),
        away_logo_url: asset("200x200", &away.replace(' ', "+")),
        time: time.into(),
        competition: Some(competition.into()),
    }
}

pub fn schedule_example() -> ScheduleContent {
    ScheduleContent {
        title: "Tonight's Football".into(),
        date: Some("Saturday 14 September".into()),
        logo_url: asset("300x300", "TV"),
        background_url: None,
        background_color: Some("#0f5132".into()),
        games: vec![
            game("Northbridge FC", "Harbor United", "18:30", "Premier Cup"),
            game("Red Valley", "Lakeside Rovers", "20:00", "League"),
            game("Eastfield City", "Old Mill Athletic", "21:45", "League"),
        ],
        contact: contact(),
    }
}

const TITLES: &[&str] = &["Midnight Express", "Silent Orbit", "Paper Crowns", "The Glass Garden", "Ashes & Echoes"];
const GENRES: &[&str] = &["Drama", "Thriller", "Comedy", "Sci-Fi", "Animation"];
const DESCRIPTIONS: &[&str] = &[
    "Two strangers share a night train and a secret neither can afford to keep.",
    "A lone engineer wakes on a drifting station with no memory of the crew.",
    "A small-town printer discovers a forged royal decree in the morning batch.",
];
const COLORS: &[&str] = &["#1f3b5c", "#5c1f3b", "#2d5c1f", "#3b1f5c", "#5c4a1f"];
const YEARS: &[u16] = &[2019, 2021, 2023, 2024, 2025];
const RATINGS: &[f32] = &[6.4, 7.2, 7.9, 8.5, 9.0];

const TEAMS: &[&str] = &[
    "Northbridge FC",
    "Harbor United",
    "Red Valley",
    "Lakeside Rovers",
    "Eastfield City",
    "Old Mill Athletic",
    "Stonegate",
    "Riverside Wanderers",
    "Kingsport",
    "Ironworks",
];
const TIMES: &[&str] = &["13:00", "15:30", "18:00", "19:45", "21:00"];
const COMPETITIONS: &[&str] = &["League", "Cup", "Friendly"];

fn pick<T: Copy>(items: &[T], fallback: T) -> T {
    items.choose(&mut rand::rng()).copied().unwrap_or(fallback)
}

pub fn random_movie() -> MovieContent {
    let title = pick(TITLES, "Untitled");
    MovieContent {
        title: title.into(),
        description: pick(DESCRIPTIONS, "").into(),
        genre: Some(pick(GENRES, "Drama").into()),
        year: Some(pick(YEARS, 2024)),
        rating: Some(pick(RATINGS, 7.0)),
        background_color: Some(pick(COLORS, "#1f3b5c").into()),
        ..movie_example()
    }
}

pub fn random_schedule() -> ScheduleContent {
    let count = pick(&[1usize, 2, 3, 4, MAX_GAMES], 3);
    // TEAMS holds 2 * MAX_GAMES names, so a window of the cycle never repeats.
    let offset = pick(&[0usize, 2, 4, 6, 8], 0);
    let teams: Vec<&str> = TEAMS.iter().cycle().skip(offset).take(count * 2).copied().collect();
    let games = teams
        .chunks(2)
        .filter(|pair| pair.len() == 2)
        .map(|pair| game(pair[0], pair[1], pick(TIMES, "20:00"), pick(COMPETITIONS, "League")))
        .collect();
    ScheduleContent {
        title: "Match Day".into(),
        background_color: Some(pick(COLORS, "#0f5132").into()),
        games,
        ..schedule_example()
    }
}
