use promo_core::{Contact, Game, MovieContent, ScheduleContent};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

/// `#rgb` or `#rrggbb`.
fn hex_color(value: &str) -> Result<(), ValidationError> {
    let digits = value.strip_prefix('#').unwrap_or("");
    if matches!(digits.len(), 3 | 6) && digits.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(())
    } else {
        Err(ValidationError::new("hex_color"))
    }
}

/// Contact details printed in the card footer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, Validate)]
pub struct ContactRequest {
    #[validate(length(max = 200))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[validate(length(max = 40))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[validate(length(max = 64))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telegram: Option<String>,
}

/// Request body for `POST /generate-images`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MovieRequest {
    #[validate(length(min = 1, max = 120))]
    pub title: String,
    #[validate(length(max = 2000))]
    #[serde(default)]
    pub description: String,
    #[validate(length(max = 60))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[validate(range(min = 1888, max = 2100))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,
    #[validate(range(min = 0.0, max = 10.0))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
    #[validate(url)]
    pub logo_url: String,
    #[validate(url)]
    pub poster_url: String,
    #[validate(url)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_url: Option<String>,
    #[validate(custom(function = "hex_color"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[validate(nested)]
    #[serde(default)]
    pub contact: ContactRequest,
}

/// One fixture in a schedule request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GameRequest {
    #[validate(length(min = 1, max = 60))]
    pub home_team: String,
    #[validate(length(min = 1, max = 60))]
    pub away_team: String,
    #[validate(url)]
    pub home_logo_url: String,
    #[validate(url)]
    pub away_logo_url: String,
    /// Kick-off time as displayed, e.g. `"20:45"`.
    #[validate(length(min = 1, max = 20))]
    pub time: String,
    #[validate(length(max = 60))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub competition: Option<String>,
}

/// Request body for `POST /generate-football-schedule` and
/// `POST /generate-football-html`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRequest {
    #[validate(length(min = 1, max = 120))]
    pub title: String,
    #[validate(length(max = 60))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[validate(url)]
    pub logo_url: String,
    #[validate(url)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_url: Option<String>,
    #[validate(custom(function = "hex_color"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    /// Between 1 and 5 fixtures.
    #[validate(length(min = 1, max = 5), nested)]
    pub games: Vec<GameRequest>,
    #[validate(nested)]
    #[serde(default)]
    pub contact: ContactRequest,
}

/// `?base64` and/or `?file`. Neither selects file delivery.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DeliveryQuery {
    /// Return images inline as base64 (`?base64`, `?base64=true`).
    pub base64: Option<String>,
    /// Store images and return download links (`?file`, `?file=1`).
    pub file: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    pub inline: bool,
    pub download: bool,
}

fn flag(value: &Option<String>) -> bool {
    value
        .as_deref()
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "" | "1" | "true" | "yes"))
        .unwrap_or(false)
}

impl DeliveryQuery {
    pub fn delivery(&self) -> Delivery {
        let (inline, download) = (flag(&self.base64), flag(&self.file));
        if !inline && !download {
            Delivery { inline: false, download: true }
        } else {
            Delivery { inline, download }
        }
    }
}

/// Base64-encoded image per resolution.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ImageSet {
    pub landscape: String,
    pub portrait: String,
    pub square: String,
}

/// Download link per resolution.
#[derive(Debug, Clone, Serialize, ToSchema, Validate)]
pub struct DownloadSet {
    #[validate(url)]
    pub landscape: String,
    #[validate(url)]
    pub portrait: String,
    #[validate(url)]
    pub square: String,
}

/// Response of every generation endpoint.
#[derive(Debug, Clone, Serialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub success: bool,
    /// `jpeg` or `html`; only set by the HTML endpoints.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<ImageSet>,
    #[validate(nested)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub downloads: Option<DownloadSet>,
    /// Human-readable retention window, e.g. `"60 minutes"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<String>,
}

// ── conversions ──────────────────────────────────────────────────────────────

fn non_blank(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty())
}

impl From<ContactRequest> for Contact {
    fn from(c: ContactRequest) -> Self {
        Contact { website: non_blank(c.website), phone: non_blank(c.phone), telegram: non_blank(c.telegram) }
    }
}

impl From<Contact> for ContactRequest {
    fn from(c: Contact) -> Self {
        ContactRequest { website: c.website, phone: c.phone, telegram: c.telegram }
    }
}

impl From<MovieRequest> for MovieContent {
    fn from(r: MovieRequest) -> Self {
        MovieContent {
            title: r.title,
            description: r.description,
            genre: non_blank(r.genre),
            year: r.year,
            rating: r.rating,
            logo_url: r.logo_url,
            poster_url: r.poster_url,
            background_url: non_blank(r.background_url),
            background_color: non_blank(r.background_color),
            contact: r.contact.into(),
        }
    }
}

impl From<MovieContent> for MovieRequest {
    fn from(m: MovieContent) -> Self {
        MovieRequest {
            title: m.title,
            description: m.description,
            genre: m.genre,
            year: m.year,
            rating: m.rating,
            logo_url: m.logo_url,
            poster_url: m.poster_url,
            background_url: m.background_url,
            background_color: m.background_color,
            contact: m.contact.into(),
        }
    }
}

impl From<GameRequest> for Game {
    fn from(g: GameRequest) -> Self {
        Game {
            home_team: g.home_team,
            away_team: g.away_team,
            home_logo_url: g.home_logo_url,
            away_logo_url: g.away_logo_url,
            time: g.time,
            competition: non_blank(g.competition),
        }
    }
}

impl From<Game> for GameRequest {
    fn from(g: Game) -> Self {
        GameRequest {
            home_team: g.home_team,
            away_team: g.away_team,
            home_logo_url: g.home_logo_url,
            away_logo_url: g.away_logo_url,
            time: g.time,
            competition: g.competition,
        }
    }
}

impl From<ScheduleRequest> for ScheduleContent {
    fn from(r: ScheduleRequest) -> Self {
        ScheduleContent {
            title: r.title,
            date: non_blank(r.date),
            logo_url: r.logo_url,
            background_url: non_blank(r.background_url),
            background_color: non_blank(r.background_color),
            games: r.games.into_iter().map(Game::from).collect(),
            contact: r.contact.into(),
        }
    }
}

impl From<ScheduleContent> for ScheduleRequest {
    fn from(s: ScheduleContent) -> Self {
        ScheduleRequest {
            title: s.title,
            date: s.date,
            logo_url: s.logo_url,
            background_url: s.background_url,
            background_color: s.background_color,
            games: s.games.into_iter().map(GameRequest::from).collect(),
            contact: s.contact.into(),
        }
    }
}
