//! Data types for media identity and candidate streams.

use serde::{Deserialize, Serialize};

/// Media classification for resolution requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Tv,
}

impl MediaKind {
    /// URL path segment used by embed-style provider endpoints.
    pub fn as_path_segment(self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Tv => "tv",
        }
    }
}

impl std::str::FromStr for MediaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "movie" => Ok(MediaKind::Movie),
            "tv" => Ok(MediaKind::Tv),
            _ => Err(format!("Invalid media type: {s}")),
        }
    }
}

/// Identity of the requested media, fixed for the lifetime of one
/// resolution request.
///
/// `season` and `episode` are present together when a specific TV episode
/// (rather than the series as a whole) is requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaIdentity {
    pub kind: MediaKind,
    pub catalog_id: u32,
    pub title: String,
    pub year: Option<u16>,
    pub season: Option<u32>,
    pub episode: Option<u32>,
}

impl MediaIdentity {
    /// Creates an identity for a movie.
    pub fn movie(catalog_id: u32, title: impl Into<String>, year: Option<u16>) -> Self {
        Self {
            kind: MediaKind::Movie,
            catalog_id,
            title: title.into(),
            year,
            season: None,
            episode: None,
        }
    }

    /// Creates an identity for a specific TV episode.
    pub fn episode(
        catalog_id: u32,
        title: impl Into<String>,
        year: Option<u16>,
        season: u32,
        episode: u32,
    ) -> Self {
        Self {
            kind: MediaKind::Tv,
            catalog_id,
            title: title.into(),
            year,
            season: Some(season),
            episode: Some(episode),
        }
    }

    /// Returns the season/episode pair for episode-level TV requests.
    pub fn episode_numbers(&self) -> Option<(u32, u32)> {
        match self.kind {
            MediaKind::Tv => self.season.zip(self.episode),
            MediaKind::Movie => None,
        }
    }
}

/// How a candidate stream is delivered, which selects the playback transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Adaptive HLS stream (`.m3u8` manifest).
    Hls,
    /// Direct progressive file playback.
    Progressive,
    /// Embeddable page whose internal playback is not observable.
    Opaque,
}

impl TransportKind {
    /// Infers the transport from a URL suffix.
    ///
    /// Anything unrecognized is treated as an opaque embed page.
    pub fn infer(url: &str) -> Self {
        const PROGRESSIVE_SUFFIXES: [&str; 4] = [".mp4", ".webm", ".mkv", ".mov"];

        // Suffix matching runs on the path only, never on query or fragment.
        let path = match url::Url::parse(url) {
            Ok(parsed) => parsed.path().to_string(),
            Err(_) => url.split(['?', '#']).next().unwrap_or(url).to_string(),
        };
        let path = path.as_str();
        if path.ends_with(".m3u8") {
            TransportKind::Hls
        } else if PROGRESSIVE_SUFFIXES.iter().any(|s| path.ends_with(s)) {
            TransportKind::Progressive
        } else {
            TransportKind::Opaque
        }
    }
}

/// One playable URL plus transport metadata.
///
/// Candidates are immutable once produced. Ordering within a candidate list
/// is the fallback order: first entry is the most preferred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateStream {
    pub url: String,
    pub transport: TransportKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl CandidateStream {
    /// Creates a candidate with the transport inferred from the URL suffix.
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        let transport = TransportKind::infer(&url);
        Self {
            url,
            transport,
            quality: None,
            label: None,
        }
    }

    /// Creates a candidate with an explicitly tagged transport.
    pub fn with_transport(url: impl Into<String>, transport: TransportKind) -> Self {
        Self {
            url: url.into(),
            transport,
            quality: None,
            label: None,
        }
    }

    /// Sets the human-readable source label.
    pub fn labeled(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Sets the quality tag.
    pub fn with_quality(mut self, quality: impl Into<String>) -> Self {
        self.quality = Some(quality.into());
        self
    }
}

/// Removes candidates with a URL already seen earlier in the list.
///
/// First occurrence wins, so when lists from several providers are
/// concatenated in priority order the higher-priority copy is retained.
pub fn dedup_by_url(candidates: Vec<CandidateStream>) -> Vec<CandidateStream> {
    let mut seen = std::collections::HashSet::new();
    candidates
        .into_iter()
        .filter(|candidate| seen.insert(candidate.url.clone()))
        .collect()
}

/// Final result of a resolution request as returned to the presentation
/// layer.
///
/// `diagnostic` aggregates per-provider failure reasons when resolution
/// fails; it carries no control-flow meaning.
#[derive(Debug, Clone, Serialize)]
pub struct ResolutionOutcome {
    pub success: bool,
    pub candidates: Vec<CandidateStream>,
    pub diagnostic: Option<String>,
}

impl ResolutionOutcome {
    /// Successful resolution with at least one candidate.
    pub fn resolved(candidates: Vec<CandidateStream>) -> Self {
        Self {
            success: true,
            candidates,
            diagnostic: None,
        }
    }

    /// Every provider failed; `diagnostic` carries the aggregated reasons.
    pub fn exhausted(diagnostic: String) -> Self {
        Self {
            success: false,
            candidates: Vec::new(),
            diagnostic: Some(diagnostic),
        }
    }
}
