//! CLI command implementations

use std::sync::Arc;

use clap::Subcommand;
use slipstream_core::SlipstreamError;
use slipstream_core::config::SlipstreamConfig;
use slipstream_core::types::{MediaIdentity, MediaKind};
use slipstream_sources::{
    PageScrapeProvider, SourceOrchestrator, SourceProvider, SuperEmbedProvider, VidSrcProvider,
};
use slipstream_web::{AppState, CatalogClient, run_server};

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Start the source-resolution API server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,
        /// TMDB API key for catalog lookups (falls back to TMDB_API_KEY)
        #[arg(long)]
        tmdb_api_key: Option<String>,
        /// Additional title-addressed scrape site as NAME=URL (repeatable)
        #[arg(long = "scrape-site", value_parser = parse_scrape_site)]
        scrape_sites: Vec<(String, String)>,
    },
    /// Resolve one media identity and print the candidate streams
    Resolve {
        /// Media type: movie or tv
        media_type: MediaKind,
        /// Catalog id
        id: u32,
        /// Title used by title-addressed providers
        #[arg(long)]
        title: Option<String>,
        /// Release year
        #[arg(long)]
        year: Option<u16>,
        /// Season number (TV only, requires --episode)
        #[arg(long)]
        season: Option<u32>,
        /// Episode number (TV only, requires --season)
        #[arg(long)]
        episode: Option<u32>,
        /// Query every provider and merge instead of first-success-wins
        #[arg(long)]
        fanout: bool,
    },
}

/// Dispatches a parsed command.
pub async fn handle_command(command: Commands) -> slipstream_core::Result<()> {
    match command {
        Commands::Serve {
            host,
            port,
            tmdb_api_key,
            scrape_sites,
        } => serve(host, port, tmdb_api_key, scrape_sites).await,
        Commands::Resolve {
            media_type,
            id,
            title,
            year,
            season,
            episode,
            fanout,
        } => resolve(media_type, id, title, year, season, episode, fanout).await,
    }
}

async fn serve(
    host: String,
    port: u16,
    tmdb_api_key: Option<String>,
    scrape_sites: Vec<(String, String)>,
) -> slipstream_core::Result<()> {
    let mut config = SlipstreamConfig::from_env();
    config.http.host = host;
    config.http.port = port;

    let api_key = tmdb_api_key.or_else(|| std::env::var("TMDB_API_KEY").ok());
    let orchestrator = build_orchestrator(&config, &scrape_sites)?;
    let state = AppState::new(orchestrator, CatalogClient::new(api_key), &config.http);

    run_server(&config.http, state).await
}

async fn resolve(
    media_type: MediaKind,
    id: u32,
    title: Option<String>,
    year: Option<u16>,
    season: Option<u32>,
    episode: Option<u32>,
    fanout: bool,
) -> slipstream_core::Result<()> {
    if season.is_some() != episode.is_some() {
        return Err(SlipstreamError::Configuration {
            reason: "--season and --episode are required together".to_string(),
        });
    }
    if media_type == MediaKind::Movie && season.is_some() {
        return Err(SlipstreamError::Configuration {
            reason: "--season/--episode are only valid for tv".to_string(),
        });
    }

    let config = SlipstreamConfig::from_env();
    let orchestrator = build_orchestrator(&config, &[])?;

    let identity = MediaIdentity {
        kind: media_type,
        catalog_id: id,
        title: title.unwrap_or_else(|| format!("Media {id}")),
        year,
        season,
        episode,
    };

    let rendered = if fanout {
        let sources = orchestrator.resolve_all(&identity).await;
        serde_json::to_string_pretty(&sources)
    } else {
        let outcome = orchestrator.resolve_sequential(&identity).await;
        serde_json::to_string_pretty(&outcome)
    };
    let text = rendered.map_err(|e| SlipstreamError::Server {
        reason: format!("could not render output: {e}"),
    })?;
    println!("{text}");
    Ok(())
}

/// Builds the provider list in priority order: the embed aggregators
/// first, then any extra title-addressed scrape sites.
fn build_orchestrator(
    config: &SlipstreamConfig,
    scrape_sites: &[(String, String)],
) -> slipstream_core::Result<SourceOrchestrator> {
    let sources = &config.sources;
    let mut providers: Vec<Arc<dyn SourceProvider>> = vec![
        Arc::new(VidSrcProvider::new(sources)),
        Arc::new(SuperEmbedProvider::new(sources)),
    ];
    for (name, base_url) in scrape_sites {
        providers.push(Arc::new(PageScrapeProvider::new(
            name.clone(),
            base_url.clone(),
            sources,
        )));
    }

    SourceOrchestrator::new(providers, sources.provider_timeout).map_err(|e| {
        SlipstreamError::Configuration {
            reason: e.to_string(),
        }
    })
}

fn parse_scrape_site(value: &str) -> Result<(String, String), String> {
    value
        .split_once('=')
        .map(|(name, url)| (name.to_string(), url.to_string()))
        .ok_or_else(|| format!("expected NAME=URL, got '{value}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scrape_site_argument_splits_on_first_equals() {
        let (name, url) = parse_scrape_site("Source1=https://streams.example").unwrap();
        assert_eq!(name, "Source1");
        assert_eq!(url, "https://streams.example");

        assert!(parse_scrape_site("no-url-here").is_err());
    }

    #[tokio::test]
    async fn resolve_rejects_season_without_episode() {
        let result = resolve(MediaKind::Tv, 1396, None, None, Some(2), None, false).await;
        assert!(matches!(
            result,
            Err(SlipstreamError::Configuration { .. })
        ));
    }

    #[tokio::test]
    async fn resolve_rejects_episode_arguments_for_movies() {
        let result = resolve(MediaKind::Movie, 603, None, None, Some(1), Some(2), false).await;
        assert!(matches!(
            result,
            Err(SlipstreamError::Configuration { .. })
        ));
    }
}
