use std::time::Duration;

use reqwest::StatusCode;
use url::Url;

use crate::{
    configuration::{BrowserSettings, RenderBackend, Settings},
    domain::{PatentIdentifier, PatentRecord, Target, TranslatedRecord},
};

use super::{extract, parse_microdata, Droid, FetchError, MicrodataNode, NotFoundError, RenderError};

/// Loads `url` with the configured backend and returns the page HTML.
pub async fn render(settings: &BrowserSettings, url: &str) -> Result<String, FetchError> {
    if let Some(path) = url.strip_prefix("file://") {
        if settings.backend == RenderBackend::Http {
            return read_local_page(url, path).await;
        }
    }

    match settings.backend {
        RenderBackend::WebDriver => {
            let droid = Droid::new(settings).await?;
            Ok(droid.render(url, settings).await?)
        }
        RenderBackend::Http => fetch_page_with_reqwest(settings, url).await,
    }
}

async fn read_local_page(url: &str, raw_path: &str) -> Result<String, FetchError> {
    let path = Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.to_file_path().ok())
        .unwrap_or_else(|| raw_path.into());

    tokio::fs::read_to_string(&path).await.map_err(|source| {
        RenderError::Io {
            path: path.display().to_string(),
            source,
        }
        .into()
    })
}

async fn fetch_page_with_reqwest(settings: &BrowserSettings, url: &str) -> Result<String, FetchError> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(settings.timeout_secs))
        .user_agent(settings.user_agent.as_str())
        .build()
        .map_err(RenderError::Http)?;

    let response = client.get(url).send().await.map_err(RenderError::Http)?;
    let status = response.status();

    match status {
        StatusCode::NOT_FOUND | StatusCode::GONE => {
            log::error!("No patent page at {}: {}", url, status);
            Err(NotFoundError::Status {
                url: url.to_string(),
                status,
            }
            .into())
        }
        _ if !status.is_success() => Err(RenderError::Status {
            url: url.to_string(),
            status,
        }
        .into()),
        _ => Ok(response.text().await.map_err(RenderError::Http)?),
    }
}

/// Fetches and extracts the page `target` points at.
pub async fn scrape(settings: &Settings, target: &Target) -> Result<PatentRecord, FetchError> {
    scrape_url(settings, &target.page_url(&settings.portal.base_url)).await
}

async fn scrape_url(settings: &Settings, url: &str) -> Result<PatentRecord, FetchError> {
    log::info!("Fetching patent page: {}", url);
    let html = render(&settings.browser, url).await?;
    Ok(extract(&html)?)
}

/// The patent in its original language followed by every translation the
/// page links to.
pub async fn scrape_translations(
    settings: &Settings,
    target: &Target,
) -> Result<Vec<TranslatedRecord>, FetchError> {
    let original = scrape(settings, target).await?;
    let original_language = original
        .language
        .clone()
        .unwrap_or_else(|| "unknown".to_string());
    log::info!("Original language is {:?}", original_language);

    let identifier = target.identifier().cloned().or_else(|| {
        original
            .publication_number
            .as_deref()
            .and_then(|number| PatentIdentifier::parse(number).ok())
    });
    let other_languages = original.other_languages.clone();

    let mut records = vec![TranslatedRecord {
        language: original_language,
        record: original,
    }];

    let Some(identifier) = identifier else {
        log::warn!("No patent identifier known for {}, skipping translations", target);
        return Ok(records);
    };

    log::info!("Other languages available: {:?}", other_languages);
    for language in other_languages {
        let url = identifier.page_url(&settings.portal.base_url, Some(language.as_str()));
        let record = scrape_url(settings, &url).await?;
        records.push(TranslatedRecord { language, record });
    }

    log::info!("Scrape completed with {} language versions", records.len());
    Ok(records)
}

/// The raw `itemprop` tree of the page `target` points at.
pub async fn scrape_microdata(settings: &Settings, target: &Target) -> Result<MicrodataNode, FetchError> {
    let url = target.page_url(&settings.portal.base_url);
    log::info!("Fetching patent page for microdata: {}", url);
    let html = render(&settings.browser, &url).await?;
    Ok(parse_microdata(&html)?)
}
