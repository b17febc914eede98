use anyhow::Context;

use crate::{
    configuration::Settings,
    domain::Target,
    services::{scrape, scrape_microdata, scrape_translations},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    #[default]
    Record,
    AllLanguages,
    Microdata,
}

/// Runs one fetch and returns the JSON document to print.
pub async fn run(settings: &Settings, target: &Target, mode: OutputMode) -> anyhow::Result<String> {
    let json = match mode {
        OutputMode::Record => {
            let record = scrape(settings, target)
                .await
                .with_context(|| format!("Failed to fetch patent {}", target))?;
            serde_json::to_string_pretty(&record)?
        }
        OutputMode::AllLanguages => {
            let records = scrape_translations(settings, target)
                .await
                .with_context(|| format!("Failed to fetch translations of {}", target))?;
            serde_json::to_string_pretty(&records)?
        }
        OutputMode::Microdata => {
            let data = scrape_microdata(settings, target)
                .await
                .with_context(|| format!("Failed to fetch microdata of {}", target))?;
            serde_json::to_string_pretty(&data)?
        }
    };

    Ok(json)
}
