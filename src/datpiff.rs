use log::warn;
use regex::Regex;
use scraper::{Html, Selector};
use sha2::{Digest, Sha256};
use url::Url;

use crate::cover_art::{ArtworkType, CoverArt, FetchedImage};
use crate::error::Error;
use crate::provider;
use crate::provider::CoverArtProvider;

// Releases without real art get the DatPiff logo instead. These are
// the SHA-256 digests of the small, medium, and large variants.
static PLACEHOLDER_DIGESTS: [&str; 3] = [
    "259b065660159922c881d242701aa64d4e02672deba437590a2014519e7caeec",
    "ef406a25c3ffd61150b0658f3fe4863898048b4e54b81289e0e53a0f00ad0ced",
    "a2691bde8f4a5ced9e5b066d4fab0675b0ceb80f1f0ab3c4d453228549560048",
];

// DatPiff does not 404 on non-existent releases. It serves a 200 page
// with this title and an error banner.
static NOT_FOUND_TITLE: &str = "Mixtape Not Found";

pub struct DatPiff;

impl DatPiff
{
    fn pageTitle(page: &Html) -> String
    {
        let selector = Selector::parse("title").unwrap();
        page.select(&selector).next()
            .map(|element| element.text().collect::<String>())
            .unwrap_or_default()
    }

    fn parseCoverUrl(value: &str) -> Result<Url, Error>
    {
        Url::parse(value).map_err(
            |_| dataerr!("Invalid cover URL in DatPiff release: {}", value))
    }

    fn findInPage(page: &Html) -> Result<Vec<CoverArt>, Error>
    {
        if Self::pageTitle(page).trim() == NOT_FOUND_TITLE
        {
            return Err(Error::SourceNotFound(
                "DatPiff release does not exist".to_owned()));
        }

        let cover_selector = Selector::parse(".tapeBG").unwrap();
        let container = page.select(&cover_selector).next().ok_or_else(
            || dataerr!("No cover container in DatPiff release"))?;
        let front_url = container.value().attr("data-front").ok_or_else(
            || dataerr!("No front image found in DatPiff release"))?;

        let mut covers = vec![CoverArt::withType(
            Self::parseCoverUrl(front_url)?, ArtworkType::Front)];

        // The data-back attribute is populated with a junk URL even
        // when there is no back cover. The #screenshot element only
        // exists for real ones.
        let back_marker = Selector::parse("#screenshot").unwrap();
        if container.select(&back_marker).next().is_some()
        {
            let back_url = container.value().attr("data-back").ok_or_else(
                || dataerr!("No back cover found in DatPiff release, \
                             even though there should be one"))?;
            covers.push(CoverArt::withType(
                Self::parseCoverUrl(back_url)?, ArtworkType::Back));
        }
        Ok(covers)
    }

    /// Return the hash of the image bytes as a hex literal string.
    fn digest(content: &[u8]) -> String
    {
        let mut hasher = Sha256::new();
        hasher.update(content);
        let hash = hasher.finalize();
        hash.iter().map(|byte| format!("{:02x}", byte))
            .collect::<Vec<String>>().join("")
    }

    fn dropPlaceholders(images: Vec<FetchedImage>, digests: &[&str]) ->
        Vec<FetchedImage>
    {
        images.into_iter().filter(|image| {
            if digests.contains(&Self::digest(&image.content).as_str())
            {
                warn!("Skipping {} because it matches a placeholder cover.",
                      image.filename);
                false
            }
            else
            {
                true
            }
        }).collect()
    }
}

impl CoverArtProvider for DatPiff
{
    fn name(&self) -> &'static str { "DatPiff" }

    fn favicon(&self) -> &'static str
    {
        "http://hw-static.datpiff.com/favicon.ico"
    }

    fn supportedDomains(&self) -> &'static [&'static str]
    {
        &["datpiff.com"]
    }

    fn urlPattern(&self) -> Regex
    {
        // Case insensitive because DatPiff appends “mixtape” to
        // titles that don’t end in it, but keeps the original
        // capitalisation when they do.
        Regex::new(r"(?i)mixtape\.(\d+)\.html").unwrap()
    }

    fn findImages(&self, url: &Url) -> Result<Vec<CoverArt>, Error>
    {
        let body = provider::fetchPage(url)?;
        Self::findInPage(&Html::parse_document(&body))
    }

    fn postprocessImages(&self, images: Vec<FetchedImage>) ->
        Result<Vec<FetchedImage>, Error>
    {
        Ok(Self::dropPlaceholders(images, &PLACEHOLDER_DIGESTS))
    }
}
