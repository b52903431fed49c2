use log::info;
use regex::Regex;
use url::Url;

use crate::cover_art::{ArtworkType, CoverArt};
use crate::error::Error;
use crate::provider;
use crate::provider::CoverArtProvider;

// The www form embeds the album title in the URL before the ID; the
// open form has the ID as the sole path segment. These are separate
// patterns per host, because matching both with one optional-title
// pattern would let a URL like open.qobuz.com/album/1234/related
// capture “related” as the ID.
static WWW_ID_PATTERN: &str = r"/album/[^/]+/([A-Za-z0-9]+)(?:/|$)";
static OPEN_ID_PATTERN: &str = r"/album/([A-Za-z0-9]+)(?:/|$)";

// Assuming this doesn’t change often. If it does, it would have to be
// extracted from the JS code loaded on open.qobuz.com.
static DEFAULT_APP_ID: &str = "712109809";

pub struct Qobuz
{
    app_id: String,
}

impl Qobuz
{
    pub fn new(app_id: Option<&str>) -> Self
    {
        Self { app_id: app_id.unwrap_or(DEFAULT_APP_ID).to_owned() }
    }

    fn idPattern(url: &Url) -> Regex
    {
        if url.host_str() == Some("open.qobuz.com")
        {
            Regex::new(OPEN_ID_PATTERN).unwrap()
        }
        else
        {
            Regex::new(WWW_ID_PATTERN).unwrap()
        }
    }

    fn extractId(url: &Url) -> Result<String, Error>
    {
        Self::idPattern(url).captures(url.path())
            .and_then(|capture| capture.get(1))
            .map(|id| id.as_str().to_owned())
            .ok_or_else(|| dataerr!("No Qobuz album ID in {}", url))
    }

    fn getMetadata(&self, id: &str) -> Result<serde_json::Value, Error>
    {
        let api_url = format!(
            "https://www.qobuz.com/api.json/0.2/album/get?\
             album_id={}&offset=0&limit=20", id);
        provider::fetchJson(&api_url, &[("x-app-id", &self.app_id)])
    }

    /// The API reports a downscaled cover like “..._600.jpg”. The
    /// original upload lives at “..._org.jpg”.
    fn fullSizeCoverUrl(large: &str) -> String
    {
        Regex::new(r"_\d+\.([a-zA-Z0-9]+)$").unwrap()
            .replace(large, "_org.${1}").into_owned()
    }

    fn extractGoodie(goodie: &serde_json::Value) -> Result<CoverArt, Error>
    {
        let url_str = goodie["original_url"].as_str().ok_or_else(
            || dataerr!("Qobuz goodie does not have a URL"))?;
        let url = Url::parse(url_str).map_err(
            |_| dataerr!("Invalid Qobuz goodie URL: {}", url_str))?;
        let name = goodie["name"].as_str().unwrap_or("");
        // “Livret Numérique” is a digital booklet. Anything else is
        // untyped, with the goodie name kept as a comment.
        if name == "Livret Numérique"
        {
            Ok(CoverArt {
                url,
                types: vec![ArtworkType::Booklet],
                comment: Some("Qobuz booklet".to_owned()),
            })
        }
        else
        {
            Ok(CoverArt {
                url,
                types: Vec::new(),
                comment: Some(name.to_owned()),
            })
        }
    }
}

impl CoverArtProvider for Qobuz
{
    fn name(&self) -> &'static str { "Qobuz" }
    fn favicon(&self) -> &'static str { "https://www.qobuz.com/favicon.ico" }

    fn supportedDomains(&self) -> &'static [&'static str]
    {
        &["qobuz.com", "open.qobuz.com"]
    }

    fn urlPattern(&self) -> Regex
    {
        Regex::new(WWW_ID_PATTERN).unwrap()
    }

    fn supportsUrl(&self, url: &Url) -> bool
    {
        Self::idPattern(url).is_match(url.path())
    }

    fn findImages(&self, url: &Url) -> Result<Vec<CoverArt>, Error>
    {
        let id = Self::extractId(url)?;
        let metadata = self.getMetadata(&id).map_err(|e| match e
        {
            Error::SourceNotFound(_) => Error::SourceNotFound(
                format!("Qobuz album {} does not exist", id)),
            Error::NetworkError(msg) => neterr!(
                "Could not retrieve Qobuz metadata, app ID invalid? ({})",
                msg),
            e => e,
        })?;

        let large = metadata["image"]["large"].as_str().ok_or_else(
            || dataerr!("Qobuz album {} does not have a cover image", id))?;
        let cover_url = Self::fullSizeCoverUrl(large);
        let mut covers = vec![CoverArt::withType(
            Url::parse(&cover_url).map_err(
                |_| dataerr!("Invalid Qobuz cover URL: {}", cover_url))?,
            ArtworkType::Front)];

        if let Some(goodies) = metadata["goodies"].as_array()
        {
            for goodie in goodies
            {
                covers.push(Self::extractGoodie(goodie)?);
            }
        }
        info!("Found {} image(s) for Qobuz album {}.", covers.len(), id);
        Ok(covers)
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use serde_json::json;

    fn parse(uri: &str) -> Url
    {
        Url::parse(uri).unwrap()
    }

    #[test]
    fn extractIdFromWwwForm() -> Result<(), Error>
    {
        let url = parse(
            "https://www.qobuz.com/gb-en/album/some-great-album/abcd1234");
        assert_eq!(Qobuz::extractId(&url)?, "abcd1234");
        // Trailing slash.
        let url = parse(
            "https://www.qobuz.com/gb-en/album/some-great-album/abcd1234/");
        assert_eq!(Qobuz::extractId(&url)?, "abcd1234");
        Ok(())
    }

    #[test]
    fn extractIdFromOpenForm() -> Result<(), Error>
    {
        let url = parse("https://open.qobuz.com/album/0886444431019");
        assert_eq!(Qobuz::extractId(&url)?, "0886444431019");
        // A trailing segment should not displace the ID.
        let url = parse("https://open.qobuz.com/album/0886444431019/related");
        assert_eq!(Qobuz::extractId(&url)?, "0886444431019");
        Ok(())
    }

    #[test]
    fn extractIdRejectsOtherPaths()
    {
        let url = parse("https://www.qobuz.com/gb-en/interpreter/someone");
        assert!(Qobuz::extractId(&url).is_err());
        let url = parse("https://open.qobuz.com/playlist/12345");
        assert!(Qobuz::extractId(&url).is_err());
    }

    #[test]
    fn coverUrlIsUpgradedToOriginal()
    {
        assert_eq!(
            Qobuz::fullSizeCoverUrl(
                "https://static.qobuz.com/images/covers/19/10/abcd_600.jpg"),
            "https://static.qobuz.com/images/covers/19/10/abcd_org.jpg");
        // Leave URLs without a size suffix alone.
        assert_eq!(Qobuz::fullSizeCoverUrl("https://example.org/cover.jpg"),
                   "https://example.org/cover.jpg");
    }

    #[test]
    fn goodiesAreClassified() -> Result<(), Error>
    {
        let booklet = Qobuz::extractGoodie(&json!({
            "name": "Livret Numérique",
            "original_url": "https://example.org/booklet.pdf",
        }))?;
        assert_eq!(booklet.types, vec![ArtworkType::Booklet]);
        assert_eq!(booklet.comment.as_deref(), Some("Qobuz booklet"));

        let other = Qobuz::extractGoodie(&json!({
            "name": "Poster scan",
            "original_url": "https://example.org/poster.jpg",
        }))?;
        assert!(other.types.is_empty());
        assert_eq!(other.comment.as_deref(), Some("Poster scan"));

        assert!(Qobuz::extractGoodie(&json!({"name": "No URL"})).is_err());
        Ok(())
    }
}
