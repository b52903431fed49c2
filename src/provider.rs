use std::io::Read;

use url::Url;

use crate::cover_art::{CoverArt, FetchedImage};
use crate::error::Error;

static USER_AGENT: &str = "Mozilla/5.0 (X11; Linux i686; rv:98.0) Gecko/20100101 Firefox/98.0";

/// A provider knows how to extract cover-art candidates from one
/// specific site. Implementations are stateless leaf types; dispatch
/// goes through the registry.
pub trait CoverArtProvider
{
    fn name(&self) -> &'static str;
    fn favicon(&self) -> &'static str;
    /// Hostnames this provider handles. The registry suffix-matches
    /// these against the URL's hostname before asking `supportsUrl`.
    fn supportedDomains(&self) -> &'static [&'static str];
    /// Pattern matched against the URL path by the default
    /// `supportsUrl`.
    fn urlPattern(&self) -> regex::Regex;

    /// Whether the URL's path looks like a release page this provider
    /// can handle. Domain filtering already happened in the registry.
    fn supportsUrl(&self, url: &Url) -> bool
    {
        self.urlPattern().is_match(url.path())
    }

    /// Locate the cover-art candidates for a release URL. Fails with
    /// `SourceNotFound` when the site says the release does not
    /// exist, and `MissingData` when an expected element or field is
    /// absent.
    fn findImages(&self, url: &Url) -> Result<Vec<CoverArt>, Error>;

    /// Filter or split the downloaded images. The default keeps
    /// everything.
    fn postprocessImages(&self, images: Vec<FetchedImage>) ->
        Result<Vec<FetchedImage>, Error>
    {
        Ok(images)
    }
}

fn agent() -> ureq::Agent
{
    // Some sites’ error responses do not have Content-Length, and by
    // default ureq will wait for the server to close the socket when
    // reading. An agent can have a read timeout.
    ureq::builder()
        .timeout_read(std::time::Duration::from_secs(30))
        .user_agent(USER_AGENT)
        .build()
}

fn doGet(url: &str, headers: &[(&str, &str)]) -> Result<ureq::Response, Error>
{
    let mut req = agent().get(url);
    for (key, value) in headers
    {
        req = req.set(key, value);
    }
    match req.call()
    {
        Ok(res) => Ok(res),
        Err(ureq::Error::Status(404, _)) =>
            Err(Error::SourceNotFound(format!("{} does not exist", url))),
        Err(ureq::Error::Status(code, _)) =>
            Err(neterr!("Query to {} got {}", url, code)),
        Err(e) => Err(neterr!("Failed to query {}: {}", url, e)),
    }
}

/// Download a page and return its body as text.
pub fn fetchPage(url: &Url) -> Result<String, Error>
{
    doGet(url.as_str(), &[])?.into_string().map_err(
        |_| rterr!("Failed to decode response from {}", url))
}

/// Download a JSON API response.
pub fn fetchJson(url: &str, headers: &[(&str, &str)]) ->
    Result<serde_json::Value, Error>
{
    let body = doGet(url, headers)?.into_string().map_err(
        |_| rterr!("Failed to decode response from {}", url))?;
    let data: serde_json::Value = body.parse().map_err(
        |_| rterr!("Invalid JSON response from {}", url))?;
    Ok(data)
}

/// Download raw bytes, up to `max_size`.
pub fn fetchBytes(url: &Url, max_size: u64) -> Result<Vec<u8>, Error>
{
    let res = doGet(url.as_str(), &[]).map_err(|e| match e
    {
        // A release page that exists but points at a dead image is a
        // failure of the batch, not a missing release.
        Error::SourceNotFound(_) => neterr!("Image at {} does not exist", url),
        e => e,
    })?;
    let mut bytes: Vec<u8> = Vec::with_capacity(64 * 1024);
    res.into_reader().take(max_size).read_to_end(&mut bytes).map_err(
        |_| neterr!("Failed to read image bytes from {}", url))?;
    Ok(bytes)
}

/// Open a response body for incremental reading. Dropping the reader
/// abandons the transfer.
pub fn openStream(url: &str) -> Result<Box<dyn Read + Send>, Error>
{
    Ok(Box::new(doGet(url, &[])?.into_reader()))
}

#[cfg(test)]
mod tests
{
    use super::*;

    struct Dummy;

    impl CoverArtProvider for Dummy
    {
        fn name(&self) -> &'static str { "Dummy" }
        fn favicon(&self) -> &'static str { "" }
        fn supportedDomains(&self) -> &'static [&'static str]
        {
            &["example.org"]
        }
        fn urlPattern(&self) -> regex::Regex
        {
            regex::Regex::new(r"/release/\d+").unwrap()
        }
        fn findImages(&self, _: &Url) -> Result<Vec<CoverArt>, Error>
        {
            Ok(Vec::new())
        }
    }

    #[test]
    fn defaultSupportsUrlMatchesPath() -> Result<(), Error>
    {
        let p = Dummy;
        let yes = Url::parse("https://example.org/release/42").unwrap();
        let no = Url::parse("https://example.org/artist/42").unwrap();
        assert!(p.supportsUrl(&yes));
        assert!(!p.supportsUrl(&no));
        Ok(())
    }
}
