use std::cell::RefCell;
use std::collections::HashSet;

use log::{info, warn};
use url::Url;

use crate::config::Config;
use crate::cover_art::{CoverArt, FetchedImage, FetchedImages};
use crate::error::Error;
use crate::provider;
use crate::provider::CoverArtProvider;
use crate::registry;

/// Drop covers whose URL was already seen, either earlier in the same
/// batch or in `done`. Order of the survivors is preserved.
fn dropDuplicates(covers: Vec<CoverArt>, done: &HashSet<String>) ->
    Vec<CoverArt>
{
    let mut seen: HashSet<String> = HashSet::new();
    covers.into_iter().filter(|cover| {
        let key = cover.url.as_str().to_owned();
        if done.contains(&key) || !seen.insert(key)
        {
            warn!("Image at {} has already been added.", cover.url);
            false
        }
        else
        {
            true
        }
    }).collect()
}

fn suggestFilename(url: &Url, index: usize) -> String
{
    url.path_segments()
        .and_then(|segments| segments.last())
        .filter(|name| !name.is_empty())
        .map(|name| name.to_owned())
        .unwrap_or_else(|| format!("image_{}", index))
}

/// Download every cover concurrently, one request per image. The
/// results come back in extraction order, and any single failure
/// fails the lot.
fn downloadAll(covers: Vec<CoverArt>, max_size: u64) ->
    Result<Vec<FetchedImage>, Error>
{
    std::thread::scope(|scope| {
        let handles: Vec<_> = covers.iter().map(|cover| {
            let image_url = &cover.url;
            scope.spawn(move || provider::fetchBytes(image_url, max_size))
        }).collect();

        let mut images: Vec<FetchedImage> = Vec::with_capacity(covers.len());
        let mut failure: Option<Error> = None;
        for (index, handle) in handles.into_iter().enumerate()
        {
            match handle.join()
            {
                Ok(Ok(content)) =>
                {
                    let filename = suggestFilename(&covers[index].url, index);
                    images.push(FetchedImage {
                        cover: covers[index].clone(),
                        content,
                        filename,
                    });
                },
                Ok(Err(e)) =>
                {
                    // Keep draining the joins, but remember the first
                    // failure. The batch is all-or-nothing.
                    if failure.is_none()
                    {
                        failure = Some(e);
                    }
                },
                Err(_) =>
                {
                    if failure.is_none()
                    {
                        failure = Some(rterr!("Image download thread panicked"));
                    }
                },
            }
        }
        match failure
        {
            Some(e) => Err(e),
            None => Ok(images),
        }
    })
}

/// Orchestrates one release URL: provider lookup, candidate
/// extraction, concurrent download, and the provider’s post-process
/// step.
pub struct ImageFetcher
{
    config: Config,
    // Image URLs already fetched in this session.
    done_urls: RefCell<HashSet<String>>,
}

impl ImageFetcher
{
    pub fn new(config: Config) -> Self
    {
        Self { config, done_urls: RefCell::new(HashSet::new()) }
    }

    pub fn fetchImages(&self, url: &Url) -> Result<FetchedImages, Error>
    {
        let provider = registry::getProvider(url, &self.config).ok_or_else(
            || Error::UnsupportedUrl(url.to_string()))?;
        self.fetchImagesFrom(provider.as_ref(), url)
    }

    pub fn fetchImagesFrom(&self, provider: &dyn CoverArtProvider,
                           url: &Url) -> Result<FetchedImages, Error>
    {
        info!("Fetching images from {} through {}...", url, provider.name());
        let covers = provider.findImages(url)?;
        let covers = dropDuplicates(covers, &self.done_urls.borrow());
        if covers.is_empty()
        {
            warn!("Found no new images at {}.", url);
        }

        let images = downloadAll(covers, self.config.max_image_bytes)?;
        let images = provider.postprocessImages(images)?;

        // Only mark URLs as done once the whole batch went through,
        // so a failed batch can be retried by the user.
        let mut done = self.done_urls.borrow_mut();
        for image in &images
        {
            done.insert(image.cover.url.as_str().to_owned());
        }
        Ok(FetchedImages {
            images,
            provider_name: provider.name().to_owned(),
            source_url: url.clone(),
        })
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::cover_art::ArtworkType;

    struct Broken;

    impl CoverArtProvider for Broken
    {
        fn name(&self) -> &'static str { "Broken" }
        fn favicon(&self) -> &'static str { "" }
        fn supportedDomains(&self) -> &'static [&'static str]
        {
            &["broken.example"]
        }
        fn urlPattern(&self) -> regex::Regex
        {
            regex::Regex::new(".*").unwrap()
        }
        fn findImages(&self, url: &Url) -> Result<Vec<CoverArt>, Error>
        {
            Err(dataerr!("No images at {}", url))
        }
    }

    fn parse(uri: &str) -> Url
    {
        Url::parse(uri).unwrap()
    }

    #[test]
    fn unsupportedUrlIsRejected()
    {
        let fetcher = ImageFetcher::new(Config::default());
        match fetcher.fetchImages(&parse("https://example.org/album/1"))
        {
            Err(Error::UnsupportedUrl(_)) => {},
            other => panic!("Expect UnsupportedUrl, got {:?}", other),
        }
    }

    #[test]
    fn extractionFailureSkipsDownloads()
    {
        let fetcher = ImageFetcher::new(Config::default());
        let result = fetcher.fetchImagesFrom(
            &Broken, &parse("https://broken.example/release/1"));
        match result
        {
            Err(Error::MissingData(_)) => {},
            other => panic!("Expect MissingData, got {:?}", other),
        }
        assert!(fetcher.done_urls.borrow().is_empty());
    }

    #[test]
    fn duplicateUrlsAreDropped()
    {
        let a = CoverArt::withType(parse("https://img.example.org/a.jpg"),
                                   ArtworkType::Front);
        let b = CoverArt::withType(parse("https://img.example.org/b.jpg"),
                                   ArtworkType::Back);
        let covers = vec![a.clone(), b.clone(), a.clone()];
        let kept = dropDuplicates(covers, &HashSet::new());
        assert_eq!(kept, vec![a.clone(), b.clone()]);

        let mut done = HashSet::new();
        done.insert("https://img.example.org/a.jpg".to_owned());
        let kept = dropDuplicates(vec![a, b.clone()], &done);
        assert_eq!(kept, vec![b]);
    }

    #[test]
    fn filenamesComeFromTheUrlPath()
    {
        assert_eq!(
            suggestFilename(&parse("https://img.example.org/art/front.jpg"), 0),
            "front.jpg");
        assert_eq!(suggestFilename(&parse("https://img.example.org/"), 3),
                   "image_3");
    }
}
