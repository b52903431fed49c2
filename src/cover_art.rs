use std::fmt;
use std::str::FromStr;

use url::Url;

use crate::error::Error;

/// The closed set of artwork classifications the wiki accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtworkType
{
    Front,
    Back,
    Booklet,
    Medium,
    Obi,
    Spine,
    Track,
    Tray,
    Sticker,
    Poster,
    Liner,
    Watermark,
    Raw,
    Matrix,
    Top,
    Bottom,
    Other,
}

impl ArtworkType
{
    fn name(&self) -> &'static str
    {
        match self
        {
            ArtworkType::Front => "Front",
            ArtworkType::Back => "Back",
            ArtworkType::Booklet => "Booklet",
            ArtworkType::Medium => "Medium",
            ArtworkType::Obi => "Obi",
            ArtworkType::Spine => "Spine",
            ArtworkType::Track => "Track",
            ArtworkType::Tray => "Tray",
            ArtworkType::Sticker => "Sticker",
            ArtworkType::Poster => "Poster",
            ArtworkType::Liner => "Liner",
            ArtworkType::Watermark => "Watermark",
            ArtworkType::Raw => "Raw",
            ArtworkType::Matrix => "Matrix",
            ArtworkType::Top => "Top",
            ArtworkType::Bottom => "Bottom",
            ArtworkType::Other => "Other",
        }
    }
}

impl fmt::Display for ArtworkType
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ArtworkType
{
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str()
        {
            "front" => Ok(ArtworkType::Front),
            "back" => Ok(ArtworkType::Back),
            "booklet" => Ok(ArtworkType::Booklet),
            "medium" => Ok(ArtworkType::Medium),
            "obi" => Ok(ArtworkType::Obi),
            "spine" => Ok(ArtworkType::Spine),
            "track" => Ok(ArtworkType::Track),
            "tray" => Ok(ArtworkType::Tray),
            "sticker" => Ok(ArtworkType::Sticker),
            "poster" => Ok(ArtworkType::Poster),
            "liner" => Ok(ArtworkType::Liner),
            "raw" => Ok(ArtworkType::Raw),
            "watermark" => Ok(ArtworkType::Watermark),
            "matrix" => Ok(ArtworkType::Matrix),
            "top" => Ok(ArtworkType::Top),
            "bottom" => Ok(ArtworkType::Bottom),
            "other" => Ok(ArtworkType::Other),
            _ => Err(rterr!("Unknown artwork type: {}", s)),
        }
    }
}

/// One cover-art candidate as reported by a provider. The URL is
/// always absolute. An empty type list means no type tag is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverArt
{
    pub url: Url,
    pub types: Vec<ArtworkType>,
    pub comment: Option<String>,
}

impl CoverArt
{
    pub fn withType(url: Url, art_type: ArtworkType) -> Self
    {
        Self { url, types: vec![art_type], comment: None }
    }
}

/// A cover-art candidate with its downloaded bytes. Created by the
/// fetcher, consumed once by whoever uploads or writes the images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedImage
{
    pub cover: CoverArt,
    pub content: Vec<u8>,
    /// Suggested file name, derived from the image URL.
    pub filename: String,
}

/// The result of fetching one release URL, in extraction order, plus
/// the metadata an editing note needs.
#[derive(Debug, Clone)]
pub struct FetchedImages
{
    pub images: Vec<FetchedImage>,
    pub provider_name: String,
    pub source_url: Url,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions
{
    pub width: u32,
    pub height: u32,
}

impl fmt::Display for Dimensions
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn artworkTypeRoundTrip() -> Result<(), Error>
    {
        assert_eq!(ArtworkType::from_str("front")?, ArtworkType::Front);
        assert_eq!(ArtworkType::from_str("Booklet")?, ArtworkType::Booklet);
        assert_eq!(ArtworkType::from_str(&ArtworkType::Back.to_string())?,
                   ArtworkType::Back);
        assert!(ArtworkType::from_str("frontispiece").is_err());
        Ok(())
    }

    #[test]
    fn dimensionsFormat()
    {
        let size = Dimensions { width: 640, height: 480 };
        assert_eq!(size.to_string(), "640x480");
    }
}
