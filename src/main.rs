#![allow(non_snake_case)]

#[macro_use]
mod error;
mod config;
mod cover_art;
mod datpiff;
mod dimensions;
mod fetch;
mod provider;
mod qobuz;
mod registry;

use std::path::{Path, PathBuf};

use log::{error, info};
use url::Url;

use crate::config::Config;
use crate::cover_art::FetchedImages;
use crate::error::Error;
use crate::fetch::ImageFetcher;
use crate::provider::CoverArtProvider;

fn getConfig() -> Result<Config, Error>
{
    let conf_dir = config::configDir();
    if let Err(e) = conf_dir
    {
        eprintln!("WARNING: failed to find config dir: {}. \
                   Using default config...", e);
        return Ok(Config::default());
    }
    let conf_file = conf_dir.unwrap().join("config.toml");
    if !conf_file.exists()
    {
        return Ok(Config::default());
    }
    Config::fromFile(&conf_file)
}

fn writeImages(result: &FetchedImages, out_dir: &Path) -> Result<(), Error>
{
    std::fs::create_dir_all(out_dir).map_err(
        |_| rterr!("Failed to create directory at {:?}", out_dir))?;
    for image in &result.images
    {
        let path = out_dir.join(&image.filename);
        std::fs::write(&path, &image.content).map_err(
            |_| rterr!("Failed to write image at {:?}", path))?;
        let types: Vec<String> =
            image.cover.types.iter().map(|t| t.to_string()).collect();
        info!("Wrote {} ({} bytes, types: [{}]).", path.display(),
              image.content.len(), types.join(", "));
    }
    Ok(())
}

fn fetchOne(fetcher: &ImageFetcher, uri: &str, out_dir: &Path) ->
    Result<(), Error>
{
    let url = Url::parse(uri).map_err(|_| rterr!("Invalid URL: {}", uri))?;
    let result = fetcher.fetchImages(&url)?;
    writeImages(&result, out_dir)?;
    // This line is what would go into the editing note.
    println!("{} image(s) from {} via {}", result.images.len(),
             result.provider_name, result.source_url);
    info!("Successfully added {} image(s).", result.images.len());
    Ok(())
}

fn cli() -> Result<(), Error>
{
    let opts = clap::Command::new("Sleeve")
        .author("MetroWind")
        .about("Fetch cover art for music releases from third-party sites")
        .arg(clap::Arg::new("verbose")
             .short('v')
             .long("verbose")
             .action(clap::ArgAction::SetTrue)
             .help("Log more stuff"))
        .subcommand(
            clap::Command::new("fetch")
                .about("Fetch cover art from release URLs")
                .arg(clap::Arg::new("URL")
                     .required(true)
                     .num_args(1..)
                     .help("Release URLs on supported sites"))
                .arg(clap::Arg::new("output")
                     .short('o')
                     .long("output")
                     .help("The directory to write images to. Default: \
                            current directory")))
        .subcommand(
            clap::Command::new("check")
                .about("Tell whether URLs are supported, without fetching")
                .arg(clap::Arg::new("URL")
                     .required(true)
                     .num_args(1..)
                     .help("The URLs to check")))
        .subcommand(
            clap::Command::new("probe")
                .about("Print the pixel size of an image")
                .arg(clap::Arg::new("URL")
                     .required(true)
                     .help("The image URL")))
        .subcommand(clap::Command::new("providers")
                    .about("List supported sites"))
        .get_matches();

    let level = if opts.get_flag("verbose")
    {
        log::LevelFilter::Debug
    }
    else
    {
        log::LevelFilter::Info
    };
    simple_logger::SimpleLogger::new().with_level(level).init().map_err(
        |_| rterr!("Failed to initialize logger"))?;

    let conf = getConfig()?;

    match opts.subcommand()
    {
        Some(("fetch", sub_opts)) =>
        {
            let out_dir = sub_opts.get_one::<String>("output")
                .map(PathBuf::from)
                .or_else(|| conf.output_dir.clone())
                .unwrap_or_else(|| PathBuf::from("."));
            let fetcher = ImageFetcher::new(conf.clone());
            let mut failed = false;
            for uri in sub_opts.get_many::<String>("URL").unwrap()
            {
                if let Err(e) = fetchOne(&fetcher, uri, &out_dir)
                {
                    error!("Failed to grab images from {}: {}", uri, e);
                    failed = true;
                }
            }
            if failed
            {
                return Err(rterr!("Some URLs failed"));
            }
        },
        Some(("check", sub_opts)) =>
        {
            for uri in sub_opts.get_many::<String>("URL").unwrap()
            {
                let url = Url::parse(uri).map_err(
                    |_| rterr!("Invalid URL: {}", uri))?;
                if registry::hasProvider(&url, &conf)
                {
                    let provider = registry::getProvider(&url, &conf).unwrap();
                    println!("{}\t{}", provider.name(), uri);
                }
                else
                {
                    println!("unsupported\t{}", uri);
                }
            }
        },
        Some(("probe", sub_opts)) =>
        {
            let uri = sub_opts.get_one::<String>("URL").unwrap();
            println!("{}", dimensions::getImageDimensions(uri)?);
        },
        Some(("providers", _)) =>
        {
            for provider in registry::allProviders(&conf)
            {
                println!("{} ({}) {}", provider.name(),
                         provider.supportedDomains().join(", "),
                         provider.favicon());
            }
        },
        _ => {},
    }
    Ok(())
}

fn main()
{
    if let Err(e) = cli()
    {
        eprintln!("{}", e);
        std::process::exit(1);
    }
    std::process::exit(0);
}
