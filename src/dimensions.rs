use std::collections::HashMap;
use std::io::Read;
use std::sync::{Arc, Condvar, Mutex, OnceLock};

use log::{debug, info};

use crate::cover_art::Dimensions;
use crate::error::Error;
use crate::provider;

const PROBE_CHUNK_SIZE: usize = 8 * 1024;
// Give up if the dimensions have not shown up this far into the file.
const PROBE_MAX_BYTES: usize = 512 * 1024;

/// A result cell that can be settled exactly once. Later settlement
/// attempts are ignored, so racing completion sources cannot clobber
/// each other.
struct ProbeCell
{
    result: Mutex<Option<Result<Dimensions, Error>>>,
    ready: Condvar,
}

impl ProbeCell
{
    fn new() -> Self
    {
        Self { result: Mutex::new(None), ready: Condvar::new() }
    }

    fn settle(&self, result: Result<Dimensions, Error>)
    {
        let mut slot = self.result.lock().unwrap();
        if slot.is_none()
        {
            *slot = Some(result);
            self.ready.notify_all();
        }
    }

    fn wait(&self) -> Result<Dimensions, Error>
    {
        let mut slot = self.result.lock().unwrap();
        while slot.is_none()
        {
            slot = self.ready.wait(slot).unwrap();
        }
        slot.clone().unwrap()
    }
}

type ProbeCache = Mutex<HashMap<String, Arc<ProbeCell>>>;

fn cache() -> &'static ProbeCache
{
    static CACHE: OnceLock<ProbeCache> = OnceLock::new();
    CACHE.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Memoized probe. The first caller for a URL owns the cell and runs
/// `probe`; everyone else waits on the cell and gets the same settled
/// value. Entries are never evicted.
fn getOrProbe<F>(cache: &ProbeCache, url: &str, probe: F) ->
    Result<Dimensions, Error>
    where F: FnOnce() -> Result<Dimensions, Error>
{
    let (cell, owner) = {
        let mut map = cache.lock().unwrap();
        if let Some(cell) = map.get(url)
        {
            (cell.clone(), false)
        }
        else
        {
            let cell = Arc::new(ProbeCell::new());
            map.insert(url.to_owned(), cell.clone());
            (cell, true)
        }
    };
    if owner
    {
        cell.settle(probe());
    }
    cell.wait()
}

/// Read the stream chunk by chunk, polling the bytes so far for a
/// recognisable image header. Most formats expose their size in the
/// first few KiB, so the transfer is usually abandoned long before
/// the image finishes loading.
fn probeReader<R: Read>(mut reader: R) -> Result<Dimensions, Error>
{
    let mut buffer: Vec<u8> = Vec::with_capacity(PROBE_CHUNK_SIZE);
    let mut chunk = [0u8; PROBE_CHUNK_SIZE];
    loop
    {
        let count = reader.read(&mut chunk).map_err(
            |e| neterr!("Failed to read image data: {}", e))?;
        if count == 0
        {
            break;
        }
        buffer.extend_from_slice(&chunk[..count]);
        if let Ok(size) = imagesize::blob_size(&buffer)
        {
            debug!("Found dimensions after {} bytes.", buffer.len());
            return Ok(Dimensions {
                width: size.width as u32,
                height: size.height as u32,
            });
        }
        if buffer.len() >= PROBE_MAX_BYTES
        {
            break;
        }
    }
    Err(dataerr!("Could not determine image dimensions from {} bytes",
                 buffer.len()))
}

fn probeUrl(url: &str) -> Result<Dimensions, Error>
{
    probeReader(provider::openStream(url)?)
}

/// Determine an image’s pixel size without downloading all of it.
/// Memoized by URL string for the lifetime of the process; errors are
/// memoized too, so a bad URL is not retried.
pub fn getImageDimensions(url: &str) -> Result<Dimensions, Error>
{
    info!("Getting image dimensions for {}...", url);
    getOrProbe(cache(), url, || probeUrl(url))
}
