//! Background image decoding.
//!
//! One worker thread decodes files to [`RasterBuffer`]s. The UI thread
//! stamps every request with a generation number and accepts only the
//! newest one back, so a decode superseded by a later file is ignored when
//! it completes. Cancellation is advisory: the worker is never interrupted,
//! stale results are simply dropped.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::thread;

use crossbeam_channel::Receiver;
use tracing::debug;
use winit::event_loop::EventLoopProxy;

use crate::error::Error;
use crate::raster::RasterBuffer;

/// A decode request issued by the UI thread.
#[derive(Debug, Clone)]
pub struct DecodeRequest {
    pub generation: u64,
    pub path: PathBuf,
}

/// Worker-to-UI result, delivered through the event-loop proxy so all state
/// mutation stays on the UI thread.
#[derive(Debug)]
pub enum DecodeOutcome {
    Decoded {
        generation: u64,
        path: PathBuf,
        raster: RasterBuffer,
    },
    Failed {
        generation: u64,
        path: PathBuf,
        reason: String,
    },
}

/// The single-outstanding-request slot.
///
/// `begin` invalidates whatever was pending and returns a fresh generation;
/// `accept` admits only the result matching the latest generation.
#[derive(Debug, Default)]
pub struct DecodeSlot {
    next: u64,
    pending: Option<u64>,
}

impl DecodeSlot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request, superseding any pending one.
    pub fn begin(&mut self) -> u64 {
        self.next += 1;
        self.pending = Some(self.next);
        self.next
    }

    /// Whether `generation` is the outstanding request. Accepting clears
    /// the slot.
    pub fn accept(&mut self, generation: u64) -> bool {
        if self.pending == Some(generation) {
            self.pending = None;
            return true;
        }
        false
    }

    /// Forget the outstanding request without accepting a result.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.pending.is_some()
    }
}

/// Spawn the decode worker.
///
/// The worker drains queued requests down to the newest before decoding,
/// since older ones could only produce results the slot would reject. It
/// exits when the request channel closes or the event loop goes away.
pub fn spawn_loader(
    requests: Receiver<DecodeRequest>,
    events: EventLoopProxy<DecodeOutcome>,
) -> thread::JoinHandle<()> {
    thread::Builder::new()
        .name("decode".into())
        .spawn(move || {
            while let Ok(mut request) = requests.recv() {
                while let Ok(newer) = requests.try_recv() {
                    debug!(path = %request.path.display(), "decode superseded before start");
                    request = newer;
                }

                let DecodeRequest { generation, path } = request;
                let outcome = match decode_raster(&path) {
                    Ok(raster) => DecodeOutcome::Decoded {
                        generation,
                        path,
                        raster,
                    },
                    Err(err) => DecodeOutcome::Failed {
                        generation,
                        path,
                        reason: err.to_string(),
                    },
                };
                if events.send_event(outcome).is_err() {
                    break;
                }
            }
        })
        .expect("spawn decode thread")
}

/// Decode an image file to RGBA8 and apply its EXIF orientation.
///
/// # Errors
/// Returns [`Error::UnsupportedFormat`] when the content is not a decodable
/// image, and [`Error::DecodeFailed`] for everything else.
pub fn decode_raster(path: &Path) -> Result<RasterBuffer, Error> {
    let decoded = image::ImageReader::open(path)
        .map_err(Error::Io)?
        .with_guessed_format()
        .map_err(Error::Io)?
        .decode()
        .map_err(|err| match err {
            image::ImageError::Unsupported(inner) => Error::UnsupportedFormat(inner.to_string()),
            other => Error::DecodeFailed {
                path: path.display().to_string(),
                reason: other.to_string(),
            },
        })?;

    let mut rgba = decoded.to_rgba8();

    // Best-effort orientation correction; missing metadata keeps the
    // decoded orientation.
    let orientation = read_orientation(path).unwrap_or(1);
    match orientation {
        1 => {}
        2 => rgba = image::imageops::flip_horizontal(&rgba),
        3 => rgba = image::imageops::rotate180(&rgba),
        4 => rgba = image::imageops::flip_vertical(&rgba),
        5 => {
            rgba = image::imageops::rotate90(&rgba);
            rgba = image::imageops::flip_horizontal(&rgba);
        }
        6 => rgba = image::imageops::rotate90(&rgba),
        7 => {
            rgba = image::imageops::rotate270(&rgba);
            rgba = image::imageops::flip_horizontal(&rgba);
        }
        8 => rgba = image::imageops::rotate270(&rgba),
        _ => {}
    }

    Ok(RasterBuffer::from_rgba(rgba))
}

fn read_orientation(path: &Path) -> Option<u16> {
    let file = File::open(path).ok()?;
    let mut buf = BufReader::new(file);
    let exif = exif::Reader::new().read_from_container(&mut buf).ok()?;
    let field = exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)?;
    let value = field.value.get_uint(0)?;
    debug!(orientation = value, path = %path.display(), "exif orientation");
    u16::try_from(value).ok()
}
