use std::fs;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use ffmpeg_next as ffmpeg;
use tracing::debug;

use crate::error::{LoadError, LoadFailure};
use crate::sequence::MediaKind;

/// Packets read from a video before giving up on decoding a first frame.
const MAX_PACKETS: usize = 64;

/// One-shot loadability check run before an asset is committed to the screen.
pub trait MediaProbe: Send + Sync {
    /// Makes exactly one load attempt and resolves once it succeeded or failed.
    fn probe(
        &self,
        source_uri: &str,
        kind: MediaKind,
    ) -> impl Future<Output = Result<(), LoadError>> + Send;
}

/// Probes assets on the local filesystem.
///
/// Images are fully decoded; videos are opened with ffmpeg and must yield one
/// decodable frame from their best video stream.
#[derive(Debug, Clone)]
pub struct FsProbe {
    media_root: PathBuf,
}

impl FsProbe {
    pub fn new(media_root: impl Into<PathBuf>) -> Self {
        Self {
            media_root: media_root.into(),
        }
    }

    /// Maps a source URI to a path; `file://` and bare paths are supported.
    pub fn resolve(&self, source_uri: &str) -> Result<PathBuf, LoadFailure> {
        let raw = source_uri.trim();
        let path = match raw.strip_prefix("file://") {
            Some(rest) => rest,
            None => {
                if let Some((scheme, _)) = raw.split_once("://") {
                    return Err(LoadFailure::UnsupportedScheme(scheme.to_string()));
                }
                raw
            }
        };
        let path = Path::new(path);
        if path.is_absolute() {
            Ok(path.to_path_buf())
        } else {
            Ok(self.media_root.join(path))
        }
    }
}

impl MediaProbe for FsProbe {
    async fn probe(&self, source_uri: &str, kind: MediaKind) -> Result<(), LoadError> {
        let fail = |reason| LoadError::new(source_uri, kind, reason);
        let path = self.resolve(source_uri).map_err(fail)?;
        let outcome = tokio::task::spawn_blocking(move || match kind {
            MediaKind::Image => check_image(&path),
            MediaKind::Video => check_video(&path),
        })
        .await;
        match outcome {
            Ok(Ok(())) => {
                debug!(source = source_uri, %kind, "probe ok");
                Ok(())
            }
            Ok(Err(reason)) => Err(fail(reason)),
            Err(join) => Err(fail(LoadFailure::Unreadable(join.to_string()))),
        }
    }
}

fn io_failure(err: io::Error) -> LoadFailure {
    match err.kind() {
        io::ErrorKind::NotFound => LoadFailure::NotFound,
        _ => LoadFailure::Unreadable(err.to_string()),
    }
}

fn check_image(path: &Path) -> Result<(), LoadFailure> {
    let img = image::ImageReader::open(path)
        .map_err(io_failure)?
        .with_guessed_format()
        .map_err(io_failure)?
        .decode()
        .map_err(|err| LoadFailure::Undecodable(err.to_string()))?;
    if img.width() == 0 || img.height() == 0 {
        return Err(LoadFailure::Undecodable("image has no pixels".into()));
    }
    Ok(())
}

fn init_ffmpeg() -> Result<(), LoadFailure> {
    static INIT: OnceLock<Result<(), String>> = OnceLock::new();
    INIT.get_or_init(|| {
        ffmpeg::init().map_err(|err| format!("ffmpeg initialization failed: {err}"))?;
        ffmpeg::util::log::set_level(ffmpeg::util::log::Level::Error);
        Ok(())
    })
    .clone()
    .map_err(LoadFailure::Unreadable)
}

/// Opens the container, picks the best video stream and decodes one frame.
fn check_video(path: &Path) -> Result<(), LoadFailure> {
    if fs::metadata(path).map_err(io_failure)?.len() == 0 {
        return Err(LoadFailure::Empty);
    }
    init_ffmpeg()?;
    let undecodable = |err: ffmpeg::Error| LoadFailure::Undecodable(err.to_string());

    let mut input = ffmpeg::format::input(path).map_err(undecodable)?;
    let stream = input
        .streams()
        .best(ffmpeg::media::Type::Video)
        .ok_or_else(|| LoadFailure::Undecodable("no video stream".into()))?;
    let stream_index = stream.index();
    let mut decoder = ffmpeg::codec::context::Context::from_parameters(stream.parameters())
        .and_then(|ctx| ctx.decoder().video())
        .map_err(undecodable)?;

    let mut frame = ffmpeg::frame::Video::empty();
    for (stream, packet) in input.packets().take(MAX_PACKETS) {
        if stream.index() != stream_index {
            continue;
        }
        if decoder.send_packet(&packet).is_err() {
            continue;
        }
        if decoder.receive_frame(&mut frame).is_ok() {
            debug!(
                path = %path.display(),
                width = frame.width(),
                height = frame.height(),
                "video frame decoded"
            );
            return Ok(());
        }
    }
    if decoder.send_eof().is_ok() && decoder.receive_frame(&mut frame).is_ok() {
        return Ok(());
    }
    Err(LoadFailure::Undecodable("no decodable video frame".into()))
}
