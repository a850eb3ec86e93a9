use signage_player::error::LoadFailure;
use signage_player::probe::{FsProbe, MediaProbe};
use signage_player::sequence::MediaKind;
use std::path::Path;

fn write_png(path: &Path) {
    image::RgbaImage::from_pixel(16, 9, image::Rgba([10, 20, 30, 255]))
        .save(path)
        .unwrap();
}

/// Two 16x16 grey frames of uncompressed 4:2:0 video.
fn write_y4m(path: &Path) {
    let mut bytes = b"YUV4MPEG2 W16 H16 F25:1 Ip A1:1 C420jpeg\n".to_vec();
    for _ in 0..2 {
        bytes.extend_from_slice(b"FRAME\n");
        bytes.extend_from_slice(&[0x80; 16 * 16 + 2 * 8 * 8]);
    }
    std::fs::write(path, bytes).unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn decodable_image_passes() {
    let dir = tempfile::tempdir().unwrap();
    write_png(&dir.path().join("promo.png"));
    let probe = FsProbe::new(dir.path());
    probe.probe("promo.png", MediaKind::Image).await.unwrap();

    let absolute = format!("file://{}", dir.path().join("promo.png").display());
    probe.probe(&absolute, MediaKind::Image).await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn corrupt_image_is_undecodable() {
    let dir = tempfile::tempdir().unwrap();
    let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE0];
    bytes.extend_from_slice(b"definitely not a jpeg body");
    std::fs::write(dir.path().join("broken.jpg"), bytes).unwrap();

    let err = FsProbe::new(dir.path())
        .probe("broken.jpg", MediaKind::Image)
        .await
        .unwrap_err();
    assert_eq!(err.source_uri, "broken.jpg");
    assert_eq!(err.kind, MediaKind::Image);
    assert!(matches!(err.reason, LoadFailure::Undecodable(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn missing_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let probe = FsProbe::new(dir.path());
    for kind in [MediaKind::Image, MediaKind::Video] {
        let err = probe.probe("nowhere/file.bin", kind).await.unwrap_err();
        assert_eq!(err.reason, LoadFailure::NotFound);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn decodable_video_passes() {
    let dir = tempfile::tempdir().unwrap();
    write_y4m(&dir.path().join("clip.y4m"));
    FsProbe::new(dir.path())
        .probe("clip.y4m", MediaKind::Video)
        .await
        .unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn header_only_mp4_is_undecodable() {
    let dir = tempfile::tempdir().unwrap();
    let mut mp4 = vec![0x00, 0x00, 0x00, 0x18];
    mp4.extend_from_slice(b"ftypisom");
    mp4.extend_from_slice(&[0xDE; 12]);
    std::fs::write(dir.path().join("clip.mp4"), &mp4).unwrap();
    std::fs::write(dir.path().join("free.mov"), b"\0\0\0\0freeGARBAGE GARBAGE").unwrap();
    std::fs::write(dir.path().join("notes.mp4"), b"just some text, not a video").unwrap();

    let probe = FsProbe::new(dir.path());
    for name in ["clip.mp4", "free.mov", "notes.mp4"] {
        let err = probe.probe(name, MediaKind::Video).await.unwrap_err();
        assert!(
            matches!(err.reason, LoadFailure::Undecodable(_)),
            "{name}: {:?}",
            err.reason
        );
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn empty_video_is_reported_empty() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("empty.mp4"), b"").unwrap();
    let err = FsProbe::new(dir.path())
        .probe("empty.mp4", MediaKind::Video)
        .await
        .unwrap_err();
    assert_eq!(err.reason, LoadFailure::Empty);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn remote_sources_are_unsupported() {
    let err = FsProbe::new("/srv/media")
        .probe("https://cdn.example/promo.mp4", MediaKind::Video)
        .await
        .unwrap_err();
    assert_eq!(err.reason, LoadFailure::UnsupportedScheme("https".into()));
    assert!(err.to_string().contains("https://cdn.example/promo.mp4"));
}
