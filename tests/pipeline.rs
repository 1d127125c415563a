//! End-to-end runs through the real `image`/`webp` backend.
//!
//! Sources are small synthetic images and the catalogs are scaled down so the
//! encoders stay fast in debug builds. The full-size standard catalog is
//! covered by the unit tests against the mock backend.

use gallery_variants::catalog::{Catalog, ProcessingRule};
use gallery_variants::favicon::{self, icon_records};
use gallery_variants::imaging::{OutputFormat, Quality, Rgb, RustBackend};
use gallery_variants::process::{self, ImageProcessConfig, ProcessEvent};
use gallery_variants::types::{ImageRecord, SourceImage};
use image::{ImageEncoder, Rgba, RgbaImage};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const BRAND: Rgb = Rgb::new(67, 118, 198);

fn small_catalog() -> Catalog {
    let q = Quality::new(75);
    Catalog {
        standard: vec![
            ProcessingRule::max_dim(90, OutputFormat::WebP, q),
            ProcessingRule::max_dim(120, OutputFormat::WebP, q),
            ProcessingRule::crop(191, 100, OutputFormat::Png, Quality::new(90)).with_suffix("meta"),
        ],
        original: ProcessingRule::max_dim(240, OutputFormat::WebP, Quality::new(95))
            .without_size_suffix(),
        favicon: vec![
            ProcessingRule::max_dim(32, OutputFormat::Png, Quality::new(95))
                .named("favicon")
                .enlarged(),
            ProcessingRule::max_dim(32, OutputFormat::WebP, Quality::new(95))
                .named("favicon")
                .enlarged(),
            ProcessingRule::max_dim(48, OutputFormat::Png, Quality::new(95))
                .named("pwa-icon")
                .enlarged()
                .with_background(BRAND),
        ],
        default_icon_size: 32,
    }
}

fn write_jpeg(dir: &Path, file: &str, width: u32, height: u32) -> PathBuf {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });
    let path = dir.join(file);
    img.save(&path).unwrap();
    path
}

fn transparent_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));
    let mut buf = Vec::new();
    image::codecs::png::PngEncoder::new(&mut buf)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgba8)
        .unwrap();
    buf
}

fn record(id: u64, name: &str, author: &str, source_path: PathBuf) -> ImageRecord {
    ImageRecord {
        id,
        name: name.into(),
        author_name: Some(author.into()),
        source_path,
        ..Default::default()
    }
}

fn sorted_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<_> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn library_batch_renders_landscape_and_portrait() {
    let tmp = TempDir::new().unwrap();
    let originals = tmp.path().join("originals");
    std::fs::create_dir(&originals).unwrap();
    let processed = tmp.path().join("processed");

    let records = vec![
        record(1, "Dawn", "Ada", write_jpeg(&originals, "1.jpg", 400, 200)),
        record(2, "Tower", "Ada", write_jpeg(&originals, "2.jpg", 150, 300)),
        record(3, "Gone", "Bob", originals.join("3.jpg")),
    ];

    let backend = RustBackend::new();
    let batch = process::process_library_with_backend(
        &backend,
        &small_catalog(),
        &records,
        &processed,
        None,
    )
    .unwrap();

    assert_eq!(batch.results.len(), 2);
    assert_eq!(batch.skipped.len(), 1);
    assert_eq!(batch.skipped[0].name, "Gone");

    assert_eq!(
        sorted_files(&processed),
        vec![
            "ada-dawn-120x60.webp",
            "ada-dawn-90x45.webp",
            "ada-dawn-meta.png",
            "ada-dawn.webp",
            "ada-tower-45x90.webp",
            "ada-tower-60x120.webp",
            "ada-tower-meta.png",
            "ada-tower.webp",
        ]
    );

    // Recorded sizes match what is actually on disk.
    for result in &batch.results {
        for variant in result.variants.iter().chain(result.original.iter()) {
            let dims = image::image_dimensions(processed.join(&variant.file_name)).unwrap();
            assert_eq!(dims, (variant.width, variant.height), "{}", variant.file_name);
        }
    }

    let tower = batch.results.iter().find(|r| r.image_id == 2).unwrap();
    let original = tower.original.as_ref().unwrap();
    assert_eq!((original.width, original.height), (120, 240));
    assert_eq!(original.quality, 95);
}

#[test]
fn batch_results_match_disk_when_identities_share_prefixes() {
    let tmp = TempDir::new().unwrap();
    let processed = tmp.path().join("processed");
    let mut records = vec![record(
        100,
        "Dawn",
        "Ada",
        write_jpeg(tmp.path(), "dawn.jpg", 160, 80),
    )];
    for i in 0..12 {
        let file = format!("dawn{i}.jpg");
        records.push(record(
            i,
            &format!("Dawn{i}"),
            "Ada",
            write_jpeg(tmp.path(), &file, 160, 80),
        ));
    }

    let batch = process::process_library_with_backend(
        &RustBackend::new(),
        &small_catalog(),
        &records,
        &processed,
        None,
    )
    .unwrap();

    assert_eq!(batch.results.len(), 13);
    let mut named = 0;
    for result in &batch.results {
        for variant in result.variants.iter().chain(result.original.iter()) {
            assert!(processed.join(&variant.file_name).is_file(), "{}", variant.file_name);
            named += 1;
        }
    }
    assert_eq!(named, 13 * 4);
    assert_eq!(sorted_files(&processed).len(), named);
}

#[test]
fn encoder_rejection_only_drops_its_rule() {
    let tmp = TempDir::new().unwrap();
    let rules = vec![
        ProcessingRule::max_dim(50, OutputFormat::Png, Quality::new(90)),
        ProcessingRule::max_dim(17000, OutputFormat::WebP, Quality::new(90)).enlarged(),
    ];
    let data = std::fs::read(write_jpeg(tmp.path(), "line.jpg", 100, 1)).unwrap();
    let source = SourceImage::new(1, "ada-line", data);
    let out = tmp.path().join("out");
    std::fs::create_dir(&out).unwrap();

    let rendered = process::process_source(
        &RustBackend::new(),
        &small_catalog(),
        &source,
        &ImageProcessConfig::new(&out).with_rules(&rules),
        None,
    )
    .unwrap();

    assert_eq!(rendered.variants.len(), 1);
    assert_eq!(rendered.variants[0].format, "png");
    assert_eq!(sorted_files(&out), vec!["ada-line-50x1.png"]);
}

#[test]
fn rerun_produces_the_same_tree() {
    let tmp = TempDir::new().unwrap();
    let processed = tmp.path().join("processed");
    let records = vec![record(
        1,
        "Dawn",
        "Ada",
        write_jpeg(tmp.path(), "1.jpg", 400, 200),
    )];
    let backend = RustBackend::new();
    let catalog = small_catalog();

    process::process_library_with_backend(&backend, &catalog, &records, &processed, None).unwrap();
    let first = sorted_files(&processed);
    std::fs::write(processed.join("leftover.txt"), "x").unwrap();

    process::process_library_with_backend(&backend, &catalog, &records, &processed, None).unwrap();
    assert_eq!(sorted_files(&processed), first);
}

#[test]
fn corrupt_source_is_skipped_with_event() {
    let tmp = TempDir::new().unwrap();
    let processed = tmp.path().join("processed");
    let bad = tmp.path().join("bad.jpg");
    std::fs::write(&bad, b"not an image").unwrap();
    let records = vec![record(1, "Bad", "Ada", bad)];

    let (tx, rx) = std::sync::mpsc::channel();
    let batch = process::process_library_with_backend(
        &RustBackend::new(),
        &small_catalog(),
        &records,
        &processed,
        Some(&tx),
    )
    .unwrap();
    drop(tx);

    assert!(batch.results.is_empty());
    assert_eq!(batch.skipped.len(), 1);
    assert!(
        rx.into_iter()
            .any(|e| matches!(e, ProcessEvent::ImageSkipped { ref name, .. } if name == "Bad"))
    );
    assert!(sorted_files(&processed).is_empty());
}

#[test]
fn favicon_groups_and_background_fill() {
    let tmp = TempDir::new().unwrap();
    let icons = tmp.path().join("icons");
    let source = SourceImage::new(0, "favicon", transparent_png(16, 16));
    let catalog = small_catalog();

    let groups =
        favicon::process_favicon(&RustBackend::new(), &catalog, &source, &icons, None).unwrap();

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].name, "favicon");
    assert_eq!(groups[0].variants.len(), 2);
    assert_eq!(groups[1].name, "pwa-icon");

    assert_eq!(
        sorted_files(&icons),
        vec![
            "favicon-32x32.png",
            "favicon-32x32.webp",
            "pwa-icon-48x48.png"
        ]
    );

    let pwa = image::open(icons.join("pwa-icon-48x48.png")).unwrap().to_rgba8();
    assert_eq!(pwa.get_pixel(24, 24).0, [67, 118, 198, 255]);

    let plain = image::open(icons.join("favicon-32x32.png")).unwrap().to_rgba8();
    assert_eq!(plain.get_pixel(16, 16).0[3], 0);

    let records = icon_records(&groups, catalog.default_icon_size);
    assert_eq!(records.len(), 4);
    assert_eq!(records.iter().filter(|r| r.default_icon).count(), 2);
    assert_eq!(records.last().unwrap().file_name, "favicon.ico");
}
