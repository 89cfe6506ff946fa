//! End-to-end pipeline tests: scan, schedule, convert, report.

use std::path::Path;

use vmatforge_cli::config::ConvertConfig;
use vmatforge_cli::log::{ConversionLog, LOG_FILE_NAME};
use vmatforge_cli::runner::ConversionRunner;
use vmatforge_cli::scan::scan_descriptors;
use vmatforge_cli::scheduler::Scheduler;
use vmatforge_texture::buffer::RgbBuffer;
use vmatforge_texture::io::{load_rgb, write_rgb, OutputFormat};
use vmatforge_texture::ssbump::normal_from_ssbump_pixel;

fn write_texture(path: &Path, pixel: [u8; 3]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let mut buffer = RgbBuffer::new(4, 4);
    for x in 0..4 {
        for y in 0..4 {
            buffer.set(x, y, pixel);
        }
    }
    write_rgb(&buffer, path, OutputFormat::Png).unwrap();
}

fn write_descriptor(path: &Path, text: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, text).unwrap();
}

fn run_tree(config: &ConvertConfig) -> vmatforge_cli::scheduler::RunOutcome {
    let jobs = scan_descriptors(&config.source_root);
    let log = ConversionLog::create(&config.source_root.join(LOG_FILE_NAME)).unwrap();
    let runner = ConversionRunner::new(config, &log);
    Scheduler::new(runner, config.workers).run(jobs)
}

#[test]
fn converts_a_mixed_material_tree() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    write_texture(&root.join("brick/wall01.png"), [80, 80, 80]);
    write_texture(&root.join("brick/wall01-ssbump.png"), [128, 128, 128]);
    write_descriptor(
        &root.join("brick/wall01.vmt"),
        "\"LightmappedGeneric\"\n{\n\"$basetexture\" \"brick/wall01\"\n\"$bumpmap\" \"brick/wall01-ssbump\"\n\"$surfaceprop\" \"brick\"\n}\n",
    );
    write_descriptor(
        &root.join("decals/logo.vmt"),
        "\"UnlitGeneric\"\n{\n\"$basetexture\" \"decals/missing\"\n}\n",
    );
    write_descriptor(&root.join("water/canal.vmt"), "\"Water\"\n{\n}\n");

    let mut config = ConvertConfig::new(root);
    config.workers = 2;
    let outcome = run_tree(&config);

    assert_eq!(outcome.discovered, 3);
    assert_eq!(outcome.processed, 3);
    assert!(outcome.failed.is_empty());

    // Fully-resolved material gets every output.
    let vmat = std::fs::read_to_string(root.join("brick/wall01.vmat")).unwrap();
    assert!(vmat.contains("\"shader\"    \"csgo_complex.vfx\""));
    assert!(vmat.contains("\"TextureColor\"    \"materials/brick/wall01.png\""));
    assert!(vmat.contains("\"TextureNormal\"    \"materials/brick/wall01_normal.png\""));
    assert!(vmat.contains("\"TextureHeight\"    \"materials/brick/wall01_height.png\""));
    assert!(root.join("brick/wall01_roughness.png").exists());

    // Missing texture: converted anyway, color fields omitted.
    let decal = std::fs::read_to_string(root.join("decals/logo.vmat")).unwrap();
    assert!(decal.contains("csgo_simple.vfx"));
    assert!(!decal.contains("TextureColor"));

    // Unknown shader is flagged for manual review, not failed.
    let water = std::fs::read_to_string(root.join("water/canal.vmat")).unwrap();
    assert!(water.contains("needs_manual_conversion"));

    let log_text = std::fs::read_to_string(root.join(LOG_FILE_NAME)).unwrap();
    assert!(log_text.starts_with("Conversion Log\n====================\n"));
    assert!(log_text.contains("+ WARNING: texture file for 'decals/missing' not found"));
}

#[test]
fn ssbump_pixels_match_the_basis_projection() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    let pixel = [200, 90, 31];
    write_texture(&root.join("rock-ssbump.png"), pixel);
    write_descriptor(
        &root.join("rock.vmt"),
        "\"LightmappedGeneric\"\n{\n\"$bumpmap\" \"rock-ssbump\"\n}\n",
    );

    let mut config = ConvertConfig::new(root);
    config.workers = 1;
    let outcome = run_tree(&config);
    assert_eq!(outcome.processed, 1);

    let normal = load_rgb(&root.join("rock_normal.png")).unwrap();
    assert_eq!(normal.get(0, 0), normal_from_ssbump_pixel(pixel));

    // Height is the inverted red channel.
    let height = load_rgb(&root.join("rock_height.png")).unwrap();
    assert_eq!(height.get(0, 0)[0], 255 - pixel[0]);
}

#[test]
fn derived_outputs_are_deterministic_across_runs() {
    let dir_a = tempfile::tempdir().unwrap();
    let dir_b = tempfile::tempdir().unwrap();

    for root in [dir_a.path(), dir_b.path()] {
        write_texture(&root.join("wall.png"), [90, 120, 60]);
        write_descriptor(
            &root.join("wall.vmt"),
            "\"LightmappedGeneric\"\n{\n\"$basetexture\" \"wall\"\n}\n",
        );
        let mut config = ConvertConfig::new(root);
        config.workers = 1;
        let outcome = run_tree(&config);
        assert_eq!(outcome.processed, 1);
    }

    let a = std::fs::read(dir_a.path().join("wall_roughness.png")).unwrap();
    let b = std::fs::read(dir_b.path().join("wall_roughness.png")).unwrap();
    assert_eq!(a, b);

    let a = std::fs::read_to_string(dir_a.path().join("wall.vmat")).unwrap();
    let b = std::fs::read_to_string(dir_b.path().join("wall.vmat")).unwrap();
    assert_eq!(a, b);
}

#[test]
fn backup_and_removal_leave_a_complete_mirror() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("materials");
    let original = "\"UnlitGeneric\"\n{\n\"$basetexture\" \"gone\"\n}\n";
    write_descriptor(&root.join("brick/wall.vmt"), original);
    write_descriptor(&root.join("top.vmt"), original);

    let mut config = ConvertConfig::new(&root);
    config.workers = 2;
    config.backup_root = Some(dir.path().join("backup"));
    config.remove_originals = true;
    let outcome = run_tree(&config);
    assert_eq!(outcome.processed, 2);

    // Originals gone, mirror complete and byte-identical.
    assert!(!root.join("brick/wall.vmt").exists());
    assert!(!root.join("top.vmt").exists());
    assert_eq!(
        std::fs::read_to_string(dir.path().join("backup/brick/wall.vmt")).unwrap(),
        original
    );
    assert_eq!(
        std::fs::read_to_string(dir.path().join("backup/top.vmt")).unwrap(),
        original
    );
    assert!(root.join("brick/wall.vmat").exists());
}

#[test]
fn pause_and_resume_complete_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    for i in 0..6 {
        write_descriptor(
            &root.join(format!("m{i}.vmt")),
            "\"UnlitGeneric\"\n{\n}\n",
        );
    }

    let mut config = ConvertConfig::new(root);
    config.workers = 2;
    let jobs = scan_descriptors(root);
    let log = ConversionLog::create(&root.join(LOG_FILE_NAME)).unwrap();
    let runner = ConversionRunner::new(&config, &log);
    let scheduler = Scheduler::new(runner, config.workers);
    let handle = scheduler.handle();
    handle.pause();

    std::thread::scope(|scope| {
        let run = scope.spawn(|| scheduler.run(jobs));
        std::thread::sleep(std::time::Duration::from_millis(100));
        assert_eq!(handle.progress().processed, 0);

        handle.resume();
        let outcome = run.join().expect("run thread panicked");
        assert_eq!(outcome.processed, 6);
        assert!(!outcome.cancelled);
    });

    for i in 0..6 {
        assert!(root.join(format!("m{i}.vmat")).exists());
    }
}
