//! End-to-end pipeline tests: headless chain and controller flows.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc;

use voxform_block::export::StructureDocument;
use voxform_block::FallableBehaviour;
use voxform_core::ColourSpace;
use voxform_pipeline::{
    run_headless, Action, AssignParams, DebugOptions, ExportParams, HeadlessConfig, ImportParams,
    JobController, JobOutcome, JobPayload, JobResponse, JobResult, VoxeliseJobParams,
};
use voxform_voxel::VoxeliseParams;

/// Write a single-triangle OBJ with a solid red material.
fn write_red_triangle_obj(dir: &Path) -> PathBuf {
    fs::write(dir.join("red.mtl"), "newmtl red\nKd 1.0 0.0 0.0\n").unwrap();
    let obj = "\
mtllib red.mtl
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
vt 0.0 0.0
vt 1.0 0.0
vt 0.0 1.0
usemtl red
f 1/1 2/2 3/3
";
    let path = dir.join("red.obj");
    fs::write(&path, obj).unwrap();
    path
}

/// Write a white/red atlas and a palette enabling both blocks.
fn write_white_red_palette(dir: &Path) -> (PathBuf, PathBuf) {
    let atlas = r#"{
  "blocks": [
    { "name": "white", "colour": { "r": 1.0, "g": 1.0, "b": 1.0, "a": 1.0 } },
    { "name": "red", "colour": { "r": 1.0, "g": 0.0, "b": 0.0, "a": 1.0 } }
  ]
}"#;
    let atlas_path = dir.join("atlas.json");
    fs::write(&atlas_path, atlas).unwrap();

    let palette = r#"{ "blocks": ["white", "red"] }"#;
    let palette_path = dir.join("palette.json");
    fs::write(&palette_path, palette).unwrap();

    (atlas_path, palette_path)
}

fn fixture_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("voxform-pipeline-{name}"));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn voxelise_params(desired_height: u32) -> VoxeliseJobParams {
    VoxeliseJobParams {
        voxeliser: "raster".to_string(),
        params: VoxeliseParams {
            desired_height,
            ..VoxeliseParams::default()
        },
    }
}

fn assign_params(atlas: PathBuf, palette: PathBuf, fallable: FallableBehaviour) -> AssignParams {
    AssignParams {
        atlas,
        palette,
        assigner: "nearest".to_string(),
        colour_space: ColourSpace::Rgb,
        fallable,
    }
}

/// Submit a job and block until its terminal response arrives.
fn run_job(controller: &mut JobController, payload: JobPayload) -> JobResponse {
    let (tx, rx) = mpsc::channel();
    controller
        .submit(payload, Box::new(move |response| tx.send(response).unwrap()))
        .unwrap();
    loop {
        controller.poll_blocking();
        if let Ok(response) = rx.try_recv() {
            return response;
        }
    }
}

#[test]
fn headless_red_triangle_resolves_to_red_blocks() {
    let dir = fixture_dir("headless-red");
    let obj_path = write_red_triangle_obj(&dir);
    let (atlas_path, palette_path) = write_white_red_palette(&dir);
    let export_path = dir.join("structure.json");

    let config = HeadlessConfig {
        import: ImportParams { filepath: obj_path },
        voxelise: voxelise_params(4),
        assign: assign_params(atlas_path, palette_path, FallableBehaviour::DoNothing),
        export: ExportParams {
            exporter: "json".to_string(),
            filepath: export_path.clone(),
        },
        debug: DebugOptions::default(),
    };

    run_headless(&config).unwrap();

    let text = fs::read_to_string(&export_path).unwrap();
    let document: StructureDocument = serde_json::from_str(&text).unwrap();

    assert!(!document.blocks.is_empty());
    let red_index = document
        .palette
        .iter()
        .position(|b| b.name == "red")
        .unwrap() as u16;
    for placement in &document.blocks {
        assert_eq!(placement.palette_index, red_index);
    }
}

#[test]
fn controller_runs_the_full_pipeline() {
    let dir = fixture_dir("controller-full");
    let obj_path = write_red_triangle_obj(&dir);
    let (atlas_path, palette_path) = write_white_red_palette(&dir);

    let mut controller = JobController::new();

    let response = run_job(
        &mut controller,
        JobPayload::Import(ImportParams { filepath: obj_path }),
    );
    let JobOutcome::Success(JobResult::Import(import)) = response.outcome else {
        panic!("import failed: {:?}", response.outcome);
    };
    assert_eq!(import.triangle_count, 1);

    let response = run_job(&mut controller, JobPayload::Voxelise(voxelise_params(4)));
    let JobOutcome::Success(JobResult::Voxelise(voxelise)) = response.outcome else {
        panic!("voxelise failed: {:?}", response.outcome);
    };
    assert!(voxelise.voxel_count > 0);

    let response = run_job(
        &mut controller,
        JobPayload::Assign(assign_params(
            atlas_path,
            palette_path,
            FallableBehaviour::DoNothing,
        )),
    );
    let JobOutcome::Success(JobResult::Assign(assign)) = response.outcome else {
        panic!("assign failed: {:?}", response.outcome);
    };
    assert_eq!(assign.block_count, voxelise.voxel_count);
    assert_eq!(assign.distinct_blocks, 1);

    let response = run_job(&mut controller, JobPayload::RenderBlockMesh);
    let JobOutcome::Success(JobResult::RenderBlockMesh(buffer)) = response.outcome else {
        panic!("render failed: {:?}", response.outcome);
    };
    assert_eq!(buffer.instances.len(), assign.block_count);
    assert_eq!(buffer.palette_colours.len(), 2);
}

#[test]
fn fully_excluded_palette_fails_known_and_worker_survives() {
    let dir = fixture_dir("excluded-palette");
    let obj_path = write_red_triangle_obj(&dir);
    let (atlas_path, palette_path) = write_white_red_palette(&dir);

    // An atlas/palette containing only fallable blocks, all excluded
    let sand_atlas = r#"{
  "blocks": [
    { "name": "sand", "colour": { "r": 0.9, "g": 0.85, "b": 0.6, "a": 1.0 } }
  ]
}"#;
    let sand_atlas_path = dir.join("sand_atlas.json");
    fs::write(&sand_atlas_path, sand_atlas).unwrap();
    let sand_palette_path = dir.join("sand_palette.json");
    fs::write(&sand_palette_path, r#"{ "blocks": ["sand"] }"#).unwrap();

    let mut controller = JobController::new();

    let response = run_job(
        &mut controller,
        JobPayload::Import(ImportParams { filepath: obj_path }),
    );
    assert!(matches!(response.outcome, JobOutcome::Success(_)));

    let response = run_job(&mut controller, JobPayload::Voxelise(voxelise_params(4)));
    assert!(matches!(response.outcome, JobOutcome::Success(_)));

    // Every candidate excluded: a known error, not a crash
    let response = run_job(
        &mut controller,
        JobPayload::Assign(assign_params(
            sand_atlas_path,
            sand_palette_path,
            FallableBehaviour::ExcludeFallable,
        )),
    );
    let JobOutcome::KnownError { message } = response.outcome else {
        panic!("expected a known error, got {:?}", response.outcome);
    };
    assert!(!message.is_empty());

    // The worker loop keeps processing jobs afterwards
    let response = run_job(
        &mut controller,
        JobPayload::Assign(assign_params(
            atlas_path,
            palette_path,
            FallableBehaviour::DoNothing,
        )),
    );
    assert!(matches!(
        response.outcome,
        JobOutcome::Success(JobResult::Assign(_))
    ));
    assert!(!controller.is_busy(Action::Assign));
}

#[test]
fn stage_order_violation_is_a_known_error() {
    let mut controller = JobController::new();

    let response = run_job(&mut controller, JobPayload::Voxelise(voxelise_params(4)));
    let JobOutcome::KnownError { message } = response.outcome else {
        panic!("expected a known error, got {:?}", response.outcome);
    };
    assert!(message.contains("import"));
}

#[test]
fn status_messages_reset_between_stages() {
    let dir = fixture_dir("status-reset");
    // Triangle with a material library that cannot be found: the import
    // stage collects a warning
    let obj = "\
mtllib missing.mtl
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
f 1 2 3
";
    let obj_path = dir.join("warned.obj");
    fs::write(&obj_path, obj).unwrap();

    let mut controller = JobController::new();

    let response = run_job(
        &mut controller,
        JobPayload::Import(ImportParams { filepath: obj_path }),
    );
    assert!(matches!(response.outcome, JobOutcome::Success(_)));

    // The voxelise response carries only its own stage's messages
    let response = run_job(&mut controller, JobPayload::Voxelise(voxelise_params(2)));
    assert!(matches!(response.outcome, JobOutcome::Success(_)));
    for message in &response.status_messages {
        assert!(!message.message.contains("material library"));
    }
}
