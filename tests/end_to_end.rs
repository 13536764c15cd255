mod common;

use common::recording::{Event, RecordingBackend, Resource};
use common::{ONE_TRIANGLE, checker, one_triangle, resource_root};
use sector_walk::{
    Camera, Engine, Error, Filter, FrameStatus, Input, InputFlag, RenderResources, ShaderFormat,
    World, projection_for,
};
use winit::event::ElementState;
use winit::keyboard::KeyCode;

fn engine() -> Engine<RecordingBackend> {
    Engine::with_assets(RecordingBackend::new(640, 480), one_triangle(), &checker()).unwrap()
}

#[test]
fn one_triangle_is_one_draw_of_three_vertices() {
    let mut engine = engine();
    assert_eq!(engine.render_frame().unwrap(), FrameStatus::Presented);

    let backend = engine.backend();
    assert_eq!(backend.presents, 1);
    assert_eq!(backend.draws.len(), 1);
    let draw = &backend.draws[0];
    assert_eq!(draw.vertex_count, 3);
    assert!(!draw.blended);
    assert_eq!(draw.sampler, "Nearest Sampler");
}

#[test]
fn cycling_the_filter_three_times_comes_back_to_nearest() {
    let mut engine = engine();
    let mut samplers = Vec::new();
    for _ in 0..3 {
        engine.on_input(InputFlag::CycleFilter);
        engine.render_frame().unwrap();
        samplers.push(engine.backend().draws.last().unwrap().sampler);
    }
    assert_eq!(
        samplers,
        vec!["Linear Sampler", "Mipmap Sampler", "Nearest Sampler"]
    );
    assert_eq!(engine.filter(), Filter::Nearest);
    assert_eq!(engine.filter().index(), 0);
}

#[test]
fn blend_toggle_switches_pipeline() {
    let mut engine = engine();
    engine.on_input(InputFlag::ToggleBlend);
    engine.render_frame().unwrap();
    engine.on_input(InputFlag::ToggleBlend);
    engine.render_frame().unwrap();

    let draws = &engine.backend().draws;
    assert!(draws[0].blended);
    assert_eq!(draws[0].pipeline, "World Pipeline (Blended)");
    assert!(!draws[1].blended);
    assert!(!engine.blend_enabled());
}

#[test]
fn empty_world_clears_without_drawing() {
    let world = World::parse("NUMPOLLIES 0\n").unwrap();
    let mut engine =
        Engine::with_assets(RecordingBackend::new(640, 480), world, &checker()).unwrap();

    assert_eq!(engine.render_frame().unwrap(), FrameStatus::Presented);
    assert_eq!(engine.backend().presents, 1);
    assert!(engine.backend().draws.is_empty());
}

#[test]
fn view_projection_combines_projection_and_camera() {
    let mut engine = engine();
    engine.on_input(InputFlag::Left);
    engine.render_frame().unwrap();
    engine.render_frame().unwrap();

    let turned = Camera {
        heading: 1.0,
        ..Camera::new()
    };
    let expected = projection_for(640, 480) * turned.model_view();
    let actual = engine.backend().draws[1].view_proj;
    assert!(actual.abs_diff_eq(expected, 1e-5));
}

#[test]
fn held_input_moves_the_camera_after_the_frame() {
    let mut engine = engine();
    engine.on_input(InputFlag::Forward);
    engine.render_frame().unwrap();

    // The first frame draws from where the camera started.
    let first = engine.backend().draws[0].view_proj;
    assert!(
        first.abs_diff_eq(projection_for(640, 480) * Camera::new().model_view(), 1e-6)
    );
    assert!((engine.camera().zpos + 0.05).abs() < 1e-6);

    // Nothing held on the next frame, so the camera stays put.
    engine.render_frame().unwrap();
    assert!((engine.camera().zpos + 0.05).abs() < 1e-6);
}

#[test]
fn unavailable_swapchain_skips_the_frame() {
    let mut engine = engine();
    engine.backend_mut().unavailable_frames = 1;
    engine.on_input(InputFlag::Forward);

    assert_eq!(engine.render_frame().unwrap(), FrameStatus::Skipped);
    assert!(engine.backend().draws.is_empty());
    assert_eq!(engine.backend().presents, 0);
    assert_eq!(*engine.camera(), Camera::new());

    assert_eq!(engine.render_frame().unwrap(), FrameStatus::Presented);
    assert_eq!(engine.backend().draws.len(), 1);
}

#[test]
fn minimized_window_skips_frames() {
    let mut engine = engine();
    engine.on_resize(0, 0);
    assert!(engine.projection().is_finite());
    assert_eq!(engine.render_frame().unwrap(), FrameStatus::Skipped);

    engine.on_resize(320, 240);
    assert_eq!(engine.render_frame().unwrap(), FrameStatus::Presented);
}

#[test]
fn depth_target_follows_the_frame_size() {
    let mut engine = engine();
    engine.render_frame().unwrap();
    engine.render_frame().unwrap();
    assert_eq!(engine.backend().created(Resource::DepthTarget).len(), 1);

    engine.on_resize(800, 600);
    engine.render_frame().unwrap();

    let backend = engine.backend();
    let depths = backend.created(Resource::DepthTarget);
    assert_eq!(depths.len(), 2);
    assert!(backend.released().contains(&(Resource::DepthTarget, depths[0])));
    assert_eq!(
        backend.events.last(),
        Some(&Event::Submitted {
            depth_target: depths[1]
        })
    );
}

#[test]
fn failed_depth_recreation_is_retried_next_frame() {
    let mut engine = engine();
    engine.on_resize(1024, 768);
    engine.backend_mut().failing_depth_targets = 1;

    assert_eq!(engine.render_frame().unwrap(), FrameStatus::Skipped);
    assert!(engine.backend().draws.is_empty());

    assert_eq!(engine.render_frame().unwrap(), FrameStatus::Presented);
    assert_eq!(engine.backend().draws.len(), 1);
}

#[test]
fn texture_gets_a_full_mip_chain() {
    let engine = engine();
    assert_eq!(engine.backend().created(Resource::Texture).len(), 1);
    assert_eq!(engine.backend().created(Resource::Sampler).len(), 3);
    assert_eq!(engine.backend().created(Resource::Pipeline).len(), 2);

    assert_eq!(engine.backend().mip_levels, vec![3]);
}

fn created_handles(backend: &RecordingBackend) -> Vec<(Resource, u32)> {
    backend
        .events
        .iter()
        .filter_map(|event| match event {
            Event::Created(kind, id) => Some((*kind, *id)),
            _ => None,
        })
        .collect()
}

#[test]
fn teardown_runs_in_reverse_creation_order() {
    let mut engine = engine();
    engine.render_frame().unwrap();
    let backend = engine.shutdown();

    let created = created_handles(&backend);
    let kinds: Vec<Resource> = created.iter().map(|&(kind, _)| kind).collect();
    assert_eq!(
        kinds,
        vec![
            Resource::Texture,
            Resource::Sampler,
            Resource::Sampler,
            Resource::Sampler,
            Resource::Pipeline,
            Resource::Pipeline,
            Resource::DepthTarget,
            Resource::Buffer,
        ]
    );

    let mut expected = created;
    expected.reverse();
    assert_eq!(backend.released(), expected);
}

#[test]
fn replaced_depth_target_is_released_once() {
    let mut engine = engine();
    engine.on_resize(800, 600);
    engine.render_frame().unwrap();
    let backend = engine.shutdown();

    let depths = backend.created(Resource::DepthTarget);
    let released = backend.released();
    for id in depths {
        let count = released
            .iter()
            .filter(|&&entry| entry == (Resource::DepthTarget, id))
            .count();
        assert_eq!(count, 1, "depth target {id} released {count} times");
    }
    assert_eq!(released.last(), Some(&(Resource::Texture, 0)));
}

#[test]
fn missing_shader_formats_fail_startup() {
    let mut backend = RecordingBackend::new(640, 480);
    backend.formats = vec![];
    let err = Engine::with_assets(backend, one_triangle(), &checker())
        .err()
        .unwrap();
    assert!(matches!(
        err,
        Error::ResourceCreationFailed {
            resource: "pipeline",
            ..
        }
    ));
}

#[test]
fn spirv_only_backends_still_get_pipelines() {
    let mut backend = RecordingBackend::new(640, 480);
    backend.formats = vec![ShaderFormat::SpirV];
    let mut engine = Engine::with_assets(backend, one_triangle(), &checker()).unwrap();
    assert_eq!(engine.render_frame().unwrap(), FrameStatus::Presented);
}

#[test]
fn resource_failures_are_fatal() {
    for kind in [
        Resource::Texture,
        Resource::Sampler,
        Resource::Pipeline,
        Resource::DepthTarget,
        Resource::Buffer,
    ] {
        let mut backend = RecordingBackend::new(640, 480);
        backend.failing_resource = Some(kind);
        let result = Engine::with_assets(backend, one_triangle(), &checker());
        assert!(
            matches!(result, Err(Error::ResourceCreationFailed { .. })),
            "{kind:?} failure was not fatal"
        );

        // Whatever was created before the failure is handed back, newest first.
        let mut backend = RecordingBackend::new(640, 480);
        backend.failing_resource = Some(kind);
        let result = RenderResources::create(&mut backend, &one_triangle(), &checker());
        assert!(
            matches!(result, Err(Error::ResourceCreationFailed { .. })),
            "{kind:?} failure was not reported"
        );

        let mut expected = created_handles(&backend);
        expected.reverse();
        assert_eq!(backend.released(), expected, "{kind:?} failure leaked handles");
    }
}

#[test]
fn failed_startup_releases_partial_set_in_reverse() {
    let mut backend = RecordingBackend::new(640, 480);
    backend.failing_resource = Some(Resource::Buffer);
    assert!(RenderResources::create(&mut backend, &one_triangle(), &checker()).is_err());

    let kinds: Vec<Resource> = backend.released().iter().map(|&(kind, _)| kind).collect();
    assert_eq!(
        kinds,
        vec![
            Resource::DepthTarget,
            Resource::Pipeline,
            Resource::Pipeline,
            Resource::Sampler,
            Resource::Sampler,
            Resource::Sampler,
            Resource::Texture,
        ]
    );
}

#[test]
fn keyboard_drives_the_engine() {
    let mut engine = engine();
    let mut input = Input::new();

    input.key(KeyCode::KeyF, ElementState::Pressed, false);
    input.key(KeyCode::ArrowUp, ElementState::Pressed, false);
    for _ in 0..3 {
        for flag in input.flags() {
            engine.on_input(flag);
        }
        input.end_frame();
        engine.render_frame().unwrap();
        // Auto-repeat while held must not cycle again.
        input.key(KeyCode::KeyF, ElementState::Pressed, true);
    }

    assert_eq!(engine.filter(), Filter::Linear);
    assert!((engine.camera().zpos + 0.15).abs() < 1e-5);
}

#[test]
fn starts_from_the_bundled_data_directory() {
    let mut engine =
        Engine::init(RecordingBackend::new(640, 480), env!("CARGO_MANIFEST_DIR")).unwrap();
    assert!(engine.world().triangle_count() > 0);
    assert_eq!(engine.render_frame().unwrap(), FrameStatus::Presented);
    assert_eq!(
        engine.backend().draws[0].vertex_count as usize,
        engine.world().vertex_count()
    );
}

#[test]
fn single_triangle_world_from_disk() {
    let root = resource_root("single_triangle", ONE_TRIANGLE);
    let mut engine = Engine::init(RecordingBackend::new(640, 480), &root).unwrap();

    assert_eq!(engine.render_frame().unwrap(), FrameStatus::Presented);
    assert_eq!(engine.backend().draws.len(), 1);
    assert_eq!(engine.backend().draws[0].vertex_count, 3);

    for _ in 0..3 {
        engine.on_input(InputFlag::CycleFilter);
    }
    assert_eq!(engine.filter().index(), 0);
}

#[test]
fn malformed_world_on_disk_is_fatal() {
    let root = resource_root("truncated_world", "NUMPOLLIES 1\n0 0 0 0 0\n");
    let result = Engine::init(RecordingBackend::new(640, 480), &root);
    assert!(matches!(result, Err(Error::MalformedWorldFile { .. })));
}

#[test]
fn missing_data_directory_is_fatal() {
    let result = Engine::init(RecordingBackend::new(640, 480), "/definitely/not/here");
    assert!(matches!(result, Err(Error::Io { .. })));
}
