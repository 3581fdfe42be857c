use std::cell::RefCell;
use std::io::Cursor;
use std::rc::Rc;

use trellis::image::{ImageEvent, ImageLifecycle, ImageTicket};
use trellis::objects::ImageStatus;
use trellis::painting::DrawCommand;
use trellis::prelude::*;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn png(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    image::RgbaImage::new(width, height)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

#[derive(Default, Clone)]
struct Recorder(Rc<RefCell<Vec<&'static str>>>);

impl ImageLifecycle for Recorder {
    fn on_event(&mut self, _ticket: ImageTicket, event: &ImageEvent) {
        let name = match event {
            ImageEvent::Started => "started",
            ImageEvent::Progress { .. } => "progress",
            ImageEvent::Loaded(_) => "loaded",
            ImageEvent::Failed(_) => "failed",
        };
        self.0.borrow_mut().push(name);
    }
}

/// Top-left aligned image node with a 10x10 placeholder.
fn image_scene(config: RenderConfig, provider: MemoryImageProvider) -> (RenderPipeline, NodeId, NodeId) {
    let mut pipeline = RenderPipeline::new(config);
    let tree = pipeline.tree_mut();
    let root = tree.insert_node(Align::new(Alignment::TOP_LEFT));
    let image = tree.insert_node(ImageBox::new(provider));
    let placeholder = tree.insert_node(ConstrainedBox::tight_for(Some(10.0), Some(10.0)));
    tree.append_child(root, image).unwrap();
    tree.append_child(image, placeholder).unwrap();
    pipeline.set_root(root).unwrap();
    (pipeline, root, image)
}

fn frame(pipeline: &mut RenderPipeline) -> (RecordingSurface, trellis::stats::FrameStats) {
    let mut surface = RecordingSurface::new();
    let stats = pipeline.draw_frame(&mut surface).unwrap();
    (surface, stats)
}

#[test]
fn placeholder_is_replaced_on_the_next_frame() {
    init();
    let recorder = Recorder::default();
    let (mut pipeline, root, image) =
        image_scene(RenderConfig::default(), MemoryImageProvider::new("logo", png(40, 20)));
    pipeline.set_image_lifecycle(recorder.clone());

    let (surface, _) = frame(&mut pipeline);
    assert_eq!(pipeline.tree().size(image).unwrap(), Size::new(10.0, 10.0));
    assert_eq!(surface.count(|c| matches!(c, DrawCommand::Image { .. })), 0);

    let (surface, stats) = frame(&mut pipeline);
    assert_eq!(
        *recorder.0.borrow(),
        vec!["started", "progress", "progress", "loaded"]
    );
    assert_eq!(stats.image_notifications_applied, 4);
    assert_eq!(pipeline.tree().size(image).unwrap(), Size::new(40.0, 20.0));
    assert_eq!(pipeline.tree().size(root).unwrap(), Size::new(800.0, 600.0));
    assert!(matches!(
        pipeline.tree().get::<ImageBox>(image).unwrap().status(),
        ImageStatus::Loaded
    ));

    let drawn: Vec<Rect> = surface
        .commands()
        .iter()
        .filter_map(|c| match c {
            DrawCommand::Image { dst, .. } => Some(*dst),
            _ => None,
        })
        .collect();
    assert_eq!(drawn, vec![Rect::new(0.0, 0.0, 40.0, 20.0)]);
}

#[test]
fn decoded_images_are_cached_by_key() {
    init();
    let (mut pipeline, root, _) =
        image_scene(RenderConfig::default(), MemoryImageProvider::new("shared", png(8, 8)));
    frame(&mut pipeline);
    assert!(pipeline.images().cached("memory:shared").is_some());

    // Same key, different bytes: the cached decode wins
    let recorder = Recorder::default();
    pipeline.set_image_lifecycle(recorder.clone());
    let second = pipeline
        .tree_mut()
        .insert_node(ImageBox::new(MemoryImageProvider::new("shared", Vec::new())));
    let tree = pipeline.tree_mut();
    let old = tree.first_child(root).unwrap().unwrap();
    tree.set_child(root, Some(second)).unwrap();
    assert!(!tree.is_attached(old));

    frame(&mut pipeline);
    frame(&mut pipeline);
    assert!(recorder.0.borrow().ends_with(&["started", "loaded"]));
    assert_eq!(pipeline.tree().size(second).unwrap(), Size::new(8.0, 8.0));
}

#[test]
fn failed_load_keeps_the_placeholder() {
    init();
    let (mut pipeline, _, image) = image_scene(
        RenderConfig::default(),
        MemoryImageProvider::new("broken", b"not an image".to_vec()),
    );
    frame(&mut pipeline);
    frame(&mut pipeline);

    let tree = pipeline.tree();
    assert!(matches!(
        tree.get::<ImageBox>(image).unwrap().status(),
        ImageStatus::Failed(_)
    ));
    assert!(tree.get::<ImageBox>(image).unwrap().image().is_none());
    assert_eq!(tree.size(image).unwrap(), Size::new(10.0, 10.0));
}

#[test]
fn notifications_for_detached_nodes_are_dropped() {
    init();
    let (mut pipeline, root, image) =
        image_scene(RenderConfig::default(), MemoryImageProvider::new("gone", png(4, 4)));
    frame(&mut pipeline);

    pipeline.tree_mut().remove_child(root, image).unwrap();
    let (_, stats) = frame(&mut pipeline);
    assert_eq!(stats.image_notifications_applied, 0);
    assert_eq!(stats.image_notifications_dropped, 4);
    assert!(pipeline.tree().get::<ImageBox>(image).unwrap().image().is_none());
}

#[test]
fn reattached_node_requests_its_image_again() {
    init();
    let (mut pipeline, root, image) =
        image_scene(RenderConfig::default(), MemoryImageProvider::new("again", png(4, 4)));
    frame(&mut pipeline);

    // Re-adopted before the first load's notifications were drained
    let tree = pipeline.tree_mut();
    tree.remove_child(root, image).unwrap();
    tree.append_child(root, image).unwrap();

    let (_, stats) = frame(&mut pipeline);
    assert_eq!(stats.image_notifications_dropped, 4);
    let (_, stats) = frame(&mut pipeline);
    assert_eq!(stats.image_notifications_applied, 2);

    let tree = pipeline.tree();
    assert!(matches!(
        tree.get::<ImageBox>(image).unwrap().status(),
        ImageStatus::Loaded
    ));
    assert_eq!(tree.size(image).unwrap(), Size::new(4.0, 4.0));
}

#[test]
fn background_loads_arrive_after_waiting() {
    init();
    let (mut pipeline, _, image) = image_scene(
        RenderConfig::default().background_image_loading(true),
        MemoryImageProvider::new("threaded", png(30, 15)),
    );
    frame(&mut pipeline);
    pipeline.wait_for_images();
    assert_eq!(pipeline.images().in_flight(), 0);

    frame(&mut pipeline);
    assert_eq!(pipeline.tree().size(image).unwrap(), Size::new(30.0, 15.0));
}

#[test]
fn swapping_the_provider_ignores_the_old_load() {
    init();
    let (mut pipeline, _, image) = image_scene(
        RenderConfig::default().background_image_loading(true),
        MemoryImageProvider::new("first", png(30, 15)),
    );
    frame(&mut pipeline);
    pipeline
        .tree_mut()
        .update::<ImageBox, _>(image, |i| i.set_provider(MemoryImageProvider::new("second", png(12, 6))))
        .unwrap();
    pipeline.wait_for_images();

    // The first load's notifications are stale; layout requests the second
    let (_, stats) = frame(&mut pipeline);
    assert!(stats.image_notifications_dropped >= 1);
    pipeline.wait_for_images();
    frame(&mut pipeline);
    assert_eq!(pipeline.tree().size(image).unwrap(), Size::new(12.0, 6.0));
}
