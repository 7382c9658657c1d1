//! Session scenarios against real image and annotation files.

use super::*;
use crate::canvas::{Modifiers, PointerButton, PointerButtons};
use crate::geometry::Point;
use tempfile::{TempDir, tempdir};

fn write_png(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    image::RgbImage::new(100, 100).save(&path).unwrap();
    path
}

fn session_with_image() -> (TempDir, Session) {
    let dir = tempdir().unwrap();
    let image = write_png(dir.path(), "scene.png");
    let mut config = AppConfig::new();
    config.preferences.output_dir = dir.path().join("out");
    let mut session = Session::new(config);
    session.open_image(&image).unwrap();
    (dir, session)
}

/// Draw a rectangle with the pointer and apply the resulting events.
fn draw(session: &mut Session, from: (f32, f32), to: (f32, f32)) -> ShapeId {
    let canvas = session.canvas_mut();
    canvas.set_editing(false);
    canvas.mouse_press(Point::from(from), PointerButton::Left, Modifiers::default());
    canvas.mouse_move(Point::from(to), PointerButtons::NONE);
    canvas.mouse_press(Point::from(to), PointerButton::Left, Modifiers::default());
    canvas.set_editing(true);
    session.handle_events();
    session.canvas().shapes().last().unwrap().id()
}

fn draw_labeled(session: &mut Session, from: (f32, f32), to: (f32, f32), label: &str) -> ShapeId {
    let id = draw(session, from, to);
    assert_eq!(session.assign_label(Some(label)).unwrap(), Some(id));
    id
}

fn click(session: &mut Session, pos: (f32, f32)) {
    let canvas = session.canvas_mut();
    canvas.mouse_move(Point::from(pos), PointerButtons::NONE);
    canvas.mouse_press(Point::from(pos), PointerButton::Left, Modifiers::default());
    canvas.mouse_release(Point::from(pos), PointerButton::Left);
    session.handle_events();
}

fn label_texts(session: &Session) -> Vec<&str> {
    session
        .labels()
        .items()
        .iter()
        .map(|item| item.text.as_str())
        .collect()
}

// ============================================================================
// Opening
// ============================================================================

#[test]
fn test_open_image_reads_size_and_depth() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("gray.png");
    image::GrayImage::new(30, 20).save(&path).unwrap();

    let mut session = Session::new(AppConfig::new());
    session.open_image(&path).unwrap();

    let info = session.image().unwrap();
    assert_eq!((info.width, info.height, info.depth), (30, 20, 1));
    assert_eq!(session.canvas().image_size(), Size::new(30, 20));
}

#[test]
fn test_open_missing_image_changes_nothing() {
    let (dir, mut session) = session_with_image();
    draw_labeled(&mut session, (5.0, 5.0), (45.0, 35.0), "cat");

    let result = session.open_image(&dir.path().join("missing.png"));
    assert!(matches!(
        result,
        Err(AnnotateError::Format(FormatError::ImageNotFound { .. }))
    ));
    assert_eq!(session.image().unwrap().path, dir.path().join("scene.png"));
    assert_eq!(session.canvas().shapes().len(), 1);
    assert_eq!(session.labels().len(), 1);
}

#[test]
fn test_open_unreadable_image_fails() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("fake.png");
    std::fs::write(&path, b"not an image").unwrap();

    let mut session = Session::new(AppConfig::new());
    assert!(session.open_image(&path).is_err());
    assert!(session.image().is_none());
}

#[test]
fn test_open_image_clears_label_list() {
    let (dir, mut session) = session_with_image();
    draw_labeled(&mut session, (5.0, 5.0), (45.0, 35.0), "cat");

    let other = write_png(dir.path(), "other.png");
    session.open_image(&other).unwrap();

    assert!(session.labels().is_empty());
    assert!(session.canvas().shapes().is_empty());
    // Label colors survive across images
    assert!(session.unique_labels().contains("cat"));
}

// ============================================================================
// Labeling
// ============================================================================

#[test]
fn test_new_shape_waits_for_label() {
    let (_dir, mut session) = session_with_image();
    let id = draw(&mut session, (5.0, 5.0), (45.0, 35.0));

    assert_eq!(session.pending_label(), Some(id));
    assert!(session.labels().is_empty());

    session.assign_label(Some("cat")).unwrap();
    assert_eq!(session.pending_label(), None);
    assert_eq!(label_texts(&session), vec!["cat"]);
    assert_eq!(session.labels().items()[0].shape, id);
}

#[test]
fn test_label_colors_follow_unique_labels() {
    let (_dir, mut session) = session_with_image();
    let a = draw_labeled(&mut session, (5.0, 5.0), (20.0, 20.0), "cat");
    let b = draw_labeled(&mut session, (30.0, 30.0), (40.0, 40.0), "cat");
    let c = draw_labeled(&mut session, (50.0, 50.0), (60.0, 60.0), "dog");

    let items = session.labels().items();
    assert_eq!(items[0].color, items[1].color);
    assert_ne!(items[0].color, items[2].color);

    let canvas = session.canvas();
    let style_a = canvas.shape(a).unwrap().style;
    assert_eq!(style_a, canvas.shape(b).unwrap().style);
    assert_ne!(style_a, canvas.shape(c).unwrap().style);
    assert_eq!(style_a.line, items[0].color.with_alpha(128));
}

#[test]
fn test_cancelled_label_drops_shape() {
    let (_dir, mut session) = session_with_image();
    draw(&mut session, (5.0, 5.0), (45.0, 35.0));

    assert_eq!(session.assign_label(None).unwrap(), None);
    assert!(session.canvas().shapes().is_empty());
    assert!(session.labels().is_empty());
    assert!(!session.canvas().is_shape_restorable());
}

#[test]
fn test_empty_label_rejected() {
    let (_dir, mut session) = session_with_image();
    draw(&mut session, (5.0, 5.0), (45.0, 35.0));

    let result = session.assign_label(Some(""));
    assert!(matches!(
        result,
        Err(AnnotateError::Canvas(CanvasError::EmptyLabel))
    ));
    assert_eq!(session.canvas().shapes().len(), 1);
}

#[test]
fn test_next_label_used_once() {
    let (_dir, mut session) = session_with_image();
    session.set_next_label(Some("car")).unwrap();
    let id = draw(&mut session, (5.0, 5.0), (45.0, 35.0));

    assert_eq!(session.pending_label(), None);
    assert_eq!(session.next_label(), None);
    assert_eq!(
        session.canvas().shape(id).unwrap().label.as_deref(),
        Some("car")
    );
    assert_eq!(label_texts(&session), vec!["car"]);

    let next = draw(&mut session, (50.0, 50.0), (60.0, 60.0));
    assert_eq!(session.pending_label(), Some(next));
    assert_eq!(session.canvas().shape(next).unwrap().label, None);
}

#[test]
fn test_next_label_can_be_cleared() {
    let (_dir, mut session) = session_with_image();
    assert!(matches!(
        session.set_next_label(Some("")),
        Err(AnnotateError::Canvas(CanvasError::EmptyLabel))
    ));
    session.set_next_label(Some("car")).unwrap();
    session.set_next_label(None).unwrap();

    let id = draw(&mut session, (5.0, 5.0), (45.0, 35.0));
    assert_eq!(session.pending_label(), Some(id));
}

#[test]
fn test_assign_label_without_pending_shape() {
    let (_dir, mut session) = session_with_image();
    draw_labeled(&mut session, (5.0, 5.0), (45.0, 35.0), "car");

    assert!(matches!(
        session.assign_label(Some("dog")),
        Err(AnnotateError::NoPendingLabel)
    ));
    assert_eq!(label_texts(&session), vec!["car"]);
    assert_eq!(session.to_annotation().unwrap().objects.len(), 1);

    assert!(matches!(
        session.assign_label(None),
        Err(AnnotateError::NoPendingLabel)
    ));
    assert_eq!(session.canvas().shapes().len(), 1);
    assert_eq!(label_texts(&session), vec!["car"]);
}

#[test]
fn test_assign_label_after_pending_shape_deleted() {
    let (_dir, mut session) = session_with_image();
    draw_labeled(&mut session, (60.0, 60.0), (80.0, 80.0), "car");
    draw(&mut session, (5.0, 5.0), (45.0, 35.0));
    click(&mut session, (20.0, 20.0));
    session.delete_selected();
    session.handle_events();

    assert_eq!(session.pending_label(), None);
    assert!(matches!(
        session.assign_label(None),
        Err(AnnotateError::NoPendingLabel)
    ));
    assert_eq!(session.canvas().shapes().len(), 1);
    assert_eq!(label_texts(&session), vec!["car"]);
}

#[test]
fn test_assign_label_rejects_stale_pending_shape() {
    let (_dir, mut session) = session_with_image();
    let pending = draw(&mut session, (5.0, 5.0), (45.0, 35.0));
    session.canvas_mut().undo_last_line().unwrap();

    assert!(matches!(
        session.assign_label(Some("car")),
        Err(AnnotateError::Canvas(CanvasError::UnknownShape(id))) if id == pending
    ));
    assert_eq!(session.pending_label(), None);
    assert!(session.labels().is_empty());
}

#[test]
fn test_rename_recolors_shape() {
    let (_dir, mut session) = session_with_image();
    let dog = draw_labeled(&mut session, (50.0, 50.0), (60.0, 60.0), "dog");
    let cat = draw_labeled(&mut session, (5.0, 5.0), (20.0, 20.0), "cat");

    session.rename(cat, "dog").unwrap();

    let canvas = session.canvas();
    assert_eq!(canvas.shape(cat).unwrap().label.as_deref(), Some("dog"));
    assert_eq!(canvas.shape(cat).unwrap().style, canvas.shape(dog).unwrap().style);
    assert_eq!(label_texts(&session), vec!["dog", "dog"]);
    assert!(matches!(
        session.rename(ShapeId(999), "x"),
        Err(AnnotateError::Canvas(CanvasError::UnknownShape(_)))
    ));
}

// ============================================================================
// Canvas notifications
// ============================================================================

#[test]
fn test_selection_and_delete_sync_list() {
    let (_dir, mut session) = session_with_image();
    let id = draw_labeled(&mut session, (5.0, 5.0), (45.0, 35.0), "cat");
    draw_labeled(&mut session, (60.0, 60.0), (80.0, 80.0), "dog");

    click(&mut session, (20.0, 20.0));
    assert_eq!(session.labels().selected(), &[id]);

    let deleted = session.delete_selected();
    assert_eq!(deleted.len(), 1);
    session.handle_events();
    assert_eq!(label_texts(&session), vec!["dog"]);
    assert!(session.labels().selected().is_empty());
}

#[test]
fn test_undo_rebuilds_label_list() {
    let (_dir, mut session) = session_with_image();
    draw_labeled(&mut session, (5.0, 5.0), (20.0, 20.0), "cat");
    draw_labeled(&mut session, (50.0, 50.0), (60.0, 60.0), "dog");

    session.canvas_mut().restore_shape();
    session.handle_events();
    assert_eq!(label_texts(&session), vec!["cat"]);

    session.canvas_mut().redo_shape();
    session.handle_events();
    assert_eq!(label_texts(&session), vec!["cat", "dog"]);
}

#[test]
fn test_duplicate_adds_rows() {
    let (_dir, mut session) = session_with_image();
    draw_labeled(&mut session, (5.0, 5.0), (45.0, 35.0), "cat");
    click(&mut session, (20.0, 20.0));

    let copies = session.canvas_mut().duplicate_selected();
    session.handle_events();

    assert_eq!(copies.len(), 1);
    assert_eq!(label_texts(&session), vec!["cat", "cat"]);
    assert_eq!(session.labels().items()[1].shape, copies[0]);
}

// ============================================================================
// Saving
// ============================================================================

#[test]
fn test_save_without_image_fails() {
    let mut session = Session::new(AppConfig::new());
    assert!(matches!(session.save(None), Err(AnnotateError::NoImage)));
}

#[test]
fn test_save_and_reopen() {
    let (dir, mut session) = session_with_image();
    draw_labeled(&mut session, (5.0, 5.0), (45.0, 35.0), "cat");
    draw_labeled(&mut session, (60.0, 60.0), (50.0, 50.0), "dog");
    assert!(session.has_unsaved_changes());

    let path = session.save(None).unwrap();
    assert_eq!(path, dir.path().join("out").join("scene.json"));
    assert!(!session.has_unsaved_changes());

    let file = AnnotationFile::load(&path).unwrap();
    assert_eq!(file.image_filename, "scene.png");
    assert_eq!(file.image_size.depth, 3);
    let names: Vec<&str> = file.objects.iter().map(|o| o.object_name.as_str()).collect();
    assert_eq!(names, vec!["cat", "dog"]);
    assert_eq!(file.objects[1].object_coor.x1, 50.0);
    assert_eq!(file.objects[1].object_coor.y2, 60.0);

    let mut reopened = Session::new(AppConfig::new());
    reopened.open_annotation(&path).unwrap();
    assert_eq!(label_texts(&reopened), vec!["cat", "dog"]);
    assert_eq!(reopened.output_dir(), dir.path());
    assert_eq!(reopened.default_save_path(), Some(path.as_path()));
    let corners: Vec<_> = reopened
        .canvas()
        .shapes()
        .iter()
        .map(|s| s.corners().unwrap())
        .collect();
    assert_eq!(
        corners,
        vec![
            (Point::new(5.0, 5.0), Point::new(45.0, 35.0)),
            (Point::new(50.0, 50.0), Point::new(60.0, 60.0)),
        ]
    );
    assert!(!reopened.canvas().is_shape_restorable());
}

#[test]
fn test_default_save_path_used_once() {
    let (dir, mut session) = session_with_image();
    draw_labeled(&mut session, (5.0, 5.0), (45.0, 35.0), "cat");
    let custom = dir.path().join("custom.json");
    session.save(Some(&custom)).unwrap();

    let mut reopened = Session::new(AppConfig::new());
    reopened.open_annotation(&custom).unwrap();
    assert_eq!(reopened.save(None).unwrap(), custom);
    assert_eq!(
        reopened.save(None).unwrap(),
        dir.path().join("scene.json")
    );
}

#[test]
fn test_open_annotation_with_missing_image_changes_nothing() {
    let (dir, mut session) = session_with_image();
    draw_labeled(&mut session, (5.0, 5.0), (45.0, 35.0), "cat");

    let mut file = AnnotationFile::new(&dir.path().join("gone.png"), 10, 10, 3);
    let shape = Shape::rectangle(Point::new(1.0, 1.0), Point::new(5.0, 5.0));
    file.push_shape("x", &shape).unwrap();
    let path = dir.path().join("gone.json");
    file.save(&path).unwrap();

    assert!(session.open_annotation(&path).is_err());
    assert_eq!(label_texts(&session), vec!["cat"]);
    assert_eq!(session.image().unwrap().path, dir.path().join("scene.png"));
}

#[test]
fn test_depth_unknown_when_image_vanished() {
    let (dir, mut session) = session_with_image();
    draw_labeled(&mut session, (5.0, 5.0), (45.0, 35.0), "cat");
    std::fs::remove_file(dir.path().join("scene.png")).unwrap();

    let file = session.to_annotation().unwrap();
    assert_eq!(file.image_size.depth, -1);
    assert_eq!(file.objects.len(), 1);
}
