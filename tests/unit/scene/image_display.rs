use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use super::*;
use crate::media::{SharedSource, StillImage};
use crate::paint::pattern::ImageData;
use crate::render::recording::RasterOp;
use crate::test_support::Harness;

fn image(w: u32, h: u32) -> Arc<ImageData> {
    Arc::new(ImageData::from_premul(w, h, vec![255; (w * h * 4) as usize]).unwrap())
}

fn images(h: &Harness) -> Vec<Rect> {
    h.log
        .ops()
        .into_iter()
        .filter_map(|op| match op {
            RasterOp::Image(r) => Some(r),
            _ => None,
        })
        .collect()
}

#[test]
fn ready_frame_is_drawn_centered() {
    let mut h = Harness::new(100, 100);
    let mut d = ImageDisplay::new((50.0, 50.0), StillImage::new(image(20, 10)));
    h.init(&mut d);
    h.draw(&mut d, 0.0);
    assert_eq!(images(&h), vec![Rect::new(40.0, 45.0, 60.0, 55.0)]);
    assert_eq!(d.bounds(), Rect::new(40.0, 45.0, 60.0, 55.0));
}

#[test]
fn fixed_size_overrides_the_frame_size() {
    let mut h = Harness::new(100, 100);
    let mut d = ImageDisplay::new((50.0, 50.0), StillImage::new(image(20, 10))).with_size((40.0, 40.0));
    h.init(&mut d);
    h.draw(&mut d, 0.0);
    assert_eq!(images(&h), vec![Rect::new(30.0, 30.0, 70.0, 70.0)]);
}

#[test]
fn pending_source_draws_nothing() {
    let mut h = Harness::new(100, 100);
    let (source, handle) = SharedSource::new();
    let mut d = ImageDisplay::new((50.0, 50.0), source);
    h.init(&mut d);
    h.draw(&mut d, 0.0);
    assert!(images(&h).is_empty());
    assert_eq!(d.bounds().area(), 0.0);

    handle.ready(image(4, 4));
    h.draw(&mut d, 16.0);
    assert_eq!(images(&h).len(), 1);
}

#[test]
fn failures_are_reported_once_per_kind() {
    let mut h = Harness::new(100, 100);
    let (source, handle) = SharedSource::new();
    let reports = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&reports);
    let mut d = ImageDisplay::new((50.0, 50.0), source)
        .on_error(move |_d, kind| sink.borrow_mut().push(kind));
    h.init(&mut d);

    handle.fail(MediaErrorKind::NoPermission);
    h.draw(&mut d, 0.0);
    h.draw(&mut d, 16.0);
    handle.fail(MediaErrorKind::SourceDisconnected);
    h.draw(&mut d, 32.0);
    assert_eq!(
        *reports.borrow(),
        vec![MediaErrorKind::NoPermission, MediaErrorKind::SourceDisconnected]
    );
    assert_eq!(d.last_error(), Some(MediaErrorKind::SourceDisconnected));

    handle.ready(image(2, 2));
    h.draw(&mut d, 48.0);
    assert_eq!(d.last_error(), None);
    handle.fail(MediaErrorKind::SourceDisconnected);
    h.draw(&mut d, 64.0);
    assert_eq!(reports.borrow().len(), 3);
}

#[test]
fn error_callback_can_swap_the_source() {
    let mut h = Harness::new(100, 100);
    let mut d = ImageDisplay::new((50.0, 50.0), StillImage::failed(MediaErrorKind::FileNotFound))
        .on_error(|d, _kind| d.set_source(StillImage::new(image(8, 8))));
    h.init(&mut d);
    h.draw(&mut d, 0.0);
    assert!(images(&h).is_empty());
    h.draw(&mut d, 16.0);
    assert_eq!(images(&h), vec![Rect::new(46.0, 46.0, 54.0, 54.0)]);
}

#[test]
fn rotated_display_hit_tests_in_local_space() {
    let mut h = Harness::new(100, 100);
    let mut d = ImageDisplay::with_core(
        ObjectCore::new((50.0, 50.0)).with_rotation(90.0),
        StillImage::new(image(40, 10)),
    );
    h.init(&mut d);
    h.draw(&mut d, 0.0);
    // the long side now runs vertically
    assert!(d.contains(Point::new(50.0, 65.0), true));
    assert!(!d.contains(Point::new(65.0, 50.0), true));
}
