use super::*;
use crate::paint::NoBounds;

struct OneObject(ObjId, Rect);

impl BoundsLookup for OneObject {
    fn bounds_of(&self, id: ObjId) -> Option<Rect> {
        (id == self.0).then_some(self.1)
    }
}

#[test]
fn stops_are_sorted_and_clamped() {
    let g = Gradient::linear((0.0, 0.0), (1.0, 0.0))
        .stop(0.8, Rgba8::WHITE)
        .stop(-1.0, Rgba8::BLACK)
        .stop(0.5, Rgba8::rgb(255, 0, 0));
    let offsets: Vec<f64> = g.stops().iter().map(|s| s.offset).collect();
    assert_eq!(offsets, vec![0.0, 0.5, 0.8]);
}

#[test]
fn static_gradient_resolves_once() {
    let mut g = Gradient::radial((5.0, 5.0), 10.0).stop(0.0, Rgba8::WHITE);
    assert!(!g.is_dynamic());
    let a = g.resolve(Rect::new(0.0, 0.0, 10.0, 10.0), &NoBounds);
    let b = g.resolve(Rect::new(50.0, 50.0, 80.0, 80.0), &NoBounds);
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(
        a.kind(),
        GradientKind::Radial {
            center: Point::new(5.0, 5.0),
            radius: 10.0
        }
    );
}

#[test]
fn owner_anchored_gradient_follows_bounds() {
    let mut g = Gradient::linear((0.0, 0.5), (1.0, 0.5))
        .stop(0.0, Rgba8::BLACK)
        .anchored_to_owner();
    let r1 = Rect::new(0.0, 0.0, 100.0, 50.0);
    let a = g.resolve(r1, &NoBounds);
    let again = g.resolve(r1, &NoBounds);
    assert!(Arc::ptr_eq(&a, &again));
    assert_eq!(
        a.kind(),
        GradientKind::Linear {
            start: Point::new(0.0, 25.0),
            end: Point::new(100.0, 25.0)
        }
    );

    let moved = g.resolve(Rect::new(10.0, 0.0, 110.0, 50.0), &NoBounds);
    assert!(!Arc::ptr_eq(&a, &moved));
    assert_ne!(a.key(), moved.key());
}

#[test]
fn object_anchor_uses_lookup_then_falls_back_to_owner() {
    let target = ObjId(7);
    let lookup = OneObject(target, Rect::new(0.0, 0.0, 20.0, 20.0));
    let mut g = Gradient::radial((0.5, 0.5), 1.0)
        .stop(0.0, Rgba8::WHITE)
        .anchored_to(target);
    let r = g.resolve(Rect::new(100.0, 100.0, 110.0, 110.0), &lookup);
    assert_eq!(
        r.kind(),
        GradientKind::Radial {
            center: Point::new(10.0, 10.0),
            radius: 10.0
        }
    );

    let fallback = g.resolve(Rect::new(100.0, 100.0, 110.0, 110.0), &NoBounds);
    assert_eq!(
        fallback.kind(),
        GradientKind::Radial {
            center: Point::new(105.0, 105.0),
            radius: 5.0
        }
    );
}
