//! Unit tests for tf-core primitives.

#[cfg(test)]
mod ids {
    use crate::{NodeId, ShapeId, SimulationId};

    #[test]
    fn index_roundtrip() {
        let id = NodeId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(NodeId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn invalid_sentinels_are_max() {
        assert_eq!(NodeId::INVALID.0, u32::MAX);
        assert_eq!(ShapeId::default(), ShapeId::INVALID);
    }

    #[test]
    fn simulation_ids_are_unique() {
        let a = SimulationId::next();
        let b = SimulationId::next();
        assert_ne!(a, b);
    }

    #[test]
    fn display() {
        assert_eq!(NodeId(7).to_string(), "NodeId(7)");
    }
}

#[cfg(test)]
mod geo {
    use crate::{GeoBounds, GeoPoint, ScreenPoint};

    #[test]
    fn zero_distance() {
        let p = GeoPoint::new(52.52, 13.405);
        assert!(p.distance_m(p) < 0.01);
    }

    #[test]
    fn one_degree_of_latitude() {
        let a = GeoPoint::new(30.0, -88.0);
        let b = GeoPoint::new(31.0, -88.0);
        let d = a.distance_m(b);
        assert!((d - 111_195.0).abs() < 500.0, "got {d}");
    }

    #[test]
    fn validity() {
        assert!(GeoPoint::new(0.0, 0.0).is_valid());
        assert!(!GeoPoint::new(91.0, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, f64::NAN).is_valid());
    }

    #[test]
    fn parse_lat_lng() {
        let p: GeoPoint = " 40.7 , -74.0 ".parse().unwrap();
        assert_eq!(p, GeoPoint::new(40.7, -74.0));
        assert!("40.7".parse::<GeoPoint>().is_err());
        assert!("120,0".parse::<GeoPoint>().is_err());
    }

    #[test]
    fn bounds_contains() {
        let b = GeoBounds::new(GeoPoint::new(-10.0, -20.0), GeoPoint::new(10.0, 20.0));
        assert!(b.contains(GeoPoint::new(0.0, 0.0)));
        assert!(!b.contains(GeoPoint::new(11.0, 0.0)));
        assert_eq!(b.center(), GeoPoint::new(0.0, 0.0));
    }

    #[test]
    fn lerp_endpoints() {
        let a = ScreenPoint::new(0.0, 10.0);
        let b = ScreenPoint::new(100.0, 30.0);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 0.5), ScreenPoint::new(50.0, 20.0));
    }
}

#[cfg(test)]
mod projection {
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::{GeoPoint, MapProjection, ScreenPoint, Viewport, Zoom};

    fn viewport() -> Viewport {
        Viewport::new(GeoPoint::new(0.0, 0.0), Zoom(2), 800.0, 600.0)
    }

    fn close(a: ScreenPoint, b: ScreenPoint) -> bool {
        a.distance(b) < 1e-6
    }

    #[test]
    fn center_projects_to_middle() {
        let vp = viewport();
        let p = vp.project(GeoPoint::new(0.0, 0.0)).unwrap();
        assert!(close(p, ScreenPoint::new(400.0, 300.0)), "{p}");
    }

    #[test]
    fn longitude_is_linear() {
        // World is 1024 px wide at z2, so 90° of longitude is 256 px.
        let vp = viewport();
        let p = vp.project(GeoPoint::new(0.0, 90.0)).unwrap();
        assert!(close(p, ScreenPoint::new(656.0, 300.0)), "{p}");
    }

    #[test]
    fn north_is_up() {
        let vp = viewport();
        let north = vp.project(GeoPoint::new(45.0, 0.0)).unwrap();
        assert!(north.y < 300.0);
    }

    #[test]
    fn unproject_inverts_project() {
        let vp = Viewport::new(GeoPoint::new(48.85, 2.35), Zoom(9), 1024.0, 768.0);
        let geo = GeoPoint::new(48.0, 3.0);
        let back = vp.unproject(vp.project(geo).unwrap()).unwrap();
        assert!((back.lat - geo.lat).abs() < 1e-9);
        assert!((back.lng - geo.lng).abs() < 1e-9);
    }

    #[test]
    fn pan_shifts_projection() {
        let mut vp = viewport();
        let geo = GeoPoint::new(10.0, 10.0);
        let before = vp.project(geo).unwrap();
        vp.pan_by(50.0, -20.0);
        let after = vp.project(geo).unwrap();
        assert!(close(after, before.offset(-50.0, 20.0)), "{before} -> {after}");
    }

    #[test]
    fn zoom_doubles_distances_from_center() {
        let mut vp = viewport();
        let geo = GeoPoint::new(0.0, 45.0);
        let d1 = vp.project(geo).unwrap().x - 400.0;
        assert!(vp.zoom_in());
        let d2 = vp.project(geo).unwrap().x - 400.0;
        assert!((d2 - 2.0 * d1).abs() < 1e-6);
    }

    #[test]
    fn zoom_is_clamped_to_range() {
        let mut vp = viewport().with_zoom_range(Zoom(1), Zoom(3));
        assert!(!vp.set_zoom(Zoom(2)));
        vp.set_zoom(Zoom(10));
        assert_eq!(vp.zoom(), Zoom(3));
        vp.set_zoom(Zoom(0));
        assert_eq!(vp.zoom(), Zoom(1));
    }

    #[test]
    fn invalid_geo_does_not_project() {
        assert!(viewport().project(GeoPoint::new(f64::NAN, 0.0)).is_none());
    }

    #[test]
    fn bounds_contain_center() {
        let vp = Viewport::new(GeoPoint::new(40.0, -74.0), Zoom(6), 640.0, 480.0);
        let b = vp.bounds();
        assert!(b.contains(vp.center()));
        assert!(b.south_west.lat < b.north_east.lat);
    }

    #[test]
    fn shared_handle_sees_mutation() {
        let vp = Rc::new(RefCell::new(viewport()));
        let handle = Rc::clone(&vp);
        let geo = GeoPoint::new(0.0, 0.0);
        assert!(close(handle.project(geo).unwrap(), ScreenPoint::new(400.0, 300.0)));
        vp.borrow_mut().pan_by(100.0, 0.0);
        assert!(close(handle.project(geo).unwrap(), ScreenPoint::new(300.0, 300.0)));
    }

    #[test]
    fn shared_handle_degrades_while_borrowed() {
        let vp = Rc::new(RefCell::new(viewport()));
        let _guard = vp.borrow_mut();
        assert!(vp.project(GeoPoint::new(0.0, 0.0)).is_none());
        assert!(vp.unproject(ScreenPoint::new(400.0, 300.0)).is_none());
    }

    #[test]
    fn shared_handle_zoom_allows_shared_borrows() {
        let vp = Rc::new(RefCell::new(viewport()));
        let _reader = vp.borrow();
        assert_eq!(vp.zoom(), Zoom(2));
        assert!(vp.bounds().contains(GeoPoint::new(0.0, 0.0)));
    }

    #[test]
    #[should_panic(expected = "already mutably borrowed")]
    fn shared_handle_zoom_panics_while_mutably_borrowed() {
        let vp = Rc::new(RefCell::new(viewport()));
        let _guard = vp.borrow_mut();
        let _ = vp.zoom();
    }

    #[test]
    fn pixels_beside_the_world_do_not_unproject() {
        // z0 world is 256 px, centred in a 1024 px container at 384..=640.
        let vp = Viewport::new(GeoPoint::new(0.0, 0.0), Zoom(0), 1024.0, 1024.0);
        assert!(vp.unproject(ScreenPoint::new(10.0, 10.0)).is_none());
        assert!(vp.unproject(ScreenPoint::new(700.0, 512.0)).is_none());
        assert!(vp.unproject(ScreenPoint::new(512.0, 383.0)).is_none());

        let centre = vp.unproject(ScreenPoint::new(512.0, 512.0)).unwrap();
        assert!(centre.lat.abs() < 1e-9 && centre.lng.abs() < 1e-9, "{centre}");
        let edge = vp.unproject(ScreenPoint::new(384.0, 512.0)).unwrap();
        assert!((edge.lng + 180.0).abs() < 1e-9, "{edge}");
    }
}

#[cfg(test)]
mod frame {
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::{FrameQueue, FrameScheduler, SimulationId};

    #[test]
    fn drain_returns_requests_in_order() {
        let mut q = FrameQueue::new();
        let a = q.request_frame(SimulationId(1));
        let b = q.request_frame(SimulationId(2));
        assert_eq!(q.len(), 2);
        assert_eq!(q.drain_frame(), vec![a, b]);
        assert!(q.is_empty());
        assert_eq!(q.frames_drained(), 1);
    }

    #[test]
    fn cancel_removes_pending_token() {
        let mut q = FrameQueue::new();
        let a = q.request_frame(SimulationId(1));
        assert!(q.is_pending(a));
        assert!(q.cancel_frame(a));
        assert!(!q.cancel_frame(a));
        assert!(q.drain_frame().is_empty());
    }

    #[test]
    fn tokens_are_unique() {
        let mut q = FrameQueue::new();
        let a = q.request_frame(SimulationId(1));
        q.drain_frame();
        let b = q.request_frame(SimulationId(1));
        assert_ne!(a, b);
    }

    #[test]
    fn shared_handle_schedules_on_inner_queue() {
        let q = Rc::new(RefCell::new(FrameQueue::new()));
        let mut handle = Rc::clone(&q);
        let t = handle.request_frame(SimulationId(3));
        assert!(q.borrow().is_pending(t));
        assert!(handle.cancel_frame(t));
        assert!(q.borrow().is_empty());
    }
}

#[cfg(test)]
mod rng {
    use crate::SimRng;

    #[test]
    fn same_seed_same_stream() {
        let mut a = SimRng::new(9);
        let mut b = SimRng::new(9);
        for _ in 0..16 {
            assert_eq!(a.unit().to_bits(), b.unit().to_bits());
        }
    }

    #[test]
    fn unit_is_half_open() {
        let mut r = SimRng::new(1);
        for _ in 0..10_000 {
            let u = r.unit();
            assert!((0.0..1.0).contains(&u));
        }
    }

    #[test]
    fn mixed_seeds_differ_per_stream() {
        assert_ne!(SimRng::mix_seed(5, 1), SimRng::mix_seed(5, 2));
        assert_eq!(SimRng::mix_seed(5, 0), 5);
    }
}

#[cfg(test)]
mod config {
    use crate::{SimConfig, PARTICLE_COUNT};

    #[test]
    fn default_is_valid() {
        let c = SimConfig::default();
        assert_eq!(c.particle_count, PARTICLE_COUNT);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn rejects_bad_values() {
        let zero = SimConfig { particle_count: 0, ..SimConfig::default() };
        assert!(zero.validate().is_err());

        let inverted = SimConfig { min_speed: 0.02, max_speed: 0.01, ..SimConfig::default() };
        assert!(inverted.validate().is_err());

        let stalled = SimConfig { min_speed: 0.0, ..SimConfig::default() };
        assert!(stalled.validate().is_err());
    }
}
