//! Unit tests for tf-flow.

use std::cell::RefCell;
use std::rc::Rc;

use tf_core::{FrameQueue, GeoPoint, Viewport, Zoom};
use tf_render::DisplayList;

use crate::{Cluster, ClusterIndex, FlowConfig, FlowController, Relay};

// ── Helpers ───────────────────────────────────────────────────────────────────

type SharedViewport = Rc<RefCell<Viewport>>;
type SharedQueue = Rc<RefCell<FrameQueue>>;
type TestController = FlowController<DisplayList, SharedViewport, SharedQueue>;

fn relay(id: &str, lat: f64, lng: f64, bandwidth: f64) -> Relay {
    Relay { id: id.into(), position: GeoPoint::new(lat, lng), bandwidth }
}

/// Two European relays close together, one in North America.
fn relays() -> Vec<Relay> {
    vec![
        relay("paris", 48.85, 2.35, 0.3),
        relay("brussels", 50.85, 4.35, 0.2),
        relay("toronto", 43.65, -79.38, 0.5),
    ]
}

fn shared_viewport(zoom: u8) -> SharedViewport {
    Rc::new(RefCell::new(Viewport::new(GeoPoint::new(40.0, -30.0), Zoom(zoom), 800.0, 600.0)))
}

fn controller(index: ClusterIndex, map: &SharedViewport, q: &SharedQueue) -> TestController {
    let mut config = FlowConfig::default();
    config.simulation.particle_count = 50;
    config.simulation.seed = 11;
    FlowController::new(config, index, Rc::clone(map), Rc::clone(q), DisplayList::new(800, 600)).unwrap()
}

fn pump(c: &mut TestController, q: &SharedQueue, frames: usize) -> usize {
    let mut ran = 0;
    for _ in 0..frames {
        let tokens = q.borrow_mut().drain_frame();
        ran += c.dispatch(tokens);
    }
    ran
}

// ── RelayDocument ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod relays {
    use crate::{FlowError, RelayDocument};

    const NODES: &str = r#"{
        "objects": [
            { "circle": { "id": "a", "coordinates": [51.5, -0.1], "bandwidth": 0.25 } },
            { "circle": { "id": "b", "coordinates": [35.7, 139.7], "bandwidth": 0.75 } },
            { "circle": { "id": "bad", "coordinates": [123.0, 0.0], "bandwidth": 0.1 } }
        ]
    }"#;

    #[test]
    fn parses_and_drops_malformed() {
        let doc = RelayDocument::from_json_str(NODES).unwrap();
        assert_eq!(doc.len(), 3);
        let relays = doc.into_relays();
        assert_eq!(relays.len(), 2);
        assert_eq!(relays[0].id, "a");
        assert_eq!(relays[0].position.lat, 51.5);
        assert_eq!(relays[1].bandwidth, 0.75);
    }

    #[test]
    fn rejects_wrong_shape() {
        let err = RelayDocument::from_json_str(r#"{"objects":[{"circle":{"id":"a"}}]}"#).unwrap_err();
        assert!(matches!(err, FlowError::Json(_)));
    }
}

// ── Cluster / ClusterIndex ────────────────────────────────────────────────────

#[cfg(test)]
mod clusters {
    use super::*;
    use crate::{FlowError, MAX_RADIUS, MIN_RADIUS};

    #[test]
    fn icon_radius_scales_with_bandwidth() {
        let empty = Cluster::new(GeoPoint::new(0.0, 0.0), vec![relay("z", 0.0, 0.0, 0.0)]);
        assert_eq!(empty.icon_radius(), MIN_RADIUS);

        let half = Cluster::from_relays(vec![relay("a", 0.0, 0.0, 0.2), relay("b", 2.0, 2.0, 0.3)]).unwrap();
        assert!((half.bandwidth() - 0.5).abs() < 1e-12);
        assert!((half.icon_radius() - 22.5).abs() < 1e-12);
        assert_eq!(half.position, GeoPoint::new(1.0, 1.0));

        let all = Cluster::from_relays(vec![relay("a", 0.0, 0.0, 1.0)]).unwrap();
        assert_eq!(all.icon_radius(), MAX_RADIUS);
    }

    #[test]
    fn from_relays_rejects_empty() {
        assert!(Cluster::from_relays(Vec::new()).is_none());
    }

    #[test]
    fn new_index_has_empty_slot_per_zoom() {
        let index = ClusterIndex::new(Zoom(2), Zoom(5));
        for z in 2..=5 {
            assert!(index.clusters(Zoom(z)).is_empty());
            assert!(matches!(index.weighted_nodes(Zoom(z)), Err(FlowError::NoClusters(_))));
        }
        assert!(matches!(index.weighted_nodes(Zoom(6)), Err(FlowError::ZoomOutOfRange { .. })));
    }

    #[test]
    fn weighted_nodes_normalize_cluster_bandwidth() {
        let mut index = ClusterIndex::new(Zoom(0), Zoom(3));
        index.push(Zoom(1), Cluster::from_relays(vec![relay("a", 10.0, 10.0, 2.0)]).unwrap()).unwrap();
        index
            .push(Zoom(1), Cluster::from_relays(vec![relay("b", 20.0, 20.0, 1.0), relay("c", 20.0, 20.0, 1.0)]).unwrap())
            .unwrap();

        let nodes = index.weighted_nodes(Zoom(1)).unwrap();
        assert_eq!(nodes.len(), 2);
        assert!((nodes[0].weight - 0.5).abs() < 1e-12);
        assert!((nodes[1].weight - 0.5).abs() < 1e-12);
        assert_eq!(nodes[1].position, GeoPoint::new(20.0, 20.0));
    }

    #[test]
    fn zero_bandwidth_is_an_error() {
        let mut index = ClusterIndex::new(Zoom(0), Zoom(0));
        index.push(Zoom(0), Cluster::from_relays(vec![relay("a", 0.0, 0.0, 0.0)]).unwrap()).unwrap();
        assert!(matches!(index.weighted_nodes(Zoom(0)), Err(FlowError::ZeroBandwidth(Zoom(0)))));
    }

    #[test]
    fn push_outside_range_fails() {
        let mut index = ClusterIndex::new(Zoom(3), Zoom(1));
        assert_eq!((index.min_zoom(), index.max_zoom()), (Zoom(1), Zoom(3)));
        let c = Cluster::from_relays(vec![relay("a", 0.0, 0.0, 1.0)]).unwrap();
        assert!(index.push(Zoom(0), c).is_err());
    }

    #[test]
    fn grid_merges_neighbours_at_low_zoom() {
        let index = ClusterIndex::from_grid(&relays(), Zoom(0), Zoom(10), 80.0).unwrap();

        // One 80 px cell covers a large part of the world at zoom 0.
        let low = index.clusters(Zoom(0));
        assert!(low.len() < 3, "zoom 0 clusters: {}", low.len());
        let total: usize = low.iter().map(Cluster::len).sum();
        assert_eq!(total, 3);

        // At zoom 10 Paris and Brussels are hundreds of cells apart.
        assert_eq!(index.clusters(Zoom(10)).len(), 3);
    }

    #[test]
    fn grid_preserves_bandwidth_per_zoom() {
        let index = ClusterIndex::from_grid(&relays(), Zoom(0), Zoom(6), 64.0).unwrap();
        for z in 0..=6 {
            let total: f64 = index.clusters(Zoom(z)).iter().map(Cluster::bandwidth).sum();
            assert!((total - 1.0).abs() < 1e-12, "zoom {z}");
            let w: f64 = index.weighted_nodes(Zoom(z)).unwrap().iter().map(|n| n.weight).sum();
            assert!((w - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn grid_rejects_bad_cell_size() {
        assert!(ClusterIndex::from_grid(&relays(), Zoom(0), Zoom(1), 0.0).is_err());
        assert!(ClusterIndex::from_grid(&relays(), Zoom(0), Zoom(1), f64::NAN).is_err());
    }
}

// ── FlowConfig ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod config {
    use std::io::Write;

    use tf_core::Zoom;
    use tf_render::FillStyle;

    use crate::{FlowConfig, FlowError};

    #[test]
    fn empty_object_is_default() {
        let c = FlowConfig::from_json_str("{}").unwrap();
        assert_eq!(c, FlowConfig::default());
        assert_eq!(c.simulation.particle_count, 500);
        assert_eq!(c.style().unwrap(), FillStyle::default());
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let c = FlowConfig::from_json_str(
            r#"{ "simulation": { "particle_count": 64, "seed": 9 }, "fill_style": "rgba(255,255,255,0.8", "max_zoom": 12 }"#,
        )
        .unwrap();
        assert_eq!(c.simulation.particle_count, 64);
        assert_eq!(c.simulation.seed, 9);
        assert_eq!(c.simulation.min_speed, 0.004);
        assert_eq!(c.max_zoom, Zoom(12));
        assert_eq!(c.layer.dot_radius, 1.0);
    }

    #[test]
    fn invalid_values_are_rejected() {
        for json in [
            r#"{ "simulation": { "particle_count": 0 } }"#,
            r#"{ "fill_style": "not a colour" }"#,
            r#"{ "min_zoom": 9, "max_zoom": 3 }"#,
            r#"{ "cluster_cell_px": -1.0 }"#,
            r#"{ "layer": { "dot_radius": -2.0 } }"#,
        ] {
            assert!(FlowConfig::from_json_str(json).is_err(), "{json}");
        }
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "simulation": {{ "seed": 42 }} }}"#).unwrap();
        let c = FlowConfig::load(file.path()).unwrap();
        assert_eq!(c.simulation.seed, 42);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = FlowConfig::load(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, FlowError::Io(_)));
    }
}

// ── FlowController ────────────────────────────────────────────────────────────

#[cfg(test)]
mod controller {
    use super::*;
    use crate::FlowError;
    use tf_render::MapEvent;

    #[test]
    fn new_attaches_layer_without_simulation() {
        let map = shared_viewport(2);
        let q = Rc::new(RefCell::new(FrameQueue::new()));
        let mut c = controller(ClusterIndex::new(Zoom(0), Zoom(4)), &map, &q);
        assert!(c.layer().is_attached());
        assert!(c.simulation().is_none());
        assert_eq!(pump(&mut c, &q, 5), 0);
    }

    #[test]
    fn not_ready_surface_is_rejected() {
        let map = shared_viewport(2);
        let q = Rc::new(RefCell::new(FrameQueue::new()));
        let r = FlowController::new(
            FlowConfig::default(),
            ClusterIndex::new(Zoom(0), Zoom(4)),
            Rc::clone(&map),
            Rc::clone(&q),
            DisplayList::new(0, 0),
        );
        assert!(matches!(r, Err(FlowError::Render(_))));
    }

    #[test]
    fn clustered_map_starts_flow_into_layer() {
        let map = shared_viewport(2);
        let q = Rc::new(RefCell::new(FrameQueue::new()));
        let index = ClusterIndex::from_grid(&relays(), Zoom(0), Zoom(8), 80.0).unwrap();
        let mut c = controller(index, &map, &q);

        c.on_map_clustered().unwrap();
        assert_eq!(c.generation(), 1);
        assert_eq!(c.zoom(), Some(Zoom(2)));
        assert!(c.simulation().unwrap().is_running());

        assert_eq!(pump(&mut c, &q, 10), 10);
        let layer = c.layer();
        assert!(layer.point_count() > 0 && layer.point_count() <= 50);
        assert!(layer.drawn_count() <= layer.point_count());
    }

    #[test]
    fn recluster_replaces_simulation_and_ignores_old_frames() {
        let map = shared_viewport(2);
        let q = Rc::new(RefCell::new(FrameQueue::new()));
        let index = ClusterIndex::from_grid(&relays(), Zoom(0), Zoom(8), 80.0).unwrap();
        let mut c = controller(index, &map, &q);

        c.on_map_clustered().unwrap();
        let first = c.simulation().unwrap().id();
        pump(&mut c, &q, 3);

        map.borrow_mut().zoom_in();
        c.on_map_event(MapEvent::Zoom);
        c.on_map_clustered().unwrap();

        let second = c.simulation().unwrap().id();
        assert_ne!(first, second);
        assert_eq!(c.generation(), 2);
        assert_eq!(c.zoom(), Some(Zoom(3)));

        // The old simulation's frame was cancelled; only the new one ticks.
        assert_eq!(pump(&mut c, &q, 1), 1);
        assert_eq!(c.simulation().unwrap().ticks_elapsed().0, 1);
    }

    #[test]
    fn failed_recluster_keeps_previous_generation() {
        let map = shared_viewport(2);
        let q = Rc::new(RefCell::new(FrameQueue::new()));
        let mut index = ClusterIndex::new(Zoom(0), Zoom(4));
        index.push(Zoom(2), Cluster::from_relays(relays()).unwrap()).unwrap();
        let mut c = controller(index, &map, &q);

        c.on_map_clustered().unwrap();
        map.borrow_mut().zoom_in();
        assert!(matches!(c.on_map_clustered(), Err(FlowError::NoClusters(Zoom(3)))));
        assert_eq!(c.generation(), 1);
        assert_eq!(pump(&mut c, &q, 2), 2);
    }

    #[test]
    fn unbuildable_recluster_keeps_previous_simulation_and_dots() {
        let map = shared_viewport(2);
        let q = Rc::new(RefCell::new(FrameQueue::new()));
        let mut index = ClusterIndex::new(Zoom(0), Zoom(4));
        index.push(Zoom(2), Cluster::from_relays(relays()).unwrap()).unwrap();
        // Latitude 95 passes clustering but not the simulation builder.
        index
            .push(Zoom(3), Cluster::new(GeoPoint::new(95.0, 0.0), vec![relay("off", 95.0, 0.0, 1.0)]))
            .unwrap();
        let mut c = controller(index, &map, &q);

        c.on_map_clustered().unwrap();
        let first = c.simulation().unwrap().id();
        assert_eq!(pump(&mut c, &q, 3), 3);
        let points = c.layer().point_count();
        assert!(points > 0);

        map.borrow_mut().zoom_in();
        assert!(matches!(c.on_map_clustered(), Err(FlowError::Simulation(_))));

        assert_eq!(c.generation(), 1);
        assert_eq!(c.zoom(), Some(Zoom(2)));
        let sim = c.simulation().unwrap();
        assert_eq!(sim.id(), first);
        assert!(sim.is_running());
        assert_eq!(c.layer().point_count(), points);
        assert_eq!(pump(&mut c, &q, 2), 2);
        assert_eq!(c.simulation().unwrap().ticks_elapsed().0, 5);
    }

    #[test]
    fn pause_resume_and_shutdown() {
        let map = shared_viewport(2);
        let q = Rc::new(RefCell::new(FrameQueue::new()));
        let index = ClusterIndex::from_grid(&relays(), Zoom(0), Zoom(8), 80.0).unwrap();
        let mut c = controller(index, &map, &q);
        c.on_map_clustered().unwrap();

        c.pause();
        assert_eq!(pump(&mut c, &q, 3), 0);
        c.resume().unwrap();
        assert_eq!(pump(&mut c, &q, 3), 3);

        c.shutdown().unwrap();
        assert!(c.simulation().is_none());
        assert!(!c.layer().is_attached());
        assert_eq!(pump(&mut c, &q, 3), 0);
    }
}
