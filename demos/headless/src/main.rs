//! headless — the relay flow map without a browser.
//!
//! Loads an embedded relay list, clusters it per zoom, and drives the
//! particle flow through a scripted session (pan, zoom, resize) on an
//! in-memory frame queue.  Snapshots are written as PPM images, and the
//! final frame also as SVG, under `output/headless/`.
//!
//! ```text
//! cargo run -p headless [-- config.json]
//! RUST_LOG=tf_particles=trace cargo run -p headless
//! ```

use std::cell::RefCell;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::rc::Rc;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::info;

use tf_core::{FrameQueue, GeoPoint, LayerConfig, Viewport, Zoom};
use tf_flow::{ClusterIndex, FlowConfig, FlowController, RelayDocument};
use tf_render::{DisplayList, DotLayer, MapEvent, PixelCanvas};

// ── Constants ─────────────────────────────────────────────────────────────────

const WIDTH:      u32 = 960;
const HEIGHT:     u32 = 540;
const FRAMES:     u64 = 240;
const OUTPUT_DIR: &str = "output/headless";
/// Map background behind the dots (dark slate, like the tile theme).
const BACKGROUND: [u8; 3] = [24, 30, 40];

// ── Relay list ────────────────────────────────────────────────────────────────

// Shape of the `/nodes` payload.  Bandwidths are shares of the network total.
const NODES_JSON: &str = r#"{ "objects": [
  { "circle": { "id": "fra-1", "coordinates": [50.11, 8.68],    "bandwidth": 0.16 } },
  { "circle": { "id": "fra-2", "coordinates": [50.03, 8.57],    "bandwidth": 0.09 } },
  { "circle": { "id": "ams-1", "coordinates": [52.37, 4.90],    "bandwidth": 0.14 } },
  { "circle": { "id": "par-1", "coordinates": [48.86, 2.35],    "bandwidth": 0.08 } },
  { "circle": { "id": "sto-1", "coordinates": [59.33, 18.07],   "bandwidth": 0.05 } },
  { "circle": { "id": "bos-1", "coordinates": [42.36, -71.06],  "bandwidth": 0.07 } },
  { "circle": { "id": "nyc-1", "coordinates": [40.71, -74.01],  "bandwidth": 0.11 } },
  { "circle": { "id": "sfo-1", "coordinates": [37.77, -122.42], "bandwidth": 0.10 } },
  { "circle": { "id": "sao-1", "coordinates": [-23.55, -46.63], "bandwidth": 0.03 } },
  { "circle": { "id": "tyo-1", "coordinates": [35.68, 139.69],  "bandwidth": 0.06 } },
  { "circle": { "id": "sin-1", "coordinates": [1.35, 103.82],   "bandwidth": 0.04 } },
  { "circle": { "id": "syd-1", "coordinates": [-33.87, 151.21], "bandwidth": 0.03 } },
  { "circle": { "id": "jnb-1", "coordinates": [-26.20, 28.05],  "bandwidth": 0.02 } },
  { "circle": { "id": "nil-1", "coordinates": [0.0, 0.0],       "bandwidth": 0.02 } }
] }"#;

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    init_tracing();

    let config = match std::env::args().nth(1) {
        Some(path) => FlowConfig::load(&path).with_context(|| format!("loading {path}"))?,
        None => FlowConfig::default(),
    };

    // 1. Relays and clusters.
    let relays = RelayDocument::from_json_str(NODES_JSON)?.into_relays();
    let index = ClusterIndex::from_grid(&relays, config.min_zoom, config.max_zoom, config.cluster_cell_px)?;
    println!("=== headless — relay flow map ===");
    println!("Relays: {}  |  Zooms: {}..={}", relays.len(), index.min_zoom(), index.max_zoom());

    // 2. Map, frame loop and controller.
    let map = Rc::new(RefCell::new(
        Viewport::new(GeoPoint::new(30.0, 0.0), Zoom(2), f64::from(WIDTH), f64::from(HEIGHT))
            .with_zoom_range(config.min_zoom, config.max_zoom),
    ));
    let queue = Rc::new(RefCell::new(FrameQueue::new()));
    let mut flow = FlowController::new(
        config,
        index,
        Rc::clone(&map),
        Rc::clone(&queue),
        PixelCanvas::new(WIDTH, HEIGHT),
    )?;
    flow.on_map_clustered()?;

    std::fs::create_dir_all(OUTPUT_DIR)?;

    // 3. Scripted session.
    let t0 = Instant::now();
    let mut ticks = 0;
    for frame in 0..FRAMES {
        match frame {
            60 => {
                map.borrow_mut().pan_by(120.0, -40.0);
                flow.on_map_event(MapEvent::Move);
            }
            120 => {
                if map.borrow_mut().zoom_in() {
                    flow.on_map_event(MapEvent::Zoom);
                    // The clusterer finishes its animation and reports back.
                    flow.on_map_clustered()?;
                }
            }
            180 => {
                map.borrow_mut().resize(1280.0, 720.0);
                flow.on_map_event(MapEvent::Resize { width: 1280, height: 720 });
            }
            _ => {}
        }

        let tokens = queue.borrow_mut().drain_frame();
        ticks += flow.dispatch(tokens);

        if frame % 60 == 59 {
            snapshot(&flow, frame)?;
        }
    }
    let elapsed = t0.elapsed();

    // 4. Final frame as SVG, redrawn from the retained geo points.
    let final_points: Vec<GeoPoint> = flow.layer().points().collect();
    let (w, h) = map.borrow().size();
    let mut svg_layer = DotLayer::new(LayerConfig { dot_radius: 1.5 })
        .with_surface(DisplayList::new(w as u32, h as u32));
    svg_layer.add_to(Rc::clone(&map))?;
    for p in final_points {
        svg_layer.add_geo(p);
    }
    if let Some(list) = svg_layer.surface() {
        let path = Path::new(OUTPUT_DIR).join("final.svg");
        std::fs::write(&path, list.to_svg())?;
        println!("  {} ({} dots)", path.display(), list.len());
    }

    // 5. Summary.
    let sim = flow.simulation().context("no simulation running")?;
    println!();
    println!("Frames: {FRAMES}  |  Ticks: {ticks}  |  {:.3} s", elapsed.as_secs_f64());
    println!("Generation {} at {}", flow.generation(), flow.zoom().unwrap_or_default());
    println!("Degraded frames: {}", flow.layer().frames_degraded());
    println!();
    println!("{:<8} {:<22} {:>8} {:>10}", "Node", "Position", "Weight", "Particles");
    println!("{}", "-".repeat(52));
    for (i, (node, count)) in sim.nodes().iter().zip(sim.target_counts()).enumerate() {
        println!("{:<8} {:<22} {:>8.3} {:>10}", i, node.position.to_string(), node.weight, count);
    }

    info!(ticks, "headless run complete");
    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tf_flow=debug"));
    fmt().with_env_filter(filter).with_target(true).init();
}

fn snapshot<M, F>(flow: &FlowController<PixelCanvas, M, F>, frame: u64) -> Result<()>
where
    M: tf_core::MapProjection + Clone + 'static,
    F: tf_core::FrameScheduler + Clone,
{
    let layer = flow.layer();
    let Some(canvas) = layer.surface() else {
        return Ok(());
    };
    let path = Path::new(OUTPUT_DIR).join(format!("frame_{frame:03}.ppm"));
    let mut out = BufWriter::new(File::create(&path)?);
    canvas.write_ppm(&mut out, BACKGROUND)?;
    out.flush()?;
    println!("  {} ({} dots, {} lit px)", path.display(), layer.drawn_count(), canvas.lit_pixels());
    Ok(())
}
