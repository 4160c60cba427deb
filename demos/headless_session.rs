//! # Headless Session Demo
//!
//! Runs a full placement session without a device: a scripted tracker stands in
//! for the AR runtime and an in-memory fetcher serves a small catalog.
//!
//! ```text
//! RUST_LOG=debug cargo run --example headless_session
//! ```

use std::sync::Arc;

use anyhow::Context;
use cgmath::{Quaternion, Rad, Rotation3, Vector2, Vector3};
use furnish::assets::MemoryFetcher;
use furnish::catalog::Catalog;
use furnish::gfx::hit_test::scripted::{ScriptedFrame, ScriptedTracker};
use furnish::input::GestureEvent;
use furnish::{ArSession, EngineConfig};
use log::info;

const CATALOG: &str = r#"{
    "products": [
        {
            "id": "stool-01",
            "name": "Birch Stool",
            "price": 79.0,
            "model_url": "mem://stool.obj",
            "default_texture_id": "birch",
            "textures": [
                { "id": "birch", "name": "Birch", "diffuse_url": "mem://birch.png" },
                {
                    "id": "walnut",
                    "name": "Walnut",
                    "diffuse_url": "mem://walnut.png",
                    "roughness_url": "mem://walnut_rough.png"
                }
            ]
        }
    ]
}"#;

const STOOL_OBJ: &str = "\
o seat
v -0.2 0.45 -0.2
v 0.2 0.45 -0.2
v 0.2 0.45 0.2
v -0.2 0.45 0.2
vt 0 0
vt 1 0
vt 1 1
vt 0 1
f 1/1 2/2 3/3 4/4
";

fn solid_png(rgba: [u8; 4]) -> anyhow::Result<Vec<u8>> {
    let image = image::RgbaImage::from_pixel(4, 4, image::Rgba(rgba));
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgba8(image).write_to(
        &mut std::io::Cursor::new(&mut bytes),
        image::ImageOutputFormat::Png,
    )?;
    Ok(bytes)
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let catalog = Catalog::from_json_str(CATALOG).context("catalog")?;
    let stool = catalog
        .product("stool-01")
        .cloned()
        .context("stool missing from catalog")?;

    let fetcher = Arc::new(MemoryFetcher::new());
    fetcher.insert("mem://stool.obj", STOOL_OBJ);
    fetcher.insert("mem://birch.png", solid_png([222, 200, 160, 255])?);
    fetcher.insert("mem://walnut.png", solid_png([92, 64, 40, 255])?);
    fetcher.insert("mem://walnut_rough.png", solid_png([140, 140, 140, 255])?);

    let mut session = ArSession::new(fetcher.clone(), EngineConfig::default())?;
    session.start();
    session.arm_placement(stool, None)?;

    // A wall, a dropped frame, then the floor
    let mut tracker = ScriptedTracker::presenting();
    tracker
        .push_hit(
            Vector3::new(0.0, 1.2, -2.5),
            Quaternion::from_angle_x(Rad(std::f32::consts::FRAC_PI_2)),
        )
        .push(ScriptedFrame::Fail("tracking lost".to_string()))
        .push_hit(Vector3::new(0.1, -1.3, -1.8), Quaternion::new(1.0, 0.0, 0.0, 0.0));

    let mut frame = 0;
    let task = loop {
        frame += 1;
        let hit = session.on_frame(&mut tracker);
        info!("frame {}: placeable surface {:?}", frame, hit.map(|hit| hit.position));
        if let Some(task) = session.confirm_placement() {
            break task;
        }
        anyhow::ensure!(frame < 10, "no placeable surface found");
    };

    let id = pollster::block_on(task)?.context("session ended during placement")?;
    info!("placed {}", id);

    session.handle_gesture(GestureEvent::Translate(Vector2::new(40.0, -20.0)));
    session.handle_gesture(GestureEvent::Pinch {
        scale_delta: 0.25,
        rotate_delta: 0.3,
    });

    pollster::block_on(session.change_selected_texture("walnut"))?;

    for object in session.placed_objects() {
        info!(
            "{} `{}` in `{}` at {:?}, yaw {:.2} rad, scale {:.2}",
            object.id,
            object.product_id,
            object.texture_id,
            object.transform.position,
            object.transform.rotation.y.0,
            object.transform.scale
        );
    }
    info!("cart: {}", serde_json::to_string(&session.cart_items())?);
    info!("{} fetches for the whole session", fetcher.fetch_count());

    session.end();
    Ok(())
}
