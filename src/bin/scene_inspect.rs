//! Loads a glTF or OBJ scene and prints what a frame would draw.
//!
//! ```text
//! scene-inspect <scene.gltf|scene.glb|scene.obj> [frustum|scene|warp]
//! ```

use anyhow::{Context as _, bail};
use log::info;
use umbra::{
    context::{Context, FitMethod, RenderConfig},
    resources::load_scene,
};

fn parse_method(arg: Option<&str>) -> anyhow::Result<FitMethod> {
    Ok(match arg {
        None | Some("frustum") => FitMethod::FrustumAabb,
        Some("scene") => FitMethod::SceneAndFrustum,
        Some("warp") => FitMethod::PerspectiveWarp,
        Some(other) => bail!("unknown fit method {other:?}, expected frustum, scene or warp"),
    })
}

fn main() -> anyhow::Result<()> {
    let env = env_logger::Env::default().default_filter_or("info");
    if let Err(e) = env_logger::Builder::from_env(env).try_init() {
        println!("Warning: Could not initialize logger: {}", e);
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(path) = args.first() else {
        bail!("usage: scene-inspect <scene.gltf|scene.glb|scene.obj> [frustum|scene|warp]");
    };
    let mut config = RenderConfig::default();
    config.shadow.method = parse_method(args.get(1).map(String::as_str))?;

    let scene = load_scene(path).with_context(|| format!("loading {path}"))?;
    info!(
        "{path}: {} nodes, {} meshes, {} materials, {} cameras, {} lights",
        scene.graph.len(),
        scene.meshes.len(),
        scene.materials.len(),
        scene.cameras.len(),
        scene.lights.len()
    );
    if let Some(bounds) = scene.bounds() {
        info!("bounds {:?} .. {:?}", bounds.min, bounds.max);
    }

    let context = Context::new(scene, config);
    let records = context.draw_records(0, None);
    info!("{} draw records", records.len());

    let fit = context.shadow_fit(None);
    println!("shadow fit ({:?})", config.shadow.method);
    println!("  near {:.4} far {:.4} extra {:.4}", fit.near, fit.far, fit.extra);
    println!("  view {:?}", fit.light_view);
    println!("  projection {:?}", fit.light_projection);

    for (i, cascade) in context.cascades(None).iter().enumerate() {
        println!(
            "cascade {i}: [{:.3}, {:.3}] light depth [{:.3}, {:.3}]",
            cascade.near, cascade.far, cascade.fit.near, cascade.fit.far
        );
    }
    Ok(())
}
