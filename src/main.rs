use backdrop::plugin::ScenePlugin;
use backdrop::rendering::SceneRenderPlugin;
use bevy::prelude::*;
use bevy::window::WindowResolution;

fn main() {
    println!("Backdrop");
    println!("  1 / 2 / 3   toggle particles / shapes / rocket");
    println!("  = / -       speed up / slow down");
    println!("  P / C       next preset / next colour");
    println!("  Space, LMB  fire");

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Backdrop".into(),
                resolution: WindowResolution::new(1200, 680),
                ..Default::default()
            }),
            ..Default::default()
        }))
        .insert_resource(ClearColor(Color::BLACK))
        // SceneConfig is loaded from assets/scene.toml (if present) before the
        // scene is built; the quality tier is detected at the same time.
        .add_plugins(ScenePlugin)
        .add_plugins(SceneRenderPlugin)
        .run();
}
