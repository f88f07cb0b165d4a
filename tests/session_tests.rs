//! A whole session driven without a GPU: loading, overlay timeline, markers.

mod common;

use anyhow::anyhow;
use common::*;
use instant::Duration;
use showroom::{
    assembler::BOX_ITEMS_KEY,
    hud::HeadlessHud,
    layout::{self, ModelSpec, PointOfInterest},
    session::Session,
    settings::Settings,
};

const TEXTURE: &str = "textures/baked.jpg";
const ROOM: &str = "models/room.glb";

const POINTS: &[PointOfInterest] = &[PointOfInterest {
    position: [0.0, 1.0, 0.0],
    selector: ".point-0",
}];

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

fn room_session() -> Session<HeadlessHud> {
    Session::new(
        Settings::default(),
        vec![ModelSpec::single("room", ROOM)],
        TEXTURE,
        &[],
        POINTS,
        HeadlessHud::new(),
        (800, 600),
    )
}

fn tick(session: &mut Session<HeadlessHud>, now: Duration) {
    session.update(1.0 / 60.0, now).unwrap();
}

#[test]
fn the_texture_loads_first() {
    let mut session = room_session();
    assert_eq!(session.begin_loading(), vec![TEXTURE, ROOM]);
    assert_eq!(session.loading.progress().total, 2);
}

#[test]
fn loading_drives_the_overlay_and_markers() {
    let mut session = room_session();
    session.begin_loading();

    session.finish_item(TEXTURE, ms(200)).unwrap();
    assert_eq!(session.hud.last_progress(), 0.5);

    session.instantiate_model(&cube_model(ROOM, vec![]), ms(900));
    assert!(session.scene.get("room").is_some());
    session.finish_item(ROOM, ms(1_000)).unwrap();
    assert_eq!(session.hud.last_progress(), 1.0);
    assert!(session.loading.is_complete());

    tick(&mut session, ms(1_400));
    assert!(!session.hud.loading_bar_ended);
    assert!(!session.hud.footer_revealed);

    tick(&mut session, ms(1_500));
    assert!(session.hud.loading_bar_ended);
    assert!(session.hud.footer_revealed);

    tick(&mut session, ms(2_400));
    assert!(!session.is_scene_ready());
    assert!(session.hud.markers.is_empty());

    tick(&mut session, ms(2_500));
    assert!(session.is_scene_ready());
    assert_eq!(session.hud.markers.len(), 1);
    assert!(session.overlay.is_visible());

    tick(&mut session, ms(6_000));
    assert!(!session.overlay.is_visible());
}

#[test]
fn failures_and_unknown_items_are_errors() {
    let mut session = room_session();
    session.begin_loading();

    let err = session.fail_item(ROOM, anyhow!("connection reset"));
    assert!(format!("{err:#}").contains(ROOM));
    assert!(session.finish_item("models/missing.glb", ms(0)).is_err());
}

#[test]
fn models_outside_the_layout_are_ignored() {
    let mut session = room_session();
    session.instantiate_model(&cube_model("models/stray.glb", vec![]), ms(0));
    assert!(session.scene.is_empty());
}

#[test]
fn resizing_updates_the_viewport() {
    let mut session = room_session();
    session.resize(1_024, 512);
    assert_eq!(session.viewport(), (1_024, 512));
    // minimised windows keep the last size
    session.resize(0, 0);
    assert_eq!(session.viewport(), (1_024, 512));
}

#[test]
fn the_showroom_loads_every_layout_model() {
    let mut session = Session::showroom(Settings::default(), HeadlessHud::new(), (800, 600));
    let urls = session.begin_loading();
    assert_eq!(urls.len(), layout::MODELS.len() + 1);
    assert_eq!(urls[0], layout::BAKED_TEXTURE);
    assert!(session.scene.get(BOX_ITEMS_KEY).is_some());
}
