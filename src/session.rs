//! Everything one running showroom owns.
//!
//! A [`Session`] bundles the camera, controls, scene, animation driver, markers,
//! overlay timeline, loading progress and the page [`Hud`], and advances them in a
//! fixed order once per frame. It never touches the GPU, which keeps it usable in
//! tests with a [`crate::hud::HeadlessHud`].

use anyhow::{Error, Result};
use cgmath::{Deg, Point3};
use instant::Duration;
use log::{info, warn};

use crate::{
    animation::AnimationDriver,
    assembler::{BOX_ITEMS_KEY, assemble_box_items, assemble_model},
    camera::Camera,
    controls::OrbitControls,
    data_structures::{
        scene_graph::Scene,
        texture::{BakedTexture, TextureHandle},
    },
    hud::Hud,
    layout::{self, BoxItem, ModelSpec, PointOfInterest},
    loading::{LoadEvent, LoadingManager},
    markers::Markers,
    overlay::{Overlay, OverlayEvent},
    raycast::Frustum,
    render::Render,
    resources::ModelAsset,
    settings::Settings,
};

pub struct Session<H: Hud> {
    pub settings: Settings,
    pub camera: Camera,
    pub controls: OrbitControls,
    pub scene: Scene,
    pub animations: AnimationDriver,
    pub markers: Markers,
    pub overlay: Overlay,
    pub loading: LoadingManager,
    pub hud: H,
    models: Vec<ModelSpec>,
    texture_url: String,
    texture: TextureHandle,
    scene_ready: bool,
    viewport: (u32, u32),
}

impl<H: Hud> Session<H> {
    /// A session for `models`, all painted with the texture at `texture_url`.
    ///
    /// `viewport` is the logical size of the canvas.
    pub fn new(
        settings: Settings,
        models: Vec<ModelSpec>,
        texture_url: &str,
        box_items: &[BoxItem],
        points: &[PointOfInterest],
        hud: H,
        viewport: (u32, u32),
    ) -> Self {
        let (width, height) = (viewport.0.max(1), viewport.1.max(1));
        let camera = Camera::new(
            Point3::from(settings.camera.position),
            Point3::from(settings.controls.target),
            Deg(settings.camera.fov_degrees),
            width as f32 / height as f32,
            settings.camera.near,
            settings.camera.far,
        );
        let controls = OrbitControls::new(&settings.controls, &camera);
        let overlay = Overlay::new(settings.overlay.clone());

        let mut scene = Scene::new();
        if !box_items.is_empty() {
            scene.add(BOX_ITEMS_KEY, assemble_box_items(box_items));
        }

        Self {
            settings,
            camera,
            controls,
            scene,
            animations: AnimationDriver::new(),
            markers: Markers::from_layout(points),
            overlay,
            loading: LoadingManager::new(),
            hud,
            models,
            texture_url: texture_url.to_string(),
            texture: BakedTexture::new(texture_url),
            scene_ready: false,
            viewport: (width, height),
        }
    }

    /// The showroom as laid out in [`crate::layout`].
    pub fn showroom(settings: Settings, hud: H, viewport: (u32, u32)) -> Self {
        Self::new(
            settings,
            layout::MODELS.to_vec(),
            layout::BAKED_TEXTURE,
            layout::BOX_ITEMS,
            layout::POINTS_OF_INTEREST,
            hud,
            viewport,
        )
    }

    /// Registers every asset with the loading manager and returns the urls to load.
    pub fn begin_loading(&mut self) -> Vec<String> {
        let urls: Vec<String> = std::iter::once(self.texture_url.clone())
            .chain(self.models.iter().map(|spec| spec.url.to_string()))
            .collect();
        for url in &urls {
            self.loading.item_start(url);
        }
        urls
    }

    pub fn texture(&self) -> &TextureHandle {
        &self.texture
    }

    pub fn is_scene_ready(&self) -> bool {
        self.scene_ready
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    /// Places a loaded model according to its layout entry and starts its
    /// animations.
    pub fn instantiate_model(&mut self, asset: &ModelAsset, now: Duration) {
        let Some(spec) = self.models.iter().find(|spec| spec.url == asset.url).copied() else {
            warn!("{} is not part of the layout", asset.url);
            return;
        };
        let node = assemble_model(&spec, asset, &self.texture);
        self.scene.add(spec.key, node);
        if !spec.animations.is_empty() {
            self.animations
                .bind(spec.key, &asset.clips, spec.animations, now);
        }
    }

    /// Records a finished load and updates the progress display. The last item
    /// starts the overlay timeline.
    pub fn finish_item(&mut self, url: &str, now: Duration) -> Result<()> {
        for event in self.loading.item_end(url)? {
            match event {
                LoadEvent::Progress { state, .. } => self.hud.set_progress(state.ratio())?,
                LoadEvent::Loaded => self.overlay.complete(now),
            }
        }
        Ok(())
    }

    /// Records a failed load. The returned error ends the session.
    pub fn fail_item(&mut self, url: &str, err: Error) -> Error {
        self.loading.item_error(url, err)
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.viewport = (width, height);
            self.camera.resize(width, height);
        }
    }

    /// One frame: overlay timers, controls, animations, transforms, markers.
    pub fn update(&mut self, dt: f32, now: Duration) -> Result<()> {
        for event in self.overlay.update(now) {
            match event {
                OverlayEvent::FadeStarted => {
                    self.hud.end_loading_bar()?;
                    self.hud.reveal_footer()?;
                }
                OverlayEvent::SceneReady => {
                    info!("Scene ready");
                    self.scene_ready = true;
                }
                OverlayEvent::Removed => info!("Loading overlay removed"),
            }
        }

        if self.controls.update(&mut self.camera, dt) && self.controls.bounce_off_azimuth_limits() {
            log::debug!(
                "Auto-rotation bounced, speed now {:.3}",
                self.controls.auto_rotate_speed
            );
        }

        self.animations.update(&mut self.scene, now);
        self.scene.update_world_transforms();

        if self.scene_ready {
            self.markers
                .update(&self.camera, &self.scene, self.viewport, &mut self.hud)?;
        }
        Ok(())
    }

    pub fn frustum(&self) -> Frustum {
        Frustum::from_view_proj(&self.camera.view_projection())
    }

    pub fn get_render(&self) -> Render<'_> {
        Render::Defaults(self.scene.get_render())
    }
}
