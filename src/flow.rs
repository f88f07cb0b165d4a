//! Application event loop.
//!
//! The loop owns the GPU [`Context`] and the [`Session`] and glues them to winit:
//!
//! 1. Create the window (on the web: attach to the page canvas)
//! 2. Set up the GPU context and session, then start loading every asset
//! 3. Loaded assets come back as user events and are handed to the session
//! 4. Each redraw updates the session, uploads transforms and renders the scene
//!    followed by the loading overlay
//!
//! A failed asset ends the loop and [`run`] returns the error.

use std::{fmt::Debug, iter, sync::Arc};

use anyhow::{Context as _, Error, Result};
use instant::Instant;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    window::Window,
};

use crate::{
    context::Context,
    data_structures::model::DrawModel,
    hud::{PlatformHud, platform_hud},
    render::{Flat, Instanced, Render},
    resources::{Asset, load_asset},
    session::Session,
    settings::Settings,
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// GPU context and session, created together once the window exists.
pub struct AppState {
    pub(crate) ctx: Context,
    pub(crate) session: Session<PlatformHud>,
    started: Instant,
    is_surface_configured: bool,
}

impl Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("ctx", &self.ctx)
            .field("started", &self.started)
            .finish_non_exhaustive()
    }
}

impl AppState {
    async fn new(window: Arc<Window>, settings: Settings) -> Result<Self> {
        let ctx = Context::new(window, &settings)
            .await
            .context("Cannot create the main context")?;
        let hud = platform_hud(&settings)?;
        let viewport = ctx.viewport_size();
        let session = Session::showroom(settings, hud, viewport.logical);
        Ok(Self {
            ctx,
            session,
            started: Instant::now(),
            is_surface_configured: false,
        })
    }

    /// Time since the session started, the clock every timer runs on.
    fn now(&self) -> instant::Duration {
        self.started.elapsed()
    }

    fn resize(&mut self) {
        let size = self.ctx.viewport_size();
        let (width, height) = size.physical;
        if width > 0 && height > 0 {
            self.ctx.config.width = width;
            self.ctx.config.height = height;
            self.is_surface_configured = true;
            self.session.resize(size.logical.0, size.logical.1);
            self.ctx
                .surface
                .configure(&self.ctx.device, &self.ctx.config);
            self.ctx.depth_texture = crate::data_structures::texture::Texture::create_depth_texture(
                &self.ctx.device,
                [self.ctx.config.width, self.ctx.config.height],
                "depth_texture",
            );
        }
    }

    /// Hands a finished load to the session. Textures are uploaded first so the
    /// meshes painted with them never draw with a missing material.
    fn apply_asset(&mut self, asset: Asset) -> Result<()> {
        let now = self.now();
        let url = asset.url().to_string();
        match asset {
            Asset::Texture(texture) => self.ctx.upload_texture(&texture.url, &texture.image)?,
            Asset::Model(model) => self.session.instantiate_model(&model, now),
        }
        self.session.finish_item(&url, now)
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        self.ctx.window.request_redraw();

        // Rendering requires the surface to be configured
        if !self.is_surface_configured {
            return Ok(());
        }

        let frustum = self.session.frustum();
        self.ctx
            .camera
            .uniform
            .update_view_proj(&self.session.camera);
        self.ctx.queue.write_buffer(
            &self.ctx.camera.buffer,
            0,
            bytemuck::cast_slice(&[self.ctx.camera.uniform]),
        );
        self.session
            .scene
            .write_to_buffers(&self.ctx.queue, &self.ctx.device, Some(&frustum));
        self.ctx
            .overlay
            .write_alpha(&self.ctx.queue, self.session.overlay.alpha());

        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.ctx.clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.ctx.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            let render = if self.session.overlay.is_visible() {
                Render::Composed(vec![
                    self.session.get_render(),
                    Render::Overlay(self.ctx.overlay.get_render()),
                ])
            } else {
                self.session.get_render()
            };
            let mut basics: Vec<Instanced> = Vec::new();
            let mut overlays: Vec<Flat> = Vec::new();
            render.set_pipelines(&mut basics, &mut overlays);

            render_pass.set_pipeline(&self.ctx.pipelines.basic);
            for instanced in basics {
                // Everything culled this frame.
                if instanced.amount == 0 {
                    continue;
                }
                render_pass.set_vertex_buffer(1, instanced.instance.slice(..));
                for mesh in instanced.meshes {
                    let Some(gpu) = mesh.gpu() else {
                        log::warn!("{} was never uploaded", mesh.geometry.name);
                        continue;
                    };
                    let material = self.ctx.material_for(&mesh.surface, gpu);
                    render_pass.draw_mesh_instanced(
                        gpu,
                        material,
                        0..instanced.amount,
                        &self.ctx.camera.bind_group,
                    );
                }
            }

            render_pass.set_pipeline(&self.ctx.overlay.pipeline);
            for overlay in overlays {
                render_pass.set_bind_group(0, overlay.group, &[]);
                render_pass.set_vertex_buffer(0, overlay.vertex.slice(..));
                render_pass.set_index_buffer(overlay.index.slice(..), wgpu::IndexFormat::Uint16);
                render_pass.draw_indexed(0..overlay.amount, 0, 0..1);
            }
        }

        self.ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

pub(crate) enum FlowEvent {
    #[cfg(target_arch = "wasm32")]
    Initialized(Result<AppState>),
    Asset { url: String, result: Result<Asset> },
}

impl Debug for FlowEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            #[cfg(target_arch = "wasm32")]
            Self::Initialized(state) => f
                .debug_tuple("Initialized")
                .field(&state.is_ok())
                .finish(),
            Self::Asset { url, result } => f
                .debug_struct("Asset")
                .field("url", url)
                .field("ok", &result.is_ok())
                .finish(),
        }
    }
}

pub struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    proxy: EventLoopProxy<FlowEvent>,
    settings: Option<Settings>,
    asset_root: String,
    state: Option<AppState>,
    last_time: Instant,
    error: Option<Error>,
}

impl App {
    fn new(event_loop: &EventLoop<FlowEvent>, settings: Settings) -> Result<Self> {
        let proxy = event_loop.create_proxy();
        #[cfg(not(target_arch = "wasm32"))]
        let async_runtime = tokio::runtime::Runtime::new()?;
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            proxy,
            asset_root: settings.asset_root.clone(),
            settings: Some(settings),
            state: None,
            last_time: Instant::now(),
            error: None,
        })
    }

    /// Stops the loop. The first error is the one [`run`] reports.
    fn fail(&mut self, event_loop: &ActiveEventLoop, err: Error) {
        log::error!("{err:?}");
        if self.error.is_none() {
            self.error = Some(err);
        }
        event_loop.exit();
    }

    fn on_initialized(&mut self, mut state: AppState) {
        state.resize();
        for url in state.session.begin_loading() {
            self.spawn_load(url);
        }
        state.ctx.window.request_redraw();
        self.state = Some(state);
    }

    fn spawn_load(&self, url: String) {
        let proxy = self.proxy.clone();
        let root = self.asset_root.clone();
        let load = async move {
            let result = load_asset(root, url.clone()).await;
            if proxy.send_event(FlowEvent::Asset { url, result }).is_err() {
                log::warn!("Event loop closed before a load finished");
            }
        };
        #[cfg(not(target_arch = "wasm32"))]
        self.async_runtime.spawn(load);
        #[cfg(target_arch = "wasm32")]
        wasm_bindgen_futures::spawn_local(load);
    }
}

impl ApplicationHandler<FlowEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        // Resumed again (mobile), everything is set up already.
        let Some(settings) = self.settings.take() else {
            return;
        };

        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes().with_title("Showroom");

        #[cfg(target_arch = "wasm32")]
        {
            use anyhow::anyhow;
            use wasm_bindgen::JsCast;
            use winit::platform::web::WindowAttributesExtWebSys;

            let canvas = web_sys::window()
                .and_then(|window| window.document())
                .and_then(|document| document.query_selector(&settings.selectors.canvas).ok().flatten())
                .and_then(|element| element.dyn_into::<web_sys::HtmlCanvasElement>().ok());
            match canvas {
                Some(canvas) => window_attributes = window_attributes.with_canvas(Some(canvas)),
                None => {
                    let err = anyhow!("No canvas matches {}", settings.selectors.canvas);
                    self.fail(event_loop, err);
                    return;
                }
            }
        }

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                self.fail(event_loop, e.into());
                return;
            }
        };

        let init_future = AppState::new(window, settings);

        #[cfg(not(target_arch = "wasm32"))]
        match self.async_runtime.block_on(init_future) {
            Ok(state) => self.on_initialized(state),
            Err(e) => self.fail(event_loop, e),
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let state = init_future.await;
                if proxy.send_event(FlowEvent::Initialized(state)).is_err() {
                    log::error!("Event loop closed during initialization");
                }
            });
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: FlowEvent) {
        match event {
            #[cfg(target_arch = "wasm32")]
            FlowEvent::Initialized(state) => match state {
                Ok(state) => self.on_initialized(state),
                Err(e) => self.fail(event_loop, e),
            },
            FlowEvent::Asset { url, result } => {
                let Some(state) = &mut self.state else {
                    return;
                };
                let outcome = match result {
                    Ok(asset) => state.apply_asset(asset),
                    Err(err) => Err(state.session.fail_item(&url, err)),
                };
                if let Err(err) = outcome {
                    self.fail(event_loop, err);
                }
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(state) = &mut self.state else {
            return;
        };

        // Cursor positions arrive in physical pixels.
        let viewport_height = state.ctx.window.inner_size().height as f32;
        state
            .session
            .controls
            .handle_window_event(&event, viewport_height);

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => state.resize(),
            WindowEvent::RedrawRequested => {
                let dt = self.last_time.elapsed();
                self.last_time = Instant::now();

                let now = state.now();
                if let Err(err) = state.session.update(dt.as_secs_f32(), now) {
                    self.fail(event_loop, err);
                    return;
                }

                match state.render() {
                    Ok(_) => {}
                    // Reconfigure the surface if it's lost or outdated
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => state.resize(),
                    Err(e) => {
                        log::error!("Unable to render {}", e);
                    }
                }
            }
            _ => {}
        }
    }
}

/// Opens the showroom and runs it until the window closes or an asset fails.
pub fn run(settings: Settings) -> Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        console_log::init_with_level(log::Level::Info).unwrap_throw();
    }

    let event_loop: EventLoop<FlowEvent> = EventLoop::with_user_event().build()?;

    let mut app = App::new(&event_loop, settings)?;

    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
