//! The page around the canvas: loading bar, footer and marker elements.
//!
//! On the web the [`Hud`] mutates DOM elements found by CSS selector. Natively
//! there is no page, so [`HeadlessHud`] keeps the state and reports it through the
//! log. Tests use the headless variant to observe what the page would show.

use anyhow::*;
use log::{debug, info};

use crate::markers::MarkerState;

pub trait Hud {
    /// Loading bar fill in [0, 1].
    fn set_progress(&mut self, ratio: f32) -> Result<()>;

    /// Marks the loading bar as ended and clears its fill transform.
    fn end_loading_bar(&mut self) -> Result<()>;

    fn reveal_footer(&mut self) -> Result<()>;

    /// Shows or hides marker `idx` and moves it to `screen` (pixels from the
    /// viewport centre).
    fn update_marker(&mut self, idx: usize, state: MarkerState, screen: (f32, f32)) -> Result<()>;
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct HeadlessHud {
    pub progress: Vec<f32>,
    pub loading_bar_ended: bool,
    pub footer_revealed: bool,
    pub markers: Vec<Option<(MarkerState, (f32, f32))>>,
}

impl HeadlessHud {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last progress shown, zero before the first update.
    pub fn last_progress(&self) -> f32 {
        self.progress.last().copied().unwrap_or(0.0)
    }
}

impl Hud for HeadlessHud {
    fn set_progress(&mut self, ratio: f32) -> Result<()> {
        debug!("Loading {:.0}%", ratio * 100.0);
        self.progress.push(ratio);
        Ok(())
    }

    fn end_loading_bar(&mut self) -> Result<()> {
        info!("Loading bar ended");
        self.loading_bar_ended = true;
        Ok(())
    }

    fn reveal_footer(&mut self) -> Result<()> {
        info!("Footer revealed");
        self.footer_revealed = true;
        Ok(())
    }

    fn update_marker(&mut self, idx: usize, state: MarkerState, screen: (f32, f32)) -> Result<()> {
        if self.markers.len() <= idx {
            self.markers.resize(idx + 1, None);
        }
        if self.markers[idx].map(|(previous, _)| previous) != Some(state) {
            debug!("Marker {idx} is now {state:?}");
        }
        self.markers[idx] = Some((state, screen));
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
pub use dom::DomHud;

#[cfg(target_arch = "wasm32")]
pub type PlatformHud = DomHud;

#[cfg(not(target_arch = "wasm32"))]
pub type PlatformHud = HeadlessHud;

/// The hud of the current platform for the page described by `settings`.
#[cfg(target_arch = "wasm32")]
pub fn platform_hud(settings: &crate::settings::Settings) -> Result<PlatformHud> {
    DomHud::new(&settings.selectors, crate::layout::POINTS_OF_INTEREST)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn platform_hud(_settings: &crate::settings::Settings) -> Result<PlatformHud> {
    Ok(HeadlessHud::new())
}

#[cfg(target_arch = "wasm32")]
mod dom {
    use anyhow::*;
    use wasm_bindgen::JsCast;
    use web_sys::HtmlElement;

    use super::Hud;
    use crate::{layout::PointOfInterest, markers::MarkerState, settings::Selectors};

    fn js_error(err: wasm_bindgen::JsValue) -> Error {
        anyhow!("{:?}", err)
    }

    fn query(document: &web_sys::Document, selector: &str) -> Result<HtmlElement> {
        document
            .query_selector(selector)
            .map_err(js_error)?
            .ok_or_else(|| anyhow!("Missing page element {selector}"))?
            .dyn_into::<HtmlElement>()
            .map_err(|_| anyhow!("{selector} is not an HTML element"))
    }

    #[derive(Debug)]
    pub struct DomHud {
        loading_bar: HtmlElement,
        footer: HtmlElement,
        markers: Vec<HtmlElement>,
    }

    impl DomHud {
        /// Looks up every element up front. A missing element is an error.
        pub fn new(selectors: &Selectors, points: &[PointOfInterest]) -> Result<Self> {
            let document = web_sys::window()
                .and_then(|window| window.document())
                .ok_or_else(|| anyhow!("No document to attach to"))?;
            Ok(Self {
                loading_bar: query(&document, &selectors.loading_bar)?,
                footer: query(&document, &selectors.footer)?,
                markers: points
                    .iter()
                    .map(|point| query(&document, point.selector))
                    .collect::<Result<_>>()?,
            })
        }
    }

    impl Hud for DomHud {
        fn set_progress(&mut self, ratio: f32) -> Result<()> {
            self.loading_bar
                .style()
                .set_property("transform", &format!("scaleX({ratio})"))
                .map_err(js_error)
        }

        fn end_loading_bar(&mut self) -> Result<()> {
            self.loading_bar.class_list().add_1("ended").map_err(js_error)?;
            self.loading_bar
                .style()
                .set_property("transform", "")
                .map_err(js_error)
        }

        fn reveal_footer(&mut self) -> Result<()> {
            self.footer.class_list().remove_1("hidden").map_err(js_error)
        }

        fn update_marker(&mut self, idx: usize, state: MarkerState, (x, y): (f32, f32)) -> Result<()> {
            let element = self
                .markers
                .get(idx)
                .ok_or_else(|| anyhow!("No element for marker {idx}"))?;
            match state {
                MarkerState::Visible => element.class_list().add_1("visible"),
                MarkerState::Hidden => element.class_list().remove_1("visible"),
            }
            .map_err(js_error)?;
            element
                .style()
                .set_property("transform", &format!("translateX({x}px) translateY({y}px)"))
                .map_err(js_error)
        }
    }
}
