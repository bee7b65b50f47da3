//! Browser glue: ticket DOM, canvas compositing, pointer wiring and the custom
//! events that tell the page a ticket was revealed or closed.
//!
//! All state lives in a thread-local [`Scene`]. Handlers take their borrow, mutate
//! the booth, release it, and only then dispatch events, so page listeners may call
//! back into `spawn_ticket` / `close_ticket` synchronously.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    AddEventListenerOptions, CanvasRenderingContext2d, CustomEvent, CustomEventInit, Document,
    Event, HtmlCanvasElement, HtmlElement, HtmlImageElement, MouseEvent, Response, TouchEvent,
    Window, window,
};

use crate::config::{AssetConfig, EngineConfig, Point, PrizeConfig, Rect};
use crate::error::ScratchError;
use crate::ticket::{
    PrizeBook, ScratchMark, Ticket, TicketBooth, TicketId, TicketSignal, to_native,
};

pub const REVEALED_EVENT: &str = "scratcher:revealed";
pub const CLOSED_EVENT: &str = "scratcher:closed";
const CONTAINER_ID: &str = "ticket-overlay-container";

type Listener = Closure<dyn FnMut(Event)>;

struct Assets {
    base: HtmlImageElement,
    cover: HtmlImageElement,
    icons: Vec<HtmlImageElement>,
}

impl Assets {
    async fn load(config: &EngineConfig) -> Result<Self, JsValue> {
        let base = load_image(&config.assets.ticket_base).await?;
        let cover = load_image(&config.assets.ticket_cover).await?;
        let mut icons = Vec::with_capacity(config.icons.len());
        for name in &config.icons {
            icons.push(load_image(&config.assets.icon_path(name)).await?);
        }
        Ok(Self { base, cover, icons })
    }
}

async fn load_image(src: &str) -> Result<HtmlImageElement, JsValue> {
    let img = HtmlImageElement::new()?;
    img.set_src(src);
    if let Err(e) = JsFuture::from(img.decode()).await {
        // Missing art is drawn as nothing, the ticket still works.
        tracing::warn!(src, error = ?e, "image failed to load");
    }
    Ok(img)
}

fn image_ready(img: &HtmlImageElement) -> bool {
    img.complete() && img.natural_width() > 0
}

/// DOM handles of one on-screen ticket.
struct TicketView {
    wrapper: HtmlElement,
    cover_ctx: CanvasRenderingContext2d,
    // Dropped together with the element.
    _listeners: Vec<Listener>,
}

impl TicketView {
    fn paint(&self, mark: &ScratchMark) {
        let ctx = &self.cover_ctx;
        if ctx.set_global_composite_operation("destination-out").is_err() {
            return;
        }
        for disc in [mark.brush, mark.jitter] {
            ctx.begin_path();
            if ctx
                .arc(disc.center.x, disc.center.y, disc.radius, 0.0, std::f64::consts::TAU)
                .is_ok()
            {
                ctx.fill();
            }
        }
    }
}

struct Scene {
    booth: TicketBooth,
    assets: Assets,
    views: HashMap<TicketId, TicketView>,
}

thread_local! {
    static SCENE: RefCell<Option<Scene>> = const { RefCell::new(None) };
    // Set while a `start_scene` call is awaiting assets or prizes.
    static STARTING: Cell<bool> = const { Cell::new(false) };
}

fn to_js(e: ScratchError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn window_or_err() -> Result<Window, JsValue> {
    window().ok_or_else(|| JsValue::from_str("no window"))
}

/// Load assets and prize codes, then make the booth ready for `spawn_ticket`.
/// `config_json` optionally overrides [`EngineConfig`] fields.
#[wasm_bindgen]
pub async fn start_scene(config_json: Option<String>) -> Result<(), JsValue> {
    if SCENE.with(|s| s.borrow().is_some()) || STARTING.with(Cell::get) {
        tracing::warn!("scene already started");
        return Ok(());
    }
    STARTING.with(|s| s.set(true));
    let built = build_scene(config_json).await;
    STARTING.with(|s| s.set(false));
    let (win, scene) = built?;

    SCENE.with(|s| s.replace(Some(scene)));
    install_stroke_end_listeners(&win)?;
    tracing::info!("scene ready");
    Ok(())
}

async fn build_scene(config_json: Option<String>) -> Result<(Window, Scene), JsValue> {
    let config = match config_json {
        Some(text) => EngineConfig::from_json(&text).map_err(to_js)?,
        None => EngineConfig::default(),
    };
    // Fail before any network or image work.
    config.validate().map_err(to_js)?;

    let win = window_or_err()?;
    let assets = Assets::load(&config).await?;
    let prizes = fetch_prizes(&win, &config.prizes).await;
    let booth = TicketBooth::from_entropy(config, prizes).map_err(to_js)?;
    Ok((
        win,
        Scene {
            booth,
            assets,
            views: HashMap::new(),
        },
    ))
}

async fn fetch_prizes(win: &Window, config: &PrizeConfig) -> PrizeBook {
    match fetch_text(win, &config.url).await {
        Ok(text) => PrizeBook::from_json(&text, config),
        Err(e) => {
            tracing::warn!(url = %config.url, error = ?e, "prize fetch failed");
            PrizeBook::offline(config)
        }
    }
}

async fn fetch_text(win: &Window, url: &str) -> Result<String, JsValue> {
    let resp: Response = JsFuture::from(win.fetch_with_str(url)).await?.dyn_into()?;
    if !resp.ok() {
        return Err(JsValue::from_str(&format!("HTTP {}", resp.status())));
    }
    let body = JsFuture::from(resp.text()?).await?;
    body.as_string()
        .ok_or_else(|| JsValue::from_str("response body is not text"))
}

// Strokes end wherever the pointer is released, not only over a ticket.
fn install_stroke_end_listeners(win: &Window) -> Result<(), JsValue> {
    for kind in ["mouseup", "touchend"] {
        let closure = Closure::wrap(Box::new(move |_evt: Event| {
            SCENE.with(|cell| {
                if let Ok(mut guard) = cell.try_borrow_mut() {
                    if let Some(scene) = guard.as_mut() {
                        scene.booth.pointer_up();
                    }
                }
            });
        }) as Box<dyn FnMut(_)>);
        win.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    Ok(())
}

/// Spawn the next ticket on top of the stack. Returns its id.
#[wasm_bindgen]
pub fn spawn_ticket() -> Result<u32, JsValue> {
    let doc = window_or_err()?
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let container = doc
        .get_element_by_id(CONTAINER_ID)
        .ok_or_else(|| JsValue::from_str("missing #ticket-overlay-container"))?;

    let (id, wrapper) = SCENE.with(|cell| -> Result<(TicketId, HtmlElement), JsValue> {
        let mut guard = cell.try_borrow_mut().map_err(|_| JsValue::from_str("scene busy"))?;
        let scene = guard
            .as_mut()
            .ok_or_else(|| JsValue::from_str("scene not started"))?;
        let id = scene.booth.spawn();
        let ticket = scene.booth.ticket(id).map_err(to_js)?;
        let view = build_view(&doc, ticket, &scene.assets, &scene.booth.config().assets)?;
        let wrapper = view.wrapper.clone();
        scene.views.insert(id, view);
        Ok((id, wrapper))
    })?;
    container.append_child(&wrapper)?;
    slide_in(&wrapper)?;
    Ok(id.0)
}

fn build_view(
    doc: &Document,
    ticket: &Ticket,
    assets: &Assets,
    asset_config: &AssetConfig,
) -> Result<TicketView, JsValue> {
    let id = ticket.id();
    let layout = ticket.layout();
    let mut listeners: Vec<Listener> = Vec::new();

    let wrapper: HtmlElement = doc.create_element("div")?.dyn_into()?;
    wrapper.set_class_name("scratcher-ticket");
    wrapper.set_attribute("data-ticket", &id.0.to_string())?;

    let close_btn: HtmlElement = doc.create_element("div")?.dyn_into()?;
    close_btn.set_class_name("close-btn");
    close_btn.set_inner_html("✖");
    {
        let closure = Closure::wrap(Box::new(move |_evt: Event| {
            if let Err(e) = close_ticket(id.0) {
                tracing::warn!(ticket = %id, error = ?e, "close failed");
            }
        }) as Box<dyn FnMut(_)>);
        close_btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        listeners.push(closure);
    }
    wrapper.append_child(&close_btn)?;

    // Prize layer: composed once, before the cover becomes interactive.
    let bg = new_canvas(doc, layout.surface_w, layout.surface_h)?;
    let ctx = context_2d(&bg)?;
    if image_ready(&assets.base) {
        ctx.draw_image_with_html_image_element(&assets.base, 0.0, 0.0)?;
    }
    for (slot, icon) in ticket.grid().icons.iter().enumerate() {
        let img = &assets.icons[icon.0];
        if image_ready(img) {
            let b = layout.slot_bounds(slot);
            ctx.draw_image_with_html_image_element_and_dw_and_dh(img, b.x, b.y, b.w, b.h)?;
        }
    }
    ctx.set_font(&asset_config.font);
    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");
    ctx.set_fill_style_str("#333");
    let c = layout.text_box.center();
    ctx.fill_text(ticket.prize_text(), c.x, c.y)?;

    let layer_bg: HtmlElement = doc.create_element("div")?.dyn_into()?;
    layer_bg.set_class_name("ticket-layer ticket-bg");
    layer_bg
        .style()
        .set_property("background-image", &format!("url({})", bg.to_data_url()?))?;
    wrapper.append_child(&layer_bg)?;

    // Cover layer the player scratches through.
    let cover = new_canvas(doc, layout.surface_w, layout.surface_h)?;
    cover.set_class_name("ticket-layer ticket-canvas");
    let cover_ctx = context_2d(&cover)?;
    if image_ready(&assets.cover) {
        cover_ctx.draw_image_with_html_image_element(&assets.cover, 0.0, 0.0)?;
    }
    wire_pointer(&cover, id, &mut listeners)?;
    wrapper.append_child(&cover)?;

    Ok(TicketView {
        wrapper,
        cover_ctx,
        _listeners: listeners,
    })
}

fn new_canvas(doc: &Document, w: u32, h: u32) -> Result<HtmlCanvasElement, JsValue> {
    let canvas: HtmlCanvasElement = doc.create_element("canvas")?.dyn_into()?;
    canvas.set_width(w);
    canvas.set_height(h);
    Ok(canvas)
}

fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, JsValue> {
    canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("no 2d context"))?
        .dyn_into()
        .map_err(JsValue::from)
}

#[derive(Clone, Copy)]
enum Pointer {
    Down,
    Move,
}

fn event_client_point(evt: &Event) -> Option<Point> {
    // `TouchEvent` is not defined on every desktop browser, so no instanceof check.
    if evt.type_().starts_with("touch") {
        let touch = evt.unchecked_ref::<TouchEvent>().touches().get(0)?;
        return Some(Point::new(touch.client_x() as f64, touch.client_y() as f64));
    }
    let mouse = evt.dyn_ref::<MouseEvent>()?;
    Some(Point::new(mouse.client_x() as f64, mouse.client_y() as f64))
}

fn wire_pointer(
    canvas: &HtmlCanvasElement,
    id: TicketId,
    listeners: &mut Vec<Listener>,
) -> Result<(), JsValue> {
    let touch_opts = AddEventListenerOptions::new();
    touch_opts.set_passive(false);

    let bindings = [
        ("mousedown", Pointer::Down, false),
        ("mousemove", Pointer::Move, false),
        ("touchstart", Pointer::Down, true),
        ("touchmove", Pointer::Move, true),
    ];
    for (kind, pointer, is_touch) in bindings {
        let target = canvas.clone();
        let closure = Closure::wrap(Box::new(move |evt: Event| {
            if is_touch && matches!(pointer, Pointer::Move) {
                // Keep the page from scrolling under the finger mid-stroke.
                evt.prevent_default();
            }
            if let Some(client) = event_client_point(&evt) {
                on_pointer(id, &target, client, pointer);
            }
        }) as Box<dyn FnMut(_)>);
        if is_touch {
            canvas.add_event_listener_with_callback_and_add_event_listener_options(
                kind,
                closure.as_ref().unchecked_ref(),
                &touch_opts,
            )?;
        } else {
            canvas.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
        }
        listeners.push(closure);
    }
    Ok(())
}

fn on_pointer(id: TicketId, canvas: &HtmlCanvasElement, client: Point, pointer: Pointer) {
    let bounds = canvas.get_bounding_client_rect();
    let display = Rect::new(bounds.left(), bounds.top(), bounds.width(), bounds.height());
    let signal = SCENE.with(|cell| {
        let mut guard = cell.try_borrow_mut().ok()?;
        let scene = guard.as_mut()?;
        let layout = &scene.booth.config().layout;
        let at = to_native(client, display, layout.surface_w, layout.surface_h)?;
        let scratch = match pointer {
            Pointer::Down => scene.booth.pointer_down(id, at),
            Pointer::Move => scene.booth.pointer_move(id, at),
        }?;
        if let Some(view) = scene.views.get(&id) {
            view.paint(&scratch.mark);
        }
        scratch.signal
    });
    if let Some(TicketSignal::Revealed { ticket, delay_ms }) = signal {
        // Fires even if the ticket is closed in the meantime.
        let scheduled = set_timeout(delay_ms, move || {
            dispatch(REVEALED_EVENT, &JsValue::from(ticket.0));
        });
        if let Err(e) = scheduled {
            tracing::warn!(ticket = %ticket, error = ?e, "could not schedule reveal");
        }
    }
}

/// Dismiss a ticket. Unknown or already-closing tickets are ignored.
#[wasm_bindgen]
pub fn close_ticket(id: u32) -> Result<(), JsValue> {
    let id = TicketId(id);
    let delay = SCENE.with(|cell| {
        let mut guard = cell.try_borrow_mut().ok()?;
        let scene = guard.as_mut()?;
        let delay = scene.booth.close(id)?;
        if let Some(view) = scene.views.get(&id) {
            let _ = view.wrapper.style().set_property("transform", "translateY(150vh)");
        }
        Some(delay)
    });
    let Some(delay) = delay else {
        return Ok(());
    };
    set_timeout(delay, move || finish_close(id))
}

fn finish_close(id: TicketId) {
    let signal = SCENE.with(|cell| {
        let mut guard = cell.try_borrow_mut().ok()?;
        let scene = guard.as_mut()?;
        let signal = scene.booth.finish_close(id)?;
        if let Some(view) = scene.views.remove(&id) {
            view.wrapper.remove();
        }
        Some(signal)
    });
    if let Some(TicketSignal::Closed { was_winner, .. }) = signal {
        dispatch(CLOSED_EVENT, &JsValue::from_bool(was_winner));
    }
}

fn slide_in(el: &HtmlElement) -> Result<(), JsValue> {
    let el = el.clone();
    let cb = Closure::once_into_js(move || {
        let _ = el.style().set_property("transform", "translateY(0)");
    });
    window_or_err()?.request_animation_frame(cb.unchecked_ref::<js_sys::Function>())?;
    Ok(())
}

fn set_timeout(ms: u32, f: impl FnOnce() + 'static) -> Result<(), JsValue> {
    let cb = Closure::once_into_js(f);
    window_or_err()?.set_timeout_with_callback_and_timeout_and_arguments_0(
        cb.unchecked_ref::<js_sys::Function>(),
        ms.min(i32::MAX as u32) as i32,
    )?;
    Ok(())
}

fn dispatch(name: &str, detail: &JsValue) {
    let Some(win) = window() else {
        return;
    };
    let init = CustomEventInit::new();
    init.set_detail(detail);
    match CustomEvent::new_with_event_init_dict(name, &init) {
        Ok(evt) => {
            let _ = win.dispatch_event(&evt);
        }
        Err(e) => tracing::warn!(event = name, error = ?e, "could not build event"),
    }
}
