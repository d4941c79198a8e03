//! Hit-Stop Lab entry point
//!
//! Web: binds the canvas, routes mouse/touch/keys into the session and
//! draws every animation frame. Native: runs a scripted bout per weapon and
//! logs what happened.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, MouseEvent, TouchEvent};

    use hitstop_lab::consts::*;
    use hitstop_lab::platform::{CanvasMapping, PointerEvent};
    use hitstop_lab::renderer::frame::weapon_label;
    use hitstop_lab::renderer::{RenderState, build_frame};
    use hitstop_lab::{Session, Settings, WeaponKind};

    /// Game instance holding all state
    struct Game {
        session: Session,
        render_state: Option<RenderState>,
        canvas: HtmlCanvasElement,
        last_time: f64,
    }

    impl Game {
        fn new(session: Session, canvas: HtmlCanvasElement) -> Self {
            Self {
                session,
                render_state: None,
                canvas,
                last_time: 0.0,
            }
        }

        /// Current client → arena mapping (the canvas may be resized by CSS)
        fn mapping(&self) -> CanvasMapping {
            let rect = self.canvas.get_bounding_client_rect();
            CanvasMapping::new(
                rect.left() as f32,
                rect.top() as f32,
                rect.width() as f32,
                rect.height() as f32,
            )
        }

        fn pointer_at(&mut self, client_x: f32, client_y: f32, make: fn(glam::Vec2) -> PointerEvent) {
            let pos = self.mapping().to_arena(client_x, client_y);
            self.session.pointer(make(pos));
        }

        /// Run simulation ticks
        fn update(&mut self, dt: f32) {
            for report in self.session.advance(dt) {
                if report.knocked_out {
                    log::info!("Knockout! Press R to respawn");
                }
            }
        }

        /// Render the current frame
        fn render(&mut self) {
            let frame = build_frame(&self.session.snapshot());
            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(&frame) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        render_state.resize(render_state.size.0, render_state.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let snapshot = self.session.snapshot();

            if let Some(el) = document.get_element_by_id("hud-weapon") {
                el.set_text_content(Some(weapon_label(snapshot.weapon)));
            }
            if let Some(el) = document.get_element_by_id("hud-hp") {
                let text = if snapshot.target.infinite {
                    "∞".to_string()
                } else {
                    format!("{:.0} / {:.0}", snapshot.target.hp, snapshot.target.max_hp)
                };
                el.set_text_content(Some(&text));
            }
            if let Some(el) = document.get_element_by_id("hud-freeze") {
                el.set_text_content(Some(&snapshot.hit_stop.remaining.to_string()));
            }
            if let Some(el) = document.get_element_by_id("respawn-button") {
                let class = if snapshot.respawn_available { "" } else { "hidden" };
                let _ = el.set_attribute("class", class);
            }
        }
    }

    fn js_err(msg: &str) -> JsValue {
        JsValue::from_str(msg)
    }

    /// Settings from the canvas `data-settings` attribute, if present
    fn load_settings(canvas: &HtmlCanvasElement) -> Settings {
        let Some(json) = canvas.get_attribute("data-settings") else {
            return Settings::default();
        };
        match Settings::from_json(&json) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Ignoring data-settings: {e}");
                Settings::default()
            }
        }
    }

    pub async fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).map_err(|e| js_err(&e.to_string()))?;

        log::info!("Hit-Stop Lab starting...");

        let window = web_sys::window().ok_or_else(|| js_err("no window"))?;
        let document = window.document().ok_or_else(|| js_err("no document"))?;

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or_else(|| js_err("no canvas"))?
            .dyn_into()
            .map_err(|_| js_err("not a canvas"))?;

        // Set canvas size
        let dpr = window.device_pixel_ratio();
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let mut settings = load_settings(&canvas);
        if canvas.get_attribute("data-settings").is_none() {
            settings.seed = js_sys::Date::now() as u64;
        }
        let game = Rc::new(RefCell::new(Game::new(Session::new(settings), canvas.clone())));

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(|e| js_err(&e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| js_err(&e.to_string()))?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let render_state = RenderState::new(surface, &adapter, width, height)
            .await
            .map_err(|e| js_err(&e.to_string()))?;
        game.borrow_mut().render_state = Some(render_state);

        setup_input_handlers(&canvas, game.clone())?;
        setup_respawn_button(game.clone());

        if let Some(hud) = document.get_element_by_id("hud") {
            let _ = hud.set_attribute("class", "");
        }

        request_animation_frame(game);

        log::info!("Hit-Stop Lab running!");
        Ok(())
    }

    fn first_touch(event: &TouchEvent) -> Option<web_sys::Touch> {
        event
            .touches()
            .get(0)
            .or_else(|| event.changed_touches().get(0))
    }

    fn setup_input_handlers(
        canvas: &HtmlCanvasElement,
        game: Rc<RefCell<Game>>,
    ) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or_else(|| js_err("no window"))?;

        // Mouse: press on the canvas, move/release anywhere so drags can leave it
        let mouse: [(&str, fn(glam::Vec2) -> PointerEvent, bool); 3] = [
            ("mousedown", PointerEvent::down, true),
            ("mousemove", PointerEvent::moved, false),
            ("mouseup", PointerEvent::up, false),
        ];
        for (name, make, on_canvas) in mouse {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                game.borrow_mut()
                    .pointer_at(event.client_x() as f32, event.client_y() as f32, make);
            });
            let target: &web_sys::EventTarget = if on_canvas {
                canvas.as_ref()
            } else {
                window.as_ref()
            };
            target.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Touch: same three events, page scrolling suppressed
        let touch: [(&str, fn(glam::Vec2) -> PointerEvent); 4] = [
            ("touchstart", PointerEvent::down),
            ("touchmove", PointerEvent::moved),
            ("touchend", PointerEvent::up),
            ("touchcancel", PointerEvent::up),
        ];
        for (name, make) in touch {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = first_touch(&event) {
                    game.borrow_mut()
                        .pointer_at(touch.client_x() as f32, touch.client_y() as f32, make);
                }
            });
            canvas.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Keyboard: 1-5 pick a weapon, Space attacks the target, R respawns,
        // I toggles infinite HP
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let mut g = game.borrow_mut();
                let key = event.key();
                match key.as_str() {
                    "1" | "2" | "3" | "4" | "5" => {
                        let index = key.parse::<usize>().unwrap_or(1) - 1;
                        if let Some(&weapon) = WeaponKind::ALL.get(index) {
                            g.session.switch_weapon(weapon);
                            log::info!("Weapon: {weapon}");
                        }
                    }
                    " " => {
                        event.prevent_default();
                        if let Err(e) = g.session.attack_target() {
                            log::debug!("{e}");
                        }
                    }
                    "r" | "R" => {
                        if let Err(e) = g.session.respawn() {
                            log::warn!("{e}");
                        }
                    }
                    "i" | "I" => {
                        let mut settings = g.session.settings().clone();
                        settings.max_hp = match settings.max_hp {
                            Some(_) => None,
                            None => Some(DEFAULT_MAX_HP),
                        };
                        log::info!("Infinite HP: {}", settings.infinite_hp());
                        g.session = Session::new(settings);
                    }
                    _ => {}
                }
            });
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
    }

    fn setup_respawn_button(game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        if let Some(button) = document.get_element_by_id("respawn-button") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                if let Err(e) = game.borrow_mut().session.respawn() {
                    log::warn!("{e}");
                }
            });
            let _ = button
                .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            // Calculate delta time
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            g.update(dt);
            g.render();
            g.update_hud();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    if let Err(e) = wasm_game::run().await {
        log::error!("Startup failed: {:?}", e);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Hit-Stop Lab (native) starting...");
    log::info!("Native mode runs headless bouts - run with `trunk serve` for the web version");

    for weapon in hitstop_lab::WeaponKind::ALL {
        bout(weapon);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Scripted bout: attack the target repeatedly for ten seconds of sim time
#[cfg(not(target_arch = "wasm32"))]
fn bout(weapon: hitstop_lab::WeaponKind) {
    use glam::Vec2;
    use hitstop_lab::consts::*;
    use hitstop_lab::platform::PointerEvent;
    use hitstop_lab::{Session, Settings, WeaponKind};

    let mut session = Session::new(Settings::for_weapon(weapon));
    let mut hits = 0usize;
    let mut damage = 0.0f32;
    let mut frozen = 0u32;
    let mut knockouts = 0u32;

    for t in 0..TICK_RATE * 10 {
        let target = session.state().target.base_pos;
        let attacker = session.state().attacker.pos;

        match weapon {
            WeaponKind::Ball => {
                // Grab, fling toward the target (aimed high for the drop), let go
                let aim = (target - Vec2::new(0.0, 80.0) - attacker).normalize_or_zero();
                match t % 90 {
                    0 => session.pointer(PointerEvent::down(attacker)),
                    1..=6 => session.pointer(PointerEvent::moved(attacker + aim * 18.0)),
                    7 => session.pointer(PointerEvent::up(attacker)),
                    _ => {}
                }
            }
            WeaponKind::Sword => {
                // Carry the attacker into reach and keep holding it there
                let hold = target - Vec2::new(SWORD_REACH * 0.8, 0.0);
                match t {
                    0 => session.pointer(PointerEvent::down(attacker)),
                    1..=20 => {
                        let step = (hold - attacker).clamp_length_max(20.0);
                        session.pointer(PointerEvent::moved(attacker + step));
                    }
                    _ if t % 20 == 0 => {
                        if session.fire_or_activate(target).is_err() {
                            log::trace!("{weapon} not ready at tick {t}");
                        }
                    }
                    _ => {}
                }
            }
            _ => {
                if t % 20 == 0 && session.fire_or_activate(target).is_err() {
                    log::trace!("{weapon} not ready at tick {t}");
                }
            }
        }

        let report = session.step();
        hits += report.hits.len();
        damage += report.hits.iter().map(|h| h.damage).sum::<f32>();
        frozen += u32::from(report.frozen);
        if report.knocked_out {
            knockouts += 1;
            if let Err(e) = session.respawn() {
                log::warn!("{e}");
            }
        }
    }

    let end = session.snapshot();
    log::info!(
        "{weapon}: {hits} hits, {damage:.0} damage, {frozen} frozen ticks, {knockouts} KOs, target hp {:.0}",
        end.target.hp
    );
    println!(
        "{:<10} hits={:<4} damage={:<6.0} frozen={:<4} kos={}",
        weapon.as_str(),
        hits,
        damage,
        frozen,
        knockouts
    );
}
