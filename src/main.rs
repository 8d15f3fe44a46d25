//! Lingua Forge entry point
//!
//! On the web: wires DOM pointer events and layout into the forge and runs it
//! from `requestAnimationFrame`. Natively: a headless demo that swings the
//! hammer into the anvil and logs what it produced.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, PointerEvent as DomPointerEvent};

    use lingua_forge::audio::AudioManager;
    use lingua_forge::sim::{
        Forge, ForgeEvent, LayoutSource, PointerEvent, PointerKind, Rect, TickInput, UpgradeKind, Zones, tick,
    };
    use lingua_forge::{Settings, Tuning};

    /// Zone rectangles measured from page elements, relative to the canvas
    struct DomLayout {
        document: Document,
        canvas: HtmlCanvasElement,
    }

    impl DomLayout {
        fn rect_of(&self, id: &str, origin: (f64, f64)) -> Option<Rect> {
            let r = self.document.get_element_by_id(id)?.get_bounding_client_rect();
            Some(Rect::new(
                (r.left() - origin.0) as f32,
                (r.top() - origin.1) as f32,
                r.width() as f32,
                r.height() as f32,
            ))
        }
    }

    impl LayoutSource for DomLayout {
        fn measure(&self) -> Zones {
            let c = self.canvas.get_bounding_client_rect();
            let origin = (c.left(), c.top());
            Zones {
                bounds: Some(Rect::new(0.0, 0.0, c.width() as f32, c.height() as f32)),
                anvil: self.rect_of("anvil", origin),
                mortar: self.rect_of("mortar", origin),
                hearth: self.rect_of("hearth", origin),
                mold: self.rect_of("mold", origin),
                stow: self.rect_of("tool-rack", origin),
                letter_pool: self.rect_of("letter-pool", origin),
                verse: self.rect_of("verse", origin),
            }
        }
    }

    /// Game instance holding all state
    struct Game {
        forge: Forge,
        audio: AudioManager,
        settings: Settings,
        input: TickInput,
        last_time: f64,
        canvas: HtmlCanvasElement,
    }

    impl Game {
        fn update(&mut self, dt: f32) {
            let input = std::mem::take(&mut self.input);
            tick(&mut self.forge, &input, dt);
            for event in self.forge.drain_events() {
                self.dispatch(event);
            }
        }

        fn dispatch(&mut self, event: ForgeEvent) {
            match event {
                ForgeEvent::Sound(cue) => self.audio.play(cue),
                ForgeEvent::InputLock(locked) => {
                    let class = if locked { "dragging" } else { "" };
                    let _ = self.canvas.set_attribute("class", class);
                }
                ForgeEvent::Ripped { tool, speed } => {
                    log::info!("{} ripped free at {:.0}", tool.as_str(), speed);
                }
                _ => {}
            }
        }

        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let economy = &self.forge.economy;
            let hearth = &self.forge.hearth;
            let mold: String = economy
                .molds
                .first()
                .map(|m| m.slots().iter().map(|s| s.unwrap_or('_')).collect())
                .unwrap_or_default();
            let fields = [
                ("hud-letters", economy.letters.to_string()),
                ("hud-ink", economy.ink.to_string()),
                ("hud-words", economy.words.values().sum::<u32>().to_string()),
                ("hud-flying", (self.forge.letters.len() + self.forge.queued_spawns()).to_string()),
                ("hud-fuel", hearth.fuel().to_string()),
                ("hud-burn", format!("{:.0}%", hearth.burn_fraction() * 100.0)),
                ("hud-mold", mold),
            ];
            for (id, text) in fields {
                if let Some(el) = document.get_element_by_id(id) {
                    el.set_text_content(Some(&text));
                }
            }
            for kind in UpgradeKind::ALL {
                let id = format!("buy-{}", kind.as_str());
                if let Some(el) = document.get_element_by_id(&id) {
                    let cost = kind.cost(economy.upgrades.level(kind));
                    let _ = el.set_attribute("data-cost", &cost.to_string());
                }
            }
        }

        fn pointer(&mut self, kind: PointerKind, event: &DomPointerEvent) {
            let rect = self.canvas.get_bounding_client_rect();
            let x = (event.client_x() as f64 - rect.left()) as f32;
            let y = (event.client_y() as f64 - rect.top()) as f32;
            self.input
                .pointer
                .push(PointerEvent::new(kind, x, y, event.pointer_id()));
        }
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        log::info!("Lingua Forge starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;
        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()?;

        let settings = Settings::default();
        let layout = DomLayout {
            document: document.clone(),
            canvas: canvas.clone(),
        };
        let seed = js_sys::Date::now() as u64;
        let mut forge = Forge::new(Tuning::default(), Box::new(layout), seed);
        forge.apply_settings(&settings);
        let mut audio = AudioManager::new();
        audio.apply_settings(&settings);

        let game = Rc::new(RefCell::new(Game {
            forge,
            audio,
            settings,
            input: TickInput::default(),
            last_time: 0.0,
            canvas: canvas.clone(),
        }));
        log::info!("Forge initialized with seed: {}", seed);

        setup_pointer_handlers(&canvas, game.clone())?;
        setup_resize_handler(game.clone())?;
        setup_focus_handlers(game.clone())?;
        setup_upgrade_buttons(&document, game.clone())?;
        request_animation_frame(game);
        Ok(())
    }

    fn setup_pointer_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        for (name, kind) in [
            ("pointerdown", PointerKind::Down),
            ("pointermove", PointerKind::Move),
            ("pointerup", PointerKind::Up),
            ("pointercancel", PointerKind::Up),
        ] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: DomPointerEvent| {
                let mut g = game.borrow_mut();
                if kind == PointerKind::Down {
                    g.audio.resume();
                }
                g.pointer(kind, &event);
            });
            canvas.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        Ok(())
    }

    fn setup_resize_handler(game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            game.borrow_mut().input.resized = true;
        });
        window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn setup_focus_handlers(game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        for (name, muted) in [("blur", true), ("focus", false)] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut g = game.borrow_mut();
                if g.settings.mute_on_blur {
                    g.audio.set_muted(muted);
                }
            });
            window.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        Ok(())
    }

    /// Optional `buy-<upgrade>` buttons spend ink
    fn setup_upgrade_buttons(document: &Document, game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        for kind in UpgradeKind::ALL {
            let Some(button) = document.get_element_by_id(&format!("buy-{}", kind.as_str())) else {
                continue;
            };
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if game.borrow_mut().forge.buy(kind) {
                    log::info!("Bought {}", kind.as_str());
                }
            });
            button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        Ok(())
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
            // The tick clamps hitches itself
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                1.0 / 60.0
            };
            g.last_time = time;

            g.update(dt);
            g.update_hud();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Lingua Forge (native) starting...");
    log::info!("Native mode is a headless demo - serve the web build to play");

    let tuning = match std::env::args().nth(1) {
        Some(path) => match std::fs::read_to_string(&path).map(|s| lingua_forge::Tuning::from_json(&s)) {
            Ok(Ok(tuning)) => tuning,
            Ok(Err(e)) => {
                log::error!("Invalid tuning file {}: {}", path, e);
                std::process::exit(1);
            }
            Err(e) => {
                log::error!("Cannot read {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => lingua_forge::Tuning::default(),
    };

    demo::run(tuning);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use glam::Vec2;
    use lingua_forge::Tuning;
    use lingua_forge::sim::{
        Forge, ForgeEvent, PointerEvent, PointerKind, Rect, StaticLayout, TickInput, ToolKind, Zones, tick,
    };

    const DT: f32 = 1.0 / 60.0;

    fn zones() -> Zones {
        Zones {
            bounds: Some(Rect::new(0.0, 0.0, 1000.0, 700.0)),
            anvil: Some(Rect::new(500.0, 520.0, 220.0, 80.0)),
            mortar: Some(Rect::new(120.0, 560.0, 120.0, 60.0)),
            hearth: Some(Rect::new(860.0, 520.0, 120.0, 180.0)),
            mold: Some(Rect::new(780.0, 80.0, 120.0, 90.0)),
            stow: Some(Rect::new(0.0, 0.0, 90.0, 200.0)),
            letter_pool: Some(Rect::new(260.0, 600.0, 220.0, 100.0)),
            verse: Some(Rect::new(300.0, 30.0, 400.0, 60.0)),
        }
    }

    fn pointer(kind: PointerKind, at: Vec2) -> TickInput {
        TickInput {
            pointer: vec![PointerEvent::new(kind, at.x, at.y, 1)],
            ..Default::default()
        }
    }

    /// Let a ripped hammer come to rest, then pick it up again
    fn regrab(forge: &mut Forge, events: &mut Vec<ForgeEvent>) -> Vec2 {
        for _ in 0..240 {
            tick(forge, &TickInput::default(), DT);
            let hammer = forge.tool(ToolKind::Hammer);
            if hammer.regrab_cooldown <= 0.0 && hammer.head.vel.length() < 1.0 && hammer.angular_velocity == 0.0 {
                break;
            }
        }
        events.extend(forge.drain_events());
        let grip = forge.tool(ToolKind::Hammer).head.pos;
        tick(forge, &pointer(PointerKind::Down, grip), DT);
        log::info!("Re-grabbed the hammer at ({:.0}, {:.0})", grip.x, grip.y);
        grip
    }

    /// Grab the hammer, then repeatedly lift and slam the pivot over the anvil
    pub fn run(tuning: Tuning) {
        let mut forge = Forge::new(tuning, Box::new(StaticLayout(zones())), 42);
        let mut events = Vec::new();

        let mut grip = forge.tool(ToolKind::Hammer).head.pos;
        tick(&mut forge, &pointer(PointerKind::Down, grip), DT);

        let above = Vec2::new(610.0, 250.0);
        let below = Vec2::new(610.0, 470.0);
        for swing in 0..12 {
            if !forge.tool(ToolKind::Hammer).is_held() {
                grip = regrab(&mut forge, &mut events);
            }
            // Lift and let the head settle under the pivot
            for i in 0..30 {
                let t = (i + 1) as f32 / 30.0;
                let at = grip.lerp(above, t);
                tick(&mut forge, &pointer(PointerKind::Move, at), DT);
            }
            // Slam down
            for i in 0..10 {
                let t = (i + 1) as f32 / 10.0;
                let at = above.lerp(below, t);
                tick(&mut forge, &pointer(PointerKind::Move, at), DT);
            }
            for _ in 0..10 {
                tick(&mut forge, &pointer(PointerKind::Move, below), DT);
            }
            grip = below;
            events.extend(forge.drain_events());
            log::debug!("swing {} done, {} letters in flight", swing, forge.letters.len());
        }

        tick(&mut forge, &pointer(PointerKind::Up, below), DT);
        for _ in 0..240 {
            tick(&mut forge, &TickInput::default(), DT);
        }
        events.extend(forge.drain_events());

        let strikes = events
            .iter()
            .filter(|e| matches!(e, ForgeEvent::LetterForged { .. }))
            .count();
        let landed = events
            .iter()
            .filter(|e| matches!(e, ForgeEvent::LetterLanded { .. }))
            .count();
        let rips = events
            .iter()
            .filter(|e| matches!(e, ForgeEvent::Ripped { .. }))
            .count();

        println!("strikes: {strikes}, letters landed: {landed}, rips: {rips}");
        println!(
            "economy: {} letters, {} ink, hearth level {}",
            forge.economy.letters,
            forge.economy.ink,
            lingua_forge::sim::HeatSource::level(&forge.hearth)
        );
    }
}
