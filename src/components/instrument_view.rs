use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{HtmlCanvasElement, KeyboardEvent, MouseEvent, TouchEvent, Window};
use yew::prelude::*;

use crate::config::InstrumentConfig;
use crate::input::{InputEvent, Locus, PointerId};
use crate::render::Painter;
use crate::state::{Session, SessionStats, Tick, ViewStatus};
use crate::web_midi::{self, ConsoleSink};

type SharedSession = Rc<RefCell<Option<Session>>>;

#[derive(Properties, PartialEq, Clone)]
pub struct InstrumentViewProps {
    pub config: InstrumentConfig,
    /// Bumped by the parent to end the session.
    pub end_request: u32,
    pub on_status: Callback<ViewStatus>,
    pub on_ended: Callback<SessionStats>,
    pub on_error: Callback<String>,
    pub on_resize: Callback<()>,
}

#[function_component]
pub fn InstrumentView(props: &InstrumentViewProps) -> Html {
    let canvas_ref = use_node_ref();
    let session: SharedSession = use_mut_ref(|| None);
    let armed_end = use_mut_ref(|| props.end_request);

    {
        let session = session.clone();
        use_effect_with(props.end_request, move |&request| {
            if request != *armed_end.borrow() {
                if let Some(s) = session.borrow_mut().as_mut() {
                    s.push(InputEvent::Quit);
                }
            }
            || ()
        });
    }

    {
        let canvas_ref = canvas_ref.clone();
        let session = session.clone();
        let props = props.clone();
        use_effect_with((), move |_| {
            let mounted = canvas_ref
                .cast::<HtmlCanvasElement>()
                .and_then(|canvas| Mounted::attach(canvas, session.clone(), &props));
            move || {
                if let Some(m) = mounted {
                    m.detach();
                }
                // unmounting mid-session must not leave notes hanging
                if let Some(s) = session.borrow_mut().as_mut() {
                    s.end();
                }
            }
        });
    }

    html! {
        <canvas ref={canvas_ref} style="display:block; touch-action:none; user-select:none; background:#000;" />
    }
}

fn window_size(window: &Window) -> (i32, i32) {
    let width = window
        .inner_width()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(800.0);
    let height = window
        .inner_height()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(600.0);
    (width.max(1.0) as i32, height.max(1.0) as i32)
}

/// Touches are reported as fractions of the canvas.
fn touch_listener(
    session: SharedSession,
    canvas: HtmlCanvasElement,
    make: fn(PointerId, Locus) -> InputEvent,
) -> Closure<dyn FnMut(TouchEvent)> {
    Closure::wrap(Box::new(move |e: TouchEvent| {
        // keeps the browser from also firing emulated mouse events
        e.prevent_default();
        let rect = canvas.get_bounding_client_rect();
        let (w, h) = ((rect.width() - 1.0).max(1.0), (rect.height() - 1.0).max(1.0));
        let touches = e.changed_touches();
        let mut session = session.borrow_mut();
        let Some(s) = session.as_mut() else {
            return;
        };
        for i in 0..touches.length() {
            if let Some(t) = touches.item(i) {
                let x = (t.client_x() as f64 - rect.left()) / w;
                let y = (t.client_y() as f64 - rect.top()) / h;
                s.push(make(
                    PointerId::Finger(t.identifier() as i64),
                    Locus::Display(x, y),
                ));
            }
        }
    }) as Box<dyn FnMut(_)>)
}

fn touch_end_listener(session: SharedSession) -> Closure<dyn FnMut(TouchEvent)> {
    Closure::wrap(Box::new(move |e: TouchEvent| {
        e.prevent_default();
        let touches = e.changed_touches();
        if let Some(s) = session.borrow_mut().as_mut() {
            for i in 0..touches.length() {
                if let Some(t) = touches.item(i) {
                    s.push(InputEvent::finger_up(t.identifier() as i64));
                }
            }
        }
    }) as Box<dyn FnMut(_)>)
}

fn mouse_listener(
    session: SharedSession,
    canvas: HtmlCanvasElement,
    make: fn(f64, f64) -> InputEvent,
) -> Closure<dyn FnMut(MouseEvent)> {
    Closure::wrap(Box::new(move |e: MouseEvent| {
        let rect = canvas.get_bounding_client_rect();
        let x = e.client_x() as f64 - rect.left();
        let y = e.client_y() as f64 - rect.top();
        if let Some(s) = session.borrow_mut().as_mut() {
            s.push(make(x, y));
        }
    }) as Box<dyn FnMut(_)>)
}

/// Listeners and the frame loop of one mounted session.
struct Mounted {
    window: Window,
    canvas: HtmlCanvasElement,
    raf_id: Rc<RefCell<Option<i32>>>,
    raf: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>,
    touch_start: Closure<dyn FnMut(TouchEvent)>,
    touch_move: Closure<dyn FnMut(TouchEvent)>,
    touch_end: Closure<dyn FnMut(TouchEvent)>,
    mouse_down: Closure<dyn FnMut(MouseEvent)>,
    mouse_move: Closure<dyn FnMut(MouseEvent)>,
    mouse_up: Closure<dyn FnMut(MouseEvent)>,
    keydown: Closure<dyn FnMut(KeyboardEvent)>,
    resize: Closure<dyn FnMut()>,
}

impl Mounted {
    fn attach(
        canvas: HtmlCanvasElement,
        session: SharedSession,
        props: &InstrumentViewProps,
    ) -> Option<Self> {
        let window = web_sys::window()?;
        let (w, h) = window_size(&window);
        canvas.set_width(w as u32);
        canvas.set_height(h as u32);

        let fresh = match Session::from_config(&props.config, w, h, Box::new(ConsoleSink)) {
            Ok(s) => s,
            Err(e) => {
                log::error!("cannot start `{}`: {e}", props.config.name);
                props.on_error.emit(e.to_string());
                return None;
            }
        };
        let mut painter = match Painter::new(&canvas) {
            Ok(p) => p,
            Err(e) => {
                log::error!("canvas unavailable: {e:?}");
                props.on_error.emit("canvas unavailable".into());
                return None;
            }
        };
        painter.clear(w as f64, h as f64);
        painter.paint(&fresh.draw_all());

        let surface = fresh.surface();
        let status = ViewStatus {
            pip: surface.mapper().pip_size(),
            screen: surface.screen_size(),
            panels: surface.panels().len(),
            tiles: surface.panels().iter().map(|p| p.tiles().len()).sum(),
            midi: None,
        };
        props.on_status.emit(status.clone());
        *session.borrow_mut() = Some(fresh);

        {
            let session = session.clone();
            let on_status = props.on_status.clone();
            web_midi::connect(props.config.midi.clone(), move |sink| {
                let midi = sink.name();
                if let Some(s) = session.borrow_mut().as_mut() {
                    s.outbox_mut().set_sink(sink);
                }
                on_status.emit(ViewStatus { midi, ..status });
            });
        }

        let touch_start = touch_listener(session.clone(), canvas.clone(), |pointer, at| {
            InputEvent::Down { pointer, at }
        });
        let touch_move = touch_listener(session.clone(), canvas.clone(), |pointer, at| {
            InputEvent::Move { pointer, at }
        });
        let touch_end = touch_end_listener(session.clone());
        let mouse_down = mouse_listener(session.clone(), canvas.clone(), InputEvent::mouse_down);
        let mouse_move = mouse_listener(session.clone(), canvas.clone(), InputEvent::mouse_move);
        let mouse_up = {
            let session = session.clone();
            Closure::wrap(Box::new(move |_e: MouseEvent| {
                if let Some(s) = session.borrow_mut().as_mut() {
                    s.push(InputEvent::mouse_up());
                }
            }) as Box<dyn FnMut(_)>)
        };
        let keydown = {
            let session = session.clone();
            Closure::wrap(Box::new(move |e: KeyboardEvent| {
                if e.key() == "Escape" {
                    if let Some(s) = session.borrow_mut().as_mut() {
                        s.push(InputEvent::Quit);
                    }
                }
            }) as Box<dyn FnMut(_)>)
        };
        let resize = {
            let on_resize = props.on_resize.clone();
            Closure::wrap(Box::new(move || on_resize.emit(())) as Box<dyn FnMut()>)
        };

        for (name, cb) in [
            ("touchstart", &touch_start),
            ("touchmove", &touch_move),
            ("touchend", &touch_end),
            ("touchcancel", &touch_end),
        ] {
            canvas
                .add_event_listener_with_callback(name, cb.as_ref().unchecked_ref())
                .ok();
        }
        canvas
            .add_event_listener_with_callback("mousedown", mouse_down.as_ref().unchecked_ref())
            .ok();
        canvas
            .add_event_listener_with_callback("mousemove", mouse_move.as_ref().unchecked_ref())
            .ok();
        window
            .add_event_listener_with_callback("mouseup", mouse_up.as_ref().unchecked_ref())
            .ok();
        window
            .add_event_listener_with_callback("keydown", keydown.as_ref().unchecked_ref())
            .ok();
        window
            .add_event_listener_with_callback("resize", resize.as_ref().unchecked_ref())
            .ok();

        // Frame loop: drain input, reconcile, paint what changed.
        let raf_id = Rc::new(RefCell::new(None));
        let raf: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
        {
            let raf_id_loop = raf_id.clone();
            let raf_loop = raf.clone();
            let window_loop = window.clone();
            let on_ended = props.on_ended.clone();
            *raf.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
                let (tick, stats) = match session.borrow_mut().as_mut() {
                    Some(s) => {
                        s.set_clock(ts);
                        (s.tick(), s.stats())
                    }
                    None => return,
                };
                match tick {
                    Tick::Idle => {}
                    Tick::Paint(redraw) => painter.paint(&redraw),
                    Tick::Ended(last) => {
                        // put released tiles back to idle under the overlay
                        if let Some(redraw) = last {
                            painter.paint(&redraw);
                        }
                        *raf_id_loop.borrow_mut() = None;
                        on_ended.emit(stats);
                        return;
                    }
                }
                if let Some(cb) = raf_loop.borrow().as_ref() {
                    if let Ok(id) = window_loop.request_animation_frame(cb.as_ref().unchecked_ref()) {
                        *raf_id_loop.borrow_mut() = Some(id);
                    }
                }
            }) as Box<dyn FnMut(f64)>));
        }
        if let Some(cb) = raf.borrow().as_ref() {
            if let Ok(id) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                *raf_id.borrow_mut() = Some(id);
            }
        }

        Some(Self {
            window,
            canvas,
            raf_id,
            raf,
            touch_start,
            touch_move,
            touch_end,
            mouse_down,
            mouse_move,
            mouse_up,
            keydown,
            resize,
        })
    }

    fn detach(self) {
        for (name, cb) in [
            ("touchstart", &self.touch_start),
            ("touchmove", &self.touch_move),
            ("touchend", &self.touch_end),
            ("touchcancel", &self.touch_end),
        ] {
            let _ = self
                .canvas
                .remove_event_listener_with_callback(name, cb.as_ref().unchecked_ref());
        }
        let _ = self.canvas.remove_event_listener_with_callback(
            "mousedown",
            self.mouse_down.as_ref().unchecked_ref(),
        );
        let _ = self.canvas.remove_event_listener_with_callback(
            "mousemove",
            self.mouse_move.as_ref().unchecked_ref(),
        );
        let _ = self.window.remove_event_listener_with_callback(
            "mouseup",
            self.mouse_up.as_ref().unchecked_ref(),
        );
        let _ = self.window.remove_event_listener_with_callback(
            "keydown",
            self.keydown.as_ref().unchecked_ref(),
        );
        let _ = self.window.remove_event_listener_with_callback(
            "resize",
            self.resize.as_ref().unchecked_ref(),
        );
        if let Some(id) = self.raf_id.borrow_mut().take() {
            let _ = self.window.cancel_animation_frame(id);
        }
        // the loop closure holds a handle to its own cell
        self.raf.borrow_mut().take();
    }
}
