use super::{
    controls_panel::ControlsPanel, instrument_view::InstrumentView,
    session_over_overlay::SessionOverOverlay, status_panel::StatusPanel,
};
use crate::state::{SessionStats, Stage, StageAction, ViewStatus};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Event, KeyboardEvent};
use yew::prelude::*;

/// The URL fragment, percent-decoded, and the window's width over height.
fn read_location() -> (String, f64) {
    let Some(window) = web_sys::window() else {
        return (String::new(), 1.0);
    };
    let raw = window.location().hash().unwrap_or_default();
    let fragment = js_sys::decode_uri_component(&raw)
        .map(String::from)
        .unwrap_or(raw);
    let w = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(1.0);
    let h = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(1.0);
    (fragment, w / h.max(1.0))
}

fn load_action() -> StageAction {
    let (fragment, aspect) = read_location();
    StageAction::Load { fragment, aspect }
}

#[function_component(App)]
pub fn app() -> Html {
    let stage = use_reducer(Stage::new);

    // Load from the hash now and whenever it changes; 'H' toggles the controls.
    {
        let stage = stage.clone();
        use_effect_with((), move |_| {
            stage.dispatch(load_action());
            let window = web_sys::window();
            let on_hash = {
                let stage = stage.clone();
                Closure::wrap(Box::new(move |_e: Event| stage.dispatch(load_action()))
                    as Box<dyn FnMut(_)>)
            };
            let on_key = {
                let stage = stage.clone();
                Closure::wrap(Box::new(move |e: KeyboardEvent| {
                    if e.key().eq_ignore_ascii_case("h") {
                        stage.dispatch(StageAction::ToggleControls);
                    }
                }) as Box<dyn FnMut(_)>)
            };
            if let Some(w) = &window {
                let _ = w.add_event_listener_with_callback(
                    "hashchange",
                    on_hash.as_ref().unchecked_ref(),
                );
                let _ =
                    w.add_event_listener_with_callback("keydown", on_key.as_ref().unchecked_ref());
            }
            move || {
                if let Some(w) = &window {
                    let _ = w.remove_event_listener_with_callback(
                        "hashchange",
                        on_hash.as_ref().unchecked_ref(),
                    );
                    let _ = w.remove_event_listener_with_callback(
                        "keydown",
                        on_key.as_ref().unchecked_ref(),
                    );
                }
            }
        });
    }

    let on_preset = {
        let stage = stage.clone();
        Callback::from(move |name: String| {
            let Some(window) = web_sys::window() else {
                return;
            };
            let location = window.location();
            if location.hash().unwrap_or_default() == format!("#{name}") {
                // same hash fires no hashchange
                stage.dispatch(StageAction::Restart);
            } else if location.set_hash(&name).is_err() {
                stage.dispatch(StageAction::Load {
                    fragment: name,
                    aspect: read_location().1,
                });
            }
        })
    };
    let on_end = {
        let stage = stage.clone();
        Callback::from(move |_| stage.dispatch(StageAction::RequestEnd))
    };
    let on_hide = {
        let stage = stage.clone();
        Callback::from(move |_| stage.dispatch(StageAction::ToggleControls))
    };
    let restart = {
        let stage = stage.clone();
        Callback::from(move |_| stage.dispatch(StageAction::Restart))
    };
    let on_status = {
        let stage = stage.clone();
        Callback::from(move |s: ViewStatus| stage.dispatch(StageAction::Status(s)))
    };
    let on_ended = {
        let stage = stage.clone();
        Callback::from(move |s: SessionStats| stage.dispatch(StageAction::Ended(s)))
    };
    let on_error = {
        let stage = stage.clone();
        Callback::from(move |msg: String| stage.dispatch(StageAction::Failed(msg)))
    };
    // a new screen size means a new pip grid
    let on_resize = {
        let stage = stage.clone();
        Callback::from(move |_| stage.dispatch(load_action()))
    };

    let view = match &stage.config {
        Some(config) => html! { <InstrumentView
            key={stage.generation.to_string()}
            config={config.clone()}
            end_request={stage.end_request}
            {on_status}
            {on_ended}
            {on_error}
            {on_resize}
        /> },
        None => html! {},
    };
    let error = match &stage.error {
        Some(msg) => html! {
            <div style="position:absolute; top:50%; left:50%; transform:translate(-50%, -50%); background:rgba(0,0,0,0.85); border:2px solid #f85149; padding:16px 24px; border-radius:12px; color:#f85149; max-width:80%;">
                { msg.clone() }
            </div>
        },
        None => html! {},
    };
    let hud = if stage.show_controls {
        html! {
            <>
                <StatusPanel instrument={stage.instrument_name().to_string()} status={stage.status.clone()} />
                <ControlsPanel current={stage.instrument_name().to_string()} {on_preset} {on_end} {on_hide} />
            </>
        }
    } else {
        html! {}
    };

    html! {
        <div style="position:fixed; inset:0; overflow:hidden; background:#000; font-family:sans-serif;">
            { view }
            { hud }
            { error }
            <SessionOverOverlay stats={stage.ended} {restart} />
        </div>
    }
}
