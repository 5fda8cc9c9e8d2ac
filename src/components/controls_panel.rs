use crate::config::PRESETS;
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct ControlsPanelProps {
    pub current: String,
    pub on_preset: Callback<String>,
    pub on_end: Callback<()>,
    pub on_hide: Callback<()>,
}

#[function_component]
pub fn ControlsPanel(props: &ControlsPanelProps) -> Html {
    let end_cb = {
        let cb = props.on_end.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let hide_cb = {
        let cb = props.on_hide.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let presets = PRESETS.iter().map(|&name| {
        let cb = props.on_preset.clone();
        let onclick = Callback::from(move |_| cb.emit(name.to_string()));
        let style = if name == props.current {
            "font-weight:700; border:1px solid #58a6ff;"
        } else {
            ""
        };
        html! { <button {style} {onclick}>{ name }</button> }
    });
    html! {<div style="position:absolute; top:12px; right:12px; background:rgba(22,27,34,0.9); border:1px solid #30363d; border-radius:8px; padding:8px; min-width:160px; display:flex; flex-direction:column; gap:6px;">
        { for presets }
        <button onclick={end_cb}>{"End session"}</button>
        <button onclick={hide_cb}>{"Hide controls"}</button>
        <div style="font-size:11px; opacity:0.7;">{"Esc ends, 'H' toggles controls"}</div>
    </div>}
}
