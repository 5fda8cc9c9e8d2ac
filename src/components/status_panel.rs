use crate::state::ViewStatus;
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct StatusPanelProps {
    pub instrument: String,
    pub status: ViewStatus,
}

#[function_component]
pub fn StatusPanel(props: &StatusPanelProps) -> Html {
    let row_style = "display:flex; align-items:center; gap:8px;"; // label | value
    let label_style = "flex:1; font-weight:500;";
    let value_style =
        "min-width:70px; text-align:right; font-variant-numeric:tabular-nums; font-weight:600;";
    let s = &props.status;
    let midi = s.midi.clone().unwrap_or_else(|| "console".to_string());
    html! {
        <div style="position:absolute; bottom:12px; left:12px; background:rgba(22,27,34,0.9); border:1px solid #30363d; border-radius:8px; padding:10px 14px; min-width:230px; display:flex; flex-direction:column; gap:6px; font-size:13px; color:#c9d1d9; pointer-events:none;">
            <div style="font-weight:700; color:#58a6ff;">{ props.instrument.clone() }</div>
            <div style={row_style}>
                <span style={label_style}>{"Pip"}</span>
                <span style={value_style}>{ format!("{} px", s.pip) }</span>
            </div>
            <div style={row_style}>
                <span style={label_style}>{"Screen"}</span>
                <span style={value_style}>{ format!("{}x{}", s.screen.0, s.screen.1) }</span>
            </div>
            <div style={row_style}>
                <span style={label_style}>{"Panels / tiles"}</span>
                <span style={value_style}>{ format!("{} / {}", s.panels, s.tiles) }</span>
            </div>
            <div style={row_style}>
                <span style={format!("{} color:#d4af37;", label_style)}>{"MIDI out"}</span>
                <span style={format!("{} color:#d4af37;", value_style)}>{ midi }</span>
            </div>
        </div>
    }
}
