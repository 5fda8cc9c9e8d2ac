use crate::state::SessionStats;
use crate::util::format_time;
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct SessionOverOverlayProps {
    pub stats: Option<SessionStats>,
    pub restart: Callback<()>,
}

#[function_component]
pub fn SessionOverOverlay(props: &SessionOverOverlayProps) -> Html {
    let Some(stats) = props.stats else {
        return html! {};
    };
    let restart_cb = props.restart.clone();
    let restart_btn = Callback::from(move |_| restart_cb.emit(()));
    html! {
        <div style="position:absolute; top:50%; left:50%; transform:translate(-50%, -50%); background:rgba(0,0,0,0.85); border:2px solid #58a6ff; padding:24px 32px; border-radius:12px; text-align:center; min-width:320px; color:#c9d1d9;">
            <h2 style="margin:0 0 12px 0; color:#58a6ff;">{"Session Over"}</h2>
            <p style="margin:4px 0;">{ format!("Played: {}", format_time(stats.elapsed_secs())) }</p>
            <p style="margin:4px 0;">{ format!("Notes held: {}", stats.holds) }</p>
            <p style="margin:4px 0;">{ format!("Slides: {}", stats.rubs) }</p>
            <p style="margin:4px 0;">{ format!("Most at once: {}", stats.peak_held) }</p>
            <p style="margin:4px 0;">{ format!("MIDI messages: {}", stats.messages) }</p>
            <div style="margin-top:16px; display:flex; gap:12px; justify-content:center;">
                <button onclick={restart_btn}>{"Play Again"}</button>
            </div>
        </div>
    }
}
