//! Web MIDI output: device selection and the sink that sends flushed batches.

use js_sys::{Array, Uint8Array};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{MidiAccess, MidiOutput};

use crate::config::MidiSettings;
use crate::midi::{MidiMessage, MidiSink};

/// Program that sounds reasonable on a software synth when nothing is configured.
const SOFT_SYNTH: &str = "TiMidity";
const SOFT_SYNTH_PROGRAM: u8 = 95;

/// Index of the output to use: the first priority name with an exact match,
/// else the first output.
pub fn choose_output(names: &[String], priority: &[String]) -> Option<usize> {
    priority
        .iter()
        .find_map(|want| names.iter().position(|n| n == want))
        .or(if names.is_empty() { None } else { Some(0) })
}

/// Program change to send after connecting to `name`, if any.
pub fn startup_program(name: &str, settings: &MidiSettings) -> Option<u8> {
    settings
        .program
        .or((name == SOFT_SYNTH).then_some(SOFT_SYNTH_PROGRAM))
}

/// Concatenated wire bytes for a batch; Web MIDI accepts several messages per send.
pub fn encode_batch(batch: &[MidiMessage]) -> Vec<u8> {
    batch.iter().flat_map(|m| m.to_bytes()).collect()
}

pub struct WebMidiSink {
    output: MidiOutput,
    name: String,
}

impl MidiSink for WebMidiSink {
    fn deliver(&mut self, batch: &[MidiMessage]) {
        let bytes = Uint8Array::from(encode_batch(batch).as_slice());
        if let Err(e) = self.output.send(&bytes) {
            log::warn!("midi send to {} failed: {e:?}", self.name);
        }
    }

    fn name(&self) -> Option<String> {
        Some(self.name.clone())
    }
}

/// Used until (or instead of) a real output: batches go to the debug log.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl MidiSink for ConsoleSink {
    fn deliver(&mut self, batch: &[MidiMessage]) {
        log::debug!("midi: {batch:?}");
    }
}

fn outputs(access: &MidiAccess) -> Vec<MidiOutput> {
    let Ok(Some(iter)) = js_sys::try_iter(&access.outputs()) else {
        return Vec::new();
    };
    iter.filter_map(|entry| entry.ok())
        .filter_map(|entry| Array::from(&entry).get(1).dyn_into::<MidiOutput>().ok())
        .collect()
}

/// Ask the browser for MIDI access and hand the chosen output to `on_ready`.
/// Failure or denial is logged and leaves the caller on its current sink.
pub fn connect(settings: MidiSettings, on_ready: impl FnOnce(Box<dyn MidiSink>) + 'static) {
    let Some(navigator) = web_sys::window().map(|w| w.navigator()) else {
        return;
    };
    let promise = match navigator.request_midi_access() {
        Ok(p) => p,
        Err(e) => {
            log::warn!("web midi unavailable: {e:?}");
            return;
        }
    };
    let on_access = Closure::once(move |access: JsValue| {
        let Ok(access) = access.dyn_into::<MidiAccess>() else {
            log::warn!("unexpected midi access object");
            return;
        };
        let outputs = outputs(&access);
        let names: Vec<String> = outputs.iter().map(|o| o.name().unwrap_or_default()).collect();
        log::info!("midi outputs: {names:?}");
        let Some(index) = choose_output(&names, &settings.device_priority) else {
            log::warn!("no midi outputs, notes go to the console");
            return;
        };
        let mut sink = WebMidiSink {
            output: outputs[index].clone(),
            name: names[index].clone(),
        };
        if let Some(program) = startup_program(&sink.name, &settings) {
            sink.deliver(&[MidiMessage::ProgramChange {
                channel: settings.channel,
                program,
            }]);
        }
        log::info!("connected to midi output {}", sink.name);
        on_ready(Box::new(sink));
    });
    let on_error = Closure::once(|e: JsValue| {
        log::warn!("midi access denied: {e:?}");
    });
    let _ = promise.then2(&on_access, &on_error);
    // one-shot handlers for the life of the page
    on_access.forget();
    on_error.forget();
}
